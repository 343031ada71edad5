//! Closest-vector attack on raw LWE samples

use tracing::{debug, info};

use crate::error::Result;
use crate::lattice::{nearest_plane, qary_basis, GramSchmidt, LllReducer};
use crate::math::{solve_right, ModQ};

use super::instance::LweInstance;

/// Recover the secret of an LWE instance with Babai's nearest-plane step
///
/// The samples `b` are read as a target close to the point `A·s mod q` of
/// the q-ary lattice of A. The lattice basis is LLL-reduced, the nearest
/// plane walk rounds `b` onto the lattice, and `A·s ≡ v (mod q)` is solved
/// for the rounded point `v`. Coordinates come back centered.
pub fn babai_attack(instance: &LweInstance) -> Result<Vec<i64>> {
    babai_attack_with(instance, &LllReducer::default())
}

pub fn babai_attack_with(instance: &LweInstance, reducer: &LllReducer) -> Result<Vec<i64>> {
    let q = instance.q;
    let reduced = reducer.reduce(&qary_basis(&instance.a, q))?;
    debug!(rows = reduced.basis.rows(), swaps = reduced.stats.swaps, "reduced q-ary basis");

    let gso = GramSchmidt::new(&reduced.basis);
    let point = nearest_plane(&reduced.basis, &gso, &instance.b);

    let solution = solve_right(&instance.a, &point, q)?;
    info!(n = instance.n(), m = instance.m(), "babai attack solved for secret");
    Ok(solution
        .particular
        .iter()
        .map(|&x| ModQ::to_signed(x, q))
        .collect())
}
