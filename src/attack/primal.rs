//! Primal (embedding) attack on LWE samples and on FrodoKEM public keys

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{param_err, LweError, Result};
use crate::kem::{check_public_key, decapsulate, Ciphertext, PublicKey, SecretKey, SharedSecret};
use crate::lattice::{build_embedding, LllReducer, LllStats};
use crate::math::{mat_vec_mod, solve_right, ModQ, ModSolution, ZMatrix};
use crate::params::FrodoParams;

use super::instance::LweInstance;

/// Outcome of the attack on one column of samples
#[derive(Debug, Clone)]
pub struct ColumnRecovery {
    pub column: usize,

    /// Secret column centered into (-q/2, q/2]
    pub secret: Vec<i64>,

    /// Error column, centered
    pub error: Vec<i64>,

    /// False when the solver had a non-trivial kernel to choose from
    pub unique: bool,

    pub stats: LllStats,
}

/// Primal attack configuration
#[derive(Debug, Clone, Copy)]
pub struct PrimalAttack {
    /// Largest error magnitude a candidate may have
    pub bound: i64,

    pub reducer: LllReducer,
}

impl PrimalAttack {
    pub fn new(bound: i64) -> Self {
        Self {
            bound,
            reducer: LllReducer::default(),
        }
    }

    /// Recover `(s, e)` with `b = A·s + e mod q` for one column of samples
    ///
    /// Builds the embedding lattice, reduces it, and tries every candidate row
    /// from [`find_error_candidates`]; the first candidate whose residual
    /// system is consistent and re-derives the same error wins.
    pub fn recover_column(&self, a: &ZMatrix, b: &[i64], q: u64, column: usize) -> Result<ColumnRecovery> {
        let m = a.rows();
        if b.len() != m {
            return Err(param_err!("A has {} rows but there are {} samples", m, b.len()));
        }
        let embedding = build_embedding(a, b, q);
        let reduced = self.reducer.reduce(&embedding)?;
        debug!(
            column,
            rows = reduced.basis.rows(),
            swaps = reduced.stats.swaps,
            "reduced embedding lattice"
        );

        let candidates = find_error_candidates(&reduced.basis, m, q, self.bound).map_err(|reason| {
            LweError::ErrorVectorRecoveryFailed {
                column,
                reason,
            }
        })?;

        let mut last_err = None;
        for error in candidates {
            let solution = match solve_for_secret(a, b, &error, q) {
                Ok(solution) => solution,
                Err(e) => {
                    debug!(column, "candidate rejected: {}", e);
                    last_err = Some(e);
                    continue;
                }
            };

            if rederive_error(a, b, &solution.particular, q) != error {
                debug!(column, "candidate does not re-derive its own error");
                continue;
            }

            let unique = solution.is_unique();
            if !unique {
                warn!(
                    column,
                    kernel = solution.kernel.len(),
                    "secret column is only determined up to the kernel of A"
                );
            }
            let secret = solution.particular.iter().map(|&x| ModQ::to_signed(x, q)).collect();
            return Ok(ColumnRecovery {
                column,
                secret,
                error,
                unique,
                stats: reduced.stats,
            });
        }

        Err(last_err.unwrap_or_else(|| LweError::ErrorVectorRecoveryFailed {
            column,
            reason: "no candidate survived validation".to_string(),
        }))
    }

    /// Recover S from `B = A·S + E mod q`, one independent task per column
    ///
    /// `on_column` is called from worker threads as each column finishes.
    pub fn recover_secret_matrix_with<F>(&self, a: &ZMatrix, b: &ZMatrix, q: u64, on_column: F) -> Result<ZMatrix>
    where
        F: Fn(&ColumnRecovery) + Sync,
    {
        if a.rows() != b.rows() {
            return Err(param_err!("A has {} rows but B has {}", a.rows(), b.rows()));
        }
        let n = a.cols();

        let columns = (0..b.cols())
            .into_par_iter()
            .map(|j| {
                let recovery = self.recover_column(a, &b.column(j), q, j)?;
                on_column(&recovery);
                Ok(recovery)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut s = ZMatrix::zeros(n, b.cols());
        for recovery in &columns {
            s.set_column(recovery.column, &recovery.secret);
        }
        Ok(s)
    }

    pub fn recover_secret_matrix(&self, a: &ZMatrix, b: &ZMatrix, q: u64) -> Result<ZMatrix> {
        self.recover_secret_matrix_with(a, b, q, |_| {})
    }
}

/// Scan a reduced embedding basis for error-vector candidates
///
/// Rows are examined from last to first. A candidate has last coordinate
/// `±q`; it is negated if needed so the last coordinate is `+q`, and its
/// first `m` coordinates, centered mod q, must all lie within `bound`.
///
/// If the basis holds a vector with last coordinate 0 whose entries are all
/// within `2·bound`, the samples admit several short error vectors (as when
/// m ≤ n) and the scan refuses to pick one. Errors are returned as reasons.
pub fn find_error_candidates(
    reduced: &ZMatrix,
    m: usize,
    q: u64,
    bound: i64,
) -> std::result::Result<Vec<Vec<i64>>, String> {
    let q_i = q as i64;
    let mut candidates = Vec::new();

    for i in (0..reduced.rows()).rev() {
        let row = reduced.row(i);
        let last = row[m];

        if last == 0 && row[..m].iter().all(|x| x.abs() <= 2 * bound) {
            return Err(format!(
                "short vector with zero embedding coordinate in row {}: error is not unique",
                i
            ));
        }
        if last.abs() != q_i {
            continue;
        }

        let sign = last.signum();
        let error: Vec<i64> = row[..m].iter().map(|&x| ModQ::center(sign * x, q)).collect();
        if error.iter().all(|x| x.abs() <= bound) {
            candidates.push(error);
        }
    }

    if candidates.is_empty() {
        return Err(format!(
            "no row with embedding coordinate ±{} and entries within {}",
            q, bound
        ));
    }
    Ok(candidates)
}

/// Solve `A·s ≡ b − e (mod q)`
pub fn solve_for_secret(a: &ZMatrix, b: &[i64], error: &[i64], q: u64) -> Result<ModSolution> {
    let rhs: Vec<i64> = b.iter().zip(error).map(|(&bi, &ei)| bi - ei).collect();
    solve_right(a, &rhs, q)
}

/// center(b − A·s mod q)
fn rederive_error(a: &ZMatrix, b: &[i64], s: &[u64], q: u64) -> Vec<i64> {
    mat_vec_mod(a, s, q)
        .iter()
        .zip(b)
        .map(|(&as_i, &bi)| ModQ::center(bi - as_i as i64, q))
        .collect()
}

/// Error vector of one column of samples
pub fn recover_error_vector(a: &ZMatrix, b: &[i64], q: u64, bound: i64) -> Result<Vec<i64>> {
    Ok(PrimalAttack::new(bound).recover_column(a, b, q, 0)?.error)
}

/// Secret vector of a raw LWE instance
pub fn recover_lwe_secret(instance: &LweInstance, bound: i64) -> Result<Vec<i64>> {
    let recovery = PrimalAttack::new(bound).recover_column(&instance.a, &instance.b, instance.q, 0)?;
    info!(
        n = instance.n(),
        m = instance.m(),
        swaps = recovery.stats.swaps,
        "primal attack recovered LWE secret"
    );
    Ok(recovery.secret)
}

/// Recover the secret key from a public key alone
pub fn crack(params: &FrodoParams, pk: &PublicKey) -> Result<SecretKey> {
    crack_with(params, pk, |_| {})
}

/// [`crack`] with a per-column callback
pub fn crack_with<F>(params: &FrodoParams, pk: &PublicKey, on_column: F) -> Result<SecretKey>
where
    F: Fn(&ColumnRecovery) + Sync,
{
    params.validate()?;
    check_public_key(params, pk)?;
    let a = pk.matrix_a(params);
    let attack = PrimalAttack::new(params.error.bound());
    let s = attack.recover_secret_matrix_with(&a, &pk.b, params.q, on_column)?;
    info!(n = params.n, m = params.m, nbar = params.nbar, "recovered secret matrix");
    Ok(SecretKey { s })
}

/// Recover the secret key and use it to decapsulate `ct`
pub fn crack_and_recover(params: &FrodoParams, pk: &PublicKey, ct: &Ciphertext) -> Result<(Vec<u8>, SharedSecret)> {
    let sk = crack(params, pk)?;
    decapsulate(params, pk, &sk, ct)
}
