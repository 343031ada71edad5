//! Secret-recovery attacks on weak LWE parameters.
//!
//! - [`PrimalAttack`]: embed each column of samples into a lattice, reduce
//!   it, read the error vector off the reduced basis and solve the residual
//!   system over Z/qZ. [`crack`] applies it column by column (in parallel)
//!   to a FrodoKEM public key.
//! - [`babai_attack`]: round the samples onto the q-ary lattice of A with the
//!   nearest-plane algorithm.
//!
//! Both only succeed when the error is small compared with the reduced
//! basis, which in practice means m well above n.

mod babai;
mod instance;
mod primal;

pub use babai::{babai_attack, babai_attack_with};
pub use instance::{LweInstance, SecretDistribution};
pub use primal::{
    crack, crack_and_recover, crack_with, find_error_candidates, recover_error_vector,
    recover_lwe_secret, solve_for_secret, ColumnRecovery, PrimalAttack,
};
