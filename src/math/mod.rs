//! Mathematical primitives.
//!
//! - **Modular arithmetic** over Z_q for any modulus (prime or power of two)
//! - **Integer matrices** with exact widened accumulation
//! - **Linear solving** over Z/qZ, including non-unit pivots and kernels
//! - **Small-error sampling** for secret and error matrices

pub mod linsolve;
pub mod matrix;
pub mod modular;
pub mod sampler;

pub use linsolve::{kernel, mat_vec_mod, solve_right, ModSolution};
pub use matrix::{dot, ZMatrix};
pub use modular::ModQ;
pub use sampler::ErrorDistribution;
