//! Algebraic attack on LWE with a tiny error set.
//!
//! When every error lies in a known set `E`, each sample gives the exact
//! equation `∏_{e∈E} (b_i − ⟨a_i, x⟩ − e) = 0` of degree `|E|`. With enough
//! samples the ideal they generate has the secret as its only root, and
//! either a Groebner basis or a linearised (XL) elimination exposes it as
//! `x_i − s_i`. When neither has enough equations, guessing the errors of a
//! few samples shrinks the system until linearisation does.
//!
//! ```ignore
//! let s = arora_ge_attack(&inst.a, &inst.b, &[-1, 0, 1], inst.q)?;
//! assert!(inst.check_secret(&s));
//! ```

mod arora_ge;
mod groebner;
mod poly;
mod xl;

pub use arora_ge::{arora_ge_attack, arora_ge_system};
pub use groebner::{groebner_basis, linear_interreduce, normal_form};
pub use poly::{MPoly, Monomial};
pub use xl::{macaulay_extend, monomial_count, monomials_up_to, read_linear_factors, xl_reduce};
