//! frodo-lwe: a FrodoKEM-style LWE key encapsulation and the attacks that
//! break it at toy sizes
//!
//! Key components:
//! - [`kem`]: seed-expanded public matrix, binomial or uniform errors,
//!   2-bit symbol codec and SHA3-derived shared secrets
//! - [`lattice`]: embedding and q-ary lattices, exact LLL reduction and
//!   Babai nearest-plane rounding
//! - [`attack`]: primal embedding attack that recovers S from a public key,
//!   plus a Babai CVP attack on raw LWE samples
//! - [`algebraic`]: Arora-Ge linearisation with a Groebner basis over GF(q)

pub mod params;
pub mod error;
pub mod math;
pub mod kem;
pub mod lattice;
pub mod attack;
pub mod algebraic;

pub use kem::{decapsulate, encapsulate, keygen, Ciphertext, PublicKey, SecretKey, SharedSecret};

pub use attack::{
    babai_attack, crack, crack_and_recover, crack_with, recover_lwe_secret,
    LweInstance, PrimalAttack, SecretDistribution,
};

pub use algebraic::arora_ge_attack;

pub use error::{LweError, Result};
pub use params::FrodoParams;
