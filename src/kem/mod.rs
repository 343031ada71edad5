//! FrodoKEM-style key encapsulation.
//!
//! # Overview
//!
//! The public matrix A (m×n) is expanded from a short seed. A key pair is
//!
//! ```text
//! pk = (seed, B = A·S + E mod q)      sk = S
//! ```
//!
//! and a ciphertext for message μ is
//!
//! ```text
//! C1 = S'·A + E'
//! C2 = S'·B + E'' + encode(μ)
//! ```
//!
//! Decapsulation computes `C2 − C1·S = encode(μ) + S'·E + E'' − E'·S`; the
//! noise term is small enough for the symbol codec to round away. Both sides
//! derive the shared secret as `SHA3-256(μ ‖ ct)` truncated to the message
//! length.
//!
//! # Example
//!
//! ```
//! use frodo_lwe::kem::{decapsulate, encapsulate, keygen};
//! use frodo_lwe::params::FrodoParams;
//! use rand::SeedableRng;
//!
//! let params = FrodoParams::reference();
//! let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(7);
//! let (pk, sk) = keygen(&params, &mut rng).unwrap();
//! let (ct, ss, _) = encapsulate(&params, &pk, None, &mut rng).unwrap();
//! let (_, ss2) = decapsulate(&params, &pk, &sk, &ct).unwrap();
//! assert_eq!(ss, ss2);
//! ```

pub mod codec;
pub mod expand;
mod frodo;
mod types;

pub use codec::{decode_message, encode_message};
pub use expand::expand_a;
pub use frodo::{decapsulate, encapsulate, keygen, shared_secret};
pub(crate) use frodo::check_public_key;
pub use types::{Ciphertext, PublicKey, SecretKey, SharedSecret};
