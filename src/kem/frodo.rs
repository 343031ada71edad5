//! Key generation, encapsulation and decapsulation

use rand::{CryptoRng, Rng};
use sha3::{Digest, Sha3_256};
use tracing::debug;

use crate::error::{encoding_err, LweError, Result};
use crate::math::ZMatrix;
use crate::params::FrodoParams;

use super::codec::{decode_message, encode_message};
use super::expand::expand_a;
use super::types::{Ciphertext, PublicKey, SecretKey, SharedSecret};

/// Generate a key pair
///
/// Samples a fresh seed, expands it to A, draws S (n×nbar) and E (m×nbar)
/// from the error distribution and publishes B = A·S + E mod q. E is
/// dropped on return.
pub fn keygen<R: Rng + CryptoRng>(params: &FrodoParams, rng: &mut R) -> Result<(PublicKey, SecretKey)> {
    params.validate()?;

    let mut seed = vec![0u8; params.seed_bytes];
    rng.fill_bytes(&mut seed);
    let a = expand_a(&seed, params.m, params.n, params.q);

    let s = params.error.sample_matrix(params.n, params.nbar, rng);
    let e = params.error.sample_matrix(params.m, params.nbar, rng);
    let b = a.mul(&s).add(&e).reduce_mod(params.q);

    debug!(n = params.n, m = params.m, nbar = params.nbar, "generated key pair");
    Ok((PublicKey { seed, b }, SecretKey { s }))
}

/// Encapsulate a message under a public key
///
/// With `message = None` a random message is drawn. A caller-supplied
/// message longer than `message_bytes` is rejected; a shorter one is
/// right-padded with zero bytes. Returns the ciphertext, the shared secret
/// and the (padded) message.
pub fn encapsulate<R: Rng + CryptoRng>(
    params: &FrodoParams,
    pk: &PublicKey,
    message: Option<&[u8]>,
    rng: &mut R,
) -> Result<(Ciphertext, SharedSecret, Vec<u8>)> {
    let mu = match message {
        Some(bytes) if bytes.len() > params.message_bytes => {
            return Err(LweError::MessageTooLong {
                len: bytes.len(),
                max: params.message_bytes,
            });
        }
        Some(bytes) => {
            let mut mu = bytes.to_vec();
            mu.resize(params.message_bytes, 0);
            mu
        }
        None => {
            let mut mu = vec![0u8; params.message_bytes];
            rng.fill_bytes(&mut mu);
            mu
        }
    };
    check_public_key(params, pk)?;

    let q = params.q;
    let a = pk.matrix_a(params);

    // S' is nbar×m so that S'·A is nbar×n and S'·B is nbar×nbar
    let s_prime = params.error.sample_matrix(params.nbar, params.m, rng);
    let e_prime = params.error.sample_matrix(params.nbar, params.n, rng);
    let e_second = params.error.sample_matrix(params.nbar, params.nbar, rng);

    let c1 = s_prime.mul(&a).add(&e_prime).reduce_mod(q);
    let c2 = s_prime
        .mul(&pk.b)
        .add(&e_second)
        .add(&encode_message(&mu, params))
        .reduce_mod(q);

    let ct = Ciphertext { c1, c2 };
    let ss = shared_secret(params, &mu, &ct)?;
    Ok((ct, ss, mu))
}

/// Decapsulate a ciphertext
///
/// Computes C2 − C1·S, decodes it and re-derives the shared secret. Noise
/// beyond the codec tolerance yields a wrong message rather than an error;
/// callers detect that by comparing shared secrets.
pub fn decapsulate(
    params: &FrodoParams,
    pk: &PublicKey,
    sk: &SecretKey,
    ct: &Ciphertext,
) -> Result<(Vec<u8>, SharedSecret)> {
    check_public_key(params, pk)?;
    check_shape("secret key", &sk.s, params.n, params.nbar)?;
    check_shape("C1", &ct.c1, params.nbar, params.n)?;
    check_shape("C2", &ct.c2, params.nbar, params.nbar)?;

    let noisy = ct.c2.sub(&ct.c1.mul_mod(&sk.s, params.q)).reduce_mod(params.q);
    let mu = decode_message(&noisy, params);
    let ss = shared_secret(params, &mu, ct)?;
    Ok((mu, ss))
}

/// SHA3-256(μ ‖ ct) truncated to the message length
pub fn shared_secret(params: &FrodoParams, message: &[u8], ct: &Ciphertext) -> Result<SharedSecret> {
    let mut hasher = Sha3_256::new();
    hasher.update(message);
    hasher.update(ct.to_bytes(params)?);
    let digest = hasher.finalize();
    Ok(digest[..params.message_bytes.min(digest.len())].to_vec())
}

pub(crate) fn check_public_key(params: &FrodoParams, pk: &PublicKey) -> Result<()> {
    if pk.seed.len() != params.seed_bytes {
        return Err(encoding_err!(
            "public key seed must be {} bytes, got {}",
            params.seed_bytes,
            pk.seed.len()
        ));
    }
    check_shape("B", &pk.b, params.m, params.nbar)
}

fn check_shape(what: &str, matrix: &ZMatrix, rows: usize, cols: usize) -> Result<()> {
    if matrix.rows() != rows || matrix.cols() != cols {
        return Err(encoding_err!(
            "{} must be {}x{}, got {}x{}",
            what,
            rows,
            cols,
            matrix.rows(),
            matrix.cols()
        ));
    }
    Ok(())
}
