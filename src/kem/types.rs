//! Key and ciphertext types and their byte layouts

use serde::{Deserialize, Serialize};

use crate::error::{encoding_err, Result};
use crate::math::ZMatrix;
use crate::params::FrodoParams;

use super::codec::{entry_width, matrix_from_bytes, matrix_to_bytes, write_matrix};
use super::expand::expand_a;

/// Public key: seed for A and B = A·S + E mod q (m×nbar)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    pub seed: Vec<u8>,
    pub b: ZMatrix,
}

/// Secret key: the n×nbar matrix S of small entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretKey {
    pub s: ZMatrix,
}

/// Ciphertext (C1, C2) with C1 nbar×n and C2 nbar×nbar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciphertext {
    pub c1: ZMatrix,
    pub c2: ZMatrix,
}

/// Shared secret derived from (message ‖ ciphertext)
pub type SharedSecret = Vec<u8>;

impl PublicKey {
    /// Regenerate the public matrix A (m×n) from the seed
    pub fn matrix_a(&self, params: &FrodoParams) -> ZMatrix {
        expand_a(&self.seed, params.m, params.n, params.q)
    }

    /// seed ‖ LE(B)
    pub fn to_bytes(&self, params: &FrodoParams) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(params.public_key_bytes());
        out.extend_from_slice(&self.seed);
        write_matrix(&mut out, &self.b, params.q)?;
        Ok(out)
    }

    pub fn from_bytes(bytes: &[u8], params: &FrodoParams) -> Result<Self> {
        if bytes.len() != params.public_key_bytes() {
            return Err(encoding_err!(
                "public key must be {} bytes, got {}",
                params.public_key_bytes(),
                bytes.len()
            ));
        }
        let (seed, rest) = bytes.split_at(params.seed_bytes);
        Ok(Self {
            seed: seed.to_vec(),
            b: matrix_from_bytes(rest, params.m, params.nbar, params.q)?,
        })
    }
}

impl SecretKey {
    /// LE((S + q) mod q)
    pub fn to_bytes(&self, params: &FrodoParams) -> Result<Vec<u8>> {
        matrix_to_bytes(&self.s, params.q)
    }

    /// Parse a stored key; entries come back as residues in [0, q)
    pub fn from_bytes(bytes: &[u8], params: &FrodoParams) -> Result<Self> {
        Ok(Self {
            s: matrix_from_bytes(bytes, params.n, params.nbar, params.q)?,
        })
    }

    /// Same key with entries centered into (-q/2, q/2]
    pub fn centered(&self, q: u64) -> Self {
        Self {
            s: self.s.center_mod(q),
        }
    }
}

impl Ciphertext {
    /// LE(C1) ‖ LE(C2)
    pub fn to_bytes(&self, params: &FrodoParams) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(params.ciphertext_bytes());
        write_matrix(&mut out, &self.c1, params.q)?;
        write_matrix(&mut out, &self.c2, params.q)?;
        Ok(out)
    }

    pub fn from_bytes(bytes: &[u8], params: &FrodoParams) -> Result<Self> {
        if bytes.len() != params.ciphertext_bytes() {
            return Err(encoding_err!(
                "ciphertext must be {} bytes, got {}",
                params.ciphertext_bytes(),
                bytes.len()
            ));
        }
        let (c1, c2) = bytes.split_at(entry_width(params.q) * params.nbar * params.n);
        Ok(Self {
            c1: matrix_from_bytes(c1, params.nbar, params.n, params.q)?,
            c2: matrix_from_bytes(c2, params.nbar, params.nbar, params.q)?,
        })
    }
}
