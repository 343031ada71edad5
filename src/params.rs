//! Parameter sets for the FrodoKEM-style scheme
//!
//! All presets are deliberately weak research parameters: the point of the
//! crate is to break them.

use serde::{Deserialize, Serialize};

use crate::error::{param_err, Result};
use crate::kem::codec::entry_width;
use crate::math::ErrorDistribution;

/// Core parameters of one scheme instantiation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrodoParams {
    /// Secret dimension n (columns of A)
    pub n: usize,

    /// Number of samples m (rows of A); the attacks need m > n
    pub m: usize,

    /// Number of parallel secret columns
    pub nbar: usize,

    /// Modulus q: a power of two for the KEM, a prime for the raw-LWE attacks
    pub q: u64,

    /// Distribution of S, E and the ephemeral matrices
    pub error: ErrorDistribution,

    /// Message and shared-secret length in bytes
    pub message_bytes: usize,

    /// Length of the seed that expands to A
    pub seed_bytes: usize,
}

impl FrodoParams {
    /// Square reference instance: n = m = 40, q = 2^15, binomial errors
    pub fn reference() -> Self {
        Self {
            n: 40,
            m: 40,
            nbar: 8,
            q: 1 << 15,
            error: ErrorDistribution::CenteredBinomial { pairs: 6 },
            message_bytes: 16,
            seed_bytes: 16,
        }
    }

    /// Twice as many samples as secret coordinates, errors in {-1, 0, 1}
    pub fn primal_demo() -> Self {
        Self {
            m: 80,
            error: ErrorDistribution::CenteredBinomial { pairs: 1 },
            ..Self::reference()
        }
    }

    /// n = 120, m = 180, uniform errors in [-3, 3]
    pub fn attack_demo() -> Self {
        Self {
            n: 120,
            m: 180,
            error: ErrorDistribution::Uniform { bound: 3 },
            ..Self::reference()
        }
    }

    /// Prime modulus 65537 with n = 60, m = 270, uniform errors in [-3, 3]
    pub fn weak_prime() -> Self {
        Self {
            n: 60,
            m: 270,
            q: 65537,
            error: ErrorDistribution::Uniform { bound: 3 },
            ..Self::reference()
        }
    }

    /// Look up a preset by name
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "reference" => Some(Self::reference()),
            "primal-demo" | "primal_demo" => Some(Self::primal_demo()),
            "attack-demo" | "attack_demo" => Some(Self::attack_demo()),
            "weak-prime" | "weak_prime" => Some(Self::weak_prime()),
            _ => None,
        }
    }

    /// Codec step q/4: each message symbol carries 2 bits
    pub fn step(&self) -> u64 {
        self.q / 4
    }

    /// Size of a serialized public key in bytes
    pub fn public_key_bytes(&self) -> usize {
        self.seed_bytes + entry_width(self.q) * self.m * self.nbar
    }

    /// Size of a serialized secret key in bytes
    pub fn secret_key_bytes(&self) -> usize {
        entry_width(self.q) * self.n * self.nbar
    }

    /// Size of a serialized ciphertext in bytes
    pub fn ciphertext_bytes(&self) -> usize {
        entry_width(self.q) * self.nbar * (self.n + self.nbar)
    }

    /// Check that the parameters describe a usable instance
    pub fn validate(&self) -> Result<()> {
        if self.n == 0 || self.m == 0 || self.nbar == 0 {
            return Err(param_err!("dimensions must be non-zero"));
        }
        if self.q < 4 {
            return Err(param_err!("q = {} is too small for 2-bit symbols", self.q));
        }
        if self.nbar * self.nbar * 2 != self.message_bytes * 8 {
            return Err(param_err!(
                "nbar^2 * 2 bits ({}) must equal message length ({} bits)",
                self.nbar * self.nbar * 2,
                self.message_bytes * 8
            ));
        }
        if self.seed_bytes == 0 {
            return Err(param_err!("seed must be at least one byte"));
        }
        Ok(())
    }
}

impl Default for FrodoParams {
    fn default() -> Self {
        Self::reference()
    }
}
