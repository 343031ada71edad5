//! Raw LWE instances for attack experiments

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::math::{ModQ, ZMatrix};

/// Distribution of the secret vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecretDistribution {
    /// Uniform in [-bound, bound]
    Small { bound: i64 },
    /// Uniform in [0, q)
    Uniform,
    /// Uniform in [0, p)
    Bounded { p: i64 },
}

impl SecretDistribution {
    fn sample<R: Rng + ?Sized>(&self, q: u64, rng: &mut R) -> i64 {
        match *self {
            Self::Small { bound } => rng.gen_range(-bound..=bound),
            Self::Uniform => rng.gen_range(0..q as i64),
            Self::Bounded { p } => rng.gen_range(0..p),
        }
    }
}

/// `b = A·s + e mod q` together with the planted secret and error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LweInstance {
    /// m×n, entries uniform in [0, q)
    pub a: ZMatrix,
    /// Samples, reduced mod q
    pub b: Vec<i64>,
    pub q: u64,
    pub secret: Vec<i64>,
    pub error: Vec<i64>,
}

impl LweInstance {
    /// Draw an instance with `m` samples of an `n`-dimensional secret
    ///
    /// Each error entry is chosen uniformly from `errors`.
    pub fn generate<R: Rng + ?Sized>(
        n: usize,
        m: usize,
        q: u64,
        secret: SecretDistribution,
        errors: &[i64],
        rng: &mut R,
    ) -> Self {
        assert!(!errors.is_empty(), "error set must not be empty");

        let s: Vec<i64> = (0..n).map(|_| secret.sample(q, rng)).collect();
        let e: Vec<i64> = (0..m)
            .map(|_| *errors.choose(rng).unwrap_or(&0))
            .collect();
        let a = ZMatrix::from_vec(m, n, (0..m * n).map(|_| rng.gen_range(0..q as i64)).collect());

        let s_col = ZMatrix::from_vec(n, 1, s.clone());
        let b = a
            .mul(&s_col)
            .as_slice()
            .iter()
            .zip(&e)
            .map(|(&x, &ei)| (x + ei).rem_euclid(q as i64))
            .collect();

        Self {
            a,
            b,
            q,
            secret: s,
            error: e,
        }
    }

    /// Secret dimension
    pub fn n(&self) -> usize {
        self.a.cols()
    }

    /// Number of samples
    pub fn m(&self) -> usize {
        self.a.rows()
    }

    /// True when `candidate ≡ secret (mod q)` coordinate-wise
    pub fn check_secret(&self, candidate: &[i64]) -> bool {
        candidate.len() == self.secret.len()
            && candidate
                .iter()
                .zip(&self.secret)
                .all(|(&x, &s)| ModQ::from_signed(x - s, self.q) == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_generate_consistent() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let inst = LweInstance::generate(5, 9, 97, SecretDistribution::Bounded { p: 7 }, &[-3, 0, 3], &mut rng);
        assert_eq!((inst.n(), inst.m()), (5, 9));
        assert!(inst.secret.iter().all(|&s| (0..7).contains(&s)));
        assert!(inst.error.iter().all(|e| [-3, 0, 3].contains(e)));
        for j in 0..9 {
            let dot: i64 = (0..5).map(|i| inst.a.get(j, i) * inst.secret[i]).sum();
            assert_eq!((dot + inst.error[j]).rem_euclid(97), inst.b[j]);
        }
    }

    #[test]
    fn test_check_secret_mod_q() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let inst = LweInstance::generate(4, 8, 97, SecretDistribution::Small { bound: 2 }, &[0], &mut rng);
        let shifted: Vec<i64> = inst.secret.iter().map(|&s| s + 97).collect();
        assert!(inst.check_secret(&shifted));
        let mut wrong = inst.secret.clone();
        wrong[0] += 1;
        assert!(!inst.check_secret(&wrong));
        assert!(!inst.check_secret(&inst.secret[..3]));
    }
}
