//! Small-error sampling for secret and error matrices

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::matrix::ZMatrix;

/// Distribution of the small entries of S, E and the ephemeral matrices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorDistribution {
    /// Uniform over [-bound, bound]
    Uniform { bound: u32 },
    /// Σ (bit - bit') over `pairs` independent fair bit pairs
    CenteredBinomial { pairs: u32 },
}

impl ErrorDistribution {
    /// Largest magnitude a sample can take
    pub fn bound(&self) -> i64 {
        match *self {
            Self::Uniform { bound } => bound as i64,
            Self::CenteredBinomial { pairs } => pairs as i64,
        }
    }

    /// Draw one sample
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        match *self {
            Self::Uniform { bound } => {
                let bound = bound as i64;
                rng.gen_range(-bound..=bound)
            }
            Self::CenteredBinomial { pairs } => (0..pairs)
                .map(|_| rng.gen::<bool>() as i64 - rng.gen::<bool>() as i64)
                .sum(),
        }
    }

    /// Sample a rows×cols matrix
    pub fn sample_matrix<R: Rng + ?Sized>(&self, rows: usize, cols: usize, rng: &mut R) -> ZMatrix {
        let data = (0..rows * cols).map(|_| self.sample(rng)).collect();
        ZMatrix::from_vec(rows, cols, data)
    }

    /// Sample a vector of length n
    pub fn sample_vec<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<i64> {
        (0..n).map(|_| self.sample(rng)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_samples_within_bound() {
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(42);
        for dist in [
            ErrorDistribution::Uniform { bound: 3 },
            ErrorDistribution::CenteredBinomial { pairs: 6 },
            ErrorDistribution::CenteredBinomial { pairs: 1 },
        ] {
            let samples = dist.sample_vec(5000, &mut rng);
            assert!(samples.iter().all(|s| s.abs() <= dist.bound()));
        }
    }

    #[test]
    fn test_uniform_hits_both_ends() {
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(43);
        let dist = ErrorDistribution::Uniform { bound: 3 };
        let samples = dist.sample_vec(2000, &mut rng);
        assert!(samples.contains(&3));
        assert!(samples.contains(&-3));
    }

    #[test]
    fn test_binomial_mean_near_zero() {
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(7);
        let dist = ErrorDistribution::CenteredBinomial { pairs: 6 };
        let samples = dist.sample_vec(10000, &mut rng);
        let mean = samples.iter().sum::<i64>() as f64 / samples.len() as f64;
        assert!(mean.abs() < 0.1, "mean {} should be close to 0", mean);
    }

    #[test]
    fn test_sample_matrix_shape() {
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(1);
        let m = ErrorDistribution::Uniform { bound: 1 }.sample_matrix(4, 3, &mut rng);
        assert_eq!((m.rows(), m.cols()), (4, 3));
        assert!(m.max_abs() <= 1);
    }
}
