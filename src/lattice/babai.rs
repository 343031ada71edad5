//! Gram-Schmidt orthogonalization and Babai's nearest-plane algorithm

use crate::math::ZMatrix;

/// Gram-Schmidt vectors of the rows of `basis`, in floating point
#[derive(Debug, Clone)]
pub struct GramSchmidt {
    /// b*_i, one per basis row
    pub vectors: Vec<Vec<f64>>,

    /// ⟨b*_i, b*_i⟩
    pub norms_sq: Vec<f64>,
}

impl GramSchmidt {
    /// Orthogonalize the rows of a full-rank basis
    pub fn new(basis: &ZMatrix) -> Self {
        let mut vectors: Vec<Vec<f64>> = Vec::with_capacity(basis.rows());
        let mut norms_sq = Vec::with_capacity(basis.rows());

        for i in 0..basis.rows() {
            let b: Vec<f64> = basis.row(i).iter().map(|&x| x as f64).collect();
            let mut star = b.clone();
            for (prev, &norm) in vectors.iter().zip(&norms_sq) {
                if norm == 0.0 {
                    continue;
                }
                let mu = dot_f64(&b, prev) / norm;
                for (s, p) in star.iter_mut().zip(prev) {
                    *s -= mu * p;
                }
            }
            norms_sq.push(dot_f64(&star, &star));
            vectors.push(star);
        }

        Self { vectors, norms_sq }
    }
}

/// Lattice point close to `target` by Babai's nearest-plane algorithm
///
/// Walks the basis from the last row to the first; at each step the
/// residual is projected on b*_i, the coefficient rounded, and that many
/// copies of b_i subtracted. Returns `target − residual`, which is an
/// integer combination of the basis rows. The quality of the answer depends
/// on how well reduced the basis is.
pub fn nearest_plane(basis: &ZMatrix, gso: &GramSchmidt, target: &[i64]) -> Vec<i64> {
    assert_eq!(target.len(), basis.cols(), "target dimension mismatch");

    let mut residual = target.to_vec();
    for i in (0..basis.rows()).rev() {
        let norm = gso.norms_sq[i];
        if norm == 0.0 {
            continue;
        }
        let proj: f64 = residual
            .iter()
            .zip(&gso.vectors[i])
            .map(|(&t, &g)| t as f64 * g)
            .sum();
        let c = (proj / norm).round() as i64;
        if c != 0 {
            for (t, &b) in residual.iter_mut().zip(basis.row(i)) {
                *t -= c * b;
            }
        }
    }

    target.iter().zip(&residual).map(|(&t, &r)| t - r).collect()
}

fn dot_f64(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::LllReducer;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_gso_orthogonal() {
        let basis = ZMatrix::from_rows(vec![vec![3, 1, 0], vec![1, 2, 1], vec![0, 1, 4]]);
        let gso = GramSchmidt::new(&basis);
        for i in 0..3 {
            for j in 0..i {
                assert!(dot_f64(&gso.vectors[i], &gso.vectors[j]).abs() < 1e-9);
            }
        }
        assert_eq!(gso.norms_sq[0], 10.0);
    }

    #[test]
    fn test_exact_lattice_point_returned() {
        let basis = ZMatrix::from_rows(vec![vec![5, 0], vec![2, 7]]);
        let gso = GramSchmidt::new(&basis);
        // 3·(5,0) − 2·(2,7)
        let point = vec![11, -14];
        assert_eq!(nearest_plane(&basis, &gso, &point), point);
    }

    #[test]
    fn test_perturbed_point_recovered() {
        let mut rng = ChaCha20Rng::seed_from_u64(8);
        let dim = 10;
        let data = (0..dim * dim)
            .map(|k| if k % (dim + 1) == 0 { 101 } else { rng.gen_range(-20..=20) })
            .collect();
        let basis = LllReducer::default()
            .reduce(&ZMatrix::from_vec(dim, dim, data))
            .unwrap()
            .basis;
        let gso = GramSchmidt::new(&basis);

        for _ in 0..20 {
            let coeffs: Vec<i64> = (0..dim).map(|_| rng.gen_range(-5..=5)).collect();
            let point: Vec<i64> = (0..dim)
                .map(|c| (0..dim).map(|r| coeffs[r] * basis.get(r, c)).sum())
                .collect();
            let target: Vec<i64> = point.iter().map(|&x| x + rng.gen_range(-2..=2)).collect();
            assert_eq!(nearest_plane(&basis, &gso, &target), point);
        }
    }
}
