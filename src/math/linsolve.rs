//! Linear systems over Z/qZ for an arbitrary modulus.
//!
//! q need not be prime: FrodoKEM moduli are powers of two, where most
//! pivots are units but some are not. Elimination therefore only uses
//! unimodular extended-gcd row operations, and every non-unit pivot `g`
//! pushes its annihilator row `(q / gcd(g, q)) · row` back into the pool.
//! The resulting echelon form has the Howell property: the rows left over
//! after the leading columns are exhausted span *every* element of the row
//! module that vanishes on those columns. Back-substitution can then pick
//! any admissible value per pivot without painting itself into a corner,
//! and the leftover rows of `[Aᵀ | I]` generate the full kernel.

use tracing::warn;

use crate::error::{LweError, Result};

use super::matrix::ZMatrix;
use super::modular::{ext_gcd, gcd, ModQ};

/// Solution of `A·x ≡ b (mod q)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModSolution {
    /// One solution, free coordinates set to zero
    pub particular: Vec<u64>,
    /// Generators of the kernel of A over Z/qZ
    pub kernel: Vec<Vec<u64>>,
}

impl ModSolution {
    /// True when the particular solution is the only one
    pub fn is_unique(&self) -> bool {
        self.kernel.is_empty()
    }
}

struct Echelon {
    /// (pivot column, row) in increasing pivot column order
    pivots: Vec<(usize, Vec<u64>)>,
    /// Rows that vanish on every leading column
    residual: Vec<Vec<u64>>,
}

fn is_zero(row: &[u64]) -> bool {
    row.iter().all(|&x| x == 0)
}

/// Replace (p, r) by (s·p + t·r, (b/g)·p − (a/g)·r) where a = p[c], b = r[c].
///
/// The transform has determinant −1, so it is invertible over Z/qZ. The
/// first output carries gcd(a, b) at column c, the second carries zero.
fn combine(p: &[u64], r: &[u64], c: usize, q: u64) -> (Vec<u64>, Vec<u64>) {
    let (a, b) = (p[c] as i128, r[c] as i128);
    let (g, s, t) = ext_gcd(a, b);
    let to_mod = |x: i128| x.rem_euclid(q as i128) as u64;
    let (s, t) = (to_mod(s), to_mod(t));
    let (a_g, b_g) = (to_mod(a / g), to_mod(b / g));

    let new_p = p
        .iter()
        .zip(r)
        .map(|(&x, &y)| ModQ::add(ModQ::mul(s, x, q), ModQ::mul(t, y, q), q))
        .collect();
    let new_r = p
        .iter()
        .zip(r)
        .map(|(&x, &y)| ModQ::sub(ModQ::mul(b_g, x, q), ModQ::mul(a_g, y, q), q))
        .collect();
    (new_p, new_r)
}

fn howell_echelon(rows: Vec<Vec<u64>>, lead_cols: usize, q: u64) -> Echelon {
    let mut pool = rows;
    let mut pivots = Vec::new();

    for c in 0..lead_cols {
        let mut pivot: Option<Vec<u64>> = None;
        let mut rest = Vec::with_capacity(pool.len());

        for row in pool.drain(..) {
            if row[c] == 0 {
                rest.push(row);
                continue;
            }
            pivot = Some(match pivot.take() {
                None => row,
                Some(p) => {
                    let (p, r) = combine(&p, &row, c, q);
                    if !is_zero(&r) {
                        rest.push(r);
                    }
                    p
                }
            });
        }
        pool = rest;

        if let Some(p) = pivot {
            let d = gcd(p[c], q);
            if d != 1 {
                let annihilator: Vec<u64> = p.iter().map(|&x| ModQ::mul(x, q / d, q)).collect();
                if !is_zero(&annihilator) {
                    pool.push(annihilator);
                }
            }
            pivots.push((c, p));
        }
    }

    Echelon {
        pivots,
        residual: pool,
    }
}

/// Lift an integer matrix into Z/qZ row by row, with optional trailing columns
fn lift_rows(a: &ZMatrix, q: u64) -> Vec<Vec<u64>> {
    (0..a.rows())
        .map(|i| a.row(i).iter().map(|&x| ModQ::from_signed(x, q)).collect())
        .collect()
}

/// Generators of `{x : A·x ≡ 0 (mod q)}`
pub fn kernel(a: &ZMatrix, q: u64) -> Vec<Vec<u64>> {
    let (m, n) = (a.rows(), a.cols());
    let rows: Vec<Vec<u64>> = lift_rows(&a.transpose(), q)
        .into_iter()
        .enumerate()
        .map(|(j, mut row)| {
            row.extend((0..n).map(|k| u64::from(k == j) % q));
            row
        })
        .collect();

    howell_echelon(rows, m, q)
        .residual
        .into_iter()
        .map(|row| row[m..].to_vec())
        .filter(|v| !is_zero(v))
        .collect()
}

/// Solve `A·x ≡ b (mod q)` for x
///
/// # Errors
/// `InconsistentLinearSystem` if no x satisfies the system.
pub fn solve_right(a: &ZMatrix, b: &[i64], q: u64) -> Result<ModSolution> {
    let (m, n) = (a.rows(), a.cols());
    assert_eq!(b.len(), m, "right-hand side length must match row count");

    let rows: Vec<Vec<u64>> = lift_rows(a, q)
        .into_iter()
        .zip(b)
        .map(|(mut row, &bi)| {
            row.push(ModQ::from_signed(bi, q));
            row
        })
        .collect();

    let echelon = howell_echelon(rows, n, q);
    if echelon.residual.iter().any(|row| row[n] != 0) {
        return Err(LweError::InconsistentLinearSystem);
    }

    let mut x = vec![0u64; n];
    for (c, row) in echelon.pivots.iter().rev() {
        let mut rhs = row[n];
        for k in c + 1..n {
            rhs = ModQ::sub(rhs, ModQ::mul(row[k], x[k], q), q);
        }
        let g = row[*c];
        let d = gcd(g, q);
        if rhs % d != 0 {
            return Err(LweError::InconsistentLinearSystem);
        }
        let q_d = q / d;
        let inv = ModQ::inverse((g / d) % q_d, q_d).ok_or(LweError::InconsistentLinearSystem)?;
        x[*c] = ModQ::mul(rhs / d, inv, q_d);
    }

    let kernel = kernel(a, q);
    if !kernel.is_empty() {
        warn!(
            generators = kernel.len(),
            "linear system is underdetermined, returning one particular solution"
        );
    }

    Ok(ModSolution {
        particular: x,
        kernel,
    })
}

/// `A·x mod q`
pub fn mat_vec_mod(a: &ZMatrix, x: &[u64], q: u64) -> Vec<u64> {
    assert_eq!(a.cols(), x.len());
    (0..a.rows())
        .map(|i| {
            a.row(i).iter().zip(x).fold(0u64, |acc, (&aij, &xj)| {
                ModQ::add(acc, ModQ::mul(ModQ::from_signed(aij, q), xj, q), q)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rand::SeedableRng;

    fn random_matrix<R: Rng>(rng: &mut R, rows: usize, cols: usize, q: u64) -> ZMatrix {
        let data = (0..rows * cols).map(|_| rng.gen_range(0..q) as i64).collect();
        ZMatrix::from_vec(rows, cols, data)
    }

    fn check_solution(a: &ZMatrix, b: &[i64], sol: &ModSolution, q: u64) {
        let lhs = mat_vec_mod(a, &sol.particular, q);
        let rhs: Vec<u64> = b.iter().map(|&v| ModQ::from_signed(v, q)).collect();
        assert_eq!(lhs, rhs);
        for k in &sol.kernel {
            assert!(mat_vec_mod(a, k, q).iter().all(|&v| v == 0));
        }
    }

    #[test]
    fn test_overdetermined_prime_modulus() {
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(1);
        let q = 65537;
        let a = random_matrix(&mut rng, 30, 10, q);
        let s: Vec<u64> = (0..10).map(|_| rng.gen_range(0..q)).collect();
        let b: Vec<i64> = mat_vec_mod(&a, &s, q).into_iter().map(|v| v as i64).collect();

        let sol = solve_right(&a, &b, q).unwrap();
        assert!(sol.is_unique());
        assert_eq!(sol.particular, s);
    }

    #[test]
    fn test_power_of_two_modulus() {
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(2);
        let q = 1 << 15;
        let a = random_matrix(&mut rng, 40, 12, q);
        let s: Vec<u64> = (0..12).map(|_| rng.gen_range(0..q)).collect();
        let b: Vec<i64> = mat_vec_mod(&a, &s, q).into_iter().map(|v| v as i64).collect();

        let sol = solve_right(&a, &b, q).unwrap();
        check_solution(&a, &b, &sol, q);
        assert_eq!(sol.particular, s);
    }

    #[test]
    fn test_non_unit_pivot() {
        // 2x ≡ 4 (mod 8): x ∈ {2, 6}
        let q = 8;
        let a = ZMatrix::from_rows(vec![vec![2]]);
        let sol = solve_right(&a, &[4], q).unwrap();
        check_solution(&a, &[4], &sol, q);
        assert!(!sol.is_unique());
        assert_eq!(sol.kernel, vec![vec![4]]);
    }

    #[test]
    fn test_coupled_non_unit_pivots() {
        let q = 8;
        // 2x + y ≡ 2, 4y ≡ 0 (mod 8)
        let a = ZMatrix::from_rows(vec![vec![2, 1], vec![0, 4]]);
        let sol = solve_right(&a, &[2, 0], q).unwrap();
        check_solution(&a, &[2, 0], &sol, q);

        // 2x + y ≡ 0 needs y even, 2y ≡ 2 needs y odd
        let a = ZMatrix::from_rows(vec![vec![2, 1], vec![0, 2]]);
        assert!(matches!(
            solve_right(&a, &[0, 2], q),
            Err(LweError::InconsistentLinearSystem)
        ));
    }

    #[test]
    fn test_inconsistent_system() {
        let q = 65537;
        let a = ZMatrix::from_rows(vec![vec![1, 2], vec![2, 4]]);
        assert!(matches!(
            solve_right(&a, &[1, 3], q),
            Err(LweError::InconsistentLinearSystem)
        ));
    }

    #[test]
    fn test_underdetermined_kernel() {
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(3);
        let q = 1 << 15;
        let a = random_matrix(&mut rng, 4, 7, q);
        let s: Vec<u64> = (0..7).map(|_| rng.gen_range(0..q)).collect();
        let b: Vec<i64> = mat_vec_mod(&a, &s, q).into_iter().map(|v| v as i64).collect();

        let sol = solve_right(&a, &b, q).unwrap();
        check_solution(&a, &b, &sol, q);
        assert!(sol.kernel.len() >= 3);
    }
}
