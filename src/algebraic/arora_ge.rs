//! Arora-Ge attack: turn every noisy sample into an exact polynomial equation
//!
//! The ideal of the sample polynomials is solved by the cheapest route that
//! reaches it:
//!
//! 1. tiny systems go straight to Buchberger ([`groebner_basis`]);
//! 2. otherwise, if raising the system to degree `|E|`, `|E|+1` or `|E|+2`
//!    gives at least as many products as monomials, one XL elimination
//!    ([`xl_reduce`]) exposes the secret;
//! 3. otherwise the errors of k samples are guessed. Each guess turns k
//!    samples into linear equations that eliminate k unknowns, and the
//!    remaining samples are linearised in the n − k unknowns left. A guess
//!    is accepted only if every sample's error then lies in `E`.
//!
//! Buchberger on the full system is the last resort when no route fits the
//! budgets below.

use tracing::{debug, info};

use crate::error::{param_err, LweError, Result};
use crate::math::modular::is_prime;
use crate::math::{ModQ, ZMatrix};

use super::groebner::{groebner_basis, linear_interreduce};
use super::poly::{field_inverse, MPoly};
use super::xl::{monomial_count, read_linear_factors, xl_reduce};

/// Systems with at most this many monomials go straight to Buchberger
const BUCHBERGER_MONOMIALS: usize = 120;

/// Widest Macaulay matrix the XL step will build
const MAX_XL_MONOMIALS: usize = 1000;

/// Most error guesses the hybrid step will try
const MAX_GUESSES: usize = 1 << 16;

/// One polynomial `∏_{e∈E} (b_i − ⟨a_i, x⟩ − e)` per sample
///
/// Every polynomial vanishes at the secret because the error of each
/// sample lies in `errors`.
pub fn arora_ge_system(a: &ZMatrix, b: &[i64], errors: &[i64], q: u64) -> Vec<MPoly> {
    let n = a.cols();
    (0..a.rows())
        .map(|i| {
            let neg_row: Vec<i64> = a.row(i).iter().map(|&x| -x).collect();
            errors.iter().fold(MPoly::constant(1, n, q), |acc, &e| {
                acc.mul(&MPoly::linear(&neg_row, b[i] - e, q))
            })
        })
        .collect()
}

/// Recover the secret from samples whose errors all lie in `errors`
///
/// Coordinates come back centered into (-q/2, q/2].
///
/// # Errors
/// `InvalidParameters` unless q is prime; `NoLinearFactorsFound` when the
/// ideal does not pin down every coordinate.
pub fn arora_ge_attack(a: &ZMatrix, b: &[i64], errors: &[i64], q: u64) -> Result<Vec<i64>> {
    if !is_prime(q) {
        return Err(param_err!("Arora-Ge needs a prime modulus, got {}", q));
    }
    if errors.is_empty() {
        return Err(param_err!("error set must not be empty"));
    }
    if a.rows() != b.len() {
        return Err(param_err!("A has {} rows but there are {} samples", a.rows(), b.len()));
    }

    let n = a.cols();
    let secret = solve_system(a, b, errors, q);

    let found = secret.iter().filter(|s| s.is_some()).count();
    if found < n {
        return Err(LweError::NoLinearFactorsFound { found, needed: n });
    }
    info!(n, m = a.rows(), "Arora-Ge recovered the secret");
    Ok(secret.into_iter().flatten().map(|x| ModQ::to_signed(x, q)).collect())
}

fn solve_system(a: &ZMatrix, b: &[i64], errors: &[i64], q: u64) -> Vec<Option<u64>> {
    let (m, n) = (a.rows(), a.cols());
    let degree = errors.len() as u32;
    let system = arora_ge_system(a, b, errors, q);

    if monomial_count(n, degree) <= BUCHBERGER_MONOMIALS {
        let basis = groebner_basis(&system);
        debug!(n, m, basis = basis.len(), "Groebner basis computed");
        return read_linear_factors(&basis, n);
    }

    if let Some(xl_degree) = xl_degree(n, m, degree) {
        let values = read_linear_factors(&xl_reduce(&system, xl_degree), n);
        debug!(n, m, xl_degree, found = values.iter().flatten().count(), "XL elimination done");
        if values.iter().all(Option::is_some) {
            return values;
        }
    }

    if let Some(k) = guess_count(n, m, errors.len()) {
        return match guess_and_linearize(a, b, errors, q, k) {
            Some(x) => x.into_iter().map(Some).collect(),
            None => vec![None; n],
        };
    }

    debug!(n, m, "no cheap route, running Buchberger on the full system");
    read_linear_factors(&groebner_basis(&system), n)
}

/// Smallest XL degree whose Macaulay matrix has enough rows
fn xl_degree(n: usize, m: usize, degree: u32) -> Option<u32> {
    (degree..=degree + 2).find(|&d| {
        let cols = monomial_count(n, d);
        let rows = m.saturating_mul(monomial_count(n, d - degree));
        cols <= MAX_XL_MONOMIALS && rows.saturating_add(1) >= cols
    })
}

/// Smallest number of guessed samples after which linearisation has
/// enough equations
fn guess_count(n: usize, m: usize, set_size: usize) -> Option<usize> {
    let degree = set_size as u32;
    (1..=n.min(m))
        .take_while(|&k| set_size.checked_pow(k as u32).is_some_and(|g| g <= MAX_GUESSES))
        .find(|&k| m - k + 1 >= monomial_count(n - k, degree))
}

/// Guessed samples solved for their pivot unknowns:
/// `x_{pivots[r]} = rhs_r − Σ_f reduced[r][f]·x_f` with
/// `rhs = transform · (b_S − g)`
struct Substitution {
    samples: Vec<usize>,
    pivots: Vec<usize>,
    free: Vec<usize>,
    reduced: Vec<Vec<u64>>,
    transform: Vec<Vec<u64>>,
}

impl Substitution {
    /// Pick the first k samples with independent rows of A
    fn new(a: &[Vec<u64>], k: usize, q: u64) -> Option<Self> {
        let n = a.first().map_or(0, Vec::len);

        let mut echelon: Vec<Vec<u64>> = Vec::new();
        let mut samples = Vec::with_capacity(k);
        for (i, row) in a.iter().enumerate() {
            if samples.len() == k {
                break;
            }
            let mut row = row.clone();
            if insert_independent(&mut echelon, &mut row, n, q).is_some() {
                samples.push(i);
            }
        }
        if samples.len() < k {
            return None;
        }

        // [A_S | I_k] in reduced echelon form gives both R and T
        let mut rows: Vec<Vec<u64>> = samples
            .iter()
            .enumerate()
            .map(|(r, &i)| {
                let mut row = a[i].clone();
                row.extend((0..k).map(|j| u64::from(j == r)));
                row
            })
            .collect();
        let pivots = reduce_rows(&mut rows, n, q);
        let free = (0..n).filter(|j| !pivots.contains(j)).collect();

        Some(Self {
            samples,
            pivots,
            free,
            reduced: rows.iter().map(|row| row[..n].to_vec()).collect(),
            transform: rows.iter().map(|row| row[n..].to_vec()).collect(),
        })
    }
}

/// Reduce `row` against the echelon rows and keep it if it is independent;
/// returns its pivot column
fn insert_independent(echelon: &mut Vec<Vec<u64>>, row: &mut [u64], cols: usize, q: u64) -> Option<usize> {
    for e in echelon.iter() {
        let Some(p) = e[..cols].iter().position(|&x| x != 0) else {
            continue;
        };
        let f = row[p];
        if f != 0 {
            for (x, &y) in row.iter_mut().zip(e) {
                *x = ModQ::sub(*x, ModQ::mul(f, y, q), q);
            }
        }
    }
    let p = row[..cols].iter().position(|&x| x != 0)?;
    let inv = field_inverse(row[p], q);
    for x in row.iter_mut() {
        *x = ModQ::mul(*x, inv, q);
    }
    echelon.push(row.to_vec());
    Some(p)
}

/// Reduced row echelon form over the first `cols` columns; returns the
/// pivot column of each row
fn reduce_rows(rows: &mut [Vec<u64>], cols: usize, q: u64) -> Vec<usize> {
    let mut pivots = Vec::with_capacity(rows.len());
    let mut rank = 0;
    for c in 0..cols {
        let Some(p) = (rank..rows.len()).find(|&r| rows[r][c] != 0) else {
            continue;
        };
        rows.swap(rank, p);
        let inv = field_inverse(rows[rank][c], q);
        for x in rows[rank].iter_mut() {
            *x = ModQ::mul(*x, inv, q);
        }
        let pivot_row = rows[rank].clone();
        for (r, row) in rows.iter_mut().enumerate() {
            let f = row[c];
            if r == rank || f == 0 {
                continue;
            }
            for (x, &y) in row.iter_mut().zip(&pivot_row) {
                *x = ModQ::sub(*x, ModQ::mul(f, y, q), q);
            }
        }
        pivots.push(c);
        rank += 1;
        if rank == rows.len() {
            break;
        }
    }
    pivots
}

/// Guess the errors of k samples, linearise the rest, keep the guess whose
/// solution explains every sample
fn guess_and_linearize(a: &ZMatrix, b: &[i64], errors: &[i64], q: u64, k: usize) -> Option<Vec<u64>> {
    let (m, n) = (a.rows(), a.cols());
    let rows: Vec<Vec<u64>> = (0..m)
        .map(|i| a.row(i).iter().map(|&x| ModQ::from_signed(x, q)).collect())
        .collect();
    let b: Vec<u64> = b.iter().map(|&x| ModQ::from_signed(x, q)).collect();
    let error_set: Vec<u64> = errors.iter().map(|&e| ModQ::from_signed(e, q)).collect();

    let sub = Substitution::new(&rows, k, q)?;
    let rest: Vec<usize> = (0..m).filter(|i| !sub.samples.contains(i)).collect();

    // ⟨a_i, x⟩ = Σ_r a_i[p_r]·rhs_r + Σ_f a'_i[f]·x_f
    let reduced_a: Vec<i64> = rest
        .iter()
        .flat_map(|&i| sub.free.iter().map(move |&f| (i, f)))
        .map(|(i, f)| {
            let eliminated = sub
                .pivots
                .iter()
                .zip(&sub.reduced)
                .fold(0, |acc, (&p, r)| ModQ::add(acc, ModQ::mul(rows[i][p], r[f], q), q));
            ModQ::sub(rows[i][f], eliminated, q) as i64
        })
        .collect();
    let reduced_a = ZMatrix::from_vec(rest.len(), sub.free.len(), reduced_a);

    let guesses = errors.len().pow(k as u32);
    debug!(n, m, k, guesses, free = sub.free.len(), "guessing sample errors");

    let mut digits = vec![0usize; k];
    for attempt in 0..guesses {
        let shifted: Vec<u64> = sub
            .samples
            .iter()
            .zip(&digits)
            .map(|(&i, &d)| ModQ::sub(b[i], error_set[d], q))
            .collect();
        let rhs: Vec<u64> = sub
            .transform
            .iter()
            .map(|t| t.iter().zip(&shifted).fold(0, |acc, (&x, &y)| ModQ::add(acc, ModQ::mul(x, y, q), q)))
            .collect();
        let reduced_b: Vec<i64> = rest
            .iter()
            .map(|&i| {
                let known = sub
                    .pivots
                    .iter()
                    .zip(&rhs)
                    .fold(0, |acc, (&p, &v)| ModQ::add(acc, ModQ::mul(rows[i][p], v, q), q));
                ModQ::sub(b[i], known, q) as i64
            })
            .collect();

        let system = arora_ge_system(&reduced_a, &reduced_b, errors, q);
        let basis = linear_interreduce(&system, sub.free.len(), q);
        let values = read_linear_factors(&basis, sub.free.len());

        if values.iter().all(Option::is_some) {
            let mut x = vec![0u64; n];
            for (&f, v) in sub.free.iter().zip(values.into_iter().flatten()) {
                x[f] = v;
            }
            for (r, &p) in sub.pivots.iter().enumerate() {
                let dependent = sub
                    .free
                    .iter()
                    .fold(0, |acc, &f| ModQ::add(acc, ModQ::mul(sub.reduced[r][f], x[f], q), q));
                x[p] = ModQ::sub(rhs[r], dependent, q);
            }
            if explains_samples(&rows, &b, &error_set, &x, q) {
                debug!(attempt, "error guess accepted");
                return Some(x);
            }
        }

        // next guess, odometer style
        for d in digits.iter_mut() {
            *d += 1;
            if *d < errors.len() {
                break;
            }
            *d = 0;
        }
    }
    None
}

/// Every `b_i − ⟨a_i, x⟩` lies in the error set
fn explains_samples(a: &[Vec<u64>], b: &[u64], error_set: &[u64], x: &[u64], q: u64) -> bool {
    a.iter().zip(b).all(|(row, &bi)| {
        let ax = row.iter().zip(x).fold(0, |acc, (&r, &v)| ModQ::add(acc, ModQ::mul(r, v, q), q));
        error_set.contains(&ModQ::sub(bi, ax, q))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attack::{LweInstance, SecretDistribution};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    const Q: u64 = 65537;

    #[test]
    fn test_system_vanishes_at_secret() {
        let mut rng = ChaCha20Rng::seed_from_u64(41);
        let inst = LweInstance::generate(3, 6, Q, SecretDistribution::Uniform, &[-1, 0, 1], &mut rng);
        let point: Vec<u64> = inst.secret.iter().map(|&s| ModQ::from_signed(s, Q)).collect();
        for p in arora_ge_system(&inst.a, &inst.b, &[-1, 0, 1], Q) {
            assert_eq!(p.degree(), Some(3));
            assert_eq!(p.evaluate(&point), 0);
        }
    }

    #[test]
    fn test_recovers_small_secret() {
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let inst = LweInstance::generate(3, 40, Q, SecretDistribution::Uniform, &[-1, 0, 1], &mut rng);
        let s = arora_ge_attack(&inst.a, &inst.b, &[-1, 0, 1], Q).unwrap();
        assert!(inst.check_secret(&s));
    }

    #[test]
    fn test_needs_buchberger_steps() {
        // 12 cubics in 3 unknowns: fewer equations than cubic monomials
        let mut rng = ChaCha20Rng::seed_from_u64(43);
        let inst = LweInstance::generate(3, 12, Q, SecretDistribution::Uniform, &[-1, 0, 1], &mut rng);
        let s = arora_ge_attack(&inst.a, &inst.b, &[-1, 0, 1], Q).unwrap();
        assert!(inst.check_secret(&s));
    }

    #[test]
    fn test_composite_modulus_rejected() {
        let a = ZMatrix::identity(2);
        let err = arora_ge_attack(&a, &[1, 2], &[0], 1 << 15).unwrap_err();
        assert!(matches!(err, LweError::InvalidParameters(_)));
    }

    #[test]
    fn test_underdetermined_fails() {
        // a single sample cannot fix two coordinates
        let a = ZMatrix::from_rows(vec![vec![3, 5]]);
        let err = arora_ge_attack(&a, &[8], &[0], Q).unwrap_err();
        assert!(matches!(err, LweError::NoLinearFactorsFound { needed: 2, .. }));
    }

    #[test]
    fn test_route_selection() {
        // n = 8, m = 80: 720 degree-4 products over 495 monomials
        assert_eq!(xl_degree(8, 80, 3), Some(4));
        // n = 8, m = 40: degree 5 would need 1287 columns
        assert_eq!(xl_degree(8, 40, 3), None);
        // n = 15, m = 150: degree 4 is short of rows, degree 5 is too wide
        assert_eq!(xl_degree(15, 150, 3), None);
        // guessing 8 samples leaves 142 cubics in 7 unknowns (120 monomials)
        assert_eq!(guess_count(15, 150, 3), Some(8));
        assert_eq!(guess_count(8, 40, 3), Some(4));
        // linearising needs more guesses than the budget allows
        assert_eq!(guess_count(40, 45, 3), None);
    }

    #[test]
    fn test_substitution_eliminates_guessed_samples() {
        let q = 101;
        let a: Vec<Vec<u64>> = vec![vec![1, 2, 3], vec![2, 4, 6], vec![0, 1, 1], vec![5, 0, 7]];
        let sub = Substitution::new(&a, 2, q).unwrap();
        // row 1 is a multiple of row 0 and is skipped
        assert_eq!(sub.samples, vec![0, 2]);
        assert_eq!(sub.pivots, vec![0, 1]);
        assert_eq!(sub.free, vec![2]);
        assert!(Substitution::new(&a, 4, q).is_none());
    }

    #[test]
    fn test_guess_and_linearize_direct() {
        let mut rng = ChaCha20Rng::seed_from_u64(44);
        // 3 guessed samples leave 27 cubics in 3 unknowns (20 monomials)
        let inst = LweInstance::generate(6, 30, Q, SecretDistribution::Uniform, &[-1, 0, 1], &mut rng);
        assert_eq!(guess_count(6, 30, 3), Some(3));
        let x = guess_and_linearize(&inst.a, &inst.b, &[-1, 0, 1], Q, 3).unwrap();
        let signed: Vec<i64> = x.iter().map(|&v| ModQ::to_signed(v, Q)).collect();
        assert!(inst.check_secret(&signed));
    }
}
