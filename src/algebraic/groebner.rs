//! Buchberger's algorithm over GF(q)
//!
//! The input is first interreduced by Gaussian elimination on its Macaulay
//! matrix, which on heavily overdetermined systems already produces most of
//! the basis. S-pairs are then processed lowest lcm degree first, skipping
//! pairs with coprime leading monomials and pairs covered by the chain
//! criterion. The result is the reduced, monic Groebner basis.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::debug;

use crate::math::ModQ;

use super::poly::{field_inverse, MPoly, Monomial};

/// Reduced Groebner basis of the ideal generated by `polys`
///
/// All polynomials must share the same variable count and prime modulus.
/// The result is sorted by increasing leading monomial; `[1]` means the
/// system has no common root.
pub fn groebner_basis(polys: &[MPoly]) -> Vec<MPoly> {
    let Some(first) = polys.first() else {
        return Vec::new();
    };
    let (nvars, q) = (first.nvars(), first.modulus());

    let mut basis = linear_interreduce(polys, nvars, q);
    if basis.iter().any(is_unit) {
        return vec![MPoly::constant(1, nvars, q)];
    }

    // pairs keyed by (lcm degree, i, j) so the cheapest pair comes first
    let mut queue: BTreeSet<(u32, usize, usize)> = BTreeSet::new();
    let mut pending: HashSet<(usize, usize)> = HashSet::new();
    for j in 1..basis.len() {
        for i in 0..j {
            push_pair(&basis, &mut queue, &mut pending, i, j);
        }
    }

    let mut reductions = 0usize;
    while let Some(&key) = queue.iter().next() {
        queue.remove(&key);
        let (_, i, j) = key;
        pending.remove(&(i, j));

        let (lm_i, lm_j) = match (basis[i].leading_monomial(), basis[j].leading_monomial()) {
            (Some(a), Some(b)) => (a.clone(), b.clone()),
            _ => continue,
        };
        if lm_i.is_coprime(&lm_j) {
            continue;
        }
        let lcm = lm_i.lcm(&lm_j);
        if chain_criterion(&basis, &pending, i, j, &lcm) {
            continue;
        }

        let s = s_polynomial(&basis[i], &basis[j], &lcm);
        let h = normal_form(&s, &basis);
        reductions += 1;
        if h.is_zero() {
            continue;
        }
        if is_unit(&h) {
            return vec![MPoly::constant(1, nvars, q)];
        }

        basis.push(h.monic());
        let t = basis.len() - 1;
        for i in 0..t {
            push_pair(&basis, &mut queue, &mut pending, i, t);
        }
    }

    debug!(size = basis.len(), reductions, "Buchberger finished");
    reduce_basis(basis)
}

fn is_unit(p: &MPoly) -> bool {
    p.leading_monomial().is_some_and(|m| m.is_one())
}

fn push_pair(
    basis: &[MPoly],
    queue: &mut BTreeSet<(u32, usize, usize)>,
    pending: &mut HashSet<(usize, usize)>,
    i: usize,
    j: usize,
) {
    if let (Some(a), Some(b)) = (basis[i].leading_monomial(), basis[j].leading_monomial()) {
        queue.insert((a.lcm(b).degree(), i, j));
        pending.insert((i, j));
    }
}

/// Some g_k with LM(g_k) | lcm whose pairs with i and j are both done
fn chain_criterion(basis: &[MPoly], pending: &HashSet<(usize, usize)>, i: usize, j: usize, lcm: &Monomial) -> bool {
    let key = |a: usize, b: usize| if a < b { (a, b) } else { (b, a) };
    basis.iter().enumerate().any(|(k, g)| {
        k != i
            && k != j
            && g.leading_monomial().is_some_and(|m| m.divides(lcm))
            && !pending.contains(&key(i, k))
            && !pending.contains(&key(j, k))
    })
}

/// (lcm/LT(f))·f − (lcm/LT(g))·g for monic f and g
fn s_polynomial(f: &MPoly, g: &MPoly, lcm: &Monomial) -> MPoly {
    let zero = MPoly::zero(f.nvars(), f.modulus());
    let (Some((lm_f, _)), Some((lm_g, _))) = (f.leading(), g.leading()) else {
        return zero;
    };
    let left = zero.sub_scaled_shifted(f.modulus() - 1, &lm_f.quotient_of(lcm), f);
    left.sub_scaled_shifted(1, &lm_g.quotient_of(lcm), g)
}

/// Fully reduce `f` modulo the monic polynomials in `basis`
pub fn normal_form(f: &MPoly, basis: &[MPoly]) -> MPoly {
    let q = f.modulus();
    let mut p = f.clone();
    let mut remainder: Vec<(Monomial, u64)> = Vec::new();

    while let Some((lm, lc)) = p.leading().cloned() {
        let divisor = basis.iter().find_map(|g| {
            g.leading()
                .filter(|(g_lm, _)| g_lm.divides(&lm))
                .map(|(g_lm, g_lc)| (g, g_lm.quotient_of(&lm), *g_lc))
        });
        match divisor {
            Some((g, shift, g_lc)) => {
                let c = ModQ::mul(lc, field_inverse(g_lc, q), q);
                p = p.sub_scaled_shifted(c, &shift, g);
            }
            None => {
                remainder.push((lm, lc));
                p = p.tail();
            }
        }
    }
    MPoly::from_terms(remainder, f.nvars(), q)
}

/// Row-reduce the coefficient matrix of `polys` over the monomials they use
///
/// Every returned polynomial is monic and no two share a leading monomial;
/// each leading monomial appears in no other returned polynomial.
pub fn linear_interreduce(polys: &[MPoly], nvars: usize, q: u64) -> Vec<MPoly> {
    let monomials: Vec<Monomial> = polys
        .iter()
        .flat_map(|p| p.terms().iter().map(|(m, _)| m.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .rev()
        .collect();
    let index: BTreeMap<&Monomial, usize> = monomials.iter().enumerate().map(|(i, m)| (m, i)).collect();
    let cols = monomials.len();

    let mut rows: Vec<Vec<u64>> = polys
        .iter()
        .map(|p| {
            let mut row = vec![0u64; cols];
            for (m, c) in p.terms() {
                row[index[m]] = *c;
            }
            row
        })
        .collect();

    let mut rank = 0;
    for col in 0..cols {
        let Some(pivot) = (rank..rows.len()).find(|&r| rows[r][col] != 0) else {
            continue;
        };
        rows.swap(rank, pivot);
        let inv = field_inverse(rows[rank][col], q);
        for x in rows[rank][col..].iter_mut() {
            *x = ModQ::mul(*x, inv, q);
        }
        let pivot_row = rows[rank].clone();
        for (r, row) in rows.iter_mut().enumerate() {
            let factor = row[col];
            if r == rank || factor == 0 {
                continue;
            }
            for (x, &p) in row[col..].iter_mut().zip(&pivot_row[col..]) {
                *x = ModQ::sub(*x, ModQ::mul(factor, p, q), q);
            }
        }
        rank += 1;
        if rank == rows.len() {
            break;
        }
    }

    rows.truncate(rank);
    rows.into_iter()
        .map(|row| {
            let terms = row
                .into_iter()
                .enumerate()
                .filter(|(_, c)| *c != 0)
                .map(|(i, c)| (monomials[i].clone(), c))
                .collect();
            MPoly::from_terms(terms, nvars, q)
        })
        .collect()
}

/// Minimal, monic, fully interreduced basis sorted by leading monomial
fn reduce_basis(basis: Vec<MPoly>) -> Vec<MPoly> {
    let mut basis: Vec<MPoly> = basis.into_iter().filter(|p| !p.is_zero()).map(|p| p.monic()).collect();
    basis.sort_by(|a, b| a.leading_monomial().cmp(&b.leading_monomial()));

    // drop elements whose leading monomial is divisible by an earlier one
    let mut minimal: Vec<MPoly> = Vec::new();
    for p in basis {
        let covered = p.leading_monomial().is_some_and(|lm| {
            minimal
                .iter()
                .any(|g| g.leading_monomial().is_some_and(|m| m.divides(lm)))
        });
        if !covered {
            minimal.push(p);
        }
    }

    let mut reduced = Vec::with_capacity(minimal.len());
    for i in 0..minimal.len() {
        let others: Vec<MPoly> = minimal
            .iter()
            .enumerate()
            .filter(|&(k, _)| k != i)
            .map(|(_, g)| g.clone())
            .collect();
        reduced.push(normal_form(&minimal[i], &others).monic());
    }
    reduced
}

#[cfg(test)]
mod tests {
    use super::*;

    const Q: u64 = 65537;

    fn mono(exps: Vec<u32>) -> Monomial {
        Monomial::from_exps(exps)
    }

    #[test]
    fn test_linear_system() {
        // x0 + x1 = 3, x0 - x1 = 1  =>  x0 = 2, x1 = 1
        let f = MPoly::linear(&[1, 1], -3, Q);
        let g = MPoly::linear(&[1, -1], -1, Q);
        let gb = groebner_basis(&[f, g]);
        assert_eq!(gb, vec![MPoly::linear(&[0, 1], -1, Q), MPoly::linear(&[1, 0], -2, Q)]);
    }

    #[test]
    fn test_inconsistent_system() {
        let f = MPoly::linear(&[1, 0], -1, Q);
        let g = MPoly::linear(&[1, 0], -2, Q);
        let gb = groebner_basis(&[f, g]);
        assert_eq!(gb, vec![MPoly::constant(1, 2, Q)]);
    }

    #[test]
    fn test_quadratic_system() {
        // x0^2 - 1 = 0 and x0 - x1 = 0 and x1 - 1 = 0
        let sq = MPoly::linear(&[1, 0], -1, Q).mul(&MPoly::linear(&[1, 0], 1, Q));
        let f = MPoly::linear(&[1, -1], 0, Q);
        let g = MPoly::linear(&[0, 1], -1, Q);
        let gb = groebner_basis(&[sq, f, g]);
        assert_eq!(gb.len(), 2);
        assert!(gb.iter().all(|p| p.degree() == Some(1)));
    }

    #[test]
    fn test_s_pair_needed() {
        // ideal (x0*x1 - 1, x1^2 - x1): Buchberger must discover x1 - 1 and x0 - 1
        let f = MPoly::from_terms(vec![(mono(vec![1, 1]), 1), (mono(vec![0, 0]), Q - 1)], 2, Q);
        let g = MPoly::from_terms(vec![(mono(vec![0, 2]), 1), (mono(vec![0, 1]), Q - 1)], 2, Q);
        let gb = groebner_basis(&[f, g]);
        assert_eq!(gb, vec![MPoly::linear(&[0, 1], -1, Q), MPoly::linear(&[1, 0], -1, Q)]);
    }

    #[test]
    fn test_normal_form_of_member_is_zero() {
        let f = MPoly::linear(&[1, 1], -3, Q);
        let g = MPoly::linear(&[1, -1], -1, Q);
        let gb = groebner_basis(&[f.clone(), g.clone()]);
        let member = f.mul(&g).add(&g.scale(7));
        assert!(normal_form(&member, &gb).is_zero());
    }

    #[test]
    fn test_linear_interreduce_distinct_leads() {
        let f = MPoly::linear(&[1, 2], 3, Q);
        let g = MPoly::linear(&[2, 4], 6, Q);
        let h = MPoly::linear(&[0, 1], 1, Q);
        let out = linear_interreduce(&[f, g, h], 2, Q);
        assert_eq!(out.len(), 2);
        assert_ne!(out[0].leading_monomial(), out[1].leading_monomial());
    }
}
