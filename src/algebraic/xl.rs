//! Linearisation of polynomial systems (XL)
//!
//! Every generator is multiplied by all monomials that keep it within a
//! target degree, and the resulting Macaulay matrix is row-reduced with
//! [`linear_interreduce`]. Once the products span every monomial but the
//! constant, the reduced rows are the linear polynomials `x_i − s_i` of the
//! unique root.

use super::groebner::linear_interreduce;
use super::poly::{field_inverse, MPoly, Monomial};
use crate::math::ModQ;

/// Number of monomials of degree at most `degree` in `nvars` variables,
/// saturating at `usize::MAX`
pub fn monomial_count(nvars: usize, degree: u32) -> usize {
    // C(nvars + degree, degree)
    let mut count: u128 = 1;
    for i in 1..=degree as u128 {
        count = count * (nvars as u128 + i) / i;
        if count > usize::MAX as u128 {
            return usize::MAX;
        }
    }
    count as usize
}

/// All monomials of degree at most `degree`, in no particular order
pub fn monomials_up_to(nvars: usize, degree: u32) -> Vec<Monomial> {
    fn extend(var: usize, remaining: u32, exps: &mut Vec<u32>, out: &mut Vec<Monomial>) {
        if var == exps.len() {
            out.push(Monomial::from_exps(exps.clone()));
            return;
        }
        for e in 0..=remaining {
            exps[var] = e;
            extend(var + 1, remaining - e, exps, out);
        }
        exps[var] = 0;
    }

    let mut out = Vec::with_capacity(monomial_count(nvars, degree).min(1 << 20));
    extend(0, degree, &mut vec![0; nvars], &mut out);
    out
}

/// Products `t·f` for every generator f and every monomial t with
/// `deg(t·f) ≤ degree`
pub fn macaulay_extend(polys: &[MPoly], degree: u32) -> Vec<MPoly> {
    let mut out = Vec::new();
    for p in polys {
        let Some(d) = p.degree() else {
            continue;
        };
        if d > degree {
            continue;
        }
        for t in monomials_up_to(p.nvars(), degree - d) {
            out.push(p.mul_monomial(&t));
        }
    }
    out
}

/// Row-reduced Macaulay matrix of `polys` at the given degree
pub fn xl_reduce(polys: &[MPoly], degree: u32) -> Vec<MPoly> {
    let Some(first) = polys.first() else {
        return Vec::new();
    };
    linear_interreduce(&macaulay_extend(polys, degree), first.nvars(), first.modulus())
}

/// Coordinates fixed by basis elements of the form `c·x_i + d`
///
/// A nonzero constant in `basis` means the system has no root, and every
/// coordinate comes back `None`.
pub fn read_linear_factors(basis: &[MPoly], nvars: usize) -> Vec<Option<u64>> {
    let mut values = vec![None; nvars];
    if basis.iter().any(|p| p.leading_monomial().is_some_and(Monomial::is_one)) {
        return values;
    }
    for p in basis {
        if let Some((i, value)) = linear_factor(p) {
            values[i] = Some(value);
        }
    }
    values
}

/// `c·x_i + d` gives `(i, −d/c)`
fn linear_factor(p: &MPoly) -> Option<(usize, u64)> {
    let q = p.modulus();
    let ((lead, c), rest) = p.terms().split_first()?;
    let i = lead.as_variable()?;
    let d = match rest {
        [] => 0,
        [(m, d)] if m.is_one() => *d,
        _ => return None,
    };
    Some((i, ModQ::mul(ModQ::negate(d, q), field_inverse(*c, q), q)))
}
