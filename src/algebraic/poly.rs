//! Multivariate polynomials over GF(q) in degree-reverse-lexicographic order

use std::cmp::Ordering;
use std::fmt;

use crate::math::ModQ;

/// Exponent vector x_0^{e_0} ⋯ x_{n-1}^{e_{n-1}} with its total degree
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Monomial {
    degree: u32,
    exps: Vec<u32>,
}

impl Monomial {
    pub fn one(nvars: usize) -> Self {
        Self {
            degree: 0,
            exps: vec![0; nvars],
        }
    }

    /// The variable x_i
    pub fn var(i: usize, nvars: usize) -> Self {
        let mut exps = vec![0; nvars];
        exps[i] = 1;
        Self { degree: 1, exps }
    }

    pub fn from_exps(exps: Vec<u32>) -> Self {
        Self {
            degree: exps.iter().sum(),
            exps,
        }
    }

    pub fn degree(&self) -> u32 {
        self.degree
    }

    pub fn exps(&self) -> &[u32] {
        &self.exps
    }

    pub fn is_one(&self) -> bool {
        self.degree == 0
    }

    pub fn mul(&self, other: &Monomial) -> Monomial {
        Monomial {
            degree: self.degree + other.degree,
            exps: self.exps.iter().zip(&other.exps).map(|(a, b)| a + b).collect(),
        }
    }

    /// True when `self` divides `other`
    pub fn divides(&self, other: &Monomial) -> bool {
        self.degree <= other.degree && self.exps.iter().zip(&other.exps).all(|(a, b)| a <= b)
    }

    /// `other / self`, assuming `self.divides(other)`
    pub fn quotient_of(&self, other: &Monomial) -> Monomial {
        Monomial {
            degree: other.degree - self.degree,
            exps: other.exps.iter().zip(&self.exps).map(|(a, b)| a - b).collect(),
        }
    }

    pub fn lcm(&self, other: &Monomial) -> Monomial {
        Monomial::from_exps(self.exps.iter().zip(&other.exps).map(|(&a, &b)| a.max(b)).collect())
    }

    /// No variable occurs in both
    pub fn is_coprime(&self, other: &Monomial) -> bool {
        self.exps.iter().zip(&other.exps).all(|(&a, &b)| a == 0 || b == 0)
    }

    /// Index of the single variable of a degree-1 monomial
    pub fn as_variable(&self) -> Option<usize> {
        if self.degree != 1 {
            return None;
        }
        self.exps.iter().position(|&e| e == 1)
    }
}

impl Ord for Monomial {
    /// degrevlex: higher total degree wins; on a tie, the monomial with the
    /// smaller exponent in the last differing variable is larger
    fn cmp(&self, other: &Self) -> Ordering {
        self.degree.cmp(&other.degree).then_with(|| {
            for (a, b) in self.exps.iter().zip(&other.exps).rev() {
                if a != b {
                    return b.cmp(a);
                }
            }
            Ordering::Equal
        })
    }
}

impl PartialOrd for Monomial {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_one() {
            return write!(f, "1");
        }
        let mut first = true;
        for (i, &e) in self.exps.iter().enumerate() {
            if e == 0 {
                continue;
            }
            if !first {
                write!(f, "*")?;
            }
            first = false;
            if e == 1 {
                write!(f, "x{}", i)?;
            } else {
                write!(f, "x{}^{}", i, e)?;
            }
        }
        Ok(())
    }
}

/// Polynomial over GF(q); terms sorted by strictly decreasing monomial,
/// coefficients in [1, q)
#[derive(Clone, PartialEq, Eq)]
pub struct MPoly {
    nvars: usize,
    q: u64,
    terms: Vec<(Monomial, u64)>,
}

impl MPoly {
    pub fn zero(nvars: usize, q: u64) -> Self {
        Self {
            nvars,
            q,
            terms: Vec::new(),
        }
    }

    pub fn constant(c: i64, nvars: usize, q: u64) -> Self {
        Self::from_terms(vec![(Monomial::one(nvars), ModQ::from_signed(c, q))], nvars, q)
    }

    /// Affine form `c + Σ coeffs[i]·x_i`
    pub fn linear(coeffs: &[i64], c: i64, q: u64) -> Self {
        let nvars = coeffs.len();
        let mut terms: Vec<(Monomial, u64)> = coeffs
            .iter()
            .enumerate()
            .map(|(i, &a)| (Monomial::var(i, nvars), ModQ::from_signed(a, q)))
            .collect();
        terms.push((Monomial::one(nvars), ModQ::from_signed(c, q)));
        Self::from_terms(terms, nvars, q)
    }

    /// Build from unsorted terms; like monomials are merged, zeros dropped
    pub fn from_terms(mut terms: Vec<(Monomial, u64)>, nvars: usize, q: u64) -> Self {
        terms.sort_by(|a, b| b.0.cmp(&a.0));
        let mut merged: Vec<(Monomial, u64)> = Vec::with_capacity(terms.len());
        for (mono, c) in terms {
            if let Some((last, acc)) = merged.last_mut() {
                if *last == mono {
                    *acc = ModQ::add(*acc, c % q, q);
                    continue;
                }
            }
            merged.push((mono, c % q));
        }
        merged.retain(|(_, c)| *c != 0);
        Self {
            nvars,
            q,
            terms: merged,
        }
    }

    pub fn nvars(&self) -> usize {
        self.nvars
    }

    pub fn modulus(&self) -> u64 {
        self.q
    }

    pub fn terms(&self) -> &[(Monomial, u64)] {
        &self.terms
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Leading monomial and coefficient
    pub fn leading(&self) -> Option<&(Monomial, u64)> {
        self.terms.first()
    }

    pub fn leading_monomial(&self) -> Option<&Monomial> {
        self.terms.first().map(|(m, _)| m)
    }

    /// Everything but the leading term
    pub fn tail(&self) -> MPoly {
        MPoly {
            nvars: self.nvars,
            q: self.q,
            terms: self.terms.iter().skip(1).cloned().collect(),
        }
    }

    pub fn degree(&self) -> Option<u32> {
        self.terms.iter().map(|(m, _)| m.degree()).max()
    }

    /// Coefficient of the constant term
    pub fn constant_coefficient(&self) -> u64 {
        match self.terms.last() {
            Some((m, c)) if m.is_one() => *c,
            _ => 0,
        }
    }

    /// Scale so the leading coefficient is 1; q must be prime
    pub fn monic(&self) -> Self {
        match self.terms.first() {
            Some(&(_, lc)) if lc != 1 => self.scale(field_inverse(lc, self.q)),
            _ => self.clone(),
        }
    }

    pub fn scale(&self, c: u64) -> Self {
        let c = c % self.q;
        if c == 0 {
            return Self::zero(self.nvars, self.q);
        }
        Self {
            nvars: self.nvars,
            q: self.q,
            terms: self
                .terms
                .iter()
                .map(|(m, a)| (m.clone(), ModQ::mul(*a, c, self.q)))
                .collect(),
        }
    }

    pub fn add(&self, other: &MPoly) -> MPoly {
        self.combine(other, 1)
    }

    pub fn sub(&self, other: &MPoly) -> MPoly {
        self.combine(other, self.q - 1)
    }

    /// `self + c·other` by merging the sorted term lists
    fn combine(&self, other: &MPoly, c: u64) -> MPoly {
        let q = self.q;
        let mut out = Vec::with_capacity(self.terms.len() + other.terms.len());
        let (mut i, mut j) = (0, 0);
        while i < self.terms.len() || j < other.terms.len() {
            let ord = match (self.terms.get(i), other.terms.get(j)) {
                (Some(a), Some(b)) => a.0.cmp(&b.0),
                (Some(_), None) => Ordering::Greater,
                _ => Ordering::Less,
            };
            match ord {
                Ordering::Greater => {
                    out.push(self.terms[i].clone());
                    i += 1;
                }
                Ordering::Less => {
                    let (m, b) = &other.terms[j];
                    out.push((m.clone(), ModQ::mul(*b, c, q)));
                    j += 1;
                }
                Ordering::Equal => {
                    let sum = ModQ::add(self.terms[i].1, ModQ::mul(other.terms[j].1, c, q), q);
                    if sum != 0 {
                        out.push((self.terms[i].0.clone(), sum));
                    }
                    i += 1;
                    j += 1;
                }
            }
        }
        out.retain(|(_, a)| *a != 0);
        MPoly {
            nvars: self.nvars,
            q,
            terms: out,
        }
    }

    /// `mono·self`
    pub fn mul_monomial(&self, mono: &Monomial) -> MPoly {
        // multiplying by a monomial keeps the term order
        MPoly {
            nvars: self.nvars,
            q: self.q,
            terms: self.terms.iter().map(|(m, a)| (m.mul(mono), *a)).collect(),
        }
    }

    /// `self − c·mono·other`, the elementary reduction step
    pub fn sub_scaled_shifted(&self, c: u64, mono: &Monomial, other: &MPoly) -> MPoly {
        self.combine(&other.mul_monomial(mono), ModQ::negate(c % self.q, self.q))
    }

    pub fn mul(&self, other: &MPoly) -> MPoly {
        let mut terms = Vec::with_capacity(self.terms.len() * other.terms.len());
        for (ma, a) in &self.terms {
            for (mb, b) in &other.terms {
                terms.push((ma.mul(mb), ModQ::mul(*a, *b, self.q)));
            }
        }
        MPoly::from_terms(terms, self.nvars, self.q)
    }

    /// Evaluate at a point given as residues mod q
    pub fn evaluate(&self, point: &[u64]) -> u64 {
        let q = self.q;
        self.terms.iter().fold(0, |acc, (m, c)| {
            let value = m
                .exps()
                .iter()
                .zip(point)
                .fold(*c, |v, (&e, &x)| ModQ::mul(v, ModQ::pow(x, e as u64, q), q));
            ModQ::add(acc, value, q)
        })
    }
}

impl fmt::Debug for MPoly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        for (i, (m, c)) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            if m.is_one() {
                write!(f, "{}", c)?;
            } else {
                write!(f, "{}*{:?}", c, m)?;
            }
        }
        Ok(())
    }
}

/// Inverse in GF(q) by Fermat's little theorem; q must be prime
pub(crate) fn field_inverse(a: u64, q: u64) -> u64 {
    ModQ::pow(a, q - 2, q)
}
