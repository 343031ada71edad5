//! Modular arithmetic operations

/// Modular arithmetic operations over Z_q
pub struct ModQ;

impl ModQ {
    /// Add two values modulo q
    #[inline]
    pub fn add(a: u64, b: u64, q: u64) -> u64 {
        let sum = (a as u128) + (b as u128);
        (sum % (q as u128)) as u64
    }

    /// Subtract two values modulo q
    #[inline]
    pub fn sub(a: u64, b: u64, q: u64) -> u64 {
        if a >= b {
            a - b
        } else {
            q - (b - a)
        }
    }

    /// Multiply two values modulo q
    #[inline]
    pub fn mul(a: u64, b: u64, q: u64) -> u64 {
        let prod = (a as u128) * (b as u128);
        (prod % (q as u128)) as u64
    }

    /// Negate a value modulo q
    #[inline]
    pub fn negate(a: u64, q: u64) -> u64 {
        if a == 0 {
            0
        } else {
            q - a
        }
    }

    /// Convert a signed integer to its representation in Z_q
    #[inline]
    pub fn from_signed(val: i64, q: u64) -> u64 {
        (val as i128).rem_euclid(q as i128) as u64
    }

    /// Convert from Z_q to the centered representative in (-q/2, q/2]
    #[inline]
    pub fn to_signed(val: u64, q: u64) -> i64 {
        let val = val % q;
        if val <= q / 2 {
            val as i64
        } else {
            -((q - val) as i64)
        }
    }

    /// Center a signed integer into (-q/2, q/2]
    #[inline]
    pub fn center(val: i64, q: u64) -> i64 {
        Self::to_signed(Self::from_signed(val, q), q)
    }

    /// Reduce a value modulo q
    #[inline]
    pub fn reduce(a: u64, q: u64) -> u64 {
        a % q
    }

    /// `base^exp mod q` by square-and-multiply
    pub fn pow(base: u64, exp: u64, q: u64) -> u64 {
        let mut result = 1 % q;
        let mut base = base % q;
        let mut exp = exp;
        while exp > 0 {
            if exp & 1 == 1 {
                result = Self::mul(result, base, q);
            }
            base = Self::mul(base, base, q);
            exp >>= 1;
        }
        result
    }

    /// Multiplicative inverse of `a` modulo q, if it exists
    pub fn inverse(a: u64, q: u64) -> Option<u64> {
        let (g, s, _) = ext_gcd(a as i128 % q as i128, q as i128);
        if g != 1 {
            return None;
        }
        Some(s.rem_euclid(q as i128) as u64)
    }
}

/// Extended Euclid: returns `(g, s, t)` with `s·a + t·b = g = gcd(a, b) ≥ 0`
pub fn ext_gcd(a: i128, b: i128) -> (i128, i128, i128) {
    let (mut old_r, mut r) = (a, b);
    let (mut old_s, mut s) = (1i128, 0i128);
    let (mut old_t, mut t) = (0i128, 1i128);

    while r != 0 {
        let quotient = old_r / r;
        (old_r, r) = (r, old_r - quotient * r);
        (old_s, s) = (s, old_s - quotient * s);
        (old_t, t) = (t, old_t - quotient * t);
    }

    if old_r < 0 {
        (-old_r, -old_s, -old_t)
    } else {
        (old_r, old_s, old_t)
    }
}

/// Greatest common divisor
pub fn gcd(a: u64, b: u64) -> u64 {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Deterministic primality check by trial division
pub fn is_prime(q: u64) -> bool {
    if q < 2 {
        return false;
    }
    if q % 2 == 0 {
        return q == 2;
    }
    let mut d = 3u64;
    while d.saturating_mul(d) <= q {
        if q % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}
