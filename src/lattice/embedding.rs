//! Lattice bases built from LWE samples

use crate::math::ZMatrix;

/// Embedding lattice for one column of samples `b ≈ A·s mod q`
///
/// Returns the (n+1+m)×(m+1) basis
///
/// ```text
/// [ b_0 … b_{m-1} | q ]
/// [      Aᵀ       | 0 ]   n rows
/// [    q·I_m      | 0 ]   m rows
/// ```
///
/// The row combination `row_0 − Σ s_i·row_{1+i} + Σ k_j·row_{n+1+j}` equals
/// `[e, q]` with `e = b − A·s`, so the error vector appears as a short
/// lattice vector whenever it is small.
pub fn build_embedding(a: &ZMatrix, b: &[i64], q: u64) -> ZMatrix {
    let m = a.rows();
    let n = a.cols();
    assert_eq!(b.len(), m, "sample column has {} entries, A has {} rows", b.len(), m);

    let q_i = q as i64;
    let mut basis = ZMatrix::zeros(n + 1 + m, m + 1);

    for (j, &bj) in b.iter().enumerate() {
        basis.set(0, j, bj.rem_euclid(q_i));
    }
    basis.set(0, m, q_i);

    for i in 0..n {
        for j in 0..m {
            basis.set(1 + i, j, a.get(j, i).rem_euclid(q_i));
        }
    }

    for j in 0..m {
        basis.set(n + 1 + j, j, q_i);
    }
    basis
}

/// q-ary lattice `{ y : y ≡ A·x mod q }` of the m×n matrix A
///
/// The (m+n)×m basis stacks `q·I_m` over `Aᵀ mod q`; it is generating but not
/// linearly independent, so reduction drops n rows.
pub fn qary_basis(a: &ZMatrix, q: u64) -> ZMatrix {
    let m = a.rows();
    let n = a.cols();
    let q_i = q as i64;

    let mut basis = ZMatrix::zeros(m + n, m);
    for i in 0..m {
        basis.set(i, i, q_i);
    }
    for y in 0..n {
        for x in 0..m {
            basis.set(m + y, x, a.get(x, y).rem_euclid(q_i));
        }
    }
    basis
}
