//! LLL (Lenstra-Lenstra-Lovász) lattice reduction
//!
//! The basis and its Gram matrix are kept exact (`i64` entries, `i128` inner
//! products); only the Gram-Schmidt data is floating point, and it is
//! recomputed from the exact Gram matrix whenever a row is revisited.
//!
//! # Algorithm
//!
//! 1. Size-reduce `b_k` against `b_0 … b_{k-1}` until every `|μ_kj| ≤ η`
//!    (repeating the pass while the recomputed coefficients still exceed η)
//! 2. If `b_k` became zero it is linearly dependent on the earlier rows and
//!    is dropped
//! 3. Lovász condition `‖b*_k‖² ≥ (δ − μ²_{k,k-1}) ‖b*_{k-1}‖²`: advance on
//!    success, otherwise swap `b_k` and `b_{k-1}` and step back
//!
//! Generating sets with more rows than the lattice rank are accepted; the
//! output has exactly one row per dimension of the spanned lattice.

use tracing::debug;

use crate::error::{LweError, Result};
use crate::math::{dot, ZMatrix};

/// Passes of the size-reduction loop on one row before giving up
const MAX_SIZE_REDUCTION_PASSES: usize = 64;

/// LLL reduction parameters
#[derive(Debug, Clone, Copy)]
pub struct LllReducer {
    /// Lovász constant, in (0.25, 1)
    pub delta: f64,

    /// Size-reduction bound, slightly above 1/2 to absorb rounding
    pub eta: f64,

    /// Cap on main-loop iterations
    pub max_iterations: usize,
}

/// Statistics collected during reduction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LllStats {
    /// Number of basis vector swaps
    pub swaps: usize,

    /// Number of `b_k -= x·b_j` operations
    pub size_reductions: usize,

    /// Rows dropped because they reduced to zero
    pub removed_rows: usize,

    /// Main-loop iterations
    pub iterations: usize,
}

/// Output of [`LllReducer::reduce`]
#[derive(Debug, Clone)]
pub struct ReducedBasis {
    pub basis: ZMatrix,
    pub stats: LllStats,
}

impl Default for LllReducer {
    fn default() -> Self {
        Self {
            delta: 0.99,
            eta: 0.51,
            max_iterations: 10_000_000,
        }
    }
}

impl LllReducer {
    pub fn new(delta: f64) -> Self {
        Self {
            delta,
            ..Self::default()
        }
    }

    /// Reduce the row lattice of `basis`
    pub fn reduce(&self, basis: &ZMatrix) -> Result<ReducedBasis> {
        if !(self.delta > 0.25 && self.delta < 1.0) {
            return Err(LweError::Reduction(format!(
                "delta must be in (0.25, 1), got {}",
                self.delta
            )));
        }
        if !(self.eta >= 0.5 && self.eta < self.delta.sqrt()) {
            return Err(LweError::Reduction(format!(
                "eta must be in [0.5, sqrt(delta)), got {}",
                self.eta
            )));
        }

        let mut ws = Workspace::new(basis);
        ws.run(self)?;

        debug!(
            rows_in = basis.rows(),
            rows_out = ws.basis.len(),
            swaps = ws.stats.swaps,
            size_reductions = ws.stats.size_reductions,
            removed = ws.stats.removed_rows,
            "LLL finished"
        );

        let cols = basis.cols();
        let data = ws.basis.concat();
        Ok(ReducedBasis {
            basis: ZMatrix::from_vec(ws.basis.len(), cols, data),
            stats: ws.stats,
        })
    }
}

/// Mutable reduction state
struct Workspace {
    basis: Vec<Vec<i64>>,

    /// Exact Gram matrix, kept symmetric
    gram: Vec<Vec<i128>>,

    /// r[i][j] = ⟨b_i, b*_j⟩ for j ≤ i; only rows below the cursor are valid
    r: Vec<Vec<f64>>,

    /// μ[i][j] = r[i][j] / r[j][j]
    mu: Vec<Vec<f64>>,

    stats: LllStats,
}

impl Workspace {
    fn new(basis: &ZMatrix) -> Self {
        let rows = basis.to_rows();
        let len = rows.len();
        let gram = (0..len)
            .map(|i| (0..len).map(|j| dot(&rows[i], &rows[j])).collect())
            .collect();

        Self {
            basis: rows,
            gram,
            r: vec![vec![0.0; len]; len],
            mu: vec![vec![0.0; len]; len],
            stats: LllStats::default(),
        }
    }

    fn run(&mut self, params: &LllReducer) -> Result<()> {
        // zero input rows carry no information
        let mut i = 0;
        while i < self.basis.len() {
            if self.gram[i][i] == 0 {
                self.remove_row(i);
            } else {
                i += 1;
            }
        }
        if self.basis.is_empty() {
            return Ok(());
        }

        self.r[0][0] = self.gram[0][0] as f64;
        let mut k = 1;

        while k < self.basis.len() {
            self.stats.iterations += 1;
            if self.stats.iterations > params.max_iterations {
                return Err(LweError::Reduction(format!(
                    "no convergence after {} iterations",
                    params.max_iterations
                )));
            }

            self.size_reduce(k, params.eta)?;

            if self.gram[k][k] == 0 {
                self.remove_row(k);
                continue;
            }

            let mu = self.mu[k][k - 1];
            if self.r[k][k] >= (params.delta - mu * mu) * self.r[k - 1][k - 1] {
                k += 1;
            } else {
                self.swap_rows(k);
                self.stats.swaps += 1;
                if k > 1 {
                    k -= 1;
                } else {
                    self.r[0][0] = self.gram[0][0] as f64;
                }
            }
        }
        Ok(())
    }

    /// Recompute r[k][..=k] and μ[k][..k] from the exact Gram matrix
    fn compute_row(&mut self, k: usize) {
        for j in 0..k {
            let mut acc = self.gram[k][j] as f64;
            for l in 0..j {
                acc -= self.mu[j][l] * self.r[k][l];
            }
            self.r[k][j] = acc;
            self.mu[k][j] = acc / self.r[j][j];
        }
        let mut acc = self.gram[k][k] as f64;
        for l in 0..k {
            acc -= self.mu[k][l] * self.r[k][l];
        }
        self.r[k][k] = acc;
    }

    fn size_reduce(&mut self, k: usize, eta: f64) -> Result<()> {
        for _ in 0..MAX_SIZE_REDUCTION_PASSES {
            self.compute_row(k);
            if self.mu[k][..k].iter().all(|m| m.abs() <= eta) {
                return Ok(());
            }

            for j in (0..k).rev() {
                let x = self.mu[k][j].round();
                if x == 0.0 {
                    continue;
                }
                if !x.is_finite() || x.abs() >= i64::MAX as f64 {
                    return Err(LweError::Reduction(format!(
                        "size-reduction coefficient {} out of range",
                        x
                    )));
                }
                self.sub_multiple(k, j, x as i64)?;
                for l in 0..j {
                    self.mu[k][l] -= x * self.mu[j][l];
                }
                self.mu[k][j] -= x;
                self.stats.size_reductions += 1;
            }
        }
        Err(LweError::Reduction(format!(
            "size reduction of row {} did not converge",
            k
        )))
    }

    /// b_k -= x·b_j, keeping the Gram matrix exact
    fn sub_multiple(&mut self, k: usize, j: usize, x: i64) -> Result<()> {
        let overflow = || LweError::Reduction("basis entry overflow".to_string());

        let (row_k, row_j) = if k > j {
            let (lo, hi) = self.basis.split_at_mut(k);
            (&mut hi[0], &lo[j])
        } else {
            let (lo, hi) = self.basis.split_at_mut(j);
            (&mut lo[k], &hi[0])
        };
        for (a, &b) in row_k.iter_mut().zip(row_j.iter()) {
            *a = x
                .checked_mul(b)
                .and_then(|xb| a.checked_sub(xb))
                .ok_or_else(overflow)?;
        }

        let x = x as i128;
        let g_kj = self.gram[k][j];
        let g_jj = self.gram[j][j];
        let g_kk = x
            .checked_mul(x)
            .and_then(|xx| xx.checked_mul(g_jj))
            .and_then(|t| self.gram[k][k].checked_add(t))
            .and_then(|t| x.checked_mul(2 * g_kj).and_then(|u| t.checked_sub(u)))
            .ok_or_else(overflow)?;

        for i in 0..self.basis.len() {
            if i == k {
                continue;
            }
            let v = x
                .checked_mul(self.gram[j][i])
                .and_then(|t| self.gram[k][i].checked_sub(t))
                .ok_or_else(overflow)?;
            self.gram[k][i] = v;
            self.gram[i][k] = v;
        }
        self.gram[k][k] = g_kk;
        Ok(())
    }

    /// Swap b_k and b_{k-1}
    fn swap_rows(&mut self, k: usize) {
        self.basis.swap(k, k - 1);
        self.gram.swap(k, k - 1);
        for row in self.gram.iter_mut() {
            row.swap(k, k - 1);
        }
    }

    fn remove_row(&mut self, k: usize) {
        self.basis.remove(k);
        self.gram.remove(k);
        for row in self.gram.iter_mut() {
            row.remove(k);
        }
        self.r.remove(k);
        self.mu.remove(k);
        self.stats.removed_rows += 1;
    }
}
