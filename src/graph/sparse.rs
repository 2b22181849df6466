//! Sparse adjacency matrix.
//!
//! Stores the matrix twice, compressed by rows and compressed by columns
//! (the column form is the CSR of the transpose), so both row and column
//! visits cost O(degree).

use super::{check_weight, AdjacencyMatrix, DenseGraph};
use crate::error::{Error, Result};
use crate::linalg::CsrMatrix;

#[derive(Debug, Clone, PartialEq)]
pub struct SparseGraph {
    by_row: CsrMatrix,
    by_col: CsrMatrix,
}

impl SparseGraph {
    /// Build an `n x n` graph from `(row, col, weight)` triplets.
    ///
    /// Duplicate coordinates are summed and explicit zeros dropped.
    pub fn from_triplets<I>(n: usize, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        let mut coo = Vec::new();
        for (r, c, v) in entries {
            if r >= n || c >= n {
                return Err(Error::IndexOutOfBounds {
                    index: r.max(c),
                    len: n,
                });
            }
            check_weight(r, c, v)?;
            coo.push((r, c, v));
        }
        Ok(Self::from_checked_coo(n, coo))
    }

    /// Build from the compressed-column layout (`col_ptr` of length `n + 1`,
    /// `row_indices` and `values` of length `nnz`).
    pub fn from_csc(
        n: usize,
        col_ptr: &[usize],
        row_indices: &[usize],
        values: &[f64],
    ) -> Result<Self> {
        if col_ptr.len() != n + 1 {
            return Err(Error::MalformedStructure(format!(
                "col_ptr has length {}, expected {}",
                col_ptr.len(),
                n + 1
            )));
        }
        if row_indices.len() != values.len() {
            return Err(Error::MalformedStructure(format!(
                "{} row indices for {} values",
                row_indices.len(),
                values.len()
            )));
        }
        if col_ptr[0] != 0 || col_ptr[n] != values.len() {
            return Err(Error::MalformedStructure(
                "col_ptr must start at 0 and end at nnz".into(),
            ));
        }
        // every window must be in range before any index is read
        if let Some(col) = col_ptr
            .windows(2)
            .position(|w| w[0] > w[1] || w[1] > values.len())
        {
            return Err(Error::MalformedStructure(format!(
                "col_ptr is not a non-decreasing offset list at column {}",
                col
            )));
        }

        let mut coo = Vec::with_capacity(values.len());
        for col in 0..n {
            for k in col_ptr[col]..col_ptr[col + 1] {
                let row = row_indices[k];
                if row >= n {
                    return Err(Error::IndexOutOfBounds { index: row, len: n });
                }
                check_weight(row, col, values[k])?;
                coo.push((row, col, values[k]));
            }
        }
        Ok(Self::from_checked_coo(n, coo))
    }

    pub fn from_dense(dense: &DenseGraph) -> Self {
        let n = dense.rows();
        let mut coo = Vec::new();
        for r in 0..n {
            dense.for_each_in_row(r, |c, v| coo.push((r, c, v)));
        }
        Self::from_checked_coo(n, coo)
    }

    fn from_checked_coo(n: usize, coo: Vec<(usize, usize, f64)>) -> Self {
        let summed = CsrMatrix::from_coo(n, n, coo);
        // drop entries that are (or summed to) zero
        let rows = (0..n)
            .map(|r| {
                let (cols, values) = summed.row(r);
                cols.iter()
                    .zip(values)
                    .filter(|(_, v)| **v != 0.0)
                    .map(|(c, v)| (*c, *v))
                    .collect()
            })
            .collect();
        let by_row = CsrMatrix::from_rows(n, rows);
        let by_col = by_row.transpose();
        Self { by_row, by_col }
    }

    /// Row-compressed view.
    pub fn csr(&self) -> &CsrMatrix {
        &self.by_row
    }
}

impl AdjacencyMatrix for SparseGraph {
    #[inline]
    fn rows(&self) -> usize {
        self.by_row.rows()
    }

    #[inline]
    fn cols(&self) -> usize {
        self.by_row.cols()
    }

    #[inline]
    fn coeff(&self, row: usize, col: usize) -> f64 {
        self.by_row.get(row, col)
    }

    fn for_each_in_row<F: FnMut(usize, f64)>(&self, row: usize, mut f: F) {
        let (cols, values) = self.by_row.row(row);
        for (&c, &v) in cols.iter().zip(values) {
            f(c, v);
        }
    }

    fn for_each_in_col<F: FnMut(usize, f64)>(&self, col: usize, mut f: F) {
        let (rows, values) = self.by_col.row(col);
        for (&r, &v) in rows.iter().zip(values) {
            f(r, v);
        }
    }

    fn nnz(&self) -> usize {
        self.by_row.nnz()
    }
}
