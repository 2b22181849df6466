//! Dense adjacency matrix backed by `nalgebra::DMatrix<f64>`.

use nalgebra::DMatrix;

use super::{check_weight, AdjacencyMatrix};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct DenseGraph {
    matrix: DMatrix<f64>,
}

impl DenseGraph {
    /// Wrap a square matrix of finite, non-negative weights.
    pub fn new(matrix: DMatrix<f64>) -> Result<Self> {
        if matrix.nrows() != matrix.ncols() {
            return Err(Error::NotSquare {
                rows: matrix.nrows(),
                cols: matrix.ncols(),
            });
        }
        for c in 0..matrix.ncols() {
            for r in 0..matrix.nrows() {
                check_weight(r, c, matrix[(r, c)])?;
            }
        }
        Ok(Self { matrix })
    }

    /// Build an `n x n` graph from row-major data.
    pub fn from_row_slice(n: usize, data: &[f64]) -> Result<Self> {
        if data.len() != n * n {
            return Err(Error::DimensionMismatch {
                what: "dense matrix data",
                expected: n * n,
                actual: data.len(),
            });
        }
        Self::new(DMatrix::from_row_slice(n, n, data))
    }

    /// Build an `n x n` graph from `(row, col, weight)` edges, all other entries 0.
    /// An edge `x → y` is passed as `(y, x, weight)`.
    pub fn from_edges<I>(n: usize, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        let mut matrix = DMatrix::zeros(n, n);
        for (r, c, v) in edges {
            if r >= n || c >= n {
                return Err(Error::IndexOutOfBounds {
                    index: r.max(c),
                    len: n,
                });
            }
            matrix[(r, c)] += v;
        }
        Self::new(matrix)
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    pub fn into_inner(self) -> DMatrix<f64> {
        self.matrix
    }
}

impl AdjacencyMatrix for DenseGraph {
    #[inline]
    fn rows(&self) -> usize {
        self.matrix.nrows()
    }

    #[inline]
    fn cols(&self) -> usize {
        self.matrix.ncols()
    }

    #[inline]
    fn coeff(&self, row: usize, col: usize) -> f64 {
        self.matrix[(row, col)]
    }

    fn for_each_in_row<F: FnMut(usize, f64)>(&self, row: usize, mut f: F) {
        for (c, &v) in self.matrix.row(row).iter().enumerate() {
            if v != 0.0 {
                f(c, v);
            }
        }
    }

    fn for_each_in_col<F: FnMut(usize, f64)>(&self, col: usize, mut f: F) {
        for (r, &v) in self.matrix.column(col).iter().enumerate() {
            if v != 0.0 {
                f(r, v);
            }
        }
    }

    fn to_dense(&self) -> DMatrix<f64> {
        self.matrix.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_square() {
        let err = DenseGraph::new(DMatrix::zeros(2, 3)).unwrap_err();
        assert!(matches!(err, Error::NotSquare { rows: 2, cols: 3 }));
    }

    #[test]
    fn test_rejects_negative_weight() {
        let err = DenseGraph::from_row_slice(2, &[0.0, -1.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidWeight { row: 0, col: 1, .. }));
    }

    #[test]
    fn test_row_and_col_access() {
        let g = DenseGraph::from_row_slice(3, &[0.0, 1.0, 0.0, 0.0, 0.0, 2.0, 3.0, 0.0, 0.0])
            .unwrap();
        assert_eq!(g.row(1), vec![0.0, 0.0, 2.0]);
        assert_eq!(g.col(0), vec![0.0, 0.0, 3.0]);
        assert_eq!(g.coeff(2, 0), 3.0);
        assert_eq!(g.nnz(), 3);
        assert!(!g.has_self_loops());
    }

    #[test]
    fn test_visitors_skip_zeros() {
        let g = DenseGraph::from_edges(4, vec![(0, 3, 1.0), (0, 1, 0.5)]).unwrap();
        let mut seen = Vec::new();
        g.for_each_in_row(0, |c, v| seen.push((c, v)));
        assert_eq!(seen, vec![(1, 0.5), (3, 1.0)]);
    }

    #[test]
    fn test_from_edges_out_of_range() {
        let err = DenseGraph::from_edges(2, vec![(0, 2, 1.0)]).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfBounds { index: 2, len: 2 }));
    }
}
