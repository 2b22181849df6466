//! Read-only adjacency-matrix views.
//!
//! Every algorithm in the crate is written once against [`AdjacencyMatrix`]
//! and works unchanged on either encoding:
//!
//! ```text
//! DenseGraph  (nalgebra DMatrix<f64>)  ─┐
//!                                        ├─► AdjacencyMatrix ─► neighbors / activation / spreadgram / walk
//! SparseGraph (CSR rows + CSC columns) ─┘
//! ```
//!
//! Storage convention: row = target, col = source. An edge `x → y` is stored
//! at `graph[y, x]`, so row `y` lists what flows into `y` and column `x` lists
//! what `x` points at. Both encodings must give identical results for
//! identical logical content.
//!
//! ## Modules
//!
//! - [`dense`]: `DenseGraph`
//! - [`sparse`]: `SparseGraph`
//! - [`neighbors`]: neighbor indicator / list extraction

pub mod dense;
pub mod neighbors;
pub mod sparse;

pub use dense::DenseGraph;
pub use neighbors::{neighbor_list, neighbors, NeighborMode};
pub use sparse::SparseGraph;

use nalgebra::DMatrix;

use crate::error::{Error, Result};

/// Capability interface over a square adjacency matrix.
///
/// `coeff(y, x) != 0` means an edge from source `x` to target `y`.
///
/// The `for_each_*` visitors walk the stored **nonzero** coefficients of one
/// row or column in ascending index order; zero coefficients are never
/// visited, whatever the encoding.
pub trait AdjacencyMatrix: Sync {
    fn rows(&self) -> usize;

    fn cols(&self) -> usize;

    /// Coefficient at `(row, col)`, 0.0 when absent.
    fn coeff(&self, row: usize, col: usize) -> f64;

    fn for_each_in_row<F: FnMut(usize, f64)>(&self, row: usize, f: F);

    fn for_each_in_col<F: FnMut(usize, f64)>(&self, col: usize, f: F);

    /// Number of nonzero coefficients.
    fn nnz(&self) -> usize {
        (0..self.rows())
            .map(|r| {
                let mut count = 0;
                self.for_each_in_row(r, |_, _| count += 1);
                count
            })
            .sum()
    }

    /// Dense copy of row `i`.
    fn row(&self, i: usize) -> Vec<f64> {
        let mut out = vec![0.0; self.cols()];
        self.for_each_in_row(i, |c, v| out[c] = v);
        out
    }

    /// Dense copy of column `j`.
    fn col(&self, j: usize) -> Vec<f64> {
        let mut out = vec![0.0; self.rows()];
        self.for_each_in_col(j, |r, v| out[r] = v);
        out
    }

    fn has_self_loops(&self) -> bool {
        (0..self.rows().min(self.cols())).any(|i| self.coeff(i, i) != 0.0)
    }

    fn to_dense(&self) -> DMatrix<f64> {
        let mut dense = DMatrix::zeros(self.rows(), self.cols());
        for r in 0..self.rows() {
            self.for_each_in_row(r, |c, v| dense[(r, c)] = v);
        }
        dense
    }
}

/// Node count of a square graph, or [`Error::NotSquare`].
pub fn node_count<G: AdjacencyMatrix>(graph: &G) -> Result<usize> {
    if graph.rows() != graph.cols() {
        return Err(Error::NotSquare {
            rows: graph.rows(),
            cols: graph.cols(),
        });
    }
    Ok(graph.rows())
}

pub(crate) fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::DimensionMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

pub(crate) fn check_node(index: usize, len: usize) -> Result<()> {
    if index >= len {
        return Err(Error::IndexOutOfBounds { index, len });
    }
    Ok(())
}

pub(crate) fn check_weight(row: usize, col: usize, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidWeight { row, col, value });
    }
    Ok(())
}
