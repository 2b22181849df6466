//! Compressed Sparse Row storage.
//!
//! Used both as the row-side index of [`SparseGraph`](crate::graph::SparseGraph)
//! and as the activation-pattern matrix handed to the BiCGSTAB solver.
//!
//! Layout for a matrix with `m` rows and `nnz` stored entries:
//! - `row_ptr` has length `m + 1`; row `i` spans `row_ptr[i]..row_ptr[i + 1]`
//! - `col_indices` / `values` have length `nnz`, columns ascending within a row

use nalgebra::DMatrix;

#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    rows: usize,
    cols: usize,
    row_ptr: Vec<usize>,
    col_indices: Vec<usize>,
    values: Vec<f64>,
}

impl CsrMatrix {
    /// Build from COO `(row, col, value)` triplets. Duplicate coordinates are
    /// summed; entries must already be in bounds.
    pub fn from_coo<I>(rows: usize, cols: usize, entries: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        let mut sorted: Vec<_> = entries.into_iter().collect();
        sorted.sort_by_key(|(r, c, _)| (*r, *c));

        let mut row_ptr = vec![0usize; rows + 1];
        let mut col_indices = Vec::with_capacity(sorted.len());
        let mut values: Vec<f64> = Vec::with_capacity(sorted.len());
        let mut last: Option<(usize, usize)> = None;

        for (r, c, v) in sorted {
            debug_assert!(r < rows, "row index {} out of bounds (rows={})", r, rows);
            debug_assert!(c < cols, "column index {} out of bounds (cols={})", c, cols);
            if last == Some((r, c)) {
                if let Some(slot) = values.last_mut() {
                    *slot += v;
                }
                continue;
            }
            row_ptr[r + 1] += 1;
            col_indices.push(c);
            values.push(v);
            last = Some((r, c));
        }

        for i in 1..=rows {
            row_ptr[i] += row_ptr[i - 1];
        }

        Self {
            rows,
            cols,
            row_ptr,
            col_indices,
            values,
        }
    }

    /// Build from one entry list per row. Each list is sorted by column here;
    /// a column must not repeat within a row.
    pub fn from_rows(cols: usize, rows: Vec<Vec<(usize, f64)>>) -> Self {
        let n_rows = rows.len();
        let nnz = rows.iter().map(Vec::len).sum();
        let mut row_ptr = Vec::with_capacity(n_rows + 1);
        let mut col_indices = Vec::with_capacity(nnz);
        let mut values = Vec::with_capacity(nnz);

        row_ptr.push(0);
        for mut row in rows {
            row.sort_by_key(|(c, _)| *c);
            for (c, v) in row {
                debug_assert!(c < cols, "column index {} out of bounds (cols={})", c, cols);
                col_indices.push(c);
                values.push(v);
            }
            row_ptr.push(col_indices.len());
        }

        Self {
            rows: n_rows,
            cols,
            row_ptr,
            col_indices,
            values,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Column indices and values stored in row `i`.
    #[inline]
    pub fn row(&self, i: usize) -> (&[usize], &[f64]) {
        let span = self.row_ptr[i]..self.row_ptr[i + 1];
        (&self.col_indices[span.clone()], &self.values[span])
    }

    /// Stored value at `(row, col)`, 0.0 when absent.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        let (cols, values) = self.row(row);
        match cols.binary_search(&col) {
            Ok(pos) => values[pos],
            Err(_) => 0.0,
        }
    }

    /// `output = A * input`
    pub fn matvec_into(&self, input: &[f64], output: &mut [f64]) {
        debug_assert_eq!(input.len(), self.cols, "input dimension mismatch");
        debug_assert_eq!(output.len(), self.rows, "output dimension mismatch");

        for (row, out) in output.iter_mut().enumerate() {
            let (cols, values) = self.row(row);
            let mut sum = 0.0;
            for (&c, &v) in cols.iter().zip(values) {
                sum += v * input[c];
            }
            *out = sum;
        }
    }

    pub fn matvec(&self, input: &[f64]) -> Vec<f64> {
        let mut output = vec![0.0; self.rows];
        self.matvec_into(input, &mut output);
        output
    }

    /// Main diagonal (0.0 where nothing is stored).
    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.rows.min(self.cols))
            .map(|i| self.get(i, i))
            .collect()
    }

    pub fn transpose(&self) -> Self {
        let entries = (0..self.rows).flat_map(|r| {
            let (cols, values) = self.row(r);
            cols.iter()
                .zip(values)
                .map(move |(&c, &v)| (c, r, v))
                .collect::<Vec<_>>()
        });
        Self::from_coo(self.cols, self.rows, entries)
    }

    /// Drop row 0 and column 0, shifting the remaining indices down by one.
    pub fn without_first(&self) -> Self {
        let rows = (1..self.rows)
            .map(|r| {
                let (cols, values) = self.row(r);
                cols.iter()
                    .zip(values)
                    .filter(|(c, _)| **c > 0)
                    .map(|(&c, &v)| (c - 1, v))
                    .collect()
            })
            .collect();
        Self::from_rows(self.cols.saturating_sub(1), rows)
    }

    /// Euclidean norm of `b - A x`.
    pub fn residual_norm(&self, x: &[f64], b: &[f64]) -> f64 {
        self.matvec(x)
            .iter()
            .zip(b)
            .map(|(ax, bi)| (bi - ax) * (bi - ax))
            .sum::<f64>()
            .sqrt()
    }

    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut dense = DMatrix::zeros(self.rows, self.cols);
        for r in 0..self.rows {
            let (cols, values) = self.row(r);
            for (&c, &v) in cols.iter().zip(values) {
                dense[(r, c)] = v;
            }
        }
        dense
    }
}
