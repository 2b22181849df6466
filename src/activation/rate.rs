//! Equilibrium activation rates.
//!
//! The ACT model reads `a(y) = Σ_x f(x, y) · a(x) + c(y)`. Collecting the
//! transfer activations of every adjacent pair into a pattern matrix `A`
//! with `-1` on the diagonal turns the fixed point into the linear system
//! `A · v = -(strength ⊙ stm)`, solved here with BiCGSTAB.

use nalgebra::DVector;
use tracing::warn;

use super::transfer::transfer;
use crate::config::SolverConfig;
use crate::error::{Error, Result};
use crate::graph::{check_len, neighbor_list, node_count, AdjacencyMatrix, NeighborMode};
use crate::linalg::{bicgstab, CsrMatrix};
use crate::parallel::Executor;

/// Solved equilibrium plus solver diagnostics.
#[derive(Debug, Clone)]
pub struct ActivationRate {
    /// Solution vector. With `offset == 1` entry `i` belongs to node `i + 1`.
    pub values: DVector<f64>,
    /// Index of the first node present in `values` (1 when node 0 was removed).
    pub offset: usize,
    pub iterations: usize,
    /// Relative residual `‖b − Av‖ / ‖b‖` of `values`.
    pub residual: f64,
    pub converged: bool,
    /// The fill phase was cancelled; `values` is all zeros and no solve ran.
    pub aborted: bool,
}

impl ActivationRate {
    /// Activation of `node` in the graph's node numbering, `None` for the removed
    /// anchor or an out-of-range index.
    pub fn node(&self, node: usize) -> Option<f64> {
        node.checked_sub(self.offset)
            .and_then(|i| self.values.get(i).copied())
    }

    /// Full-length vector in the graph's node numbering, `anchor` filling the
    /// removed node 0 slot when there is one.
    pub fn padded(&self, anchor: f64) -> DVector<f64> {
        if self.offset == 0 {
            return self.values.clone();
        }
        let mut full = DVector::from_element(self.values.len() + self.offset, anchor);
        full.rows_mut(self.offset, self.values.len())
            .copy_from(&self.values);
        full
    }

    /// Turn a non-converged (or cancelled) solve into [`Error::NotConverged`].
    pub fn require_converged(self) -> Result<Self> {
        if self.converged {
            Ok(self)
        } else {
            Err(Error::NotConverged {
                iterations: self.iterations,
                residual: self.residual,
            })
        }
    }
}

/// Build the `n x n` activation-pattern matrix: `A[y, x] = f` for every
/// neighbor `x` of `y`, `-1` on the diagonal.
///
/// Rows are filled in parallel. Rows skipped by a cancellation only carry
/// the diagonal.
pub fn activation_pattern<G: AdjacencyMatrix>(
    graph: &G,
    strength: &[f64],
    loose: f64,
    exec: &Executor<'_>,
) -> Result<CsrMatrix> {
    let n = node_count(graph)?;
    check_len("strength", n, strength.len())?;
    if !loose.is_finite() {
        return Err(Error::InvalidParameter(format!("loose must be finite, got {}", loose)));
    }
    if graph.has_self_loops() {
        warn!("adjacency matrix has a nonzero diagonal; self-edges are ignored");
    }

    exec.report(format_args!(
        "Number of threads: {}, nodes: {}",
        exec.threads(),
        n
    ));

    let mut rows: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
    exec.map_rows(&mut rows, |y| {
        neighbor_list(graph, y, NeighborMode::Both)
            .into_iter()
            .map(|x| (x, transfer(graph, y, x, strength, loose)))
            .collect()
    });

    for (y, row) in rows.iter_mut().enumerate() {
        if let Some(&(x, _)) = row.iter().find(|(_, f)| !f.is_finite()) {
            return Err(Error::UndefinedActivation { row: y, col: x });
        }
        row.push((y, -1.0));
    }

    Ok(CsrMatrix::from_rows(n, rows))
}

/// Solve for the equilibrium activation of every node.
///
/// `stm` marks the nodes held active from outside (0/1). With `remove_first`
/// node 0 is treated as a fixed anchor: row 0 and column 0 leave the system
/// and the result carries `offset == 1`.
pub fn activation_rate<G: AdjacencyMatrix>(
    graph: &G,
    strength: &[f64],
    stm: &[f64],
    loose: f64,
    remove_first: bool,
    solver: &SolverConfig,
    exec: &Executor<'_>,
) -> Result<ActivationRate> {
    let n = node_count(graph)?;
    check_len("stm", n, stm.len())?;
    if remove_first && n == 0 {
        return Err(Error::InvalidParameter(
            "remove_first needs at least one node".into(),
        ));
    }

    let pattern = activation_pattern(graph, strength, loose, exec)?;
    let offset = usize::from(remove_first);

    if exec.is_aborted() {
        warn!("activation rate cancelled before the solve");
        return Ok(ActivationRate {
            values: DVector::zeros(n - offset),
            offset,
            iterations: 0,
            residual: f64::NAN,
            converged: false,
            aborted: true,
        });
    }

    exec.report(format_args!("Solving activation patterns..."));

    let rhs: Vec<f64> = strength.iter().zip(stm).map(|(s, m)| -(s * m)).collect();
    let (system, rhs) = if remove_first {
        (pattern.without_first(), rhs[1..].to_vec())
    } else {
        (pattern, rhs)
    };

    let report = bicgstab(&system, &rhs, solver);
    if !report.converged {
        warn!(
            iterations = report.iterations,
            residual = report.residual,
            "activation-rate solve did not converge"
        );
    }

    Ok(ActivationRate {
        values: DVector::from_vec(report.solution),
        offset,
        iterations: report.iterations,
        residual: report.residual,
        converged: report.converged,
        aborted: false,
    })
}
