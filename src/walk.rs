//! Random walk with restart.
//!
//! Stationary distribution of a walker that follows the column-stochastic
//! transition matrix `W` with probability `1 − r` and jumps back to its seed
//! distribution `p0` with probability `r`:
//!
//! - **iterative**: `p ← (1 − r) · W · p + r · p0` until
//!   `‖p_{t+1} − p_t‖₂ < threshold` or `max_iterations`
//! - **analytical**: `p = r · (I − (1 − r) · W)⁻¹ · p0` via LU
//!
//! Every column of `p0` is an independent seed and is walked in the same pass.
//!
//! The iterative mode checks for cancellation before each seed column of
//! each iteration, not per row: one column update is a single mat-vec whose
//! rows are batched across the pool. A cancelled walk returns the last
//! complete iterate with `aborted` set.

use nalgebra::DMatrix;
use tracing::{debug, warn};

use crate::config::WalkConfig;
use crate::error::{Error, Result};
use crate::graph::{check_len, node_count, AdjacencyMatrix};
use crate::parallel::Executor;

/// Allowed deviation of a transition-matrix column sum from 1.
pub const STOCHASTIC_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct WalkResult {
    /// `n x k` matrix, one distribution per seed column.
    pub distribution: DMatrix<f64>,
    /// Iterations run; 0 for the analytical solve.
    pub iterations: usize,
    /// L2 norm of the last update (0 for the analytical solve).
    pub delta: f64,
    pub converged: bool,
    pub aborted: bool,
}

impl WalkResult {
    /// Turn an iteration cap hit (or cancellation) into [`Error::NotConverged`].
    pub fn require_converged(self) -> Result<Self> {
        if self.converged {
            Ok(self)
        } else {
            Err(Error::NotConverged {
                iterations: self.iterations,
                residual: self.delta,
            })
        }
    }
}

/// Check that every column of `w` sums to 1 within [`STOCHASTIC_TOLERANCE`].
pub fn check_column_stochastic<G: AdjacencyMatrix>(w: &G) -> Result<()> {
    for column in 0..w.cols() {
        let mut sum = 0.0;
        w.for_each_in_col(column, |_, v| sum += v);
        if (sum - 1.0).abs() > STOCHASTIC_TOLERANCE {
            return Err(Error::NotColumnStochastic { column, sum });
        }
    }
    Ok(())
}

pub fn random_walk_with_restart<G: AdjacencyMatrix>(
    p0: &DMatrix<f64>,
    w: &G,
    config: &WalkConfig,
    exec: &Executor<'_>,
) -> Result<WalkResult> {
    let n = node_count(w)?;
    check_len("p0 rows", n, p0.nrows())?;
    let r = config.restart_prob;
    if !(0.0..=1.0).contains(&r) {
        return Err(Error::InvalidParameter(format!(
            "restart probability must lie in [0, 1], got {}",
            r
        )));
    }
    if !(config.threshold >= 0.0) {
        return Err(Error::InvalidParameter(format!(
            "threshold must be non-negative, got {}",
            config.threshold
        )));
    }
    if let Some(bad) = p0.iter().find(|v| !v.is_finite()) {
        return Err(Error::InvalidParameter(format!("p0 contains {}", bad)));
    }
    check_column_stochastic(w)?;

    if n == 0 || p0.ncols() == 0 {
        return Ok(WalkResult {
            distribution: p0.clone(),
            iterations: 0,
            delta: 0.0,
            converged: true,
            aborted: false,
        });
    }

    if config.analytical {
        analytical(p0, w, r)
    } else {
        iterative(p0, w, config, exec)
    }
}

fn analytical<G: AdjacencyMatrix>(p0: &DMatrix<f64>, w: &G, r: f64) -> Result<WalkResult> {
    if r == 0.0 {
        return Err(Error::InvalidParameter(
            "analytical walk needs a restart probability above 0".into(),
        ));
    }
    let n = w.rows();
    let system = DMatrix::<f64>::identity(n, n) - w.to_dense() * (1.0 - r);
    let distribution = system
        .lu()
        .solve(&(p0 * r))
        .ok_or(Error::SingularSystem)?;
    if distribution.iter().any(|v| !v.is_finite()) {
        return Err(Error::SingularSystem);
    }
    debug!(nodes = n, seeds = p0.ncols(), "analytical walk solved");

    Ok(WalkResult {
        distribution,
        iterations: 0,
        delta: 0.0,
        converged: true,
        aborted: false,
    })
}

fn iterative<G: AdjacencyMatrix>(
    p0: &DMatrix<f64>,
    w: &G,
    config: &WalkConfig,
    exec: &Executor<'_>,
) -> Result<WalkResult> {
    let n = p0.nrows();
    let r = config.restart_prob;
    let keep = 1.0 - r;

    exec.report(format_args!("Number of threads: {}", exec.threads()));

    let mut current = p0.clone();
    let mut next = DMatrix::zeros(n, p0.ncols());
    let mut delta = f64::INFINITY;
    let mut iterations = 0;
    let mut aborted = false;

    while iterations < config.max_iterations {
        // column-major storage: column j is the contiguous span j*n..(j+1)*n
        let seeds = p0.as_slice().chunks(n);
        let walkers = current.as_slice().chunks(n);
        for (column, ((out, seed), walker)) in next
            .as_mut_slice()
            .chunks_mut(n)
            .zip(seeds)
            .zip(walkers)
            .enumerate()
        {
            if exec.is_aborted() {
                debug!(iterations, column, "walk cancelled");
                aborted = true;
                break;
            }
            exec.map_rows_untracked(out, |i| {
                let mut moved = 0.0;
                w.for_each_in_row(i, |k, v| moved += v * walker[k]);
                keep * moved + r * seed[i]
            });
        }
        if aborted {
            return Ok(WalkResult {
                distribution: current,
                iterations,
                delta,
                converged: false,
                aborted: true,
            });
        }

        delta = (&next - &current).norm();
        std::mem::swap(&mut current, &mut next);
        iterations += 1;

        if delta < config.threshold {
            break;
        }
    }

    let converged = delta < config.threshold;
    if converged {
        debug!(iterations, delta, "walk converged");
    } else {
        warn!(
            iterations,
            delta,
            threshold = config.threshold,
            "walk stopped at the iteration cap"
        );
    }

    Ok(WalkResult {
        distribution: current,
        iterations,
        delta,
        converged,
        aborted: false,
    })
}
