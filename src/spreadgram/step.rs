//! Synchronous spreading step and the driver loop around it.

use tracing::debug;

use super::sigmoid::{sigmoid_at, NeighborState};
use crate::config::SpreadingConfig;
use crate::error::{Error, Result};
use crate::graph::{check_len, neighbor_list, node_count, AdjacencyMatrix, NeighborMode};
use crate::parallel::Executor;

/// Result of [`spread`].
#[derive(Debug, Clone)]
pub struct SpreadRun {
    /// Last fully computed activation snapshot.
    pub activation: Vec<f64>,
    /// Completed steps.
    pub steps: usize,
    /// Max-norm change of the last completed step (`INFINITY` before the first).
    pub delta: f64,
    pub converged: bool,
    pub aborted: bool,
}

/// One synchronous update of every node from the `last` snapshot.
///
/// For node `y` with active neighbors `x`:
/// `next[y] = last[y] + Σ_x (1 − σ(last[x], y + 1)) · loose · last[x]`.
/// A node whose neighbor activations sum to zero drops to 0.
///
/// The sigmoid's scalar argument is the 1-based position `y + 1`, not `y`.
pub fn spread_step<G: AdjacencyMatrix>(
    graph: &G,
    last: &[f64],
    loose: f64,
    exec: &Executor<'_>,
) -> Result<Vec<f64>> {
    let n = node_count(graph)?;
    check_len("last_activation", n, last.len())?;
    if !loose.is_finite() {
        return Err(Error::InvalidParameter(format!("loose must be finite, got {}", loose)));
    }

    exec.report(format_args!("Number of threads: {}", exec.threads()));

    let mut next = vec![0.0; n];
    exec.map_rows(&mut next, |y| step_node(graph, y, last, loose));
    Ok(next)
}

fn step_node<G: AdjacencyMatrix>(graph: &G, y: usize, last: &[f64], loose: f64) -> f64 {
    let local = neighbor_list(graph, y, NeighborMode::Both);
    if local.iter().map(|&x| last[x]).sum::<f64>() == 0.0 {
        return 0.0;
    }

    let position = (y + 1) as f64;
    let spread: f64 = local
        .iter()
        .map(|&x| last[x])
        .filter(|a| *a != 0.0)
        .map(|a| (1.0 - sigmoid_at(a, position, NeighborState::Linked)) * loose * a)
        .sum();
    spread + last[y]
}

/// Apply [`spread_step`] until the max-norm change drops below
/// `config.tolerance` or `config.max_steps` steps have run.
///
/// A cancelled step is discarded; the run returns the snapshot before it.
pub fn spread<G: AdjacencyMatrix>(
    graph: &G,
    initial: &[f64],
    config: &SpreadingConfig,
    exec: &Executor<'_>,
) -> Result<SpreadRun> {
    let mut current = initial.to_vec();
    let mut delta = f64::INFINITY;
    let mut steps = 0;

    while steps < config.max_steps {
        let next = spread_step(graph, &current, config.loose, exec)?;
        if exec.is_aborted() {
            debug!(steps, "spreading cancelled");
            return Ok(SpreadRun {
                activation: current,
                steps,
                delta,
                converged: false,
                aborted: true,
            });
        }

        delta = current
            .iter()
            .zip(&next)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        current = next;
        steps += 1;
        debug!(step = steps, delta, "spreading step");

        if delta < config.tolerance {
            break;
        }
    }

    let converged = delta < config.tolerance;
    exec.report(format_args!(
        "Spreading finished after {} steps (delta {:e})",
        steps, delta
    ));
    Ok(SpreadRun {
        activation: current,
        steps,
        delta,
        converged,
        aborted: false,
    })
}
