//! Log-likelihood gradient of an activation assignment.
//!
//! Per node `y` with active neighbors `x`:
//! `g(y) = Σ_x a(x) · (1 − σ(a(x), a(y)))`, where σ is the linked sigmoid.
//! Nodes without neighbors, or whose neighbors are all inactive, contribute 0.
//! The score is the mean of `g` over all nodes.

use super::sigmoid::{sigmoid_at, NeighborState};
use crate::error::Result;
use crate::graph::{check_len, neighbor_list, node_count, AdjacencyMatrix, NeighborMode};
use crate::parallel::Executor;

pub fn gradient<G: AdjacencyMatrix>(
    graph: &G,
    activation: &[f64],
    exec: &Executor<'_>,
) -> Result<f64> {
    let n = node_count(graph)?;
    check_len("activation", n, activation.len())?;
    if n == 0 {
        return Ok(0.0);
    }

    exec.report(format_args!("Number of threads: {}", exec.threads()));

    let mut per_node = vec![0.0; n];
    exec.map_rows(&mut per_node, |y| {
        let ay = activation[y];
        neighbor_list(graph, y, NeighborMode::Both)
            .into_iter()
            .map(|x| activation[x])
            .filter(|ax| *ax != 0.0)
            .map(|ax| ax * (1.0 - sigmoid_at(ax, ay, NeighborState::Linked)))
            .sum::<f64>()
    });

    Ok(per_node.iter().sum::<f64>() / n as f64)
}
