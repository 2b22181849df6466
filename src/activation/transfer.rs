//! Transfer activation: the one-step influence of node `y` on its neighbor `x`.
//!
//! `f(x, y) = l · s_y / Σ_j s_j` where the sum runs over the part of `x`'s
//! neighborhood that `y`'s activation competes with:
//! - `graph[y, x] != 0` (the edge `x → y` is stored): all neighbors of `x`
//! - only `graph[x, y] != 0` (the edge `y → x`): the column neighbors of `x`,
//!   plus `y` itself

use crate::error::Result;
use crate::graph::{check_len, check_node, neighbor_list, node_count, AdjacencyMatrix, NeighborMode};

/// Checked transfer activation from `y` to `x`.
///
/// Returns 0 when `x == y` or when the two nodes are not adjacent in either
/// direction. A non-positive numerator is returned as is. When the
/// normalizing activations sum to zero the quotient is non-finite; it is
/// returned unchanged (see [`activation_pattern`](super::activation_pattern)
/// for where that becomes an error).
pub fn transfer_activation<G: AdjacencyMatrix>(
    graph: &G,
    y: usize,
    x: usize,
    activation: &[f64],
    loose: f64,
) -> Result<f64> {
    let n = node_count(graph)?;
    check_node(y, n)?;
    check_node(x, n)?;
    check_len("activation", n, activation.len())?;
    Ok(transfer(graph, y, x, activation, loose))
}

pub(crate) fn transfer<G: AdjacencyMatrix>(
    graph: &G,
    y: usize,
    x: usize,
    activation: &[f64],
    loose: f64,
) -> f64 {
    if x == y {
        return 0.0;
    }

    let backward = graph.coeff(y, x);
    let forward = graph.coeff(x, y);
    if backward.max(forward) == 0.0 {
        return 0.0;
    }

    let numerator = activation[y] * loose;
    if !(numerator > 0.0) {
        return numerator;
    }

    let denominator: f64 = if backward != 0.0 {
        neighbor_list(graph, x, NeighborMode::Both)
            .iter()
            .map(|&i| activation[i])
            .sum()
    } else {
        // y reached x, so it counts even though graph[y, x] is zero
        let mut competing = neighbor_list(graph, x, NeighborMode::Backward);
        if let Err(pos) = competing.binary_search(&y) {
            competing.insert(pos, y);
        }
        competing.iter().map(|&i| activation[i]).sum()
    };

    numerator / denominator
}
