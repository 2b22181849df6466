//! Neighbor extraction.
//!
//! `Forward` neighbors of `node` are the nonzero columns of its row,
//! `Backward` neighbors the nonzero rows of its column, `Both` the union.
//! A node is never its own neighbor, even when the diagonal is nonzero.

use serde::{Deserialize, Serialize};

use super::AdjacencyMatrix;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborMode {
    /// Treat the graph as undirected.
    #[default]
    Both,
    /// Row neighbors: `graph[node, i] != 0`, i.e. edges `i → node`.
    Forward,
    /// Column neighbors: `graph[i, node] != 0`, i.e. edges `node → i`.
    Backward,
}

impl NeighborMode {
    /// Integer codes used by host bindings: 1 = forward, 2 = backward,
    /// anything else = both.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Forward,
            2 => Self::Backward,
            _ => Self::Both,
        }
    }
}

/// Ascending list of the neighbors of `node`.
///
/// `node` must be a valid index; this is not checked here.
pub fn neighbor_list<G: AdjacencyMatrix>(graph: &G, node: usize, mode: NeighborMode) -> Vec<usize> {
    let mut forward = Vec::new();
    let mut backward = Vec::new();
    if mode != NeighborMode::Backward {
        graph.for_each_in_row(node, |c, _| {
            if c != node {
                forward.push(c);
            }
        });
    }
    if mode != NeighborMode::Forward {
        graph.for_each_in_col(node, |r, _| {
            if r != node {
                backward.push(r);
            }
        });
    }

    match mode {
        NeighborMode::Forward => forward,
        NeighborMode::Backward => backward,
        NeighborMode::Both => merge_sorted(&forward, &backward),
    }
}

/// 0/1 indicator over all nodes; `indicator[node]` is always 0.
pub fn neighbors<G: AdjacencyMatrix>(graph: &G, node: usize, mode: NeighborMode) -> Vec<u8> {
    let mut indicator = vec![0u8; graph.rows()];
    for i in neighbor_list(graph, node, mode) {
        indicator[i] = 1;
    }
    indicator
}

fn merge_sorted(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DenseGraph, SparseGraph};

    /// 0 → 1, 2 → 0, 1 → 2 stored as graph[target, source], plus a self-loop on 1.
    fn sample() -> DenseGraph {
        DenseGraph::from_edges(4, vec![(1, 0, 1.0), (0, 2, 1.0), (2, 1, 1.0), (1, 1, 5.0)])
            .unwrap()
    }

    #[test]
    fn test_forward_backward_both() {
        let g = sample();
        assert_eq!(neighbors(&g, 0, NeighborMode::Forward), vec![0, 0, 1, 0]);
        assert_eq!(neighbors(&g, 0, NeighborMode::Backward), vec![0, 1, 0, 0]);
        assert_eq!(neighbors(&g, 0, NeighborMode::Both), vec![0, 1, 1, 0]);
    }

    #[test]
    fn test_self_excluded_despite_diagonal() {
        let g = sample();
        for mode in [NeighborMode::Both, NeighborMode::Forward, NeighborMode::Backward] {
            assert_eq!(neighbors(&g, 1, mode)[1], 0);
        }
    }

    #[test]
    fn test_both_is_elementwise_max() {
        let g = sample();
        for node in 0..4 {
            let f = neighbors(&g, node, NeighborMode::Forward);
            let b = neighbors(&g, node, NeighborMode::Backward);
            let both = neighbors(&g, node, NeighborMode::Both);
            let max: Vec<u8> = f.iter().zip(&b).map(|(x, y)| *x.max(y)).collect();
            assert_eq!(both, max);
        }
    }

    #[test]
    fn test_symmetric_graph_forward_equals_backward() {
        let g = SparseGraph::from_triplets(
            3,
            vec![(0, 1, 1.0), (1, 0, 1.0), (1, 2, 2.0), (2, 1, 2.0)],
        )
        .unwrap();
        for node in 0..3 {
            assert_eq!(
                neighbors(&g, node, NeighborMode::Forward),
                neighbors(&g, node, NeighborMode::Backward)
            );
        }
    }

    #[test]
    fn test_isolated_node() {
        let g = sample();
        assert!(neighbor_list(&g, 3, NeighborMode::Both).is_empty());
    }

    #[test]
    fn test_mode_codes() {
        assert_eq!(NeighborMode::from_code(0), NeighborMode::Both);
        assert_eq!(NeighborMode::from_code(1), NeighborMode::Forward);
        assert_eq!(NeighborMode::from_code(2), NeighborMode::Backward);
        assert_eq!(NeighborMode::from_code(7), NeighborMode::Both);
    }
}
