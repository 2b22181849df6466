//! Integration tests for random walk with restart.
//!
//! Run with: cargo test --test walk_tests

use anyhow::Result;
use nalgebra::DMatrix;
use spreadgram::{
    random_walk_with_restart, AdjacencyMatrix, DenseGraph, EngineConfig, Error, Executor,
    ProgressCounter, SparseGraph, SpreadingEngine, WalkConfig,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("spreadgram=debug")
        .try_init();
}

/// Seven-node graph as (target, source) pairs.
const EDGES: [(usize, usize); 9] = [
    (0, 1),
    (0, 2),
    (1, 3),
    (1, 4),
    (2, 4),
    (2, 5),
    (3, 6),
    (4, 6),
    (5, 6),
];

/// Undirected version of the seven-node graph, each column scaled by its degree.
fn transition_matrix() -> SparseGraph {
    let mut degree = [0.0; 7];
    for &(a, b) in &EDGES {
        degree[a] += 1.0;
        degree[b] += 1.0;
    }
    let triplets = EDGES
        .iter()
        .flat_map(|&(a, b)| [(a, b, 1.0 / degree[b]), (b, a, 1.0 / degree[a])]);
    SparseGraph::from_triplets(7, triplets).unwrap()
}

fn seeds() -> DMatrix<f64> {
    let mut p0 = DMatrix::zeros(7, 3);
    p0[(0, 0)] = 1.0;
    p0[(6, 1)] = 1.0;
    for i in 0..7 {
        p0[(i, 2)] = 1.0 / 7.0;
    }
    p0
}

fn config(analytical: bool) -> WalkConfig {
    WalkConfig {
        restart_prob: 0.25,
        threshold: 1e-12,
        max_iterations: 10_000,
        analytical,
    }
}

#[test]
fn test_transition_matrix_is_column_stochastic() {
    let w = transition_matrix();
    for j in 0..7 {
        let sum: f64 = w.col(j).iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }
}

#[test]
fn test_iterative_and_analytical_agree() -> Result<()> {
    init_tracing();
    let w = transition_matrix();
    let exec = Executor::new(4)?;

    let iterative = random_walk_with_restart(&seeds(), &w, &config(false), &exec)?;
    let analytical = random_walk_with_restart(&seeds(), &w, &config(true), &exec)?;
    assert!(iterative.converged);
    assert!(iterative.iterations > 1);
    assert_eq!(analytical.iterations, 0);

    let gap = (&iterative.distribution - &analytical.distribution).abs().max();
    assert!(gap < 1e-6, "max gap {}", gap);

    for result in [&iterative, &analytical] {
        assert_eq!(result.distribution.shape(), (7, 3));
        for column in result.distribution.column_iter() {
            assert!((column.sum() - 1.0).abs() < 1e-6);
            assert!(column.iter().all(|p| *p >= 0.0));
        }
    }
    Ok(())
}

#[test]
fn test_seed_node_keeps_most_mass() -> Result<()> {
    let result = random_walk_with_restart(
        &seeds(),
        &transition_matrix(),
        &config(true),
        &Executor::new(1)?,
    )?;
    let from_zero = result.distribution.column(0);
    assert!((1..7).all(|i| from_zero[0] > from_zero[i]));
    Ok(())
}

#[test]
fn test_dense_and_sparse_agree() -> Result<()> {
    let sparse = transition_matrix();
    let dense = DenseGraph::new(sparse.to_dense())?;
    let exec = Executor::new(2)?;
    for analytical in [false, true] {
        let a = random_walk_with_restart(&seeds(), &sparse, &config(analytical), &exec)?;
        let b = random_walk_with_restart(&seeds(), &dense, &config(analytical), &exec)?;
        assert_eq!(a.distribution, b.distribution);
    }
    Ok(())
}

#[test]
fn test_engine_reads_walk_config() -> Result<()> {
    init_tracing();
    let mut engine_config = EngineConfig {
        workers: 2,
        ..Default::default()
    };
    engine_config.walk = config(true);
    let engine = SpreadingEngine::new(engine_config)?;
    let result = engine.random_walk(&seeds(), &transition_matrix())?;
    assert!(result.converged);
    assert_eq!(result.iterations, 0);
    Ok(())
}

#[test]
fn test_iteration_cap_is_reported_not_fatal() -> Result<()> {
    let mut cfg = config(false);
    cfg.max_iterations = 3;
    let result =
        random_walk_with_restart(&seeds(), &transition_matrix(), &cfg, &Executor::new(2)?)?;
    assert_eq!(result.iterations, 3);
    assert!(!result.converged);
    assert!(result.delta > cfg.threshold);
    // mass is still conserved on every column
    for column in result.distribution.column_iter() {
        assert!((column.sum() - 1.0).abs() < 1e-9);
    }
    assert!(matches!(
        result.require_converged(),
        Err(Error::NotConverged { iterations: 3, .. })
    ));
    Ok(())
}

#[test]
fn test_rejects_unnormalized_transitions() -> Result<()> {
    let raw = SparseGraph::from_triplets(7, EDGES.iter().map(|&(a, b)| (a, b, 1.0)))?;
    let err = random_walk_with_restart(&seeds(), &raw, &config(false), &Executor::new(1)?)
        .unwrap_err();
    assert!(matches!(err, Error::NotColumnStochastic { .. }));
    Ok(())
}

#[test]
fn test_cancellation_returns_partial_result() -> Result<()> {
    let counter = ProgressCounter::new(7);
    counter.abort();
    let exec = Executor::new(2)?.with_progress(&counter);
    let result = random_walk_with_restart(&seeds(), &transition_matrix(), &config(false), &exec)?;
    assert!(result.aborted);
    assert!(!result.converged);
    assert_eq!(result.distribution, seeds());
    Ok(())
}
