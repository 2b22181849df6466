//! Spreadgram
//!
//! Spreading activation and random walks over adjacency matrices:
//! - ACT transfer activation and equilibrium activation rates (BiCGSTAB solve)
//! - Sigmoid-weighted spreading steps and the log-likelihood gradient
//! - Random walk with restart, iterative or closed form
//! - Dense (nalgebra) and sparse (compressed row/column) graphs behind one trait
//! - Per-node loops on a bounded rayon pool with progress and cancellation hooks
//!
//! ```no_run
//! use spreadgram::{DenseGraph, EngineConfig, SpreadingEngine};
//!
//! # fn main() -> spreadgram::Result<()> {
//! // 0 → 1 → 2, stored as (target, source, weight)
//! let graph = DenseGraph::from_edges(3, vec![(1, 0, 1.0), (2, 1, 1.0)])?;
//! let engine = SpreadingEngine::new(EngineConfig::default())?;
//! let rate = engine.activation_rate(&graph, &[1.0, 1.0, 1.0], &[1.0, 0.0, 0.0], false)?;
//! println!("{}", rate.values);
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod linalg;
pub mod parallel;
pub mod spreadgram;
pub mod walk;

pub use activation::{activation_pattern, activation_rate, transfer_activation, ActivationRate};
pub use config::{EngineConfig, SolverConfig, SpreadingConfig, WalkConfig};
pub use engine::SpreadingEngine;
pub use error::{Error, Result};
pub use graph::{neighbor_list, neighbors, AdjacencyMatrix, DenseGraph, NeighborMode, SparseGraph};
pub use parallel::{Executor, NoProgress, Progress, ProgressCounter};
pub use spreadgram::{gradient, sigmoid, spread, spread_step, NeighborState, SpreadRun};
pub use walk::{random_walk_with_restart, WalkResult};
