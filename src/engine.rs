//! Spreading Activation Engine
//!
//! Bundles an [`EngineConfig`] with a worker pool and exposes every
//! computation of the crate with the configured defaults:
//! 1. **Neighborhoods**: neighbor indicators and transfer activations
//! 2. **Equilibrium**: ACT activation rates from strength and short-term memory
//! 3. **Spreadgram**: sigmoid-weighted spreading steps and the gradient score
//! 4. **Random walk with restart**: iterative or analytical stationary distributions
//!
//! The free functions in [`activation`](crate::activation),
//! [`spreadgram`](crate::spreadgram) and [`walk`](crate::walk) remain
//! available for callers that manage their own [`Executor`].

use nalgebra::{DMatrix, DVector};
use tracing::info;

use crate::activation::{self, ActivationRate};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::graph::{check_node, node_count, AdjacencyMatrix, NeighborMode};
use crate::parallel::{Executor, Progress};
use crate::spreadgram::{self, SpreadRun};
use crate::walk::{self, WalkResult};

// ============================================================================
// Engine
// ============================================================================

/// Configured entry point for all spreading computations.
///
/// The lifetime ties the engine to an attached [`Progress`] hook; an engine
/// without one is `SpreadingEngine<'static>`.
pub struct SpreadingEngine<'p> {
    config: EngineConfig,
    exec: Executor<'p>,
}

impl SpreadingEngine<'static> {
    /// Validate `config` and build the worker pool.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let exec = Executor::new(config.workers)?.show_progress(config.show_progress);
        info!(
            threads = exec.threads(),
            loose = config.spreading.loose,
            restart_prob = config.walk.restart_prob,
            analytical = config.walk.analytical,
            "spreading engine ready"
        );
        Ok(Self { config, exec })
    }

    /// Build from `spreadgram.yaml` (if present) and `SPREADGRAM_*` env vars.
    pub fn from_env() -> Result<Self> {
        Self::new(EngineConfig::from_env()?)
    }
}

impl<'p> SpreadingEngine<'p> {
    /// Attach a progress/cancellation hook to every subsequent call.
    pub fn with_progress<'q>(self, progress: &'q dyn Progress) -> SpreadingEngine<'q> {
        SpreadingEngine {
            config: self.config,
            exec: self.exec.with_progress(progress),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn executor(&self) -> &Executor<'p> {
        &self.exec
    }

    // ------------------------------------------------------------------------
    // Neighborhoods
    // ------------------------------------------------------------------------

    /// Checked [`neighbors`](crate::graph::neighbors) indicator.
    pub fn neighbors<G: AdjacencyMatrix>(
        &self,
        graph: &G,
        node: usize,
        mode: NeighborMode,
    ) -> Result<Vec<u8>> {
        check_node(node, node_count(graph)?)?;
        Ok(crate::graph::neighbors(graph, node, mode))
    }

    /// Transfer activation from `y` to `x` with the configured loose factor.
    pub fn transfer_activation<G: AdjacencyMatrix>(
        &self,
        graph: &G,
        y: usize,
        x: usize,
        activation: &[f64],
    ) -> Result<f64> {
        activation::transfer_activation(graph, y, x, activation, self.config.spreading.loose)
    }

    // ------------------------------------------------------------------------
    // Equilibrium
    // ------------------------------------------------------------------------

    pub fn activation_rate<G: AdjacencyMatrix>(
        &self,
        graph: &G,
        strength: &[f64],
        stm: &[f64],
        remove_first: bool,
    ) -> Result<ActivationRate> {
        activation::activation_rate(
            graph,
            strength,
            stm,
            self.config.spreading.loose,
            remove_first,
            &self.config.solver,
            &self.exec,
        )
    }

    // ------------------------------------------------------------------------
    // Spreadgram
    // ------------------------------------------------------------------------

    pub fn spread_step<G: AdjacencyMatrix>(&self, graph: &G, last: &[f64]) -> Result<Vec<f64>> {
        spreadgram::spread_step(graph, last, self.config.spreading.loose, &self.exec)
    }

    pub fn spread<G: AdjacencyMatrix>(&self, graph: &G, initial: &[f64]) -> Result<SpreadRun> {
        spreadgram::spread(graph, initial, &self.config.spreading, &self.exec)
    }

    pub fn gradient<G: AdjacencyMatrix>(&self, graph: &G, activation: &[f64]) -> Result<f64> {
        spreadgram::gradient(graph, activation, &self.exec)
    }

    // ------------------------------------------------------------------------
    // Random walk with restart
    // ------------------------------------------------------------------------

    /// Walk every column of `p0` over the column-stochastic `w`.
    pub fn random_walk<G: AdjacencyMatrix>(&self, p0: &DMatrix<f64>, w: &G) -> Result<WalkResult> {
        walk::random_walk_with_restart(p0, w, &self.config.walk, &self.exec)
    }

    /// Single-seed form of [`random_walk`](Self::random_walk).
    ///
    /// The result keeps the walk diagnostics; its `distribution` has exactly
    /// one column. Use [`WalkResult::require_converged`] to treat an
    /// iteration cap hit or a cancellation as an error.
    pub fn random_walk_vector<G: AdjacencyMatrix>(
        &self,
        p0: &DVector<f64>,
        w: &G,
    ) -> Result<WalkResult> {
        let seed = DMatrix::from_column_slice(p0.len(), 1, p0.as_slice());
        self.random_walk(&seed, w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WalkConfig;
    use crate::error::Error;
    use crate::graph::DenseGraph;
    use crate::parallel::ProgressCounter;

    fn engine() -> SpreadingEngine<'static> {
        SpreadingEngine::new(EngineConfig {
            workers: 2,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = EngineConfig {
            walk: WalkConfig {
                restart_prob: -0.1,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(SpreadingEngine::new(config), Err(Error::Config(_))));
    }

    #[test]
    fn test_neighbors_checks_node() {
        let g = DenseGraph::from_edges(2, vec![(1, 0, 1.0)]).unwrap();
        let e = engine();
        assert_eq!(e.neighbors(&g, 0, NeighborMode::Both).unwrap(), vec![0, 1]);
        assert!(matches!(
            e.neighbors(&g, 2, NeighborMode::Both),
            Err(Error::IndexOutOfBounds { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_uses_configured_loose() {
        let g = DenseGraph::from_edges(3, vec![(1, 0, 1.0), (2, 0, 1.0)]).unwrap();
        let mut config = EngineConfig {
            workers: 1,
            ..Default::default()
        };
        config.spreading.loose = 0.5;
        let e = SpreadingEngine::new(config).unwrap();
        let f = e.transfer_activation(&g, 1, 0, &[1.0, 1.0, 1.0]).unwrap();
        assert!((f - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_random_walk_vector() {
        let w = DenseGraph::from_row_slice(2, &[0.0, 1.0, 1.0, 0.0]).unwrap();
        let result = engine()
            .random_walk_vector(&DVector::from_vec(vec![1.0, 0.0]), &w)
            .unwrap();
        assert!(result.converged);
        assert!(!result.aborted);
        assert_eq!(result.distribution.shape(), (2, 1));
        let p = result.distribution.column(0);
        assert!((p.sum() - 1.0).abs() < 1e-6);
        assert!(p[0] > p[1]);
    }

    #[test]
    fn test_random_walk_vector_reports_iteration_cap() {
        let w = DenseGraph::from_row_slice(2, &[0.0, 1.0, 1.0, 0.0]).unwrap();
        let config = EngineConfig {
            workers: 1,
            walk: WalkConfig {
                max_iterations: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        let result = SpreadingEngine::new(config)
            .unwrap()
            .random_walk_vector(&DVector::from_vec(vec![1.0, 0.0]), &w)
            .unwrap();
        assert_eq!(result.iterations, 1);
        assert!(!result.converged);
        assert!(matches!(
            result.require_converged(),
            Err(Error::NotConverged { iterations: 1, .. })
        ));
    }

    #[test]
    fn test_random_walk_vector_reports_cancellation() {
        let w = DenseGraph::from_row_slice(2, &[0.0, 1.0, 1.0, 0.0]).unwrap();
        let counter = ProgressCounter::new(2);
        counter.abort();
        let seed = DVector::from_vec(vec![1.0, 0.0]);
        let result = engine()
            .with_progress(&counter)
            .random_walk_vector(&seed, &w)
            .unwrap();
        assert!(result.aborted);
        assert!(!result.converged);
        assert_eq!(result.distribution.column(0).into_owned(), seed);
        assert!(result.require_converged().is_err());
    }

    #[test]
    fn test_progress_hook_is_forwarded() {
        let g = DenseGraph::from_edges(4, vec![(1, 0, 1.0), (2, 1, 1.0), (3, 2, 1.0)]).unwrap();
        let counter = ProgressCounter::new(4);
        let e = engine().with_progress(&counter);
        e.gradient(&g, &[1.0, 1.0, 1.0, 1.0]).unwrap();
        assert_eq!(counter.completed(), 4);
    }
}
