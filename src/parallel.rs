//! Bounded worker pool for the per-node loops.
//!
//! Rows have data-dependent cost (proportional to the neighbor count), so the
//! pool hands out one row per dispatch and lets rayon's work stealing balance
//! the load. Each row writes only its own output slot, which the parallel
//! iterator hands out as a disjoint `&mut`; no locking is involved.
//!
//! Progress reporting and cancellation go through the [`Progress`] hook.
//! Cancellation is best effort: rows not yet started when the abort flag is
//! seen keep whatever value the caller put in the output buffer.

use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::{debug, info};

use crate::error::Result;

// ============================================================================
// Progress hook
// ============================================================================

/// Host-side progress/cancellation collaborator, called from worker threads.
pub trait Progress: Sync {
    /// One more row finished.
    fn increment(&self);

    /// Whether the host asked to stop.
    fn is_aborted(&self) -> bool;
}

/// Ignores progress and never aborts.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn increment(&self) {}

    fn is_aborted(&self) -> bool {
        false
    }
}

/// Atomic row counter with an abort flag that can be raised from any thread.
#[derive(Debug, Default)]
pub struct ProgressCounter {
    total: usize,
    done: AtomicUsize,
    aborted: AtomicBool,
}

impl ProgressCounter {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            done: AtomicUsize::new(0),
            aborted: AtomicBool::new(false),
        }
    }

    pub fn abort(&self) {
        self.aborted.store(true, Ordering::Relaxed);
    }

    pub fn completed(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

impl Progress for ProgressCounter {
    fn increment(&self) {
        self.done.fetch_add(1, Ordering::Relaxed);
    }

    fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Executor
// ============================================================================

/// Worker count actually used for a request: 0 or more than the hardware
/// offers falls back to the available parallelism.
pub fn resolve_workers(requested: usize) -> usize {
    let available = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    if requested == 0 || requested > available {
        available
    } else {
        requested
    }
}

pub struct Executor<'p> {
    pool: rayon::ThreadPool,
    threads: usize,
    show_progress: bool,
    progress: &'p dyn Progress,
}

impl Executor<'static> {
    /// Build a dedicated pool with `workers` threads (see [`resolve_workers`]).
    pub fn new(workers: usize) -> Result<Self> {
        let threads = resolve_workers(workers);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("spreadgram-{}", i))
            .build()?;
        debug!(requested = workers, threads, "worker pool ready");
        Ok(Self {
            pool,
            threads,
            show_progress: false,
            progress: &NoProgress,
        })
    }
}

impl<'p> Executor<'p> {
    /// Attach a progress/cancellation hook.
    pub fn with_progress<'q>(self, progress: &'q dyn Progress) -> Executor<'q> {
        Executor {
            pool: self.pool,
            threads: self.threads,
            show_progress: self.show_progress,
            progress,
        }
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn is_aborted(&self) -> bool {
        self.progress.is_aborted()
    }

    /// Phase/status message: `info` when progress display is on, else `debug`.
    pub(crate) fn report(&self, message: std::fmt::Arguments<'_>) {
        if self.show_progress {
            info!("{}", message);
        } else {
            debug!("{}", message);
        }
    }

    /// `out[row] = f(row)` for every row, one row per dispatch.
    ///
    /// The abort flag is checked before computing a row and again before
    /// writing it; progress is incremented once per written row.
    pub fn map_rows<T, F>(&self, out: &mut [T], f: F)
    where
        T: Send,
        F: Fn(usize) -> T + Sync,
    {
        let progress = self.progress;
        self.pool.install(|| {
            out.par_iter_mut()
                .enumerate()
                .with_max_len(1)
                .for_each(|(row, slot)| {
                    if progress.is_aborted() {
                        return;
                    }
                    let value = f(row);
                    if progress.is_aborted() {
                        return;
                    }
                    *slot = value;
                    progress.increment();
                });
        });
    }

    /// Like [`map_rows`](Self::map_rows) but without progress or abort checks,
    /// and rows are dispatched in batches of at least 64. Used for the inner
    /// mat-vec of iterative solvers, which check for cancellation between
    /// calls.
    pub fn map_rows_untracked<T, F>(&self, out: &mut [T], f: F)
    where
        T: Send,
        F: Fn(usize) -> T + Sync,
    {
        self.pool.install(|| {
            out.par_iter_mut()
                .enumerate()
                .with_min_len(64)
                .for_each(|(row, slot)| *slot = f(row));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_workers_fallback() {
        let available = resolve_workers(0);
        assert!(available >= 1);
        assert_eq!(resolve_workers(usize::MAX), available);
        assert_eq!(resolve_workers(1), 1);
    }

    #[test]
    fn test_map_rows_fills_every_slot() {
        let exec = Executor::new(2).unwrap();
        let mut out = vec![0usize; 100];
        exec.map_rows(&mut out, |row| row * 2);
        assert!(out.iter().enumerate().all(|(i, v)| *v == i * 2));
    }

    #[test]
    fn test_map_rows_counts_progress() {
        let counter = ProgressCounter::new(10);
        let exec = Executor::new(2).unwrap().with_progress(&counter);
        let mut out = vec![0.0; 10];
        exec.map_rows(&mut out, |row| row as f64);
        assert_eq!(counter.completed(), 10);
        assert_eq!(counter.total(), 10);
    }

    #[test]
    fn test_aborted_rows_keep_previous_value() {
        let counter = ProgressCounter::new(8);
        counter.abort();
        let exec = Executor::new(2).unwrap().with_progress(&counter);
        let mut out = vec![-1.0; 8];
        exec.map_rows(&mut out, |_| 1.0);
        assert!(out.iter().all(|v| *v == -1.0));
        assert_eq!(counter.completed(), 0);
        assert!(exec.is_aborted());
    }

    #[test]
    fn test_untracked_ignores_abort() {
        let counter = ProgressCounter::new(4);
        counter.abort();
        let exec = Executor::new(1).unwrap().with_progress(&counter);
        let mut out = vec![0; 4];
        exec.map_rows_untracked(&mut out, |row| row + 1);
        assert_eq!(out, vec![1, 2, 3, 4]);
    }
}
