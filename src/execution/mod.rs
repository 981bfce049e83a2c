//! Batch execution of independent ingestion and transformation jobs.
//!
//! This module sits "above" [`crate::ingestion`] and [`crate::processing`] and provides:
//!
//! - Parallel execution of many `parse` / `apply` jobs on a dedicated rayon pool
//! - Resource limits / throttling (at most `max_in_flight_jobs` jobs run at once)
//! - Real-time metrics + observer hooks for monitoring
//!
//! Results always come back in input order, and each job reports its own `Result`: a failing
//! job never aborts its siblings.

mod observer;
mod semaphore;

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

use crate::error::{IngestionResult, TransformResult};
use crate::history::{apply_all, HistoryEntry};
use crate::ingestion::{parse, parse_with_options, FormatHint, ParseOptions};
use crate::processing::{apply, Operation};
use crate::types::Dataset;

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver, JobKind, LogExecutionObserver,
    StdErrExecutionObserver,
};

use semaphore::Semaphore;

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Number of worker threads used by the engine.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Upper bound on concurrently executing jobs (clamped to at least one).
    ///
    /// This is an additional throttle on top of `num_threads`, useful when each job holds a
    /// large upload in memory.
    pub max_in_flight_jobs: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self {
            num_threads: Some(n),
            max_in_flight_jobs: n,
        }
    }
}

/// Runs batches of independent jobs in parallel.
pub struct ExecutionEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Create a new engine with the given options.
    ///
    /// # Panics
    ///
    /// Panics if the thread pool cannot be built; use [`ExecutionEngine::try_new`] to handle that.
    pub fn new(opts: ExecutionOptions) -> Self {
        Self::try_new(opts).unwrap_or_else(|e| panic!("failed to build rayon thread pool: {e}"))
    }

    pub fn try_new(opts: ExecutionOptions) -> Result<Self, ThreadPoolBuildError> {
        // rayon treats zero threads as "pick automatically".
        let pool = ThreadPoolBuilder::new()
            .num_threads(opts.num_threads.unwrap_or(0))
            .thread_name(|i| format!("tabular-prep-{i}"))
            .build()?;

        Ok(Self {
            pool,
            opts,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        })
    }

    /// Attach an observer for execution events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Parse every `(bytes, hint)` pair.
    pub fn parse_many<B>(&self, inputs: &[(B, FormatHint)]) -> Vec<IngestionResult<Dataset>>
    where
        B: AsRef<[u8]> + Sync,
    {
        self.run(JobKind::Parse, inputs, |(bytes, hint)| parse(bytes.as_ref(), hint), Dataset::row_count)
    }

    /// Parse every input with the same options (hint, inference mode, observer).
    pub fn parse_many_with_options<B>(&self, inputs: &[B], options: &ParseOptions) -> Vec<IngestionResult<Dataset>>
    where
        B: AsRef<[u8]> + Sync,
    {
        self.run(
            JobKind::Parse,
            inputs,
            |bytes| parse_with_options(bytes.as_ref(), options),
            Dataset::row_count,
        )
    }

    /// Apply each operation to its paired dataset.
    pub fn apply_many(&self, jobs: &[(Dataset, Operation)]) -> Vec<TransformResult<Dataset>> {
        self.run(JobKind::Transform, jobs, |(ds, op)| apply(ds, op), Dataset::row_count)
    }

    /// Run the same operation sequence over every dataset, recording history per dataset.
    pub fn apply_pipeline_many(
        &self,
        datasets: &[Dataset],
        operations: &[Operation],
    ) -> Vec<TransformResult<(Dataset, Vec<HistoryEntry>)>> {
        self.run(
            JobKind::Pipeline,
            datasets,
            |ds| apply_all(ds, operations),
            |(ds, _)| ds.row_count(),
        )
    }

    fn run<J, T, E, F, R>(&self, kind: JobKind, jobs: &[J], job: F, output_rows: R) -> Vec<Result<T, E>>
    where
        J: Sync,
        T: Send,
        E: Send + fmt::Display,
        F: Fn(&J) -> Result<T, E> + Sync,
        R: Fn(&T) -> usize + Sync,
    {
        self.pool.install(|| {
            let start = Instant::now();
            self.metrics.begin_run();
            self.emit(ExecutionEvent::RunStarted { kind, jobs: jobs.len() });

            let sem = Semaphore::new(self.opts.max_in_flight_jobs);
            let results: Vec<Result<T, E>> = jobs
                .par_iter()
                .enumerate()
                .map(|(index, input)| {
                    let permit = sem.acquire();
                    if permit.waited > Duration::ZERO {
                        self.metrics.on_throttle_wait(permit.waited);
                        self.emit(ExecutionEvent::ThrottleWaited {
                            index,
                            duration: permit.waited,
                        });
                    }

                    self.metrics.on_job_start();
                    self.emit(ExecutionEvent::JobStarted { index });

                    let out = job(input);
                    match &out {
                        Ok(value) => {
                            let rows = output_rows(value);
                            self.metrics.on_job_end(Some(rows));
                            self.emit(ExecutionEvent::JobFinished {
                                index,
                                output_rows: rows,
                            });
                        }
                        Err(e) => {
                            self.metrics.on_job_end(None);
                            self.emit(ExecutionEvent::JobFailed {
                                index,
                                error: e.to_string(),
                            });
                        }
                    }
                    drop(permit);
                    out
                })
                .collect();

            self.metrics.end_run(start.elapsed());
            self.emit(ExecutionEvent::RunFinished {
                elapsed: start.elapsed(),
                metrics: self.metrics.snapshot(),
            });
            results
        })
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ExecutionEngine, ExecutionOptions, JobKind};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use crate::execution::{ExecutionEvent, ExecutionObserver};

    fn engine(threads: usize, in_flight: usize) -> ExecutionEngine {
        ExecutionEngine::new(ExecutionOptions {
            num_threads: Some(threads),
            max_in_flight_jobs: in_flight,
        })
    }

    fn slow_double(x: &usize) -> Result<usize, String> {
        std::thread::sleep(Duration::from_millis(2));
        Ok(x * 2)
    }

    #[test]
    fn results_keep_input_order() {
        let jobs: Vec<usize> = (0..200).collect();
        let out = engine(4, 4).run(JobKind::Transform, &jobs, slow_double, |v| *v);
        let got: Vec<usize> = out.into_iter().map(Result::unwrap).collect();
        assert_eq!(got, jobs.iter().map(|x| x * 2).collect::<Vec<_>>());
    }

    #[test]
    fn jobs_run_concurrently() {
        let jobs: Vec<usize> = (0..100).collect();
        let engine = engine(4, 4);
        let metrics = engine.metrics();
        engine.run(JobKind::Transform, &jobs, slow_double, |_| 1);
        assert!(metrics.snapshot().max_active_jobs > 1);
    }

    struct ConcurrencyObserver {
        active: AtomicUsize,
        max_active: AtomicUsize,
    }

    impl ExecutionObserver for ConcurrencyObserver {
        fn on_event(&self, event: &ExecutionEvent) {
            match event {
                ExecutionEvent::JobStarted { .. } => {
                    let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
                    self.max_active.fetch_max(now, Ordering::SeqCst);
                }
                ExecutionEvent::JobFinished { .. } | ExecutionEvent::JobFailed { .. } => {
                    self.active.fetch_sub(1, Ordering::SeqCst);
                }
                _ => {}
            }
        }
    }

    #[test]
    fn max_in_flight_jobs_throttles_concurrency() {
        let observer = Arc::new(ConcurrencyObserver {
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        });
        let obs_trait: Arc<dyn ExecutionObserver> = observer.clone();
        let engine = engine(4, 1).with_observer(obs_trait);
        let metrics = engine.metrics();

        let jobs: Vec<usize> = (0..40).collect();
        let out = engine.run(JobKind::Transform, &jobs, slow_double, |_| 1);

        assert_eq!(out.len(), jobs.len());
        assert_eq!(observer.max_active.load(Ordering::SeqCst), 1);

        let snap = metrics.snapshot();
        assert_eq!(snap.max_active_jobs, 1);
        assert_eq!(snap.jobs_started, 40);
        assert_eq!(snap.jobs_finished, 40);
        assert_eq!(snap.rows_out, 40);
        assert!(snap.throttle_wait > Duration::ZERO);
        assert!(snap.elapsed.is_some());
    }

    #[test]
    fn failures_are_per_job() {
        let jobs: Vec<usize> = (0..10).collect();
        let engine = engine(2, 2);
        let metrics = engine.metrics();
        let out = engine.run(
            JobKind::Transform,
            &jobs,
            |x| if x % 3 == 0 { Err(format!("job {x} rejected")) } else { Ok(*x) },
            |_| 1,
        );

        let failed: Vec<usize> = out
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.is_err().then_some(i))
            .collect();
        assert_eq!(failed, vec![0, 3, 6, 9]);

        let snap = metrics.snapshot();
        assert_eq!(snap.jobs_failed, 4);
        assert_eq!(snap.jobs_finished, 6);
        assert_eq!(snap.run_id, 1);
    }
}
