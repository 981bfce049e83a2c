use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Kind of job a batch run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Parse,
    Transform,
    Pipeline,
}

/// Execution events emitted by the engine.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted { kind: JobKind, jobs: usize },
    ThrottleWaited { index: usize, duration: Duration },
    JobStarted { index: usize },
    JobFinished { index: usize, output_rows: usize },
    JobFailed { index: usize, error: String },
    RunFinished {
        elapsed: Duration,
        metrics: ExecutionMetricsSnapshot,
    },
}

/// Observer hook for execution events.
pub trait ExecutionObserver: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent);
}

/// A simple stderr logger for execution events.
#[derive(Default)]
pub struct StdErrExecutionObserver;

impl ExecutionObserver for StdErrExecutionObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        match event {
            ExecutionEvent::RunFinished { metrics, .. } => eprintln!("[execution] finished: {metrics}"),
            ExecutionEvent::JobFailed { index, error } => eprintln!("[execution] job {index} failed: {error}"),
            other => eprintln!("[execution] {other:?}"),
        }
    }
}

/// Forwards execution events to the `log` facade (target `tabular_prep::execution`).
#[derive(Default)]
pub struct LogExecutionObserver;

impl ExecutionObserver for LogExecutionObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        const TARGET: &str = "tabular_prep::execution";
        match event {
            ExecutionEvent::RunFinished { metrics, .. } => log::info!(target: TARGET, "run finished: {metrics}"),
            ExecutionEvent::JobFailed { index, error } => log::warn!(target: TARGET, "job {index} failed: {error}"),
            other => log::trace!(target: TARGET, "{other:?}"),
        }
    }
}

/// Real-time metrics for an execution run.
///
/// The engine updates these counters during execution; callers can snapshot them at any time.
/// Counters reset when a new run begins.
#[derive(Default)]
pub struct ExecutionMetrics {
    run_id: AtomicU64,
    elapsed_ns: AtomicU64,

    jobs_started: AtomicU64,
    jobs_finished: AtomicU64,
    jobs_failed: AtomicU64,
    rows_out: AtomicU64,
    throttle_wait_ns: AtomicU64,

    active_jobs: AtomicUsize,
    max_active_jobs: AtomicUsize,
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn begin_run(&self) {
        self.run_id.fetch_add(1, Ordering::SeqCst);
        self.elapsed_ns.store(0, Ordering::SeqCst);
        self.jobs_started.store(0, Ordering::SeqCst);
        self.jobs_finished.store(0, Ordering::SeqCst);
        self.jobs_failed.store(0, Ordering::SeqCst);
        self.rows_out.store(0, Ordering::SeqCst);
        self.throttle_wait_ns.store(0, Ordering::SeqCst);
        self.active_jobs.store(0, Ordering::SeqCst);
        self.max_active_jobs.store(0, Ordering::SeqCst);
    }

    pub(crate) fn end_run(&self, elapsed: Duration) {
        self.elapsed_ns.store(saturating_nanos(elapsed), Ordering::SeqCst);
    }

    pub(crate) fn on_job_start(&self) {
        self.jobs_started.fetch_add(1, Ordering::SeqCst);
        let now = self.active_jobs.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active_jobs.fetch_max(now, Ordering::SeqCst);
    }

    pub(crate) fn on_job_end(&self, output_rows: Option<usize>) {
        match output_rows {
            Some(rows) => {
                self.jobs_finished.fetch_add(1, Ordering::SeqCst);
                self.rows_out.fetch_add(rows as u64, Ordering::SeqCst);
            }
            None => {
                self.jobs_failed.fetch_add(1, Ordering::SeqCst);
            }
        }
        self.active_jobs.fetch_sub(1, Ordering::SeqCst);
    }

    pub(crate) fn on_throttle_wait(&self, d: Duration) {
        self.throttle_wait_ns.fetch_add(saturating_nanos(d), Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> ExecutionMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::SeqCst);
        ExecutionMetricsSnapshot {
            run_id: self.run_id.load(Ordering::SeqCst),
            elapsed: (elapsed_ns > 0).then(|| Duration::from_nanos(elapsed_ns)),
            jobs_started: self.jobs_started.load(Ordering::SeqCst),
            jobs_finished: self.jobs_finished.load(Ordering::SeqCst),
            jobs_failed: self.jobs_failed.load(Ordering::SeqCst),
            rows_out: self.rows_out.load(Ordering::SeqCst),
            throttle_wait: Duration::from_nanos(self.throttle_wait_ns.load(Ordering::SeqCst)),
            max_active_jobs: self.max_active_jobs.load(Ordering::SeqCst),
        }
    }
}

fn saturating_nanos(d: Duration) -> u64 {
    d.as_nanos().min(u64::MAX as u128) as u64
}

/// Immutable snapshot of [`ExecutionMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionMetricsSnapshot {
    pub run_id: u64,
    /// `None` while a run is in progress.
    pub elapsed: Option<Duration>,
    pub jobs_started: u64,
    /// Jobs that returned `Ok`.
    pub jobs_finished: u64,
    pub jobs_failed: u64,
    /// Rows across all successful job outputs.
    pub rows_out: u64,
    pub throttle_wait: Duration,
    pub max_active_jobs: usize,
}

impl fmt::Display for ExecutionMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run_id={}, jobs={}/{} (failed={}), rows_out={}, max_active_jobs={}, throttle_wait={:?}, elapsed={:?}",
            self.run_id,
            self.jobs_finished,
            self.jobs_started,
            self.jobs_failed,
            self.rows_out,
            self.max_active_jobs,
            self.throttle_wait,
            self.elapsed
        )
    }
}
