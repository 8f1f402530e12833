//! Concurrent driver that sweeps worker counts over the store.
//!
//! One sweep step spawns N worker tasks for a fixed wall-clock duration.
//! Each worker owns a store handle clone and a seeded RNG, generates
//! operations from the weighted mix, runs them, and classifies every outcome
//! into shared atomic counters. A deadline task cancels the token when time
//! is up; workers abandon any in-flight operation at that point and the
//! dropped transaction rolls back on its way out.

use crate::config::RunConfig;
use crate::latency::{LatencyRecorder, LatencyReport};
use crate::workload::{Operation, RetailWorkload};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use storeload_store::{ErrorKind, Store, StoreError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Outcome counters shared by all workers of one sweep step.
pub struct DriverStats {
    /// Operations handed to the store (including ones later abandoned).
    pub submitted: AtomicU64,
    /// Operations that committed.
    pub committed: AtomicU64,
    /// Unique-constraint violations.
    pub duplicate_key: AtomicU64,
    /// Check-constraint violations (drained stock, out-of-range rating).
    pub check_violation: AtomicU64,
    /// Foreign-key violations.
    pub foreign_key: AtomicU64,
    /// Serialization failures and deadlocks.
    pub serialization: AtomicU64,
    /// Rejected credentials.
    pub unauthorized: AtomicU64,
    /// Everything else (connection loss, pool timeout, unexpected states).
    pub other: AtomicU64,
}

impl Default for DriverStats {
    fn default() -> Self {
        Self {
            submitted: AtomicU64::new(0),
            committed: AtomicU64::new(0),
            duplicate_key: AtomicU64::new(0),
            check_violation: AtomicU64::new(0),
            foreign_key: AtomicU64::new(0),
            serialization: AtomicU64::new(0),
            unauthorized: AtomicU64::new(0),
            other: AtomicU64::new(0),
        }
    }
}

impl DriverStats {
    /// Count one committed operation.
    pub fn record_ok(&self) {
        self.committed.fetch_add(1, Ordering::SeqCst);
    }

    /// Count one failed operation under its error kind.
    pub fn record_err(&self, kind: ErrorKind) {
        let counter = match kind {
            ErrorKind::DuplicateKey => &self.duplicate_key,
            ErrorKind::CheckViolation => &self.check_violation,
            ErrorKind::ForeignKey => &self.foreign_key,
            ErrorKind::Serialization => &self.serialization,
            ErrorKind::Unauthorized => &self.unauthorized,
            ErrorKind::Other => &self.other,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Total violations the workload provokes on purpose.
    pub fn expected_violations(&self) -> u64 {
        self.duplicate_key.load(Ordering::SeqCst)
            + self.check_violation.load(Ordering::SeqCst)
            + self.foreign_key.load(Ordering::SeqCst)
            + self.serialization.load(Ordering::SeqCst)
            + self.unauthorized.load(Ordering::SeqCst)
    }

    /// Committed operations per second over `elapsed`.
    pub fn committed_tps(&self, elapsed: Duration) -> f64 {
        let secs = elapsed.as_secs_f64();
        if secs > 0.0 {
            self.committed.load(Ordering::SeqCst) as f64 / secs
        } else {
            0.0
        }
    }
}

/// Drives the workload against the store across a sweep of worker counts.
pub struct Driver {
    store: Store,
    workload: RetailWorkload,
    run: RunConfig,
    base_seed: u64,
}

impl Driver {
    /// Create a driver. The base seed comes from config, or from the clock
    /// when none is set.
    pub fn new(store: Store, workload: RetailWorkload, run: RunConfig) -> Self {
        let base_seed = run.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos() as u64
        });

        Self {
            store,
            workload,
            run,
            base_seed,
        }
    }

    /// Run one timed step per configured worker count.
    ///
    /// Every step starts from the same base seed, so each concurrency level
    /// generates the same operation stream shape; only the interleaving
    /// against the database differs.
    pub async fn run_sweep(&self) -> SweepReport {
        let duration = Duration::from_secs(self.run.duration_secs);
        let mut steps = Vec::with_capacity(self.run.workers.len());

        for &workers in &self.run.workers {
            let report = self.run_for(duration, workers).await;
            report.print();
            steps.push(report);
        }

        let sweep = SweepReport { steps };
        sweep.print_summary();
        sweep
    }

    /// Run one step for a fixed duration.
    pub async fn run_for(&self, duration: Duration, num_workers: usize) -> RunReport {
        let cancel = CancellationToken::new();
        let cancel_clone = cancel.clone();

        // Spawn a task to cancel after duration
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            cancel_clone.cancel();
        });

        self.run_until_cancelled(cancel, num_workers).await
    }

    /// Run one step until the cancellation token fires.
    pub async fn run_until_cancelled(
        &self,
        cancel: CancellationToken,
        num_workers: usize,
    ) -> RunReport {
        let start = Instant::now();
        let stats = Arc::new(DriverStats::default());
        let latency = LatencyRecorder::new();

        info!(
            workers = num_workers,
            duration_secs = self.run.duration_secs,
            isolation = %self.store.isolation(),
            seed = self.base_seed,
            "Starting driver step"
        );

        let mut handles = Vec::with_capacity(num_workers);
        for worker_id in 0..num_workers {
            let worker = Worker {
                worker_id,
                store: self.store.clone(),
                workload: self.workload.clone(),
                stats: Arc::clone(&stats),
                latency: latency.clone(),
            };

            // Each worker has its own RNG with a unique seed
            let seed = self.base_seed.wrapping_add(worker_id as u64 * 1000);
            let cancel = cancel.clone();
            let handle = tokio::spawn(async move {
                worker.run(cancel, seed).await;
            });
            handles.push(handle);
        }

        // Spawn progress reporter
        let stats_for_progress = Arc::clone(&stats);
        let progress_interval = Duration::from_secs(self.run.progress_interval_secs);
        let cancel_for_progress = cancel.clone();

        let progress_handle = tokio::spawn(async move {
            let mut last_progress = Instant::now();
            loop {
                if cancel_for_progress.is_cancelled() {
                    break;
                }

                if last_progress.elapsed() >= progress_interval {
                    print_progress(&stats_for_progress, start.elapsed());
                    last_progress = Instant::now();
                }

                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        });

        // Wait for all workers; a panicking worker is isolated and counted.
        let mut worker_failures = 0u64;
        for handle in handles {
            if let Err(e) = handle.await {
                worker_failures += 1;
                warn!(error = %e, "Worker task failed");
            }
        }

        progress_handle.abort();

        // Print final progress
        print_progress(&stats, start.elapsed());

        RunReport::build(
            num_workers,
            start.elapsed(),
            &stats,
            worker_failures,
            latency.report(),
        )
    }
}

/// A worker task: owns its RNG, shares the stats and latency sinks.
struct Worker {
    worker_id: usize,
    store: Store,
    workload: RetailWorkload,
    stats: Arc<DriverStats>,
    latency: LatencyRecorder,
}

impl Worker {
    async fn run(self, cancel: CancellationToken, seed: u64) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        debug!(worker_id = self.worker_id, seed, "Worker started");

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let op = self.workload.generate(&mut rng);
            let kind = op.kind();
            self.stats.submitted.fetch_add(1, Ordering::SeqCst);
            let started = Instant::now();

            // Abandon the in-flight operation at the deadline; dropping the
            // transaction rolls it back.
            let result = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.apply(op) => result,
            };

            self.latency.record(kind, started.elapsed());

            match result {
                Ok(()) => self.stats.record_ok(),
                Err(e) => {
                    let error_kind = e.kind();
                    self.stats.record_err(error_kind);
                    if error_kind.is_expected() {
                        debug!(worker_id = self.worker_id, error = %e, "Expected violation");
                    } else {
                        warn!(worker_id = self.worker_id, error = %e, "Operation failed");
                    }
                }
            }
        }

        debug!(worker_id = self.worker_id, "Worker stopped");
    }

    /// Run one generated operation through its store method.
    async fn apply(&self, op: Operation) -> Result<(), StoreError> {
        match op {
            Operation::CreateAccount(account) => self.store.create_account(&account).await,
            Operation::AddProduct {
                name,
                description,
                price,
                stock,
            } => self
                .store
                .add_product(&name, description.as_deref(), price, stock)
                .await
                .map(|_| ()),
            Operation::UpdateStockLevel { product_id, delta } => self
                .store
                .update_stock_level(product_id, delta)
                .await
                .map(|_| ()),
            Operation::GetProductAndReviews { product_id } => self
                .store
                .get_product_and_reviews(product_id)
                .await
                .map(|_| ()),
            Operation::GetAverageUserRating { username } => self
                .store
                .get_average_user_rating(&username)
                .await
                .map(|_| ()),
            Operation::SubmitOrder {
                credentials,
                line_items,
                order_date,
            } => self
                .store
                .submit_order(&credentials, &line_items, order_date)
                .await
                .map(|_| ()),
            Operation::PostReview {
                credentials,
                product_id,
                review_text,
                rating,
            } => self
                .store
                .post_review(&credentials, product_id, review_text.as_deref(), rating)
                .await,
        }
    }
}

/// Print one progress line.
fn print_progress(stats: &DriverStats, elapsed: Duration) {
    let submitted = stats.submitted.load(Ordering::SeqCst);
    let committed = stats.committed.load(Ordering::SeqCst);
    let violations = stats.expected_violations();
    let errors = stats.other.load(Ordering::SeqCst);
    let tps = stats.committed_tps(elapsed);

    println!(
        "[{:>3}s] submitted: {} | committed: {} | violations: {} | errors: {} | tps: {:.0}",
        elapsed.as_secs(),
        submitted,
        committed,
        violations,
        errors,
        tps
    );
}

/// Report for one sweep step.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Worker count of this step.
    pub workers: usize,
    /// Measured wall-clock duration.
    pub duration: Duration,
    /// Operations handed to the store.
    pub submitted: u64,
    /// Operations that committed.
    pub committed: u64,
    /// Unique-constraint violations.
    pub duplicate_key: u64,
    /// Check-constraint violations.
    pub check_violation: u64,
    /// Foreign-key violations.
    pub foreign_key: u64,
    /// Serialization failures and deadlocks.
    pub serialization: u64,
    /// Rejected credentials.
    pub unauthorized: u64,
    /// Unexpected errors.
    pub other_errors: u64,
    /// Worker tasks that panicked instead of finishing.
    pub worker_failures: u64,
    /// Committed operations per second.
    pub committed_tps: f64,
    /// Per-operation latency summaries.
    pub latency: LatencyReport,
}

impl RunReport {
    fn build(
        workers: usize,
        duration: Duration,
        stats: &DriverStats,
        worker_failures: u64,
        latency: LatencyReport,
    ) -> Self {
        Self {
            workers,
            duration,
            submitted: stats.submitted.load(Ordering::SeqCst),
            committed: stats.committed.load(Ordering::SeqCst),
            duplicate_key: stats.duplicate_key.load(Ordering::SeqCst),
            check_violation: stats.check_violation.load(Ordering::SeqCst),
            foreign_key: stats.foreign_key.load(Ordering::SeqCst),
            serialization: stats.serialization.load(Ordering::SeqCst),
            unauthorized: stats.unauthorized.load(Ordering::SeqCst),
            other_errors: stats.other.load(Ordering::SeqCst),
            worker_failures,
            committed_tps: stats.committed_tps(duration),
            latency,
        }
    }

    /// Total violations the workload provokes on purpose.
    pub fn expected_violations(&self) -> u64 {
        self.duplicate_key
            + self.check_violation
            + self.foreign_key
            + self.serialization
            + self.unauthorized
    }

    /// Print the report to stdout.
    pub fn print(&self) {
        println!("\n=== Run Report (workers: {}) ===", self.workers);
        println!("Duration:        {:?}", self.duration);
        println!("Submitted:       {}", self.submitted);
        println!("Committed:       {}", self.committed);
        println!("Duplicate key:   {}", self.duplicate_key);
        println!("Check violation: {}", self.check_violation);
        println!("Foreign key:     {}", self.foreign_key);
        println!("Serialization:   {}", self.serialization);
        println!("Unauthorized:    {}", self.unauthorized);
        println!("Other errors:    {}", self.other_errors);
        println!("Worker failures: {}", self.worker_failures);
        println!("Committed TPS:   {:.2}", self.committed_tps);

        self.latency.print_summary();
    }
}

/// Reports for a whole sweep, in configured order.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    /// One report per sweep step.
    pub steps: Vec<RunReport>,
}

impl SweepReport {
    /// Print a one-line-per-step summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Sweep Summary ===");
        for step in &self.steps {
            println!(
                "workers: {:>3} | committed: {:>10} | violations: {:>8} | errors: {:>6} | tps: {:.0}",
                step.workers,
                step.committed,
                step.expected_violations(),
                step.other_errors,
                step.committed_tps
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_land_in_their_outcome_counter() {
        let stats = DriverStats::default();
        stats.record_ok();
        stats.record_err(ErrorKind::DuplicateKey);
        stats.record_err(ErrorKind::DuplicateKey);
        stats.record_err(ErrorKind::CheckViolation);
        stats.record_err(ErrorKind::Serialization);
        stats.record_err(ErrorKind::Unauthorized);
        stats.record_err(ErrorKind::Other);

        assert_eq!(stats.committed.load(Ordering::SeqCst), 1);
        assert_eq!(stats.duplicate_key.load(Ordering::SeqCst), 2);
        assert_eq!(stats.check_violation.load(Ordering::SeqCst), 1);
        assert_eq!(stats.foreign_key.load(Ordering::SeqCst), 0);
        assert_eq!(stats.serialization.load(Ordering::SeqCst), 1);
        assert_eq!(stats.unauthorized.load(Ordering::SeqCst), 1);
        assert_eq!(stats.other.load(Ordering::SeqCst), 1);
        assert_eq!(stats.expected_violations(), 5);
    }

    #[test]
    fn committed_tps_divides_by_elapsed() {
        let stats = DriverStats::default();
        for _ in 0..100 {
            stats.record_ok();
        }

        assert_eq!(stats.committed_tps(Duration::from_secs(2)), 50.0);
        assert_eq!(stats.committed_tps(Duration::ZERO), 0.0);
    }

    #[test]
    fn report_copies_counters_and_derives_tps() {
        let stats = DriverStats::default();
        stats.submitted.store(10, Ordering::SeqCst);
        for _ in 0..6 {
            stats.record_ok();
        }
        stats.record_err(ErrorKind::DuplicateKey);
        stats.record_err(ErrorKind::Other);

        let report = RunReport::build(
            4,
            Duration::from_secs(3),
            &stats,
            1,
            crate::latency::LatencyRecorder::new().report(),
        );

        assert_eq!(report.workers, 4);
        assert_eq!(report.submitted, 10);
        assert_eq!(report.committed, 6);
        assert_eq!(report.duplicate_key, 1);
        assert_eq!(report.other_errors, 1);
        assert_eq!(report.worker_failures, 1);
        assert_eq!(report.expected_violations(), 1);
        assert_eq!(report.committed_tps, 2.0);
    }
}
