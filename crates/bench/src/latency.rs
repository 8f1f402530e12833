//! Per-operation latency recording.
//!
//! Each operation kind gets its own histogram (microsecond resolution).
//! Recording takes a short parking_lot lock on the one histogram involved;
//! workers for different operations never contend on the same lock.

use crate::workload::OpKind;
use hdrhistogram::Histogram;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Shared latency sink for all workers of a run.
///
/// Clones share the same backing histograms, so one recorder can be handed
/// to every worker and read out once at the end.
#[derive(Clone)]
pub struct LatencyRecorder {
    histograms: Arc<[Mutex<Histogram<u64>>; OpKind::COUNT]>,
}

impl LatencyRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self {
            histograms: Arc::new(std::array::from_fn(|_| {
                Mutex::new(Histogram::new(3).expect("histogram creation should succeed"))
            })),
        }
    }

    /// Record one completed operation.
    #[inline]
    pub fn record(&self, kind: OpKind, elapsed: Duration) {
        let mut hist = self.histograms[kind.index()].lock();
        let _ = hist.record(elapsed.as_micros() as u64);
    }

    /// Snapshot every histogram into a report.
    pub fn report(&self) -> LatencyReport {
        let ops = OpKind::ALL
            .iter()
            .map(|&kind| {
                let hist = self.histograms[kind.index()].lock();
                OpLatency {
                    op: kind.label(),
                    count: hist.len(),
                    p50: Duration::from_micros(hist.value_at_quantile(0.50)),
                    p90: Duration::from_micros(hist.value_at_quantile(0.90)),
                    p99: Duration::from_micros(hist.value_at_quantile(0.99)),
                    max: Duration::from_micros(hist.max()),
                }
            })
            .collect();

        LatencyReport { ops }
    }
}

impl Default for LatencyRecorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Latency summary for one operation kind.
#[derive(Debug, Clone, Serialize)]
pub struct OpLatency {
    /// Operation label, as printed in reports.
    pub op: &'static str,
    /// Number of recorded completions.
    pub count: u64,
    /// Median latency.
    pub p50: Duration,
    /// 90th percentile latency.
    pub p90: Duration,
    /// 99th percentile latency.
    pub p99: Duration,
    /// Slowest recorded completion.
    pub max: Duration,
}

/// Per-operation latency summaries, in weight-table order.
#[derive(Debug, Clone, Serialize)]
pub struct LatencyReport {
    /// One row per operation kind, including kinds with no completions.
    pub ops: Vec<OpLatency>,
}

impl LatencyReport {
    /// Whether any operation recorded at least one completion.
    pub fn has_measurements(&self) -> bool {
        self.ops.iter().any(|op| op.count > 0)
    }

    /// Print a summary to stdout, skipping operations that never ran.
    pub fn print_summary(&self) {
        if !self.has_measurements() {
            println!("\nNo latency measurements recorded.");
            return;
        }

        println!("\n--- Latency (per operation) ---");
        for op in &self.ops {
            if op.count == 0 {
                continue;
            }
            println!(
                "  {:<24} count: {:>9} | p50: {:?} | p90: {:?} | p99: {:?} | max: {:?}",
                op.op, op.count, op.p50, op.p90, op.p99, op.max
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_durations_show_up_under_their_kind() {
        let recorder = LatencyRecorder::new();
        recorder.record(OpKind::SubmitOrder, Duration::from_micros(1_200));
        recorder.record(OpKind::SubmitOrder, Duration::from_micros(3_400));
        recorder.record(OpKind::GetProductAndReviews, Duration::from_micros(90));

        let report = recorder.report();
        assert!(report.has_measurements());

        let submit = report
            .ops
            .iter()
            .find(|op| op.op == "submit_order")
            .unwrap();
        assert_eq!(submit.count, 2);
        assert!(submit.p50 <= submit.p99);
        assert!(submit.max >= Duration::from_micros(3_000));

        let reads = report
            .ops
            .iter()
            .find(|op| op.op == "get_product_and_reviews")
            .unwrap();
        assert_eq!(reads.count, 1);
    }

    #[test]
    fn empty_recorder_reports_no_measurements() {
        let report = LatencyRecorder::new().report();
        assert!(!report.has_measurements());
        assert_eq!(report.ops.len(), OpKind::COUNT);
    }

    #[test]
    fn clones_share_the_backing_histograms() {
        let recorder = LatencyRecorder::new();
        let clone = recorder.clone();
        clone.record(OpKind::PostReview, Duration::from_micros(500));

        let report = recorder.report();
        let reviews = report.ops.iter().find(|op| op.op == "post_review").unwrap();
        assert_eq!(reviews.count, 1);
    }
}
