//! Batched submission of resident records

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use futures::future::join_all;
use log::{info, warn};

use crate::api::ResidentBackend;
use crate::import::records::{ResidentRecord, SignupPayload};

/// Records submitted per batch. Requests inside a batch run concurrently;
/// batches run strictly one after another, so this is also the upper bound
/// on in-flight requests.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Options for one submission run.
#[derive(Debug, Clone)]
pub struct SubmitOptions {
    pub batch_size: usize,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Shared counters for a submission run.
///
/// Counters advance only after a whole batch has settled, so an observer
/// sees monotonically non-decreasing values whose sum is always a number
/// of fully processed records, never a mid-batch partial.
#[derive(Debug, Default)]
pub struct SubmitProgress {
    succeeded: AtomicUsize,
    failed: AtomicUsize,
}

impl SubmitProgress {
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    fn record_batch(&self, succeeded: usize, failed: usize) {
        self.succeeded.fetch_add(succeeded, Ordering::Relaxed);
        self.failed.fetch_add(failed, Ordering::Relaxed);
    }
}

/// Point-in-time view of the progress counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub succeeded: usize,
    pub failed: usize,
}

impl ProgressSnapshot {
    /// Records fully processed so far.
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// What happened in one settled batch.
#[derive(Debug, Clone, Copy)]
pub struct BatchReport {
    /// 1-based batch number.
    pub batch: usize,
    pub total_batches: usize,
    /// Records in this batch.
    pub size: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Aggregate result of a submission run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub batches: usize,
}

impl SubmitSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Sequential-batch, concurrent-within-batch submitter.
///
/// A failed record never aborts the run: it is counted and the remaining
/// records still get their attempt. There is no retry; a re-run of the
/// sheet is the recovery path.
pub struct BatchSubmitter<'a> {
    backend: &'a dyn ResidentBackend,
    options: SubmitOptions,
    progress: Arc<SubmitProgress>,
}

impl<'a> BatchSubmitter<'a> {
    pub fn new(backend: &'a dyn ResidentBackend, options: SubmitOptions) -> Self {
        Self {
            backend,
            options,
            progress: Arc::new(SubmitProgress::default()),
        }
    }

    /// Handle to the live counters for observers outside the run.
    pub fn progress(&self) -> Arc<SubmitProgress> {
        Arc::clone(&self.progress)
    }

    /// Submit every record, batch by batch.
    pub async fn submit(&self, records: &[ResidentRecord]) -> SubmitSummary {
        self.submit_with(records, |_| {}).await
    }

    /// Submit every record, invoking `on_batch` after each batch settles.
    /// The progress counters are already updated when the callback runs.
    pub async fn submit_with<F>(&self, records: &[ResidentRecord], mut on_batch: F) -> SubmitSummary
    where
        F: FnMut(&BatchReport),
    {
        let batch_size = self.options.batch_size.max(1);
        let total_batches = records.len().div_ceil(batch_size);

        let mut total_succeeded = 0;
        let mut total_failed = 0;

        for (index, batch) in records.chunks(batch_size).enumerate() {
            let started = Instant::now();
            let (succeeded, failed) = self.submit_batch(batch).await;
            self.progress.record_batch(succeeded, failed);
            total_succeeded += succeeded;
            total_failed += failed;

            let report = BatchReport {
                batch: index + 1,
                total_batches,
                size: batch.len(),
                succeeded,
                failed,
            };
            info!(
                "batch {}/{}: {} succeeded, {} failed in {}ms",
                report.batch,
                report.total_batches,
                succeeded,
                failed,
                started.elapsed().as_millis()
            );
            on_batch(&report);
        }

        SubmitSummary {
            total: records.len(),
            succeeded: total_succeeded,
            failed: total_failed,
            batches: total_batches,
        }
    }

    /// Fan one batch out and wait for every request to settle.
    async fn submit_batch(&self, batch: &[ResidentRecord]) -> (usize, usize) {
        let requests = batch.iter().map(|record| self.submit_record(record));
        let outcomes = join_all(requests).await;

        let succeeded = outcomes.iter().filter(|ok| **ok).count();
        (succeeded, outcomes.len() - succeeded)
    }

    /// Submit one record. Failures collapse to `false` and stay inside
    /// the record boundary.
    async fn submit_record(&self, record: &ResidentRecord) -> bool {
        let payload = SignupPayload::from_record(record);
        match self.backend.resident_signup(&payload).await {
            Ok(outcome) if outcome.is_success() => true,
            Ok(outcome) => {
                warn!(
                    "signup rejected for {}: {}",
                    payload.username,
                    outcome.error.as_deref().unwrap_or("unknown error")
                );
                false
            }
            Err(err) => {
                warn!("signup failed for {}: {:#}", payload.username, err);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SignupOutcome;
    use anyhow::{Result, bail};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;

    struct ScriptedBackend {
        fail_names: HashSet<String>,
        error_names: HashSet<String>,
        calls: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        delay: Option<Duration>,
    }

    impl ScriptedBackend {
        fn new() -> Self {
            Self {
                fail_names: HashSet::new(),
                error_names: HashSet::new(),
                calls: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                delay: None,
            }
        }

        fn failing(names: &[&str]) -> Self {
            let mut backend = Self::new();
            backend.fail_names = names.iter().map(|n| n.to_string()).collect();
            backend
        }

        fn erroring(names: &[&str]) -> Self {
            let mut backend = Self::new();
            backend.error_names = names.iter().map(|n| n.to_string()).collect();
            backend
        }

        fn with_delay(delay: Duration) -> Self {
            let mut backend = Self::new();
            backend.delay = Some(delay);
            backend
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ResidentBackend for ScriptedBackend {
        async fn resident_signup(&self, payload: &SignupPayload) -> Result<SignupOutcome> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.calls.lock().unwrap().push(payload.name.clone());

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.error_names.contains(&payload.name) {
                bail!("connection reset");
            }
            if self.fail_names.contains(&payload.name) {
                return Ok(SignupOutcome::error("HTTP 422: rejected", Some(422)));
            }
            Ok(SignupOutcome::success(201))
        }
    }

    /// Records named r1..rN, in order.
    fn residents(count: usize) -> Vec<ResidentRecord> {
        (1..=count)
            .map(|i| ResidentRecord {
                name: format!("r{}", i),
                ..Default::default()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_partial_failures_are_counted_not_fatal() {
        // 23 records failing at positions 5, 12 and 20 (1-indexed).
        let backend = ScriptedBackend::failing(&["r5", "r12", "r20"]);
        let submitter = BatchSubmitter::new(&backend, SubmitOptions::default());

        let summary = submitter.submit(&residents(23)).await;

        assert_eq!(summary.total, 23);
        assert_eq!(summary.succeeded, 20);
        assert_eq!(summary.failed, 3);
        assert_eq!(summary.batches, 3);
        assert!(!summary.all_succeeded());
        assert_eq!(backend.calls().len(), 23);
    }

    #[tokio::test]
    async fn test_progress_advances_only_at_batch_boundaries() {
        let backend = ScriptedBackend::failing(&["r5", "r12", "r20"]);
        let submitter = BatchSubmitter::new(&backend, SubmitOptions::default());
        let progress = submitter.progress();

        let mut seen = Vec::new();
        submitter
            .submit_with(&residents(23), |_| seen.push(progress.snapshot()))
            .await;

        assert_eq!(
            seen,
            vec![
                ProgressSnapshot {
                    succeeded: 9,
                    failed: 1
                },
                ProgressSnapshot {
                    succeeded: 17,
                    failed: 3
                },
                ProgressSnapshot {
                    succeeded: 20,
                    failed: 3
                },
            ]
        );
        assert_eq!(
            seen.iter().map(|s| s.processed()).collect::<Vec<_>>(),
            vec![10, 20, 23]
        );
    }

    #[tokio::test]
    async fn test_batches_are_sequential_and_contiguous() {
        let backend = ScriptedBackend::new();
        let submitter = BatchSubmitter::new(&backend, SubmitOptions::default());

        submitter.submit(&residents(23)).await;

        let calls = backend.calls();
        assert_eq!(calls.len(), 23);

        // Order within a batch is up to the scheduler, but a batch never
        // starts before the previous one has fully settled.
        for (start, end) in [(0, 10), (10, 20), (20, 23)] {
            let mut got = calls[start..end].to_vec();
            got.sort();
            let mut want: Vec<String> = (start + 1..=end).map(|i| format!("r{}", i)).collect();
            want.sort();
            assert_eq!(got, want);
        }
    }

    #[tokio::test]
    async fn test_in_flight_never_exceeds_batch_size() {
        let backend = ScriptedBackend::with_delay(Duration::from_millis(20));
        let submitter = BatchSubmitter::new(&backend, SubmitOptions::default());

        submitter.submit(&residents(23)).await;

        assert_eq!(backend.max_in_flight.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_backend_errors_count_as_failures() {
        let backend = ScriptedBackend::erroring(&["r2"]);
        let submitter = BatchSubmitter::new(&backend, SubmitOptions::default());

        let summary = submitter.submit(&residents(3)).await;

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        // The error stayed inside its record: r3 was still attempted.
        assert_eq!(backend.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_input_is_a_noop() {
        let backend = ScriptedBackend::new();
        let submitter = BatchSubmitter::new(&backend, SubmitOptions::default());

        let summary = submitter.submit(&[]).await;

        assert_eq!(
            summary,
            SubmitSummary {
                total: 0,
                succeeded: 0,
                failed: 0,
                batches: 0
            }
        );
        assert!(summary.all_succeeded());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_custom_batch_size_partitions_remainder() {
        let backend = ScriptedBackend::new();
        let submitter = BatchSubmitter::new(&backend, SubmitOptions { batch_size: 3 });

        let mut sizes = Vec::new();
        let summary = submitter
            .submit_with(&residents(7), |report| sizes.push(report.size))
            .await;

        assert_eq!(sizes, vec![3, 3, 1]);
        assert_eq!(summary.batches, 3);
    }

    #[tokio::test]
    async fn test_zero_batch_size_degrades_to_one() {
        let backend = ScriptedBackend::new();
        let submitter = BatchSubmitter::new(&backend, SubmitOptions { batch_size: 0 });

        let summary = submitter.submit(&residents(2)).await;

        assert_eq!(summary.batches, 2);
        assert_eq!(summary.succeeded, 2);
    }
}
