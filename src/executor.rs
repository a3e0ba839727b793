//! Per-job delete execution with retry.
//!
//! One executor instance is shared by every worker in a pool. It owns the
//! storage handle and the retry policy; each call to [`DeleteExecutor::delete_one`]
//! performs one deletion with exponentially backed-off retries.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::retry::RetryPolicy;
use crate::storage::Storage;
use crate::types::token::PipelineCancellationToken;
use crate::types::{DeletionJob, NukeStatsReport, Outcome};

/// Executes single deletions against the backend, applying the retry policy.
///
/// Exhausting the retry budget abandons the job with a warning; it never
/// aborts the worker, the pool, or the run. Failures surface later as a
/// non-empty bucket failing the final DeleteBucket call.
pub struct DeleteExecutor {
    storage: Storage,
    policy: Arc<dyn RetryPolicy>,
    cancellation_token: PipelineCancellationToken,
    stats: Arc<NukeStatsReport>,
}

impl DeleteExecutor {
    pub fn new(
        storage: Storage,
        policy: Arc<dyn RetryPolicy>,
        cancellation_token: PipelineCancellationToken,
        stats: Arc<NukeStatsReport>,
    ) -> Self {
        Self {
            storage,
            policy,
            cancellation_token,
            stats,
        }
    }

    /// Delete one object, version, or marker.
    ///
    /// The cancellation token is checked before every attempt and raced
    /// against every backoff sleep. A success after k transient failures
    /// produces exactly one success log line; an exhausted budget produces
    /// exactly one warning.
    pub async fn delete_one(&self, job: &DeletionJob) -> Outcome {
        let mut attempt: u32 = 1;

        loop {
            if self.cancellation_token.is_cancelled() {
                return Outcome::Cancelled;
            }

            let result = self
                .storage
                .delete_entry(&job.key, job.version_id.clone())
                .await;

            match result {
                Ok(()) => {
                    info!(
                        kind = %job.kind,
                        key = job.key,
                        version_id = job.version_id,
                        attempts = attempt,
                        "delete completed."
                    );
                    self.stats.record_deleted();
                    return Outcome::Deleted { attempts: attempt };
                }
                Err(e) => match self.policy.delay(attempt) {
                    Some(delay) => {
                        debug!(
                            kind = %job.kind,
                            key = job.key,
                            version_id = job.version_id,
                            attempt = attempt,
                            delay_milliseconds = delay.as_millis() as u64,
                            error = %e,
                            "delete attempt failed. retrying after backoff."
                        );

                        tokio::select! {
                            _ = self.cancellation_token.cancelled() => {
                                return Outcome::Cancelled;
                            }
                            _ = tokio::time::sleep(delay) => {}
                        }

                        attempt += 1;
                    }
                    None => {
                        warn!(
                            kind = %job.kind,
                            key = job.key,
                            version_id = job.version_id,
                            attempts = attempt,
                            error = %e,
                            "delete failed after exhausting retries. abandoning job."
                        );
                        self.stats.record_abandoned();
                        return Outcome::Abandoned { attempts: attempt };
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::NoDelay;
    use crate::test_utils::{LogCapture, MockStore, init_dummy_tracing_subscriber};
    use crate::types::token::create_pipeline_cancellation_token;
    use tracing::Level;

    fn make_executor(store: MockStore, max_attempts: u32) -> (DeleteExecutor, Arc<NukeStatsReport>) {
        let stats = Arc::new(NukeStatsReport::new());
        let executor = DeleteExecutor::new(
            Box::new(store),
            Arc::new(NoDelay { max_attempts }),
            create_pipeline_cancellation_token(),
            stats.clone(),
        );
        (executor, stats)
    }

    #[tokio::test]
    async fn delete_succeeds_first_attempt() {
        init_dummy_tracing_subscriber();

        let store = MockStore::empty("test");
        let (executor, stats) = make_executor(store.clone(), 4);

        let job = DeletionJob::object("file.txt");
        let outcome = executor.delete_one(&job).await;

        assert_eq!(outcome, Outcome::Deleted { attempts: 1 });
        assert_eq!(store.delete_calls().len(), 1);
        assert_eq!(stats.snapshot().deleted, 1);
        assert_eq!(stats.snapshot().abandoned, 0);
    }

    #[tokio::test]
    async fn transient_failures_then_success() {
        init_dummy_tracing_subscriber();

        let store = MockStore::empty("test");
        store.fail_times("flaky.txt", 2);
        let (executor, stats) = make_executor(store.clone(), 4);

        let job = DeletionJob::object("flaky.txt");
        let outcome = executor.delete_one(&job).await;

        // 2 transient failures then success: exactly 3 attempts, 1 success.
        assert_eq!(outcome, Outcome::Deleted { attempts: 3 });
        assert_eq!(store.delete_calls().len(), 3);
        assert_eq!(stats.snapshot().deleted, 1);
        assert_eq!(stats.snapshot().abandoned, 0);
    }

    #[tokio::test]
    async fn exhausted_retry_budget_abandons_job() {
        init_dummy_tracing_subscriber();

        let store = MockStore::empty("test");
        store.fail_always("doomed.txt");
        let (executor, stats) = make_executor(store.clone(), 4);

        let job = DeletionJob::version("doomed.txt", "v1");
        let outcome = executor.delete_one(&job).await;

        assert_eq!(outcome, Outcome::Abandoned { attempts: 4 });
        assert_eq!(store.delete_calls().len(), 4);
        assert_eq!(stats.snapshot().deleted, 0);
        assert_eq!(stats.snapshot().abandoned, 1);
    }

    #[tokio::test]
    async fn success_after_retries_logs_exactly_one_completion() {
        let capture = LogCapture::new();
        let _guard = capture.set_default();

        let store = MockStore::empty("test");
        store.fail_times("flaky.txt", 2);
        let (executor, _) = make_executor(store, 5);

        let outcome = executor.delete_one(&DeletionJob::object("flaky.txt")).await;

        assert_eq!(outcome, Outcome::Deleted { attempts: 3 });
        assert_eq!(capture.count(Level::INFO, "delete completed."), 1);
        assert_eq!(capture.count(Level::WARN, "abandoning job."), 0);
    }

    #[tokio::test]
    async fn exhaustion_logs_exactly_one_warning() {
        let capture = LogCapture::new();
        let _guard = capture.set_default();

        let store = MockStore::empty("test");
        store.fail_always("doomed.txt");
        let (executor, _) = make_executor(store, 3);

        let outcome = executor
            .delete_one(&DeletionJob::version("doomed.txt", "v1"))
            .await;

        assert_eq!(outcome, Outcome::Abandoned { attempts: 3 });
        assert_eq!(capture.count(Level::WARN, "abandoning job."), 1);
        assert_eq!(capture.count(Level::INFO, "delete completed."), 0);
    }

    #[tokio::test]
    async fn cancellation_stops_before_first_attempt() {
        init_dummy_tracing_subscriber();

        let store = MockStore::empty("test");
        let stats = Arc::new(NukeStatsReport::new());
        let token = create_pipeline_cancellation_token();
        let executor = DeleteExecutor::new(
            Box::new(store.clone()),
            Arc::new(NoDelay { max_attempts: 4 }),
            token.clone(),
            stats,
        );

        token.cancel();
        let outcome = executor.delete_one(&DeletionJob::object("file.txt")).await;

        assert_eq!(outcome, Outcome::Cancelled);
        assert!(store.delete_calls().is_empty());
    }
}
