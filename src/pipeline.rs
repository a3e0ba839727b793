//! Run coordinator: versioned pass, plain-object pass, bucket finalization.
//!
//! The versioned pass enforces a per-page phase barrier. For every page of
//! the versions listing, all delete markers are drained through a worker
//! pool before the first version delete of that page is submitted. Removing
//! a delete marker can resurrect the version underneath it; deleting the
//! version first and the marker second would leave a live object behind.
//!
//! The plain-object pass has no such hazard, so a single pool spans all of
//! its pages. Finalization removes the bucket itself and is attempted
//! exactly once, with no retry; a non-empty bucket (abandoned jobs) simply
//! fails there.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::Config;
use crate::executor::DeleteExecutor;
use crate::pool::WorkerPool;
use crate::retry::{ExponentialBackoff, RetryPolicy};
use crate::storage::{Storage, s3::create_storage};
use crate::types::error::NukeError;
use crate::types::token::PipelineCancellationToken;
use crate::types::{DeletionJob, NukeStatsReport, NukeSummary, VersionsCursor};

/// Deletes the full contents of a versioned bucket, then the bucket.
///
/// Construct with [`BucketNuker::new`] and drive with [`run`](Self::run).
/// A nuker is single-use: `run` walks the bucket to completion (or to the
/// first fatal error) and returns the aggregate counts.
pub struct BucketNuker {
    config: Config,
    storage: Storage,
    policy: Arc<dyn RetryPolicy>,
    cancellation_token: PipelineCancellationToken,
    stats: Arc<NukeStatsReport>,
}

impl BucketNuker {
    /// Build a nuker backed by a real S3 client.
    ///
    /// Resolves the bucket region (unless one was configured) and
    /// constructs the client. Failures here are usage errors: nothing has
    /// been deleted yet.
    pub async fn new(
        config: Config,
        cancellation_token: PipelineCancellationToken,
    ) -> Result<Self, NukeError> {
        let storage = create_storage(&config)
            .await
            .map_err(|e| NukeError::Usage(e.to_string()))?;

        Ok(Self::with_storage(config, storage, cancellation_token))
    }

    /// Build a nuker over an existing storage handle.
    pub fn with_storage(
        config: Config,
        storage: Storage,
        cancellation_token: PipelineCancellationToken,
    ) -> Self {
        let policy: Arc<dyn RetryPolicy> =
            Arc::new(ExponentialBackoff::from(config.backoff_config));

        Self {
            config,
            storage,
            policy,
            cancellation_token,
            stats: Arc::new(NukeStatsReport::new()),
        }
    }

    #[cfg(test)]
    fn with_policy(mut self, policy: Arc<dyn RetryPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Run the full eviction: versioned pass, object pass, bucket deletion.
    ///
    /// Abandoned jobs (retry budget exhausted) do not fail the run; they
    /// surface in the returned summary and, if they left the bucket
    /// non-empty, as a [`NukeError::Finalize`] from the DeleteBucket call.
    pub async fn run(&self) -> Result<NukeSummary, NukeError> {
        info!(
            bucket = self.config.bucket,
            worker_size = self.config.worker_size,
            "bucket eviction started."
        );

        self.delete_versioned_entries().await?;
        self.delete_plain_objects().await?;
        self.check_cancelled()?;
        self.finalize().await?;

        let summary = self.stats.snapshot();
        info!(
            bucket = self.config.bucket,
            deleted = summary.deleted,
            abandoned = summary.abandoned,
            "bucket eviction completed."
        );

        Ok(summary)
    }

    /// Walk the versions listing page by page, draining each page's delete
    /// markers before its versions.
    async fn delete_versioned_entries(&self) -> Result<(), NukeError> {
        let mut cursor: Option<VersionsCursor> = None;
        let mut page_count: u64 = 0;

        loop {
            self.check_cancelled()?;

            let page = self
                .storage
                .list_versions_page(cursor)
                .await
                .map_err(|e| NukeError::Listing {
                    bucket: self.config.bucket.clone(),
                    source: e,
                })?;
            page_count += 1;

            debug!(
                page = page_count,
                markers = page.markers.len(),
                versions = page.versions.len(),
                "versions page listed."
            );

            // Phase barrier: the marker pool is fully drained before the
            // first version job is submitted.
            self.drain_phase(page.markers).await?;
            self.drain_phase(page.versions).await?;

            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        debug!(pages = page_count, "versioned pass completed.");
        Ok(())
    }

    /// Walk the plain-objects listing, feeding one pool across all pages.
    async fn delete_plain_objects(&self) -> Result<(), NukeError> {
        let pool = self.build_pool();
        let mut continuation: Option<String> = None;
        let mut page_count: u64 = 0;

        loop {
            if self.cancellation_token.is_cancelled() {
                let _ = pool.wait().await;
                return Err(NukeError::Cancelled);
            }

            let page = match self.storage.list_objects_page(continuation).await {
                Ok(page) => page,
                Err(e) => {
                    // Let in-flight deletes finish before aborting.
                    let _ = pool.wait().await;
                    return Err(NukeError::Listing {
                        bucket: self.config.bucket.clone(),
                        source: e,
                    });
                }
            };
            page_count += 1;

            debug!(
                page = page_count,
                objects = page.objects.len(),
                "objects page listed."
            );

            for job in page.objects {
                self.submit(&pool, job).await?;
            }

            match page.next {
                Some(next) => continuation = Some(next),
                None => break,
            }
        }

        pool.wait()
            .await
            .map_err(|e| NukeError::Pipeline(e.to_string()))?;

        debug!(pages = page_count, "object pass completed.");
        Ok(())
    }

    /// Drain one phase of one page: a fresh pool consumes every job, then
    /// shuts down. An empty job set is a no-op.
    async fn drain_phase(&self, jobs: Vec<DeletionJob>) -> Result<(), NukeError> {
        if jobs.is_empty() {
            return Ok(());
        }

        let pool = self.build_pool();
        for job in jobs {
            self.submit(&pool, job).await?;
        }
        pool.wait()
            .await
            .map_err(|e| NukeError::Pipeline(e.to_string()))
    }

    // Cancellation stops the workers, so a full queue would otherwise block
    // submission forever.
    async fn submit(&self, pool: &WorkerPool, job: DeletionJob) -> Result<(), NukeError> {
        tokio::select! {
            result = pool.submit(job) => {
                result.map_err(|e| NukeError::Pipeline(e.to_string()))
            }
            _ = self.cancellation_token.cancelled() => Err(NukeError::Cancelled),
        }
    }

    fn build_pool(&self) -> WorkerPool {
        let executor = Arc::new(DeleteExecutor::new(
            self.storage.clone(),
            self.policy.clone(),
            self.cancellation_token.clone(),
            self.stats.clone(),
        ));

        WorkerPool::start(
            self.config.worker_size,
            self.config.queue_size,
            executor,
            self.cancellation_token.clone(),
        )
    }

    /// Delete the emptied bucket. Attempted exactly once; any failure is
    /// fatal for the run.
    async fn finalize(&self) -> Result<(), NukeError> {
        self.storage
            .delete_bucket()
            .await
            .map_err(|e| NukeError::Finalize {
                bucket: self.config.bucket.clone(),
                source: e,
            })?;

        info!(bucket = self.config.bucket, "bucket deleted.");
        Ok(())
    }

    fn check_cancelled(&self) -> Result<(), NukeError> {
        if self.cancellation_token.is_cancelled() {
            return Err(NukeError::Cancelled);
        }
        Ok(())
    }
}
