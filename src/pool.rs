//! Fixed-size worker pool draining a bounded job queue.
//!
//! Workers are tokio tasks sharing one `async_channel` MPMC receiver. The
//! bounded channel is the backpressure mechanism: `submit` awaits once the
//! queue is full, so memory stays bounded no matter how large the bucket is.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_channel::Sender;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::executor::DeleteExecutor;
use crate::types::DeletionJob;
use crate::types::token::PipelineCancellationToken;

/// A single-use pool of concurrent delete workers.
///
/// Lifecycle: [`WorkerPool::start`] → any number of [`submit`](Self::submit)
/// calls → [`close`](Self::close) → [`wait`](Self::wait). A closed and
/// drained pool is consumed by `wait`; each phase builds a fresh pool.
///
/// Every submitted job is delivered to exactly one worker; workers never
/// duplicate or drop jobs. Processing order across workers is unspecified.
pub struct WorkerPool {
    sender: Sender<DeletionJob>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `worker_count` workers behind a queue of `queue_size` slots.
    pub fn start(
        worker_count: u16,
        queue_size: usize,
        executor: Arc<DeleteExecutor>,
        cancellation_token: PipelineCancellationToken,
    ) -> Self {
        let (sender, receiver) = async_channel::bounded::<DeletionJob>(queue_size);

        let handles = (0..worker_count)
            .map(|worker_index| {
                let receiver = receiver.clone();
                let executor = executor.clone();
                let cancellation_token = cancellation_token.clone();

                tokio::spawn(async move {
                    debug!(worker_index, "delete worker started.");
                    loop {
                        tokio::select! {
                            recv_result = receiver.recv() => {
                                match recv_result {
                                    Ok(job) => {
                                        executor.delete_one(&job).await;
                                    }
                                    // Channel closed and drained.
                                    Err(_) => break,
                                }
                            }
                            _ = cancellation_token.cancelled() => {
                                info!(worker_index, "delete worker has been cancelled.");
                                return;
                            }
                        }
                    }
                    debug!(worker_index, "delete worker has been completed.");
                })
            })
            .collect();

        Self { sender, handles }
    }

    /// Queue a job for deletion.
    ///
    /// Awaits while the queue is full (deliberate backpressure). Fails only
    /// if the pool was already closed, which is a coordinator bug.
    pub async fn submit(&self, job: DeletionJob) -> Result<()> {
        self.sender
            .send(job)
            .await
            .context("job submitted to a closed worker pool.")
    }

    /// Signal that no further jobs will be submitted. Idempotent.
    pub fn close(&self) {
        self.sender.close();
    }

    /// Block until every worker has observed queue closure and finished all
    /// in-flight work. Consumes the pool.
    pub async fn wait(self) -> Result<()> {
        self.close();
        for handle in self.handles {
            handle.await.context("delete worker task panicked.")?;
        }
        Ok(())
    }
}
