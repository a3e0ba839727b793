// Ctrl+C signal handler for the CLI binary.
//
// Uses tokio::select! to wait for either pipeline cancellation or Ctrl+C signal.

use s3nuke::PipelineCancellationToken;
use tokio::task::JoinHandle;
use tokio::{select, signal};
use tracing::{debug, warn};

pub fn spawn_ctrl_c_handler(cancellation_token: PipelineCancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        select! {
            _ = cancellation_token.cancelled() => {
                debug!("cancellation_token canceled.")
            }
            _ = signal::ctrl_c() => {
                warn!("ctrl-c received, shutting down.");
                cancellation_token.cancel();
            }
        }
    })
}
