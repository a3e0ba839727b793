use anyhow::Error;
use thiserror::Error;

/// Fatal error conditions for a bucket-nuke run.
///
/// Per-object delete failures never appear here: they are retried inside the
/// delete executor and, once the retry budget is exhausted, logged and
/// dropped. Only conditions that terminate the whole run are modelled.
///
/// ## Exit Codes
///
/// Each variant maps to an exit code (via `exit_code()`):
/// - 0: Non-error conditions (Cancelled)
/// - 1: Run failures (Listing, Finalize, Pipeline)
/// - 2: Configuration/usage errors (Usage)
#[derive(Error, Debug)]
pub enum NukeError {
    /// A paged listing call failed. Listings are never retried at this layer;
    /// the whole run aborts.
    #[error("listing failed for bucket '{bucket}': {source}")]
    Listing {
        bucket: String,
        #[source]
        source: Error,
    },

    /// The final DeleteBucket call failed, usually because abandoned jobs
    /// left the bucket non-empty.
    #[error("bucket deletion failed for '{bucket}': {source}")]
    Finalize {
        bucket: String,
        #[source]
        source: Error,
    },

    /// Invalid configuration or unresolvable bucket region, detected before
    /// any deletion work begins.
    #[error("invalid usage: {0}")]
    Usage(String),

    /// Operation cancelled by the user.
    #[error("operation cancelled by user")]
    Cancelled,

    /// Internal pipeline failure (worker panic, channel breakage).
    #[error("pipeline error: {0}")]
    Pipeline(String),
}

impl NukeError {
    /// Get the appropriate process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            NukeError::Cancelled => 0,
            NukeError::Usage(_) => 2,
            _ => 1,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, NukeError::Cancelled)
    }
}
