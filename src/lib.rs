/*!
# Overview
s3nuke bulk-evicts every object, version and delete marker from a versioned
Amazon S3 bucket, then removes the bucket itself.

## Features
- **Bounded concurrency**: a fixed worker pool behind a bounded queue, so
  memory stays flat no matter how many objects the bucket holds
- **Versioning-safe ordering**: per listing page, every delete marker is
  removed before any object version, so removing a marker can never
  resurrect a version that was already deleted
- **Retry with backoff**: per-object exponential backoff; exhausted jobs are
  logged and abandoned without aborting the run
- **Region discovery**: the bucket's region is discovered automatically when
  not configured
- **Library-First**: the s3nuke CLI is a thin wrapper over this library

## As a Library
All CLI features are available in the library.

Example usage
=============

```toml
[dependencies]
s3nuke = "0.2"
tokio = { version = "1", features = ["full"] }
```

```no_run
use s3nuke::{BucketNuker, Config, create_pipeline_cancellation_token};

#[tokio::main]
async fn main() {
    let config = Config::for_bucket("my-old-bucket");
    let cancellation_token = create_pipeline_cancellation_token();

    let nuker = BucketNuker::new(config, cancellation_token).await.unwrap();
    match nuker.run().await {
        Ok(summary) => println!("deleted {} entries", summary.deleted),
        Err(e) => eprintln!("{e}"),
    }
}
```
*/

pub mod config;
pub mod executor;
pub mod pipeline;
pub mod pool;
pub mod retry;
pub mod storage;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::Config;
pub use config::args::CLIArgs;
pub use pipeline::BucketNuker;
pub use types::error::NukeError;
pub use types::token::{PipelineCancellationToken, create_pipeline_cancellation_token};
pub use types::{DeletionJob, NukeSummary, Outcome};
