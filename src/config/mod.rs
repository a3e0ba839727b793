pub mod args;

use crate::retry::{
    DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_INITIAL_INTERVAL_MILLISECONDS, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_INTERVAL_MILLISECONDS, ExponentialBackoff,
};
use std::time::Duration;

/// Main configuration for a bucket-nuke run.
///
/// Holds the target bucket, worker pool sizing, listing page size, retry
/// policy parameters, AWS client settings, and logging verbosity.
///
/// # Quick Start
///
/// Use [`Config::for_bucket`] for a minimal configuration with production
/// defaults:
///
/// ```
/// use s3nuke::Config;
///
/// let config = Config::for_bucket("my-bucket");
/// assert_eq!(config.worker_size, 50);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the bucket to evict and remove.
    pub bucket: String,
    /// Number of concurrent delete workers per phase.
    pub worker_size: u16,
    /// Capacity of the bounded job queue feeding the workers. Submission
    /// blocks when the queue is full, bounding memory regardless of bucket
    /// size.
    pub queue_size: usize,
    /// Page size requested per listing API call.
    pub max_keys: i32,
    pub backoff_config: BackoffConfig,
    pub client_config: ClientConfig,
    pub tracing_config: Option<TracingConfig>,
}

pub const DEFAULT_WORKER_SIZE: u16 = 50;
pub const DEFAULT_QUEUE_SIZE: usize = 1000;
pub const DEFAULT_MAX_KEYS: i32 = 1000;
pub const DEFAULT_AWS_MAX_ATTEMPTS: u32 = 10;
pub const DEFAULT_SDK_INITIAL_BACKOFF_MILLISECONDS: u64 = 100;

impl Config {
    /// Create a `Config` targeting the given bucket with production defaults.
    pub fn for_bucket(bucket: &str) -> Self {
        Config {
            bucket: bucket.to_string(),
            ..Config::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bucket: String::new(),
            worker_size: DEFAULT_WORKER_SIZE,
            queue_size: DEFAULT_QUEUE_SIZE,
            max_keys: DEFAULT_MAX_KEYS,
            backoff_config: BackoffConfig::default(),
            client_config: ClientConfig::default(),
            tracing_config: None,
        }
    }
}

/// Parameters for the per-object delete retry policy.
///
/// Converted into an [`ExponentialBackoff`] at pipeline construction.
#[derive(Debug, Clone, Copy)]
pub struct BackoffConfig {
    pub initial_interval_milliseconds: u64,
    pub multiplier: f64,
    pub max_interval_milliseconds: u64,
    pub max_attempts: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        BackoffConfig {
            initial_interval_milliseconds: DEFAULT_INITIAL_INTERVAL_MILLISECONDS,
            multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_interval_milliseconds: DEFAULT_MAX_INTERVAL_MILLISECONDS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl From<BackoffConfig> for ExponentialBackoff {
    fn from(config: BackoffConfig) -> Self {
        ExponentialBackoff {
            initial: Duration::from_millis(config.initial_interval_milliseconds),
            multiplier: config.multiplier,
            max_interval: Duration::from_millis(config.max_interval_milliseconds),
            max_attempts: config.max_attempts,
        }
    }
}

/// AWS S3 client configuration.
///
/// Region resolution, credential profile selection, endpoint override (for
/// S3-compatible test backends), and SDK-level retry tuning. When `region`
/// is `None` the bucket's region is discovered before the run starts.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
    pub aws_max_attempts: u32,
    pub initial_backoff_milliseconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            region: None,
            profile: None,
            endpoint_url: None,
            force_path_style: false,
            aws_max_attempts: DEFAULT_AWS_MAX_ATTEMPTS,
            initial_backoff_milliseconds: DEFAULT_SDK_INITIAL_BACKOFF_MILLISECONDS,
        }
    }
}

/// Tracing (logging) configuration.
#[derive(Debug, Clone, Copy)]
pub struct TracingConfig {
    pub tracing_level: log::Level,
    pub json_tracing: bool,
    pub disable_color_tracing: bool,
}
