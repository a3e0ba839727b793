use clap::Parser;
use clap::builder::NonEmptyStringValueParser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::ffi::OsString;

use crate::config::{
    BackoffConfig, ClientConfig, Config, DEFAULT_AWS_MAX_ATTEMPTS, DEFAULT_MAX_KEYS,
    DEFAULT_QUEUE_SIZE, DEFAULT_SDK_INITIAL_BACKOFF_MILLISECONDS, DEFAULT_WORKER_SIZE,
    TracingConfig,
};
use crate::retry::{
    DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_INITIAL_INTERVAL_MILLISECONDS, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_INTERVAL_MILLISECONDS,
};

const ERROR_MESSAGE_WORKER_SIZE_ZERO: &str = "Worker size must be at least 1.";
const ERROR_MESSAGE_QUEUE_SIZE_ZERO: &str = "Queue size must be at least 1.";
const ERROR_MESSAGE_MAX_KEYS_RANGE: &str = "Max keys must be between 1 and 1000.";
const ERROR_MESSAGE_MAX_ATTEMPTS_ZERO: &str = "Retry max attempts must be at least 1.";
const ERROR_MESSAGE_MULTIPLIER_INVALID: &str =
    "Retry multiplier must be a finite number of at least 1.";

/// s3nuke - Evict every object, version and delete marker from a versioned
/// S3 bucket, then remove the bucket.
///
/// Example:
///   s3nuke -b my-old-bucket
///   s3nuke -b my-old-bucket --workers 100 -v
#[derive(Parser, Clone, Debug)]
#[command(name = "s3nuke", version, about, long_about = None)]
pub struct CLIArgs {
    /// Name of the bucket to delete.
    #[arg(
        short = 'b',
        long = "bucket",
        env = "S3NUKE_BUCKET",
        value_parser = NonEmptyStringValueParser::new(),
        required = true
    )]
    pub bucket: String,

    /// Number of concurrent delete workers per phase.
    #[arg(long = "workers", default_value_t = DEFAULT_WORKER_SIZE)]
    pub worker_size: u16,

    /// Capacity of the bounded job queue feeding the workers.
    #[arg(long = "queue-size", default_value_t = DEFAULT_QUEUE_SIZE)]
    pub queue_size: usize,

    /// Listing page size per API call (1-1000).
    #[arg(long = "max-keys", default_value_t = DEFAULT_MAX_KEYS)]
    pub max_keys: i32,

    /// Initial backoff interval between delete retries, in milliseconds.
    #[arg(long = "retry-initial-interval-milliseconds", default_value_t = DEFAULT_INITIAL_INTERVAL_MILLISECONDS)]
    pub retry_initial_interval_milliseconds: u64,

    /// Backoff multiplier applied per retry.
    #[arg(long = "retry-multiplier", default_value_t = DEFAULT_BACKOFF_MULTIPLIER)]
    pub retry_multiplier: f64,

    /// Maximum backoff interval between delete retries, in milliseconds.
    #[arg(long = "retry-max-interval-milliseconds", default_value_t = DEFAULT_MAX_INTERVAL_MILLISECONDS)]
    pub retry_max_interval_milliseconds: u64,

    /// Maximum delete attempts per object before the job is abandoned.
    #[arg(long = "retry-max-attempts", default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub retry_max_attempts: u32,

    /// AWS region of the bucket. Discovered automatically when omitted.
    #[arg(long = "region")]
    pub region: Option<String>,

    /// AWS credential profile to use.
    #[arg(long = "profile")]
    pub profile: Option<String>,

    /// Custom S3 endpoint URL (S3-compatible storage).
    #[arg(long = "endpoint-url")]
    pub endpoint_url: Option<String>,

    /// Use path-style addressing (required by some S3-compatible backends).
    #[arg(long = "force-path-style", default_value_t = false)]
    pub force_path_style: bool,

    /// Maximum attempts for the AWS SDK's own request retry.
    #[arg(long = "aws-max-attempts", default_value_t = DEFAULT_AWS_MAX_ATTEMPTS)]
    pub aws_max_attempts: u32,

    /// Emit log lines as JSON.
    #[arg(long = "json-tracing", default_value_t = false)]
    pub json_tracing: bool,

    /// Disable colored log output.
    #[arg(long = "disable-color-tracing", default_value_t = false)]
    pub disable_color_tracing: bool,

    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,
}

/// Parse CLI arguments from an explicit iterator (test entry point).
pub fn parse_from_args<I, T>(args: I) -> Result<CLIArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    CLIArgs::try_parse_from(args)
}

impl TryFrom<CLIArgs> for Config {
    type Error = String;

    fn try_from(args: CLIArgs) -> Result<Self, Self::Error> {
        if args.worker_size == 0 {
            return Err(ERROR_MESSAGE_WORKER_SIZE_ZERO.to_string());
        }
        if args.queue_size == 0 {
            return Err(ERROR_MESSAGE_QUEUE_SIZE_ZERO.to_string());
        }
        if !(1..=1000).contains(&args.max_keys) {
            return Err(ERROR_MESSAGE_MAX_KEYS_RANGE.to_string());
        }
        if args.retry_max_attempts == 0 {
            return Err(ERROR_MESSAGE_MAX_ATTEMPTS_ZERO.to_string());
        }
        if !args.retry_multiplier.is_finite() || args.retry_multiplier < 1.0 {
            return Err(ERROR_MESSAGE_MULTIPLIER_INVALID.to_string());
        }

        // -qq turns logging off entirely.
        let tracing_config = args.verbosity.log_level().map(|level| TracingConfig {
            tracing_level: level,
            json_tracing: args.json_tracing,
            disable_color_tracing: args.disable_color_tracing,
        });

        Ok(Config {
            bucket: args.bucket,
            worker_size: args.worker_size,
            queue_size: args.queue_size,
            max_keys: args.max_keys,
            backoff_config: BackoffConfig {
                initial_interval_milliseconds: args.retry_initial_interval_milliseconds,
                multiplier: args.retry_multiplier,
                max_interval_milliseconds: args.retry_max_interval_milliseconds,
                max_attempts: args.retry_max_attempts,
            },
            client_config: ClientConfig {
                region: args.region,
                profile: args.profile,
                endpoint_url: args.endpoint_url,
                force_path_style: args.force_path_style,
                aws_max_attempts: args.aws_max_attempts,
                initial_backoff_milliseconds: DEFAULT_SDK_INITIAL_BACKOFF_MILLISECONDS,
            },
            tracing_config,
        })
    }
}
