use clap::Parser;
use tracing::{debug, error, trace};

use s3nuke::config::Config;
use s3nuke::{BucketNuker, CLIArgs, create_pipeline_cancellation_token};

mod ctrl_c_handler;
mod tracing_init;

/// s3nuke - Delete a versioned S3 bucket and everything in it.
///
/// This binary is a thin wrapper over the s3nuke library.
/// All core functionality is implemented in the library crate.
#[tokio::main]
async fn main() {
    let config = load_config_exit_if_err();

    start_tracing_if_necessary(&config);

    trace!("config = {:?}", config);

    std::process::exit(run(config).await);
}

fn load_config_exit_if_err() -> Config {
    let config = Config::try_from(CLIArgs::parse());
    if let Err(error_message) = config {
        clap::Error::raw(clap::error::ErrorKind::ValueValidation, error_message).exit();
    }
    config.unwrap()
}

fn start_tracing_if_necessary(config: &Config) -> bool {
    if config.tracing_config.is_none() {
        return false;
    }

    tracing_init::init_tracing(config.tracing_config.as_ref().unwrap());
    true
}

async fn run(config: Config) -> i32 {
    let cancellation_token = create_pipeline_cancellation_token();

    ctrl_c_handler::spawn_ctrl_c_handler(cancellation_token.clone());

    let start_time = tokio::time::Instant::now();
    debug!("bucket eviction start.");

    let nuker = match BucketNuker::new(config, cancellation_token).await {
        Ok(nuker) => nuker,
        Err(e) => {
            error!("{}", e);
            return e.exit_code();
        }
    };

    let result = nuker.run().await;
    let duration_sec = format!("{:.3}", start_time.elapsed().as_secs_f32());

    match result {
        Ok(summary) => {
            debug!(
                duration_sec = duration_sec,
                deleted = summary.deleted,
                abandoned = summary.abandoned,
                "s3nuke has been completed."
            );
            0
        }
        Err(e) if e.is_cancelled() => {
            debug!("deletion cancelled by user.");
            e.exit_code()
        }
        Err(e) => {
            error!("{}", e);
            error!(duration_sec = duration_sec, "s3nuke failed.");
            e.exit_code()
        }
    }
}
