//! AWS S3 client construction: credential chain, region discovery, and
//! SDK-level retry configuration.
//!
//! Region discovery runs before any deletion work: when no region is
//! configured, a discovery client asks S3 where the bucket lives
//! (GetBucketLocation) and the real client is built against that region.

use std::time::Duration;

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use tracing::info;

use crate::config::Config;

/// Fallback region used for the region-discovery request itself.
const DISCOVERY_REGION: &str = "us-east-1";

/// Build the S3 client for a run.
///
/// Resolution order for the region: explicit `--region` flag, then the
/// bucket's own region as reported by GetBucketLocation.
pub async fn create_client(config: &Config) -> Result<Client> {
    let region = match &config.client_config.region {
        Some(region) => region.clone(),
        None => resolve_bucket_region(config).await?,
    };

    info!(bucket = config.bucket, region = region, "bucket region resolved.");

    let sdk_config = config_loader(config)
        .region(Region::new(region))
        .load()
        .await;

    Ok(build_s3_client(config, &sdk_config))
}

/// Ask S3 which region the bucket lives in.
///
/// GetBucketLocation works from any region; the discovery client uses a
/// fixed fallback. Failure here is fatal before any deletion begins.
async fn resolve_bucket_region(config: &Config) -> Result<String> {
    let sdk_config = config_loader(config)
        .region(Region::new(DISCOVERY_REGION))
        .load()
        .await;
    let client = build_s3_client(config, &sdk_config);

    let output = client
        .get_bucket_location()
        .bucket(&config.bucket)
        .send()
        .await
        .with_context(|| format!("unable to resolve region for bucket '{}'", config.bucket))?;

    // An absent or empty constraint means us-east-1; "EU" is the historical
    // alias for eu-west-1.
    let region = match output.location_constraint().map(|c| c.as_str()) {
        None | Some("") => DISCOVERY_REGION.to_string(),
        Some("EU") => "eu-west-1".to_string(),
        Some(constraint) => constraint.to_string(),
    };

    Ok(region)
}

fn config_loader(config: &Config) -> aws_config::ConfigLoader {
    let retry_config = aws_config::retry::RetryConfig::standard()
        .with_max_attempts(config.client_config.aws_max_attempts)
        .with_initial_backoff(Duration::from_millis(
            config.client_config.initial_backoff_milliseconds,
        ));

    let mut loader = aws_config::defaults(BehaviorVersion::latest()).retry_config(retry_config);

    if let Some(profile) = &config.client_config.profile {
        loader = loader.profile_name(profile);
    }
    if let Some(endpoint_url) = &config.client_config.endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }

    loader
}

fn build_s3_client(config: &Config, sdk_config: &aws_config::SdkConfig) -> Client {
    let s3_config = aws_sdk_s3::config::Builder::from(sdk_config)
        .force_path_style(config.client_config.force_path_style)
        .build();
    Client::from_conf(s3_config)
}
