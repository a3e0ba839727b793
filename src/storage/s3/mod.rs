pub mod client_builder;

use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::SdkError;
use aws_smithy_types::error::metadata::ProvideErrorMetadata;
use std::sync::Arc;

use crate::config::Config;
use crate::storage::{ObjectStore, Storage};
use crate::types::{DeletionJob, ObjectsPage, VersionsCursor, VersionsPage};

/// Extracts the S3 error code and message from an AWS SDK error.
///
/// For service errors (S3 API responses), returns the S3 error code
/// (e.g. "AccessDenied", "BucketNotEmpty") and the human-readable error
/// message. For other error types (network, timeout, construction failure),
/// returns "N/A" as the code and the full error description as the message.
fn extract_sdk_error_details<E: std::fmt::Display + ProvideErrorMetadata>(
    e: &SdkError<E>,
) -> (String, String) {
    if let Some(service_err) = e.as_service_error() {
        (
            service_err.code().unwrap_or("unknown").to_string(),
            service_err.message().unwrap_or("no message").to_string(),
        )
    } else {
        ("N/A".to_string(), e.to_string())
    }
}

/// Create the S3 storage instance for a run.
///
/// Builds the SDK client (resolving the bucket region first when none was
/// configured) and wraps it in the [`ObjectStore`] surface the pipeline
/// consumes.
pub async fn create_storage(config: &Config) -> Result<Storage> {
    let client = client_builder::create_client(config).await?;
    let bucket = config.bucket.clone();
    Ok(Box::new(S3Store {
        client: Arc::new(client),
        bucket,
        max_keys: config.max_keys,
    }))
}

/// S3-backed implementation of [`ObjectStore`].
///
/// Holds one shared `aws_sdk_s3::Client`; the client's internal connection
/// pool is the only concurrency control needed for parallel delete calls.
#[derive(Clone)]
struct S3Store {
    client: Arc<Client>,
    bucket: String,
    max_keys: i32,
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list_versions_page(&self, cursor: Option<VersionsCursor>) -> Result<VersionsPage> {
        let (key_marker, version_id_marker) = match cursor {
            Some(c) => (c.key_marker, c.version_id_marker),
            None => (None, None),
        };

        let output = self
            .client
            .list_object_versions()
            .bucket(&self.bucket)
            .set_key_marker(key_marker)
            .set_version_id_marker(version_id_marker)
            .max_keys(self.max_keys)
            .send()
            .await
            .map_err(|e| {
                let (s3_error_code, s3_error_message) = extract_sdk_error_details(&e);
                tracing::error!(
                    bucket = self.bucket,
                    s3_error_code = s3_error_code,
                    s3_error_message = s3_error_message,
                    "S3 ListObjectVersions API call failed for s3://{}: {} ({}).",
                    self.bucket,
                    s3_error_code,
                    s3_error_message,
                );
                anyhow::anyhow!(e).context("aws_sdk_s3::client::list_object_versions() failed.")
            })?;

        let markers = output
            .delete_markers()
            .iter()
            .filter_map(|m| match (m.key(), m.version_id()) {
                (Some(key), Some(version_id)) => Some(DeletionJob::marker(key, version_id)),
                _ => None,
            })
            .collect();

        let versions = output
            .versions()
            .iter()
            .filter_map(|v| match (v.key(), v.version_id()) {
                (Some(key), Some(version_id)) => Some(DeletionJob::version(key, version_id)),
                _ => None,
            })
            .collect();

        let next = if output.is_truncated() == Some(true) {
            Some(VersionsCursor {
                key_marker: output.next_key_marker().map(String::from),
                version_id_marker: output.next_version_id_marker().map(String::from),
            })
        } else {
            None
        };

        Ok(VersionsPage {
            markers,
            versions,
            next,
        })
    }

    async fn list_objects_page(&self, continuation: Option<String>) -> Result<ObjectsPage> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .set_continuation_token(continuation)
            .max_keys(self.max_keys)
            .send()
            .await
            .map_err(|e| {
                let (s3_error_code, s3_error_message) = extract_sdk_error_details(&e);
                tracing::error!(
                    bucket = self.bucket,
                    s3_error_code = s3_error_code,
                    s3_error_message = s3_error_message,
                    "S3 ListObjectsV2 API call failed for s3://{}: {} ({}).",
                    self.bucket,
                    s3_error_code,
                    s3_error_message,
                );
                anyhow::anyhow!(e).context("aws_sdk_s3::client::list_objects_v2() failed.")
            })?;

        let objects = output
            .contents()
            .iter()
            .filter_map(|o| o.key().map(DeletionJob::object))
            .collect();

        let next = if output.is_truncated() == Some(true) {
            output.next_continuation_token().map(String::from)
        } else {
            None
        };

        Ok(ObjectsPage { objects, next })
    }

    async fn delete_entry(&self, key: &str, version_id: Option<String>) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .set_version_id(version_id.clone())
            .send()
            .await
            .map_err(|e| {
                let (s3_error_code, s3_error_message) = extract_sdk_error_details(&e);
                tracing::debug!(
                    bucket = self.bucket,
                    key = key,
                    version_id = version_id,
                    s3_error_code = s3_error_code,
                    s3_error_message = s3_error_message,
                    "S3 DeleteObject API call failed for s3://{}/{}: {} ({}).",
                    self.bucket,
                    key,
                    s3_error_code,
                    s3_error_message,
                );
                anyhow::anyhow!(e).context("aws_sdk_s3::client::delete_object() failed.")
            })?;

        Ok(())
    }

    async fn delete_bucket(&self) -> Result<()> {
        self.client
            .delete_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| {
                let (s3_error_code, s3_error_message) = extract_sdk_error_details(&e);
                tracing::error!(
                    bucket = self.bucket,
                    s3_error_code = s3_error_code,
                    s3_error_message = s3_error_message,
                    "S3 DeleteBucket API call failed for bucket '{}': {} ({}).",
                    self.bucket,
                    s3_error_code,
                    s3_error_message,
                );
                anyhow::anyhow!(e).context("aws_sdk_s3::client::delete_bucket() failed.")
            })?;

        Ok(())
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}
