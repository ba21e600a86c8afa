pub mod client_builder;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use aws_smithy_types::error::metadata::ProvideErrorMetadata;

use crate::config::Config;
use crate::storage::StorageTrait;
use crate::types::{ObjectDeleteFailure, ObjectVersionId, VersionListPage};

/// Extracts the S3 error code and message from an AWS SDK error.
///
/// For service errors (S3 API responses), returns the S3 error code
/// (e.g. "AccessDenied", "InternalError") and the human-readable message
/// from the response. For other error types (network, timeout, construction
/// failure), returns "N/A" as the code and the full error description as
/// the message.
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

/// S3-backed storage for the purge engine.
///
/// One instance serves every bucket in a run; the bucket name is a per-call
/// parameter because a single run fans out over many buckets concurrently.
#[derive(Clone)]
pub struct S3Storage {
    client: Arc<Client>,
}

impl S3Storage {
    /// Build the S3 client from the run configuration.
    ///
    /// Without an explicit client configuration, the AWS default credential
    /// and region chain is used.
    pub async fn create(config: &Config) -> Self {
        let client = match config.client_config {
            Some(ref client_config) => client_config.create_client().await,
            None => {
                let sdk_config =
                    aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
                Client::new(&sdk_config)
            }
        };

        Self {
            client: Arc::new(client),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

#[async_trait]
impl StorageTrait for S3Storage {
    async fn bucket_exists(&self, bucket: &str) -> bool {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => true,
            Err(e) => {
                let (s3_error_code, s3_error_message) = extract_sdk_error_details(&e);
                tracing::debug!(
                    bucket = bucket,
                    s3_error_code = s3_error_code,
                    s3_error_message = s3_error_message,
                    "S3 HeadBucket probe failed for bucket '{}': {} ({}).",
                    bucket,
                    s3_error_code,
                    s3_error_message,
                );
                false
            }
        }
    }

    async fn list_object_versions(
        &self,
        bucket: &str,
        key_marker: Option<String>,
        version_id_marker: Option<String>,
        max_keys: i32,
    ) -> Result<VersionListPage> {
        let output = self
            .client
            .list_object_versions()
            .bucket(bucket)
            .set_key_marker(key_marker)
            .set_version_id_marker(version_id_marker)
            .max_keys(max_keys)
            .send()
            .await
            .map_err(|e| {
                let (s3_error_code, s3_error_message) = extract_sdk_error_details(&e);
                tracing::error!(
                    bucket = bucket,
                    s3_error_code = s3_error_code,
                    s3_error_message = s3_error_message,
                    "S3 ListObjectVersions API call failed for bucket '{}': {} ({}).",
                    bucket,
                    s3_error_code,
                    s3_error_message,
                );
                anyhow::anyhow!(e).context("aws_sdk_s3::client::list_object_versions() failed.")
            })?;

        let versions = output
            .versions()
            .iter()
            .map(|version| {
                ObjectVersionId::new(
                    version.key().unwrap_or_default(),
                    version.version_id().unwrap_or_default(),
                )
            })
            .collect();

        let delete_markers = output
            .delete_markers()
            .iter()
            .map(|marker| {
                ObjectVersionId::new(
                    marker.key().unwrap_or_default(),
                    marker.version_id().unwrap_or_default(),
                )
            })
            .collect();

        Ok(VersionListPage {
            versions,
            delete_markers,
            is_truncated: output.is_truncated() == Some(true),
            next_key_marker: output.next_key_marker().map(String::from),
            next_version_id_marker: output.next_version_id_marker().map(String::from),
        })
    }

    async fn delete_objects(
        &self,
        bucket: &str,
        identifiers: &[ObjectVersionId],
    ) -> Result<Vec<ObjectDeleteFailure>> {
        let object_count = identifiers.len();

        let objects: Vec<ObjectIdentifier> = identifiers
            .iter()
            .map(|id| {
                let mut builder = ObjectIdentifier::builder().key(&id.key);
                if !id.version_id.is_empty() {
                    builder = builder.version_id(&id.version_id);
                }
                builder.build().expect("ObjectIdentifier build failed")
            })
            .collect();

        // Quiet mode: the response carries only the failures.
        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .context("Failed to build Delete request")?;

        let output = self
            .client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| {
                let (s3_error_code, s3_error_message) = extract_sdk_error_details(&e);
                tracing::error!(
                    bucket = bucket,
                    object_count = object_count,
                    s3_error_code = s3_error_code,
                    s3_error_message = s3_error_message,
                    "S3 DeleteObjects API call failed for {} objects in bucket '{}': {} ({}).",
                    object_count,
                    bucket,
                    s3_error_code,
                    s3_error_message,
                );
                anyhow::anyhow!(e).context("aws_sdk_s3::client::delete_objects() failed.")
            })?;

        let failures = output
            .errors()
            .iter()
            .map(|err| ObjectDeleteFailure {
                key: err.key().unwrap_or("unknown").to_string(),
                version_id: err.version_id().map(String::from),
                code: err.code().unwrap_or("unknown").to_string(),
                message: err.message().unwrap_or("no message").to_string(),
            })
            .collect();

        Ok(failures)
    }
}
