//! Object store for uploaded documents: bucket provisioning, listing, and the
//! admin storage summary.

use std::collections::BTreeMap;

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client as S3Client;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

pub const RECENT_FILES_LIMIT: usize = 10;
const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to provision bucket {bucket}: {message}")]
    Provision { bucket: String, message: String },

    #[error("object store request failed: {0}")]
    Request(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub name: String,
    pub size: u64,
    pub content_type: Option<String>,
    pub created: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Creates the bucket if it is missing. Returns the bucket name.
    async fn ensure_ready(&self) -> Result<String, StorageError>;

    async fn list_files(&self) -> Result<Vec<StoredFile>, StorageError>;
}

pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
    region: String,
}

impl S3ObjectStore {
    pub fn new(client: S3Client, bucket: String, region: String) -> Self {
        Self {
            client,
            bucket,
            region,
        }
    }

    fn provision_error(&self, message: String) -> StorageError {
        StorageError::Provision {
            bucket: self.bucket.clone(),
            message,
        }
    }

    async fn create_bucket(&self) -> Result<(), StorageError> {
        let mut request = self.client.create_bucket().bucket(&self.bucket);
        // us-east-1 rejects an explicit location constraint.
        if self.region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => {
                info!("Created bucket {} in {}", self.bucket, self.region);
                Ok(())
            }
            Err(err) => match err.as_service_error() {
                Some(service) if service.is_bucket_already_owned_by_you() => {
                    debug!("Bucket {} was created concurrently", self.bucket);
                    Ok(())
                }
                _ => Err(self.provision_error(DisplayErrorContext(&err).to_string())),
            },
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn ensure_ready(&self) -> Result<String, StorageError> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {}
            Err(err) => match err.as_service_error() {
                Some(service) if service.is_not_found() => self.create_bucket().await?,
                _ => return Err(self.provision_error(DisplayErrorContext(&err).to_string())),
            },
        }
        Ok(self.bucket.clone())
    }

    async fn list_files(&self) -> Result<Vec<StoredFile>, StorageError> {
        self.ensure_ready().await?;

        let mut files = Vec::new();
        let mut continuation: Option<String> = None;
        loop {
            let page = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| StorageError::Request(DisplayErrorContext(&e).to_string()))?;

            for object in page.contents() {
                let Some(key) = object.key() else { continue };
                files.push(StoredFile {
                    name: key.to_string(),
                    size: object.size().unwrap_or(0).max(0) as u64,
                    content_type: content_type_for_key(key).map(str::to_owned),
                    created: object
                        .last_modified()
                        .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos())),
                });
            }

            match page.next_continuation_token() {
                Some(token) if page.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        debug!("Listed {} objects in {}", files.len(), self.bucket);
        Ok(files)
    }
}

/// Content type inferred from the key's extension. Listing responses carry
/// no per-object headers.
pub fn content_type_for_key(key: &str) -> Option<&'static str> {
    let (_, extension) = key.rsplit_once('.')?;
    let content_type = match extension.to_ascii_lowercase().as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => return None,
    };
    Some(content_type)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStats {
    pub total_files: usize,
    pub total_size: u64,
    pub file_types: BTreeMap<String, u64>,
    pub recent_files: Vec<StoredFile>,
}

pub fn compute_storage_stats(mut files: Vec<StoredFile>) -> StorageStats {
    let mut file_types: BTreeMap<String, u64> = BTreeMap::new();
    for file in &files {
        let kind = file.content_type.as_deref().unwrap_or("unknown");
        *file_types.entry(kind.to_string()).or_default() += 1;
    }
    let total_files = files.len();
    let total_size = files.iter().map(|f| f.size).sum();

    // Newest first; undated objects last.
    files.sort_by(|a, b| b.created.cmp(&a.created));
    files.truncate(RECENT_FILES_LIMIT);

    StorageStats {
        total_files,
        total_size,
        file_types,
        recent_files: files,
    }
}
