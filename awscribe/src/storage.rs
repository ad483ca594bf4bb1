use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Blob storage addressed by bucket and key.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Every key in the bucket.
    async fn list_keys(&self, bucket: &str) -> Result<Vec<String>>;

    /// Whether `key` exists in `bucket`.
    ///
    /// Falls back to a full listing; stores with a direct existence query
    /// override this.
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool> {
        Ok(self.list_keys(bucket).await?.iter().any(|k| k == key))
    }

    async fn upload(&self, bucket: &str, key: &str, file: &Path) -> Result<()>;

    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<()>;
}

/// What [`ensure_uploaded`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    AlreadyPresent,
    Uploaded,
}

/// Make sure `file` is stored in `bucket` under `key`, uploading only when
/// the key is absent.
pub async fn ensure_uploaded(
    store: &dyn ObjectStore,
    file: &Path,
    bucket: &str,
    key: &str,
) -> Result<UploadOutcome> {
    if store.exists(bucket, key).await? {
        info!("No need to upload. {key} already exists in bucket {bucket}");
        return Ok(UploadOutcome::AlreadyPresent);
    }

    let uploads_as_name = file
        .file_name()
        .is_some_and(|name| name.to_string_lossy() == key);
    if uploads_as_name {
        info!("Uploading {}", file.display());
    } else {
        info!("Uploading {} as {key}", file.display());
    }

    store.upload(bucket, key, file).await?;
    Ok(UploadOutcome::Uploaded)
}

/// [`ObjectStore`] backed by Amazon S3.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: aws_sdk_s3::Client,
}

impl S3Store {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(config),
        }
    }

    pub fn from_client(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list_keys(&self, bucket: &str) -> Result<Vec<String>> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .into_paginator()
            .send();

        let mut keys = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                Error::Storage(format!(
                    "failed to list bucket {bucket}: {}",
                    DisplayErrorContext(&e)
                ))
            })?;
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key())
                    .map(str::to_owned),
            );
        }

        debug!(bucket, count = keys.len(), "listed bucket");
        Ok(keys)
    }

    async fn exists(&self, bucket: &str, key: &str) -> Result<bool> {
        match self.client.head_object().bucket(bucket).key(key).send().await {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(Error::Storage(format!(
                "failed to look up s3://{bucket}/{key}: {}",
                DisplayErrorContext(&e)
            ))),
        }
    }

    async fn upload(&self, bucket: &str, key: &str, file: &Path) -> Result<()> {
        let body = ByteStream::from_path(file).await.map_err(|e| {
            Error::Storage(format!("failed to read {}: {e}", file.display()))
        })?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                Error::Storage(format!(
                    "failed to upload s3://{bucket}/{key}: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        debug!(bucket, key, "upload complete");
        Ok(())
    }

    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<()> {
        let object = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                Error::Storage(format!(
                    "failed to download s3://{bucket}/{key}: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let bytes = object.body.collect().await.map_err(|e| {
            Error::Storage(format!("failed to read s3://{bucket}/{key}: {e}"))
        })?;

        tokio::fs::write(dest, bytes.into_bytes()).await.map_err(|e| {
            Error::Storage(format!("failed to write {}: {e}", dest.display()))
        })?;

        debug!(bucket, key, dest = %dest.display(), "download complete");
        Ok(())
    }
}
