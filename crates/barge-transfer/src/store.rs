//! Object storage abstraction and the S3 adapter.
//!
//! The S3 adapter uploads via the multipart API so a file of any size can be
//! consumed straight off the download stream; peak memory is one part.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::TryStreamExt;
use tracing::debug;

use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream as SdkByteStream;
use aws_sdk_s3::types::{
    BucketLocationConstraint, CompletedMultipartUpload, CompletedPart, CreateBucketConfiguration,
};

use crate::error::StoreError;
use crate::http::ByteStream;

/// S3 requires every part except the last to be at least 5 MiB.
const PART_SIZE: usize = 8 * 1024 * 1024;

/// Capability interface over the destination bucket/object service.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn bucket_exists(&self, name: &str) -> Result<bool, StoreError>;

    /// Create a bucket, passing `location` as an explicit constraint when
    /// the target region is not the service default.
    async fn create_bucket(&self, name: &str, location: Option<&str>) -> Result<(), StoreError>;

    /// Consume `body` chunk by chunk into `bucket`/`key`, returning the
    /// number of bytes written. Must not buffer the whole payload.
    async fn upload(&self, bucket: &str, key: &str, body: ByteStream) -> Result<u64, StoreError>;
}

#[async_trait]
impl<S: ObjectStore + ?Sized> ObjectStore for std::sync::Arc<S> {
    async fn bucket_exists(&self, name: &str) -> Result<bool, StoreError> {
        (**self).bucket_exists(name).await
    }

    async fn create_bucket(&self, name: &str, location: Option<&str>) -> Result<(), StoreError> {
        (**self).create_bucket(name, location).await
    }

    async fn upload(&self, bucket: &str, key: &str, body: ByteStream) -> Result<u64, StoreError> {
        (**self).upload(bucket, key, body).await
    }
}

/// [`ObjectStore`] backed by the AWS S3 SDK.
#[derive(Debug, Clone)]
pub struct S3Gateway {
    client: aws_sdk_s3::Client,
}

impl S3Gateway {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }

    async fn upload_parts(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        mut body: ByteStream,
    ) -> Result<u64, StoreError> {
        let mut buffer = BytesMut::with_capacity(PART_SIZE);
        let mut parts: Vec<CompletedPart> = Vec::new();
        let mut part_number = 1i32;
        let mut total = 0u64;

        while let Some(chunk) = body
            .try_next()
            .await
            .map_err(|e| StoreError(e.to_string()))?
        {
            total += chunk.len() as u64;
            buffer.extend_from_slice(&chunk);
            if buffer.len() >= PART_SIZE {
                let part = buffer.split().freeze();
                parts.push(
                    self.put_part(bucket, key, upload_id, part_number, part)
                        .await?,
                );
                part_number += 1;
            }
        }

        // Empty objects still need one (empty) part to complete the upload.
        if !buffer.is_empty() || parts.is_empty() {
            let part = buffer.split().freeze();
            parts.push(
                self.put_part(bucket, key, upload_id, part_number, part)
                    .await?,
            );
        }

        self.client
            .complete_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(parts))
                    .build(),
            )
            .send()
            .await
            .map_err(|e| StoreError(DisplayErrorContext(&e).to_string()))?;

        Ok(total)
    }

    async fn put_part(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: i32,
        part: Bytes,
    ) -> Result<CompletedPart, StoreError> {
        debug!(key, part_number, bytes = part.len(), "uploading part");
        let uploaded = self
            .client
            .upload_part()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .part_number(part_number)
            .body(SdkByteStream::from(part))
            .send()
            .await
            .map_err(|e| StoreError(DisplayErrorContext(&e).to_string()))?;

        Ok(CompletedPart::builder()
            .set_e_tag(uploaded.e_tag().map(str::to_string))
            .part_number(part_number)
            .build())
    }
}

#[async_trait]
impl ObjectStore for S3Gateway {
    async fn bucket_exists(&self, name: &str) -> Result<bool, StoreError> {
        match self.client.head_bucket().bucket(name).send().await {
            Ok(_) => Ok(true),
            Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => Ok(false),
            Err(err) => Err(StoreError(DisplayErrorContext(&err).to_string())),
        }
    }

    async fn create_bucket(&self, name: &str, location: Option<&str>) -> Result<(), StoreError> {
        let mut request = self.client.create_bucket().bucket(name);
        if let Some(region) = location {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }
        request
            .send()
            .await
            .map_err(|e| StoreError(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }

    async fn upload(&self, bucket: &str, key: &str, body: ByteStream) -> Result<u64, StoreError> {
        let created = self
            .client
            .create_multipart_upload()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StoreError(DisplayErrorContext(&e).to_string()))?;
        let upload_id = created
            .upload_id()
            .ok_or_else(|| StoreError("multipart upload created without an id".into()))?
            .to_string();

        match self.upload_parts(bucket, key, &upload_id, body).await {
            Ok(total) => Ok(total),
            Err(err) => {
                // Best effort: a dangling multipart upload only holds storage
                // until the bucket's lifecycle rules reap it.
                let _ = self
                    .client
                    .abort_multipart_upload()
                    .bucket(bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .send()
                    .await;
                Err(err)
            }
        }
    }
}
