//! Resumable transfer on top of S3 multipart uploads.
//!
//! Bodies that fit in one part go out as a single `PutObject`. Anything larger
//! becomes a multipart upload, one part per `part_size` bytes. A failed
//! multipart upload is aborted so no orphaned parts are left billed.

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart, ServerSideEncryption};
use aws_sdk_s3::Client as S3Client;
use bytes::{Bytes, BytesMut};
use cloud_store::{
    BodyStream, GatewayError, TransferRequest, UploadOutput, UploadProgress,
    UploadProgressCallback,
};
use futures::TryStreamExt;

use crate::error::gateway_error;

/// Pull the next part of at most `part_size` bytes off the body.
///
/// Returns None once the body is exhausted.
pub(crate) async fn next_part(
    chunks: &mut BodyStream,
    buffer: &mut BytesMut,
    part_size: usize,
) -> Result<Option<Bytes>, GatewayError> {
    while buffer.len() < part_size {
        match chunks.try_next().await? {
            Some(chunk) => buffer.extend_from_slice(&chunk),
            None => break,
        }
    }

    if buffer.is_empty() {
        return Ok(None);
    }

    let take: usize = part_size.min(buffer.len());
    Ok(Some(buffer.split_to(take).freeze()))
}

/// A single transfer in flight.
pub(crate) struct Transfer<'a> {
    client: &'a S3Client,
    part_size: usize,
    bucket: String,
    key: String,
    encryption: ServerSideEncryption,
    content_type: Option<String>,
    total_bytes: Option<u64>,
    progress: Option<&'a UploadProgressCallback>,
}

impl<'a> Transfer<'a> {
    pub(crate) fn new(
        client: &'a S3Client,
        part_size: usize,
        request: &TransferRequest,
        total_bytes: Option<u64>,
        progress: Option<&'a UploadProgressCallback>,
    ) -> Self {
        Self {
            client,
            part_size,
            bucket: request.bucket.clone(),
            key: request.key.clone(),
            encryption: ServerSideEncryption::from(request.encryption.as_str()),
            content_type: request.content_type.clone(),
            total_bytes,
            progress,
        }
    }

    /// Run the transfer to completion.
    ///
    /// # Arguments
    /// * `chunks` - The body, consumed once
    pub(crate) async fn run(self, mut chunks: BodyStream) -> Result<UploadOutput, GatewayError> {
        let mut buffer = BytesMut::with_capacity(self.part_size);
        let first: Bytes = next_part(&mut chunks, &mut buffer, self.part_size)
            .await?
            .unwrap_or_default();

        match next_part(&mut chunks, &mut buffer, self.part_size).await? {
            None => self.put_single(first).await,
            Some(second) => self.put_multipart(first, second, chunks, buffer).await,
        }
    }

    async fn put_single(&self, data: Bytes) -> Result<UploadOutput, GatewayError> {
        let length: u64 = data.len() as u64;
        log::debug!(
            "Uploading s3://{}/{} in a single request ({} bytes)",
            self.bucket,
            self.key,
            length
        );

        let output = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .server_side_encryption(self.encryption.clone())
            .set_content_type(self.content_type.clone())
            .content_length(length as i64)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(gateway_error)?;

        self.report(length, None);

        Ok(UploadOutput {
            bucket: self.bucket.clone(),
            key: self.key.clone(),
            etag: output.e_tag().map(str::to_string),
            location: None,
            version_id: output.version_id().map(str::to_string),
        })
    }

    async fn put_multipart(
        &self,
        first: Bytes,
        second: Bytes,
        chunks: BodyStream,
        buffer: BytesMut,
    ) -> Result<UploadOutput, GatewayError> {
        let created = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(&self.key)
            .server_side_encryption(self.encryption.clone())
            .set_content_type(self.content_type.clone())
            .send()
            .await
            .map_err(gateway_error)?;

        let upload_id: String = created
            .upload_id()
            .ok_or_else(|| GatewayError::Service {
                code: "MissingUploadId".to_string(),
                message: "CreateMultipartUpload returned no upload id".to_string(),
                status: None,
            })?
            .to_string();
        log::debug!(
            "Started multipart upload {} for s3://{}/{}",
            upload_id,
            self.bucket,
            self.key
        );

        match self
            .upload_parts(&upload_id, first, second, chunks, buffer)
            .await
        {
            Ok(output) => Ok(output),
            Err(err) => {
                self.abort(&upload_id).await;
                Err(err)
            }
        }
    }

    async fn upload_parts(
        &self,
        upload_id: &str,
        first: Bytes,
        second: Bytes,
        mut chunks: BodyStream,
        mut buffer: BytesMut,
    ) -> Result<UploadOutput, GatewayError> {
        let mut parts: Vec<CompletedPart> = Vec::new();
        let mut loaded: u64 = 0;
        let mut part_number: i32 = 1;
        let mut next: Option<Bytes> = Some(first);
        let mut lookahead: Option<Bytes> = Some(second);

        while let Some(data) = next.take() {
            let length: u64 = data.len() as u64;
            let uploaded = self
                .client
                .upload_part()
                .bucket(&self.bucket)
                .key(&self.key)
                .upload_id(upload_id)
                .part_number(part_number)
                .content_length(length as i64)
                .body(ByteStream::from(data))
                .send()
                .await
                .map_err(gateway_error)?;

            parts.push(
                CompletedPart::builder()
                    .set_e_tag(uploaded.e_tag().map(str::to_string))
                    .part_number(part_number)
                    .build(),
            );
            loaded += length;
            self.report(loaded, Some(part_number));

            part_number += 1;
            next = match lookahead.take() {
                Some(part) => Some(part),
                None => next_part(&mut chunks, &mut buffer, self.part_size).await?,
            };
        }

        let completed = self
            .client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(&self.key)
            .upload_id(upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(parts))
                    .build(),
            )
            .send()
            .await
            .map_err(gateway_error)?;

        Ok(UploadOutput {
            bucket: self.bucket.clone(),
            key: self.key.clone(),
            etag: completed.e_tag().map(str::to_string),
            location: completed.location().map(str::to_string),
            version_id: completed.version_id().map(str::to_string),
        })
    }

    async fn abort(&self, upload_id: &str) {
        let aborted = self
            .client
            .abort_multipart_upload()
            .bucket(&self.bucket)
            .key(&self.key)
            .upload_id(upload_id)
            .send()
            .await;

        if let Err(err) = aborted {
            log::warn!(
                "Failed to abort multipart upload {} for s3://{}/{}: {}",
                upload_id,
                self.bucket,
                self.key,
                gateway_error(err)
            );
        }
    }

    fn report(&self, loaded_bytes: u64, part: Option<i32>) {
        if let Some(observer) = self.progress {
            observer.on_progress(&UploadProgress {
                bucket: self.bucket.clone(),
                key: self.key.clone(),
                loaded_bytes,
                total_bytes: self.total_bytes,
                part,
            });
        }
    }
}
