//! The Object Storage Gateway: the remote calls the Storage Client composes.

use std::sync::Arc;

use async_trait::async_trait;
use cloud_store_common::ProgressCallback;

use crate::error::GatewayError;
use crate::types::{
    BodyStream, CreateBucketOutput, DeleteObjectOutput, ObjectAcl, ObjectBody, ObjectOwnership,
    Region, ServerSideEncryption, UploadOutput, UploadProgress,
};

/// Observer for upload progress events.
pub type UploadProgressCallback = dyn ProgressCallback<UploadProgress>;

/// A single resumable transfer handed to the gateway.
#[derive(Debug)]
pub struct TransferRequest {
    /// Target bucket.
    pub bucket: String,
    /// Target key.
    pub key: String,
    /// Content to transfer.
    pub body: ObjectBody,
    /// Encryption algorithm, already defaulted by the caller.
    pub encryption: ServerSideEncryption,
    /// MIME type stored with the object.
    pub content_type: Option<String>,
}

/// Low-level remote operations - implemented by each backend.
///
/// Every method is a single remote round trip (or, for `transfer`, a single
/// logical transfer). Retries, connection pooling and timeouts belong to the
/// implementation.
#[async_trait]
pub trait ObjectGateway: Send + Sync {
    /// Create a bucket in `region` with the given ownership policy.
    async fn create_bucket(
        &self,
        bucket: &str,
        region: Region,
        ownership: ObjectOwnership,
    ) -> Result<CreateBucketOutput, GatewayError>;

    /// Remove the bucket's public access block.
    async fn delete_public_access_block(&self, bucket: &str) -> Result<(), GatewayError>;

    /// Delete an empty bucket.
    async fn delete_bucket(&self, bucket: &str) -> Result<(), GatewayError>;

    /// Transfer a body to storage, reporting each progress event to `progress`.
    /// Completion or abort are the only terminal states.
    async fn transfer(
        &self,
        request: TransferRequest,
        progress: Option<&UploadProgressCallback>,
    ) -> Result<UploadOutput, GatewayError>;

    /// Set the canned ACL of an existing object.
    async fn put_object_acl(
        &self,
        bucket: &str,
        key: &str,
        acl: ObjectAcl,
    ) -> Result<(), GatewayError>;

    /// Open an object for reading.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<BodyStream, GatewayError>;

    /// Delete an object, reporting the response status code.
    async fn delete_object(&self, bucket: &str, key: &str)
        -> Result<DeleteObjectOutput, GatewayError>;
}

#[async_trait]
impl<G: ObjectGateway + ?Sized> ObjectGateway for Arc<G> {
    async fn create_bucket(
        &self,
        bucket: &str,
        region: Region,
        ownership: ObjectOwnership,
    ) -> Result<CreateBucketOutput, GatewayError> {
        (**self).create_bucket(bucket, region, ownership).await
    }

    async fn delete_public_access_block(&self, bucket: &str) -> Result<(), GatewayError> {
        (**self).delete_public_access_block(bucket).await
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<(), GatewayError> {
        (**self).delete_bucket(bucket).await
    }

    async fn transfer(
        &self,
        request: TransferRequest,
        progress: Option<&UploadProgressCallback>,
    ) -> Result<UploadOutput, GatewayError> {
        (**self).transfer(request, progress).await
    }

    async fn put_object_acl(
        &self,
        bucket: &str,
        key: &str,
        acl: ObjectAcl,
    ) -> Result<(), GatewayError> {
        (**self).put_object_acl(bucket, key, acl).await
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<BodyStream, GatewayError> {
        (**self).get_object(bucket, key).await
    }

    async fn delete_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<DeleteObjectOutput, GatewayError> {
        (**self).delete_object(bucket, key).await
    }
}
