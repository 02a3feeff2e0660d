//! Bucket and object orchestration over an [`ObjectGateway`].
//!
//! Each public operation is a short, fixed sequence of dependent remote calls
//! awaited in order:
//!
//! - `create_bucket`: create (bucket owner preferred) → remove public access block
//! - `delete_bucket`: delete
//! - `upload`: resumable transfer → set object ACL
//! - `download`: get → drain the body into memory
//! - `delete`: get → drain → delete → check for `204 No Content`
//!
//! Nothing is rolled back. When a later step fails after an earlier one took
//! effect, the operation fails with [`StorageError::PartialCompletion`] and the
//! earlier effect stays in place for the caller to remediate. Nothing is
//! retried here either; retry policy lives in the gateway.
//!
//! # Example
//!
//! ```ignore
//! use cloud_store::{ObjectConfig, StorageClient, UploadConfig, ObjectAcl};
//!
//! let client = StorageClient::new(gateway, Region::EuWest1);
//! client.create_bucket("my-bucket").await?;
//! let config = UploadConfig::new("my-bucket", "hello.txt", "hi").with_acl(ObjectAcl::PublicRead);
//! client.upload(config, None).await?;
//! let previous: Vec<u8> = client.delete(&ObjectConfig::new("my-bucket", "hello.txt")).await?;
//! ```

use cloud_store_common::STATUS_NO_CONTENT;
use futures::TryStreamExt;

use crate::error::{GatewayError, Operation, StorageError, Target};
use crate::gateway::{ObjectGateway, TransferRequest, UploadProgressCallback};
use crate::types::{
    CreateBucketOutput, ObjectConfig, ObjectOwnership, Region, UploadConfig, UploadOutput,
};
use crate::validation::{validate_bucket_name, validate_object};

/// High-level bucket and object operations using any gateway implementation.
pub struct StorageClient<G: ObjectGateway> {
    /// The gateway for remote calls.
    gateway: G,
    /// Region new buckets are created in.
    region: Region,
}

impl<G: ObjectGateway> StorageClient<G> {
    /// Create a new storage client.
    ///
    /// # Arguments
    /// * `gateway` - Gateway for remote calls, owned exclusively by the client
    /// * `region` - Region new buckets are created in
    pub fn new(gateway: G, region: Region) -> Self {
        Self { gateway, region }
    }

    /// The region new buckets are created in.
    pub fn region(&self) -> Region {
        self.region
    }

    /// The underlying gateway.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Create a bucket and remove its public access block.
    ///
    /// The bucket is created with the "bucket owner preferred" ownership
    /// policy. If removing the public access block fails, the bucket is left
    /// in place and the call fails with [`StorageError::PartialCompletion`].
    ///
    /// # Arguments
    /// * `bucket` - Name of the bucket to create
    ///
    /// # Returns
    /// The result of the bucket creation call.
    pub async fn create_bucket(&self, bucket: &str) -> Result<CreateBucketOutput, StorageError> {
        validate_bucket_name(bucket)?;
        let target = Target::bucket(bucket);

        log::debug!("Creating bucket {} in {}", bucket, self.region);
        let output = self
            .gateway
            .create_bucket(bucket, self.region, ObjectOwnership::BucketOwnerPreferred)
            .await
            .map_err(rejected(Operation::CreateBucket, &target))?;

        log::debug!("Removing public access block from bucket {}", bucket);
        if let Err(source) = self.gateway.delete_public_access_block(bucket).await {
            log::warn!(
                "Bucket {} was created but its public access block is still in place: {}",
                bucket,
                source
            );
            return Err(StorageError::PartialCompletion {
                operation: Operation::CreateBucket,
                target,
                completed: "bucket was created",
                pending: "remove its public access block",
                source,
            });
        }

        log::info!("Created bucket {} in {}", bucket, self.region);
        Ok(output)
    }

    /// Delete a bucket.
    ///
    /// # Arguments
    /// * `bucket` - Name of the bucket to delete
    pub async fn delete_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        validate_bucket_name(bucket)?;

        log::debug!("Deleting bucket {}", bucket);
        self.gateway
            .delete_bucket(bucket)
            .await
            .map_err(rejected(Operation::DeleteBucket, &Target::bucket(bucket)))?;

        log::info!("Deleted bucket {}", bucket);
        Ok(())
    }

    /// Upload an object, then apply its access policy.
    ///
    /// The body is handed to the gateway's resumable transfer. When no
    /// encryption algorithm is configured the default one is requested. The
    /// ACL call runs only after the transfer completes; if it fails, the
    /// object stays stored without the intended ACL and the call fails with
    /// [`StorageError::PartialCompletion`].
    ///
    /// # Arguments
    /// * `config` - Target, body and policy of the upload
    /// * `progress` - Optional observer invoked on every transfer progress event
    ///
    /// # Returns
    /// The transfer completion result.
    pub async fn upload(
        &self,
        config: UploadConfig,
        progress: Option<&UploadProgressCallback>,
    ) -> Result<UploadOutput, StorageError> {
        let UploadConfig {
            bucket,
            key,
            body,
            acl,
            encryption,
            content_type,
        } = config;
        validate_object(&bucket, &key)?;
        let target = Target::object(&bucket, &key);

        let request = TransferRequest {
            bucket: bucket.clone(),
            key: key.clone(),
            body,
            encryption: encryption.unwrap_or_default(),
            content_type,
        };

        log::debug!(
            "Transferring to s3://{}/{} with {} encryption",
            bucket,
            key,
            request.encryption
        );
        let output = self
            .gateway
            .transfer(request, progress)
            .await
            .map_err(rejected(Operation::Upload, &target))?;

        log::debug!("Setting ACL {} on s3://{}/{}", acl, bucket, key);
        if let Err(source) = self.gateway.put_object_acl(&bucket, &key, acl).await {
            log::warn!(
                "Object s3://{}/{} was uploaded but ACL {} was not applied: {}",
                bucket,
                key,
                acl,
                source
            );
            return Err(StorageError::PartialCompletion {
                operation: Operation::Upload,
                target,
                completed: "object was uploaded",
                pending: "set its ACL",
                source,
            });
        }

        log::info!("Uploaded s3://{}/{}", bucket, key);
        Ok(output)
    }

    /// Download an object fully into memory.
    ///
    /// # Arguments
    /// * `object` - Object to download
    ///
    /// # Returns
    /// The complete object content.
    pub async fn download(&self, object: &ObjectConfig) -> Result<Vec<u8>, StorageError> {
        validate_object(&object.bucket, &object.key)?;

        let data = self
            .read_object(&object.bucket, &object.key)
            .await
            .map_err(rejected(
                Operation::Download,
                &Target::object(&object.bucket, &object.key),
            ))?;

        log::debug!(
            "Downloaded {} bytes from s3://{}/{}",
            data.len(),
            object.bucket,
            object.key
        );
        Ok(data)
    }

    /// Delete an object and return the content it held.
    ///
    /// The object is read completely before the delete call is issued, so a
    /// failed read leaves the object untouched. The delete counts as
    /// successful only when the service answers `204 No Content`.
    ///
    /// # Arguments
    /// * `object` - Object to delete
    ///
    /// # Returns
    /// The object content as it was before deletion.
    pub async fn delete(&self, object: &ObjectConfig) -> Result<Vec<u8>, StorageError> {
        let ObjectConfig { bucket, key } = object;
        validate_object(bucket, key)?;
        let target = Target::object(bucket, key);

        log::debug!("Reading s3://{}/{} before deleting it", bucket, key);
        let previous = self
            .read_object(bucket, key)
            .await
            .map_err(rejected(Operation::ReadBeforeDelete, &target))?;

        log::debug!("Deleting s3://{}/{}", bucket, key);
        let output = self
            .gateway
            .delete_object(bucket, key)
            .await
            .map_err(rejected(Operation::Delete, &target))?;

        if output.status_code != STATUS_NO_CONTENT {
            return Err(StorageError::UnexpectedStatus {
                operation: Operation::Delete,
                target,
                expected: STATUS_NO_CONTENT,
                actual: output.status_code,
            });
        }

        log::info!("Deleted s3://{}/{} ({} bytes)", bucket, key, previous.len());
        Ok(previous)
    }

    /// Fetch an object and drain its body.
    async fn read_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, GatewayError> {
        let mut body = self.gateway.get_object(bucket, key).await?;

        let mut data: Vec<u8> = Vec::new();
        while let Some(chunk) = body.try_next().await? {
            data.extend_from_slice(&chunk);
        }

        Ok(data)
    }
}

/// Wrap a gateway rejection with the operation and target it belongs to.
fn rejected(
    operation: Operation,
    target: &Target,
) -> impl FnOnce(GatewayError) -> StorageError + '_ {
    move |source| StorageError::Gateway {
        operation,
        target: target.clone(),
        source,
    }
}
