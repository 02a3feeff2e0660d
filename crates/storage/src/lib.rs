//! Bucket and object operations over an object storage service.
//!
//! This crate composes the remote calls of an [`ObjectGateway`] into five
//! operations, each a short sequence with uniform error translation:
//!
//! - **create_bucket** - create the bucket, then remove its public access block
//! - **delete_bucket** - delete the bucket
//! - **upload** - resumable transfer, then apply the object ACL
//! - **download** - fetch and fully materialize an object
//! - **delete** - read an object, delete it, return what was deleted
//!
//! The crate has no SDK dependency. The AWS backend lives in `cloud-store-s3`;
//! tests drive the client with an in-memory gateway.
//!
//! # Partial completion
//!
//! Multi-step operations are not atomic. When a dependent step fails after an
//! earlier one took effect, the error is [`StorageError::PartialCompletion`]
//! and the earlier effect is left in place.

mod client;
mod error;
mod gateway;
mod types;
pub mod validation;

pub use client::StorageClient;
pub use error::{GatewayError, Operation, StorageError, Target};
pub use gateway::{ObjectGateway, TransferRequest, UploadProgressCallback};
pub use types::{
    AwsCredentials, BodyStream, ByteChunkStream, CreateBucketOutput, DeleteObjectOutput,
    ObjectAcl, ObjectBody, ObjectConfig, ObjectOwnership, Region, RetrySettings,
    ServerSideEncryption, StorageSettings, UploadConfig, UploadOutput, UploadProgress,
};
pub use validation::{validate_bucket_name, validate_object_key};

pub use cloud_store_common::{progress_fn, NoOpProgress, ProgressCallback};
