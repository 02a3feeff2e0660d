//! AWS SDK S3 backend for cloud-store.
//!
//! This crate provides an `ObjectGateway` implementation using the AWS SDK for
//! Rust, and a `connect` helper that wires it into a `StorageClient`.
//!
//! # Example
//!
//! ```ignore
//! use cloud_store::{AwsCredentials, ObjectConfig, Region, StorageSettings, UploadConfig};
//!
//! let settings = StorageSettings::new(Region::EuWest1, AwsCredentials::new(key_id, secret));
//! let client = cloud_store_s3::connect(settings).await?;
//!
//! client.create_bucket("my-bucket").await?;
//! client.upload(UploadConfig::new("my-bucket", "notes.txt", "hello"), None).await?;
//! let bytes = client.download(&ObjectConfig::new("my-bucket", "notes.txt")).await?;
//! ```

mod client;
mod error;
#[cfg(test)]
mod replay;
mod transfer;

use cloud_store::{StorageClient, StorageError, StorageSettings};

pub use client::S3Gateway;

/// A Storage Client backed by the AWS SDK.
pub type S3StorageClient = StorageClient<S3Gateway>;

/// Build a Storage Client for the given settings.
///
/// # Arguments
/// * `settings` - Region, credentials, retry policy and endpoint
pub async fn connect(settings: StorageSettings) -> Result<S3StorageClient, StorageError> {
    let gateway = S3Gateway::new(&settings).await?;
    Ok(StorageClient::new(gateway, settings.region))
}
