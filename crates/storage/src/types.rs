//! Shared data structures for storage operations.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::SystemTime;

use bytes::Bytes;
use cloud_store_common::{DEFAULT_MAX_ATTEMPTS, LOCATION_CONSTRAINT_FREE_REGION};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::error::{GatewayError, StorageError};

/// Caller-produced chunk stream for an upload body. Read once, not restartable.
pub type ByteChunkStream = BoxStream<'static, Result<Bytes, std::io::Error>>;

/// Chunk stream as seen by a gateway, both for upload bodies and downloads.
pub type BodyStream = BoxStream<'static, Result<Bytes, GatewayError>>;

/// Valid storage regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Region {
    UsEast1,
    UsEast2,
    UsWest1,
    #[default]
    UsWest2,
    AfSouth1,
    ApEast1,
    ApSouth1,
    ApSouth2,
    ApSoutheast1,
    ApSoutheast2,
    ApSoutheast3,
    ApSoutheast4,
    ApNortheast1,
    ApNortheast2,
    ApNortheast3,
    CaCentral1,
    CaWest1,
    EuCentral1,
    EuCentral2,
    EuWest1,
    EuWest2,
    EuWest3,
    EuSouth1,
    EuSouth2,
    EuNorth1,
    IlCentral1,
    MeSouth1,
    MeCentral1,
    SaEast1,
}

impl Region {
    /// Every supported region.
    pub const ALL: [Region; 29] = [
        Region::UsEast1,
        Region::UsEast2,
        Region::UsWest1,
        Region::UsWest2,
        Region::AfSouth1,
        Region::ApEast1,
        Region::ApSouth1,
        Region::ApSouth2,
        Region::ApSoutheast1,
        Region::ApSoutheast2,
        Region::ApSoutheast3,
        Region::ApSoutheast4,
        Region::ApNortheast1,
        Region::ApNortheast2,
        Region::ApNortheast3,
        Region::CaCentral1,
        Region::CaWest1,
        Region::EuCentral1,
        Region::EuCentral2,
        Region::EuWest1,
        Region::EuWest2,
        Region::EuWest3,
        Region::EuSouth1,
        Region::EuSouth2,
        Region::EuNorth1,
        Region::IlCentral1,
        Region::MeSouth1,
        Region::MeCentral1,
        Region::SaEast1,
    ];

    /// The region identifier, e.g. "us-west-2".
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::UsEast1 => "us-east-1",
            Region::UsEast2 => "us-east-2",
            Region::UsWest1 => "us-west-1",
            Region::UsWest2 => "us-west-2",
            Region::AfSouth1 => "af-south-1",
            Region::ApEast1 => "ap-east-1",
            Region::ApSouth1 => "ap-south-1",
            Region::ApSouth2 => "ap-south-2",
            Region::ApSoutheast1 => "ap-southeast-1",
            Region::ApSoutheast2 => "ap-southeast-2",
            Region::ApSoutheast3 => "ap-southeast-3",
            Region::ApSoutheast4 => "ap-southeast-4",
            Region::ApNortheast1 => "ap-northeast-1",
            Region::ApNortheast2 => "ap-northeast-2",
            Region::ApNortheast3 => "ap-northeast-3",
            Region::CaCentral1 => "ca-central-1",
            Region::CaWest1 => "ca-west-1",
            Region::EuCentral1 => "eu-central-1",
            Region::EuCentral2 => "eu-central-2",
            Region::EuWest1 => "eu-west-1",
            Region::EuWest2 => "eu-west-2",
            Region::EuWest3 => "eu-west-3",
            Region::EuSouth1 => "eu-south-1",
            Region::EuSouth2 => "eu-south-2",
            Region::EuNorth1 => "eu-north-1",
            Region::IlCentral1 => "il-central-1",
            Region::MeSouth1 => "me-south-1",
            Region::MeCentral1 => "me-central-1",
            Region::SaEast1 => "sa-east-1",
        }
    }

    /// Location constraint to send with a bucket creation request.
    /// None for the region that rejects an explicit constraint.
    pub fn location_constraint(&self) -> Option<&'static str> {
        match self.as_str() {
            LOCATION_CONSTRAINT_FREE_REGION => None,
            other => Some(other),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| StorageError::invalid_config(format!("unknown region: {}", s)))
    }
}

impl TryFrom<String> for Region {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.as_str().to_string()
    }
}

/// Canned access policy applied to an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ObjectAcl {
    #[default]
    Private,
    PublicRead,
    PublicReadWrite,
    AuthenticatedRead,
    AwsExecRead,
    BucketOwnerRead,
    BucketOwnerFullControl,
}

impl ObjectAcl {
    const ALL: [ObjectAcl; 7] = [
        ObjectAcl::Private,
        ObjectAcl::PublicRead,
        ObjectAcl::PublicReadWrite,
        ObjectAcl::AuthenticatedRead,
        ObjectAcl::AwsExecRead,
        ObjectAcl::BucketOwnerRead,
        ObjectAcl::BucketOwnerFullControl,
    ];

    /// The canned ACL header value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectAcl::Private => "private",
            ObjectAcl::PublicRead => "public-read",
            ObjectAcl::PublicReadWrite => "public-read-write",
            ObjectAcl::AuthenticatedRead => "authenticated-read",
            ObjectAcl::AwsExecRead => "aws-exec-read",
            ObjectAcl::BucketOwnerRead => "bucket-owner-read",
            ObjectAcl::BucketOwnerFullControl => "bucket-owner-full-control",
        }
    }
}

impl fmt::Display for ObjectAcl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectAcl {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectAcl::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| StorageError::invalid_config(format!("unknown ACL: {}", s)))
    }
}

impl TryFrom<String> for ObjectAcl {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ObjectAcl> for String {
    fn from(acl: ObjectAcl) -> Self {
        acl.as_str().to_string()
    }
}

/// Server-side encryption algorithm requested for uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ServerSideEncryption {
    #[default]
    Aes256,
    AwsKms,
    AwsKmsDsse,
}

impl ServerSideEncryption {
    /// The algorithm tag sent with the request.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerSideEncryption::Aes256 => "AES256",
            ServerSideEncryption::AwsKms => "aws:kms",
            ServerSideEncryption::AwsKmsDsse => "aws:kms:dsse",
        }
    }
}

impl fmt::Display for ServerSideEncryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerSideEncryption {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AES256" => Ok(ServerSideEncryption::Aes256),
            "aws:kms" => Ok(ServerSideEncryption::AwsKms),
            "aws:kms:dsse" => Ok(ServerSideEncryption::AwsKmsDsse),
            other => Err(StorageError::invalid_config(format!(
                "unknown encryption algorithm: {}",
                other
            ))),
        }
    }
}

impl TryFrom<String> for ServerSideEncryption {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ServerSideEncryption> for String {
    fn from(sse: ServerSideEncryption) -> Self {
        sse.as_str().to_string()
    }
}

/// Object ownership setting for a new bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectOwnership {
    BucketOwnerPreferred,
    ObjectWriter,
    BucketOwnerEnforced,
}

impl ObjectOwnership {
    /// The ownership value sent with the request.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectOwnership::BucketOwnerPreferred => "BucketOwnerPreferred",
            ObjectOwnership::ObjectWriter => "ObjectWriter",
            ObjectOwnership::BucketOwnerEnforced => "BucketOwnerEnforced",
        }
    }
}

impl fmt::Display for ObjectOwnership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectOwnership {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BucketOwnerPreferred" => Ok(ObjectOwnership::BucketOwnerPreferred),
            "ObjectWriter" => Ok(ObjectOwnership::ObjectWriter),
            "BucketOwnerEnforced" => Ok(ObjectOwnership::BucketOwnerEnforced),
            other => Err(StorageError::invalid_config(format!(
                "unknown object ownership: {}",
                other
            ))),
        }
    }
}

/// AWS credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub session_token: Option<String>,
    #[serde(default)]
    pub expiration: Option<SystemTime>,
}

impl AwsCredentials {
    /// Long-lived credentials without a session token.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
            expiration: None,
        }
    }

    /// Attach a session token (temporary credentials).
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Attach an expiry time.
    pub fn with_expiration(mut self, expiration: SystemTime) -> Self {
        self.expiration = Some(expiration);
        self
    }
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "** redacted **"),
            )
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// Retry policy handed to the gateway. The Storage Client itself never retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,
    /// Initial backoff delay in milliseconds.
    pub initial_backoff_ms: u64,
    /// Maximum backoff delay in milliseconds.
    pub max_backoff_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff_ms: 100,
            max_backoff_ms: 20_000,
        }
    }
}

impl RetrySettings {
    /// A single attempt, no retries.
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }
}

/// Configuration settings for a storage gateway.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Region buckets are created in and requests are signed for.
    pub region: Region,
    /// Static credentials. None uses the SDK default provider chain.
    pub credentials: Option<AwsCredentials>,
    /// Retry policy for the gateway.
    pub retry: RetrySettings,
    /// Custom endpoint (S3-compatible services).
    pub endpoint_url: Option<String>,
    /// Use path-style addressing instead of virtual-hosted buckets.
    pub force_path_style: bool,
}

impl StorageSettings {
    /// Settings for a region with static credentials.
    ///
    /// # Arguments
    /// * `region` - Region to operate in
    /// * `credentials` - Credential bundle
    pub fn new(region: Region, credentials: AwsCredentials) -> Self {
        Self {
            region,
            credentials: Some(credentials),
            ..Self::default()
        }
    }

    /// Set the region.
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    /// Set static credentials.
    pub fn with_credentials(mut self, credentials: AwsCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetrySettings) -> Self {
        self.retry = retry;
        self
    }

    /// Point at a custom endpoint, e.g. a local S3-compatible server.
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Enable or disable path-style addressing.
    pub fn with_force_path_style(mut self, force_path_style: bool) -> Self {
        self.force_path_style = force_path_style;
        self
    }
}

/// Content to upload.
pub enum ObjectBody {
    /// Inline text, sent as UTF-8.
    Text(String),
    /// Raw byte buffer.
    Bytes(Bytes),
    /// Local file, read lazily in chunks.
    File(PathBuf),
    /// Lazily produced stream. Readable once.
    Stream(ByteChunkStream),
}

impl ObjectBody {
    /// Wrap a caller-produced chunk stream.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: futures::Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static,
    {
        ObjectBody::Stream(stream.boxed())
    }

    /// Size in bytes when known without any I/O.
    pub fn content_length(&self) -> Option<u64> {
        match self {
            ObjectBody::Text(text) => Some(text.len() as u64),
            ObjectBody::Bytes(bytes) => Some(bytes.len() as u64),
            ObjectBody::File(_) | ObjectBody::Stream(_) => None,
        }
    }

    /// Size in bytes, looking up file metadata when needed.
    ///
    /// Only streams stay unknown. A file that cannot be stat'ed reports None;
    /// reading it fails later with the real error.
    pub fn resolve_length(&self) -> impl std::future::Future<Output = Option<u64>> + Send + 'static {
        let path = match self {
            ObjectBody::File(path) => Some(path.clone()),
            _ => None,
        };
        let known = self.content_length();
        async move {
            match path {
                Some(path) => match tokio::fs::metadata(&path).await {
                    Ok(metadata) => Some(metadata.len()),
                    Err(e) => {
                        log::debug!("Could not stat {}: {}", path.display(), e);
                        None
                    }
                },
                None => known,
            }
        }
    }

    /// Consume the body as a chunk stream. Empty in-memory bodies yield no chunks.
    pub fn into_stream(self) -> BodyStream {
        match self {
            ObjectBody::Text(text) => single_chunk(Bytes::from(text)),
            ObjectBody::Bytes(bytes) => single_chunk(bytes),
            ObjectBody::File(path) => {
                stream::try_unfold(FileReadState { path, file: None }, read_file_chunk).boxed()
            }
            ObjectBody::Stream(chunks) => chunks.map_err(GatewayError::from).boxed(),
        }
    }
}

impl fmt::Debug for ObjectBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectBody::Text(text) => write!(f, "Text({} bytes)", text.len()),
            ObjectBody::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            ObjectBody::File(path) => write!(f, "File({})", path.display()),
            ObjectBody::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<String> for ObjectBody {
    fn from(text: String) -> Self {
        ObjectBody::Text(text)
    }
}

impl From<&str> for ObjectBody {
    fn from(text: &str) -> Self {
        ObjectBody::Text(text.to_string())
    }
}

impl From<Vec<u8>> for ObjectBody {
    fn from(data: Vec<u8>) -> Self {
        ObjectBody::Bytes(Bytes::from(data))
    }
}

impl From<Bytes> for ObjectBody {
    fn from(data: Bytes) -> Self {
        ObjectBody::Bytes(data)
    }
}

impl From<PathBuf> for ObjectBody {
    fn from(path: PathBuf) -> Self {
        ObjectBody::File(path)
    }
}

fn single_chunk(bytes: Bytes) -> BodyStream {
    let chunk = (!bytes.is_empty()).then_some(Ok(bytes));
    stream::iter(chunk).boxed()
}

struct FileReadState {
    path: PathBuf,
    file: Option<File>,
}

async fn read_file_chunk(
    state: FileReadState,
) -> Result<Option<(Bytes, FileReadState)>, GatewayError> {
    let FileReadState { path, file } = state;
    let io_error = |e: std::io::Error| GatewayError::Io {
        message: format!("{}: {}", path.display(), e),
    };

    let mut file = match file {
        Some(file) => file,
        None => File::open(&path).await.map_err(io_error)?,
    };

    let mut buffer: Vec<u8> = vec![0u8; cloud_store_common::FILE_READ_CHUNK_SIZE];
    let read = file.read(&mut buffer).await.map_err(io_error)?;
    if read == 0 {
        return Ok(None);
    }
    buffer.truncate(read);

    Ok(Some((
        Bytes::from(buffer),
        FileReadState {
            path,
            file: Some(file),
        },
    )))
}

/// Identifies a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectConfig {
    /// Bucket name.
    pub bucket: String,
    /// Object key.
    pub key: String,
}

impl ObjectConfig {
    /// Create a new object reference.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

/// Everything needed to upload one object.
#[derive(Debug)]
pub struct UploadConfig {
    /// Target bucket.
    pub bucket: String,
    /// Target key.
    pub key: String,
    /// Content to upload.
    pub body: ObjectBody,
    /// Access policy applied after the transfer completes.
    pub acl: ObjectAcl,
    /// Encryption algorithm. None means the default algorithm.
    pub encryption: Option<ServerSideEncryption>,
    /// MIME type stored with the object.
    pub content_type: Option<String>,
}

impl UploadConfig {
    /// Create an upload of `body` to `bucket`/`key` with a private ACL.
    ///
    /// # Arguments
    /// * `bucket` - Target bucket
    /// * `key` - Target key
    /// * `body` - Content to upload
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        body: impl Into<ObjectBody>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            body: body.into(),
            acl: ObjectAcl::default(),
            encryption: None,
            content_type: None,
        }
    }

    /// Set the access policy.
    pub fn with_acl(mut self, acl: ObjectAcl) -> Self {
        self.acl = acl;
        self
    }

    /// Set the server-side encryption algorithm.
    pub fn with_encryption(mut self, encryption: ServerSideEncryption) -> Self {
        self.encryption = Some(encryption);
        self
    }

    /// Set the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Progress event emitted during an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadProgress {
    /// Target bucket.
    pub bucket: String,
    /// Target key.
    pub key: String,
    /// Bytes sent so far.
    pub loaded_bytes: u64,
    /// Total bytes, when known up front.
    pub total_bytes: Option<u64>,
    /// Part number just completed, for multipart transfers.
    pub part: Option<i32>,
}

/// Result of a bucket creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateBucketOutput {
    /// Location of the new bucket as reported by the service.
    pub location: Option<String>,
}

/// Result of a completed transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOutput {
    /// Bucket the object was written to.
    pub bucket: String,
    /// Key the object was written to.
    pub key: String,
    /// ETag of the stored object.
    pub etag: Option<String>,
    /// Location URL, for multipart transfers.
    pub location: Option<String>,
    /// Version id, on versioned buckets.
    pub version_id: Option<String>,
}

/// Result of an object deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteObjectOutput {
    /// HTTP status code of the response.
    pub status_code: u16,
    /// Whether a delete marker was created.
    pub delete_marker: Option<bool>,
    /// Version id of the delete marker.
    pub version_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_region_round_trips_through_identifier() {
        for region in Region::ALL {
            assert_eq!(region.as_str().parse::<Region>().unwrap(), region);
        }
        assert!("mars-north-1".parse::<Region>().is_err());
    }

    #[test]
    fn test_region_location_constraint() {
        assert_eq!(Region::UsEast1.location_constraint(), None);
        assert_eq!(Region::EuWest1.location_constraint(), Some("eu-west-1"));
        assert_eq!(Region::default(), Region::UsWest2);
    }

    #[test]
    fn test_acl_and_encryption_constants() {
        assert_eq!(ObjectAcl::default().as_str(), "private");
        assert_eq!(
            "bucket-owner-full-control".parse::<ObjectAcl>().unwrap(),
            ObjectAcl::BucketOwnerFullControl
        );
        assert!("world-writable".parse::<ObjectAcl>().is_err());
        assert_eq!(ServerSideEncryption::default().as_str(), "AES256");
        assert_eq!(
            "aws:kms".parse::<ServerSideEncryption>().unwrap(),
            ServerSideEncryption::AwsKms
        );
    }

    #[test]
    fn test_object_ownership_parses_its_own_names() {
        for ownership in [
            ObjectOwnership::BucketOwnerPreferred,
            ObjectOwnership::ObjectWriter,
            ObjectOwnership::BucketOwnerEnforced,
        ] {
            assert_eq!(ownership.to_string().parse::<ObjectOwnership>().unwrap(), ownership);
        }
        assert!(matches!(
            "bucket-owner-preferred".parse::<ObjectOwnership>(),
            Err(StorageError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let settings: StorageSettings = serde_json::from_str(
            r#"{
                "region": "eu-central-1",
                "credentials": { "access_key_id": "AKIA", "secret_access_key": "secret" }
            }"#,
        )
        .unwrap();

        assert_eq!(settings.region, Region::EuCentral1);
        assert_eq!(settings.retry, RetrySettings::default());
        assert!(!settings.force_path_style);
        let creds = settings.credentials.unwrap();
        assert_eq!(creds.session_token, None);
        assert_eq!(creds.expiration, None);
    }

    #[test]
    fn test_settings_reject_unknown_region() {
        let result: Result<StorageSettings, _> = serde_json::from_str(r#"{ "region": "nowhere" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_credentials_debug_redacts_secrets() {
        let creds = AwsCredentials::new("AKIAEXAMPLE", "very-secret").with_session_token("tok");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("AKIAEXAMPLE"));
        assert!(!debug.contains("very-secret"));
        assert!(!debug.contains("tok\""));
    }

    #[test]
    fn test_upload_config_defaults() {
        let config = UploadConfig::new("bucket", "key", "hello");
        assert_eq!(config.acl, ObjectAcl::Private);
        assert_eq!(config.encryption, None);
        assert_eq!(config.body.content_length(), Some(5));
    }

    #[tokio::test]
    async fn test_text_body_into_stream() {
        let chunks: Vec<Bytes> = ObjectBody::from("hello")
            .into_stream()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(chunks, vec![Bytes::from_static(b"hello")]);

        let empty: Vec<Bytes> = ObjectBody::from(Vec::<u8>::new())
            .into_stream()
            .try_collect()
            .await
            .unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_file_body_reads_whole_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let content: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        file.write_all(&content).unwrap();

        let body = ObjectBody::from(file.path().to_path_buf());
        assert_eq!(body.content_length(), None);
        assert_eq!(body.resolve_length().await, Some(content.len() as u64));
        let chunks: Vec<Bytes> = body.into_stream().try_collect().await.unwrap();

        assert!(chunks.len() > 1);
        assert_eq!(chunks.concat(), content);
    }

    #[tokio::test]
    async fn test_missing_file_body_fails_with_io_error() {
        let body = ObjectBody::from(PathBuf::from("/definitely/not/here.bin"));
        let result: Result<Vec<Bytes>, GatewayError> = body.into_stream().try_collect().await;
        assert!(matches!(result, Err(GatewayError::Io { .. })));
    }

    #[tokio::test]
    async fn test_resolve_length_per_body_kind() {
        assert_eq!(ObjectBody::from("hello").resolve_length().await, Some(5));
        let missing = ObjectBody::from(PathBuf::from("/definitely/not/here.bin"));
        assert_eq!(missing.resolve_length().await, None);
        let chunks = stream::iter(vec![Ok::<_, std::io::Error>(Bytes::from_static(b"a"))]);
        assert_eq!(ObjectBody::from_stream(chunks).resolve_length().await, None);
    }

    #[tokio::test]
    async fn test_stream_body_maps_io_errors() {
        let chunks = vec![
            Ok(Bytes::from_static(b"a")),
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "producer died")),
        ];
        let body = ObjectBody::from_stream(stream::iter(chunks));
        let result: Result<Vec<Bytes>, GatewayError> = body.into_stream().try_collect().await;
        assert!(
            matches!(result, Err(GatewayError::Io { message }) if message.contains("producer died"))
        );
    }
}
