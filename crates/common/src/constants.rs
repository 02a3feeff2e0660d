//! Shared constants used across cloud-store crates.

/// The one region whose bucket-creation request carries no location constraint.
pub const LOCATION_CONSTRAINT_FREE_REGION: &str = "us-east-1";

/// Minimum part size accepted by S3 multipart uploads (5MB), except for the last part.
pub const MIN_PART_SIZE: usize = 5 * 1024 * 1024;

/// Part size used by the resumable transfer (8MB).
pub const DEFAULT_PART_SIZE: usize = 8 * 1024 * 1024;

/// Read buffer size for file-backed bodies (64KB).
pub const FILE_READ_CHUNK_SIZE: usize = 64 * 1024;

/// HTTP status returned by a successful object deletion.
pub const STATUS_NO_CONTENT: u16 = 204;

/// Longest object key accepted by S3, in bytes.
pub const MAX_OBJECT_KEY_LEN: usize = 1024;

/// Default number of attempts handed to the SDK retry strategy.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
