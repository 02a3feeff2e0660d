//! Input validation for bucket names and object keys.
//!
//! Runs before any gateway call so malformed input never reaches the service.

use std::net::Ipv4Addr;

use cloud_store_common::MAX_OBJECT_KEY_LEN;

use crate::error::StorageError;

/// Validate a bucket name against the S3 naming rules.
///
/// # Arguments
/// * `bucket` - Bucket name to check
pub fn validate_bucket_name(bucket: &str) -> Result<(), StorageError> {
    let invalid = |reason: &str| {
        Err(StorageError::invalid_config(format!(
            "invalid bucket name '{}': {}",
            bucket, reason
        )))
    };

    if !(3..=63).contains(&bucket.len()) {
        return invalid("must be between 3 and 63 characters long");
    }

    if !bucket
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-')
    {
        return invalid("only lowercase letters, digits, dots and hyphens are allowed");
    }

    let starts_ok = bucket.starts_with(|c: char| c.is_ascii_alphanumeric());
    let ends_ok = bucket.ends_with(|c: char| c.is_ascii_alphanumeric());
    if !starts_ok || !ends_ok {
        return invalid("must begin and end with a letter or digit");
    }

    if bucket.contains("..") || bucket.contains(".-") || bucket.contains("-.") {
        return invalid("dots may not be adjacent to dots or hyphens");
    }

    if bucket.parse::<Ipv4Addr>().is_ok() {
        return invalid("must not be formatted as an IP address");
    }

    Ok(())
}

/// Validate an object key.
///
/// # Arguments
/// * `key` - Object key to check
pub fn validate_object_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::invalid_config("object key is empty"));
    }

    if key.len() > MAX_OBJECT_KEY_LEN {
        return Err(StorageError::invalid_config(format!(
            "object key is too long ({} bytes, max {})",
            key.len(),
            MAX_OBJECT_KEY_LEN
        )));
    }

    Ok(())
}

/// Validate a bucket/key pair.
pub(crate) fn validate_object(bucket: &str, key: &str) -> Result<(), StorageError> {
    validate_bucket_name(bucket)?;
    validate_object_key(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_bucket_names() {
        assert!(validate_bucket_name("my-bucket").is_ok());
        assert!(validate_bucket_name("logs.example.com").is_ok());
        assert!(validate_bucket_name("abc").is_ok());
        assert!(validate_bucket_name(&"a".repeat(63)).is_ok());
    }

    #[test]
    fn test_bucket_name_length() {
        assert!(validate_bucket_name("ab").is_err());
        assert!(validate_bucket_name(&"a".repeat(64)).is_err());
        assert!(validate_bucket_name("").is_err());
    }

    #[test]
    fn test_bucket_name_characters() {
        assert!(validate_bucket_name("My-Bucket").is_err());
        assert!(validate_bucket_name("my_bucket").is_err());
        assert!(validate_bucket_name("-bucket").is_err());
        assert!(validate_bucket_name("bucket.").is_err());
        assert!(validate_bucket_name("my..bucket").is_err());
        assert!(validate_bucket_name("my.-bucket").is_err());
    }

    #[test]
    fn test_bucket_name_ip_address() {
        assert!(validate_bucket_name("192.168.5.4").is_err());
    }

    #[test]
    fn test_object_keys() {
        assert!(validate_object_key("folder/image.png").is_ok());
        assert!(validate_object_key("").is_err());
        assert!(validate_object_key(&"k".repeat(MAX_OBJECT_KEY_LEN)).is_ok());
        assert!(validate_object_key(&"k".repeat(MAX_OBJECT_KEY_LEN + 1)).is_err());
    }

    #[test]
    fn test_error_names_bucket() {
        let err = validate_bucket_name("Bad_Name").unwrap_err();
        assert!(err.to_string().contains("Bad_Name"));
    }
}
