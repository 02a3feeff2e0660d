//! Mapping from AWS SDK errors to gateway errors.

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
use cloud_store::GatewayError;

/// Convert an SDK error into a [`GatewayError`].
///
/// # Arguments
/// * `err` - Error returned by an SDK operation's `send()`
pub(crate) fn gateway_error<E>(err: SdkError<E, HttpResponse>) -> GatewayError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let message: String = DisplayErrorContext(&err).to_string();

    match &err {
        SdkError::ServiceError(context) => {
            let status: u16 = context.raw().status().as_u16();
            let service_err = context.err();
            classify_service_error(
                service_err.code(),
                service_err.message().unwrap_or(&message),
                Some(status),
            )
        }
        SdkError::TimeoutError(_) => GatewayError::Network {
            message,
            retryable: true,
        },
        SdkError::DispatchFailure(failure) => GatewayError::Network {
            retryable: failure.is_io() || failure.is_timeout(),
            message,
        },
        SdkError::ResponseError(_) => GatewayError::Network {
            message,
            retryable: true,
        },
        SdkError::ConstructionFailure(_) => GatewayError::InvalidRequest { message },
        _ => GatewayError::Service {
            code: "Unknown".to_string(),
            message,
            status: None,
        },
    }
}

/// Classify a service rejection by its error code and HTTP status.
///
/// # Arguments
/// * `code` - Service error code, e.g. "NoSuchKey"
/// * `message` - Service error message
/// * `status` - HTTP status of the response
pub(crate) fn classify_service_error(
    code: Option<&str>,
    message: &str,
    status: Option<u16>,
) -> GatewayError {
    let message: String = message.to_string();

    match (code, status) {
        (Some("NoSuchKey"), _) | (Some("NotFound"), _) => GatewayError::NotFound { message },
        (Some("NoSuchBucket"), _) => GatewayError::NoSuchBucket { message },
        (Some("BucketAlreadyExists"), _) => GatewayError::BucketAlreadyExists {
            message,
            owned_by_you: false,
        },
        (Some("BucketAlreadyOwnedByYou"), _) => GatewayError::BucketAlreadyExists {
            message,
            owned_by_you: true,
        },
        (Some("AccessDenied"), _) | (Some("AllAccessDisabled"), _) => {
            GatewayError::AccessDenied { message }
        }
        // HEAD-style responses carry no error body.
        (None, Some(403)) => GatewayError::AccessDenied { message },
        (None, Some(404)) => GatewayError::NotFound { message },
        (code, status) => GatewayError::Service {
            code: code.unwrap_or("Unknown").to_string(),
            message,
            status,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_not_found() {
        assert!(matches!(
            classify_service_error(Some("NoSuchKey"), "gone", Some(404)),
            GatewayError::NotFound { .. }
        ));
        assert!(matches!(
            classify_service_error(None, "", Some(404)),
            GatewayError::NotFound { .. }
        ));
        assert!(matches!(
            classify_service_error(Some("NoSuchBucket"), "gone", Some(404)),
            GatewayError::NoSuchBucket { .. }
        ));
    }

    #[test]
    fn test_classify_bucket_already_exists() {
        assert_eq!(
            classify_service_error(Some("BucketAlreadyOwnedByYou"), "yours", Some(409)),
            GatewayError::BucketAlreadyExists {
                message: "yours".into(),
                owned_by_you: true,
            }
        );
        assert_eq!(
            classify_service_error(Some("BucketAlreadyExists"), "taken", Some(409)),
            GatewayError::BucketAlreadyExists {
                message: "taken".into(),
                owned_by_you: false,
            }
        );
    }

    #[test]
    fn test_classify_access_denied() {
        assert!(matches!(
            classify_service_error(Some("AccessDenied"), "denied", Some(403)),
            GatewayError::AccessDenied { .. }
        ));
        assert!(matches!(
            classify_service_error(None, "", Some(403)),
            GatewayError::AccessDenied { .. }
        ));
    }

    #[test]
    fn test_classify_other_service_errors() {
        let err = classify_service_error(Some("SlowDown"), "reduce request rate", Some(503));
        assert_eq!(
            err,
            GatewayError::Service {
                code: "SlowDown".into(),
                message: "reduce request rate".into(),
                status: Some(503),
            }
        );
        assert!(err.is_retryable());

        let err = classify_service_error(None, "teapot", Some(418));
        assert!(matches!(err, GatewayError::Service { ref code, .. } if code == "Unknown"));
        assert!(!err.is_retryable());
    }
}
