//! Canned HTTP exchanges for driving the SDK client without a network.

use aws_credential_types::Credentials;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_sdk_s3::Client as S3Client;
use aws_smithy_http_client::test_util::{ReplayEvent, StaticReplayClient};
use aws_smithy_runtime_api::client::orchestrator::{HttpRequest, HttpResponse};
use aws_smithy_runtime_api::http::StatusCode;
use aws_smithy_types::body::SdkBody;

pub(crate) const UPLOAD_ID: &str = "upload-1";

pub(crate) const INITIATE_MULTIPART: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<InitiateMultipartUploadResult>
  <Bucket>media</Bucket>
  <Key>clip.bin</Key>
  <UploadId>upload-1</UploadId>
</InitiateMultipartUploadResult>"#;

pub(crate) const COMPLETE_MULTIPART: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CompleteMultipartUploadResult>
  <Location>https://media.s3.amazonaws.com/clip.bin</Location>
  <Bucket>media</Bucket>
  <Key>clip.bin</Key>
  <ETag>final-etag</ETag>
</CompleteMultipartUploadResult>"#;

pub(crate) const ACCESS_DENIED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error>
  <Code>AccessDenied</Code>
  <Message>Access Denied</Message>
  <RequestId>req-1</RequestId>
</Error>"#;

pub(crate) const INTERNAL_ERROR: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error>
  <Code>InternalError</Code>
  <Message>We encountered an internal error.</Message>
  <RequestId>req-2</RequestId>
</Error>"#;

/// An SDK client that answers each request with the next canned response.
///
/// Retries are off so every response maps to exactly one request.
pub(crate) fn replay_client(responses: &[(u16, &'static str)]) -> (S3Client, StaticReplayClient) {
    let events: Vec<ReplayEvent> = responses
        .iter()
        .map(|&(status, body)| {
            let response = HttpResponse::new(
                StatusCode::try_from(status).unwrap(),
                SdkBody::from(body),
            );
            ReplayEvent::new(HttpRequest::new(SdkBody::empty()), response)
        })
        .collect();
    let http_client = StaticReplayClient::new(events);

    let config = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-west-2"))
        .credentials_provider(Credentials::new("AKIDTEST", "secret", None, None, "replay"))
        .retry_config(RetryConfig::disabled())
        .http_client(http_client.clone())
        .build();

    (S3Client::from_conf(config), http_client)
}

/// Method and URI of every request the client sent, in order.
pub(crate) fn sent_requests(http_client: &StaticReplayClient) -> Vec<(String, String)> {
    http_client
        .actual_requests()
        .map(|request| (request.method().to_string(), request.uri().to_string()))
        .collect()
}
