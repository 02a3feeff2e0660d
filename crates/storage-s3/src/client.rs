//! AWS SDK S3 gateway implementation.

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketLocationConstraint, CreateBucketConfiguration, ObjectCannedAcl,
    ObjectOwnership as S3ObjectOwnership,
};
use aws_sdk_s3::Client as S3Client;
use aws_smithy_runtime_api::box_error::BoxError;
use aws_smithy_runtime_api::client::interceptors::context::BeforeDeserializationInterceptorContextRef;
use aws_smithy_runtime_api::client::interceptors::Intercept;
use aws_smithy_runtime_api::client::runtime_components::RuntimeComponents;
use aws_smithy_types::config_bag::ConfigBag;
use cloud_store::{
    BodyStream, CreateBucketOutput, DeleteObjectOutput, GatewayError, ObjectAcl, ObjectGateway,
    ObjectOwnership, Region, StorageError, StorageSettings, TransferRequest, UploadOutput,
    UploadProgressCallback,
};
use cloud_store_common::{DEFAULT_PART_SIZE, MIN_PART_SIZE};
use futures::stream::{self, StreamExt};

use crate::error::gateway_error;
use crate::transfer::Transfer;

/// Provider name attached to static credentials.
const CREDENTIALS_PROVIDER_NAME: &str = "cloud-store";

/// ObjectGateway implementation using the AWS SDK for Rust.
///
/// Retries, connection pooling and timeouts are the SDK's; the retry policy
/// comes from [`StorageSettings::retry`].
#[derive(Debug, Clone)]
pub struct S3Gateway {
    /// The underlying S3 client.
    s3_client: S3Client,
    /// Part size for multipart transfers.
    part_size: usize,
}

impl S3Gateway {
    /// Create a gateway from storage settings.
    ///
    /// Static credentials are used when present; otherwise the SDK default
    /// credential chain applies.
    ///
    /// # Arguments
    /// * `settings` - Region, credentials, retry policy and endpoint
    pub async fn new(settings: &StorageSettings) -> Result<Self, StorageError> {
        if settings.retry.max_attempts == 0 {
            return Err(StorageError::InvalidConfig {
                message: "retry.max_attempts must be at least 1".to_string(),
            });
        }

        let retry_config = RetryConfig::standard()
            .with_max_attempts(settings.retry.max_attempts)
            .with_initial_backoff(Duration::from_millis(settings.retry.initial_backoff_ms))
            .with_max_backoff(Duration::from_millis(settings.retry.max_backoff_ms));

        let mut config_loader = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(settings.region.as_str()))
            .retry_config(retry_config);

        if let Some(ref creds) = settings.credentials {
            let credentials = Credentials::new(
                &creds.access_key_id,
                &creds.secret_access_key,
                creds.session_token.clone(),
                creds.expiration,
                CREDENTIALS_PROVIDER_NAME,
            );
            config_loader = config_loader.credentials_provider(credentials);
        }

        if let Some(ref endpoint_url) = settings.endpoint_url {
            config_loader = config_loader.endpoint_url(endpoint_url);
        }

        let sdk_config = config_loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(settings.force_path_style)
            .build();

        log::debug!(
            "S3 gateway initialized for region {} (endpoint: {})",
            settings.region,
            settings.endpoint_url.as_deref().unwrap_or("default")
        );

        Ok(Self::from_client(S3Client::from_conf(s3_config)))
    }

    /// Create a gateway from an existing S3Client (for testing).
    ///
    /// # Arguments
    /// * `s3_client` - Pre-configured S3 client
    pub fn from_client(s3_client: S3Client) -> Self {
        Self {
            s3_client,
            part_size: DEFAULT_PART_SIZE,
        }
    }

    /// Set the part size for multipart transfers.
    ///
    /// # Arguments
    /// * `part_size` - Bytes per part, at least the S3 minimum of 5MB
    pub fn with_part_size(mut self, part_size: usize) -> Result<Self, StorageError> {
        if part_size < MIN_PART_SIZE {
            return Err(StorageError::InvalidConfig {
                message: format!(
                    "part size {} is below the minimum of {} bytes",
                    part_size, MIN_PART_SIZE
                ),
            });
        }
        self.part_size = part_size;
        Ok(self)
    }

    /// Part size used for multipart transfers.
    pub fn part_size(&self) -> usize {
        self.part_size
    }
}

#[async_trait]
impl ObjectGateway for S3Gateway {
    async fn create_bucket(
        &self,
        bucket: &str,
        region: Region,
        ownership: ObjectOwnership,
    ) -> Result<CreateBucketOutput, GatewayError> {
        let mut request = self
            .s3_client
            .create_bucket()
            .bucket(bucket)
            .object_ownership(S3ObjectOwnership::from(ownership.as_str()));

        if let Some(constraint) = region.location_constraint() {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(constraint))
                    .build(),
            );
        }

        let output = request.send().await.map_err(gateway_error)?;

        Ok(CreateBucketOutput {
            location: output.location().map(str::to_string),
        })
    }

    async fn delete_public_access_block(&self, bucket: &str) -> Result<(), GatewayError> {
        self.s3_client
            .delete_public_access_block()
            .bucket(bucket)
            .send()
            .await
            .map_err(gateway_error)?;

        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<(), GatewayError> {
        self.s3_client
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(gateway_error)?;

        Ok(())
    }

    async fn transfer(
        &self,
        request: TransferRequest,
        progress: Option<&UploadProgressCallback>,
    ) -> Result<UploadOutput, GatewayError> {
        let total_bytes = request.body.resolve_length().await;
        let transfer = Transfer::new(
            &self.s3_client,
            self.part_size,
            &request,
            total_bytes,
            progress,
        );
        transfer.run(request.body.into_stream()).await
    }

    async fn put_object_acl(
        &self,
        bucket: &str,
        key: &str,
        acl: ObjectAcl,
    ) -> Result<(), GatewayError> {
        self.s3_client
            .put_object_acl()
            .bucket(bucket)
            .key(key)
            .acl(ObjectCannedAcl::from(acl.as_str()))
            .send()
            .await
            .map_err(gateway_error)?;

        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<BodyStream, GatewayError> {
        let response = self
            .s3_client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(gateway_error)?;

        Ok(body_stream(response.body))
    }

    async fn delete_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<DeleteObjectOutput, GatewayError> {
        let status = StatusCapture::default();

        let output = self
            .s3_client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .customize()
            .interceptor(status.clone())
            .send()
            .await
            .map_err(gateway_error)?;

        Ok(DeleteObjectOutput {
            status_code: status.get(),
            delete_marker: output.delete_marker(),
            version_id: output.version_id().map(str::to_string),
        })
    }
}

/// Adapt an SDK body into a chunk stream.
pub(crate) fn body_stream(body: ByteStream) -> BodyStream {
    stream::try_unfold(body, |mut body| async move {
        match body.try_next().await {
            Ok(Some(chunk)) => Ok(Some((chunk, body))),
            Ok(None) => Ok(None),
            Err(e) => Err(GatewayError::Network {
                message: e.to_string(),
                retryable: true,
            }),
        }
    })
    .boxed()
}

/// Records the HTTP status code of the response it sees.
///
/// The SDK surfaces only the parsed output on success; this keeps the raw
/// status so callers can tell `204 No Content` from other 2xx answers.
#[derive(Debug, Default, Clone)]
struct StatusCapture(Arc<AtomicU16>);

impl StatusCapture {
    fn get(&self) -> u16 {
        self.0.load(Ordering::SeqCst)
    }
}

impl Intercept for StatusCapture {
    fn name(&self) -> &'static str {
        "StatusCapture"
    }

    fn read_after_transmit(
        &self,
        context: &BeforeDeserializationInterceptorContextRef<'_>,
        _runtime_components: &RuntimeComponents,
        _cfg: &mut ConfigBag,
    ) -> Result<(), BoxError> {
        self.0
            .store(context.response().status().as_u16(), Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use cloud_store::{
        progress_fn, AwsCredentials, ObjectBody, ObjectConfig, RetrySettings, StorageClient,
        UploadProgress,
    };
    use futures::TryStreamExt;

    use crate::replay::{replay_client, sent_requests, ACCESS_DENIED};

    #[test]
    fn test_s3_gateway_implements_object_gateway() {
        // This is a compile-time test to ensure the trait is implemented correctly
        fn assert_object_gateway<T: ObjectGateway>() {}
        assert_object_gateway::<S3Gateway>();
    }

    fn local_settings() -> StorageSettings {
        StorageSettings::new(Region::EuWest1, AwsCredentials::new("AKIDEXAMPLE", "secret"))
            .with_endpoint_url("http://127.0.0.1:9000")
            .with_force_path_style(true)
    }

    #[tokio::test]
    async fn test_new_from_settings() {
        let gateway = S3Gateway::new(&local_settings()).await.unwrap();
        assert_eq!(gateway.part_size(), DEFAULT_PART_SIZE);
    }

    #[tokio::test]
    async fn test_new_rejects_zero_attempts() {
        let settings = local_settings().with_retry(RetrySettings {
            max_attempts: 0,
            ..RetrySettings::default()
        });
        assert!(matches!(
            S3Gateway::new(&settings).await,
            Err(StorageError::InvalidConfig { .. })
        ));
    }

    #[tokio::test]
    async fn test_part_size_minimum() {
        let gateway = S3Gateway::new(&local_settings()).await.unwrap();
        assert!(gateway.clone().with_part_size(MIN_PART_SIZE - 1).is_err());
        let gateway = gateway.with_part_size(16 * 1024 * 1024).unwrap();
        assert_eq!(gateway.part_size(), 16 * 1024 * 1024);
    }

    #[tokio::test]
    async fn test_body_stream_yields_all_bytes() {
        let chunks: Vec<bytes::Bytes> = body_stream(ByteStream::from_static(b"object body"))
            .try_collect()
            .await
            .unwrap();
        assert_eq!(chunks.concat(), b"object body".to_vec());
    }

    #[tokio::test]
    async fn test_delete_object_reports_no_content_status() {
        let (s3_client, http) = replay_client(&[(204, "")]);
        let gateway = S3Gateway::from_client(s3_client);

        let output = gateway.delete_object("media", "clip.bin").await.unwrap();

        assert_eq!(output.status_code, 204);
        let sent = sent_requests(&http);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "DELETE");
    }

    #[tokio::test]
    async fn test_delete_object_reports_ok_status() {
        let (s3_client, _http) = replay_client(&[(200, "")]);
        let gateway = S3Gateway::from_client(s3_client);

        let output = gateway.delete_object("media", "clip.bin").await.unwrap();

        assert_eq!(output.status_code, 200);
    }

    #[tokio::test]
    async fn test_delete_object_maps_service_errors() {
        let (s3_client, _http) = replay_client(&[(403, ACCESS_DENIED)]);
        let gateway = S3Gateway::from_client(s3_client);

        let result = gateway.delete_object("media", "clip.bin").await;

        assert!(matches!(result, Err(GatewayError::AccessDenied { .. })));
    }

    #[tokio::test]
    async fn test_client_delete_returns_previous_content() {
        let (s3_client, http) = replay_client(&[(200, "old contents"), (204, "")]);
        let client = StorageClient::new(S3Gateway::from_client(s3_client), Region::UsWest2);

        let previous = client
            .delete(&ObjectConfig::new("media", "clip.bin"))
            .await
            .unwrap();

        assert_eq!(previous, b"old contents".to_vec());
        let methods: Vec<String> = sent_requests(&http).into_iter().map(|(m, _)| m).collect();
        assert_eq!(methods, vec!["GET", "DELETE"]);
    }

    #[tokio::test]
    async fn test_client_delete_rejects_non_204_answer() {
        let (s3_client, _http) = replay_client(&[(200, "old contents"), (200, "")]);
        let client = StorageClient::new(S3Gateway::from_client(s3_client), Region::UsWest2);

        let err = client
            .delete(&ObjectConfig::new("media", "clip.bin"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StorageError::UnexpectedStatus {
                expected: 204,
                actual: 200,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_transfer_reports_file_size_as_total() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"file body").unwrap();
        let (s3_client, _http) = replay_client(&[(200, "")]);
        let gateway = S3Gateway::from_client(s3_client);

        let totals: Arc<Mutex<Vec<Option<u64>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = totals.clone();
        let observer =
            progress_fn(move |p: &UploadProgress| sink.lock().unwrap().push(p.total_bytes));
        let request = TransferRequest {
            bucket: "media".into(),
            key: "notes.txt".into(),
            body: ObjectBody::from(file.path().to_path_buf()),
            encryption: Default::default(),
            content_type: Some("text/plain".into()),
        };

        gateway.transfer(request, Some(&observer)).await.unwrap();

        assert_eq!(*totals.lock().unwrap(), vec![Some(9)]);
    }
}
