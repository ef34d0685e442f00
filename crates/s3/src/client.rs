//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from s3cli-core.
//! The SDK client is built on first use and shared by every later call.
//! Uploads go through the SDK transfer manager, which decides between a
//! single PUT and a multipart upload.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3_transfer_manager::io::InputStream;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

use s3cli_core::{
    ClientConfig, Deadline, Error, ListPage, ObjectBody, ObjectReader, ObjectStore, Result,
    SessionCell, UploadOptions, UploadSource, collect_keys,
};

/// Provider name attached to static credentials
const STATIC_PROVIDER_NAME: &str = "aws-s3-static-credentials";

/// Error codes that mean the caller is not allowed to do this
const AUTH_CODES: &[&str] = &[
    "AccessDenied",
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "ExpiredToken",
];

/// Error codes that mean the bucket or key does not exist
const NOT_FOUND_CODES: &[&str] = &["NoSuchKey", "NotFound", "NoSuchBucket"];

/// SDK handles shared by every operation of one client
struct Session {
    s3: aws_sdk_s3::Client,
    transfer: aws_sdk_s3_transfer_manager::Client,
}

/// S3 client wrapper
pub struct S3Client {
    config: ClientConfig,
    list_page_size: Option<i32>,
    session: SessionCell<Arc<Session>>,
}

impl S3Client {
    /// Create a new S3 client; nothing is built until the first operation
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            list_page_size: None,
            session: SessionCell::new(),
        }
    }

    /// Cap the number of keys per listing page (the store's default is 1000)
    pub fn with_list_page_size(mut self, max_keys: i32) -> Self {
        self.list_page_size = Some(max_keys.max(1));
        self
    }

    /// Get the underlying aws-sdk-s3 client, building it on first use
    pub async fn sdk_client(&self) -> Result<aws_sdk_s3::Client> {
        Ok(self.session().await?.s3.clone())
    }

    async fn session(&self) -> Result<Arc<Session>> {
        self.session
            .get_or_try_init(|| async {
                let s3 = build_sdk_client(&self.config).await?;
                let transfer_config = aws_sdk_s3_transfer_manager::Config::builder()
                    .client(s3.clone())
                    .build();
                let transfer = aws_sdk_s3_transfer_manager::Client::new(transfer_config);
                Ok(Arc::new(Session { s3, transfer }))
            })
            .await
    }
}

impl fmt::Debug for S3Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Client")
            .field("config", &self.config)
            .field("list_page_size", &self.list_page_size)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn list(&self, deadline: &Deadline, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        deadline
            .run("list objects", async {
                let client = self.sdk_client().await?;

                collect_keys(|marker| {
                    tracing::debug!(bucket, prefix, marker = marker.as_deref(), "ListObjects");
                    let request = client
                        .list_objects()
                        .bucket(bucket)
                        .prefix(prefix)
                        .set_max_keys(self.list_page_size)
                        .set_marker(marker);

                    async move {
                        let response = request.send().await.map_err(|e| map_sdk_error(e, bucket))?;

                        Ok(ListPage {
                            keys: response
                                .contents()
                                .iter()
                                .filter_map(|object| object.key().map(str::to_string))
                                .collect(),
                            truncated: response.is_truncated().unwrap_or(false),
                        })
                    }
                })
                .await
            })
            .await
    }

    async fn open(&self, deadline: &Deadline, bucket: &str, key: &str) -> Result<ObjectBody> {
        deadline
            .run("get object", async {
                let client = self.sdk_client().await?;

                tracing::debug!(bucket, key, "GetObject");
                let response = client
                    .get_object()
                    .bucket(bucket)
                    .key(key)
                    .send()
                    .await
                    .map_err(|e| map_sdk_error(e, key))?;

                let content_length = response
                    .content_length()
                    .and_then(|len| u64::try_from(len).ok());
                let reader: ObjectReader = Box::pin(response.body.into_async_read());

                Ok(ObjectBody::new(reader, content_length))
            })
            .await
    }

    async fn upload(
        &self,
        deadline: &Deadline,
        bucket: &str,
        key: &str,
        source: UploadSource,
        options: UploadOptions,
    ) -> Result<()> {
        let session = deadline.run("build client", self.session()).await?;

        deadline
            .run("upload object", async {
                // The spooled copy is deleted when `_spooled` drops
                let (path, _spooled) = match source {
                    UploadSource::File(path) => (path, None),
                    UploadSource::Stream(reader) => {
                        let spooled = spool(reader).await?;
                        (spooled.to_path_buf(), Some(spooled))
                    }
                };

                let body = InputStream::from_path(&path)
                    .map_err(|e| Error::General(format!("{}: {e}", path.display())))?;

                let mut request = session.transfer.upload().bucket(bucket).key(key).body(body);
                if let Some(content_type) = &options.content_type {
                    request = request.content_type(content_type);
                }

                tracing::debug!(bucket, key, "managed upload");
                let handle = request
                    .initiate()
                    .map_err(|e| classify_failure(&DisplayErrorContext(&e).to_string(), key))?;
                handle
                    .join()
                    .await
                    .map_err(|e| classify_failure(&DisplayErrorContext(&e).to_string(), key))?;

                Ok(())
            })
            .await
    }

    async fn delete(&self, deadline: &Deadline, bucket: &str, key: &str) -> Result<()> {
        deadline
            .run("delete object", async {
                let client = self.sdk_client().await?;

                tracing::debug!(bucket, key, "DeleteObject");
                client
                    .delete_object()
                    .bucket(bucket)
                    .key(key)
                    .send()
                    .await
                    .map_err(|e| map_sdk_error(e, key))?;

                Ok(())
            })
            .await
    }
}

/// Copy a stream of unknown length into a temporary file
///
/// The transfer manager needs a sized body; the file is removed when the
/// returned path is dropped.
async fn spool(mut reader: ObjectReader) -> Result<TempPath> {
    let (file, path) = tempfile::NamedTempFile::new()?.into_parts();
    let mut file = tokio::fs::File::from_std(file);

    let bytes = tokio::io::copy(&mut reader, &mut file).await?;
    file.flush().await?;

    tracing::debug!(path = %path.display(), bytes, "spooled upload stream");
    Ok(path)
}

/// Build the SDK client for `config`
async fn build_sdk_client(config: &ClientConfig) -> Result<aws_sdk_s3::Client> {
    validate_region(&config.region)?;

    let timeouts = aws_config::timeout::TimeoutConfig::builder()
        .operation_timeout(config.request_timeout)
        .build();

    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()))
        .timeout_config(timeouts);

    // Without a static pair the default chain (env, profile, instance role) applies
    if let Some(creds) = &config.credentials {
        let credentials = aws_credential_types::Credentials::new(
            creds.access_key_id.clone(),
            creds.secret_access_key.clone(),
            None, // session token
            None, // expiry
            STATIC_PROVIDER_NAME,
        );
        loader = loader.credentials_provider(credentials);
    }

    if let Some(endpoint) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    let sdk_config = loader.load().await;

    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(config.force_path_style)
        .build();

    tracing::debug!(
        region = %config.region,
        static_credentials = config.credentials.is_some(),
        endpoint = config.endpoint_url.as_deref(),
        "built S3 client"
    );

    Ok(aws_sdk_s3::Client::from_conf(s3_config))
}

fn validate_region(region: &str) -> Result<()> {
    let well_formed = !region.is_empty()
        && !region.starts_with('-')
        && !region.ends_with('-')
        && region
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if well_formed {
        Ok(())
    } else {
        Err(Error::Config(format!("invalid region: {region:?}")))
    }
}

/// Map an SDK failure onto the core error taxonomy
fn map_sdk_error<E, R>(err: SdkError<E, R>, target: &str) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: fmt::Debug + Send + Sync + 'static,
{
    if matches!(
        err,
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_)
    ) {
        return Error::Network(format!("{target}: {}", DisplayErrorContext(&err)));
    }

    match err.code() {
        Some(code) if NOT_FOUND_CODES.contains(&code) => Error::NotFound(target.to_string()),
        Some(code) if AUTH_CODES.contains(&code) => {
            Error::Auth(format!("{target}: {}", err.message().unwrap_or(code)))
        }
        _ => Error::Network(format!("{target}: {}", DisplayErrorContext(&err))),
    }
}

/// Classify a transfer manager failure by the service error code in its message
///
/// The transfer manager wraps the SDK error, so only the rendered chain is
/// available here.
fn classify_failure(detail: &str, target: &str) -> Error {
    if NOT_FOUND_CODES.iter().any(|code| detail.contains(code)) {
        Error::NotFound(format!("{target}: {detail}"))
    } else if AUTH_CODES.iter().any(|code| detail.contains(code)) {
        Error::Auth(format!("{target}: {detail}"))
    } else {
        Error::Network(format!("{target}: {detail}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    fn test_config(region: &str) -> ClientConfig {
        ClientConfig::new(region)
            .with_credentials("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG")
            .unwrap()
    }

    #[test]
    fn test_validate_region() {
        assert!(validate_region("us-east-1").is_ok());
        assert!(validate_region("eu-central-1").is_ok());
        assert!(validate_region("garage").is_ok());
        assert!(validate_region("").is_err());
        assert!(validate_region("us east 1").is_err());
        assert!(validate_region("-us-east-1").is_err());
        assert!(validate_region("us-east-1/").is_err());
    }

    #[test]
    fn test_classify_failure() {
        let err = classify_failure("service error: NoSuchBucket: bucket does not exist", "k");
        assert!(matches!(err, Error::NotFound(_)));

        let err = classify_failure("service error: AccessDenied: Access Denied", "k");
        assert!(matches!(err, Error::Auth(_)));

        let err = classify_failure("dispatch failure: connection refused", "k");
        assert!(matches!(err, Error::Network(msg) if msg.starts_with("k: ")));
    }

    #[tokio::test]
    async fn test_spool_copies_stream() {
        let path = spool(Box::pin(Cursor::new(b"from stdin".to_vec())))
            .await
            .unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"from stdin");

        let kept = path.to_path_buf();
        drop(path);
        assert!(!kept.exists());
    }

    #[tokio::test]
    async fn test_spool_empty_stream() {
        let path = spool(Box::pin(Cursor::new(Vec::new()))).await.unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_new_does_not_build_session() {
        let client = S3Client::new(test_config("us-east-1"));
        assert!(!client.session.is_initialized().await);
        assert_eq!(client.config.region, "us-east-1");
    }

    #[tokio::test]
    async fn test_invalid_region_is_not_cached() {
        let client = S3Client::new(test_config("not a region"));

        let first = client.sdk_client().await;
        assert!(matches!(first, Err(Error::Config(_))));
        assert!(!client.session.is_initialized().await);

        let second = client.sdk_client().await;
        assert!(matches!(second, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_invalid_region_surfaces_from_operations() {
        let client = S3Client::new(test_config("bad region"));
        let deadline = Deadline::after(Duration::from_secs(30));

        let result = client.delete(&deadline, "bucket", "key").await;
        assert!(matches!(result, Err(Error::Config(_))));

        let source = UploadSource::Stream(Box::pin(Cursor::new(b"data".to_vec())));
        let result = client
            .upload(&deadline, "bucket", "key", source, UploadOptions::default())
            .await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_use_shares_session() {
        let client = Arc::new(S3Client::new(
            test_config("us-west-2").with_endpoint("http://127.0.0.1:9").unwrap(),
        ));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let client = Arc::clone(&client);
                tokio::spawn(async move { client.sdk_client().await.map(|_| ()) })
            })
            .collect();

        for result in futures::future::join_all(tasks).await {
            assert!(result.unwrap().is_ok());
        }
        assert!(client.session.is_initialized().await);
    }
}
