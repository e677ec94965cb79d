use std::fmt;
use std::sync::Arc;

use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::{
    executor::{Executor, HttpResponse},
    metrics::Metrics,
    wire::{self, ErrorBody, GetObjectRequest, GetObjectResponse, PutObjectRequest},
    BucketCreated, ClientOptions, Health, MetricsSummary, ObjectList, PutObjectResult, Result,
    StorageError,
};

/// Endpoint used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

#[derive(Clone)]
/// HTTP client for the bucket/object storage service.
///
/// Clones share one transport handle, one set of metrics and one closed
/// flag. Operations may run concurrently; each runs its own retry loop.
pub struct StorageClient {
    inner: Arc<Executor>,
}

impl fmt::Debug for StorageClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageClient")
            .field("base_url", &self.inner.base_url().as_str())
            .field("options", self.inner.options())
            .field("closed", &self.inner.is_closed())
            .finish()
    }
}

impl StorageClient {
    /// Creates a client for `base_url` with default options.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_options(base_url, ClientOptions::default())
    }

    /// Creates a client for `base_url` with explicit timeout and retry
    /// options.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use objstore_http::{ClientOptions, StorageClient};
    ///
    /// let client = StorageClient::with_options(
    ///     "http://127.0.0.1:8000",
    ///     ClientOptions { max_retries: 2, backoff_factor_ms: 100, ..ClientOptions::default() },
    /// )
    /// .expect("valid options");
    /// ```
    pub fn with_options(base_url: impl AsRef<str>, options: ClientOptions) -> Result<Self> {
        options.validate()?;
        let base_url = parse_base_url(base_url.as_ref())?;
        Ok(Self {
            inner: Arc::new(Executor::new(base_url, options)),
        })
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `OBJSTORE_BASE_URL` (default [`DEFAULT_BASE_URL`])
    /// - `OBJSTORE_TIMEOUT_MS`
    /// - `OBJSTORE_MAX_RETRIES`
    /// - `OBJSTORE_BACKOFF_MS`
    ///
    /// Unset variables fall back to [`ClientOptions::default`]; set but
    /// unparsable ones are an error.
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("OBJSTORE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
        let defaults = ClientOptions::default();
        let options = ClientOptions {
            timeout_ms: env_number("OBJSTORE_TIMEOUT_MS")?.unwrap_or(defaults.timeout_ms),
            max_retries: env_number("OBJSTORE_MAX_RETRIES")?.unwrap_or(defaults.max_retries),
            backoff_factor_ms: env_number("OBJSTORE_BACKOFF_MS")?
                .unwrap_or(defaults.backoff_factor_ms),
        };
        Self::with_options(base_url, options)
    }

    /// The normalized endpoint this client talks to.
    pub fn base_url(&self) -> &str {
        self.inner.base_url().as_str()
    }

    pub fn options(&self) -> &ClientOptions {
        self.inner.options()
    }

    /// Live metrics shared by every clone of this client.
    pub fn metrics(&self) -> &Metrics {
        self.inner.metrics()
    }

    /// Totals plus mean and p95 latency, rounded to 4 decimals.
    pub fn summarize_metrics(&self) -> MetricsSummary {
        self.inner.metrics().summarize()
    }

    /// Releases the transport handle. In-flight operations end with
    /// [`StorageError::Closed`] and later calls fail the same way.
    pub fn close(&self) {
        self.inner.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<Health> {
        let response = self.inner.execute(Method::GET, &["health"]).await?;
        decode_success(response)
    }

    /// `POST /buckets/{bucket}`. A duplicate name yields
    /// [`StorageError::BucketExists`] and is never retried.
    pub async fn create_bucket(&self, bucket: &str) -> Result<BucketCreated> {
        let response = self
            .inner
            .execute(Method::POST, &["buckets", bucket])
            .await?;
        if response.status == StatusCode::BAD_REQUEST {
            return Err(StorageError::BucketExists(bucket.to_owned()));
        }
        decode_success(response)
    }

    /// `GET /buckets`, in server order.
    pub async fn list_buckets(&self) -> Result<Vec<String>> {
        let response = self.inner.execute(Method::GET, &["buckets"]).await?;
        decode_success(response)
    }

    /// `GET /objects/{bucket}`
    pub async fn list_objects(&self, bucket: &str) -> Result<ObjectList> {
        let response = self
            .inner
            .execute(Method::GET, &["objects", bucket])
            .await?;
        if response.status == StatusCode::NOT_FOUND {
            return Err(StorageError::BucketNotFound(bucket.to_owned()));
        }
        decode_success(response)
    }

    /// `POST /objects`. The server creates the bucket if it is missing.
    pub async fn put_object(
        &self,
        bucket: &str,
        object_name: &str,
        data: impl Into<String>,
    ) -> Result<PutObjectResult> {
        let payload = PutObjectRequest {
            bucket: bucket.to_owned(),
            object_name: object_name.to_owned(),
            data: data.into(),
        };
        let response = self
            .inner
            .execute_json(Method::POST, &["objects"], &payload)
            .await?;
        decode_success(response)
    }

    /// `POST /objects/get` and returns the stored payload.
    ///
    /// A 404, or a response without `data`, becomes
    /// [`StorageError::BucketNotFound`] or [`StorageError::ObjectNotFound`].
    pub async fn get_object(&self, bucket: &str, object_name: &str) -> Result<String> {
        let payload = GetObjectRequest {
            bucket: bucket.to_owned(),
            object_name: object_name.to_owned(),
        };
        let response = self
            .inner
            .execute_json(Method::POST, &["objects", "get"], &payload)
            .await?;

        if response.status == StatusCode::NOT_FOUND {
            return Err(not_found_from_body(&response.body, bucket, object_name));
        }

        let decoded: GetObjectResponse = decode_success(response)?;
        decoded.data.ok_or_else(|| StorageError::ObjectNotFound {
            bucket: bucket.to_owned(),
            object: object_name.to_owned(),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed)
        .map_err(|err| StorageError::Config(format!("invalid base url '{raw}': {err}")))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(StorageError::Config(format!(
            "base url must be an http(s) url: {raw}"
        )));
    }
    Ok(url)
}

fn env_number<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| StorageError::Config(format!("{name} is not a valid number: {value}"))),
        _ => Ok(None),
    }
}

/// Decodes a 2xx body; any other status becomes [`StorageError::Http`].
fn decode_success<T: DeserializeOwned>(response: HttpResponse) -> Result<T> {
    if !response.status.is_success() {
        return Err(StorageError::Http {
            status: response.status.as_u16(),
            body: response.body,
        });
    }
    serde_json::from_str(&response.body).map_err(|err| {
        StorageError::Decode(format!(
            "invalid response JSON: {err}; body: {}",
            response.body
        ))
    })
}

fn not_found_from_body(body: &str, bucket: &str, object_name: &str) -> StorageError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .map(|body| body.detail)
        .unwrap_or_default();
    if detail == wire::DETAIL_BUCKET_NOT_FOUND {
        StorageError::BucketNotFound(bucket.to_owned())
    } else {
        StorageError::ObjectNotFound {
            bucket: bucket.to_owned(),
            object: object_name.to_owned(),
        }
    }
}
