use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use reqwest::{header, Method, StatusCode, Url};
use tokio::sync::watch;
use tokio::time::sleep;

use crate::{metrics::Metrics, ClientOptions, Result, StorageError};

/// Fully read response of one successful (non-5xx) attempt.
#[derive(Debug)]
pub(crate) struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Result of a single wire round-trip.
enum AttemptOutcome {
    Success(HttpResponse),
    ServerError { status: StatusCode, body: String },
    TransportFailure(reqwest::Error),
    /// The client shut down; `counted` is set once the attempt was recorded.
    Closed { counted: bool },
}

/// Retry loop states. `attempt` counts failed attempts so far.
enum RetryState {
    Attempting { attempt: usize },
    BackoffWait { attempt: usize },
    Succeeded(HttpResponse),
    Failed(StorageError),
}

/// Issues requests against the storage endpoint with bounded retries and
/// linear backoff, recording every attempt in [`Metrics`].
pub(crate) struct Executor {
    http: RwLock<Option<reqwest::Client>>,
    base_url: Url,
    options: ClientOptions,
    metrics: Arc<Metrics>,
    shutdown: watch::Sender<bool>,
}

impl Executor {
    pub fn new(base_url: Url, options: ClientOptions) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            http: RwLock::new(Some(reqwest::Client::new())),
            base_url,
            options,
            metrics: Arc::new(Metrics::new()),
            shutdown,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Drops the transport handle and wakes every in-flight attempt and
    /// backoff wait so they return [`StorageError::Closed`].
    pub fn close(&self) {
        self.http
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.shutdown.send_replace(true);

        #[cfg(feature = "tracing")]
        tracing::debug!(base_url = %self.base_url, "storage client closed");
    }

    pub fn is_closed(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Runs a request without a body.
    pub async fn execute(&self, method: Method, segments: &[&str]) -> Result<HttpResponse> {
        self.run(method, segments, None).await
    }

    /// Runs a request with a JSON body.
    pub async fn execute_json<B>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<HttpResponse>
    where
        B: serde::Serialize + ?Sized,
    {
        let body = serde_json::to_vec(body)
            .map_err(|err| StorageError::Decode(format!("could not encode request body: {err}")))?;
        self.run(method, segments, Some(body)).await
    }

    async fn run(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse> {
        let url = self.endpoint(segments)?;
        let mut state = RetryState::Attempting { attempt: 0 };

        loop {
            state = match state {
                RetryState::Attempting { attempt } => {
                    match self.attempt(method.clone(), url.clone(), body.clone()).await {
                        AttemptOutcome::Success(response) => RetryState::Succeeded(response),
                        AttemptOutcome::Closed { counted } => {
                            if counted {
                                self.metrics.record_failure();
                            }
                            RetryState::Failed(StorageError::Closed)
                        }
                        AttemptOutcome::ServerError { status, body } => self.after_failure(
                            &method,
                            &url,
                            attempt + 1,
                            StorageError::Server {
                                status: status.as_u16(),
                                body,
                            },
                        ),
                        AttemptOutcome::TransportFailure(err) => self.after_failure(
                            &method,
                            &url,
                            attempt + 1,
                            StorageError::Transport(err),
                        ),
                    }
                }
                RetryState::BackoffWait { attempt } => {
                    let delay_ms = self.options.backoff_delay_ms(attempt);

                    #[cfg(feature = "tracing")]
                    tracing::debug!("retrying storage request after {} ms", delay_ms);

                    match self.until_closed(sleep(Duration::from_millis(delay_ms))).await {
                        Some(()) => RetryState::Attempting { attempt },
                        None => RetryState::Failed(StorageError::Closed),
                    }
                }
                RetryState::Succeeded(response) => return Ok(response),
                RetryState::Failed(err) => return Err(err),
            };
        }
    }

    /// Counts a failed attempt and decides between another try and giving up.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn after_failure(
        &self,
        method: &Method,
        url: &Url,
        attempt: usize,
        err: StorageError,
    ) -> RetryState {
        self.metrics.record_failure();
        if attempt > self.options.max_retries {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                %method, %url, attempts = attempt, error = %err,
                "request failed after exhausting retries"
            );
            return RetryState::Failed(err);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            %method, %url, attempt, error = %err,
            "request attempt failed"
        );
        RetryState::BackoffWait { attempt }
    }

    async fn attempt(&self, method: Method, url: Url, body: Option<Vec<u8>>) -> AttemptOutcome {
        let Some(http) = self.transport() else {
            return AttemptOutcome::Closed { counted: false };
        };

        let mut request = http
            .request(method, url)
            .timeout(Duration::from_millis(self.options.timeout_ms));
        if let Some(body) = body {
            request = request
                .header(header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let started = Instant::now();
        self.metrics.record_attempt();

        let round_trip = async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        match self.until_closed(round_trip).await {
            None => AttemptOutcome::Closed { counted: true },
            Some(Err(err)) => AttemptOutcome::TransportFailure(err),
            Some(Ok((status, body))) => {
                self.metrics.record_latency(started.elapsed());
                if status.is_server_error() {
                    AttemptOutcome::ServerError { status, body }
                } else {
                    AttemptOutcome::Success(HttpResponse { status, body })
                }
            }
        }
    }

    /// Resolves to `None` as soon as the client is closed.
    async fn until_closed<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            () = wait_closed(self.shutdown.subscribe()) => None,
            output = fut => Some(output),
        }
    }

    fn transport(&self) -> Option<reqwest::Client> {
        self.http
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                StorageError::Config(format!("base url cannot hold a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

async fn wait_closed(mut closed: watch::Receiver<bool>) {
    loop {
        let is_closed = *closed.borrow_and_update();
        if is_closed {
            return;
        }
        if closed.changed().await.is_err() {
            // Sender gone without closing: never resolve.
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Url;

    use super::Executor;
    use crate::ClientOptions;

    fn executor(base: &str) -> Executor {
        Executor::new(
            Url::parse(base).expect("test url must parse"),
            ClientOptions::default(),
        )
    }

    #[test]
    fn endpoint_appends_segments_to_base_path() {
        let exec = executor("http://127.0.0.1:8000");
        let url = exec.endpoint(&["objects", "get"]).expect("endpoint must build");
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/objects/get");
    }

    #[test]
    fn endpoint_keeps_base_prefix_and_encodes_segments() {
        let exec = executor("http://localhost/api/");
        let url = exec
            .endpoint(&["buckets", "my bucket/1"])
            .expect("endpoint must build");
        assert_eq!(url.as_str(), "http://localhost/api/buckets/my%20bucket%2F1");
    }

    #[tokio::test]
    async fn closed_executor_fails_without_attempting() {
        let exec = executor("http://127.0.0.1:9");
        exec.close();
        assert!(exec.is_closed());

        let err = exec
            .execute(reqwest::Method::GET, &["health"])
            .await
            .expect_err("closed executor must fail");
        assert!(matches!(err, crate::StorageError::Closed));
        assert_eq!(exec.metrics().requests_total(), 0);
        assert_eq!(exec.metrics().requests_failed(), 0);
    }
}
