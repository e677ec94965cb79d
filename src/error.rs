/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Network or request execution error from `reqwest`, surfaced once
    /// every retry has failed.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    /// 5xx response that was still failing after the last retry.
    #[error("server error {status}: {body}")]
    Server { status: u16, body: String },
    /// Bucket creation was rejected because the name is taken.
    #[error("bucket already exists: {0}")]
    BucketExists(String),
    /// The bucket does not exist on the server.
    #[error("bucket not found: {0}")]
    BucketNotFound(String),
    /// The bucket exists but holds no object with this name.
    #[error("object not found: {bucket}/{object}")]
    ObjectNotFound { bucket: String, object: String },
    /// Any other non-success status. Never retried.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// Response decoding or shape validation error.
    #[error("decode error: {0}")]
    Decode(String),
    /// The client was closed before or while the request ran.
    #[error("client is closed")]
    Closed,
    /// Invalid client options or environment.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StorageError {
    /// True for the bucket/object not-found domain errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::BucketNotFound(_) | StorageError::ObjectNotFound { .. }
        )
    }

    /// True when the service could not be reached or kept failing with
    /// server errors until retries ran out.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, StorageError::Transport(_) | StorageError::Server { .. })
    }
}
