//! `objstore-http` is an async HTTP client for a small bucket/object
//! storage service.
//!
//! [`StorageClient`] exposes the storage operations:
//! - [`StorageClient::health`]
//! - [`StorageClient::create_bucket`] / [`StorageClient::list_buckets`]
//! - [`StorageClient::put_object`] / [`StorageClient::get_object`] /
//!   [`StorageClient::list_objects`]
//!
//! Every call goes through one request executor that retries transport
//! failures and 5xx responses with linear backoff and records latency
//! samples, summarized by [`StorageClient::summarize_metrics`].
//!
//! With the `server` feature the crate also ships the in-memory storage
//! server the client is tested against.

mod client;
mod error;
mod executor;
mod metrics;
mod options;
mod types;
mod wire;

#[cfg(feature = "server")]
pub mod server;

pub use client::{StorageClient, DEFAULT_BASE_URL};
pub use error::StorageError;
pub use metrics::Metrics;
pub use options::ClientOptions;
pub use types::{BucketCreated, Health, MetricsSummary, ObjectList, PutObjectResult};

pub type Result<T> = std::result::Result<T, StorageError>;
