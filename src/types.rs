use serde::{Deserialize, Serialize};

/// Response of `GET /health`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    /// Server wall clock, seconds since the Unix epoch.
    pub time: f64,
}

/// Response of `POST /buckets/{bucket}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCreated {
    pub bucket: String,
}

/// Response of `GET /objects/{bucket}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectList {
    pub bucket: String,
    pub objects: Vec<String>,
}

/// Response of `POST /objects`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutObjectResult {
    pub bucket: String,
    pub object: String,
    /// Stored payload size in bytes.
    pub size: u64,
}

/// Point-in-time view of the client's request metrics.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub requests_total: u64,
    pub requests_failed: u64,
    /// Mean latency in seconds, rounded to 4 decimals.
    pub avg_latency_sec: f64,
    /// Nearest-rank p95 latency in seconds, rounded to 4 decimals.
    pub p95_latency_sec: f64,
}
