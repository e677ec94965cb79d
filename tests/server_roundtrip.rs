#![cfg(feature = "server")]

use std::sync::Arc;

use objstore_http::{
    server::{self, Store},
    ClientOptions, StorageClient, StorageError,
};
use tokio::sync::oneshot;

struct RunningServer {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<std::io::Result<()>>,
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        self.task.abort();
    }
}

async fn start_server() -> RunningServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("must bind test listener");
    let address = listener.local_addr().expect("must have local addr");
    let (shutdown, signal) = oneshot::channel::<()>();
    let task = tokio::spawn(server::serve(listener, Arc::new(Store::new()), async move {
        let _ = signal.await;
    }));

    RunningServer {
        base_url: format!("http://{address}"),
        shutdown: Some(shutdown),
        task,
    }
}

fn client_for(server: &RunningServer) -> StorageClient {
    StorageClient::with_options(
        &server.base_url,
        ClientOptions {
            timeout_ms: 2_000,
            max_retries: 3,
            backoff_factor_ms: 10,
        },
    )
    .expect("client must build")
}

#[tokio::test]
async fn health_reports_ok() {
    let server = start_server().await;
    let client = client_for(&server);

    let health = client.health().await.expect("health must succeed");

    assert_eq!(health.status, "ok");
    assert!(health.time > 0.0);
}

#[tokio::test]
async fn put_then_get_round_trips_non_ascii_payload() {
    let server = start_server().await;
    let client = client_for(&server);
    let payload = "grüße, 世界 🚀\n\ttabs and \"quotes\"";

    client.create_bucket("docs").await.expect("create must succeed");
    let put = client
        .put_object("docs", "greeting.txt", payload)
        .await
        .expect("put must succeed");
    assert_eq!(put.bucket, "docs");
    assert_eq!(put.object, "greeting.txt");
    assert_eq!(put.size, payload.len() as u64);

    let data = client
        .get_object("docs", "greeting.txt")
        .await
        .expect("get must succeed");
    assert_eq!(data, payload);
}

#[tokio::test]
async fn second_create_is_bucket_exists_without_retry() {
    let server = start_server().await;
    let client = client_for(&server);

    client.create_bucket("dup").await.expect("first create must succeed");
    let err = client
        .create_bucket("dup")
        .await
        .expect_err("second create must fail");

    assert!(matches!(err, StorageError::BucketExists(_)));
    let summary = client.summarize_metrics();
    assert_eq!(summary.requests_total, 2);
    assert_eq!(summary.requests_failed, 0);
}

#[tokio::test]
async fn missing_bucket_and_object_are_not_found() {
    let server = start_server().await;
    let client = client_for(&server);

    let err = client
        .list_objects("ghost")
        .await
        .expect_err("missing bucket must fail");
    assert!(matches!(err, StorageError::BucketNotFound(_)));

    let err = client
        .get_object("ghost", "k")
        .await
        .expect_err("missing bucket must fail");
    assert!(matches!(err, StorageError::BucketNotFound(_)));

    client.create_bucket("real").await.expect("create must succeed");
    let err = client
        .get_object("real", "k")
        .await
        .expect_err("missing object must fail");
    assert!(matches!(err, StorageError::ObjectNotFound { .. }));
    assert!(err.is_not_found());
    assert_eq!(client.summarize_metrics().requests_failed, 0);
}

#[tokio::test]
async fn listings_keep_insertion_order() {
    let server = start_server().await;
    let client = client_for(&server);

    client.create_bucket("zeta").await.expect("create zeta");
    client.create_bucket("alpha").await.expect("create alpha");
    client.put_object("zeta", "second", "2").await.expect("put");
    client.put_object("zeta", "first", "1").await.expect("put");
    // put_object creates buckets on demand
    client.put_object("implicit", "k", "v").await.expect("put");

    assert_eq!(
        client.list_buckets().await.expect("list buckets"),
        vec!["zeta", "alpha", "implicit"]
    );
    let listing = client.list_objects("zeta").await.expect("list objects");
    assert_eq!(listing.bucket, "zeta");
    assert_eq!(listing.objects, vec!["second", "first"]);
}

#[tokio::test]
async fn bucket_names_are_path_encoded() {
    let server = start_server().await;
    let client = client_for(&server);

    client
        .create_bucket("with space")
        .await
        .expect("create must succeed");
    client
        .put_object("with space", "k", "v")
        .await
        .expect("put must succeed");

    let listing = client
        .list_objects("with space")
        .await
        .expect("list must succeed");
    assert_eq!(listing.objects, vec!["k"]);
}

#[tokio::test]
async fn metrics_track_every_round_trip() {
    let server = start_server().await;
    let client = client_for(&server);

    client.create_bucket("m").await.expect("create");
    for i in 0..5 {
        client
            .put_object("m", &format!("obj-{i}"), "payload")
            .await
            .expect("put");
    }

    let summary = client.summarize_metrics();
    assert_eq!(summary.requests_total, 6);
    assert_eq!(summary.requests_failed, 0);
    assert_eq!(client.metrics().latencies().len(), 6);
    assert!(summary.avg_latency_sec >= 0.0);
    assert!(summary.p95_latency_sec >= 0.0);
}
