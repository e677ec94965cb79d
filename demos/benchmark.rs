use std::time::Instant;

use objstore_http::{ClientOptions, StorageClient, StorageError, DEFAULT_BASE_URL};
use rand::{distributions::Alphanumeric, Rng};

const BUCKET: &str = "benchmark-bucket";

fn random_payload_kb(size_kb: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(size_kb * 1024)
        .map(char::from)
        .collect()
}

fn arg_or<T: std::str::FromStr>(index: usize, default: T) -> T {
    std::env::args()
        .nth(index)
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let num_objects: usize = arg_or(1, 50);
    let size_kb: usize = arg_or(2, 32);

    let base_url =
        std::env::var("OBJSTORE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
    let client = StorageClient::with_options(
        base_url,
        ClientOptions {
            max_retries: 2,
            backoff_factor_ms: 100,
            ..ClientOptions::default()
        },
    )?;

    match client.create_bucket(BUCKET).await {
        Ok(_) | Err(StorageError::BucketExists(_)) => {}
        Err(err) => return Err(err.into()),
    }

    let start = Instant::now();
    for i in 0..num_objects {
        let payload = random_payload_kb(size_kb);
        client
            .put_object(BUCKET, &format!("sample-{i}"), payload)
            .await?;
    }
    let elapsed = start.elapsed().as_secs_f64();

    let throughput_mb_s = (num_objects * size_kb) as f64 / 1024.0 / elapsed;
    println!("Uploaded {num_objects} objects of {size_kb}KB in {elapsed:.2}s");
    println!("Throughput: {throughput_mb_s:.2} MB/s");
    println!("Metrics: {:?}", client.summarize_metrics());

    client.close();
    Ok(())
}
