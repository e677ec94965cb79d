use objstore_http::StorageClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = StorageClient::from_env()?;

    println!("Health: {:?}", client.health().await?);

    client.create_bucket("demo-bucket").await?;
    println!("Buckets: {:?}", client.list_buckets().await?);

    client
        .put_object(
            "demo-bucket",
            "hello.txt",
            "Hello, Distributed Cloud Storage!",
        )
        .await?;
    println!("Objects: {:?}", client.list_objects("demo-bucket").await?);

    let data = client.get_object("demo-bucket", "hello.txt").await?;
    println!("Downloaded: {data}");

    println!("Metrics: {:?}", client.summarize_metrics());
    client.close();

    Ok(())
}
