use anyhow::Result;
use awsnano::s3::{ListObjects, S3Client};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let ctx = awsnano::default_context();
    let client = S3Client::load(ctx).await?;

    let buckets = client.list_buckets().await?;
    for bucket in &buckets.buckets {
        println!("{}\t{}", bucket.creation_date, bucket.name);
    }

    // Peek into the first bucket.
    if let Some(bucket) = buckets.buckets.first() {
        let page = client
            .list_objects(&ListObjects::new(&bucket.name).with_max_keys(10))
            .await?;
        for object in page.contents {
            println!("  {}\t{}", object.size, object.key);
        }
    }

    Ok(())
}
