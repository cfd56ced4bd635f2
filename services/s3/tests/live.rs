use std::env;

use awsnano_core::{Config, Context, ErrorKind, OsEnv};
use awsnano_file_read_tokio::TokioFileRead;
use awsnano_http_send_reqwest::ReqwestHttpSend;
use awsnano_s3::{ListObjects, S3Client};
use http::StatusCode;
use log::{debug, warn};

async fn init_client() -> Option<S3Client> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("AWSNANO_S3_TEST").ok().as_deref() != Some("on") {
        return None;
    }

    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);

    let config = Config {
        region: env::var("AWSNANO_S3_REGION").ok(),
        endpoint: env::var("AWSNANO_S3_ENDPOINT").ok(),
        access_key_id: Some(
            env::var("AWSNANO_S3_ACCESS_KEY").expect("env AWSNANO_S3_ACCESS_KEY must set"),
        ),
        secret_access_key: Some(
            env::var("AWSNANO_S3_SECRET_KEY").expect("env AWSNANO_S3_SECRET_KEY must set"),
        ),
        ..Default::default()
    }
    .from_env(&ctx)
    .from_profile(&ctx)
    .await
    .expect("load config must succeed");

    Some(S3Client::new(ctx, config))
}

fn bucket() -> String {
    env::var("AWSNANO_S3_BUCKET").expect("env AWSNANO_S3_BUCKET must set")
}

#[tokio::test]
async fn test_list_buckets() -> anyhow::Result<()> {
    let Some(client) = init_client().await else {
        warn!("AWSNANO_S3_TEST is not set, skipped");
        return Ok(());
    };

    let out = client.list_buckets().await?;
    debug!("got buckets: {:?}", out.buckets);
    assert!(out.buckets.iter().any(|b| b.name == bucket()));
    Ok(())
}

#[tokio::test]
async fn test_head_and_list_bucket() -> anyhow::Result<()> {
    let Some(client) = init_client().await else {
        warn!("AWSNANO_S3_TEST is not set, skipped");
        return Ok(());
    };

    client.head_bucket(&bucket()).await?;
    let page = client
        .list_objects(&ListObjects::new(bucket()).with_max_keys(10))
        .await?;
    assert_eq!(page.name, bucket());
    assert!(page.contents.len() <= 10);
    Ok(())
}

#[tokio::test]
async fn test_head_missing_bucket() -> anyhow::Result<()> {
    let Some(client) = init_client().await else {
        warn!("AWSNANO_S3_TEST is not set, skipped");
        return Ok(());
    };

    let err = client
        .head_bucket("awsnano-bucket-that-does-not-exist-7f3a")
        .await
        .expect_err("head of a missing bucket must fail");
    assert_eq!(err.kind(), ErrorKind::ServiceError);
    let status = err.service_error().map(|se| se.status);
    assert!(matches!(
        status,
        Some(StatusCode::NOT_FOUND) | Some(StatusCode::FORBIDDEN) | Some(StatusCode::MOVED_PERMANENTLY)
    ));
    Ok(())
}
