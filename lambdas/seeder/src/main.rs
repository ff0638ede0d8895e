use std::env;

use anyhow::Context;
use aws_config::BehaviorVersion;
use aws_lambda_events::event::s3::S3Event;
use domain::drugs::{
    self,
    seed::{self, SeedSummary},
    RecordStore,
};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde::Deserialize;
use serde_json::Value;

const DEFAULT_SEED_KEY: &str = "seeds/drugs.json";

/// Direct invocation payload; both fields fall back to the environment
#[derive(Debug, Default, Deserialize)]
struct SeedRequest {
    bucket: Option<String>,
    key: Option<String>,
}

#[derive(Debug, PartialEq)]
enum Trigger {
    S3Upload,
    Direct,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
    let dynamodb_client = aws_sdk_dynamodb::Client::new(&config);
    let s3_client = aws_sdk_s3::Client::new(&config);

    let store = drugs::dynamo::init_store(dynamodb_client);
    let store = store.as_ref();
    let s3_client = &s3_client;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        handle_event(event, store, s3_client)
    }))
    .await
}

fn classify(payload: &Value) -> Trigger {
    let is_s3 = payload
        .get("Records")
        .and_then(|r| r.as_array())
        .and_then(|records| records.first())
        .is_some_and(|record| record.get("s3").is_some());

    if is_s3 {
        Trigger::S3Upload
    } else {
        Trigger::Direct
    }
}

fn seed_location(
    request: SeedRequest,
    env_bucket: Option<String>,
    env_key: Option<String>,
) -> anyhow::Result<(String, String)> {
    let bucket = request
        .bucket
        .or(env_bucket)
        .context("No seed bucket given and SEED_BUCKET is not set")?;
    let key = request
        .key
        .or(env_key)
        .unwrap_or(DEFAULT_SEED_KEY.to_string());

    Ok((bucket, key))
}

async fn handle_event(
    event: LambdaEvent<Value>,
    store: &dyn RecordStore,
    s3_client: &aws_sdk_s3::Client,
) -> Result<Value, Error> {
    let mut summaries = Vec::new();

    match classify(&event.payload) {
        Trigger::S3Upload => {
            let s3_event: S3Event = serde_json::from_value(event.payload)?;
            tracing::info!("Processing {} S3 records", s3_event.records.len());

            for record in s3_event.records {
                let bucket = record.s3.bucket.name.ok_or("Missing bucket name")?;
                let key = record.s3.object.key.ok_or("Missing object key")?;

                summaries.push(seed_from_s3(store, s3_client, &bucket, &key).await?);
            }
        }
        Trigger::Direct => {
            let request: SeedRequest = if event.payload.is_null() {
                SeedRequest::default()
            } else {
                serde_json::from_value(event.payload)?
            };
            let (bucket, key) = seed_location(
                request,
                env::var("SEED_BUCKET").ok(),
                env::var("SEED_KEY").ok(),
            )?;

            summaries.push(seed_from_s3(store, s3_client, &bucket, &key).await?);
        }
    }

    let seeded: usize = summaries.iter().map(|s| s.inserted).sum();
    let skipped: usize = summaries.iter().map(|s| s.skipped).sum();

    Ok(serde_json::json!({
        "statusCode": 200,
        "seeded": seeded,
        "skipped": skipped,
    }))
}

async fn seed_from_s3(
    store: &dyn RecordStore,
    s3_client: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
) -> Result<SeedSummary, Error> {
    tracing::info!("Seeding drugs from s3://{}/{}", bucket, key);

    let data = download_from_s3(s3_client, bucket, key).await?;
    let drugs = seed::parse_seed(&data)?;

    Ok(seed::reseed(store, drugs).await?)
}

async fn download_from_s3(
    s3_client: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
) -> Result<Vec<u8>, Error> {
    let response = s3_client
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await?;

    let data = response.body.collect().await?;
    Ok(data.to_vec())
}
