use aws_config::BehaviorVersion;
use domain::{drugs, family};

mod config;
mod error;
mod routes;

use config::Config;
use routes::AppState;

#[tokio::main]
async fn main() -> Result<(), lambda_http::Error> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    let config = Config::load();

    let aws_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
    let dynamodb_client = aws_sdk_dynamodb::Client::new(&aws_config);

    let state = AppState {
        store: drugs::dynamo::init_store(dynamodb_client.clone()),
        family: family::dynamo::init_family_store(dynamodb_client),
        environment: config.environment.clone(),
    };

    let app = routes::router(state).layer(config.cors());

    let app = tower::ServiceBuilder::new()
        .layer(axum_aws_lambda::LambdaLayer::default())
        .service(app);

    lambda_http::run(app).await?;
    Ok(())
}
