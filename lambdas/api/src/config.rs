use std::env;

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub struct Config {
    pub environment: String,
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn load() -> Self {
        let environment = env::var("APP_ENV").unwrap_or("production".to_string());
        let cors_origin = env::var("CORS_ALLOWED_ORIGIN").ok();

        tracing::info!("Environment: {}", environment);

        Self {
            environment,
            cors_origin,
        }
    }

    pub fn cors(&self) -> CorsLayer {
        let origin = match self.cors_origin.as_deref().map(HeaderValue::from_str) {
            Some(Ok(origin)) => AllowOrigin::exact(origin),
            Some(Err(e)) => {
                tracing::warn!("Ignoring invalid CORS_ALLOWED_ORIGIN: {}", e);
                AllowOrigin::from(Any)
            }
            None => AllowOrigin::from(Any),
        };

        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
