use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Body shared by every `/api` response
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: message.into(),
            timestamp: Utc::now(),
        })
    }

    pub fn failure(data: Option<T>, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: false,
            data,
            message: message.into(),
            timestamp: Utc::now(),
        })
    }
}

/// `Json` extractor whose rejections are answered with the envelope
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug)]
pub struct ApiError(domain::Error);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(domain::Error::invalid_input(rejection.body_text()))
    }
}

impl From<domain::Error> for ApiError {
    fn from(err: domain::Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            domain::Error::InvalidInput { message } => {
                tracing::warn!("Rejected input: {}", message);
                (StatusCode::BAD_REQUEST, message)
            }
            domain::Error::NotFound { entity, id } => {
                tracing::warn!("{} {} not found", entity, id);
                (StatusCode::NOT_FOUND, format!("{entity} not found"))
            }
            domain::Error::Uniqueness { field } => (
                StatusCode::CONFLICT,
                format!("A drug with this {field} already exists"),
            ),
            err @ (domain::Error::Codec(_) | domain::Error::Persistence { .. }) => {
                tracing::error!("Request failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Envelope::<()>::failure(None, message)).into_response()
    }
}
