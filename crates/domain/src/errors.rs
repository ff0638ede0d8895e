use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: String },

    #[error("Uniqueness conflict: {field}")]
    Uniqueness { field: String },

    #[error("Encoding error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("Persistence error: {message}")]
    Persistence { message: String },
}

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn not_found(entity: &str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.into(),
        }
    }

    pub fn persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence {
            message: err.to_string(),
        }
    }
}
