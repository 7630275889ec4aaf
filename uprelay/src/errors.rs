use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Request used an HTTP method other than POST or OPTIONS
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Invalid request data (missing fields or bad brand name format)
    #[error("{message}")]
    Validation { message: String },

    /// Remote store secrets are not configured
    #[error("Server configuration error")]
    Configuration,

    /// The remote store rejected the write or could not be reached
    #[error("Upload failed")]
    Upstream { message: Option<String> },

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn missing_fields() -> Self {
        Error::Validation {
            message: "Missing required fields".to_string(),
        }
    }

    pub fn invalid_brand_name() -> Self {
        Error::Validation {
            message: "Brand name must be lowercase alphanumeric with hyphens only".to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Error::Validation { .. } => StatusCode::BAD_REQUEST,
            Error::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON error body returned to the caller. Upstream failures carry the
    /// remote store's reported message when one was available.
    fn body(&self) -> serde_json::Value {
        match self {
            Error::MethodNotAllowed => json!({ "error": "Method not allowed" }),
            Error::Validation { message } => json!({ "error": message }),
            Error::Configuration => json!({ "error": "Server configuration error" }),
            Error::Upstream { message: Some(message) } => {
                json!({ "error": "Upload failed", "message": message })
            }
            Error::Upstream { message: None } => json!({ "error": "Upload failed" }),
            Error::Other(e) => json!({ "error": "Upload failed", "message": e.to_string() }),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details - different log levels based on severity
        match &self {
            Error::Configuration | Error::Upstream { .. } | Error::Other(_) => {
                tracing::error!("Upload relay error: {:#}", self);
            }
            Error::MethodNotAllowed | Error::Validation { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        (self.status_code(), Json(self.body())).into_response()
    }
}

/// Type alias for relay operation results
pub type Result<T> = std::result::Result<T, Error>;
