use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures that abort an extraction. Everything else (malformed tags,
/// unreachable images or favicons) degrades to absent fields instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OgpError {
    #[error("Failed to fetch OGP data from {url}")]
    Unreachable { url: String, reason: String },

    #[error("The URL {url} points to an image, not a webpage.")]
    UnsupportedContent { url: String, content_type: String },

    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },
}

impl OgpError {
    /// The URL the failure refers to, as supplied by the caller.
    pub fn url(&self) -> &str {
        match self {
            OgpError::Unreachable { url, .. }
            | OgpError::UnsupportedContent { url, .. }
            | OgpError::InvalidUrl { url } => url,
        }
    }
}

#[derive(Error, Debug)]
#[error("Cache store error: {0}")]
pub struct CacheStoreError(pub String);

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Ogp(#[from] OgpError),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Ogp(e) => {
                let status = match e {
                    OgpError::Unreachable { .. } => StatusCode::BAD_GATEWAY,
                    OgpError::UnsupportedContent { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    OgpError::InvalidUrl { .. } => StatusCode::BAD_REQUEST,
                };
                (status, json!({ "error": e.to_string(), "url": e.url() }))
            }
            AppError::Internal => {
                tracing::error!("Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
