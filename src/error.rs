use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("MONGODB_URI (or DATABASE_URL) must be set")]
    MissingStoreUri,
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("db error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("FINNHUB_API_KEY is missing")]
    MissingKey,
    #[error("quote request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("quote request for {symbol} failed: {status} {body}")]
    Status {
        symbol: String,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("no usable price for {0}")]
    NoPrice(String),
    #[error("quote source unavailable: {0}")]
    Unavailable(String),
    #[error("quote request timed out after {0:?}")]
    Timeout(std::time::Duration),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("notification rejected: {status} {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("notifier unavailable: {0}")]
    Unavailable(String),
    #[error("notification timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Errors surfaced to API callers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Store(#[from] StoreError),
    #[error("template error: {0}")]
    Template(#[from] handlebars::RenderError),
}

impl From<mongodb::error::Error> for AppError {
    fn from(e: mongodb::error::Error) -> Self {
        AppError::Store(StoreError::Mongo(e))
    }
}

impl AppError {
    fn as_status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(_) | AppError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.as_status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        } else {
            tracing::debug!("request rejected: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
