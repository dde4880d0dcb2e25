//! Request-level error taxonomy.
//!
//! Every handler returns `Result<_, ApiError>`. The client only ever sees a
//! generic message and a status code; the detail carried by a variant is
//! logged here and nowhere else.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;
use crate::upstream::UpstreamError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("origin rejected")]
    OriginRejected,

    #[error("rate limited")]
    RateLimited,

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("no data: {0}")]
    NoDataFound(&'static str),

    #[error("payload too large")]
    PayloadTooLarge,

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(#[from] UpstreamError),

    #[error("database error: {0}")]
    Database(#[from] StoreError),

    #[error("configuration missing: {0}")]
    ConfigurationMissing(&'static str),

    #[error("feature disabled: {0}")]
    FeatureDisabled(&'static str),
}

/// Failure body: `{ "success": false, "error": "..." }`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::OriginRejected => StatusCode::FORBIDDEN,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NoDataFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UpstreamUnavailable(_)
            | ApiError::Database(_)
            | ApiError::ConfigurationMissing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::FeatureDisabled(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// What the client is told.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::OriginRejected => "Request Failed".to_string(),
            ApiError::RateLimited => "Too many requests. Please try again later.".to_string(),
            // Validation messages describe the caller's own input.
            ApiError::ValidationFailed(message) => message.clone(),
            ApiError::Unauthorized => "Invalid access password".to_string(),
            ApiError::NoDataFound(message) => (*message).to_string(),
            ApiError::PayloadTooLarge => "Payload too large".to_string(),
            ApiError::FeatureDisabled(_) => "Service temporarily unavailable".to_string(),
            ApiError::UpstreamUnavailable(_)
            | ApiError::Database(_)
            | ApiError::ConfigurationMissing(_) => "Request Failed".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Request failed");
        } else {
            tracing::debug!(status = %status, error = %self, "Request rejected");
        }

        let body = ErrorBody {
            success: false,
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}
