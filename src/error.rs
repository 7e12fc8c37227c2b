//! Engine error types with HTTP status code mapping.
//!
//! [`AdsError`] is the central error type for the engine. Each variant maps
//! to a specific HTTP status code and structured JSON error response.
//! Benign negative outcomes (no eligible campaign, unknown tracking id) are
//! modeled as `Option`/absence on the store, not as error variants; only
//! conditions a caller must branch on surface here.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1002,
///     "message": "invalid publisher address: must decode to 32 bytes",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`AdsError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                |
/// |-----------|-----------------|----------------------------|
/// | 1000–1999 | Validation      | 400 / 413                  |
/// | 2000–2999 | Not Found       | 404 Not Found              |
/// | 3000–3999 | Server          | 500 Internal Server Error  |
#[derive(Debug, thiserror::Error)]
pub enum AdsError {
    /// Request validation failed at the boundary.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A wallet address failed to decode to the expected 32 raw bytes.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Upload payload exceeds the configured size limit. Raised before
    /// any network call, distinct from a remote-rejected upload.
    #[error("payload of {size} bytes exceeds upload limit of {limit} bytes")]
    PayloadTooLarge {
        /// Actual payload size in bytes.
        size: usize,
        /// Configured maximum in bytes.
        limit: usize,
    },

    /// Campaign with the given id was not found.
    #[error("campaign not found: {0}")]
    CampaignNotFound(String),

    /// Tracking id is unknown or its event was already recorded.
    #[error("unknown or already-recorded tracking id")]
    DeliveryNotFound,

    /// Persistence layer failure (local snapshot write failed).
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Claim signing failure (programmer error or malformed key material).
    #[error("signing error: {0}")]
    Signing(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AdsError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidAddress(_) => 1002,
            Self::PayloadTooLarge { .. } => 1003,
            Self::CampaignNotFound(_) => 2001,
            Self::DeliveryNotFound => 2002,
            Self::Persistence(_) => 3001,
            Self::Signing(_) => 3002,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidAddress(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::CampaignNotFound(_) | Self::DeliveryNotFound => StatusCode::NOT_FOUND,
            Self::Persistence(_) | Self::Signing(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AdsError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

impl From<crate::walrus::BlobStoreError> for AdsError {
    fn from(err: crate::walrus::BlobStoreError) -> Self {
        match err {
            crate::walrus::BlobStoreError::PayloadTooLarge { size, limit } => {
                Self::PayloadTooLarge { size, limit }
            }
            other => Self::Persistence(other.to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_categories() {
        assert_eq!(
            AdsError::InvalidRequest("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AdsError::DeliveryNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AdsError::PayloadTooLarge { size: 2, limit: 1 }.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AdsError::Persistence("down".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(AdsError::InvalidAddress("x".to_string()).error_code(), 1002);
        assert_eq!(AdsError::DeliveryNotFound.error_code(), 2002);
    }
}
