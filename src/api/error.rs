//! API error mapping
//!
//! Every failure becomes a structured `{errorKind, message}` body. Internal
//! faults are logged and collapse to a generic 500 that carries no detail.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::attachments::AttachError;
use crate::mining::MiningError;
use crate::storage::AppendError;
use crate::validation::ValidationError;

/// Structured API error
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    error_kind: &'a str,
    message: &'a str,
}

impl ApiError {
    pub fn not_found(message: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            kind: "NotFound",
            message: message.to_string(),
        }
    }

    pub fn too_many_requests() -> Self {
        Self {
            status: StatusCode::TOO_MANY_REQUESTS,
            kind: "RateLimited",
            message: "rate limit exceeded; retry later".to_string(),
        }
    }

    pub fn bad_request(kind: &'static str, message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind,
            message: message.to_string(),
        }
    }

    /// Generic server fault; never leaks internal state
    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            kind: "Internal",
            message: "internal error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error_kind: self.kind,
            message: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<AttachError> for ApiError {
    fn from(err: AttachError) -> Self {
        match err {
            AttachError::BlockNotFound => Self {
                status: StatusCode::NOT_FOUND,
                kind: err.kind(),
                message: err.to_string(),
            },
            AttachError::TooLarge | AttachError::UnsupportedType => Self {
                status: StatusCode::BAD_REQUEST,
                kind: err.kind(),
                message: err.to_string(),
            },
            AttachError::Storage => {
                error!("attachment storage failure");
                Self::internal()
            }
        }
    }
}

impl From<AppendError> for ApiError {
    fn from(err: AppendError) -> Self {
        match err {
            AppendError::StaleAppend => Self {
                status: StatusCode::CONFLICT,
                kind: "StaleAppend",
                message: "chain tail moved during mining; resubmit".to_string(),
            },
            AppendError::InvalidBlock(detail) => {
                error!(detail, "mined block failed append integrity checks");
                Self::internal()
            }
        }
    }
}

impl From<MiningError> for ApiError {
    fn from(err: MiningError) -> Self {
        match err {
            MiningError::Timeout => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                kind: "MiningTimeout",
                message: "proof of work did not complete in time".to_string(),
            },
            MiningError::Interrupted => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                kind: "MiningUnavailable",
                message: "mining was interrupted".to_string(),
            },
        }
    }
}
