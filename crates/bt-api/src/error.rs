//! API error handling
//!
//! Every failure leaves the API as a JSON body with a stable `error` code,
//! a human-readable `message` and, for field errors, the offending field.

use std::collections::HashMap;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bt_core::error::{TrackerError, ValidationErrors};
use serde::Serialize;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Validation(ValidationErrors),
    /// A domain rule rejected the entry (422)
    Rule {
        code: &'static str,
        field: Option<&'static str>,
        message: String,
    },
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    Conflict {
        code: &'static str,
        message: String,
    },
    Internal(String),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) | ApiError::Rule { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TrackerError> for ApiError {
    fn from(err: TrackerError) -> Self {
        let code = err.error_code();
        match err {
            TrackerError::Validation(errors) => ApiError::Validation(errors),
            TrackerError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            TrackerError::Unauthorized { message } => ApiError::Unauthorized(message),
            TrackerError::AccessDenied { .. } => ApiError::Forbidden(err.to_string()),
            TrackerError::InvalidStateTransition { .. } | TrackerError::Conflict { .. } => {
                ApiError::Conflict {
                    code,
                    message: err.to_string(),
                }
            }
            TrackerError::MissingField { .. }
            | TrackerError::InvalidQuantity { .. }
            | TrackerError::InsufficientStock { .. }
            | TrackerError::MissingRejectionReason => ApiError::Rule {
                code,
                field: err.field(),
                message: err.to_string(),
            },
            TrackerError::Database(_) | TrackerError::Internal(_) | TrackerError::Config(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<HashMap<String, Vec<String>>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            ApiError::NotFound(message) => ErrorBody {
                error: "not_found",
                message,
                field: None,
                errors: None,
            },
            ApiError::Validation(errors) => ErrorBody {
                error: "validation_failed",
                message: errors.full_messages().join(", "),
                field: None,
                errors: Some(errors.errors),
            },
            ApiError::Rule { code, field, message } => ErrorBody {
                error: code,
                message,
                field,
                errors: None,
            },
            ApiError::Unauthorized(message) => ErrorBody {
                error: "unauthorized",
                message,
                field: None,
                errors: None,
            },
            ApiError::Forbidden(message) => ErrorBody {
                error: "access_denied",
                message,
                field: None,
                errors: None,
            },
            ApiError::BadRequest(message) => ErrorBody {
                error: "bad_request",
                message,
                field: None,
                errors: None,
            },
            ApiError::Conflict { code, message } => ErrorBody {
                error: code,
                message,
                field: None,
                errors: None,
            },
            ApiError::Internal(message) => {
                tracing::error!(%message, "Request failed");
                ErrorBody {
                    error: "internal_error",
                    message: "Internal server error".into(),
                    field: None,
                    errors: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
