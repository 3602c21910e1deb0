//! API handlers

pub mod groups;
pub mod slack;
pub mod tasks;
pub mod version;

use axum::http::StatusCode;

use crate::error::DoltError;

/// Map a domain error onto an HTTP status, logging server-side failures.
pub(crate) fn error_status(err: DoltError) -> StatusCode {
    match err {
        DoltError::NotFound(_) => StatusCode::NOT_FOUND,
        DoltError::Validation(msg) => {
            tracing::debug!(%msg, "rejected request");
            StatusCode::BAD_REQUEST
        }
        DoltError::Auth(_) => StatusCode::UNAUTHORIZED,
        other => {
            tracing::error!(error = %other, "request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
