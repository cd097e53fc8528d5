//! The service error taxonomy.
//!
//! Three classes, each with a stable machine code so callers can branch
//! without parsing messages:
//! - `validation_error` (400): malformed input, retryable after the
//!   caller fixes the payload;
//! - `domain_error` (404): well-formed input naming an entity that is
//!   not in the expected state (unknown session, person not in graph);
//! - `internal_error` (500): a bug, never the caller's fault.
//!
//! Infeasibility and solver timeouts are *not* errors; they are regular
//! response fields callers must branch on.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bunkplan_graph::GraphError;
use bunkplan_solver::SolveError;
use serde::Serialize;
use thiserror::Error;

/// Error returned by any handler.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed caller input; rejected before any domain logic runs.
    #[error("{0}")]
    Validation(String),

    /// Valid input referencing an entity not in the expected state.
    #[error("{0}")]
    Domain(String),

    /// Invariant violation inside the service.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::Domain(_) => "domain_error",
            ApiError::Internal(_) => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Domain(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<GraphError> for ApiError {
    fn from(err: GraphError) -> Self {
        // Every graph error is a domain error: the ids were well-formed,
        // the referenced entity just is not there.
        ApiError::Domain(err.to_string())
    }
}

impl From<SolveError> for ApiError {
    fn from(err: SolveError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
