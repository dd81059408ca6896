use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{error, warn};

use crate::response::Failure;

/// Error taxonomy shared by every layer. Repositories classify raw storage
/// errors into it at the boundary; services pass it through unchanged and
/// only add `Validation` for input-shape problems they detect themselves.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("forbidden")]
    Forbidden,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    /// Any persistence failure not otherwise classified. The driver error is
    /// kept for logging but never rendered to the caller.
    #[error("storage failure")]
    Storage(#[source] sqlx::Error),
    #[error("internal error")]
    Internal(String),
    #[error("gateway timeout")]
    GatewayTimeout,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Stable machine-readable message for the failure envelope.
    pub fn message(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "bad_request",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Storage(_) | AppError::Internal(_) => "internal_server_error",
            AppError::GatewayTimeout => "gateway_timeout",
        }
    }

    /// Classifies a storage-level error at the repository boundary:
    /// no rows -> `NotFound`, unique violation -> `Conflict`, anything
    /// else stays an opaque `Storage` failure.
    pub fn from_storage(err: sqlx::Error, entity: &str) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound(format!("{entity} not found")),
            err if is_unique_violation(&err) => {
                AppError::Conflict(format!("{entity} already exists"))
            }
            err => AppError::Storage(err),
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23505")
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Storage(source) => {
                error!(code = status.as_u16(), message = self.message(), cause = %source, "request failed");
            }
            AppError::Internal(detail) => {
                error!(code = status.as_u16(), message = self.message(), cause = %detail, "request failed");
            }
            other => {
                warn!(code = status.as_u16(), message = other.message(), error = %other, "request failed");
            }
        }
        let body = Failure {
            code: status.as_u16(),
            message: self.message(),
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
