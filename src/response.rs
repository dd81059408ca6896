use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;

/// Success envelope: `{code, message, data, meta?}`.
#[derive(Debug, Serialize)]
pub struct Success<T> {
    pub code: u16,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// Failure envelope: `{code, message, error}`.
#[derive(Debug, Serialize)]
pub struct Failure {
    pub code: u16,
    pub message: &'static str,
    pub error: String,
}

pub fn success<T: Serialize>(data: T) -> Response {
    let body = Success {
        code: StatusCode::OK.as_u16(),
        message: "success",
        data: Some(data),
        meta: None,
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// `axum::Json` wrapper whose rejection is reported in the standard
/// failure envelope instead of axum's plain-text body.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(AppError::Validation(rejection.body_text())),
        }
    }
}
