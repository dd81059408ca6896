use std::time::Duration;

use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use http::Method;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::response::success;
use crate::state::AppState;
use crate::{db, poll, user};

/// Assembles the full application router: versioned API routes, the health
/// probe and the middleware stack (tracing, CORS, per-request deadline).
pub fn api_router(state: AppState, request_timeout: Duration) -> Router {
    let api = Router::new()
        .merge(poll::routes::router(&state))
        .merge(user::routes::router(&state));

    Router::new()
        .nest("/api/v1", api)
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(Any),
        )
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<Response, AppError> {
    db::ping(&state.pool).await.map_err(AppError::Storage)?;
    Ok(success(json!({ "status": "ok" })))
}

/// Path segments arrive as strings; malformed ids are a validation problem,
/// not a routing one.
pub fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::Validation(format!("invalid id: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_integers_only() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(parse_id("abc"), Err(AppError::Validation(_))));
        assert!(matches!(parse_id(""), Err(AppError::Validation(_))));
    }
}
