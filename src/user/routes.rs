use axum::extract::{Path, State};
use axum::middleware::from_fn_with_state;
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;

use crate::auth::require_auth;
use crate::error::AppError;
use crate::response::{success, ApiJson};
use crate::routes::parse_id;
use crate::state::AppState;
use crate::user::model::{LoginRequest, RegisterRequest};

pub fn router(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/user/{id}", get(get_user))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let public = Router::new()
        .route("/user/register", post(register))
        .route("/user/login", post(login));

    protected.merge(public)
}

async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Response, AppError> {
    let user = state.users.register(req).await?;
    Ok(success(user))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Response, AppError> {
    let token = state.users.login(req).await?;
    Ok(success(token))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let user = state.users.get(parse_id(&id)?).await?;
    Ok(success(user))
}
