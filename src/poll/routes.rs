use axum::extract::{Path, State};
use axum::middleware::from_fn_with_state;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Extension, Router};

use crate::auth::{require_auth, AuthUser};
use crate::error::AppError;
use crate::poll::model::{CreatePollRequest, VoteRequest};
use crate::response::{success, ApiJson};
use crate::routes::parse_id;
use crate::state::AppState;

pub fn router(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/poll", post(create_poll))
        .route("/poll/{id}/vote", post(vote))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let public = Router::new()
        .route("/poll/{id}", get(get_poll))
        .route("/poll/{id}/results", get(results));

    protected.merge(public)
}

async fn create_poll(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(req): ApiJson<CreatePollRequest>,
) -> Result<Response, AppError> {
    let poll = state.polls.create_poll(req, &user).await?;
    Ok(success(poll))
}

async fn get_poll(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let poll = state.polls.get_poll(parse_id(&id)?).await?;
    Ok(success(poll))
}

async fn vote(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(user): Extension<AuthUser>,
    ApiJson(req): ApiJson<VoteRequest>,
) -> Result<Response, AppError> {
    let confirmation = state.polls.vote(parse_id(&id)?, req, &user).await?;
    Ok(success(confirmation))
}

async fn results(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let summary = state.polls.results(parse_id(&id)?).await?;
    Ok(success(summary))
}
