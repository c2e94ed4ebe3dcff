//! HTTP endpoints.
//!
//! Thin adapter: parse the request, call into [`AppState`], map the result.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::GameError;
use crate::protocol::{
    AdvanceResponse, ErrorBody, JoinRequest, RoundInfo, SubmitResponseRequest, SubmitVoteRequest,
};
use crate::state::AppState;
use crate::types::*;
use crate::ws;

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let status = match &self {
            GameError::NotFound { .. } => StatusCode::NOT_FOUND,
            GameError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            GameError::Conflict(_) => StatusCode::CONFLICT,
            GameError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", self.code(), self);
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Unreadable or incomplete JSON bodies are the caller's fault
impl From<JsonRejection> for GameError {
    fn from(rejection: JsonRejection) -> Self {
        GameError::InvalidInput(rejection.body_text())
    }
}

/// All game routes
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/games", post(create_game))
        .route("/games/{id}", get(get_game).post(join_game))
        .route("/games/{id}/start", post(start_game))
        .route("/games/{id}/next", post(advance_game))
        .route(
            "/games/{id}/rounds/{round_id}/response",
            post(submit_response),
        )
        .route("/games/{id}/rounds/{round_id}/vote", post(submit_vote))
        .route("/games/{id}/scores", get(scores))
        .route("/ws/games/{id}", get(ws::ws_handler))
        .with_state(state)
}

async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "message": "pong" }))
}

/// POST /games
async fn create_game(State(state): State<Arc<AppState>>) -> Result<Response, GameError> {
    let code = state.create_session().await.code;
    let view = state.session_view(&code).await?;
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/games/{}", code))],
        Json(view),
    )
        .into_response())
}

/// GET /games/{id}
async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, GameError> {
    Ok(Json(state.session_view(&id).await?))
}

/// POST /games/{id}
async fn join_game(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<JoinRequest>, JsonRejection>,
) -> Result<Json<JoinOutcome>, GameError> {
    let Json(req) = payload?;
    Ok(Json(state.join_session(&id, &req.player_id).await?))
}

/// POST /games/{id}/start
async fn start_game(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RoundInfo>, GameError> {
    let round = state.start_game(&id).await?;
    Ok(Json(RoundInfo {
        id: round.id,
        prompt: round.prompt,
    }))
}

/// POST /games/{id}/next
async fn advance_game(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AdvanceResponse>, GameError> {
    Ok(Json(state.advance_game(&id).await?.into()))
}

/// POST /games/{id}/rounds/{round_id}/response
async fn submit_response(
    State(state): State<Arc<AppState>>,
    Path((id, round_id)): Path<(String, String)>,
    payload: Result<Json<SubmitResponseRequest>, JsonRejection>,
) -> Result<Json<Progress>, GameError> {
    let Json(req) = payload?;
    Ok(Json(
        state
            .submit_response(&id, &round_id, &req.player_id, &req.response)
            .await?,
    ))
}

/// POST /games/{id}/rounds/{round_id}/vote
async fn submit_vote(
    State(state): State<Arc<AppState>>,
    Path((id, round_id)): Path<(String, String)>,
    payload: Result<Json<SubmitVoteRequest>, JsonRejection>,
) -> Result<Json<Progress>, GameError> {
    let Json(req) = payload?;
    Ok(Json(state.submit_vote(&id, &round_id, &req.vote).await?))
}

/// GET /games/{id}/scores
async fn scores(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<HashMap<PlayerId, u32>>, GameError> {
    Ok(Json(state.scores(&id).await?))
}
