use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use super::ask::{require_query, AskRequest};
use crate::core::errors::ApiError;
use crate::state::AppState;

fn session_not_found() -> ApiError {
    ApiError::NotFound("Session not found".to_string())
}

pub async fn list_sessions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let sessions: Vec<_> = state
        .sessions
        .list()
        .await
        .into_iter()
        .map(|(id, turns)| json!({"id": id, "message_count": turns}))
        .collect();
    Json(json!({"sessions": sessions}))
}

pub async fn create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session_id = state.sessions.create().await;
    Json(json!({"session_id": session_id}))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let log = state
        .sessions
        .get(&session_id)
        .await
        .ok_or_else(session_not_found)?;

    Ok(Json(json!({
        "session_id": session_id,
        "messages": log.turns(),
    })))
}

/// Records the query, answers it and records the answer.
///
/// The user turn is stored before answering so a failed answer still shows
/// up in the conversation.
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(payload): Json<AskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let query = require_query(&payload.query)?;
    if !state.sessions.record_query(&session_id, query).await {
        return Err(session_not_found());
    }

    let result = state.assistant().await.answer(query).await?;
    state.sessions.record_answer(&session_id, result.clone()).await;
    Ok(Json(result))
}

pub async fn clear_messages(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.sessions.clear(&session_id).await {
        return Err(session_not_found());
    }
    Ok(Json(json!({"status": "cleared"})))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.sessions.delete(&session_id).await {
        return Err(session_not_found());
    }
    Ok(Json(json!({"status": "deleted"})))
}
