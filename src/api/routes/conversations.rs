use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::api::state::AppState;
use crate::domain::Conversation;

pub async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Conversation>, StatusCode> {
    let conversation = state.conversations.get(id).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to load conversation");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    match conversation {
        Some(conversation) => Ok(Json(conversation)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// Clears a chat session. Idempotent: deleting an absent conversation is
/// still a success.
pub async fn delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    state.conversations.delete(id).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to delete conversation");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(StatusCode::NO_CONTENT)
}
