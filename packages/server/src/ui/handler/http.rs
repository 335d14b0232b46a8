//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    infrastructure::dto::http::{DebugStateDto, GameSummaryDto, SessionSummaryDto},
    ui::state::AppState,
};
use quizhall_shared::time::timestamp_to_rfc3339;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of games
pub async fn get_games(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<GameSummaryDto>>, StatusCode> {
    let games = state.get_games_usecase.execute().await.map_err(|e| {
        tracing::error!("Failed to get games: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    // Domain Model から DTO への変換
    Ok(Json(games.into_iter().map(Into::into).collect()))
}

/// Debug endpoint to get current connections, topics and sessions
pub async fn debug_state(State(state): State<Arc<AppState>>) -> Json<DebugStateDto> {
    let mut sessions = Vec::new();
    for session in state.orchestrator.sessions() {
        sessions.push(SessionSummaryDto {
            game_id: session.game_id().to_string(),
            phase: session.phase().await.label(),
            players: session.player_count().await,
            started_at: timestamp_to_rfc3339(session.started_at()),
        });
    }
    sessions.sort_by(|a, b| a.game_id.cmp(&b.game_id));

    Json(DebugStateDto {
        connections: state.registry.snapshot(),
        topics: state.membership.snapshot(),
        admin: state
            .admin_gate
            .current()
            .await
            .map(|admin| admin.to_string()),
        sessions,
    })
}
