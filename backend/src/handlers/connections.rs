use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::CoreError;
use crate::models::{Connection, ConnectionStatus, CrossedPath, MeetingContext, ResolveOutcome};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendInterestRequest {
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub meeting_context: Option<MeetingContext>,
}

pub async fn send_interest(
    State(state): State<AppState>,
    Json(req): Json<SendInterestRequest>,
) -> Result<Json<Connection>, CoreError> {
    let connection = state.send_interest(req.from_user_id, req.to_user_id, req.meeting_context)?;
    tracing::info!(
        connection_id = %connection.id,
        status = ?connection.status,
        "interest sent"
    );
    Ok(Json(connection))
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub outcome: ResolveOutcome,
}

pub async fn resolve_interest(
    State(state): State<AppState>,
    Path(connection_id): Path<Uuid>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<Connection>, CoreError> {
    let connection = state.resolve_interest(connection_id, req.outcome)?;
    tracing::info!(%connection_id, status = ?connection.status, "connection resolved");
    Ok(Json(connection))
}

#[derive(Debug, Deserialize)]
pub struct ListConnectionsQuery {
    pub status: Option<ConnectionStatus>,
}

pub async fn list_connections(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<ListConnectionsQuery>,
) -> Json<Vec<Connection>> {
    Json(state.list_connections(user_id, query.status))
}

pub async fn list_crossed_paths(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Json<Vec<CrossedPath>> {
    Json(state.crossed_paths(user_id))
}

pub async fn clear_crossed_paths(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Json<serde_json::Value> {
    state.clear_crossed_paths(user_id);
    Json(serde_json::json!({ "cleared": true }))
}
