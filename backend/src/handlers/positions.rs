use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::models::UserPosition;
use crate::state::AppState;
use crate::store::PositionReport;

#[derive(Debug, Deserialize)]
pub struct ReportPositionRequest {
    pub user_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub venue: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReportPositionResponse {
    pub position: UserPosition,
}

pub async fn report_position(
    State(state): State<AppState>,
    Json(req): Json<ReportPositionRequest>,
) -> Result<Json<ReportPositionResponse>, CoreError> {
    let position = state.report_position(PositionReport {
        user_id: req.user_id,
        latitude: req.latitude,
        longitude: req.longitude,
        venue: req.venue,
        neighborhood: req.neighborhood,
        city: req.city,
    })?;

    tracing::debug!(user_id = %position.user_id, "position reported");
    Ok(Json(ReportPositionResponse { position }))
}

#[derive(Debug, Serialize)]
pub struct RemovePositionResponse {
    pub removed: bool,
}

pub async fn remove_position(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Json<RemovePositionResponse> {
    let removed = state.remove_position(user_id);
    if removed {
        tracing::debug!(%user_id, "position removed");
    }
    Json(RemovePositionResponse { removed })
}
