use axum::{extract::State, response::Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::CoreError;
use crate::models::Profile;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpsertProfileRequest {
    pub user_id: Uuid,
    pub name: String,
    pub age: i32,
    #[serde(default)]
    pub bio: String,
}

pub async fn upsert_profile(
    State(state): State<AppState>,
    Json(req): Json<UpsertProfileRequest>,
) -> Result<Json<Profile>, CoreError> {
    let profile = state.upsert_profile(req.user_id, req.name, req.age, req.bio)?;
    tracing::debug!(user_id = %profile.user_id, tags = profile.tags.len(), "profile upserted");
    Ok(Json(profile))
}
