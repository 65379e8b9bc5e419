use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::models::ProximityLevel;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DiscoverRequest {
    pub user_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    /// One of `level` or `radius_meters` must be supplied.
    pub level: Option<ProximityLevel>,
    pub radius_meters: Option<f64>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct CandidateResponse {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub age: Option<i32>,
    pub distance_meters: f64,
    pub tag_overlap: usize,
    pub score: f64,
    pub venue: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DiscoverResponse {
    pub candidates: Vec<CandidateResponse>,
}

pub async fn discover(
    State(state): State<AppState>,
    Json(req): Json<DiscoverRequest>,
) -> Result<Json<DiscoverResponse>, CoreError> {
    let radius_meters = match (req.level, req.radius_meters) {
        (Some(level), None) => level.max_distance_meters(),
        (None, Some(radius)) => radius,
        (Some(_), Some(_)) => {
            return Err(CoreError::InvalidInput(
                "supply either level or radius_meters, not both".to_string(),
            ));
        }
        (None, None) => {
            return Err(CoreError::InvalidInput(
                "supply a proximity level or an explicit radius_meters".to_string(),
            ));
        }
    };
    let limit = req.limit.unwrap_or(state.config.max_discovery_limit);

    let feed = state.discover(req.user_id, req.latitude, req.longitude, radius_meters, limit)?;

    let candidates = feed
        .into_iter()
        .map(|candidate| {
            let profile = state.profiles.get(candidate.user_id());
            CandidateResponse {
                user_id: candidate.user_id(),
                name: profile.as_ref().map(|p| p.name.clone()),
                age: profile.as_ref().map(|p| p.age),
                distance_meters: candidate.distance_meters,
                tag_overlap: candidate.tag_overlap,
                score: candidate.score,
                venue: candidate.position.venue,
                neighborhood: candidate.position.neighborhood,
                city: candidate.position.city,
            }
        })
        .collect();

    Ok(Json(DiscoverResponse { candidates }))
}
