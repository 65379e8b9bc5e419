use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::constants::{
    CITY_RADIUS_METERS, NEARBY_RADIUS_METERS, NEIGHBORHOOD_RADIUS_METERS, VENUE_RADIUS_METERS,
};

/// A user's live location record. One per active user, overwritten on each
/// report and dropped by the stale sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPosition {
    pub user_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub venue: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub active_since: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// Profile snapshot used for matching. Tags are extracted from the bio text
/// when the profile is upserted, not per query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub name: String,
    pub age: i32,
    pub bio: String,
    pub tags: BTreeSet<String>,
}

/// Discovery radius presets, finest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProximityLevel {
    Venue,
    Nearby,
    Neighborhood,
    City,
}

impl ProximityLevel {
    pub fn max_distance_meters(self) -> f64 {
        match self {
            ProximityLevel::Venue => VENUE_RADIUS_METERS,
            ProximityLevel::Nearby => NEARBY_RADIUS_METERS,
            ProximityLevel::Neighborhood => NEIGHBORHOOD_RADIUS_METERS,
            ProximityLevel::City => CITY_RADIUS_METERS,
        }
    }
}
