use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::constants::{DISTANCE_PENALTY_METERS_PER_POINT, TAG_OVERLAP_WEIGHT};
use crate::error::CoreError;
use crate::models::UserPosition;
use crate::services::tags::tag_overlap;
use crate::store::{ConnectionManager, GeoIndex, ProfileStore};

/// One entry of a ranked discovery feed.
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    pub position: UserPosition,
    pub distance_meters: f64,
    pub tag_overlap: usize,
    pub score: f64,
}

impl RankedCandidate {
    pub fn user_id(&self) -> Uuid {
        self.position.user_id
    }
}

/// Shared interests dominate; distance within the radius is a penalty, not a
/// second cutoff.
fn score(tag_overlap: usize, distance_meters: f64) -> f64 {
    tag_overlap as f64 * TAG_OVERLAP_WEIGHT - distance_meters / DISTANCE_PENALTY_METERS_PER_POINT
}

/// Ranked, deduplicated candidates for a requesting user.
///
/// Pulls everything within the radius from the geo index, drops anyone the
/// requester already has a live (or still-cooling declined) connection with,
/// scores the rest, and returns the top `limit` ordered by score descending,
/// distance ascending, then user id. An empty feed is a valid result.
#[allow(clippy::too_many_arguments)]
pub fn rank(
    geo: &GeoIndex,
    connections: &ConnectionManager,
    profiles: &ProfileStore,
    requester_id: Uuid,
    center_latitude: f64,
    center_longitude: f64,
    radius_meters: f64,
    limit: usize,
    cooldown: Duration,
    now: DateTime<Utc>,
) -> Result<Vec<RankedCandidate>, CoreError> {
    let requester = profiles
        .get(requester_id)
        .ok_or_else(|| CoreError::InvalidInput(format!("unknown user {requester_id}")))?;

    let hits = geo.query_within_radius(
        center_latitude,
        center_longitude,
        radius_meters,
        Some(requester_id),
    )?;
    let excluded = connections.excluded_counterparts(requester_id, cooldown, now);

    let mut candidates: Vec<RankedCandidate> = hits
        .into_iter()
        .filter(|hit| !excluded.contains(&hit.position.user_id))
        .map(|hit| {
            let overlap = tag_overlap(&requester.tags, &profiles.tags(hit.position.user_id));
            RankedCandidate {
                distance_meters: hit.distance_meters,
                tag_overlap: overlap,
                score: score(overlap, hit.distance_meters),
                position: hit.position,
            }
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.distance_meters.total_cmp(&b.distance_meters))
            .then_with(|| a.position.user_id.cmp(&b.position.user_id))
    });
    candidates.truncate(limit);

    Ok(candidates)
}
