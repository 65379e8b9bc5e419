use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::HashSet;
use uuid::Uuid;

use crate::constants::MAX_QUERY_RADIUS_METERS;
use crate::error::CoreError;
use crate::models::UserPosition;
use crate::utils::geo::{CellKey, covering_cells, haversine_meters, valid_latitude, valid_longitude};

/// A location report from a client, validated at the index boundary.
#[derive(Debug, Clone)]
pub struct PositionReport {
    pub user_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub venue: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
}

/// A radius-query result: the position plus its distance from the center.
#[derive(Debug, Clone)]
pub struct PositionHit {
    pub position: UserPosition,
    pub distance_meters: f64,
}

/// Live positions of active users, bucketed on a lat/long grid so radius
/// queries only touch the cells the radius can reach.
///
/// `positions` is the source of truth; `cells` is an index from grid cell to
/// member ids. Writers lock the position entry first and only then touch the
/// cell sets; readers clone member ids out of a cell before looking up
/// positions, so no reader ever holds locks on both maps at once.
pub struct GeoIndex {
    positions: DashMap<Uuid, UserPosition>,
    cells: DashMap<CellKey, HashSet<Uuid>>,
}

impl GeoIndex {
    pub fn new() -> Self {
        Self {
            positions: DashMap::new(),
            cells: DashMap::new(),
        }
    }

    /// Insert or replace a user's position, moving it between grid cells when
    /// the truncated cell changed. `active_since` survives updates.
    pub fn upsert_position(
        &self,
        report: PositionReport,
        now: DateTime<Utc>,
    ) -> Result<UserPosition, CoreError> {
        if !valid_latitude(report.latitude) {
            return Err(CoreError::InvalidInput(format!(
                "latitude {} out of range [-90, 90]",
                report.latitude
            )));
        }
        if !valid_longitude(report.longitude) {
            return Err(CoreError::InvalidInput(format!(
                "longitude {} out of range [-180, 180]",
                report.longitude
            )));
        }

        let user_id = report.user_id;
        let new_cell = CellKey::for_point(report.latitude, report.longitude);

        let record = match self.positions.entry(user_id) {
            Entry::Occupied(mut occupied) => {
                let old_cell = {
                    let existing = occupied.get();
                    CellKey::for_point(existing.latitude, existing.longitude)
                };
                if old_cell != new_cell {
                    self.remove_from_cell(old_cell, user_id);
                    self.cells.entry(new_cell).or_default().insert(user_id);
                }
                let existing = occupied.get_mut();
                existing.latitude = report.latitude;
                existing.longitude = report.longitude;
                existing.venue = report.venue;
                existing.neighborhood = report.neighborhood;
                existing.city = report.city;
                existing.last_updated = now;
                existing.clone()
            }
            Entry::Vacant(vacant) => {
                let record = UserPosition {
                    user_id,
                    latitude: report.latitude,
                    longitude: report.longitude,
                    venue: report.venue,
                    neighborhood: report.neighborhood,
                    city: report.city,
                    active_since: now,
                    last_updated: now,
                };
                self.cells.entry(new_cell).or_default().insert(user_id);
                vacant.insert(record.clone());
                record
            }
        };

        Ok(record)
    }

    /// Explicit deactivation. Idempotent; returns whether a record existed.
    pub fn remove_position(&self, user_id: Uuid) -> bool {
        match self.positions.remove(&user_id) {
            Some((_, record)) => {
                let cell = CellKey::for_point(record.latitude, record.longitude);
                self.remove_from_cell(cell, user_id);
                true
            }
            None => false,
        }
    }

    pub fn get_position(&self, user_id: Uuid) -> Option<UserPosition> {
        self.positions.get(&user_id).map(|r| r.clone())
    }

    /// All live positions within `radius_meters` of the center, ascending by
    /// distance, ties by user id. Empty index or no hits yields an empty Vec.
    pub fn query_within_radius(
        &self,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
        exclude_user_id: Option<Uuid>,
    ) -> Result<Vec<PositionHit>, CoreError> {
        if !valid_latitude(latitude) || !valid_longitude(longitude) {
            return Err(CoreError::InvalidInput(
                "query center out of coordinate range".to_string(),
            ));
        }
        if !radius_meters.is_finite() || radius_meters < 0.0 {
            return Err(CoreError::InvalidInput(
                "radius must be a non-negative number of meters".to_string(),
            ));
        }
        if radius_meters > MAX_QUERY_RADIUS_METERS {
            return Err(CoreError::InvalidInput(format!(
                "radius {radius_meters} exceeds the maximum of {MAX_QUERY_RADIUS_METERS} meters"
            )));
        }

        let mut candidate_ids: HashSet<Uuid> = HashSet::new();
        for cell in covering_cells(latitude, longitude, radius_meters) {
            // Clone ids out so the cell guard drops before position lookups.
            if let Some(members) = self.cells.get(&cell) {
                candidate_ids.extend(members.iter().copied());
            }
        }

        let mut hits = Vec::new();
        for user_id in candidate_ids {
            if exclude_user_id == Some(user_id) {
                continue;
            }
            let Some(position) = self.positions.get(&user_id).map(|r| r.clone()) else {
                continue;
            };
            let distance =
                haversine_meters(latitude, longitude, position.latitude, position.longitude);
            if distance <= radius_meters {
                hits.push(PositionHit {
                    position,
                    distance_meters: distance,
                });
            }
        }

        hits.sort_by(|a, b| {
            a.distance_meters
                .total_cmp(&b.distance_meters)
                .then_with(|| a.position.user_id.cmp(&b.position.user_id))
        });

        Ok(hits)
    }

    /// Remove every position not updated within `ttl` of `now`. Returns the
    /// number removed. Runs on the periodic sweep, never inline per query.
    pub fn expire_stale(&self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let stale: Vec<Uuid> = self
            .positions
            .iter()
            .filter(|entry| now - entry.last_updated > ttl)
            .map(|entry| entry.user_id)
            .collect();

        let mut removed = 0;
        for user_id in stale {
            // Re-check under the entry lock; a report may have raced the scan.
            if let Some((_, record)) = self
                .positions
                .remove_if(&user_id, |_, record| now - record.last_updated > ttl)
            {
                let cell = CellKey::for_point(record.latitude, record.longitude);
                self.remove_from_cell(cell, user_id);
                removed += 1;
            }
        }
        removed
    }

    pub fn active_count(&self) -> usize {
        self.positions.len()
    }

    fn remove_from_cell(&self, cell: CellKey, user_id: Uuid) {
        if let Some(mut members) = self.cells.get_mut(&cell) {
            members.remove(&user_id);
        }
        self.cells.remove_if(&cell, |_, members| members.is_empty());
    }
}

impl Default for GeoIndex {
    fn default() -> Self {
        Self::new()
    }
}
