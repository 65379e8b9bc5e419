use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::VecDeque;
use uuid::Uuid;

use crate::constants::CROSSED_PATHS_CAP;
use crate::models::CrossedPath;

/// Per-user log of users encountered at venue range, newest first, capped at
/// `CROSSED_PATHS_CAP` entries.
pub struct CrossedPaths {
    entries: DashMap<Uuid, VecDeque<CrossedPath>>,
}

impl CrossedPaths {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn record(
        &self,
        user_id: Uuid,
        other_user_id: Uuid,
        venue: Option<String>,
        distance_meters: f64,
        now: DateTime<Utc>,
    ) {
        let mut log = self.entries.entry(user_id).or_default();
        log.push_front(CrossedPath {
            id: Uuid::new_v4(),
            user_id,
            other_user_id,
            venue,
            distance_meters,
            occurred_at: now,
        });
        log.truncate(CROSSED_PATHS_CAP);
    }

    /// Newest first.
    pub fn list(&self, user_id: Uuid) -> Vec<CrossedPath> {
        self.entries
            .get(&user_id)
            .map(|log| log.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn clear(&self, user_id: Uuid) {
        self.entries.remove(&user_id);
    }
}

impl Default for CrossedPaths {
    fn default() -> Self {
        Self::new()
    }
}
