use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::constants::VENUE_RADIUS_METERS;
use crate::error::CoreError;
use crate::models::{
    Connection, ConnectionStatus, CrossedPath, MeetingContext, Profile, ResolveOutcome,
    UserPosition,
};
use crate::services::matcher::{RankedCandidate, rank};
use crate::services::tags::TagExtractor;
use crate::store::{
    ConnectionManager, CrossedPaths, GeoIndex, InterestGraph, PositionReport, ProfileStore,
};
use crate::utils::Config;

/// Shared application state: the session facade over the matching core.
/// Validates inputs and delegates to the stores; every method is safe to call
/// from concurrent request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub geo: Arc<GeoIndex>,
    pub interests: Arc<InterestGraph>,
    pub connections: Arc<ConnectionManager>,
    pub profiles: Arc<ProfileStore>,
    pub history: Arc<CrossedPaths>,
    tag_extractor: Arc<TagExtractor>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let tag_extractor = Arc::new(TagExtractor::new(&config.tag_vocabulary));
        Self {
            config,
            geo: Arc::new(GeoIndex::new()),
            interests: Arc::new(InterestGraph::new()),
            connections: Arc::new(ConnectionManager::new()),
            profiles: Arc::new(ProfileStore::new()),
            history: Arc::new(CrossedPaths::new()),
            tag_extractor,
        }
    }

    pub fn report_position(&self, report: PositionReport) -> Result<UserPosition, CoreError> {
        self.geo.upsert_position(report, Utc::now())
    }

    pub fn remove_position(&self, user_id: Uuid) -> bool {
        self.geo.remove_position(user_id)
    }

    /// Create or replace a profile snapshot, re-extracting tags from the bio.
    pub fn upsert_profile(
        &self,
        user_id: Uuid,
        name: String,
        age: i32,
        bio: String,
    ) -> Result<Profile, CoreError> {
        if name.trim().is_empty() {
            return Err(CoreError::InvalidInput("name must not be empty".to_string()));
        }
        if !(18..=120).contains(&age) {
            return Err(CoreError::InvalidInput(format!(
                "age {age} out of range [18, 120]"
            )));
        }

        let profile = Profile {
            user_id,
            name,
            age,
            tags: self.tag_extractor.extract(&bio),
            bio,
        };
        self.profiles.upsert(profile.clone());
        Ok(profile)
    }

    /// The ranked discovery feed. Venue-range hits are also appended to the
    /// requester's crossed-paths history.
    pub fn discover(
        &self,
        user_id: Uuid,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
        limit: usize,
    ) -> Result<Vec<RankedCandidate>, CoreError> {
        self.discover_at(user_id, latitude, longitude, radius_meters, limit, Utc::now())
    }

    pub fn discover_at(
        &self,
        user_id: Uuid,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<RankedCandidate>, CoreError> {
        let limit = limit.min(self.config.max_discovery_limit);
        let feed = rank(
            &self.geo,
            &self.connections,
            &self.profiles,
            user_id,
            latitude,
            longitude,
            radius_meters,
            limit,
            self.config.decline_cooldown(),
            now,
        )?;

        for candidate in &feed {
            if candidate.distance_meters <= VENUE_RADIUS_METERS {
                self.history.record(
                    user_id,
                    candidate.user_id(),
                    candidate.position.venue.clone(),
                    candidate.distance_meters,
                    now,
                );
            }
        }

        Ok(feed)
    }

    /// Send interest. When the caller supplies no meeting context it is
    /// snapshotted from the sender's current position labels.
    pub fn send_interest(
        &self,
        from: Uuid,
        to: Uuid,
        context: Option<MeetingContext>,
    ) -> Result<Connection, CoreError> {
        self.send_interest_at(from, to, context, Utc::now())
    }

    pub fn send_interest_at(
        &self,
        from: Uuid,
        to: Uuid,
        context: Option<MeetingContext>,
        now: DateTime<Utc>,
    ) -> Result<Connection, CoreError> {
        let context = context.or_else(|| {
            self.geo.get_position(from).map(|p| MeetingContext {
                venue: p.venue,
                neighborhood: p.neighborhood,
                city: p.city,
            })
        });
        self.connections.send_interest(
            &self.interests,
            from,
            to,
            context,
            self.config.decline_cooldown(),
            now,
        )
    }

    pub fn resolve_interest(
        &self,
        connection_id: Uuid,
        outcome: ResolveOutcome,
    ) -> Result<Connection, CoreError> {
        self.connections
            .resolve(&self.interests, connection_id, outcome, Utc::now())
    }

    pub fn list_connections(
        &self,
        user_id: Uuid,
        status_filter: Option<ConnectionStatus>,
    ) -> Vec<Connection> {
        self.connections.list_connections(user_id, status_filter)
    }

    pub fn crossed_paths(&self, user_id: Uuid) -> Vec<CrossedPath> {
        self.history.list(user_id)
    }

    pub fn clear_crossed_paths(&self, user_id: Uuid) {
        self.history.clear(user_id);
    }
}
