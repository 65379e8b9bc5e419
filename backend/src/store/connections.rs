use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::CoreError;
use crate::models::{
    Connection, ConnectionStatus, MeetingContext, PairKey, ResolveOutcome,
};
use crate::store::interests::InterestGraph;

/// Per-pair connection lifecycle: Absent -> Pending -> Accepted | Declined.
///
/// `pairs` maps a canonical pair to its connection history, newest last; only
/// the newest record may be non-terminal. All mutations for a pair run under
/// that pair's entry lock, which also covers the interest-edge writes, so two
/// simultaneous `send_interest` calls for one pair serialize and the mutual
/// fast path cannot race.
pub struct ConnectionManager {
    pairs: DashMap<PairKey, Vec<Connection>>,
    by_id: DashMap<Uuid, PairKey>,
    by_user: DashMap<Uuid, HashSet<PairKey>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            pairs: DashMap::new(),
            by_id: DashMap::new(),
            by_user: DashMap::new(),
        }
    }

    /// Express interest from one user toward another.
    ///
    /// Outcomes, judged against the pair's current state:
    /// - Accepted: `AlreadyConnected` with the existing connection id.
    /// - Pending, caller already sent: `RequestPending` with the existing id.
    /// - Pending, counterpart sent first: the reverse edge is recorded and the
    ///   same connection transitions straight to Accepted (mutual fast path).
    /// - Declined inside the cooldown window: `CooldownActive`.
    /// - Otherwise: a fresh Pending connection with `context` snapshotted.
    pub fn send_interest(
        &self,
        interests: &InterestGraph,
        from: Uuid,
        to: Uuid,
        context: Option<MeetingContext>,
        cooldown: Duration,
        now: DateTime<Utc>,
    ) -> Result<Connection, CoreError> {
        if from == to {
            return Err(CoreError::InvalidInput(
                "cannot send interest to yourself".to_string(),
            ));
        }

        let pair = PairKey::new(from, to);
        let mut history = self.pairs.entry(pair).or_default();

        if let Some(current) = history.last() {
            match current.status {
                ConnectionStatus::Accepted => {
                    return Err(CoreError::AlreadyConnected {
                        connection_id: current.id,
                    });
                }
                ConnectionStatus::Pending => {
                    if interests.has_interest(from, to) {
                        return Err(CoreError::RequestPending {
                            connection_id: current.id,
                        });
                    }
                    // The counterpart opened this request; our interest makes
                    // it mutual, so accept in place instead of leaving a
                    // second Pending behind.
                    interests.record_interest(from, to, now)?;
                    let current = history.last_mut().expect("history checked non-empty");
                    current.status = ConnectionStatus::Accepted;
                    current.resolved_at = Some(now);
                    return Ok(current.clone());
                }
                ConnectionStatus::Declined => {
                    let resolved_at = current.resolved_at.unwrap_or(current.created_at);
                    let until = resolved_at + cooldown;
                    if now < until {
                        return Err(CoreError::CooldownActive { until });
                    }
                }
            }
        }

        // Absent, or declined with the cooldown elapsed: start fresh.
        interests.clear_pair(pair);
        interests.record_interest(from, to, now)?;

        let status = if interests.has_mutual_interest(from, to) {
            ConnectionStatus::Accepted
        } else {
            ConnectionStatus::Pending
        };

        let connection = Connection {
            id: Uuid::new_v4(),
            user_a: pair.smaller(),
            user_b: pair.larger(),
            status,
            created_at: now,
            resolved_at: (status == ConnectionStatus::Accepted).then_some(now),
            meeting_context: context,
        };

        history.push(connection.clone());
        self.by_id.insert(connection.id, pair);
        self.by_user.entry(from).or_default().insert(pair);
        self.by_user.entry(to).or_default().insert(pair);

        Ok(connection)
    }

    /// Resolve a pending connection. The sole path to a terminal state; a
    /// failed call leaves the stored record untouched.
    pub fn resolve(
        &self,
        interests: &InterestGraph,
        connection_id: Uuid,
        outcome: ResolveOutcome,
        now: DateTime<Utc>,
    ) -> Result<Connection, CoreError> {
        let pair = self
            .by_id
            .get(&connection_id)
            .map(|entry| *entry)
            .ok_or(CoreError::NotFound)?;

        let mut history = self.pairs.get_mut(&pair).ok_or(CoreError::NotFound)?;
        let connection = history
            .iter_mut()
            .find(|c| c.id == connection_id)
            .ok_or(CoreError::NotFound)?;

        if connection.status != ConnectionStatus::Pending {
            return Err(CoreError::AlreadyResolved);
        }

        connection.status = outcome.status();
        connection.resolved_at = Some(now);
        let resolved = connection.clone();

        if outcome == ResolveOutcome::Declined {
            // A declined pair sheds its edges so a post-cooldown re-send can
            // record interest again.
            interests.clear_pair(pair);
        }

        Ok(resolved)
    }

    pub fn get(&self, connection_id: Uuid) -> Option<Connection> {
        let pair = self.by_id.get(&connection_id).map(|entry| *entry)?;
        let history = self.pairs.get(&pair)?;
        history.iter().find(|c| c.id == connection_id).cloned()
    }

    /// A user's connections, newest first, optionally filtered by status.
    /// Declined history is retained and listed.
    pub fn list_connections(
        &self,
        user_id: Uuid,
        status_filter: Option<ConnectionStatus>,
    ) -> Vec<Connection> {
        let pairs: Vec<PairKey> = self
            .by_user
            .get(&user_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();

        let mut connections: Vec<Connection> = Vec::new();
        for pair in pairs {
            if let Some(history) = self.pairs.get(&pair) {
                connections.extend(history.iter().cloned());
            }
        }

        if let Some(status) = status_filter {
            connections.retain(|c| c.status == status);
        }
        connections.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        connections
    }

    /// Counterparts a discovery feed must not re-surface: anyone with a
    /// Pending or Accepted connection, or a Declined one still cooling down.
    pub fn excluded_counterparts(
        &self,
        user_id: Uuid,
        cooldown: Duration,
        now: DateTime<Utc>,
    ) -> HashSet<Uuid> {
        let pairs: Vec<PairKey> = self
            .by_user
            .get(&user_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();

        let mut excluded = HashSet::new();
        for pair in pairs {
            let Some(history) = self.pairs.get(&pair) else {
                continue;
            };
            let Some(current) = history.last() else {
                continue;
            };
            let exclude = match current.status {
                ConnectionStatus::Pending | ConnectionStatus::Accepted => true,
                ConnectionStatus::Declined => {
                    let resolved_at = current.resolved_at.unwrap_or(current.created_at);
                    now < resolved_at + cooldown
                }
            };
            if exclude {
                excluded.insert(current.counterpart(user_id));
            }
        }
        excluded
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cooldown() -> Duration {
        Duration::hours(24)
    }

    fn context() -> Option<MeetingContext> {
        Some(MeetingContext {
            venue: Some("The Rooftop Bar".to_string()),
            neighborhood: Some("Chelsea".to_string()),
            city: Some("New York City".to_string()),
        })
    }

    #[test]
    fn first_interest_creates_pending_with_context() {
        let manager = ConnectionManager::new();
        let graph = InterestGraph::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        let conn = manager
            .send_interest(&graph, a, b, context(), cooldown(), Utc::now())
            .unwrap();
        assert_eq!(conn.status, ConnectionStatus::Pending);
        assert!(conn.resolved_at.is_none());
        assert!(conn.user_a < conn.user_b);
        assert_eq!(
            conn.meeting_context.as_ref().unwrap().venue.as_deref(),
            Some("The Rooftop Bar")
        );
        assert!(graph.has_interest(a, b));
    }

    #[test]
    fn mutual_interest_fast_path_accepts_the_single_connection() {
        let manager = ConnectionManager::new();
        let graph = InterestGraph::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let now = Utc::now();

        let first = manager
            .send_interest(&graph, a, b, None, cooldown(), now)
            .unwrap();
        let second = manager
            .send_interest(&graph, b, a, None, cooldown(), now)
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.status, ConnectionStatus::Accepted);
        assert!(second.resolved_at.is_some());
        assert!(graph.has_mutual_interest(a, b));
        assert_eq!(manager.list_connections(a, None).len(), 1);
    }

    #[test]
    fn repeated_interest_fails_with_request_pending() {
        let manager = ConnectionManager::new();
        let graph = InterestGraph::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let now = Utc::now();

        let conn = manager
            .send_interest(&graph, a, b, None, cooldown(), now)
            .unwrap();
        let err = manager
            .send_interest(&graph, a, b, None, cooldown(), now)
            .unwrap_err();

        assert_eq!(err, CoreError::RequestPending { connection_id: conn.id });
        assert_eq!(manager.list_connections(a, None).len(), 1);
    }

    #[test]
    fn interest_toward_accepted_pair_fails_with_already_connected() {
        let manager = ConnectionManager::new();
        let graph = InterestGraph::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let now = Utc::now();

        let conn = manager
            .send_interest(&graph, a, b, None, cooldown(), now)
            .unwrap();
        manager
            .resolve(&graph, conn.id, ResolveOutcome::Accepted, now)
            .unwrap();

        let err = manager
            .send_interest(&graph, b, a, None, cooldown(), now)
            .unwrap_err();
        assert_eq!(err, CoreError::AlreadyConnected { connection_id: conn.id });
    }

    #[test]
    fn self_interest_is_invalid() {
        let manager = ConnectionManager::new();
        let graph = InterestGraph::new();
        let a = Uuid::new_v4();
        let err = manager
            .send_interest(&graph, a, a, None, cooldown(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[test]
    fn resolve_unknown_id_is_not_found() {
        let manager = ConnectionManager::new();
        let graph = InterestGraph::new();
        let err = manager
            .resolve(&graph, Uuid::new_v4(), ResolveOutcome::Accepted, Utc::now())
            .unwrap_err();
        assert_eq!(err, CoreError::NotFound);
    }

    #[test]
    fn resolve_twice_fails_and_leaves_state_unchanged() {
        let manager = ConnectionManager::new();
        let graph = InterestGraph::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let now = Utc::now();

        let conn = manager
            .send_interest(&graph, a, b, None, cooldown(), now)
            .unwrap();
        let accepted = manager
            .resolve(&graph, conn.id, ResolveOutcome::Accepted, now)
            .unwrap();
        assert_eq!(accepted.status, ConnectionStatus::Accepted);

        let err = manager
            .resolve(&graph, conn.id, ResolveOutcome::Declined, now)
            .unwrap_err();
        assert_eq!(err, CoreError::AlreadyResolved);

        let stored = manager.get(conn.id).unwrap();
        assert_eq!(stored.status, ConnectionStatus::Accepted);
        assert_eq!(stored.resolved_at, accepted.resolved_at);
    }

    #[test]
    fn decline_cooldown_blocks_then_allows_a_fresh_pending() {
        let manager = ConnectionManager::new();
        let graph = InterestGraph::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let start = Utc::now();

        let conn = manager
            .send_interest(&graph, a, b, None, cooldown(), start)
            .unwrap();
        manager
            .resolve(&graph, conn.id, ResolveOutcome::Declined, start)
            .unwrap();

        // Within the cooldown: rejected, with the expiry reported.
        let within = start + Duration::hours(1);
        let err = manager
            .send_interest(&graph, a, b, None, cooldown(), within)
            .unwrap_err();
        assert_eq!(err, CoreError::CooldownActive { until: start + cooldown() });

        // After the cooldown: a brand-new pending connection.
        let after = start + Duration::hours(25);
        let fresh = manager
            .send_interest(&graph, a, b, None, cooldown(), after)
            .unwrap();
        assert_ne!(fresh.id, conn.id);
        assert_eq!(fresh.status, ConnectionStatus::Pending);

        // Both the declined record and the new one are listed.
        let all = manager.list_connections(a, None);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, fresh.id);
        let declined = manager.list_connections(a, Some(ConnectionStatus::Declined));
        assert_eq!(declined.len(), 1);
        assert_eq!(declined[0].id, conn.id);
    }

    #[test]
    fn simultaneous_sends_from_both_sides_yield_one_accepted_connection() {
        let manager = ConnectionManager::new();
        let graph = InterestGraph::new();
        let now = Utc::now();

        // Repeat to give the two threads real chances to interleave.
        for _ in 0..32 {
            let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
            let (forward, reverse) = std::thread::scope(|s| {
                let forward =
                    s.spawn(|| manager.send_interest(&graph, a, b, None, cooldown(), now));
                let reverse =
                    s.spawn(|| manager.send_interest(&graph, b, a, None, cooldown(), now));
                (forward.join().unwrap(), reverse.join().unwrap())
            });

            // Whichever side lost the race takes the mutual fast path, so
            // both calls succeed against the same record.
            let forward = forward.unwrap();
            let reverse = reverse.unwrap();
            assert_eq!(forward.id, reverse.id);

            let listed = manager.list_connections(a, None);
            assert_eq!(listed.len(), 1);
            assert_eq!(listed[0].status, ConnectionStatus::Accepted);
            assert!(graph.has_mutual_interest(a, b));
        }
    }

    #[test]
    fn simultaneous_duplicate_sends_admit_exactly_one() {
        let manager = ConnectionManager::new();
        let graph = InterestGraph::new();
        let now = Utc::now();

        for _ in 0..32 {
            let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
            let results: Vec<Result<Connection, CoreError>> = std::thread::scope(|s| {
                let handles: Vec<_> = (0..4)
                    .map(|_| s.spawn(|| manager.send_interest(&graph, a, b, None, cooldown(), now)))
                    .collect();
                handles.into_iter().map(|h| h.join().unwrap()).collect()
            });

            let created: Vec<&Connection> =
                results.iter().filter_map(|r| r.as_ref().ok()).collect();
            assert_eq!(created.len(), 1);
            for result in &results {
                if let Err(err) = result {
                    assert_eq!(
                        *err,
                        CoreError::RequestPending { connection_id: created[0].id }
                    );
                }
            }
            assert_eq!(manager.list_connections(a, None).len(), 1);
        }
    }

    #[test]
    fn excluded_counterparts_tracks_state_and_cooldown() {
        let manager = ConnectionManager::new();
        let graph = InterestGraph::new();
        let me = Uuid::new_v4();
        let (pending, accepted, declined) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let start = Utc::now();

        manager
            .send_interest(&graph, me, pending, None, cooldown(), start)
            .unwrap();

        let conn = manager
            .send_interest(&graph, me, accepted, None, cooldown(), start)
            .unwrap();
        manager
            .resolve(&graph, conn.id, ResolveOutcome::Accepted, start)
            .unwrap();

        let conn = manager
            .send_interest(&graph, me, declined, None, cooldown(), start)
            .unwrap();
        manager
            .resolve(&graph, conn.id, ResolveOutcome::Declined, start)
            .unwrap();

        let within = manager.excluded_counterparts(me, cooldown(), start + Duration::hours(1));
        assert!(within.contains(&pending));
        assert!(within.contains(&accepted));
        assert!(within.contains(&declined));

        let after = manager.excluded_counterparts(me, cooldown(), start + Duration::hours(25));
        assert!(after.contains(&pending));
        assert!(after.contains(&accepted));
        assert!(!after.contains(&declined));
    }
}
