use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::CoreError;
use crate::models::{InterestEdge, PairKey};

/// Directed "interest" edges between users, stored as outbound adjacency so
/// the mutuality check is two set lookups.
///
/// The graph records edges but does not own connection lifecycle; all edge
/// mutations happen under the Connection-Manager's per-pair critical section.
pub struct InterestGraph {
    outbound: DashMap<Uuid, HashMap<Uuid, DateTime<Utc>>>,
}

impl InterestGraph {
    pub fn new() -> Self {
        Self {
            outbound: DashMap::new(),
        }
    }

    /// Insert the edge `from -> to`. Fails with `DuplicateEdge` when it
    /// already exists.
    pub fn record_interest(
        &self,
        from: Uuid,
        to: Uuid,
        now: DateTime<Utc>,
    ) -> Result<InterestEdge, CoreError> {
        let mut edges = self.outbound.entry(from).or_default();
        if edges.contains_key(&to) {
            return Err(CoreError::DuplicateEdge);
        }
        edges.insert(to, now);
        Ok(InterestEdge {
            from_user_id: from,
            to_user_id: to,
            created_at: now,
        })
    }

    pub fn has_interest(&self, from: Uuid, to: Uuid) -> bool {
        self.outbound
            .get(&from)
            .map(|edges| edges.contains_key(&to))
            .unwrap_or(false)
    }

    /// True iff both `a -> b` and `b -> a` exist.
    pub fn has_mutual_interest(&self, a: Uuid, b: Uuid) -> bool {
        self.has_interest(a, b) && self.has_interest(b, a)
    }

    /// Outbound edges of a user for auditing, ordered by creation time then
    /// target id. Restartable: each call yields a fresh iterator over a
    /// snapshot taken at call time.
    pub fn interests_from(&self, user_id: Uuid) -> impl Iterator<Item = InterestEdge> + use<> {
        let mut edges: Vec<InterestEdge> = self
            .outbound
            .get(&user_id)
            .map(|edges| {
                edges
                    .iter()
                    .map(|(to, created_at)| InterestEdge {
                        from_user_id: user_id,
                        to_user_id: *to,
                        created_at: *created_at,
                    })
                    .collect()
            })
            .unwrap_or_default();
        edges.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.to_user_id.cmp(&b.to_user_id))
        });
        edges.into_iter()
    }

    /// Drop both directed edges for a pair. Used when a declined connection
    /// frees the pair for a later re-send.
    pub fn clear_pair(&self, pair: PairKey) {
        if let Some(mut edges) = self.outbound.get_mut(&pair.smaller()) {
            edges.remove(&pair.larger());
        }
        if let Some(mut edges) = self.outbound.get_mut(&pair.larger()) {
            edges.remove(&pair.smaller());
        }
    }
}

impl Default for InterestGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn duplicate_edge_is_rejected() {
        let graph = InterestGraph::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let now = Utc::now();

        graph.record_interest(a, b, now).unwrap();
        assert_eq!(graph.record_interest(a, b, now), Err(CoreError::DuplicateEdge));
    }

    #[test]
    fn mutuality_requires_both_directions() {
        let graph = InterestGraph::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let now = Utc::now();

        graph.record_interest(a, b, now).unwrap();
        assert!(!graph.has_mutual_interest(a, b));

        graph.record_interest(b, a, now).unwrap();
        assert!(graph.has_mutual_interest(a, b));
        assert!(graph.has_mutual_interest(b, a));
    }

    #[test]
    fn interests_from_is_restartable_and_ordered() {
        let graph = InterestGraph::new();
        let a = Uuid::new_v4();
        let (b, c) = (Uuid::new_v4(), Uuid::new_v4());
        let now = Utc::now();

        graph.record_interest(a, b, now).unwrap();
        graph.record_interest(a, c, now + Duration::seconds(1)).unwrap();

        let first: Vec<_> = graph.interests_from(a).collect();
        let second: Vec<_> = graph.interests_from(a).collect();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].to_user_id, b);
        assert_eq!(first[1].to_user_id, c);
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn clear_pair_removes_both_directions() {
        let graph = InterestGraph::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let now = Utc::now();

        graph.record_interest(a, b, now).unwrap();
        graph.record_interest(b, a, now).unwrap();
        graph.clear_pair(PairKey::new(a, b));

        assert!(!graph.has_interest(a, b));
        assert!(!graph.has_interest(b, a));
        // Re-recording after a clear is allowed.
        graph.record_interest(a, b, now).unwrap();
    }
}
