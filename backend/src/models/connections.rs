use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Pending,
    Accepted,
    Declined,
}

impl ConnectionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ConnectionStatus::Accepted | ConnectionStatus::Declined)
    }
}

/// The two ways a pending connection can be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveOutcome {
    Accepted,
    Declined,
}

impl ResolveOutcome {
    pub fn status(self) -> ConnectionStatus {
        match self {
            ResolveOutcome::Accepted => ConnectionStatus::Accepted,
            ResolveOutcome::Declined => ConnectionStatus::Declined,
        }
    }
}

/// Where a connection was made, snapshotted at creation time for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingContext {
    pub venue: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
}

/// A pairwise connection between two users, keyed by the canonical pair.
/// `user_a < user_b` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: Uuid,
    pub user_a: Uuid,
    pub user_b: Uuid,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub meeting_context: Option<MeetingContext>,
}

impl Connection {
    /// The other party, given one side of the pair.
    pub fn counterpart(&self, user_id: Uuid) -> Uuid {
        if self.user_a == user_id {
            self.user_b
        } else {
            self.user_a
        }
    }
}

/// A one-directional expression of interest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestEdge {
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// An entry in a user's crossed-paths history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossedPath {
    pub id: Uuid,
    pub user_id: Uuid,
    pub other_user_id: Uuid,
    pub venue: Option<String>,
    pub distance_meters: f64,
    pub occurred_at: DateTime<Utc>,
}

/// Canonical unordered pair of user ids, usable as a map key. Prevents a
/// duplicate record for (u, v) vs (v, u).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairKey {
    smaller: Uuid,
    larger: Uuid,
}

impl PairKey {
    pub fn new(user_1: Uuid, user_2: Uuid) -> Self {
        let (smaller, larger) = if user_1 < user_2 {
            (user_1, user_2)
        } else {
            (user_2, user_1)
        };
        Self { smaller, larger }
    }

    pub fn smaller(&self) -> Uuid {
        self.smaller
    }

    pub fn larger(&self) -> Uuid {
        self.larger
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_key_is_order_independent() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(PairKey::new(a, b), PairKey::new(b, a));
        assert!(PairKey::new(a, b).smaller() < PairKey::new(a, b).larger());
    }
}
