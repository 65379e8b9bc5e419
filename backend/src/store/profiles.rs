use dashmap::DashMap;
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::models::Profile;

/// Profile snapshots keyed by user. Tags are supplied by the caller (the
/// facade runs extraction on upsert) so matching never re-parses bio text.
pub struct ProfileStore {
    profiles: DashMap<Uuid, Profile>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self {
            profiles: DashMap::new(),
        }
    }

    pub fn upsert(&self, profile: Profile) {
        self.profiles.insert(profile.user_id, profile);
    }

    pub fn get(&self, user_id: Uuid) -> Option<Profile> {
        self.profiles.get(&user_id).map(|p| p.clone())
    }

    /// Tags of a user, empty when no profile exists. Candidates without a
    /// profile still rank, with zero overlap.
    pub fn tags(&self, user_id: Uuid) -> BTreeSet<String> {
        self.profiles
            .get(&user_id)
            .map(|p| p.tags.clone())
            .unwrap_or_default()
    }

    pub fn remove(&self, user_id: Uuid) -> bool {
        self.profiles.remove(&user_id).is_some()
    }
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_replaces_previous_snapshot() {
        let store = ProfileStore::new();
        let user_id = Uuid::new_v4();

        store.upsert(Profile {
            user_id,
            name: "Alex Rivera".to_string(),
            age: 24,
            bio: "Music lover.".to_string(),
            tags: BTreeSet::from(["music".to_string()]),
        });
        store.upsert(Profile {
            user_id,
            name: "Alex Rivera".to_string(),
            age: 24,
            bio: "Coffee enthusiast.".to_string(),
            tags: BTreeSet::from(["coffee".to_string()]),
        });

        let tags = store.tags(user_id);
        assert!(tags.contains("coffee"));
        assert!(!tags.contains("music"));
    }

    #[test]
    fn missing_profile_has_empty_tags() {
        let store = ProfileStore::new();
        assert!(store.tags(Uuid::new_v4()).is_empty());
        assert!(store.get(Uuid::new_v4()).is_none());
    }
}
