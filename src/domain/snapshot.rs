use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::AnnouncementId;

/// What the engine remembers from the last successful fetch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedSnapshot {
    pub known_ids: HashSet<AnnouncementId>,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl FeedSnapshot {
    pub fn new(known_ids: HashSet<AnnouncementId>, last_fetched_at: Option<DateTime<Utc>>) -> Self {
        Self {
            known_ids,
            last_fetched_at,
        }
    }

    /// No baseline yet: nothing has ever been seen
    pub fn is_empty(&self) -> bool {
        self.known_ids.is_empty()
    }

    /// Sorted ids, for stable display and storage
    pub fn sorted_ids(&self) -> Vec<&AnnouncementId> {
        let mut ids: Vec<_> = self.known_ids.iter().collect();
        ids.sort();
        ids
    }
}
