use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The persisted self-review outcome for one trip.
///
/// Identifier sets hold whatever the store recorded — canonical ids from
/// current journal versions, legacy custom shapes from older ones. Reads go
/// through normalization before any comparison; see `vanlog-review`.
///
/// At most one live snapshot exists per trip: every save is a wholesale
/// upsert keyed by `trip_id`, with no partial updates and no history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSnapshot {
    pub trip_id: i64,
    pub achieved_main: BTreeSet<String>,
    pub achieved_sub: BTreeSet<String>,
    pub used_items: BTreeSet<String>,
    pub captured_at: DateTime<Utc>,
}

impl ReviewSnapshot {
    /// An empty snapshot for a trip, stamped now.
    #[must_use]
    pub fn new(trip_id: i64) -> Self {
        Self {
            trip_id,
            achieved_main: BTreeSet::new(),
            achieved_sub: BTreeSet::new(),
            used_items: BTreeSet::new(),
            captured_at: Utc::now(),
        }
    }

    /// Returns `true` when nothing has been marked achieved or used.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.achieved_main.is_empty() && self.achieved_sub.is_empty() && self.used_items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_snapshot_is_empty() {
        let snap = ReviewSnapshot::new(7);
        assert_eq!(snap.trip_id, 7);
        assert!(snap.is_empty());
    }

    #[test]
    fn snapshot_json_roundtrips() {
        let mut snap = ReviewSnapshot::new(3);
        snap.achieved_main.insert("10".to_string());
        snap.achieved_sub.insert("custom:Lake Viewpoint".to_string());
        snap.used_items.insert("42".to_string());

        let json = serde_json::to_string(&snap).expect("serialize");
        let back: ReviewSnapshot = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(snap, back);
    }

    #[test]
    fn sets_deduplicate_identifiers() {
        let mut snap = ReviewSnapshot::new(1);
        snap.achieved_main.insert("10".to_string());
        snap.achieved_main.insert("10".to_string());
        assert_eq!(snap.achieved_main.len(), 1);
    }
}
