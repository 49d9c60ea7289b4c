//! Collaborator interfaces for the review pipeline.
//!
//! The reconciliation engine never touches storage directly: it consumes a
//! [`RecordStore`] (the journal database) and a [`LocalCache`] (planning
//! scratch state) passed in by the caller. [`SqliteStore`] is the production
//! record store; the engine's tests supply in-memory fakes.

use anyhow::Result;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::db::{self, query};
use crate::model::purpose::{ChecklistItem, Purpose};
use crate::model::rule::{RuleConfirmation, TravelRule};
use crate::model::snapshot::ReviewSnapshot;
use crate::model::trip::{Trip, TripStatus};

/// A custom checklist entry held in the scratch cache: the client-generated
/// id plus the name it was created under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomEntry {
    pub id: String,
    pub name: String,
}

/// Read/write access to the journal's persistent records.
pub trait RecordStore {
    /// Fetch one trip by id.
    fn fetch_trip(&self, trip_id: i64) -> Result<Option<Trip>>;

    /// List all trips, most recent start date first.
    fn list_trips(&self) -> Result<Vec<Trip>>;

    /// Persist a trip's new lifecycle status.
    fn update_trip_status(&self, trip_id: i64, status: TripStatus) -> Result<()>;

    /// All purposes planned for a trip (catalog main, catalog sub, custom).
    fn fetch_planned_purposes(&self, trip_id: i64) -> Result<Vec<Purpose>>;

    /// Catalog ids of a trip's planned main purposes.
    fn main_purpose_ids(&self, trip_id: i64) -> Result<Vec<i64>>;

    /// Recommended items for the given main purposes.
    fn fetch_planned_items(&self, main_ids: &[i64]) -> Result<Vec<ChecklistItem>>;

    /// The trip's saved review snapshot, if any.
    fn fetch_review_snapshot(&self, trip_id: i64) -> Result<Option<ReviewSnapshot>>;

    /// Wholesale upsert of the trip's snapshot, keyed by `trip_id`.
    fn save_review_snapshot(&self, snapshot: &ReviewSnapshot) -> Result<()>;

    /// Delete the trip's snapshot. Missing rows are not an error.
    fn delete_review_snapshot(&self, trip_id: i64) -> Result<()>;

    /// Rules attached to the given main purposes (not yet deduplicated).
    fn fetch_rules(&self, main_ids: &[i64]) -> Result<Vec<TravelRule>>;

    /// Confirmation state recorded for a trip.
    fn fetch_confirmations(&self, trip_id: i64) -> Result<Vec<RuleConfirmation>>;

    /// Upsert one rule confirmation.
    fn set_confirmation(&self, trip_id: i64, rule_id: i64, confirmed: bool) -> Result<()>;
}

/// Planning scratch state recorded before a snapshot exists: which items the
/// user checked, and the custom items they typed in.
pub trait LocalCache {
    /// Checked-item keys for a trip (`item_<id>` for catalog rows, the raw
    /// custom id for custom rows).
    fn read_checked(&self, trip_id: i64) -> Result<Vec<String>>;

    /// Replace the checked-item keys for a trip.
    fn write_checked(&self, trip_id: i64, keys: &[String]) -> Result<()>;

    /// Custom items created for a trip during planning.
    fn read_custom_entries(&self, trip_id: i64) -> Result<Vec<CustomEntry>>;

    /// Replace the custom items for a trip.
    fn write_custom_entries(&self, trip_id: i64, entries: &[CustomEntry]) -> Result<()>;

    /// Drop all scratch state for a trip.
    fn clear_trip(&self, trip_id: i64) -> Result<()>;
}

/// The production [`RecordStore`], backed by the journal SQLite database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the journal database at `path` and migrate it.
    ///
    /// # Errors
    ///
    /// Returns an error if opening or migrating the database fails.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: db::open_journal(path)?,
        })
    }

    /// In-memory store with the full schema applied.
    ///
    /// # Errors
    ///
    /// Returns an error if opening or migrating the database fails.
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            conn: db::open_in_memory()?,
        })
    }

    /// Wrap an already-opened, already-migrated connection.
    #[must_use]
    pub const fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// The underlying connection, for query helpers outside the trait.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl RecordStore for SqliteStore {
    fn fetch_trip(&self, trip_id: i64) -> Result<Option<Trip>> {
        query::get_trip(&self.conn, trip_id)
    }

    fn list_trips(&self) -> Result<Vec<Trip>> {
        query::list_trips(&self.conn)
    }

    fn update_trip_status(&self, trip_id: i64, status: TripStatus) -> Result<()> {
        query::update_trip_status(&self.conn, trip_id, status)
    }

    fn fetch_planned_purposes(&self, trip_id: i64) -> Result<Vec<Purpose>> {
        query::planned_purposes(&self.conn, trip_id)
    }

    fn main_purpose_ids(&self, trip_id: i64) -> Result<Vec<i64>> {
        query::main_purpose_ids(&self.conn, trip_id)
    }

    fn fetch_planned_items(&self, main_ids: &[i64]) -> Result<Vec<ChecklistItem>> {
        query::default_items_for(&self.conn, main_ids)
    }

    fn fetch_review_snapshot(&self, trip_id: i64) -> Result<Option<ReviewSnapshot>> {
        query::fetch_review(&self.conn, trip_id)
    }

    fn save_review_snapshot(&self, snapshot: &ReviewSnapshot) -> Result<()> {
        query::upsert_review(&self.conn, snapshot)
    }

    fn delete_review_snapshot(&self, trip_id: i64) -> Result<()> {
        query::delete_review(&self.conn, trip_id)
    }

    fn fetch_rules(&self, main_ids: &[i64]) -> Result<Vec<TravelRule>> {
        query::rules_for(&self.conn, main_ids)
    }

    fn fetch_confirmations(&self, trip_id: i64) -> Result<Vec<RuleConfirmation>> {
        query::confirmations_for(&self.conn, trip_id)
    }

    fn set_confirmation(&self, trip_id: i64, rule_id: i64, confirmed: bool) -> Result<()> {
        query::set_confirmation(&self.conn, trip_id, rule_id, confirmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seed;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        s.parse().expect("valid date literal")
    }

    #[test]
    fn sqlite_store_round_trips_through_the_trait() {
        let store = SqliteStore::in_memory().expect("open store");
        seed::seed_catalog(store.connection()).expect("seed");

        let trip_id = query::insert_trip(
            store.connection(),
            "Trait trip",
            "Kanto",
            date("2026-04-01"),
            date("2026-04-03"),
        )
        .expect("insert trip");

        let store: &dyn RecordStore = &store;
        let trip = store.fetch_trip(trip_id).expect("fetch").expect("exists");
        assert_eq!(trip.title, "Trait trip");

        store
            .update_trip_status(trip_id, TripStatus::Ongoing)
            .expect("transition");
        assert_eq!(
            store
                .fetch_trip(trip_id)
                .expect("fetch")
                .expect("exists")
                .status,
            TripStatus::Ongoing
        );

        let mut snapshot = ReviewSnapshot::new(trip_id);
        snapshot.achieved_main.insert("1".to_string());
        store.save_review_snapshot(&snapshot).expect("save");
        let stored = store
            .fetch_review_snapshot(trip_id)
            .expect("fetch")
            .expect("exists");
        assert!(stored.achieved_main.contains("1"));

        store.delete_review_snapshot(trip_id).expect("delete");
        assert!(store.fetch_review_snapshot(trip_id).expect("fetch").is_none());
    }
}
