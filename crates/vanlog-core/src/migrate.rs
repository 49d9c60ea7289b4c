//! One-shot rewrite of legacy custom identifiers in stored snapshots.
//!
//! Journals written before the canonical-identifier change stored custom
//! achievements under client-generated ids (`custom_<timestamp>`,
//! `custom_<timestamp>_<n>`, `custom_sub_<timestamp>`). Those ids never
//! match a freshly loaded plan, so the achievements silently vanish from the
//! score. This pass rewrites them to the `custom:<name>` form.
//!
//! Name recovery is exact for `custom_name_<name>` ids (the name is embedded
//! in the id). For timestamp ids the originating name is gone; the pass
//! falls back to the trip's first custom plan row, which is a heuristic:
//! a trip with several custom purposes may map a stale id to the wrong one.
//! Entries with no candidate name at all are kept unchanged.

use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::db::query;
use crate::ident::{self, IdentKind};

/// Counters reported by [`migrate_snapshot_ids`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Legacy entries examined across all snapshots.
    pub scanned: usize,
    /// Entries rewritten to canonical form.
    pub rewritten: usize,
    /// Legacy entries kept as-is (no candidate name).
    pub skipped: usize,
}

/// Rewrite legacy custom ids in every stored snapshot's achieved-sub set.
///
/// Idempotent: rewritten entries are canonical and are not touched again on
/// a second run.
///
/// # Errors
///
/// Returns an error if reading or writing snapshots fails. Name-recovery
/// failures are not errors; the affected entries are counted as skipped.
pub fn migrate_snapshot_ids(conn: &Connection) -> Result<MigrationReport> {
    let mut report = MigrationReport::default();

    for snapshot in query::all_reviews(conn)? {
        if !snapshot.achieved_sub.iter().any(|raw| ident::is_legacy_custom(raw)) {
            continue;
        }

        let custom_names = query::custom_purpose_names(conn, snapshot.trip_id)?;
        let mut migrated = BTreeSet::new();
        let mut changed = false;

        for raw in &snapshot.achieved_sub {
            if !ident::is_legacy_custom(raw) {
                migrated.insert(raw.clone());
                continue;
            }
            report.scanned += 1;

            if let Ok(canonical) = ident::normalize(raw, None, IdentKind::Purpose) {
                // custom_name_<name> carries its own name.
                debug!(trip = snapshot.trip_id, %raw, %canonical, "rewrote embedded-name id");
                migrated.insert(canonical.as_str().to_string());
                report.rewritten += 1;
                changed = true;
                continue;
            }

            match custom_names.first() {
                Some(name) => {
                    let canonical = ident::normalize(raw, Some(name), IdentKind::Purpose)?;
                    debug!(
                        trip = snapshot.trip_id,
                        %raw,
                        %canonical,
                        "rewrote timestamp id from first custom plan row"
                    );
                    migrated.insert(canonical.as_str().to_string());
                    report.rewritten += 1;
                    changed = true;
                }
                None => {
                    debug!(trip = snapshot.trip_id, %raw, "no candidate name, kept as-is");
                    migrated.insert(raw.clone());
                    report.skipped += 1;
                }
            }
        }

        if changed {
            query::update_review_achieved_sub(conn, snapshot.trip_id, &migrated)?;
        }
    }

    info!(
        scanned = report.scanned,
        rewritten = report.rewritten,
        skipped = report.skipped,
        "snapshot id migration finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::model::snapshot::ReviewSnapshot;
    use chrono::NaiveDate;

    fn setup_trip(conn: &Connection, custom_purposes: &[&str]) -> i64 {
        let trip_id = query::insert_trip(
            conn,
            "Legacy trip",
            "Tohoku",
            NaiveDate::from_ymd_opt(2026, 5, 1).expect("valid date"),
            NaiveDate::from_ymd_opt(2026, 5, 3).expect("valid date"),
        )
        .expect("insert trip");
        for name in custom_purposes {
            query::attach_custom_purpose(conn, trip_id, name).expect("attach custom");
        }
        trip_id
    }

    fn save_snapshot(conn: &Connection, trip_id: i64, achieved_sub: &[&str]) {
        let mut snapshot = ReviewSnapshot::new(trip_id);
        for id in achieved_sub {
            snapshot.achieved_sub.insert((*id).to_string());
        }
        query::upsert_review(conn, &snapshot).expect("save snapshot");
    }

    fn achieved_sub(conn: &Connection, trip_id: i64) -> Vec<String> {
        query::fetch_review(conn, trip_id)
            .expect("fetch")
            .expect("exists")
            .achieved_sub
            .into_iter()
            .collect()
    }

    #[test]
    fn embedded_name_ids_convert_exactly() {
        let conn = open_in_memory().expect("open");
        let trip = setup_trip(&conn, &[]);
        save_snapshot(&conn, trip, &["custom_name_Lake Viewpoint", "10"]);

        let report = migrate_snapshot_ids(&conn).expect("migrate");
        assert_eq!(report.scanned, 1);
        assert_eq!(report.rewritten, 1);
        assert_eq!(report.skipped, 0);
        assert_eq!(
            achieved_sub(&conn, trip),
            vec!["10".to_string(), "custom:Lake Viewpoint".to_string()]
        );
    }

    #[test]
    fn timestamp_ids_use_first_custom_plan_row() {
        let conn = open_in_memory().expect("open");
        let trip = setup_trip(&conn, &["Sunset Point", "Hidden Beach"]);
        save_snapshot(&conn, trip, &["custom_1699999999"]);

        let report = migrate_snapshot_ids(&conn).expect("migrate");
        assert_eq!(report.rewritten, 1);
        assert_eq!(achieved_sub(&conn, trip), vec!["custom:Sunset Point".to_string()]);
    }

    #[test]
    fn entries_without_candidates_are_kept() {
        let conn = open_in_memory().expect("open");
        let trip = setup_trip(&conn, &[]);
        save_snapshot(&conn, trip, &["custom_1699999999_2"]);

        let report = migrate_snapshot_ids(&conn).expect("migrate");
        assert_eq!(report.scanned, 1);
        assert_eq!(report.rewritten, 0);
        assert_eq!(report.skipped, 1);
        assert_eq!(achieved_sub(&conn, trip), vec!["custom_1699999999_2".to_string()]);
    }

    #[test]
    fn migration_is_idempotent() {
        let conn = open_in_memory().expect("open");
        let trip = setup_trip(&conn, &["Sunset Point"]);
        save_snapshot(&conn, trip, &["custom_1699999999", "custom_name_Old Pier"]);

        let first = migrate_snapshot_ids(&conn).expect("first run");
        assert_eq!(first.rewritten, 2);

        let second = migrate_snapshot_ids(&conn).expect("second run");
        assert_eq!(second, MigrationReport::default());
        assert_eq!(
            achieved_sub(&conn, trip),
            vec!["custom:Old Pier".to_string(), "custom:Sunset Point".to_string()]
        );
    }

    #[test]
    fn canonical_and_durable_ids_are_untouched() {
        let conn = open_in_memory().expect("open");
        let trip = setup_trip(&conn, &["Sunset Point"]);
        save_snapshot(&conn, trip, &["10", "custom:Sunset Point"]);

        let report = migrate_snapshot_ids(&conn).expect("migrate");
        assert_eq!(report, MigrationReport::default());
    }
}
