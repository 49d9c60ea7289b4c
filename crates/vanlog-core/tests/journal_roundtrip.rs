//! Filesystem-backed journal round-trip: everything written through one
//! connection is visible after reopening the database file.

use chrono::NaiveDate;
use vanlog_core::db::{open_journal, query, seed};
use vanlog_core::model::snapshot::ReviewSnapshot;
use vanlog_core::model::trip::TripStatus;
use vanlog_core::store::{CustomEntry, LocalCache};
use vanlog_core::{ScratchCache, config};

fn date(s: &str) -> NaiveDate {
    s.parse().expect("valid date literal")
}

#[test]
fn journal_survives_reopen() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = config::journal_db_path(dir.path());

    let trip_id = {
        let conn = open_journal(&db_path).expect("first open");
        seed::seed_catalog(&conn).expect("seed");

        let trip_id = query::insert_trip(
            &conn,
            "Reopen trip",
            "Shikoku",
            date("2026-09-10"),
            date("2026-09-14"),
        )
        .expect("insert trip");

        let mains = query::list_main_purposes(&conn).expect("catalog");
        query::attach_main_purpose(&conn, trip_id, mains[0].id).expect("attach main");
        query::attach_custom_purpose(&conn, trip_id, "Cape Lighthouse").expect("attach custom");
        query::update_trip_status(&conn, trip_id, TripStatus::Ongoing).expect("status");

        let mut snapshot = ReviewSnapshot::new(trip_id);
        snapshot.achieved_main.insert(mains[0].id.to_string());
        snapshot
            .achieved_sub
            .insert("custom:Cape Lighthouse".to_string());
        query::upsert_review(&conn, &snapshot).expect("save snapshot");

        trip_id
    };

    let conn = open_journal(&db_path).expect("second open");

    let trip = query::get_trip(&conn, trip_id).expect("get").expect("exists");
    assert_eq!(trip.title, "Reopen trip");
    assert_eq!(trip.status, TripStatus::Ongoing);

    let purposes = query::planned_purposes(&conn, trip_id).expect("planned");
    assert_eq!(purposes.len(), 2);

    let snapshot = query::fetch_review(&conn, trip_id)
        .expect("fetch")
        .expect("exists");
    assert!(snapshot.achieved_sub.contains("custom:Cape Lighthouse"));
}

#[test]
fn scratch_cache_lives_next_to_the_database() {
    let dir = tempfile::tempdir().expect("temp dir");
    let cache = ScratchCache::at_root(dir.path());

    cache
        .write_checked(1, &["item_1".to_string(), "custom_1699999999".to_string()])
        .expect("write checked");
    cache
        .write_custom_entries(
            1,
            &[CustomEntry {
                id: "custom_1699999999".to_string(),
                name: "Folding Table".to_string(),
            }],
        )
        .expect("write custom");

    // A second handle over the same root sees the same state.
    let reopened = ScratchCache::at_root(dir.path());
    assert_eq!(reopened.read_checked(1).expect("read").len(), 2);
    assert_eq!(
        reopened.read_custom_entries(1).expect("read")[0].name,
        "Folding Table"
    );
    assert!(cache.path().starts_with(dir.path().join(".vanlog")));
}
