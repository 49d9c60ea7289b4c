//! `SQLite` query helpers for the journal database.
//!
//! Provides typed Rust structs and composable query functions for the
//! journal's access patterns: trips and their lifecycle, planned purposes
//! and recommended items, destination rules with confirmations, and review
//! snapshots.
//!
//! All functions take a shared `&Connection` reference and return
//! `anyhow::Result<T>` with typed structs (never raw rows).

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::model::purpose::{Category, ChecklistItem, Origin, Purpose};
use crate::model::rule::{RuleConfirmation, TravelRule};
use crate::model::snapshot::ReviewSnapshot;
use crate::model::trip::{Trip, TripStatus};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// A catalog row from `main_purposes` or `sub_purposes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    pub id: i64,
    pub name: String,
    pub display_order: i64,
}

// ---------------------------------------------------------------------------
// Trips
// ---------------------------------------------------------------------------

/// Insert a trip in `planning` state and return its row id.
pub fn insert_trip(
    conn: &Connection,
    title: &str,
    destination: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO trips (title, destination, start_date, end_date, status, created_at)
         VALUES (?1, ?2, ?3, ?4, 'planning', ?5)",
        params![
            title,
            destination,
            start_date.to_string(),
            end_date.to_string(),
            Utc::now().to_rfc3339(),
        ],
    )
    .context("insert trip")?;
    Ok(conn.last_insert_rowid())
}

/// Fetch one trip by id.
pub fn get_trip(conn: &Connection, trip_id: i64) -> Result<Option<Trip>> {
    conn.query_row(
        "SELECT trip_id, title, destination, start_date, end_date, status, created_at
         FROM trips WHERE trip_id = ?1",
        [trip_id],
        trip_from_row,
    )
    .optional()
    .context("get trip")
}

/// List all trips, most recent start date first.
pub fn list_trips(conn: &Connection) -> Result<Vec<Trip>> {
    let mut stmt = conn
        .prepare(
            "SELECT trip_id, title, destination, start_date, end_date, status, created_at
             FROM trips ORDER BY start_date DESC, trip_id DESC",
        )
        .context("prepare trip list")?;

    let rows = stmt
        .query_map([], trip_from_row)
        .context("query trips")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("read trip rows")?;
    Ok(rows)
}

/// Persist a trip's new lifecycle status.
pub fn update_trip_status(conn: &Connection, trip_id: i64, status: TripStatus) -> Result<()> {
    let changed = conn
        .execute(
            "UPDATE trips SET status = ?1 WHERE trip_id = ?2",
            params![status.to_string(), trip_id],
        )
        .context("update trip status")?;
    if changed == 0 {
        bail!("trip {trip_id} not found");
    }
    Ok(())
}

/// Title of the first existing trip whose inclusive date range intersects
/// the given range, excluding `exclude_trip` (for edits).
pub fn overlapping_trip_title(
    conn: &Connection,
    start_date: NaiveDate,
    end_date: NaiveDate,
    exclude_trip: Option<i64>,
) -> Result<Option<String>> {
    conn.query_row(
        "SELECT title FROM trips
         WHERE start_date <= ?2 AND ?1 <= end_date
           AND trip_id != COALESCE(?3, -1)
         ORDER BY start_date LIMIT 1",
        params![start_date.to_string(), end_date.to_string(), exclude_trip],
        |row| row.get(0),
    )
    .optional()
    .context("check trip overlap")
}

fn trip_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Trip> {
    let status_raw: String = row.get(5)?;
    let start_raw: String = row.get(3)?;
    let end_raw: String = row.get(4)?;
    let created_raw: String = row.get(6)?;

    Ok(Trip {
        id: row.get(0)?,
        title: row.get(1)?,
        destination: row.get(2)?,
        start_date: parse_column(3, &start_raw)?,
        end_date: parse_column(4, &end_raw)?,
        status: TripStatus::from_str(&status_raw)
            .map_err(|e| column_error(5, e))?,
        created_at: DateTime::parse_from_rfc3339(&created_raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| column_error(6, e))?,
    })
}

fn parse_column<T: FromStr>(index: usize, raw: &str) -> rusqlite::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse().map_err(|e| column_error(index, e))
}

fn column_error(
    index: usize,
    error: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(error))
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// List the main purpose catalog in display order.
pub fn list_main_purposes(conn: &Connection) -> Result<Vec<CatalogRow>> {
    list_catalog(conn, "main_purposes")
}

/// List the sub purpose catalog in display order.
pub fn list_sub_purposes(conn: &Connection) -> Result<Vec<CatalogRow>> {
    list_catalog(conn, "sub_purposes")
}

fn list_catalog(conn: &Connection, table: &str) -> Result<Vec<CatalogRow>> {
    // Table name is one of two compile-time constants; never user input.
    let sql = format!(
        "SELECT purpose_id, name, display_order FROM {table} ORDER BY display_order, purpose_id"
    );
    let mut stmt = conn.prepare(&sql).context("prepare catalog list")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(CatalogRow {
                id: row.get(0)?,
                name: row.get(1)?,
                display_order: row.get(2)?,
            })
        })
        .context("query catalog")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("read catalog rows")?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Planned purposes
// ---------------------------------------------------------------------------

/// Attach a catalog main purpose to a trip.
pub fn attach_main_purpose(conn: &Connection, trip_id: i64, purpose_id: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO trip_purposes (trip_id, purpose_type, main_purpose_id)
         VALUES (?1, 'main', ?2)",
        params![trip_id, purpose_id],
    )
    .context("attach main purpose")?;
    Ok(())
}

/// Attach a catalog sub purpose to a trip.
pub fn attach_sub_purpose(conn: &Connection, trip_id: i64, purpose_id: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO trip_purposes (trip_id, purpose_type, sub_purpose_id)
         VALUES (?1, 'sub', ?2)",
        params![trip_id, purpose_id],
    )
    .context("attach sub purpose")?;
    Ok(())
}

/// Attach a free-text custom purpose to a trip.
pub fn attach_custom_purpose(conn: &Connection, trip_id: i64, name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        bail!("custom purpose name must not be empty");
    }
    conn.execute(
        "INSERT INTO trip_purposes (trip_id, purpose_type, custom_purpose)
         VALUES (?1, 'custom', ?2)",
        params![trip_id, trimmed],
    )
    .context("attach custom purpose")?;
    Ok(())
}

/// All purposes planned for a trip: catalog main rows, catalog sub rows, and
/// custom rows (as Sub category, the only place custom entries appear).
///
/// Custom rows carry a name-derived raw id — the row id is local to this
/// journal and would collide with catalog ids after normalization.
pub fn planned_purposes(conn: &Connection, trip_id: i64) -> Result<Vec<Purpose>> {
    let mut purposes = Vec::new();

    let mut stmt = conn
        .prepare(
            "SELECT mp.purpose_id, mp.name
             FROM trip_purposes tp
             JOIN main_purposes mp ON mp.purpose_id = tp.main_purpose_id
             WHERE tp.trip_id = ?1 AND tp.purpose_type = 'main'
             ORDER BY tp.trip_purpose_id",
        )
        .context("prepare main purposes")?;
    let rows = stmt
        .query_map([trip_id], |row| {
            let id: i64 = row.get(0)?;
            let name: String = row.get(1)?;
            Ok(Purpose::new(id.to_string(), &name, Category::Main, Origin::Catalog))
        })
        .context("query main purposes")?;
    for row in rows {
        purposes.push(row.context("read main purpose row")?);
    }

    let mut stmt = conn
        .prepare(
            "SELECT sp.purpose_id, sp.name
             FROM trip_purposes tp
             JOIN sub_purposes sp ON sp.purpose_id = tp.sub_purpose_id
             WHERE tp.trip_id = ?1 AND tp.purpose_type = 'sub'
             ORDER BY tp.trip_purpose_id",
        )
        .context("prepare sub purposes")?;
    let rows = stmt
        .query_map([trip_id], |row| {
            let id: i64 = row.get(0)?;
            let name: String = row.get(1)?;
            Ok(Purpose::new(id.to_string(), &name, Category::Sub, Origin::Catalog))
        })
        .context("query sub purposes")?;
    for row in rows {
        purposes.push(row.context("read sub purpose row")?);
    }

    for name in custom_purpose_names(conn, trip_id)? {
        purposes.push(Purpose::new(
            format!("custom_name_{name}"),
            &name,
            Category::Sub,
            Origin::Custom,
        ));
    }

    Ok(purposes)
}

/// Names of a trip's custom purposes, in insertion order.
pub fn custom_purpose_names(conn: &Connection, trip_id: i64) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(
            "SELECT custom_purpose FROM trip_purposes
             WHERE trip_id = ?1 AND purpose_type = 'custom' AND custom_purpose IS NOT NULL
             ORDER BY trip_purpose_id",
        )
        .context("prepare custom purposes")?;
    let rows = stmt
        .query_map([trip_id], |row| row.get::<_, String>(0))
        .context("query custom purposes")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("read custom purpose rows")?;
    Ok(rows)
}

/// Catalog ids of a trip's planned main purposes.
pub fn main_purpose_ids(conn: &Connection, trip_id: i64) -> Result<Vec<i64>> {
    let mut stmt = conn
        .prepare(
            "SELECT main_purpose_id FROM trip_purposes
             WHERE trip_id = ?1 AND purpose_type = 'main' AND main_purpose_id IS NOT NULL
             ORDER BY trip_purpose_id",
        )
        .context("prepare main purpose ids")?;
    let rows = stmt
        .query_map([trip_id], |row| row.get::<_, i64>(0))
        .context("query main purpose ids")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("read main purpose ids")?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Recommended items
// ---------------------------------------------------------------------------

/// Recommended items for the given main purposes, in display order.
pub fn default_items_for(conn: &Connection, main_ids: &[i64]) -> Result<Vec<ChecklistItem>> {
    if main_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; main_ids.len()].join(", ");
    let sql = format!(
        "SELECT item_id, name FROM default_items
         WHERE main_purpose_id IN ({placeholders})
         ORDER BY display_order, item_id"
    );
    let mut stmt = conn.prepare(&sql).context("prepare default items")?;
    let rows = stmt
        .query_map(params_from_iter(main_ids.iter()), |row| {
            let id: i64 = row.get(0)?;
            let name: String = row.get(1)?;
            Ok(ChecklistItem::new(id.to_string(), &name, Origin::Catalog))
        })
        .context("query default items")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("read default item rows")?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Rules and confirmations
// ---------------------------------------------------------------------------

/// Rules attached to the given main purposes, ordered by category then
/// display order. Deduplication is the caller's concern (`model::rule`).
pub fn rules_for(conn: &Connection, main_ids: &[i64]) -> Result<Vec<TravelRule>> {
    if main_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; main_ids.len()].join(", ");
    let sql = format!(
        "SELECT rule_id, main_purpose_id, rule_category, rule_title, rule_description,
                is_required, display_order
         FROM travel_rules
         WHERE main_purpose_id IN ({placeholders})
         ORDER BY rule_category, display_order, rule_id"
    );
    let mut stmt = conn.prepare(&sql).context("prepare rules")?;
    let rows = stmt
        .query_map(params_from_iter(main_ids.iter()), |row| {
            Ok(TravelRule {
                id: row.get(0)?,
                main_purpose_id: row.get(1)?,
                category: row.get(2)?,
                title: row.get(3)?,
                description: row.get(4)?,
                required: row.get::<_, i64>(5)? != 0,
                display_order: row.get(6)?,
            })
        })
        .context("query rules")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("read rule rows")?;
    Ok(rows)
}

/// Confirmation state recorded for a trip.
pub fn confirmations_for(conn: &Connection, trip_id: i64) -> Result<Vec<RuleConfirmation>> {
    let mut stmt = conn
        .prepare(
            "SELECT trip_id, rule_id, is_confirmed FROM trip_rule_confirmations
             WHERE trip_id = ?1",
        )
        .context("prepare confirmations")?;
    let rows = stmt
        .query_map([trip_id], |row| {
            Ok(RuleConfirmation {
                trip_id: row.get(0)?,
                rule_id: row.get(1)?,
                confirmed: row.get::<_, i64>(2)? != 0,
            })
        })
        .context("query confirmations")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("read confirmation rows")?;
    Ok(rows)
}

/// Upsert one rule confirmation for a trip.
pub fn set_confirmation(
    conn: &Connection,
    trip_id: i64,
    rule_id: i64,
    confirmed: bool,
) -> Result<()> {
    conn.execute(
        "INSERT INTO trip_rule_confirmations (trip_id, rule_id, is_confirmed)
         VALUES (?1, ?2, ?3)
         ON CONFLICT (trip_id, rule_id) DO UPDATE SET is_confirmed = excluded.is_confirmed",
        params![trip_id, rule_id, i64::from(confirmed)],
    )
    .context("set rule confirmation")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Review snapshots
// ---------------------------------------------------------------------------

/// Fetch the review snapshot for a trip, if one was saved.
pub fn fetch_review(conn: &Connection, trip_id: i64) -> Result<Option<ReviewSnapshot>> {
    let row = conn
        .query_row(
            "SELECT trip_id, achieved_main, achieved_sub, used_items, review_date
             FROM trip_reviews WHERE trip_id = ?1",
            [trip_id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )
        .optional()
        .context("fetch review snapshot")?;

    let Some((id, main_json, sub_json, items_json, date_raw)) = row else {
        return Ok(None);
    };

    Ok(Some(ReviewSnapshot {
        trip_id: id,
        achieved_main: parse_id_set(&main_json).context("parse achieved_main")?,
        achieved_sub: parse_id_set(&sub_json).context("parse achieved_sub")?,
        used_items: parse_id_set(&items_json).context("parse used_items")?,
        captured_at: DateTime::parse_from_rfc3339(&date_raw)
            .map(|dt| dt.with_timezone(&Utc))
            .context("parse review_date")?,
    }))
}

/// Fetch every saved snapshot (migration path).
pub fn all_reviews(conn: &Connection) -> Result<Vec<ReviewSnapshot>> {
    let mut stmt = conn
        .prepare("SELECT trip_id FROM trip_reviews ORDER BY trip_id")
        .context("prepare review list")?;
    let ids = stmt
        .query_map([], |row| row.get::<_, i64>(0))
        .context("query review ids")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("read review ids")?;

    let mut snapshots = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(snapshot) = fetch_review(conn, id)? {
            snapshots.push(snapshot);
        }
    }
    Ok(snapshots)
}

/// Insert or wholesale-replace the snapshot for a trip.
pub fn upsert_review(conn: &Connection, snapshot: &ReviewSnapshot) -> Result<()> {
    conn.execute(
        "INSERT INTO trip_reviews (trip_id, achieved_main, achieved_sub, used_items, review_date)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT (trip_id) DO UPDATE SET
             achieved_main = excluded.achieved_main,
             achieved_sub = excluded.achieved_sub,
             used_items = excluded.used_items,
             review_date = excluded.review_date",
        params![
            snapshot.trip_id,
            encode_id_set(&snapshot.achieved_main)?,
            encode_id_set(&snapshot.achieved_sub)?,
            encode_id_set(&snapshot.used_items)?,
            snapshot.captured_at.to_rfc3339(),
        ],
    )
    .context("upsert review snapshot")?;
    Ok(())
}

/// Delete a trip's snapshot. Missing rows are not an error.
pub fn delete_review(conn: &Connection, trip_id: i64) -> Result<()> {
    conn.execute("DELETE FROM trip_reviews WHERE trip_id = ?1", [trip_id])
        .context("delete review snapshot")?;
    Ok(())
}

/// Rewrite only the achieved-sub set of a stored snapshot (migration path).
pub fn update_review_achieved_sub(
    conn: &Connection,
    trip_id: i64,
    achieved_sub: &BTreeSet<String>,
) -> Result<()> {
    conn.execute(
        "UPDATE trip_reviews SET achieved_sub = ?1 WHERE trip_id = ?2",
        params![encode_id_set(achieved_sub)?, trip_id],
    )
    .context("update achieved_sub")?;
    Ok(())
}

fn parse_id_set(json: &str) -> Result<BTreeSet<String>> {
    // Older journals stored numeric ids as JSON numbers; accept both.
    let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let mut set = BTreeSet::new();
    for value in values {
        match value {
            serde_json::Value::String(s) => {
                set.insert(s);
            }
            serde_json::Value::Number(n) => {
                set.insert(n.to_string());
            }
            other => bail!("unexpected identifier value {other}"),
        }
    }
    Ok(set)
}

fn encode_id_set(set: &BTreeSet<String>) -> Result<String> {
    serde_json::to_string(set).context("encode identifier set")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
