//! `vj items` — the packing checklist for a trip.
//!
//! Recommended items follow the trip's main purposes; check state and
//! custom items live in the scratch cache until a review snapshot is saved.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use vanlog_core::cache::checked_key;
use vanlog_core::ident::{self, IdentKind};
use vanlog_core::model::purpose::Origin;
use vanlog_core::store::{CustomEntry, LocalCache, RecordStore};

use crate::cmd::{self, Journal};
use crate::output::{OutputMode, render, render_success};

#[derive(Subcommand, Debug)]
pub enum ItemsCommand {
    /// List recommended and custom items with their check state.
    List(TripRef),
    /// Mark an item as packed.
    Check(ItemRef),
    /// Unmark a packed item.
    Uncheck(ItemRef),
    /// Add a custom item (created checked).
    Add(AddArgs),
}

#[derive(Args, Debug)]
pub struct TripRef {
    /// Trip id.
    #[arg(long)]
    pub trip: i64,
}

#[derive(Args, Debug)]
pub struct ItemRef {
    /// Trip id.
    #[arg(long)]
    pub trip: i64,

    /// Item to toggle, by catalog id or exact name.
    pub item: String,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Trip id.
    #[arg(long)]
    pub trip: i64,

    /// Name of the custom item.
    pub name: String,
}

/// Dispatch a `vj items` subcommand.
///
/// # Errors
///
/// Returns an error when the item cannot be resolved or storage fails.
pub fn run(command: &ItemsCommand, project_root: &Path, output: OutputMode) -> Result<()> {
    let journal = cmd::open_journal(project_root)?;
    match command {
        ItemsCommand::List(args) => run_list(args, &journal, output),
        ItemsCommand::Check(args) => run_toggle(args, &journal, output, true),
        ItemsCommand::Uncheck(args) => run_toggle(args, &journal, output, false),
        ItemsCommand::Add(args) => run_add(args, &journal, output),
    }
}

#[derive(Serialize)]
struct ItemRow {
    raw_id: String,
    name: String,
    origin: String,
    checked: bool,
}

fn listing(journal: &Journal, trip_id: i64) -> Result<Vec<ItemRow>> {
    let main_ids = journal.store.main_purpose_ids(trip_id)?;
    let recommended = journal.store.fetch_planned_items(&main_ids)?;
    let custom = journal.cache.read_custom_entries(trip_id)?;
    let checked: HashSet<String> = journal.cache.read_checked(trip_id)?.into_iter().collect();

    let mut rows: Vec<ItemRow> = recommended
        .into_iter()
        .map(|item| ItemRow {
            checked: checked.contains(&checked_key(&item.raw_id)),
            name: item.identity,
            origin: Origin::Catalog.to_string(),
            raw_id: item.raw_id,
        })
        .collect();
    for entry in custom {
        rows.push(ItemRow {
            checked: checked.contains(&checked_key(&entry.id)),
            name: entry.name,
            origin: Origin::Custom.to_string(),
            raw_id: entry.id,
        });
    }
    Ok(rows)
}

fn run_list(args: &TripRef, journal: &Journal, output: OutputMode) -> Result<()> {
    cmd::require_trip(&journal.store, args.trip)?;
    let rows = listing(journal, args.trip)?;

    render(output, &rows, |rows, w| {
        if rows.is_empty() {
            return writeln!(
                w,
                "No items yet. Attach a main purpose or add one with `vj items add`."
            );
        }
        for row in rows {
            let mark = if row.checked { "x" } else { " " };
            writeln!(w, "[{mark}] {} ({})", row.name, row.origin)?;
        }
        Ok(())
    })
}

fn run_toggle(args: &ItemRef, journal: &Journal, output: OutputMode, checked: bool) -> Result<()> {
    cmd::require_trip(&journal.store, args.trip)?;
    let rows = listing(journal, args.trip)?;

    let reference = args.item.trim();
    let Some(row) = rows
        .iter()
        .find(|row| row.raw_id == reference || row.name == reference)
    else {
        bail!("no item '{reference}' on trip {}; see `vj items list`", args.trip);
    };

    let key = checked_key(&row.raw_id);
    let mut keys: Vec<String> = journal.cache.read_checked(args.trip)?;
    if checked {
        if !keys.contains(&key) {
            keys.push(key);
        }
    } else {
        keys.retain(|existing| *existing != key);
    }
    journal.cache.write_checked(args.trip, &keys)?;

    // With auto-save on, an existing review snapshot follows the toggle.
    if journal.config.review.auto_save {
        sync_snapshot_usage(journal, args.trip, row, checked)?;
    }

    let verb = if checked { "checked" } else { "unchecked" };
    render_success(output, &format!("{} {verb}", row.name))
}

fn sync_snapshot_usage(
    journal: &Journal,
    trip_id: i64,
    row: &ItemRow,
    checked: bool,
) -> Result<()> {
    let Some(mut snapshot) = journal.store.fetch_review_snapshot(trip_id)? else {
        return Ok(());
    };
    let Ok(canonical) = ident::normalize(&row.raw_id, Some(&row.name), IdentKind::Item) else {
        return Ok(());
    };

    let changed = if checked {
        snapshot.used_items.insert(canonical.as_str().to_string())
    } else {
        snapshot.used_items.remove(canonical.as_str())
    };
    if changed {
        snapshot.captured_at = chrono::Utc::now();
        journal.store.save_review_snapshot(&snapshot)?;
        tracing::debug!(trip = trip_id, item = %canonical, checked, "snapshot usage synced");
    }
    Ok(())
}

fn run_add(args: &AddArgs, journal: &Journal, output: OutputMode) -> Result<()> {
    cmd::require_trip(&journal.store, args.trip)?;
    let name = args.name.trim();
    if name.is_empty() {
        bail!("custom item name must not be empty");
    }

    let mut entries = journal.cache.read_custom_entries(args.trip)?;
    if entries.iter().any(|entry| entry.name == name) {
        bail!("custom item '{name}' already exists on trip {}", args.trip);
    }

    // Client-generated id, stable only within this journal; review matching
    // goes through the name.
    let id = format!("custom_{}", chrono::Utc::now().timestamp_millis());
    entries.push(CustomEntry {
        id: id.clone(),
        name: name.to_string(),
    });
    journal.cache.write_custom_entries(args.trip, &entries)?;

    let mut keys = journal.cache.read_checked(args.trip)?;
    keys.push(checked_key(&id));
    journal.cache.write_checked(args.trip, &keys)?;

    render_success(output, &format!("Custom item '{name}' added and checked"))
}
