//! `vj purpose` — attach travel purposes to a trip.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use vanlog_core::db::query::{self, CatalogRow};
use vanlog_core::store::RecordStore;

use crate::cmd::{self, Journal};
use crate::output::{OutputMode, render, render_success};

#[derive(Subcommand, Debug)]
pub enum PurposeCommand {
    /// Attach a catalog or custom purpose to a trip.
    Add(AddArgs),
    /// List a trip's planned purposes, or the catalog.
    List(ListArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Trip id.
    #[arg(long)]
    pub trip: i64,

    /// Catalog main purpose, by id or exact name.
    #[arg(long, conflicts_with_all = ["sub", "custom"])]
    pub main: Option<String>,

    /// Catalog sub purpose, by id or exact name.
    #[arg(long, conflicts_with = "custom")]
    pub sub: Option<String>,

    /// Free-text custom purpose for this trip.
    #[arg(long)]
    pub custom: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Trip id. Omit with --catalog to browse the shared catalog.
    #[arg(long, required_unless_present = "catalog")]
    pub trip: Option<i64>,

    /// List the shared purpose catalog instead of a trip's plan.
    #[arg(long)]
    pub catalog: bool,
}

/// Dispatch a `vj purpose` subcommand.
///
/// # Errors
///
/// Returns an error when the purpose cannot be resolved or storage fails.
pub fn run(command: &PurposeCommand, project_root: &Path, output: OutputMode) -> Result<()> {
    let journal = cmd::open_journal(project_root)?;
    match command {
        PurposeCommand::Add(args) => run_add(args, &journal, output),
        PurposeCommand::List(args) => run_list(args, &journal, output),
    }
}

/// Resolve a catalog reference that may be a row id or an exact name.
fn resolve_catalog(rows: &[CatalogRow], reference: &str, kind: &str) -> Result<i64> {
    if let Ok(id) = reference.parse::<i64>() {
        if rows.iter().any(|row| row.id == id) {
            return Ok(id);
        }
        bail!("no {kind} purpose with id {id}; see `vj purpose list --catalog`");
    }

    let trimmed = reference.trim();
    rows.iter()
        .find(|row| row.name == trimmed)
        .map(|row| row.id)
        .ok_or_else(|| {
            anyhow::anyhow!("no {kind} purpose named '{trimmed}'; see `vj purpose list --catalog`")
        })
}

fn run_add(args: &AddArgs, journal: &Journal, output: OutputMode) -> Result<()> {
    cmd::require_trip(&journal.store, args.trip)?;
    let conn = journal.store.connection();

    if let Some(reference) = &args.main {
        let id = resolve_catalog(&query::list_main_purposes(conn)?, reference, "main")?;
        query::attach_main_purpose(conn, args.trip, id)?;
        return render_success(output, &format!("Main purpose {id} added to trip {}", args.trip));
    }
    if let Some(reference) = &args.sub {
        let id = resolve_catalog(&query::list_sub_purposes(conn)?, reference, "sub")?;
        query::attach_sub_purpose(conn, args.trip, id)?;
        return render_success(output, &format!("Sub purpose {id} added to trip {}", args.trip));
    }
    if let Some(name) = &args.custom {
        query::attach_custom_purpose(conn, args.trip, name)?;
        return render_success(
            output,
            &format!("Custom purpose '{}' added to trip {}", name.trim(), args.trip),
        );
    }

    bail!("nothing to add: pass one of --main, --sub, or --custom");
}

#[derive(Serialize)]
struct PlannedRow {
    category: String,
    origin: String,
    name: String,
    raw_id: String,
}

#[derive(Serialize)]
struct CatalogListing {
    main: Vec<CatalogEntry>,
    sub: Vec<CatalogEntry>,
}

#[derive(Serialize)]
struct CatalogEntry {
    id: i64,
    name: String,
}

fn run_list(args: &ListArgs, journal: &Journal, output: OutputMode) -> Result<()> {
    let conn = journal.store.connection();

    if args.catalog {
        let listing = CatalogListing {
            main: query::list_main_purposes(conn)?
                .into_iter()
                .map(|row| CatalogEntry {
                    id: row.id,
                    name: row.name,
                })
                .collect(),
            sub: query::list_sub_purposes(conn)?
                .into_iter()
                .map(|row| CatalogEntry {
                    id: row.id,
                    name: row.name,
                })
                .collect(),
        };
        return render(output, &listing, |listing, w| {
            writeln!(w, "Main purposes:")?;
            for entry in &listing.main {
                writeln!(w, "  {:<3} {}", entry.id, entry.name)?;
            }
            writeln!(w, "Sub purposes:")?;
            for entry in &listing.sub {
                writeln!(w, "  {:<3} {}", entry.id, entry.name)?;
            }
            Ok(())
        });
    }

    let trip_id = args.trip.unwrap_or_default();
    cmd::require_trip(&journal.store, trip_id)?;
    let rows: Vec<PlannedRow> = journal
        .store
        .fetch_planned_purposes(trip_id)?
        .into_iter()
        .map(|p| PlannedRow {
            category: p.category.to_string(),
            origin: p.origin.to_string(),
            name: p.identity,
            raw_id: p.raw_id,
        })
        .collect();

    render(output, &rows, |rows, w| {
        if rows.is_empty() {
            return writeln!(w, "No purposes planned. Add one with `vj purpose add`.");
        }
        for row in rows {
            writeln!(w, "[{}/{}] {}", row.category, row.origin, row.name)?;
        }
        Ok(())
    })
}
