//! `vj trip` — trip records and their lifecycle.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use vanlog_core::ErrorCode;
use vanlog_core::db::query;
use vanlog_core::model::rule::{all_required_confirmed, dedupe_rules};
use vanlog_core::model::trip::{
    DESTINATIONS, Trip, TripStatus, validate_dates, validate_destination, validate_title,
};
use vanlog_core::store::RecordStore;

use crate::cmd::{self, Journal};
use crate::output::{OutputMode, pretty_kv, pretty_rule, render, render_mode};

#[derive(Subcommand, Debug)]
pub enum TripCommand {
    /// Create a trip in planning state.
    Add(AddArgs),
    /// List all trips, most recent first.
    List,
    /// Show one trip with its planned purposes.
    Show(ShowArgs),
    /// Advance or set a trip's lifecycle status.
    Status(StatusArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Trip title (up to 100 characters).
    #[arg(long)]
    pub title: String,

    /// Destination region. Use `vj trip add --help` for the catalog.
    #[arg(long, long_help = destination_help())]
    pub destination: String,

    /// First day of the trip (YYYY-MM-DD).
    #[arg(long)]
    pub start: NaiveDate,

    /// Last day of the trip (YYYY-MM-DD), inclusive.
    #[arg(long)]
    pub end: NaiveDate,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Trip id.
    pub trip: i64,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Trip id.
    pub trip: i64,

    /// Target status (`planning`, `ongoing`, `completed`). Defaults to the
    /// next state in the forward flow.
    #[arg(long)]
    pub to: Option<String>,
}

fn destination_help() -> String {
    format!("Destination region, one of:\n  {}", DESTINATIONS.join("\n  "))
}

#[derive(Serialize)]
struct TripRow {
    id: i64,
    title: String,
    destination: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    status: TripStatus,
}

impl From<&Trip> for TripRow {
    fn from(trip: &Trip) -> Self {
        Self {
            id: trip.id,
            title: trip.title.clone(),
            destination: trip.destination.clone(),
            start_date: trip.start_date,
            end_date: trip.end_date,
            status: trip.status,
        }
    }
}

/// Dispatch a `vj trip` subcommand.
///
/// # Errors
///
/// Returns an error on validation failures or storage errors.
pub fn run(command: &TripCommand, project_root: &Path, output: OutputMode) -> Result<()> {
    let journal = cmd::open_journal(project_root)?;
    match command {
        TripCommand::Add(args) => run_add(args, &journal, output),
        TripCommand::List => run_list(&journal, output),
        TripCommand::Show(args) => run_show(args, &journal, output),
        TripCommand::Status(args) => run_status(args, &journal, output),
    }
}

fn run_add(args: &AddArgs, journal: &Journal, output: OutputMode) -> Result<()> {
    let title = validate_title(&args.title)
        .with_context(|| ErrorCode::InvalidTripInput.message().to_string())?;
    let destination = validate_destination(&args.destination)
        .with_context(|| ErrorCode::InvalidTripInput.message().to_string())?;
    validate_dates(args.start, args.end)
        .with_context(|| ErrorCode::InvalidTripInput.message().to_string())?;

    let conn = journal.store.connection();
    if let Some(existing) = query::overlapping_trip_title(conn, args.start, args.end, None)? {
        bail!(
            "{}: dates overlap existing trip '{existing}'",
            ErrorCode::InvalidTripInput.code()
        );
    }

    let trip_id = query::insert_trip(conn, &title, destination, args.start, args.end)?;
    let trip = cmd::require_trip(&journal.store, trip_id)?;
    tracing::info!(trip = trip_id, %title, "trip created");

    render(output, &TripRow::from(&trip), |row, w| {
        writeln!(
            w,
            "✓ Trip {} created: {} ({} {} → {})",
            row.id, row.title, row.destination, row.start_date, row.end_date
        )
    })
}

fn run_list(journal: &Journal, output: OutputMode) -> Result<()> {
    let rows: Vec<TripRow> = journal
        .store
        .list_trips()?
        .iter()
        .map(TripRow::from)
        .collect();

    render_mode(
        output,
        &rows,
        |rows, w| {
            writeln!(w, "ID  STATUS     START       END         TITLE")?;
            for row in rows {
                writeln!(
                    w,
                    "{:<3} {:<10} {}  {}  {}",
                    row.id, row.status.to_string(), row.start_date, row.end_date, row.title
                )?;
            }
            Ok(())
        },
        |rows, w| {
            if rows.is_empty() {
                return writeln!(w, "No trips yet. Create one with `vj trip add`.");
            }
            for row in rows {
                writeln!(
                    w,
                    "[{}] {} — {} ({} → {}, {})",
                    row.id, row.title, row.destination, row.start_date, row.end_date, row.status
                )?;
            }
            Ok(())
        },
    )
}

#[derive(Serialize)]
struct TripDetail {
    #[serde(flatten)]
    trip: TripRow,
    purposes: Vec<PurposeRow>,
    has_review: bool,
}

#[derive(Serialize)]
struct PurposeRow {
    category: String,
    origin: String,
    name: String,
}

fn run_show(args: &ShowArgs, journal: &Journal, output: OutputMode) -> Result<()> {
    let trip = cmd::require_trip(&journal.store, args.trip)?;
    let purposes = journal
        .store
        .fetch_planned_purposes(args.trip)?
        .iter()
        .map(|p| PurposeRow {
            category: p.category.to_string(),
            origin: p.origin.to_string(),
            name: p.identity.clone(),
        })
        .collect();
    let has_review = journal.store.fetch_review_snapshot(args.trip)?.is_some();

    let detail = TripDetail {
        trip: TripRow::from(&trip),
        purposes,
        has_review,
    };
    render(output, &detail, |detail, w| {
        writeln!(w, "Trip {}", detail.trip.id)?;
        pretty_rule(w)?;
        pretty_kv(w, "Title", &detail.trip.title)?;
        pretty_kv(w, "Destination", &detail.trip.destination)?;
        pretty_kv(
            w,
            "Dates",
            format!("{} → {}", detail.trip.start_date, detail.trip.end_date),
        )?;
        pretty_kv(w, "Status", detail.trip.status.to_string())?;
        pretty_kv(w, "Reviewed", if detail.has_review { "yes" } else { "no" })?;
        if !detail.purposes.is_empty() {
            writeln!(w)?;
            writeln!(w, "Purposes")?;
            pretty_rule(w)?;
            for purpose in &detail.purposes {
                writeln!(w, "  [{}/{}] {}", purpose.category, purpose.origin, purpose.name)?;
            }
        }
        Ok(())
    })
}

#[derive(Serialize)]
struct StatusReport {
    trip: i64,
    from: TripStatus,
    to: TripStatus,
    unconfirmed_required_rules: usize,
}

fn run_status(args: &StatusArgs, journal: &Journal, output: OutputMode) -> Result<()> {
    let trip = cmd::require_trip(&journal.store, args.trip)?;

    let target = match &args.to {
        Some(raw) => TripStatus::from_str(raw)
            .map_err(|e| anyhow::anyhow!("{}: {e}", ErrorCode::InvalidStatusTransition.code()))?,
        None => trip.status.next(),
    };
    trip.status
        .can_transition_to(target)
        .map_err(|e| anyhow::anyhow!("{}: {e}", ErrorCode::InvalidStatusTransition.code()))?;

    // Starting a trip with unconfirmed required rules is advisory, not a
    // hard failure.
    let mut unconfirmed = 0;
    if trip.status == TripStatus::Planning && target == TripStatus::Ongoing {
        let main_ids = journal.store.main_purpose_ids(args.trip)?;
        let rules = dedupe_rules(journal.store.fetch_rules(&main_ids)?);
        let confirmations = journal.store.fetch_confirmations(args.trip)?;
        if !all_required_confirmed(&rules, &confirmations) {
            let confirmed: std::collections::HashSet<i64> = confirmations
                .iter()
                .filter(|c| c.confirmed)
                .map(|c| c.rule_id)
                .collect();
            unconfirmed = rules
                .iter()
                .filter(|rule| rule.required && !confirmed.contains(&rule.id))
                .count();
            if journal.config.rules.warn_unconfirmed {
                eprintln!(
                    "warning: {unconfirmed} required rule(s) unconfirmed; see `vj rules list --trip {}`",
                    args.trip
                );
            }
        }
    }

    journal.store.update_trip_status(args.trip, target)?;
    tracing::info!(trip = args.trip, from = %trip.status, to = %target, "status changed");

    let report = StatusReport {
        trip: args.trip,
        from: trip.status,
        to: target,
        unconfirmed_required_rules: unconfirmed,
    };
    render(output, &report, |report, w| {
        writeln!(w, "✓ Trip {}: {} → {}", report.trip, report.from, report.to)
    })
}
