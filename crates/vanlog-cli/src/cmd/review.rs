//! `vj review` — self-review a trip against its plan.
//!
//! `show` recomputes the score from fresh inputs on every call; `save`
//! resolves the user's selections against the plan and persists the
//! snapshot wholesale (there are no partial updates).

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use vanlog_core::ErrorCode;
use vanlog_core::model::purpose::{Category, ChecklistItem, Purpose};
use vanlog_core::model::snapshot::ReviewSnapshot;
use vanlog_core::store::{LocalCache, RecordStore};
use vanlog_review::{Review, ScoreReport, gather_plan, review_trip};

use crate::cmd::{self, Journal};
use crate::output::{OutputMode, pretty_kv, pretty_rule, render, render_success};

#[derive(Subcommand, Debug)]
pub enum ReviewCommand {
    /// Compute and display the trip's achievement score.
    Show(TripRef),
    /// Persist a review snapshot from the given selections.
    Save(SaveArgs),
    /// Delete the trip's review snapshot.
    Reset(ResetArgs),
}

#[derive(Args, Debug)]
pub struct TripRef {
    /// Trip id.
    #[arg(long)]
    pub trip: i64,
}

#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Trip id.
    #[arg(long)]
    pub trip: i64,

    /// Also drop the planning scratch state (checked and custom items).
    #[arg(long)]
    pub scratch: bool,
}

#[derive(Args, Debug)]
pub struct SaveArgs {
    /// Trip id.
    #[arg(long)]
    pub trip: i64,

    /// Achieved main purpose, by catalog id or exact name. Repeatable.
    #[arg(long = "main")]
    pub main: Vec<String>,

    /// Achieved sub purpose, by catalog id or exact name. Repeatable.
    #[arg(long = "sub")]
    pub sub: Vec<String>,

    /// Used checklist item, by id or exact name. Repeatable.
    #[arg(long = "item")]
    pub item: Vec<String>,
}

/// Dispatch a `vj review` subcommand.
///
/// # Errors
///
/// Returns an error when review is unavailable for the trip, a selection
/// cannot be resolved, or storage fails.
pub fn run(command: &ReviewCommand, project_root: &Path, output: OutputMode) -> Result<()> {
    let journal = cmd::open_journal(project_root)?;
    match command {
        ReviewCommand::Show(args) => run_show(args, &journal, output),
        ReviewCommand::Save(args) => run_save(args, &journal, output),
        ReviewCommand::Reset(args) => run_reset(args, &journal, output),
    }
}

#[derive(Serialize)]
struct ReviewView {
    trip: i64,
    #[serde(flatten)]
    report: ScoreReport,
    dropped: usize,
}

fn render_review(trip_id: i64, review: &Review, output: OutputMode) -> Result<()> {
    let view = ReviewView {
        trip: trip_id,
        report: review.report,
        dropped: review.state.dropped,
    };
    render(output, &view, |view, w| {
        writeln!(w, "Trip {} review", view.trip)?;
        pretty_rule(w)?;
        pretty_kv(
            w,
            "Main",
            format!(
                "{}/{} ({}%)",
                view.report.main_achieved, view.report.main_total, view.report.main_rate
            ),
        )?;
        pretty_kv(
            w,
            "Sub",
            format!(
                "{}/{} ({}%)",
                view.report.sub_achieved, view.report.sub_total, view.report.sub_rate
            ),
        )?;
        pretty_kv(
            w,
            "Items",
            format!(
                "{}/{} ({}%)",
                view.report.items_used, view.report.items_total, view.report.items_rate
            ),
        )?;
        pretty_rule(w)?;
        if view.report.scoreable {
            pretty_kv(w, "Overall", format!("{}%", view.report.overall_rate))?;
        } else {
            writeln!(w, "No purposes planned; nothing to score.")?;
        }
        if view.dropped > 0 {
            writeln!(
                w,
                "note: {} progress entr{} could not be matched (see `vj migrate`)",
                view.dropped,
                if view.dropped == 1 { "y" } else { "ies" }
            )?;
        }
        Ok(())
    })
}

fn run_show(args: &TripRef, journal: &Journal, output: OutputMode) -> Result<()> {
    let review = review_trip(&journal.store, &journal.cache, args.trip)?;
    render_review(args.trip, &review, output)
}

/// Resolve a selection token against planned purposes of one category.
fn resolve_purpose<'a>(
    purposes: &'a [Purpose],
    category: Category,
    token: &str,
) -> Result<&'a Purpose> {
    let trimmed = token.trim();
    purposes
        .iter()
        .filter(|p| p.category == category)
        .find(|p| p.raw_id == trimmed || p.identity == trimmed)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "no planned {category} purpose '{trimmed}'; see `vj purpose list`"
            )
        })
}

/// Resolve a selection token against the trip's checklist.
fn resolve_item<'a>(items: &'a [ChecklistItem], token: &str) -> Result<&'a ChecklistItem> {
    let trimmed = token.trim();
    items
        .iter()
        .find(|item| item.raw_id == trimmed || item.identity == trimmed)
        .ok_or_else(|| anyhow::anyhow!("no checklist item '{trimmed}'; see `vj items list`"))
}

fn run_save(args: &SaveArgs, journal: &Journal, output: OutputMode) -> Result<()> {
    let trip = cmd::require_trip(&journal.store, args.trip)?;
    if !trip.status.review_available() {
        bail!(
            "{}: trip {} is still in planning",
            ErrorCode::ReviewNotAvailable.code(),
            args.trip
        );
    }

    let plan = gather_plan(&journal.store, &journal.cache, args.trip)?;

    let mut snapshot = ReviewSnapshot::new(args.trip);
    for token in &args.main {
        let purpose = resolve_purpose(&plan.purposes, Category::Main, token)?;
        snapshot
            .achieved_main
            .insert(purpose.canonical()?.as_str().to_string());
    }
    for token in &args.sub {
        let purpose = resolve_purpose(&plan.purposes, Category::Sub, token)?;
        snapshot
            .achieved_sub
            .insert(purpose.canonical()?.as_str().to_string());
    }
    for token in &args.item {
        let item = resolve_item(&plan.items, token)?;
        snapshot
            .used_items
            .insert(item.canonical()?.as_str().to_string());
    }

    journal
        .store
        .save_review_snapshot(&snapshot)
        .context(ErrorCode::SnapshotWriteFailed.message())?;
    tracing::info!(trip = args.trip, "review snapshot saved");

    let review = review_trip(&journal.store, &journal.cache, args.trip)?;
    render_review(args.trip, &review, output)
}

fn run_reset(args: &ResetArgs, journal: &Journal, output: OutputMode) -> Result<()> {
    cmd::require_trip(&journal.store, args.trip)?;
    journal.store.delete_review_snapshot(args.trip)?;
    if args.scratch {
        journal.cache.clear_trip(args.trip)?;
    }
    render_success(output, &format!("Review reset for trip {}", args.trip))
}
