//! `vj rules` — destination rules and per-trip confirmations.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use vanlog_core::model::rule::{all_required_confirmed, dedupe_rules};
use vanlog_core::store::RecordStore;

use crate::cmd::{self, Journal};
use crate::output::{OutputMode, render, render_success};

#[derive(Subcommand, Debug)]
pub enum RulesCommand {
    /// List the trip's rules with confirmation state.
    List(TripRef),
    /// Confirm (or revoke) one rule for a trip.
    Confirm(ConfirmArgs),
}

#[derive(Args, Debug)]
pub struct TripRef {
    /// Trip id.
    #[arg(long)]
    pub trip: i64,
}

#[derive(Args, Debug)]
pub struct ConfirmArgs {
    /// Trip id.
    #[arg(long)]
    pub trip: i64,

    /// Rule id, as shown by `vj rules list`.
    pub rule: i64,

    /// Withdraw a previous confirmation instead.
    #[arg(long)]
    pub revoke: bool,
}

/// Dispatch a `vj rules` subcommand.
///
/// # Errors
///
/// Returns an error when the rule does not apply to the trip or storage
/// fails.
pub fn run(command: &RulesCommand, project_root: &Path, output: OutputMode) -> Result<()> {
    let journal = cmd::open_journal(project_root)?;
    match command {
        RulesCommand::List(args) => run_list(args, &journal, output),
        RulesCommand::Confirm(args) => run_confirm(args, &journal, output),
    }
}

#[derive(Serialize)]
struct RuleRow {
    id: i64,
    category: String,
    title: String,
    description: String,
    required: bool,
    confirmed: bool,
}

#[derive(Serialize)]
struct RulesReport {
    rules: Vec<RuleRow>,
    all_required_confirmed: bool,
}

fn trip_rules(journal: &Journal, trip_id: i64) -> Result<RulesReport> {
    let main_ids = journal.store.main_purpose_ids(trip_id)?;
    let rules = dedupe_rules(journal.store.fetch_rules(&main_ids)?);
    let confirmations = journal.store.fetch_confirmations(trip_id)?;
    let confirmed: HashMap<i64, bool> = confirmations
        .iter()
        .map(|c| (c.rule_id, c.confirmed))
        .collect();

    let all_confirmed = all_required_confirmed(&rules, &confirmations);
    Ok(RulesReport {
        rules: rules
            .into_iter()
            .map(|rule| RuleRow {
                confirmed: confirmed.get(&rule.id).copied().unwrap_or(false),
                id: rule.id,
                category: rule.category,
                title: rule.title,
                description: rule.description,
                required: rule.required,
            })
            .collect(),
        all_required_confirmed: all_confirmed,
    })
}

fn run_list(args: &TripRef, journal: &Journal, output: OutputMode) -> Result<()> {
    cmd::require_trip(&journal.store, args.trip)?;
    let report = trip_rules(journal, args.trip)?;

    render(output, &report, |report, w| {
        if report.rules.is_empty() {
            return writeln!(w, "No rules apply; attach a main purpose first.");
        }
        let mut current_category = "";
        for rule in &report.rules {
            if rule.category != current_category {
                writeln!(w, "{}:", rule.category)?;
                current_category = &rule.category;
            }
            let mark = if rule.confirmed { "x" } else { " " };
            let badge = if rule.required { " (required)" } else { "" };
            writeln!(w, "  [{mark}] {:<3} {}{badge}", rule.id, rule.title)?;
            writeln!(w, "        {}", rule.description)?;
        }
        writeln!(w)?;
        if report.all_required_confirmed {
            writeln!(w, "All required rules confirmed.")
        } else {
            writeln!(w, "Required rules are still unconfirmed.")
        }
    })
}

fn run_confirm(args: &ConfirmArgs, journal: &Journal, output: OutputMode) -> Result<()> {
    cmd::require_trip(&journal.store, args.trip)?;

    let report = trip_rules(journal, args.trip)?;
    if !report.rules.iter().any(|rule| rule.id == args.rule) {
        bail!(
            "rule {} does not apply to trip {}; see `vj rules list`",
            args.rule,
            args.trip
        );
    }

    journal
        .store
        .set_confirmation(args.trip, args.rule, !args.revoke)?;
    let verb = if args.revoke { "revoked" } else { "confirmed" };
    render_success(output, &format!("Rule {} {verb}", args.rule))
}
