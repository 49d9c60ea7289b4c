//! `vj migrate` — rewrite legacy custom ids in stored snapshots.

use anyhow::Result;
use clap::Args;
use std::io::Write;
use std::path::Path;

use vanlog_core::migrate::migrate_snapshot_ids;

use crate::cmd;
use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct MigrateArgs {}

/// Execute `vj migrate`. Safe to re-run; already-canonical snapshots are
/// untouched.
///
/// # Errors
///
/// Returns an error if reading or writing snapshots fails.
pub fn run_migrate(_args: &MigrateArgs, project_root: &Path, output: OutputMode) -> Result<()> {
    let journal = cmd::open_journal(project_root)?;
    let report = migrate_snapshot_ids(journal.store.connection())?;

    render(output, &report, |report, w| {
        writeln!(
            w,
            "✓ Migration finished: {} legacy entr{} scanned, {} rewritten, {} kept as-is",
            report.scanned,
            if report.scanned == 1 { "y" } else { "ies" },
            report.rewritten,
            report.skipped
        )
    })
}
