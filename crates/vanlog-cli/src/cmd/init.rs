//! `vj init` — initialize a journal in the current directory.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use vanlog_core::config::{self, VANLOG_DIR};
use vanlog_core::db::{self, migrations, seed};

use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Load the starter purpose/item/rule catalog.
    #[arg(long)]
    pub seed: bool,

    /// Re-initialize even if `.vanlog/` already exists.
    #[arg(long)]
    pub force: bool,
}

const CONFIG_TOML: &str = "[review]\n\
    auto_save = true\n\
    \n\
    [rules]\n\
    warn_unconfirmed = true\n";

const GITIGNORE: &str = "journal.db\njournal.db-wal\njournal.db-shm\nscratch.json\n";

#[derive(Serialize)]
struct InitReport {
    journal: String,
    schema_version: u32,
    seeded: bool,
}

/// Execute `vj init`. Creates the journal skeleton:
///
/// ```text
/// .vanlog/
///   journal.db      (SQLite database, migrated to the latest schema)
///   config.toml     (default project config template)
///   .gitignore      (database and scratch cache are derived state)
/// ```
///
/// # Errors
///
/// Returns an error if `.vanlog/` already exists and `--force` is not set,
/// or if any filesystem or database operation fails.
pub fn run_init(args: &InitArgs, project_root: &Path, output: OutputMode) -> Result<()> {
    let vanlog_dir = project_root.join(VANLOG_DIR);
    if vanlog_dir.exists() && !args.force {
        anyhow::bail!(".vanlog/ already exists. Use `vj init --force` to reinitialize.");
    }

    std::fs::create_dir_all(&vanlog_dir)
        .with_context(|| format!("create {}", vanlog_dir.display()))?;

    let db_path = config::journal_db_path(project_root);
    let conn = db::open_journal(&db_path)?;
    let schema_version = migrations::current_schema_version(&conn).context("read schema version")?;

    if args.seed {
        seed::seed_catalog(&conn).context("seed catalog")?;
    }

    let config_path = config::project_config_path(project_root);
    if !config_path.exists() || args.force {
        std::fs::write(&config_path, CONFIG_TOML)
            .with_context(|| format!("write config {}", config_path.display()))?;
    }

    let gitignore_path = vanlog_dir.join(".gitignore");
    std::fs::write(&gitignore_path, GITIGNORE)
        .with_context(|| format!("write {}", gitignore_path.display()))?;

    let report = InitReport {
        journal: db_path.display().to_string(),
        schema_version,
        seeded: args.seed,
    };
    render(output, &report, |r, w| {
        writeln!(w, "✓ Initialized .vanlog/ journal (schema v{})", r.schema_version)?;
        if r.seeded {
            writeln!(w, "  Catalog seeded: purposes, items, and rules are ready.")?;
        }
        writeln!(w)?;
        writeln!(w, "Next steps:")?;
        writeln!(w, "  vj trip add --title \"...\" --destination Kanto \\")?;
        writeln!(w, "      --start 2026-05-01 --end 2026-05-03")?;
        writeln!(w, "  vj purpose add --trip 1 --main Hiking")
    })
}
