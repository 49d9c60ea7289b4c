//! Command handlers for the `vj` binary, one module per subcommand group.

pub mod init;
pub mod items;
pub mod migrate;
pub mod purpose;
pub mod review;
pub mod rules;
pub mod trip;

use anyhow::{Context, Result, anyhow, bail};
use std::path::Path;

use vanlog_core::config::{self, ProjectConfig};
use vanlog_core::model::trip::Trip;
use vanlog_core::store::RecordStore;
use vanlog_core::{ErrorCode, ScratchCache, SqliteStore};

/// An opened journal: record store, scratch cache, and project config.
pub struct Journal {
    pub store: SqliteStore,
    pub cache: ScratchCache,
    pub config: ProjectConfig,
}

/// Open the journal under `project_root`, failing with the standard
/// not-initialized hint when `vj init` has not been run there.
pub fn open_journal(project_root: &Path) -> Result<Journal> {
    let db_path = config::journal_db_path(project_root);
    if !db_path.exists() {
        bail!(
            "{}: no journal at {}. {}",
            ErrorCode::NotInitialized.code(),
            db_path.display(),
            ErrorCode::NotInitialized.hint().unwrap_or_default(),
        );
    }

    Ok(Journal {
        store: SqliteStore::open(&db_path)
            .with_context(|| format!("open journal {}", db_path.display()))?,
        cache: ScratchCache::at_root(project_root),
        config: config::load_project_config(project_root)?,
    })
}

/// Fetch a trip or fail with the standard not-found message.
pub fn require_trip(store: &dyn RecordStore, trip_id: i64) -> Result<Trip> {
    store.fetch_trip(trip_id)?.ok_or_else(|| {
        anyhow!(
            "{}: trip {trip_id} not found",
            ErrorCode::TripNotFound.code()
        )
    })
}
