#![forbid(unsafe_code)]
//! vanlog-core library.
//!
//! Domain model, canonical-identifier normalization, configuration, and the
//! SQLite journal store for the vanlog travel journal.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums for recoverable domain errors,
//!   `anyhow::Result` with context at I/O boundaries.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `error!`, `debug!`).

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod ident;
pub mod migrate;
pub mod model;
pub mod store;

pub use cache::ScratchCache;
pub use error::ErrorCode;
pub use ident::{CanonicalId, IdentKind, NormalizeError, normalize};
pub use model::{
    Category, ChecklistItem, Origin, Purpose, ReviewSnapshot, RuleConfirmation, TravelRule, Trip,
    TripStatus,
};
pub use store::{CustomEntry, LocalCache, RecordStore, SqliteStore};
