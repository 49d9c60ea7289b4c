#![forbid(unsafe_code)]
//! vanlog-review library.
//!
//! The trip-review engine: merges a trip's plan with recorded progress
//! (deduplicating by semantic identity) and scores the result. Storage is
//! reached only through the `vanlog-core` collaborator traits, so the
//! pipeline is testable against in-memory fakes.
//!
//! # Conventions
//!
//! - **Errors**: `anyhow::Result` at the pipeline boundary, typed
//!   `thiserror` enums for contract violations.
//! - **Logging**: `tracing` macros (`debug!` for per-entry decisions).

pub mod pipeline;
pub mod reconcile;
pub mod score;

pub use pipeline::{Review, ReviewError, assemble_progress, gather_plan, review_trip};
pub use reconcile::{Plan, Progress, ProgressEntry, ReconciledState, reconcile};
pub use score::{ScoreReport, score};
