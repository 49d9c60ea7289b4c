//! Review pipeline: gather → assemble → reconcile → score.
//!
//! All I/O happens here, up front, through the [`RecordStore`] and
//! [`LocalCache`] collaborators; the reconcile/score steps below are pure.
//! Callers may recompute on every display without staleness concerns —
//! fresh inputs replace any notion of cache invalidation.

use anyhow::Result;
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

use vanlog_core::cache::checked_key;
use vanlog_core::model::purpose::{ChecklistItem, Origin};
use vanlog_core::model::snapshot::ReviewSnapshot;
use vanlog_core::model::trip::TripStatus;
use vanlog_core::store::{CustomEntry, LocalCache, RecordStore};

use crate::reconcile::{Plan, Progress, ProgressEntry, ReconciledState, reconcile};
use crate::score::{ScoreReport, score};

/// Contract violations from the review pipeline. Unlike data-quality
/// problems, these fail loudly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    #[error("trip {0} not found")]
    TripNotFound(i64),

    #[error("review is not available while trip {trip_id} is in planning")]
    NotAvailable { trip_id: i64, status: TripStatus },
}

/// The reconciled state and its score, computed together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub state: ReconciledState,
    pub report: ScoreReport,
}

/// Fetch a trip's plan: all planned purposes, plus the checklist the user
/// actually packed — recommended items restricted to the cache's checked
/// set, and the cache's custom items.
///
/// # Errors
///
/// Returns an error if the store or cache fails.
pub fn gather_plan(
    store: &dyn RecordStore,
    cache: &dyn LocalCache,
    trip_id: i64,
) -> Result<Plan> {
    let purposes = store.fetch_planned_purposes(trip_id)?;

    let main_ids = store.main_purpose_ids(trip_id)?;
    let recommended = store.fetch_planned_items(&main_ids)?;
    let checked: HashSet<String> = cache.read_checked(trip_id)?.into_iter().collect();

    let mut items: Vec<ChecklistItem> = recommended
        .into_iter()
        .filter(|item| checked.contains(&checked_key(&item.raw_id)))
        .collect();
    for entry in cache.read_custom_entries(trip_id)? {
        items.push(ChecklistItem::new(entry.id, &entry.name, Origin::Custom));
    }

    debug!(
        trip = trip_id,
        purposes = purposes.len(),
        items = items.len(),
        "gathered plan"
    );
    Ok(Plan { purposes, items })
}

/// Merge a prior snapshot with planning scratch state into one progress
/// view. The merge policy is a plain union: anything either source marked
/// counts.
///
/// Cache keys come back in their stored form (`item_<id>` or a raw custom
/// id); catalog keys are unwrapped and custom keys are re-paired with their
/// creation names so normalization can succeed.
#[must_use]
pub fn assemble_progress(
    snapshot: Option<&ReviewSnapshot>,
    checked: &[String],
    custom_items: &[CustomEntry],
) -> Progress {
    let mut progress = Progress::default();

    if let Some(snapshot) = snapshot {
        progress
            .achieved_main
            .extend(snapshot.achieved_main.iter().map(ProgressEntry::raw));
        progress
            .achieved_sub
            .extend(snapshot.achieved_sub.iter().map(ProgressEntry::raw));
        progress
            .used
            .extend(snapshot.used_items.iter().map(ProgressEntry::raw));
    }

    for key in checked {
        if let Some(raw_id) = key.strip_prefix("item_") {
            progress.used.push(ProgressEntry::raw(raw_id));
        } else if let Some(entry) = custom_items.iter().find(|entry| entry.id == *key) {
            progress
                .used
                .push(ProgressEntry::named(&entry.id, &entry.name));
        } else {
            // Stale custom key with no surviving entry; normalization will
            // drop it unless it is already canonical.
            progress.used.push(ProgressEntry::raw(key));
        }
    }

    progress
}

/// Run the full review pipeline for one trip.
///
/// # Errors
///
/// Returns [`ReviewError::TripNotFound`] for an unknown trip and
/// [`ReviewError::NotAvailable`] while the trip is still in planning;
/// storage failures propagate as-is.
pub fn review_trip(
    store: &dyn RecordStore,
    cache: &dyn LocalCache,
    trip_id: i64,
) -> Result<Review> {
    let trip = store
        .fetch_trip(trip_id)?
        .ok_or(ReviewError::TripNotFound(trip_id))?;
    if !trip.status.review_available() {
        return Err(ReviewError::NotAvailable {
            trip_id,
            status: trip.status,
        }
        .into());
    }

    let plan = gather_plan(store, cache, trip_id)?;
    let snapshot = store.fetch_review_snapshot(trip_id)?;
    let checked = cache.read_checked(trip_id)?;
    let custom_items = cache.read_custom_entries(trip_id)?;

    let progress = assemble_progress(snapshot.as_ref(), &checked, &custom_items);
    let state = reconcile(&plan, &progress);
    let report = score(&state);

    debug!(
        trip = trip_id,
        overall = report.overall_rate,
        dropped = state.dropped,
        "review computed"
    );
    Ok(Review { state, report })
}
