//! Plan/progress reconciliation.
//!
//! The journal sees a trip's plan and its recorded progress at different
//! times, through different identifier shapes, and with expected upstream
//! duplication. Reconciliation produces one consistent answer:
//!
//! 1. deduplicate the plan by semantic identity (name), first row wins
//! 2. normalize every progress identifier to canonical form, dropping and
//!    counting the unusable ones
//! 3. intersect plan and progress per category
//!
//! Data-quality problems never fail the whole review; only the affected
//! entries are dropped. The function is pure: same inputs, same output.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use vanlog_core::ident::{CanonicalId, IdentKind};
use vanlog_core::model::purpose::{Category, ChecklistItem, Purpose};

/// One progress identifier awaiting normalization: the raw id the store or
/// cache produced, plus the name it was created under when the caller still
/// knows it. Timestamp-shaped custom ids without a name cannot be
/// normalized and are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub raw_id: String,
    pub name: Option<String>,
}

impl ProgressEntry {
    /// Entry with no name context (snapshot reads).
    #[must_use]
    pub fn raw(raw_id: impl Into<String>) -> Self {
        Self {
            raw_id: raw_id.into(),
            name: None,
        }
    }

    /// Entry that still carries its creation name (cache reads).
    #[must_use]
    pub fn named(raw_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            raw_id: raw_id.into(),
            name: Some(name.into()),
        }
    }
}

/// A trip's planned purposes and checklist items, as fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub purposes: Vec<Purpose>,
    pub items: Vec<ChecklistItem>,
}

/// Recorded progress, split the way snapshots store it: achievements are
/// scoped by category because main and sub catalog ids occupy separate
/// numeric id spaces and may collide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub achieved_main: Vec<ProgressEntry>,
    pub achieved_sub: Vec<ProgressEntry>,
    pub used: Vec<ProgressEntry>,
}

/// The reconciled view the scorer consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledState {
    pub main_achieved: Vec<Purpose>,
    pub sub_achieved: Vec<Purpose>,
    pub items_used: Vec<ChecklistItem>,
    pub main_total: usize,
    pub sub_total: usize,
    pub items_total: usize,
    /// Progress entries dropped because they could not be normalized.
    pub dropped: usize,
}

/// A deduplicated plan row plus the canonical ids of every raw row that
/// shares its identity. Matching against any alias marks the unit.
struct PlanUnit<T> {
    entry: T,
    aliases: Vec<CanonicalId>,
}

/// Merge a trip's plan with recorded progress.
///
/// Duplicate plan rows are collapsed silently (first occurrence keeps its
/// raw id); progress entries that fail normalization are dropped and
/// counted in [`ReconciledState::dropped`]. Never fails on data quality.
#[must_use]
pub fn reconcile(plan: &Plan, progress: &Progress) -> ReconciledState {
    let mut dropped = 0;

    let main_units = dedupe_purposes(&plan.purposes, Category::Main);
    let sub_units = dedupe_purposes(&plan.purposes, Category::Sub);
    let item_units = dedupe_items(&plan.items);

    let achieved_main = normalize_set(&progress.achieved_main, IdentKind::Purpose, &mut dropped);
    let achieved_sub = normalize_set(&progress.achieved_sub, IdentKind::Purpose, &mut dropped);
    let used = normalize_set(&progress.used, IdentKind::Item, &mut dropped);

    let main_total = main_units.len();
    let sub_total = sub_units.len();
    let items_total = item_units.len();

    ReconciledState {
        main_achieved: intersect(main_units, &achieved_main),
        sub_achieved: intersect(sub_units, &achieved_sub),
        items_used: intersect(item_units, &used),
        main_total,
        sub_total,
        items_total,
        dropped,
    }
}

/// Deduplicate one category's purposes by identity, first occurrence wins.
fn dedupe_purposes(purposes: &[Purpose], category: Category) -> Vec<PlanUnit<Purpose>> {
    let mut order: Vec<PlanUnit<Purpose>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for purpose in purposes.iter().filter(|p| p.category == category) {
        let alias = match purpose.canonical() {
            Ok(id) => id,
            Err(error) => {
                // Plan rows come from our own store; an unnamed custom row
                // here is corrupt and can never be marked achieved.
                debug!(%error, raw_id = %purpose.raw_id, "unmatchable plan purpose");
                continue;
            }
        };

        if let Some(&at) = index.get(purpose.identity.as_str()) {
            order[at].aliases.push(alias);
        } else {
            index.insert(&purpose.identity, order.len());
            order.push(PlanUnit {
                entry: purpose.clone(),
                aliases: vec![alias],
            });
        }
    }
    order
}

/// Deduplicate checklist items by identity, first occurrence wins. Later
/// raw ids become aliases of the kept row, so marking any of them used
/// marks the unit.
fn dedupe_items(items: &[ChecklistItem]) -> Vec<PlanUnit<ChecklistItem>> {
    let mut order: Vec<PlanUnit<ChecklistItem>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for item in items {
        let alias = match item.canonical() {
            Ok(id) => id,
            Err(error) => {
                debug!(%error, raw_id = %item.raw_id, "unmatchable plan item");
                continue;
            }
        };

        if let Some(&at) = index.get(item.identity.as_str()) {
            order[at].aliases.push(alias);
        } else {
            index.insert(&item.identity, order.len());
            order.push(PlanUnit {
                entry: item.clone(),
                aliases: vec![alias],
            });
        }
    }
    order
}

/// Normalize progress entries into a canonical-id set, dropping failures.
fn normalize_set(
    entries: &[ProgressEntry],
    kind: IdentKind,
    dropped: &mut usize,
) -> HashSet<CanonicalId> {
    let mut set = HashSet::with_capacity(entries.len());
    for entry in entries {
        match vanlog_core::ident::normalize(&entry.raw_id, entry.name.as_deref(), kind) {
            Ok(id) => {
                set.insert(id);
            }
            Err(error) => {
                debug!(%error, raw_id = %entry.raw_id, "dropped progress entry");
                *dropped += 1;
            }
        }
    }
    set
}

fn intersect<T>(units: Vec<PlanUnit<T>>, recorded: &HashSet<CanonicalId>) -> Vec<T> {
    units
        .into_iter()
        .filter(|unit| unit.aliases.iter().any(|alias| recorded.contains(alias)))
        .map(|unit| unit.entry)
        .collect()
}
