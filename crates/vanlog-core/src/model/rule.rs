//! Destination rules and per-trip confirmations.
//!
//! Each main purpose carries a set of rules and manners (fire regulations,
//! overnight-parking etiquette, onsen rules). A trip spanning several main
//! purposes sees the union of their rules; rows that repeat the same title
//! and description across purposes are collapsed to the first occurrence,
//! keeping that row's id so existing confirmations still attach.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One rule row from the shared reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelRule {
    pub id: i64,
    pub main_purpose_id: i64,
    pub category: String,
    pub title: String,
    pub description: String,
    pub required: bool,
    pub display_order: i64,
}

/// Per-trip confirmation state for one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfirmation {
    pub trip_id: i64,
    pub rule_id: i64,
    pub confirmed: bool,
}

/// Collapse rules that share `(title, description)`, keeping the first.
///
/// Duplicate rows are an expected upstream artifact: the same rule text is
/// attached to several main purposes.
#[must_use]
pub fn dedupe_rules(rules: Vec<TravelRule>) -> Vec<TravelRule> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    rules
        .into_iter()
        .filter(|rule| seen.insert((rule.title.clone(), rule.description.clone())))
        .collect()
}

/// Returns `true` when every required rule has a positive confirmation.
///
/// Rules with `required = false` are advisory and never block.
#[must_use]
pub fn all_required_confirmed(rules: &[TravelRule], confirmations: &[RuleConfirmation]) -> bool {
    let confirmed: HashMap<i64, bool> = confirmations
        .iter()
        .map(|c| (c.rule_id, c.confirmed))
        .collect();

    rules
        .iter()
        .filter(|rule| rule.required)
        .all(|rule| confirmed.get(&rule.id).copied().unwrap_or(false))
}
