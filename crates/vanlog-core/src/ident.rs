//! Canonical identifier normalization.
//!
//! Purposes and checklist items reach the journal with three identifier
//! shapes: numeric catalog row ids, UUIDs from older remote exports, and
//! client-generated custom ids. The custom ids are the problem — legacy
//! journals contain at least three shapes (`custom_<timestamp>`,
//! `custom_<timestamp>_<n>`, `custom_name_<name>`), and the timestamp-based
//! ones change between sessions, so they can never be matched against a
//! freshly loaded plan.
//!
//! # Canonical form
//!
//! - Pure-integer ids and UUIDs are durable keys and pass through unchanged.
//! - Everything else is a custom entry and canonicalizes to
//!   `custom:<trimmed name>`. The name is the only property of a custom
//!   entry that survives a reload, so it is the equality key.
//!
//! [`normalize`] is a pure function: same inputs, same output, no I/O.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of the canonical form for custom entries.
pub const CUSTOM_PREFIX: &str = "custom:";

/// Legacy name-carrying prefix written by older journal versions.
const LEGACY_NAME_PREFIX: &str = "custom_name_";

// ---------------------------------------------------------------------------
// CanonicalId
// ---------------------------------------------------------------------------

/// A normalized identifier, comparable across sessions and data sources.
///
/// Construct via [`normalize`]; the inner string is either a numeric id, a
/// UUID, or `custom:<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalId(String);

impl CanonicalId {
    /// View the canonical identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this identifier canonicalizes a custom entry.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.0.starts_with(CUSTOM_PREFIX)
    }

    /// The custom entry's name, if this is a custom identifier.
    #[must_use]
    pub fn custom_name(&self) -> Option<&str> {
        self.0.strip_prefix(CUSTOM_PREFIX)
    }

    /// Build the canonical id for a custom entry name (assumed non-empty).
    #[must_use]
    pub(crate) fn for_name(name: &str) -> Self {
        Self(format!("{CUSTOM_PREFIX}{}", name.trim()))
    }
}

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// What kind of record an identifier belongs to. Carried in errors and
/// tracing so a dropped progress entry can be attributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentKind {
    Purpose,
    Item,
}

impl IdentKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Purpose => "purpose",
            Self::Item => "item",
        }
    }
}

impl fmt::Display for IdentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from identifier normalization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    /// Raw identifier was empty or whitespace-only.
    #[error("empty raw {kind} identifier")]
    EmptyRawId { kind: IdentKind },

    /// Custom identifier with no usable name to canonicalize from.
    #[error("custom {kind} id '{raw_id}' has no usable name")]
    MissingName { raw_id: String, kind: IdentKind },
}

// ---------------------------------------------------------------------------
// normalize
// ---------------------------------------------------------------------------

/// Map a raw identifier plus optional name to its canonical form.
///
/// - Pure-integer and UUID raw ids pass through unchanged.
/// - Already-canonical `custom:<name>` ids pass through unchanged.
/// - Legacy `custom_name_<name>` ids canonicalize from the embedded name.
/// - Any other shape is a custom-generated id and requires `name`.
///
/// # Errors
///
/// Returns [`NormalizeError::EmptyRawId`] for an empty/whitespace raw id and
/// [`NormalizeError::MissingName`] when a custom id arrives without a
/// non-empty name.
pub fn normalize(
    raw_id: &str,
    name: Option<&str>,
    kind: IdentKind,
) -> Result<CanonicalId, NormalizeError> {
    let raw = raw_id.trim();
    if raw.is_empty() {
        return Err(NormalizeError::EmptyRawId { kind });
    }

    if is_integer(raw) || is_uuid(raw) {
        return Ok(CanonicalId(raw.to_string()));
    }

    if let Some(rest) = raw.strip_prefix(CUSTOM_PREFIX) {
        if !rest.trim().is_empty() {
            return Ok(CanonicalId(raw.to_string()));
        }
    }

    // Older journals embedded the name directly in the id.
    if let Some(rest) = raw.strip_prefix(LEGACY_NAME_PREFIX) {
        if !rest.trim().is_empty() {
            return Ok(CanonicalId::for_name(rest));
        }
    }

    match name.map(str::trim) {
        Some(n) if !n.is_empty() => Ok(CanonicalId::for_name(n)),
        _ => Err(NormalizeError::MissingName {
            raw_id: raw.to_string(),
            kind,
        }),
    }
}

/// Returns `true` if `raw` looks like a legacy custom identifier that needs
/// name-based migration: custom-shaped but neither durable nor already
/// canonical.
#[must_use]
pub fn is_legacy_custom(raw: &str) -> bool {
    let raw = raw.trim();
    if raw.is_empty() || is_integer(raw) || is_uuid(raw) {
        return false;
    }
    if raw.starts_with(CUSTOM_PREFIX) {
        return false;
    }
    // `custom_name_<name>` converts losslessly; it is legacy in shape only.
    raw.starts_with("custom")
}

fn is_integer(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Match the 8-4-4-4-12 hex-group UUID shape, case-insensitive.
fn is_uuid(s: &str) -> bool {
    const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

    let mut parts = s.split('-');
    for expected in GROUPS {
        let Some(part) = parts.next() else {
            return false;
        };
        if part.len() != expected || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
            return false;
        }
    }
    parts.next().is_none()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_pass_through() {
        let id = normalize("123", Some("Anything"), IdentKind::Purpose).expect("numeric id");
        assert_eq!(id.as_str(), "123");
        assert!(!id.is_custom());
    }

    #[test]
    fn uuid_ids_pass_through() {
        let id = normalize(
            "a1b2c3d4-0000-0000-0000-000000000000",
            None,
            IdentKind::Item,
        )
        .expect("uuid id");
        assert_eq!(id.as_str(), "a1b2c3d4-0000-0000-0000-000000000000");
    }

    #[test]
    fn uppercase_uuid_is_recognized() {
        let id = normalize(
            "A1B2C3D4-0000-0000-0000-00000000FFFF",
            None,
            IdentKind::Purpose,
        )
        .expect("uuid id");
        assert!(!id.is_custom());
    }

    #[test]
    fn timestamp_custom_id_canonicalizes_from_name() {
        let id = normalize("custom_1699999999_2", Some("Sunset Point"), IdentKind::Purpose)
            .expect("custom id with name");
        assert_eq!(id.as_str(), "custom:Sunset Point");
        assert_eq!(id.custom_name(), Some("Sunset Point"));
    }

    #[test]
    fn legacy_name_prefix_carries_its_own_name() {
        let id = normalize("custom_name_Lake Viewpoint", None, IdentKind::Purpose)
            .expect("legacy name id");
        assert_eq!(id.as_str(), "custom:Lake Viewpoint");
    }

    #[test]
    fn canonical_custom_id_passes_through() {
        let id = normalize("custom:Lake Viewpoint", None, IdentKind::Purpose)
            .expect("already canonical");
        assert_eq!(id.as_str(), "custom:Lake Viewpoint");
    }

    #[test]
    fn name_is_trimmed() {
        let id = normalize("custom_1699999999", Some("  Lakeside Camp  "), IdentKind::Item)
            .expect("custom id");
        assert_eq!(id.as_str(), "custom:Lakeside Camp");
    }

    #[test]
    fn custom_id_without_name_is_rejected() {
        let err = normalize("custom_1699999999", None, IdentKind::Purpose)
            .expect_err("must require name");
        assert!(matches!(err, NormalizeError::MissingName { .. }));

        let err = normalize("custom_1699999999", Some("   "), IdentKind::Purpose)
            .expect_err("whitespace name is unusable");
        assert!(matches!(err, NormalizeError::MissingName { .. }));
    }

    #[test]
    fn empty_raw_id_is_rejected() {
        let err = normalize("", Some("Name"), IdentKind::Item).expect_err("empty raw id");
        assert!(matches!(err, NormalizeError::EmptyRawId { .. }));

        let err = normalize("   ", None, IdentKind::Purpose).expect_err("whitespace raw id");
        assert!(matches!(err, NormalizeError::EmptyRawId { .. }));
    }

    #[test]
    fn normalize_is_deterministic() {
        let a = normalize("custom_1699999999_2", Some("Sunset Point"), IdentKind::Purpose);
        let b = normalize("custom_1699999999_2", Some("Sunset Point"), IdentKind::Purpose);
        assert_eq!(a, b);
    }

    #[test]
    fn malformed_uuids_are_not_durable() {
        // Wrong group lengths, missing groups, non-hex chars.
        assert!(!is_uuid("a1b2c3d4-0000-0000-0000"));
        assert!(!is_uuid("a1b2c3d4-0000-0000-0000-00000000000g"));
        assert!(!is_uuid("a1b2c3d40-000-0000-0000-000000000000"));
        assert!(!is_uuid("a1b2c3d4-0000-0000-0000-000000000000-ff"));
    }

    #[test]
    fn legacy_detection_matches_known_shapes() {
        assert!(is_legacy_custom("custom_1699999999"));
        assert!(is_legacy_custom("custom_1699999999_0"));
        assert!(is_legacy_custom("custom_sub_1754614426178"));
        assert!(is_legacy_custom("custom_name_Lake Viewpoint"));

        assert!(!is_legacy_custom("42"));
        assert!(!is_legacy_custom("a1b2c3d4-0000-0000-0000-000000000000"));
        assert!(!is_legacy_custom("custom:Lake Viewpoint"));
    }
}
