//! File-backed planning scratch cache.
//!
//! Checked-item state and custom items created during planning live outside
//! the journal database, in `.vanlog/scratch.json`. The file is a flat map
//! of string keys to JSON values, one pair of keys per trip:
//!
//! - `trip_<id>_checked_items` — array of checked-item keys
//! - `trip_<id>_custom_items` — array of `{id, name}` objects
//!
//! Checked-item keys are `item_<id>` for catalog rows and the raw custom id
//! for custom rows. [`checked_key`] builds the right form.

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::VANLOG_DIR;
use crate::store::{CustomEntry, LocalCache};

/// File name of the scratch cache under `.vanlog/`.
pub const SCRATCH_FILE: &str = "scratch.json";

/// The checked-set key form for a raw item id: custom ids are stored as-is,
/// catalog ids get an `item_` prefix so they cannot collide with trip ids.
#[must_use]
pub fn checked_key(raw_id: &str) -> String {
    if raw_id.starts_with("custom") {
        raw_id.to_string()
    } else {
        format!("item_{raw_id}")
    }
}

/// Scratch cache persisted as a JSON file under the journal root.
pub struct ScratchCache {
    path: PathBuf,
}

impl ScratchCache {
    /// Cache over an explicit file path.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Cache at the standard location under a journal root.
    #[must_use]
    pub fn at_root(journal_root: &Path) -> Self {
        Self::new(journal_root.join(VANLOG_DIR).join(SCRATCH_FILE))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, Value>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("read scratch cache {}", self.path.display()))?;
        serde_json::from_str(&content).with_context(|| {
            format!(
                "corrupt scratch cache {} (delete it to discard planning state)",
                self.path.display()
            )
        })
    }

    fn persist(&self, entries: &BTreeMap<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create cache directory {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(entries).context("encode scratch cache")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("write scratch cache {}", self.path.display()))
    }

    fn read_key<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let entries = self.load()?;
        entries
            .get(key)
            .map(|value| {
                serde_json::from_value(value.clone())
                    .with_context(|| format!("corrupt scratch cache entry '{key}'"))
            })
            .transpose()
    }

    fn write_key<T: serde::Serialize>(&self, key: String, value: &T) -> Result<()> {
        let mut entries = self.load()?;
        entries.insert(key, serde_json::to_value(value).context("encode cache entry")?);
        self.persist(&entries)
    }

    fn checked_items_key(trip_id: i64) -> String {
        format!("trip_{trip_id}_checked_items")
    }

    fn custom_items_key(trip_id: i64) -> String {
        format!("trip_{trip_id}_custom_items")
    }
}

impl LocalCache for ScratchCache {
    fn read_checked(&self, trip_id: i64) -> Result<Vec<String>> {
        Ok(self
            .read_key(&Self::checked_items_key(trip_id))?
            .unwrap_or_default())
    }

    fn write_checked(&self, trip_id: i64, keys: &[String]) -> Result<()> {
        self.write_key(Self::checked_items_key(trip_id), &keys)
    }

    fn read_custom_entries(&self, trip_id: i64) -> Result<Vec<CustomEntry>> {
        Ok(self
            .read_key(&Self::custom_items_key(trip_id))?
            .unwrap_or_default())
    }

    fn write_custom_entries(&self, trip_id: i64, entries: &[CustomEntry]) -> Result<()> {
        self.write_key(Self::custom_items_key(trip_id), &entries)
    }

    fn clear_trip(&self, trip_id: i64) -> Result<()> {
        let mut entries = self.load()?;
        let before = entries.len();
        entries.remove(&Self::checked_items_key(trip_id));
        entries.remove(&Self::custom_items_key(trip_id));
        if entries.len() == before {
            return Ok(());
        }
        self.persist(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_cache() -> (tempfile::TempDir, ScratchCache) {
        let dir = tempfile::tempdir().expect("temp dir");
        let cache = ScratchCache::at_root(dir.path());
        (dir, cache)
    }

    #[test]
    fn checked_key_forms() {
        assert_eq!(checked_key("42"), "item_42");
        assert_eq!(checked_key("custom_1699999999"), "custom_1699999999");
        assert_eq!(checked_key("custom:Tarp"), "custom:Tarp");
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let (_dir, cache) = temp_cache();
        assert!(cache.read_checked(1).expect("read").is_empty());
        assert!(cache.read_custom_entries(1).expect("read").is_empty());
    }

    #[test]
    fn checked_items_round_trip() {
        let (_dir, cache) = temp_cache();
        let keys = vec!["item_1".to_string(), "custom_1699999999".to_string()];

        cache.write_checked(7, &keys).expect("write");
        assert_eq!(cache.read_checked(7).expect("read"), keys);

        // Trips do not see each other's state.
        assert!(cache.read_checked(8).expect("read").is_empty());
    }

    #[test]
    fn custom_entries_round_trip() {
        let (_dir, cache) = temp_cache();
        let entries = vec![CustomEntry {
            id: "custom_1699999999".to_string(),
            name: "Folding Table".to_string(),
        }];

        cache.write_custom_entries(3, &entries).expect("write");
        assert_eq!(cache.read_custom_entries(3).expect("read"), entries);
    }

    #[test]
    fn clear_trip_drops_both_keys() {
        let (_dir, cache) = temp_cache();
        cache
            .write_checked(5, &["item_1".to_string()])
            .expect("write");
        cache
            .write_custom_entries(
                5,
                &[CustomEntry {
                    id: "custom_1".to_string(),
                    name: "Tarp".to_string(),
                }],
            )
            .expect("write");

        cache.clear_trip(5).expect("clear");
        assert!(cache.read_checked(5).expect("read").is_empty());
        assert!(cache.read_custom_entries(5).expect("read").is_empty());

        // Clearing an absent trip is a no-op.
        cache.clear_trip(5).expect("clear twice");
    }

    #[test]
    fn corrupt_file_is_reported() {
        let (dir, cache) = temp_cache();
        std::fs::create_dir_all(dir.path().join(VANLOG_DIR)).expect("mkdir");
        std::fs::write(cache.path(), "{not json").expect("write garbage");

        let err = cache.read_checked(1).expect_err("must fail");
        assert!(err.to_string().contains("corrupt scratch cache"));
    }
}
