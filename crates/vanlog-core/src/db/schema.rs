//! Canonical SQLite schema for the vanlog journal.
//!
//! The schema mirrors the journal's two halves:
//! - reference tables (`main_purposes`, `sub_purposes`, `default_items`,
//!   `travel_rules`) hold the shared catalog
//! - trip-scoped tables (`trips`, `trip_purposes`,
//!   `trip_rule_confirmations`, `trip_reviews`) hold per-journal state
//! - `journal_meta` tracks the applied schema version

/// Migration v1: reference catalog plus trip-scoped tables.
pub const MIGRATION_V1_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS trips (
    trip_id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL CHECK (length(trim(title)) > 0),
    destination TEXT NOT NULL,
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'planning'
        CHECK (status IN ('planning', 'ongoing', 'completed')),
    created_at TEXT NOT NULL,
    CHECK (start_date <= end_date)
);

CREATE TABLE IF NOT EXISTS main_purposes (
    purpose_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE CHECK (length(trim(name)) > 0),
    display_order INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS sub_purposes (
    purpose_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE CHECK (length(trim(name)) > 0),
    display_order INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS trip_purposes (
    trip_purpose_id INTEGER PRIMARY KEY AUTOINCREMENT,
    trip_id INTEGER NOT NULL REFERENCES trips(trip_id) ON DELETE CASCADE,
    purpose_type TEXT NOT NULL CHECK (purpose_type IN ('main', 'sub', 'custom')),
    main_purpose_id INTEGER REFERENCES main_purposes(purpose_id),
    sub_purpose_id INTEGER REFERENCES sub_purposes(purpose_id),
    custom_purpose TEXT,
    CHECK (
        (purpose_type = 'main' AND main_purpose_id IS NOT NULL)
        OR (purpose_type = 'sub' AND sub_purpose_id IS NOT NULL)
        OR (purpose_type = 'custom' AND length(trim(custom_purpose)) > 0)
    )
);

CREATE TABLE IF NOT EXISTS default_items (
    item_id INTEGER PRIMARY KEY,
    main_purpose_id INTEGER NOT NULL REFERENCES main_purposes(purpose_id) ON DELETE CASCADE,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    display_order INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS travel_rules (
    rule_id INTEGER PRIMARY KEY,
    main_purpose_id INTEGER NOT NULL REFERENCES main_purposes(purpose_id) ON DELETE CASCADE,
    rule_category TEXT NOT NULL,
    rule_title TEXT NOT NULL CHECK (length(trim(rule_title)) > 0),
    rule_description TEXT NOT NULL,
    is_required INTEGER NOT NULL DEFAULT 0 CHECK (is_required IN (0, 1)),
    display_order INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS trip_rule_confirmations (
    trip_id INTEGER NOT NULL REFERENCES trips(trip_id) ON DELETE CASCADE,
    rule_id INTEGER NOT NULL REFERENCES travel_rules(rule_id) ON DELETE CASCADE,
    is_confirmed INTEGER NOT NULL DEFAULT 0 CHECK (is_confirmed IN (0, 1)),
    PRIMARY KEY (trip_id, rule_id)
);

CREATE TABLE IF NOT EXISTS trip_reviews (
    trip_id INTEGER PRIMARY KEY REFERENCES trips(trip_id) ON DELETE CASCADE,
    achieved_main TEXT NOT NULL DEFAULT '[]',
    achieved_sub TEXT NOT NULL DEFAULT '[]',
    used_items TEXT NOT NULL DEFAULT '[]',
    review_date TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS journal_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL
);

INSERT OR IGNORE INTO journal_meta (id, schema_version) VALUES (1, 1);
"#;

/// Migration v2: read-path indexes.
pub const MIGRATION_V2_SQL: &str = r#"
CREATE INDEX IF NOT EXISTS idx_trips_status_start
    ON trips(status, start_date DESC);

CREATE INDEX IF NOT EXISTS idx_trip_purposes_trip
    ON trip_purposes(trip_id, purpose_type);

CREATE INDEX IF NOT EXISTS idx_default_items_main
    ON default_items(main_purpose_id, display_order);

CREATE INDEX IF NOT EXISTS idx_travel_rules_main
    ON travel_rules(main_purpose_id, rule_category, display_order);
"#;

/// Indexes that must exist after migration (checked in tests).
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_trips_status_start",
    "idx_trip_purposes_trip",
    "idx_default_items_main",
    "idx_travel_rules_main",
];
