//! Catalog fixture for `vj init --seed`.
//!
//! Loads the shared reference tables with a starter set of main purposes,
//! sub purposes, recommended items, and destination rules. Seeding is
//! idempotent: rows are keyed by fixed ids and inserted with
//! `INSERT OR IGNORE`, so re-running `vj init --seed` never duplicates.

use anyhow::{Context, Result};
use rusqlite::{Connection, params};

struct CatalogSeed {
    id: i64,
    name: &'static str,
}

struct ItemSeed {
    id: i64,
    main_purpose_id: i64,
    name: &'static str,
}

struct RuleSeed {
    id: i64,
    main_purpose_id: i64,
    category: &'static str,
    title: &'static str,
    description: &'static str,
    required: bool,
}

const MAIN_PURPOSES: &[CatalogSeed] = &[
    CatalogSeed { id: 1, name: "Hiking" },
    CatalogSeed { id: 2, name: "Onsen Tour" },
    CatalogSeed { id: 3, name: "Local Food Tour" },
    CatalogSeed { id: 4, name: "Stargazing" },
    CatalogSeed { id: 5, name: "Coastal Drive" },
];

const SUB_PURPOSES: &[CatalogSeed] = &[
    CatalogSeed { id: 1, name: "Roadside Station Visit" },
    CatalogSeed { id: 2, name: "Lake Viewpoint" },
    CatalogSeed { id: 3, name: "Morning Market" },
    CatalogSeed { id: 4, name: "Sunset Point" },
    CatalogSeed { id: 5, name: "Campfire Evening" },
];

const DEFAULT_ITEMS: &[ItemSeed] = &[
    ItemSeed { id: 1, main_purpose_id: 1, name: "Hiking Boots" },
    ItemSeed { id: 2, main_purpose_id: 1, name: "Rain Shell" },
    ItemSeed { id: 3, main_purpose_id: 1, name: "Trail Map" },
    ItemSeed { id: 4, main_purpose_id: 2, name: "Bath Towel" },
    ItemSeed { id: 5, main_purpose_id: 2, name: "Coin Pouch" },
    ItemSeed { id: 6, main_purpose_id: 3, name: "Cooler Box" },
    ItemSeed { id: 7, main_purpose_id: 3, name: "Camping Stove" },
    ItemSeed { id: 8, main_purpose_id: 4, name: "Tripod" },
    ItemSeed { id: 9, main_purpose_id: 4, name: "Headlamp" },
    ItemSeed { id: 10, main_purpose_id: 4, name: "Sleeping Bag" },
    ItemSeed { id: 11, main_purpose_id: 5, name: "Sunshade" },
    ItemSeed { id: 12, main_purpose_id: 5, name: "Beach Sandals" },
];

// Rules 8 and 9 carry the same text on purpose: the quiet-hours rule is
// attached to both Hiking and Stargazing, and the rules screen collapses
// them to the first row.
const TRAVEL_RULES: &[RuleSeed] = &[
    RuleSeed {
        id: 1,
        main_purpose_id: 1,
        category: "safety",
        title: "Check trail closures",
        description: "Confirm trail and road status before driving to a trailhead.",
        required: true,
    },
    RuleSeed {
        id: 2,
        main_purpose_id: 1,
        category: "manners",
        title: "Pack out all waste",
        description: "Carry every piece of waste back; trailheads have no bins.",
        required: true,
    },
    RuleSeed {
        id: 3,
        main_purpose_id: 2,
        category: "manners",
        title: "Wash before entering the bath",
        description: "Rinse fully at the washing stations before soaking.",
        required: true,
    },
    RuleSeed {
        id: 4,
        main_purpose_id: 2,
        category: "manners",
        title: "Keep towels out of the water",
        description: "Leave towels on your head or at the edge of the bath.",
        required: false,
    },
    RuleSeed {
        id: 5,
        main_purpose_id: 3,
        category: "safety",
        title: "Keep perishables chilled",
        description: "Market food spoils fast in a parked van; use the cooler box.",
        required: false,
    },
    RuleSeed {
        id: 6,
        main_purpose_id: 4,
        category: "safety",
        title: "No open fires outside fire pits",
        description: "Use a fire stand or designated pit; ground fires are prohibited.",
        required: true,
    },
    RuleSeed {
        id: 7,
        main_purpose_id: 5,
        category: "safety",
        title: "Check tide tables before parking overnight",
        description: "Coastal lots can flood at high tide; verify before sleeping.",
        required: true,
    },
    RuleSeed {
        id: 8,
        main_purpose_id: 1,
        category: "manners",
        title: "Quiet hours after 22:00",
        description: "Keep engines, generators, and voices down at shared lots.",
        required: false,
    },
    RuleSeed {
        id: 9,
        main_purpose_id: 4,
        category: "manners",
        title: "Quiet hours after 22:00",
        description: "Keep engines, generators, and voices down at shared lots.",
        required: false,
    },
];

/// Load the catalog fixture into the reference tables.
///
/// # Errors
///
/// Returns an error if any insert fails.
#[allow(clippy::cast_possible_wrap)] // display orders are tiny fixture indexes
pub fn seed_catalog(conn: &Connection) -> Result<()> {
    for (index, purpose) in MAIN_PURPOSES.iter().enumerate() {
        conn.execute(
            "INSERT OR IGNORE INTO main_purposes (purpose_id, name, display_order)
             VALUES (?1, ?2, ?3)",
            params![purpose.id, purpose.name, index as i64],
        )
        .context("seed main purpose")?;
    }

    for (index, purpose) in SUB_PURPOSES.iter().enumerate() {
        conn.execute(
            "INSERT OR IGNORE INTO sub_purposes (purpose_id, name, display_order)
             VALUES (?1, ?2, ?3)",
            params![purpose.id, purpose.name, index as i64],
        )
        .context("seed sub purpose")?;
    }

    for (index, item) in DEFAULT_ITEMS.iter().enumerate() {
        conn.execute(
            "INSERT OR IGNORE INTO default_items (item_id, main_purpose_id, name, display_order)
             VALUES (?1, ?2, ?3, ?4)",
            params![item.id, item.main_purpose_id, item.name, index as i64],
        )
        .context("seed default item")?;
    }

    for (index, rule) in TRAVEL_RULES.iter().enumerate() {
        conn.execute(
            "INSERT OR IGNORE INTO travel_rules
                 (rule_id, main_purpose_id, rule_category, rule_title, rule_description,
                  is_required, display_order)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                rule.id,
                rule.main_purpose_id,
                rule.category,
                rule.title,
                rule.description,
                i64::from(rule.required),
                index as i64,
            ],
        )
        .context("seed travel rule")?;
    }

    tracing::debug!(
        mains = MAIN_PURPOSES.len(),
        subs = SUB_PURPOSES.len(),
        items = DEFAULT_ITEMS.len(),
        rules = TRAVEL_RULES.len(),
        "catalog seeded"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::seed_catalog;
    use crate::db::open_in_memory;

    #[test]
    fn seeding_twice_does_not_duplicate() {
        let conn = open_in_memory().expect("open journal");
        seed_catalog(&conn).expect("first seed");
        seed_catalog(&conn).expect("second seed");

        let mains: i64 = conn
            .query_row("SELECT COUNT(*) FROM main_purposes", [], |row| row.get(0))
            .expect("count");
        assert_eq!(mains, 5);

        let rules: i64 = conn
            .query_row("SELECT COUNT(*) FROM travel_rules", [], |row| row.get(0))
            .expect("count");
        assert_eq!(rules, 9);
    }

    #[test]
    fn every_item_and_rule_references_a_seeded_main_purpose() {
        let conn = open_in_memory().expect("open journal");
        seed_catalog(&conn).expect("seed");

        let orphan_items: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM default_items di
                 LEFT JOIN main_purposes mp ON mp.purpose_id = di.main_purpose_id
                 WHERE mp.purpose_id IS NULL",
                [],
                |row| row.get(0),
            )
            .expect("count");
        assert_eq!(orphan_items, 0);

        let orphan_rules: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM travel_rules tr
                 LEFT JOIN main_purposes mp ON mp.purpose_id = tr.main_purpose_id
                 WHERE mp.purpose_id IS NULL",
                [],
                |row| row.get(0),
            )
            .expect("count");
        assert_eq!(orphan_rules, 0);
    }
}
