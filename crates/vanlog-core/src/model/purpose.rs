use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::ident::{self, CanonicalId, IdentKind, NormalizeError};

/// Weight class of a travel purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Main,
    Sub,
}

impl Category {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Sub => "sub",
        }
    }
}

/// Where a purpose or checklist item came from.
///
/// Catalog entries are rows in a shared reference table with durable ids;
/// custom entries are free text typed per trip, with client-generated ids
/// that are only stable within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Catalog,
    Custom,
}

impl Origin {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::Custom => "custom",
        }
    }
}

/// A travel goal attached to a trip.
///
/// `identity` is the trimmed display name and is the deduplication key
/// within one trip's plan; `raw_id` is whatever identifier the record
/// store produced and is only meaningful after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purpose {
    pub identity: String,
    pub raw_id: String,
    pub category: Category,
    pub origin: Origin,
}

impl Purpose {
    /// Build a purpose, trimming the display name.
    #[must_use]
    pub fn new(
        raw_id: impl Into<String>,
        name: &str,
        category: Category,
        origin: Origin,
    ) -> Self {
        Self {
            identity: name.trim().to_string(),
            raw_id: raw_id.into(),
            category,
            origin,
        }
    }

    /// The canonical identifier this purpose is matched under.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError`] when the purpose has an unstable custom id
    /// and no usable name.
    pub fn canonical(&self) -> Result<CanonicalId, NormalizeError> {
        ident::normalize(&self.raw_id, Some(&self.identity), IdentKind::Purpose)
    }
}

/// A recommended or custom piece of gear attached to a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub identity: String,
    pub raw_id: String,
    pub origin: Origin,
}

impl ChecklistItem {
    /// Build a checklist item, trimming the display name.
    #[must_use]
    pub fn new(raw_id: impl Into<String>, name: &str, origin: Origin) -> Self {
        Self {
            identity: name.trim().to_string(),
            raw_id: raw_id.into(),
            origin,
        }
    }

    /// The canonical identifier this item is matched under.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError`] when the item has an unstable custom id
    /// and no usable name.
    pub fn canonical(&self) -> Result<CanonicalId, NormalizeError> {
        ident::normalize(&self.raw_id, Some(&self.identity), IdentKind::Item)
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "main" => Ok(Self::Main),
            "sub" => Ok(Self::Sub),
            _ => Err(ParseEnumError {
                expected: "category",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for Origin {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "catalog" => Ok(Self::Catalog),
            "custom" => Ok(Self::Custom),
            _ => Err(ParseEnumError {
                expected: "origin",
                got: s.to_string(),
            }),
        }
    }
}
