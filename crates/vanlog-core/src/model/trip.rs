use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::purpose::ParseEnumError;

/// Maximum trip title length after trimming.
pub const MAX_TITLE_LEN: usize = 100;

/// Destination regions offered by the journal, north to south.
pub const DESTINATIONS: [&str; 13] = [
    "Hokkaido (Dohoku)",
    "Hokkaido (Doto)",
    "Hokkaido (Donan)",
    "Hokkaido (Doo)",
    "Tohoku",
    "Hokuriku",
    "Kanto",
    "Koshinetsu",
    "Chubu-Tokai",
    "Kinki",
    "Chugoku",
    "Shikoku",
    "Kyushu",
];

/// The three trip lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    Planning,
    Ongoing,
    Completed,
}

impl TripStatus {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
        }
    }

    /// Validate whether a transition from self to `target` is allowed.
    ///
    /// Valid transitions:
    /// - `planning -> ongoing`
    /// - `ongoing -> completed`
    /// - `completed -> planning` (manual re-edit)
    pub fn can_transition_to(&self, target: TripStatus) -> Result<(), InvalidTransition> {
        if *self == target {
            return Err(InvalidTransition {
                from: *self,
                to: target,
                reason: "no-op transition is not allowed",
            });
        }

        let allowed = matches!(
            (*self, target),
            (Self::Planning, TripStatus::Ongoing)
                | (Self::Ongoing, TripStatus::Completed)
                | (Self::Completed, TripStatus::Planning)
        );

        if allowed {
            Ok(())
        } else {
            Err(InvalidTransition {
                from: *self,
                to: target,
                reason: "transition not allowed by lifecycle rules",
            })
        }
    }

    /// The next state in the forward flow, used by `vj trip status --next`.
    #[must_use]
    pub const fn next(self) -> TripStatus {
        match self {
            Self::Planning => Self::Ongoing,
            Self::Ongoing => Self::Completed,
            // Completed trips can be pulled back into planning for re-edits.
            Self::Completed => Self::Planning,
        }
    }

    /// Review and scoring are only reachable once a trip is underway.
    #[must_use]
    pub const fn review_available(self) -> bool {
        matches!(self, Self::Ongoing | Self::Completed)
    }
}

/// Error returned when a lifecycle transition is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid trip status transition {from} -> {to}: {reason}")]
pub struct InvalidTransition {
    pub from: TripStatus,
    pub to: TripStatus,
    pub reason: &'static str,
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "planning" => Ok(Self::Planning),
            "ongoing" => Ok(Self::Ongoing),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseEnumError {
                expected: "trip status",
                got: s.to_string(),
            }),
        }
    }
}

/// All persisted fields for a trip row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub id: i64,
    pub title: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: TripStatus,
    pub created_at: DateTime<Utc>,
}

/// Validation failures for trip input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TripValidationError {
    #[error("trip title must not be empty")]
    EmptyTitle,

    #[error("trip title exceeds {MAX_TITLE_LEN} characters")]
    TitleTooLong,

    #[error("unknown destination '{0}'")]
    UnknownDestination(String),

    #[error("trip end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("dates overlap existing trip '{title}'")]
    Overlap { title: String },
}

/// Validate and trim a trip title.
///
/// # Errors
///
/// Rejects empty/whitespace titles and titles longer than [`MAX_TITLE_LEN`]
/// characters after trimming.
pub fn validate_title(title: &str) -> Result<String, TripValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TripValidationError::EmptyTitle);
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(TripValidationError::TitleTooLong);
    }
    Ok(trimmed.to_string())
}

/// Validate a destination against the fixed region catalog.
///
/// # Errors
///
/// Returns [`TripValidationError::UnknownDestination`] when the value is not
/// one of [`DESTINATIONS`].
pub fn validate_destination(destination: &str) -> Result<&str, TripValidationError> {
    let trimmed = destination.trim();
    DESTINATIONS
        .iter()
        .find(|d| **d == trimmed)
        .copied()
        .ok_or_else(|| TripValidationError::UnknownDestination(trimmed.to_string()))
}

/// Validate that a trip's date range is well-formed.
///
/// # Errors
///
/// Returns [`TripValidationError::EndBeforeStart`] when `end < start`.
pub fn validate_dates(start: NaiveDate, end: NaiveDate) -> Result<(), TripValidationError> {
    if end < start {
        return Err(TripValidationError::EndBeforeStart { start, end });
    }
    Ok(())
}

/// Returns `true` if the two inclusive date ranges intersect.
#[must_use]
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && b_start <= a_end
}
