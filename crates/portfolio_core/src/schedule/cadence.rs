//! Reporting cadence and due-date arithmetic.
//!
//! # Responsibility
//! - Map a company's reporting cadence to a fixed day offset.
//! - Compute the next due date from a reference day.
//!
//! # Invariants
//! - Known cadences map to 7/14/30/90 days.
//! - Unrecognized cadence text is kept verbatim and maps to 30 days.
//! - Every function here is pure and total.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Offset applied when the cadence text is not one of the known values.
pub const FALLBACK_CADENCE_DAYS: i64 = 30;

/// Reporting frequency configured per company.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Cadence {
    Weekly,
    Biweekly,
    #[default]
    Monthly,
    Quarterly,
    /// Unrecognized value read from input or storage.
    Other(String),
}

impl Cadence {
    /// Parses cadence text case-insensitively, ignoring `-`, `_` and spaces.
    ///
    /// Never fails: unknown text becomes `Cadence::Other`.
    pub fn parse(value: &str) -> Self {
        let key: String = value
            .chars()
            .filter(|ch| !matches!(ch, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "weekly" => Self::Weekly,
            "biweekly" => Self::Biweekly,
            "monthly" => Self::Monthly,
            "quarterly" => Self::Quarterly,
            _ => Self::Other(value.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Weekly => "Weekly",
            Self::Biweekly => "Biweekly",
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::Other(value) => value.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Day offset between consecutive due dates.
    pub fn days(&self) -> i64 {
        match self {
            Self::Weekly => 7,
            Self::Biweekly => 14,
            Self::Monthly => 30,
            Self::Quarterly => 90,
            Self::Other(_) => FALLBACK_CADENCE_DAYS,
        }
    }
}

impl Display for Cadence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Cadence {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for Cadence {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<Cadence> for String {
    fn from(value: Cadence) -> Self {
        value.as_str().to_string()
    }
}

/// Returns the offset between due dates for `cadence`.
pub fn cadence_delta(cadence: &Cadence) -> Duration {
    Duration::days(cadence.days())
}

/// Returns `today + cadence_delta(cadence)`.
///
/// Saturates at `NaiveDate::MAX` instead of overflowing.
pub fn next_due(cadence: &Cadence, today: NaiveDate) -> NaiveDate {
    today
        .checked_add_signed(cadence_delta(cadence))
        .unwrap_or(NaiveDate::MAX)
}
