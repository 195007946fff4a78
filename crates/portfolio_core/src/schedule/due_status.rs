//! Due-date classification used by the dashboard and reminder views.
//!
//! # Invariants
//! - The upcoming window is a fixed 7 days, inclusive on both ends.
//! - A missing due date is always `Unknown`, never an error.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Inclusive window, in days from today, in which a due date counts as upcoming.
pub const UPCOMING_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueStatus {
    Overdue,
    Upcoming,
    OnTrack,
    Unknown,
}

impl DueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::Upcoming => "upcoming",
            Self::OnTrack => "on_track",
            Self::Unknown => "unknown",
        }
    }

    /// Whether a company in this state belongs in the reminder sequence.
    pub fn needs_reminder(self) -> bool {
        matches!(self, Self::Overdue | Self::Upcoming)
    }
}

impl Display for DueStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signed whole days from `today` until `due_date` (negative when past).
pub fn days_until(due_date: NaiveDate, today: NaiveDate) -> i64 {
    due_date.signed_duration_since(today).num_days()
}

/// Classifies a due date relative to `today`.
pub fn classify(due_date: Option<NaiveDate>, today: NaiveDate) -> DueStatus {
    let Some(due_date) = due_date else {
        return DueStatus::Unknown;
    };
    match days_until(due_date, today) {
        days if days < 0 => DueStatus::Overdue,
        days if days <= UPCOMING_WINDOW_DAYS => DueStatus::Upcoming,
        _ => DueStatus::OnTrack,
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, days_until, DueStatus};
    use chrono::{Duration, NaiveDate};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()
    }

    fn offset(days: i64) -> Option<NaiveDate> {
        Some(today() + Duration::days(days))
    }

    #[test]
    fn absent_due_date_is_unknown() {
        assert_eq!(classify(None, today()), DueStatus::Unknown);
    }

    #[test]
    fn boundaries_follow_seven_day_window() {
        assert_eq!(classify(offset(-30), today()), DueStatus::Overdue);
        assert_eq!(classify(offset(-1), today()), DueStatus::Overdue);
        assert_eq!(classify(offset(0), today()), DueStatus::Upcoming);
        assert_eq!(classify(offset(7), today()), DueStatus::Upcoming);
        assert_eq!(classify(offset(8), today()), DueStatus::OnTrack);
        assert_eq!(classify(offset(365), today()), DueStatus::OnTrack);
    }

    #[test]
    fn days_until_is_negative_when_overdue() {
        let due = today() - Duration::days(3);
        assert_eq!(days_until(due, today()), -3);
    }

    #[test]
    fn only_overdue_and_upcoming_need_reminders() {
        assert!(DueStatus::Overdue.needs_reminder());
        assert!(DueStatus::Upcoming.needs_reminder());
        assert!(!DueStatus::OnTrack.needs_reminder());
        assert!(!DueStatus::Unknown.needs_reminder());
    }
}
