//! Periodic company update record.
//!
//! # Responsibility
//! - Define the structured update a company submits each reporting period.
//!
//! # Invariants
//! - Updates are append-only: content never changes after creation.
//! - `submission_date` is set once and is the only ordering field.
//! - Financial fields are display-only text and are never parsed.
//! - `pdf_path` is advisory; a missing or stale path is not an error.

use crate::model::company::CompanyId;
use crate::model::validation::{check_link, require, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UpdateId = Uuid;

/// Persisted field names, in storage column order.
pub const UPDATE_FIELDS: &[&str] = &[
    "update_id",
    "company_id",
    "submission_date",
    "reporting_period",
    "revenue",
    "expenses",
    "cash",
    "runway_months",
    "wins",
    "challenges",
    "asks",
    "investment_update",
    "narrative",
    "meeting_agenda",
    "meeting_minutes",
    "data_warehouse_link",
    "submitted_by",
    "pdf_path",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    pub update_id: UpdateId,
    pub company_id: CompanyId,
    pub submission_date: NaiveDate,
    /// Free label such as `Q3 2025`; not checked against a calendar.
    pub reporting_period: String,
    #[serde(default)]
    pub revenue: String,
    #[serde(default)]
    pub expenses: String,
    #[serde(default)]
    pub cash: String,
    #[serde(default)]
    pub runway_months: u32,
    #[serde(default)]
    pub wins: String,
    #[serde(default)]
    pub challenges: String,
    #[serde(default)]
    pub asks: String,
    #[serde(default)]
    pub investment_update: String,
    #[serde(default)]
    pub narrative: String,
    #[serde(default)]
    pub meeting_agenda: String,
    #[serde(default)]
    pub meeting_minutes: String,
    #[serde(default)]
    pub data_warehouse_link: Option<String>,
    pub submitted_by: String,
    #[serde(default)]
    pub pdf_path: Option<String>,
}

impl Update {
    /// Creates an empty update for `company_id` submitted on `today`.
    pub fn new(
        company_id: CompanyId,
        reporting_period: impl Into<String>,
        submitted_by: impl Into<String>,
        today: NaiveDate,
    ) -> Self {
        Self {
            update_id: Uuid::new_v4(),
            company_id,
            submission_date: today,
            reporting_period: reporting_period.into(),
            revenue: String::new(),
            expenses: String::new(),
            cash: String::new(),
            runway_months: 0,
            wins: String::new(),
            challenges: String::new(),
            asks: String::new(),
            investment_update: String::new(),
            narrative: String::new(),
            meeting_agenda: String::new(),
            meeting_minutes: String::new(),
            data_warehouse_link: None,
            submitted_by: submitted_by.into(),
            pdf_path: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("reporting_period", &self.reporting_period)?;
        require("submitted_by", &self.submitted_by)?;
        check_link(self.data_warehouse_link.as_deref())
    }

    /// Narrative fields in the order they are searched and rendered.
    pub fn narrative_fields(&self) -> [(&'static str, &str); 7] {
        [
            ("wins", self.wins.as_str()),
            ("challenges", self.challenges.as_str()),
            ("asks", self.asks.as_str()),
            ("investment_update", self.investment_update.as_str()),
            ("narrative", self.narrative.as_str()),
            ("meeting_agenda", self.meeting_agenda.as_str()),
            ("meeting_minutes", self.meeting_minutes.as_str()),
        ]
    }
}
