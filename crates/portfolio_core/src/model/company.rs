//! Company domain model.
//!
//! # Responsibility
//! - Define the onboarded portfolio company record.
//! - Assign identity, access token and first due date at creation.
//!
//! # Invariants
//! - `company_id` and `access_token` never change after creation.
//! - `next_due_date` is the only field mutated by the update lifecycle.
//! - Deleting a company cascades to all of its updates (store contract).

use crate::model::validation::{check_email, require, ValidationError};
use crate::schedule::cadence::{next_due, Cadence};
use chrono::NaiveDate;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CompanyId = Uuid;

/// Persisted field names, in storage column order.
pub const COMPANY_FIELDS: &[&str] = &[
    "company_id",
    "company_name",
    "contact_name",
    "contact_email",
    "portfolio_manager",
    "fund",
    "reporting_cadence",
    "next_due_date",
    "access_token",
    "is_active",
    "created_at",
];

/// Length of the generated submission token.
pub const ACCESS_TOKEN_LEN: usize = 32;

/// Onboarded portfolio company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub company_id: CompanyId,
    pub company_name: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub portfolio_manager: String,
    #[serde(default)]
    pub fund: String,
    pub reporting_cadence: Cadence,
    /// Advanced by the cadence offset every time an update is submitted.
    #[serde(default)]
    pub next_due_date: Option<NaiveDate>,
    /// Opaque unguessable string embedded in submission links.
    pub access_token: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Onboarding day.
    pub created_at: NaiveDate,
}

fn default_active() -> bool {
    true
}

impl Company {
    /// Creates an active company with fresh identity and its first due date.
    ///
    /// Text fields are trimmed; contact fields start empty.
    pub fn new(company_name: impl Into<String>, cadence: Cadence, today: NaiveDate) -> Self {
        Self {
            company_id: Uuid::new_v4(),
            company_name: company_name.into().trim().to_string(),
            contact_name: String::new(),
            contact_email: String::new(),
            portfolio_manager: String::new(),
            fund: String::new(),
            next_due_date: Some(next_due(&cadence, today)),
            reporting_cadence: cadence,
            access_token: generate_access_token(),
            is_active: true,
            created_at: today,
        }
    }

    /// Validates required and formatted fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("company_name", &self.company_name)?;
        require("access_token", &self.access_token)?;
        check_email(&self.contact_email)
    }
}

/// Returns a random alphanumeric token of `ACCESS_TOKEN_LEN` characters.
pub fn generate_access_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ACCESS_TOKEN_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{generate_access_token, Company, ACCESS_TOKEN_LEN};
    use crate::model::validation::ValidationError;
    use crate::schedule::cadence::Cadence;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
    }

    #[test]
    fn new_company_starts_active_with_first_due_date() {
        let company = Company::new("  Acme Robotics ", Cadence::Weekly, today());
        assert_eq!(company.company_name, "Acme Robotics");
        assert!(company.is_active);
        assert_eq!(
            company.next_due_date,
            NaiveDate::from_ymd_opt(2025, 1, 17)
        );
        assert_eq!(company.access_token.len(), ACCESS_TOKEN_LEN);
        assert_eq!(company.created_at, today());
    }

    #[test]
    fn tokens_are_alphanumeric_and_distinct() {
        let first = generate_access_token();
        let second = generate_access_token();
        assert!(first.chars().all(|ch| ch.is_ascii_alphanumeric()));
        assert_ne!(first, second);
    }

    #[test]
    fn validate_rejects_blank_name_and_bad_email() {
        let mut company = Company::new(" ", Cadence::Monthly, today());
        assert_eq!(
            company.validate(),
            Err(ValidationError::MissingField("company_name"))
        );

        company.company_name = "Acme".to_string();
        company.contact_email = "ceo-at-acme".to_string();
        assert!(matches!(
            company.validate(),
            Err(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn missing_optional_fields_use_defaults_when_deserialized() {
        let json = r#"{
            "company_id": "6f1c1f7e-1e4b-4b8e-9a55-0a4a3d1b2c3d",
            "company_name": "Legacy Co",
            "reporting_cadence": "Quarterly",
            "access_token": "abc",
            "created_at": "2024-06-01"
        }"#;
        let company: Company = serde_json::from_str(json).unwrap();
        assert!(company.is_active);
        assert_eq!(company.next_due_date, None);
        assert_eq!(company.reporting_cadence, Cadence::Quarterly);
        assert!(company.fund.is_empty());
    }
}
