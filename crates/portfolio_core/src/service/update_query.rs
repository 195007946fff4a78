//! Update search and filtering.
//!
//! # Invariants
//! - Results are sorted by `submission_date DESC, update_id ASC`.
//! - `total` always counts the unfiltered collection.
//! - Text search is a case-insensitive substring match.

use crate::model::company::{Company, CompanyId};
use crate::model::update::Update;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Shown for updates whose company record is gone.
pub const UNKNOWN_COMPANY_NAME: &str = "(unknown company)";

/// Filter for listing updates. Every populated field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateFilter {
    pub company_id: Option<CompanyId>,
    /// Matched against company name, reporting period, submitter and the
    /// narrative fields.
    pub text: Option<String>,
    /// Inclusive lower bound on `submission_date`.
    pub submitted_from: Option<NaiveDate>,
    /// Inclusive upper bound on `submission_date`.
    pub submitted_to: Option<NaiveDate>,
}

impl UpdateFilter {
    pub fn for_company(company_id: CompanyId) -> Self {
        Self {
            company_id: Some(company_id),
            ..Self::default()
        }
    }

    fn needle(&self) -> Option<String> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_lowercase)
    }
}

/// One update joined with its company name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateView {
    pub update: Update,
    pub company_name: String,
}

/// Filtered list plus the size of the collection it was drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateListResult {
    pub items: Vec<UpdateView>,
    pub total: usize,
}

/// Applies `filter` to `updates`, newest first.
pub fn filter_updates(
    updates: Vec<Update>,
    companies: &[Company],
    filter: &UpdateFilter,
) -> UpdateListResult {
    let names: HashMap<CompanyId, &str> = companies
        .iter()
        .map(|company| (company.company_id, company.company_name.as_str()))
        .collect();
    let needle = filter.needle();
    let total = updates.len();

    let mut items: Vec<UpdateView> = updates
        .into_iter()
        .filter(|update| filter.company_id.map_or(true, |id| update.company_id == id))
        .filter(|update| {
            filter
                .submitted_from
                .map_or(true, |from| update.submission_date >= from)
        })
        .filter(|update| {
            filter
                .submitted_to
                .map_or(true, |to| update.submission_date <= to)
        })
        .map(|update| {
            let company_name = names
                .get(&update.company_id)
                .copied()
                .unwrap_or(UNKNOWN_COMPANY_NAME)
                .to_string();
            UpdateView {
                update,
                company_name,
            }
        })
        .filter(|view| {
            needle
                .as_deref()
                .map_or(true, |needle| matches_text(view, needle))
        })
        .collect();

    items.sort_by(|left, right| {
        right
            .update
            .submission_date
            .cmp(&left.update.submission_date)
            .then_with(|| left.update.update_id.cmp(&right.update.update_id))
    });
    UpdateListResult { items, total }
}

fn matches_text(view: &UpdateView, needle: &str) -> bool {
    let update = &view.update;
    [
        view.company_name.as_str(),
        update.reporting_period.as_str(),
        update.submitted_by.as_str(),
    ]
    .into_iter()
    .chain(update.narrative_fields().into_iter().map(|(_, text)| text))
    .any(|haystack| haystack.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::{filter_updates, UpdateFilter, UNKNOWN_COMPANY_NAME};
    use crate::model::company::Company;
    use crate::model::update::Update;
    use crate::schedule::cadence::Cadence;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn fixture() -> (Vec<Company>, Vec<Update>) {
        let acme = Company::new("Acme Robotics", Cadence::Monthly, day(1));
        let beta = Company::new("Beta Bio", Cadence::Quarterly, day(1));
        let mut first = Update::new(acme.company_id, "Jan 2025", "Ana", day(3));
        first.wins = "Signed a Fortune 500 pilot".to_string();
        let second = Update::new(beta.company_id, "Q1 2025", "Ben", day(9));
        let third = Update::new(acme.company_id, "Feb 2025", "Ana", day(20));
        (vec![acme, beta], vec![first, second, third])
    }

    #[test]
    fn unfiltered_list_is_newest_first() {
        let (companies, updates) = fixture();
        let result = filter_updates(updates, &companies, &UpdateFilter::default());
        assert_eq!(result.total, 3);
        let periods: Vec<_> = result
            .items
            .iter()
            .map(|view| view.update.reporting_period.as_str())
            .collect();
        assert_eq!(periods, ["Feb 2025", "Q1 2025", "Jan 2025"]);
        assert_eq!(result.items[1].company_name, "Beta Bio");
    }

    #[test]
    fn text_search_covers_company_name_and_narrative() {
        let (companies, updates) = fixture();
        let by_name = filter_updates(
            updates.clone(),
            &companies,
            &UpdateFilter {
                text: Some("beta".to_string()),
                ..UpdateFilter::default()
            },
        );
        assert_eq!(by_name.items.len(), 1);
        assert_eq!(by_name.total, 3);

        let by_wins = filter_updates(
            updates,
            &companies,
            &UpdateFilter {
                text: Some("  FORTUNE ".to_string()),
                ..UpdateFilter::default()
            },
        );
        assert_eq!(by_wins.items.len(), 1);
        assert_eq!(by_wins.items[0].update.reporting_period, "Jan 2025");
    }

    #[test]
    fn company_and_date_range_filters_combine() {
        let (companies, updates) = fixture();
        let acme = companies[0].company_id;
        let result = filter_updates(
            updates,
            &companies,
            &UpdateFilter {
                company_id: Some(acme),
                submitted_from: Some(day(10)),
                submitted_to: Some(day(31)),
                ..UpdateFilter::default()
            },
        );
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].update.reporting_period, "Feb 2025");
    }

    #[test]
    fn orphan_update_gets_placeholder_company_name() {
        let orphan = Update::new(Uuid::new_v4(), "Mar 2025", "Cy", day(2));
        let result = filter_updates(vec![orphan], &[], &UpdateFilter::default());
        assert_eq!(result.items[0].company_name, UNKNOWN_COMPANY_NAME);
    }
}
