//! Dashboard projections over companies and updates.
//!
//! # Invariants
//! - Status counts and reminders consider active companies only.
//! - Reminders list overdue companies before upcoming ones, each group by
//!   ascending due date, ties by case-insensitive company name.
//! - Overview and reminders share one name ordering.

use crate::model::company::{Company, CompanyId};
use crate::model::update::Update;
use crate::schedule::due_status::{classify, days_until, DueStatus};
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Headline counts for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total_companies: usize,
    pub active_companies: usize,
    pub total_updates: usize,
    pub overdue: usize,
    pub upcoming: usize,
    pub on_track: usize,
    pub unknown: usize,
}

impl DashboardSummary {
    pub fn count(&self, status: DueStatus) -> usize {
        match status {
            DueStatus::Overdue => self.overdue,
            DueStatus::Upcoming => self.upcoming,
            DueStatus::OnTrack => self.on_track,
            DueStatus::Unknown => self.unknown,
        }
    }
}

/// One company row with its badge and submission history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyOverview {
    pub company: Company,
    pub status: DueStatus,
    /// Negative when overdue; `None` without a due date.
    pub days_until_due: Option<i64>,
    pub update_count: usize,
    pub last_submission: Option<NaiveDate>,
}

/// Company that needs a nudge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderEntry {
    pub company: Company,
    pub status: DueStatus,
    pub due_date: NaiveDate,
    pub days_until_due: i64,
    /// Present when a submission base URL is configured.
    pub submission_link: Option<String>,
}

pub fn summarize(companies: &[Company], updates: &[Update], today: NaiveDate) -> DashboardSummary {
    let mut summary = DashboardSummary {
        total_companies: companies.len(),
        total_updates: updates.len(),
        ..DashboardSummary::default()
    };
    for company in companies.iter().filter(|company| company.is_active) {
        summary.active_companies += 1;
        match classify(company.next_due_date, today) {
            DueStatus::Overdue => summary.overdue += 1,
            DueStatus::Upcoming => summary.upcoming += 1,
            DueStatus::OnTrack => summary.on_track += 1,
            DueStatus::Unknown => summary.unknown += 1,
        }
    }
    summary
}

/// Every company sorted by name, case-insensitively.
pub fn overview(companies: &[Company], updates: &[Update], today: NaiveDate) -> Vec<CompanyOverview> {
    let mut history: HashMap<CompanyId, (usize, Option<NaiveDate>)> = HashMap::new();
    for update in updates {
        let entry = history.entry(update.company_id).or_insert((0, None));
        entry.0 += 1;
        entry.1 = entry.1.max(Some(update.submission_date));
    }

    let mut rows: Vec<CompanyOverview> = companies
        .iter()
        .map(|company| {
            let (update_count, last_submission) =
                history.get(&company.company_id).copied().unwrap_or((0, None));
            CompanyOverview {
                status: classify(company.next_due_date, today),
                days_until_due: company.next_due_date.map(|due| days_until(due, today)),
                company: company.clone(),
                update_count,
                last_submission,
            }
        })
        .collect();
    rows.sort_by(|left, right| by_name(&left.company, &right.company));
    rows
}

/// Active companies that are overdue or upcoming, in reminder order.
///
/// `link_for` produces the submission link for a company, if any.
pub fn reminder_sequence<F>(companies: &[Company], today: NaiveDate, link_for: F) -> Vec<ReminderEntry>
where
    F: Fn(&Company) -> Option<String>,
{
    let mut entries: Vec<ReminderEntry> = companies
        .iter()
        .filter(|company| company.is_active)
        .filter_map(|company| {
            let due_date = company.next_due_date?;
            let status = classify(Some(due_date), today);
            status.needs_reminder().then(|| ReminderEntry {
                company: company.clone(),
                status,
                due_date,
                days_until_due: days_until(due_date, today),
                submission_link: link_for(company),
            })
        })
        .collect();
    entries.sort_by(|left, right| {
        left.status
            .cmp(&right.status)
            .then_with(|| left.due_date.cmp(&right.due_date))
            .then_with(|| by_name(&left.company, &right.company))
    });
    entries
}

/// Case-insensitive name order shared by every listing; ids break ties.
fn by_name(left: &Company, right: &Company) -> Ordering {
    left.company_name
        .to_lowercase()
        .cmp(&right.company_name.to_lowercase())
        .then_with(|| left.company_id.cmp(&right.company_id))
}

#[cfg(test)]
mod tests {
    use super::{overview, reminder_sequence, summarize};
    use crate::model::company::Company;
    use crate::model::update::Update;
    use crate::schedule::cadence::Cadence;
    use crate::schedule::due_status::DueStatus;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn company(name: &str, due: Option<(u32, u32)>) -> Company {
        let mut company = Company::new(name, Cadence::Monthly, today());
        company.next_due_date = due.map(|(m, d)| NaiveDate::from_ymd_opt(2025, m, d).unwrap());
        company
    }

    fn portfolio() -> Vec<Company> {
        let mut inactive = company("Dormant", Some((1, 1)));
        inactive.is_active = false;
        vec![
            company("Zeta", Some((6, 10))),
            company("Alpha", Some((6, 10))),
            company("Gamma", Some((6, 1))),
            company("Soon", Some((6, 20))),
            company("Later", Some((8, 1))),
            company("Blank", None),
            inactive,
        ]
    }

    #[test]
    fn summary_counts_active_companies_by_status() {
        let companies = portfolio();
        let updates = vec![Update::new(companies[0].company_id, "May", "Z", today())];
        let summary = summarize(&companies, &updates, today());
        assert_eq!(summary.total_companies, 7);
        assert_eq!(summary.active_companies, 6);
        assert_eq!(summary.total_updates, 1);
        assert_eq!(summary.count(DueStatus::Overdue), 3);
        assert_eq!(summary.count(DueStatus::Upcoming), 1);
        assert_eq!(summary.count(DueStatus::OnTrack), 1);
        assert_eq!(summary.count(DueStatus::Unknown), 1);
    }

    #[test]
    fn reminders_order_overdue_then_upcoming_by_due_date_then_name() {
        let reminders = reminder_sequence(&portfolio(), today(), |_| None);
        let names: Vec<_> = reminders
            .iter()
            .map(|entry| entry.company.company_name.as_str())
            .collect();
        assert_eq!(names, ["Gamma", "Alpha", "Zeta", "Soon"]);
        assert_eq!(reminders[0].days_until_due, -14);
        assert_eq!(reminders[3].status, DueStatus::Upcoming);
        assert_eq!(reminders[3].days_until_due, 5);
    }

    #[test]
    fn reminder_name_ties_ignore_case_like_the_overview() {
        let companies = vec![
            company("beta", Some((6, 10))),
            company("Alpha", Some((6, 10))),
            company("Charlie", Some((6, 10))),
        ];
        let reminder_names: Vec<_> = reminder_sequence(&companies, today(), |_| None)
            .into_iter()
            .map(|entry| entry.company.company_name)
            .collect();
        let overview_names: Vec<_> = overview(&companies, &[], today())
            .into_iter()
            .map(|row| row.company.company_name)
            .collect();
        assert_eq!(reminder_names, ["Alpha", "beta", "Charlie"]);
        assert_eq!(reminder_names, overview_names);
    }

    #[test]
    fn reminders_carry_links_from_callback() {
        let reminders = reminder_sequence(&portfolio(), today(), |company| {
            Some(format!("https://x.test/?t={}", company.company_name))
        });
        assert_eq!(
            reminders[0].submission_link.as_deref(),
            Some("https://x.test/?t=Gamma")
        );
    }

    #[test]
    fn overview_tracks_update_history_and_sorts_by_name() {
        let companies = portfolio();
        let zeta = companies[0].company_id;
        let updates = vec![
            Update::new(zeta, "Apr", "Z", NaiveDate::from_ymd_opt(2025, 5, 2).unwrap()),
            Update::new(zeta, "May", "Z", NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()),
        ];
        let rows = overview(&companies, &updates, today());
        assert_eq!(rows[0].company.company_name, "Alpha");
        let zeta_row = rows.iter().find(|row| row.company.company_id == zeta).unwrap();
        assert_eq!(zeta_row.update_count, 2);
        assert_eq!(zeta_row.last_submission, NaiveDate::from_ymd_opt(2025, 6, 2));
        assert_eq!(zeta_row.days_until_due, Some(-5));
        let blank = rows.iter().find(|row| row.company.company_name == "Blank").unwrap();
        assert_eq!(blank.status, DueStatus::Unknown);
        assert_eq!(blank.days_until_due, None);
    }
}
