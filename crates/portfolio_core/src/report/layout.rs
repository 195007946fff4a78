//! Structural report layout: which labels appear, in which order.
//!
//! # Invariants
//! - Entry order is fixed: company, period, submission date, submitted-by,
//!   financial KPIs, wins, challenges, asks, investment update, narrative,
//!   meeting agenda, meeting minutes, data link.
//! - Every entry text has gone through [`normalize_text`].

use super::text::{normalize_text, transliterate_ascii};
use crate::model::update::Update;

/// How an entry is laid out on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStyle {
    /// `Label: value` on one line.
    Inline,
    /// Bold heading followed by wrapped paragraphs.
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub label: &'static str,
    pub text: String,
    pub style: EntryStyle,
}

impl ReportEntry {
    fn inline(label: &'static str, value: &str) -> Self {
        Self {
            label,
            text: normalize_text(value),
            style: EntryStyle::Inline,
        }
    }

    fn block(label: &'static str, value: &str) -> Self {
        Self {
            label,
            text: normalize_text(value),
            style: EntryStyle::Block,
        }
    }
}

/// Document content before any PDF encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLayout {
    pub title: String,
    pub author: String,
    pub entries: Vec<ReportEntry>,
}

impl ReportLayout {
    pub fn labels(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.label).collect()
    }

    pub fn entry(&self, label: &str) -> Option<&ReportEntry> {
        self.entries.iter().find(|entry| entry.label == label)
    }

    /// Returns a copy with every string reduced to ASCII.
    pub fn transliterated(&self) -> Self {
        Self {
            title: transliterate_ascii(&self.title),
            author: transliterate_ascii(&self.author),
            entries: self
                .entries
                .iter()
                .map(|entry| ReportEntry {
                    label: entry.label,
                    text: transliterate_ascii(&entry.text),
                    style: entry.style,
                })
                .collect(),
        }
    }
}

/// Builds the fixed-order layout for one update.
pub fn build_layout(update: &Update, company_name: &str) -> ReportLayout {
    let financials = [
        ("Revenue", update.revenue.as_str()),
        ("Expenses", update.expenses.as_str()),
        ("Cash", update.cash.as_str()),
    ]
    .iter()
    .map(|(label, value)| format!("{label}: {}", normalize_text(value)))
    .chain(std::iter::once(format!(
        "Runway: {} months",
        update.runway_months
    )))
    .collect::<Vec<_>>()
    .join("\n");

    let mut entries = vec![
        ReportEntry::inline("Company", company_name),
        ReportEntry::inline("Reporting period", &update.reporting_period),
        ReportEntry::inline(
            "Submission date",
            &update.submission_date.format("%Y-%m-%d").to_string(),
        ),
        ReportEntry::inline("Submitted by", &update.submitted_by),
        ReportEntry::block("Financial KPIs", &financials),
    ];
    entries.extend([
        ReportEntry::block("Wins", &update.wins),
        ReportEntry::block("Challenges", &update.challenges),
        ReportEntry::block("Asks", &update.asks),
        ReportEntry::block("Investment update", &update.investment_update),
        ReportEntry::block("Narrative", &update.narrative),
        ReportEntry::block("Meeting agenda", &update.meeting_agenda),
        ReportEntry::block("Meeting minutes", &update.meeting_minutes),
        ReportEntry::inline(
            "Data warehouse link",
            update.data_warehouse_link.as_deref().unwrap_or_default(),
        ),
    ]);

    ReportLayout {
        title: format!("Portfolio update: {}", normalize_text(company_name)),
        author: normalize_text(&update.submitted_by),
        entries,
    }
}
