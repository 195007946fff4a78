//! Portfolio use-case service.
//!
//! # Responsibility
//! - Onboard companies and accept their periodic updates.
//! - Advance a company's next due date on every accepted update.
//! - Serve dashboard, reminder, search and export projections.
//! - Render update reports and record where they were written.
//!
//! # Invariants
//! - Input is validated before any store mutation.
//! - A submission persists the update before moving the due date; the new
//!   date is `submission day + cadence offset`, overwriting the previous one.
//! - Recording a report path is advisory and never fails an export.

use crate::export::{export_updates, ExportFormat};
use crate::link::submission_link;
use crate::model::company::{Company, CompanyId};
use crate::model::update::{Update, UpdateId};
use crate::model::validation::ValidationError;
use crate::repo::atomic::atomic_write;
use crate::repo::record_store::{RecordKind, RecordStore, StoreError};
use crate::repo::table_format::FormatError;
use crate::report::{render_update, RenderError, RenderedReport};
use crate::schedule::cadence::{next_due, Cadence};
use crate::service::dashboard::{
    overview, reminder_sequence, summarize, CompanyOverview, DashboardSummary, ReminderEntry,
};
use crate::service::update_query::{filter_updates, UpdateFilter, UpdateListResult};
use chrono::{NaiveDate, NaiveDateTime};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for portfolio use-cases.
#[derive(Debug)]
pub enum ServiceError {
    Validation(ValidationError),
    CompanyNotFound(CompanyId),
    UpdateNotFound(UpdateId),
    /// Submission links were requested but no base URL is configured.
    MissingBaseUrl,
    InvalidBaseUrl {
        base_url: String,
        source: url::ParseError,
    },
    Store(StoreError),
    Render(RenderError),
    Export(FormatError),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ServiceError {
    /// Operator-facing hint for recovering from this failure.
    pub fn remediation(&self) -> &'static str {
        match self {
            Self::Validation(_) => "fill in the required fields and submit again",
            Self::CompanyNotFound(_) | Self::UpdateNotFound(_) => {
                "list the records again; the target may have been deleted"
            }
            Self::MissingBaseUrl => "set `links.base_url` in the config or PORTFOLIO_BASE_URL",
            Self::InvalidBaseUrl { .. } => "use an absolute URL such as https://updates.example.com/submit",
            Self::Store(err) => err.remediation(),
            Self::Render(_) | Self::Export(_) => "report this as a bug with the record id",
            Self::Io { .. } => "check that the output directory exists and is writable",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::CompanyNotFound(id) => write!(f, "company not found: {id}"),
            Self::UpdateNotFound(id) => write!(f, "update not found: {id}"),
            Self::MissingBaseUrl => f.write_str("no submission base URL configured"),
            Self::InvalidBaseUrl { base_url, source } => {
                write!(f, "invalid submission base URL `{base_url}`: {source}")
            }
            Self::Store(err) => write!(f, "{err}"),
            Self::Render(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "export failed: {err}"),
            Self::Io { path, source } => write!(f, "cannot write `{}`: {source}", path.display()),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::InvalidBaseUrl { source, .. } => Some(source),
            Self::Store(err) => Some(err),
            Self::Render(err) => Some(err),
            Self::Export(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Validation(err) => Self::Validation(err),
            StoreError::UnknownCompany(id)
            | StoreError::NotFound {
                kind: RecordKind::Company,
                id,
            } => Self::CompanyNotFound(id),
            StoreError::NotFound {
                kind: RecordKind::Update,
                id,
            } => Self::UpdateNotFound(id),
            other => Self::Store(other),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RenderError> for ServiceError {
    fn from(value: RenderError) -> Self {
        Self::Render(value)
    }
}

impl From<FormatError> for ServiceError {
    fn from(value: FormatError) -> Self {
        Self::Export(value)
    }
}

/// Onboarding form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCompany {
    pub company_name: String,
    pub contact_name: String,
    pub contact_email: String,
    pub portfolio_manager: String,
    pub fund: String,
    pub reporting_cadence: Cadence,
}

/// Update submission form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUpdate {
    pub company_id: CompanyId,
    pub reporting_period: String,
    pub revenue: String,
    pub expenses: String,
    pub cash: String,
    pub runway_months: u32,
    pub wins: String,
    pub challenges: String,
    pub asks: String,
    pub investment_update: String,
    pub narrative: String,
    pub meeting_agenda: String,
    pub meeting_minutes: String,
    pub data_warehouse_link: Option<String>,
    pub submitted_by: String,
}

/// Portfolio service facade over a record store.
pub struct PortfolioService<S: RecordStore> {
    store: S,
    base_url: Option<String>,
}

impl<S: RecordStore> PortfolioService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            base_url: None,
        }
    }

    /// Enables submission links rooted at `base_url`. Blank disables them.
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Creates an active company whose first due date is one cadence from `today`.
    pub fn onboard_company(&self, request: &NewCompany, today: NaiveDate) -> ServiceResult<Company> {
        let mut company = Company::new(
            request.company_name.as_str(),
            request.reporting_cadence.clone(),
            today,
        );
        company.contact_name = request.contact_name.trim().to_string();
        company.contact_email = request.contact_email.trim().to_string();
        company.portfolio_manager = request.portfolio_manager.trim().to_string();
        company.fund = request.fund.trim().to_string();
        company.validate()?;

        if !company.reporting_cadence.is_known() {
            warn!(
                "event=company_onboard module=service status=fallback reason=unknown_cadence cadence={:?}",
                company.reporting_cadence.as_str()
            );
        }
        self.store.create_company(&company)?;
        info!(
            "event=company_onboard module=service status=ok company_id={} cadence={} next_due={}",
            company.company_id,
            company.reporting_cadence,
            display_date(company.next_due_date)
        );
        Ok(company)
    }

    pub fn get_company(&self, company_id: CompanyId) -> ServiceResult<Company> {
        self.store
            .get_company(company_id)?
            .ok_or(ServiceError::CompanyNotFound(company_id))
    }

    /// Every company whose name matches `name` (trimmed, case-insensitive).
    ///
    /// Names are not unique, so callers decide what more than one match means.
    pub fn find_companies_by_name(&self, name: &str) -> ServiceResult<Vec<Company>> {
        let needle = name.trim().to_lowercase();
        let mut matches: Vec<Company> = self
            .store
            .list_companies()?
            .into_iter()
            .filter(|company| company.company_name.trim().to_lowercase() == needle)
            .collect();
        matches.sort_by_key(|company| company.company_id);
        Ok(matches)
    }

    /// Companies with status badges and history, sorted by name.
    pub fn list_companies(&self, today: NaiveDate) -> ServiceResult<Vec<CompanyOverview>> {
        let companies = self.store.list_companies()?;
        let updates = self.store.list_updates()?;
        Ok(overview(&companies, &updates, today))
    }

    /// Flips the company in or out of the dashboard counts and reminders.
    pub fn set_company_active(
        &self,
        company_id: CompanyId,
        is_active: bool,
    ) -> ServiceResult<Company> {
        self.store.set_company_active(company_id, is_active)?;
        info!(
            "event=company_set_active module=service status=ok company_id={} is_active={}",
            company_id, is_active
        );
        self.get_company(company_id)
    }

    /// Deletes the company and its updates; returns the number of updates removed.
    pub fn delete_company(&self, company_id: CompanyId) -> ServiceResult<usize> {
        let removed = self.store.delete_company(company_id)?;
        info!(
            "event=company_delete module=service status=ok company_id={} updates_removed={}",
            company_id, removed
        );
        Ok(removed)
    }

    /// Persists the update, then moves the company's next due date.
    pub fn submit_update(&self, request: &NewUpdate, today: NaiveDate) -> ServiceResult<Update> {
        let started_at = Instant::now();
        let update = build_update(request, today);
        update.validate()?;
        let company = self.get_company(request.company_id)?;

        self.store.create_update(&update)?;
        let due = next_due(&company.reporting_cadence, today);
        self.store
            .update_company_due_date(company.company_id, Some(due))?;

        info!(
            "event=update_submit module=service status=ok update_id={} company_id={} next_due={} duration_ms={}",
            update.update_id,
            company.company_id,
            due,
            started_at.elapsed().as_millis()
        );
        Ok(update)
    }

    pub fn get_update(&self, update_id: UpdateId) -> ServiceResult<Update> {
        self.store
            .get_update(update_id)?
            .ok_or(ServiceError::UpdateNotFound(update_id))
    }

    /// Updates matching `filter`, newest first.
    pub fn list_updates(&self, filter: &UpdateFilter) -> ServiceResult<UpdateListResult> {
        let companies = self.store.list_companies()?;
        let updates = self.store.list_updates()?;
        Ok(filter_updates(updates, &companies, filter))
    }

    /// Returns `false` when the update did not exist.
    pub fn delete_update(&self, update_id: UpdateId) -> ServiceResult<bool> {
        let deleted = self.store.delete_update(update_id)?;
        info!(
            "event=update_delete module=service status={} update_id={}",
            if deleted { "ok" } else { "noop" },
            update_id
        );
        Ok(deleted)
    }

    pub fn dashboard(&self, today: NaiveDate) -> ServiceResult<DashboardSummary> {
        let companies = self.store.list_companies()?;
        let updates = self.store.list_updates()?;
        Ok(summarize(&companies, &updates, today))
    }

    /// Overdue and upcoming active companies, with links when configured.
    pub fn reminders(&self, today: NaiveDate) -> ServiceResult<Vec<ReminderEntry>> {
        let companies = self.store.list_companies()?;
        Ok(reminder_sequence(&companies, today, |company| {
            let base_url = self.base_url.as_deref()?;
            match submission_link(base_url, &company.company_name, &company.access_token) {
                Ok(link) => Some(link),
                Err(err) => {
                    warn!(
                        "event=submission_link module=service status=error company_id={} error={}",
                        company.company_id, err
                    );
                    None
                }
            }
        }))
    }

    /// Secure submission link for one company.
    pub fn submission_link(&self, company_id: CompanyId) -> ServiceResult<String> {
        let base_url = self.base_url.as_deref().ok_or(ServiceError::MissingBaseUrl)?;
        let company = self.get_company(company_id)?;
        submission_link(base_url, &company.company_name, &company.access_token).map_err(|source| {
            ServiceError::InvalidBaseUrl {
                base_url: base_url.to_string(),
                source,
            }
        })
    }

    /// Renders one update without touching the filesystem.
    pub fn render_report(
        &self,
        update_id: UpdateId,
        generated_at: NaiveDateTime,
    ) -> ServiceResult<RenderedReport> {
        let update = self.get_update(update_id)?;
        let company_name = self.store.get_company(update.company_id)?.map_or_else(
            || crate::service::update_query::UNKNOWN_COMPANY_NAME.to_string(),
            |company| company.company_name,
        );
        Ok(render_update(&update, &company_name, generated_at)?)
    }

    /// Renders one update into `out_dir` and records the written path.
    pub fn export_report(
        &self,
        update_id: UpdateId,
        out_dir: &Path,
        generated_at: NaiveDateTime,
    ) -> ServiceResult<(PathBuf, RenderedReport)> {
        let report = self.render_report(update_id, generated_at)?;
        std::fs::create_dir_all(out_dir).map_err(|source| ServiceError::Io {
            path: out_dir.to_path_buf(),
            source,
        })?;
        let path = out_dir.join(&report.file_name);
        atomic_write(&path, &report.bytes).map_err(|source| ServiceError::Io {
            path: path.clone(),
            source,
        })?;

        if let Err(err) = self
            .store
            .set_update_pdf_path(update_id, &path.to_string_lossy())
        {
            warn!(
                "event=report_export module=service status=fallback reason=pdf_path_not_recorded update_id={} error={}",
                update_id, err
            );
        }
        info!(
            "event=report_export module=service status=ok update_id={} path={}",
            update_id,
            path.display()
        );
        Ok((path, report))
    }

    /// Serializes every update, optionally for one company only.
    pub fn export_updates(
        &self,
        format: ExportFormat,
        company_id: Option<CompanyId>,
    ) -> ServiceResult<Vec<u8>> {
        if let Some(id) = company_id {
            self.get_company(id)?;
        }
        let mut updates: Vec<Update> = self
            .store
            .list_updates()?
            .into_iter()
            .filter(|update| company_id.map_or(true, |id| update.company_id == id))
            .collect();
        updates.sort_by(|left, right| {
            right
                .submission_date
                .cmp(&left.submission_date)
                .then_with(|| left.update_id.cmp(&right.update_id))
        });
        let bytes = export_updates(&updates, format)?;
        info!(
            "event=updates_export module=service status=ok format={} rows={} bytes={}",
            format,
            updates.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}

fn build_update(request: &NewUpdate, today: NaiveDate) -> Update {
    let mut update = Update::new(
        request.company_id,
        request.reporting_period.trim(),
        request.submitted_by.trim(),
        today,
    );
    update.revenue = request.revenue.trim().to_string();
    update.expenses = request.expenses.trim().to_string();
    update.cash = request.cash.trim().to_string();
    update.runway_months = request.runway_months;
    update.wins = request.wins.clone();
    update.challenges = request.challenges.clone();
    update.asks = request.asks.clone();
    update.investment_update = request.investment_update.clone();
    update.narrative = request.narrative.clone();
    update.meeting_agenda = request.meeting_agenda.clone();
    update.meeting_minutes = request.meeting_minutes.clone();
    update.data_warehouse_link = request
        .data_warehouse_link
        .as_deref()
        .map(str::trim)
        .filter(|link| !link.is_empty())
        .map(str::to_string);
    update
}

fn display_date(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "none".to_string(), |date| date.to_string())
}
