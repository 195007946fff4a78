//! SQLite-backed record store.
//!
//! # Responsibility
//! - Persist companies and updates as relational rows.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `validate()` before SQL mutations.
//! - Read paths reject undecodable rows; business validation is left to writes.
//! - Company deletion removes its update rows in the same transaction.

use super::record_store::{RecordKind, RecordStore, StoreError, StoreResult};
use crate::db::{open_db, open_db_in_memory};
use crate::model::company::{Company, CompanyId};
use crate::model::update::{Update, UpdateId};
use crate::schedule::cadence::Cadence;
use chrono::NaiveDate;
use log::{debug, info};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

const COMPANY_SELECT_SQL: &str = "SELECT
    company_id,
    company_name,
    contact_name,
    contact_email,
    portfolio_manager,
    fund,
    reporting_cadence,
    next_due_date,
    access_token,
    is_active,
    created_at
FROM companies";

const UPDATE_SELECT_SQL: &str = "SELECT
    update_id,
    company_id,
    submission_date,
    reporting_period,
    revenue,
    expenses,
    cash,
    runway_months,
    wins,
    challenges,
    asks,
    investment_update,
    narrative,
    meeting_agenda,
    meeting_minutes,
    data_warehouse_link,
    submitted_by,
    pdf_path
FROM updates";

/// Relational backend over one owned SQLite connection.
pub struct SqliteRecordStore {
    conn: Connection,
}

impl SqliteRecordStore {
    /// Wraps a connection that already went through [`open_db`].
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn company_exists(&self, id: CompanyId) -> StoreResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM companies WHERE company_id = ?1);",
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn update_exists(&self, id: UpdateId) -> StoreResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM updates WHERE update_id = ?1);",
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

impl RecordStore for SqliteRecordStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn create_company(&self, company: &Company) -> StoreResult<CompanyId> {
        company.validate()?;
        if self.company_exists(company.company_id)? {
            return Err(StoreError::DuplicateId {
                kind: RecordKind::Company,
                id: company.company_id,
            });
        }

        self.conn.execute(
            "INSERT INTO companies (
                company_id,
                company_name,
                contact_name,
                contact_email,
                portfolio_manager,
                fund,
                reporting_cadence,
                next_due_date,
                access_token,
                is_active,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                company.company_id.to_string(),
                company.company_name.as_str(),
                company.contact_name.as_str(),
                company.contact_email.as_str(),
                company.portfolio_manager.as_str(),
                company.fund.as_str(),
                company.reporting_cadence.as_str(),
                company.next_due_date.map(date_to_db),
                company.access_token.as_str(),
                bool_to_int(company.is_active),
                date_to_db(company.created_at),
            ],
        )?;

        info!(
            "event=company_create module=repo status=ok backend=sqlite company_id={}",
            company.company_id
        );
        Ok(company.company_id)
    }

    fn create_update(&self, update: &Update) -> StoreResult<UpdateId> {
        update.validate()?;
        if !self.company_exists(update.company_id)? {
            return Err(StoreError::UnknownCompany(update.company_id));
        }
        if self.update_exists(update.update_id)? {
            return Err(StoreError::DuplicateId {
                kind: RecordKind::Update,
                id: update.update_id,
            });
        }

        self.conn.execute(
            "INSERT INTO updates (
                update_id,
                company_id,
                submission_date,
                reporting_period,
                revenue,
                expenses,
                cash,
                runway_months,
                wins,
                challenges,
                asks,
                investment_update,
                narrative,
                meeting_agenda,
                meeting_minutes,
                data_warehouse_link,
                submitted_by,
                pdf_path
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18);",
            params![
                update.update_id.to_string(),
                update.company_id.to_string(),
                date_to_db(update.submission_date),
                update.reporting_period.as_str(),
                update.revenue.as_str(),
                update.expenses.as_str(),
                update.cash.as_str(),
                i64::from(update.runway_months),
                update.wins.as_str(),
                update.challenges.as_str(),
                update.asks.as_str(),
                update.investment_update.as_str(),
                update.narrative.as_str(),
                update.meeting_agenda.as_str(),
                update.meeting_minutes.as_str(),
                update.data_warehouse_link.as_deref(),
                update.submitted_by.as_str(),
                update.pdf_path.as_deref(),
            ],
        )?;

        info!(
            "event=update_create module=repo status=ok backend=sqlite update_id={} company_id={}",
            update.update_id, update.company_id
        );
        Ok(update.update_id)
    }

    fn list_companies(&self) -> StoreResult<Vec<Company>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COMPANY_SELECT_SQL} ORDER BY company_name ASC, company_id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut companies = Vec::new();
        while let Some(row) = rows.next()? {
            companies.push(parse_company_row(row)?);
        }
        Ok(companies)
    }

    fn list_updates(&self) -> StoreResult<Vec<Update>> {
        let mut stmt = self.conn.prepare(&format!(
            "{UPDATE_SELECT_SQL} ORDER BY submission_date DESC, update_id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut updates = Vec::new();
        while let Some(row) = rows.next()? {
            updates.push(parse_update_row(row)?);
        }
        Ok(updates)
    }

    fn get_company(&self, id: CompanyId) -> StoreResult<Option<Company>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COMPANY_SELECT_SQL} WHERE company_id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_company_row(row)?)),
            None => Ok(None),
        }
    }

    fn get_update(&self, id: UpdateId) -> StoreResult<Option<Update>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{UPDATE_SELECT_SQL} WHERE update_id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_update_row(row)?)),
            None => Ok(None),
        }
    }

    fn update_company_due_date(
        &self,
        id: CompanyId,
        next_due_date: Option<NaiveDate>,
    ) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE companies SET next_due_date = ?1 WHERE company_id = ?2;",
            params![next_due_date.map(date_to_db), id.to_string()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: RecordKind::Company,
                id,
            });
        }
        Ok(())
    }

    fn set_company_active(&self, id: CompanyId, is_active: bool) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE companies SET is_active = ?1 WHERE company_id = ?2;",
            params![bool_to_int(is_active), id.to_string()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: RecordKind::Company,
                id,
            });
        }
        Ok(())
    }

    fn delete_company(&self, id: CompanyId) -> StoreResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute(
            "DELETE FROM updates WHERE company_id = ?1;",
            [id.to_string()],
        )?;
        let deleted = tx.execute(
            "DELETE FROM companies WHERE company_id = ?1;",
            [id.to_string()],
        )?;
        if deleted == 0 {
            // Dropping the transaction rolls back the update deletion.
            return Err(StoreError::NotFound {
                kind: RecordKind::Company,
                id,
            });
        }
        tx.commit()?;

        info!(
            "event=company_delete module=repo status=ok backend=sqlite company_id={id} updates_removed={removed}"
        );
        Ok(removed)
    }

    fn delete_update(&self, id: UpdateId) -> StoreResult<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM updates WHERE update_id = ?1;", [id.to_string()])?;
        if deleted == 0 {
            debug!("event=update_delete module=repo status=noop update_id={id}");
            return Ok(false);
        }
        info!("event=update_delete module=repo status=ok backend=sqlite update_id={id}");
        Ok(true)
    }

    fn set_update_pdf_path(&self, id: UpdateId, pdf_path: &str) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE updates SET pdf_path = ?1 WHERE update_id = ?2;",
            params![pdf_path, id.to_string()],
        )?;
        if changed == 0 {
            debug!("event=update_pdf_path module=repo status=noop update_id={id}");
        }
        Ok(())
    }
}

fn parse_company_row(row: &Row<'_>) -> StoreResult<Company> {
    let cadence: String = row.get("reporting_cadence")?;
    let next_due_date = row
        .get::<_, Option<String>>("next_due_date")?
        .map(|value| parse_date(&value, "companies.next_due_date"))
        .transpose()?;

    let company = Company {
        company_id: parse_uuid(&row.get::<_, String>("company_id")?, "companies.company_id")?,
        company_name: row.get("company_name")?,
        contact_name: row.get("contact_name")?,
        contact_email: row.get("contact_email")?,
        portfolio_manager: row.get("portfolio_manager")?,
        fund: row.get("fund")?,
        reporting_cadence: Cadence::parse(&cadence),
        next_due_date,
        access_token: row.get("access_token")?,
        is_active: parse_bool(row.get("is_active")?, "companies.is_active")?,
        created_at: parse_date(&row.get::<_, String>("created_at")?, "companies.created_at")?,
    };
    Ok(company)
}

fn parse_update_row(row: &Row<'_>) -> StoreResult<Update> {
    let runway: i64 = row.get("runway_months")?;
    let runway_months = u32::try_from(runway).map_err(|_| {
        StoreError::InvalidData(format!(
            "invalid runway `{runway}` in updates.runway_months"
        ))
    })?;

    let update = Update {
        update_id: parse_uuid(&row.get::<_, String>("update_id")?, "updates.update_id")?,
        company_id: parse_uuid(&row.get::<_, String>("company_id")?, "updates.company_id")?,
        submission_date: parse_date(
            &row.get::<_, String>("submission_date")?,
            "updates.submission_date",
        )?,
        reporting_period: row.get("reporting_period")?,
        revenue: row.get("revenue")?,
        expenses: row.get("expenses")?,
        cash: row.get("cash")?,
        runway_months,
        wins: row.get("wins")?,
        challenges: row.get("challenges")?,
        asks: row.get("asks")?,
        investment_update: row.get("investment_update")?,
        narrative: row.get("narrative")?,
        meeting_agenda: row.get("meeting_agenda")?,
        meeting_minutes: row.get("meeting_minutes")?,
        data_warehouse_link: row.get("data_warehouse_link")?,
        submitted_by: row.get("submitted_by")?,
        pdf_path: row.get("pdf_path")?,
    };
    Ok(update)
}

fn parse_uuid(value: &str, column: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn parse_date(value: &str, column: &str) -> StoreResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| StoreError::InvalidData(format!("invalid date `{value}` in {column}")))
}

fn parse_bool(value: i64, column: &str) -> StoreResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(StoreError::InvalidData(format!(
            "invalid boolean `{other}` in {column}"
        ))),
    }
}

fn date_to_db(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}
