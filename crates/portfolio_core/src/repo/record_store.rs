//! Record store contract shared by every storage backend.
//!
//! # Responsibility
//! - Define CRUD operations over companies and updates.
//! - Define store errors with operator-facing remediation text.
//!
//! # Invariants
//! - `create_*` validates the record and never overwrites an existing id.
//! - Reads return the full current snapshot; ordering is not promised.
//! - Business validation runs on writes only. Reads reject undecodable
//!   records (bad ids, dates, types) on every backend, but load records that
//!   merely fail `validate()` so they can still be listed, fixed or deleted.
//! - `delete_company` removes the company and every update that references it.
//! - `delete_update` on a missing id is a no-op returning `false`.
//! - No concurrent-writer arbitration: the last whole-collection write wins.

use crate::db::DbError;
use crate::model::company::{Company, CompanyId};
use crate::model::update::{Update, UpdateId};
use crate::model::validation::ValidationError;
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Company,
    Update,
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Company => f.write_str("company"),
            Self::Update => f.write_str("update"),
        }
    }
}

/// Store-level failure for persistence and lookup operations.
#[derive(Debug)]
pub enum StoreError {
    Validation(ValidationError),
    Db(DbError),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Stored file exists but cannot be decoded as the configured format.
    Decode {
        path: PathBuf,
        message: String,
    },
    Encode {
        path: PathBuf,
        message: String,
    },
    DuplicateId {
        kind: RecordKind,
        id: Uuid,
    },
    NotFound {
        kind: RecordKind,
        id: Uuid,
    },
    /// Update references a company that does not exist.
    UnknownCompany(CompanyId),
    InvalidData(String),
}

impl StoreError {
    /// Operator-facing hint for recovering from this failure.
    pub fn remediation(&self) -> &'static str {
        match self {
            Self::Validation(_) => "fill in the required fields and submit again",
            Self::Db(DbError::UnsupportedSchemaVersion { .. }) => {
                "the database was written by a newer release; upgrade this binary"
            }
            Self::Db(DbError::Migration { .. } | DbError::MissingTable(_)) => {
                "the database file is damaged or belongs to another tool; point the data directory elsewhere"
            }
            Self::Db(DbError::Sqlite(_)) => {
                "check that the database file exists, is writable and is not locked by another process"
            }
            Self::Io { .. } => "check that the data directory exists and is writable",
            Self::Decode { .. } | Self::InvalidData(_) => {
                "the stored data is malformed; restore it from a backup or fix the reported record"
            }
            Self::Encode { .. } => "a record could not be serialized; report this as a bug",
            Self::DuplicateId { .. } => "retry the action; a fresh identifier will be generated",
            Self::NotFound { .. } | Self::UnknownCompany(_) => {
                "list the records again; the target may have been deleted"
            }
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Io { path, source } => write!(f, "cannot access `{}`: {source}", path.display()),
            Self::Decode { path, message } => {
                write!(f, "cannot decode `{}`: {message}", path.display())
            }
            Self::Encode { path, message } => {
                write!(f, "cannot encode records for `{}`: {message}", path.display())
            }
            Self::DuplicateId { kind, id } => write!(f, "{kind} id already exists: {id}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::UnknownCompany(id) => write!(f, "update references unknown company: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract for companies and their updates.
pub trait RecordStore {
    /// Short backend label used in log events.
    fn backend(&self) -> &'static str;

    fn create_company(&self, company: &Company) -> StoreResult<CompanyId>;
    fn create_update(&self, update: &Update) -> StoreResult<UpdateId>;
    fn list_companies(&self) -> StoreResult<Vec<Company>>;
    fn list_updates(&self) -> StoreResult<Vec<Update>>;

    fn get_company(&self, id: CompanyId) -> StoreResult<Option<Company>> {
        Ok(self
            .list_companies()?
            .into_iter()
            .find(|company| company.company_id == id))
    }

    fn get_update(&self, id: UpdateId) -> StoreResult<Option<Update>> {
        Ok(self
            .list_updates()?
            .into_iter()
            .find(|update| update.update_id == id))
    }

    /// Overwrites the company's next due date; `NotFound` when missing.
    fn update_company_due_date(
        &self,
        id: CompanyId,
        next_due_date: Option<NaiveDate>,
    ) -> StoreResult<()>;

    /// Marks the company active or inactive; `NotFound` when missing.
    fn set_company_active(&self, id: CompanyId, is_active: bool) -> StoreResult<()>;

    /// Deletes the company and its updates; returns the number of updates removed.
    fn delete_company(&self, id: CompanyId) -> StoreResult<usize>;

    /// Deletes one update; returns `false` when it did not exist.
    fn delete_update(&self, id: UpdateId) -> StoreResult<bool>;

    /// Records where the last report for this update was written.
    ///
    /// Advisory only: a missing update is ignored.
    fn set_update_pdf_path(&self, id: UpdateId, pdf_path: &str) -> StoreResult<()>;
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn backend(&self) -> &'static str {
        (**self).backend()
    }

    fn create_company(&self, company: &Company) -> StoreResult<CompanyId> {
        (**self).create_company(company)
    }

    fn create_update(&self, update: &Update) -> StoreResult<UpdateId> {
        (**self).create_update(update)
    }

    fn list_companies(&self) -> StoreResult<Vec<Company>> {
        (**self).list_companies()
    }

    fn list_updates(&self) -> StoreResult<Vec<Update>> {
        (**self).list_updates()
    }

    fn get_company(&self, id: CompanyId) -> StoreResult<Option<Company>> {
        (**self).get_company(id)
    }

    fn get_update(&self, id: UpdateId) -> StoreResult<Option<Update>> {
        (**self).get_update(id)
    }

    fn update_company_due_date(
        &self,
        id: CompanyId,
        next_due_date: Option<NaiveDate>,
    ) -> StoreResult<()> {
        (**self).update_company_due_date(id, next_due_date)
    }

    fn set_company_active(&self, id: CompanyId, is_active: bool) -> StoreResult<()> {
        (**self).set_company_active(id, is_active)
    }

    fn delete_company(&self, id: CompanyId) -> StoreResult<usize> {
        (**self).delete_company(id)
    }

    fn delete_update(&self, id: UpdateId) -> StoreResult<bool> {
        (**self).delete_update(id)
    }

    fn set_update_pdf_path(&self, id: UpdateId, pdf_path: &str) -> StoreResult<()> {
        (**self).set_update_pdf_path(id, pdf_path)
    }
}
