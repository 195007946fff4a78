//! Flat-file record store (one file per collection).
//!
//! # Responsibility
//! - Persist companies and updates as whole collections in JSON or CSV files.
//! - Serve reads through the process-wide snapshot cache.
//!
//! # Invariants
//! - Every write is read-modify-write of the whole collection, committed by
//!   atomic rename, followed by cache invalidation of that file.
//! - A missing collection file reads as an empty collection.
//! - Collection paths are canonical, so aliased data directories share one
//!   cache entry per file.
//! - Company deletion rewrites updates before companies, so an interrupted
//!   delete never leaves updates pointing at a removed company.

use super::atomic::atomic_write;
use super::record_store::{RecordKind, RecordStore, StoreError, StoreResult};
use super::snapshot_cache;
use super::table_format::{CsvTable, JsonTable, TableFormat};
use crate::model::company::{Company, CompanyId, COMPANY_FIELDS};
use crate::model::update::{Update, UpdateId, UPDATE_FIELDS};
use chrono::NaiveDate;
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// JSON-array-per-file backend.
pub type JsonFileStore = FileStore<JsonTable>;
/// CSV-table-per-file backend.
pub type CsvFileStore = FileStore<CsvTable>;

/// Whole-collection file store parameterized by its table encoding.
#[derive(Debug, Clone)]
pub struct FileStore<F: TableFormat> {
    companies_path: PathBuf,
    updates_path: PathBuf,
    format: PhantomData<F>,
}

impl<F: TableFormat> FileStore<F> {
    /// Opens (and initializes when missing) the collection files in `data_dir`.
    pub fn open(data_dir: impl AsRef<Path>) -> StoreResult<Self> {
        let requested = data_dir.as_ref();
        std::fs::create_dir_all(requested).map_err(|source| StoreError::Io {
            path: requested.to_path_buf(),
            source,
        })?;
        // Cache keys must be one spelling per file.
        let data_dir = std::fs::canonicalize(requested).map_err(|source| StoreError::Io {
            path: requested.to_path_buf(),
            source,
        })?;
        let data_dir = data_dir.as_path();

        let store = Self {
            companies_path: data_dir.join(format!("companies.{}", F::EXTENSION)),
            updates_path: data_dir.join(format!("updates.{}", F::EXTENSION)),
            format: PhantomData,
        };
        store.ensure_collection::<Company>(&store.companies_path, COMPANY_FIELDS)?;
        store.ensure_collection::<Update>(&store.updates_path, UPDATE_FIELDS)?;
        Ok(store)
    }

    pub fn companies_path(&self) -> &Path {
        &self.companies_path
    }

    pub fn updates_path(&self) -> &Path {
        &self.updates_path
    }

    fn ensure_collection<T: Serialize>(&self, path: &Path, columns: &[&str]) -> StoreResult<()> {
        if path.exists() {
            return Ok(());
        }
        self.write_collection::<T>(path, &[], columns)
    }

    fn read_collection<T>(&self, path: &Path) -> StoreResult<Vec<T>>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        snapshot_cache::read_through(path, || {
            let bytes = match std::fs::read(path) {
                Ok(bytes) => bytes,
                Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
                Err(source) => {
                    return Err(StoreError::Io {
                        path: path.to_path_buf(),
                        source,
                    })
                }
            };
            F::decode(&bytes).map_err(|err| StoreError::Decode {
                path: path.to_path_buf(),
                message: err.to_string(),
            })
        })
    }

    fn write_collection<T: Serialize>(
        &self,
        path: &Path,
        records: &[T],
        columns: &[&str],
    ) -> StoreResult<()> {
        let bytes = F::encode(records, columns).map_err(|err| StoreError::Encode {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        let result = atomic_write(path, &bytes).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        });
        // Invalidate even on failure: the rename may have happened before the error.
        snapshot_cache::invalidate(path);
        result?;
        debug!(
            "event=collection_write module=repo status=ok backend={} records={} bytes={}",
            F::EXTENSION,
            records.len(),
            bytes.len()
        );
        Ok(())
    }

    fn write_companies(&self, companies: &[Company]) -> StoreResult<()> {
        self.write_collection(&self.companies_path, companies, COMPANY_FIELDS)
    }

    fn write_updates(&self, updates: &[Update]) -> StoreResult<()> {
        self.write_collection(&self.updates_path, updates, UPDATE_FIELDS)
    }
}

impl<F: TableFormat> RecordStore for FileStore<F> {
    fn backend(&self) -> &'static str {
        F::EXTENSION
    }

    fn create_company(&self, company: &Company) -> StoreResult<CompanyId> {
        company.validate()?;

        let mut companies = self.list_companies()?;
        if companies
            .iter()
            .any(|existing| existing.company_id == company.company_id)
        {
            return Err(StoreError::DuplicateId {
                kind: RecordKind::Company,
                id: company.company_id,
            });
        }
        companies.push(company.clone());
        self.write_companies(&companies)?;

        info!(
            "event=company_create module=repo status=ok backend={} company_id={}",
            F::EXTENSION,
            company.company_id
        );
        Ok(company.company_id)
    }

    fn create_update(&self, update: &Update) -> StoreResult<UpdateId> {
        update.validate()?;

        if self.get_company(update.company_id)?.is_none() {
            return Err(StoreError::UnknownCompany(update.company_id));
        }

        let mut updates = self.list_updates()?;
        if updates
            .iter()
            .any(|existing| existing.update_id == update.update_id)
        {
            return Err(StoreError::DuplicateId {
                kind: RecordKind::Update,
                id: update.update_id,
            });
        }
        updates.push(update.clone());
        self.write_updates(&updates)?;

        info!(
            "event=update_create module=repo status=ok backend={} update_id={} company_id={}",
            F::EXTENSION,
            update.update_id,
            update.company_id
        );
        Ok(update.update_id)
    }

    fn list_companies(&self) -> StoreResult<Vec<Company>> {
        self.read_collection(&self.companies_path)
    }

    fn list_updates(&self) -> StoreResult<Vec<Update>> {
        self.read_collection(&self.updates_path)
    }

    fn update_company_due_date(
        &self,
        id: CompanyId,
        next_due_date: Option<NaiveDate>,
    ) -> StoreResult<()> {
        let mut companies = self.list_companies()?;
        let company = companies
            .iter_mut()
            .find(|company| company.company_id == id)
            .ok_or(StoreError::NotFound {
                kind: RecordKind::Company,
                id,
            })?;
        company.next_due_date = next_due_date;
        self.write_companies(&companies)
    }

    fn set_company_active(&self, id: CompanyId, is_active: bool) -> StoreResult<()> {
        let mut companies = self.list_companies()?;
        let company = companies
            .iter_mut()
            .find(|company| company.company_id == id)
            .ok_or(StoreError::NotFound {
                kind: RecordKind::Company,
                id,
            })?;
        if company.is_active == is_active {
            return Ok(());
        }
        company.is_active = is_active;
        self.write_companies(&companies)
    }

    fn delete_company(&self, id: CompanyId) -> StoreResult<usize> {
        let mut companies = self.list_companies()?;
        if !companies.iter().any(|company| company.company_id == id) {
            return Err(StoreError::NotFound {
                kind: RecordKind::Company,
                id,
            });
        }

        let mut updates = self.list_updates()?;
        let before = updates.len();
        updates.retain(|update| update.company_id != id);
        let removed = before - updates.len();
        if removed > 0 {
            self.write_updates(&updates)?;
        }

        companies.retain(|company| company.company_id != id);
        self.write_companies(&companies)?;

        info!(
            "event=company_delete module=repo status=ok backend={} company_id={} updates_removed={}",
            F::EXTENSION,
            id,
            removed
        );
        Ok(removed)
    }

    fn delete_update(&self, id: UpdateId) -> StoreResult<bool> {
        let mut updates = self.list_updates()?;
        let before = updates.len();
        updates.retain(|update| update.update_id != id);
        if updates.len() == before {
            debug!("event=update_delete module=repo status=noop update_id={id}");
            return Ok(false);
        }
        self.write_updates(&updates)?;
        info!(
            "event=update_delete module=repo status=ok backend={} update_id={}",
            F::EXTENSION,
            id
        );
        Ok(true)
    }

    fn set_update_pdf_path(&self, id: UpdateId, pdf_path: &str) -> StoreResult<()> {
        let mut updates = self.list_updates()?;
        let Some(update) = updates.iter_mut().find(|update| update.update_id == id) else {
            debug!("event=update_pdf_path module=repo status=noop update_id={id}");
            return Ok(());
        };
        update.pdf_path = Some(pdf_path.to_string());
        self.write_updates(&updates)
    }
}
