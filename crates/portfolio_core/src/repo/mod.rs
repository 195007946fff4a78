//! Record store abstractions and backend implementations.
//!
//! # Responsibility
//! - Define the storage contract for companies and updates.
//! - Provide JSON, CSV and SQLite backends behind that contract.
//!
//! # Invariants
//! - Store writes enforce record `validate()` before persistence.
//! - Store APIs return semantic errors (`NotFound`, `UnknownCompany`) in
//!   addition to I/O and database errors.

pub(crate) mod atomic;
pub mod file_store;
pub mod record_store;
pub mod snapshot_cache;
pub mod sqlite_store;
pub mod table_format;

use file_store::{CsvFileStore, JsonFileStore};
use log::info;
use record_store::{RecordStore, StoreResult};
use serde::{Deserialize, Serialize};
use sqlite_store::SqliteRecordStore;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::str::FromStr;

/// SQLite database file name inside the data directory.
pub const SQLITE_FILE_NAME: &str = "portfolio.sqlite3";

/// Durable medium selected by configuration.
///
/// Config files, env vars and flags all parse through [`FromStr`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum StoreBackend {
    #[default]
    Json,
    Csv,
    Sqlite,
}

impl StoreBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Sqlite => "sqlite",
        }
    }
}

impl Display for StoreBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "sqlite" | "sql" => Ok(Self::Sqlite),
            other => Err(format!(
                "unsupported store backend `{other}`; expected json|csv|sqlite"
            )),
        }
    }
}

impl TryFrom<String> for StoreBackend {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Opens the configured backend rooted at `data_dir`.
pub fn open_store(backend: StoreBackend, data_dir: &Path) -> StoreResult<Box<dyn RecordStore>> {
    let store: Box<dyn RecordStore> = match backend {
        StoreBackend::Json => Box::new(JsonFileStore::open(data_dir)?),
        StoreBackend::Csv => Box::new(CsvFileStore::open(data_dir)?),
        StoreBackend::Sqlite => {
            std::fs::create_dir_all(data_dir).map_err(|source| {
                record_store::StoreError::Io {
                    path: data_dir.to_path_buf(),
                    source,
                }
            })?;
            Box::new(SqliteRecordStore::open(data_dir.join(SQLITE_FILE_NAME))?)
        }
    };
    info!(
        "event=store_open module=repo status=ok backend={} data_dir={}",
        backend,
        data_dir.display()
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::StoreBackend;

    #[test]
    fn backend_parses_case_insensitively() {
        assert_eq!("JSON".parse::<StoreBackend>(), Ok(StoreBackend::Json));
        assert_eq!(" csv ".parse::<StoreBackend>(), Ok(StoreBackend::Csv));
        assert_eq!("sql".parse::<StoreBackend>(), Ok(StoreBackend::Sqlite));
        assert!("parquet".parse::<StoreBackend>().is_err());
    }
}
