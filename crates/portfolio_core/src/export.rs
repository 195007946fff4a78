//! Bulk export of the update collection.
//!
//! # Invariants
//! - Exports carry every persisted update field, named as in storage.
//! - JSON exports are an array of objects; CSV exports always have a header.

use crate::model::update::{Update, UPDATE_FIELDS};
use crate::repo::table_format::{CsvTable, FormatError, JsonTable, TableFormat};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => JsonTable::EXTENSION,
            Self::Csv => CsvTable::EXTENSION,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv",
        }
    }

    /// Default download name, e.g. `updates.csv`.
    pub fn file_name(self) -> String {
        format!("updates.{}", self.extension())
    }
}

impl Display for ExportFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unsupported export format `{other}`; expected json|csv")),
        }
    }
}

/// Serializes `updates` in the requested format.
pub fn export_updates(updates: &[Update], format: ExportFormat) -> Result<Vec<u8>, FormatError> {
    match format {
        ExportFormat::Json => JsonTable::encode(updates, UPDATE_FIELDS),
        ExportFormat::Csv => CsvTable::encode(updates, UPDATE_FIELDS),
    }
}

#[cfg(test)]
mod tests {
    use super::{export_updates, ExportFormat};
    use crate::model::update::{Update, UPDATE_FIELDS};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn sample() -> Update {
        let mut update = Update::new(
            Uuid::new_v4(),
            "May 2025",
            "Lee",
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        );
        update.cash = "$4,100,000".to_string();
        update.runway_months = 22;
        update
    }

    #[test]
    fn csv_header_lists_every_update_field() {
        let bytes = export_updates(&[sample()], ExportFormat::Csv).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, UPDATE_FIELDS.join(","));
        assert!(text.contains("\"$4,100,000\""));
    }

    #[test]
    fn json_export_is_array_of_objects_with_all_fields() {
        let bytes = export_updates(&[sample()], ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        let object = rows[0].as_object().unwrap();
        for field in UPDATE_FIELDS {
            assert!(object.contains_key(*field), "missing field {field}");
        }
        assert_eq!(object["runway_months"], 22);
    }

    #[test]
    fn format_parses_and_names_download() {
        assert_eq!("CSV".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert_eq!(ExportFormat::Csv.file_name(), "updates.csv");
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }
}
