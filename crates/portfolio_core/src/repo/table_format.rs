//! Flat-table encodings for whole-collection files.
//!
//! # Responsibility
//! - Encode/decode a full record collection as a JSON array or a CSV table.
//!
//! # Invariants
//! - An empty or whitespace-only file decodes to an empty collection.
//! - CSV output always carries a header row, even for zero records.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum FormatError {
    Json(serde_json::Error),
    Csv(csv::Error),
}

impl Display for FormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "json: {err}"),
            Self::Csv(err) => write!(f, "csv: {err}"),
        }
    }
}

impl Error for FormatError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Csv(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for FormatError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<csv::Error> for FormatError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

/// Encoding used to persist one record collection per file.
pub trait TableFormat {
    /// File extension without the dot.
    const EXTENSION: &'static str;

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<Vec<T>, FormatError>;

    /// `columns` is the header written when `records` is empty.
    fn encode<T: Serialize>(records: &[T], columns: &[&str]) -> Result<Vec<u8>, FormatError>;
}

/// Pretty-printed JSON array of objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTable;

impl TableFormat for JsonTable {
    const EXTENSION: &'static str = "json";

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<Vec<T>, FormatError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(bytes)?)
    }

    fn encode<T: Serialize>(records: &[T], _columns: &[&str]) -> Result<Vec<u8>, FormatError> {
        let mut bytes = serde_json::to_vec_pretty(records)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

/// Comma-separated table with a header row of field names.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvTable;

impl TableFormat for CsvTable {
    const EXTENSION: &'static str = "csv";

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<Vec<T>, FormatError> {
        let mut reader = csv::Reader::from_reader(bytes);
        let mut records = Vec::new();
        for row in reader.deserialize() {
            records.push(row?);
        }
        Ok(records)
    }

    fn encode<T: Serialize>(records: &[T], columns: &[&str]) -> Result<Vec<u8>, FormatError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        if records.is_empty() {
            writer.write_record(columns)?;
        }
        for record in records {
            writer.serialize(record)?;
        }
        writer
            .into_inner()
            .map_err(|err| FormatError::Csv(err.into_error().into()))
    }
}

#[cfg(test)]
mod tests {
    use super::{CsvTable, JsonTable, TableFormat};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        name: String,
        note: Option<String>,
        count: u32,
    }

    const COLUMNS: &[&str] = &["name", "note", "count"];

    fn rows() -> Vec<Row> {
        vec![
            Row {
                name: "Acme, Inc.".to_string(),
                note: Some("line one\nline \"two\"".to_string()),
                count: 3,
            },
            Row {
                name: "Beta".to_string(),
                note: None,
                count: 0,
            },
        ]
    }

    #[test]
    fn blank_input_decodes_to_empty_collection() {
        assert!(JsonTable::decode::<Row>(b"").unwrap().is_empty());
        assert!(JsonTable::decode::<Row>(b"  \n").unwrap().is_empty());
        assert!(CsvTable::decode::<Row>(b"").unwrap().is_empty());
    }

    #[test]
    fn csv_keeps_header_for_empty_collection() {
        let bytes = CsvTable::encode::<Row>(&[], COLUMNS).unwrap();
        assert_eq!(String::from_utf8(bytes.clone()).unwrap(), "name,note,count\n");
        assert!(CsvTable::decode::<Row>(&bytes).unwrap().is_empty());
    }

    #[test]
    fn csv_quotes_delimiters_and_newlines() {
        let bytes = CsvTable::encode(&rows(), COLUMNS).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("name,note,count\n"));
        assert!(text.contains("\"Acme, Inc.\""));
        assert_eq!(CsvTable::decode::<Row>(&bytes).unwrap(), rows());
    }

    #[test]
    fn json_rejects_non_array_payload() {
        assert!(JsonTable::decode::<Row>(b"{\"name\":\"x\"}").is_err());
    }
}
