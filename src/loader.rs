//! CSV ingestion for SIM-swap transaction exports
//!
//! Reads a `;`-delimited operator export with a header row, selects the
//! fixed column subset the analysis consumes, parses the two reset
//! timestamps and derives the before/after indicator for every row.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use thiserror::Error;

/// Positions of the consumed columns inside the full export header.
///
/// Operator exports carry more columns than the analysis needs; only
/// these nine are read, in this order.
pub const SELECTED_COLUMNS: [usize; 9] = [4, 5, 6, 7, 9, 10, 11, 12, 13];

/// Columns accessed by name after loading, as `(position within the
/// selected set, expected header name)`.
///
/// The two timestamp columns (selected positions 0 and 2) are only ever
/// read positionally, so their header names are not constrained.
pub const NAMED_COLUMNS: [(usize, &str); 7] = [
    (1, "PIN RESET MSISDN"),
    (3, "DEBIT PARTY"),
    (4, "CREDIT PARTY"),
    (5, "CREDIT PARTY SHORTCODE/MSISDN"),
    (6, "TRANSACTION TIME"),
    (7, "TRANSACTION ID"),
    (8, "TRANSACTION AMOUNT"),
];

/// Timestamp formats seen in operator exports, tried in order.
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

/// Date-only fallbacks, interpreted as midnight.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// An expected column is absent from the input header.
///
/// This is raised wherever a stage accesses the table by column name:
/// the loader when it checks the selected header, and the graph builder
/// before it extracts edge attributes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("incorrect CSV heading, missing key {0:?}")]
pub struct SchemaError(pub String);

/// Errors that can occur while loading the transaction export
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("CSV file not found: {0}")]
    NotFound(PathBuf),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Row {row}: unparseable timestamp {value:?}")]
    InvalidTimestamp { row: usize, value: String },

    #[error("Row {row}: unparseable transaction amount {value:?}")]
    InvalidAmount { row: usize, value: String },
}

/// One transaction row from the export, restricted to the selected
/// columns plus the derived before/after indicator.
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    /// First timestamp column (selected position 0).
    pub reset_time: NaiveDateTime,
    /// Account whose PIN was reset; the edge source.
    pub reset_msisdn: String,
    /// Second timestamp column (selected position 2), compared against
    /// `reset_time` to derive `relative_time`.
    pub compare_time: NaiveDateTime,
    pub debit_party: String,
    /// Credited account; the edge target.
    pub credit_party: String,
    pub credit_shortcode: String,
    pub transaction_time: String,
    pub transaction_id: String,
    pub amount: f64,
    /// 0 when `reset_time` is strictly earlier than `compare_time`,
    /// 1 otherwise.
    pub relative_time: u8,
}

/// The loaded export: selected header names plus one record per data row,
/// in file order.
#[derive(Debug, Clone, Default)]
pub struct TransactionTable {
    /// Header names of the selected columns, in selected order.
    pub columns: Vec<String>,
    pub records: Vec<TransactionRecord>,
}

impl TransactionTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Check that every named column is present in the loaded header.
    ///
    /// Stages that read the table by column name call this before doing
    /// so, mirroring where a by-name lookup would fail.
    pub fn require_columns(&self, names: &[&str]) -> Result<(), SchemaError> {
        for name in names {
            if !self.columns.iter().any(|c| c == name) {
                return Err(SchemaError((*name).to_string()));
            }
        }
        Ok(())
    }
}

/// Load the transaction export at `path`.
///
/// The file must exist, be `;`-delimited, and carry a header row with at
/// least enough columns to cover the selected positions. The selected
/// header is validated against [`NAMED_COLUMNS`]; a mismatch surfaces as
/// a [`SchemaError`] naming the missing key.
pub fn load_transactions(path: &Path) -> Result<TransactionTable, LoaderError> {
    if !path.exists() {
        return Err(LoaderError::NotFound(path.to_path_buf()));
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let columns = select_columns(&headers)?;

    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let row = index + 1;
        let record = result?;
        records.push(parse_record(&record, row)?);
    }

    Ok(TransactionTable { columns, records })
}

/// Project the full header down to the selected columns and validate the
/// names that later stages access.
fn select_columns(headers: &StringRecord) -> Result<Vec<String>, SchemaError> {
    let mut columns = Vec::with_capacity(SELECTED_COLUMNS.len());
    for position in SELECTED_COLUMNS {
        let name = headers
            .get(position)
            .ok_or_else(|| SchemaError(format!("column {}", position)))?;
        columns.push(name.to_string());
    }

    for (position, expected) in NAMED_COLUMNS {
        if columns[position] != expected {
            return Err(SchemaError(expected.to_string()));
        }
    }

    Ok(columns)
}

/// Read a field by its position within the selected set.
fn field(record: &StringRecord, selected: usize) -> &str {
    record.get(SELECTED_COLUMNS[selected]).unwrap_or("")
}

fn parse_record(record: &StringRecord, row: usize) -> Result<TransactionRecord, LoaderError> {
    let reset_time =
        parse_timestamp(field(record, 0)).ok_or_else(|| LoaderError::InvalidTimestamp {
            row,
            value: field(record, 0).to_string(),
        })?;
    let compare_time =
        parse_timestamp(field(record, 2)).ok_or_else(|| LoaderError::InvalidTimestamp {
            row,
            value: field(record, 2).to_string(),
        })?;

    let amount = parse_amount(field(record, 8)).ok_or_else(|| LoaderError::InvalidAmount {
        row,
        value: field(record, 8).to_string(),
    })?;

    // Transactions dated before the reset get 0, the rest 1.
    let relative_time = if reset_time < compare_time { 0 } else { 1 };

    Ok(TransactionRecord {
        reset_time,
        reset_msisdn: field(record, 1).to_string(),
        compare_time,
        debit_party: field(record, 3).to_string(),
        credit_party: field(record, 4).to_string(),
        credit_shortcode: field(record, 5).to_string(),
        transaction_time: field(record, 6).to_string(),
        transaction_id: field(record, 7).to_string(),
        amount,
        relative_time,
    })
}

/// Parse a timestamp field, trying the known export formats in order.
fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Some(ts);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Parse an amount field, tolerating thousands separators.
fn parse_amount(value: &str) -> Option<f64> {
    value.trim().replace(',', "").parse::<f64>().ok()
}
