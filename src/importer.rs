use std::path::Path;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::error::{PurseError, Result};
use crate::models::{Dataset, Transaction};

pub const REQUIRED_COLUMNS: [&str; 3] = ["date", "description", "amount"];

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Lowercase a header and replace spaces with underscores: "Posting Date" -> "posting_date".
pub fn normalize_header(name: &str) -> String {
    name.trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .replace(' ', "_")
}

pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let s = raw.replace([',', '"', '$'], "");
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return parse_plain_decimal(inner.trim()).map(|d| -d);
    }
    parse_plain_decimal(s)
}

fn parse_plain_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok())
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    // 01/15/25: %Y would happily read "25" as the year 25
    let short_year = raw
        .rsplit_once('/')
        .is_some_and(|(_, year)| year.len() == 2);
    if short_year {
        return NaiveDate::parse_from_str(raw, "%m/%d/%y")
            .or_else(|_| NaiveDate::parse_from_str(raw, "%Y/%m/%d"))
            .ok();
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .ok()
}

pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(chrono::Duration::try_days(serial as i64)?)
}

// ---------------------------------------------------------------------------
// Raw table
// ---------------------------------------------------------------------------

/// A single value as it came out of the source file, before typing.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Empty,
}

impl Cell {
    fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Text(s) => parse_date(s),
            Cell::Number(serial) => excel_serial_to_date(*serial),
            Cell::Date(d) => Some(*d),
            Cell::Empty => None,
        }
    }

    fn as_amount(&self) -> Option<Decimal> {
        match self {
            Cell::Text(s) => parse_amount(s),
            Cell::Number(n) => Decimal::from_f64(*n),
            Cell::Date(_) | Cell::Empty => None,
        }
    }

    fn as_text(&self) -> String {
        match self {
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => n.to_string(),
            Cell::Date(d) => d.to_string(),
            Cell::Empty => String::new(),
        }
    }
}

/// Header row plus data rows, shared by the CSV and spreadsheet readers.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    /// Records the reader could not decode at all.
    pub skipped: usize,
}

// ---------------------------------------------------------------------------
// Source formats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceFormat {
    Csv,
    #[cfg(feature = "excel")]
    Spreadsheet,
}

impl SourceFormat {
    pub fn from_path(file_path: &Path) -> Result<Self> {
        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            #[cfg(feature = "excel")]
            "xls" | "xlsx" => Ok(Self::Spreadsheet),
            _ => Err(PurseError::Format(
                file_path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| file_path.display().to_string()),
            )),
        }
    }

    pub fn read(&self, file_path: &Path) -> Result<RawTable> {
        match self {
            Self::Csv => read_csv(file_path),
            #[cfg(feature = "excel")]
            Self::Spreadsheet => read_spreadsheet(file_path),
        }
    }
}

fn read_csv(file_path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(file_path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows: Vec<Vec<Cell>> = Vec::new();
    let mut skipped = 0usize;
    for result in rdr.records() {
        match result {
            Ok(record) => rows.push(record.iter().map(|f| Cell::Text(f.to_string())).collect()),
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed CSV record");
                skipped += 1;
            }
        }
    }
    Ok(RawTable {
        headers,
        rows,
        skipped,
    })
}

#[cfg(feature = "excel")]
fn cell_from_data(data: &calamine::Data) -> Cell {
    use calamine::Data;
    match data {
        Data::String(s) | Data::DateTimeIso(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(Cell::Date)
            .unwrap_or(Cell::Empty),
        _ => Cell::Empty,
    }
}

#[cfg(feature = "excel")]
fn read_spreadsheet(file_path: &Path) -> Result<RawTable> {
    use calamine::Reader;

    let mut workbook = calamine::open_workbook_auto(file_path)?;
    let Some(range) = workbook.worksheet_range_at(0) else {
        return Ok(RawTable::default());
    };
    let range = range?;
    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|header| header.iter().map(|c| c.to_string()).collect())
        .unwrap_or_default();
    let rows: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();
    Ok(RawTable {
        headers,
        rows,
        skipped: 0,
    })
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Project a raw table onto the canonical transaction columns.
///
/// A missing required column fails the whole table. Rows whose date or amount
/// cannot be parsed, and rows with a zero amount, are dropped; the count of
/// dropped rows, including records the reader skipped, is returned alongside
/// the dataset.
pub fn normalize_table(table: &RawTable) -> Result<(Dataset, usize)> {
    let headers: Vec<String> = table.headers.iter().map(|h| normalize_header(h)).collect();
    let mut indices = [0usize; 3];
    for (slot, name) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PurseError::Schema(name.to_string()))?;
    }
    let [idx_date, idx_desc, idx_amount] = indices;

    let mut transactions = Vec::with_capacity(table.rows.len());
    let mut dropped = table.skipped;
    for (line, row) in table.rows.iter().enumerate() {
        let Some(date) = row.get(idx_date).and_then(Cell::as_date) else {
            tracing::debug!(row = line + 1, "dropping row with unparsable date");
            dropped += 1;
            continue;
        };
        let amount = match row.get(idx_amount).and_then(Cell::as_amount) {
            Some(a) if !a.is_zero() => a,
            _ => {
                tracing::debug!(row = line + 1, "dropping row with missing or zero amount");
                dropped += 1;
                continue;
            }
        };
        let description = row.get(idx_desc).map(Cell::as_text).unwrap_or_default();
        transactions.push(Transaction {
            date,
            description,
            amount,
        });
    }
    Ok((Dataset::new(transactions), dropped))
}

/// Read a bank statement and normalize it into a dataset.
pub fn load_dataset(file_path: &Path) -> Result<Dataset> {
    let format = SourceFormat::from_path(file_path)?;
    let table = format.read(file_path)?;
    let (dataset, dropped) = normalize_table(&table)?;
    tracing::info!(
        file = %file_path.display(),
        loaded = dataset.len(),
        dropped,
        "statement loaded"
    );
    Ok(dataset)
}
