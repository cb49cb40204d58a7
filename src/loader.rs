// =============================================================================
// Price CSV ingestion
// =============================================================================
//
// Reads `{Date, Symbol, Open, High, Low, Close, Volume}` rows (header-driven,
// case-insensitive, extra columns ignored) into `PriceRow`s. Any malformed
// cell fails the whole load; empty or `NaN` price cells are kept as gaps.
// =============================================================================

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::error::{DataError, Result};
use crate::types::PriceRow;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

/// Open `path` and read every price row from it.
pub fn load_prices(path: impl AsRef<Path>) -> Result<Vec<PriceRow>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DataError::Unavailable {
        path: path.to_path_buf(),
        source,
    })?;
    read_prices(file, &path.display().to_string())
}

/// Read price rows from any CSV source. `source_name` is used in errors.
pub fn read_prices<R: Read>(reader: R, source_name: &str) -> Result<Vec<PriceRow>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let columns = Columns::resolve(reader.headers()?, source_name)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(columns.parse(&record)?);
    }
    Ok(rows)
}

/// Parse a calendar date, tolerating a trailing time component
/// (`2024-01-02 00:00:00-05:00`, `2024-01-02T09:30:00`).
///
/// Also accepts compact `20240102` and year-month `2024-01` (first of the
/// month).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().split(|c: char| c == ' ' || c == 'T').next()?;
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day, fmt).ok())
        .or_else(|| parse_compact_date(day))
        .or_else(|| parse_year_month(day))
}

/// `YYYYMMDD`.
fn parse_compact_date(day: &str) -> Option<NaiveDate> {
    if day.len() != 8 || !day.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::from_ymd_opt(
        day[..4].parse().ok()?,
        day[4..6].parse().ok()?,
        day[6..].parse().ok()?,
    )
}

/// `YYYY-MM`, `YYYY/MM` or `YYYY.MM`, read as the first of the month.
fn parse_year_month(day: &str) -> Option<NaiveDate> {
    let (year, month) = day.split_once(|c: char| c == '-' || c == '/' || c == '.')?;
    if year.len() != 4 || !(1..=2).contains(&month.len()) {
        return None;
    }
    if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Column positions looked up once from the header row.
struct Columns {
    date: usize,
    symbol: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord, source_name: &str) -> Result<Self> {
        let find = |column: &'static str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(column))
                .ok_or_else(|| DataError::MissingColumn {
                    column,
                    source_name: source_name.to_string(),
                })
        };

        Ok(Self {
            date: find("Date")?,
            symbol: find("Symbol")?,
            open: find("Open")?,
            high: find("High")?,
            low: find("Low")?,
            close: find("Close")?,
            volume: find("Volume")?,
        })
    }

    fn parse(&self, record: &StringRecord) -> Result<PriceRow> {
        let line = record.position().map_or(0, |p| p.line());
        let cell = |idx: usize| record.get(idx).unwrap_or("");
        let raw_symbol = cell(self.symbol);
        let raw_date = cell(self.date);

        let invalid = |field: &'static str, value: &str, reason: &'static str| {
            DataError::Validation {
                line,
                symbol: raw_symbol.to_uppercase(),
                date: raw_date.to_string(),
                field,
                value: value.to_string(),
                reason,
            }
        };

        if raw_symbol.is_empty() {
            return Err(invalid("Symbol", raw_symbol, "symbol is blank"));
        }
        let date =
            parse_date(raw_date).ok_or_else(|| invalid("Date", raw_date, "not a calendar date"))?;

        let price = |field: &'static str, idx: usize| -> Result<Option<f64>> {
            let raw = cell(idx);
            if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
                return Ok(None);
            }
            let value: f64 = raw
                .parse()
                .map_err(|_| invalid(field, raw, "not a number"))?;
            if !value.is_finite() {
                return Err(invalid(field, raw, "not a finite number"));
            }
            if value < 0.0 {
                return Err(invalid(field, raw, "price is negative"));
            }
            Ok(Some(value))
        };

        let open = price("Open", self.open)?;
        let high = price("High", self.high)?;
        let low = price("Low", self.low)?;
        let close = price("Close", self.close)?;

        let raw_volume = cell(self.volume);
        let volume = parse_volume(raw_volume)
            .ok_or_else(|| invalid("Volume", raw_volume, "not a non-negative integer"))?;

        Ok(PriceRow::new(raw_symbol, date, open, high, low, close, volume))
    }
}

/// Accept `1200` as well as the `1200.0` that float-typed exports produce.
fn parse_volume(raw: &str) -> Option<u64> {
    if let Ok(v) = raw.parse::<u64>() {
        return Some(v);
    }
    let v: f64 = raw.parse().ok()?;
    (v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64).then_some(v as u64)
}
