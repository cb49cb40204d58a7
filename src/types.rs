// =============================================================================
// Shared types used across the stock-nexus service
// =============================================================================

use chrono::NaiveDate;
use serde::Serialize;

/// One symbol's trading data for one calendar date.
///
/// Prices are optional because upstream CSV exports leave gaps as empty
/// cells; a gap is carried through as `None`, never coerced to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    /// Uppercased ticker.
    pub symbol: String,
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: u64,
    /// `close * volume`, fixed at ingestion.
    pub trading_value: Option<f64>,
}

impl PriceRow {
    /// Build a row, normalising the symbol and deriving `trading_value`.
    pub fn new(
        symbol: &str,
        date: NaiveDate,
        open: Option<f64>,
        high: Option<f64>,
        low: Option<f64>,
        close: Option<f64>,
        volume: u64,
    ) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            date,
            open,
            high,
            low,
            close,
            volume,
            trading_value: close.filter(|c| c.is_finite()).map(|c| c * volume as f64),
        }
    }
}

/// A [`PriceRow`] annotated with the indicator columns.
///
/// Serialises with the column names the frontend expects. Absent indicators
/// (warm-up, zero-loss RSI, missing close) serialise as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedPriceRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Open", serialize_with = "finite_or_null")]
    pub open: Option<f64>,
    #[serde(rename = "High", serialize_with = "finite_or_null")]
    pub high: Option<f64>,
    #[serde(rename = "Low", serialize_with = "finite_or_null")]
    pub low: Option<f64>,
    #[serde(rename = "Close", serialize_with = "finite_or_null")]
    pub close: Option<f64>,
    #[serde(rename = "Volume")]
    pub volume: u64,
    #[serde(serialize_with = "finite_or_null")]
    pub trading_value: Option<f64>,
    #[serde(serialize_with = "finite_or_null")]
    pub ma_5: Option<f64>,
    #[serde(serialize_with = "finite_or_null")]
    pub ma_20: Option<f64>,
    #[serde(serialize_with = "finite_or_null")]
    pub ma_60: Option<f64>,
    #[serde(serialize_with = "finite_or_null")]
    pub rsi_14: Option<f64>,
}

impl EnrichedPriceRow {
    /// Copy the source row and attach indicator values.
    pub fn from_row(
        row: &PriceRow,
        ma_5: Option<f64>,
        ma_20: Option<f64>,
        ma_60: Option<f64>,
        rsi_14: Option<f64>,
    ) -> Self {
        Self {
            date: row.date,
            symbol: row.symbol.clone(),
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
            trading_value: row.trading_value,
            ma_5,
            ma_20,
            ma_60,
            rsi_14,
        }
    }
}

/// NaN and infinities are not valid JSON numbers; emit `null` instead.
fn finite_or_null<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value {
        Some(v) if v.is_finite() => serializer.serialize_some(v),
        _ => serializer.serialize_none(),
    }
}
