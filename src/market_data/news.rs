use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use crate::error::{DataError, Result};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// One pre-fetched news headline for a company.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsItem {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Name")]
    pub name: String,
    pub title: String,
    pub url: String,
    #[serde(rename = "publishedAt", deserialize_with = "published_at")]
    pub published_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// NewsStore -- headlines grouped by symbol
// ---------------------------------------------------------------------------

/// Headlines indexed by uppercased symbol, in file order.
#[derive(Debug, Default)]
pub struct NewsStore {
    by_symbol: HashMap<String, Vec<NewsItem>>,
    total: usize,
}

impl NewsStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DataError::Unavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_reader(file)?;
        info!(path = %path.display(), articles = store.len(), "news data loaded");
        Ok(store)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut store = Self::default();
        for item in reader.deserialize::<NewsItem>() {
            let mut item = item?;
            item.symbol = item.symbol.to_uppercase();
            store
                .by_symbol
                .entry(item.symbol.clone())
                .or_default()
                .push(item);
            store.total += 1;
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.total
    }

    /// Headlines for `symbol` (case-insensitive); empty when unknown.
    pub fn news_for(&self, symbol: &str) -> &[NewsItem] {
        self.by_symbol
            .get(&symbol.trim().to_uppercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// RFC 3339 (`2024-05-01T12:00:00Z`) or a naive `YYYY-MM-DD HH:MM:SS`
/// taken as UTC.
fn published_at<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z") {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|_| serde::de::Error::custom(format!("invalid publishedAt timestamp {raw:?}")))
}
