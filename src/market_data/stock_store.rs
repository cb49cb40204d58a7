use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::engine;
use crate::error::Result;
use crate::loader::{self, parse_date};
use crate::types::{EnrichedPriceRow, PriceRow};

// ---------------------------------------------------------------------------
// StockStore -- immutable enriched price table
// ---------------------------------------------------------------------------

/// The enriched price table, computed once and read-only afterwards.
///
/// Rows are held in `(symbol, date)` order so that every symbol occupies one
/// contiguous run; `index` maps a symbol to that run. No interior mutability:
/// share it behind an `Arc` and read it from any number of tasks.
#[derive(Debug, Default)]
pub struct StockStore {
    rows: Vec<EnrichedPriceRow>,
    index: HashMap<String, Range<usize>>,
}

impl StockStore {
    /// A store with no data, used when the price source is unavailable.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read the price CSV at `path` and enrich it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let rows = loader::load_prices(path)?;
        let store = Self::from_rows(&rows);
        info!(
            path = %path.display(),
            rows = store.len(),
            symbols = store.symbol_count(),
            "price data loaded and enriched"
        );
        Ok(store)
    }

    /// Enrich `rows` and index the result by symbol.
    pub fn from_rows(rows: &[PriceRow]) -> Self {
        let duplicates = engine::count_duplicate_keys(rows);
        if duplicates > 0 {
            warn!(
                duplicates,
                "duplicate (symbol, date) rows found; keeping input order within each date"
            );
        }

        // `enrich` emits each symbol as one contiguous, date-ordered run.
        let rows = engine::enrich(rows);
        let mut index: HashMap<String, Range<usize>> = HashMap::new();
        for (i, row) in rows.iter().enumerate() {
            index
                .entry(row.symbol.clone())
                .and_modify(|r| r.end = i + 1)
                .or_insert(i..i + 1);
        }

        Self { rows, index }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn symbol_count(&self) -> usize {
        self.index.len()
    }

    /// Every enriched row, ordered by symbol then date.
    pub fn fetch_all(&self) -> &[EnrichedPriceRow] {
        &self.rows
    }

    /// All rows for `symbol` (case-insensitive), date ascending.
    pub fn fetch_symbol(&self, symbol: &str) -> &[EnrichedPriceRow] {
        match self.index.get(&symbol.trim().to_uppercase()) {
            Some(range) => &self.rows[range.clone()],
            None => &[],
        }
    }

    /// Rows for `symbol` with `start <= date <= end`.
    ///
    /// Either bound may be omitted. A bound that does not parse as a date is
    /// ignored rather than rejected.
    pub fn fetch_range(
        &self,
        symbol: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> &[EnrichedPriceRow] {
        let rows = self.fetch_symbol(symbol);

        let lo = match bound(start) {
            Some(start) => rows.partition_point(|r| r.date < start),
            None => 0,
        };
        let hi = match bound(end) {
            Some(end) => rows.partition_point(|r| r.date <= end),
            None => rows.len(),
        };

        if lo >= hi {
            return &[];
        }
        &rows[lo..hi]
    }
}

fn bound(raw: Option<&str>) -> Option<chrono::NaiveDate> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    let date = parse_date(raw);
    if date.is_none() {
        debug!(value = raw, "ignoring unparseable date bound");
    }
    date
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
