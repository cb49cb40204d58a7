// =============================================================================
// Central Application State — stock-nexus
// =============================================================================
//
// Every dataset is loaded exactly once, here, before the HTTP server binds.
// After `build` returns nothing in `AppState` is mutated again, so handlers
// share it through a plain `Arc` with no locks.
//
// Failure policy:
//   - Price data that fails validation aborts startup.
//   - Any dataset whose source is missing or unconfigured is served as empty
//     (or "unavailable") and a warning is logged.
//   - Auxiliary datasets (news, financials) never abort startup.
// =============================================================================

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::DataError;
use crate::market_data::{FinancialInfoStore, NewsStore, StatementTable, StockStore};

/// Read-only state shared across all request handlers via `Arc<AppState>`.
#[derive(Debug)]
pub struct AppState {
    pub settings: Settings,
    pub stocks: StockStore,
    pub news: NewsStore,
    pub financial_info: FinancialInfoStore,
    /// `None` when the annual statements file is missing or unreadable.
    pub annual_financials: Option<StatementTable>,
    /// `None` when the quarterly statements file is missing or unreadable.
    pub quarterly_financials: Option<StatementTable>,
    pub started_at: Instant,
}

impl AppState {
    /// Load every configured dataset and compute the enriched price table.
    pub fn build(settings: Settings) -> Result<Self> {
        let stocks = load_stocks(settings.data_file_path.as_deref())?;

        let news = load_optional("news", settings.news_path.as_deref(), |p| NewsStore::load(p))
            .unwrap_or_else(NewsStore::empty);
        let financial_info = load_optional(
            "financial info",
            settings.financials_info_path.as_deref(),
            |p| FinancialInfoStore::load(p),
        )
        .unwrap_or_else(FinancialInfoStore::empty);
        let annual_financials = load_optional(
            "annual financials",
            settings.annual_financials_path.as_deref(),
            |p| StatementTable::load(p),
        );
        let quarterly_financials = load_optional(
            "quarterly financials",
            settings.quarterly_financials_path.as_deref(),
            |p| StatementTable::load(p),
        );

        info!(
            price_rows = stocks.len(),
            symbols = stocks.symbol_count(),
            news_articles = news.len(),
            annual_statements = annual_financials.as_ref().map_or(0, StatementTable::len),
            quarterly_statements = quarterly_financials.as_ref().map_or(0, StatementTable::len),
            "application state built"
        );

        Ok(Self::from_parts(
            settings,
            stocks,
            news,
            financial_info,
            annual_financials,
            quarterly_financials,
        ))
    }

    /// Assemble state from already-loaded datasets.
    pub fn from_parts(
        settings: Settings,
        stocks: StockStore,
        news: NewsStore,
        financial_info: FinancialInfoStore,
        annual_financials: Option<StatementTable>,
        quarterly_financials: Option<StatementTable>,
    ) -> Self {
        Self {
            settings,
            stocks,
            news,
            financial_info,
            annual_financials,
            quarterly_financials,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// Prices are the one dataset whose bad contents stop the process.
fn load_stocks(path: Option<&Path>) -> Result<StockStore> {
    let Some(path) = path else {
        warn!("DATA_FILE_PATH is not set; serving without price data");
        return Ok(StockStore::empty());
    };

    match StockStore::load(path) {
        Ok(store) => Ok(store),
        Err(e) if e.is_unavailable() => {
            warn!(path = %path.display(), error = %e, "price data unavailable; serving without price data");
            Ok(StockStore::empty())
        }
        Err(e) => Err(e)
            .with_context(|| format!("price data in {} is invalid; refusing to start", path.display())),
    }
}

fn load_optional<T>(
    name: &'static str,
    path: Option<&Path>,
    load: impl FnOnce(&Path) -> Result<T, DataError>,
) -> Option<T> {
    let Some(path) = path else {
        warn!(dataset = name, "no path configured; dataset unavailable");
        return None;
    };

    match load(path) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(dataset = name, path = %path.display(), error = %e, "failed to load dataset; serving it as unavailable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_with_no_paths_serves_empty_data() {
        let state = AppState::build(Settings::default()).unwrap();
        assert!(state.stocks.is_empty());
        assert_eq!(state.news.len(), 0);
        assert!(state.annual_financials.is_none());
        assert!(state.quarterly_financials.is_none());
    }

    #[test]
    fn build_with_missing_files_degrades() {
        let settings = Settings {
            data_file_path: Some("/definitely/not/prices.csv".into()),
            news_path: Some("/definitely/not/news.csv".into()),
            annual_financials_path: Some("/definitely/not/annual.csv".into()),
            ..Settings::default()
        };
        let state = AppState::build(settings).unwrap();
        assert!(state.stocks.is_empty());
        assert!(state.annual_financials.is_none());
    }

    #[test]
    fn invalid_price_file_refuses_to_start() {
        let path = std::env::temp_dir().join(format!("stock-nexus-invalid-{}.csv", std::process::id()));
        std::fs::write(
            &path,
            "Date,Symbol,Open,High,Low,Close,Volume\n2024-01-02,AAPL,1,1,1,abc,10\n",
        )
        .unwrap();

        let settings = Settings {
            data_file_path: Some(path.clone()),
            ..Settings::default()
        };
        let result = AppState::build(settings);
        let _ = std::fs::remove_file(&path);

        let err = result.unwrap_err();
        assert!(err.to_string().contains("refusing to start"));
        assert!(err.root_cause().to_string().contains("AAPL"));
    }
}
