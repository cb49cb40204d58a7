// =============================================================================
// Service Configuration — JSON file + environment overrides
// =============================================================================
//
// Settings come from an optional JSON file, then from the environment (which
// `main` has already populated from `.env`). Every field carries
// `#[serde(default)]` so a partial or empty file still loads.
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

// =============================================================================
// Settings
// =============================================================================

/// Where the service finds its datasets and how it listens.
///
/// Every dataset path is optional; an unset path means the dataset is served
/// as empty / unavailable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    // --- Datasets -----------------------------------------------------------

    /// Daily OHLCV prices for all symbols (`DATA_FILE_PATH`).
    #[serde(default)]
    pub data_file_path: Option<PathBuf>,

    /// Annual financial statements (`ANNUAL_FINANCIALS_PATH`).
    #[serde(default)]
    pub annual_financials_path: Option<PathBuf>,

    /// Quarterly financial statements (`QUARTERLY_FINANCIALS_PATH`).
    #[serde(default)]
    pub quarterly_financials_path: Option<PathBuf>,

    /// Company news headlines (`NEWS_PATH`).
    #[serde(default)]
    pub news_path: Option<PathBuf>,

    /// Valuation ratios (`FINANCIALS_INFO_PATH`).
    #[serde(default)]
    pub financials_info_path: Option<PathBuf>,

    // --- HTTP ---------------------------------------------------------------

    /// Listen address (`STOCK_NEXUS_BIND_ADDR`).
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// CORS origins; `"*"` allows any (`ALLOWED_ORIGINS`, comma separated).
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file_path: None,
            annual_financials_path: None,
            quarterly_financials_path: None,
            news_path: None,
            financials_info_path: None,
            bind_addr: default_bind_addr(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file at `path`.
    ///
    /// A missing file is an error so the caller can fall back to defaults
    /// with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;

        let settings: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse settings from {}", path.display()))?;

        info!(path = %path.display(), "settings file loaded");
        Ok(settings)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`. Blank values are treated as unset.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("DATA_FILE_PATH") {
            self.data_file_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get("ANNUAL_FINANCIALS_PATH") {
            self.annual_financials_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get("QUARTERLY_FINANCIALS_PATH") {
            self.quarterly_financials_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get("NEWS_PATH") {
            self.news_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get("FINANCIALS_INFO_PATH") {
            self.financials_info_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get("STOCK_NEXUS_BIND_ADDR") {
            self.bind_addr = v;
        }
        if let Some(v) = get("ALLOWED_ORIGINS") {
            self.allowed_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
    }

    /// Whether CORS should accept any origin.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}
