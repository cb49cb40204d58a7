use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{DataError, Result};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Valuation ratios for one company on one date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialInfo {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "EPS")]
    pub eps: Option<f64>,
    #[serde(rename = "PER")]
    pub per: Option<f64>,
    #[serde(rename = "BPS")]
    pub bps: Option<f64>,
    #[serde(rename = "PBR")]
    pub pbr: Option<f64>,
    #[serde(rename = "ROE")]
    pub roe: Option<f64>,
    #[serde(rename = "ROA")]
    pub roa: Option<f64>,
    #[serde(rename = "EBITDA")]
    pub ebitda: Option<f64>,
    #[serde(rename = "EV")]
    pub ev: Option<f64>,
}

/// One reporting period of a company's income statement and balance sheet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialStatement {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Total Revenue")]
    pub total_revenue: Option<f64>,
    #[serde(rename = "Cost Of Revenue")]
    pub cost_of_revenue: Option<f64>,
    #[serde(rename = "Gross Profit")]
    pub gross_profit: Option<f64>,
    #[serde(rename = "Operating Income")]
    pub operating_income: Option<f64>,
    #[serde(rename = "Operating Expense")]
    pub operating_expense: Option<f64>,
    #[serde(rename = "Net Income")]
    pub net_income: Option<f64>,
    #[serde(rename = "Diluted EPS")]
    pub diluted_eps: Option<f64>,
    #[serde(rename = "Total Liabilities Net Minority Interest")]
    pub total_liabilities_net_minority_interest: Option<f64>,
    #[serde(rename = "Stockholders Equity")]
    pub stockholders_equity: Option<f64>,
    #[serde(rename = "Working Capital")]
    pub working_capital: Option<f64>,
    #[serde(rename = "Net Debt")]
    pub net_debt: Option<f64>,
}

// ---------------------------------------------------------------------------
// FinancialInfoStore -- ratios grouped by symbol
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct FinancialInfoStore {
    by_symbol: HashMap<String, Vec<FinancialInfo>>,
}

impl FinancialInfoStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let records: Vec<FinancialInfo> = read_csv(open(path)?)?;
        info!(path = %path.display(), rows = records.len(), "financial info loaded");
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<FinancialInfo>) -> Self {
        let mut by_symbol: HashMap<String, Vec<FinancialInfo>> = HashMap::new();
        for mut record in records {
            record.symbol = record.symbol.trim().to_uppercase();
            by_symbol.entry(record.symbol.clone()).or_default().push(record);
        }
        Self { by_symbol }
    }

    /// Ratios for `symbol` (case-insensitive) in file order.
    pub fn info_for(&self, symbol: &str) -> &[FinancialInfo] {
        self.by_symbol
            .get(&symbol.trim().to_uppercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// StatementTable -- one annual or quarterly statements file
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct StatementTable {
    rows: Vec<FinancialStatement>,
}

impl StatementTable {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let table = Self::from_reader(open(path)?)?;
        info!(path = %path.display(), rows = table.len(), "financial statements loaded");
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(Self {
            rows: read_csv(reader)?,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// The first `n` statements in file order.
    pub fn head(&self, n: usize) -> &[FinancialStatement] {
        &self.rows[..n.min(self.rows.len())]
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| DataError::Unavailable {
        path: path.to_path_buf(),
        source,
    })
}

fn read_csv<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut out = Vec::new();
    for record in reader.deserialize() {
        out.push(record?);
    }
    Ok(out)
}
