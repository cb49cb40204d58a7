pub mod financials;
pub mod news;
pub mod stock_store;

// Re-export the stores for convenient access (e.g. `use crate::market_data::StockStore`).
pub use financials::{FinancialInfoStore, StatementTable};
pub use news::NewsStore;
pub use stock_store::StockStore;
