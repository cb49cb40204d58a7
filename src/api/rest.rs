// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// Read-only endpoints over the datasets loaded at startup. Stock routes keep
// the paths the frontend already calls (`/stocks/...`); news and financial
// info live under `/api/`. No endpoint mutates state.
//
// CORS allows any origin unless `allowed_origins` lists specific ones.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::{HeaderValue, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{debug, warn};

use crate::app_state::AppState;
use crate::market_data::StatementTable;

/// Rows returned by the financial statement endpoints.
const STATEMENT_PREVIEW_ROWS: usize = 5;

type ApiError = (StatusCode, Json<serde_json::Value>);

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.settings.allowed_origins, state.settings.allows_any_origin());

    Router::new()
        .route("/", get(root))
        .route("/api/v1/health", get(health))
        // ── Stocks ──────────────────────────────────────────────────
        .route("/stocks", get(all_stocks))
        .route("/stocks/", get(all_stocks))
        .route("/stocks/financials/annual", get(annual_financials))
        .route("/stocks/financials/quarterly", get(quarterly_financials))
        .route("/stocks/:ticker", get(stock_by_ticker))
        .route("/stocks/:ticker/by_date", get(stock_by_date))
        // ── News & financial info ───────────────────────────────────
        .route("/api/news/:symbol", get(news_by_symbol))
        .route("/api/financial-info/:symbol", get(financial_info_by_symbol))
        // ── Middleware & State ───────────────────────────────────────
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String], any: bool) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if any {
        return cors.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(parsed))
}

fn not_found(detail: String) -> ApiError {
    debug!(%detail, "404");
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "detail": detail })),
    )
}

// =============================================================================
// Root & health (public)
// =============================================================================

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "stock-nexus API is running",
    }))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    price_rows: usize,
    symbols: usize,
    news_articles: usize,
    uptime_secs: u64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        price_rows: state.stocks.len(),
        symbols: state.stocks.symbol_count(),
        news_articles: state.news.len(),
        uptime_secs: state.uptime_secs(),
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Stocks
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct DateRange {
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
}

async fn all_stocks(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    if state.stocks.is_empty() {
        return Err(not_found("No stock data found".to_string()));
    }
    Ok(Json(state.stocks.fetch_all().to_vec()))
}

async fn stock_by_ticker(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(range): Query<DateRange>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.stocks.fetch_range(
        &ticker,
        range.start_date.as_deref(),
        range.end_date.as_deref(),
    );
    if rows.is_empty() {
        return Err(not_found(format!("No data found for ticker '{ticker}'")));
    }
    Ok(Json(rows.to_vec()))
}

/// Same filter as `stock_by_ticker`, but an empty match is `[]`, not 404.
async fn stock_by_date(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(range): Query<DateRange>,
) -> impl IntoResponse {
    let rows = state.stocks.fetch_range(
        &ticker,
        range.start_date.as_deref(),
        range.end_date.as_deref(),
    );
    Json(rows.to_vec())
}

// =============================================================================
// Financial statements
// =============================================================================

fn statement_preview(table: Option<&StatementTable>, kind: &str) -> Result<impl IntoResponse, ApiError> {
    match table {
        Some(table) => Ok(Json(table.head(STATEMENT_PREVIEW_ROWS).to_vec())),
        None => Err(not_found(format!(
            "{kind} financial data could not be found or failed to load"
        ))),
    }
}

async fn annual_financials(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    statement_preview(state.annual_financials.as_ref(), "Annual")
}

async fn quarterly_financials(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    statement_preview(state.quarterly_financials.as_ref(), "Quarterly")
}

// =============================================================================
// News & financial info
// =============================================================================

async fn news_by_symbol(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> impl IntoResponse {
    Json(state.news.news_for(&symbol).to_vec())
}

async fn financial_info_by_symbol(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> impl IntoResponse {
    Json(state.financial_info.info_for(&symbol).to_vec())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::config::Settings;
    use crate::loader::read_prices;
    use crate::market_data::{FinancialInfoStore, NewsStore, StockStore};

    const PRICES: &str = "Date,Symbol,Open,High,Low,Close,Volume\n\
                          2023-01-01,aapl,150,155,149,152,100\n\
                          2023-01-02,msft,300,310,295,305,200\n\
                          2023-01-02,aapl,151,156,150,153,100\n\
                          2023-01-03,aapl,152,158,151,150,100\n";

    const NEWS: &str = "Symbol,Name,title,url,publishedAt\n\
                        AAPL,Apple,Apple ships,https://x/1,2024-05-01T12:00:00Z\n";

    const STATEMENTS: &str = "Symbol,Name,Date,Total Revenue,Cost Of Revenue,Gross Profit,\
Operating Income,Operating Expense,Net Income,Diluted EPS,\
Total Liabilities Net Minority Interest,Stockholders Equity,Working Capital,Net Debt\n\
A,Alpha,2023-12-31,1,,,,,,,,,,\n\
B,Beta,2023-12-31,2,,,,,,,,,,\n\
C,Gamma,2023-12-31,3,,,,,,,,,,\n\
D,Delta,2023-12-31,4,,,,,,,,,,\n\
E,Epsilon,2023-12-31,5,,,,,,,,,,\n\
F,Phi,2023-12-31,6,,,,,,,,,,\n";

    fn app() -> Router {
        let rows = read_prices(Cursor::new(PRICES), "fixture").unwrap();
        let state = AppState::from_parts(
            Settings::default(),
            StockStore::from_rows(&rows),
            NewsStore::from_reader(Cursor::new(NEWS)).unwrap(),
            FinancialInfoStore::empty(),
            Some(StatementTable::from_reader(Cursor::new(STATEMENTS)).unwrap()),
            None,
        );
        router(Arc::new(state))
    }

    fn empty_app() -> Router {
        let state = AppState::from_parts(
            Settings::default(),
            StockStore::empty(),
            NewsStore::empty(),
            FinancialInfoStore::empty(),
            None,
            None,
        );
        router(Arc::new(state))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn root_and_health_respond() {
        let (status, body) = get_json(app(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].is_string());

        let (status, body) = get_json(app(), "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["price_rows"], 4);
        assert_eq!(body["symbols"], 2);
    }

    #[tokio::test]
    async fn all_stocks_returns_enriched_rows() {
        let (status, body) = get_json(app(), "/stocks").await;
        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0]["Symbol"], "AAPL");
        assert!(rows[0].get("ma_60").is_some());
        assert!(rows[0]["rsi_14"].is_null());
    }

    #[tokio::test]
    async fn all_stocks_is_404_when_empty() {
        let (status, body) = get_json(empty_app(), "/stocks").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn ticker_lookup_is_case_insensitive_and_filterable() {
        let (status, body) = get_json(app(), "/stocks/aapl").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);

        let (_, body) = get_json(app(), "/stocks/AAPL?start_date=2023-01-02&end_date=2023-01-03").await;
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Date"], "2023-01-02");
        // Last close fell, so RSI is defined there.
        assert!(rows[1]["rsi_14"].is_number());

        let (_, body) = get_json(app(), "/stocks/aapl?start_date=invalid-date").await;
        assert_eq!(body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn unknown_ticker_is_404_but_by_date_is_empty() {
        let (status, _) = get_json(app(), "/stocks/GOOG").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = get_json(app(), "/stocks/GOOG/by_date").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));

        let (_, body) = get_json(app(), "/stocks/msft/by_date?start_date=2023-01-01&end_date=2023-01-03").await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn statements_preview_first_five_or_404() {
        let (status, body) = get_json(app(), "/stocks/financials/annual").await;
        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0]["Symbol"], "A");

        let (status, _) = get_json(app(), "/stocks/financials/quarterly").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn news_and_financial_info_return_lists() {
        let (status, body) = get_json(app(), "/api/news/aapl").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["title"], "Apple ships");

        let (_, body) = get_json(app(), "/api/news/zzz").await;
        assert_eq!(body, serde_json::json!([]));

        let (status, body) = get_json(app(), "/api/financial-info/aapl").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));
    }
}
