//! Trade list client
//!
//! Implements the dashboard's only inbound call:
//! - `GET {api_base}/api/trades?limit=N` -> JSON array of trades
//!
//! No retries here; the refresh scheduler decides when to ask again.

use futures::FutureExt;
use futures::future::LocalBoxFuture;

use crate::error::{DashboardError, Result};
use crate::types::Trade;

const TRADES_PATH: &str = "/api/trades";

/// Source of recent trades
pub trait TradeSource {
    /// Newest trades, at most `limit`. Must not touch dashboard state.
    fn fetch(&self, limit: usize) -> LocalBoxFuture<'_, Result<Vec<Trade>>>;
}

/// Decode a trades payload. All or nothing: one bad record rejects the list.
pub fn parse_trades(body: &str) -> Result<Vec<Trade>> {
    serde_json::from_str(body).map_err(DashboardError::from)
}

fn trades_url(base_url: &str, limit: usize) -> String {
    format!("{}{TRADES_PATH}?limit={limit}", base_url.trim_end_matches('/'))
}

/// Trades endpoint client over reqwest
pub struct HttpTradeSource {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTradeSource {
    /// `base_url` is the origin serving `/api/trades`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn trades_url(&self, limit: usize) -> String {
        trades_url(&self.base_url, limit)
    }

    async fn get_trades(&self, limit: usize) -> Result<Vec<Trade>> {
        let url = self.trades_url(limit);

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Handle API response, checking for errors
    async fn handle_response(response: reqwest::Response) -> Result<Vec<Trade>> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".into());
            return Err(DashboardError::Network(format!("HTTP {status}: {error_text}")));
        }

        let body = response.text().await?;
        parse_trades(&body)
    }
}

impl TradeSource for HttpTradeSource {
    fn fetch(&self, limit: usize) -> LocalBoxFuture<'_, Result<Vec<Trade>>> {
        self.get_trades(limit).boxed_local()
    }
}
