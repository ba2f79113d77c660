//! Market data provider
//!
//! Abstracts the quote source behind [`MarketDataProvider`] and implements
//! the price retrieval chain used by the stock handler:
//! fast quote → intraday minute closes → recent daily closes.
//!
//! The production adapter talks to the Yahoo Finance v8 chart endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::FinBotError;
use crate::models::StockQuote;
use crate::symbols::currency_for;
use crate::Result;

/// History windows consulted when no fast quote is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryWindow {
    /// Today's session at one-minute resolution.
    IntradayMinute,
    /// The last few sessions at daily resolution.
    RecentDaily,
}

impl HistoryWindow {
    pub fn range(&self) -> &'static str {
        match self {
            HistoryWindow::IntradayMinute => "1d",
            HistoryWindow::RecentDaily => "5d",
        }
    }

    pub fn interval(&self) -> &'static str {
        match self {
            HistoryWindow::IntradayMinute => "1m",
            HistoryWindow::RecentDaily => "1d",
        }
    }
}

/// Trait for a market data source
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Cheap "last price" shortcut. `Ok(None)` when the provider has none.
    async fn fast_quote(&self, symbol: &str) -> Result<Option<f64>>;

    /// Close prices for `window`, oldest first. Empty when no data exists.
    async fn closes(&self, symbol: &str, window: HistoryWindow) -> Result<Vec<f64>>;
}

/// Resolve the latest price for `symbol`, walking the fallback chain.
///
/// Provider errors at any step are logged and treated like empty data.
/// Fails with [`FinBotError::DataUnavailable`] when every step comes up empty.
pub async fn latest_quote(provider: &dyn MarketDataProvider, symbol: &str) -> Result<StockQuote> {
    let currency = currency_for(symbol);
    let quote = |price: f64| StockQuote {
        symbol: symbol.to_string(),
        price,
        currency,
    };

    match provider.fast_quote(symbol).await {
        Ok(Some(price)) if is_usable(price) => {
            debug!(symbol = %symbol, price, "fast quote hit");
            return Ok(quote(price));
        }
        Ok(_) => debug!(symbol = %symbol, "no fast quote"),
        Err(e) => warn!(symbol = %symbol, "fast quote failed: {}", e),
    }

    for window in [HistoryWindow::IntradayMinute, HistoryWindow::RecentDaily] {
        match provider.closes(symbol, window).await {
            Ok(closes) => {
                if let Some(price) = closes.into_iter().rev().find(|p| is_usable(*p)) {
                    debug!(symbol = %symbol, window = ?window, price, "history close hit");
                    return Ok(quote(price));
                }
                debug!(symbol = %symbol, window = ?window, "empty history window");
            }
            Err(e) => warn!(symbol = %symbol, window = ?window, "history request failed: {}", e),
        }
    }

    Err(FinBotError::DataUnavailable(format!(
        "no price data for {}",
        symbol
    )))
}

fn is_usable(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

/// Yahoo Finance chart API client (connection-pooled)
pub struct YahooChartClient {
    client: Client,
    base_url: String,
}

impl YahooChartClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .user_agent("Mozilla/5.0")
            .build()
            .map_err(|e| FinBotError::ConfigError(format!("market data client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn chart(&self, symbol: &str, range: &str, interval: &str) -> Result<Option<ChartResult>> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);

        let response = self
            .client
            .get(url)
            .query(&[("range", range), ("interval", interval)])
            .send()
            .await
            .map_err(|e| {
                FinBotError::ProviderError(format!("Yahoo chart request failed for {}: {}", symbol, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FinBotError::ProviderError(format!(
                "Yahoo chart returned {} for {}",
                status, symbol
            )));
        }

        let body: ChartResponse = response
            .json()
            .await
            .map_err(|e| FinBotError::ProviderError(format!("Invalid chart response: {}", e)))?;

        if let Some(error) = body.chart.error {
            return Err(FinBotError::ProviderError(format!(
                "Yahoo chart error for {}: {}",
                symbol, error
            )));
        }

        Ok(body.chart.result.and_then(|results| results.into_iter().next()))
    }
}

#[async_trait]
impl MarketDataProvider for YahooChartClient {
    async fn fast_quote(&self, symbol: &str) -> Result<Option<f64>> {
        let result = self.chart(symbol, "1d", "1d").await?;
        Ok(result.and_then(|r| r.meta.regular_market_price))
    }

    async fn closes(&self, symbol: &str, window: HistoryWindow) -> Result<Vec<f64>> {
        let Some(result) = self.chart(symbol, window.range(), window.interval()).await? else {
            return Ok(Vec::new());
        };

        let closes = result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|series| series.close.into_iter().flatten().collect())
            .unwrap_or_default();

        Ok(closes)
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// In-process provider with canned answers for handler tests.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct FakeMarket {
    pub fast: Option<f64>,
    pub intraday: Vec<f64>,
    pub daily: Vec<f64>,
    pub fail: bool,
}

#[cfg(test)]
#[async_trait]
impl MarketDataProvider for FakeMarket {
    async fn fast_quote(&self, _symbol: &str) -> Result<Option<f64>> {
        if self.fail {
            return Err(FinBotError::ProviderError("offline".to_string()));
        }
        Ok(self.fast)
    }

    async fn closes(&self, _symbol: &str, window: HistoryWindow) -> Result<Vec<f64>> {
        if self.fail {
            return Err(FinBotError::ProviderError("offline".to_string()));
        }
        Ok(match window {
            HistoryWindow::IntradayMinute => self.intraday.clone(),
            HistoryWindow::RecentDaily => self.daily.clone(),
        })
    }
}
