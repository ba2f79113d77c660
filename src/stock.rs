//! Stock lookup handler
//!
//! Answers "price of <company>" questions for companies in the symbol
//! directory. Unknown companies and missing data are not errors to the
//! caller: the handler returns `None` and the router moves on.

use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info};

use crate::market::{latest_quote, MarketDataProvider};
use crate::models::{Currency, StockQuery, StockQuote};
use crate::symbols::{self, normalize_name};
use crate::Result;

lazy_static! {
    static ref PRICE_OF: Regex = Regex::new(r"price of ([a-zA-Z. ]+)").expect("valid price pattern");
}

/// Extract the company name from a "price of X" phrase.
pub fn parse_query(message: &str) -> Option<StockQuery> {
    let lowered = message.to_lowercase();
    let captures = PRICE_OF.captures(&lowered)?;
    let company_name = normalize_name(captures.get(1)?.as_str());

    if company_name.is_empty() {
        return None;
    }

    Some(StockQuery { company_name })
}

/// Render a quote in the currency-specific template.
pub fn format_quote(query: &StockQuery, quote: &StockQuote) -> String {
    match quote.currency {
        Currency::Inr => format!(
            "The current price of {} is {}{:.2}.",
            query.company_name,
            quote.currency.symbol(),
            quote.price
        ),
        Currency::Usd => format!(
            "The current price of {} ({}) is {}{:.2} {}.",
            query.company_name,
            quote.symbol,
            quote.currency.symbol(),
            quote.price,
            quote.currency.code()
        ),
    }
}

pub struct StockLookup {
    market: Arc<dyn MarketDataProvider>,
}

impl StockLookup {
    pub fn new(market: Arc<dyn MarketDataProvider>) -> Self {
        Self { market }
    }

    /// `Ok(None)` when the message is not a price question or names an
    /// unlisted company; `Err(DataUnavailable)` when the quote chain is empty.
    pub async fn lookup(&self, message: &str) -> Result<Option<String>> {
        let Some(query) = parse_query(message) else {
            return Ok(None);
        };

        let Some(symbol) = symbols::resolve(&query.company_name) else {
            debug!(company = %query.company_name, "company not in symbol directory");
            return Ok(None);
        };

        let quote = latest_quote(self.market.as_ref(), symbol).await?;
        info!(symbol = %quote.symbol, price = quote.price, currency = %quote.currency, "stock quote resolved");

        Ok(Some(format_quote(&query, &quote)))
    }

    /// Handler entry point: collapses data failures into `None`.
    pub async fn try_lookup(&self, message: &str) -> Option<String> {
        match self.lookup(message).await {
            Ok(reply) => reply,
            Err(e) => {
                debug!("stock lookup produced no answer: {}", e);
                None
            }
        }
    }
}
