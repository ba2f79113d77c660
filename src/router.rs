//! Message router
//!
//! Fixed-priority chain: calculator, then stock lookup, then advice.
//! The first handler with an answer wins; results are never combined.

use tracing::{debug, info};

use crate::advice::AdviceFallback;
use crate::calculator;
use crate::models::{ReplyKind, RoutedReply};
use crate::stock::StockLookup;

pub struct MessageRouter {
    stock: StockLookup,
    advice: AdviceFallback,
}

impl MessageRouter {
    pub fn new(stock: StockLookup, advice: AdviceFallback) -> Self {
        Self { stock, advice }
    }

    pub fn advice(&self) -> &AdviceFallback {
        &self.advice
    }

    pub fn advice_configured(&self) -> bool {
        self.advice.is_configured()
    }

    /// Route one message. Always produces user-facing text.
    pub async fn route(&self, message: &str) -> RoutedReply {
        if let Some(text) = calculator::try_calculate(message) {
            info!(kind = ?ReplyKind::Calculation, "message routed");
            return RoutedReply::new(ReplyKind::Calculation, text);
        }

        if let Some(text) = self.stock.try_lookup(message).await {
            info!(kind = ?ReplyKind::Stock, "message routed");
            return RoutedReply::new(ReplyKind::Stock, text);
        }

        debug!("no deterministic handler matched, asking advice provider");
        let text = self.advice.get_advice(message).await;
        info!(kind = ?ReplyKind::Advice, "message routed");
        RoutedReply::new(ReplyKind::Advice, text)
    }

    /// Convenience wrapper returning only the reply text.
    pub async fn handle_user_message(&self, message: &str) -> String {
        self.route(message).await.text
    }
}
