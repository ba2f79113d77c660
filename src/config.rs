//! Process configuration
//!
//! Read once at startup, after `.env` has been loaded. Nothing here is
//! consulted per request.

use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::advice::AdviceFallback;
use crate::error::FinBotError;
use crate::gemini::{GeminiClient, GenerativeProvider};
use crate::market::YahooChartClient;
use crate::router::MessageRouter;
use crate::stock::StockLookup;
use crate::Result;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro-latest";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MARKET_DATA_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_PORT: u16 = 5001;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Generative provider credential; `None` disables the advice path.
    pub google_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub market_data_base_url: String,
    pub provider_timeout: Duration,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            google_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            market_data_base_url: DEFAULT_MARKET_DATA_BASE_URL.to_string(),
            provider_timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
            port: DEFAULT_PORT,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let google_api_key = non_blank("GOOGLE_API_KEY")
            .or_else(|| non_blank("GEMINI_API_KEY"))
            .map(|key| key.trim().to_string());

        let timeout_secs: u64 = parse_or(
            "PROVIDER_TIMEOUT_SECS",
            non_blank("PROVIDER_TIMEOUT_SECS"),
            DEFAULT_PROVIDER_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(FinBotError::ConfigError(
                "PROVIDER_TIMEOUT_SECS must be at least 1".to_string(),
            ));
        }

        let port = parse_or(
            "PORT",
            non_blank("PORT").or_else(|| non_blank("API_PORT")),
            defaults.port,
        )?;

        Ok(Self {
            google_api_key,
            gemini_model: non_blank("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_base_url: non_blank("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            market_data_base_url: non_blank("MARKET_DATA_BASE_URL")
                .unwrap_or(defaults.market_data_base_url),
            provider_timeout: Duration::from_secs(timeout_secs),
            port,
        })
    }

    /// Wire the production handler chain from these settings.
    pub fn build_router(&self) -> Result<MessageRouter> {
        let market = YahooChartClient::new(&self.market_data_base_url, self.provider_timeout)?;

        let provider = match &self.google_api_key {
            Some(key) => {
                let client = GeminiClient::new(
                    key.clone(),
                    &self.gemini_base_url,
                    &self.gemini_model,
                    self.provider_timeout,
                )?;
                Some(Arc::new(client) as Arc<dyn GenerativeProvider>)
            }
            None => None,
        };

        Ok(MessageRouter::new(
            StockLookup::new(Arc::new(market)),
            AdviceFallback::new(provider),
        ))
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| FinBotError::ConfigError(format!("invalid {} '{}': {}", key, value, e))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> Result<Settings> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings_from(&[]).unwrap();
        assert!(settings.google_api_key.is_none());
        assert_eq!(settings.port, 5001);
        assert_eq!(settings.provider_timeout, Duration::from_secs(5));
        assert_eq!(settings.gemini_model, "gemini-pro-latest");
    }

    #[test]
    fn test_blank_key_is_unconfigured() {
        let settings = settings_from(&[("GOOGLE_API_KEY", "   ")]).unwrap();
        assert!(settings.google_api_key.is_none());
    }

    #[test]
    fn test_gemini_key_fallback_and_port_alias() {
        let settings = settings_from(&[("GEMINI_API_KEY", "abc"), ("API_PORT", "8080")]).unwrap();
        assert_eq!(settings.google_api_key.as_deref(), Some("abc"));
        assert_eq!(settings.port, 8080);
    }

    #[test]
    fn test_invalid_numbers_are_config_errors() {
        assert!(matches!(
            settings_from(&[("PORT", "http")]),
            Err(FinBotError::ConfigError(_))
        ));
        assert!(matches!(
            settings_from(&[("PROVIDER_TIMEOUT_SECS", "0")]),
            Err(FinBotError::ConfigError(_))
        ));
    }

    #[test]
    fn test_build_router_without_key_disables_advice() {
        let router = settings_from(&[]).unwrap().build_router().unwrap();
        assert!(!router.advice_configured());

        let router = settings_from(&[("GOOGLE_API_KEY", "k")])
            .unwrap()
            .build_router()
            .unwrap();
        assert!(router.advice_configured());
    }
}
