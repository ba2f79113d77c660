//! Gemini API client for the advice fallback
//!
//! Exposes a single stable call, [`GenerativeProvider::generate`], and keeps
//! the knowledge of the provider's response shapes in [`extract_text`].
//! Uses a long-lived reqwest::Client for connection pooling.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info};

use crate::error::FinBotError;
use crate::Result;

/// Text generation seam. Implementations fail with `ProviderError`.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Reusable Gemini client (connection-pooled)
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .build()
            .map_err(|e| FinBotError::ConfigError(format!("Gemini client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl GenerativeProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GeminiRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };

        info!(model = %self.model, "Calling Gemini API");

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini API request failed: {}", e);
                FinBotError::ProviderError(format!("Gemini API error: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Gemini API error response ({}): {}", status, error_text);
            return Err(FinBotError::ProviderError(format!(
                "Gemini API returned {}",
                status
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            FinBotError::ProviderError(format!("Gemini parse error: {}", e))
        })?;

        let answer = extract_text(&body)?;
        info!(chars = answer.len(), "Gemini response received");

        Ok(answer)
    }
}

/// Pull the answer text out of a provider response.
///
/// Accepted shapes, first match wins:
/// 1. `{"text": "..."}`
/// 2. `{"candidates": [{"content": "..."}]}`
/// 3. `{"candidates": [{"content": {"parts": [{"text": "..."}, ...]}}]}` (parts joined)
/// 4. `{"candidates": [{"output": "..."}]}`
/// 5. anything else non-null: the JSON stringified
///
/// A response carrying only an `error` object is a `ResponseShape` error.
pub fn extract_text(body: &Value) -> Result<String> {
    if let Some(text) = body.get("text").and_then(Value::as_str) {
        if !text.is_empty() {
            return Ok(text.to_string());
        }
    }

    if let Some(first) = body
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
    {
        if let Some(text) = candidate_text(first) {
            return Ok(text);
        }
        return Ok(first.to_string());
    }

    if let Some(error) = body.get("error") {
        return Err(FinBotError::ResponseShape(format!(
            "provider returned an error payload: {}",
            error
        )));
    }

    if body.is_null() {
        return Err(FinBotError::ResponseShape("empty response".to_string()));
    }

    Ok(body.to_string())
}

fn candidate_text(candidate: &Value) -> Option<String> {
    match candidate.get("content") {
        Some(Value::String(text)) if !text.is_empty() => return Some(text.clone()),
        Some(content) => {
            let joined: Vec<&str> = content
                .get("parts")
                .and_then(Value::as_array)
                .map(|parts| parts.iter().filter_map(|p| p.get("text")?.as_str()).collect())
                .unwrap_or_default();
            if !joined.is_empty() {
                return Some(joined.concat());
            }
        }
        None => {}
    }

    candidate
        .get("output")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}
