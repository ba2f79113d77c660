//! Advice fallback
//!
//! Open-ended questions go to the generative provider. This component never
//! fails: a missing credential or a provider error turns into fixed text.

use std::sync::Arc;
use tracing::{info, warn};

use crate::gemini::GenerativeProvider;

pub const NOT_CONFIGURED_MESSAGE: &str = "AI model not configured. Please set GOOGLE_API_KEY in your .env or environment to enable Gemini responses.";

pub const PROVIDER_ERROR_MESSAGE: &str =
    "Sorry, I am having trouble generating a response right now.";

/// Build the advisor prompt around the user's question, verbatim.
pub fn build_prompt(question: &str) -> String {
    format!(
        "You are a helpful and knowledgeable financial advisor.\n\
         The user's question is: {}\n\
         Provide a helpful and concise response.",
        question
    )
}

pub struct AdviceFallback {
    provider: Option<Arc<dyn GenerativeProvider>>,
}

impl AdviceFallback {
    /// `None` means no credential was configured at startup.
    pub fn new(provider: Option<Arc<dyn GenerativeProvider>>) -> Self {
        Self { provider }
    }

    pub fn disabled() -> Self {
        Self { provider: None }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn get_advice(&self, question: &str) -> String {
        let Some(provider) = &self.provider else {
            return NOT_CONFIGURED_MESSAGE.to_string();
        };

        match provider.generate(&build_prompt(question)).await {
            Ok(answer) if !answer.trim().is_empty() => answer,
            Ok(_) => {
                warn!("Generative provider returned an empty answer");
                PROVIDER_ERROR_MESSAGE.to_string()
            }
            Err(e) => {
                warn!("Generative provider call failed: {}", e);
                PROVIDER_ERROR_MESSAGE.to_string()
            }
        }
    }
}

/// Log the startup state of the advice path once.
pub fn log_configuration(advice: &AdviceFallback) {
    if advice.is_configured() {
        info!("Generative advice enabled");
    } else {
        warn!("GOOGLE_API_KEY not found in environment variables. Gemini AI will be disabled until the key is provided in .env or the environment.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FinBotError;
    use crate::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingProvider {
        reply: std::result::Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl RecordingProvider {
        fn answering(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err("quota exceeded".to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenerativeProvider for RecordingProvider {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(FinBotError::ProviderError)
        }
    }

    #[test]
    fn test_unconfigured_returns_fixed_message() {
        let advice = AdviceFallback::disabled();
        assert!(!advice.is_configured());

        for question in ["what is an index fund?", "", "price of Dogecoin"] {
            let answer = tokio_test::block_on(advice.get_advice(question));
            assert_eq!(answer, NOT_CONFIGURED_MESSAGE);
        }
    }

    #[tokio::test]
    async fn test_prompt_embeds_question_verbatim() {
        let provider = Arc::new(RecordingProvider::answering("Start early."));
        let advice = AdviceFallback::new(Some(provider.clone()));

        let answer = advice.get_advice("Should I buy gold?").await;
        assert_eq!(answer, "Start early.");

        let prompts = provider.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with("You are a helpful and knowledgeable financial advisor."));
        assert!(prompts[0].contains("The user's question is: Should I buy gold?"));
    }

    #[tokio::test]
    async fn test_provider_error_becomes_apology() {
        let advice = AdviceFallback::new(Some(Arc::new(RecordingProvider::failing())));
        assert_eq!(advice.get_advice("anything").await, PROVIDER_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_blank_answer_becomes_apology() {
        let advice = AdviceFallback::new(Some(Arc::new(RecordingProvider::answering("  "))));
        assert_eq!(advice.get_advice("anything").await, PROVIDER_ERROR_MESSAGE);
    }
}
