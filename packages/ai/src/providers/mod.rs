//! Generative provider abstraction and implementations.
//!
//! Supports Google Gemini and any `OpenAI`-compatible endpoint via a
//! common trait.

pub mod gemini;
pub mod openai;

use std::sync::Arc;

use crate::AiError;

/// Trait for generative text-completion providers.
///
/// This is the entire capability the pipeline depends on: submit a
/// prompt, receive the response text. Tool use, streaming, and chat
/// history are deliberately out of scope.
#[async_trait::async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// The model identifier this provider queries, for result
    /// attribution.
    fn model_name(&self) -> &str;

    /// Sends a text prompt and returns the model's text response.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the request fails or the response carries
    /// no textual content.
    async fn complete(&self, prompt: &str) -> Result<String, AiError>;
}

/// Creates a generative provider based on environment variables.
///
/// If `AI_PROVIDER` is explicitly set, uses that provider. Otherwise
/// auto-detects from available credentials:
///
/// 1. `GEMINI_API_KEY` set -> Google Gemini
/// 2. `OPENAI_API_KEY` set -> `OpenAI` (or the `AI_BASE_URL` endpoint)
///
/// `AI_MODEL` overrides the per-provider default model.
///
/// # Errors
///
/// Returns [`AiError::Config`] if no credentials are found or the
/// explicitly requested provider is not configured.
pub fn create_provider_from_env() -> Result<Arc<dyn GenerativeProvider>, AiError> {
    let provider = std::env::var("AI_PROVIDER").unwrap_or_else(|_| detect_provider());

    match provider.to_lowercase().as_str() {
        "gemini" | "google" => {
            let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| AiError::Config {
                message: "GEMINI_API_KEY environment variable not set".to_string(),
            })?;
            let model =
                std::env::var("AI_MODEL").unwrap_or_else(|_| "gemini-1.5-pro".to_string());
            Ok(Arc::new(gemini::GeminiProvider::new(api_key, model)))
        }
        "openai" | "gpt" => {
            let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| AiError::Config {
                message: "OPENAI_API_KEY environment variable not set".to_string(),
            })?;
            let model = std::env::var("AI_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
            let base_url = std::env::var("AI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
            Ok(Arc::new(openai::OpenAiProvider::new(
                api_key, model, base_url,
            )))
        }
        other => Err(AiError::Config {
            message: format!("Unknown AI provider: {other}. Use 'gemini' or 'openai'."),
        }),
    }
}

/// Auto-detects which provider to use based on available credentials.
///
/// Returns a provider name string that matches the arms in
/// [`create_provider_from_env`].
fn detect_provider() -> String {
    if std::env::var("GEMINI_API_KEY").is_ok() {
        log::info!("Auto-detected AI provider: Gemini (GEMINI_API_KEY found)");
        return "gemini".to_string();
    }

    if std::env::var("OPENAI_API_KEY").is_ok() {
        log::info!("Auto-detected AI provider: OpenAI (OPENAI_API_KEY found)");
        return "openai".to_string();
    }

    log::warn!(
        "No AI credentials detected. Set GEMINI_API_KEY or OPENAI_API_KEY, \
         or set AI_PROVIDER explicitly."
    );

    // Fall back to gemini — will produce a clear error about the missing key
    "gemini".to_string()
}
