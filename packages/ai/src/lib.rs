#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Generative text-completion provider abstraction.
//!
//! The impact pipeline only needs one capability from a generative
//! backend: submit a text prompt, get a text response (or an error).
//! [`providers::GenerativeProvider`] captures exactly that, with Google
//! Gemini and any `OpenAI`-compatible server (Ollama, vLLM, llama.cpp,
//! LM Studio via `AI_BASE_URL`) as concrete implementations.
//!
//! [`ProviderHandle`] owns the process-wide connection state and
//! serializes re-initialization behind a lock so concurrent queries
//! cannot race to reset the same provider.

pub mod handle;
pub mod providers;

pub use handle::ProviderHandle;
pub use providers::{GenerativeProvider, create_provider_from_env};

use thiserror::Error;

/// Errors that can occur while talking to a generative provider.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request to the provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider-specific error (non-success status, malformed body).
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },

    /// Configuration error (missing credentials, unknown provider).
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}
