//! Shared provider connection state with guarded re-initialization.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::providers::{self, GenerativeProvider};

/// Prompt used for the lightweight connection health check. Kept tiny
/// to minimize token spend.
const HEALTH_CHECK_PROMPT: &str = "Hello";

/// Owns the current generative provider, if any.
///
/// The provider is shared state across every query in the process;
/// holding it behind a mutex means re-initialization is serialized —
/// two queries that both observe a dead provider wait on the lock
/// instead of racing to replace the same handle, and the second one
/// finds the fresh provider already installed.
pub struct ProviderHandle {
    inner: Mutex<Option<Arc<dyn GenerativeProvider>>>,
}

impl ProviderHandle {
    /// Wraps an already-constructed provider (or none).
    #[must_use]
    pub fn new(provider: Option<Arc<dyn GenerativeProvider>>) -> Self {
        Self {
            inner: Mutex::new(provider),
        }
    }

    /// Builds a handle from environment configuration. A missing or
    /// invalid configuration yields an empty handle rather than an
    /// error — the pipeline treats "no provider" as an ordinary
    /// fallback condition.
    #[must_use]
    pub fn from_env() -> Self {
        match providers::create_provider_from_env() {
            Ok(provider) => {
                log::info!("generative provider initialized: {}", provider.model_name());
                Self::new(Some(provider))
            }
            Err(e) => {
                log::warn!("no generative provider available: {e}");
                Self::new(None)
            }
        }
    }

    /// Returns the current provider, if one is configured.
    pub async fn current(&self) -> Option<Arc<dyn GenerativeProvider>> {
        self.inner.lock().await.clone()
    }

    /// Returns the current provider's model identifier, if any.
    pub async fn model_name(&self) -> Option<String> {
        self.inner
            .lock()
            .await
            .as_ref()
            .map(|p| p.model_name().to_owned())
    }

    /// Sends a single short prompt to verify the provider is reachable
    /// and answering with textual content. No retries — this is the
    /// cheap gate in front of the full data request — but the call is
    /// bounded by `budget` so a stalled provider reads as down rather
    /// than blocking the query.
    ///
    /// Returns `false` when no provider is configured.
    pub async fn health_check(&self, budget: Duration) -> bool {
        let Some(provider) = self.current().await else {
            log::debug!("health check skipped: no provider configured");
            return false;
        };

        let response = match tokio::time::timeout(budget, provider.complete(HEALTH_CHECK_PROMPT))
            .await
        {
            Ok(response) => response,
            Err(_) => {
                log::warn!("health check timed out for {}", provider.model_name());
                return false;
            }
        };

        match response {
            Ok(text) if !text.trim().is_empty() => {
                log::debug!(
                    "health check passed for {}: {:.20}...",
                    provider.model_name(),
                    text
                );
                true
            }
            Ok(_) => {
                log::warn!("health check response had no textual content");
                false
            }
            Err(e) => {
                log::warn!("health check failed for {}: {e}", provider.model_name());
                false
            }
        }
    }

    /// Drops the current provider and rebuilds one from environment
    /// configuration.
    ///
    /// The lock is held across the rebuild, so concurrent callers
    /// queue up behind it; a caller that acquires the lock after a
    /// successful rebuild sees the fresh provider and returns without
    /// rebuilding again.
    pub async fn reinitialize(&self) -> bool {
        let mut guard = self.inner.lock().await;

        if guard.take().is_some() {
            log::info!("dropped stale generative provider");
        }

        match providers::create_provider_from_env() {
            Ok(provider) => {
                log::info!(
                    "generative provider re-initialized: {}",
                    provider.model_name()
                );
                *guard = Some(provider);
                true
            }
            Err(e) => {
                log::warn!("provider re-initialization failed: {e}");
                false
            }
        }
    }

    /// Removes the current provider without replacing it.
    pub async fn clear(&self) {
        self.inner.lock().await.take();
    }
}
