//! Source selection, retry, and fallback orchestration.

use std::time::Duration;

use impact_map_ai::{GenerativeProvider, ProviderHandle};
use impact_map_dataset::DatasetStore;
use impact_map_impact_models::{DataSource, FieldMap, ImpactField, ImpactRecord, QueryResult};

use crate::RetrievalError;
use crate::normalize::normalize_percentages;
use crate::parser::parse_impact_response;
use crate::prompt::impact_prompt;

/// Minimum share of the fourteen fields a response must parse into
/// before the attempt counts as a success.
const COVERAGE_THRESHOLD: f64 = 0.7;

/// Bounds on the generative data request.
///
/// The defaults mirror production behavior: three attempts, a 45 second
/// per-attempt budget, and a linear backoff of 1 s, 2 s, 3 s after the
/// first, second, and third failed attempts. Tests inject a shrunken
/// policy so the retry ladder runs in milliseconds.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts before the API path gives up.
    pub max_attempts: u32,
    /// Per-attempt time budget; a timeout counts as a transport error.
    pub request_timeout: Duration,
    /// Backoff after attempt `n` is `backoff_base * n`.
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            request_timeout: Duration::from_secs(45),
            backoff_base: Duration::from_secs(1),
        }
    }
}

/// State of the bounded retry loop around the generative data request.
enum AttemptState {
    /// Running attempt `n` (1-based).
    Attempting(u32),
    /// An attempt produced a response above the coverage threshold.
    Succeeded(FieldMap),
    /// Every attempt failed.
    Exhausted,
}

/// Orchestrates impact-data retrieval across the generative API and
/// the historical dataset.
///
/// One logical query runs at a time per call; the only suspension
/// point is the provider round trip, bounded by the per-attempt
/// timeout. Provider re-initialization is serialized inside
/// [`ProviderHandle`].
pub struct ImpactDataService {
    provider: ProviderHandle,
    dataset: Option<DatasetStore>,
    policy: RetryPolicy,
}

impl ImpactDataService {
    /// Creates a service over the given provider handle and optional
    /// dataset, with the default retry policy.
    #[must_use]
    pub fn new(provider: ProviderHandle, dataset: Option<DatasetStore>) -> Self {
        Self {
            provider,
            dataset,
            policy: RetryPolicy::default(),
        }
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Whether a historical dataset is attached.
    #[must_use]
    pub const fn has_dataset(&self) -> bool {
        self.dataset.is_some()
    }

    /// Retrieves impact data for a coordinate, preferring the
    /// generative API and falling back to the dataset.
    ///
    /// The API path runs only when a provider is configured and its
    /// health check passes. A failed health check drops the provider
    /// and re-initializes it once from the environment; if the fresh
    /// provider is healthy the data request proceeds, otherwise the
    /// query falls back to the dataset.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::DataUnavailable`] when the API path
    /// yields nothing and the dataset is absent or empty — the only
    /// terminal condition of this mode.
    pub async fn get_impact_data(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<QueryResult, RetrievalError> {
        let mut reinitialized = false;

        while let Some(provider) = self.provider.current().await {
            if self.provider.health_check(self.policy.request_timeout).await {
                log::info!(
                    "API connection healthy, requesting impact data from {}",
                    provider.model_name()
                );
                if let Some(record) = self.request_from_api(provider.as_ref(), lat, lon).await {
                    return Ok(QueryResult {
                        record,
                        source: DataSource::Api,
                        model: Some(provider.model_name().to_owned()),
                    });
                }
                log::warn!("API data retrieval failed, falling back to dataset");
                break;
            }

            if reinitialized {
                break;
            }
            log::warn!("API health check failed, re-initializing provider");
            reinitialized = true;
            if !self.provider.reinitialize().await {
                break;
            }
        }

        self.fallback(lat, lon)
    }

    /// Forced-API mode: retrieves impact data from the generative API
    /// only, never touching the dataset.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::ApiUnavailable`] when no provider is
    /// configured, the health check fails, or every attempt exhausts.
    pub async fn get_impact_data_api_only(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<QueryResult, RetrievalError> {
        let Some(provider) = self.provider.current().await else {
            return Err(RetrievalError::ApiUnavailable {
                reason: "no generative provider configured".to_string(),
            });
        };

        if !self.provider.health_check(self.policy.request_timeout).await {
            return Err(RetrievalError::ApiUnavailable {
                reason: "health check failed".to_string(),
            });
        }

        match self.request_from_api(provider.as_ref(), lat, lon).await {
            Some(record) => Ok(QueryResult {
                record,
                source: DataSource::Api,
                model: Some(provider.model_name().to_owned()),
            }),
            None => Err(RetrievalError::ApiUnavailable {
                reason: format!("no usable response after {} attempts", self.policy.max_attempts),
            }),
        }
    }

    /// The bounded retry loop around the generative data request.
    ///
    /// Each attempt is independent: submit the fixed prompt under the
    /// per-attempt timeout, parse, and accept only if coverage reaches
    /// the threshold. Every failed attempt is followed by a linear
    /// backoff sleep. Returns `None` once attempts are exhausted.
    async fn request_from_api(
        &self,
        provider: &dyn GenerativeProvider,
        lat: f64,
        lon: f64,
    ) -> Option<ImpactRecord> {
        let prompt = impact_prompt(lat, lon);
        let mut state = AttemptState::Attempting(1);

        loop {
            match state {
                AttemptState::Attempting(attempt) => {
                    log::info!(
                        "API attempt {attempt}/{} for ({lat}, {lon})",
                        self.policy.max_attempts
                    );

                    match tokio::time::timeout(
                        self.policy.request_timeout,
                        provider.complete(&prompt),
                    )
                    .await
                    {
                        Err(_) => {
                            log::warn!("request timed out on attempt {attempt}");
                        }
                        Ok(Err(e)) => {
                            log::warn!("API error on attempt {attempt}: {e}");
                        }
                        Ok(Ok(text)) => {
                            log::debug!(
                                "API response received, length: {} characters",
                                text.len()
                            );
                            let fields = parse_impact_response(&text);
                            if coverage_sufficient(fields.len()) {
                                state = AttemptState::Succeeded(fields);
                                continue;
                            }
                            log::warn!(
                                "insufficient data fields in response: got {}/{}",
                                fields.len(),
                                ImpactField::ALL.len()
                            );
                        }
                    }

                    tokio::time::sleep(self.policy.backoff_base * attempt).await;
                    state = if attempt >= self.policy.max_attempts {
                        AttemptState::Exhausted
                    } else {
                        AttemptState::Attempting(attempt + 1)
                    };
                }
                AttemptState::Succeeded(mut fields) => {
                    // Documented repair step: complete the record from
                    // the default table before rebalancing percentages.
                    for field in ImpactField::ALL {
                        fields.entry(field).or_insert_with(|| field.default_value());
                    }
                    normalize_percentages(&mut fields);
                    return Some(ImpactRecord::from_partial(&fields));
                }
                AttemptState::Exhausted => {
                    log::warn!("all API attempts failed");
                    return None;
                }
            }
        }
    }

    /// The dataset fallback path.
    fn fallback(&self, lat: f64, lon: f64) -> Result<QueryResult, RetrievalError> {
        log::info!("fetching impact data from dataset for ({lat}, {lon})");

        let Some(store) = self.dataset.as_ref() else {
            log::error!("no dataset loaded and API path yielded nothing");
            return Err(RetrievalError::DataUnavailable);
        };

        let row = store
            .nearest(lat, lon)
            .map_err(|_| RetrievalError::DataUnavailable)?;

        Ok(QueryResult {
            record: row.to_record(),
            source: DataSource::Csv,
            model: None,
        })
    }
}

/// Whether `parsed` out of the fourteen fields clears the acceptance
/// threshold.
#[allow(clippy::cast_precision_loss)]
fn coverage_sufficient(parsed: usize) -> bool {
    parsed as f64 >= ImpactField::ALL.len() as f64 * COVERAGE_THRESHOLD
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    use impact_map_ai::AiError;
    use impact_map_dataset::DatasetStore;

    use super::*;

    const DATASET: &str = "\
latitude,longitude,Total Population,Houses Damaged
21.10,81.60,12000,120
24.90,84.00,3000,15
";

    /// A provider that answers every call the same way and counts how
    /// often it was asked.
    struct StubProvider {
        behavior: StubBehavior,
        calls: AtomicUsize,
    }

    enum StubBehavior {
        Reply(String),
        Fail,
        Hang,
    }

    impl StubProvider {
        fn new(behavior: StubBehavior) -> Self {
            Self {
                behavior,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl GenerativeProvider for StubProvider {
        fn model_name(&self) -> &str {
            "stub-model"
        }

        async fn complete(&self, _prompt: &str) -> Result<String, AiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                StubBehavior::Reply(text) => Ok(text.clone()),
                StubBehavior::Fail => Err(AiError::Provider {
                    message: "stub transport failure".to_string(),
                }),
                StubBehavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    unreachable!("hung call should be cancelled by the timeout")
                }
            }
        }
    }

    fn test_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            request_timeout: Duration::from_millis(100),
            backoff_base: Duration::from_millis(5),
        }
    }

    fn full_response() -> String {
        let mut text = String::from("Here is the estimate:\n");
        for field in ImpactField::ALL {
            let value = if field.is_percentage() { "33.3" } else { "100" };
            text.push_str(&format!("{}: {value}\n", field.label()));
        }
        text
    }

    fn sparse_response() -> String {
        "Total Population: 100\n\
         Houses Damaged: 5\n\
         Shops Damaged: 3\n\
         Hotels Damaged: 1\n\
         Schools Damaged: 2\n"
            .to_string()
    }

    fn dataset() -> DatasetStore {
        DatasetStore::from_reader(DATASET.as_bytes()).unwrap()
    }

    fn service(provider: Arc<StubProvider>, store: Option<DatasetStore>) -> ImpactDataService {
        ImpactDataService::new(ProviderHandle::new(Some(provider)), store)
            .with_policy(test_policy())
    }

    #[tokio::test]
    async fn healthy_provider_yields_api_result() {
        let provider = Arc::new(StubProvider::new(StubBehavior::Reply(full_response())));
        let svc = service(Arc::clone(&provider), Some(dataset()));

        let result = svc.get_impact_data(21.19, 82.73).await.unwrap();
        assert_eq!(result.source, DataSource::Api);
        assert_eq!(result.model.as_deref(), Some("stub-model"));
        assert_eq!(result.record.total_population, 100);
        // One health check plus one data request.
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn absent_provider_goes_straight_to_dataset() {
        let svc = ImpactDataService::new(ProviderHandle::new(None), Some(dataset()))
            .with_policy(test_policy());

        let result = svc.get_impact_data(21.0, 81.5).await.unwrap();
        assert_eq!(result.source, DataSource::Csv);
        assert_eq!(result.model, None);
        assert_eq!(result.record.total_population, 12_000);
    }

    #[tokio::test]
    async fn sparse_responses_exhaust_retries_then_fall_back() {
        let provider = Arc::new(StubProvider::new(StubBehavior::Reply(sparse_response())));
        let svc = service(Arc::clone(&provider), Some(dataset()));

        let result = svc.get_impact_data(24.95, 84.01).await.unwrap();
        assert_eq!(result.source, DataSource::Csv);
        assert_eq!(result.record.total_population, 3000);
        // One health check plus three data attempts.
        assert_eq!(provider.calls(), 4);
    }

    #[tokio::test]
    async fn retry_bound_holds_with_cumulative_backoff() {
        let provider = Arc::new(StubProvider::new(StubBehavior::Fail));
        let policy = RetryPolicy {
            max_attempts: 3,
            request_timeout: Duration::from_millis(100),
            backoff_base: Duration::from_millis(10),
        };
        let svc = ImpactDataService::new(ProviderHandle::new(Some(Arc::clone(&provider) as _)), None)
            .with_policy(policy);

        let start = Instant::now();
        let record = svc
            .request_from_api(provider.as_ref(), 21.0, 82.0)
            .await;
        assert!(record.is_none());
        assert_eq!(provider.calls(), 3);
        // Backoff of 1, 2, and 3 base units: at least 60 ms slept.
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn timeouts_are_treated_as_attempt_failures() {
        let provider = Arc::new(StubProvider::new(StubBehavior::Hang));
        let svc = service(Arc::clone(&provider), Some(dataset()));

        // Health check hangs too, so the provider is declared down and
        // the re-initialization path (no env config in tests) clears it.
        let result = svc.get_impact_data(21.0, 81.5).await.unwrap();
        assert_eq!(result.source, DataSource::Csv);
    }

    #[tokio::test]
    async fn forced_mode_without_provider_is_api_unavailable() {
        let svc = ImpactDataService::new(ProviderHandle::new(None), Some(dataset()))
            .with_policy(test_policy());

        let err = svc.get_impact_data_api_only(21.0, 81.5).await.unwrap_err();
        assert!(matches!(err, RetrievalError::ApiUnavailable { .. }));
    }

    #[tokio::test]
    async fn forced_mode_never_falls_back_on_exhaustion() {
        let provider = Arc::new(StubProvider::new(StubBehavior::Reply(sparse_response())));
        let svc = service(Arc::clone(&provider), Some(dataset()));

        let err = svc.get_impact_data_api_only(21.0, 81.5).await.unwrap_err();
        assert!(matches!(err, RetrievalError::ApiUnavailable { .. }));
        assert_eq!(provider.calls(), 4);
    }

    #[tokio::test]
    async fn no_sources_at_all_is_data_unavailable() {
        let svc =
            ImpactDataService::new(ProviderHandle::new(None), None).with_policy(test_policy());

        let err = svc.get_impact_data(21.0, 81.5).await.unwrap_err();
        assert!(matches!(err, RetrievalError::DataUnavailable));
    }

    #[tokio::test]
    async fn api_records_are_complete_and_normalized() {
        // Ten of fourteen fields: above threshold, with a drifted age
        // group that must be rebalanced.
        let text = "\
Total Population: 50000
Economic Loss (INR): 2000000
Houses Damaged: 300
Shops Damaged: 80
Hotels Damaged: 10
Schools Damaged: 12
Children (%): 50
Adults (%): 50
Elderly (%): 50
Diabetes Cases: 450
";
        let provider = Arc::new(StubProvider::new(StubBehavior::Reply(text.to_string())));
        let svc = service(provider, None);

        let result = svc.get_impact_data(21.19, 82.73).await.unwrap();
        assert_eq!(result.source, DataSource::Api);
        let record = result.record;
        // Parsed fields survive.
        assert_eq!(record.total_population, 50_000);
        // Missing fields carry defaults.
        assert_eq!(record.blood_pressure_cases, 50);
        // The gender pair was default-filled to 33.3 each before
        // normalization, so its 66.6 sum rescales to an even split.
        assert!((record.male_pct - 50.0).abs() < 0.05);
        assert!((record.female_pct - 50.0).abs() < 0.05);
        // The 50/50/50 age triplet was rescaled to about a third each.
        assert!((record.children_pct - 33.3).abs() < 0.05);
        assert!((record.adults_pct - 33.3).abs() < 0.05);
        assert!((record.elderly_pct - 33.3).abs() < 0.05);
    }
}
