//! Connection diagnostics: probe the provider directly, then exercise
//! the full retrieval pipeline.

use std::path::Path;

use impact_map_ai::{ProviderHandle, create_provider_from_env};
use impact_map_dataset::DatasetStore;
use impact_map_retrieval::ImpactDataService;

/// Probe coordinate in the dataset's home region.
const PROBE_LAT: f64 = 21.19;
const PROBE_LON: f64 = 82.73;

/// Runs the diagnostic stages and prints a report to stdout.
///
/// Never returns an error: each stage reports its own pass/fail so a
/// broken provider still lets the dataset stage run.
pub async fn run(dataset_path: Option<&Path>) {
    println!("=== Impact Map Diagnostics ===");
    println!();

    // Stage 1: provider configuration.
    println!("[1/3] Provider configuration");
    let provider = match create_provider_from_env() {
        Ok(provider) => {
            println!("  ok: provider configured for model {}", provider.model_name());
            Some(provider)
        }
        Err(e) => {
            println!("  failed: {e}");
            None
        }
    };
    println!();

    // Stage 2: direct completion probe.
    println!("[2/3] Direct completion probe");
    if let Some(provider) = &provider {
        match provider.complete("Hello, respond with one word only").await {
            Ok(text) => {
                let preview: String = text.chars().take(60).collect();
                println!("  ok: response received: {preview}");
            }
            Err(e) => println!("  failed: {e}"),
        }
    } else {
        println!("  skipped: no provider");
    }
    println!();

    // Stage 3: full pipeline probe, including dataset fallback.
    println!("[3/3] Retrieval pipeline probe ({PROBE_LAT}, {PROBE_LON})");
    let dataset = dataset_path.and_then(|path| match DatasetStore::load(path) {
        Ok(store) => {
            println!("  dataset: {} rows loaded", store.len());
            Some(store)
        }
        Err(e) => {
            println!("  dataset: failed to load: {e}");
            None
        }
    });
    if dataset.is_none() && dataset_path.is_none() {
        println!("  dataset: none provided (--dataset)");
    }

    let service = ImpactDataService::new(ProviderHandle::new(provider), dataset);
    match service.get_impact_data(PROBE_LAT, PROBE_LON).await {
        Ok(result) => {
            println!(
                "  ok: record retrieved from {} source{}",
                result.source,
                result
                    .model
                    .as_deref()
                    .map(|m| format!(" (model {m})"))
                    .unwrap_or_default()
            );
            println!("  sample: Total Population = {}", result.record.total_population);
        }
        Err(e) => println!("  failed: {e}"),
    }

    println!();
    println!("=== Diagnostics complete ===");
}
