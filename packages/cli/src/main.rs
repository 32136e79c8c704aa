#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the impact map retrieval pipeline.
//!
//! `query` retrieves an impact estimate for a coordinate (generative
//! API first, dataset fallback), prints it with source attribution and
//! the reference catalog, and optionally exports it. `diagnose`
//! exercises each stage of the pipeline and reports what works.

mod diagnose;
mod export;

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use impact_map_ai::ProviderHandle;
use impact_map_dataset::DatasetStore;
use impact_map_impact_models::{DataSource, DisasterType, ImpactField, data_references};
use impact_map_retrieval::ImpactDataService;

use crate::export::{ImpactReport, format_value};

#[derive(Parser)]
#[command(name = "impact-map", about = "Disaster impact estimation toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Retrieve an impact estimate for a coordinate.
    Query {
        /// Latitude of the query point, degrees.
        #[arg(long)]
        lat: f64,
        /// Longitude of the query point, degrees.
        #[arg(long)]
        lon: f64,
        /// Path to the historical dataset CSV used as fallback.
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// Query the generative API only; fail instead of falling back.
        #[arg(long)]
        force_api: bool,
        /// Disaster scenario, used for the reference catalog.
        #[arg(long, default_value = "flood")]
        disaster_type: DisasterType,
        /// Write the report as CSV to this path.
        #[arg(long)]
        export_csv: Option<PathBuf>,
        /// Write the report as JSON to this path.
        #[arg(long)]
        export_json: Option<PathBuf>,
    },
    /// Probe the provider and pipeline, reporting each stage.
    Diagnose {
        /// Path to the historical dataset CSV used as fallback.
        #[arg(long)]
        dataset: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Query {
            lat,
            lon,
            dataset,
            force_api,
            disaster_type,
            export_csv,
            export_json,
        } => {
            run_query(
                lat,
                lon,
                dataset,
                force_api,
                disaster_type,
                export_csv.as_deref(),
                export_json.as_deref(),
            )
            .await?;
        }
        Command::Diagnose { dataset } => {
            diagnose::run(dataset.as_deref()).await;
        }
    }

    Ok(())
}

async fn run_query(
    lat: f64,
    lon: f64,
    dataset: Option<PathBuf>,
    force_api: bool,
    disaster_type: DisasterType,
    export_csv: Option<&std::path::Path>,
    export_json: Option<&std::path::Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = match dataset {
        Some(path) => Some(DatasetStore::load(&path)?),
        None => None,
    };

    let service = ImpactDataService::new(ProviderHandle::from_env(), store);

    let result = if force_api {
        service.get_impact_data_api_only(lat, lon).await?
    } else {
        service.get_impact_data(lat, lon).await?
    };

    println!("Impact estimate for ({lat}, {lon}) — {disaster_type}");
    match result.source {
        DataSource::Api => println!(
            "Source: generative API ({})",
            result.model.as_deref().unwrap_or("unknown model")
        ),
        DataSource::Csv => println!("Source: historical dataset (nearest coordinate match)"),
    }
    println!();

    for field in ImpactField::ALL {
        println!(
            "  {:<24} {:>12}",
            field.label(),
            format_value(&result.record, field)
        );
    }
    println!();

    println!("Data sources & references:");
    for reference in data_references(disaster_type, result.model.as_deref()) {
        println!("  - {} ({}): {}", reference.name, reference.data_type, reference.url);
    }

    let report = ImpactReport {
        generated_at: Utc::now(),
        latitude: lat,
        longitude: lon,
        disaster_type,
        source: result.source,
        model: result.model.clone(),
        impact: result.record,
    };

    if let Some(path) = export_csv {
        report.write_csv(path)?;
        println!();
        println!("CSV report written to {}", path.display());
    }
    if let Some(path) = export_json {
        report.write_json(path)?;
        println!("JSON report written to {}", path.display());
    }

    Ok(())
}
