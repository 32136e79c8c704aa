//! Report export: the same record as a flat CSV row or pretty JSON.

use std::path::Path;

use chrono::{DateTime, Utc};
use impact_map_impact_models::{DataSource, DisasterType, ImpactField, ImpactRecord};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while writing an export file.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Writing the file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A complete impact report: the record plus the query context it was
/// produced under.
#[derive(Debug, Clone, Serialize)]
pub struct ImpactReport {
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Query latitude, degrees.
    pub latitude: f64,
    /// Query longitude, degrees.
    pub longitude: f64,
    /// The disaster scenario the user selected.
    pub disaster_type: DisasterType,
    /// Which backend produced the record.
    pub source: DataSource,
    /// Model identifier, for API-sourced records.
    pub model: Option<String>,
    /// The complete impact estimate.
    pub impact: ImpactRecord,
}

impl ImpactReport {
    /// Writes the report as a two-row CSV file: context and field
    /// labels in the header, values in the single data row.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if the file cannot be written.
    pub fn write_csv(&self, path: &Path) -> Result<(), ExportError> {
        let mut writer = csv::Writer::from_path(path)?;

        let mut header = vec![
            "Generated At".to_owned(),
            "Latitude".to_owned(),
            "Longitude".to_owned(),
            "Disaster Type".to_owned(),
            "Source".to_owned(),
            "Model".to_owned(),
        ];
        header.extend(ImpactField::ALL.iter().map(|f| f.label().to_owned()));
        writer.write_record(&header)?;

        let mut row = vec![
            self.generated_at.to_rfc3339(),
            self.latitude.to_string(),
            self.longitude.to_string(),
            self.disaster_type.to_string(),
            self.source.to_string(),
            self.model.clone().unwrap_or_default(),
        ];
        row.extend(
            ImpactField::ALL
                .iter()
                .map(|field| format_value(&self.impact, *field)),
        );
        writer.write_record(&row)?;

        writer.flush()?;
        log::info!("wrote CSV report to {}", path.display());
        Ok(())
    }

    /// Writes the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if serialization or the write fails.
    pub fn write_json(&self, path: &Path) -> Result<(), ExportError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("wrote JSON report to {}", path.display());
        Ok(())
    }
}

/// Formats one field for tabular output: percentages keep one decimal,
/// counts and currency print as whole numbers.
pub fn format_value(record: &ImpactRecord, field: ImpactField) -> String {
    let value = record.value(field);
    if field.is_percentage() {
        format!("{value:.1}")
    } else {
        format!("{value:.0}")
    }
}
