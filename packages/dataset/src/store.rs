//! CSV-backed dataset store and nearest-coordinate selection.

use std::io::Read;
use std::path::Path;

use impact_map_impact_models::{FieldMap, ImpactField, ImpactRecord};

use crate::DatasetError;

/// How a CSV column maps into the impact taxonomy.
enum ColumnRole {
    Latitude,
    Longitude,
    Field(ImpactField),
    Ignored,
}

/// One historical record: an optional coordinate plus whatever impact
/// fields its row carried.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRow {
    /// Latitude in degrees, if the dataset has coordinate columns.
    pub latitude: Option<f64>,
    /// Longitude in degrees, if the dataset has coordinate columns.
    pub longitude: Option<f64>,
    /// The impact fields present on this row.
    pub fields: FieldMap,
}

impl DatasetRow {
    /// Converts this row into a complete record, default-filling any
    /// field the dataset did not carry.
    #[must_use]
    pub fn to_record(&self) -> ImpactRecord {
        ImpactRecord::from_partial(&self.fields)
    }
}

/// An in-memory copy of the historical dataset, immutable after load.
pub struct DatasetStore {
    rows: Vec<DatasetRow>,
    has_coordinates: bool,
}

impl DatasetStore {
    /// Loads the dataset from a CSV file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the file cannot be opened or parsed.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let file = std::fs::File::open(path)?;
        let store = Self::from_reader(file)?;
        log::info!(
            "loaded {} dataset rows from {} (coordinates: {})",
            store.rows.len(),
            path.display(),
            if store.has_coordinates { "yes" } else { "no" },
        );
        Ok(store)
    }

    /// Loads the dataset from any CSV byte stream.
    ///
    /// Headers are trimmed and matched against the impact-field labels
    /// by substring containment; `latitude`/`longitude` columns are
    /// recognized case-insensitively. Unrecognized columns are ignored.
    /// Cells that fail numeric parsing are skipped, not errors.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the stream is not valid CSV.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_owned())
            .collect();

        let roles: Vec<ColumnRole> = headers
            .iter()
            .map(|header| {
                if header.eq_ignore_ascii_case("latitude") {
                    ColumnRole::Latitude
                } else if header.eq_ignore_ascii_case("longitude") {
                    ColumnRole::Longitude
                } else if let Some(field) = ImpactField::match_label(header) {
                    ColumnRole::Field(field)
                } else {
                    log::debug!("ignoring unrecognized dataset column: {header}");
                    ColumnRole::Ignored
                }
            })
            .collect();

        let has_coordinates = roles
            .iter()
            .any(|r| matches!(r, ColumnRole::Latitude))
            && roles.iter().any(|r| matches!(r, ColumnRole::Longitude));

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            let mut row = DatasetRow {
                latitude: None,
                longitude: None,
                fields: FieldMap::new(),
            };

            for (i, role) in roles.iter().enumerate() {
                let Some(cell) = record.get(i) else { continue };
                let Ok(value) = cell.trim().parse::<f64>() else {
                    continue;
                };
                match role {
                    ColumnRole::Latitude => row.latitude = Some(value),
                    ColumnRole::Longitude => row.longitude = Some(value),
                    ColumnRole::Field(field) => {
                        row.fields.insert(*field, value);
                    }
                    ColumnRole::Ignored => {}
                }
            }

            rows.push(row);
        }

        Ok(Self {
            rows,
            has_coordinates,
        })
    }

    /// Number of rows in the dataset.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether latitude/longitude columns were present at load time.
    #[must_use]
    pub const fn has_coordinates(&self) -> bool {
        self.has_coordinates
    }

    /// Returns the row nearest to `(lat, lon)` by planar Euclidean
    /// distance in raw degrees — a documented simplification, not
    /// geodesic distance. Ties keep the first-occurring row in file
    /// order.
    ///
    /// When the dataset has no coordinate columns the first row is
    /// returned unconditionally, preserving the behavior of earlier
    /// versions of this system (see DESIGN.md).
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::DataUnavailable`] if the dataset is
    /// empty.
    pub fn nearest(&self, lat: f64, lon: f64) -> Result<&DatasetRow, DatasetError> {
        if self.rows.is_empty() {
            return Err(DatasetError::DataUnavailable);
        }

        if !self.has_coordinates {
            log::warn!(
                "dataset has no latitude/longitude columns; returning first row for ({lat}, {lon})"
            );
            return Ok(&self.rows[0]);
        }

        let mut best: Option<(&DatasetRow, f64)> = None;
        for row in &self.rows {
            let (Some(row_lat), Some(row_lon)) = (row.latitude, row.longitude) else {
                continue;
            };
            let distance = ((row_lat - lat).powi(2) + (row_lon - lon).powi(2)).sqrt();
            // Strict less-than keeps the first-occurring row on ties.
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((row, distance));
            }
        }

        best.map_or_else(
            || {
                log::warn!("no dataset row carries coordinates; returning first row");
                Ok(&self.rows[0])
            },
            |(row, distance)| {
                log::debug!("nearest dataset row to ({lat}, {lon}) at distance {distance:.4}");
                Ok(row)
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
latitude,longitude,Total Population,Economic Loss (INR),Houses Damaged,Children (%)
21.10,81.60,12000,750000,120,30.0
21.50,82.00,8000,250000,40,28.5
22.00,82.50,47000,3200000,410,35.2
";

    fn sample_store() -> DatasetStore {
        DatasetStore::from_reader(SAMPLE.as_bytes()).unwrap()
    }

    #[test]
    fn loads_rows_and_detects_coordinates() {
        let store = sample_store();
        assert_eq!(store.len(), 3);
        assert!(store.has_coordinates());
    }

    #[test]
    fn nearest_selects_minimum_distance_row() {
        let store = sample_store();
        let row = store.nearest(21.49, 82.01).unwrap();
        assert_eq!(row.fields[&ImpactField::TotalPopulation], 8000.0);
    }

    #[test]
    fn nearest_is_deterministic_across_calls() {
        let store = sample_store();
        let first = store.nearest(21.8, 82.3).unwrap().clone();
        for _ in 0..10 {
            assert_eq!(store.nearest(21.8, 82.3).unwrap(), &first);
        }
    }

    #[test]
    fn ties_keep_the_first_row_in_file_order() {
        let csv = "\
latitude,longitude,Total Population
21.0,81.0,111
23.0,81.0,222
";
        let store = DatasetStore::from_reader(csv.as_bytes()).unwrap();
        // (22.0, 81.0) is equidistant from both rows.
        let row = store.nearest(22.0, 81.0).unwrap();
        assert_eq!(row.fields[&ImpactField::TotalPopulation], 111.0);
    }

    #[test]
    fn missing_coordinate_columns_fall_back_to_first_row() {
        let csv = "\
Total Population,Houses Damaged
9000,75
100,1
";
        let store = DatasetStore::from_reader(csv.as_bytes()).unwrap();
        assert!(!store.has_coordinates());
        let row = store.nearest(21.0, 82.0).unwrap();
        assert_eq!(row.fields[&ImpactField::TotalPopulation], 9000.0);
    }

    #[test]
    fn empty_dataset_is_data_unavailable() {
        let store = DatasetStore::from_reader("latitude,longitude\n".as_bytes()).unwrap();
        assert!(store.is_empty());
        assert!(matches!(
            store.nearest(21.0, 82.0),
            Err(DatasetError::DataUnavailable)
        ));
    }

    #[test]
    fn rows_complete_into_records_with_defaults() {
        let store = sample_store();
        let record = store.nearest(21.10, 81.60).unwrap().to_record();
        assert_eq!(record.total_population, 12_000);
        assert_eq!(record.houses_damaged, 120);
        // Columns absent from the dataset carry the documented defaults.
        assert_eq!(record.shops_damaged, 50);
        assert!((record.adults_pct - 33.3).abs() < f64::EPSILON);
    }

    #[test]
    fn unparseable_cells_are_skipped() {
        let csv = "\
latitude,longitude,Total Population
21.0,81.0,not-a-number
";
        let store = DatasetStore::from_reader(csv.as_bytes()).unwrap();
        let row = store.nearest(21.0, 81.0).unwrap();
        assert!(!row.fields.contains_key(&ImpactField::TotalPopulation));
    }
}
