//! The typed impact record and the pipeline's result contract.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::field::{FieldMap, ImpactField};

/// A complete impact estimate: one value per [`ImpactField`].
///
/// Completeness holds by construction — [`ImpactRecord::from_partial`]
/// fills every missing field from the documented default table, so a
/// record handed to presentation or export code never has holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactRecord {
    /// Total population in the affected area.
    #[serde(rename = "Total Population")]
    pub total_population: u64,
    /// Estimated economic loss, in Indian rupees.
    #[serde(rename = "Economic Loss (INR)")]
    pub economic_loss_inr: f64,
    /// Residential buildings damaged.
    #[serde(rename = "Houses Damaged")]
    pub houses_damaged: u64,
    /// Commercial shops damaged.
    #[serde(rename = "Shops Damaged")]
    pub shops_damaged: u64,
    /// Hotels damaged.
    #[serde(rename = "Hotels Damaged")]
    pub hotels_damaged: u64,
    /// Schools damaged.
    #[serde(rename = "Schools Damaged")]
    pub schools_damaged: u64,
    /// Share of affected population that are children, percent.
    #[serde(rename = "Children (%)")]
    pub children_pct: f64,
    /// Share of affected population that are adults, percent.
    #[serde(rename = "Adults (%)")]
    pub adults_pct: f64,
    /// Share of affected population that are elderly, percent.
    #[serde(rename = "Elderly (%)")]
    pub elderly_pct: f64,
    /// Male share of affected population, percent.
    #[serde(rename = "Male (%)")]
    pub male_pct: f64,
    /// Female share of affected population, percent.
    #[serde(rename = "Female (%)")]
    pub female_pct: f64,
    /// Diabetes cases among the affected population.
    #[serde(rename = "Diabetes Cases")]
    pub diabetes_cases: u64,
    /// Blood pressure cases among the affected population.
    #[serde(rename = "Blood Pressure Cases")]
    pub blood_pressure_cases: u64,
    /// Respiratory cases among the affected population.
    #[serde(rename = "Respiratory Cases")]
    pub respiratory_cases: u64,
}

impl ImpactRecord {
    /// Builds a complete record from a partial field map, filling every
    /// missing field from [`ImpactField::default_value`].
    ///
    /// Count fields are truncated toward zero; negative values clamp
    /// to zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_partial(fields: &FieldMap) -> Self {
        let value = |field: ImpactField| {
            fields
                .get(&field)
                .copied()
                .unwrap_or_else(|| field.default_value())
        };
        let count = |field: ImpactField| value(field).max(0.0) as u64;

        Self {
            total_population: count(ImpactField::TotalPopulation),
            economic_loss_inr: value(ImpactField::EconomicLoss).max(0.0),
            houses_damaged: count(ImpactField::HousesDamaged),
            shops_damaged: count(ImpactField::ShopsDamaged),
            hotels_damaged: count(ImpactField::HotelsDamaged),
            schools_damaged: count(ImpactField::SchoolsDamaged),
            children_pct: value(ImpactField::ChildrenPct),
            adults_pct: value(ImpactField::AdultsPct),
            elderly_pct: value(ImpactField::ElderlyPct),
            male_pct: value(ImpactField::MalePct),
            female_pct: value(ImpactField::FemalePct),
            diabetes_cases: count(ImpactField::DiabetesCases),
            blood_pressure_cases: count(ImpactField::BloodPressureCases),
            respiratory_cases: count(ImpactField::RespiratoryCases),
        }
    }

    /// Returns the numeric value of a single field.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn value(&self, field: ImpactField) -> f64 {
        match field {
            ImpactField::TotalPopulation => self.total_population as f64,
            ImpactField::EconomicLoss => self.economic_loss_inr,
            ImpactField::HousesDamaged => self.houses_damaged as f64,
            ImpactField::ShopsDamaged => self.shops_damaged as f64,
            ImpactField::HotelsDamaged => self.hotels_damaged as f64,
            ImpactField::SchoolsDamaged => self.schools_damaged as f64,
            ImpactField::ChildrenPct => self.children_pct,
            ImpactField::AdultsPct => self.adults_pct,
            ImpactField::ElderlyPct => self.elderly_pct,
            ImpactField::MalePct => self.male_pct,
            ImpactField::FemalePct => self.female_pct,
            ImpactField::DiabetesCases => self.diabetes_cases as f64,
            ImpactField::BloodPressureCases => self.blood_pressure_cases as f64,
            ImpactField::RespiratoryCases => self.respiratory_cases as f64,
        }
    }
}

/// Which backend produced a query result.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DataSource {
    /// The generative text-completion API.
    Api,
    /// The historical CSV dataset (nearest-coordinate match).
    Csv,
}

/// The pipeline's sole success contract: a complete record, the source
/// that produced it, and — for the API path — the model that was
/// queried.
///
/// The shape never varies with the internal path taken; presentation
/// code only inspects `source` to attribute the data.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// The complete impact estimate.
    pub record: ImpactRecord,
    /// Which backend produced it.
    pub source: DataSource,
    /// Model identifier, present only when `source` is [`DataSource::Api`].
    pub model: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_partial_yields_all_defaults() {
        let record = ImpactRecord::from_partial(&FieldMap::new());
        assert_eq!(record.total_population, 50);
        assert!((record.economic_loss_inr - 500_000.0).abs() < f64::EPSILON);
        assert_eq!(record.houses_damaged, 50);
        assert!((record.children_pct - 33.3).abs() < f64::EPSILON);
        assert!((record.male_pct - 33.3).abs() < f64::EPSILON);
    }

    #[test]
    fn parsed_values_override_defaults() {
        let mut fields = FieldMap::new();
        fields.insert(ImpactField::TotalPopulation, 125_000.0);
        fields.insert(ImpactField::ChildrenPct, 28.4);
        let record = ImpactRecord::from_partial(&fields);
        assert_eq!(record.total_population, 125_000);
        assert!((record.children_pct - 28.4).abs() < f64::EPSILON);
        // Untouched fields still carry defaults.
        assert_eq!(record.shops_damaged, 50);
    }

    #[test]
    fn negative_counts_clamp_to_zero() {
        let mut fields = FieldMap::new();
        fields.insert(ImpactField::HousesDamaged, -12.0);
        fields.insert(ImpactField::EconomicLoss, -1.0);
        let record = ImpactRecord::from_partial(&fields);
        assert_eq!(record.houses_damaged, 0);
        assert!(record.economic_loss_inr.abs() < f64::EPSILON);
    }

    #[test]
    fn every_field_is_reachable_through_value() {
        let record = ImpactRecord::from_partial(&FieldMap::new());
        for field in ImpactField::ALL {
            let v = record.value(field);
            assert!(v >= 0.0, "{field} should be non-negative, got {v}");
        }
    }

    #[test]
    fn serializes_under_display_labels() {
        let record = ImpactRecord::from_partial(&FieldMap::new());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["Total Population"], 50);
        assert_eq!(json["Economic Loss (INR)"], 500_000.0);
        assert_eq!(json["Elderly (%)"], 33.3);
    }

    #[test]
    fn data_source_round_trips_as_lowercase() {
        assert_eq!(DataSource::Api.to_string(), "api");
        assert_eq!("csv".parse::<DataSource>().unwrap(), DataSource::Csv);
    }
}
