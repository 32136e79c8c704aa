//! The canonical fourteen-field impact taxonomy.

use std::collections::BTreeMap;

/// A partially-populated set of impact values, keyed by field.
///
/// `BTreeMap` keeps entries in canonical field order, which makes log
/// output and serialized forms deterministic.
pub type FieldMap = BTreeMap<ImpactField, f64>;

/// One of the fourteen named numeric fields that make up an impact
/// estimate.
///
/// The variant order is the canonical order: it is the order fields
/// appear in the generative prompt, the order labels are matched against
/// free-text response lines (first match wins), and the column order of
/// exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImpactField {
    /// Total population in the affected area.
    TotalPopulation,
    /// Estimated economic loss, in Indian rupees.
    EconomicLoss,
    /// Residential buildings damaged.
    HousesDamaged,
    /// Commercial shops damaged.
    ShopsDamaged,
    /// Hotels damaged.
    HotelsDamaged,
    /// Schools damaged.
    SchoolsDamaged,
    /// Share of affected population that are children, percent.
    ChildrenPct,
    /// Share of affected population that are adults, percent.
    AdultsPct,
    /// Share of affected population that are elderly, percent.
    ElderlyPct,
    /// Male share of affected population, percent.
    MalePct,
    /// Female share of affected population, percent.
    FemalePct,
    /// Diabetes cases among the affected population.
    DiabetesCases,
    /// Blood pressure cases among the affected population.
    BloodPressureCases,
    /// Respiratory cases among the affected population.
    RespiratoryCases,
}

impl ImpactField {
    /// All fields in canonical order.
    pub const ALL: [Self; 14] = [
        Self::TotalPopulation,
        Self::EconomicLoss,
        Self::HousesDamaged,
        Self::ShopsDamaged,
        Self::HotelsDamaged,
        Self::SchoolsDamaged,
        Self::ChildrenPct,
        Self::AdultsPct,
        Self::ElderlyPct,
        Self::MalePct,
        Self::FemalePct,
        Self::DiabetesCases,
        Self::BloodPressureCases,
        Self::RespiratoryCases,
    ];

    /// The display label for this field, as it appears in prompts,
    /// dataset headers, and exports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TotalPopulation => "Total Population",
            Self::EconomicLoss => "Economic Loss (INR)",
            Self::HousesDamaged => "Houses Damaged",
            Self::ShopsDamaged => "Shops Damaged",
            Self::HotelsDamaged => "Hotels Damaged",
            Self::SchoolsDamaged => "Schools Damaged",
            Self::ChildrenPct => "Children (%)",
            Self::AdultsPct => "Adults (%)",
            Self::ElderlyPct => "Elderly (%)",
            Self::MalePct => "Male (%)",
            Self::FemalePct => "Female (%)",
            Self::DiabetesCases => "Diabetes Cases",
            Self::BloodPressureCases => "Blood Pressure Cases",
            Self::RespiratoryCases => "Respiratory Cases",
        }
    }

    /// Whether this field is a percentage share (as opposed to a count
    /// or currency amount).
    #[must_use]
    pub const fn is_percentage(self) -> bool {
        matches!(
            self,
            Self::ChildrenPct
                | Self::AdultsPct
                | Self::ElderlyPct
                | Self::MalePct
                | Self::FemalePct
        )
    }

    /// The documented default used to complete a partial record:
    /// percentages default to 33.3, economic loss to 500 000 INR, and
    /// all other counts to 50.
    #[must_use]
    pub const fn default_value(self) -> f64 {
        if self.is_percentage() {
            33.3
        } else if matches!(self, Self::EconomicLoss) {
            500_000.0
        } else {
            50.0
        }
    }

    /// Matches an observed label (a prompt-response line prefix or a
    /// dataset column header) against the canonical labels by substring
    /// containment, so decorations the generative model adds around the
    /// field name ("**Total Population**", "1. Houses Damaged") still
    /// resolve.
    ///
    /// Fields are tried in canonical order and the first containing
    /// match wins. That order is the de facto tie-break rule for labels
    /// that could contain more than one canonical name.
    #[must_use]
    pub fn match_label(observed: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| observed.contains(field.label()))
    }
}

impl std::fmt::Display for ImpactField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_exact_label() {
        assert_eq!(
            ImpactField::match_label("Total Population"),
            Some(ImpactField::TotalPopulation)
        );
    }

    #[test]
    fn matches_decorated_label() {
        assert_eq!(
            ImpactField::match_label("**Houses Damaged** (estimated)"),
            Some(ImpactField::HousesDamaged)
        );
        assert_eq!(
            ImpactField::match_label("3. Economic Loss (INR)"),
            Some(ImpactField::EconomicLoss)
        );
    }

    #[test]
    fn rejects_unknown_label() {
        assert_eq!(ImpactField::match_label("Bridges Damaged"), None);
    }

    #[test]
    fn male_and_female_labels_do_not_collide() {
        // "Male (%)" is tried before "Female (%)" in canonical order;
        // case-sensitive containment keeps them distinct.
        assert_eq!(
            ImpactField::match_label("Female (%)"),
            Some(ImpactField::FemalePct)
        );
        assert_eq!(
            ImpactField::match_label("Male (%)"),
            Some(ImpactField::MalePct)
        );
    }

    #[test]
    fn first_match_wins_in_canonical_order() {
        // A pathological label containing two canonical names resolves
        // to whichever comes first in `ImpactField::ALL`.
        assert_eq!(
            ImpactField::match_label("Houses Damaged and Shops Damaged"),
            Some(ImpactField::HousesDamaged)
        );
    }

    #[test]
    fn default_values_follow_field_kind() {
        assert!((ImpactField::ChildrenPct.default_value() - 33.3).abs() < f64::EPSILON);
        assert!((ImpactField::EconomicLoss.default_value() - 500_000.0).abs() < f64::EPSILON);
        assert!((ImpactField::HousesDamaged.default_value() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn exactly_five_percentage_fields() {
        let count = ImpactField::ALL
            .iter()
            .filter(|f| f.is_percentage())
            .count();
        assert_eq!(count, 5);
    }
}
