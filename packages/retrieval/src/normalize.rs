//! Percentage rebalancing for the age and gender groups.

use impact_map_impact_models::{FieldMap, ImpactField};

/// Age-bracket percentage triplet.
const AGE_GROUP: [ImpactField; 3] = [
    ImpactField::ChildrenPct,
    ImpactField::AdultsPct,
    ImpactField::ElderlyPct,
];

/// Gender percentage pair.
const GENDER_GROUP: [ImpactField; 2] = [ImpactField::MalePct, ImpactField::FemalePct];

/// How far a group's sum may drift from 100 before it gets rescaled.
const DRIFT_TOLERANCE: f64 = 5.0;

/// Rebalances the two independent percentage groups so each sums to
/// roughly 100.
///
/// For each group, if the sum of its present fields is nonzero and off
/// from 100 by more than the tolerance, every present field is scaled
/// by `100 / sum` and rounded to one decimal. Groups already within
/// tolerance, or summing to exactly zero, are left untouched — this is
/// a best-effort repair with an accepted rounding tolerance, not a
/// guarantee of exact 100.0 totals. Applying it twice is the same as
/// applying it once: a rescaled group lands within tolerance and is a
/// fixed point on the second pass.
pub fn normalize_percentages(fields: &mut FieldMap) {
    rescale_group(fields, &AGE_GROUP, "age");
    rescale_group(fields, &GENDER_GROUP, "gender");
}

fn rescale_group(fields: &mut FieldMap, group: &[ImpactField], group_name: &str) {
    let sum: f64 = group.iter().filter_map(|f| fields.get(f)).sum();

    if sum <= 0.0 || (sum - 100.0).abs() <= DRIFT_TOLERANCE {
        return;
    }

    log::debug!("{group_name} percentages sum to {sum:.1}; rescaling to 100");
    let factor = 100.0 / sum;
    for field in group {
        if let Some(value) = fields.get_mut(field) {
            *value = (*value * factor * 10.0).round() / 10.0;
        }
    }
}
