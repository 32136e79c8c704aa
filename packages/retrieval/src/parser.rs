//! Tolerant parser for the generative model's line-oriented response.
//!
//! Generative output is noisy: labels get decorated with markdown or
//! numbering, values arrive with currency symbols, thousands
//! separators, units, or trailing commentary. The parser extracts what
//! it can and silently drops what it cannot — a malformed line is an
//! expected input shape here, not a fault.

use impact_map_impact_models::{FieldMap, ImpactField};

/// Parses free-text model output into a field map.
///
/// For every line containing a `:` separator, the left side is matched
/// against the canonical field labels by substring containment (first
/// match in canonical order wins) and the right side is stripped to
/// digit and decimal-point characters before numeric conversion.
/// Count fields are truncated toward zero; percentage fields keep
/// their fractional part.
///
/// Guarantees: returns 0 to 14 entries, never panics on any input,
/// and keeps the first successfully parsed value when a field appears
/// on more than one line.
#[must_use]
pub fn parse_impact_response(text: &str) -> FieldMap {
    let mut fields = FieldMap::new();

    for line in text.lines() {
        let line = line.trim();
        let Some((label, value)) = line.split_once(':') else {
            continue;
        };

        let Some(field) = ImpactField::match_label(label) else {
            log::debug!("no impact field matches line label: {label}");
            continue;
        };

        if fields.contains_key(&field) {
            log::debug!("duplicate line for {field}; keeping first value");
            continue;
        }

        let numeric: String = value
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();

        match numeric.parse::<f64>() {
            Ok(parsed) => {
                let parsed = if field.is_percentage() {
                    parsed
                } else {
                    parsed.trunc()
                };
                fields.insert(field, parsed);
            }
            Err(_) => {
                log::debug!("could not convert value for {field}: {value}");
            }
        }
    }

    fields
}
