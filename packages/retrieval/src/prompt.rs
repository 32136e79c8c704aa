//! The fixed prompt template for the generative data request.

use std::fmt::Write;

use impact_map_impact_models::ImpactField;

/// Builds the data-request prompt for a coordinate: a fixed
/// instruction header followed by the fourteen field lines in
/// canonical order, each asking for a bare number after the colon.
#[must_use]
pub fn impact_prompt(lat: f64, lon: f64) -> String {
    let mut prompt = format!(
        "As an AI disaster impact analyzer, provide realistic disaster impact data \
         for coordinates ({lat}, {lon}) in Chhattisgarh, India.\n\
         Consider factors like population density, infrastructure quality, and \
         regional vulnerabilities.\n\
         Return ONLY numerical values in this format (put only numbers after the colon):\n"
    );

    for field in ImpactField::ALL {
        // Infallible on String.
        let _ = writeln!(prompt, "{}: [number]", field.label());
    }

    prompt
}
