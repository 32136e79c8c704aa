//! Disaster event types and the data-source reference catalog.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The disaster event categories the system estimates impact for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum DisasterType {
    /// Riverine or flash flooding.
    Flood,
    /// Seismic events.
    Earthquake,
    /// Tropical cyclones and associated storm surge.
    Cyclone,
    /// Forest and scrub fires.
    Wildfire,
    /// Slope failures in hilly terrain.
    Landslide,
}

impl DisasterType {
    /// All disaster types, in menu order.
    pub const ALL: [Self; 5] = [
        Self::Flood,
        Self::Earthquake,
        Self::Cyclone,
        Self::Wildfire,
        Self::Landslide,
    ];
}

/// An external data source cited alongside an impact estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataReference {
    /// Organization or dataset name.
    pub name: String,
    /// What the source provides.
    pub description: String,
    /// Landing page.
    pub url: String,
    /// Broad category of the data.
    pub data_type: String,
}

impl DataReference {
    fn new(name: &str, description: &str, url: &str, data_type: &str) -> Self {
        Self {
            name: name.to_owned(),
            description: description.to_owned(),
            url: url.to_owned(),
            data_type: data_type.to_owned(),
        }
    }
}

/// Returns the reference catalog for a disaster type: references common
/// to every disaster (demographics, regional disaster-management
/// records, health statistics), the type-specific ones, and — when the
/// estimate came from the generative API — a reference naming the model
/// that produced it.
#[must_use]
pub fn data_references(disaster: DisasterType, model: Option<&str>) -> Vec<DataReference> {
    let mut references = vec![
        DataReference::new(
            "Census of India",
            "Demographic data including population statistics",
            "https://censusindia.gov.in/",
            "Demographics",
        ),
        DataReference::new(
            "Chhattisgarh State Disaster Management Authority",
            "Local disaster management data and historical records",
            "https://cgsdma.gov.in/",
            "Regional Data",
        ),
        DataReference::new(
            "National Health Mission - Chhattisgarh",
            "Health statistics and medical infrastructure data",
            "https://cg.nhm.gov.in/",
            "Health Data",
        ),
    ];

    references.extend(specific_references(disaster));

    if let Some(model) = model {
        references.push(DataReference::new(
            &format!("Google AI - {model}"),
            "Generative AI model used for disaster impact prediction",
            "https://ai.google.dev/",
            "AI Model",
        ));
    }

    references
}

fn specific_references(disaster: DisasterType) -> Vec<DataReference> {
    match disaster {
        DisasterType::Flood => vec![
            DataReference::new(
                "Central Water Commission",
                "River water levels and flood forecasting data",
                "https://cwc.gov.in/",
                "Hydrological Data",
            ),
            DataReference::new(
                "India Meteorological Department",
                "Rainfall data and precipitation patterns",
                "https://mausam.imd.gov.in/",
                "Weather Data",
            ),
            DataReference::new(
                "National Remote Sensing Centre",
                "Satellite imagery for flood extent mapping",
                "https://www.nrsc.gov.in/",
                "Satellite Data",
            ),
        ],
        DisasterType::Earthquake => vec![
            DataReference::new(
                "National Centre for Seismology",
                "Earthquake monitoring and seismic data",
                "https://seismo.gov.in/",
                "Seismic Data",
            ),
            DataReference::new(
                "Geological Survey of India",
                "Geological and terrain information",
                "https://www.gsi.gov.in/",
                "Geological Data",
            ),
            DataReference::new(
                "Building Materials & Technology Promotion Council",
                "Building vulnerability data for seismic zones",
                "https://bmtpc.org/",
                "Infrastructure Data",
            ),
        ],
        DisasterType::Cyclone => vec![
            DataReference::new(
                "India Meteorological Department - Cyclone Warning",
                "Cyclone tracking and intensity data",
                "https://mausam.imd.gov.in/",
                "Weather Data",
            ),
            DataReference::new(
                "National Disaster Management Authority - Cyclone",
                "Cyclone preparedness and impact assessment",
                "https://ndma.gov.in/Natural-Hazards/Cyclone",
                "Disaster Management Data",
            ),
            DataReference::new(
                "Indian National Centre for Ocean Information Services",
                "Ocean state forecasting and storm surge predictions",
                "https://incois.gov.in/",
                "Oceanographic Data",
            ),
        ],
        DisasterType::Wildfire => vec![
            DataReference::new(
                "Forest Survey of India",
                "Forest cover and fire alert system data",
                "https://fsi.nic.in/",
                "Forest Data",
            ),
            DataReference::new(
                "FIRMS - NASA Fire Information for Resource Management",
                "Satellite-based fire detection data",
                "https://firms.modaps.eosdis.nasa.gov/",
                "Satellite Fire Data",
            ),
            DataReference::new(
                "India State of Forest Report",
                "Forest vulnerability assessment data",
                "https://fsi.nic.in/forest-report",
                "Forest Assessment Data",
            ),
        ],
        DisasterType::Landslide => vec![
            DataReference::new(
                "Geological Survey of India - Landslide Studies",
                "Landslide susceptibility mapping",
                "https://www.gsi.gov.in/",
                "Geological Data",
            ),
            DataReference::new(
                "National Remote Sensing Centre - Landslide Monitoring",
                "Satellite based landslide detection",
                "https://www.nrsc.gov.in/",
                "Remote Sensing Data",
            ),
            DataReference::new(
                "Indian Roads Congress",
                "Road infrastructure vulnerability data in hilly regions",
                "https://irc.org.in/",
                "Infrastructure Data",
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("flood".parse::<DisasterType>().unwrap(), DisasterType::Flood);
        assert_eq!(
            "Earthquake".parse::<DisasterType>().unwrap(),
            DisasterType::Earthquake
        );
        assert!("tsunami".parse::<DisasterType>().is_err());
    }

    #[test]
    fn every_type_has_common_plus_specific_references() {
        for disaster in DisasterType::ALL {
            let refs = data_references(disaster, None);
            assert_eq!(refs.len(), 6, "{disaster} should have 6 references");
            assert_eq!(refs[0].name, "Census of India");
        }
    }

    #[test]
    fn api_sourced_results_cite_the_model() {
        let refs = data_references(DisasterType::Cyclone, Some("gemini-1.5-pro"));
        assert_eq!(refs.len(), 7);
        let model_ref = refs.last().unwrap();
        assert_eq!(model_ref.name, "Google AI - gemini-1.5-pro");
        assert_eq!(model_ref.data_type, "AI Model");
    }
}
