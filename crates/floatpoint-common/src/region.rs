//! Region tagging for BGC readings.
//!
//! A fixed decision table over the *input* temperature (°C), salinity (PSU)
//! and pressure (dbar). Rules are checked top to bottom and the first match
//! wins, so overlapping ranges resolve to the earlier rule.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "Arabian Sea (Surface)")]
    ArabianSeaSurface,
    #[serde(rename = "Deep Waters")]
    DeepWaters,
    #[serde(rename = "Surface Waters")]
    SurfaceWaters,
    #[serde(rename = "Bay of Bengal")]
    BayOfBengal,
    #[serde(rename = "Indian Ocean")]
    IndianOcean,
}

impl Region {
    pub fn classify(temperature: f64, salinity: f64, pressure: f64) -> Self {
        if temperature > 27.0 && salinity > 35.5 {
            Region::ArabianSeaSurface
        } else if temperature < 20.0 && pressure > 100.0 {
            Region::DeepWaters
        } else if temperature > 25.0 && pressure < 50.0 {
            Region::SurfaceWaters
        } else if temperature < 25.0 && salinity < 35.0 {
            Region::BayOfBengal
        } else {
            Region::IndianOcean
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::ArabianSeaSurface => "Arabian Sea (Surface)",
            Region::DeepWaters => "Deep Waters",
            Region::SurfaceWaters => "Surface Waters",
            Region::BayOfBengal => "Bay of Bengal",
            Region::IndianOcean => "Indian Ocean",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
