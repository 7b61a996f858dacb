//! Grid carbon intensity, current and historical.

use serde::{Deserialize, Serialize};

use crate::time::{self, Timestamp};

/// Qualitative band reported alongside the numeric intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarbonIndex {
    #[serde(rename = "very low")]
    VeryLow,
    Low,
    Moderate,
    High,
    #[serde(rename = "very high")]
    VeryHigh,
}

impl CarbonIndex {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::VeryLow => "very low",
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::VeryHigh => "very high",
        }
    }
}

impl std::fmt::Display for CarbonIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityReading {
    pub forecast: f64,
    #[serde(default)]
    pub actual: Option<f64>,
    pub index: CarbonIndex,
}

/// Current intensity for the half-hour window `from..to` (gCO₂/kWh).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonIntensity {
    #[serde(with = "time::lenient")]
    pub from: Timestamp,
    #[serde(with = "time::lenient")]
    pub to: Timestamp,
    pub intensity: IntensityReading,
}

impl CarbonIntensity {
    /// Measured value when available, otherwise the forecast.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.intensity.actual.unwrap_or(self.intensity.forecast)
    }

    /// Whether the grid is currently running on mostly clean energy.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        matches!(
            self.intensity.index,
            CarbonIndex::VeryLow | CarbonIndex::Low
        )
    }
}

/// One point of the historical series used by analytics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarbonPoint {
    #[serde(with = "time::lenient")]
    pub timestamp: Timestamp,
    pub intensity: f64,
}
