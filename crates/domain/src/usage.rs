//! Power readings and consumption summaries.

use std::collections::BTreeMap;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::time::{self, Timestamp};

/// A single wattage sample from a device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(with = "time::lenient")]
    pub timestamp: Timestamp,
    #[serde(default)]
    pub power: Option<f64>,
}

impl Reading {
    #[must_use]
    pub fn new(timestamp: Timestamp, power: f64) -> Self {
        Self {
            timestamp,
            power: Some(power),
        }
    }

    /// The wattage, if present and finite.
    #[must_use]
    pub fn usable_power(&self) -> Option<f64> {
        self.power.filter(|power| power.is_finite())
    }
}

/// One bar of the monthly overview: a date plus one numeric series per room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarDataPoint {
    pub date: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, serde_json::Value>,
}

impl BarDataPoint {
    /// Numeric series in name order; non-numeric extras are ignored.
    pub fn series(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values
            .iter()
            .filter_map(|(name, value)| value.as_f64().map(|v| (name.as_str(), v)))
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.series().map(|(_, value)| value).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyTotal {
    pub date: String,
    pub total: f64,
}

/// Time range selectable on the device chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Lookback {
    #[serde(rename = "1H")]
    OneHour,
    #[serde(rename = "3H")]
    ThreeHours,
    #[serde(rename = "6H")]
    SixHours,
    #[serde(rename = "12H")]
    TwelveHours,
    #[default]
    #[serde(rename = "24H")]
    OneDay,
    #[serde(rename = "7D")]
    SevenDays,
    #[serde(rename = "14D")]
    FourteenDays,
    #[serde(rename = "30D")]
    ThirtyDays,
}

impl Lookback {
    pub const ALL: [Self; 8] = [
        Self::OneHour,
        Self::ThreeHours,
        Self::SixHours,
        Self::TwelveHours,
        Self::OneDay,
        Self::SevenDays,
        Self::FourteenDays,
        Self::ThirtyDays,
    ];

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::OneHour => "1H",
            Self::ThreeHours => "3H",
            Self::SixHours => "6H",
            Self::TwelveHours => "12H",
            Self::OneDay => "24H",
            Self::SevenDays => "7D",
            Self::FourteenDays => "14D",
            Self::ThirtyDays => "30D",
        }
    }

    #[must_use]
    pub fn hours(self) -> i64 {
        match self {
            Self::OneHour => 1,
            Self::ThreeHours => 3,
            Self::SixHours => 6,
            Self::TwelveHours => 12,
            Self::OneDay => 24,
            Self::SevenDays => 7 * 24,
            Self::FourteenDays => 14 * 24,
            Self::ThirtyDays => 30 * 24,
        }
    }

    #[must_use]
    pub fn duration(self) -> TimeDelta {
        TimeDelta::hours(self.hours())
    }

    /// The `[now - duration, now]` window.
    #[must_use]
    pub fn window(self, now: Timestamp) -> (Timestamp, Timestamp) {
        (now - self.duration(), now)
    }
}

impl std::fmt::Display for Lookback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Unknown lookback code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown lookback {0:?}, expected one of 1H, 3H, 6H, 12H, 24H, 7D, 14D, 30D")]
pub struct ParseLookbackError(String);

impl std::str::FromStr for Lookback {
    type Err = ParseLookbackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|lookback| lookback.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseLookbackError(s.to_string()))
    }
}
