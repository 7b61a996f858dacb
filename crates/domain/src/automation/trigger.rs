//! Trigger conditions that fire a rule, and their compact wire encoding.
//!
//! The backend stores every trigger as a single string whose grammar depends
//! on the rule's [`TriggerType`]:
//!
//! | type       | grammar                          | example        |
//! |------------|----------------------------------|----------------|
//! | `SCHEDULE` | `HH:MM` + day codes joined by `.` | `18:00M.W.F`   |
//! | `PRICE`    | `GT\|LT` `,` pence               | `LT,20`        |
//! | `USAGE`    | `GT` `,` watt-hours `,` minutes  | `GT,100,30`    |
//! | `CARBON`   | intensity level                  | `HIGH`         |

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::{DayCode, TriggerType};

/// Usage window written by the rule editor. Not user-editable.
pub const USAGE_WINDOW_MINUTES: u32 = 30;

const TIME_FORMAT: &str = "%H:%M";

/// A decoded trigger value.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// Fires at `time` on each of `days` (order as selected by the user).
    Schedule { time: NaiveTime, days: Vec<DayCode> },
    /// Fires when the energy price crosses `amount` pence.
    Price { operator: Comparison, amount: f64 },
    /// Fires when consumption over `window_minutes` exceeds `amount` Wh.
    Usage { amount: f64, window_minutes: u32 },
    /// Fires when the grid carbon intensity reaches `level`.
    Carbon { level: CarbonLevel },
}

/// Threshold comparison used by price triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Comparison {
    #[serde(rename = "GT")]
    GreaterThan,
    #[default]
    #[serde(rename = "LT")]
    LessThan,
}

impl Comparison {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::GreaterThan => "GT",
            Self::LessThan => "LT",
        }
    }

    #[must_use]
    pub fn phrase(self) -> &'static str {
        match self {
            Self::GreaterThan => "Greater Than",
            Self::LessThan => "Less Than",
        }
    }

    /// # Errors
    ///
    /// Returns [`TriggerError::UnknownOperator`] for anything but `GT` / `LT`.
    pub fn from_code(code: &str) -> Result<Self, TriggerError> {
        match code {
            "GT" => Ok(Self::GreaterThan),
            "LT" => Ok(Self::LessThan),
            other => Err(TriggerError::UnknownOperator(other.to_string())),
        }
    }
}

/// Grid carbon intensity band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarbonLevel {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl CarbonLevel {
    pub const ALL: [Self; 5] = [
        Self::VeryLow,
        Self::Low,
        Self::Moderate,
        Self::High,
        Self::VeryHigh,
    ];

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::VeryLow => "VERY_LOW",
            Self::Low => "LOW",
            Self::Moderate => "MODERATE",
            Self::High => "HIGH",
            Self::VeryHigh => "VERY_HIGH",
        }
    }

    /// # Errors
    ///
    /// Returns [`TriggerError::UnknownCarbonLevel`] for unknown codes.
    pub fn from_code(code: &str) -> Result<Self, TriggerError> {
        Self::ALL
            .into_iter()
            .find(|level| level.code() == code)
            .ok_or_else(|| TriggerError::UnknownCarbonLevel(code.to_string()))
    }
}

impl std::fmt::Display for CarbonLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for CarbonLevel {
    type Err = TriggerError;

    /// Accepts `VERY_HIGH`, `very_high` or `very-high`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(&s.trim().to_ascii_uppercase().replace('-', "_"))
    }
}

/// Why a stored value could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TriggerError {
    #[error("schedule time is missing or not HH:MM in {0:?}")]
    InvalidTime(String),

    #[error("unknown day code {0:?}")]
    UnknownDay(String),

    #[error("unknown comparison operator {0:?}")]
    UnknownOperator(String),

    #[error("invalid amount {0:?}")]
    InvalidAmount(String),

    #[error("invalid usage window {0:?}")]
    InvalidWindow(String),

    #[error("unknown carbon intensity level {0:?}")]
    UnknownCarbonLevel(String),

    #[error("expected {expected} comma-separated segments in {value:?}")]
    SegmentCount { expected: usize, value: String },
}

impl Trigger {
    /// The trigger type this value belongs to.
    #[must_use]
    pub fn kind(&self) -> TriggerType {
        match self {
            Self::Schedule { .. } => TriggerType::Schedule,
            Self::Price { .. } => TriggerType::Price,
            Self::Usage { .. } => TriggerType::Usage,
            Self::Carbon { .. } => TriggerType::Carbon,
        }
    }

    /// Encode into the compact string persisted by the backend.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Schedule { time, days } => {
                let days: Vec<&str> = days.iter().map(|day| day.code()).collect();
                format!("{}{}", time.format(TIME_FORMAT), days.join("."))
            }
            Self::Price { operator, amount } => format!("{},{amount}", operator.code()),
            Self::Usage {
                amount,
                window_minutes,
            } => format!("GT,{amount},{window_minutes}"),
            Self::Carbon { level } => level.code().to_string(),
        }
    }

    /// Decode a stored value for the given trigger type.
    ///
    /// # Errors
    ///
    /// Returns a [`TriggerError`] describing the first malformed segment.
    pub fn decode(kind: TriggerType, value: &str) -> Result<Self, TriggerError> {
        match kind {
            TriggerType::Schedule => decode_schedule(value),
            TriggerType::Price => decode_price(value),
            TriggerType::Usage => decode_usage(value),
            TriggerType::Carbon => Ok(Self::Carbon {
                level: CarbonLevel::from_code(value)?,
            }),
        }
    }

    /// Human-readable condition, e.g. `At 18:00 on M, W, F` or `Less Than 20p`.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Schedule { time, days } => {
                let days: Vec<&str> = days.iter().map(|day| day.code()).collect();
                format!("At {} on {}", time.format(TIME_FORMAT), days.join(", "))
            }
            Self::Price { operator, amount } => format!("{} {amount}p", operator.phrase()),
            Self::Usage {
                amount,
                window_minutes,
            } => format!("Usage Greater Than {amount}Wh over {window_minutes} minutes"),
            Self::Carbon { level } => format!("Green Grid Intensity: {level}"),
        }
    }
}

/// Parse `HH:MM` strictly (two-digit hour and minute).
pub(crate) fn parse_time(value: &str) -> Result<NaiveTime, TriggerError> {
    let well_formed = value.len() == 5
        && value.as_bytes()[2] == b':'
        && value
            .bytes()
            .enumerate()
            .all(|(idx, byte)| idx == 2 || byte.is_ascii_digit());
    if !well_formed {
        return Err(TriggerError::InvalidTime(value.to_string()));
    }
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .map_err(|_| TriggerError::InvalidTime(value.to_string()))
}

/// Parse a finite, non-negative amount.
pub(crate) fn parse_amount(value: &str) -> Result<f64, TriggerError> {
    match value.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount >= 0.0 => Ok(amount),
        _ => Err(TriggerError::InvalidAmount(value.to_string())),
    }
}

fn decode_schedule(value: &str) -> Result<Trigger, TriggerError> {
    let (time, days) = match (value.get(..5), value.get(5..)) {
        (Some(time), Some(days)) => (time, days),
        _ => return Err(TriggerError::InvalidTime(value.to_string())),
    };
    let time = parse_time(time)?;
    let days = if days.is_empty() {
        Vec::new()
    } else {
        days.split('.')
            .map(DayCode::from_code)
            .collect::<Result<Vec<_>, _>>()?
    };
    Ok(Trigger::Schedule { time, days })
}

fn decode_price(value: &str) -> Result<Trigger, TriggerError> {
    let segments: Vec<&str> = value.split(',').collect();
    let [operator, amount] = segments.as_slice() else {
        return Err(TriggerError::SegmentCount {
            expected: 2,
            value: value.to_string(),
        });
    };
    Ok(Trigger::Price {
        operator: Comparison::from_code(operator)?,
        amount: parse_amount(amount)?,
    })
}

fn decode_usage(value: &str) -> Result<Trigger, TriggerError> {
    let segments: Vec<&str> = value.split(',').collect();
    let [operator, amount, window] = segments.as_slice() else {
        return Err(TriggerError::SegmentCount {
            expected: 3,
            value: value.to_string(),
        });
    };
    if *operator != "GT" {
        return Err(TriggerError::UnknownOperator((*operator).to_string()));
    }
    let window_minutes = window
        .trim()
        .parse::<u32>()
        .map_err(|_| TriggerError::InvalidWindow((*window).to_string()))?;
    Ok(Trigger::Usage {
        amount: parse_amount(amount)?,
        window_minutes,
    })
}
