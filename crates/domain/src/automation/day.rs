//! Day codes used inside schedule trigger values.

use serde::{Deserialize, Serialize};

use super::TriggerError;

/// A weekday as abbreviated in schedule values (`M`, `T`, `W`, `Th`, `F`, `S`, `Su`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayCode {
    #[serde(rename = "M")]
    Monday,
    #[serde(rename = "T")]
    Tuesday,
    #[serde(rename = "W")]
    Wednesday,
    #[serde(rename = "Th")]
    Thursday,
    #[serde(rename = "F")]
    Friday,
    #[serde(rename = "S")]
    Saturday,
    #[serde(rename = "Su")]
    Sunday,
}

impl DayCode {
    /// All days, Monday first.
    pub const ALL: [Self; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Monday => "M",
            Self::Tuesday => "T",
            Self::Wednesday => "W",
            Self::Thursday => "Th",
            Self::Friday => "F",
            Self::Saturday => "S",
            Self::Sunday => "Su",
        }
    }

    #[must_use]
    pub fn full_name(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }

    /// Parse a day code exactly as it appears in an encoded value.
    ///
    /// # Errors
    ///
    /// Returns [`TriggerError::UnknownDay`] for anything else.
    pub fn from_code(code: &str) -> Result<Self, TriggerError> {
        Self::ALL
            .into_iter()
            .find(|day| day.code() == code)
            .ok_or_else(|| TriggerError::UnknownDay(code.to_string()))
    }
}

impl std::fmt::Display for DayCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for DayCode {
    type Err = TriggerError;

    /// Accepts the code (`Th`) or the full name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|day| {
                day.code().eq_ignore_ascii_case(s) || day.full_name().eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| TriggerError::UnknownDay(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_two_letter_codes() {
        assert_eq!(DayCode::from_code("Th").unwrap(), DayCode::Thursday);
        assert_eq!(DayCode::from_code("Su").unwrap(), DayCode::Sunday);
    }

    #[test]
    fn should_reject_unknown_code_exactly() {
        assert!(matches!(
            DayCode::from_code("th"),
            Err(TriggerError::UnknownDay(code)) if code == "th"
        ));
    }

    #[test]
    fn should_parse_full_names_case_insensitively() {
        assert_eq!("wednesday".parse::<DayCode>().unwrap(), DayCode::Wednesday);
        assert_eq!("su".parse::<DayCode>().unwrap(), DayCode::Sunday);
    }
}
