//! Typed identifiers.
//!
//! Rules, audit entries and notifications carry identifiers assigned by the
//! backend, so they wrap the raw integer instead of generating their own.
//! Devices are keyed by their firmware-assigned [`HardwareName`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a server-assigned identifier.
            #[must_use]
            pub fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Access the inner integer.
            #[must_use]
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

define_id!(
    /// Identifier of an [`AutomationRule`](crate::automation::AutomationRule).
    RuleId
);

define_id!(
    /// Identifier of an [`AuditLogEntry`](crate::audit::AuditLogEntry).
    AuditLogId
);

/// Stable device identifier assigned by the plug firmware (e.g. `tasmota_A1B2C3`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HardwareName(String);

impl HardwareName {
    /// Build a hardware name, rejecting empty or blank input.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyHardwareName`] when `raw` is blank.
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ValidationError::EmptyHardwareName);
        }
        Ok(Self(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HardwareName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for HardwareName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for HardwareName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
