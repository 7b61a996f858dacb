//! Smart plugs: power state, wattage and Wi-Fi health.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::id::HardwareName;

/// Tri-state power of a plug.
///
/// The backend reports `true`, `false` or `null` (the plug did not answer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum PowerState {
    On,
    Off,
    #[default]
    Unreachable,
}

impl PowerState {
    #[must_use]
    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    /// The state after a toggle. An unreachable plug is treated as off.
    #[must_use]
    pub fn toggled(self) -> Self {
        if self.is_on() { Self::Off } else { Self::On }
    }
}

impl From<Option<bool>> for PowerState {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::On,
            Some(false) => Self::Off,
            None => Self::Unreachable,
        }
    }
}

impl From<PowerState> for Option<bool> {
    fn from(value: PowerState) -> Self {
        match value {
            PowerState::On => Some(true),
            PowerState::Off => Some(false),
            PowerState::Unreachable => None,
        }
    }
}

impl std::fmt::Display for PowerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
            Self::Unreachable => f.write_str("unreachable"),
        }
    }
}

/// A plug as returned by `GET /devices/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub hardware_name: HardwareName,
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(rename = "state", alias = "power", default)]
    pub power: PowerState,
    /// Last observed draw in watts.
    #[serde(default)]
    pub last_usage: f64,
    /// Seconds since the plug booted.
    #[serde(default)]
    pub uptime: u64,
    /// Received signal strength in dBm.
    #[serde(default)]
    pub wifi_rssi: i32,
    /// Signal quality in percent.
    #[serde(default)]
    pub wifi_signal: i32,
    #[serde(default)]
    pub wifi_name: Option<String>,
}

impl Device {
    /// Create a device with only its hardware name set.
    #[must_use]
    pub fn new(hardware_name: HardwareName) -> Self {
        Self {
            hardware_name,
            friendly_name: None,
            room: None,
            tag: None,
            power: PowerState::Unreachable,
            last_usage: 0.0,
            uptime: 0,
            wifi_rssi: 0,
            wifi_signal: 0,
            wifi_name: None,
        }
    }

    /// Friendly name when set, hardware name otherwise.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.friendly_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(self.hardware_name.as_str())
    }

    /// Flip the power state and describe the change for the user.
    pub fn toggle_power(&mut self) -> PowerNotice {
        self.power = self.power.toggled();
        PowerNotice::for_device(self)
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, update: &DeviceUpdate) {
        if let Some(name) = &update.friendly_name {
            self.friendly_name = Some(name.clone());
        }
        if let Some(room) = &update.room {
            self.room = Some(room.clone());
        }
        if let Some(tag) = &update.tag {
            self.tag = Some(tag.clone());
        }
    }
}

/// Partial update sent with `PUT /devices/{hardware_name}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl DeviceUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.friendly_name.is_none() && self.room.is_none() && self.tag.is_none()
    }
}

/// How prominently a notice should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Default,
    Destructive,
}

/// Confirmation shown after a power toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerNotice {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl PowerNotice {
    fn for_device(device: &Device) -> Self {
        let name = device.display_name();
        if device.power.is_on() {
            Self {
                title: "Device Powered On".to_string(),
                description: format!("{name} has been turned on."),
                severity: Severity::Default,
            }
        } else {
            Self {
                title: "Device Powered Off".to_string(),
                description: format!("{name} has been turned off."),
                severity: Severity::Destructive,
            }
        }
    }
}

/// Snapshot returned by `GET /data/last_usage`.
pub type LastUsage = HashMap<String, LastUsageEntry>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LastUsageEntry {
    pub last_usage: f64,
}

/// Overwrite `last_usage` for every device present in the snapshot.
pub fn merge_last_usage(devices: &mut [Device], usage: &LastUsage) {
    for device in devices {
        if let Some(entry) = usage.get(device.hardware_name.as_str()) {
            device.last_usage = entry.last_usage;
        }
    }
}

/// Room / device selection applied to the device list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceFilter {
    /// `None` means every room.
    pub room: Option<String>,
    pub selected: Option<HardwareName>,
}

impl DeviceFilter {
    #[must_use]
    pub fn matches(&self, device: &Device) -> bool {
        if let Some(room) = &self.room {
            if device.room.as_ref() != Some(room) {
                return false;
            }
        }
        if let Some(selected) = &self.selected {
            if &device.hardware_name != selected {
                return false;
            }
        }
        true
    }

    /// Select a device, or clear the selection if it is already selected.
    pub fn toggle_selected(&mut self, hardware_name: HardwareName) {
        if self.selected.as_ref() == Some(&hardware_name) {
            self.selected = None;
        } else {
            self.selected = Some(hardware_name);
        }
    }

    #[must_use]
    pub fn apply<'a>(&self, devices: &'a [Device]) -> Vec<&'a Device> {
        devices.iter().filter(|d| self.matches(d)).collect()
    }
}

/// Distinct rooms, sorted.
#[must_use]
pub fn unique_rooms(devices: &[Device]) -> Vec<String> {
    devices
        .iter()
        .filter_map(|d| d.room.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct tags, sorted.
#[must_use]
pub fn unique_tags(devices: &[Device]) -> Vec<String> {
    devices
        .iter()
        .filter_map(|d| d.tag.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sum of the last observed draw across all devices, in watts.
#[must_use]
pub fn total_usage(devices: &[Device]) -> f64 {
    devices.iter().map(|d| d.last_usage).sum()
}
