// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Installation devices and live device states.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Measure;

/// Role of a device in an installation, from its short type code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// `vrt`: synthetic device carrying whole-installation totals.
    Virtual,
    /// `bat`: virtual battery.
    Battery,
    /// `mst`: master meter.
    Master,
    /// `sw`: controllable relay.
    Relay,
    /// Any other code.
    Other(String),
}

impl DeviceKind {
    /// Maps a type code from the device list.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "vrt" => Self::Virtual,
            "bat" => Self::Battery,
            "mst" => Self::Master,
            "sw" => Self::Relay,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the type code.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Virtual => "vrt",
            Self::Battery => "bat",
            Self::Master => "mst",
            Self::Relay => "sw",
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Device roles found in one device-list response.
///
/// Every field is optional: an installation without a battery simply has
/// no battery id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstallationDevices {
    /// Id of the virtual (totals) device.
    pub virtual_device_id: Option<String>,
    /// Id of the virtual battery.
    pub virtual_battery_id: Option<String>,
    /// Capacity of the virtual battery as reported by the API.
    pub virtual_battery_capacity: Option<f64>,
    /// Id of the master meter.
    pub master_id: Option<String>,
    /// Report period of the master meter, in seconds.
    pub master_report_period: Option<u32>,
    /// Id of the master relay.
    pub master_relay_id: Option<String>,
}

impl InstallationDevices {
    /// Returns `true` when no known role was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.virtual_device_id.is_none()
            && self.virtual_battery_id.is_none()
            && self.master_id.is_none()
            && self.master_relay_id.is_none()
    }
}

/// Live state of one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceState {
    /// Device id.
    pub device_id: String,
    /// Device level state, `on`/`off` for relays.
    #[serde(default)]
    pub state: Option<String>,
    /// Per-sensor readings.
    #[serde(default)]
    pub sensor_states: Vec<SensorState>,
}

impl DeviceState {
    /// Suffix of the battery state-of-charge sensor id.
    pub const STATE_OF_CHARGE_SUFFIX: &'static str = "-soc";

    /// Returns the reading of a sensor by id.
    #[must_use]
    pub fn sensor(&self, sensor_id: &str) -> Option<&SensorState> {
        self.sensor_states.iter().find(|s| s.sensor_id == sensor_id)
    }

    /// Returns the state-of-charge reading (`<deviceId>-soc`).
    #[must_use]
    pub fn state_of_charge(&self) -> Option<&Measure> {
        let sensor_id = format!("{}{}", self.device_id, Self::STATE_OF_CHARGE_SUFFIX);
        self.sensor(&sensor_id).map(|s| &s.measure)
    }
}

/// Reading of one sensor of a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorState {
    /// Sensor id.
    pub sensor_id: String,
    /// The reading.
    pub measure: Measure,
}
