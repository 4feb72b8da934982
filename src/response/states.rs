// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! States and switch payloads.

use serde::Deserialize;

use crate::error::ParseError;
use crate::types::{DeviceState, Measure, RelayState};

/// Payload of a successful `/api/states` call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatesPayload {
    /// Live state of every device.
    pub device_states: Vec<DeviceState>,
}

impl StatesPayload {
    /// Returns the state of one device.
    #[must_use]
    pub fn device(&self, device_id: &str) -> Option<&DeviceState> {
        self.device_states.iter().find(|d| d.device_id == device_id)
    }

    /// Returns the state-of-charge reading of a battery.
    #[must_use]
    pub fn battery_state(&self, battery_id: &str) -> Option<Measure> {
        self.device(battery_id)
            .and_then(DeviceState::state_of_charge)
            .cloned()
    }

    /// Returns the state of a relay.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the relay reports a state other than on/off.
    pub fn relay_state(&self, relay_id: &str) -> Result<Option<RelayState>, ParseError> {
        self.device(relay_id)
            .and_then(|d| d.state.as_deref())
            .map(str::parse::<RelayState>)
            .transpose()
    }
}

/// Payload of a successful `/api/device/switch` call.
#[derive(Debug, Clone, Deserialize)]
pub struct SwitchPayload {
    /// Resulting relay state.
    pub state: String,
}

impl SwitchPayload {
    /// Parses the resulting relay state.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the state is not on/off.
    pub fn relay_state(&self) -> Result<RelayState, ParseError> {
        self.state.parse()
    }
}
