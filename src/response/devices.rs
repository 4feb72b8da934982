// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device list payload and role classification.

use serde::Deserialize;

use crate::types::{DeviceKind, InstallationDevices};

/// Payload of a successful `/api/devices` call.
#[derive(Debug, Clone, Deserialize)]
pub struct DevicesPayload {
    /// Every device of the installation.
    pub devices: Vec<DeviceRecord>,
}

/// One entry of the device list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    /// Device id.
    pub id: String,
    /// Short type code (`vrt`, `bat`, `mst`, `sw`, ...).
    #[serde(rename = "type")]
    pub type_code: String,
    /// Battery capacity, only on `bat` devices.
    #[serde(default)]
    pub battery_capacity: Option<f64>,
    /// Report period in seconds, only on `mst` devices.
    #[serde(default)]
    pub report_period: Option<u32>,
}

impl DeviceRecord {
    /// Returns the role of this device.
    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        DeviceKind::from_code(&self.type_code)
    }
}

impl From<DevicesPayload> for InstallationDevices {
    /// Picks one device per role. A later device of the same role replaces
    /// an earlier one.
    fn from(payload: DevicesPayload) -> Self {
        let mut devices = Self::default();

        for record in payload.devices {
            let slot = match record.kind() {
                DeviceKind::Virtual => &mut devices.virtual_device_id,
                DeviceKind::Battery => {
                    devices.virtual_battery_capacity = record.battery_capacity;
                    &mut devices.virtual_battery_id
                }
                DeviceKind::Master => {
                    devices.master_report_period = record.report_period;
                    &mut devices.master_id
                }
                DeviceKind::Relay => &mut devices.master_relay_id,
                DeviceKind::Other(code) => {
                    tracing::trace!(id = %record.id, code = %code, "Ignoring device");
                    continue;
                }
            };

            if let Some(previous) = slot.replace(record.id.clone()) {
                tracing::debug!(
                    kind = %record.type_code,
                    previous = %previous,
                    current = %record.id,
                    "Several devices share one role, keeping the last one"
                );
            }
        }

        devices
    }
}
