// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Measure value object.
//!
//! The API reports every physical quantity as a `(type, value, unit)`
//! triple. The client hands measures out exactly as reported; unit
//! conversion happens only in [`Measure::watt_hours`].

use serde::{Deserialize, Serialize};

/// One named physical quantity.
///
/// # Examples
///
/// ```
/// use mylight_systems::types::Measure;
///
/// let measure = Measure::new("produced_energy", 7200.0, "Ws");
/// assert_eq!(measure.kind, "produced_energy");
/// assert_eq!(measure.watt_hours(), Some(2.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    /// Measure type, e.g. `produced_energy` or `autonomy_rate`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Raw value in `unit`; `None` when the API reports `null`.
    #[serde(default)]
    pub value: Option<f64>,
    /// Unit string as reported by the API (`Ws`, `Wh`, `%`, `W`, ...).
    pub unit: String,
}

impl Measure {
    /// Seconds per hour, the factor between watt-seconds and watt-hours.
    pub const SECONDS_PER_HOUR: f64 = 3600.0;

    /// Creates a new measure.
    #[must_use]
    pub fn new(kind: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: Some(value),
            unit: unit.into(),
        }
    }

    /// Returns the value converted to watt-hours.
    ///
    /// Returns `None` when the unit is not an energy unit or the value is
    /// missing.
    #[must_use]
    pub fn watt_hours(&self) -> Option<f64> {
        let value = self.value?;
        match self.unit.to_ascii_lowercase().as_str() {
            "ws" => Some(value / Self::SECONDS_PER_HOUR),
            "wh" => Some(value),
            "kwh" => Some(value * 1000.0),
            _ => None,
        }
    }

    /// Returns `true` when the unit is a percentage.
    #[must_use]
    pub fn is_percentage(&self) -> bool {
        self.unit == "%"
    }
}
