// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Installation snapshot and the sensor values derived from it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{InstallationDevices, Measure, RelayState};

/// Everything one refresh cycle read from the API.
///
/// Snapshots are immutable; each refresh publishes a new one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstallationSnapshot {
    /// Devices of the installation.
    pub devices: InstallationDevices,
    /// Cumulated measures of the virtual device, in the order received.
    pub measures: Vec<Measure>,
    /// State-of-charge reading of the virtual battery.
    pub battery_state: Option<Measure>,
    /// State of the master relay.
    pub relay_state: Option<RelayState>,
    /// When the cycle completed.
    pub fetched_at: DateTime<Utc>,
}

impl InstallationSnapshot {
    /// Returns the measure of the given type.
    #[must_use]
    pub fn measure(&self, kind: &str) -> Option<&Measure> {
        self.measures.iter().find(|m| m.kind == kind)
    }

    /// Returns the value of a sensor.
    ///
    /// A sensor whose source measure is missing, has a `null` value, or is
    /// not in an energy unit where one is needed reads `0.0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use mylight_systems::coordinator::{InstallationSnapshot, SensorKind};
    /// use mylight_systems::types::{InstallationDevices, Measure};
    ///
    /// let snapshot = InstallationSnapshot {
    ///     devices: InstallationDevices::default(),
    ///     measures: vec![Measure::new("produced_energy", 36_000.0, "Ws")],
    ///     battery_state: None,
    ///     relay_state: None,
    ///     fetched_at: Utc::now(),
    /// };
    ///
    /// assert_eq!(snapshot.sensor_value(SensorKind::SolarProduction), 10.0);
    /// assert_eq!(snapshot.sensor_value(SensorKind::GreenEnergy), 0.0);
    /// ```
    #[must_use]
    pub fn sensor_value(&self, sensor: SensorKind) -> f64 {
        match sensor {
            SensorKind::BatteryState => self
                .battery_state
                .as_ref()
                .and_then(Measure::watt_hours)
                .map_or(0.0, |wh| round2(wh / 1000.0)),
            SensorKind::GridReturnedEnergy => {
                let produced = self.sensor_value(SensorKind::SolarProduction);
                let green = self.sensor_value(SensorKind::GreenEnergy);
                let charge = self.sensor_value(SensorKind::BatteryCharge);
                round2((produced - green - charge).max(0.0))
            }
            SensorKind::AutonomyRate | SensorKind::SelfConsumption => {
                self.source_measure(sensor)
                    .and_then(|m| m.value)
                    .map_or(0.0, round2)
            }
            _ => self
                .source_measure(sensor)
                .and_then(Measure::watt_hours)
                .map_or(0.0, round2),
        }
    }

    /// Returns every sensor with its value.
    #[must_use]
    pub fn sensor_values(&self) -> Vec<(SensorKind, f64)> {
        SensorKind::ALL
            .iter()
            .map(|&sensor| (sensor, self.sensor_value(sensor)))
            .collect()
    }

    fn source_measure(&self, sensor: SensorKind) -> Option<&Measure> {
        sensor.measure_type().and_then(|kind| self.measure(kind))
    }
}

/// Presentation-level sensor computed from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// Energy produced by the solar panels, Wh.
    SolarProduction,
    /// Energy drawn from the grid, virtual battery included, Wh.
    GridConsumption,
    /// Energy drawn from the grid, virtual battery excluded, Wh.
    GridConsumptionWithoutBattery,
    /// Autonomy rate, %.
    AutonomyRate,
    /// Self consumption rate, %.
    SelfConsumption,
    /// Energy stored into the virtual battery, Wh.
    BatteryCharge,
    /// Energy drawn from the virtual battery, Wh.
    BatteryDischarge,
    /// Solar energy consumed on site, Wh.
    GreenEnergy,
    /// Virtual battery state of charge, kWh.
    BatteryState,
    /// Solar energy sent to the grid, Wh.
    GridReturnedEnergy,
}

impl SensorKind {
    /// All sensors, in display order.
    pub const ALL: [Self; 10] = [
        Self::SolarProduction,
        Self::GridConsumption,
        Self::GridConsumptionWithoutBattery,
        Self::AutonomyRate,
        Self::SelfConsumption,
        Self::BatteryCharge,
        Self::BatteryDischarge,
        Self::GreenEnergy,
        Self::BatteryState,
        Self::GridReturnedEnergy,
    ];

    /// Returns the stable sensor key.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::SolarProduction => "total_solar_production",
            Self::GridConsumption => "total_grid_consumption",
            Self::GridConsumptionWithoutBattery => "total_grid_without_battery_consumption",
            Self::AutonomyRate => "total_autonomy_rate",
            Self::SelfConsumption => "total_self_conso",
            Self::BatteryCharge => "total_msb_charge",
            Self::BatteryDischarge => "total_msb_discharge",
            Self::GreenEnergy => "total_green_energy",
            Self::BatteryState => "battery_state",
            Self::GridReturnedEnergy => "grid_returned_energy",
        }
    }

    /// Returns the unit of the sensor value.
    #[must_use]
    pub const fn unit(&self) -> &'static str {
        match self {
            Self::AutonomyRate | Self::SelfConsumption => "%",
            Self::BatteryState => "kWh",
            _ => "Wh",
        }
    }

    /// Returns the measure type the sensor reads, if it reads exactly one.
    #[must_use]
    pub const fn measure_type(&self) -> Option<&'static str> {
        match self {
            Self::SolarProduction => Some("produced_energy"),
            Self::GridConsumption => Some("grid_energy"),
            Self::GridConsumptionWithoutBattery => Some("grid_sans_msb_energy"),
            Self::AutonomyRate => Some("autonomy_rate"),
            Self::SelfConsumption => Some("self_conso"),
            Self::BatteryCharge => Some("msb_charge"),
            Self::BatteryDischarge => Some("msb_discharge"),
            Self::GreenEnergy => Some("green_energy"),
            Self::BatteryState | Self::GridReturnedEnergy => None,
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
