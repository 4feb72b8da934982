// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed result records of the MyLight Systems API.
//!
//! # Types
//!
//! - [`GridType`] - One-phase or three-phase installation
//! - [`UserProfile`] - Subscription id and grid type
//! - [`InstallationDevices`] - Device roles of an installation
//! - [`Measure`] - A `(type, value, unit)` reading
//! - [`DeviceState`] / [`SensorState`] - Live states
//! - [`RelayState`] - On/off state of a relay

mod device;
mod grid;
mod measure;
mod relay;

pub use device::{DeviceKind, DeviceState, InstallationDevices, SensorState};
pub use grid::{GridType, UserProfile};
pub use measure::Measure;
pub use relay::RelayState;
