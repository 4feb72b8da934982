// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response decoding for the MyLight Systems API.
//!
//! Every response is a JSON object with a `status` field (`ok` or `error`).
//! [`Reply`] checks that envelope before any payload field is read; the
//! payload structs in this module describe the `ok` bodies of each endpoint.

mod account;
mod devices;
mod envelope;
mod measures;
mod states;

pub use account::{LoginPayload, ProfilePayload};
pub use devices::{DeviceRecord, DevicesPayload};
pub use envelope::{ApiErrorCode, Reply};
pub use measures::{MeasureValues, MeasuresTotalPayload};
pub use states::{StatesPayload, SwitchPayload};
