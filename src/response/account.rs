// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Login and profile payloads.

use serde::Deserialize;

use crate::types::{GridType, UserProfile};

/// Payload of a successful `/api/auth` call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    /// Session token.
    pub auth_token: String,
}

/// Payload of a successful `/api/profile` call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload {
    /// Subscription id.
    pub id: String,
    /// Raw grid type, e.g. `1 phase`.
    pub grid_type: String,
}

impl From<ProfilePayload> for UserProfile {
    fn from(payload: ProfilePayload) -> Self {
        Self {
            grid_type: GridType::from_remote(&payload.grid_type),
            subscription_id: payload.id,
        }
    }
}
