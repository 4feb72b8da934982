// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Relay state type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// On/off state of an installation relay.
///
/// # Examples
///
/// ```
/// use mylight_systems::types::RelayState;
///
/// let state: RelayState = "on".parse().unwrap();
/// assert_eq!(state, RelayState::On);
/// assert_eq!(state.opposite(), RelayState::Off);
/// assert_eq!(RelayState::Off.as_str(), "off");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayState {
    /// Relay is open.
    Off,
    /// Relay is closed.
    On,
}

impl RelayState {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
        }
    }

    /// Returns the value of the `on` query parameter of the switch endpoint.
    #[must_use]
    pub const fn as_query_flag(&self) -> &'static str {
        match self {
            Self::Off => "false",
            Self::On => "true",
        }
    }

    /// Returns the other state.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On => Self::Off,
        }
    }

    /// Returns `true` when the relay is closed.
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }
}

impl fmt::Display for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelayState {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "on" => Ok(Self::On),
            _ => Err(ParseError::InvalidValue {
                field: "state".to_string(),
                message: format!("unknown relay state '{s}'"),
            }),
        }
    }
}

impl From<bool> for RelayState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}
