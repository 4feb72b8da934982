// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grid type and user profile.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Electrical phase configuration of an installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridType {
    /// Single-phase grid.
    #[default]
    OnePhase,
    /// Three-phase grid.
    ThreePhases,
}

impl GridType {
    /// Maps the profile's `gridType` string.
    ///
    /// `"1 phase"` and `"3 phases"` are recognised. Any other value falls
    /// back to [`GridType::OnePhase`], which may misreport a three-phase
    /// installation whose profile uses a new spelling.
    ///
    /// # Examples
    ///
    /// ```
    /// use mylight_systems::types::GridType;
    ///
    /// assert_eq!(GridType::from_remote("3 phases"), GridType::ThreePhases);
    /// assert_eq!(GridType::from_remote("2 phases"), GridType::OnePhase);
    /// ```
    #[must_use]
    pub fn from_remote(raw: &str) -> Self {
        match raw {
            "1 phase" => Self::OnePhase,
            "3 phases" => Self::ThreePhases,
            other => {
                tracing::debug!(grid_type = %other, "Unknown grid type, assuming one phase");
                Self::OnePhase
            }
        }
    }

    /// Returns the value sent as `measureType`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OnePhase => "one_phase",
            Self::ThreePhases => "three_phases",
        }
    }
}

impl fmt::Display for GridType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile of the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Subscription identifier, stable per account.
    pub subscription_id: String,
    /// Grid type of the installation.
    pub grid_type: GridType,
}
