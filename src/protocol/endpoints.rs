// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Endpoint paths of the MyLight Systems API.

use std::fmt;

/// Default API host.
pub const DEFAULT_BASE_URL: &str = "https://myhome.mylight-systems.com";

/// The remote operations the client knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Login exchange.
    Auth,
    /// User profile.
    Profile,
    /// Device list of the installation.
    Devices,
    /// Cumulated measures of a device.
    MeasuresTotal,
    /// Live device and sensor states.
    States,
    /// Relay switching.
    Switch,
}

impl Endpoint {
    /// Returns a short name used in log records.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Profile => "profile",
            Self::Devices => "devices",
            Self::MeasuresTotal => "measures_total",
            Self::States => "states",
            Self::Switch => "switch",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Path table for every [`Endpoint`].
///
/// The API has moved paths between revisions, so each one can be replaced
/// on its own.
///
/// # Examples
///
/// ```
/// use mylight_systems::protocol::{Endpoint, Endpoints};
///
/// let endpoints = Endpoints::default().with_path(Endpoint::States, "/api/v2/states");
/// assert_eq!(endpoints.path(Endpoint::States), "/api/v2/states");
/// assert_eq!(endpoints.path(Endpoint::Auth), "/api/auth");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    auth: String,
    profile: String,
    devices: String,
    measures_total: String,
    states: String,
    switch: String,
}

impl Endpoints {
    /// Default login path.
    pub const AUTH: &'static str = "/api/auth";
    /// Default profile path.
    pub const PROFILE: &'static str = "/api/profile";
    /// Default devices path.
    pub const DEVICES: &'static str = "/api/devices";
    /// Default measures path.
    pub const MEASURES_TOTAL: &'static str = "/api/measures/total";
    /// Default states path.
    pub const STATES: &'static str = "/api/states";
    /// Default switch path.
    pub const SWITCH: &'static str = "/api/device/switch";

    /// Replaces the path of one endpoint.
    #[must_use]
    pub fn with_path(mut self, endpoint: Endpoint, path: impl Into<String>) -> Self {
        let path = path.into();
        match endpoint {
            Endpoint::Auth => self.auth = path,
            Endpoint::Profile => self.profile = path,
            Endpoint::Devices => self.devices = path,
            Endpoint::MeasuresTotal => self.measures_total = path,
            Endpoint::States => self.states = path,
            Endpoint::Switch => self.switch = path,
        }
        self
    }

    /// Returns the path of an endpoint.
    #[must_use]
    pub fn path(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Auth => &self.auth,
            Endpoint::Profile => &self.profile,
            Endpoint::Devices => &self.devices,
            Endpoint::MeasuresTotal => &self.measures_total,
            Endpoint::States => &self.states,
            Endpoint::Switch => &self.switch,
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            auth: Self::AUTH.to_string(),
            profile: Self::PROFILE.to_string(),
            devices: Self::DEVICES.to_string(),
            measures_total: Self::MEASURES_TOTAL.to_string(),
            states: Self::STATES.to_string(),
            switch: Self::SWITCH.to_string(),
        }
    }
}
