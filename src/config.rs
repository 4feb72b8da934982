// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Account configuration and setup.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::Credentials;
use crate::client::ApiClient;
use crate::error::Result;
use crate::protocol::{DEFAULT_BASE_URL, HttpConfig, Protocol};
use crate::types::GridType;

/// Stored configuration of one MyLight Systems account.
///
/// Serializes to JSON so a host application can persist it between runs.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use mylight_systems::{AccountConfig, GridType};
///
/// let config = AccountConfig::new("jane@example.com", "secret")
///     .with_grid_type(GridType::ThreePhases)
///     .with_scan_interval(Duration::from_secs(300));
///
/// assert_eq!(config.scan_interval(), Duration::from_secs(300));
/// assert_eq!(config.base_url, "https://myhome.mylight-systems.com");
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Subscription identifier, known once the account has been connected.
    #[serde(default)]
    pub subscription_id: Option<String>,
    /// Grid type of the installation.
    #[serde(default)]
    pub grid_type: GridType,
    /// Seconds between two coordinator refreshes.
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_scan_interval_secs() -> u64 {
    AccountConfig::DEFAULT_SCAN_INTERVAL_SECS
}

impl AccountConfig {
    /// Default refresh period, in seconds.
    pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 900;

    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            base_url: default_base_url(),
            subscription_id: None,
            grid_type: GridType::default(),
            scan_interval_secs: Self::DEFAULT_SCAN_INTERVAL_SECS,
        }
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the subscription identifier.
    #[must_use]
    pub fn with_subscription_id(mut self, subscription_id: impl Into<String>) -> Self {
        self.subscription_id = Some(subscription_id.into());
        self
    }

    /// Sets the grid type.
    #[must_use]
    pub fn with_grid_type(mut self, grid_type: GridType) -> Self {
        self.grid_type = grid_type;
        self
    }

    /// Sets the refresh period, truncated to whole seconds.
    #[must_use]
    pub fn with_scan_interval(mut self, interval: Duration) -> Self {
        self.scan_interval_secs = interval.as_secs();
        self
    }

    /// Returns the account credentials.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.email, &self.password)
    }

    /// Returns the HTTP settings for this account.
    #[must_use]
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig::new(&self.base_url)
    }

    /// Returns the refresh period, never shorter than one second.
    #[must_use]
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs.max(1))
    }
}

impl fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountConfig")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("subscription_id", &self.subscription_id)
            .field("grid_type", &self.grid_type)
            .field("scan_interval_secs", &self.scan_interval_secs)
            .finish()
    }
}

/// Connects an account: logs in, reads the profile and returns the
/// configuration to persist.
///
/// The session obtained here stays in `client`, so a coordinator built on
/// the same client starts authenticated.
///
/// # Errors
///
/// Returns `Error::InvalidCredentials` if the login is rejected, or any
/// error of the profile fetch.
pub async fn connect_account<P: Protocol>(
    client: &ApiClient<P>,
    credentials: &Credentials,
    base_url: &str,
) -> Result<AccountConfig> {
    let token = client.ensure_valid_token(credentials).await?;
    let profile = client.get_profile(&token).await?;

    tracing::info!(
        subscription_id = %profile.subscription_id,
        grid_type = %profile.grid_type,
        "Account connected"
    );

    Ok(
        AccountConfig::new(&credentials.email, &credentials.password)
            .with_base_url(base_url)
            .with_subscription_id(profile.subscription_id)
            .with_grid_type(profile.grid_type),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_applies_defaults() {
        let config: AccountConfig =
            serde_json::from_str(r#"{"email": "jane@example.com", "password": "pw"}"#).unwrap();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.subscription_id, None);
        assert_eq!(config.grid_type, GridType::OnePhase);
        assert_eq!(config.scan_interval(), Duration::from_secs(900));
    }

    #[test]
    fn json_round_trip() {
        let config = AccountConfig::new("jane@example.com", "pw")
            .with_subscription_id("40oXYqq6nM7R9zGK")
            .with_grid_type(GridType::ThreePhases);

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""grid_type":"three_phases""#));

        let back: AccountConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn zero_scan_interval_is_clamped() {
        let config = AccountConfig::new("a", "b").with_scan_interval(Duration::ZERO);
        assert_eq!(config.scan_interval(), Duration::from_secs(1));
    }

    #[test]
    fn debug_hides_password() {
        let config = AccountConfig::new("jane@example.com", "hunter2");
        assert!(!format!("{config:?}").contains("hunter2"));
    }

    #[test]
    fn credentials_and_http_config() {
        let config = AccountConfig::new("jane@example.com", "pw").with_base_url("http://localhost:8080/");

        assert_eq!(config.credentials(), Credentials::new("jane@example.com", "pw"));
        assert_eq!(config.http_config().base_url(), "http://localhost:8080");
    }
}
