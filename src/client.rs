// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! API client for the MyLight Systems cloud service.
//!
//! [`ApiClient`] turns each remote operation into one `GET` request and one
//! typed result. Authenticated operations take the token explicitly; the
//! client's [`TokenManager`] hands out a fresh one through
//! [`ApiClient::ensure_valid_token`].

use chrono::TimeDelta;
use serde::de::DeserializeOwned;

use crate::auth::{Credentials, Session, TokenManager};
use crate::error::{Error, Result};
use crate::protocol::{Endpoint, Endpoints, HttpClient, HttpConfig, Protocol};
use crate::response::{
    ApiErrorCode, DevicesPayload, LoginPayload, MeasuresTotalPayload, ProfilePayload, Reply,
    StatesPayload, SwitchPayload,
};
use crate::types::{
    DeviceState, GridType, InstallationDevices, Measure, RelayState, UserProfile,
};

/// Client for the MyLight Systems REST API.
///
/// # Type Parameter
///
/// `P` is the transport; [`HttpClient`] unless a test or an embedding
/// application supplies its own [`Protocol`].
///
/// # Examples
///
/// ```no_run
/// use mylight_systems::{ApiClient, Credentials, GridType};
/// use mylight_systems::protocol::HttpConfig;
///
/// # async fn example() -> mylight_systems::Result<()> {
/// let client = ApiClient::http(HttpConfig::default())?;
/// let credentials = Credentials::new("jane@example.com", "secret");
///
/// let token = client.ensure_valid_token(&credentials).await?;
/// let devices = client.get_devices(&token).await?;
///
/// if let Some(device_id) = &devices.virtual_device_id {
///     let measures = client
///         .get_measures_total(&token, GridType::OnePhase, device_id)
///         .await?;
///     for measure in measures {
///         println!("{} = {:?} {}", measure.kind, measure.value, measure.unit);
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ApiClient<P: Protocol = HttpClient> {
    protocol: P,
    endpoints: Endpoints,
    tokens: TokenManager,
}

impl ApiClient<HttpClient> {
    /// Creates a client over HTTP.
    ///
    /// # Errors
    ///
    /// Returns `Error::Communication` if the HTTP client cannot be created.
    pub fn http(config: HttpConfig) -> Result<Self> {
        Ok(Self::new(config.into_client()?))
    }
}

impl<P: Protocol> ApiClient<P> {
    /// Creates a client over the given transport with default endpoints.
    #[must_use]
    pub fn new(protocol: P) -> Self {
        Self {
            protocol,
            endpoints: Endpoints::default(),
            tokens: TokenManager::new(),
        }
    }

    /// Replaces the endpoint path table.
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Sets how long a token is trusted after login.
    #[must_use]
    pub fn with_token_validity(mut self, validity: TimeDelta) -> Self {
        self.tokens = TokenManager::with_validity(validity);
        self
    }

    /// Returns the transport.
    #[must_use]
    pub fn protocol(&self) -> &P {
        &self.protocol
    }

    /// Returns the endpoint path table.
    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Returns the token manager.
    #[must_use]
    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    // ========== Authentication ==========

    /// Logs in and returns a new session.
    ///
    /// The session is not stored; use [`ensure_valid_token`](Self::ensure_valid_token)
    /// for managed sessions.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidCredentials` if the API rejects the email or
    /// password, or any transport/decoding error.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
        let query = [
            ("email", credentials.email.as_str()),
            ("password", credentials.password.as_str()),
        ];

        match self.call::<LoginPayload>(Endpoint::Auth, &query).await? {
            Reply::Ok(payload) => Ok(Session::issue(payload.auth_token, self.tokens.validity())),
            Reply::Rejected(code) if code.is_credentials_rejection() => {
                tracing::warn!(code = %code, "Login rejected");
                Err(Error::InvalidCredentials)
            }
            Reply::Rejected(code) => Err(unexpected_code(Endpoint::Auth, &code)),
        }
    }

    /// Returns a fresh token, logging in first when none is held or the
    /// held one is stale.
    ///
    /// # Errors
    ///
    /// Returns the login error; the previously held session is kept.
    pub async fn ensure_valid_token(&self, credentials: &Credentials) -> Result<String> {
        self.tokens
            .token_or_refresh(|| self.login(credentials))
            .await
    }

    /// Drops the held session so the next call logs in again.
    pub async fn invalidate_token(&self) {
        self.tokens.invalidate().await;
    }

    // ========== Account ==========

    /// Fetches the user profile.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unauthorized` if the token is rejected, or any
    /// transport/decoding error.
    pub async fn get_profile(&self, token: &str) -> Result<UserProfile> {
        let payload: ProfilePayload = self
            .call_authenticated(Endpoint::Profile, token, &[])
            .await?
            .expect_ok(Endpoint::Profile)?;

        Ok(payload.into())
    }

    /// Fetches the device list and picks the device of each role.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unauthorized` if the token is rejected, or any
    /// transport/decoding error.
    pub async fn get_devices(&self, token: &str) -> Result<InstallationDevices> {
        let payload: DevicesPayload = self
            .call_authenticated(Endpoint::Devices, token, &[])
            .await?
            .expect_ok(Endpoint::Devices)?;

        tracing::debug!(count = payload.devices.len(), "Fetched devices");
        Ok(payload.into())
    }

    // ========== Measures and states ==========

    /// Fetches the cumulated measures of a device, in the order the API sent them.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unauthorized` if the token is rejected, or any
    /// transport/decoding error.
    pub async fn get_measures_total(
        &self,
        token: &str,
        grid_type: GridType,
        device_id: &str,
    ) -> Result<Vec<Measure>> {
        let query = [("measureType", grid_type.as_str()), ("deviceId", device_id)];
        let payload: MeasuresTotalPayload = self
            .call_authenticated(Endpoint::MeasuresTotal, token, &query)
            .await?
            .expect_ok(Endpoint::MeasuresTotal)?;

        let measures = payload.into_measures();
        tracing::debug!(device_id = %device_id, count = measures.len(), "Fetched measures");
        Ok(measures)
    }

    /// Fetches the live state of every device.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unauthorized` if the token is rejected, or any
    /// transport/decoding error.
    pub async fn get_states(&self, token: &str) -> Result<Vec<DeviceState>> {
        Ok(self.fetch_states(token).await?.device_states)
    }

    /// Returns the state-of-charge reading of a battery, if the API reports one.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unauthorized` if the token is rejected, or any
    /// transport/decoding error.
    pub async fn get_battery_state(&self, token: &str, battery_id: &str) -> Result<Option<Measure>> {
        Ok(self.fetch_states(token).await?.battery_state(battery_id))
    }

    /// Returns the state of a relay, if the API reports one.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unauthorized` if the token is rejected,
    /// `Error::MalformedResponse` if the state is not on/off, or any
    /// transport/decoding error.
    pub async fn get_relay_state(&self, token: &str, relay_id: &str) -> Result<Option<RelayState>> {
        Ok(self.fetch_states(token).await?.relay_state(relay_id)?)
    }

    async fn fetch_states(&self, token: &str) -> Result<StatesPayload> {
        self.call_authenticated(Endpoint::States, token, &[])
            .await?
            .expect_ok(Endpoint::States)
    }

    // ========== Relay control ==========

    /// Closes a relay.
    ///
    /// # Errors
    ///
    /// See [`switch_relay`](Self::switch_relay).
    pub async fn turn_relay_on(&self, token: &str, relay_id: &str) -> Result<RelayState> {
        self.switch_relay(token, relay_id, RelayState::On).await
    }

    /// Opens a relay.
    ///
    /// # Errors
    ///
    /// See [`switch_relay`](Self::switch_relay).
    pub async fn turn_relay_off(&self, token: &str, relay_id: &str) -> Result<RelayState> {
        self.switch_relay(token, relay_id, RelayState::Off).await
    }

    /// Switches a relay and returns its resulting state.
    ///
    /// When the API refuses the switch (`switch.not.allowed`) the relay did
    /// not move, so the opposite of `target` is returned instead of an error.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unauthorized` if the token is rejected, or any
    /// transport/decoding error.
    pub async fn switch_relay(
        &self,
        token: &str,
        relay_id: &str,
        target: RelayState,
    ) -> Result<RelayState> {
        let query = [("id", relay_id), ("on", target.as_query_flag())];

        match self
            .call_authenticated::<SwitchPayload>(Endpoint::Switch, token, &query)
            .await?
        {
            Reply::Ok(payload) => Ok(payload.relay_state()?),
            Reply::Rejected(ApiErrorCode::SwitchNotAllowed) => {
                tracing::warn!(relay_id = %relay_id, target = %target, "Relay switch not allowed");
                Ok(target.opposite())
            }
            Reply::Rejected(code) => Err(unexpected_code(Endpoint::Switch, &code)),
        }
    }

    // ========== Request plumbing ==========

    async fn call<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        query: &[(&str, &str)],
    ) -> Result<Reply<T>> {
        let path = self.endpoints.path(endpoint);

        let response = self.protocol.get(path, query).await.map_err(|e| {
            tracing::debug!(endpoint = %endpoint, error = %e, "Request failed");
            Error::Communication(e)
        })?;

        Ok(Reply::from_response(&response)?)
    }

    /// Sends `authToken` along with `query`. A `not.authorized` reply clears
    /// the held session when it carries `token`.
    async fn call_authenticated<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        token: &str,
        query: &[(&str, &str)],
    ) -> Result<Reply<T>> {
        let mut params = Vec::with_capacity(query.len() + 1);
        params.push(("authToken", token));
        params.extend_from_slice(query);

        match self.call(endpoint, &params).await? {
            Reply::Rejected(ApiErrorCode::NotAuthorized) => {
                tracing::warn!(endpoint = %endpoint, "Token rejected");
                self.tokens.invalidate_token(token).await;
                Err(Error::Unauthorized)
            }
            reply => Ok(reply),
        }
    }
}

impl<T> Reply<T> {
    fn expect_ok(self, endpoint: Endpoint) -> Result<T> {
        match self {
            Self::Ok(payload) => Ok(payload),
            Self::Rejected(code) => Err(unexpected_code(endpoint, &code)),
        }
    }
}

fn unexpected_code(endpoint: Endpoint, code: &ApiErrorCode) -> Error {
    tracing::warn!(endpoint = %endpoint, code = %code, "Unexpected API error");
    Error::General(format!("{endpoint} failed with API error '{code}'"))
}
