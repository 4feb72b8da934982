// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polling coordinator.
//!
//! A [`Coordinator`] runs one refresh cycle per scan interval and publishes
//! the result as an immutable [`InstallationSnapshot`]. Presentation code
//! reads snapshots through [`Coordinator::latest`] or a
//! [`Coordinator::subscribe`] receiver; it never talks to the API itself.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use mylight_systems::{AccountConfig, Coordinator, SensorKind};
//!
//! # async fn example() -> mylight_systems::Result<()> {
//! let config = AccountConfig::new("jane@example.com", "secret");
//! let coordinator = Arc::new(Coordinator::from_config(&config)?);
//!
//! let mut updates = coordinator.subscribe();
//! let runner = Arc::clone(&coordinator);
//! tokio::spawn(async move {
//!     let error = runner.run().await;
//!     eprintln!("polling stopped: {error}");
//! });
//!
//! while updates.changed().await.is_ok() {
//!     if let Some(snapshot) = updates.borrow_and_update().clone() {
//!         println!("{}", snapshot.sensor_value(SensorKind::SolarProduction));
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod snapshot;

pub use snapshot::{InstallationSnapshot, SensorKind};

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::auth::Credentials;
use crate::client::ApiClient;
use crate::config::AccountConfig;
use crate::error::{Error, Result};
use crate::protocol::{HttpClient, Protocol};
use crate::types::{GridType, RelayState};

/// Outcome of a failed refresh cycle.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// Credentials or token were rejected; polling must stop until the user
    /// authenticates again.
    #[error("authentication failed: {0}")]
    AuthFailed(#[source] Error),

    /// Any other failure; the next cycle may succeed.
    #[error("update failed: {0}")]
    UpdateFailed(#[source] Error),
}

impl UpdateError {
    /// Returns the underlying client error.
    #[must_use]
    pub fn error(&self) -> &Error {
        match self {
            Self::AuthFailed(e) | Self::UpdateFailed(e) => e,
        }
    }

    /// Returns `true` when polling must stop.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthFailed(_))
    }
}

impl From<Error> for UpdateError {
    fn from(error: Error) -> Self {
        if error.requires_reauthentication() {
            Self::AuthFailed(error)
        } else {
            Self::UpdateFailed(error)
        }
    }
}

#[derive(Debug, Default)]
struct UpdateStatus {
    success: bool,
    attempted_at: Option<DateTime<Utc>>,
}

/// Periodic poller of one installation.
#[derive(Debug)]
pub struct Coordinator<P: Protocol = HttpClient> {
    client: Arc<ApiClient<P>>,
    credentials: Credentials,
    grid_type: GridType,
    scan_interval: Duration,
    snapshot_tx: watch::Sender<Option<Arc<InstallationSnapshot>>>,
    status: RwLock<UpdateStatus>,
}

impl Coordinator<HttpClient> {
    /// Creates a coordinator with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `Error::Communication` if the HTTP client cannot be created.
    pub fn from_config(config: &AccountConfig) -> Result<Self> {
        let client = ApiClient::http(config.http_config())?;
        Ok(Self::new(Arc::new(client), config))
    }
}

impl<P: Protocol> Coordinator<P> {
    /// Creates a coordinator over a shared client.
    #[must_use]
    pub fn new(client: Arc<ApiClient<P>>, config: &AccountConfig) -> Self {
        let (snapshot_tx, _) = watch::channel(None);
        Self {
            client,
            credentials: config.credentials(),
            grid_type: config.grid_type,
            scan_interval: config.scan_interval(),
            snapshot_tx,
            status: RwLock::new(UpdateStatus::default()),
        }
    }

    /// Returns the client.
    #[must_use]
    pub fn client(&self) -> &Arc<ApiClient<P>> {
        &self.client
    }

    /// Returns the refresh period.
    #[must_use]
    pub fn scan_interval(&self) -> Duration {
        self.scan_interval
    }

    /// Returns the latest successful snapshot.
    #[must_use]
    pub fn latest(&self) -> Option<Arc<InstallationSnapshot>> {
        self.snapshot_tx.borrow().clone()
    }

    /// Subscribes to snapshot updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<InstallationSnapshot>>> {
        self.snapshot_tx.subscribe()
    }

    /// Returns `true` if the latest refresh succeeded.
    ///
    /// `false` before the first refresh.
    #[must_use]
    pub fn last_update_success(&self) -> bool {
        self.status.read().success
    }

    /// Returns when the latest refresh was attempted.
    #[must_use]
    pub fn last_attempt_at(&self) -> Option<DateTime<Utc>> {
        self.status.read().attempted_at
    }

    /// Runs one refresh cycle and publishes its snapshot.
    ///
    /// On failure the previous snapshot stays published. A battery or relay
    /// state that cannot be read is logged and left empty in the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `UpdateError::AuthFailed` when the credentials or token were
    /// rejected and `UpdateError::UpdateFailed` for any other failure.
    pub async fn refresh(&self) -> std::result::Result<Arc<InstallationSnapshot>, UpdateError> {
        let result = self.fetch_snapshot().await;

        let mut status = self.status.write();
        status.attempted_at = Some(Utc::now());
        status.success = result.is_ok();
        drop(status);

        match result {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.snapshot_tx.send_replace(Some(Arc::clone(&snapshot)));
                tracing::debug!(measures = snapshot.measures.len(), "Snapshot published");
                Ok(snapshot)
            }
            Err(e) => {
                let error = UpdateError::from(e);
                tracing::warn!(error = %error, "Refresh failed");
                Err(error)
            }
        }
    }

    /// Refreshes once per scan interval until authentication fails.
    ///
    /// The first refresh runs immediately. Returns the authentication error
    /// that stopped polling.
    pub async fn run(&self) -> UpdateError {
        let mut ticker = tokio::time::interval(self.scan_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(interval_secs = self.scan_interval.as_secs(), "Polling started");

        loop {
            ticker.tick().await;
            if let Err(error) = self.refresh().await
                && error.is_auth_failure()
            {
                tracing::warn!("Polling stopped, re-authentication required");
                return error;
            }
        }
    }

    /// Switches the installation's relay, then refreshes.
    ///
    /// Returns the relay state reported by the API. A failed follow-up
    /// refresh is logged and does not turn the switch into an error.
    ///
    /// # Errors
    ///
    /// Returns `UpdateError::UpdateFailed` when the installation has no
    /// relay, and the classified client error otherwise.
    pub async fn set_relay(&self, state: RelayState) -> std::result::Result<RelayState, UpdateError> {
        let snapshot = match self.latest() {
            Some(snapshot) => snapshot,
            None => self.refresh().await?,
        };

        let Some(relay_id) = snapshot.devices.master_relay_id.as_deref() else {
            return Err(UpdateError::UpdateFailed(Error::General(
                "installation has no relay".to_string(),
            )));
        };

        let token = self.client.ensure_valid_token(&self.credentials).await?;
        let result = self.client.switch_relay(&token, relay_id, state).await?;
        tracing::info!(relay_id = %relay_id, state = %result, "Relay switched");

        if let Err(error) = self.refresh().await {
            tracing::warn!(error = %error, "Refresh after relay switch failed");
        }
        Ok(result)
    }

    async fn fetch_snapshot(&self) -> Result<InstallationSnapshot> {
        let token = self.client.ensure_valid_token(&self.credentials).await?;
        let devices = self.client.get_devices(&token).await?;

        let measures = match devices.virtual_device_id.as_deref() {
            Some(device_id) => {
                self.client
                    .get_measures_total(&token, self.grid_type, device_id)
                    .await?
            }
            None => Vec::new(),
        };

        let battery_state = match devices.virtual_battery_id.as_deref() {
            Some(battery_id) => live_state(
                "battery",
                self.client.get_battery_state(&token, battery_id).await,
            )?,
            None => None,
        };

        let relay_state = match devices.master_relay_id.as_deref() {
            Some(relay_id) => {
                live_state("relay", self.client.get_relay_state(&token, relay_id).await)?
            }
            None => None,
        };

        Ok(InstallationSnapshot {
            devices,
            measures,
            battery_state,
            relay_state,
            fetched_at: Utc::now(),
        })
    }
}

/// Live states are optional in a snapshot: only a rejected token fails the cycle.
fn live_state<T>(device: &str, result: Result<Option<T>>) -> Result<Option<T>> {
    match result {
        Err(error) if !error.requires_reauthentication() => {
            tracing::warn!(device = %device, error = %error, "Failed to fetch live state");
            Ok(None)
        }
        other => other,
    }
}
