// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `MyLight Systems` - An async Rust client for the MyLight Systems cloud API.
//!
//! MyLight Systems installations combine solar panels, a virtual battery, a
//! grid meter and a controllable relay. This library talks to the cloud API
//! that exposes them.
//!
//! # Supported Features
//!
//! - **Authentication**: Login with automatic token renewal
//! - **Account data**: User profile and installation devices
//! - **Measures**: Cumulated energy totals and rates
//! - **Live states**: Virtual battery charge and relay state
//! - **Relay control**: Switch the master relay on/off
//! - **Polling**: A coordinator publishing periodic snapshots
//!
//! # Quick Start
//!
//! ## Direct API calls
//!
//! ```no_run
//! use mylight_systems::{ApiClient, Credentials, HttpConfig};
//!
//! #[tokio::main]
//! async fn main() -> mylight_systems::Result<()> {
//!     let client = ApiClient::http(HttpConfig::default())?;
//!     let credentials = Credentials::new("jane@example.com", "secret");
//!
//!     // Logs in on first use, then reuses the token until it goes stale
//!     let token = client.ensure_valid_token(&credentials).await?;
//!
//!     let profile = client.get_profile(&token).await?;
//!     let devices = client.get_devices(&token).await?;
//!     println!("{} ({}): {devices:?}", profile.subscription_id, profile.grid_type);
//!
//!     if let Some(relay_id) = &devices.master_relay_id {
//!         client.turn_relay_on(&token, relay_id).await?;
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Account setup and polling
//!
//! ```no_run
//! use mylight_systems::{ApiClient, Coordinator, Credentials, HttpConfig};
//! use mylight_systems::config::connect_account;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> mylight_systems::Result<()> {
//!     let http = HttpConfig::default();
//!     let base_url = http.base_url().to_string();
//!     let client = ApiClient::http(http)?;
//!     let credentials = Credentials::new("jane@example.com", "secret");
//!
//!     // Reads subscription id and grid type from the profile
//!     let config = connect_account(&client, &credentials, &base_url).await?;
//!
//!     let coordinator = Coordinator::new(Arc::new(client), &config);
//!     if let Ok(snapshot) = coordinator.refresh().await {
//!         for (sensor, value) in snapshot.sensor_values() {
//!             println!("{sensor}: {value} {}", sensor.unit());
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod protocol;
pub mod response;
pub mod types;

pub use auth::{Credentials, Session, TokenManager};
pub use client::ApiClient;
pub use config::{AccountConfig, connect_account};
pub use coordinator::{Coordinator, InstallationSnapshot, SensorKind, UpdateError};
pub use error::{Error, ParseError, ProtocolError, Result};
pub use protocol::{HttpClient, HttpConfig};
pub use types::{
    DeviceKind, DeviceState, GridType, InstallationDevices, Measure, RelayState, SensorState,
    UserProfile,
};
