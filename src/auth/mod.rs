// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session token lifecycle.
//!
//! The API hands out a bare token on login and never says when it expires.
//! [`TokenManager`] therefore stamps every token with a fixed validity window
//! and logs in again once that window has passed.
//!
//! # State machine
//!
//! - *Unauthenticated* → *Authenticated*: a successful login.
//! - *Authenticated* → *Unauthenticated*: lazily, when the next
//!   [`TokenManager::token_or_refresh`] finds the session stale, or eagerly
//!   through [`TokenManager::invalidate_token`] when an endpoint rejects the
//!   held token.

mod session;

pub use session::{Credentials, Session};

use std::future::Future;

use chrono::TimeDelta;
use tokio::sync::Mutex;

use crate::error::Result;

/// Owner of the in-memory session of one API client.
///
/// Refreshes are serialized by an async mutex: when several tasks find the
/// session stale at once, only the first one logs in and the others reuse
/// its token.
#[derive(Debug)]
pub struct TokenManager {
    session: Mutex<Option<Session>>,
    validity: TimeDelta,
}

impl TokenManager {
    /// Default validity window of a token, in hours.
    pub const DEFAULT_VALIDITY_HOURS: i64 = 2;

    /// Creates an unauthenticated manager with the default validity window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_validity(TimeDelta::hours(Self::DEFAULT_VALIDITY_HOURS))
    }

    /// Creates an unauthenticated manager with a custom validity window.
    #[must_use]
    pub fn with_validity(validity: TimeDelta) -> Self {
        Self {
            session: Mutex::new(None),
            validity,
        }
    }

    /// Returns the validity window stamped on new sessions.
    #[must_use]
    pub fn validity(&self) -> TimeDelta {
        self.validity
    }

    /// Returns a copy of the held session, stale or not.
    pub async fn session(&self) -> Option<Session> {
        self.session.lock().await.clone()
    }

    /// Returns `true` when a fresh session is held.
    pub async fn is_authenticated(&self) -> bool {
        self.session
            .lock()
            .await
            .as_ref()
            .is_some_and(Session::is_fresh)
    }

    /// Returns the held token when fresh, otherwise runs `login` and stores
    /// the session it returns.
    ///
    /// A failed login leaves the previously held session in place.
    ///
    /// # Errors
    ///
    /// Returns the error of `login`.
    pub async fn token_or_refresh<F, Fut>(&self, login: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Session>>,
    {
        let mut guard = self.session.lock().await;

        if let Some(session) = guard.as_ref()
            && session.is_fresh()
        {
            return Ok(session.token().to_string());
        }

        tracing::debug!(
            had_session = guard.is_some(),
            "Session missing or expired, logging in"
        );

        let session = login().await?;
        let token = session.token().to_string();

        tracing::info!(expires_at = %session.expires_at(), "Session established");
        *guard = Some(session);

        Ok(token)
    }

    /// Stores a session obtained elsewhere.
    pub async fn store(&self, session: Session) {
        *self.session.lock().await = Some(session);
    }

    /// Drops the held session.
    pub async fn invalidate(&self) {
        *self.session.lock().await = None;
    }

    /// Drops the held session if it carries `token`.
    ///
    /// Returns `true` when a session was dropped. A session refreshed since
    /// `token` was handed out is kept.
    pub async fn invalidate_token(&self, token: &str) -> bool {
        let mut guard = self.session.lock().await;
        if guard.as_ref().is_some_and(|s| s.token() == token) {
            tracing::info!("Token rejected by the API, session cleared");
            *guard = None;
            true
        } else {
            false
        }
    }
}

impl Default for TokenManager {
    fn default() -> Self {
        Self::new()
    }
}
