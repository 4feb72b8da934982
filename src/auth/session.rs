// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Credentials and session token types.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Account credentials.
///
/// The `Debug` output hides the password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

impl Credentials {
    /// Creates credentials.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Session token with its locally computed lifetime.
///
/// # Examples
///
/// ```
/// use chrono::TimeDelta;
/// use mylight_systems::auth::Session;
///
/// let session = Session::issue("abcdef", TimeDelta::hours(2));
/// assert_eq!(session.token(), "abcdef");
/// assert!(session.is_fresh());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Session {
    /// Creates a session issued now and valid for `validity`.
    #[must_use]
    pub fn issue(token: impl Into<String>, validity: TimeDelta) -> Self {
        Self::issue_at(token, Utc::now(), validity)
    }

    /// Creates a session issued at a given instant.
    #[must_use]
    pub fn issue_at(token: impl Into<String>, issued_at: DateTime<Utc>, validity: TimeDelta) -> Self {
        Self {
            token: token.into(),
            issued_at,
            expires_at: issued_at
                .checked_add_signed(validity)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Returns the token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns when the token was obtained.
    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Returns when the token is considered stale.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns `true` while the session is usable at `now`.
    #[must_use]
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Returns `true` while the session is usable.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Utc::now())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
