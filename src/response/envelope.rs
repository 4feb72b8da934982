// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `status`/`error` envelope shared by every API response.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ParseError;
use crate::protocol::ApiResponse;

/// Error code carried by a `"status": "error"` response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ApiErrorCode {
    /// `invalid.credentials`
    InvalidCredentials,
    /// `undefined.email`
    UndefinedEmail,
    /// `undefined.password`
    UndefinedPassword,
    /// `not.authorized`
    NotAuthorized,
    /// `switch.not.allowed`
    SwitchNotAllowed,
    /// Any other code.
    Other(String),
}

impl ApiErrorCode {
    /// Maps a raw error code.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "invalid.credentials" => Self::InvalidCredentials,
            "undefined.email" => Self::UndefinedEmail,
            "undefined.password" => Self::UndefinedPassword,
            "not.authorized" => Self::NotAuthorized,
            "switch.not.allowed" => Self::SwitchNotAllowed,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the raw error code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::InvalidCredentials => "invalid.credentials",
            Self::UndefinedEmail => "undefined.email",
            Self::UndefinedPassword => "undefined.password",
            Self::NotAuthorized => "not.authorized",
            Self::SwitchNotAllowed => "switch.not.allowed",
            Self::Other(code) => code,
        }
    }

    /// Returns `true` for the codes a rejected login uses.
    #[must_use]
    pub fn is_credentials_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials | Self::UndefinedEmail | Self::UndefinedPassword
        )
    }
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an API call whose envelope was decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    /// `"status": "ok"` with its decoded payload.
    Ok(T),
    /// `"status": "error"` with its code. The payload is never read.
    Rejected(ApiErrorCode),
}

impl<T: DeserializeOwned> Reply<T> {
    /// Decodes a response: status first, payload only when the status is `ok`.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the body is not JSON, the `status` (or, for
    /// errors, the `error`) field is missing or unknown, or the payload does
    /// not match `T`.
    pub fn from_response(response: &ApiResponse) -> Result<Self, ParseError> {
        let value: Value = serde_json::from_str(response.body())?;
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Self, ParseError> {
        let status = value
            .get("status")
            .ok_or_else(|| ParseError::MissingField("status".to_string()))?
            .as_str()
            .ok_or_else(|| ParseError::InvalidValue {
                field: "status".to_string(),
                message: "expected a string".to_string(),
            })?;

        match status {
            "ok" => Ok(Self::Ok(serde_json::from_value(value)?)),
            "error" => {
                let code = value
                    .get("error")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ParseError::MissingField("error".to_string()))?;
                Ok(Self::Rejected(ApiErrorCode::from_code(code)))
            }
            other => Err(ParseError::UnexpectedFormat(format!(
                "unknown status '{other}'"
            ))),
        }
    }
}
