// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the MyLight Systems client.
//!
//! Every failure surfaced by the client falls into one of a small number of
//! kinds: transport problems ([`Error::Communication`]), rejected credentials
//! ([`Error::InvalidCredentials`]), a rejected token ([`Error::Unauthorized`]),
//! a response that could not be decoded ([`Error::MalformedResponse`]), and a
//! catch-all ([`Error::General`]).

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The request never produced a usable HTTP response.
    #[error("communication error: {0}")]
    Communication(#[from] ProtocolError),

    /// The login was rejected because of a bad email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A previously accepted token was rejected by an endpoint.
    #[error("unauthorized")]
    Unauthorized,

    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(#[from] ParseError),

    /// Anything the kinds above do not cover, such as an unknown API error code.
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Returns `true` when the caller must ask the user to authenticate again.
    ///
    /// Polling should stop on these errors rather than retry.
    #[must_use]
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, Self::InvalidCredentials | Self::Unauthorized)
    }

    /// Returns `true` for failures that may succeed on the next poll cycle.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        !self.requires_reauthentication()
    }

    /// Returns `true` when the request exceeded its timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Communication(ProtocolError::Timeout(_)))
    }
}

/// Errors raised by the HTTP transport.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Invalid base URL.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The server rejected the request at the HTTP level (status 401).
    #[error("authentication failed")]
    AuthenticationFailed,
}

/// Errors related to decoding API responses.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the response.
    #[error("missing field in response: {0}")]
    MissingField(String),

    /// Unexpected response format.
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),

    /// Failed to parse a specific value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
