// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport layer for the MyLight Systems REST API.
//!
//! Every remote operation is a single HTTP `GET` with a query string and a
//! JSON body in the response. The [`Protocol`] trait abstracts that exchange
//! so the [`ApiClient`](crate::ApiClient) does not depend on a particular
//! HTTP stack; [`HttpClient`] is the `reqwest` implementation.

mod endpoints;
mod http;

pub use endpoints::{DEFAULT_BASE_URL, Endpoint, Endpoints};
pub use http::{HttpClient, HttpClientBuilder, HttpConfig};

use std::future::Future;

use crate::error::ProtocolError;

/// Raw response from the API.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// The raw JSON response body.
    body: String,
}

impl ApiResponse {
    /// Creates a new response with the given body.
    #[must_use]
    pub fn new(body: String) -> Self {
        Self { body }
    }

    /// Returns the raw JSON response body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Trait for transports that can execute API requests.
pub trait Protocol: Send + Sync {
    /// Sends a `GET` request for `path` with the given query parameters.
    ///
    /// # Arguments
    ///
    /// * `path` - The endpoint path, e.g. `/api/profile`
    /// * `query` - Query parameters, encoded by the implementation
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails to send or the server
    /// answers with a non-success status.
    fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> impl Future<Output = Result<ApiResponse, ProtocolError>> + Send;
}
