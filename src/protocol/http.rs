// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP transport built on `reqwest`.

use std::time::Duration;

use reqwest::Client;

use crate::error::ProtocolError;
use crate::protocol::{ApiResponse, DEFAULT_BASE_URL, Protocol};

// ============================================================================
// HttpConfig - Connection parameters for the API host
// ============================================================================

/// Configuration for the HTTP transport.
///
/// # Examples
///
/// ```
/// use mylight_systems::protocol::HttpConfig;
/// use std::time::Duration;
///
/// // Default host
/// let config = HttpConfig::default();
/// assert_eq!(config.base_url(), "https://myhome.mylight-systems.com");
///
/// // Custom host and timeout
/// let config = HttpConfig::new("https://staging.example.com/")
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(config.base_url(), "https://staging.example.com");
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    base_url: String,
    timeout: Duration,
}

impl HttpConfig {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the given base URL.
    ///
    /// A blank URL falls back to [`DEFAULT_BASE_URL`]. A URL without a scheme
    /// gets `https://`, and trailing slashes are removed.
    #[must_use]
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.as_ref()),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the normalized base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Creates an `HttpClient` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidAddress`] if the base URL does not
    /// parse, or an error if the HTTP client cannot be created.
    pub fn into_client(self) -> Result<HttpClient, ProtocolError> {
        reqwest::Url::parse(&self.base_url).map_err(|e| {
            ProtocolError::InvalidAddress(format!("{}: {e}", self.base_url))
        })?;

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(HttpClient {
            base_url: self.base_url,
            client,
            timeout: self.timeout,
        })
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return DEFAULT_BASE_URL.to_string();
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

// ============================================================================
// HttpClient
// ============================================================================

/// HTTP client for the MyLight Systems API.
///
/// # Examples
///
/// ```no_run
/// use mylight_systems::protocol::{HttpClient, Protocol};
///
/// # async fn example() -> Result<(), mylight_systems::ProtocolError> {
/// let client = HttpClient::new("https://myhome.mylight-systems.com")?;
/// let response = client.get("/api/profile", &[("authToken", "abcdef")]).await?;
/// println!("{}", response.body());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Creates a new HTTP client for the given base URL with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, ProtocolError> {
        HttpConfig::new(base_url).into_client()
    }

    /// Returns the base URL of the API.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the full URL for a path and its query parameters.
    fn build_url(&self, path: &str, query: &[(&str, &str)]) -> String {
        let mut url = format!("{}{}", self.base_url, path);

        for (i, (key, value)) in query.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(&urlencoding::encode(key));
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }

        url
    }

    fn transport_error(&self, error: reqwest::Error) -> ProtocolError {
        if error.is_timeout() {
            ProtocolError::Timeout(u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX))
        } else {
            ProtocolError::Http(error)
        }
    }
}

impl Protocol for HttpClient {
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<ApiResponse, ProtocolError> {
        let url = self.build_url(path, query);

        // The query string carries credentials and tokens, so only the path is logged.
        tracing::debug!(base_url = %self.base_url, path = %path, "Sending HTTP request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        tracing::debug!(path = %path, status = status.as_u16(), "Received HTTP response");

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProtocolError::AuthenticationFailed);
        }

        if !status.is_success() {
            return Err(ProtocolError::ConnectionFailed(format!(
                "HTTP {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        tracing::trace!(bytes = body.len(), "Received HTTP body");

        Ok(ApiResponse::new(body))
    }
}

/// Builder for creating an HTTP client with custom configuration.
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl HttpClientBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the HTTP client.
    ///
    /// Without a base URL the default API host is used.
    ///
    /// # Errors
    ///
    /// Returns error if client creation fails.
    pub fn build(self) -> Result<HttpClient, ProtocolError> {
        let config = HttpConfig::new(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))
            .with_timeout(self.timeout.unwrap_or(HttpConfig::DEFAULT_TIMEOUT));
        config.into_client()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_without_query() {
        let client = HttpClient::new("https://myhome.mylight-systems.com").unwrap();
        let url = client.build_url("/api/devices", &[]);
        assert_eq!(url, "https://myhome.mylight-systems.com/api/devices");
    }

    #[test]
    fn build_url_encodes_query() {
        let client = HttpClient::new("https://myhome.mylight-systems.com").unwrap();
        let url = client.build_url(
            "/api/auth",
            &[("email", "jane+solar@example.com"), ("password", "p&ss word")],
        );
        assert_eq!(
            url,
            "https://myhome.mylight-systems.com/api/auth?email=jane%2Bsolar%40example.com&password=p%26ss%20word"
        );
    }

    #[test]
    fn builder_defaults_to_api_host() {
        let client = HttpClientBuilder::new().build().unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert_eq!(client.timeout, HttpConfig::DEFAULT_TIMEOUT);
    }

    #[test]
    fn builder_with_all_options() {
        let client = HttpClientBuilder::new()
            .base_url("http://127.0.0.1:8080/")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(client.base_url(), "http://127.0.0.1:8080");
        assert_eq!(client.timeout, Duration::from_secs(5));
    }

    // =========================================================================
    // HttpConfig tests
    // =========================================================================

    #[test]
    fn http_config_default_values() {
        let config = HttpConfig::default();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn http_config_blank_url_uses_default() {
        assert_eq!(HttpConfig::new("").base_url(), DEFAULT_BASE_URL);
        assert_eq!(HttpConfig::new("   ").base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn http_config_adds_missing_scheme() {
        let config = HttpConfig::new("myhome.example.com");
        assert_eq!(config.base_url(), "https://myhome.example.com");
    }

    #[test]
    fn http_config_keeps_plain_http() {
        let config = HttpConfig::new("http://localhost:9000/");
        assert_eq!(config.base_url(), "http://localhost:9000");
    }

    #[test]
    fn http_config_with_timeout() {
        let config = HttpConfig::default().with_timeout(Duration::from_secs(30));
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn http_config_into_client() {
        let client = HttpConfig::new("http://localhost:9000").into_client().unwrap();
        assert_eq!(client.base_url(), "http://localhost:9000");
    }

    #[test]
    fn unparsable_base_url_is_invalid_address() {
        let result = HttpConfig::new("https://bad host").into_client();
        assert!(matches!(result, Err(ProtocolError::InvalidAddress(_))));

        let result = HttpClientBuilder::new().base_url("http://[::1").build();
        assert!(matches!(result, Err(ProtocolError::InvalidAddress(_))));
    }
}
