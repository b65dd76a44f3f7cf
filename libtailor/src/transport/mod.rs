//! HTTP transport for registry communication.
//!
//! Sessions talk to registries through the [`Transport`] trait so the wire
//! can be swapped for a deterministic fake in tests. [`HttpTransport`] is the
//! real implementation, a thin blocking client built on reqwest.

use crate::config::Network;
use crate::error::{Result, TailorError};
use reqwest::blocking::Client as ReqwestClient;
use std::time::Duration;
use tracing::trace;
use url::Url;


#[cfg(test)]
pub(crate) mod fake;

/// A GET request against a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Absolute request URL
    pub url: Url,
    /// Header name/value pairs, sent in order
    pub headers: Vec<(String, String)>,
}

impl Request {
    /// Creates a GET request for `url` with no headers.
    pub fn get(url: Url) -> Self {
        Self {
            url,
            headers: Vec::new(),
        }
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds a header when `value` is present.
    pub fn header_opt(self, name: impl Into<String>, value: Option<String>) -> Self {
        match value {
            Some(value) => self.header(name, value),
            None => self,
        }
    }
}

/// A registry's answer to a [`Request`], whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Header name/value pairs; a repeated header appears once per value
    pub headers: Vec<(String, String)>,
    /// Raw response body
    pub body: Vec<u8>,
}

impl Response {
    /// Creates a response with the given status and body and no headers.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the first value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns every value of a header, in the order received.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Returns the body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The capability to perform one blocking HTTP exchange.
///
/// Implementations return `Err` only when no response was received at all
/// (connection refused, timeout, TLS failure). Every HTTP status, including
/// errors, is an `Ok(Response)` for the caller to classify.
pub trait Transport {
    /// Performs `request` and returns the registry's response.
    fn execute(&self, request: Request) -> Result<Response>;
}

/// Configuration for the HTTP transport.
///
/// # Examples
///
/// ```
/// use libtailor::transport::TransportConfig;
///
/// let config = TransportConfig::new()
///     .with_timeout(60)
///     .with_max_idle_per_host(20);
/// ```
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
    /// Maximum idle connections per host (default: 10)
    pub max_idle_per_host: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            max_idle_per_host: 10,
        }
    }
}

impl From<&Network> for TransportConfig {
    fn from(network: &Network) -> Self {
        Self {
            timeout_seconds: network.timeout,
            max_idle_per_host: network.max_idle_per_host,
        }
    }
}

impl TransportConfig {
    /// Creates a new configuration with default values.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtailor::transport::TransportConfig;
    ///
    /// let config = TransportConfig::new();
    /// assert_eq!(config.timeout_seconds, 30);
    /// assert_eq!(config.max_idle_per_host, 10);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout in seconds.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the maximum idle connections per host.
    pub fn with_max_idle_per_host(mut self, max: usize) -> Self {
        self.max_idle_per_host = max;
        self
    }
}

/// Blocking HTTP transport backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// The underlying HTTP client
    http_client: ReqwestClient,
    timeout_seconds: u64,
}

impl HttpTransport {
    /// Creates a transport with default configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtailor::transport::HttpTransport;
    ///
    /// let transport = HttpTransport::new().unwrap();
    /// ```
    pub fn new() -> Result<Self> {
        Self::with_config(TransportConfig::default())
    }

    /// Creates a transport with custom configuration.
    pub fn with_config(config: TransportConfig) -> Result<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .user_agent(concat!("tailor/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TailorError::transport_with_source("Failed to create HTTP client", e))?;

        Ok(Self {
            http_client,
            timeout_seconds: config.timeout_seconds,
        })
    }

    /// Translates a reqwest error into a TailorError.
    fn translate_reqwest_error(&self, error: reqwest::Error, url: &Url) -> TailorError {
        if error.is_timeout() {
            TailorError::transport(format!(
                "Request to {} timed out after {} seconds",
                url, self.timeout_seconds
            ))
        } else if error.is_connect() {
            TailorError::transport_with_source(format!("Failed to connect to {}", url), error)
        } else if error.is_request() {
            TailorError::transport_with_source(format!("Failed to send request to {}", url), error)
        } else {
            TailorError::transport_with_source(
                format!("Network error communicating with {}", url),
                error,
            )
        }
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: Request) -> Result<Response> {
        trace!(url = %request.url, "GET");

        let mut builder = self.http_client.get(request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .map_err(|e| self.translate_reqwest_error(e, &request.url))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = response
            .bytes()
            .map_err(|e| self.translate_reqwest_error(e, &request.url))?;

        trace!(url = %request.url, status, bytes = body.len(), "response");

        Ok(Response {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}
