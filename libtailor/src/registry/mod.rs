//! Registry location.
//!
//! This module decides which registry serves a repository and turns that
//! registry's host into a [`RegistryEndpoint`]. Nothing here touches the
//! network; the locator works purely on names and URLs, with the default
//! index and insecure hosts supplied through [`Config`].

use crate::config::{Config, DEFAULT_INDEX, is_listed};
use crate::error::{Result, TailorError};
use std::fmt;
use url::Url;

#[cfg(test)]
mod tests;

/// Path prefix of the v1 registry API.
const API_PATH: &str = "/v1/";

/// Host that must never be spelled out in a repository name.
const OFFICIAL_INDEX_HOST: &str = "index.docker.io";

/// Namespace implied for single-segment repository names.
pub const DEFAULT_NAMESPACE: &str = "library";

/// A validated, fully qualified registry API base URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistryEndpoint {
    address: Url,
    secure: bool,
}

impl RegistryEndpoint {
    /// Builds an endpoint from a URL with an `http` or `https` scheme.
    ///
    /// An empty path becomes `/v1/` and the path always gains a trailing
    /// slash so relative API paths can be joined onto it.
    pub fn from_url(mut address: Url) -> Result<Self> {
        let secure = match address.scheme() {
            "https" => true,
            "http" => false,
            other => {
                return Err(TailorError::unreachable_registry(
                    address.as_str(),
                    format!("unsupported scheme '{}'", other),
                ));
            }
        };

        if address.host_str().is_none_or(str::is_empty) {
            return Err(TailorError::unreachable_registry(
                address.as_str(),
                "endpoint has no host",
            ));
        }

        let path = address.path();
        if path.is_empty() || path == "/" {
            address.set_path(API_PATH);
        } else if !path.ends_with('/') {
            let path = format!("{}/", path);
            address.set_path(&path);
        }
        address.set_query(None);
        address.set_fragment(None);

        Ok(Self { address, secure })
    }

    /// Builds the endpoint for a mirror host advertised by an index.
    ///
    /// Mirrors are reached with the same scheme as the index that named them.
    pub fn for_mirror(host: &str, secure: bool) -> Result<Self> {
        let scheme = if secure { "https" } else { "http" };
        parse_endpoint(host, &format!("{}://{}{}", scheme, host, API_PATH))
    }

    /// Returns the base URL, ending in `/`.
    pub fn address(&self) -> &Url {
        &self.address
    }

    /// Returns true for `https` endpoints.
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Returns `host[:port]` of the endpoint.
    pub fn authority(&self) -> String {
        let host = self.address.host_str().unwrap_or_default();
        match self.address.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }

    /// Resolves an API path relative to this endpoint.
    pub fn join(&self, path: &str) -> Result<Url> {
        self.address.join(path).map_err(|e| {
            TailorError::unreachable_registry_with_source(
                self.address.as_str(),
                format!("cannot build URL for '{}'", path),
                e,
            )
        })
    }

    /// Returns the same endpoint over plain HTTP, or `None` if it already is.
    pub fn insecure_variant(&self) -> Option<Self> {
        if !self.secure {
            return None;
        }
        let mut address = self.address.clone();
        address.set_scheme("http").ok()?;
        Some(Self {
            address,
            secure: false,
        })
    }
}

impl fmt::Display for RegistryEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.address.fmt(f)
    }
}

/// Splits repository names into registry and remote name, and expands
/// registry hosts into endpoints.
#[derive(Debug, Clone)]
pub struct RegistryLocator {
    index: String,
    insecure_registries: Vec<String>,
}

impl Default for RegistryLocator {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX, Vec::new())
    }
}

impl RegistryLocator {
    /// Creates a locator with an explicit default index and insecure hosts.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtailor::registry::RegistryLocator;
    ///
    /// let locator = RegistryLocator::new("https://index.docker.io/v1/", vec![]);
    /// let (host, name) = locator.resolve("ubuntu").unwrap();
    /// assert_eq!(host, "https://index.docker.io/v1/");
    /// assert_eq!(name, "ubuntu");
    /// ```
    pub fn new(index: impl Into<String>, insecure_registries: Vec<String>) -> Self {
        Self {
            index: index.into(),
            insecure_registries,
        }
    }

    /// Creates a locator from the registry section of a [`Config`].
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.registry.index.clone(),
            config.registry.insecure_registries.clone(),
        )
    }

    /// Returns the index used for names without a registry host.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Splits `repository` into the registry host serving it and the name
    /// that registry knows it by.
    ///
    /// The first path segment is a registry host only if it contains a `.`
    /// or `:` or is `localhost`; otherwise the default index serves the
    /// whole name.
    pub fn resolve(&self, repository: &str) -> Result<(String, String)> {
        let repository = repository.trim();

        if repository.is_empty() {
            return Err(TailorError::invalid_reference(
                repository,
                "repository name cannot be empty",
            ));
        }
        if repository.contains("://") {
            return Err(TailorError::invalid_reference(
                repository,
                "repository name cannot contain a scheme",
            ));
        }

        let (host, remote_name) = match repository.split_once('/') {
            Some((first, rest)) if looks_like_host(first) => (first, rest),
            _ => {
                validate_remote_name(repository)?;
                return Ok((self.index.clone(), repository.to_string()));
            }
        };

        if host.contains(OFFICIAL_INDEX_HOST) {
            return Err(TailorError::invalid_reference(
                repository,
                format!("try \"{}\" instead", remote_name),
            ));
        }

        validate_remote_name(remote_name)?;
        Ok((host.to_string(), remote_name.to_string()))
    }

    /// Expands a registry host (or full URL) into an endpoint.
    ///
    /// Bare hosts get `https` unless they are listed as insecure. This only
    /// checks that the result is a well-formed URL; reachability is left to
    /// the session handshake.
    pub fn expand_and_verify(&self, host: &str) -> Result<RegistryEndpoint> {
        let host = host.trim();

        if host.is_empty() {
            return Err(TailorError::unreachable_registry(
                host,
                "registry host cannot be empty",
            ));
        }

        if host.contains("://") {
            let url = Url::parse(host).map_err(|e| {
                TailorError::unreachable_registry_with_source(host, "invalid registry URL", e)
            })?;
            return RegistryEndpoint::from_url(url);
        }

        let scheme = if self.is_insecure(host) {
            "http"
        } else {
            "https"
        };
        parse_endpoint(host, &format!("{}://{}{}", scheme, host, API_PATH))
    }

    fn is_insecure(&self, host: &str) -> bool {
        is_listed(&self.insecure_registries, host)
    }
}

fn parse_endpoint(host: &str, candidate: &str) -> Result<RegistryEndpoint> {
    let url = Url::parse(candidate).map_err(|e| {
        TailorError::unreachable_registry_with_source(host, "invalid registry host", e)
    })?;

    // A host with a path, query or credentials would silently change the URL.
    if url.path() != API_PATH || url.query().is_some() || !url.username().is_empty() {
        return Err(TailorError::unreachable_registry(
            host,
            "registry host must be of the form host[:port]",
        ));
    }

    RegistryEndpoint::from_url(url)
}

fn looks_like_host(segment: &str) -> bool {
    segment.contains('.') || segment.contains(':') || segment == "localhost"
}

/// Validates a remote name of the form `[namespace/]repository`.
fn validate_remote_name(name: &str) -> Result<()> {
    let (namespace, repository) = name.split_once('/').unwrap_or((DEFAULT_NAMESPACE, name));

    let valid_namespace = (4..=30).contains(&namespace.len())
        && namespace
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if !valid_namespace {
        return Err(TailorError::invalid_reference(
            name,
            format!(
                "invalid namespace name ({}), only [a-z0-9_] are allowed, size between 4 and 30",
                namespace
            ),
        ));
    }

    let valid_repository = !repository.is_empty()
        && repository.chars().all(|c| {
            c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.')
        });
    if !valid_repository {
        return Err(TailorError::invalid_reference(
            name,
            format!(
                "invalid repository name ({}), only [a-z0-9-_.] are allowed",
                repository
            ),
        ));
    }

    Ok(())
}
