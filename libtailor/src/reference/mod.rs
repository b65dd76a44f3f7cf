//! Image reference parsing.
//!
//! A reference arrives in one of two shapes: a `docker://` URL whose
//! fragment carries the tag, or a bare `name[:tag]` string. Both shapes
//! resolve to an [`ImageReference`] whose tag is never empty.

use crate::error::{Result, TailorError};
use std::fmt;
use std::str::FromStr;
use url::Url;


/// Tag used whenever a reference does not name one.
pub const DEFAULT_TAG: &str = "latest";

/// URL scheme that selects the URL surface form.
pub const DOCKER_SCHEME: &str = "docker";

/// A canonical (repository, tag) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageReference {
    repository: String,
    tag: String,
}

impl ImageReference {
    /// Creates a reference, substituting [`DEFAULT_TAG`] for an empty tag.
    pub fn new(repository: impl Into<String>, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self {
            repository: repository.into(),
            tag: if tag.is_empty() {
                DEFAULT_TAG.to_string()
            } else {
                tag
            },
        }
    }

    /// Parses a `docker://[host[:port]]/path[#tag]` URL.
    ///
    /// The authority, when present, is kept as the leading repository
    /// segment. Without one, a single leading `/` is stripped from the path.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtailor::reference::ImageReference;
    /// use url::Url;
    ///
    /// let url = Url::parse("docker://example.com/foo/bar#v2").unwrap();
    /// let reference = ImageReference::from_docker_url(&url);
    /// assert_eq!(reference.repository(), "example.com/foo/bar");
    /// assert_eq!(reference.tag(), "v2");
    /// ```
    pub fn from_docker_url(url: &Url) -> Self {
        let tag = url.fragment().unwrap_or_default();

        let authority = url
            .host_str()
            .filter(|host| !host.is_empty())
            .map(|host| match url.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            });

        let repository = match authority {
            Some(authority) => format!("{}{}", authority, url.path()),
            None => {
                let path = url.path();
                path.strip_prefix('/').unwrap_or(path).to_string()
            }
        };

        Self::new(repository, tag)
    }

    /// Parses a bare `name[:tag]` reference.
    ///
    /// The text after the last `:` is a tag only when it holds no `/`;
    /// otherwise that colon separates a registry host from its port.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtailor::reference::ImageReference;
    ///
    /// let reference = ImageReference::from_reference("localhost:5000/team/app");
    /// assert_eq!(reference.repository(), "localhost:5000/team/app");
    /// assert_eq!(reference.tag(), "latest");
    /// ```
    pub fn from_reference(reference: &str) -> Self {
        match reference.rsplit_once(':') {
            Some((repository, tag)) if !tag.contains('/') => Self::new(repository, tag),
            _ => Self::new(reference, ""),
        }
    }

    /// Returns the repository name, including any registry host segment.
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Returns the tag. Never empty.
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl FromStr for ImageReference {
    type Err = TailorError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.starts_with(&format!("{}://", DOCKER_SCHEME)) {
            let url = Url::parse(s).map_err(|e| {
                TailorError::invalid_reference(s, format!("not a valid docker URL: {}", e))
            })?;
            return Ok(Self::from_docker_url(&url));
        }

        Ok(Self::from_reference(s))
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}
