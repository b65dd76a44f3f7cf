//! Error types for Tailor
//!
//! Every stage of a metadata resolution fails with exactly one of these
//! variants. Errors carry the repository, tag or endpoint they concern so a
//! caller can tell which stage failed without inspecting the message.

use thiserror::Error;


type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for Tailor operations
#[derive(Error, Debug)]
pub enum TailorError {
    /// The image reference or repository name is malformed
    #[error("Invalid reference '{reference}': {message}")]
    InvalidReference { reference: String, message: String },

    /// A registry host could not be expanded into a usable endpoint URL
    #[error("Unreachable registry '{host}': {message}")]
    UnreachableRegistry {
        host: String,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// The registry rejected the credentials (401, 403)
    #[error("Authentication error (status: {status_code:?}): {message}")]
    Authentication {
        message: String,
        status_code: Option<u16>,
    },

    /// Connection-level failure or an unexpected HTTP status
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<BoxedSource>,
    },

    /// The index reports no such repository (404)
    #[error("Repository not found: {repository}")]
    RepositoryNotFound { repository: String },

    /// No mirror answered the tag list query
    #[error("Tag list unavailable for {repository}: no endpoint responded")]
    TagListUnavailable {
        repository: String,
        #[source]
        source: Option<Box<TailorError>>,
    },

    /// The tag is absent from the registry's published tag list
    #[error("Unknown tag: {repository}:{tag}")]
    UnknownTag { repository: String, tag: String },

    /// Every mirror failed to serve the image JSON
    #[error("All endpoints failed for {repository} (image {image_id}, {attempts} attempted)")]
    AllEndpointsFailed {
        repository: String,
        image_id: String,
        attempts: usize,
        #[source]
        source: Option<Box<TailorError>>,
    },

    /// A registry answered successfully but the payload could not be decoded
    #[error("Malformed metadata: {message}")]
    MalformedMetadata {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Configuration errors (invalid config file, bad values)
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<String>,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Failed to encode a result record
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Filesystem failure while persisting a result
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for Tailor operations
pub type Result<T> = std::result::Result<T, TailorError>;

impl TailorError {
    /// Creates a new invalid reference error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtailor::error::TailorError;
    ///
    /// let err = TailorError::invalid_reference("Foo/Bar", "uppercase is not allowed");
    /// assert!(matches!(err, TailorError::InvalidReference { .. }));
    /// ```
    pub fn invalid_reference<R: Into<String>, M: Into<String>>(reference: R, message: M) -> Self {
        Self::InvalidReference {
            reference: reference.into(),
            message: message.into(),
        }
    }

    /// Creates a new unreachable registry error.
    pub fn unreachable_registry<H: Into<String>, M: Into<String>>(host: H, message: M) -> Self {
        Self::UnreachableRegistry {
            host: host.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new unreachable registry error with a source error.
    pub fn unreachable_registry_with_source<H, M, E>(host: H, message: M, source: E) -> Self
    where
        H: Into<String>,
        M: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::UnreachableRegistry {
            host: host.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new authentication error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtailor::error::TailorError;
    ///
    /// let err = TailorError::authentication("invalid credentials", Some(401));
    /// assert!(matches!(err, TailorError::Authentication { .. }));
    /// ```
    pub fn authentication<S: Into<String>>(message: S, status_code: Option<u16>) -> Self {
        Self::Authentication {
            message: message.into(),
            status_code,
        }
    }

    /// Creates a new transport error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtailor::error::TailorError;
    ///
    /// let err = TailorError::transport("connection refused");
    /// assert!(matches!(err, TailorError::Transport { .. }));
    /// ```
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
            status_code: None,
            source: None,
        }
    }

    /// Creates a transport error for an unexpected HTTP status.
    pub fn unexpected_status<S: Into<String>>(message: S, status_code: u16) -> Self {
        Self::Transport {
            message: message.into(),
            status_code: Some(status_code),
            source: None,
        }
    }

    /// Creates a new transport error with a source error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtailor::error::TailorError;
    /// use std::io;
    ///
    /// let io_err = io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused");
    /// let err = TailorError::transport_with_source("failed to connect", io_err);
    /// assert!(matches!(err, TailorError::Transport { .. }));
    /// ```
    pub fn transport_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport {
            message: message.into(),
            status_code: None,
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new repository not found error.
    pub fn repository_not_found<S: Into<String>>(repository: S) -> Self {
        Self::RepositoryNotFound {
            repository: repository.into(),
        }
    }

    /// Creates a tag list error, keeping the last failure seen.
    pub fn tag_list_unavailable<S: Into<String>>(
        repository: S,
        last_error: Option<TailorError>,
    ) -> Self {
        Self::TagListUnavailable {
            repository: repository.into(),
            source: last_error.map(Box::new),
        }
    }

    /// Creates a new unknown tag error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtailor::error::TailorError;
    ///
    /// let err = TailorError::unknown_tag("library/ubuntu", "nope");
    /// assert_eq!(err.to_string(), "Unknown tag: library/ubuntu:nope");
    /// ```
    pub fn unknown_tag<R: Into<String>, T: Into<String>>(repository: R, tag: T) -> Self {
        Self::UnknownTag {
            repository: repository.into(),
            tag: tag.into(),
        }
    }

    /// Creates an exhausted-mirrors error, keeping the last failure seen.
    pub fn all_endpoints_failed<R: Into<String>, I: Into<String>>(
        repository: R,
        image_id: I,
        attempts: usize,
        last_error: Option<TailorError>,
    ) -> Self {
        Self::AllEndpointsFailed {
            repository: repository.into(),
            image_id: image_id.into(),
            attempts,
            source: last_error.map(Box::new),
        }
    }

    /// Creates a new malformed metadata error.
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedMetadata {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new malformed metadata error with a source error.
    pub fn malformed_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::MalformedMetadata {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new configuration error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtailor::error::TailorError;
    ///
    /// let err = TailorError::config("invalid config file", Some("/path/to/config.yaml"));
    /// assert!(matches!(err, TailorError::Config { .. }));
    /// ```
    pub fn config<S: Into<String>>(message: S, path: Option<S>) -> Self {
        Self::Config {
            message: message.into(),
            path: path.map(|p| p.into()),
            source: None,
        }
    }

    /// Creates a new configuration error with a source error.
    pub fn config_with_source<S, E>(message: S, path: Option<S>, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            path: path.map(|p| p.into()),
            source: Some(Box::new(source)),
        }
    }

    /// HTTP status attached to the error, if the registry sent one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Authentication { status_code, .. } | Self::Transport { status_code, .. } => {
                *status_code
            }
            _ => None,
        }
    }
}
