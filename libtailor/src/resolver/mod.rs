//! High-level API for Tailor library.
//!
//! [`Resolver`] turns an image reference into the image's metadata record.
//! It locates the registry serving the repository, opens a session, looks
//! the tag up and fetches the image JSON from the first mirror that serves
//! it.
//!
//! # Examples
//!
//! ```no_run
//! use libtailor::{Config, ImageReference, Resolver};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let resolver = Resolver::new(&Config::default())?;
//!
//!     let reference: ImageReference = "ubuntu:14.04".parse()?;
//!     let image = resolver.resolve(&reference)?;
//!     println!("{} -> {}", reference, image.id);
//!
//!     Ok(())
//! }
//! ```

use crate::auth::{AccessTokens, Credentials};
use crate::config::Config;
use crate::error::{Result, TailorError};
use crate::image::ImageMetadata;
use crate::reference::{DEFAULT_TAG, ImageReference};
use crate::registry::{RegistryEndpoint, RegistryLocator};
use crate::session::{RawImageJson, RegistrySession, Session};
use crate::transport::{HttpTransport, Transport, TransportConfig};
use tracing::{debug, info, warn};


/// Resolves image references to image metadata.
///
/// A resolver holds no per-request state; every call opens its own session,
/// so one resolver can serve any number of lookups.
pub struct Resolver<T: Transport = HttpTransport> {
    locator: RegistryLocator,
    transport: T,
    credentials: Credentials,
    allow_insecure_fallback: bool,
}

impl Resolver {
    /// Creates an anonymous resolver speaking HTTP as configured.
    pub fn new(config: &Config) -> Result<Self> {
        Self::builder().with_config(config.clone()).build()
    }

    /// Create a builder for advanced configuration.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use libtailor::{Credentials, Resolver};
    ///
    /// fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let resolver = Resolver::builder()
    ///         .with_credentials(Credentials::basic("user", "pass"))
    ///         .build()?;
    ///     let image = resolver.fetch_metadata("team/app", "1.0")?;
    ///     Ok(())
    /// }
    /// ```
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::new()
    }
}

impl<T: Transport> Resolver<T> {
    /// Returns the locator deciding which registry serves a repository.
    pub fn locator(&self) -> &RegistryLocator {
        &self.locator
    }

    /// Resolves a parsed reference.
    pub fn resolve(&self, reference: &ImageReference) -> Result<ImageMetadata> {
        self.fetch_metadata(reference.repository(), reference.tag())
    }

    /// Fetches the metadata of `repository:tag`.
    ///
    /// An empty `tag` means `latest`.
    ///
    /// # Errors
    ///
    /// Fails with the error of the first stage that fails: name resolution,
    /// session handshake, repository data, tag list, tag lookup
    /// (`UnknownTag`), image JSON on every mirror (`AllEndpointsFailed`) or
    /// decoding (`MalformedMetadata`).
    pub fn fetch_metadata(&self, repository: &str, tag: &str) -> Result<ImageMetadata> {
        let tag = if tag.is_empty() { DEFAULT_TAG } else { tag };

        let (host, remote_name) = self.locator.resolve(repository)?;
        let endpoint = self.locator.expand_and_verify(&host)?;
        info!(repository, tag, %endpoint, "resolving image metadata");

        let session = RegistrySession::open(
            &self.credentials,
            &self.transport,
            endpoint,
            self.allow_insecure_fallback,
        )?;

        fetch_with_session(&session, &remote_name, tag)
    }
}

/// Runs the repository, tag and image stages against an open session.
pub(crate) fn fetch_with_session<S: Session + ?Sized>(
    session: &S,
    repository: &str,
    tag: &str,
) -> Result<ImageMetadata> {
    let data = session.repository_data(repository)?;
    let tags = session.remote_tags(&data.endpoints, repository, &data.tokens)?;

    let image_id = tags
        .get(tag)
        .ok_or_else(|| TailorError::unknown_tag(repository, tag))?;
    debug!(repository, tag, image_id = %image_id, "tag resolved");

    let raw = fetch_image_json(session, repository, image_id, &data.endpoints, &data.tokens)?;
    let image = ImageMetadata::from_json(&raw.body)?;

    info!(repository, tag, image_id = %image.id, size = ?raw.size, "image metadata fetched");
    Ok(image)
}

/// Asks each mirror in turn for the image JSON; the first answer wins.
fn fetch_image_json<S: Session + ?Sized>(
    session: &S,
    repository: &str,
    image_id: &str,
    mirrors: &[RegistryEndpoint],
    tokens: &AccessTokens,
) -> Result<RawImageJson> {
    let mut last_error = None;

    for mirror in mirrors {
        match session.remote_image_json(image_id, mirror, tokens) {
            Ok(raw) => {
                debug!(%mirror, image_id, "mirror served image JSON");
                return Ok(raw);
            }
            Err(err) => {
                warn!(%mirror, image_id, error = %err, "image JSON fetch failed, trying next");
                last_error = Some(err);
            }
        }
    }

    Err(TailorError::all_endpoints_failed(
        repository,
        image_id,
        mirrors.len(),
        last_error,
    ))
}

/// Builder for creating a [`Resolver`] with custom configuration.
#[derive(Debug, Default)]
pub struct ResolverBuilder {
    config: Option<Config>,
    credentials: Option<Credentials>,
}

impl ResolverBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set configuration directly.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Set credentials presented to the index.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Build a resolver using the HTTP transport described by the config.
    pub fn build(self) -> Result<Resolver> {
        let network = self.config.as_ref().map(|c| c.network.clone()).unwrap_or_default();
        let transport = HttpTransport::with_config(TransportConfig::from(&network))?;
        Ok(self.build_with_transport(transport))
    }

    /// Build a resolver on top of an existing transport.
    pub fn build_with_transport<T: Transport>(self, transport: T) -> Resolver<T> {
        let config = self.config.unwrap_or_default();

        Resolver {
            locator: RegistryLocator::from_config(&config),
            transport,
            credentials: self.credentials.unwrap_or_default(),
            allow_insecure_fallback: config.registry.allow_insecure_fallback,
        }
    }
}
