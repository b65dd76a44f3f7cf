//! Registry sessions.
//!
//! A session is an authenticated conversation with one registry index about
//! one repository. It asks the index where the repository is served from
//! (its mirrors) and for access tokens, then queries those mirrors for the
//! tag list and for individual image records.
//!
//! Sessions speak the v1 registry protocol:
//!
//! - `GET /v1/_ping` to check the endpoint and the credentials
//! - `GET /v1/repositories/<name>/images` for tokens and mirrors
//! - `GET /v1/repositories/<name>/tags` for the tag list
//! - `GET /v1/images/<id>/json` for an image record

use crate::auth::{AccessTokens, Credentials};
use crate::error::{Result, TailorError};
use crate::registry::{DEFAULT_NAMESPACE, RegistryEndpoint};
use crate::transport::{Request, Response, Transport};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};


const TOKEN_HEADER: &str = "X-Docker-Token";
const ENDPOINTS_HEADER: &str = "X-Docker-Endpoints";
const STANDALONE_HEADER: &str = "X-Docker-Registry-Standalone";
const SIZE_HEADER: &str = "X-Docker-Size";

/// Mapping from tag name to image identifier.
pub type TagMap = BTreeMap<String, String>;

/// One entry of the repository image list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageSummary {
    pub id: String,
    #[serde(default)]
    pub checksum: Option<String>,
}

/// What the index knows about a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryData {
    /// Mirrors serving the repository, in the index's order of preference
    pub endpoints: Vec<RegistryEndpoint>,
    /// Tokens to present to the mirrors
    pub tokens: AccessTokens,
    /// Images published in the repository
    pub images: Vec<ImageSummary>,
}

/// An image record as served by a mirror, not yet decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImageJson {
    pub body: Vec<u8>,
    /// Layer size from the `X-Docker-Size` header, when sent
    pub size: Option<u64>,
}

/// The operations a resolution needs from a registry session.
pub trait Session {
    /// Fetches tokens and mirrors for `repository` from the index.
    fn repository_data(&self, repository: &str) -> Result<RepositoryData>;

    /// Fetches the tag list from the first mirror that answers.
    fn remote_tags(
        &self,
        mirrors: &[RegistryEndpoint],
        repository: &str,
        tokens: &AccessTokens,
    ) -> Result<TagMap>;

    /// Fetches one image record from exactly one mirror.
    fn remote_image_json(
        &self,
        image_id: &str,
        mirror: &RegistryEndpoint,
        tokens: &AccessTokens,
    ) -> Result<RawImageJson>;
}

/// A v1 registry session bound to one index endpoint.
pub struct RegistrySession<'a, T: Transport + ?Sized> {
    transport: &'a T,
    credentials: &'a Credentials,
    endpoint: RegistryEndpoint,
    standalone: bool,
}

impl<'a, T: Transport + ?Sized> RegistrySession<'a, T> {
    /// Opens a session by pinging `endpoint` with `credentials`.
    ///
    /// When the endpoint is HTTPS and cannot be reached at all, and
    /// `allow_insecure_fallback` is set, the ping is repeated once over plain
    /// HTTP and the session continues on that endpoint.
    ///
    /// # Errors
    ///
    /// - `Authentication` if the registry rejects the credentials
    /// - `Transport` if the registry cannot be reached or answers with an
    ///   unexpected status
    pub fn open(
        credentials: &'a Credentials,
        transport: &'a T,
        endpoint: RegistryEndpoint,
        allow_insecure_fallback: bool,
    ) -> Result<Self> {
        let err = match ping(transport, credentials, &endpoint) {
            Ok(standalone) => {
                return Ok(Self {
                    transport,
                    credentials,
                    endpoint,
                    standalone,
                });
            }
            Err(err) => err,
        };

        // Only a missing response justifies trying plain HTTP.
        let unreachable = matches!(err, TailorError::Transport { status_code: None, .. });
        let insecure = match endpoint.insecure_variant() {
            Some(insecure) if unreachable && allow_insecure_fallback => insecure,
            _ => return Err(err),
        };

        warn!(endpoint = %endpoint, error = %err, "HTTPS endpoint unreachable, trying HTTP");
        match ping(transport, credentials, &insecure) {
            Ok(standalone) => Ok(Self {
                transport,
                credentials,
                endpoint: insecure,
                standalone,
            }),
            Err(fallback_err) => {
                debug!(endpoint = %insecure, error = %fallback_err, "HTTP fallback failed");
                Err(err)
            }
        }
    }

    /// Returns the index endpoint this session talks to.
    pub fn endpoint(&self) -> &RegistryEndpoint {
        &self.endpoint
    }

    /// Returns true if the registry declared itself standalone.
    pub fn is_standalone(&self) -> bool {
        self.standalone
    }

    /// Unusable entries are skipped; the index serves the repository itself
    /// when no entry is left.
    fn mirrors_from(&self, response: &Response) -> Vec<RegistryEndpoint> {
        let mut mirrors = Vec::new();
        for value in response.header_values(ENDPOINTS_HEADER) {
            for host in value.split(',').map(str::trim).filter(|h| !h.is_empty()) {
                match RegistryEndpoint::for_mirror(host, self.endpoint.is_secure()) {
                    Ok(mirror) => mirrors.push(mirror),
                    Err(err) => warn!(mirror = host, error = %err, "ignoring unusable mirror"),
                }
            }
        }

        if mirrors.is_empty() {
            mirrors.push(self.endpoint.clone());
        }
        mirrors
    }
}

impl<T: Transport + ?Sized> Session for RegistrySession<'_, T> {
    fn repository_data(&self, repository: &str) -> Result<RepositoryData> {
        let url = self
            .endpoint
            .join(&format!("repositories/{}/images", repository))?;
        debug!(%url, "fetching repository data");

        let request = Request::get(url.clone())
            .header(TOKEN_HEADER, "true")
            .header_opt("Authorization", self.credentials.to_header_value());
        let response = self.transport.execute(request)?;

        if response.status == 404 {
            return Err(TailorError::repository_not_found(repository));
        }
        if !response.is_success() {
            return Err(status_error(&response, url.as_str()));
        }

        let tokens = AccessTokens::new(response.header_values(TOKEN_HEADER));
        let endpoints = self.mirrors_from(&response);

        let images = if response.body.iter().all(u8::is_ascii_whitespace) {
            Vec::new()
        } else {
            serde_json::from_slice(&response.body).map_err(|e| {
                TailorError::malformed_with_source(
                    format!("Failed to parse image list of {}", repository),
                    e,
                )
            })?
        };

        debug!(
            repository,
            mirrors = endpoints.len(),
            tokens = !tokens.is_empty(),
            "repository data received"
        );

        Ok(RepositoryData {
            endpoints,
            tokens,
            images,
        })
    }

    fn remote_tags(
        &self,
        mirrors: &[RegistryEndpoint],
        repository: &str,
        tokens: &AccessTokens,
    ) -> Result<TagMap> {
        let repository = qualified_name(repository);
        let mut last_error = None;

        for mirror in mirrors {
            let url = mirror.join(&format!("repositories/{}/tags", repository))?;
            let request =
                Request::get(url.clone()).header_opt("Authorization", tokens.to_header_value());

            let response = match self.transport.execute(request) {
                Ok(response) => response,
                Err(err) => {
                    warn!(mirror = %mirror, error = %err, "tag list request failed");
                    last_error = Some(err);
                    continue;
                }
            };

            if !response.is_success() {
                let err = status_error(&response, url.as_str());
                debug!(mirror = %mirror, error = %err, "mirror has no tag list");
                last_error = Some(err);
                continue;
            }

            return parse_tags(&response.body, &repository);
        }

        Err(TailorError::tag_list_unavailable(repository, last_error))
    }

    fn remote_image_json(
        &self,
        image_id: &str,
        mirror: &RegistryEndpoint,
        tokens: &AccessTokens,
    ) -> Result<RawImageJson> {
        let url = mirror.join(&format!("images/{}/json", image_id))?;
        debug!(%url, "fetching image JSON");

        let request =
            Request::get(url.clone()).header_opt("Authorization", tokens.to_header_value());
        let response = self.transport.execute(request)?;

        if !response.is_success() {
            return Err(status_error(&response, url.as_str()));
        }

        let size = response
            .header(SIZE_HEADER)
            .and_then(|s| s.trim().parse::<u64>().ok());

        Ok(RawImageJson {
            body: response.body,
            size,
        })
    }
}

fn ping<T: Transport + ?Sized>(
    transport: &T,
    credentials: &Credentials,
    endpoint: &RegistryEndpoint,
) -> Result<bool> {
    let url = endpoint.join("_ping")?;
    debug!(%url, "pinging registry");

    let request =
        Request::get(url.clone()).header_opt("Authorization", credentials.to_header_value());
    let response = transport.execute(request)?;

    if !response.is_success() {
        return Err(status_error(&response, url.as_str()));
    }

    Ok(response
        .header(STANDALONE_HEADER)
        .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1"))
}

/// Classifies a non-2xx response.
fn status_error(response: &Response, url: &str) -> TailorError {
    match response.status {
        401 | 403 => TailorError::authentication(
            format!("Access denied for {}: {}", url, response.text().trim()),
            Some(response.status),
        ),
        status => TailorError::unexpected_status(format!("HTTP {} from {}", status, url), status),
    }
}

/// Official images live under the `library` namespace on mirrors.
fn qualified_name(repository: &str) -> String {
    if repository.contains('/') {
        repository.to_string()
    } else {
        format!("{}/{}", DEFAULT_NAMESPACE, repository)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TagsPayload {
    Map(TagMap),
    List(Vec<TagEntry>),
}

/// Tag list entry in the older list-shaped response.
#[derive(Deserialize)]
struct TagEntry {
    name: String,
    layer: String,
}

fn parse_tags(body: &[u8], repository: &str) -> Result<TagMap> {
    let payload: TagsPayload = serde_json::from_slice(body).map_err(|e| {
        TailorError::malformed_with_source(format!("Failed to parse tag list of {}", repository), e)
    })?;

    let tags: TagMap = match payload {
        TagsPayload::Map(tags) => tags,
        TagsPayload::List(entries) => entries.into_iter().map(|e| (e.name, e.layer)).collect(),
    };

    // Image ids become URL path segments.
    if let Some((tag, id)) = tags
        .iter()
        .find(|(_, id)| id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()))
    {
        return Err(TailorError::malformed(format!(
            "tag '{}' of {} points at invalid image id '{}'",
            tag, repository, id
        )));
    }

    Ok(tags)
}
