//! Image metadata records.
//!
//! A v1 registry serves one JSON document per image describing how it was
//! built and how a container started from it should run. Top-level keys are
//! lowercase; the embedded container configuration keeps Docker's
//! PascalCase keys.

use crate::error::{Result, TailorError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[cfg(test)]
mod tests;

/// The metadata record of a single image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Immutable image identifier (lowercase hex)
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_config: Option<ContainerConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Runtime configuration used when starting a container
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ContainerConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,

    /// Layer size in bytes
    #[serde(rename = "Size", default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
}

impl ImageMetadata {
    /// Decodes an image JSON document.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtailor::image::ImageMetadata;
    ///
    /// let json = br#"{"id": "8dbd9e392a964056420e5d58ca5cc376ef18e2de93b5cc90e868a1bbc8318c1c",
    ///                 "config": {"Cmd": ["/bin/sh"]}}"#;
    /// let image = ImageMetadata::from_json(json).unwrap();
    /// assert_eq!(image.cmd(), Some(&["/bin/sh".to_string()][..]));
    /// ```
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let image: ImageMetadata = serde_json::from_slice(bytes)
            .map_err(|e| TailorError::malformed_with_source("Failed to parse image JSON", e))?;
        image.validate()?;
        Ok(image)
    }

    fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(TailorError::malformed("image JSON has an empty id"));
        }
        if !self
            .id
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        {
            return Err(TailorError::malformed(format!(
                "image id '{}' is not lowercase hex",
                self.id
            )));
        }
        Ok(())
    }

    /// Returns the default command, if the image declares one.
    pub fn cmd(&self) -> Option<&[String]> {
        self.config.as_ref()?.cmd.as_deref()
    }

    /// Returns the entrypoint, if the image declares one.
    pub fn entrypoint(&self) -> Option<&[String]> {
        self.config.as_ref()?.entrypoint.as_deref()
    }

    /// Returns the working directory, if the image declares a non-empty one.
    pub fn working_dir(&self) -> Option<&str> {
        self.config
            .as_ref()?
            .working_dir
            .as_deref()
            .filter(|dir| !dir.is_empty())
    }
}

/// Container configuration embedded in an image record.
///
/// Fields without a typed counterpart are kept in `extra` so a record can be
/// re-serialized without loss.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmd: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposed_ports: Option<BTreeMap<String, Value>>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
