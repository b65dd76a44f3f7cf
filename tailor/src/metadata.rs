//! The execution-relevant slice of an image's metadata.

use libtailor::ImageMetadata;
use serde::Serialize;

/// What a container started from the image runs, and where.
///
/// Empty fields are left out of the serialized record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionMetadata {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cmd: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entrypoint: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub workdir: Option<String>,
}

impl From<&ImageMetadata> for ExecutionMetadata {
    fn from(image: &ImageMetadata) -> Self {
        Self {
            cmd: image.cmd().map(<[String]>::to_vec).unwrap_or_default(),
            entrypoint: image.entrypoint().map(<[String]>::to_vec).unwrap_or_default(),
            workdir: image.working_dir().map(str::to_string),
        }
    }
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;
