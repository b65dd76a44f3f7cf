//! Result persistence.
//!
//! The result file holds a single envelope whose `execution_metadata` field
//! is itself a JSON document encoded as a string:
//!
//! ```text
//! {"execution_metadata":"{\"cmd\":[\"/bin/sh\"],\"workdir\":\"/app\"}"}
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

#[cfg(test)]
mod tests;

/// The record written to the result file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    /// Serialized payload, as a JSON string
    pub execution_metadata: String,
}

impl ResultEnvelope {
    /// Wraps `payload`, with object keys in sorted order.
    pub fn wrap<T: Serialize + ?Sized>(payload: &T) -> Result<Self> {
        // Value objects are ordered maps; going through one sorts struct
        // fields and map keys alike.
        let value = serde_json::to_value(payload)?;
        Ok(Self {
            execution_metadata: serde_json::to_string(&value)?,
        })
    }
}

/// Writes `payload` to `path` inside a [`ResultEnvelope`].
///
/// Missing parent directories are created. The file is written next to its
/// final location and renamed into place, so readers see either the old
/// file or the complete new one.
///
/// # Examples
///
/// ```no_run
/// use libtailor::writer::save_metadata;
/// use std::collections::BTreeMap;
/// use std::path::Path;
///
/// let mut payload = BTreeMap::new();
/// payload.insert("workdir", "/app");
/// save_metadata(Path::new("/tmp/result/result.json"), &payload).unwrap();
/// ```
pub fn save_metadata<T: Serialize + ?Sized>(path: &Path, payload: &T) -> Result<()> {
    let envelope = ResultEnvelope::wrap(payload)?;
    let mut contents = serde_json::to_vec(&envelope)?;
    contents.push(b'\n');

    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    create_dir_all(parent)?;

    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(&contents)?;
    make_readable(file.as_file())?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;

    debug!(path = %path.display(), bytes = contents.len(), "result written");
    Ok(())
}

/// Reads a result file back and returns the inner JSON string.
pub fn load_metadata(path: &Path) -> Result<String> {
    let contents = fs::read(path)?;
    let envelope: ResultEnvelope = serde_json::from_slice(&contents)?;
    Ok(envelope.execution_metadata)
}

#[cfg(unix)]
fn create_dir_all(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new().recursive(true).mode(0o755).create(dir)
}

#[cfg(not(unix))]
fn create_dir_all(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}

/// Temporary files start out owner-only.
#[cfg(unix)]
fn make_readable(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn make_readable(_file: &fs::File) -> std::io::Result<()> {
    Ok(())
}
