//! Loading network documents from disk or strings.
//!
//! Accepts YAML (and therefore JSON). The configuration may sit at the top
//! level or under a `network` key, the way cloud-init nests it.

use crate::error::{Error, Result};
use crate::types::NetworkConfig;
use serde_yaml::Value;
use std::path::Path;

/// The only document version this crate understands.
pub const SUPPORTED_VERSION: u64 = 1;

/// Load a network document from a file.
pub fn load(path: &Path) -> Result<NetworkConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(&content)
}

/// Parse a network document from a string.
///
/// The version is checked before the body is decoded, so a version-2
/// document fails with [`Error::UnsupportedVersion`] rather than a schema
/// error about its (differently shaped) contents.
pub fn parse_str(content: &str) -> Result<NetworkConfig> {
    let root: Value = serde_yaml::from_str(content)?;
    let root = root.get("network").cloned().unwrap_or(root);

    let version = root
        .get("version")
        .ok_or(Error::MissingVersion)?
        .as_u64()
        .ok_or(Error::UnsupportedVersion(0))?;
    if version != SUPPORTED_VERSION {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(serde_yaml::from_value(root)?)
}
