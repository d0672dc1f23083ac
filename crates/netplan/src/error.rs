//! Error types for loading network configuration documents.
//!
//! Every variant here is a configuration error: the document could not be
//! read, decoded, or is of a shape this crate does not understand. Callers
//! treat all of them as fatal before touching the host.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or interpreting a network document.
#[derive(Debug, Error)]
pub enum Error {
    /// The document file could not be read
    #[error("could not read {}: {source}", path.display())]
    Read {
        /// Path that was being read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid YAML/JSON or does not match the schema
    #[error("invalid network document: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The document has no top-level `version` field
    #[error("network document has no version field")]
    MissingVersion,

    /// The document declares a version other than 1
    #[error("unsupported network config version {0} (only version 1 is supported)")]
    UnsupportedVersion(u64),

    /// An address or network could not be parsed as CIDR
    #[error("invalid CIDR '{value}': {reason}")]
    InvalidCidr {
        /// The offending text
        value: String,
        /// Why it was rejected
        reason: String,
    },
}

impl Error {
    pub(crate) fn invalid_cidr(value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidCidr {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for network document operations.
pub type Result<T> = std::result::Result<T, Error>;
