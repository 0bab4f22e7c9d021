//! Error types for feature profiles and their signatures
//!
//! Every fallible operation in this crate surfaces one of these at the
//! parse boundary. Nothing is recovered internally; translating an error
//! into a user-facing message is the caller's job.

use std::num::ParseIntError;
use std::path::PathBuf;

/// Errors building a [`FeaturesBitField`](crate::FeaturesBitField) from external data
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BitFieldError {
    /// Fewer bytes than the requested bit count needs
    #[error("bitfield of {size} bits needs {expected} bytes, got {actual}")]
    Truncated {
        size: usize,
        expected: usize,
        actual: usize,
    },

    /// Hex integer text was empty or contained a non-hex digit
    #[error("invalid hex integer: '{0}'")]
    InvalidHex(String),

    /// Base64 payload could not be decoded
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Errors parsing a signature string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// Not exactly three dot-separated fields
    #[error("signature must have 3 dot-separated fields, found {found}: '{signature}'")]
    WrongFieldCount { signature: String, found: usize },

    /// Limit field is not a decimal integer
    #[error("invalid feature limit '{value}': {source}")]
    InvalidLimit {
        value: String,
        #[source]
        source: ParseIntError,
    },

    /// Version field is empty or not decimal digits
    #[error("invalid version tag: '{0}'")]
    InvalidVersion(String),

    /// Payload field failed to decode
    #[error("invalid payload: {0}")]
    Payload(#[from] BitFieldError),
}

/// Errors manipulating a [`FeatureProfile`](crate::FeatureProfile)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    /// Key is not part of the catalog
    #[error("unknown feature: '{0}'")]
    UnknownFeature(String),

    /// Signature text was malformed
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

/// Errors loading a [`SignatureConfig`](crate::SignatureConfig)
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading the config file
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML did not match the config schema
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
