//! Signature configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! version = 4
//! form = "base64"
//! ```
//!
//! Missing keys take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::{FeatureCatalog, DEFAULT_VERSION};
use crate::error::ConfigError;
use crate::signature::SignatureForm;

/// How signatures are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignatureConfig {
    /// Version tag appended to every signature
    pub version: u32,
    /// Form used when none is requested explicitly
    pub form: SignatureForm,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION,
            form: SignatureForm::Decimal,
        }
    }
}

impl SignatureConfig {
    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns error if the TOML is invalid or has unknown keys
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), version = config.version, form = %config.form, "loaded signature config");
        Ok(config)
    }

    /// The production catalog tagged with this config's version
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> FeatureCatalog {
        FeatureCatalog::app().with_version(self.version)
    }
}
