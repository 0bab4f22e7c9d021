//! Marketplace app feature profiles
//!
//! Packs the set of device/browser capabilities a web app requires into a
//! compact, versioned signature string, and unpacks it again.
//!
//! # Core Concepts
//!
//! - [`FeaturesBitField`]: fixed-size bitfield, base64 and hex-integer views
//! - [`FeatureCatalog`]: the ordered, append-only feature table
//! - [`FeatureProfile`]: catalog key → enabled, in catalog order
//! - [`Signature`]: `<hex>.<limit>.<version>` or `=<base64>.<limit>.<version>`
//!
//! # Example
//!
//! ```rust
//! use mkt_features::{FeatureCatalog, FeatureProfile};
//!
//! let catalog = FeatureCatalog::app();
//! let profile = FeatureProfile::with_enabled(catalog, ["pay", "sms"]);
//!
//! let signature = profile.to_signature();
//! let decoded = FeatureProfile::from_signature(catalog, &signature).unwrap();
//! assert_eq!(decoded, profile);
//! assert!(decoded.has_features(["pay"]));
//! ```

#![warn(unreachable_pub)]

pub mod bitfield;
pub mod catalog;
pub mod config;
pub mod error;
pub mod profile;
pub mod signature;

// Re-exports
pub use bitfield::FeaturesBitField;
pub use catalog::{FeatureCatalog, FeatureSpec, APP_FEATURES, DEFAULT_VERSION};
pub use config::SignatureConfig;
pub use error::{BitFieldError, ConfigError, ProfileError, SignatureError};
pub use profile::FeatureProfile;
pub use signature::{Signature, SignatureForm};

/// Decode either signature form against the production catalog
///
/// # Errors
/// Returns error if the signature is malformed
pub fn profile_from_signature(text: &str) -> Result<FeatureProfile, ProfileError> {
    FeatureProfile::from_signature(FeatureCatalog::app(), text)
}

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with feature profiles
    pub use crate::{
        profile_from_signature, FeatureCatalog, FeatureProfile, FeaturesBitField, Signature,
        SignatureForm,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
