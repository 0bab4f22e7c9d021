//! Feature profiles
//!
//! A [`FeatureProfile`] maps every catalog key to a boolean, in catalog
//! order. It is built from explicit flags or decoded from a signature, and
//! serialized back to either signature form.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::bitfield::FeaturesBitField;
use crate::catalog::FeatureCatalog;
use crate::error::ProfileError;
use crate::signature::{Signature, SignatureForm};

/// Ordered key → enabled mapping over a [`FeatureCatalog`]
///
/// Always holds exactly one entry per catalog feature.
#[derive(Debug, Clone)]
pub struct FeatureProfile {
    catalog: FeatureCatalog,
    values: IndexMap<String, bool>,
}

impl FeatureProfile {
    /// All features disabled
    #[must_use]
    pub fn new(catalog: FeatureCatalog) -> Self {
        Self::with_defaults(catalog, false, std::iter::empty::<(&str, bool)>())
    }

    /// Every feature set to `default`, except those named in `overrides`
    ///
    /// Override keys outside the catalog are ignored.
    #[must_use]
    pub fn with_defaults<K, I>(catalog: FeatureCatalog, default: bool, overrides: I) -> Self
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, bool)>,
    {
        let mut values: IndexMap<String, bool> =
            catalog.keys().map(|key| (key, default)).collect();
        for (key, value) in overrides {
            let key = key.as_ref();
            match values.get_mut(key) {
                Some(slot) => *slot = value,
                None => tracing::warn!(key, "ignoring override for unknown feature"),
            }
        }
        Self { catalog, values }
    }

    /// Only the named features enabled
    #[must_use]
    pub fn with_enabled<K, I>(catalog: FeatureCatalog, enabled: I) -> Self
    where
        K: AsRef<str>,
        I: IntoIterator<Item = K>,
    {
        Self::with_defaults(catalog, false, enabled.into_iter().map(|k| (k, true)))
    }

    /// Decode an integer bitmask over the first `limit` features
    ///
    /// Most significant bit first relative to `limit`: catalog position `i`
    /// is bit `limit - 1 - i` of `mask`. Bits the mask does not have read as
    /// false. `limit` defaults to the catalog length.
    #[must_use]
    pub fn from_int(catalog: FeatureCatalog, mask: &FeaturesBitField, limit: Option<usize>) -> Self {
        let limit = limit.unwrap_or(catalog.len());
        let mut profile = Self::new(catalog);
        for (i, value) in profile
            .values
            .values_mut()
            .take(limit)
            .enumerate()
        {
            let bit = limit - 1 - i;
            *value = bit < mask.size() && mask.get(bit);
        }
        profile
    }

    /// Assign the first `limit` features from `values`, in natural order
    ///
    /// Features past `limit` or past the end of `values` stay disabled.
    #[must_use]
    pub fn from_list(catalog: FeatureCatalog, values: &[bool], limit: Option<usize>) -> Self {
        let limit = limit.unwrap_or(catalog.len());
        let mut profile = Self::new(catalog);
        for (slot, &value) in profile.values.values_mut().take(limit).zip(values) {
            *slot = value;
        }
        profile
    }

    /// Decode `<hex>.<limit>.<version>`
    ///
    /// # Errors
    /// Returns error if the signature is malformed
    pub fn from_decimal_signature(catalog: FeatureCatalog, text: &str) -> Result<Self, ProfileError> {
        Ok(Self::from_parsed(catalog, &Signature::parse_decimal(text)?))
    }

    /// Decode `=<base64>.<limit>.<version>`
    ///
    /// # Errors
    /// Returns error if the signature is malformed or the payload is shorter
    /// than `limit` bits
    pub fn from_base64_signature(catalog: FeatureCatalog, text: &str) -> Result<Self, ProfileError> {
        Ok(Self::from_parsed(catalog, &Signature::parse_base64(text)?))
    }

    /// Decode either signature form, chosen by the leading `=`
    ///
    /// # Errors
    /// Returns error if the signature is malformed
    pub fn from_signature(catalog: FeatureCatalog, text: &str) -> Result<Self, ProfileError> {
        Ok(Self::from_parsed(catalog, &text.parse()?))
    }

    /// Build from an already-parsed signature
    #[must_use]
    pub fn from_parsed(catalog: FeatureCatalog, signature: &Signature) -> Self {
        tracing::debug!(
            form = %signature.form(),
            limit = signature.limit(),
            version = signature.version(),
            catalog_len = catalog.len(),
            "decoding feature signature"
        );
        if signature.limit() > catalog.len() {
            tracing::debug!(
                limit = signature.limit(),
                catalog_len = catalog.len(),
                "signature covers features unknown to this catalog"
            );
        }
        match signature.form() {
            SignatureForm::Decimal => {
                Self::from_int(catalog, signature.payload(), Some(signature.limit()))
            }
            SignatureForm::Base64 => Self::from_list(
                catalog,
                &signature.payload().to_list(),
                Some(signature.limit()),
            ),
        }
    }

    /// Inverse of [`from_int`](Self::from_int) over the whole profile
    ///
    /// The first catalog feature lands in the most significant bit.
    #[must_use]
    pub fn to_int(&self) -> FeaturesBitField {
        let n = self.values.len();
        let mut mask = FeaturesBitField::new(n);
        for (i, &value) in self.values.values().enumerate() {
            if value {
                mask.set(n - 1 - i, true);
            }
        }
        mask
    }

    /// Parsed form of [`to_signature`](Self::to_signature) or
    /// [`to_base64_signature`](Self::to_base64_signature)
    #[must_use]
    pub fn signature(&self, form: SignatureForm) -> Signature {
        let payload = match form {
            SignatureForm::Decimal => self.to_int(),
            SignatureForm::Base64 => {
                FeaturesBitField::from_list(&self.values.values().copied().collect::<Vec<_>>())
            }
        };
        Signature::new(
            form,
            payload,
            self.values.len(),
            self.catalog.version().to_string(),
        )
    }

    /// `<hex>.<catalog size>.<version>`
    #[must_use]
    pub fn to_signature(&self) -> String {
        self.signature(SignatureForm::Decimal).to_string()
    }

    /// `=<base64>.<catalog size>.<version>`
    #[must_use]
    pub fn to_base64_signature(&self) -> String {
        self.signature(SignatureForm::Base64).to_string()
    }

    /// Keys of enabled features, in catalog order
    #[must_use]
    pub fn to_list(&self) -> Vec<&str> {
        self.values
            .iter()
            .filter(|(_, &enabled)| enabled)
            .map(|(key, _)| key.as_str())
            .collect()
    }

    /// Display names of enabled features, in catalog order
    #[must_use]
    pub fn to_names(&self) -> Vec<&'static str> {
        self.catalog
            .iter()
            .zip(self.values.values())
            .filter(|(_, &enabled)| enabled)
            .map(|(feature, _)| feature.name)
            .collect()
    }

    /// `prefix + key → false` for every disabled feature
    ///
    /// Feeds exclusion filters: anything requiring a feature this profile
    /// lacks must not match.
    #[must_use]
    pub fn to_kwargs(&self, prefix: &str) -> IndexMap<String, bool> {
        self.values
            .iter()
            .filter(|(_, &enabled)| !enabled)
            .map(|(key, _)| (format!("{prefix}{key}"), false))
            .collect()
    }

    /// True iff every required key is present and enabled
    #[must_use]
    pub fn has_features<K, I>(&self, required: I) -> bool
    where
        K: AsRef<str>,
        I: IntoIterator<Item = K>,
    {
        required
            .into_iter()
            .all(|key| self.values.get(key.as_ref()).copied().unwrap_or(false))
    }

    /// Value of one feature, `None` if the key is not in the catalog
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<bool> {
        self.values.get(key).copied()
    }

    /// Enable or disable one feature
    ///
    /// # Errors
    /// Returns error if the key is not in the catalog
    pub fn set(&mut self, key: &str, value: bool) -> Result<(), ProfileError> {
        let slot = self
            .values
            .get_mut(key)
            .ok_or_else(|| ProfileError::UnknownFeature(key.to_string()))?;
        *slot = value;
        Ok(())
    }

    /// `(key, enabled)` pairs in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.values.iter().map(|(k, &v)| (k.as_str(), v))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn catalog(&self) -> FeatureCatalog {
        self.catalog
    }
}

impl Default for FeatureProfile {
    fn default() -> Self {
        Self::new(FeatureCatalog::app())
    }
}

impl PartialEq for FeatureProfile {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Eq for FeatureProfile {}

impl Serialize for FeatureProfile {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.values.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FeatureSpec;
    use crate::error::SignatureError;

    static TRIO: &[FeatureSpec] = &[
        FeatureSpec::new("APPS", "App Management API", ""),
        FeatureSpec::new("PAY", "Web Payment", ""),
        FeatureSpec::new("SMS", "WebSMS", ""),
    ];

    fn trio() -> FeatureCatalog {
        FeatureCatalog::new(TRIO, 3)
    }

    #[test]
    fn new_profile_has_every_key_in_order() {
        let profile = FeatureProfile::new(trio());
        let keys: Vec<&str> = profile.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["apps", "pay", "sms"]);
        assert!(profile.to_list().is_empty());
    }

    #[test]
    fn defaults_and_overrides() {
        let profile = FeatureProfile::with_defaults(trio(), true, [("sms", false), ("warp", true)]);
        assert_eq!(profile.to_list(), vec!["apps", "pay"]);
        assert_eq!(profile.len(), 3);
        assert_eq!(profile.get("warp"), None);
    }

    #[test]
    fn pay_only_signature() {
        let profile = FeatureProfile::with_enabled(trio(), ["pay"]);
        assert_eq!(profile.to_list(), vec!["pay"]);
        assert_eq!(profile.to_signature(), "2.3.3");
        assert_eq!(
            FeatureProfile::from_decimal_signature(trio(), "2.3.3").unwrap(),
            profile
        );
    }

    #[test]
    fn decimal_form_is_msb_first() {
        let profile = FeatureProfile::with_enabled(trio(), ["apps"]);
        assert_eq!(profile.to_int().to_u128(), Some(0b100));
        assert_eq!(profile.to_signature(), "4.3.3");
    }

    #[test]
    fn base64_form_is_lsb_first() {
        // Same profile as above; the base64 byte has bit 0 set, not bit 2
        let profile = FeatureProfile::with_enabled(trio(), ["apps"]);
        assert_eq!(profile.to_base64_signature(), "=AQ==.3.3");
        assert_eq!(
            FeatureProfile::from_base64_signature(trio(), "=AQ==.3.3").unwrap(),
            profile
        );
    }

    #[test]
    fn from_int_respects_limit() {
        // Signature issued when the catalog only had "apps" and "pay"
        let mask = FeaturesBitField::from_u128(0b01);
        let profile = FeatureProfile::from_int(trio(), &mask, Some(2));
        assert_eq!(profile.to_list(), vec!["pay"]);
    }

    #[test]
    fn from_int_with_narrow_mask() {
        let mask = FeaturesBitField::from_hex("1").unwrap();
        let profile = FeatureProfile::from_int(trio(), &mask, None);
        assert_eq!(profile.to_list(), vec!["sms"]);
    }

    #[test]
    fn from_list_natural_order() {
        let profile = FeatureProfile::from_list(trio(), &[true, false, true], None);
        assert_eq!(profile.to_list(), vec!["apps", "sms"]);

        let limited = FeatureProfile::from_list(trio(), &[true, true, true], Some(1));
        assert_eq!(limited.to_list(), vec!["apps"]);
    }

    #[test]
    fn from_signature_dispatches_on_prefix() {
        let decimal = FeatureProfile::from_signature(trio(), "1.3.3").unwrap();
        let base64 = FeatureProfile::from_signature(trio(), "=BA==.3.3").unwrap();
        assert_eq!(decimal.to_list(), vec!["sms"]);
        assert_eq!(base64.to_list(), vec!["sms"]);
    }

    #[test]
    fn malformed_signature_is_an_error() {
        let err = FeatureProfile::from_signature(trio(), "2.3").unwrap_err();
        assert!(matches!(
            err,
            ProfileError::Signature(SignatureError::WrongFieldCount { found: 2, .. })
        ));
    }

    #[test]
    fn kwargs_lists_disabled_features() {
        let profile = FeatureProfile::with_enabled(trio(), ["pay"]);
        let kwargs = profile.to_kwargs("features.has_");
        let keys: Vec<&str> = kwargs.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["features.has_apps", "features.has_sms"]);
        assert!(kwargs.values().all(|v| !v));
    }

    #[test]
    fn has_features_requires_all() {
        let profile = FeatureProfile::with_enabled(trio(), ["apps", "sms"]);
        assert!(profile.has_features(["apps"]));
        assert!(profile.has_features(["apps", "sms"]));
        assert!(profile.has_features(Vec::<&str>::new()));
        assert!(!profile.has_features(["apps", "pay"]));
        assert!(!profile.has_features(["teleport"]));
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut profile = FeatureProfile::new(trio());
        profile.set("sms", true).unwrap();
        assert_eq!(profile.get("sms"), Some(true));
        assert_eq!(
            profile.set("teleport", true),
            Err(ProfileError::UnknownFeature("teleport".into()))
        );
    }

    #[test]
    fn names_follow_catalog() {
        let profile = FeatureProfile::with_enabled(trio(), ["sms", "apps"]);
        assert_eq!(profile.to_names(), vec!["App Management API", "WebSMS"]);
    }

    #[test]
    fn serializes_as_ordered_map() {
        let profile = FeatureProfile::with_enabled(trio(), ["pay"]);
        let json = serde_json::to_string(&profile).unwrap();
        assert_eq!(json, r#"{"apps":false,"pay":true,"sms":false}"#);
    }
}
