//! Signature strings
//!
//! Two textual forms carry a packed profile:
//!
//! - decimal: `<hex-integer>.<limit>.<version>`
//! - base64:  `=<base64-bytes>.<limit>.<version>`
//!
//! The leading `=` tells them apart. `limit` is how many catalog features
//! (from the start) were encoded; `version` is carried along untouched.
//!
//! The two payloads use different bit orders. The hex integer puts catalog
//! position 0 in its most significant bit (relative to `limit`); the base64
//! bytes put position 0 in bit 0 of byte 0. Both are in circulation and
//! neither may be changed.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bitfield::FeaturesBitField;
use crate::error::SignatureError;

/// Marks the base64 form
pub const BASE64_PREFIX: char = '=';

/// Which textual form a signature uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureForm {
    /// `<hex>.<limit>.<version>`
    #[default]
    Decimal,
    /// `=<base64>.<limit>.<version>`
    Base64,
}

impl SignatureForm {
    /// Detect the form from the leading character
    #[inline]
    #[must_use]
    pub fn detect(text: &str) -> Self {
        if text.starts_with(BASE64_PREFIX) {
            Self::Base64
        } else {
            Self::Decimal
        }
    }
}

impl Display for SignatureForm {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decimal => f.write_str("decimal"),
            Self::Base64 => f.write_str("base64"),
        }
    }
}

/// A parsed signature
///
/// For [`SignatureForm::Decimal`] the payload is the hex integer (bit `i`
/// weighs `2^i`). For [`SignatureForm::Base64`] it is the decoded bitfield
/// of exactly `limit` bits, catalog position `i` at bit `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    form: SignatureForm,
    payload: FeaturesBitField,
    limit: usize,
    version: String,
}

impl Signature {
    /// Assemble a signature from its parts
    #[must_use]
    pub fn new(
        form: SignatureForm,
        payload: FeaturesBitField,
        limit: usize,
        version: impl Into<String>,
    ) -> Self {
        Self {
            form,
            payload,
            limit,
            version: version.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn form(&self) -> SignatureForm {
        self.form
    }

    #[inline]
    #[must_use]
    pub fn payload(&self) -> &FeaturesBitField {
        &self.payload
    }

    /// Number of catalog features the payload covers
    #[inline]
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Opaque compatibility tag
    #[inline]
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Parse the decimal form
    ///
    /// # Errors
    /// Returns error if there are not exactly three fields or a field is
    /// not a valid number
    pub fn parse_decimal(text: &str) -> Result<Self, SignatureError> {
        let (payload, limit, version) = split_fields(text)?;
        let payload = FeaturesBitField::from_hex(payload)?;
        Ok(Self::new(SignatureForm::Decimal, payload, limit, version))
    }

    /// Parse the base64 form, with or without the leading `=`
    ///
    /// # Errors
    /// Returns error if there are not exactly three fields, the limit or
    /// version is not a number, or the payload does not decode to at least
    /// `ceil(limit / 8)` bytes
    pub fn parse_base64(text: &str) -> Result<Self, SignatureError> {
        let body = text.strip_prefix(BASE64_PREFIX).unwrap_or(text);
        let (payload, limit, version) = split_fields(body)?;
        let payload = FeaturesBitField::from_base64(payload, limit)?;
        Ok(Self::new(SignatureForm::Base64, payload, limit, version))
    }
}

fn split_fields(text: &str) -> Result<(&str, usize, &str), SignatureError> {
    let fields: Vec<&str> = text.split('.').collect();
    let [payload, limit, version] = fields[..] else {
        return Err(SignatureError::WrongFieldCount {
            signature: text.to_string(),
            found: fields.len(),
        });
    };

    let limit = limit
        .parse::<usize>()
        .map_err(|source| SignatureError::InvalidLimit {
            value: limit.to_string(),
            source,
        })?;

    if version.is_empty() || !version.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SignatureError::InvalidVersion(version.to_string()));
    }

    Ok((payload, limit, version))
}

impl FromStr for Signature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match SignatureForm::detect(s) {
            SignatureForm::Base64 => Self::parse_base64(s),
            SignatureForm::Decimal => Self::parse_decimal(s),
        }
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.form {
            SignatureForm::Decimal => write!(
                f,
                "{}.{}.{}",
                self.payload.to_hex(),
                self.limit,
                self.version
            ),
            SignatureForm::Base64 => write!(
                f,
                "{}{}.{}.{}",
                BASE64_PREFIX,
                self.payload.to_base64(),
                self.limit,
                self.version
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BitFieldError;

    #[test]
    fn form_detection() {
        assert_eq!(SignatureForm::detect("=AQI=.10.1"), SignatureForm::Base64);
        assert_eq!(SignatureForm::detect("2.3.1"), SignatureForm::Decimal);
    }

    #[test]
    fn decimal_parse_and_display() {
        let sig: Signature = "1ff.52.4".parse().unwrap();
        assert_eq!(sig.form(), SignatureForm::Decimal);
        assert_eq!(sig.payload().to_u128(), Some(0x1ff));
        assert_eq!(sig.limit(), 52);
        assert_eq!(sig.version(), "4");
        assert_eq!(sig.to_string(), "1ff.52.4");
    }

    #[test]
    fn base64_parse_and_display() {
        let sig: Signature = "=AQI=.10.2".parse().unwrap();
        assert_eq!(sig.form(), SignatureForm::Base64);
        assert_eq!(sig.payload().size(), 10);
        assert!(sig.payload().get(0));
        assert!(sig.payload().get(9));
        assert_eq!(sig.to_string(), "=AQI=.10.2");
    }

    #[test]
    fn base64_parse_without_prefix() {
        let sig = Signature::parse_base64("AQI=.10.2").unwrap();
        assert_eq!(sig.payload().ones().collect::<Vec<_>>(), vec![0, 9]);
    }

    #[test]
    fn wrong_field_count() {
        for bad in ["", "2", "2.3", "2.3.1.0"] {
            let err = bad.parse::<Signature>().unwrap_err();
            assert!(
                matches!(err, SignatureError::WrongFieldCount { .. }),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn non_numeric_fields() {
        assert!(matches!(
            "2.x.1".parse::<Signature>(),
            Err(SignatureError::InvalidLimit { .. })
        ));
        assert!(matches!(
            "2.3.beta".parse::<Signature>(),
            Err(SignatureError::InvalidVersion(_))
        ));
        assert!(matches!(
            "zz.3.1".parse::<Signature>(),
            Err(SignatureError::Payload(BitFieldError::InvalidHex(_)))
        ));
    }

    #[test]
    fn base64_payload_shorter_than_limit() {
        // One byte cannot hold 20 bits
        assert!(matches!(
            "=AQ==.20.1".parse::<Signature>(),
            Err(SignatureError::Payload(BitFieldError::Truncated { .. }))
        ));
    }
}
