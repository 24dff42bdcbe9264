//! # Schema Key — Versioned Schema Identity
//!
//! A [`SchemaKey`] identifies one schema version by the four-tuple
//! `(vendor, name, format, version)`. It is parsed from the URI form
//! carried by schema envelopes:
//!
//! ```text
//! iglu:com.acme/click/jsonschema/1-0-0
//! ```
//!
//! The key is immutable and its constructor validates every segment, so a
//! `SchemaKey` in hand is always a well-formed registry coordinate. The
//! version must be a SchemaVer triple (`MODEL-REVISION-ADDITION`); version
//! resolution is exact, so an event emitted against an unregistered version
//! fails validation rather than being coerced to a neighbouring one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SchemaKeyError;

/// URI scheme prefix carried by every schema reference.
pub const SCHEMA_URI_SCHEME: &str = "iglu:";

/// Identity of one schema version in the registry.
///
/// Fields are private; construction flows through [`SchemaKey::new`] or
/// [`SchemaKey::parse`], which enforce the segment and SchemaVer rules.
/// Serializes as its URI string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaKey {
    vendor: String,
    name: String,
    format: String,
    version: String,
}

impl SchemaKey {
    /// Construct a key from its four segments, validating each.
    ///
    /// # Errors
    ///
    /// Returns `SchemaKeyError::EmptySegment` if any segment is empty and
    /// `SchemaKeyError::InvalidVersion` if the version is not a SchemaVer
    /// triple.
    pub fn new(
        vendor: impl Into<String>,
        name: impl Into<String>,
        format: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, SchemaKeyError> {
        let key = Self {
            vendor: vendor.into(),
            name: name.into(),
            format: format.into(),
            version: version.into(),
        };

        for (segment, value) in [
            ("vendor", &key.vendor),
            ("name", &key.name),
            ("format", &key.format),
        ] {
            if value.is_empty() {
                return Err(SchemaKeyError::EmptySegment {
                    uri: key.to_string(),
                    segment,
                });
            }
        }

        if !is_schema_ver(&key.version) {
            return Err(SchemaKeyError::InvalidVersion {
                version: key.version,
            });
        }

        Ok(key)
    }

    /// Parse a key from its URI form, e.g.
    /// `iglu:com.acme/click/jsonschema/1-0-0`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaKeyError::MissingScheme` without the `iglu:` prefix,
    /// `SchemaKeyError::MalformedPath` unless the path has exactly four
    /// segments, plus the segment-level errors of [`SchemaKey::new`].
    pub fn parse(uri: &str) -> Result<Self, SchemaKeyError> {
        let path = uri
            .strip_prefix(SCHEMA_URI_SCHEME)
            .ok_or_else(|| SchemaKeyError::MissingScheme {
                uri: uri.to_string(),
            })?;

        let mut segments = path.split('/');
        match (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) {
            (Some(vendor), Some(name), Some(format), Some(version), None) => {
                Self::new(vendor, name, format, version)
            }
            _ => Err(SchemaKeyError::MalformedPath {
                uri: uri.to_string(),
            }),
        }
    }

    /// The schema vendor, e.g. `com.acme`.
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// The schema name, e.g. `click`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The schema format, e.g. `jsonschema`.
    pub fn format(&self) -> &str {
        &self.format
    }

    /// The SchemaVer version, e.g. `1-0-0`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Derive the storage table identifier for this schema.
    ///
    /// Lowercases the vendor and name, folds `.` and `-` to `_`, and
    /// appends the version with `-` folded to `_`:
    /// `com.acme/click/jsonschema/1-0-0` becomes `com_acme_click_1_0_0`.
    pub fn table_name(&self) -> String {
        let fold = |s: &str| s.to_ascii_lowercase().replace(['.', '-'], "_");
        format!(
            "{}_{}_{}",
            fold(&self.vendor),
            fold(&self.name),
            self.version.replace('-', "_"),
        )
    }
}

impl fmt::Display for SchemaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{SCHEMA_URI_SCHEME}{}/{}/{}/{}",
            self.vendor, self.name, self.format, self.version
        )
    }
}

impl FromStr for SchemaKey {
    type Err = SchemaKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for SchemaKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SchemaKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Whether a version string is a SchemaVer triple: three `-`-separated
/// decimal integers.
fn is_schema_ver(version: &str) -> bool {
    let numeric = |part: Option<&str>| {
        part.is_some_and(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
    };
    let mut parts = version.split('-');
    numeric(parts.next()) && numeric(parts.next()) && numeric(parts.next()) && parts.next().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_uri() {
        let key = SchemaKey::parse("iglu:com.acme/click/jsonschema/1-0-0").unwrap();
        assert_eq!(key.vendor(), "com.acme");
        assert_eq!(key.name(), "click");
        assert_eq!(key.format(), "jsonschema");
        assert_eq!(key.version(), "1-0-0");
    }

    #[test]
    fn test_display_roundtrip() {
        let uri = "iglu:com.acme/link_click/jsonschema/2-1-3";
        let key = SchemaKey::parse(uri).unwrap();
        assert_eq!(key.to_string(), uri);
        assert_eq!(key, uri.parse().unwrap());
    }

    #[test]
    fn test_missing_scheme_rejected() {
        let err = SchemaKey::parse("com.acme/click/jsonschema/1-0-0").unwrap_err();
        assert!(matches!(err, SchemaKeyError::MissingScheme { .. }));
    }

    #[test]
    fn test_wrong_segment_count_rejected() {
        assert!(matches!(
            SchemaKey::parse("iglu:com.acme/click/jsonschema").unwrap_err(),
            SchemaKeyError::MalformedPath { .. }
        ));
        assert!(matches!(
            SchemaKey::parse("iglu:com.acme/click/jsonschema/1-0-0/extra").unwrap_err(),
            SchemaKeyError::MalformedPath { .. }
        ));
    }

    #[test]
    fn test_empty_segment_rejected() {
        let err = SchemaKey::parse("iglu:/click/jsonschema/1-0-0").unwrap_err();
        assert!(matches!(
            err,
            SchemaKeyError::EmptySegment {
                segment: "vendor",
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_version_rejected() {
        for version in ["1-0", "1-0-0-0", "1.0.0", "a-b-c", "1--0", ""] {
            let err = SchemaKey::new("com.acme", "click", "jsonschema", version).unwrap_err();
            assert!(
                matches!(err, SchemaKeyError::InvalidVersion { .. }),
                "version {version:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_multi_digit_version_accepted() {
        let key = SchemaKey::new("com.acme", "click", "jsonschema", "12-0-17").unwrap();
        assert_eq!(key.version(), "12-0-17");
    }

    #[test]
    fn test_table_name() {
        let key = SchemaKey::parse("iglu:com.acme/Link-Click/jsonschema/1-0-0").unwrap();
        assert_eq!(key.table_name(), "com_acme_link_click_1_0_0");
    }

    #[test]
    fn test_serde_as_uri_string() {
        let key = SchemaKey::parse("iglu:com.acme/click/jsonschema/1-0-0").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, r#""iglu:com.acme/click/jsonschema/1-0-0""#);
        let parsed: SchemaKey = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn test_deserialize_rejects_malformed() {
        let result: Result<SchemaKey, _> = serde_json::from_str(r#""not-a-schema-uri""#);
        assert!(result.is_err());
    }
}
