//! Parsing of literal references between records.
//!
//! Only local references (`Organization/10`, optionally with a
//! `/_history/<v>` suffix that is ignored for lookups) can be followed.
//! Contained, URN and absolute URL references are rejected.
//!
//! # Example
//!
//! ```
//! use octopush_core::reference::parse_reference;
//!
//! let reference = parse_reference("Organization/10").unwrap();
//! assert_eq!(reference.resource_type, "Organization");
//! assert_eq!(reference.expect_type("Organization").unwrap(), 10);
//! ```

use std::fmt;

use thiserror::Error;

/// A parsed local reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FhirReference {
    pub resource_type: String,
    pub id: String,
    /// `_history` version, if the reference carried one
    pub version: Option<String>,
}

impl FhirReference {
    pub fn to_relative(&self) -> String {
        format!("{}/{}", self.resource_type, self.id)
    }

    /// The id as the integer key used by the record store.
    pub fn numeric_id(&self) -> Result<i64, UnresolvableReference> {
        self.id
            .parse::<i64>()
            .map_err(|_| UnresolvableReference::NonNumericId(self.to_relative()))
    }

    /// The numeric id, provided the type tag is exactly `expected`.
    pub fn expect_type(&self, expected: &str) -> Result<i64, UnresolvableReference> {
        if self.resource_type == expected {
            self.numeric_id()
        } else {
            Err(UnresolvableReference::TypeMismatch {
                expected: expected.to_string(),
                found: self.resource_type.clone(),
            })
        }
    }
}

impl fmt::Display for FhirReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_relative())
    }
}

/// Why a reference string cannot be followed through the record store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnresolvableReference {
    #[error("contained reference: #{0}")]
    Contained(String),
    #[error("URN reference: {0}")]
    Urn(String),
    #[error("external reference: {0}")]
    External(String),
    #[error("invalid reference: {0}")]
    Invalid(String),
    #[error("non-numeric id in reference: {0}")]
    NonNumericId(String),
    #[error("reference is not an {expected} but: {found}")]
    TypeMismatch { expected: String, found: String },
}

/// Splits `Type/id[/_history/version]`.
///
/// ```
/// use octopush_core::reference::{parse_reference, UnresolvableReference};
///
/// let r = parse_reference("Endpoint/5/_history/1").unwrap();
/// assert_eq!(r.id, "5");
/// assert_eq!(r.version.as_deref(), Some("1"));
///
/// let err = parse_reference("#contained").unwrap_err();
/// assert!(matches!(err, UnresolvableReference::Contained(_)));
/// ```
pub fn parse_reference(reference: &str) -> Result<FhirReference, UnresolvableReference> {
    let reference = reference.trim();

    if let Some(local) = reference.strip_prefix('#') {
        return Err(UnresolvableReference::Contained(local.to_string()));
    }
    if reference.starts_with("urn:") {
        return Err(UnresolvableReference::Urn(reference.to_string()));
    }
    if reference.contains("://") {
        return Err(UnresolvableReference::External(reference.to_string()));
    }

    let invalid = |reason: String| Err(UnresolvableReference::Invalid(reason));

    let mut segments = reference.splitn(4, '/');
    let resource_type = segments.next().unwrap_or_default();
    let Some(id) = segments.next().map(str::trim) else {
        return invalid(format!("expected Type/id, got {reference:?}"));
    };

    if !resource_type.starts_with(|c: char| c.is_ascii_uppercase()) {
        return invalid(format!("resource type must start with uppercase letter: {resource_type:?}"));
    }
    if id.is_empty() {
        return invalid(format!("empty id in {reference:?}"));
    }

    let version = match (segments.next(), segments.next()) {
        (Some("_history"), Some(version)) => Some(version.to_string()),
        _ => None,
    };

    Ok(FhirReference {
        resource_type: resource_type.to_string(),
        id: id.to_string(),
        version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_relative_reference() {
        let r = parse_reference("Patient/7").unwrap();
        assert_eq!(r.resource_type, "Patient");
        assert_eq!(r.id, "7");
        assert_eq!(r.version, None);
        assert_eq!(r.numeric_id().unwrap(), 7);
    }

    #[test]
    fn test_versioned_reference() {
        let r = parse_reference("ServiceRequest/42/_history/3").unwrap();
        assert_eq!(r.resource_type, "ServiceRequest");
        assert_eq!(r.id, "42");
        assert_eq!(r.version, Some("3".to_string()));
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        let r = parse_reference("  Organization/ 10 ").unwrap();
        assert_eq!(r.expect_type("Organization").unwrap(), 10);
    }

    #[test]
    fn test_expect_type_mismatch() {
        let r = parse_reference("Practitioner/10").unwrap();
        let err = r.expect_type("Organization").unwrap_err();
        assert!(matches!(err, UnresolvableReference::TypeMismatch { .. }));
        assert_eq!(err.to_string(), "reference is not an Organization but: Practitioner");
    }

    #[test]
    fn test_non_numeric_id() {
        let r = parse_reference("Endpoint/abc").unwrap();
        assert!(matches!(
            r.expect_type("Endpoint"),
            Err(UnresolvableReference::NonNumericId(_))
        ));
    }

    #[test]
    fn test_absolute_url_is_external() {
        let result = parse_reference("http://other-server.com/fhir/Patient/123");
        assert!(matches!(result, Err(UnresolvableReference::External(_))));
    }

    #[test]
    fn test_contained_reference() {
        let result = parse_reference("#contained-id");
        assert!(
            matches!(result, Err(UnresolvableReference::Contained(id)) if id == "contained-id")
        );
    }

    #[test]
    fn test_urn_reference() {
        let result = parse_reference("urn:uuid:550e8400-e29b-41d4-a716-446655440000");
        assert!(matches!(result, Err(UnresolvableReference::Urn(_))));
    }

    #[test]
    fn test_invalid_references() {
        for input in ["", "  ", "patient/1", "Patient/", "Patient123"] {
            assert!(
                matches!(parse_reference(input), Err(UnresolvableReference::Invalid(_))),
                "{input:?} should be invalid"
            );
        }
    }

    #[test]
    fn test_display() {
        let r = parse_reference("Endpoint/5/_history/2").unwrap();
        assert_eq!(format!("{r}"), "Endpoint/5");
    }
}
