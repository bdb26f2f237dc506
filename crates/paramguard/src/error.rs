//! Error types for the validation engine.
//!
//! Validation failures are data: they are collected into an [`ErrorReport`]
//! keyed by field path and rule kind. Configuration and programming faults
//! (a malformed schema root, an impossible path write, a second registry
//! install) are ordinary `thiserror` enums.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Message recorded when a required parameter is missing.
pub const REQUIRED_MESSAGE: &str = "This parameter is required.";

/// A single recorded rule failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorEntry {
    /// Human-readable error message
    pub message: String,
    /// Rendering of the offending value (debug mode only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ErrorEntry {
    /// Create an entry without a value rendering.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            value: None,
        }
    }

    /// Attach a rendering of the offending value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Errors produced by one validation run.
///
/// Maps a dotted key path to the rule kinds that failed there. Once it holds
/// any entry the run is over; see [`ErrorReport::has_errors`].
///
/// Serializes to the flat shape consumers of the parameter report expect:
///
/// ```json
/// {
///   "_error": true,
///   "age": { "max": { "message": "Must be less than 3" } }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorReport {
    fields: BTreeMap<String, BTreeMap<String, ErrorEntry>>,
}

impl ErrorReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `kind` at `path`, replacing an earlier entry of
    /// the same kind.
    pub fn add(&mut self, path: impl Into<String>, kind: impl Into<String>, entry: ErrorEntry) {
        self.fields
            .entry(path.into())
            .or_default()
            .insert(kind.into(), entry);
    }

    /// Whether at least one error was recorded.
    pub fn has_errors(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Whether the report is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total number of recorded entries across all paths.
    pub fn len(&self) -> usize {
        self.fields.values().map(|kinds| kinds.len()).sum()
    }

    /// Errors recorded at a key path.
    pub fn get(&self, path: &str) -> Option<&BTreeMap<String, ErrorEntry>> {
        self.fields.get(path)
    }

    /// The entry for one rule kind at a key path.
    pub fn entry(&self, path: &str, kind: &str) -> Option<&ErrorEntry> {
        self.fields.get(path).and_then(|kinds| kinds.get(kind))
    }

    /// Key paths that carry errors, in sorted order.
    pub fn paths(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// Iterate over `(path, kind, entry)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &ErrorEntry)> {
        self.fields.iter().flat_map(|(path, kinds)| {
            kinds
                .iter()
                .map(move |(kind, entry)| (path.as_str(), kind.as_str(), entry))
        })
    }

    /// Ok if no errors were recorded, Err otherwise.
    pub fn into_result(self) -> Result<(), Self> {
        if self.has_errors() {
            Err(self)
        } else {
            Ok(())
        }
    }

    /// Convert to the API error response format.
    pub fn to_api_error(&self) -> ApiValidationError {
        self.to_api_error_with_message("Validation failed")
    }

    /// Convert to the API error response format with a custom top-level message.
    pub fn to_api_error_with_message(&self, message: impl Into<String>) -> ApiValidationError {
        let fields = self
            .iter()
            .map(|(path, kind, entry)| FieldErrorResponse {
                field: path.to_string(),
                code: kind.to_string(),
                message: entry.message.clone(),
                value: entry.value.clone(),
            })
            .collect();

        ApiValidationError {
            error: ErrorBody {
                error_type: "validation_error".to_string(),
                message: message.into(),
                fields,
            },
        }
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed: {} error(s)", self.len())?;
        if let Some(path) = self.fields.keys().next() {
            write!(f, " at '{}'", path)?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorReport {}

impl Serialize for ErrorReport {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry("_error", &self.has_errors())?;
        for (path, kinds) in &self.fields {
            map.serialize_entry(path, kinds)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ErrorReport {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        #[allow(dead_code)]
        enum Slot {
            Flag(bool),
            Kinds(BTreeMap<String, ErrorEntry>),
        }

        let raw = BTreeMap::<String, Slot>::deserialize(deserializer)?;
        let fields = raw
            .into_iter()
            .filter_map(|(path, slot)| match slot {
                Slot::Kinds(kinds) if path != "_error" => Some((path, kinds)),
                _ => None,
            })
            .collect();
        Ok(Self { fields })
    }
}

/// API response format for validation errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiValidationError {
    pub error: ErrorBody,
}

/// Error body in API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
    pub fields: Vec<FieldErrorResponse>,
}

/// Single field error in API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldErrorResponse {
    /// Dotted key path (e.g. "address.city")
    pub field: String,
    /// Rule kind (e.g. "required", "max", "test-0")
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// The schema could not be compiled.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("schema root must be an object, found {found}")]
    InvalidRoot { found: &'static str },
    #[error("invalid argument for rule '{rule}' at '{path}': {reason}")]
    InvalidArgument {
        path: String,
        rule: String,
        reason: String,
    },
}

/// A write into a value tree could not be performed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("cannot assign to the empty key path")]
    EmptyPath,
    #[error("cannot descend into '{segment}' of '{path}': parent is not an object")]
    NotAnObject { path: String, segment: String },
}

/// The process-wide rule registry could not be changed.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("the global rule registry is already installed")]
    AlreadyInstalled,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_report_has_no_errors() {
        let report = ErrorReport::new();
        assert!(!report.has_errors());
        assert_eq!(report.len(), 0);
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn report_add_and_get() {
        let mut report = ErrorReport::new();
        report.add("age", "min", ErrorEntry::new("Must be greater than 1"));
        report.add("age", "max", ErrorEntry::new("Must be less than 3"));
        report.add("name", "required", ErrorEntry::new(REQUIRED_MESSAGE));

        assert!(report.has_errors());
        assert_eq!(report.len(), 3);
        assert_eq!(report.get("age").unwrap().len(), 2);
        assert_eq!(
            report.entry("name", "required").unwrap().message,
            REQUIRED_MESSAGE
        );
        assert_eq!(report.paths(), vec!["age", "name"]);
    }

    #[test]
    fn same_kind_overwrites() {
        let mut report = ErrorReport::new();
        report.add("code", "test", ErrorEntry::new("first"));
        report.add("code", "test", ErrorEntry::new("second"));

        assert_eq!(report.len(), 1);
        assert_eq!(report.entry("code", "test").unwrap().message, "second");
    }

    #[test]
    fn report_serializes_with_sentinel() {
        let mut report = ErrorReport::new();
        report.add(
            "name",
            "type",
            ErrorEntry::new("Invalid parameter data type, expected: String").with_value("42"),
        );

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value,
            json!({
                "_error": true,
                "name": {
                    "type": {
                        "message": "Invalid parameter data type, expected: String",
                        "value": "42"
                    }
                }
            })
        );
    }

    #[test]
    fn report_deserializes_ignoring_sentinel() {
        let value = json!({
            "_error": true,
            "name": { "required": { "message": "This parameter is required." } }
        });

        let report: ErrorReport = serde_json::from_value(value).unwrap();
        assert_eq!(report.len(), 1);
        assert!(report.entry("name", "required").is_some());
    }

    #[test]
    fn report_to_api_error() {
        let mut report = ErrorReport::new();
        report.add("address.city", "required", ErrorEntry::new(REQUIRED_MESSAGE));

        let api_error = report.to_api_error();
        assert_eq!(api_error.error.error_type, "validation_error");
        assert_eq!(api_error.error.message, "Validation failed");
        assert_eq!(api_error.error.fields.len(), 1);
        assert_eq!(api_error.error.fields[0].field, "address.city");
        assert_eq!(api_error.error.fields[0].code, "required");
    }

    #[test]
    fn report_display() {
        let mut report = ErrorReport::new();
        report.add("age", "max", ErrorEntry::new("Must be less than 3"));
        assert_eq!(report.to_string(), "Validation failed: 1 error(s) at 'age'");
    }
}
