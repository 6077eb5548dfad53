//! ``src/fs/payload.rs``
//!
//! Envelope of a directory listing response:
//!
//! ```json
//! { "pathSegments": ["docs"], "results": [ ... ], "error": null }
//! ```
//!
//! Decoding is permissive. A missing or mistyped `pathSegments`
//! becomes an empty path, a missing `results` an empty listing. Only a payload
//! that is not an object, or a `results` field that is present but not an
//! array, fails the decode.

use compact_str::CompactString;
use serde_json::Value;

use crate::error::AppError;
use crate::model::route::PathSegments;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPayload {
    /// Path the response is for, including any root-address prefix.
    pub path_segments: PathSegments,

    /// Backend specific entries, decoded later by an adapter.
    pub results: Vec<Value>,

    /// Failure reported by the backend for this path.
    pub error: Option<CompactString>,
}

impl ListingPayload {
    pub fn decode(value: &Value) -> Result<Self, AppError> {
        let Value::Object(fields) = value else {
            return Err(AppError::decode(format!(
                "expected a listing object, got {}",
                type_name(value)
            )));
        };

        let path_segments = match fields.get("pathSegments") {
            Some(Value::Array(segments)) => segments
                .iter()
                .filter_map(Value::as_str)
                .map(CompactString::new)
                .collect(),
            _ => PathSegments::new(),
        };

        let results = match fields.get("results") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(entries)) => entries.clone(),
            Some(other) => {
                return Err(AppError::decode(format!(
                    "`results` must be an array, got {}",
                    type_name(other)
                )));
            }
        };

        let error = fields
            .get("error")
            .and_then(Value::as_str)
            .map(CompactString::new);

        Ok(Self {
            path_segments,
            results,
            error,
        })
    }
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_well_formed_payload() {
        let payload = ListingPayload::decode(&json!({
            "pathSegments": ["docs", "guides"],
            "results": [{ "name": "intro.md" }]
        }))
        .unwrap();

        assert_eq!(payload.path_segments.as_slice(), ["docs", "guides"]);
        assert_eq!(payload.results.len(), 1);
        assert_eq!(payload.error, None);
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let payload = ListingPayload::decode(&json!({})).unwrap();
        assert!(payload.path_segments.is_empty());
        assert!(payload.results.is_empty());

        let payload = ListingPayload::decode(&json!({ "pathSegments": "docs" })).unwrap();
        assert!(payload.path_segments.is_empty());
    }

    #[test]
    fn test_malformed_results_fail() {
        let err = ListingPayload::decode(&json!({ "pathSegments": [], "results": "nope" }))
            .unwrap_err();
        assert!(matches!(err, AppError::Decode { .. }));
        assert!(err.to_string().contains("a string"));
    }

    #[test]
    fn test_non_object_fails() {
        assert!(ListingPayload::decode(&json!([1, 2])).is_err());
        assert!(ListingPayload::decode(&Value::Null).is_err());
    }

    #[test]
    fn test_backend_error_is_carried() {
        let payload =
            ListingPayload::decode(&json!({ "pathSegments": ["x"], "error": "not found" }))
                .unwrap();
        assert_eq!(payload.error.as_deref(), Some("not found"));
    }
}
