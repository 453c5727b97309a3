//! Failure taxonomy for tool invocations.
//!
//! Handlers return typed [`ToolError`] values; the `Display` impl on
//! [`ToolError`] is the one place the caller-facing message is shaped.

use serde::Serialize;

/// A failed tool invocation.
///
/// Formatting a `ToolError` yields the normalized message surfaced to the
/// caller:
///
/// - [`ToolError::InvalidInput`] → `Invalid input: [...]` with the violation
///   list as JSON
/// - [`ToolError::RemoteCallFailed`] → `Lambda Capture semantic search failed:
///   {message}`
/// - [`ToolError::UnknownOperation`] → `Unknown tool: {name}`
/// - anything else keeps its original message
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ToolError {
    /// The invocation carried no argument object at all.
    #[error("Arguments are required")]
    MissingArguments,

    /// No tool is registered under the requested name.
    #[error("Unknown tool: {0}")]
    UnknownOperation(String),

    /// The arguments violated one or more schema constraints.
    #[error("Invalid input: {}", render_violations(.0))]
    InvalidInput(Vec<Violation>),

    /// The remote service could not be reached or answered with an error.
    #[error("Lambda Capture semantic search failed: {0}")]
    RemoteCallFailed(String),

    /// The result could not be rendered as JSON text.
    #[error("{0}")]
    Serialization(#[from] serde_json::Error),
}

/// A single schema constraint violation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Location of the offending value: the field name, followed by the
    /// element index for array items.
    pub path: Vec<PathSegment>,
    /// Machine-readable violation kind.
    pub code: ViolationCode,
    /// Human-readable explanation.
    pub message: String,
}

impl Violation {
    /// Creates a violation for a top-level field.
    pub fn field(field: &str, code: ViolationCode, message: impl Into<String>) -> Self {
        Self {
            path: vec![PathSegment::Field(field.to_string())],
            code,
            message: message.into(),
        }
    }

    /// Creates a violation for one element of an array field.
    pub fn element(
        field: &str,
        index: usize,
        code: ViolationCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: vec![
                PathSegment::Field(field.to_string()),
                PathSegment::Index(index),
            ],
            code,
            message: message.into(),
        }
    }
}

/// One step of a [`Violation`] path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Object key.
    Field(String),
    /// Array index.
    Index(usize),
}

/// Kinds of schema violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCode {
    /// A required field is absent.
    Required,
    /// The value has the wrong JSON type.
    InvalidType,
    /// The value is below its minimum (or an empty string).
    TooSmall,
    /// The value is above its maximum.
    TooBig,
    /// The value is not one of the allowed options.
    InvalidEnumValue,
}

fn render_violations(violations: &[Violation]) -> String {
    serde_json::to_string(violations).unwrap_or_else(|_| format!("{violations:?}"))
}

/// Errors that can occur while registering tools.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// A tool with the same name is already registered.
    #[error("duplicate tool ID: {0}")]
    DuplicateId(String),
}

/// Errors that can occur while constructing the search client.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The configured endpoint is not an absolute URL.
    #[error("invalid endpoint URL {url:?}: {reason}")]
    InvalidEndpoint {
        /// The rejected endpoint.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_operation_message() {
        let err = ToolError::UnknownOperation("get_weather".to_string());
        assert_eq!(err.to_string(), "Unknown tool: get_weather");
    }

    #[test]
    fn test_remote_call_failed_message() {
        let err = ToolError::RemoteCallFailed("rate limited".to_string());
        assert_eq!(
            err.to_string(),
            "Lambda Capture semantic search failed: rate limited"
        );
    }

    #[test]
    fn test_missing_arguments_message() {
        assert_eq!(
            ToolError::MissingArguments.to_string(),
            "Arguments are required"
        );
    }

    #[test]
    fn test_invalid_input_lists_every_violation_as_json() {
        let err = ToolError::InvalidInput(vec![
            Violation::field("score", ViolationCode::TooBig, "must be at most 1"),
            Violation::element(
                "type",
                1,
                ViolationCode::InvalidEnumValue,
                "expected one of text, table, chart",
            ),
        ]);

        let message = err.to_string();
        let json = message
            .strip_prefix("Invalid input: ")
            .expect("prefix should be present");
        let parsed: serde_json::Value = serde_json::from_str(json).expect("violations are JSON");

        assert_eq!(
            parsed,
            serde_json::json!([
                {"path": ["score"], "code": "too_big", "message": "must be at most 1"},
                {
                    "path": ["type", 1],
                    "code": "invalid_enum_value",
                    "message": "expected one of text, table, chart"
                }
            ])
        );
    }

    #[test]
    fn test_serialization_error_keeps_original_message() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let expected = source.to_string();
        assert_eq!(ToolError::from(source).to_string(), expected);
    }
}
