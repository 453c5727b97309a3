//! Input schema for `macroecon_semantic_search`.
//!
//! The accepted fields are declared once in [`SEARCH_FIELDS`]. The same table
//! drives both validation ([`validate_fields`]) and the JSON Schema advertised
//! to callers ([`input_schema`]).
//!
//! Validation is total: it either yields a fully defaulted object or the
//! complete list of violations, never just the first one.

use schemars::{Schema, json_schema};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    JsonObject,
    clock::Clock,
    error::{ToolError, Violation, ViolationCode},
};

/// Content types the remote index distinguishes.
pub const CONTENT_TYPE_OPTIONS: &[&str] = &["text", "table", "chart"];

/// Publishing institutions covered by the knowledge base.
pub const SOURCE_OPTIONS: &[&str] = &[
    "Federal Reserve",
    "Bank of England",
    "European Central Bank",
];

/// Kind and constraints of a single field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// A string; `non_empty` rejects the empty string.
    Text {
        /// Reject the empty string.
        non_empty: bool,
    },
    /// A number within an inclusive range.
    Number {
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
    /// A whole number with an inclusive lower bound.
    Integer {
        /// Inclusive lower bound.
        min: u64,
    },
    /// An array whose elements come from a fixed set of strings.
    EnumList {
        /// Allowed element values.
        options: &'static [&'static str],
    },
}

/// Value applied when an optional field is omitted.
#[derive(Debug, Clone, Copy)]
pub enum FieldDefault {
    /// A fixed number.
    Number(f64),
    /// A fixed whole number.
    Integer(u64),
    /// A fixed string.
    Text(&'static str),
    /// The current date, resolved at validation time.
    Today,
}

/// Declaration of one accepted input field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Argument name.
    pub name: &'static str,
    /// Type and constraints.
    pub kind: FieldKind,
    /// Whether the field must be present.
    pub required: bool,
    /// Default for omitted optional fields.
    pub default: Option<FieldDefault>,
    /// Description shown to callers.
    pub description: &'static str,
}

/// The fields accepted by `macroecon_semantic_search`.
pub const SEARCH_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "query_text",
        kind: FieldKind::Text { non_empty: true },
        required: true,
        default: None,
        description: "The search query text (e.g., \"Inflation expectations\"). **required parameter**.",
    },
    FieldSpec {
        name: "score",
        kind: FieldKind::Number { min: 0.0, max: 1.0 },
        required: false,
        default: Some(FieldDefault::Number(0.75)),
        description: "Minimum relevance score threshold",
    },
    FieldSpec {
        name: "max_results",
        kind: FieldKind::Integer { min: 1 },
        required: false,
        default: Some(FieldDefault::Integer(10)),
        description: "Maximum number of results to return",
    },
    FieldSpec {
        name: "type",
        kind: FieldKind::EnumList {
            options: CONTENT_TYPE_OPTIONS,
        },
        required: false,
        default: None,
        description: "Filter results by content type (text, table, or chart) or None for all",
    },
    FieldSpec {
        name: "source",
        kind: FieldKind::EnumList {
            options: SOURCE_OPTIONS,
        },
        required: false,
        default: None,
        description: "Filter results by source institution or None for all",
    },
    FieldSpec {
        name: "start_date",
        kind: FieldKind::Text { non_empty: false },
        required: false,
        default: Some(FieldDefault::Text("2018-01-01")),
        description: "Start date for filtering results (YYYY-MM-DD). If request needs recent/latest data, set start_date nearest to today up to 3 months ago.",
    },
    FieldSpec {
        name: "end_date",
        kind: FieldKind::Text { non_empty: false },
        required: false,
        default: Some(FieldDefault::Today),
        description: "End date for filtering results (YYYY-MM-DD). if None, set to today - this is better for **most recent data**. default is today",
    },
];

/// Content type filter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Narrative text passages.
    Text,
    /// Tabular data.
    Table,
    /// Charts and figures.
    Chart,
}

/// Source institution filter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    /// Board of Governors of the Federal Reserve System.
    #[serde(rename = "Federal Reserve")]
    FederalReserve,
    /// Bank of England.
    #[serde(rename = "Bank of England")]
    BankOfEngland,
    /// European Central Bank.
    #[serde(rename = "European Central Bank")]
    EuropeanCentralBank,
}

/// A validated search request with every optional field populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text query.
    pub query_text: String,
    /// Minimum relevance score in `[0, 1]`.
    pub score: f64,
    /// Maximum number of results the remote should return.
    pub max_results: u64,
    /// Content type filter; `None` means all types.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub content_types: Option<Vec<ContentType>>,
    /// Source filter; `None` means all sources.
    #[serde(rename = "source", default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
    /// Inclusive start of the date range (`YYYY-MM-DD`).
    pub start_date: String,
    /// Inclusive end of the date range (`YYYY-MM-DD`).
    pub end_date: String,
}

impl SearchRequest {
    /// Validates raw tool arguments and applies every default.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidInput`] carrying every violated constraint.
    pub fn from_arguments(arguments: &JsonObject, clock: &dyn Clock) -> Result<Self, ToolError> {
        let normalized =
            validate_fields(SEARCH_FIELDS, arguments, clock).map_err(ToolError::InvalidInput)?;
        Ok(serde_json::from_value(Value::Object(normalized))?)
    }
}

/// Validates `arguments` against `fields`.
///
/// On success the returned object contains only declared fields, with
/// defaults filled in. JSON `null` counts as omitted. Unknown keys are
/// dropped.
///
/// # Errors
///
/// Returns every [`Violation`] found, in table order.
pub fn validate_fields(
    fields: &[FieldSpec],
    arguments: &JsonObject,
    clock: &dyn Clock,
) -> Result<JsonObject, Vec<Violation>> {
    let mut normalized = JsonObject::new();
    let mut violations = Vec::new();

    for field in fields {
        match arguments.get(field.name).filter(|value| !value.is_null()) {
            Some(value) => {
                if let Some(value) = check_value(field, value, &mut violations) {
                    normalized.insert(field.name.to_string(), value);
                }
            }
            None if field.required => violations.push(Violation::field(
                field.name,
                ViolationCode::Required,
                "Required",
            )),
            None => {
                if let Some(default) = field.default {
                    normalized.insert(field.name.to_string(), default_value(default, clock));
                }
            }
        }
    }

    if violations.is_empty() {
        Ok(normalized)
    } else {
        Err(violations)
    }
}

fn check_value(field: &FieldSpec, value: &Value, violations: &mut Vec<Violation>) -> Option<Value> {
    let name = field.name;
    match field.kind {
        FieldKind::Text { non_empty } => {
            let Some(text) = value.as_str() else {
                violations.push(type_violation(name, "string", value));
                return None;
            };
            if non_empty && text.is_empty() {
                violations.push(Violation::field(
                    name,
                    ViolationCode::TooSmall,
                    "String must contain at least 1 character(s)",
                ));
                return None;
            }
            Some(Value::String(text.to_string()))
        }
        FieldKind::Number { min, max } => {
            let Some(number) = value.as_f64() else {
                violations.push(type_violation(name, "number", value));
                return None;
            };
            if number < min {
                violations.push(Violation::field(
                    name,
                    ViolationCode::TooSmall,
                    format!("Number must be greater than or equal to {min}"),
                ));
                None
            } else if number > max {
                violations.push(Violation::field(
                    name,
                    ViolationCode::TooBig,
                    format!("Number must be less than or equal to {max}"),
                ));
                None
            } else {
                Some(value.clone())
            }
        }
        FieldKind::Integer { min } => match whole_number(value) {
            Ok(number) if number >= i128::from(min) => {
                // `whole_number` never yields more than u64::MAX.
                u64::try_from(number).ok().map(Value::from)
            }
            Ok(_) => {
                violations.push(Violation::field(
                    name,
                    ViolationCode::TooSmall,
                    format!("Number must be greater than or equal to {min}"),
                ));
                None
            }
            Err(received) => {
                violations.push(Violation::field(
                    name,
                    ViolationCode::InvalidType,
                    format!("Expected integer, received {received}"),
                ));
                None
            }
        },
        FieldKind::EnumList { options } => {
            let Some(items) = value.as_array() else {
                violations.push(type_violation(name, "array", value));
                return None;
            };
            let before = violations.len();
            for (index, item) in items.iter().enumerate() {
                match item.as_str() {
                    Some(option) if options.contains(&option) => {}
                    Some(option) => violations.push(Violation::element(
                        name,
                        index,
                        ViolationCode::InvalidEnumValue,
                        format!(
                            "Invalid enum value. Expected {}, received '{option}'",
                            expected_options(options)
                        ),
                    )),
                    None => violations.push(Violation::element(
                        name,
                        index,
                        ViolationCode::InvalidType,
                        format!(
                            "Expected {}, received {}",
                            expected_options(options),
                            json_type(item)
                        ),
                    )),
                }
            }
            (violations.len() == before).then(|| value.clone())
        }
    }
}

/// Largest magnitude at which every whole `f64` is exact (2^53).
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Interprets a JSON number as a whole number.
///
/// Returns the name of the received type when the value is not a whole
/// number (`10.0` is accepted, `2.5` is not).
fn whole_number(value: &Value) -> Result<i128, &'static str> {
    if let Some(number) = value.as_u64() {
        return Ok(i128::from(number));
    }
    if let Some(number) = value.as_i64() {
        return Ok(i128::from(number));
    }
    match value.as_f64() {
        Some(number) if number.fract() == 0.0 && number.abs() < MAX_EXACT_FLOAT => {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "whole number below 2^53 converts exactly"
            )]
            let whole = number as i128;
            Ok(whole)
        }
        Some(_) => Err("float"),
        None => Err(json_type(value)),
    }
}

fn default_value(default: FieldDefault, clock: &dyn Clock) -> Value {
    match default {
        FieldDefault::Number(number) => json!(number),
        FieldDefault::Integer(number) => json!(number),
        FieldDefault::Text(text) => json!(text),
        FieldDefault::Today => json!(clock.today_string()),
    }
}

fn type_violation(field: &str, expected: &str, value: &Value) -> Violation {
    Violation::field(
        field,
        ViolationCode::InvalidType,
        format!("Expected {expected}, received {}", json_type(value)),
    )
}

fn expected_options(options: &[&str]) -> String {
    options
        .iter()
        .map(|option| format!("'{option}'"))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Projects `fields` into a JSON Schema (draft-07) object.
///
/// Dynamic defaults (the current date) are described in the field
/// description rather than emitted as a `default`.
pub fn schema_for_fields(fields: &[FieldSpec]) -> Schema {
    let mut properties = JsonObject::new();
    for field in fields {
        let mut property = match field.kind {
            FieldKind::Text { non_empty: true } => json!({"type": "string", "minLength": 1}),
            FieldKind::Text { non_empty: false } => json!({"type": "string"}),
            FieldKind::Number { min, max } => {
                json!({"type": "number", "minimum": min, "maximum": max})
            }
            FieldKind::Integer { min } => json!({"type": "integer", "minimum": min}),
            FieldKind::EnumList { options } => json!({
                "type": "array",
                "items": {"type": "string", "enum": options}
            }),
        };
        if let Value::Object(map) = &mut property {
            map.insert("description".to_string(), json!(field.description));
            match field.default {
                Some(FieldDefault::Number(number)) => {
                    map.insert("default".to_string(), json!(number));
                }
                Some(FieldDefault::Integer(number)) => {
                    map.insert("default".to_string(), json!(number));
                }
                Some(FieldDefault::Text(text)) => {
                    map.insert("default".to_string(), json!(text));
                }
                Some(FieldDefault::Today) | None => {}
            }
        }
        properties.insert(field.name.to_string(), property);
    }

    let required: Vec<&str> = fields
        .iter()
        .filter(|field| field.required)
        .map(|field| field.name)
        .collect();

    let mut schema = json_schema!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object"
    });
    schema.insert("properties".to_string(), Value::Object(properties));
    schema.insert("required".to_string(), json!(required));
    schema
}

/// JSON Schema of the `macroecon_semantic_search` arguments.
pub fn input_schema() -> Schema {
    schema_for_fields(SEARCH_FIELDS)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::clock::FixedClock;

    fn clock() -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date"))
    }

    fn args(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn violations_for(value: Value) -> Vec<Violation> {
        match SearchRequest::from_arguments(&args(value), &clock()) {
            Err(ToolError::InvalidInput(violations)) => violations,
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    fn paths(violations: &[Violation]) -> Vec<Value> {
        violations
            .iter()
            .map(|violation| serde_json::to_value(&violation.path).expect("path serializes"))
            .collect()
    }

    #[test]
    fn test_query_only_applies_every_default() {
        let request = SearchRequest::from_arguments(
            &args(json!({"query_text": "Inflation expectations"})),
            &clock(),
        )
        .expect("valid input");

        assert_eq!(
            request,
            SearchRequest {
                query_text: "Inflation expectations".to_string(),
                score: 0.75,
                max_results: 10,
                content_types: None,
                sources: None,
                start_date: "2018-01-01".to_string(),
                end_date: "2025-03-14".to_string(),
            }
        );
    }

    #[test]
    fn test_all_fields_are_kept_and_typed() {
        let request = SearchRequest::from_arguments(
            &args(json!({
                "query_text": "bank rate",
                "score": 0.5,
                "max_results": 3,
                "type": ["table", "chart"],
                "source": ["Bank of England", "European Central Bank"],
                "start_date": "2024-01-01",
                "end_date": "2024-06-30"
            })),
            &clock(),
        )
        .expect("valid input");

        assert_eq!(request.score, 0.5);
        assert_eq!(request.max_results, 3);
        assert_eq!(
            request.content_types,
            Some(vec![ContentType::Table, ContentType::Chart])
        );
        assert_eq!(
            request.sources,
            Some(vec![Source::BankOfEngland, Source::EuropeanCentralBank])
        );
        assert_eq!(request.start_date, "2024-01-01");
        assert_eq!(request.end_date, "2024-06-30");
    }

    #[test]
    fn test_score_bounds_are_inclusive() {
        for score in [0.0, 1.0] {
            let request = SearchRequest::from_arguments(
                &args(json!({"query_text": "q", "score": score})),
                &clock(),
            )
            .expect("boundary score is valid");
            assert_eq!(request.score, score);
        }
    }

    #[test]
    fn test_every_violation_is_reported() {
        let violations = violations_for(json!({
            "query_text": "",
            "score": 1.5,
            "max_results": 0,
            "type": ["text", "video"],
            "source": ["Bank of Japan"]
        }));

        assert_eq!(
            paths(&violations),
            vec![
                json!(["query_text"]),
                json!(["score"]),
                json!(["max_results"]),
                json!(["type", 1]),
                json!(["source", 0]),
            ]
        );
        let codes: Vec<_> = violations.iter().map(|violation| violation.code).collect();
        assert_eq!(
            codes,
            vec![
                ViolationCode::TooSmall,
                ViolationCode::TooBig,
                ViolationCode::TooSmall,
                ViolationCode::InvalidEnumValue,
                ViolationCode::InvalidEnumValue,
            ]
        );
    }

    #[test]
    fn test_missing_query_text_is_required() {
        let violations = violations_for(json!({"score": 0.9}));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, ViolationCode::Required);
        assert_eq!(paths(&violations), vec![json!(["query_text"])]);
    }

    #[test]
    fn test_whitespace_query_text_is_accepted() {
        let request =
            SearchRequest::from_arguments(&args(json!({"query_text": "   "})), &clock())
                .expect("whitespace satisfies minLength 1");
        assert_eq!(request.query_text, "   ");
    }

    #[test]
    fn test_empty_query_text_is_rejected() {
        let violations = violations_for(json!({"query_text": ""}));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, ViolationCode::TooSmall);
        assert_eq!(
            violations[0].message,
            "String must contain at least 1 character(s)"
        );
    }

    #[test]
    fn test_large_whole_float_max_results_is_exact() {
        let request = SearchRequest::from_arguments(
            &args(json!({"query_text": "q", "max_results": 4_503_599_627_370_496.0})),
            &clock(),
        )
        .expect("whole float below 2^53 is an integer");
        assert_eq!(request.max_results, 4_503_599_627_370_496);
    }

    #[test]
    fn test_negative_score_is_too_small() {
        let violations = violations_for(json!({"query_text": "q", "score": -0.1}));
        assert_eq!(violations[0].code, ViolationCode::TooSmall);
    }

    #[test]
    fn test_fractional_max_results_is_rejected() {
        let violations = violations_for(json!({"query_text": "q", "max_results": 2.5}));
        assert_eq!(violations[0].code, ViolationCode::InvalidType);
        assert_eq!(violations[0].message, "Expected integer, received float");
    }

    #[test]
    fn test_negative_max_results_is_too_small() {
        let violations = violations_for(json!({"query_text": "q", "max_results": -4}));
        assert_eq!(violations[0].code, ViolationCode::TooSmall);
    }

    #[test]
    fn test_whole_float_max_results_is_accepted() {
        let request = SearchRequest::from_arguments(
            &args(json!({"query_text": "q", "max_results": 25.0})),
            &clock(),
        )
        .expect("whole float is an integer");
        assert_eq!(request.max_results, 25);
    }

    #[test]
    fn test_wrong_json_types_are_reported() {
        let violations = violations_for(json!({
            "query_text": 42,
            "score": "high",
            "max_results": "ten",
            "type": "text",
            "start_date": 2018
        }));

        assert!(
            violations
                .iter()
                .all(|violation| violation.code == ViolationCode::InvalidType)
        );
        assert_eq!(violations.len(), 5);
        assert_eq!(violations[0].message, "Expected string, received number");
        assert_eq!(violations[3].message, "Expected array, received string");
    }

    #[test]
    fn test_non_string_enum_element_is_invalid_type() {
        let violations = violations_for(json!({"query_text": "q", "type": ["text", 3]}));
        assert_eq!(paths(&violations), vec![json!(["type", 1])]);
        assert_eq!(violations[0].code, ViolationCode::InvalidType);
    }

    #[test]
    fn test_null_optional_fields_receive_defaults() {
        let request = SearchRequest::from_arguments(
            &args(json!({
                "query_text": "q",
                "score": null,
                "type": null,
                "end_date": null
            })),
            &clock(),
        )
        .expect("nulls are treated as omitted");

        assert_eq!(request.score, 0.75);
        assert_eq!(request.content_types, None);
        assert_eq!(request.end_date, "2025-03-14");
    }

    #[test]
    fn test_unknown_keys_are_dropped() {
        let normalized = validate_fields(
            SEARCH_FIELDS,
            &args(json!({"query_text": "q", "api_key": "sneaky"})),
            &clock(),
        )
        .expect("valid input");

        assert!(!normalized.contains_key("api_key"));
    }

    #[test]
    fn test_dates_are_opaque_strings() {
        let request = SearchRequest::from_arguments(
            &args(json!({
                "query_text": "q",
                "start_date": "last spring",
                "end_date": "2020-01-01"
            })),
            &clock(),
        )
        .expect("date format is not checked here");
        assert_eq!(request.start_date, "last spring");
    }

    #[test]
    fn test_enum_options_match_wire_spellings() {
        for option in CONTENT_TYPE_OPTIONS {
            assert!(serde_json::from_value::<ContentType>(json!(option)).is_ok());
        }
        for option in SOURCE_OPTIONS {
            assert!(serde_json::from_value::<Source>(json!(option)).is_ok());
        }
    }

    #[test]
    fn test_input_schema_projects_constraints_and_defaults() {
        let schema = input_schema().to_value();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["query_text"]));

        let properties = &schema["properties"];
        assert_eq!(properties["query_text"]["type"], "string");
        assert_eq!(properties["score"]["minimum"], json!(0.0));
        assert_eq!(properties["score"]["maximum"], json!(1.0));
        assert_eq!(properties["score"]["default"], json!(0.75));
        assert_eq!(properties["max_results"]["type"], "integer");
        assert_eq!(properties["max_results"]["minimum"], json!(1));
        assert_eq!(properties["max_results"]["default"], json!(10));
        assert_eq!(
            properties["type"]["items"]["enum"],
            json!(["text", "table", "chart"])
        );
        assert_eq!(
            properties["source"]["items"]["enum"],
            json!(["Federal Reserve", "Bank of England", "European Central Bank"])
        );
        assert_eq!(properties["start_date"]["default"], "2018-01-01");
        assert!(properties["end_date"].get("default").is_none());
        assert!(
            properties["end_date"]["description"]
                .as_str()
                .is_some_and(|text| text.contains("today"))
        );
    }
}
