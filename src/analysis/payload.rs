//! Analysis service wire types
//!
//! Request and response bodies of `POST /analyze-failures`. Payloads are
//! opaque beyond structural checks; optional sub-objects of the wrong shape
//! are treated as absent rather than failing the entry.

use crate::collector::FailureRecord;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Request body
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest<'a> {
    pub failures: &'a [FailureRecord],
    pub ai_provider: &'a str,
    pub ai_model: &'a str,
}

/// Suggested code change
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeFix {
    #[serde(default, deserialize_with = "lenient_string")]
    pub file: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub line: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub change: String,
}

/// Suspected product defect
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductBugReport {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub severity: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub component: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
}

/// Analysis of one failure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPayload {
    #[serde(default, deserialize_with = "lenient_string")]
    pub classification: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub details: String,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub affected_tests: Vec<String>,
    #[serde(default, deserialize_with = "object_or_none")]
    pub code_fix: Option<CodeFix>,
    #[serde(default, deserialize_with = "object_or_none")]
    pub product_bug_report: Option<ProductBugReport>,
}

impl AnalysisPayload {
    pub fn new(classification: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            classification: classification.into(),
            details: details.into(),
            ..Self::default()
        }
    }

    /// Structural check on a raw `analysis` value
    ///
    /// Only non-empty JSON objects are accepted.
    pub fn from_value(value: JsonValue) -> Result<Self, String> {
        match &value {
            JsonValue::Object(map) if !map.is_empty() => {
                serde_json::from_value(value).map_err(|e| e.to_string())
            }
            JsonValue::Object(_) => Err("empty analysis object".to_string()),
            other => Err(format!("analysis is not an object: {}", json_kind(other))),
        }
    }
}

/// One entry of the response's `failures` array, before validation
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEntry {
    #[serde(default)]
    pub test_name: Option<JsonValue>,
    #[serde(default)]
    pub analysis: Option<JsonValue>,
}

/// Response body
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub failures: Vec<JsonValue>,
}

pub(crate) fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Scalar rendered as text; null and containers become empty
fn scalar_to_string(value: JsonValue) -> String {
    match value {
        JsonValue::String(s) => s,
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_to_string(JsonValue::deserialize(deserializer)?))
}

fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match JsonValue::deserialize(deserializer)? {
        JsonValue::Array(items) => Ok(items
            .into_iter()
            .map(scalar_to_string)
            .filter(|s| !s.is_empty())
            .collect()),
        JsonValue::Null => Ok(Vec::new()),
        other => Err(de::Error::custom(format!(
            "affected_tests must be an array, got {}",
            json_kind(&other)
        ))),
    }
}

fn object_or_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: de::DeserializeOwned,
{
    match JsonValue::deserialize(deserializer)? {
        value @ JsonValue::Object(_) => serde_json::from_value(value)
            .map(Some)
            .map_err(de::Error::custom),
        _ => Ok(None),
    }
}
