use serde::Deserialize;
use serde_json::Value;

use super::types::{RecommendationDocument, RecommendationRecord};

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("no JSON object found in recommender output")]
    NoObject,
    #[error("invalid recommender JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    recommendations: Option<Vec<RecommendationRecord>>,
}

/// Returns the text between the first `{` and the last `}`, inclusive.
///
/// The recommender is free to print log lines around its result, so the
/// object is cut out of the surrounding text. Output holding more than one
/// object, or stray braces in the chatter, yields a span that fails to parse.
pub fn extract_json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

pub fn parse_document(text: &str) -> Result<RecommendationDocument, ExtractError> {
    let span = extract_json_span(text).ok_or(ExtractError::NoObject)?;
    let raw: RawDocument = serde_json::from_str(span)?;

    if let Some(message) = raw.error.as_ref().and_then(error_message) {
        return Ok(RecommendationDocument::Error(message));
    }

    Ok(RecommendationDocument::Recommendations(
        raw.recommendations.unwrap_or_default(),
    ))
}

// Only a "truthy" error field counts: null, false, 0 and "" are ignored.
fn error_message(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}
