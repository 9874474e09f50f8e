use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry produced by the external recommender. The recommender owns the
/// shape of the record; we only read `id` and add `poster_path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecommendationRecord(Map<String, Value>);

impl RecommendationRecord {
    /// The identifier as used in a provider URL. Numbers and non-empty
    /// strings qualify, anything else has no usable id.
    pub fn id(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn with_poster_path(mut self, poster_path: Option<String>) -> Self {
        let value = poster_path.map(Value::String).unwrap_or(Value::Null);
        self.0.insert("poster_path".to_string(), value);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecommendationDocument {
    Error(String),
    Recommendations(Vec<RecommendationRecord>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedResponse {
    pub recommendations: Vec<RecommendationRecord>,
}
