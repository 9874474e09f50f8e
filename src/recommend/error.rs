use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;

pub const MISSING_QUERY_MESSAGE: &str = "Missing 'movie' parameter";
pub const SCRIPT_ERROR_MESSAGE: &str = "Python script error";

#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    #[error("{}", MISSING_QUERY_MESSAGE)]
    MissingQuery,
    /// The recommender ran and reported an error of its own.
    #[error("{0}")]
    Upstream(String),
    /// The recommender output could not be turned into a document.
    #[error("recommender output could not be parsed")]
    Script { details: String },
    #[error("Failed to start recommender {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Recommender did not finish within {0:?}")]
    Timeout(Duration),
    #[error("Failed to collect recommender output: {0}")]
    Io(#[from] std::io::Error),
}

impl RecommendError {
    pub fn status(&self) -> StatusCode {
        match self {
            RecommendError::MissingQuery => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RecommendError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            RecommendError::MissingQuery => json!({ "error": MISSING_QUERY_MESSAGE }),
            RecommendError::Upstream(message) => json!({ "error": message }),
            RecommendError::Script { details } => json!({
                "error": SCRIPT_ERROR_MESSAGE,
                "details": details,
            }),
            other => json!({
                "error": SCRIPT_ERROR_MESSAGE,
                "details": other.to_string(),
            }),
        };
        (status, Json(body)).into_response()
    }
}
