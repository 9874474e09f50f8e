use axum::{
    extract::{Query, State},
    Json,
};
use std::collections::HashMap;

use super::error::RecommendError;
use super::types::EnrichedResponse;
use crate::server::AppState;

// A repeated `query` key resolves to its last value.
pub async fn get_recommendations(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<EnrichedResponse>, RecommendError> {
    state
        .recommendations
        .recommend(params.get("query").map(String::as_str))
        .await
        .map(Json)
}
