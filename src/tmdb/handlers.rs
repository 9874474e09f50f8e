use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, error, warn};

use super::client::TmdbError;
use super::types::{MediaKind, TrailerResponse, Video};
use crate::server::AppState;

// Lists are cut down to this many results before they go out.
const LIST_LIMIT: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("Query parameter is required")]
    MissingQuery,
    #[error("Error fetching data from TMDB: {0}")]
    Upstream(#[from] TmdbError),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            ProxyError::MissingQuery => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": "Query parameter is required" })),
            )
                .into_response(),
            ProxyError::Upstream(e) => {
                error!(error = %e, "TMDB API error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "message": "Error fetching data from TMDB",
                        "error": e.to_string(),
                    })),
                )
                    .into_response()
            }
        }
    }
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ProxyError> {
    let query = params
        .get("query")
        .filter(|q| !q.is_empty())
        .ok_or(ProxyError::MissingQuery)?;

    let body = state
        .tmdb
        .get_json("/search/multi", &[("query", query.as_str())])
        .await?;
    Ok(Json(body))
}

pub async fn popular(State(state): State<AppState>) -> Result<Json<Value>, ProxyError> {
    fetch_list(&state, "/movie/popular").await
}

pub async fn trending(State(state): State<AppState>) -> Result<Json<Value>, ProxyError> {
    fetch_list(&state, "/trending/all/day").await
}

pub async fn top_rated(State(state): State<AppState>) -> Result<Json<Value>, ProxyError> {
    fetch_list(&state, "/movie/top_rated").await
}

pub async fn now_playing(State(state): State<AppState>) -> Result<Json<Value>, ProxyError> {
    fetch_list(&state, "/movie/now_playing").await
}

async fn fetch_list(state: &AppState, path: &str) -> Result<Json<Value>, ProxyError> {
    let mut body = state.tmdb.get_json(path, &[("page", "1")]).await?;
    limit_results(&mut body, LIST_LIMIT);
    Ok(Json(body))
}

fn limit_results(body: &mut Value, limit: usize) {
    if let Some(results) = body.get_mut("results").and_then(Value::as_array_mut) {
        results.truncate(limit);
    }
}

/// Finds a YouTube trailer for a title, trying the movie catalog first and
/// the TV catalog when that yields nothing. A failed lookup counts as an
/// empty list; only a provider answer without a `results` list leaves us
/// with nothing to search. Always answers 200.
pub async fn trailer(State(state): State<AppState>, Path(id): Path<String>) -> Json<TrailerResponse> {
    let mut videos = Some(Vec::new());

    match state.tmdb.videos(MediaKind::Movie, &id).await {
        Ok(movie_videos) => videos = movie_videos,
        Err(e) => debug!(id = %id, error = %e, "No movie videos"),
    }

    if videos.as_ref().map_or(true, Vec::is_empty) {
        match state.tmdb.videos(MediaKind::Tv, &id).await {
            Ok(tv_videos) => videos = tv_videos,
            Err(e) => debug!(id = %id, error = %e, "No TV videos"),
        }
    }

    let Some(videos) = videos else {
        warn!(id = %id, "TMDB videos response without results");
        return Json(TrailerResponse::missing("No trailer found"));
    };

    match pick_trailer(&videos).and_then(|v| v.key.clone()) {
        Some(key) => Json(TrailerResponse::found(key)),
        None => Json(TrailerResponse::missing("No trailer available")),
    }
}

fn pick_trailer(videos: &[Video]) -> Option<&Video> {
    let playable = move || videos.iter().filter(|v| v.is_youtube() && v.key.is_some());
    playable()
        .find(|v| v.is_trailer())
        .or_else(|| playable().next())
}
