use axum::{
    extract::Request,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::recommend::RecommendationService;
use crate::tmdb::TmdbClient;

#[derive(Clone)]
pub struct AppState {
    pub tmdb: Arc<TmdbClient>,
    pub recommendations: Arc<RecommendationService>,
}

impl AppState {
    pub fn new(tmdb: Arc<TmdbClient>, recommendations: Arc<RecommendationService>) -> Self {
        Self {
            tmdb,
            recommendations,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let tmdb_routes = Router::new()
        .route("/search", get(crate::tmdb::search))
        .route("/popular", get(crate::tmdb::popular))
        .route("/trending", get(crate::tmdb::trending))
        .route("/toprated", get(crate::tmdb::top_rated))
        .route("/nowplaying", get(crate::tmdb::now_playing))
        .route("/trailer/:id", get(crate::tmdb::trailer));

    let ai_routes = Router::new().route("/recommend", get(crate::recommend::get_recommendations));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api/tmdb", tmdb_routes)
        .nest("/api/ai", ai_routes)
        .fallback(fallback_handler)
        .layer(axum::middleware::from_fn(crate::middleware::log_request))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CACHE_CONTROL, "no-cache, no-store")],
        "Healthy",
    )
}

async fn fallback_handler(req: Request) -> impl IntoResponse {
    if req.method() == axum::http::Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    StatusCode::NOT_FOUND.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TmdbConfig;
    use crate::recommend::{PosterLookup, RecommendError, RecommendationDocument, Recommender};
    use crate::tmdb::testutil::spawn_fake_tmdb;
    use async_trait::async_trait;
    use axum::{
        body::Body,
        extract::{Path, Query},
        http::Request,
        response::Response,
        Json,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    struct StubRecommender {
        output: Result<&'static str, &'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Recommender for StubRecommender {
        async fn recommend(&self, _query: &str) -> Result<RecommendationDocument, RecommendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.output {
                Ok(text) => Ok(crate::recommend::extract::parse_document(text).unwrap()),
                Err(details) => Err(RecommendError::Script {
                    details: details.to_string(),
                }),
            }
        }
    }

    struct StubPosters;

    #[async_trait]
    impl PosterLookup for StubPosters {
        async fn poster_path(&self, id: &str) -> Option<String> {
            match id {
                "1" => Some("p1".to_string()),
                _ => None,
            }
        }
    }

    async fn fake_movie(
        Path(id): Path<String>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Response {
        if params.get("page").map(String::as_str) != Some("1") {
            return StatusCode::BAD_REQUEST.into_response();
        }
        match id.as_str() {
            "popular" | "top_rated" | "now_playing" => {
                let results: Vec<Value> = (0..20).map(|i| json!({ "id": i })).collect();
                Json(json!({ "page": 1, "total_results": 20, "results": results })).into_response()
            }
            _ => StatusCode::NOT_FOUND.into_response(),
        }
    }

    async fn fake_search(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        Json(json!({ "results": [{ "name": params.get("query").cloned().unwrap_or_default() }] }))
    }

    async fn fake_movie_videos(Path(id): Path<String>) -> Response {
        match id.as_str() {
            "1" => Json(json!({ "results": [] })).into_response(),
            "2" => Json(json!({ "results": [{ "key": "vim", "site": "Vimeo", "type": "Trailer" }] }))
                .into_response(),
            "3" => Json(json!({ "results": [
                { "key": "teaser", "site": "YouTube", "type": "Teaser" },
                { "key": "main", "site": "YouTube", "type": "Trailer" }
            ] }))
            .into_response(),
            "5" | "6" => Json(json!({ "id": id })).into_response(),
            _ => StatusCode::NOT_FOUND.into_response(),
        }
    }

    async fn fake_tv_videos(Path(id): Path<String>) -> Response {
        match id.as_str() {
            "1" => Json(json!({ "results": [{ "key": "tvkey", "site": "YouTube", "type": "Trailer" }] }))
                .into_response(),
            "5" => Json(json!({ "id": 5 })).into_response(),
            _ => StatusCode::NOT_FOUND.into_response(),
        }
    }

    async fn app_with(
        output: Result<&'static str, &'static str>,
        api_key: Option<&str>,
    ) -> (Router, Arc<StubRecommender>) {
        let fake = Router::new()
            .route("/movie/:id", get(fake_movie))
            .route("/movie/:id/videos", get(fake_movie_videos))
            .route("/tv/:id/videos", get(fake_tv_videos))
            .route("/search/multi", get(fake_search))
            .route("/trending/all/day", get(|| async { Json(json!({ "results": [1, 2, 3] })) }));
        let base_url = spawn_fake_tmdb(fake).await;

        let tmdb = Arc::new(
            TmdbClient::new(&TmdbConfig {
                api_key: api_key.map(str::to_string),
                base_url,
                timeout_secs: 5,
            })
            .unwrap(),
        );
        let stub = Arc::new(StubRecommender {
            output,
            calls: AtomicUsize::new(0),
        });
        let service = Arc::new(RecommendationService::new(stub.clone(), Arc::new(StubPosters), 4));
        (build_router(AppState::new(tmdb, service)), stub)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    const TWO_TITLES: &str =
        r#"Loading...{"recommendations":[{"id":1,"title":"A"},{"id":2,"title":"B"}]}"#;

    #[tokio::test]
    async fn test_recommend_enriches_in_order() {
        let (app, stub) = app_with(Ok(TWO_TITLES), Some("k")).await;
        let (status, body) = get_json(app, "/api/ai/recommend?query=the%20matrix").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"recommendations":[
                {"id":1,"title":"A","poster_path":"p1"},
                {"id":2,"title":"B","poster_path":null}
            ]})
        );
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recommend_missing_query() {
        for uri in ["/api/ai/recommend", "/api/ai/recommend?query=", "/api/ai/recommend?movie=Heat"] {
            let (app, stub) = app_with(Ok(TWO_TITLES), Some("k")).await;
            let (status, body) = get_json(app, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body, json!({"error": "Missing 'movie' parameter"}));
            assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_repeated_query_keeps_last_value() {
        let (app, stub) = app_with(Ok(TWO_TITLES), Some("k")).await;
        let (status, body) = get_json(app, "/api/ai/recommend?query=a&query=Heat").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recommendations"][0]["poster_path"], json!("p1"));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);

        let (app, _) = app_with(Ok(TWO_TITLES), Some("k")).await;
        let (status, body) = get_json(app, "/api/tmdb/search?query=a&query=heat").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"][0]["name"], json!("heat"));
    }

    #[tokio::test]
    async fn test_recommend_upstream_error() {
        let (app, _) = app_with(Ok(r#"{"error":"no match"}"#), Some("k")).await;
        let (status, body) = get_json(app, "/api/ai/recommend?query=zzz").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "no match"}));
    }

    #[tokio::test]
    async fn test_recommend_script_error() {
        let (app, _) = app_with(Err("Traceback: KeyError 'title'"), Some("k")).await;
        let (status, body) = get_json(app, "/api/ai/recommend?query=Heat").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"error": "Python script error", "details": "Traceback: KeyError 'title'"})
        );
    }

    #[tokio::test]
    async fn test_lists_are_limited() {
        for uri in ["/api/tmdb/popular", "/api/tmdb/toprated", "/api/tmdb/nowplaying"] {
            let (app, _) = app_with(Ok(TWO_TITLES), Some("k")).await;
            let (status, body) = get_json(app, uri).await;
            assert_eq!(status, StatusCode::OK, "{}", uri);
            assert_eq!(body["results"].as_array().unwrap().len(), 12);
            assert_eq!(body["total_results"], json!(20));
        }

        let (app, _) = app_with(Ok(TWO_TITLES), Some("k")).await;
        let (status, body) = get_json(app, "/api/tmdb/trending").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"], json!([1, 2, 3]));
    }

    #[tokio::test]
    async fn test_search() {
        let (app, _) = app_with(Ok(TWO_TITLES), Some("k")).await;
        let (status, body) = get_json(app, "/api/tmdb/search?query=blade%20runner").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"][0]["name"], json!("blade runner"));

        let (app, _) = app_with(Ok(TWO_TITLES), Some("k")).await;
        let (status, body) = get_json(app, "/api/tmdb/search").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "Query parameter is required"}));
    }

    #[tokio::test]
    async fn test_provider_failure() {
        let (app, _) = app_with(Ok(TWO_TITLES), None).await;
        let (status, body) = get_json(app, "/api/tmdb/popular").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], json!("Error fetching data from TMDB"));
        assert_eq!(body["error"], json!("TMDB API key is not configured"));
    }

    #[tokio::test]
    async fn test_trailer() {
        let cases = [
            ("1", json!({"key": "tvkey"})),
            ("2", json!({"key": null, "message": "No trailer available"})),
            ("3", json!({"key": "main"})),
            ("404", json!({"key": null, "message": "No trailer available"})),
            ("5", json!({"key": null, "message": "No trailer found"})),
            ("6", json!({"key": null, "message": "No trailer found"})),
        ];
        for (id, expected) in cases {
            let (app, _) = app_with(Ok(TWO_TITLES), Some("k")).await;
            let (status, body) = get_json(app, &format!("/api/tmdb/trailer/{}", id)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, expected, "trailer {}", id);
        }
    }

    #[tokio::test]
    async fn test_health_and_fallback() {
        let (app, _) = app_with(Ok(TWO_TITLES), Some("k")).await;
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
