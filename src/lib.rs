pub mod config;
pub mod middleware;
pub mod recommend;
pub mod server;
pub mod tmdb;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "cinerec-server.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("TMDB client error: {0}")]
    Tmdb(#[from] tmdb::TmdbError),
    #[error("Server error: {0}")]
    Server(String),
}

pub async fn run(config_path: Option<&str>) -> Result<(), ServerError> {
    let (mut config, source) = config::Config::load(config_path, DEFAULT_CONFIG_PATH)?;
    config.apply_env();
    config.validate()?;

    match source {
        Some(path) => info!("Using config file: {}", path),
        None => info!("No config file, using defaults"),
    }
    info!(
        "Recommender: {} {}",
        config.recommender.program,
        config.recommender.args.join(" ")
    );
    if config.tmdb.api_key.is_none() {
        warn!("TMDB_API_KEY is not set, metadata requests will fail");
    }

    let tmdb = Arc::new(tmdb::TmdbClient::new(&config.tmdb)?);
    let recommender = Arc::new(recommend::ProcessRecommender::new(&config.recommender));
    let recommendations = Arc::new(recommend::RecommendationService::new(
        recommender,
        tmdb.clone(),
        config.recommender.enrich_concurrency,
    ));

    let address = config.listen.address.as_deref().unwrap_or("[::]");
    let port = &config.listen.port;
    let addr: SocketAddr = format!("{}:{}", address, port)
        .parse()
        .map_err(|e| ServerError::Server(format!("Invalid address: {}", e)))?;

    let state = server::AppState::new(tmdb, recommendations);
    let app = server::build_router(state);

    info!("Serving HTTP on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Server(format!("Failed to bind: {}", e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(format!("Server error: {}", e)))?;

    Ok(())
}
