use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::types::{MediaKind, Video};
use crate::config::TmdbConfig;
use crate::recommend::PosterLookup;

#[derive(Debug, thiserror::Error)]
pub enum TmdbError {
    #[error("TMDB API key is not configured")]
    MissingApiKey,
    #[error("Failed to create HTTP client: {0}")]
    Client(reqwest::Error),
    #[error("{0}")]
    Request(#[from] reqwest::Error),
    #[error("Request failed with status code {0}")]
    Status(u16),
}

pub struct TmdbClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl TmdbClient {
    pub fn new(config: &TmdbConfig) -> Result<Self, TmdbError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(TmdbError::Client)?;

        Ok(Self {
            client,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET `{base_url}{path}` with the API key and `params` on the query
    /// string. Any non-2xx status is an error.
    pub async fn get_json(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, TmdbError> {
        let api_key = self.api_key.as_deref().ok_or(TmdbError::MissingApiKey)?;
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "TMDB request");

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", api_key)])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TmdbError::Status(status.as_u16()));
        }

        Ok(response.json::<Value>().await?)
    }

    /// The `results` list of a title's videos. `None` when the provider
    /// answered without a `results` array.
    pub async fn videos(&self, kind: MediaKind, id: &str) -> Result<Option<Vec<Video>>, TmdbError> {
        let path = format!("/{}/{}/videos", kind.as_str(), urlencoding::encode(id));
        let body = self.get_json(&path, &[]).await?;

        // Entries we cannot read are skipped rather than failing the lookup.
        let videos = body.get("results").and_then(Value::as_array).map(|results| {
            results
                .iter()
                .filter_map(|v| serde_json::from_value::<Video>(v.clone()).ok())
                .collect()
        });
        Ok(videos)
    }
}

#[async_trait]
impl PosterLookup for TmdbClient {
    async fn poster_path(&self, id: &str) -> Option<String> {
        let path = format!("/movie/{}", urlencoding::encode(id));
        match self.get_json(&path, &[]).await {
            Ok(body) => body
                .get("poster_path")
                .and_then(Value::as_str)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            Err(e) => {
                warn!(id = %id, error = %e, "Error fetching TMDB poster");
                None
            }
        }
    }
}
