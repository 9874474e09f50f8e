use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub recommender: RecommenderConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_port")]
    pub port: String,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: None,
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    #[serde(alias = "apikey")]
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(alias = "baseurl")]
    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,
    #[serde(default = "default_tmdb_timeout")]
    pub timeout_secs: u64,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_tmdb_base_url(),
            timeout_secs: default_tmdb_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecommenderConfig {
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    #[serde(default = "default_recommender_timeout")]
    pub timeout_secs: u64,
    /// Upper bound on recommender processes running at the same time.
    #[serde(default = "default_max_processes")]
    pub max_processes: usize,
    /// Poster lookups in flight per request.
    #[serde(default = "default_enrich_concurrency")]
    pub enrich_concurrency: usize,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            timeout_secs: default_recommender_timeout(),
            max_processes: default_max_processes(),
            enrich_concurrency: default_enrich_concurrency(),
        }
    }
}

fn default_port() -> String {
    "10000".to_string()
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_timeout() -> u64 {
    30
}

fn default_program() -> String {
    "python".to_string()
}

fn default_args() -> Vec<String> {
    vec!["recommendation.py".to_string()]
}

fn default_recommender_timeout() -> u64 {
    60
}

fn default_max_processes() -> usize {
    4
}

fn default_enrich_concurrency() -> usize {
    8
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_string(), e))?;

        Self::from_yaml(&content).map_err(|e| ConfigError::ParseError(path.to_string(), e))
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Load `path` if given. Without an explicit path, the default file is
    /// optional and plain defaults are used when it does not exist. Returns
    /// the file that was actually read, if any.
    pub fn load(path: Option<&str>, default_path: &str) -> Result<(Self, Option<String>), ConfigError> {
        let path = match path {
            Some(path) => path,
            None if Path::new(default_path).exists() => default_path,
            None => return Ok((Self::default(), None)),
        };
        Ok((Self::from_file(path)?, Some(path.to_string())))
    }

    /// Environment variables win over the config file.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = get("TMDB_API_KEY").filter(|k| !k.is_empty()) {
            self.tmdb.api_key = Some(key);
        }
        if let Some(url) = get("TMDB_BASE_URL").filter(|u| !u.is_empty()) {
            self.tmdb.base_url = url;
        }
        if let Some(port) = get("PORT").filter(|p| !p.is_empty()) {
            self.listen.port = port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recommender.program.trim().is_empty() {
            return Err(ConfigError::Invalid("recommender.program is empty".to_string()));
        }
        if self.recommender.max_processes == 0 {
            return Err(ConfigError::Invalid("recommender.max_processes must be at least 1".to_string()));
        }
        if self.recommender.enrich_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "recommender.enrich_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(String, serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
