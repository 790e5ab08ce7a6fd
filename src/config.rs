use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Path to the similarity artifact (already present on local disk)
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Recommendations returned when `k` is omitted
    #[serde(default = "default_k")]
    pub default_k: usize,

    /// Search results returned when `limit` is omitted
    #[serde(default = "default_search_limit")]
    pub default_search_limit: usize,
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/movie_recommender_model.h5")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_k() -> usize {
    10
}

fn default_search_limit() -> usize {
    20
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// `host:port` for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
