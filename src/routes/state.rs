use std::sync::Arc;

use crate::{config::Config, store::SimilarityIndex};

/// Fallback sizes for requests that omit `k` or `limit`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryDefaults {
    pub recommend_k: usize,
    pub search_limit: usize,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            recommend_k: 10,
            search_limit: 20,
        }
    }
}

impl From<&Config> for QueryDefaults {
    fn from(config: &Config) -> Self {
        Self {
            recommend_k: config.default_k,
            search_limit: config.default_search_limit,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub index: Arc<dyn SimilarityIndex>,
    pub defaults: QueryDefaults,
}

impl AppState {
    pub fn new(index: Arc<dyn SimilarityIndex>, defaults: QueryDefaults) -> Self {
        Self { index, defaults }
    }
}
