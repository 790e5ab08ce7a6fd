use serde::{Deserialize, Serialize};

mod title;

pub use title::TitleScore;

/// Liveness payload for `/health`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    /// Number of titles in the loaded index
    pub titles: usize,
}

impl HealthResponse {
    pub fn ok(titles: usize) -> Self {
        Self {
            status: "ok".to_string(),
            titles,
        }
    }
}
