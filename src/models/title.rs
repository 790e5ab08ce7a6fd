use serde::{Deserialize, Serialize};

/// A recommended title with its similarity score
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TitleScore {
    /// Title text exactly as stored in the title index
    pub title: String,
    pub score: f64,
}

impl TitleScore {
    pub fn new(title: impl Into<String>, score: f64) -> Self {
        Self {
            title: title.into(),
            score,
        }
    }
}
