use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::TitleScore,
    store::SimilarityIndex,
};

/// Service function for similarity recommendations
///
/// Row reads hit the disk, so the lookup runs on the blocking pool instead of
/// the async runtime.
pub async fn recommend(
    index: Arc<dyn SimilarityIndex>,
    title: String,
    k: usize,
) -> AppResult<Vec<TitleScore>> {
    let recommendations = tokio::task::spawn_blocking(move || index.recommend(&title, k))
        .await
        .map_err(|e| AppError::Internal(format!("Recommendation task failed: {}", e)))??;

    Ok(recommendations)
}
