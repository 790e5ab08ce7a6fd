use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::TitleScore,
    routes::AppState,
    services::recommendations,
};

const NOT_FOUND_MESSAGE: &str = "Title not found. Try /titles?q= for suggestions.";

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    title: String,
    k: Option<usize>,
}

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<RecommendQuery>,
) -> AppResult<Json<Vec<TitleScore>>> {
    let k = params.k.unwrap_or(state.defaults.recommend_k);

    tracing::info!(
        request_id = %request_id,
        title = %params.title,
        k,
        "Processing recommendation request"
    );

    let results = recommendations::recommend(state.index.clone(), params.title, k).await?;

    if results.is_empty() {
        return Err(AppError::NotFound(NOT_FOUND_MESSAGE.to_string()));
    }

    tracing::info!(
        request_id = %request_id,
        count = results.len(),
        "Recommendations served"
    );

    Ok(Json(results))
}
