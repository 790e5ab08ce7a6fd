use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{middleware::request_id::RequestId, routes::AppState, services::title_search};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
    limit: Option<i64>,
}

/// Handler for title search endpoint
pub async fn search(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<SearchQuery>,
) -> Json<Vec<String>> {
    // Non-positive limits yield no results rather than a rejection.
    let limit = params
        .limit
        .map_or(state.defaults.search_limit, |l| usize::try_from(l).unwrap_or(0));
    let titles = title_search::search_titles(&state.index, &params.q, limit);

    tracing::debug!(
        request_id = %request_id,
        query = %params.q,
        limit,
        matches = titles.len(),
        "Title search"
    );

    Json(titles)
}
