use std::sync::Arc;

use crate::store::SimilarityIndex;

/// Service function for title search
///
/// Scans the in-memory title index only; no I/O happens here.
pub fn search_titles(index: &Arc<dyn SimilarityIndex>, query: &str, limit: usize) -> Vec<String> {
    index.search_titles(query, limit)
}
