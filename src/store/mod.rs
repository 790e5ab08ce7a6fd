//! Similarity store
//!
//! Binds one open, read-only similarity artifact to its in-memory title index.
//! Recommendations stream a single matrix row from disk per call, so memory
//! stays O(N) no matter how large the N×N matrix is.
//!
//! The store is shared across request handlers behind an `Arc`. Row reads take
//! a read lock on the artifact handle (the HDF5 library itself serializes the
//! actual reads); `close` takes the write lock, so it waits for in-flight reads. Callers should still stop
//! issuing requests before closing: anything after `close` fails with
//! [`StoreError::Closed`].

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use crate::error::StoreError;
use crate::models::TitleScore;

pub mod container;
pub mod ranking;
pub mod titles;

pub use container::{ContainerWriter, ScoreDType, TitleEncoding};
pub use titles::TitleIndex;

use container::Artifact;

/// Read operations the HTTP layer needs from a similarity source
pub trait SimilarityIndex: Send + Sync {
    /// Up to `k` titles most similar to `title`, best first, never `title` itself
    fn recommend(&self, title: &str, k: usize) -> Result<Vec<TitleScore>, StoreError>;

    /// Up to `limit` titles containing `query`, in index order
    fn search_titles(&self, query: &str, limit: usize) -> Vec<String>;

    /// Number of titles in the index
    fn title_count(&self) -> usize;
}

/// On-disk similarity matrix plus its title index
#[derive(Debug)]
pub struct SimilarityStore {
    path: PathBuf,
    artifact: RwLock<Option<Artifact>>,
    titles: TitleIndex,
}

impl SimilarityStore {
    /// Opens the artifact at `path` and validates its layout.
    ///
    /// Reads the matrix shape and the titles only; the matrix stays on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        std::fs::metadata(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound(path.to_path_buf()),
            _ => StoreError::Io(e),
        })?;

        let artifact = Artifact::open(path)?;
        let titles = TitleIndex::from(artifact.read_titles()?);

        if titles.is_empty() {
            tracing::warn!(path = %path.display(), "Similarity store has no titles");
        }

        tracing::info!(
            path = %path.display(),
            titles = titles.len(),
            dtype = %artifact.dtype(),
            "Loaded similarity store"
        );

        Ok(Self {
            path: path.to_path_buf(),
            artifact: RwLock::new(Some(artifact)),
            titles,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns up to `k` titles most similar to `title`.
    ///
    /// An unknown title yields an empty list. The self match is removed
    /// after sorting, so ties around it keep their row order.
    pub fn recommend(&self, title: &str, k: usize) -> Result<Vec<TitleScore>, StoreError> {
        if title.trim().is_empty() {
            return Err(StoreError::InvalidArgument("title is required".to_string()));
        }

        let Some(index) = self.titles.position(title) else {
            tracing::debug!(title, "Title not in index");
            return Ok(Vec::new());
        };

        if k == 0 {
            return Ok(Vec::new());
        }

        let row = self.read_row(index)?;

        let recommendations = ranking::top_k(&row, index, k)
            .into_iter()
            .filter_map(|(i, score)| self.titles.title(i).map(|t| TitleScore::new(t, score)))
            .collect();

        Ok(recommendations)
    }

    /// Returns up to `limit` titles containing `query` (case-insensitive)
    pub fn search_titles(&self, query: &str, limit: usize) -> Vec<String> {
        self.titles.search(query, limit)
    }

    pub fn title_count(&self) -> usize {
        self.titles.len()
    }

    pub fn is_closed(&self) -> bool {
        self.artifact
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Releases the file handle. Safe to call more than once.
    pub fn close(&self) -> Result<(), StoreError> {
        let mut slot = self.artifact.write().unwrap_or_else(PoisonError::into_inner);
        if slot.take().is_some() {
            tracing::info!(path = %self.path.display(), "Closed similarity store");
        }
        Ok(())
    }

    fn read_row(&self, index: usize) -> Result<Vec<f64>, StoreError> {
        let guard = self
            .artifact
            .read()
            .map_err(|_| StoreError::Internal("artifact lock poisoned".to_string()))?;
        let artifact = guard.as_ref().ok_or(StoreError::Closed)?;

        artifact.read_row(index).map_err(|e| {
            tracing::error!(error = %e, row = index, "Failed to read similarity row");
            StoreError::Internal(format!("failed to read row {index}: {e}"))
        })
    }
}

impl Drop for SimilarityStore {
    fn drop(&mut self) {
        let slot = self.artifact.get_mut().unwrap_or_else(PoisonError::into_inner);
        if slot.take().is_some() {
            tracing::debug!(path = %self.path.display(), "Similarity store dropped without close");
        }
    }
}

impl SimilarityIndex for SimilarityStore {
    fn recommend(&self, title: &str, k: usize) -> Result<Vec<TitleScore>, StoreError> {
        SimilarityStore::recommend(self, title, k)
    }

    fn search_titles(&self, query: &str, limit: usize) -> Vec<String> {
        SimilarityStore::search_titles(self, query, limit)
    }

    fn title_count(&self) -> usize {
        SimilarityStore::title_count(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn write_store(matrix: &[Vec<f64>], titles: &[&str]) -> NamedTempFile {
        let tmp = NamedTempFile::new().unwrap();
        ContainerWriter::new()
            .dtype(ScoreDType::F64)
            .write(tmp.path(), matrix, titles)
            .unwrap();
        tmp
    }

    fn abg() -> NamedTempFile {
        write_store(
            &[
                vec![1.0, 0.5, 0.2],
                vec![0.5, 1.0, 0.7],
                vec![0.2, 0.7, 1.0],
            ],
            &["Alpha", "Beta", "Gamma"],
        )
    }

    #[test]
    fn test_load_missing_file() {
        let err = SimilarityStore::load("/definitely/not/here.h5").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_load_non_square() {
        let tmp = write_store(&[vec![1.0, 0.5, 0.2], vec![0.5, 1.0, 0.7]], &["A", "B"]);
        let err = SimilarityStore::load(tmp.path()).unwrap_err();
        assert!(matches!(err, StoreError::Schema(ref msg) if msg.contains("(2, 3)")));
    }

    #[test]
    fn test_load_title_count_mismatch() {
        let tmp = write_store(&[vec![1.0, 0.5], vec![0.5, 1.0]], &["A", "B", "C"]);
        let err = SimilarityStore::load(tmp.path()).unwrap_err();
        assert!(
            matches!(err, StoreError::Schema(ref msg) if msg.contains("2") && msg.contains("3"))
        );
    }

    #[test]
    fn test_title_count() {
        let tmp = abg();
        let store = SimilarityStore::load(tmp.path()).unwrap();
        assert_eq!(store.title_count(), 3);
        assert_eq!(store.path(), tmp.path());
    }

    #[test]
    fn test_recommend_scenario() {
        let tmp = abg();
        let store = SimilarityStore::load(tmp.path()).unwrap();

        assert_eq!(
            store.recommend("alpha", 2).unwrap(),
            vec![TitleScore::new("Beta", 0.5), TitleScore::new("Gamma", 0.2)]
        );
        assert_eq!(
            store.recommend("ALPHA ", 1).unwrap(),
            vec![TitleScore::new("Beta", 0.5)]
        );
    }

    #[test]
    fn test_recommend_empty_title() {
        let tmp = abg();
        let store = SimilarityStore::load(tmp.path()).unwrap();

        assert!(matches!(
            store.recommend("", 3),
            Err(StoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            store.recommend("   ", 3),
            Err(StoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_recommend_unknown_title() {
        let tmp = abg();
        let store = SimilarityStore::load(tmp.path()).unwrap();
        assert!(store.recommend("nonexistent title", 3).unwrap().is_empty());
    }

    #[test]
    fn test_recommend_zero_k() {
        let tmp = abg();
        let store = SimilarityStore::load(tmp.path()).unwrap();
        assert!(store.recommend("Beta", 0).unwrap().is_empty());
    }

    #[test]
    fn test_recommend_single_title_store() {
        let tmp = write_store(&[vec![1.0]], &["Solo"]);
        let store = SimilarityStore::load(tmp.path()).unwrap();
        assert!(store.recommend("solo", 5).unwrap().is_empty());
    }

    #[test]
    fn test_recommend_after_close() {
        let tmp = abg();
        let store = SimilarityStore::load(tmp.path()).unwrap();
        store.close().unwrap();

        assert!(store.is_closed());
        assert!(matches!(store.recommend("alpha", 2), Err(StoreError::Closed)));
        // Unknown titles never touch the file.
        assert!(store.recommend("zeta", 2).unwrap().is_empty());
    }

    #[test]
    fn test_close_is_idempotent() {
        let tmp = abg();
        let store = SimilarityStore::load(tmp.path()).unwrap();
        assert!(!store.is_closed());
        store.close().unwrap();
        store.close().unwrap();
        assert!(store.is_closed());
    }

    #[test]
    fn test_search_works_after_close() {
        let tmp = abg();
        let store = SimilarityStore::load(tmp.path()).unwrap();
        store.close().unwrap();
        assert_eq!(store.search_titles("a", 10), vec!["Alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn test_through_trait_object() {
        let tmp = abg();
        let store: std::sync::Arc<dyn SimilarityIndex> =
            std::sync::Arc::new(SimilarityStore::load(tmp.path()).unwrap());

        assert_eq!(store.title_count(), 3);
        assert_eq!(store.search_titles("GAM", 10), vec!["Gamma"]);
        assert_eq!(
            store.recommend("gamma", 1).unwrap(),
            vec![TitleScore::new("Beta", 0.7)]
        );
    }
}
