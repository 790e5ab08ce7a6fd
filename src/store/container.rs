//! HDF5 similarity artifact.
//!
//! The artifact is the `.h5` file produced by the training pipeline with two
//! datasets:
//! - `similarity_matrix`: 2-D float dataset (`f32` or `f64`), shape `(N, N)`
//! - `movie_titles`: 1-D string dataset of length `N`, either fixed-length
//!   byte strings (numpy `S<w>`) or variable-length strings
//!
//! Titles are read eagerly. Matrix rows are read one hyperslab at a time, so
//! the full matrix is never materialized.

use std::path::Path;

use hdf5::types::{
    FixedAscii, FixedUnicode, FloatSize, TypeDescriptor, VarLenAscii, VarLenUnicode,
};
use hdf5::{Dataset, File};

use crate::error::StoreError;
use crate::store::titles::RawTitles;

/// Dataset name of the square similarity matrix
pub const MATRIX_DATASET: &str = "similarity_matrix";

/// Dataset name of the title index
pub const TITLES_DATASET: &str = "movie_titles";

/// Capacity used when reading fixed-length titles. Longer entries are
/// truncated by HDF5's string conversion.
pub const TITLE_WIDTH: usize = 256;

/// Element type of the similarity matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreDType {
    F32,
    F64,
}

impl ScoreDType {
    fn from_descriptor(descriptor: &TypeDescriptor) -> Option<Self> {
        match descriptor {
            TypeDescriptor::Float(FloatSize::U4) => Some(Self::F32),
            TypeDescriptor::Float(FloatSize::U8) => Some(Self::F64),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }
}

impl std::fmt::Display for ScoreDType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Open artifact: file handle plus the matrix dataset handle
#[derive(Debug)]
pub struct Artifact {
    matrix: Dataset,
    file: File,
    dim: usize,
    dtype: ScoreDType,
}

impl Artifact {
    /// Opens `path` and validates the matrix dataset
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let file = File::open(path).map_err(|e| {
            StoreError::Schema(format!(
                "{} is not a readable HDF5 file: {e}",
                path.display()
            ))
        })?;

        let matrix = file.dataset(MATRIX_DATASET).map_err(|e| {
            StoreError::Schema(format!("missing '{MATRIX_DATASET}' dataset: {e}"))
        })?;

        let dim = match matrix.shape().as_slice() {
            [rows, cols] if rows == cols => *rows,
            [rows, cols] => {
                return Err(StoreError::Schema(format!(
                    "{MATRIX_DATASET} must be square, got shape ({rows}, {cols})"
                )))
            }
            other => {
                return Err(StoreError::Schema(format!(
                    "{MATRIX_DATASET} must be square, got shape {other:?}"
                )))
            }
        };

        let descriptor = matrix
            .dtype()
            .and_then(|t| t.to_descriptor())
            .map_err(|e| StoreError::Schema(format!("{MATRIX_DATASET} has unreadable dtype: {e}")))?;
        let dtype = ScoreDType::from_descriptor(&descriptor).ok_or_else(|| {
            StoreError::Schema(format!(
                "{MATRIX_DATASET} has unsupported dtype {descriptor:?}, expected f32 or f64"
            ))
        })?;

        Ok(Self {
            matrix,
            file,
            dim,
            dtype,
        })
    }

    /// Number of rows (and columns)
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn dtype(&self) -> ScoreDType {
        self.dtype
    }

    /// Reads the title dataset fully into memory.
    ///
    /// The title count is checked against the matrix before anything is
    /// allocated.
    pub fn read_titles(&self) -> Result<RawTitles, StoreError> {
        let file = &self.file;
        let titles = file.dataset(TITLES_DATASET).map_err(|e| {
            StoreError::Schema(format!("missing '{TITLES_DATASET}' dataset: {e}"))
        })?;

        let count = match titles.shape().as_slice() {
            [count] => *count,
            other => {
                return Err(StoreError::Schema(format!(
                    "{TITLES_DATASET} must be one-dimensional, got shape {other:?}"
                )))
            }
        };
        if count != self.dim {
            return Err(StoreError::Schema(format!(
                "Mismatch: similarity size {} vs titles {count}",
                self.dim
            )));
        }

        let descriptor = titles
            .dtype()
            .and_then(|t| t.to_descriptor())
            .map_err(|e| StoreError::Schema(format!("{TITLES_DATASET} has unreadable dtype: {e}")))?;
        let read_err =
            |e: hdf5::Error| StoreError::Schema(format!("failed to read {TITLES_DATASET}: {e}"));

        let raw = match descriptor {
            TypeDescriptor::FixedAscii(_) => RawTitles::Bytes(
                titles
                    .read_raw::<FixedAscii<TITLE_WIDTH>>()
                    .map_err(read_err)?
                    .iter()
                    .map(|t| t.as_bytes().to_vec())
                    .collect(),
            ),
            TypeDescriptor::FixedUnicode(_) => RawTitles::Bytes(
                titles
                    .read_raw::<FixedUnicode<TITLE_WIDTH>>()
                    .map_err(read_err)?
                    .iter()
                    .map(|t| t.as_bytes().to_vec())
                    .collect(),
            ),
            TypeDescriptor::VarLenAscii => RawTitles::Bytes(
                titles
                    .read_raw::<VarLenAscii>()
                    .map_err(read_err)?
                    .iter()
                    .map(|t| t.as_bytes().to_vec())
                    .collect(),
            ),
            TypeDescriptor::VarLenUnicode => RawTitles::Text(
                titles
                    .read_raw::<VarLenUnicode>()
                    .map_err(read_err)?
                    .iter()
                    .map(|t| t.as_str().to_string())
                    .collect(),
            ),
            other => {
                return Err(StoreError::Schema(format!(
                    "{TITLES_DATASET} has unsupported dtype {other:?}, expected strings"
                )))
            }
        };

        Ok(raw)
    }

    /// Reads row `index` as one hyperslab. Memory use is one row.
    pub fn read_row(&self, index: usize) -> hdf5::Result<Vec<f64>> {
        if index >= self.dim {
            return Err(format!("row {index} out of range for dimension {}", self.dim).into());
        }
        let row = self.matrix.read_slice_1d::<f64, _>((index, ..))?;
        Ok(row.to_vec())
    }
}

/// How the writer stores the title index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleEncoding {
    /// Fixed-length ASCII strings, like numpy `S` arrays written by h5py
    FixedBytes,
    /// Variable-length UTF-8 strings, like h5py's `string_dtype()`
    Text,
}

/// Writes similarity artifacts in the layout [`Artifact::open`] expects.
///
/// The writer does not check that the matrix is square or that it matches
/// the title count; the reader is the one enforcing those rules.
#[derive(Debug, Clone, Copy)]
pub struct ContainerWriter {
    dtype: ScoreDType,
    titles: TitleEncoding,
}

impl Default for ContainerWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerWriter {
    pub fn new() -> Self {
        Self {
            dtype: ScoreDType::F32,
            titles: TitleEncoding::FixedBytes,
        }
    }

    pub fn dtype(mut self, dtype: ScoreDType) -> Self {
        self.dtype = dtype;
        self
    }

    pub fn title_encoding(mut self, encoding: TitleEncoding) -> Self {
        self.titles = encoding;
        self
    }

    /// Writes `matrix` (row-major, all rows the same length) and `titles` to `path`
    pub fn write<P, T>(&self, path: P, matrix: &[Vec<f64>], titles: &[T]) -> hdf5::Result<()>
    where
        P: AsRef<Path>,
        T: AsRef<str>,
    {
        let cols = matrix.first().map_or(0, Vec::len);
        if matrix.iter().any(|row| row.len() != cols) {
            return Err("matrix rows must all have the same length".into());
        }

        let file = File::create(path)?;
        let flat: Vec<f64> = matrix.iter().flatten().copied().collect();
        let shape = (matrix.len(), cols);

        match self.dtype {
            ScoreDType::F32 => {
                let narrowed: Vec<f32> = flat.iter().map(|&v| v as f32).collect();
                file.new_dataset::<f32>()
                    .shape(shape)
                    .create(MATRIX_DATASET)?
                    .write_raw(narrowed.as_slice())?;
            }
            ScoreDType::F64 => {
                file.new_dataset::<f64>()
                    .shape(shape)
                    .create(MATRIX_DATASET)?
                    .write_raw(flat.as_slice())?;
            }
        }

        match self.titles {
            TitleEncoding::FixedBytes => {
                let encoded = titles
                    .iter()
                    .map(|t| FixedAscii::<TITLE_WIDTH>::from_ascii(t.as_ref().as_bytes()))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| hdf5::Error::from(e.to_string()))?;
                file.new_dataset::<FixedAscii<TITLE_WIDTH>>()
                    .shape(encoded.len())
                    .create(TITLES_DATASET)?
                    .write_raw(encoded.as_slice())?;
            }
            TitleEncoding::Text => {
                let encoded = titles
                    .iter()
                    .map(|t| t.as_ref().parse::<VarLenUnicode>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| hdf5::Error::from(e.to_string()))?;
                file.new_dataset::<VarLenUnicode>()
                    .shape(encoded.len())
                    .create(TITLES_DATASET)?
                    .write_raw(encoded.as_slice())?;
            }
        }

        Ok(())
    }
}
