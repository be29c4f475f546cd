//! The regular chunk grid of chunk store arrays.
//!
//! Every array in a [`ChunkStore`](crate::storage::store::ChunkStore) shares the store's shape and chunk shape.
//! The number of chunks along each dimension is `shape / chunks` rounded down, so a trailing partial chunk is never part of the grid.

use derive_more::{Deref, From};
use itertools::Itertools;
use thiserror::Error;

use super::ArrayShape;

/// The zero-based indices of a chunk in a chunk grid.
///
/// Rendered as the indices joined with `.`, e.g. `1.0.3`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Deref, From)]
pub struct ChunkIndex(Vec<u64>);

impl ChunkIndex {
    /// Create a new chunk index.
    #[must_use]
    pub fn new(indices: Vec<u64>) -> Self {
        Self(indices)
    }

    /// The all-zero chunk index of dimensionality `ndim`.
    #[must_use]
    pub fn zeros(ndim: usize) -> Self {
        Self(vec![0; ndim])
    }

    /// Parse a chunk index from its `.` separated encoding.
    ///
    /// Returns [`None`] if any component is not an unsigned integer.
    #[must_use]
    pub fn parse(encoded: &str) -> Option<Self> {
        encoded
            .split('.')
            .map(|index| index.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()
            .map(Self)
    }

    /// Return the indices.
    #[must_use]
    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }
}

impl From<&[u64]> for ChunkIndex {
    fn from(indices: &[u64]) -> Self {
        Self(indices.to_vec())
    }
}

impl core::fmt::Display for ChunkIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0.iter().join("."))
    }
}

/// An incompatible dimensionality error.
#[derive(Copy, Clone, Debug, Error)]
#[error("incompatible dimensionality {0}, expected {1}")]
pub struct IncompatibleDimensionalityError(usize, usize);

impl IncompatibleDimensionalityError {
    /// Create a new incompatible dimensionality error.
    #[must_use]
    pub const fn new(got: usize, expected: usize) -> Self {
        Self(got, expected)
    }
}

/// Returns the number of chunks along each dimension, `floor(shape[i] / chunks[i])`.
///
/// A zero chunk extent yields zero chunks along that dimension.
///
/// # Errors
/// Returns [`IncompatibleDimensionalityError`] if `shape` and `chunks` have different lengths.
pub fn chunk_grid_shape(
    shape: &[u64],
    chunks: &[u64],
) -> Result<ArrayShape, IncompatibleDimensionalityError> {
    if shape.len() == chunks.len() {
        Ok(std::iter::zip(shape, chunks)
            .map(|(&shape, &chunks)| shape.checked_div(chunks).unwrap_or(0))
            .collect())
    } else {
        Err(IncompatibleDimensionalityError(chunks.len(), shape.len()))
    }
}

/// Returns an iterator over every chunk index of a grid of shape `grid_shape` in C order (last dimension fastest).
pub fn chunk_indices(grid_shape: &[u64]) -> impl Iterator<Item = ChunkIndex> + '_ {
    grid_shape
        .iter()
        .map(|&chunks| 0..chunks)
        .multi_cartesian_product()
        .map(ChunkIndex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_index_encoding() {
        let chunk_index = ChunkIndex::new(vec![1, 0, 3]);
        assert_eq!(chunk_index.to_string(), "1.0.3");
        assert_eq!(ChunkIndex::parse("1.0.3"), Some(chunk_index));
        assert_eq!(ChunkIndex::zeros(2).to_string(), "0.0");
        assert_eq!(ChunkIndex::parse("1.a"), None);
        assert_eq!(ChunkIndex::parse(""), None);
    }

    #[test]
    fn chunk_grid_shape_floor() {
        assert_eq!(chunk_grid_shape(&[4, 8, 16], &[2, 4, 8]).unwrap(), vec![2, 2, 2]);
        // Trailing partial chunks are not part of the grid
        assert_eq!(chunk_grid_shape(&[5, 9], &[2, 4]).unwrap(), vec![2, 2]);
        assert_eq!(chunk_grid_shape(&[3], &[4]).unwrap(), vec![0]);
        assert!(chunk_grid_shape(&[3, 3], &[1]).is_err());
    }

    #[test]
    fn chunk_indices_c_order() {
        let indices: Vec<String> = chunk_indices(&[2, 3]).map(|index| index.to_string()).collect();
        assert_eq!(indices, ["0.0", "0.1", "0.2", "1.0", "1.1", "1.2"]);
        assert_eq!(chunk_indices(&[2, 0, 2]).count(), 0);
        assert_eq!(chunk_indices(&[2, 2, 2]).count(), 8);
    }
}
