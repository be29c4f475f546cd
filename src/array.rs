//! Array building blocks.
//!
//! Arrays in a [`ChunkStore`](crate::storage::store::ChunkStore) are uncompressed Zarr V2 arrays of a simple [`DataType`].
//! This module provides the data types, fill values and chunk grid shared by every array in a store.

pub mod chunk_grid;
pub mod data_type;
mod element;
mod endianness;
mod fill_value;
mod nan_chunk;

pub use self::{
    chunk_grid::{chunk_grid_shape, chunk_indices, ChunkIndex, IncompatibleDimensionalityError},
    data_type::{DataType, DataTypeCategory, UnsupportedDataTypeError},
    element::Element,
    endianness::{Endianness, NATIVE_ENDIAN},
    fill_value::{FillValue, IncompatibleFillValueError},
    nan_chunk::nan_chunk,
};

#[cfg(feature = "ndarray")]
pub use nan_chunk::nan_chunk_ndarray;

/// The shape of an array.
pub type ArrayShape = Vec<u64>;

/// The shape of a chunk.
pub type ChunkShape = Vec<u64>;

/// The dimension names of an array.
pub type DimensionNames = Vec<String>;

/// Convert an ndarray shape to an [`ArrayShape`].
#[cfg(feature = "ndarray")]
#[must_use]
pub fn ndarray_shape(shape: &[usize]) -> ArrayShape {
    shape.iter().map(|&extent| extent as u64).collect()
}
