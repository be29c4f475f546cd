//! Zarr storage.
//!
//! A Zarr store maps string keys to byte values.
//! This module defines the abstract store interfaces ([`ReadableStorageTraits`], [`ListableStorageTraits`] and [`WritableStorageTraits`]), the read only [`ChunkStore`](store::ChunkStore), and [storage adapters](storage_adapter) which wrap any store to log or measure calls.
//!
//! The key-space of a chunk store follows the Zarr V2 storage layout:
//!  - `.zgroup` and `.zattrs` at the root,
//!  - `<array>/.zarray` and `<array>/.zattrs` for each array, and
//!  - `<array>/<i0>.<i1>.….<ik>` for each chunk.

pub mod storage_adapter;
mod storage_sync;
pub mod store;
mod store_key;
mod store_prefix;

use std::sync::Arc;

use thiserror::Error;

use crate::{
    array::ChunkIndex,
    byte_range::{ByteOffset, ByteRange, InvalidByteRangeError},
};

pub use bytes::Bytes;

pub use store_key::{StoreKey, StoreKeyError, StoreKeys};
pub use store_prefix::{StorePrefix, StorePrefixError, StorePrefixes};

pub use self::storage_sync::{
    discover_arrays, discover_children, retrieve_array_metadata_v2, retrieve_attributes,
    retrieve_chunk, retrieve_partial_values, ListableStorageTraits, ReadableListableStorageTraits,
    ReadableStorageTraits, ReadableWritableListableStorageTraits, ReadableWritableStorageTraits,
    WritableStorageTraits,
};

pub use self::store::chunk_resolver::ChunkResolverError;

/// An alias for bytes which may or may not be available.
///
/// When a value is read from a store, it returns `MaybeBytes` which is [`None`] if the key is not available.
pub type MaybeBytes = Option<Bytes>;

/// [`Arc`] wrapped readable storage.
pub type ReadableStorage = Arc<dyn ReadableStorageTraits>;

/// [`Arc`] wrapped readable and listable storage.
pub type ReadableListableStorage = Arc<dyn ReadableListableStorageTraits>;

/// [`Arc`] wrapped readable, writable, and listable storage.
pub type ReadableWritableListableStorage = Arc<dyn ReadableWritableListableStorageTraits>;

/// A [`StoreKey`] and [`ByteRange`].
#[derive(Debug, Clone)]
pub struct StoreKeyRange {
    /// The key for the range.
    key: StoreKey,
    /// The byte range.
    byte_range: ByteRange,
}

impl StoreKeyRange {
    /// Create a new [`StoreKeyRange`].
    #[must_use]
    pub const fn new(key: StoreKey, byte_range: ByteRange) -> Self {
        Self { key, byte_range }
    }

    /// Returns the key.
    #[must_use]
    pub const fn key(&self) -> &StoreKey {
        &self.key
    }

    /// Returns the byte range.
    #[must_use]
    pub const fn byte_range(&self) -> ByteRange {
        self.byte_range
    }
}

impl std::fmt::Display for StoreKeyRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}:{}", self.key, self.byte_range)
    }
}

/// A [`StoreKey`], [`ByteOffset`], and value (bytes).
#[derive(Debug, Clone)]
#[must_use]
pub struct StoreKeyStartValue<'a> {
    /// The key.
    key: StoreKey,
    /// The starting byte offset.
    start: ByteOffset,
    /// The store value.
    value: &'a [u8],
}

impl StoreKeyStartValue<'_> {
    /// Create a new [`StoreKeyStartValue`].
    pub const fn new(key: StoreKey, start: ByteOffset, value: &[u8]) -> StoreKeyStartValue<'_> {
        StoreKeyStartValue { key, start, value }
    }

    /// Returns the key.
    #[must_use]
    pub const fn key(&self) -> &StoreKey {
        &self.key
    }

    /// Returns the starting byte offset.
    #[must_use]
    pub const fn start(&self) -> ByteOffset {
        self.start
    }

    /// Returns the value.
    #[must_use]
    pub const fn value(&self) -> &[u8] {
        self.value
    }

    /// Get the offset of exclusive end of the [`StoreKeyStartValue`].
    #[must_use]
    pub const fn end(&self) -> ByteOffset {
        self.start + self.value.len() as u64
    }
}

/// [`StoreKeys`] and [`StorePrefixes`].
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct StoreKeysPrefixes {
    keys: StoreKeys,
    prefixes: StorePrefixes,
}

impl StoreKeysPrefixes {
    /// Create a new [`StoreKeysPrefixes`].
    #[must_use]
    pub fn new(keys: StoreKeys, prefixes: StorePrefixes) -> Self {
        Self { keys, prefixes }
    }

    /// Returns the keys.
    #[must_use]
    pub const fn keys(&self) -> &StoreKeys {
        &self.keys
    }

    /// Returns the prefixes.
    #[must_use]
    pub const fn prefixes(&self) -> &StorePrefixes {
        &self.prefixes
    }
}

/// A storage error.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A write operation was attempted on a read only store.
    #[error("a write operation was attempted on a read only store")]
    ReadOnly,
    /// A key was not found.
    #[error("key {0} not found")]
    KeyNotFound(StoreKey),
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// An error parsing the metadata for a key.
    #[error("error parsing metadata for {0}: {1}")]
    InvalidMetadata(StoreKey, String),
    /// An invalid store prefix.
    #[error("invalid store prefix {0}")]
    StorePrefixError(#[from] StorePrefixError),
    /// An invalid store key.
    #[error("invalid store key {0}")]
    InvalidStoreKey(#[from] StoreKeyError),
    /// An invalid byte range.
    #[error("invalid byte range {0}")]
    InvalidByteRangeError(#[from] InvalidByteRangeError),
    /// A chunk resolver failed.
    #[error(transparent)]
    ResolverError(#[from] ChunkResolverError),
    /// A chunk resolver returned bytes of an unexpected length.
    #[error("resolved chunk {key} has {got} bytes, expected {expected}")]
    InvalidChunkSize {
        /// The chunk key.
        key: StoreKey,
        /// The expected chunk size in bytes.
        expected: u64,
        /// The resolved chunk size in bytes.
        got: u64,
    },
    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl From<&str> for StorageError {
    fn from(err: &str) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for StorageError {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}

/// Return the Zarr V2 group metadata key (`.zgroup`) of the root group.
#[must_use]
pub fn meta_key_v2_group() -> StoreKey {
    unsafe { StoreKey::new_unchecked(".zgroup") }
}

/// Return the Zarr V2 user-defined attributes key (`.zattrs`) of the root group.
#[must_use]
pub fn meta_key_v2_attributes() -> StoreKey {
    unsafe { StoreKey::new_unchecked(".zattrs") }
}

/// Return the Zarr V2 array metadata key (`<array_name>/.zarray`).
///
/// # Errors
/// Returns [`StoreKeyError`] if `array_name` is empty or starts with `/`.
pub fn meta_key_v2_array(array_name: &str) -> Result<StoreKey, StoreKeyError> {
    StoreKey::new(format!("{array_name}/.zarray"))
}

/// Return the Zarr V2 array user-defined attributes key (`<array_name>/.zattrs`).
///
/// # Errors
/// Returns [`StoreKeyError`] if `array_name` is empty or starts with `/`.
pub fn array_meta_key_v2_attributes(array_name: &str) -> Result<StoreKey, StoreKeyError> {
    StoreKey::new(format!("{array_name}/.zattrs"))
}

/// Return the data key (`<array_name>/<i0>.<i1>.….<ik>`) of a chunk.
///
/// # Errors
/// Returns [`StoreKeyError`] if `array_name` is empty or starts with `/`, or `chunk_index` is empty.
pub fn data_key(array_name: &str, chunk_index: &[u64]) -> Result<StoreKey, StoreKeyError> {
    let chunk_index = ChunkIndex::from(chunk_index);
    StoreKey::new(format!("{array_name}/{chunk_index}"))
}

/// Return the prefix (`<array_name>/`) of an array.
///
/// # Errors
/// Returns [`StorePrefixError`] if `array_name` is empty or starts with `/`.
pub fn array_prefix(array_name: &str) -> Result<StorePrefix, StorePrefixError> {
    StorePrefix::new(format!("{array_name}/"))
}
