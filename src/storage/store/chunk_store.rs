//! A read only Zarr V2 store whose chunks are materialised on read.
//!
//! A [`ChunkStore`] is configured with a [`ChunkStoreBuilder`] and is immutable once built.
//! It holds two kinds of values:
//!  - static values: metadata documents and fully materialised chunks, and
//!  - lazy chunks, which invoke a [`ChunkResolver`](chunk_resolver::ChunkResolver) on every read.
//!
//! ### Example
//! ```rust
//! # use zarrs_chunk_store::array::DataType;
//! # use zarrs_chunk_store::storage::{Bytes, ReadableStorageTraits, StoreKey, ChunkResolverError};
//! # use zarrs_chunk_store::storage::store::{ChunkStore, ChunkStoreBuilder, LazyArrayOptions, NanArrayOptions};
//! let mut builder = ChunkStoreBuilder::new(["time", "y", "x"], [4, 8, 16], [2, 4, 8])?;
//! builder.add_lazy_array(
//!     "var",
//!     LazyArrayOptions::new(DataType::UInt8).with_resolver(
//!         |store: &ChunkStore, _name: &str, chunk_index: &[u64]| -> Result<Bytes, ChunkResolverError> {
//!             let num_elements = store.chunks().iter().product::<u64>() as usize;
//!             Ok(Bytes::from(vec![chunk_index[0] as u8; num_elements]))
//!         },
//!     ),
//! )?;
//! builder.add_nan_array("mask", NanArrayOptions::new(DataType::UInt8))?;
//! let store = builder.build();
//!
//! let chunk = store.get(&StoreKey::new("var/1.0.0")?)?.unwrap();
//! assert_eq!(chunk.len(), 64);
//! assert!(chunk.iter().all(|&value| value == 1));
//! assert_eq!(store.get(&StoreKey::new("mask/0.0.0")?)?.unwrap()[0], 255);
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```

pub mod chunk_resolver;
mod chunk_store_builder;

use std::collections::HashMap;

use itertools::Itertools;

pub use chunk_store_builder::{
    ChunkStoreBuilder, ChunkStoreCreateError, LazyArrayOptions, NanArrayOptions,
};

use crate::{
    array::{ArrayShape, ChunkIndex, ChunkShape, DimensionNames},
    byte_range::{extract_byte_ranges, ByteRange},
    config::global_config,
    storage::{
        Bytes, ListableStorageTraits, MaybeBytes, ReadableStorageTraits, StorageError, StoreKey,
        StoreKeyStartValue, StoreKeys, StoreKeysPrefixes, StorePrefix, WritableStorageTraits,
    },
};

use self::chunk_resolver::ChunkResolverRef;

/// A value of a [`ChunkStore`].
#[derive(Clone)]
pub enum ChunkStoreEntry {
    /// A metadata document or a fully materialised chunk.
    Static(Bytes),
    /// A chunk resolved on every read.
    Lazy {
        /// The name of the array.
        array_name: String,
        /// The index of the chunk in the chunk grid.
        chunk_index: ChunkIndex,
        /// The resolver producing the chunk.
        resolver: ChunkResolverRef,
        /// The size of the resolved chunk in bytes, if it is known without resolving.
        ///
        /// This is unknown if the array has a compressor or filters.
        size: Option<u64>,
    },
}

impl core::fmt::Debug for ChunkStoreEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Static(bytes) => write!(f, "Static(len={})", bytes.len()),
            Self::Lazy {
                array_name,
                chunk_index,
                size,
                ..
            } => write!(
                f,
                "Lazy({array_name}/{chunk_index}, size={})",
                size.map_or_else(|| "unknown".to_string(), |size| size.to_string())
            ),
        }
    }
}

impl ChunkStoreEntry {
    /// Returns true if the entry is resolved on read.
    #[must_use]
    pub fn is_lazy(&self) -> bool {
        matches!(self, Self::Lazy { .. })
    }
}

/// A read only, in-memory Zarr V2 store of arrays sharing dimensions, shape, and chunk shape.
///
/// See the [module documentation](self) for an example.
///
/// All write operations fail with [`StorageError::ReadOnly`].
/// Reads need no locking, so a [`ChunkStore`] can be shared between threads with an [`Arc`](std::sync::Arc).
pub struct ChunkStore {
    dims: DimensionNames,
    shape: ArrayShape,
    chunks: ChunkShape,
    keys: StoreKeys,
    entries: HashMap<StoreKey, ChunkStoreEntry>,
}

impl core::fmt::Debug for ChunkStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ChunkStore")
            .field("dims", &self.dims)
            .field("shape", &self.shape)
            .field("chunks", &self.chunks)
            .field("keys", &self.keys.len())
            .finish()
    }
}

impl ChunkStore {
    /// Returns the number of dimensions.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Returns the dimension names.
    #[must_use]
    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    /// Returns the shape shared by all lazy and placeholder arrays.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// Returns the chunk shape shared by all lazy and placeholder arrays.
    #[must_use]
    pub fn chunks(&self) -> &[u64] {
        &self.chunks
    }

    /// Returns the number of chunks along each dimension, `floor(shape / chunks)`.
    #[must_use]
    pub fn chunk_grid_shape(&self) -> ArrayShape {
        std::iter::zip(&self.shape, &self.chunks)
            .map(|(&shape, &chunks)| shape / chunks)
            .collect()
    }

    /// Returns the number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if the store has no keys.
    ///
    /// This is never the case, as a store always contains `.zgroup` and `.zattrs`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns all keys in registration order.
    #[must_use]
    pub fn keys(&self) -> &[StoreKey] {
        &self.keys
    }

    /// Returns true if `key` is in the store. Never resolves a chunk.
    #[must_use]
    pub fn contains(&self, key: &StoreKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the entry at `key`, if it exists.
    #[must_use]
    pub fn entry(&self, key: &StoreKey) -> Option<&ChunkStoreEntry> {
        self.entries.get(key)
    }

    /// Retrieve the value at `key`, resolving it if it is a lazy chunk.
    ///
    /// # Errors
    /// Returns [`StorageError::KeyNotFound`] if `key` is not in the store, or an error from resolving a lazy chunk.
    pub fn retrieve(&self, key: &StoreKey) -> Result<Bytes, StorageError> {
        self.retrieve_opt(key)?
            .ok_or_else(|| StorageError::KeyNotFound(key.clone()))
    }

    fn retrieve_opt(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(ChunkStoreEntry::Static(bytes)) => Ok(Some(bytes.clone())),
            Some(ChunkStoreEntry::Lazy {
                array_name,
                chunk_index,
                resolver,
                size,
            }) => {
                log::trace!("resolving chunk {key}");
                let bytes = resolver
                    .resolve(self, array_name, chunk_index)
                    .inspect_err(|err| log::warn!("failed to resolve chunk {key}: {err}"))?;
                let validate = global_config().validate_resolved_chunk_size();
                if let (true, Some(expected)) = (validate, size) {
                    let got = bytes.len() as u64;
                    if got != *expected {
                        return Err(StorageError::InvalidChunkSize {
                            key: key.clone(),
                            expected: *expected,
                            got,
                        });
                    }
                }
                Ok(Some(bytes))
            }
        }
    }
}

impl ReadableStorageTraits for ChunkStore {
    fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError> {
        self.retrieve_opt(key)
    }

    fn get_partial_values_key(
        &self,
        key: &StoreKey,
        byte_ranges: &[ByteRange],
    ) -> Result<Option<Vec<Bytes>>, StorageError> {
        match self.retrieve_opt(key)? {
            Some(bytes) => Ok(Some(extract_byte_ranges(&bytes, byte_ranges)?)),
            None => Ok(None),
        }
    }

    fn size_key(&self, key: &StoreKey) -> Result<Option<u64>, StorageError> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(ChunkStoreEntry::Static(bytes)) => Ok(Some(bytes.len() as u64)),
            Some(ChunkStoreEntry::Lazy { size: Some(size), .. }) => Ok(Some(*size)),
            Some(ChunkStoreEntry::Lazy { size: None, .. }) => Err(StorageError::Other(format!(
                "the size of {key} is unknown until it is resolved"
            ))),
        }
    }
}

impl ListableStorageTraits for ChunkStore {
    fn list(&self) -> Result<StoreKeys, StorageError> {
        Ok(self.keys.clone())
    }

    fn list_prefix(&self, prefix: &StorePrefix) -> Result<StoreKeys, StorageError> {
        Ok(self
            .keys
            .iter()
            .filter(|key| key.has_prefix(prefix))
            .cloned()
            .collect())
    }

    fn list_dir(&self, prefix: &StorePrefix) -> Result<StoreKeysPrefixes, StorageError> {
        let keys: StoreKeys = self
            .keys
            .iter()
            .filter(|key| key.is_child_of(prefix))
            .cloned()
            .collect();
        let prefixes = self
            .keys
            .iter()
            .filter_map(|key| {
                let (child, _) = key.as_str().strip_prefix(prefix.as_str())?.split_once('/')?;
                Some(format!("{prefix}{child}/"))
            })
            .unique()
            .map(StorePrefix::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(StoreKeysPrefixes::new(keys, prefixes))
    }

    /// Lazy chunks of unknown size (compressed or filtered arrays) are not counted.
    fn size_prefix(&self, prefix: &StorePrefix) -> Result<u64, StorageError> {
        Ok(self
            .keys
            .iter()
            .filter(|key| key.has_prefix(prefix))
            .filter_map(|key| match self.entries.get(key)? {
                ChunkStoreEntry::Static(bytes) => Some(bytes.len() as u64),
                ChunkStoreEntry::Lazy { size, .. } => *size,
            })
            .sum())
    }
}

impl WritableStorageTraits for ChunkStore {
    fn set(&self, _key: &StoreKey, _value: Bytes) -> Result<(), StorageError> {
        Err(StorageError::ReadOnly)
    }

    fn set_partial_values(
        &self,
        _key_start_values: &[StoreKeyStartValue],
    ) -> Result<(), StorageError> {
        Err(StorageError::ReadOnly)
    }

    fn erase(&self, _key: &StoreKey) -> Result<(), StorageError> {
        Err(StorageError::ReadOnly)
    }

    fn erase_values(&self, _keys: &[StoreKey]) -> Result<(), StorageError> {
        Err(StorageError::ReadOnly)
    }

    fn erase_prefix(&self, _prefix: &StorePrefix) -> Result<(), StorageError> {
        Err(StorageError::ReadOnly)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::{chunk_resolver::ChunkResolverError, *};
    use crate::array::DataType;

    fn zeros_resolver(
        store: &ChunkStore,
        _array_name: &str,
        _chunk_index: &[u64],
    ) -> Result<Bytes, ChunkResolverError> {
        let num_elements = usize::try_from(store.chunks().iter().product::<u64>()).unwrap();
        Ok(Bytes::from(vec![0u8; num_elements]))
    }

    fn store() -> ChunkStore {
        let mut builder = ChunkStoreBuilder::new(["y", "x"], [4, 6], [2, 3]).unwrap();
        builder
            .add_lazy_array(
                "var",
                LazyArrayOptions::new(DataType::UInt8).with_resolver(zeros_resolver),
            )
            .unwrap();
        builder.build()
    }

    #[test]
    fn chunk_store_list_dir() {
        let store = store();
        let root = store.list_dir(&StorePrefix::root()).unwrap();
        assert_eq!(
            root.keys(),
            &[StoreKey::new(".zgroup").unwrap(), StoreKey::new(".zattrs").unwrap()]
        );
        assert_eq!(root.prefixes(), &[StorePrefix::new("var/").unwrap()]);

        let var = store.list_dir(&StorePrefix::new("var/").unwrap()).unwrap();
        assert_eq!(var.keys().len(), 2 + 4);
        assert!(var.prefixes().is_empty());
        assert_eq!(
            store
                .list_prefix(&StorePrefix::new("var/").unwrap())
                .unwrap()
                .len(),
            6
        );
    }

    #[test]
    fn chunk_store_size_key_does_not_resolve() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut builder = ChunkStoreBuilder::new(["x"], [8], [4]).unwrap();
        builder
            .add_lazy_array(
                "var",
                LazyArrayOptions::new(DataType::Float32).with_resolver({
                    let count = count.clone();
                    move |store: &ChunkStore, name: &str, index: &[u64]| {
                        count.fetch_add(1, Ordering::SeqCst);
                        zeros_resolver(store, name, index)
                    }
                }),
            )
            .unwrap();
        let store = builder.build();
        let key = StoreKey::new("var/1").unwrap();
        assert!(store.contains(&key));
        assert!(store.entry(&key).unwrap().is_lazy());
        assert_eq!(store.size_key(&key).unwrap(), Some(16));
        assert_eq!(
            store.size_prefix(&StorePrefix::new("var/").unwrap()).unwrap()
                - store.size_key(&StoreKey::new("var/.zarray").unwrap()).unwrap().unwrap()
                - store.size_key(&StoreKey::new("var/.zattrs").unwrap()).unwrap().unwrap(),
            32
        );
        store.list().unwrap();
        store.list_dir(&StorePrefix::root()).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn chunk_store_partial_values() {
        let store = store();
        let key = StoreKey::new("var/1.1").unwrap();
        let values = store
            .get_partial_values_key(
                &key,
                &[ByteRange::FromStart(1, Some(2)), ByteRange::FromEnd(0, Some(1))],
            )
            .unwrap()
            .unwrap();
        assert_eq!(values, [Bytes::from_static(&[0, 0]), Bytes::from_static(&[0])]);
        assert!(matches!(
            store.get_partial_values_key(&key, &[ByteRange::FromStart(4, Some(4))]),
            Err(StorageError::InvalidByteRangeError(_))
        ));
        assert!(store
            .get_partial_values_key(&StoreKey::new("var/9.9").unwrap(), &[ByteRange::FromStart(0, None)])
            .unwrap()
            .is_none());
    }

    #[test]
    fn chunk_store_read_only() {
        let store = store();
        let key = StoreKey::new("var/0.0").unwrap();
        let missing = StoreKey::new("new").unwrap();
        assert!(matches!(
            store.set(&key, Bytes::new()),
            Err(StorageError::ReadOnly)
        ));
        assert!(matches!(
            store.set(&missing, Bytes::new()),
            Err(StorageError::ReadOnly)
        ));
        assert!(matches!(
            store.set_partial_values(&[StoreKeyStartValue::new(key.clone(), 0, &[1])]),
            Err(StorageError::ReadOnly)
        ));
        assert!(matches!(store.erase(&key), Err(StorageError::ReadOnly)));
        assert!(matches!(store.erase(&missing), Err(StorageError::ReadOnly)));
        assert!(matches!(
            store.erase_values(&[key.clone()]),
            Err(StorageError::ReadOnly)
        ));
        assert!(matches!(
            store.erase_prefix(&StorePrefix::root()),
            Err(StorageError::ReadOnly)
        ));
        assert!(store.contains(&key));
    }

    #[test]
    fn chunk_store_lookup_miss() {
        let store = store();
        let key = StoreKey::new("var/2.0").unwrap();
        assert!(store.get(&key).unwrap().is_none());
        assert!(store.size_key(&key).unwrap().is_none());
        assert!(matches!(
            store.retrieve(&key),
            Err(StorageError::KeyNotFound(missing)) if missing == key
        ));
    }

    #[test]
    fn chunk_store_debug() {
        let store = store();
        let debug = format!("{store:?}");
        assert!(debug.contains("dims: [\"y\", \"x\"]"));
        let entry = store.entry(&StoreKey::new("var/0.1").unwrap()).unwrap();
        assert_eq!(format!("{entry:?}"), "Lazy(var/0.1, size=6)");
    }
}
