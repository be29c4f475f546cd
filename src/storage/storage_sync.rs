use std::collections::HashSet;

use itertools::Itertools;

use crate::{byte_range::ByteRange, metadata::v2::ArrayMetadataV2};

use super::{
    array_meta_key_v2_attributes, data_key, meta_key_v2_array, Bytes, MaybeBytes, StorageError,
    StoreKey, StoreKeyRange, StoreKeyStartValue, StoreKeys, StoreKeysPrefixes, StorePrefix,
    StorePrefixes,
};

/// Readable storage traits.
pub trait ReadableStorageTraits: Send + Sync {
    /// Retrieve the value (bytes) associated with a given [`StoreKey`].
    ///
    /// Returns [`None`] if the key is not found.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError> {
        Ok(self
            .get_partial_values_key(key, &[ByteRange::FromStart(0, None)])?
            .and_then(|values| values.into_iter().next()))
    }

    /// Retrieve partial bytes from a list of byte ranges for a store key.
    ///
    /// Returns [`None`] if the key is not found.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn get_partial_values_key(
        &self,
        key: &StoreKey,
        byte_ranges: &[ByteRange],
    ) -> Result<Option<Vec<Bytes>>, StorageError>;

    /// Retrieve partial bytes from a list of [`StoreKeyRange`].
    ///
    /// # Parameters
    /// * `key_ranges`: ordered set of ([`StoreKey`], [`ByteRange`]) pairs. A key may occur multiple times with different ranges.
    ///
    /// # Output
    /// A a list of values in the order of the `key_ranges`. It will be [`None`] for missing keys.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn get_partial_values(
        &self,
        key_ranges: &[StoreKeyRange],
    ) -> Result<Vec<MaybeBytes>, StorageError> {
        self.get_partial_values_batched_by_key(key_ranges)
    }

    /// Return the size in bytes of the value at `key`.
    ///
    /// Returns [`None`] if the key is not found.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn size_key(&self, key: &StoreKey) -> Result<Option<u64>, StorageError>;

    /// A utility method with the same input and output as [`get_partial_values`](ReadableStorageTraits::get_partial_values) that internally calls [`get_partial_values_key`](ReadableStorageTraits::get_partial_values_key) with consecutive byte ranges of the same key grouped together.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn get_partial_values_batched_by_key(
        &self,
        key_ranges: &[StoreKeyRange],
    ) -> Result<Vec<MaybeBytes>, StorageError> {
        let mut out: Vec<MaybeBytes> = Vec::with_capacity(key_ranges.len());
        let key_ranges_by_key = key_ranges.iter().chunk_by(|key_range| key_range.key());
        for (key, group) in &key_ranges_by_key {
            let byte_ranges: Vec<ByteRange> = group.map(StoreKeyRange::byte_range).collect();
            match self.get_partial_values_key(key, &byte_ranges)? {
                Some(values) => out.extend(values.into_iter().map(Some)),
                None => out.extend(std::iter::repeat(None).take(byte_ranges.len())),
            }
        }
        Ok(out)
    }
}

/// Listable storage traits.
pub trait ListableStorageTraits: Send + Sync {
    /// Retrieve all [`StoreKeys`] in the store.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying error with the store.
    fn list(&self) -> Result<StoreKeys, StorageError>;

    /// Retrieve all [`StoreKeys`] with a given [`StorePrefix`].
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the prefix is not a directory or there is an underlying error with the store.
    fn list_prefix(&self, prefix: &StorePrefix) -> Result<StoreKeys, StorageError>;

    /// Retrieve all [`StoreKeys`] and [`StorePrefix`] which are direct children of [`StorePrefix`].
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the prefix is not a directory or there is an underlying error with the store.
    fn list_dir(&self, prefix: &StorePrefix) -> Result<StoreKeysPrefixes, StorageError>;

    /// Return the size in bytes of all keys under `prefix`.
    ///
    /// # Errors
    /// Returns a `StorageError` if the store does not support `size()` or there is an underlying error with the store.
    fn size_prefix(&self, prefix: &StorePrefix) -> Result<u64, StorageError>;

    /// Return the total size in bytes of the storage.
    ///
    /// # Errors
    /// Returns a `StorageError` if the store does not support `size()` or there is an underlying error with the store.
    fn size(&self) -> Result<u64, StorageError> {
        self.size_prefix(&StorePrefix::root())
    }
}

/// Writable storage traits.
pub trait WritableStorageTraits: Send + Sync {
    /// Store bytes at a [`StoreKey`].
    ///
    /// # Errors
    /// Returns a [`StorageError`] on failure to store.
    fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError>;

    /// Store bytes according to a list of [`StoreKeyStartValue`].
    ///
    /// # Errors
    /// Returns a [`StorageError`] on failure to store.
    fn set_partial_values(
        &self,
        key_start_values: &[StoreKeyStartValue],
    ) -> Result<(), StorageError>;

    /// Erase a [`StoreKey`].
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn erase(&self, key: &StoreKey) -> Result<(), StorageError>;

    /// Erase a list of [`StoreKey`].
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying storage error.
    fn erase_values(&self, keys: &[StoreKey]) -> Result<(), StorageError> {
        keys.iter().try_for_each(|key| self.erase(key))?;
        Ok(())
    }

    /// Erase all [`StoreKey`] under [`StorePrefix`].
    ///
    /// # Errors
    /// Returns a [`StorageError`] is the prefix is not in the store, or the erase otherwise fails.
    fn erase_prefix(&self, prefix: &StorePrefix) -> Result<(), StorageError>;
}

/// A supertrait of [`ReadableStorageTraits`] and [`WritableStorageTraits`].
pub trait ReadableWritableStorageTraits: ReadableStorageTraits + WritableStorageTraits {}

impl<T> ReadableWritableStorageTraits for T where T: ReadableStorageTraits + WritableStorageTraits {}

/// A supertrait of [`ReadableStorageTraits`] and [`ListableStorageTraits`].
pub trait ReadableListableStorageTraits: ReadableStorageTraits + ListableStorageTraits {}

impl<T> ReadableListableStorageTraits for T where T: ReadableStorageTraits + ListableStorageTraits {}

/// A supertrait of [`ReadableWritableStorageTraits`] and [`ListableStorageTraits`].
pub trait ReadableWritableListableStorageTraits:
    ReadableWritableStorageTraits + ListableStorageTraits
{
}

impl<T> ReadableWritableListableStorageTraits for T where
    T: ReadableWritableStorageTraits + ListableStorageTraits
{
}

/// Retrieve a chunk.
///
/// # Errors
/// Returns [`StorageError::KeyNotFound`] if the chunk does not exist, [`StorageError::InvalidStoreKey`] if `array_name` and `chunk_index` do not form a valid key, or any other [`StorageError`] if there is an underlying error with the store.
pub fn retrieve_chunk<TStorage: ?Sized + ReadableStorageTraits>(
    storage: &TStorage,
    array_name: &str,
    chunk_index: &[u64],
) -> Result<Bytes, StorageError> {
    let key = data_key(array_name, chunk_index)?;
    storage.get(&key)?.ok_or(StorageError::KeyNotFound(key))
}

/// Retrieve byte ranges from a chunk.
///
/// Returns [`None`] where keys are not found.
///
/// # Errors
/// Returns [`StorageError::InvalidStoreKey`] if `array_name` and `chunk_index` do not form a valid key, or any other [`StorageError`] if there is an underlying error with the store.
pub fn retrieve_partial_values<TStorage: ?Sized + ReadableStorageTraits>(
    storage: &TStorage,
    array_name: &str,
    chunk_index: &[u64],
    bytes_ranges: &[ByteRange],
) -> Result<Vec<MaybeBytes>, StorageError> {
    let key = data_key(array_name, chunk_index)?;
    let key_ranges: Vec<StoreKeyRange> = bytes_ranges
        .iter()
        .map(|byte_range| StoreKeyRange::new(key.clone(), *byte_range))
        .collect();
    storage.get_partial_values(&key_ranges)
}

/// Retrieve and parse the JSON object at `key`.
///
/// Returns [`None`] if the key does not exist.
///
/// # Errors
/// Returns [`StorageError::InvalidMetadata`] if the value is not a JSON object, or any other [`StorageError`] if there is an underlying error with the store.
pub fn retrieve_attributes<TStorage: ?Sized + ReadableStorageTraits>(
    storage: &TStorage,
    key: &StoreKey,
) -> Result<Option<serde_json::Map<String, serde_json::Value>>, StorageError> {
    storage
        .get(key)?
        .map(|bytes| {
            serde_json::from_slice(&bytes)
                .map_err(|err| StorageError::InvalidMetadata(key.clone(), err.to_string()))
        })
        .transpose()
}

/// Retrieve the Zarr V2 metadata of an array, including its attributes.
///
/// # Errors
/// Returns [`StorageError::KeyNotFound`] if the array has no `.zarray` document, [`StorageError::InvalidMetadata`] if the metadata is invalid, or any other [`StorageError`] if there is an underlying error with the store.
pub fn retrieve_array_metadata_v2<TStorage: ?Sized + ReadableStorageTraits>(
    storage: &TStorage,
    array_name: &str,
) -> Result<ArrayMetadataV2, StorageError> {
    let key = meta_key_v2_array(array_name)?;
    let bytes = storage
        .get(&key)?
        .ok_or_else(|| StorageError::KeyNotFound(key.clone()))?;
    let metadata: ArrayMetadataV2 = serde_json::from_slice(&bytes)
        .map_err(|err| StorageError::InvalidMetadata(key, err.to_string()))?;
    let attributes =
        retrieve_attributes(storage, &array_meta_key_v2_attributes(array_name)?)?.unwrap_or_default();
    Ok(metadata.with_attributes(attributes))
}

/// Discover the child prefixes of `prefix`.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub fn discover_children<TStorage: ?Sized + ListableStorageTraits>(
    storage: &TStorage,
    prefix: &StorePrefix,
) -> Result<StorePrefixes, StorageError> {
    Ok(storage.list_dir(prefix)?.prefixes().clone())
}

/// Discover the names of all arrays at the root of the store.
///
/// An array is a child prefix holding a `.zarray` document.
///
/// # Errors
/// Returns a [`StorageError`] if there is an underlying error with the store.
pub fn discover_arrays<TStorage: ?Sized + ListableStorageTraits>(
    storage: &TStorage,
) -> Result<Vec<String>, StorageError> {
    let keys: HashSet<StoreKey> = storage.list()?.into_iter().collect();
    Ok(discover_children(storage, &StorePrefix::root())?
        .iter()
        .filter_map(|prefix| prefix.as_str().strip_suffix('/'))
        .filter(|name| meta_key_v2_array(name).is_ok_and(|key| keys.contains(&key)))
        .map(str::to_string)
        .collect())
}
