//! A storage adapter which writes a line for every storage call.

use std::{
    io::Write,
    sync::{Arc, Mutex},
};

use itertools::Itertools;

use crate::{
    byte_range::ByteRange,
    storage::{
        Bytes, ListableStorageTraits, MaybeBytes, ReadableStorageTraits, StorageError, StoreKey,
        StoreKeyRange, StoreKeyStartValue, StoreKeys, StoreKeysPrefixes, StorePrefix,
        WritableStorageTraits,
    },
};

/// The usage log storage adapter. Logs storage method calls.
///
/// It reveals how a consumer accesses a store, e.g. which chunks of a [`ChunkStore`](crate::storage::store::ChunkStore) are requested and in which order.
///
/// ### Example (log to stdout)
/// ```rust
/// # use std::sync::{Arc, Mutex};
/// # use zarrs_chunk_store::storage::store::{ChunkStore, ChunkStoreBuilder};
/// # use zarrs_chunk_store::storage::storage_adapter::usage_log::UsageLogStorageAdapter;
/// let store: Arc<ChunkStore> = Arc::new(ChunkStoreBuilder::new(["x"], [4], [2])?.build());
/// let log_writer = Arc::new(Mutex::new(std::io::stdout()));
/// let store = Arc::new(UsageLogStorageAdapter::new(store, log_writer, || {
///     chrono::Utc::now().format("[%T%.3f] ").to_string()
/// }));
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
///
/// Reading through the above [`UsageLogStorageAdapter`] prints outputs like:
/// ```text
/// [10:02:11.201] list_dir() -> (keys:[.zgroup, .zattrs], prefixes:[var/])
/// [10:02:11.201] get(var/.zarray) -> len=Ok(226)
/// [10:02:11.202] get(var/0.0.0) -> len=Ok(512)
/// [10:02:11.202] get(var/9.9.9) -> len=Ok(0)
/// [10:02:11.203] set(var/0.0.0, len=512) -> Err(ReadOnly)
/// ```
pub struct UsageLogStorageAdapter<TStorage: ?Sized> {
    storage: Arc<TStorage>,
    handle: Arc<Mutex<dyn Write + Send + Sync>>,
    prefix_func: fn() -> String,
}

impl<TStorage: ?Sized> core::fmt::Debug for UsageLogStorageAdapter<TStorage> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        writeln!(f, "usage log")
    }
}

impl<TStorage: ?Sized> UsageLogStorageAdapter<TStorage> {
    /// Create a new usage log storage adapter.
    ///
    /// Each line is prefixed with the output of `prefix_func`, such as a timestamp.
    pub fn new(
        storage: Arc<TStorage>,
        handle: Arc<Mutex<dyn Write + Send + Sync>>,
        prefix_func: fn() -> String,
    ) -> Self {
        Self {
            storage,
            handle,
            prefix_func,
        }
    }

    /// Write a prefixed line to the log.
    fn log(&self, args: std::fmt::Arguments) -> Result<(), StorageError> {
        let mut handle = self
            .handle
            .lock()
            .map_err(|_| StorageError::Other("usage log writer is poisoned".to_string()))?;
        writeln!(handle, "{}{args}", (self.prefix_func)())?;
        Ok(())
    }
}

impl<TStorage: ?Sized + ReadableStorageTraits> ReadableStorageTraits
    for UsageLogStorageAdapter<TStorage>
{
    fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError> {
        let result = self.storage.get(key);
        self.log(format_args!(
            "get({key}) -> len={:?}",
            result
                .as_ref()
                .map(|value| value.as_ref().map_or(0, Bytes::len))
        ))?;
        result
    }

    fn get_partial_values_key(
        &self,
        key: &StoreKey,
        byte_ranges: &[ByteRange],
    ) -> Result<Option<Vec<Bytes>>, StorageError> {
        let result = self.storage.get_partial_values_key(key, byte_ranges);
        self.log(format_args!(
            "get_partial_values_key({key}, [{}]) -> len={:?}",
            byte_ranges.iter().format(", "),
            result.as_ref().map(|values| {
                values
                    .as_ref()
                    .map_or(vec![], |values| values.iter().map(Bytes::len).collect_vec())
            })
        ))?;
        result
    }

    fn get_partial_values(
        &self,
        key_ranges: &[StoreKeyRange],
    ) -> Result<Vec<MaybeBytes>, StorageError> {
        let result = self.storage.get_partial_values(key_ranges);
        self.log(format_args!(
            "get_partial_values([{}]) -> len={:?}",
            key_ranges.iter().format(", "),
            result.as_ref().map(|values| values
                .iter()
                .map(|value| value.as_ref().map_or(0, Bytes::len))
                .collect_vec())
        ))?;
        result
    }

    fn size_key(&self, key: &StoreKey) -> Result<Option<u64>, StorageError> {
        let result = self.storage.size_key(key);
        self.log(format_args!("size_key({key}) -> {result:?}"))?;
        result
    }
}

impl<TStorage: ?Sized + ListableStorageTraits> ListableStorageTraits
    for UsageLogStorageAdapter<TStorage>
{
    fn list(&self) -> Result<StoreKeys, StorageError> {
        let result = self.storage.list();
        self.log(format_args!(
            "list() -> [{}]",
            result.as_deref().unwrap_or_default().iter().format(", ")
        ))?;
        result
    }

    fn list_prefix(&self, prefix: &StorePrefix) -> Result<StoreKeys, StorageError> {
        let result = self.storage.list_prefix(prefix);
        self.log(format_args!(
            "list_prefix({prefix}) -> [{}]",
            result.as_deref().unwrap_or_default().iter().format(", ")
        ))?;
        result
    }

    fn list_dir(&self, prefix: &StorePrefix) -> Result<StoreKeysPrefixes, StorageError> {
        let result = self.storage.list_dir(prefix);
        match &result {
            Ok(keys_prefixes) => self.log(format_args!(
                "list_dir({prefix}) -> (keys:[{}], prefixes:[{}])",
                keys_prefixes.keys().iter().format(", "),
                keys_prefixes.prefixes().iter().format(", "),
            ))?,
            Err(err) => self.log(format_args!("list_dir({prefix}) -> Err({err})"))?,
        }
        result
    }

    fn size(&self) -> Result<u64, StorageError> {
        let result = self.storage.size();
        self.log(format_args!("size() -> {result:?}"))?;
        result
    }

    fn size_prefix(&self, prefix: &StorePrefix) -> Result<u64, StorageError> {
        let result = self.storage.size_prefix(prefix);
        self.log(format_args!("size_prefix({prefix}) -> {result:?}"))?;
        result
    }
}

impl<TStorage: ?Sized + WritableStorageTraits> WritableStorageTraits
    for UsageLogStorageAdapter<TStorage>
{
    fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError> {
        let len = value.len();
        let result = self.storage.set(key, value);
        self.log(format_args!("set({key}, len={len}) -> {result:?}"))?;
        result
    }

    fn set_partial_values(
        &self,
        key_start_values: &[StoreKeyStartValue],
    ) -> Result<(), StorageError> {
        let result = self.storage.set_partial_values(key_start_values);
        self.log(format_args!(
            "set_partial_values([{}]) -> {result:?}",
            key_start_values
                .iter()
                .map(|key_start_value| format!(
                    "{}:{}..{}",
                    key_start_value.key(),
                    key_start_value.start(),
                    key_start_value.end()
                ))
                .format(", ")
        ))?;
        result
    }

    fn erase(&self, key: &StoreKey) -> Result<(), StorageError> {
        let result = self.storage.erase(key);
        self.log(format_args!("erase({key}) -> {result:?}"))?;
        result
    }

    fn erase_values(&self, keys: &[StoreKey]) -> Result<(), StorageError> {
        let result = self.storage.erase_values(keys);
        self.log(format_args!(
            "erase_values([{}]) -> {result:?}",
            keys.iter().format(", ")
        ))?;
        result
    }

    fn erase_prefix(&self, prefix: &StorePrefix) -> Result<(), StorageError> {
        let result = self.storage.erase_prefix(prefix);
        self.log(format_args!("erase_prefix({prefix}) -> {result:?}"))?;
        result
    }
}
