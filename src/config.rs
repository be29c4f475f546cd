//! Global configuration options.

use std::sync::{OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Global configuration options for the zarrs chunk store crate.
///
/// Retrieve the global [`Config`] with [`global_config`] and modify it with [`global_config_mut`].
///
/// Configuration is read when a [`ChunkStoreBuilder`](crate::storage::store::ChunkStoreBuilder) serialises metadata and when a [`ChunkStore`](crate::storage::store::ChunkStore) resolves a lazy chunk.
///
/// ## Pretty Metadata
///  > default: [`true`]
///
/// If enabled, `.zgroup`, `.zattrs` and `.zarray` documents are written as JSON with 2 space indentation.
/// Otherwise they are written compactly.
///
/// ## Validate Resolved Chunk Size
///  > default: [`false`]
///
/// If enabled, the bytes returned by a chunk resolver must be exactly the size of a chunk (the product of the chunk shape and the data type size).
/// A mismatch is reported as [`StorageError::InvalidChunkSize`](crate::storage::StorageError::InvalidChunkSize).
/// Otherwise resolver output is passed through unchecked.
#[derive(Debug)]
pub struct Config {
    pretty_metadata: bool,
    validate_resolved_chunk_size: bool,
}

#[allow(clippy::derivable_impls)]
impl Default for Config {
    fn default() -> Self {
        Config {
            pretty_metadata: true,
            validate_resolved_chunk_size: false,
        }
    }
}

impl Config {
    /// Get the [pretty metadata](#pretty-metadata) configuration.
    #[must_use]
    pub fn pretty_metadata(&self) -> bool {
        self.pretty_metadata
    }

    /// Set the [pretty metadata](#pretty-metadata) configuration.
    pub fn set_pretty_metadata(&mut self, pretty_metadata: bool) {
        self.pretty_metadata = pretty_metadata;
    }

    /// Get the [validate resolved chunk size](#validate-resolved-chunk-size) configuration.
    #[must_use]
    pub fn validate_resolved_chunk_size(&self) -> bool {
        self.validate_resolved_chunk_size
    }

    /// Set the [validate resolved chunk size](#validate-resolved-chunk-size) configuration.
    pub fn set_validate_resolved_chunk_size(&mut self, validate_resolved_chunk_size: bool) {
        self.validate_resolved_chunk_size = validate_resolved_chunk_size;
    }
}

static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

/// Returns a reference to the global configuration.
///
/// # Panics
/// This function panics if the underlying lock has been poisoned and might panic if the global config is already held by the current thread.
pub fn global_config() -> RwLockReadGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::default()))
        .read()
        .unwrap()
}

/// Returns a mutable reference to the global configuration.
///
/// # Panics
/// This function panics if the underlying lock has been poisoned and might panic if the global config is already held by the current thread.
pub fn global_config_mut() -> RwLockWriteGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::default()))
        .write()
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = Config::default();
        assert!(config.pretty_metadata());
        assert!(!config.validate_resolved_chunk_size());
    }

    #[test]
    fn config_validate_resolved_chunk_size() {
        let mut config = Config::default();
        config.set_validate_resolved_chunk_size(true);
        assert!(config.validate_resolved_chunk_size());
        config.set_pretty_metadata(false);
        assert!(!config.pretty_metadata());
    }
}
