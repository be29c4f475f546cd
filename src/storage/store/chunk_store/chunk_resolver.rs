//! Chunk resolvers.

use std::sync::Arc;

use crate::storage::Bytes;

use super::ChunkStore;

/// Computes or fetches the bytes of a lazily registered chunk.
///
/// A resolver is invoked on every read of a lazy chunk key; results are never cached by the store.
/// It receives the store (for its dimensions, shape, and chunk shape), the array name, and the chunk index.
///
/// Any `Fn(&ChunkStore, &str, &[u64]) -> Result<Bytes, ChunkResolverError> + Send + Sync` closure is a resolver.
///
/// Resolvers may be called concurrently from multiple threads and are responsible for their own synchronisation.
pub trait ChunkResolver: Send + Sync {
    /// Resolve the bytes of the chunk at `chunk_index` of array `array_name`.
    ///
    /// The bytes should be the C order representation of a full chunk, encoded with the compressor and filters of the array if it has any.
    ///
    /// # Errors
    /// Returns a [`ChunkResolverError`] if the chunk cannot be produced.
    fn resolve(
        &self,
        store: &ChunkStore,
        array_name: &str,
        chunk_index: &[u64],
    ) -> Result<Bytes, ChunkResolverError>;
}

impl<F> ChunkResolver for F
where
    F: Fn(&ChunkStore, &str, &[u64]) -> Result<Bytes, ChunkResolverError> + Send + Sync,
{
    fn resolve(
        &self,
        store: &ChunkStore,
        array_name: &str,
        chunk_index: &[u64],
    ) -> Result<Bytes, ChunkResolverError> {
        self(store, array_name, chunk_index)
    }
}

/// An [`Arc`] wrapped chunk resolver, which can be shared by many chunks and arrays.
pub type ChunkResolverRef = Arc<dyn ChunkResolver>;

/// An error returned by a [`ChunkResolver`].
///
/// Wraps the resolver's own error, which is surfaced unchanged through [`StorageError::ResolverError`](crate::storage::StorageError::ResolverError).
#[derive(Debug)]
pub struct ChunkResolverError(Box<dyn std::error::Error + Send + Sync>);

impl ChunkResolverError {
    /// Create a new chunk resolver error from any error.
    pub fn new(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(err.into())
    }

    /// Returns a reference to the inner error.
    #[must_use]
    pub fn get_ref(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.0.as_ref()
    }

    /// Consumes the error, returning the inner error.
    #[must_use]
    pub fn into_inner(self) -> Box<dyn std::error::Error + Send + Sync> {
        self.0
    }
}

impl core::fmt::Display for ChunkResolverError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ChunkResolverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<&str> for ChunkResolverError {
    fn from(err: &str) -> Self {
        Self::new(err)
    }
}

impl From<String> for ChunkResolverError {
    fn from(err: String) -> Self {
        Self::new(err)
    }
}

impl From<std::io::Error> for ChunkResolverError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("backend failed")]
    struct BackendError;

    #[test]
    fn chunk_resolver_error_wraps_inner_error() {
        let err = ChunkResolverError::new(BackendError);
        assert_eq!(err.to_string(), "backend failed");
        assert!(err.get_ref().is::<BackendError>());
        assert!(err.into_inner().downcast::<BackendError>().is_ok());

        let err = ChunkResolverError::from(std::io::Error::other("disk"));
        assert_eq!(err.to_string(), "disk");
    }
}
