//! Zarr stores.
//!
//! See <https://zarr-specs.readthedocs.io/en/latest/v2/v2.0.html#storage>

mod chunk_store;

pub use chunk_store::{
    chunk_resolver::{self, ChunkResolver, ChunkResolverRef},
    ChunkStore, ChunkStoreBuilder, ChunkStoreCreateError, ChunkStoreEntry, LazyArrayOptions,
    NanArrayOptions,
};
