//! A virtual, read only, [Zarr V2](https://zarr.dev) store whose chunks are materialised on read.
//!
//! A [`ChunkStore`](storage::store::ChunkStore) presents the key-space of a Zarr V2 hierarchy (a root group with a set of arrays sharing one chunk grid) without holding the chunk data.
//! Metadata documents and small arrays are held in memory, while chunks of lazy arrays are produced by a user supplied [`ChunkResolver`](storage::store::ChunkResolver) every time they are read.
//! Any Zarr V2 reader that can consume a key-value mapping can open the store.
//!
//! ## Getting Started
//! - Build a store with a [`ChunkStoreBuilder`](storage::store::ChunkStoreBuilder).
//! - Read it through the [`ReadableStorageTraits`](storage::ReadableStorageTraits) and [`ListableStorageTraits`](storage::ListableStorageTraits), or the [`storage`] helper functions.
//! - Wrap it in a [storage adapter](storage::storage_adapter) to log or measure reads.
//!
//! ## Example
//! ```rust
//! # use zarrs_chunk_store::array::DataType;
//! # use zarrs_chunk_store::storage::{discover_arrays, retrieve_array_metadata_v2, retrieve_chunk, Bytes, ChunkResolverError};
//! # use zarrs_chunk_store::storage::store::{ChunkStore, ChunkStoreBuilder, LazyArrayOptions};
//! fn resolve(store: &ChunkStore, _name: &str, chunk_index: &[u64]) -> Result<Bytes, ChunkResolverError> {
//!     let num_elements = store.chunks().iter().product::<u64>() as usize;
//!     let value = chunk_index.iter().sum::<u64>() as f32;
//!     Ok(Bytes::copy_from_slice(bytemuck::cast_slice(&vec![value; num_elements])))
//! }
//!
//! let mut builder = ChunkStoreBuilder::new(["y", "x"], [4, 4], [2, 2])?;
//! builder.resolver(resolve);
//! builder.add_lazy_array("temperature", LazyArrayOptions::new(DataType::Float32))?;
//! let store = builder.build();
//!
//! assert_eq!(discover_arrays(&store)?, ["temperature"]);
//! let metadata = retrieve_array_metadata_v2(&store, "temperature")?;
//! assert_eq!(metadata.shape, [4, 4]);
//! let chunk = retrieve_chunk(&store, "temperature", &[1, 1])?;
//! assert_eq!(chunk.len(), 16);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crate Features
//! #### Default
//!  - `ndarray`: [`ndarray`] utility functions for building materialised and placeholder arrays.
//!
//! ## Logging
//! Store reads and resolver failures are logged with the [`log`] crate.
//! Chunk resolution is logged at the `trace` level and resolver failures at the `warn` level.
//!
//! ## Configuration
//! Global options are set with [`config::global_config_mut`].

#![warn(unused_variables)]
#![warn(dead_code)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![deny(clippy::missing_panics_doc)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod array;
pub mod byte_range;
pub mod config;
pub mod metadata;
pub mod storage;
