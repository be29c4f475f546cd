//! Storage adapters.
//!
//! An adapter wraps any storage and has the same interface as a store.
//!  - [`UsageLogStorageAdapter`](usage_log::UsageLogStorageAdapter) writes one line per storage call, which is useful to trace how a consumer walks a [`ChunkStore`](super::store::ChunkStore).
//!  - [`PerformanceMetricsStorageAdapter`](performance_metrics::PerformanceMetricsStorageAdapter) counts reads and bytes read.

pub mod performance_metrics;
pub mod usage_log;
