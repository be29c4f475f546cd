//! Zarr V2 metadata.
//!
//! A chunk store publishes the following metadata documents:
//!  - `.zgroup`: [`GroupMetadataV2`],
//!  - `.zattrs`: group attributes,
//!  - `<array>/.zarray`: [`ArrayMetadataV2`], and
//!  - `<array>/.zattrs`: array attributes including [`ARRAY_DIMENSIONS`].

/// Zarr V2 array and group metadata.
pub mod v2;

pub use v2::{
    ArrayMetadataV2, ArrayMetadataV2Order, DataTypeMetadataV2, FillValueMetadataV2,
    GroupMetadataV2, MetadataV2,
};

/// The attribute holding the dimension names of an array, as used by `xarray`.
pub const ARRAY_DIMENSIONS: &str = "_ARRAY_DIMENSIONS";

/// Serialise metadata or attributes to JSON bytes.
///
/// Output is pretty printed with 2 space indentation if [`Config::pretty_metadata`](crate::config::Config::pretty_metadata) is enabled.
///
/// # Errors
/// Returns a [`serde_json::Error`] if `value` cannot be serialised.
pub fn to_json_bytes<T: serde::Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    if crate::config::global_config().pretty_metadata() {
        serde_json::to_vec_pretty(value)
    } else {
        serde_json::to_vec(value)
    }
}
