//! Placeholder chunks filled with a fill value.

use bytes::Bytes;

use crate::metadata::v2::FillValueMetadataV2;

use super::{DataType, FillValue};

/// Returns a C order chunk of `shape` with every element set to the fill value of a placeholder array.
///
/// `fill_value` follows the defaulting rules of [`FillValue::from_nan_policy`]: an absent fill value is the data type maximum for integers, NaN for floating point and `true` for booleans.
/// Elements are native endian.
///
/// # Panics
/// Panics if the size of the chunk in bytes exceeds [`usize::MAX`].
#[must_use]
pub fn nan_chunk(data_type: DataType, shape: &[u64], fill_value: &FillValueMetadataV2) -> Bytes {
    let fill_value = FillValue::from_nan_policy(data_type, fill_value);
    let num_elements = usize::try_from(shape.iter().product::<u64>()).unwrap();
    Bytes::from(fill_value.repeat(num_elements, None))
}

/// Returns an [`ndarray::ArrayD`] of `shape` with every element set to the fill value of a placeholder array.
///
/// See [`nan_chunk`].
///
/// # Panics
/// Panics if any element of `shape` exceeds [`usize::MAX`].
#[cfg(feature = "ndarray")]
#[must_use]
pub fn nan_chunk_ndarray<T: super::Element>(
    shape: &[u64],
    fill_value: &FillValueMetadataV2,
) -> ndarray::ArrayD<T> {
    let fill_value = FillValue::from_nan_policy(T::DATA_TYPE, fill_value);
    let element: T = bytemuck::pod_read_unaligned(fill_value.as_ne_bytes());
    let shape: Vec<usize> = shape
        .iter()
        .map(|&extent| usize::try_from(extent).unwrap())
        .collect();
    ndarray::ArrayD::from_elem(shape, element)
}
