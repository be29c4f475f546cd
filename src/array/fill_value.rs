//! Fill values.
//!
//! A fill value provides an element value for uninitialised portions of an array.
//! [`FillValue::from_nan_policy`] implements the defaulting rules applied to placeholder ("nan") arrays and chunks.

use thiserror::Error;

use crate::metadata::v2::FillValueMetadataV2;

use super::{endianness::reorder_native_bytes, DataType, DataTypeCategory, Endianness};

/// The fill value of an array, stored as native endian bytes.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FillValue(Vec<u8>);

impl core::fmt::Display for FillValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// A fill value incompatibility error.
#[derive(Debug, Error)]
#[error("incompatible fill value {1} for data type {0}")]
pub struct IncompatibleFillValueError(DataType, FillValue);

impl IncompatibleFillValueError {
    /// Create a new incompatible fill value error.
    #[must_use]
    pub const fn new(data_type: DataType, fill_value: FillValue) -> Self {
        Self(data_type, fill_value)
    }
}

macro_rules! fill_value_from_ne_bytes {
    ( $($t:ty),* ) => {
        $(
            impl From<$t> for FillValue {
                fn from(value: $t) -> Self {
                    Self(value.to_ne_bytes().to_vec())
                }
            }
        )*
    };
}

fill_value_from_ne_bytes!(u8, u16, u32, u64, i8, i16, i32, i64, half::f16, f32, f64);

impl From<bool> for FillValue {
    fn from(value: bool) -> Self {
        Self(vec![u8::from(value)])
    }
}

impl FillValue {
    /// Create a new fill value composed of `bytes` (native endian).
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the size in bytes of the fill value.
    #[must_use]
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Return the native endian byte representation of the fill value.
    #[must_use]
    pub fn as_ne_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Resolve the fill value of a placeholder array of `data_type` from optional fill value metadata.
    ///
    /// - Integers: [`FillValueMetadataV2::Null`] resolves to the data type maximum.
    ///   A fill value outside of the representable range (or not representable as an integer at all) also resolves to the data type maximum.
    ///   Non-integral numbers are truncated towards zero.
    /// - Floating point: [`FillValueMetadataV2::Null`] resolves to NaN.
    /// - Boolean: [`FillValueMetadataV2::Null`] resolves to `true`.
    ///
    /// This never fails.
    #[must_use]
    pub fn from_nan_policy(data_type: DataType, fill_value: &FillValueMetadataV2) -> Self {
        match data_type.category() {
            DataTypeCategory::Bool => Self::from(match fill_value {
                FillValueMetadataV2::Bool(value) => *value,
                FillValueMetadataV2::Number(number) => number.as_f64().map_or(true, |v| v != 0.0),
                _ => true,
            }),
            DataTypeCategory::SignedInteger | DataTypeCategory::UnsignedInteger => {
                let Some((min, max)) = data_type.integer_range() else {
                    unreachable!("integer data types have a range")
                };
                let value = match fill_value {
                    FillValueMetadataV2::Number(number) => number
                        .as_i64()
                        .map(i128::from)
                        .or_else(|| number.as_u64().map(i128::from))
                        .or_else(|| {
                            #[allow(clippy::cast_possible_truncation)]
                            number
                                .as_f64()
                                .filter(|v| v.is_finite())
                                .map(|v| v.trunc() as i128)
                        }),
                    FillValueMetadataV2::Bool(value) => Some(i128::from(*value)),
                    FillValueMetadataV2::String(string) => string.parse::<i128>().ok(),
                    FillValueMetadataV2::Null
                    | FillValueMetadataV2::NaN
                    | FillValueMetadataV2::Infinity
                    | FillValueMetadataV2::NegInfinity => None,
                };
                let value = value.filter(|value| (min..=max).contains(value));
                if value.is_none() && !fill_value.is_null() {
                    log::debug!(
                        "fill value {fill_value:?} is not representable by {data_type}, using {max}"
                    );
                }
                Self::from_integer(data_type, value.unwrap_or(max))
            }
            DataTypeCategory::Float => {
                let value = match fill_value {
                    FillValueMetadataV2::Null | FillValueMetadataV2::NaN => f64::NAN,
                    FillValueMetadataV2::Infinity => f64::INFINITY,
                    FillValueMetadataV2::NegInfinity => f64::NEG_INFINITY,
                    FillValueMetadataV2::Number(number) => number.as_f64().unwrap_or(f64::NAN),
                    FillValueMetadataV2::Bool(value) => f64::from(u8::from(*value)),
                    FillValueMetadataV2::String(string) => string.parse().unwrap_or(f64::NAN),
                };
                Self::from_float(data_type, value)
            }
        }
    }

    /// `value` must lie within the range of `data_type`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn from_integer(data_type: DataType, value: i128) -> Self {
        match data_type {
            DataType::Int8 => Self::from(value as i8),
            DataType::Int16 => Self::from(value as i16),
            DataType::Int32 => Self::from(value as i32),
            DataType::Int64 => Self::from(value as i64),
            DataType::UInt8 => Self::from(value as u8),
            DataType::UInt16 => Self::from(value as u16),
            DataType::UInt32 => Self::from(value as u32),
            DataType::UInt64 => Self::from(value as u64),
            DataType::Bool => Self::from(value != 0),
            DataType::Float16 | DataType::Float32 | DataType::Float64 => {
                #[allow(clippy::cast_precision_loss)]
                Self::from_float(data_type, value as f64)
            }
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_float(data_type: DataType, value: f64) -> Self {
        match data_type {
            DataType::Float16 => Self::from(half::f16::from_f64(value)),
            DataType::Float32 => Self::from(value as f32),
            _ => Self::from(value),
        }
    }

    fn ne_array<const N: usize>(&self) -> Option<[u8; N]> {
        self.0.as_slice().try_into().ok()
    }

    /// Return the Zarr V2 fill value metadata of this fill value interpreted as `data_type`.
    ///
    /// Integers are encoded as JSON integers and floating point values as JSON floats (or `"NaN"`, `"Infinity"`, `"-Infinity"`).
    ///
    /// # Errors
    /// Returns [`IncompatibleFillValueError`] if the size of the fill value does not match the data type.
    pub fn to_metadata_v2(
        &self,
        data_type: DataType,
    ) -> Result<FillValueMetadataV2, IncompatibleFillValueError> {
        let err = || IncompatibleFillValueError(data_type, self.clone());
        let number = |number: serde_json::Number| FillValueMetadataV2::Number(number);
        Ok(match data_type {
            DataType::Bool => {
                FillValueMetadataV2::Bool(self.ne_array::<1>().ok_or_else(err)?[0] != 0)
            }
            DataType::Int8 => number(i8::from_ne_bytes(self.ne_array().ok_or_else(err)?).into()),
            DataType::Int16 => number(i16::from_ne_bytes(self.ne_array().ok_or_else(err)?).into()),
            DataType::Int32 => number(i32::from_ne_bytes(self.ne_array().ok_or_else(err)?).into()),
            DataType::Int64 => number(i64::from_ne_bytes(self.ne_array().ok_or_else(err)?).into()),
            DataType::UInt8 => number(u8::from_ne_bytes(self.ne_array().ok_or_else(err)?).into()),
            DataType::UInt16 => number(u16::from_ne_bytes(self.ne_array().ok_or_else(err)?).into()),
            DataType::UInt32 => number(u32::from_ne_bytes(self.ne_array().ok_or_else(err)?).into()),
            DataType::UInt64 => number(u64::from_ne_bytes(self.ne_array().ok_or_else(err)?).into()),
            DataType::Float16 => FillValueMetadataV2::from_f64(
                half::f16::from_ne_bytes(self.ne_array().ok_or_else(err)?).to_f64(),
            ),
            DataType::Float32 => FillValueMetadataV2::from_f64(f64::from(f32::from_ne_bytes(
                self.ne_array().ok_or_else(err)?,
            ))),
            DataType::Float64 => {
                FillValueMetadataV2::from_f64(f64::from_ne_bytes(self.ne_array().ok_or_else(err)?))
            }
        })
    }

    /// Return `num_elements` copies of the fill value with elements in `endianness` byte order.
    #[must_use]
    pub fn repeat(&self, num_elements: usize, endianness: Option<Endianness>) -> Vec<u8> {
        let mut bytes = self.0.repeat(num_elements);
        reorder_native_bytes(&mut bytes, self.size(), endianness);
        bytes
    }
}
