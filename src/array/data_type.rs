//! Data types.
//!
//! Data types are declared in Zarr V2 array metadata as numpy type strings, e.g. `<u8`, `|u1`, `>f4`.
//! The first character is the byte order (`<` little endian, `>` big endian, `|` not applicable), the second is the type kind, and the remainder is the element size in bytes.

use derive_more::From;
use thiserror::Error;

use crate::metadata::v2::{array::data_type_metadata_v2_to_endianness, DataTypeMetadataV2};

use super::{Endianness, NATIVE_ENDIAN};

/// A data type.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[rustfmt::skip]
pub enum DataType {
    /// `bool` Boolean.
    Bool,
    /// `int8` Integer in `[-2^7, 2^7-1]`.
    Int8,
    /// `int16` Integer in `[-2^15, 2^15-1]`.
    Int16,
    /// `int32` Integer in `[-2^31, 2^31-1]`.
    Int32,
    /// `int64` Integer in `[-2^63, 2^63-1]`.
    Int64,
    /// `uint8` Integer in `[0, 2^8-1]`.
    UInt8,
    /// `uint16` Integer in `[0, 2^16-1]`.
    UInt16,
    /// `uint32` Integer in `[0, 2^32-1]`.
    UInt32,
    /// `uint64` Integer in `[0, 2^64-1]`.
    UInt64,
    /// `float16` IEEE 754 half-precision floating point: sign bit, 5 bits exponent, 10 bits mantissa.
    Float16,
    /// `float32` IEEE 754 single-precision floating point: sign bit, 8 bits exponent, 23 bits mantissa.
    Float32,
    /// `float64` IEEE 754 double-precision floating point: sign bit, 11 bits exponent, 52 bits mantissa.
    Float64,
}

/// The category of a [`DataType`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DataTypeCategory {
    /// Boolean.
    Bool,
    /// Signed integer.
    SignedInteger,
    /// Unsigned integer.
    UnsignedInteger,
    /// Floating point.
    Float,
}

/// An unsupported data type error.
#[derive(Debug, Error, From)]
#[error("unsupported data type {_0}")]
pub struct UnsupportedDataTypeError(String);

impl DataType {
    /// Returns the identifier.
    #[must_use]
    pub const fn identifier(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float16 => "float16",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// Returns the size in bytes of an element.
    #[must_use]
    pub const fn size(&self) -> usize {
        match self {
            Self::Bool | Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 | Self::Float16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }

    /// Returns the [`DataTypeCategory`].
    #[must_use]
    pub const fn category(&self) -> DataTypeCategory {
        match self {
            Self::Bool => DataTypeCategory::Bool,
            Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64 => {
                DataTypeCategory::SignedInteger
            }
            Self::UInt8 | Self::UInt16 | Self::UInt32 | Self::UInt64 => {
                DataTypeCategory::UnsignedInteger
            }
            Self::Float16 | Self::Float32 | Self::Float64 => DataTypeCategory::Float,
        }
    }

    /// Returns true if the data type is a signed or unsigned integer.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(
            self.category(),
            DataTypeCategory::SignedInteger | DataTypeCategory::UnsignedInteger
        )
    }

    /// Returns the inclusive range of values representable by an integer data type, otherwise [`None`].
    #[must_use]
    pub const fn integer_range(&self) -> Option<(i128, i128)> {
        match self {
            Self::Int8 => Some((i8::MIN as i128, i8::MAX as i128)),
            Self::Int16 => Some((i16::MIN as i128, i16::MAX as i128)),
            Self::Int32 => Some((i32::MIN as i128, i32::MAX as i128)),
            Self::Int64 => Some((i64::MIN as i128, i64::MAX as i128)),
            Self::UInt8 => Some((0, u8::MAX as i128)),
            Self::UInt16 => Some((0, u16::MAX as i128)),
            Self::UInt32 => Some((0, u32::MAX as i128)),
            Self::UInt64 => Some((0, u64::MAX as i128)),
            _ => None,
        }
    }

    /// Create a data type from Zarr V2 data type metadata.
    ///
    /// # Errors
    /// Returns [`UnsupportedDataTypeError`] if the metadata is not a boolean, integer or floating point type string with a valid byte order.
    pub fn from_metadata_v2(metadata: &DataTypeMetadataV2) -> Result<Self, UnsupportedDataTypeError> {
        let err = || UnsupportedDataTypeError(metadata.to_string());
        let endianness = data_type_metadata_v2_to_endianness(metadata).map_err(|_| err())?;
        let DataTypeMetadataV2::Simple(name) = metadata;
        let data_type = match &name[1..] {
            "b1" => Self::Bool,
            "i1" => Self::Int8,
            "i2" => Self::Int16,
            "i4" => Self::Int32,
            "i8" => Self::Int64,
            "u1" => Self::UInt8,
            "u2" => Self::UInt16,
            "u4" => Self::UInt32,
            "u8" => Self::UInt64,
            "f2" => Self::Float16,
            "f4" => Self::Float32,
            "f8" => Self::Float64,
            _ => return Err(err()),
        };
        // Multi-byte types need a byte order; single byte types may use any prefix
        if endianness.is_none() && data_type.size() > 1 {
            return Err(err());
        }
        Ok(data_type)
    }

    /// Returns the Zarr V2 data type metadata with `endianness`.
    ///
    /// Single byte data types always use the `|` byte order prefix.
    #[must_use]
    pub fn metadata_v2(&self, endianness: Endianness) -> DataTypeMetadataV2 {
        let kind = match self.category() {
            DataTypeCategory::Bool => 'b',
            DataTypeCategory::SignedInteger => 'i',
            DataTypeCategory::UnsignedInteger => 'u',
            DataTypeCategory::Float => 'f',
        };
        let byte_order = if self.size() == 1 {
            '|'
        } else {
            match endianness {
                Endianness::Little => '<',
                Endianness::Big => '>',
            }
        };
        DataTypeMetadataV2::Simple(format!("{byte_order}{kind}{}", self.size()))
    }

    /// Returns the Zarr V2 data type metadata with native endianness.
    #[must_use]
    pub fn metadata_v2_native(&self) -> DataTypeMetadataV2 {
        self.metadata_v2(NATIVE_ENDIAN)
    }
}

impl core::fmt::Display for DataType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_v2_parse() {
        assert_eq!(
            DataType::from_metadata_v2(&"<u8".into()).unwrap(),
            DataType::UInt64
        );
        assert_eq!(
            DataType::from_metadata_v2(&"|u1".into()).unwrap(),
            DataType::UInt8
        );
        assert_eq!(
            DataType::from_metadata_v2(&"<u1".into()).unwrap(),
            DataType::UInt8
        );
        assert_eq!(
            DataType::from_metadata_v2(&">f4".into()).unwrap(),
            DataType::Float32
        );
        assert_eq!(
            DataType::from_metadata_v2(&"|b1".into()).unwrap(),
            DataType::Bool
        );
        assert!(DataType::from_metadata_v2(&"|f8".into()).is_err());
        assert!(DataType::from_metadata_v2(&"<c16".into()).is_err());
        assert!(DataType::from_metadata_v2(&"u8".into()).is_err());
        assert_eq!(
            DataType::from_metadata_v2(&"<U5".into())
                .unwrap_err()
                .to_string(),
            "unsupported data type <U5"
        );
    }

    #[test]
    fn data_type_v2_metadata() {
        assert_eq!(
            DataType::UInt64.metadata_v2(Endianness::Little),
            DataTypeMetadataV2::from("<u8")
        );
        assert_eq!(
            DataType::Int16.metadata_v2(Endianness::Big),
            DataTypeMetadataV2::from(">i2")
        );
        assert_eq!(
            DataType::UInt8.metadata_v2(Endianness::Big),
            DataTypeMetadataV2::from("|u1")
        );
        assert_eq!(
            DataType::Bool.metadata_v2(Endianness::Little),
            DataTypeMetadataV2::from("|b1")
        );
    }

    #[test]
    fn data_type_integer_range() {
        assert_eq!(DataType::UInt8.integer_range(), Some((0, 255)));
        assert_eq!(DataType::Int8.integer_range(), Some((-128, 127)));
        assert_eq!(
            DataType::UInt64.integer_range(),
            Some((0, i128::from(u64::MAX)))
        );
        assert_eq!(DataType::Float32.integer_range(), None);
        assert!(DataType::Int32.is_integer());
        assert!(!DataType::Bool.is_integer());
    }
}
