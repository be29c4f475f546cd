use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::array::{ArrayShape, ChunkShape, Endianness};

use super::MetadataV2;

/// Zarr array metadata (storage specification v2).
///
/// An example `JSON` document for a Zarr V2 array:
/// ```json
/// {
///     "zarr_format": 2,
///     "shape": [
///         4,
///         8,
///         16
///     ],
///     "chunks": [
///         2,
///         4,
///         8
///     ],
///     "dtype": "<f8",
///     "compressor": null,
///     "fill_value": "NaN",
///     "order": "C",
///     "filters": null
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Display)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct ArrayMetadataV2 {
    /// An integer defining the version of the storage specification to which the array adheres. Must be `2`.
    pub zarr_format: monostate::MustBe!(2u64),
    /// An array of integers providing the length of each dimension of the Zarr array.
    pub shape: ArrayShape,
    /// A list of integers defining the length of each dimension of a chunk of the array.
    pub chunks: ChunkShape,
    /// The data type of the Zarr array.
    pub dtype: DataTypeMetadataV2,
    /// A JSON object identifying the primary compression codec and providing configuration parameters, or null if no compressor is to be used.
    pub compressor: Option<MetadataV2>,
    /// A scalar value providing the default value to use for uninitialized portions of the array, or null if no fill value is to be used.
    pub fill_value: FillValueMetadataV2,
    /// Either “C” or “F”, defining the layout of bytes within each chunk of the array.
    pub order: ArrayMetadataV2Order,
    /// A list of JSON objects providing codec configurations, or null if no filters are to be applied.
    #[serde(default)]
    pub filters: Option<Vec<MetadataV2>>,
    /// Optional user defined attributes contained in a separate `.zattrs` file.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl ArrayMetadataV2 {
    /// Create Zarr V2 array metadata for an uncompressed C order array.
    #[must_use]
    pub fn new(
        shape: ArrayShape,
        chunks: ChunkShape,
        dtype: DataTypeMetadataV2,
        fill_value: FillValueMetadataV2,
    ) -> Self {
        Self {
            zarr_format: monostate::MustBe!(2u64),
            shape,
            chunks,
            dtype,
            compressor: None,
            fill_value,
            order: ArrayMetadataV2Order::C,
            filters: None,
            attributes: serde_json::Map::new(),
        }
    }

    /// Set the order.
    #[must_use]
    pub fn with_order(mut self, order: ArrayMetadataV2Order) -> Self {
        self.order = order;
        self
    }

    /// Set the user attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: serde_json::Map<String, serde_json::Value>) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Zarr V2 data type metadata.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(untagged)]
pub enum DataTypeMetadataV2 {
    /// A simple data type, such as `<f8`.
    Simple(String),
}

impl core::fmt::Display for DataTypeMetadataV2 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let Self::Simple(name) = self;
        write!(f, "{name}")
    }
}

impl From<&str> for DataTypeMetadataV2 {
    fn from(name: &str) -> Self {
        Self::Simple(name.to_string())
    }
}

impl From<String> for DataTypeMetadataV2 {
    fn from(name: String) -> Self {
        Self::Simple(name)
    }
}

/// A Zarr V2 invalid data type endianness error.
#[derive(Debug, Error)]
#[error("invalid V2 data type for {_0:?} endianness, must begin with |, < or >")]
pub struct DataTypeMetadataV2InvalidEndiannessError(DataTypeMetadataV2);

/// Get the endianness of a Zarr V2 data type.
///
/// # Errors
/// Returns a [`DataTypeMetadataV2InvalidEndiannessError`] if the endianness prefix is invalid.
pub fn data_type_metadata_v2_to_endianness(
    data_type: &DataTypeMetadataV2,
) -> Result<Option<Endianness>, DataTypeMetadataV2InvalidEndiannessError> {
    let DataTypeMetadataV2::Simple(data_type_str) = data_type;
    match data_type_str.chars().next() {
        Some('|') => Ok(None),
        Some('<') => Ok(Some(Endianness::Little)),
        Some('>') => Ok(Some(Endianness::Big)),
        _ => Err(DataTypeMetadataV2InvalidEndiannessError(data_type.clone())),
    }
}

/// A scalar value providing the default value to use for uninitialized portions of the array, or null if no fill value is to be used.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum FillValueMetadataV2 {
    /// No fill value.
    Null,
    /// NaN (not-a-number).
    NaN,
    /// Positive infinity.
    Infinity,
    /// Negative infinity.
    NegInfinity,
    /// A number.
    Number(serde_json::Number),
    /// A boolean.
    Bool(bool),
    /// Any other string, such as a base64 encoded fill value.
    String(String),
}

impl FillValueMetadataV2 {
    /// Returns true if the fill value is [`FillValueMetadataV2::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Create fill value metadata from a floating point value.
    ///
    /// Non-finite values are encoded as `"NaN"`, `"Infinity"` or `"-Infinity"`.
    #[must_use]
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            Self::NaN
        } else if value == f64::INFINITY {
            Self::Infinity
        } else if value == f64::NEG_INFINITY {
            Self::NegInfinity
        } else {
            serde_json::Number::from_f64(value).map_or(Self::NaN, Self::Number)
        }
    }
}

impl<T: Into<FillValueMetadataV2>> From<Option<T>> for FillValueMetadataV2 {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

macro_rules! fill_value_metadata_v2_from_int {
    ( $($t:ty),* ) => {
        $(
            impl From<$t> for FillValueMetadataV2 {
                fn from(value: $t) -> Self {
                    Self::Number(value.into())
                }
            }
        )*
    };
}

fill_value_metadata_v2_from_int!(u8, u16, u32, u64, i8, i16, i32, i64);

impl From<f32> for FillValueMetadataV2 {
    fn from(value: f32) -> Self {
        Self::from_f64(f64::from(value))
    }
}

impl From<f64> for FillValueMetadataV2 {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

impl From<bool> for FillValueMetadataV2 {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<'de> serde::Deserialize<'de> for FillValueMetadataV2 {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum FillValueMetadataV2Type {
            Bool(bool),
            String(String),
            Number(serde_json::Number),
            Null,
        }
        let fill_value = FillValueMetadataV2Type::deserialize(d)?;
        match fill_value {
            FillValueMetadataV2Type::String(string) => match string.as_str() {
                "NaN" => Ok(Self::NaN),
                "Infinity" => Ok(Self::Infinity),
                "-Infinity" => Ok(Self::NegInfinity),
                _ => Ok(Self::String(string)),
            },
            FillValueMetadataV2Type::Number(number) => Ok(Self::Number(number)),
            FillValueMetadataV2Type::Bool(value) => Ok(Self::Bool(value)),
            FillValueMetadataV2Type::Null => Ok(Self::Null),
        }
    }
}

impl Serialize for FillValueMetadataV2 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::NaN => serializer.serialize_str("NaN"),
            Self::Infinity => serializer.serialize_str("Infinity"),
            Self::NegInfinity => serializer.serialize_str("-Infinity"),
            Self::Number(number) => number.serialize(serializer),
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::String(string) => serializer.serialize_str(string),
        }
    }
}

/// The layout of bytes within each chunk of the array.
#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum ArrayMetadataV2Order {
    /// Row-major order. The last dimension varies fastest.
    #[default]
    C,
    /// Column-major order. The first dimension varies fastest.
    F,
}
