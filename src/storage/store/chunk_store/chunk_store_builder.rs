use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use thiserror::Error;

use crate::{
    array::{
        chunk_grid_shape, chunk_indices, ArrayShape, ChunkIndex, ChunkShape, DataType,
        DimensionNames, Endianness, FillValue, IncompatibleDimensionalityError,
        IncompatibleFillValueError, UnsupportedDataTypeError, NATIVE_ENDIAN,
    },
    metadata::{
        to_json_bytes,
        v2::{
            ArrayMetadataV2, ArrayMetadataV2Order, DataTypeMetadataV2, FillValueMetadataV2,
            GroupMetadataV2, MetadataV2,
        },
        ARRAY_DIMENSIONS,
    },
    storage::{
        array_meta_key_v2_attributes, data_key, meta_key_v2_array, meta_key_v2_attributes,
        meta_key_v2_group, Bytes, StoreKey, StoreKeyError, StoreKeys,
    },
};

use super::{
    chunk_resolver::{ChunkResolver, ChunkResolverRef},
    ChunkStore, ChunkStoreEntry,
};

/// A [`ChunkStore`] creation error.
#[derive(Debug, Error)]
pub enum ChunkStoreCreateError {
    /// The dimension names, shape and chunk shape have different lengths.
    #[error(transparent)]
    IncompatibleDimensionality(#[from] IncompatibleDimensionalityError),
    /// A shape has no dimensions, a zero extent, or a size in bytes exceeding [`u64::MAX`].
    #[error("invalid extents {0:?}, there must be at least one dimension, all extents must be positive and the size in bytes must fit in a u64")]
    InvalidExtent(Vec<u64>),
    /// The array name is not a valid key component.
    #[error("invalid array name {0:?}, it must be non-empty, must not contain `/` and must not start with `.`")]
    InvalidArrayName(String),
    /// An array with the same name is already registered.
    #[error("array {0} is already registered")]
    DuplicateArrayName(String),
    /// A lazy array has no resolver and the store has no default resolver.
    #[error("array {0} has no chunk resolver and there is no default chunk resolver")]
    MissingResolver(String),
    /// The bytes of a materialised array do not match its shape and data type.
    #[error("array {name} requires {expected} bytes, got {got}")]
    InvalidBytesLength {
        /// The array name.
        name: String,
        /// The expected number of bytes.
        expected: u64,
        /// The supplied number of bytes.
        got: u64,
    },
    /// An unsupported data type.
    #[error(transparent)]
    UnsupportedDataType(#[from] UnsupportedDataTypeError),
    /// Invalid metadata or attributes.
    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),
    /// An invalid store key.
    #[error(transparent)]
    InvalidStoreKey(#[from] StoreKeyError),
}

impl From<serde_json::Error> for ChunkStoreCreateError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidMetadata(err.to_string())
    }
}

impl From<IncompatibleFillValueError> for ChunkStoreCreateError {
    fn from(err: IncompatibleFillValueError) -> Self {
        Self::InvalidMetadata(err.to_string())
    }
}

/// Options of a lazily resolved array added with [`ChunkStoreBuilder::add_lazy_array`].
///
/// Defaults: native endian, no fill value, no compressor, no filters, C order, no attributes, and the store's default resolver.
#[derive(Clone)]
pub struct LazyArrayOptions {
    /// Data type.
    pub data_type: DataType,
    /// The byte order recorded in the data type metadata.
    pub endianness: Endianness,
    /// Fill value.
    pub fill_value: FillValueMetadataV2,
    /// Compressor metadata. Resolvers must return compressed chunks if set.
    pub compressor: Option<MetadataV2>,
    /// Filter metadata. Resolvers must return filtered chunks if set.
    pub filters: Option<Vec<MetadataV2>>,
    /// Memory layout of chunks.
    pub order: ArrayMetadataV2Order,
    /// Attributes. These are merged after `_ARRAY_DIMENSIONS`.
    pub attributes: serde_json::Map<String, serde_json::Value>,
    /// Chunk resolver. Falls back to the default resolver of the builder if [`None`].
    pub resolver: Option<ChunkResolverRef>,
}

impl LazyArrayOptions {
    /// Create lazy array options for `data_type`.
    #[must_use]
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            endianness: NATIVE_ENDIAN,
            fill_value: FillValueMetadataV2::Null,
            compressor: None,
            filters: None,
            order: ArrayMetadataV2Order::C,
            attributes: serde_json::Map::new(),
            resolver: None,
        }
    }

    /// Create lazy array options from a Zarr V2 data type string, such as `<f8`.
    ///
    /// # Errors
    /// Returns [`UnsupportedDataTypeError`] if `dtype` is not supported.
    pub fn from_dtype(dtype: &str) -> Result<Self, UnsupportedDataTypeError> {
        let (data_type, endianness) = parse_dtype(dtype)?;
        Ok(Self::new(data_type).with_endianness(endianness))
    }

    /// Set the endianness.
    #[must_use]
    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    /// Set the fill value.
    #[must_use]
    pub fn with_fill_value(mut self, fill_value: impl Into<FillValueMetadataV2>) -> Self {
        self.fill_value = fill_value.into();
        self
    }

    /// Set the compressor.
    #[must_use]
    pub fn with_compressor(mut self, compressor: MetadataV2) -> Self {
        self.compressor = Some(compressor);
        self
    }

    /// Set the filters.
    #[must_use]
    pub fn with_filters(mut self, filters: Vec<MetadataV2>) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Set the order.
    #[must_use]
    pub fn with_order(mut self, order: ArrayMetadataV2Order) -> Self {
        self.order = order;
        self
    }

    /// Set the attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: serde_json::Map<String, serde_json::Value>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Set the chunk resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: impl ChunkResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Set a shared chunk resolver.
    #[must_use]
    pub fn with_resolver_ref(mut self, resolver: ChunkResolverRef) -> Self {
        self.resolver = Some(resolver);
        self
    }
}

impl core::fmt::Debug for LazyArrayOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LazyArrayOptions")
            .field("data_type", &self.data_type)
            .field("endianness", &self.endianness)
            .field("fill_value", &self.fill_value)
            .field("compressor", &self.compressor)
            .field("filters", &self.filters)
            .field("order", &self.order)
            .field("attributes", &self.attributes)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

/// Options of a placeholder array added with [`ChunkStoreBuilder::add_nan_array`].
///
/// If the fill value is [`FillValueMetadataV2::Null`], it defaults to the data type maximum for integers, NaN for floating point and `true` for booleans.
/// See [`FillValue::from_nan_policy`].
#[derive(Clone, Debug)]
pub struct NanArrayOptions {
    /// Data type.
    pub data_type: DataType,
    /// The byte order of the data type metadata and the stored chunk.
    pub endianness: Endianness,
    /// Fill value.
    pub fill_value: FillValueMetadataV2,
    /// Compressor metadata. The stored chunk is never compressed.
    pub compressor: Option<MetadataV2>,
    /// Filter metadata.
    pub filters: Option<Vec<MetadataV2>>,
    /// Memory layout of chunks.
    pub order: ArrayMetadataV2Order,
    /// Attributes. These are merged after `_ARRAY_DIMENSIONS`.
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl NanArrayOptions {
    /// Create placeholder array options for `data_type`.
    #[must_use]
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            endianness: NATIVE_ENDIAN,
            fill_value: FillValueMetadataV2::Null,
            compressor: None,
            filters: None,
            order: ArrayMetadataV2Order::C,
            attributes: serde_json::Map::new(),
        }
    }

    /// Create placeholder array options from a Zarr V2 data type string, such as `|u1`.
    ///
    /// # Errors
    /// Returns [`UnsupportedDataTypeError`] if `dtype` is not supported.
    pub fn from_dtype(dtype: &str) -> Result<Self, UnsupportedDataTypeError> {
        let (data_type, endianness) = parse_dtype(dtype)?;
        Ok(Self::new(data_type).with_endianness(endianness))
    }

    /// Set the endianness.
    #[must_use]
    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    /// Set the fill value.
    #[must_use]
    pub fn with_fill_value(mut self, fill_value: impl Into<FillValueMetadataV2>) -> Self {
        self.fill_value = fill_value.into();
        self
    }

    /// Set the compressor.
    #[must_use]
    pub fn with_compressor(mut self, compressor: MetadataV2) -> Self {
        self.compressor = Some(compressor);
        self
    }

    /// Set the filters.
    #[must_use]
    pub fn with_filters(mut self, filters: Vec<MetadataV2>) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Set the order.
    #[must_use]
    pub fn with_order(mut self, order: ArrayMetadataV2Order) -> Self {
        self.order = order;
        self
    }

    /// Set the attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: serde_json::Map<String, serde_json::Value>) -> Self {
        self.attributes = attributes;
        self
    }
}

fn parse_dtype(dtype: &str) -> Result<(DataType, Endianness), UnsupportedDataTypeError> {
    let metadata: DataTypeMetadataV2 = dtype.into();
    let data_type = DataType::from_metadata_v2(&metadata)?;
    let endianness = match dtype.chars().next() {
        Some('>') => Endianness::Big,
        Some('<') => Endianness::Little,
        _ => NATIVE_ENDIAN,
    };
    Ok((data_type, endianness))
}

/// A [`ChunkStore`] builder.
///
/// The builder is initialised with the dimension names, shape, and chunk shape shared by every lazy and placeholder array of the store.
/// The `.zgroup` and `.zattrs` documents of the root group are registered on creation.
///
/// Arrays are registered with
///  - [`add_array`](ChunkStoreBuilder::add_array): a single materialised chunk,
///  - [`add_lazy_array`](ChunkStoreBuilder::add_lazy_array): chunks resolved on every read, and
///  - [`add_nan_array`](ChunkStoreBuilder::add_nan_array): a single chunk filled with a fill value.
///
/// [`build`](ChunkStoreBuilder::build) consumes the builder and returns an immutable [`ChunkStore`].
///
/// ```rust
/// # use zarrs_chunk_store::array::DataType;
/// # use zarrs_chunk_store::storage::store::{ChunkStoreBuilder, NanArrayOptions};
/// let mut builder = ChunkStoreBuilder::new(["y", "x"], [4, 4], [2, 2])?;
/// builder
///     .attributes(serde_json::json!({"title": "example"}).as_object().unwrap().clone())?
///     .add_array("x", vec![4], DataType::Float64, vec![0u8; 32], serde_json::Map::new())?
///     .add_nan_array("mask", NanArrayOptions::new(DataType::Bool))?;
/// let store = builder.build();
/// assert_eq!(store.len(), 2 + 3 + 3);
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
pub struct ChunkStoreBuilder {
    dims: DimensionNames,
    shape: ArrayShape,
    chunks: ChunkShape,
    resolver: Option<ChunkResolverRef>,
    keys: StoreKeys,
    entries: HashMap<StoreKey, ChunkStoreEntry>,
    array_names: HashSet<String>,
}

impl core::fmt::Debug for ChunkStoreBuilder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ChunkStoreBuilder")
            .field("dims", &self.dims)
            .field("shape", &self.shape)
            .field("chunks", &self.chunks)
            .field("resolver", &self.resolver.is_some())
            .field("keys", &self.keys)
            .finish()
    }
}

impl ChunkStoreBuilder {
    /// Create a new chunk store builder.
    ///
    /// # Errors
    /// Returns a [`ChunkStoreCreateError`] if
    ///  - `dims`, `shape`, and `chunks` have different lengths,
    ///  - there are no dimensions, or
    ///  - any element of `shape` or `chunks` is zero.
    pub fn new(
        dims: impl IntoIterator<Item = impl Into<String>>,
        shape: impl Into<ArrayShape>,
        chunks: impl Into<ChunkShape>,
    ) -> Result<Self, ChunkStoreCreateError> {
        let dims: DimensionNames = dims.into_iter().map(Into::into).collect();
        let shape = shape.into();
        let chunks = chunks.into();
        if dims.len() != shape.len() {
            return Err(IncompatibleDimensionalityError::new(shape.len(), dims.len()).into());
        }
        chunk_grid_shape(&shape, &chunks)?;
        validate_extents(&shape)?;
        validate_extents(&chunks)?;

        let mut builder = Self {
            dims,
            shape,
            chunks,
            resolver: None,
            keys: Vec::new(),
            entries: HashMap::new(),
            array_names: HashSet::new(),
        };
        builder.insert_static(
            meta_key_v2_group(),
            to_json_bytes(&GroupMetadataV2::default())?,
        );
        builder.insert_static(
            meta_key_v2_attributes(),
            to_json_bytes(&serde_json::Map::new())?,
        );
        Ok(builder)
    }

    /// Set the global attributes written to `.zattrs`.
    ///
    /// # Errors
    /// Returns [`ChunkStoreCreateError::InvalidMetadata`] if the attributes cannot be serialised.
    pub fn attributes(
        &mut self,
        attributes: serde_json::Map<String, serde_json::Value>,
    ) -> Result<&mut Self, ChunkStoreCreateError> {
        self.insert_static(meta_key_v2_attributes(), to_json_bytes(&attributes)?);
        Ok(self)
    }

    /// Set the default chunk resolver of lazy arrays.
    pub fn resolver(&mut self, resolver: impl ChunkResolver + 'static) -> &mut Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Set a shared default chunk resolver of lazy arrays.
    pub fn resolver_ref(&mut self, resolver: ChunkResolverRef) -> &mut Self {
        self.resolver = Some(resolver);
        self
    }

    /// Returns the number of dimensions.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Returns the dimension names.
    #[must_use]
    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    /// Returns the shape.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// Returns the chunk shape.
    #[must_use]
    pub fn chunks(&self) -> &[u64] {
        &self.chunks
    }

    /// Add an array with a single materialised chunk holding `bytes`.
    ///
    /// The array has its own `shape` and a chunk shape equal to `shape`.
    /// `bytes` must be the C order, native endian, representation of the array.
    /// `attributes` are written to `.zattrs` as supplied.
    ///
    /// # Errors
    /// Returns a [`ChunkStoreCreateError`] if the array name is invalid or already registered, `shape` is invalid, or the length of `bytes` does not match `shape` and `data_type`.
    pub fn add_array(
        &mut self,
        name: &str,
        shape: ArrayShape,
        data_type: DataType,
        bytes: impl Into<Bytes>,
        attributes: serde_json::Map<String, serde_json::Value>,
    ) -> Result<&mut Self, ChunkStoreCreateError> {
        self.validate_array_name(name)?;
        validate_extents(&shape)?;
        let bytes: Bytes = bytes.into();
        let expected = num_bytes(&shape, data_type)?;
        if bytes.len() as u64 != expected {
            return Err(ChunkStoreCreateError::InvalidBytesLength {
                name: name.to_string(),
                expected,
                got: bytes.len() as u64,
            });
        }

        let chunk_index = ChunkIndex::zeros(shape.len());
        let metadata = ArrayMetadataV2::new(
            shape.clone(),
            shape,
            data_type.metadata_v2_native(),
            FillValueMetadataV2::Null,
        );
        self.insert_static(meta_key_v2_array(name)?, to_json_bytes(&metadata)?);
        self.insert_static(array_meta_key_v2_attributes(name)?, to_json_bytes(&attributes)?);
        self.insert_static(data_key(name, &chunk_index)?, bytes);
        self.array_names.insert(name.to_string());
        log::debug!("added array {name} ({data_type})");
        Ok(self)
    }

    /// Add an array from an [`ndarray::ArrayBase`] with a single materialised chunk.
    ///
    /// See [`add_array`](ChunkStoreBuilder::add_array).
    ///
    /// # Errors
    /// Returns a [`ChunkStoreCreateError`] if the array name is invalid or already registered, or the array has no dimensions or a zero extent.
    #[cfg(feature = "ndarray")]
    pub fn add_ndarray<T: crate::array::Element, S: ndarray::Data<Elem = T>, D: ndarray::Dimension>(
        &mut self,
        name: &str,
        array: &ndarray::ArrayBase<S, D>,
        attributes: serde_json::Map<String, serde_json::Value>,
    ) -> Result<&mut Self, ChunkStoreCreateError> {
        let shape = crate::array::ndarray_shape(array.shape());
        let elements: Vec<T> = array.iter().copied().collect();
        let bytes = bytemuck::cast_slice::<T, u8>(&elements).to_vec();
        self.add_array(name, shape, T::DATA_TYPE, bytes, attributes)
    }

    /// Add an array whose chunks are produced by a [`ChunkResolver`] on every read.
    ///
    /// The array has the shape and chunk shape of the store.
    /// A chunk key is registered for every index of the chunk grid (`floor(shape / chunks)` chunks per dimension), so a trailing partial chunk has no key.
    /// `.zattrs` holds `_ARRAY_DIMENSIONS` followed by the supplied attributes.
    ///
    /// # Errors
    /// Returns a [`ChunkStoreCreateError`] if
    ///  - the array name is invalid or already registered,
    ///  - neither `options` nor the builder has a resolver,
    ///  - the size of a chunk in bytes overflows, or
    ///  - the attributes contain `_ARRAY_DIMENSIONS`.
    pub fn add_lazy_array(
        &mut self,
        name: &str,
        options: LazyArrayOptions,
    ) -> Result<&mut Self, ChunkStoreCreateError> {
        self.validate_array_name(name)?;
        let resolver = options
            .resolver
            .or_else(|| self.resolver.clone())
            .ok_or_else(|| ChunkStoreCreateError::MissingResolver(name.to_string()))?;
        let attributes = self.array_attributes(options.attributes)?;

        // Compressed or filtered chunks have no fixed size
        let chunk_size = num_bytes(&self.chunks, options.data_type)?;
        let size = (options.compressor.is_none() && options.filters.is_none()).then_some(chunk_size);
        let metadata = ArrayMetadataV2 {
            compressor: options.compressor,
            filters: options.filters,
            ..ArrayMetadataV2::new(
                self.shape.clone(),
                self.chunks.clone(),
                options.data_type.metadata_v2(options.endianness),
                options.fill_value,
            )
        }
        .with_order(options.order);
        self.insert_static(meta_key_v2_array(name)?, to_json_bytes(&metadata)?);
        self.insert_static(array_meta_key_v2_attributes(name)?, to_json_bytes(&attributes)?);

        let grid_shape = chunk_grid_shape(&self.shape, &self.chunks)?;
        let mut num_chunks = 0usize;
        for chunk_index in chunk_indices(&grid_shape) {
            let key = data_key(name, &chunk_index)?;
            self.insert(
                key,
                ChunkStoreEntry::Lazy {
                    array_name: name.to_string(),
                    chunk_index,
                    resolver: resolver.clone(),
                    size,
                },
            );
            num_chunks += 1;
        }
        self.array_names.insert(name.to_string());
        log::debug!(
            "added lazy array {name} ({}) with {num_chunks} chunks",
            options.data_type
        );
        Ok(self)
    }

    /// Add a placeholder array with a single chunk filled with a fill value.
    ///
    /// The array has the shape and chunk shape of the store.
    /// Only the chunk at the all-zero index is stored; consumers read other chunks as missing, which Zarr interprets as the fill value.
    /// The fill value follows [`FillValue::from_nan_policy`] and is recorded in `.zarray` as a JSON number (or `"NaN"`, `"Infinity"`, `"-Infinity"`).
    ///
    /// # Errors
    /// Returns a [`ChunkStoreCreateError`] if the array name is invalid or already registered, or the attributes contain `_ARRAY_DIMENSIONS`.
    pub fn add_nan_array(
        &mut self,
        name: &str,
        options: NanArrayOptions,
    ) -> Result<&mut Self, ChunkStoreCreateError> {
        self.validate_array_name(name)?;
        let attributes = self.array_attributes(options.attributes)?;

        let fill_value = FillValue::from_nan_policy(options.data_type, &options.fill_value);
        let metadata = ArrayMetadataV2 {
            compressor: options.compressor,
            filters: options.filters,
            ..ArrayMetadataV2::new(
                self.shape.clone(),
                self.chunks.clone(),
                options.data_type.metadata_v2(options.endianness),
                fill_value.to_metadata_v2(options.data_type)?,
            )
        }
        .with_order(options.order);
        let chunk_size = num_bytes(&self.chunks, options.data_type)?;
        if isize::try_from(chunk_size).is_err() {
            return Err(ChunkStoreCreateError::InvalidExtent(self.chunks.clone()));
        }
        #[allow(clippy::cast_possible_truncation)]
        let num_elements = (chunk_size / options.data_type.size() as u64) as usize;
        let chunk = fill_value.repeat(num_elements, Some(options.endianness));

        self.insert_static(meta_key_v2_array(name)?, to_json_bytes(&metadata)?);
        self.insert_static(array_meta_key_v2_attributes(name)?, to_json_bytes(&attributes)?);
        self.insert_static(data_key(name, &ChunkIndex::zeros(self.ndim()))?, chunk);
        self.array_names.insert(name.to_string());
        log::debug!(
            "added nan array {name} ({}) with fill value {fill_value}",
            options.data_type
        );
        Ok(self)
    }

    /// Build the immutable [`ChunkStore`].
    #[must_use]
    pub fn build(self) -> ChunkStore {
        log::debug!(
            "built chunk store with {} arrays and {} keys",
            self.array_names.len(),
            self.keys.len()
        );
        ChunkStore {
            dims: self.dims,
            shape: self.shape,
            chunks: self.chunks,
            keys: self.keys,
            entries: self.entries,
        }
    }

    fn validate_array_name(&self, name: &str) -> Result<(), ChunkStoreCreateError> {
        if name.is_empty() || name.contains('/') || name.starts_with('.') {
            Err(ChunkStoreCreateError::InvalidArrayName(name.to_string()))
        } else if self.array_names.contains(name) {
            Err(ChunkStoreCreateError::DuplicateArrayName(name.to_string()))
        } else {
            Ok(())
        }
    }

    /// `_ARRAY_DIMENSIONS` followed by `attributes`.
    fn array_attributes(
        &self,
        attributes: serde_json::Map<String, serde_json::Value>,
    ) -> Result<serde_json::Map<String, serde_json::Value>, ChunkStoreCreateError> {
        if attributes.contains_key(ARRAY_DIMENSIONS) {
            return Err(ChunkStoreCreateError::InvalidMetadata(format!(
                "{ARRAY_DIMENSIONS} is set from the store dimensions and cannot be supplied"
            )));
        }
        let mut array_attributes = serde_json::Map::new();
        array_attributes.insert(ARRAY_DIMENSIONS.to_string(), self.dims.clone().into());
        array_attributes.extend(attributes);
        Ok(array_attributes)
    }

    fn insert_static(&mut self, key: StoreKey, value: impl Into<Bytes>) {
        self.insert(key, ChunkStoreEntry::Static(value.into()));
    }

    fn insert(&mut self, key: StoreKey, entry: ChunkStoreEntry) {
        if self.entries.insert(key.clone(), entry).is_none() {
            self.keys.push(key);
        }
    }
}

/// The size in bytes of an array or chunk of shape `extents`.
fn num_bytes(extents: &[u64], data_type: DataType) -> Result<u64, ChunkStoreCreateError> {
    extents
        .iter()
        .try_fold(data_type.size() as u64, |num_bytes, &extent| {
            num_bytes.checked_mul(extent)
        })
        .ok_or_else(|| ChunkStoreCreateError::InvalidExtent(extents.to_vec()))
}

fn validate_extents(extents: &[u64]) -> Result<(), ChunkStoreCreateError> {
    if extents.is_empty() || extents.contains(&0) {
        Err(ChunkStoreCreateError::InvalidExtent(extents.to_vec()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Bytes, ChunkResolverError};

    fn resolver(
        _store: &ChunkStore,
        _array_name: &str,
        _chunk_index: &[u64],
    ) -> Result<Bytes, ChunkResolverError> {
        Ok(Bytes::new())
    }

    #[test]
    fn chunk_store_builder_invalid() {
        assert!(matches!(
            ChunkStoreBuilder::new(["y", "x"], [4], [2]),
            Err(ChunkStoreCreateError::IncompatibleDimensionality(_))
        ));
        assert!(matches!(
            ChunkStoreBuilder::new(["y", "x"], [4, 4], [2]),
            Err(ChunkStoreCreateError::IncompatibleDimensionality(_))
        ));
        assert!(matches!(
            ChunkStoreBuilder::new(Vec::<String>::new(), Vec::<u64>::new(), Vec::<u64>::new()),
            Err(ChunkStoreCreateError::InvalidExtent(_))
        ));
        assert!(matches!(
            ChunkStoreBuilder::new(["x"], [0], [2]),
            Err(ChunkStoreCreateError::InvalidExtent(_))
        ));
        assert!(matches!(
            ChunkStoreBuilder::new(["x"], [4], [0]),
            Err(ChunkStoreCreateError::InvalidExtent(_))
        ));
    }

    #[test]
    fn chunk_store_builder_array_names() {
        let mut builder = ChunkStoreBuilder::new(["x"], [4], [2]).unwrap();
        builder.resolver(resolver);
        for name in ["", ".zattrs", "a/b"] {
            assert!(matches!(
                builder.add_lazy_array(name, LazyArrayOptions::new(DataType::UInt8)),
                Err(ChunkStoreCreateError::InvalidArrayName(_))
            ));
        }
        builder
            .add_lazy_array("a", LazyArrayOptions::new(DataType::UInt8))
            .unwrap();
        assert!(matches!(
            builder.add_nan_array("a", NanArrayOptions::new(DataType::UInt8)),
            Err(ChunkStoreCreateError::DuplicateArrayName(_))
        ));
        assert!(matches!(
            builder.add_array("a", vec![1], DataType::UInt8, vec![0u8], serde_json::Map::new()),
            Err(ChunkStoreCreateError::DuplicateArrayName(_))
        ));
    }

    #[test]
    fn chunk_store_builder_missing_resolver() {
        let mut builder = ChunkStoreBuilder::new(["x"], [4], [2]).unwrap();
        assert!(matches!(
            builder.add_lazy_array("a", LazyArrayOptions::new(DataType::UInt8)),
            Err(ChunkStoreCreateError::MissingResolver(name)) if name == "a"
        ));
        builder
            .add_lazy_array(
                "a",
                LazyArrayOptions::new(DataType::UInt8).with_resolver(resolver),
            )
            .unwrap();
    }

    #[test]
    fn chunk_store_builder_chunk_size_overflow() {
        let mut builder = ChunkStoreBuilder::new(["x"], [u64::MAX], [u64::MAX]).unwrap();
        builder.resolver(resolver);
        assert!(matches!(
            builder.add_lazy_array("a", LazyArrayOptions::new(DataType::Float64)),
            Err(ChunkStoreCreateError::InvalidExtent(_))
        ));
        assert!(matches!(
            builder.add_nan_array("b", NanArrayOptions::new(DataType::UInt16)),
            Err(ChunkStoreCreateError::InvalidExtent(_))
        ));
        // Fits in a u64 but cannot be allocated
        assert!(matches!(
            builder.add_nan_array("b", NanArrayOptions::new(DataType::UInt8)),
            Err(ChunkStoreCreateError::InvalidExtent(_))
        ));
        assert!(matches!(
            builder.add_array(
                "c",
                vec![u64::MAX, 2],
                DataType::UInt8,
                vec![0u8],
                serde_json::Map::new()
            ),
            Err(ChunkStoreCreateError::InvalidExtent(_))
        ));
        // Failed registrations leave no keys behind
        assert_eq!(builder.build().len(), 2);
    }

    #[test]
    fn chunk_store_builder_invalid_bytes_length() {
        let mut builder = ChunkStoreBuilder::new(["x"], [4], [2]).unwrap();
        let err = builder
            .add_array("a", vec![2, 2], DataType::UInt16, vec![0u8; 4], serde_json::Map::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "array a requires 8 bytes, got 4");
    }

    #[test]
    fn chunk_store_builder_reserved_attribute() {
        let mut builder = ChunkStoreBuilder::new(["x"], [4], [2]).unwrap();
        let mut attributes = serde_json::Map::new();
        attributes.insert(ARRAY_DIMENSIONS.to_string(), serde_json::json!(["x"]));
        assert!(matches!(
            builder.add_nan_array(
                "a",
                NanArrayOptions::new(DataType::UInt8).with_attributes(attributes)
            ),
            Err(ChunkStoreCreateError::InvalidMetadata(_))
        ));
    }

    #[test]
    fn lazy_array_options_from_dtype() {
        let options = LazyArrayOptions::from_dtype(">f4").unwrap();
        assert_eq!(options.data_type, DataType::Float32);
        assert_eq!(options.endianness, Endianness::Big);
        let options = NanArrayOptions::from_dtype("|u1").unwrap();
        assert_eq!(options.data_type, DataType::UInt8);
        assert!(LazyArrayOptions::from_dtype("<c16").is_err());
    }

    #[cfg(feature = "ndarray")]
    #[test]
    fn chunk_store_builder_add_ndarray() {
        let array = ndarray::array![[1u16, 2, 3], [4, 5, 6]];
        let mut builder = ChunkStoreBuilder::new(["x"], [4], [2]).unwrap();
        // Transposed arrays are written in C order of their logical layout
        builder
            .add_ndarray("a", &array.t(), serde_json::Map::new())
            .unwrap();
        let store = builder.build();
        let chunk = store.retrieve(&data_key("a", &[0, 0]).unwrap()).unwrap();
        let values: Vec<u16> = bytemuck::pod_collect_to_vec(&chunk[..]);
        assert_eq!(values, [1, 4, 2, 5, 3, 6]);
    }
}
