//! Byte ranges.
//!
//! A [`ByteRange`] represents a byte range relative to the start or end of a store value.
//! A byte range has an offset and optional length, which if omitted means to read all remaining bytes.
//!
//! Partial reads of a [`ChunkStore`](crate::storage::store::ChunkStore) value resolve the value once and then slice it with [`extract_byte_ranges`].

use std::ops::Range;

use bytes::Bytes;
use thiserror::Error;

/// A byte offset.
pub type ByteOffset = u64;

/// A byte length.
pub type ByteLength = u64;

/// A byte range.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ByteRange {
    /// A byte range from the start.
    ///
    /// If the byte length is [`None`], reads to the end of the value.
    FromStart(ByteOffset, Option<ByteLength>),
    /// A byte range from the end.
    ///
    /// If the byte length is [`None`], reads to the start of the value.
    FromEnd(ByteOffset, Option<ByteLength>),
}

impl ByteRange {
    /// Return the start of a byte range. `size` is the size of the entire bytes.
    #[must_use]
    pub fn start(&self, size: u64) -> u64 {
        match self {
            Self::FromStart(offset, _) => *offset,
            Self::FromEnd(offset, length) => {
                length.as_ref().map_or(0, |length| size - *offset - *length)
            }
        }
    }

    /// Return the exclusive end of a byte range. `size` is the size of the entire bytes.
    #[must_use]
    pub fn end(&self, size: u64) -> u64 {
        match self {
            Self::FromStart(offset, length) => {
                length.as_ref().map_or(size, |length| offset + length)
            }
            Self::FromEnd(offset, _) => size - offset,
        }
    }

    /// Return the length of a byte range. `size` is the size of the entire bytes.
    #[must_use]
    pub fn length(&self, size: u64) -> u64 {
        match self {
            Self::FromStart(offset, None) | Self::FromEnd(offset, None) => size - offset,
            Self::FromStart(_, Some(length)) | Self::FromEnd(_, Some(length)) => *length,
        }
    }

    /// Convert the byte range to a [`Range<u64>`].
    #[must_use]
    pub fn to_range(&self, size: u64) -> Range<u64> {
        self.start(size)..self.end(size)
    }

    /// Returns true if the byte range lies within bytes of length `size`.
    #[must_use]
    pub fn is_valid(&self, size: u64) -> bool {
        let (Self::FromStart(offset, length) | Self::FromEnd(offset, length)) = self;
        offset
            .checked_add(length.unwrap_or(0))
            .is_some_and(|end| end <= size)
    }
}

impl std::fmt::Display for ByteRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Self::FromStart(offset, length) => write!(
                f,
                "{}..{}",
                if offset == &0 {
                    String::new()
                } else {
                    offset.to_string()
                },
                length.map_or(String::new(), |length| (offset + length).to_string())
            ),
            Self::FromEnd(offset, length) => write!(
                f,
                "{}..{}",
                length.map_or(String::new(), |length| format!("-{}", offset + length)),
                if offset == &0 {
                    String::new()
                } else {
                    format!("-{offset}")
                }
            ),
        }
    }
}

/// An invalid byte range error.
#[derive(Copy, Clone, Debug, Error)]
#[error("invalid byte range {0} for bytes of length {1}")]
pub struct InvalidByteRangeError(ByteRange, u64);

impl InvalidByteRangeError {
    /// Create a new [`InvalidByteRangeError`].
    #[must_use]
    pub fn new(byte_range: ByteRange, bytes_len: u64) -> Self {
        Self(byte_range, bytes_len)
    }
}

/// Extract byte ranges from bytes.
///
/// The output shares the allocation of `bytes`.
///
/// # Errors
/// Returns [`InvalidByteRangeError`] if any bytes are requested beyond the end of `bytes`.
pub fn extract_byte_ranges(
    bytes: &Bytes,
    byte_ranges: &[ByteRange],
) -> Result<Vec<Bytes>, InvalidByteRangeError> {
    let size = bytes.len() as u64;
    byte_ranges
        .iter()
        .map(|byte_range| {
            if !byte_range.is_valid(size) {
                return Err(InvalidByteRangeError(*byte_range, size));
            }
            let Range { start, end } = byte_range.to_range(size);
            let start = usize::try_from(start).map_err(|_| InvalidByteRangeError(*byte_range, size))?;
            let end = usize::try_from(end).map_err(|_| InvalidByteRangeError(*byte_range, size))?;
            Ok(bytes.slice(start..end))
        })
        .collect()
}
