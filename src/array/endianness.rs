use derive_more::Display;

/// The byte order of each element in an array, either `big` or `little`.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum Endianness {
    /// Little endian.
    Little,

    /// Big endian.
    Big,
}

impl Endianness {
    /// Return true if the endianness matches the endianness of the CPU.
    #[must_use]
    pub fn is_native(self) -> bool {
        self == NATIVE_ENDIAN
    }
}

/// The endianness of the CPU.
pub const NATIVE_ENDIAN: Endianness = if cfg!(target_endian = "big") {
    Endianness::Big
} else {
    Endianness::Little
};

/// Reorder the bytes of each `element_size` element of native endian `bytes` to `endianness`.
///
/// Does nothing if `endianness` is [`None`] or native.
pub(crate) fn reorder_native_bytes(
    bytes: &mut [u8],
    element_size: usize,
    endianness: Option<Endianness>,
) {
    if element_size > 1 && endianness.is_some_and(|endianness| !endianness.is_native()) {
        bytes
            .chunks_exact_mut(element_size)
            .for_each(<[u8]>::reverse);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endianness_reorder() {
        let mut bytes = 0x0102u16.to_ne_bytes().to_vec();
        bytes.extend(0x0304u16.to_ne_bytes());
        let mut big = bytes.clone();
        reorder_native_bytes(&mut big, 2, Some(Endianness::Big));
        assert_eq!(big, [1, 2, 3, 4]);
        let mut little = bytes.clone();
        reorder_native_bytes(&mut little, 2, Some(Endianness::Little));
        assert_eq!(little, [2, 1, 4, 3]);
        let mut unchanged = bytes.clone();
        reorder_native_bytes(&mut unchanged, 2, None);
        assert_eq!(unchanged, bytes);
    }
}
