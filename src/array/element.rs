use super::DataType;

/// A fixed size element type that maps to a [`DataType`].
///
/// Implemented for the primitive integer and floating point types and [`half::f16`].
pub trait Element: bytemuck::Pod + Send + Sync {
    /// The data type of the element.
    const DATA_TYPE: DataType;
}

macro_rules! impl_element {
    ( $($t:ty => $data_type:ident),* $(,)? ) => {
        $(
            impl Element for $t {
                const DATA_TYPE: DataType = DataType::$data_type;
            }
        )*
    };
}

impl_element!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    half::f16 => Float16,
    f32 => Float32,
    f64 => Float64,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_data_type_size() {
        fn size<T: Element>() -> (usize, usize) {
            (std::mem::size_of::<T>(), T::DATA_TYPE.size())
        }
        for (a, b) in [
            size::<i8>(),
            size::<u16>(),
            size::<i32>(),
            size::<u64>(),
            size::<half::f16>(),
            size::<f32>(),
            size::<f64>(),
        ] {
            assert_eq!(a, b);
        }
    }
}
