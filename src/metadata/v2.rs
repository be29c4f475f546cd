/// Zarr V2 group metadata.
pub mod group;

/// Zarr V2 array metadata.
pub mod array;

pub use array::{
    data_type_metadata_v2_to_endianness, ArrayMetadataV2, ArrayMetadataV2Order,
    DataTypeMetadataV2, FillValueMetadataV2,
};
pub use group::GroupMetadataV2;

mod metadata;
pub use metadata::MetadataV2;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::Endianness;

    #[test]
    fn array_v2_parse() -> Result<(), Box<dyn std::error::Error>> {
        let json = r#"
            {
                "chunks": [
                    1000,
                    1000
                ],
                "compressor": {
                    "id": "blosc",
                    "cname": "lz4",
                    "clevel": 5,
                    "shuffle": 1
                },
                "dtype": "<f8",
                "fill_value": "NaN",
                "filters": [
                    {"id": "delta", "dtype": "<f8", "astype": "<f4"}
                ],
                "order": "F",
                "shape": [
                    10000,
                    10000
                ],
                "zarr_format": 2
            }"#;
        let array_metadata_v2: ArrayMetadataV2 = serde_json::from_str(json)?;
        assert_eq!(array_metadata_v2.chunks, vec![1000, 1000]);
        assert_eq!(array_metadata_v2.shape, vec![10000, 10000]);
        assert_eq!(array_metadata_v2.fill_value, FillValueMetadataV2::NaN);
        assert_eq!(array_metadata_v2.order, ArrayMetadataV2Order::F);
        assert_eq!(
            data_type_metadata_v2_to_endianness(&array_metadata_v2.dtype)?,
            Some(Endianness::Little),
        );
        assert_eq!(array_metadata_v2.compressor.as_ref().unwrap().id(), "blosc");
        assert_eq!(
            array_metadata_v2.compressor.unwrap().configuration()["cname"],
            "lz4"
        );
        Ok(())
    }

    #[test]
    fn array_v2_serialize() -> Result<(), Box<dyn std::error::Error>> {
        let metadata = ArrayMetadataV2::new(
            vec![4, 8],
            vec![2, 4],
            DataTypeMetadataV2::from("|u1"),
            255u8.into(),
        );
        assert_eq!(
            metadata.to_string(),
            r#"{"zarr_format":2,"shape":[4,8],"chunks":[2,4],"dtype":"|u1","compressor":null,"fill_value":255,"order":"C","filters":null}"#
        );
        let metadata = ArrayMetadataV2::new(
            vec![4],
            vec![2],
            DataTypeMetadataV2::from("<f4"),
            f32::NEG_INFINITY.into(),
        );
        assert!(metadata.to_string().contains(r#""fill_value":"-Infinity""#));

        // zarr_format must be 2
        assert!(serde_json::from_str::<ArrayMetadataV2>(
            r#"{"zarr_format":3,"shape":[4],"chunks":[2],"dtype":"<f4","compressor":null,"fill_value":null,"order":"C","filters":null}"#
        )
        .is_err());
        Ok(())
    }

    #[test]
    fn data_type_v2_simple_only() -> Result<(), Box<dyn std::error::Error>> {
        let dtype: DataTypeMetadataV2 = serde_json::from_str(r#""<i2""#)?;
        assert_eq!(dtype, DataTypeMetadataV2::from("<i2"));
        assert_eq!(dtype.to_string(), "<i2");
        assert!(serde_json::from_str::<DataTypeMetadataV2>(r#"[["a", "<f4"], ["b", "<i2", [2]]]"#).is_err());
        assert!(serde_json::from_str::<ArrayMetadataV2>(
            r#"{"zarr_format":2,"shape":[4],"chunks":[2],"dtype":[["a","<f4"]],"compressor":null,"fill_value":null,"order":"C","filters":null}"#
        )
        .is_err());
        Ok(())
    }

    #[test]
    fn fill_value_v2_serde() -> Result<(), Box<dyn std::error::Error>> {
        for (json, fill_value) in [
            ("null", FillValueMetadataV2::Null),
            ("\"NaN\"", FillValueMetadataV2::NaN),
            ("\"Infinity\"", FillValueMetadataV2::Infinity),
            ("\"-Infinity\"", FillValueMetadataV2::NegInfinity),
            ("true", FillValueMetadataV2::Bool(true)),
            ("-1", FillValueMetadataV2::from(-1i64)),
            ("0.5", FillValueMetadataV2::from(0.5f64)),
            ("\"AAAAAA==\"", FillValueMetadataV2::String("AAAAAA==".into())),
        ] {
            assert_eq!(serde_json::from_str::<FillValueMetadataV2>(json)?, fill_value);
            assert_eq!(serde_json::to_string(&fill_value)?, json);
        }
        assert_eq!(FillValueMetadataV2::from(None::<u8>), FillValueMetadataV2::Null);
        Ok(())
    }

    #[test]
    fn group_v2() -> Result<(), Box<dyn std::error::Error>> {
        let group = GroupMetadataV2::default();
        assert_eq!(group.to_string(), r#"{"zarr_format":2}"#);
        assert!(serde_json::from_str::<GroupMetadataV2>(r#"{"zarr_format":2}"#).is_ok());
        assert!(serde_json::from_str::<GroupMetadataV2>(r#"{"zarr_format":3}"#).is_err());
        Ok(())
    }
}
