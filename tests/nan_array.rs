use std::error::Error;

use zarrs_chunk_store::{
    array::{DataType, Endianness},
    storage::{
        retrieve_array_metadata_v2, retrieve_chunk,
        store::{ChunkStore, ChunkStoreBuilder, NanArrayOptions},
        ListableStorageTraits, ReadableStorageTraits,
    },
};

fn nan_store(options: NanArrayOptions) -> Result<ChunkStore, Box<dyn Error>> {
    let mut builder = ChunkStoreBuilder::new(["y", "x"], [6, 4], [3, 2])?;
    builder.add_nan_array("a", options)?;
    Ok(builder.build())
}

fn fill_value_json(store: &ChunkStore) -> Result<serde_json::Value, Box<dyn Error>> {
    let metadata = store.retrieve(&"a/.zarray".try_into()?)?;
    let metadata: serde_json::Value = serde_json::from_slice(&metadata)?;
    Ok(metadata["fill_value"].clone())
}

#[test]
fn nan_array_single_chunk() -> Result<(), Box<dyn Error>> {
    let store = nan_store(NanArrayOptions::new(DataType::Int16))?;
    assert_eq!(store.list_prefix(&"a/".try_into()?)?.len(), 3);
    assert!(store.get(&"a/0.0".try_into()?)?.is_some());
    assert!(store.get(&"a/1.1".try_into()?)?.is_none());

    let metadata = retrieve_array_metadata_v2(&store, "a")?;
    assert_eq!(metadata.shape, [6, 4]);
    assert_eq!(metadata.chunks, [3, 2]);
    assert_eq!(
        serde_json::Value::Object(metadata.attributes),
        serde_json::json!({"_ARRAY_DIMENSIONS": ["y", "x"]})
    );
    Ok(())
}

#[test]
fn nan_array_integer_defaults_to_max() -> Result<(), Box<dyn Error>> {
    let store = nan_store(NanArrayOptions::new(DataType::Int16))?;
    assert_eq!(fill_value_json(&store)?, serde_json::json!(32767));
    let chunk = retrieve_chunk(&store, "a", &[0, 0])?;
    let values: Vec<i16> = bytemuck::pod_collect_to_vec(&chunk[..]);
    assert_eq!(values, [i16::MAX; 6]);

    let store = nan_store(NanArrayOptions::new(DataType::UInt64))?;
    assert_eq!(fill_value_json(&store)?, serde_json::json!(u64::MAX));
    Ok(())
}

#[test]
fn nan_array_integer_out_of_range_fill_value() -> Result<(), Box<dyn Error>> {
    let store = nan_store(NanArrayOptions::new(DataType::UInt8).with_fill_value(-1i64))?;
    assert_eq!(fill_value_json(&store)?, serde_json::json!(255));

    let store = nan_store(NanArrayOptions::new(DataType::UInt8).with_fill_value(0u8))?;
    assert_eq!(fill_value_json(&store)?, serde_json::json!(0));
    assert!(retrieve_chunk(&store, "a", &[0, 0])?.iter().all(|&byte| byte == 0));
    Ok(())
}

#[test]
fn nan_array_zero_fill_value_is_kept() -> Result<(), Box<dyn Error>> {
    let store = nan_store(NanArrayOptions::new(DataType::Int16).with_fill_value(0i16))?;
    assert_eq!(fill_value_json(&store)?, serde_json::json!(0));
    assert!(retrieve_chunk(&store, "a", &[0, 0])?.iter().all(|&byte| byte == 0));

    let store = nan_store(NanArrayOptions::new(DataType::Float64).with_fill_value(0.0f64))?;
    assert_eq!(fill_value_json(&store)?, serde_json::json!(0.0));
    let chunk = retrieve_chunk(&store, "a", &[0, 0])?;
    let values: Vec<f64> = bytemuck::pod_collect_to_vec(&chunk[..]);
    assert_eq!(values, [0.0; 6]);

    let store = nan_store(NanArrayOptions::new(DataType::Bool).with_fill_value(false))?;
    assert_eq!(fill_value_json(&store)?, serde_json::json!(false));
    assert_eq!(&retrieve_chunk(&store, "a", &[0, 0])?[..], [0u8; 6]);
    Ok(())
}

#[test]
fn nan_array_float_defaults_to_nan() -> Result<(), Box<dyn Error>> {
    let store = nan_store(NanArrayOptions::new(DataType::Float32))?;
    assert_eq!(fill_value_json(&store)?, serde_json::json!("NaN"));
    let chunk = retrieve_chunk(&store, "a", &[0, 0])?;
    let values: Vec<f32> = bytemuck::pod_collect_to_vec(&chunk[..]);
    assert_eq!(values.len(), 6);
    assert!(values.iter().all(|value| value.is_nan()));

    let store = nan_store(NanArrayOptions::new(DataType::Float64).with_fill_value(-9999.0f64))?;
    assert_eq!(fill_value_json(&store)?, serde_json::json!(-9999.0));
    Ok(())
}

#[test]
fn nan_array_bool_defaults_to_true() -> Result<(), Box<dyn Error>> {
    let store = nan_store(NanArrayOptions::new(DataType::Bool))?;
    assert_eq!(fill_value_json(&store)?, serde_json::json!(true));
    assert!(retrieve_chunk(&store, "a", &[0, 0])?.iter().all(|&byte| byte == 1));
    Ok(())
}

#[test]
fn nan_array_big_endian() -> Result<(), Box<dyn Error>> {
    let store = nan_store(NanArrayOptions::new(DataType::UInt16).with_endianness(Endianness::Big))?;
    let metadata = retrieve_array_metadata_v2(&store, "a")?;
    assert_eq!(metadata.dtype.to_string(), ">u2");
    let chunk = retrieve_chunk(&store, "a", &[0, 0])?;
    assert_eq!(chunk.len(), 12);
    assert_eq!(chunk[..2], 65535u16.to_be_bytes());

    let store = nan_store(
        NanArrayOptions::new(DataType::Int32)
            .with_endianness(Endianness::Big)
            .with_fill_value(1i32),
    )?;
    let chunk = retrieve_chunk(&store, "a", &[0, 0])?;
    assert_eq!(chunk[..4], 1i32.to_be_bytes());
    Ok(())
}
