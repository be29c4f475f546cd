use std::{
    collections::HashMap,
    error::Error,
    sync::{Arc, Mutex},
};

use rayon::prelude::*;
use zarrs_chunk_store::{
    array::{chunk_indices, DataType},
    storage::{
        retrieve_chunk, Bytes, ChunkResolverError,
        store::{ChunkStore, ChunkStoreBuilder, LazyArrayOptions},
    },
};

#[test]
fn concurrent_reads_resolve_every_chunk_once() -> Result<(), Box<dyn Error>> {
    let visits: Arc<Mutex<HashMap<Vec<u64>, usize>>> = Arc::default();
    let resolver_visits = visits.clone();

    let mut builder = ChunkStoreBuilder::new(["time", "y", "x"], [4, 8, 16], [2, 4, 8])?;
    builder.add_lazy_array(
        "var",
        LazyArrayOptions::new(DataType::UInt16).with_resolver(
            move |store: &ChunkStore, _array_name: &str, chunk_index: &[u64]| -> Result<Bytes, ChunkResolverError> {
                *resolver_visits
                    .lock()
                    .map_err(|_| "visits are poisoned")?
                    .entry(chunk_index.to_vec())
                    .or_default() += 1;
                let num_elements = store.chunks().iter().product::<u64>() as usize;
                let value = (chunk_index[0] * 100 + chunk_index[1] * 10 + chunk_index[2]) as u16;
                Ok(Bytes::copy_from_slice(bytemuck::cast_slice(&vec![value; num_elements])))
            },
        ),
    )?;
    let store = builder.build();

    let grid_shape = store.chunk_grid_shape();
    assert_eq!(grid_shape, [2, 2, 2]);
    let chunks: Vec<_> = chunk_indices(&grid_shape).collect();
    chunks
        .par_iter()
        .map(|chunk_index| -> Result<(), Box<dyn Error + Send + Sync>> {
            let chunk = retrieve_chunk(&store, "var", chunk_index)?;
            let values: Vec<u16> = bytemuck::pod_collect_to_vec(&chunk[..]);
            assert_eq!(values.len(), 64);
            let expected = (chunk_index[0] * 100 + chunk_index[1] * 10 + chunk_index[2]) as u16;
            assert!(values.iter().all(|&value| value == expected));
            Ok(())
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| err.to_string())?;

    let visits = visits.lock().unwrap();
    assert_eq!(visits.len(), 8);
    assert!(visits.values().all(|&count| count == 1));
    Ok(())
}
