use serde::{Deserialize, Serialize};

/// Codec metadata with an id and a flattened configuration.
///
/// For example:
/// ```json
/// {
///     "id": "zlib",
///     "level": 1
/// }
/// ```
///
/// A chunk store records compressor and filter metadata as given.
/// Chunks of lazy arrays are encoded by their resolver.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
pub struct MetadataV2 {
    id: String,
    #[serde(flatten)]
    configuration: serde_json::Map<String, serde_json::Value>,
}

impl MetadataV2 {
    /// Create codec metadata from an `id` and a `configuration`.
    ///
    /// An "id" key in `configuration` is ignored.
    #[must_use]
    pub fn new(id: impl Into<String>, mut configuration: serde_json::Map<String, serde_json::Value>) -> Self {
        configuration.remove("id");
        Self {
            id: id.into(),
            configuration,
        }
    }

    /// Return the "id" key.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Return the configuration, which includes all fields excluding the "id".
    #[must_use]
    pub fn configuration(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.configuration
    }
}
