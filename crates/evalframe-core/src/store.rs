//! Store — the parameter and blob collaborators, plus in-memory fakes.
//!
//! Handlers only ever see these traits. The filesystem adapters live in
//! `evalframe-stores`; [`MemoryParameterStore`] and [`MemoryBlobStore`] are
//! for tests and embedding.

use std::collections::HashMap;

use serde::de::DeserializeOwned;

use crate::error::StoreError;

/// Leaf name of the per-application ground-truth location parameter.
pub const GROUND_TRUTH_PARAMETER: &str = "groundtruth";

/// Leaf name of the per-application threshold parameter.
pub const THRESHOLD_PARAMETER: &str = "threshold";

/// A hierarchical, string-valued parameter store.
pub trait ParameterStore {
    /// Fetch a parameter's decrypted value.
    fn get_parameter(&self, name: &str) -> Result<String, StoreError>;
}

/// A bucket/key object store.
pub trait BlobStore {
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError>;
}

/// `{prefix}/{application}/{leaf}`, tolerating a trailing slash on `prefix`.
pub fn parameter_name(prefix: &str, application: &str, leaf: &str) -> String {
    format!("{}/{application}/{leaf}", prefix.trim_end_matches('/'))
}

/// Fetch a parameter and decode its value as JSON.
pub fn get_json_parameter<T: DeserializeOwned>(
    store: &dyn ParameterStore,
    name: &str,
) -> Result<T, StoreError> {
    let raw = store.get_parameter(name)?;
    serde_json::from_str(&raw).map_err(|e| StoreError::decode(format!("parameter {name}"), e))
}

// ---------------------------------------------------------------------------
// In-memory fakes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct MemoryParameterStore {
    values: HashMap<String, String>,
}

impl MemoryParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }
}

impl ParameterStore for MemoryParameterStore {
    fn get_parameter(&self, name: &str) -> Result<String, StoreError> {
        self.values
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::ParameterNotFound(name.to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    objects: HashMap<(String, String), Vec<u8>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        bucket: impl Into<String>,
        key: impl Into<String>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        self.insert(bucket, key, body);
        self
    }

    pub fn insert(
        &mut self,
        bucket: impl Into<String>,
        key: impl Into<String>,
        body: impl Into<Vec<u8>>,
    ) {
        self.objects.insert((bucket.into(), key.into()), body.into());
    }
}

impl BlobStore for MemoryBlobStore {
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        self.objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NoSuchKey {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }
}
