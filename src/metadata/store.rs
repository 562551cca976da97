//! Metadata store sinks.
//!
//! A reader pushes structural and original metadata into a store while it
//! parses a file. The store is created and owned by the caller and handed to
//! the reader as an `Arc`, so it outlives any particular reader or file.

use std::sync::{Arc, Mutex};

use serde_json::{json, Map, Value};

use crate::model::CoreMetadata;

use super::table::MetadataValue;

/// Sink for metadata produced by [`set_id`](crate::FormatReader::set_id).
pub trait MetadataStore: Send + Sync {
    /// Start a fresh document, discarding whatever a previous file produced.
    fn create_root(&self);

    fn set_image_name(&self, series: usize, name: &str);

    fn set_pixels(&self, series: usize, core: &CoreMetadata);

    fn set_original_metadata(&self, key: &str, value: &MetadataValue);

    /// The document built so far, if the store keeps one.
    fn root(&self) -> Option<Value>;
}

/// Shared handle to a caller-owned store.
pub type MetadataStoreRef = Arc<dyn MetadataStore>;

/// Store that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyMetadata;

impl MetadataStore for DummyMetadata {
    fn create_root(&self) {}

    fn set_image_name(&self, _series: usize, _name: &str) {}

    fn set_pixels(&self, _series: usize, _core: &CoreMetadata) {}

    fn set_original_metadata(&self, _key: &str, _value: &MetadataValue) {}

    fn root(&self) -> Option<Value> {
        None
    }
}

/// Store that keeps a JSON document in memory.
///
/// Layout: `{"images": [{"name": .., "pixels": {..}}], "originalMetadata": {..}}`.
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    root: Mutex<Value>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self {
            root: Mutex::new(empty_root()),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Number of image entries recorded so far.
    pub fn image_count(&self) -> usize {
        self.with_root(|root| {
            root.get("images")
                .and_then(Value::as_array)
                .map_or(0, Vec::len)
        })
    }

    fn with_root<T>(&self, f: impl FnOnce(&mut Value) -> T) -> T {
        let mut guard = self.root.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if !guard.is_object() {
            *guard = empty_root();
        }
        f(&mut guard)
    }

    fn with_image(&self, series: usize, f: impl FnOnce(&mut Map<String, Value>)) {
        self.with_root(|root| {
            if !root["images"].is_array() {
                root["images"] = json!([]);
            }
            if let Some(images) = root["images"].as_array_mut() {
                while images.len() <= series {
                    images.push(json!({}));
                }
                if let Some(image) = images[series].as_object_mut() {
                    f(image);
                }
            }
        })
    }
}

impl MetadataStore for MemoryMetadataStore {
    fn create_root(&self) {
        self.with_root(|root| *root = empty_root());
    }

    fn set_image_name(&self, series: usize, name: &str) {
        self.with_image(series, |image| {
            image.insert("name".to_string(), Value::String(name.to_string()));
        });
    }

    fn set_pixels(&self, series: usize, core: &CoreMetadata) {
        let pixels = serde_json::to_value(core).unwrap_or(Value::Null);
        self.with_image(series, |image| {
            image.insert("pixels".to_string(), pixels);
        });
    }

    fn set_original_metadata(&self, key: &str, value: &MetadataValue) {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.with_root(|root| {
            if let Some(original) = root["originalMetadata"].as_object_mut() {
                original.insert(key.to_string(), value);
            }
        });
    }

    fn root(&self) -> Option<Value> {
        Some(self.with_root(|root| root.clone()))
    }
}

fn empty_root() -> Value {
    json!({ "images": [], "originalMetadata": {} })
}
