//! Original key/value metadata and the metadata store a reader populates.

mod store;
mod table;

pub use store::{DummyMetadata, MemoryMetadataStore, MetadataStore, MetadataStoreRef};
pub use table::{MetadataFilter, MetadataTable, MetadataValue, MAX_FILTERED_VALUE_LEN};
