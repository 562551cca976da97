//! Reader options.
//!
//! Options can be built in code or loaded from JSON, then applied to any
//! reader before `set_id`:
//!
//! ```json
//! { "group_files": false, "metadata_filtered": true, "plane_cache_capacity": 32 }
//! ```
//!
//! Missing fields take their defaults.

use serde::{Deserialize, Serialize};

use crate::format::ImageReader;
use crate::reader::FormatReader;
use crate::wrapper::{PlaneCache, DEFAULT_PLANE_CACHE_CAPACITY};

/// Largest accepted plane cache.
const MAX_PLANE_CACHE_CAPACITY: usize = 4096;

/// Reader behaviour switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderOptions {
    /// Open every file of a multi-file dataset together
    pub group_files: bool,

    /// Scale floating-point data to `[0, 1]`
    pub normalized: bool,

    /// Collect metadata and fill the metadata store during `set_id`
    pub metadata_collected: bool,

    /// Copy original metadata into the metadata store
    pub original_metadata_populated: bool,

    /// Drop unprintable or oversized original metadata values
    pub metadata_filtered: bool,

    /// Planes kept by the reader built with [`ReaderOptions::build_reader`]
    pub plane_cache_capacity: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            group_files: true,
            normalized: false,
            metadata_collected: true,
            original_metadata_populated: false,
            metadata_filtered: false,
            plane_cache_capacity: DEFAULT_PLANE_CACHE_CAPACITY,
        }
    }
}

impl ReaderOptions {
    /// Validate the options.
    ///
    /// Returns an error message if the options are inconsistent.
    pub fn validate(&self) -> Result<(), String> {
        if self.plane_cache_capacity == 0 {
            return Err("plane_cache_capacity must be greater than 0".to_string());
        }
        if self.plane_cache_capacity > MAX_PLANE_CACHE_CAPACITY {
            return Err(format!(
                "plane_cache_capacity must be at most {}",
                MAX_PLANE_CACHE_CAPACITY
            ));
        }
        if self.original_metadata_populated && !self.metadata_collected {
            return Err(
                "original_metadata_populated requires metadata_collected".to_string(),
            );
        }
        Ok(())
    }

    /// Parse and validate options from JSON.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let options: Self =
            serde_json::from_str(json).map_err(|e| format!("Invalid reader options: {e}"))?;
        options.validate()?;
        Ok(options)
    }

    /// Set every option flag on `reader`.
    pub fn apply(&self, reader: &mut dyn FormatReader) {
        reader.set_group_files(self.group_files);
        reader.set_normalized(self.normalized);
        reader.set_metadata_collected(self.metadata_collected);
        reader.set_original_metadata_populated(self.original_metadata_populated);
        reader.set_metadata_filtered(self.metadata_filtered);
    }

    /// A cached [`ImageReader`] configured with these options.
    pub fn build_reader(&self) -> Result<PlaneCache, String> {
        self.validate()?;
        let mut reader = PlaneCache::with_capacity(ImageReader::new(), self.plane_cache_capacity);
        self.apply(&mut reader);
        Ok(reader)
    }
}
