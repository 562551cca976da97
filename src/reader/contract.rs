//! The `FormatReader` trait every format backend and decorator implements.
//!
//! A reader starts out unopened. [`FormatReader::set_id`] opens a file and
//! fills in the per-series [`CoreMetadata`]; every dimensional query then
//! answers for the currently selected series. Before `set_id` the queries
//! return zeroes and defaults, and pixel access fails with
//! [`ArgumentError::NotOpen`](crate::error::ArgumentError::NotOpen).
//!
//! Readers are not meant to be shared between threads without external
//! locking: `set_series` changes state that later pixel reads depend on.

use std::sync::Arc;

use bytes::Bytes;
use image::DynamicImage;
use serde_json::Value;

use crate::error::Result;
use crate::io::{read_prefix, RandomAccess, DEFAULT_SNIFF_BYTES};
use crate::metadata::{MetadataStoreRef, MetadataTable, MetadataValue};
use crate::model::{self, CoreMetadata, DimensionOrder, PixelType, PlaneLayout, Region, ZctCoords};
use crate::status::StatusListener;

use super::pixels;

/// Lookup table indexed as `[channel][value]`.
pub type LookupTable<T> = Vec<Vec<T>>;

/// Whether the files of a multi-file dataset have to be read together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileGrouping {
    /// Every file of the group must be opened as one dataset
    MustGroup,
    /// Files may be opened together or one at a time
    CanGroup,
    /// Each file stands alone
    CannotGroup,
}

/// Capability contract for reading multi-dimensional image files.
///
/// Methods with default bodies are derived from the required ones; backends
/// may override them when they can do better. Decorators get their defaults
/// from [`ReaderDecorator`](crate::wrapper::ReaderDecorator) instead, which
/// forwards every method to the wrapped reader.
pub trait FormatReader: Send {
    // -------------------------------------------------------------------------
    // Format identification
    // -------------------------------------------------------------------------

    /// Human-readable format name.
    fn format_name(&self) -> &str;

    /// File suffixes (without the dot) this reader recognises.
    fn suffixes(&self) -> &[&'static str];

    /// Whether `name` looks like a file of this format.
    ///
    /// With `open == false` only the name is inspected; otherwise the reader
    /// may read the start of the file. Never fails and never changes the
    /// reader's state.
    fn is_this_type(&self, name: &str, open: bool) -> bool;

    /// [`is_this_type`](FormatReader::is_this_type) with file access allowed.
    fn is_this_type_name(&self, name: &str) -> bool {
        self.is_this_type(name, true)
    }

    /// Whether `block`, the start of a file, belongs to this format.
    fn is_this_type_bytes(&self, block: &[u8]) -> bool;

    /// Sniff a stream. The stream position is restored afterwards.
    ///
    /// Malformed content yields `Ok(false)`; only failures of the stream
    /// itself are reported as errors.
    fn is_this_type_stream(&self, stream: &mut dyn RandomAccess) -> Result<bool> {
        let block = read_prefix(stream, DEFAULT_SNIFF_BYTES)?;
        Ok(self.is_this_type_bytes(&block))
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Open and parse `id`. Any previously opened file is closed first.
    fn set_id(&mut self, id: &str) -> Result<()>;

    /// Release the open file.
    ///
    /// With `file_only == true` only file handles are released and the parsed
    /// metadata stays available; otherwise the reader returns to its
    /// unopened state.
    fn close_with(&mut self, file_only: bool) -> Result<()>;

    /// Fully reset the reader; same as `close_with(false)`.
    fn close(&mut self) -> Result<()> {
        self.close_with(false)
    }

    // -------------------------------------------------------------------------
    // Dimensions of the current series
    // -------------------------------------------------------------------------

    fn size_x(&self) -> usize;
    fn size_y(&self) -> usize;
    fn size_z(&self) -> usize;

    /// Channel count including RGB sub-channels.
    fn size_c(&self) -> usize;
    fn size_t(&self) -> usize;
    fn pixel_type(&self) -> PixelType;

    /// Number of planes in the current series.
    fn image_count(&self) -> usize;

    /// Stored channel planes per (Z, T) position: `image_count / (Z * T)`.
    fn effective_size_c(&self) -> usize {
        model::effective_size_c(self.image_count(), self.size_z(), self.size_t())
    }

    /// Sub-channels per stored plane: `size_c / effective_size_c`.
    fn rgb_channel_count(&self) -> usize {
        model::rgb_channel_count(self.size_c(), self.effective_size_c())
    }

    fn thumb_size_x(&self) -> usize;
    fn thumb_size_y(&self) -> usize;
    fn dimension_order(&self) -> DimensionOrder;

    /// False when the reader guessed the dimension order.
    fn is_order_certain(&self) -> bool;
    fn is_rgb(&self) -> bool;
    fn is_indexed(&self) -> bool;

    /// True when the lookup table is only a display aid.
    fn is_false_color(&self) -> bool;
    fn is_little_endian(&self) -> bool;

    /// Whether RGB sub-channels are interleaved per pixel.
    fn is_interleaved(&self) -> bool;

    /// Interleaving of one sub-channel; most formats answer the same for all.
    fn is_interleaved_at(&self, _sub_c: usize) -> bool {
        self.is_interleaved()
    }

    fn channel_dim_lengths(&self) -> Vec<usize>;
    fn channel_dim_types(&self) -> Vec<String>;

    // -------------------------------------------------------------------------
    // Lookup tables
    // -------------------------------------------------------------------------

    /// 8-bit lookup table of an indexed series, if it has one.
    fn lut_8bit(&mut self) -> Result<Option<LookupTable<u8>>>;

    /// 16-bit lookup table of an indexed series, if it has one.
    fn lut_16bit(&mut self) -> Result<Option<LookupTable<u16>>>;

    // -------------------------------------------------------------------------
    // Plane arithmetic
    // -------------------------------------------------------------------------

    /// Linear plane index of `(z, c, t)`, where `c` counts effective channels.
    fn plane_index(&self, z: usize, c: usize, t: usize) -> Result<usize> {
        plane_layout(self)?.index(ZctCoords::new(z, c, t))
    }

    /// Inverse of [`plane_index`](FormatReader::plane_index).
    fn zct_coords(&self, index: usize) -> Result<ZctCoords> {
        plane_layout(self)?.coords(index)
    }

    // -------------------------------------------------------------------------
    // Pixel access
    // -------------------------------------------------------------------------

    /// Decode `region` of plane `no` into `buf`.
    ///
    /// `buf` must hold at least `region.byte_len(rgb_channel_count,
    /// bytes_per_pixel)` bytes; samples are laid out interleaved or planar
    /// as reported by [`is_interleaved`](FormatReader::is_interleaved).
    fn open_bytes_region_into(&mut self, no: usize, buf: &mut [u8], region: Region)
        -> Result<()>;

    /// Decode plane `no` into `buf`.
    fn open_bytes_into(&mut self, no: usize, buf: &mut [u8]) -> Result<()> {
        pixels::read_into(self, no, buf)
    }

    /// Decode `region` of plane `no` into a new buffer.
    fn open_bytes_region(&mut self, no: usize, region: Region) -> Result<Bytes> {
        pixels::read_region(self, no, region)
    }

    /// Decode plane `no` into a new buffer.
    fn open_bytes(&mut self, no: usize) -> Result<Bytes> {
        pixels::read_plane(self, no)
    }

    /// Decode `region` of plane `no` as an image.
    fn open_image_region(&mut self, no: usize, region: Region) -> Result<DynamicImage> {
        pixels::read_image_region(self, no, region)
    }

    /// Decode plane `no` as an image.
    fn open_image(&mut self, no: usize) -> Result<DynamicImage> {
        pixels::read_image(self, no)
    }

    /// Plane `no` scaled to the thumbnail size.
    fn open_thumb_image(&mut self, no: usize) -> Result<DynamicImage> {
        pixels::read_thumb_image(self, no)
    }

    /// Samples of [`open_thumb_image`](FormatReader::open_thumb_image),
    /// always interleaved and in native byte order.
    fn open_thumb_bytes(&mut self, no: usize) -> Result<Bytes> {
        pixels::read_thumb_bytes(self, no)
    }

    // -------------------------------------------------------------------------
    // Series and file groups
    // -------------------------------------------------------------------------

    fn series_count(&self) -> usize;

    /// Select the series later queries refer to.
    ///
    /// Fails with an argument error, leaving the selection unchanged, when
    /// `series` is not below [`series_count`](FormatReader::series_count).
    fn set_series(&mut self, series: usize) -> Result<()>;
    fn series(&self) -> usize;

    /// Whether to open every file of a multi-file dataset together.
    fn set_group_files(&mut self, group: bool);
    fn is_group_files(&self) -> bool;
    fn file_group_option(&mut self, id: &str) -> Result<FileGrouping>;

    /// Every file that makes up the open dataset.
    fn used_files(&self) -> Vec<String>;
    fn current_file(&self) -> Option<&str>;

    // -------------------------------------------------------------------------
    // Metadata
    // -------------------------------------------------------------------------

    fn is_metadata_complete(&self) -> bool;

    /// Ask for floating-point data scaled to `[0, 1]`.
    fn set_normalized(&mut self, normalize: bool);
    fn is_normalized(&self) -> bool;

    /// Whether `set_id` collects metadata and fills the metadata store.
    fn set_metadata_collected(&mut self, collect: bool);
    fn is_metadata_collected(&self) -> bool;

    /// Whether `set_id` copies original metadata into the metadata store.
    fn set_original_metadata_populated(&mut self, populate: bool);
    fn is_original_metadata_populated(&self) -> bool;

    /// Whether `set_id` cleans up original metadata values. Affects files
    /// opened afterwards only.
    fn set_metadata_filtered(&mut self, filter: bool);
    fn is_metadata_filtered(&self) -> bool;

    fn metadata_value(&self, field: &str) -> Option<&MetadataValue> {
        self.metadata().get(field)
    }

    /// Original metadata of the open file.
    fn metadata(&self) -> &MetadataTable;

    /// Core metadata of every series.
    fn core_metadata(&self) -> &[CoreMetadata];

    /// Use a caller-owned store for the next `set_id`.
    fn set_metadata_store(&mut self, store: MetadataStoreRef);
    fn metadata_store(&self) -> MetadataStoreRef;

    fn metadata_store_root(&self) -> Option<Value> {
        self.metadata_store().root()
    }

    // -------------------------------------------------------------------------
    // Introspection and status
    // -------------------------------------------------------------------------

    /// Readers this one delegates to; empty for format backends.
    fn underlying_readers(&self) -> Vec<&dyn FormatReader> {
        Vec::new()
    }

    fn add_status_listener(&mut self, listener: Arc<dyn StatusListener>);
    fn remove_status_listener(&mut self, listener: &Arc<dyn StatusListener>);
    fn status_listeners(&self) -> Vec<Arc<dyn StatusListener>>;
}

/// Plane geometry of `reader`'s current series, as seen through `reader`.
pub fn plane_layout<R: FormatReader + ?Sized>(reader: &R) -> Result<PlaneLayout> {
    PlaneLayout::new(
        reader.dimension_order(),
        reader.size_z(),
        reader.effective_size_c(),
        reader.size_t(),
        reader.image_count(),
    )
}
