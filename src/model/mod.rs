//! Data model shared by every reader: pixel types, dimension orders, plane
//! index arithmetic, per-series core metadata and plane regions.

mod core_metadata;
mod order;
mod pixel;
mod region;

pub use core_metadata::{
    default_thumb_size, effective_size_c, rgb_channel_count, CoreMetadata, THUMBNAIL_DIMENSION,
};
pub use order::{Axis, DimensionOrder, PlaneLayout, ZctCoords};
pub use pixel::PixelType;
pub use region::{check_buffer, crop_plane, Region};
