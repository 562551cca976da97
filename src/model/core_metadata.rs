use serde::{Deserialize, Serialize};

use crate::error::{FormatError, Result};

use super::order::{DimensionOrder, PlaneLayout};
use super::pixel::PixelType;
use super::region::Region;

/// Longest edge of a default thumbnail.
pub const THUMBNAIL_DIMENSION: usize = 128;

/// Dimensional metadata of a single series.
///
/// `size_c` counts every channel, including the sub-channels interleaved in
/// an RGB plane. The number of stored channel planes per (Z, T) position is
/// [`CoreMetadata::effective_size_c`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreMetadata {
    pub size_x: usize,
    pub size_y: usize,
    pub size_z: usize,
    pub size_c: usize,
    pub size_t: usize,
    pub pixel_type: PixelType,
    pub image_count: usize,
    pub dimension_order: DimensionOrder,
    pub order_certain: bool,
    pub rgb: bool,
    pub little_endian: bool,
    pub interleaved: bool,
    pub indexed: bool,
    pub false_color: bool,
    pub metadata_complete: bool,
    pub thumb_size_x: usize,
    pub thumb_size_y: usize,

    /// Lengths of the sub-dimensions rasterised into C
    pub channel_dim_lengths: Vec<usize>,

    /// Names of the sub-dimensions rasterised into C
    pub channel_dim_types: Vec<String>,
}

impl Default for CoreMetadata {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl CoreMetadata {
    /// Metadata of a reader with no open file.
    pub const EMPTY: CoreMetadata = CoreMetadata {
        size_x: 0,
        size_y: 0,
        size_z: 0,
        size_c: 0,
        size_t: 0,
        pixel_type: PixelType::Uint8,
        image_count: 0,
        dimension_order: DimensionOrder::XYZCT,
        order_certain: true,
        rgb: false,
        little_endian: false,
        interleaved: false,
        indexed: false,
        false_color: false,
        metadata_complete: true,
        thumb_size_x: 0,
        thumb_size_y: 0,
        channel_dim_lengths: Vec::new(),
        channel_dim_types: Vec::new(),
    };

    /// Number of stored channel planes per (Z, T) position.
    pub fn effective_size_c(&self) -> usize {
        effective_size_c(self.image_count, self.size_z, self.size_t)
    }

    /// Sub-channels packed into each stored plane.
    pub fn rgb_channel_count(&self) -> usize {
        rgb_channel_count(self.size_c, self.effective_size_c())
    }

    /// Plane geometry for index conversions.
    pub fn layout(&self) -> Result<PlaneLayout> {
        PlaneLayout::new(
            self.dimension_order,
            self.size_z,
            self.effective_size_c(),
            self.size_t,
            self.image_count,
        )
    }

    /// Fill in derived fields a backend left at zero.
    pub fn finish(&mut self) {
        if self.image_count == 0 {
            // Left at zero on overflow; validate() rejects it.
            let rgb = if self.rgb { self.size_c.max(1) } else { 1 };
            self.image_count = self
                .size_z
                .checked_mul(self.size_t)
                .and_then(|zt| zt.checked_mul(self.size_c / rgb))
                .unwrap_or(0);
        }
        if self.thumb_size_x == 0 || self.thumb_size_y == 0 {
            let (w, h) = default_thumb_size(self.size_x, self.size_y);
            self.thumb_size_x = w;
            self.thumb_size_y = h;
        }
        if self.channel_dim_lengths.is_empty() {
            self.channel_dim_lengths = vec![self.size_c];
            self.channel_dim_types = vec!["Channel".to_string()];
        }
    }

    /// Check the invariants relating the plane count to Z, C and T.
    ///
    /// `image_count` must equal `size_z * size_t * effective_size_c`, with no
    /// remainder in either the effective or the RGB channel count.
    pub fn validate(&self) -> Result<()> {
        let malformed = |msg: String| -> Result<()> { Err(FormatError::Malformed(msg).into()) };

        if self.size_x == 0 || self.size_y == 0 {
            return malformed(format!(
                "empty plane {}x{}",
                self.size_x, self.size_y
            ));
        }
        if self.size_z == 0 || self.size_c == 0 || self.size_t == 0 {
            return malformed(format!(
                "invalid sizes Z={} C={} T={}",
                self.size_z, self.size_c, self.size_t
            ));
        }
        let Some(zt) = self.size_z.checked_mul(self.size_t) else {
            return malformed(format!(
                "Z*T = {}*{} overflows",
                self.size_z, self.size_t
            ));
        };
        if self.image_count == 0 || self.image_count % zt != 0 {
            return malformed(format!(
                "image count {} is not a multiple of Z*T = {}",
                self.image_count, zt
            ));
        }
        let effective = self.effective_size_c();
        if self.size_c % effective != 0 {
            return malformed(format!(
                "size C {} is not a multiple of effective C {}",
                self.size_c, effective
            ));
        }
        if self.rgb_channel_count() > 1 && !self.rgb {
            return malformed(format!(
                "{} sub-channels per plane but the series is not RGB",
                self.rgb_channel_count()
            ));
        }
        if Region::full(self.size_x, self.size_y)
            .byte_len(self.rgb_channel_count(), self.pixel_type.bytes_per_pixel())
            .is_err()
        {
            return malformed(format!(
                "plane {}x{} is too large to address",
                self.size_x, self.size_y
            ));
        }
        self.layout().map(|_| ())
    }
}

/// `image_count / (size_z * size_t)`, or 0 when Z or T is 0 or their
/// product overflows.
pub fn effective_size_c(image_count: usize, size_z: usize, size_t: usize) -> usize {
    match size_z.checked_mul(size_t) {
        None | Some(0) => 0,
        Some(zt) => image_count / zt,
    }
}

/// `size_c / effective_size_c`, or 0 when the effective count is 0.
pub fn rgb_channel_count(size_c: usize, effective_size_c: usize) -> usize {
    match effective_size_c {
        0 => 0,
        eff => size_c / eff,
    }
}

/// Thumbnail size preserving aspect ratio with the longest edge at
/// [`THUMBNAIL_DIMENSION`]. Images smaller than that keep their size.
pub fn default_thumb_size(size_x: usize, size_y: usize) -> (usize, usize) {
    if size_x == 0 || size_y == 0 {
        return (0, 0);
    }
    let longest = size_x.max(size_y);
    if longest <= THUMBNAIL_DIMENSION {
        return (size_x, size_y);
    }
    let scale = |v: usize| {
        let scaled = v as u128 * THUMBNAIL_DIMENSION as u128 / longest as u128;
        (scaled as usize).max(1)
    };
    (scale(size_x), scale(size_y))
}
