use crate::error::{ArgumentError, Result};

/// A rectangle within a plane, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Region {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole `size_x` by `size_y` plane.
    pub const fn full(size_x: usize, size_y: usize) -> Self {
        Self::new(0, 0, size_x, size_y)
    }

    pub fn is_full(&self, size_x: usize, size_y: usize) -> bool {
        *self == Self::full(size_x, size_y)
    }

    /// Whether the region lies inside `[0, size_x) x [0, size_y)`.
    pub fn fits(&self, size_x: usize, size_y: usize) -> bool {
        self.width > 0
            && self.height > 0
            && self.x.checked_add(self.width).is_some_and(|r| r <= size_x)
            && self.y.checked_add(self.height).is_some_and(|b| b <= size_y)
    }

    /// Argument error unless the region [`fits`](Region::fits).
    pub fn check(&self, size_x: usize, size_y: usize) -> Result<()> {
        if self.fits(size_x, size_y) {
            Ok(())
        } else {
            Err(ArgumentError::RegionOutOfBounds {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
                size_x,
                size_y,
            }
            .into())
        }
    }

    /// Pixels in the region, or `None` if the count does not fit a `usize`.
    pub fn pixel_count(&self) -> Option<usize> {
        self.width.checked_mul(self.height)
    }

    /// Bytes needed to hold this region with `channels` samples per pixel.
    ///
    /// Fails with [`ArgumentError::RegionTooLarge`] when the size does not
    /// fit in memory addressable by a `usize`.
    pub fn byte_len(&self, channels: usize, bytes_per_pixel: usize) -> Result<usize> {
        self.pixel_count()
            .and_then(|n| n.checked_mul(channels))
            .and_then(|n| n.checked_mul(bytes_per_pixel))
            .ok_or_else(|| {
                ArgumentError::RegionTooLarge {
                    width: self.width,
                    height: self.height,
                }
                .into()
            })
    }
}

/// Argument error unless `buf` can hold `required` bytes.
pub fn check_buffer(buf: &[u8], required: usize) -> Result<()> {
    if buf.len() < required {
        return Err(ArgumentError::BufferTooSmall {
            required,
            actual: buf.len(),
        }
        .into());
    }
    Ok(())
}

/// Copy `region` out of a full plane.
///
/// When interleaved, every pixel of `plane` holds `channels` samples of
/// `bytes_per_sample` bytes. Planar data (`interleaved == false`) holds
/// `channels` consecutive sub-planes; `out` is laid out the same way.
#[allow(clippy::too_many_arguments)]
pub fn crop_plane(
    plane: &[u8],
    size_x: usize,
    size_y: usize,
    region: Region,
    channels: usize,
    bytes_per_sample: usize,
    interleaved: bool,
    out: &mut [u8],
) {
    if interleaved || channels == 1 {
        let pixel_len = channels * bytes_per_sample;
        let row_len = region.width * pixel_len;
        for row in 0..region.height {
            let src = ((region.y + row) * size_x + region.x) * pixel_len;
            let dst = row * row_len;
            out[dst..dst + row_len].copy_from_slice(&plane[src..src + row_len]);
        }
    } else {
        let plane_len = size_x * size_y * bytes_per_sample;
        let row_len = region.width * bytes_per_sample;
        let sub_len = region.height * row_len;
        for channel in 0..channels {
            for row in 0..region.height {
                let src = channel * plane_len
                    + ((region.y + row) * size_x + region.x) * bytes_per_sample;
                let dst = channel * sub_len + row * row_len;
                out[dst..dst + row_len].copy_from_slice(&plane[src..src + row_len]);
            }
        }
    }
}
