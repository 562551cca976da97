use bytes::Bytes;
use image::DynamicImage;
use tracing::trace;

use crate::error::{ArgumentError, Result};
use crate::format::ImageReader;
use crate::model::{check_buffer, Axis, DimensionOrder, Region, ZctCoords};
use crate::reader::{pixels, plane_layout, FormatReader};

use super::decorator::ReaderDecorator;

/// Decorator that splits RGB planes into one plane per sub-channel.
///
/// For an RGB series that is not indexed, plane count grows by the number
/// of sub-channels, C becomes the fastest-varying axis and every plane holds
/// a single sample per pixel. Other series pass through unchanged.
pub struct ChannelSeparator {
    reader: Box<dyn FormatReader>,

    /// Last source region read: (series, plane, region, samples)
    last: Option<(usize, usize, Region, Bytes)>,
}

impl ChannelSeparator {
    pub fn new<R: FormatReader + 'static>(reader: R) -> Self {
        Self::from_boxed(Box::new(reader))
    }

    pub fn from_boxed(reader: Box<dyn FormatReader>) -> Self {
        Self { reader, last: None }
    }

    pub fn try_wrap(reader: Option<Box<dyn FormatReader>>) -> Result<Self> {
        reader
            .map(Self::from_boxed)
            .ok_or_else(|| ArgumentError::NullReader.into())
    }

    pub fn into_inner(self) -> Box<dyn FormatReader> {
        self.reader
    }

    /// Whether planes of the current series are being split.
    pub fn is_splitting(&self) -> bool {
        self.reader.is_rgb() && !self.reader.is_indexed()
    }

    /// Plane of the wrapped reader holding plane `no`, and the sub-channel
    /// of that plane.
    pub fn source_plane(&self, no: usize) -> Result<(usize, usize)> {
        if !self.is_splitting() {
            return Ok((no, 0));
        }
        let rgb = self.reader.rgb_channel_count();
        let coords = plane_layout(self)?.coords(no)?;
        let source = self
            .reader
            .plane_index(coords.z, coords.c / rgb, coords.t)?;
        Ok((source, coords.c % rgb))
    }

    fn source_region(&mut self, source: usize, region: Region) -> Result<Bytes> {
        let series = self.reader.series();
        if let Some((s, p, r, samples)) = &self.last {
            if (*s, *p, *r) == (series, source, region) {
                trace!(source, "Reusing source plane");
                return Ok(samples.clone());
            }
        }
        let samples = self.reader.open_bytes_region(source, region)?;
        self.last = Some((series, source, region, samples.clone()));
        Ok(samples)
    }
}

impl Default for ChannelSeparator {
    fn default() -> Self {
        Self::new(ImageReader::new())
    }
}

impl ReaderDecorator for ChannelSeparator {
    fn reader(&self) -> &dyn FormatReader {
        self.reader.as_ref()
    }

    fn reader_mut(&mut self) -> &mut dyn FormatReader {
        self.reader.as_mut()
    }

    fn set_id(&mut self, id: &str) -> Result<()> {
        self.last = None;
        self.reader.set_id(id)
    }

    fn close_with(&mut self, file_only: bool) -> Result<()> {
        self.last = None;
        self.reader.close_with(file_only)
    }

    fn close(&mut self) -> Result<()> {
        self.last = None;
        self.reader.close()
    }

    fn image_count(&self) -> usize {
        if self.is_splitting() {
            self.reader.image_count() * self.reader.rgb_channel_count()
        } else {
            self.reader.image_count()
        }
    }

    fn dimension_order(&self) -> DimensionOrder {
        let order = self.reader.dimension_order();
        if !self.is_splitting() {
            return order;
        }
        let axes = order.axes();
        let z = axes.iter().position(|a| *a == Axis::Z);
        let t = axes.iter().position(|a| *a == Axis::T);
        if z < t {
            DimensionOrder::XYCZT
        } else {
            DimensionOrder::XYCTZ
        }
    }

    fn is_rgb(&self) -> bool {
        !self.is_splitting() && self.reader.is_rgb()
    }

    fn is_interleaved(&self) -> bool {
        !self.is_splitting() && self.reader.is_interleaved()
    }

    fn is_interleaved_at(&self, sub_c: usize) -> bool {
        !self.is_splitting() && self.reader.is_interleaved_at(sub_c)
    }

    fn plane_index(&self, z: usize, c: usize, t: usize) -> Result<usize> {
        plane_layout(self)?.index(ZctCoords::new(z, c, t))
    }

    fn zct_coords(&self, index: usize) -> Result<ZctCoords> {
        plane_layout(self)?.coords(index)
    }

    fn open_bytes_region_into(&mut self, no: usize, buf: &mut [u8], region: Region) -> Result<()> {
        if !self.is_splitting() {
            return self.reader.open_bytes_region_into(no, buf, region);
        }
        if self.reader.current_file().is_none() {
            return Err(ArgumentError::NotOpen.into());
        }

        let count = FormatReader::image_count(self);
        if no >= count {
            return Err(ArgumentError::PlaneOutOfRange { index: no, count }.into());
        }
        region.check(self.reader.size_x(), self.reader.size_y())?;
        let bpp = self.reader.pixel_type().bytes_per_pixel();
        let len = region.byte_len(1, bpp)?;
        check_buffer(buf, len)?;

        let (source, channel) = self.source_plane(no)?;
        let samples = self.source_region(source, region)?;
        extract_channel(
            &samples,
            len / bpp,
            self.reader.rgb_channel_count(),
            channel,
            bpp,
            self.reader.is_interleaved(),
            buf,
        );
        Ok(())
    }

    fn open_bytes_into(&mut self, no: usize, buf: &mut [u8]) -> Result<()> {
        pixels::read_into(self, no, buf)
    }

    fn open_bytes_region(&mut self, no: usize, region: Region) -> Result<Bytes> {
        pixels::read_region(self, no, region)
    }

    fn open_bytes(&mut self, no: usize) -> Result<Bytes> {
        pixels::read_plane(self, no)
    }

    fn open_image_region(&mut self, no: usize, region: Region) -> Result<DynamicImage> {
        pixels::read_image_region(self, no, region)
    }

    fn open_image(&mut self, no: usize) -> Result<DynamicImage> {
        pixels::read_image(self, no)
    }

    fn open_thumb_image(&mut self, no: usize) -> Result<DynamicImage> {
        pixels::read_thumb_image(self, no)
    }

    fn open_thumb_bytes(&mut self, no: usize) -> Result<Bytes> {
        pixels::read_thumb_bytes(self, no)
    }
}

/// Copy one sub-channel of `pixels` multi-channel samples into `out`.
fn extract_channel(
    samples: &[u8],
    pixels: usize,
    channels: usize,
    channel: usize,
    bytes_per_sample: usize,
    interleaved: bool,
    out: &mut [u8],
) {
    let len = pixels * bytes_per_sample;
    if !interleaved {
        let start = channel * len;
        out[..len].copy_from_slice(&samples[start..start + len]);
        return;
    }
    for pixel in 0..pixels {
        let src = (pixel * channels + channel) * bytes_per_sample;
        let dst = pixel * bytes_per_sample;
        out[dst..dst + bytes_per_sample].copy_from_slice(&samples[src..src + bytes_per_sample]);
    }
}
