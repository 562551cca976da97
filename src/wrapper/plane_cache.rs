use std::num::NonZeroUsize;

use bytes::Bytes;
use image::DynamicImage;
use lru::LruCache;
use tracing::debug;

use crate::error::{ArgumentError, Result};
use crate::format::ImageReader;
use crate::model::{check_buffer, crop_plane, Region};
use crate::reader::{pixels, FormatReader};

use super::decorator::ReaderDecorator;

/// Default cache capacity in planes.
pub const DEFAULT_PLANE_CACHE_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PlaneKey {
    file: String,
    series: usize,
    plane: usize,
}

/// Decorator that keeps recently decoded planes in memory.
///
/// Whole planes are cached with LRU eviction, keyed by file, series and
/// plane index. Region reads are cropped from the cached plane, so reading
/// several tiles of one plane decodes it once. Opening or closing a file
/// empties the cache.
pub struct PlaneCache {
    reader: Box<dyn FormatReader>,
    cache: LruCache<PlaneKey, Bytes>,
    hits: u64,
    misses: u64,
}

impl PlaneCache {
    /// Wrap `reader` with the default capacity
    /// ([`DEFAULT_PLANE_CACHE_CAPACITY`] planes).
    pub fn new<R: FormatReader + 'static>(reader: R) -> Self {
        Self::from_boxed(Box::new(reader), DEFAULT_PLANE_CACHE_CAPACITY)
    }

    /// Wrap `reader`, keeping at most `capacity` planes (at least one).
    pub fn with_capacity<R: FormatReader + 'static>(reader: R, capacity: usize) -> Self {
        Self::from_boxed(Box::new(reader), capacity)
    }

    pub fn from_boxed(reader: Box<dyn FormatReader>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            reader,
            cache: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    pub fn try_wrap(reader: Option<Box<dyn FormatReader>>, capacity: usize) -> Result<Self> {
        reader
            .map(|reader| Self::from_boxed(reader, capacity))
            .ok_or_else(|| ArgumentError::NullReader.into())
    }

    pub fn into_inner(self) -> Box<dyn FormatReader> {
        self.reader
    }

    /// Reads answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Reads that had to decode a plane.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Number of cached planes.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }

    /// Drop every cached plane.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Whole plane `no`, from the cache when possible.
    fn plane(&mut self, no: usize) -> Result<Bytes> {
        let file = self
            .reader
            .current_file()
            .ok_or(ArgumentError::NotOpen)?
            .to_string();
        let key = PlaneKey {
            file,
            series: self.reader.series(),
            plane: no,
        };

        if let Some(plane) = self.cache.get(&key) {
            self.hits += 1;
            debug!(plane = no, series = key.series, "Plane cache hit");
            return Ok(plane.clone());
        }

        self.misses += 1;
        let plane = self.reader.open_bytes(no)?;
        self.cache.put(key, plane.clone());
        Ok(plane)
    }
}

impl Default for PlaneCache {
    fn default() -> Self {
        Self::new(ImageReader::new())
    }
}

impl ReaderDecorator for PlaneCache {
    fn reader(&self) -> &dyn FormatReader {
        self.reader.as_ref()
    }

    fn reader_mut(&mut self) -> &mut dyn FormatReader {
        self.reader.as_mut()
    }

    fn set_id(&mut self, id: &str) -> Result<()> {
        self.cache.clear();
        self.reader.set_id(id)
    }

    fn close_with(&mut self, file_only: bool) -> Result<()> {
        self.cache.clear();
        self.reader.close_with(file_only)
    }

    fn close(&mut self) -> Result<()> {
        self.cache.clear();
        self.reader.close()
    }

    fn open_bytes_region_into(&mut self, no: usize, buf: &mut [u8], region: Region) -> Result<()> {
        let len = pixels::region_len(self, region)?;
        check_buffer(buf, len)?;

        let plane = self.plane(no)?;
        let reader = self.reader.as_ref();
        crop_plane(
            &plane,
            reader.size_x(),
            reader.size_y(),
            region,
            reader.rgb_channel_count(),
            reader.pixel_type().bytes_per_pixel(),
            reader.is_interleaved(),
            buf,
        );
        Ok(())
    }

    fn open_bytes_into(&mut self, no: usize, buf: &mut [u8]) -> Result<()> {
        pixels::read_into(self, no, buf)
    }

    fn open_bytes_region(&mut self, no: usize, region: Region) -> Result<Bytes> {
        if region.is_full(self.reader.size_x(), self.reader.size_y()) {
            return self.plane(no);
        }
        pixels::read_region(self, no, region)
    }

    fn open_bytes(&mut self, no: usize) -> Result<Bytes> {
        self.plane(no)
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
