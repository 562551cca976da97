//! Single-plane PNG, JPEG and TIFF files decoded with the `image` crate.

use bytes::Bytes;
use image::{ColorType, DynamicImage};
use tracing::debug;

use crate::error::{ArgumentError, FormatError, IoError, Result};
use crate::model::{crop_plane, CoreMetadata, PixelType, Region};
use crate::reader::{BaseReader, FormatBackend, ParseContext, ReaderState};

use super::detect::{detect_raster, RasterKind};

/// A [`FormatReader`](crate::FormatReader) for plain raster images.
pub type RasterReader = BaseReader<RasterFormat>;

/// Backend of [`RasterReader`].
///
/// The decoded plane is kept until the reader is closed. `close_with(true)`
/// drops it and the next read decodes the file again.
#[derive(Debug, Default)]
pub struct RasterFormat {
    plane: Option<Bytes>,
}

impl FormatBackend for RasterFormat {
    fn name(&self) -> &'static str {
        "Raster image"
    }

    fn suffixes(&self) -> &'static [&'static str] {
        &["png", "jpg", "jpeg", "tif", "tiff"]
    }

    fn is_this_type_bytes(&self, block: &[u8]) -> bool {
        detect_raster(block).is_some()
    }

    fn parse(&mut self, id: &str, ctx: &mut ParseContext<'_>) -> Result<()> {
        let (kind, image) = decode_file(id)?;
        let color = image.color();
        let (channels, pixel_type) = sample_layout(color);
        let image = normalize_color(image);

        ctx.add_meta("Format", kind.name());
        ctx.add_meta("Width", image.width() as i64);
        ctx.add_meta("Height", image.height() as i64);
        ctx.add_meta("Color type", format!("{color:?}"));
        ctx.add_meta("BitsPerSample", (pixel_type.bytes_per_pixel() * 8) as i64);

        ctx.add_series(
            id,
            CoreMetadata {
                size_x: image.width() as usize,
                size_y: image.height() as usize,
                size_z: 1,
                size_c: channels,
                size_t: 1,
                pixel_type,
                image_count: 1,
                rgb: channels > 1,
                interleaved: true,
                little_endian: cfg!(target_endian = "little"),
                ..Default::default()
            },
        );

        self.plane = Some(Bytes::from(image.into_bytes()));
        Ok(())
    }

    fn read_region(
        &mut self,
        state: &ReaderState,
        _no: usize,
        buf: &mut [u8],
        region: Region,
    ) -> Result<()> {
        let plane = match &self.plane {
            Some(plane) => plane.clone(),
            None => {
                let id = state.current_id().ok_or(ArgumentError::NotOpen)?;
                debug!(id, "Decoding raster image again");
                let (_, image) = decode_file(id)?;
                let plane = Bytes::from(normalize_color(image).into_bytes());
                self.plane = Some(plane.clone());
                plane
            }
        };

        let core = state.core();
        crop_plane(
            &plane,
            core.size_x,
            core.size_y,
            region,
            core.rgb_channel_count(),
            core.pixel_type.bytes_per_pixel(),
            true,
            buf,
        );
        Ok(())
    }

    fn close_file(&mut self, _file_only: bool) -> Result<()> {
        self.plane = None;
        Ok(())
    }
}

fn decode_file(id: &str) -> Result<(RasterKind, DynamicImage)> {
    let data = std::fs::read(id).map_err(|err| IoError::from_path(id, err))?;
    let kind = detect_raster(&data).ok_or_else(|| FormatError::UnsupportedFormat {
        reason: format!("{id} is not a PNG, JPEG or TIFF file"),
    })?;
    let image = image::load_from_memory_with_format(&data, kind.image_format())
        .map_err(|err| FormatError::Decode(format!("{id}: {err}")))?;
    Ok((kind, image))
}

/// Channels and sample type exposed for a decoded color type.
fn sample_layout(color: ColorType) -> (usize, PixelType) {
    match color {
        ColorType::L8 => (1, PixelType::Uint8),
        ColorType::La8 => (2, PixelType::Uint8),
        ColorType::Rgb8 => (3, PixelType::Uint8),
        ColorType::L16 => (1, PixelType::Uint16),
        ColorType::La16 => (2, PixelType::Uint16),
        ColorType::Rgb16 => (3, PixelType::Uint16),
        ColorType::Rgba16 => (4, PixelType::Uint16),
        ColorType::Rgb32F => (3, PixelType::Float),
        ColorType::Rgba32F => (4, PixelType::Float),
        _ => (4, PixelType::Uint8),
    }
}

/// Convert color types without a direct mapping to 8-bit RGBA.
fn normalize_color(image: DynamicImage) -> DynamicImage {
    match image.color() {
        ColorType::L8
        | ColorType::La8
        | ColorType::Rgb8
        | ColorType::Rgba8
        | ColorType::L16
        | ColorType::La16
        | ColorType::Rgb16
        | ColorType::Rgba16
        | ColorType::Rgb32F
        | ColorType::Rgba32F => image,
        _ => DynamicImage::ImageRgba8(image.to_rgba8()),
    }
}
