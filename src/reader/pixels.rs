//! Pixel access built on top of `open_bytes_region_into`.
//!
//! These are the bodies of the derived [`FormatReader`] pixel methods. They
//! are public so that decorators which change the plane geometry can route
//! every variant through their own region read.

use std::borrow::Cow;

use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, ImageBuffer, Luma, LumaA, Rgb, Rgba};

use crate::error::{ArgumentError, FormatError, Result};
use crate::model::{PixelType, Region};

use super::contract::FormatReader;

/// Bytes `region` of one plane occupies, after checking that the reader is
/// open and the region lies inside the plane.
pub fn region_len<R: FormatReader + ?Sized>(reader: &R, region: Region) -> Result<usize> {
    if reader.current_file().is_none() {
        return Err(ArgumentError::NotOpen.into());
    }
    region.check(reader.size_x(), reader.size_y())?;
    region.byte_len(
        reader.rgb_channel_count(),
        reader.pixel_type().bytes_per_pixel(),
    )
}

pub fn read_into<R: FormatReader + ?Sized>(reader: &mut R, no: usize, buf: &mut [u8]) -> Result<()> {
    let region = Region::full(reader.size_x(), reader.size_y());
    reader.open_bytes_region_into(no, buf, region)
}

pub fn read_region<R: FormatReader + ?Sized>(
    reader: &mut R,
    no: usize,
    region: Region,
) -> Result<Bytes> {
    let mut buf = vec![0u8; region_len(reader, region)?];
    reader.open_bytes_region_into(no, &mut buf, region)?;
    Ok(Bytes::from(buf))
}

pub fn read_plane<R: FormatReader + ?Sized>(reader: &mut R, no: usize) -> Result<Bytes> {
    let region = Region::full(reader.size_x(), reader.size_y());
    reader.open_bytes_region(no, region)
}

pub fn read_image_region<R: FormatReader + ?Sized>(
    reader: &mut R,
    no: usize,
    region: Region,
) -> Result<DynamicImage> {
    let samples = reader.open_bytes_region(no, region)?;
    image_from_samples(
        &samples,
        region.width,
        region.height,
        reader.rgb_channel_count(),
        reader.pixel_type(),
        reader.is_interleaved(),
        reader.is_little_endian(),
    )
}

pub fn read_image<R: FormatReader + ?Sized>(reader: &mut R, no: usize) -> Result<DynamicImage> {
    let region = Region::full(reader.size_x(), reader.size_y());
    reader.open_image_region(no, region)
}

pub fn read_thumb_image<R: FormatReader + ?Sized>(reader: &mut R, no: usize) -> Result<DynamicImage> {
    let (width, height) = image_dims(reader.thumb_size_x(), reader.thumb_size_y())?;
    let image = reader.open_image(no)?;
    if image.width() == width && image.height() == height {
        return Ok(image);
    }
    Ok(image.resize_exact(width.max(1), height.max(1), FilterType::Triangle))
}

pub fn read_thumb_bytes<R: FormatReader + ?Sized>(reader: &mut R, no: usize) -> Result<Bytes> {
    let thumb = reader.open_thumb_image(no)?;
    Ok(Bytes::from(thumb.into_bytes()))
}

/// Wrap raw plane samples in an `image` buffer.
///
/// Supports 8- and 16-bit unsigned samples with one to four channels, and
/// floating-point RGB(A). Planar data is interleaved first.
pub fn image_from_samples(
    samples: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    pixel_type: PixelType,
    interleaved: bool,
    little_endian: bool,
) -> Result<DynamicImage> {
    let bpp = pixel_type.bytes_per_pixel();
    let samples = if interleaved || channels <= 1 {
        Cow::Borrowed(samples)
    } else {
        Cow::Owned(interleave(samples, channels, bpp))
    };
    let (w, h) = image_dims(width, height)?;

    let image = match (pixel_type, channels) {
        (PixelType::Uint8, 1) => {
            ImageBuffer::<Luma<u8>, _>::from_raw(w, h, samples.into_owned()).map(DynamicImage::ImageLuma8)
        }
        (PixelType::Uint8, 2) => {
            ImageBuffer::<LumaA<u8>, _>::from_raw(w, h, samples.into_owned()).map(DynamicImage::ImageLumaA8)
        }
        (PixelType::Uint8, 3) => {
            ImageBuffer::<Rgb<u8>, _>::from_raw(w, h, samples.into_owned()).map(DynamicImage::ImageRgb8)
        }
        (PixelType::Uint8, 4) => {
            ImageBuffer::<Rgba<u8>, _>::from_raw(w, h, samples.into_owned()).map(DynamicImage::ImageRgba8)
        }
        (PixelType::Uint16, 1..=4) => {
            let data: Vec<u16> = samples
                .chunks_exact(2)
                .map(|b| {
                    if little_endian {
                        u16::from_le_bytes([b[0], b[1]])
                    } else {
                        u16::from_be_bytes([b[0], b[1]])
                    }
                })
                .collect();
            match channels {
                1 => ImageBuffer::<Luma<u16>, _>::from_raw(w, h, data).map(DynamicImage::ImageLuma16),
                2 => ImageBuffer::<LumaA<u16>, _>::from_raw(w, h, data).map(DynamicImage::ImageLumaA16),
                3 => ImageBuffer::<Rgb<u16>, _>::from_raw(w, h, data).map(DynamicImage::ImageRgb16),
                _ => ImageBuffer::<Rgba<u16>, _>::from_raw(w, h, data).map(DynamicImage::ImageRgba16),
            }
        }
        (PixelType::Float, 3 | 4) => {
            let data: Vec<f32> = samples
                .chunks_exact(4)
                .map(|b| {
                    let raw = [b[0], b[1], b[2], b[3]];
                    if little_endian {
                        f32::from_le_bytes(raw)
                    } else {
                        f32::from_be_bytes(raw)
                    }
                })
                .collect();
            if channels == 3 {
                ImageBuffer::<Rgb<f32>, _>::from_raw(w, h, data).map(DynamicImage::ImageRgb32F)
            } else {
                ImageBuffer::<Rgba<f32>, _>::from_raw(w, h, data).map(DynamicImage::ImageRgba32F)
            }
        }
        _ => None,
    };

    image.ok_or_else(|| {
        FormatError::UnsupportedPixelLayout(format!(
            "{} {} samples per pixel at {}x{}",
            channels, pixel_type, width, height
        ))
        .into()
    })
}

/// `width` and `height` as `image` crate dimensions.
fn image_dims(width: usize, height: usize) -> Result<(u32, u32)> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(FormatError::UnsupportedPixelLayout(format!(
            "{width}x{height} exceeds the image size limit"
        ))
        .into()),
    }
}

/// Turn `channels` consecutive sub-planes into one interleaved plane.
fn interleave(planar: &[u8], channels: usize, bytes_per_sample: usize) -> Vec<u8> {
    let sub_len = planar.len() / channels;
    let pixels = sub_len / bytes_per_sample;
    let mut out = vec![0u8; sub_len * channels];
    for channel in 0..channels {
        for pixel in 0..pixels {
            let src = channel * sub_len + pixel * bytes_per_sample;
            let dst = (pixel * channels + channel) * bytes_per_sample;
            out[dst..dst + bytes_per_sample].copy_from_slice(&planar[src..src + bytes_per_sample]);
        }
    }
    out
}
