//! Format detection by file name and magic bytes.
//!
//! These checks are cheap and never fail: anything too short or unexpected
//! simply does not match.

use image::ImageFormat;

/// TIFF magic plus version, the shortest header we can recognise.
const TIFF_HEADER_SIZE: usize = 4;

const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];

// =============================================================================
// RasterKind
// =============================================================================

/// Single-image raster container recognised by its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterKind {
    Png,
    Jpeg,
    Tiff,
}

impl RasterKind {
    /// Get a human-readable name for the container.
    pub const fn name(&self) -> &'static str {
        match self {
            RasterKind::Png => "PNG",
            RasterKind::Jpeg => "JPEG",
            RasterKind::Tiff => "TIFF",
        }
    }

    /// Matching decoder of the `image` crate.
    pub const fn image_format(&self) -> ImageFormat {
        match self {
            RasterKind::Png => ImageFormat::Png,
            RasterKind::Jpeg => ImageFormat::Jpeg,
            RasterKind::Tiff => ImageFormat::Tiff,
        }
    }
}

/// Identify a raster container from the first bytes of a file.
pub fn detect_raster(bytes: &[u8]) -> Option<RasterKind> {
    if is_png_header(bytes) {
        Some(RasterKind::Png)
    } else if is_jpeg_header(bytes) {
        Some(RasterKind::Jpeg)
    } else if is_tiff_header(bytes) {
        Some(RasterKind::Tiff)
    } else {
        None
    }
}

// =============================================================================
// Header checks
// =============================================================================

pub fn is_png_header(bytes: &[u8]) -> bool {
    bytes.starts_with(PNG_MAGIC)
}

pub fn is_jpeg_header(bytes: &[u8]) -> bool {
    bytes.starts_with(JPEG_MAGIC)
}

/// Check if bytes start with a classic or BigTIFF header.
pub fn is_tiff_header(bytes: &[u8]) -> bool {
    if bytes.len() < TIFF_HEADER_SIZE {
        return false;
    }

    let version = match &bytes[..2] {
        b"II" => u16::from_le_bytes([bytes[2], bytes[3]]),
        b"MM" => u16::from_be_bytes([bytes[2], bytes[3]]),
        _ => return false,
    };
    version == 42 || version == 43
}

/// Whether `name` ends in `.suffix` for one of `suffixes`, ignoring case.
pub fn has_suffix(name: &str, suffixes: &[&str]) -> bool {
    let Some((_, ext)) = name.rsplit_once('.') else {
        return false;
    };
    suffixes.iter().any(|suffix| suffix.eq_ignore_ascii_case(ext))
}
