//! Bundled format backends and format detection.
//!
//! - **Simulated data** ([`FakeReader`]): planes generated from the id
//!   itself, for tests and demos
//! - **Raster images** ([`RasterReader`]): single-plane PNG, JPEG and TIFF
//!
//! [`ImageReader`] tries each of them in turn and is the reader used when
//! nothing more specific is asked for.

pub mod detect;
mod fake;
mod image_reader;
mod raster;

pub use detect::{detect_raster, has_suffix, is_jpeg_header, is_png_header, is_tiff_header, RasterKind};
pub use fake::{fake_sample, FakeFormat, FakeReader};
pub use image_reader::ImageReader;
pub use raster::{RasterFormat, RasterReader};
