//! Format dispatch integration tests.
//!
//! Tests verify:
//! - ImageReader picks the right backend by name, then by header
//! - Raster files decode to the expected samples
//! - Stream sniffing leaves the stream where it was
//! - Missing and unrecognised files fail with the right error class

use std::fs;
use std::io::{Cursor, Seek, SeekFrom};

use bioreader::reader::FormatReader;
use bioreader::{
    ChannelSeparator, FakeReader, FileGrouping, FormatError, ImageReader, PixelType, RasterReader,
    ReaderError, Region,
};

use super::test_utils::{path_str, write_gray, write_gray16, write_rgb};

// =============================================================================
// Dispatch
// =============================================================================

#[test]
fn test_dispatch_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rgb(dir.path(), "cells.png", 10, 6);

    let mut reader = ImageReader::new();
    reader.set_id(path_str(&path)).unwrap();

    assert_eq!(reader.format_name(), "Raster image");
    assert_eq!((reader.size_x(), reader.size_y()), (10, 6));
    assert_eq!(reader.size_c(), 3);
    assert_eq!(reader.image_count(), 1);
    assert_eq!(reader.rgb_channel_count(), 3);
    assert!(reader.is_rgb());
    assert!(reader.is_interleaved());

    let plane = reader.open_bytes(0).unwrap();
    assert_eq!(plane.len(), 10 * 6 * 3);
    // Pixel (4, 2) is [4, 2, 6]
    let offset = (2 * 10 + 4) * 3;
    assert_eq!(&plane[offset..offset + 3], &[4, 2, 6]);
}

#[test]
fn test_dispatch_tiff() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gray(dir.path(), "gray.tif", 7, 5);

    let mut reader = ImageReader::new();
    reader.set_id(path_str(&path)).unwrap();

    assert_eq!(reader.format_name(), "Raster image");
    assert!(!reader.is_rgb());
    let plane = reader
        .open_bytes_region(0, Region::new(3, 1, 2, 2))
        .unwrap();
    // x * 5 + y
    assert_eq!(plane.as_ref(), &[16, 21, 17, 22]);
}

#[test]
fn test_dispatch_jpeg() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rgb(dir.path(), "photo.jpg", 16, 16);

    let mut reader = ImageReader::new();
    reader.set_id(path_str(&path)).unwrap();

    assert_eq!((reader.size_x(), reader.size_y()), (16, 16));
    assert_eq!(reader.pixel_type(), PixelType::Uint8);
    assert_eq!(reader.open_bytes(0).unwrap().len(), 16 * 16 * 3);
}

#[test]
fn test_dispatch_by_header_without_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let png = write_gray(dir.path(), "scan.png", 4, 4);
    let renamed = dir.path().join("scan.dat");
    fs::rename(&png, &renamed).unwrap();

    let mut reader = ImageReader::new();
    assert!(!reader.is_this_type(path_str(&renamed), false));
    assert!(reader.is_this_type(path_str(&renamed), true));

    reader.set_id(path_str(&renamed)).unwrap();
    assert_eq!(reader.size_x(), 4);
}

#[test]
fn test_switching_between_backends() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gray(dir.path(), "gray.png", 3, 3);

    let mut reader = ImageReader::new();
    reader.set_id("sim&sizeX=9&sizeY=9&sizeT=5.fake").unwrap();
    assert_eq!(reader.format_name(), "Simulated data");
    assert_eq!(reader.image_count(), 5);

    reader.set_id(path_str(&path)).unwrap();
    assert_eq!(reader.format_name(), "Raster image");
    assert_eq!(reader.image_count(), 1);

    // The simulated reader was closed when the raster reader took over
    let fake = reader.readers().next().unwrap();
    assert_eq!(fake.current_file(), None);
}

#[test]
fn test_suffixes_are_merged() {
    let reader = ImageReader::new();
    for suffix in ["fake", "png", "jpg", "jpeg", "tif", "tiff"] {
        assert!(reader.suffixes().contains(&suffix), "missing {suffix}");
    }
    assert!(reader.is_this_type("slide.TIFF", false));
    assert!(!reader.is_this_type("notes.txt", false));
}

#[test]
fn test_sixteen_bit_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gray16(dir.path(), "deep.png", 5, 3);

    let mut reader = RasterReader::default();
    reader.set_id(path_str(&path)).unwrap();

    assert_eq!(reader.pixel_type(), PixelType::Uint16);
    assert_eq!(reader.is_little_endian(), cfg!(target_endian = "little"));

    let plane = reader.open_bytes(0).unwrap();
    assert_eq!(plane.len(), 5 * 3 * 2);
    let sample = |x: usize, y: usize| {
        let i = (y * 5 + x) * 2;
        u16::from_ne_bytes([plane[i], plane[i + 1]])
    };
    assert_eq!(sample(0, 0), 0);
    assert_eq!(sample(4, 2), 4002);
}

#[test]
fn test_rgb_png_through_channel_separator() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rgb(dir.path(), "cells.png", 6, 4);

    let mut reader = ChannelSeparator::new(ImageReader::new());
    reader.set_id(path_str(&path)).unwrap();

    assert_eq!(reader.image_count(), 3);
    assert!(!reader.is_rgb());
    let blue = reader.open_bytes(2).unwrap();
    assert_eq!(blue.len(), 24);
    // Pixel (5, 3) has blue = 8
    assert_eq!(blue[3 * 6 + 5], 8);
}

#[test]
fn test_file_grouping() {
    let mut reader = ImageReader::new();
    assert_eq!(
        reader.file_group_option("a&sizeX=2&sizeY=2.fake").unwrap(),
        FileGrouping::CannotGroup
    );
}

// =============================================================================
// Stream Sniffing
// =============================================================================

#[test]
fn test_stream_sniffing_restores_position() {
    let mut data = vec![0u8; 4];
    data.extend_from_slice(b"II*\0");
    data.extend_from_slice(&[8, 0, 0, 0]);
    let mut stream = Cursor::new(data);
    stream.seek(SeekFrom::Start(4)).unwrap();

    let reader = RasterReader::default();
    assert!(reader.is_this_type_stream(&mut stream).unwrap());
    assert_eq!(stream.position(), 4);

    stream.seek(SeekFrom::Start(0)).unwrap();
    assert!(!reader.is_this_type_stream(&mut stream).unwrap());
}

#[test]
fn test_fake_is_never_sniffed() {
    let reader = FakeReader::default();
    let mut stream = Cursor::new(b"\x89PNG\r\n\x1a\n".to_vec());
    assert!(!reader.is_this_type_stream(&mut stream).unwrap());
    assert!(reader.is_this_type("anything&sizeX=2.fake", false));
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.png");

    let mut reader = ImageReader::new();
    let err = reader.set_id(path_str(&missing)).unwrap_err();
    assert!(err.is_io_error(), "unexpected error: {err}");
}

#[test]
fn test_unrecognised_file_is_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "plain text, not pixels").unwrap();

    let mut reader = ImageReader::new();
    let err = reader.set_id(path_str(&path)).unwrap_err();
    assert!(matches!(
        err,
        ReaderError::Format(FormatError::UnsupportedFormat { .. })
    ));
}

#[test]
fn test_unrecognised_file_closes_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "plain text, not pixels").unwrap();

    let mut reader = ImageReader::new();
    reader.set_id("sim&sizeX=8&sizeY=8&series=2.fake").unwrap();
    assert_eq!(reader.series_count(), 2);

    let err = reader.set_id(path_str(&path)).unwrap_err();
    assert!(matches!(
        err,
        ReaderError::Format(FormatError::UnsupportedFormat { .. })
    ));
    assert_eq!(reader.current_file(), None);
    assert_eq!(reader.series_count(), 0);
    assert!(reader.open_bytes(0).unwrap_err().is_argument_error());
    assert!(reader.readers().all(|r| r.current_file().is_none()));
}

#[test]
fn test_corrupt_raster_is_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.png");
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.extend_from_slice(&[0xFF; 32]);
    fs::write(&path, bytes).unwrap();

    let mut reader = ImageReader::new();
    let err = reader.set_id(path_str(&path)).unwrap_err();
    assert!(err.is_format_error(), "unexpected error: {err}");
    assert_eq!(reader.current_file(), None);
}

#[test]
fn test_invalid_fake_ids() {
    let mut reader = ImageReader::new();
    for id in [
        "x&sizeX.fake",
        "x&sizeC=3&rgb=2.fake",
        "x&sizeC=3&rgb=3&indexed=true.fake",
        "x&pixelType=complex.fake",
        "x&dimOrder=XYQCT.fake",
        "x&sizeX=2&sizeY=2&sizeZ=4294967296&sizeT=4294967296.fake",
        "x&sizeX=2&sizeY=2&sizeZ=18446744073709551615&sizeC=2.fake",
        "x&sizeX=4294967296&sizeY=4294967296&sizeC=4&rgb=4.fake",
    ] {
        let err = reader.set_id(id).unwrap_err();
        assert!(err.is_format_error(), "{id}: {err}");
    }
}
