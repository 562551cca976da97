//! Decorator integration tests.
//!
//! Tests verify:
//! - A no-op decorator answers every query exactly like the wrapped reader
//! - Missing readers are rejected when a decorator is built
//! - Derived channel counts follow the decorator's own plane count
//! - Decorators stack and expose what they wrap

use std::io::Cursor;
use bioreader::reader::FormatReader;
use bioreader::{
    ArgumentError, ChannelSeparator, FakeReader, ImageReader, MemoryMetadataStore, MetadataStore,
    PlaneCache,
    ReaderError, ReaderWrapper, Region,
};

use super::test_utils::{as_listener, RecordingListener, TrackingReader};

const IDS: &[&str] = &[
    "plain&sizeX=16&sizeY=8&sizeZ=3&sizeC=2&sizeT=4.fake",
    "ordered&sizeX=9&sizeY=7&sizeZ=2&sizeC=3&sizeT=2&dimOrder=XYTCZ.fake",
    "rgb&sizeX=6&sizeY=5&sizeC=6&rgb=3&sizeT=2&interleaved=true&series=3.fake",
    "wide&sizeX=300&sizeY=40&pixelType=uint16&little=false.fake",
    "lut&sizeX=4&sizeY=4&indexed=true&falseColor=true.fake",
];

// =============================================================================
// Helpers
// =============================================================================

/// Assert that two open readers agree on every query for the current series.
fn assert_same_answers(a: &mut dyn FormatReader, b: &mut dyn FormatReader) {
    assert_eq!(a.format_name(), b.format_name());
    assert_eq!(a.suffixes(), b.suffixes());
    assert_eq!(a.current_file(), b.current_file());
    assert_eq!(a.used_files(), b.used_files());
    assert_eq!(a.series_count(), b.series_count());
    assert_eq!(a.series(), b.series());

    assert_eq!(a.size_x(), b.size_x());
    assert_eq!(a.size_y(), b.size_y());
    assert_eq!(a.size_z(), b.size_z());
    assert_eq!(a.size_c(), b.size_c());
    assert_eq!(a.size_t(), b.size_t());
    assert_eq!(a.pixel_type(), b.pixel_type());
    assert_eq!(a.image_count(), b.image_count());
    assert_eq!(a.effective_size_c(), b.effective_size_c());
    assert_eq!(a.rgb_channel_count(), b.rgb_channel_count());
    assert_eq!(a.thumb_size_x(), b.thumb_size_x());
    assert_eq!(a.thumb_size_y(), b.thumb_size_y());
    assert_eq!(a.dimension_order(), b.dimension_order());
    assert_eq!(a.is_order_certain(), b.is_order_certain());
    assert_eq!(a.is_rgb(), b.is_rgb());
    assert_eq!(a.is_indexed(), b.is_indexed());
    assert_eq!(a.is_false_color(), b.is_false_color());
    assert_eq!(a.is_little_endian(), b.is_little_endian());
    assert_eq!(a.is_interleaved(), b.is_interleaved());
    assert_eq!(a.is_interleaved_at(0), b.is_interleaved_at(0));
    assert_eq!(a.channel_dim_lengths(), b.channel_dim_lengths());
    assert_eq!(a.channel_dim_types(), b.channel_dim_types());
    assert_eq!(a.is_metadata_complete(), b.is_metadata_complete());
    assert_eq!(a.metadata(), b.metadata());
    assert_eq!(a.core_metadata(), b.core_metadata());
    assert_eq!(a.lut_8bit().unwrap(), b.lut_8bit().unwrap());
    assert_eq!(a.lut_16bit().unwrap(), b.lut_16bit().unwrap());

    for no in 0..a.image_count() {
        let coords = a.zct_coords(no).unwrap();
        assert_eq!(coords, b.zct_coords(no).unwrap());
        assert_eq!(
            a.plane_index(coords.z, coords.c, coords.t).unwrap(),
            b.plane_index(coords.z, coords.c, coords.t).unwrap()
        );
        assert_eq!(a.open_bytes(no).unwrap(), b.open_bytes(no).unwrap());
    }

    let region = Region::new(1, 1, a.size_x() - 2, a.size_y() - 1);
    assert_eq!(
        a.open_bytes_region(0, region).unwrap(),
        b.open_bytes_region(0, region).unwrap()
    );
    assert_eq!(a.open_thumb_bytes(0).unwrap(), b.open_thumb_bytes(0).unwrap());
}

// =============================================================================
// No-op Forwarding
// =============================================================================

#[test]
fn test_noop_decorator_matches_wrapped_reader() {
    for id in IDS {
        let mut plain = FakeReader::default();
        plain.set_id(id).unwrap();

        let mut wrapper = ReaderWrapper::new(FakeReader::default());
        wrapper.set_id(id).unwrap();

        for series in 0..plain.series_count() {
            plain.set_series(series).unwrap();
            wrapper.set_series(series).unwrap();
            assert_same_answers(&mut plain, &mut wrapper);
        }
    }
}

#[test]
fn test_noop_decorator_matches_for_raster_images() {
    let dir = tempfile::tempdir().unwrap();
    let path = super::test_utils::write_rgb(dir.path(), "cells.png", 12, 9);
    let path = super::test_utils::path_str(&path);

    let mut plain = ImageReader::new();
    plain.set_id(path).unwrap();
    let mut wrapper = ReaderWrapper::default();
    wrapper.set_id(path).unwrap();

    assert_same_answers(&mut plain, &mut wrapper);
    assert_eq!(
        plain.open_image(0).unwrap().into_bytes(),
        wrapper.open_image(0).unwrap().into_bytes()
    );
}

#[test]
fn test_errors_pass_through_unchanged() {
    let mut plain = FakeReader::default();
    let mut wrapper = ReaderWrapper::new(FakeReader::default());

    let plain_err = plain.open_bytes(0).unwrap_err();
    let wrapped_err = wrapper.open_bytes(0).unwrap_err();
    assert_eq!(plain_err.to_string(), wrapped_err.to_string());

    let plain_err = plain.set_id("x&sizeQ=2.fake").unwrap_err();
    let wrapped_err = wrapper.set_id("x&sizeQ=2.fake").unwrap_err();
    assert!(wrapped_err.is_format_error());
    assert_eq!(plain_err.to_string(), wrapped_err.to_string());
}

#[test]
fn test_option_flags_reach_wrapped_reader() {
    let mut wrapper = ReaderWrapper::new(FakeReader::default());
    wrapper.set_group_files(false);
    wrapper.set_normalized(true);
    wrapper.set_metadata_collected(false);
    wrapper.set_original_metadata_populated(true);
    wrapper.set_metadata_filtered(true);

    let inner = wrapper.into_inner();
    assert!(!inner.is_group_files());
    assert!(inner.is_normalized());
    assert!(!inner.is_metadata_collected());
    assert!(inner.is_original_metadata_populated());
    assert!(inner.is_metadata_filtered());
}

#[test]
fn test_metadata_store_is_shared() {
    let store = MemoryMetadataStore::shared();
    let mut wrapper = ReaderWrapper::new(FakeReader::default());
    wrapper.set_metadata_store(store.clone());
    wrapper.set_id("stored&sizeX=4&sizeY=4&series=2.fake").unwrap();

    assert_eq!(store.image_count(), 2);
    let root = wrapper.metadata_store_root().unwrap();
    assert_eq!(root["images"][1]["name"], "stored #2");
    assert_eq!(wrapper.metadata_store().root(), store.root());
}

#[test]
fn test_stream_sniffing_is_forwarded() {
    let wrapper = ReaderWrapper::new(ImageReader::new());
    let mut png = Cursor::new(vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0]);
    let mut text = Cursor::new(b"hello world".to_vec());

    assert!(wrapper.is_this_type_stream(&mut png).unwrap());
    assert_eq!(png.position(), 0);
    assert!(!wrapper.is_this_type_stream(&mut text).unwrap());
}

// =============================================================================
// Missing Readers
// =============================================================================

#[test]
fn test_missing_reader_is_rejected_immediately() {
    let is_null = |err: ReaderError| matches!(err, ReaderError::Argument(ArgumentError::NullReader));

    assert!(is_null(ReaderWrapper::try_wrap(None).err().unwrap()));
    assert!(is_null(ChannelSeparator::try_wrap(None).err().unwrap()));
    assert!(is_null(PlaneCache::try_wrap(None, 4).err().unwrap()));
}

// =============================================================================
// Derived Channel Counts
// =============================================================================

/// Decorator that reports only the first time point.
struct FirstTimepoint {
    reader: Box<dyn FormatReader>,
}

impl bioreader::ReaderDecorator for FirstTimepoint {
    fn reader(&self) -> &dyn FormatReader {
        self.reader.as_ref()
    }

    fn reader_mut(&mut self) -> &mut dyn FormatReader {
        self.reader.as_mut()
    }

    fn size_t(&self) -> usize {
        1
    }

    fn image_count(&self) -> usize {
        self.reader.image_count() / self.reader.size_t()
    }
}

/// Decorator that claims twice as many planes, without touching Z or T.
struct DoubledPlanes {
    reader: Box<dyn FormatReader>,
}

impl bioreader::ReaderDecorator for DoubledPlanes {
    fn reader(&self) -> &dyn FormatReader {
        self.reader.as_ref()
    }

    fn reader_mut(&mut self) -> &mut dyn FormatReader {
        self.reader.as_mut()
    }

    fn image_count(&self) -> usize {
        self.reader.image_count() * 2
    }
}

#[test]
fn test_effective_channels_use_decorator_counts() {
    let id = "d&sizeX=4&sizeY=4&sizeZ=3&sizeC=2&sizeT=4.fake";

    let mut first = FirstTimepoint {
        reader: Box::new(FakeReader::default()),
    };
    FormatReader::set_id(&mut first, id).unwrap();
    assert_eq!(FormatReader::image_count(&first), 6);
    assert_eq!(FormatReader::effective_size_c(&first), 2);
    assert_eq!(FormatReader::rgb_channel_count(&first), 1);

    let mut doubled = DoubledPlanes {
        reader: Box::new(FakeReader::default()),
    };
    FormatReader::set_id(&mut doubled, id).unwrap();
    assert_eq!(FormatReader::effective_size_c(&doubled), 4);
    // size C = 2 over 4 effective channels
    assert_eq!(FormatReader::rgb_channel_count(&doubled), 0);
}

// =============================================================================
// Stacking
// =============================================================================

#[test]
fn test_stacked_decorators() {
    let tracking = TrackingReader::fake();
    let counters = tracking.counters();
    let mut reader = ReaderWrapper::new(PlaneCache::new(ChannelSeparator::new(tracking)));
    reader.set_id("s&sizeX=4&sizeY=4&sizeC=3&rgb=3&interleaved=true.fake").unwrap();

    assert_eq!(counters.opens(), 1);
    assert_eq!(reader.image_count(), 3);

    let chain = reader.underlying_readers();
    assert_eq!(chain.len(), 1);
    let separator = chain[0].underlying_readers()[0];
    assert_eq!(separator.image_count(), 3);
    assert_eq!(separator.underlying_readers()[0].image_count(), 1);

    for no in 0..3 {
        assert_eq!(reader.open_bytes(no).unwrap().len(), 16);
    }
    // One source decode, shared by the three separated channels
    assert_eq!(counters.decodes(), 1);
}

#[test]
fn test_listeners_registered_through_decorator() {
    let listener = RecordingListener::shared();
    let mut wrapper = ReaderWrapper::new(FakeReader::default());
    wrapper.add_status_listener(as_listener(&listener));

    assert_eq!(wrapper.status_listeners().len(), 1);
    wrapper.set_id("l&sizeX=2&sizeY=2.fake").unwrap();
    assert!(listener.count() >= 2);

    let events = listener.events();
    assert_eq!(events.last().unwrap().progress, events.last().unwrap().total);
}
