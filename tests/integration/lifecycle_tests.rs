//! Reader lifecycle integration tests.
//!
//! Tests verify:
//! - Plane index arithmetic for a Z=3, C=2, T=4 stack
//! - Defaults before `set_id`, and argument errors for pixel access
//! - Closing, reopening and series selection
//! - Status listeners and metadata stores across reopen

use bioreader::reader::FormatReader;
use bioreader::{
    ArgumentError, DimensionOrder, FakeReader, MemoryMetadataStore, MetadataStore, MetadataValue,
    PixelType, ReaderError, ReaderWrapper, Region, ZctCoords,
};

use super::test_utils::{as_listener, RecordingListener};

const STACK: &str = "stack&sizeX=64&sizeY=48&sizeZ=3&sizeC=2&sizeT=4.fake";

fn open(id: &str) -> FakeReader {
    let mut reader = FakeReader::default();
    reader.set_id(id).unwrap();
    reader
}

// =============================================================================
// Plane Arithmetic
// =============================================================================

#[test]
fn test_stack_dimensions() {
    let reader = open(STACK);

    assert_eq!(reader.image_count(), 24);
    assert_eq!(reader.effective_size_c(), 2);
    assert_eq!(reader.rgb_channel_count(), 1);
    assert_eq!(reader.dimension_order(), DimensionOrder::XYZCT);
    assert_eq!(reader.pixel_type(), PixelType::Uint8);
}

#[test]
fn test_stack_plane_index() {
    let reader = open(STACK);

    assert_eq!(reader.plane_index(0, 0, 0).unwrap(), 0);
    assert_eq!(reader.plane_index(1, 1, 2).unwrap(), 16);
    assert_eq!(reader.plane_index(2, 1, 3).unwrap(), 23);
    assert_eq!(reader.zct_coords(16).unwrap(), ZctCoords::new(1, 1, 2));
}

#[test]
fn test_every_order_round_trips() {
    for order in DimensionOrder::ALL {
        let id = format!("o&sizeX=2&sizeY=2&sizeZ=3&sizeC=2&sizeT=4&dimOrder={order}.fake");
        let reader = open(&id);
        assert_eq!(reader.dimension_order(), order);

        let mut seen = vec![false; reader.image_count()];
        for z in 0..3 {
            for c in 0..2 {
                for t in 0..4 {
                    let no = reader.plane_index(z, c, t).unwrap();
                    assert!(!seen[no], "{order}: plane {no} reached twice");
                    seen[no] = true;
                    assert_eq!(reader.zct_coords(no).unwrap(), ZctCoords::new(z, c, t));
                }
            }
        }
        assert!(seen.into_iter().all(|s| s));
    }
}

#[test]
fn test_out_of_range_coordinates() {
    let reader = open(STACK);

    let err = reader.plane_index(3, 0, 0).unwrap_err();
    assert!(matches!(
        err,
        ReaderError::Argument(ArgumentError::CoordinateOutOfRange { axis: 'Z', .. })
    ));
    assert!(reader.plane_index(0, 2, 0).unwrap_err().is_argument_error());
    assert!(reader.zct_coords(24).unwrap_err().is_argument_error());
}

#[test]
fn test_planes_differ_by_index() {
    let mut reader = open(STACK);
    let no = reader.plane_index(1, 1, 2).unwrap();

    let plane = reader.open_bytes(no).unwrap();
    assert_eq!(plane.len(), 64 * 48);
    // x + y + 32 * no, truncated to u8
    assert_eq!(plane[0], (32 * 16 % 256) as u8);
    assert_ne!(plane, reader.open_bytes(no + 1).unwrap());
}

// =============================================================================
// Unopened Readers
// =============================================================================

#[test]
fn test_defaults_before_set_id() {
    let reader = FakeReader::default();

    assert_eq!(reader.size_x(), 0);
    assert_eq!(reader.image_count(), 0);
    assert_eq!(reader.effective_size_c(), 0);
    assert_eq!(reader.rgb_channel_count(), 0);
    assert_eq!(reader.series_count(), 0);
    assert_eq!(reader.current_file(), None);
    assert!(reader.used_files().is_empty());
    assert!(reader.metadata().is_empty());
    assert!(reader.core_metadata().is_empty());
    assert!(reader.is_group_files());
    assert!(reader.is_metadata_collected());
}

#[test]
fn test_pixel_access_before_set_id() {
    let mut reader = FakeReader::default();

    let not_open = |err: ReaderError| matches!(err, ReaderError::Argument(ArgumentError::NotOpen));
    assert!(not_open(reader.open_bytes(0).unwrap_err()));
    assert!(not_open(reader.open_bytes_region(0, Region::new(0, 0, 1, 1)).unwrap_err()));
    assert!(not_open(reader.open_image(0).unwrap_err()));
    assert!(not_open(reader.open_thumb_bytes(0).unwrap_err()));
}

#[test]
fn test_pixel_argument_errors() {
    let mut reader = open(STACK);

    assert!(matches!(
        reader.open_bytes(24).unwrap_err(),
        ReaderError::Argument(ArgumentError::PlaneOutOfRange { index: 24, count: 24 })
    ));
    assert!(reader
        .open_bytes_region(0, Region::new(60, 0, 8, 8))
        .unwrap_err()
        .is_argument_error());

    let mut small = vec![0u8; 10];
    assert!(matches!(
        reader.open_bytes_into(0, &mut small).unwrap_err(),
        ReaderError::Argument(ArgumentError::BufferTooSmall { .. })
    ));
}

// =============================================================================
// Close and Reopen
// =============================================================================

#[test]
fn test_close_resets_reader() {
    let mut reader = open(STACK);
    reader.close().unwrap();

    assert_eq!(reader.current_file(), None);
    assert_eq!(reader.image_count(), 0);
    assert!(reader.open_bytes(0).unwrap_err().is_argument_error());
}

#[test]
fn test_close_file_only_keeps_metadata() {
    let mut reader = open(STACK);
    reader.close_with(true).unwrap();

    assert_eq!(reader.current_file(), Some(STACK));
    assert_eq!(reader.image_count(), 24);
    assert_eq!(reader.open_bytes(3).unwrap().len(), 64 * 48);
}

#[test]
fn test_reopen_replaces_series() {
    let mut reader = open("many&sizeX=4&sizeY=4&series=5.fake");
    reader.set_series(4).unwrap();
    reader.close_with(true).unwrap();

    reader.set_id("one&sizeX=8&sizeY=2.fake").unwrap();
    assert_eq!(reader.series_count(), 1);
    assert_eq!(reader.series(), 0);
    assert_eq!(reader.size_x(), 8);
    assert_eq!(reader.used_files(), vec!["one&sizeX=8&sizeY=2.fake".to_string()]);
}

#[test]
fn test_failed_set_id_leaves_reader_closed() {
    let mut reader = open(STACK);
    let err = reader.set_id("bad&sizeZ=zero.fake").unwrap_err();

    assert!(err.is_format_error());
    assert_eq!(reader.current_file(), None);
    assert_eq!(reader.series_count(), 0);
}

#[test]
fn test_set_id_twice_reinitializes() {
    let mut reader = open("twice&sizeX=4&sizeY=4&series=3.fake");
    reader.set_series(2).unwrap();
    reader.set_id("twice&sizeX=4&sizeY=4&series=3.fake").unwrap();
    assert_eq!(reader.series(), 0);
}

// =============================================================================
// Series Selection
// =============================================================================

#[test]
fn test_series_out_of_range_keeps_selection() {
    let mut reader = open("s&sizeX=4&sizeY=4&series=3.fake");
    reader.set_series(1).unwrap();

    let err = reader.set_series(3).unwrap_err();
    assert!(matches!(
        err,
        ReaderError::Argument(ArgumentError::SeriesOutOfRange { series: 3, count: 3 })
    ));
    assert_eq!(reader.series(), 1);
}

#[test]
fn test_series_select_pixels() {
    let mut reader = open("s&sizeX=4&sizeY=4&series=3.fake");
    reader.set_series(2).unwrap();
    let plane = reader.open_bytes(0).unwrap();
    assert_eq!(plane[0], 128);
}

// =============================================================================
// Status and Metadata
// =============================================================================

#[test]
fn test_removed_listener_stops_receiving() {
    let kept = RecordingListener::shared();
    let removed = RecordingListener::shared();
    let mut reader = FakeReader::default();
    reader.add_status_listener(as_listener(&kept));
    reader.add_status_listener(as_listener(&removed));

    reader.set_id(STACK).unwrap();
    let before = removed.count();
    assert!(before > 0);
    assert_eq!(kept.count(), before);

    reader.remove_status_listener(&as_listener(&removed));
    assert_eq!(reader.status_listeners().len(), 1);

    reader.set_id(STACK).unwrap();
    assert_eq!(removed.count(), before);
    assert_eq!(kept.count(), 2 * before);
}

#[test]
fn test_status_events_bracket_set_id() {
    let listener = RecordingListener::shared();
    let mut reader = FakeReader::default();
    reader.add_status_listener(as_listener(&listener));
    reader.set_id("b&sizeX=4&sizeY=4&series=2.fake").unwrap();

    let events = listener.events();
    let first = events.first().unwrap();
    let last = events.last().unwrap();
    assert_eq!((first.progress, first.total), (0, 1));
    assert_eq!((last.progress, last.total), (1, 1));
    assert!(events.iter().any(|e| e.message == "Series 2"));
}

#[test]
fn test_original_metadata() {
    let reader = open(STACK);
    assert_eq!(reader.metadata_value("sizeZ"), Some(&MetadataValue::from("3")));
    assert_eq!(reader.metadata_value("missing"), None);
}

#[test]
fn test_metadata_collection_disabled() {
    let store = MemoryMetadataStore::shared();
    let mut reader = FakeReader::default();
    reader.set_metadata_store(store.clone());
    reader.set_metadata_collected(false);
    reader.set_id(STACK).unwrap();

    assert!(reader.metadata().is_empty());
    assert_eq!(store.image_count(), 0);
}

#[test]
fn test_store_refilled_on_reopen() {
    let store = MemoryMetadataStore::shared();
    let mut reader = ReaderWrapper::new(FakeReader::default());
    reader.set_metadata_store(store.clone());
    reader.set_original_metadata_populated(true);

    reader.set_id("first&sizeX=4&sizeY=4&series=3.fake").unwrap();
    assert_eq!(store.image_count(), 3);

    reader.set_id("second&sizeX=4&sizeY=4&sizeT=7.fake").unwrap();
    let root = store.root().unwrap();
    assert_eq!(store.image_count(), 1);
    assert_eq!(root["images"][0]["name"], "second");
    assert_eq!(root["images"][0]["pixels"]["size_t"], 7);
    assert_eq!(root["originalMetadata"]["sizeT"], "7");
}
