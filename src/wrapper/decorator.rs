//! Forwarding base for readers that wrap another reader.
//!
//! A decorator implements [`ReaderDecorator`] by handing out its wrapped
//! reader; every contract operation then forwards to that reader unless the
//! decorator overrides it. The blanket impl at the bottom turns any
//! decorator into a [`FormatReader`].
//!
//! Two operations are derived rather than forwarded:
//! `effective_size_c` and `rgb_channel_count` are computed from the
//! decorator's own `image_count`, `size_z`, `size_t` and `size_c`, so a
//! decorator that changes the plane count stays consistent. Nothing is
//! cached here; every query reaches the wrapped reader.

use std::sync::Arc;

use bytes::Bytes;
use image::DynamicImage;
use serde_json::Value;

use crate::error::Result;
use crate::io::RandomAccess;
use crate::metadata::{MetadataStoreRef, MetadataTable, MetadataValue};
use crate::model::{self, CoreMetadata, DimensionOrder, PixelType, Region, ZctCoords};
use crate::reader::{FileGrouping, FormatReader, LookupTable};
use crate::status::StatusListener;

/// A reader that delegates to another reader.
///
/// Only [`reader`](ReaderDecorator::reader) and
/// [`reader_mut`](ReaderDecorator::reader_mut) are required.
pub trait ReaderDecorator: Send {
    /// The wrapped reader.
    fn reader(&self) -> &dyn FormatReader;

    fn reader_mut(&mut self) -> &mut dyn FormatReader;

    // -------------------------------------------------------------------------
    // Format identification
    // -------------------------------------------------------------------------

    fn format_name(&self) -> &str {
        self.reader().format_name()
    }

    fn suffixes(&self) -> &[&'static str] {
        self.reader().suffixes()
    }

    fn is_this_type(&self, name: &str, open: bool) -> bool {
        self.reader().is_this_type(name, open)
    }

    fn is_this_type_name(&self, name: &str) -> bool {
        self.reader().is_this_type_name(name)
    }

    fn is_this_type_bytes(&self, block: &[u8]) -> bool {
        self.reader().is_this_type_bytes(block)
    }

    fn is_this_type_stream(&self, stream: &mut dyn RandomAccess) -> Result<bool> {
        self.reader().is_this_type_stream(stream)
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    fn set_id(&mut self, id: &str) -> Result<()> {
        self.reader_mut().set_id(id)
    }

    fn close_with(&mut self, file_only: bool) -> Result<()> {
        self.reader_mut().close_with(file_only)
    }

    fn close(&mut self) -> Result<()> {
        self.reader_mut().close()
    }

    // -------------------------------------------------------------------------
    // Dimensions
    // -------------------------------------------------------------------------

    fn size_x(&self) -> usize {
        self.reader().size_x()
    }

    fn size_y(&self) -> usize {
        self.reader().size_y()
    }

    fn size_z(&self) -> usize {
        self.reader().size_z()
    }

    fn size_c(&self) -> usize {
        self.reader().size_c()
    }

    fn size_t(&self) -> usize {
        self.reader().size_t()
    }

    fn pixel_type(&self) -> PixelType {
        self.reader().pixel_type()
    }

    fn image_count(&self) -> usize {
        self.reader().image_count()
    }

    fn effective_size_c(&self) -> usize {
        model::effective_size_c(
            <Self as ReaderDecorator>::image_count(self),
            <Self as ReaderDecorator>::size_z(self),
            <Self as ReaderDecorator>::size_t(self),
        )
    }

    fn rgb_channel_count(&self) -> usize {
        model::rgb_channel_count(
            <Self as ReaderDecorator>::size_c(self),
            <Self as ReaderDecorator>::effective_size_c(self),
        )
    }

    fn thumb_size_x(&self) -> usize {
        self.reader().thumb_size_x()
    }

    fn thumb_size_y(&self) -> usize {
        self.reader().thumb_size_y()
    }

    fn dimension_order(&self) -> DimensionOrder {
        self.reader().dimension_order()
    }

    fn is_order_certain(&self) -> bool {
        self.reader().is_order_certain()
    }

    fn is_rgb(&self) -> bool {
        self.reader().is_rgb()
    }

    fn is_indexed(&self) -> bool {
        self.reader().is_indexed()
    }

    fn is_false_color(&self) -> bool {
        self.reader().is_false_color()
    }

    fn is_little_endian(&self) -> bool {
        self.reader().is_little_endian()
    }

    fn is_interleaved(&self) -> bool {
        self.reader().is_interleaved()
    }

    fn is_interleaved_at(&self, sub_c: usize) -> bool {
        self.reader().is_interleaved_at(sub_c)
    }

    fn channel_dim_lengths(&self) -> Vec<usize> {
        self.reader().channel_dim_lengths()
    }

    fn channel_dim_types(&self) -> Vec<String> {
        self.reader().channel_dim_types()
    }

    // -------------------------------------------------------------------------
    // Lookup tables
    // -------------------------------------------------------------------------

    fn lut_8bit(&mut self) -> Result<Option<LookupTable<u8>>> {
        self.reader_mut().lut_8bit()
    }

    fn lut_16bit(&mut self) -> Result<Option<LookupTable<u16>>> {
        self.reader_mut().lut_16bit()
    }

    // -------------------------------------------------------------------------
    // Plane arithmetic
    // -------------------------------------------------------------------------

    fn plane_index(&self, z: usize, c: usize, t: usize) -> Result<usize> {
        self.reader().plane_index(z, c, t)
    }

    fn zct_coords(&self, index: usize) -> Result<ZctCoords> {
        self.reader().zct_coords(index)
    }

    // -------------------------------------------------------------------------
    // Pixel access
    // -------------------------------------------------------------------------

    fn open_bytes_region_into(&mut self, no: usize, buf: &mut [u8], region: Region) -> Result<()> {
        self.reader_mut().open_bytes_region_into(no, buf, region)
    }

    fn open_bytes_into(&mut self, no: usize, buf: &mut [u8]) -> Result<()> {
        self.reader_mut().open_bytes_into(no, buf)
    }

    fn open_bytes_region(&mut self, no: usize, region: Region) -> Result<Bytes> {
        self.reader_mut().open_bytes_region(no, region)
    }

    fn open_bytes(&mut self, no: usize) -> Result<Bytes> {
        self.reader_mut().open_bytes(no)
    }

    fn open_image_region(&mut self, no: usize, region: Region) -> Result<DynamicImage> {
        self.reader_mut().open_image_region(no, region)
    }

    fn open_image(&mut self, no: usize) -> Result<DynamicImage> {
        self.reader_mut().open_image(no)
    }

    fn open_thumb_image(&mut self, no: usize) -> Result<DynamicImage> {
        self.reader_mut().open_thumb_image(no)
    }

    fn open_thumb_bytes(&mut self, no: usize) -> Result<Bytes> {
        self.reader_mut().open_thumb_bytes(no)
    }

    // -------------------------------------------------------------------------
    // Series and file groups
    // -------------------------------------------------------------------------

    fn series_count(&self) -> usize {
        self.reader().series_count()
    }

    fn set_series(&mut self, series: usize) -> Result<()> {
        self.reader_mut().set_series(series)
    }

    fn series(&self) -> usize {
        self.reader().series()
    }

    fn set_group_files(&mut self, group: bool) {
        self.reader_mut().set_group_files(group)
    }

    fn is_group_files(&self) -> bool {
        self.reader().is_group_files()
    }

    fn file_group_option(&mut self, id: &str) -> Result<FileGrouping> {
        self.reader_mut().file_group_option(id)
    }

    fn used_files(&self) -> Vec<String> {
        self.reader().used_files()
    }

    fn current_file(&self) -> Option<&str> {
        self.reader().current_file()
    }

    // -------------------------------------------------------------------------
    // Metadata
    // -------------------------------------------------------------------------

    fn is_metadata_complete(&self) -> bool {
        self.reader().is_metadata_complete()
    }

    fn set_normalized(&mut self, normalize: bool) {
        self.reader_mut().set_normalized(normalize)
    }

    fn is_normalized(&self) -> bool {
        self.reader().is_normalized()
    }

    fn set_metadata_collected(&mut self, collect: bool) {
        self.reader_mut().set_metadata_collected(collect)
    }

    fn is_metadata_collected(&self) -> bool {
        self.reader().is_metadata_collected()
    }

    fn set_original_metadata_populated(&mut self, populate: bool) {
        self.reader_mut().set_original_metadata_populated(populate)
    }

    fn is_original_metadata_populated(&self) -> bool {
        self.reader().is_original_metadata_populated()
    }

    fn set_metadata_filtered(&mut self, filter: bool) {
        self.reader_mut().set_metadata_filtered(filter)
    }

    fn is_metadata_filtered(&self) -> bool {
        self.reader().is_metadata_filtered()
    }

    fn metadata_value(&self, field: &str) -> Option<&MetadataValue> {
        self.reader().metadata_value(field)
    }

    fn metadata(&self) -> &MetadataTable {
        self.reader().metadata()
    }

    fn core_metadata(&self) -> &[CoreMetadata] {
        self.reader().core_metadata()
    }

    fn set_metadata_store(&mut self, store: MetadataStoreRef) {
        self.reader_mut().set_metadata_store(store)
    }

    fn metadata_store(&self) -> MetadataStoreRef {
        self.reader().metadata_store()
    }

    fn metadata_store_root(&self) -> Option<Value> {
        self.reader().metadata_store_root()
    }

    // -------------------------------------------------------------------------
    // Introspection and status
    // -------------------------------------------------------------------------

    fn underlying_readers(&self) -> Vec<&dyn FormatReader> {
        vec![self.reader()]
    }

    fn add_status_listener(&mut self, listener: Arc<dyn StatusListener>) {
        self.reader_mut().add_status_listener(listener)
    }

    fn remove_status_listener(&mut self, listener: &Arc<dyn StatusListener>) {
        self.reader_mut().remove_status_listener(listener)
    }

    fn status_listeners(&self) -> Vec<Arc<dyn StatusListener>> {
        self.reader().status_listeners()
    }
}

// =============================================================================
// Blanket FormatReader impl
// =============================================================================

impl<D: ReaderDecorator> FormatReader for D {
    fn format_name(&self) -> &str {
        ReaderDecorator::format_name(self)
    }

    fn suffixes(&self) -> &[&'static str] {
        ReaderDecorator::suffixes(self)
    }

    fn is_this_type(&self, name: &str, open: bool) -> bool {
        ReaderDecorator::is_this_type(self, name, open)
    }

    fn is_this_type_name(&self, name: &str) -> bool {
        ReaderDecorator::is_this_type_name(self, name)
    }

    fn is_this_type_bytes(&self, block: &[u8]) -> bool {
        ReaderDecorator::is_this_type_bytes(self, block)
    }

    fn is_this_type_stream(&self, stream: &mut dyn RandomAccess) -> Result<bool> {
        ReaderDecorator::is_this_type_stream(self, stream)
    }

    fn set_id(&mut self, id: &str) -> Result<()> {
        ReaderDecorator::set_id(self, id)
    }

    fn close_with(&mut self, file_only: bool) -> Result<()> {
        ReaderDecorator::close_with(self, file_only)
    }

    fn close(&mut self) -> Result<()> {
        ReaderDecorator::close(self)
    }

    fn size_x(&self) -> usize {
        ReaderDecorator::size_x(self)
    }

    fn size_y(&self) -> usize {
        ReaderDecorator::size_y(self)
    }

    fn size_z(&self) -> usize {
        ReaderDecorator::size_z(self)
    }

    fn size_c(&self) -> usize {
        ReaderDecorator::size_c(self)
    }

    fn size_t(&self) -> usize {
        ReaderDecorator::size_t(self)
    }

    fn pixel_type(&self) -> PixelType {
        ReaderDecorator::pixel_type(self)
    }

    fn image_count(&self) -> usize {
        ReaderDecorator::image_count(self)
    }

    fn effective_size_c(&self) -> usize {
        ReaderDecorator::effective_size_c(self)
    }

    fn rgb_channel_count(&self) -> usize {
        ReaderDecorator::rgb_channel_count(self)
    }

    fn thumb_size_x(&self) -> usize {
        ReaderDecorator::thumb_size_x(self)
    }

    fn thumb_size_y(&self) -> usize {
        ReaderDecorator::thumb_size_y(self)
    }

    fn dimension_order(&self) -> DimensionOrder {
        ReaderDecorator::dimension_order(self)
    }

    fn is_order_certain(&self) -> bool {
        ReaderDecorator::is_order_certain(self)
    }

    fn is_rgb(&self) -> bool {
        ReaderDecorator::is_rgb(self)
    }

    fn is_indexed(&self) -> bool {
        ReaderDecorator::is_indexed(self)
    }

    fn is_false_color(&self) -> bool {
        ReaderDecorator::is_false_color(self)
    }

    fn is_little_endian(&self) -> bool {
        ReaderDecorator::is_little_endian(self)
    }

    fn is_interleaved(&self) -> bool {
        ReaderDecorator::is_interleaved(self)
    }

    fn is_interleaved_at(&self, sub_c: usize) -> bool {
        ReaderDecorator::is_interleaved_at(self, sub_c)
    }

    fn channel_dim_lengths(&self) -> Vec<usize> {
        ReaderDecorator::channel_dim_lengths(self)
    }

    fn channel_dim_types(&self) -> Vec<String> {
        ReaderDecorator::channel_dim_types(self)
    }

    fn lut_8bit(&mut self) -> Result<Option<LookupTable<u8>>> {
        ReaderDecorator::lut_8bit(self)
    }

    fn lut_16bit(&mut self) -> Result<Option<LookupTable<u16>>> {
        ReaderDecorator::lut_16bit(self)
    }

    fn plane_index(&self, z: usize, c: usize, t: usize) -> Result<usize> {
        ReaderDecorator::plane_index(self, z, c, t)
    }

    fn zct_coords(&self, index: usize) -> Result<ZctCoords> {
        ReaderDecorator::zct_coords(self, index)
    }

    fn open_bytes_region_into(&mut self, no: usize, buf: &mut [u8], region: Region) -> Result<()> {
        ReaderDecorator::open_bytes_region_into(self, no, buf, region)
    }

    fn open_bytes_into(&mut self, no: usize, buf: &mut [u8]) -> Result<()> {
        ReaderDecorator::open_bytes_into(self, no, buf)
    }

    fn open_bytes_region(&mut self, no: usize, region: Region) -> Result<Bytes> {
        ReaderDecorator::open_bytes_region(self, no, region)
    }

    fn open_bytes(&mut self, no: usize) -> Result<Bytes> {
        ReaderDecorator::open_bytes(self, no)
    }

    fn open_image_region(&mut self, no: usize, region: Region) -> Result<DynamicImage> {
        ReaderDecorator::open_image_region(self, no, region)
    }

    fn open_image(&mut self, no: usize) -> Result<DynamicImage> {
        ReaderDecorator::open_image(self, no)
    }

    fn open_thumb_image(&mut self, no: usize) -> Result<DynamicImage> {
        ReaderDecorator::open_thumb_image(self, no)
    }

    fn open_thumb_bytes(&mut self, no: usize) -> Result<Bytes> {
        ReaderDecorator::open_thumb_bytes(self, no)
    }

    fn series_count(&self) -> usize {
        ReaderDecorator::series_count(self)
    }

    fn set_series(&mut self, series: usize) -> Result<()> {
        ReaderDecorator::set_series(self, series)
    }

    fn series(&self) -> usize {
        ReaderDecorator::series(self)
    }

    fn set_group_files(&mut self, group: bool) {
        ReaderDecorator::set_group_files(self, group)
    }

    fn is_group_files(&self) -> bool {
        ReaderDecorator::is_group_files(self)
    }

    fn file_group_option(&mut self, id: &str) -> Result<FileGrouping> {
        ReaderDecorator::file_group_option(self, id)
    }

    fn used_files(&self) -> Vec<String> {
        ReaderDecorator::used_files(self)
    }

    fn current_file(&self) -> Option<&str> {
        ReaderDecorator::current_file(self)
    }

    fn is_metadata_complete(&self) -> bool {
        ReaderDecorator::is_metadata_complete(self)
    }

    fn set_normalized(&mut self, normalize: bool) {
        ReaderDecorator::set_normalized(self, normalize)
    }

    fn is_normalized(&self) -> bool {
        ReaderDecorator::is_normalized(self)
    }

    fn set_metadata_collected(&mut self, collect: bool) {
        ReaderDecorator::set_metadata_collected(self, collect)
    }

    fn is_metadata_collected(&self) -> bool {
        ReaderDecorator::is_metadata_collected(self)
    }

    fn set_original_metadata_populated(&mut self, populate: bool) {
        ReaderDecorator::set_original_metadata_populated(self, populate)
    }

    fn is_original_metadata_populated(&self) -> bool {
        ReaderDecorator::is_original_metadata_populated(self)
    }

    fn set_metadata_filtered(&mut self, filter: bool) {
        ReaderDecorator::set_metadata_filtered(self, filter)
    }

    fn is_metadata_filtered(&self) -> bool {
        ReaderDecorator::is_metadata_filtered(self)
    }

    fn metadata_value(&self, field: &str) -> Option<&MetadataValue> {
        ReaderDecorator::metadata_value(self, field)
    }

    fn metadata(&self) -> &MetadataTable {
        ReaderDecorator::metadata(self)
    }

    fn core_metadata(&self) -> &[CoreMetadata] {
        ReaderDecorator::core_metadata(self)
    }

    fn set_metadata_store(&mut self, store: MetadataStoreRef) {
        ReaderDecorator::set_metadata_store(self, store)
    }

    fn metadata_store(&self) -> MetadataStoreRef {
        ReaderDecorator::metadata_store(self)
    }

    fn metadata_store_root(&self) -> Option<Value> {
        ReaderDecorator::metadata_store_root(self)
    }

    fn underlying_readers(&self) -> Vec<&dyn FormatReader> {
        ReaderDecorator::underlying_readers(self)
    }

    fn add_status_listener(&mut self, listener: Arc<dyn StatusListener>) {
        ReaderDecorator::add_status_listener(self, listener)
    }

    fn remove_status_listener(&mut self, listener: &Arc<dyn StatusListener>) {
        ReaderDecorator::remove_status_listener(self, listener)
    }

    fn status_listeners(&self) -> Vec<Arc<dyn StatusListener>> {
        ReaderDecorator::status_listeners(self)
    }
}
