//! Shared reader state and the generic reader built from a format backend.
//!
//! A format only has to say how to recognise its files, how to parse one
//! into per-series [`CoreMetadata`] and how to decode a region of a plane.
//! [`BaseReader`] adds everything else the contract asks for: option
//! flags, series selection, argument checks, the metadata store and status
//! notifications.

use std::fs::File;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{ArgumentError, FormatError, ReaderError, Result};
use crate::format::has_suffix;
use crate::io::{read_prefix, DEFAULT_SNIFF_BYTES};
use crate::metadata::{
    DummyMetadata, MetadataFilter, MetadataStoreRef, MetadataTable, MetadataValue,
};
use crate::model::{check_buffer, CoreMetadata, DimensionOrder, PixelType, Region};
use crate::status::{StatusListener, StatusReporter};

use super::contract::{FileGrouping, FormatReader, LookupTable};

static EMPTY_CORE: CoreMetadata = CoreMetadata::EMPTY;

// =============================================================================
// Backend trait
// =============================================================================

/// The format-specific half of a reader.
pub trait FormatBackend: Send {
    /// Human-readable format name.
    fn name(&self) -> &'static str;

    /// Recognised file suffixes, without the dot.
    fn suffixes(&self) -> &'static [&'static str];

    /// Whether `block`, the start of a file, belongs to this format.
    fn is_this_type_bytes(&self, block: &[u8]) -> bool;

    /// Name check, falling back to sniffing the file header when `open` is
    /// set and the suffix does not match.
    fn is_this_type_name(&self, name: &str, open: bool) -> bool {
        if has_suffix(name, self.suffixes()) {
            return true;
        }
        if !open {
            return false;
        }
        let Ok(mut file) = File::open(name) else {
            return false;
        };
        read_prefix(&mut file, DEFAULT_SNIFF_BYTES)
            .map(|block| self.is_this_type_bytes(&block))
            .unwrap_or(false)
    }

    /// Parse `id`, registering every series with `ctx`.
    fn parse(&mut self, id: &str, ctx: &mut ParseContext<'_>) -> Result<()>;

    /// Decode `region` of plane `no` of the current series into `buf`.
    ///
    /// The reader has already checked that a file is open, that `no` and
    /// `region` are in range and that `buf` is large enough.
    fn read_region(
        &mut self,
        state: &ReaderState,
        no: usize,
        buf: &mut [u8],
        region: Region,
    ) -> Result<()>;

    fn lut_8bit(&mut self, _state: &ReaderState) -> Result<Option<LookupTable<u8>>> {
        Ok(None)
    }

    fn lut_16bit(&mut self, _state: &ReaderState) -> Result<Option<LookupTable<u16>>> {
        Ok(None)
    }

    fn file_group_option(&self, _id: &str) -> FileGrouping {
        FileGrouping::CannotGroup
    }

    /// Release file handles. With `file_only == false` also drop anything
    /// parsed from the file.
    fn close_file(&mut self, _file_only: bool) -> Result<()> {
        Ok(())
    }
}

// =============================================================================
// Reader state
// =============================================================================

/// State every reader carries between calls.
pub struct ReaderState {
    current_id: Option<String>,
    core: Vec<CoreMetadata>,
    series: usize,
    metadata: MetadataTable,
    used_files: Vec<String>,

    group_files: bool,
    normalized: bool,
    metadata_collected: bool,
    original_metadata_populated: bool,
    metadata_filtered: bool,

    store: MetadataStoreRef,
    status: StatusReporter,
}

impl Default for ReaderState {
    fn default() -> Self {
        Self {
            current_id: None,
            core: Vec::new(),
            series: 0,
            metadata: MetadataTable::new(),
            used_files: Vec::new(),
            group_files: true,
            normalized: false,
            metadata_collected: true,
            original_metadata_populated: false,
            metadata_filtered: false,
            store: Arc::new(DummyMetadata),
            status: StatusReporter::new(),
        }
    }
}

impl ReaderState {
    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    pub fn series(&self) -> usize {
        self.series
    }

    /// Core metadata of the current series; all zeroes when nothing is open.
    pub fn core(&self) -> &CoreMetadata {
        self.core.get(self.series).unwrap_or(&EMPTY_CORE)
    }

    pub fn all_core(&self) -> &[CoreMetadata] {
        &self.core
    }

    pub fn metadata(&self) -> &MetadataTable {
        &self.metadata
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Forget the open file. Options, store and listeners survive.
    fn reset(&mut self) {
        self.current_id = None;
        self.core.clear();
        self.series = 0;
        self.metadata.clear();
        self.used_files.clear();
    }
}

// =============================================================================
// Parse context
// =============================================================================

/// What a backend fills in while parsing a file.
pub struct ParseContext<'a> {
    series: Vec<(String, CoreMetadata)>,
    metadata: MetadataTable,
    used_files: Vec<String>,
    filter: MetadataFilter,
    collect: bool,
    group_files: bool,
    status: &'a StatusReporter,
}

struct Parsed {
    series: Vec<(String, CoreMetadata)>,
    metadata: MetadataTable,
    used_files: Vec<String>,
}

impl<'a> ParseContext<'a> {
    fn new(state: &'a ReaderState) -> Self {
        Self {
            series: Vec::new(),
            metadata: MetadataTable::new(),
            used_files: Vec::new(),
            filter: MetadataFilter::new(state.metadata_filtered),
            collect: state.metadata_collected,
            group_files: state.group_files,
            status: &state.status,
        }
    }

    /// Register the next series. Derived fields left at zero are filled in.
    pub fn add_series(&mut self, name: impl Into<String>, mut core: CoreMetadata) {
        core.finish();
        self.series.push((name.into(), core));
    }

    /// Record an original metadata entry, subject to collection and
    /// filtering.
    pub fn add_meta(&mut self, key: &str, value: impl Into<MetadataValue>) {
        if !self.collect {
            return;
        }
        if let Some((key, value)) = self.filter.apply(key, value.into()) {
            self.metadata.insert(key, value);
        }
    }

    pub fn add_used_file(&mut self, path: impl Into<String>) {
        self.used_files.push(path.into());
    }

    pub fn is_group_files(&self) -> bool {
        self.group_files
    }

    /// Report intermediate parsing progress.
    pub fn status(&self, progress: usize, total: usize, message: impl Into<String>) {
        self.status.notify(progress, total, message);
    }

    fn finish(self, id: &str) -> Result<Parsed> {
        if self.series.is_empty() {
            return Err(FormatError::Malformed(format!("{id} contains no series")).into());
        }
        for (name, core) in &self.series {
            core.validate().map_err(|err| match err {
                ReaderError::Format(FormatError::Malformed(msg)) => {
                    FormatError::Malformed(format!("series {name:?}: {msg}")).into()
                }
                other => other,
            })?;
        }
        let mut used_files = self.used_files;
        if used_files.is_empty() {
            used_files.push(id.to_string());
        }
        Ok(Parsed {
            series: self.series,
            metadata: self.metadata,
            used_files,
        })
    }
}

// =============================================================================
// BaseReader
// =============================================================================

/// A complete [`FormatReader`] around a [`FormatBackend`].
pub struct BaseReader<B> {
    backend: B,
    state: ReaderState,
}

impl<B: FormatBackend> BaseReader<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: ReaderState::default(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn state(&self) -> &ReaderState {
        &self.state
    }

    fn core(&self) -> &CoreMetadata {
        self.state.core()
    }

    fn populate_store(&self, parsed: &Parsed) {
        if !self.state.metadata_collected {
            return;
        }
        let store = &self.state.store;
        store.create_root();
        for (index, (name, core)) in parsed.series.iter().enumerate() {
            store.set_image_name(index, name);
            store.set_pixels(index, core);
        }
        if self.state.original_metadata_populated {
            let mut entries: Vec<_> = parsed.metadata.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            for (key, value) in entries {
                store.set_original_metadata(key, value);
            }
        }
    }
}

impl<B: FormatBackend + Default> Default for BaseReader<B> {
    fn default() -> Self {
        Self::new(B::default())
    }
}

impl<B: FormatBackend> FormatReader for BaseReader<B> {
    fn format_name(&self) -> &str {
        self.backend.name()
    }

    fn suffixes(&self) -> &[&'static str] {
        self.backend.suffixes()
    }

    fn is_this_type(&self, name: &str, open: bool) -> bool {
        self.backend.is_this_type_name(name, open)
    }

    fn is_this_type_bytes(&self, block: &[u8]) -> bool {
        self.backend.is_this_type_bytes(block)
    }

    fn set_id(&mut self, id: &str) -> Result<()> {
        debug!(id, format = self.backend.name(), "Initializing reader");
        self.close_with(false)?;
        self.state.status.notify(0, 1, format!("Initializing {id}"));

        let mut ctx = ParseContext::new(&self.state);
        let parsed = match self.backend.parse(id, &mut ctx) {
            Ok(()) => ctx.finish(id),
            Err(err) => Err(err),
        };
        let parsed = match parsed {
            Ok(parsed) => parsed,
            Err(err) => {
                if let Err(close_err) = self.backend.close_file(false) {
                    warn!(id, error = %close_err, "Failed to release file after initialization error");
                }
                debug!(id, error = %err, "Initialization failed");
                return Err(err);
            }
        };

        self.populate_store(&parsed);

        let (names, core): (Vec<_>, Vec<_>) = parsed.series.into_iter().unzip();
        debug!(id, series = core.len(), names = ?names, "Reader initialized");
        self.state.core = core;
        self.state.metadata = parsed.metadata;
        self.state.used_files = parsed.used_files;
        self.state.series = 0;
        self.state.current_id = Some(id.to_string());

        self.state.status.notify(1, 1, format!("Initialized {id}"));
        Ok(())
    }

    fn close_with(&mut self, file_only: bool) -> Result<()> {
        self.backend.close_file(file_only)?;
        if !file_only {
            if let Some(id) = self.state.current_id.as_deref() {
                debug!(id, "Closing reader");
            }
            self.state.reset();
        }
        Ok(())
    }

    fn size_x(&self) -> usize {
        self.core().size_x
    }

    fn size_y(&self) -> usize {
        self.core().size_y
    }

    fn size_z(&self) -> usize {
        self.core().size_z
    }

    fn size_c(&self) -> usize {
        self.core().size_c
    }

    fn size_t(&self) -> usize {
        self.core().size_t
    }

    fn pixel_type(&self) -> PixelType {
        self.core().pixel_type
    }

    fn image_count(&self) -> usize {
        self.core().image_count
    }

    fn thumb_size_x(&self) -> usize {
        self.core().thumb_size_x
    }

    fn thumb_size_y(&self) -> usize {
        self.core().thumb_size_y
    }

    fn dimension_order(&self) -> DimensionOrder {
        self.core().dimension_order
    }

    fn is_order_certain(&self) -> bool {
        self.core().order_certain
    }

    fn is_rgb(&self) -> bool {
        self.core().rgb
    }

    fn is_indexed(&self) -> bool {
        self.core().indexed
    }

    fn is_false_color(&self) -> bool {
        self.core().false_color
    }

    fn is_little_endian(&self) -> bool {
        self.core().little_endian
    }

    fn is_interleaved(&self) -> bool {
        self.core().interleaved
    }

    fn channel_dim_lengths(&self) -> Vec<usize> {
        self.core().channel_dim_lengths.clone()
    }

    fn channel_dim_types(&self) -> Vec<String> {
        self.core().channel_dim_types.clone()
    }

    fn lut_8bit(&mut self) -> Result<Option<LookupTable<u8>>> {
        if !self.core().indexed {
            return Ok(None);
        }
        self.backend.lut_8bit(&self.state)
    }

    fn lut_16bit(&mut self) -> Result<Option<LookupTable<u16>>> {
        if !self.core().indexed {
            return Ok(None);
        }
        self.backend.lut_16bit(&self.state)
    }

    fn open_bytes_region_into(&mut self, no: usize, buf: &mut [u8], region: Region) -> Result<()> {
        if self.state.current_id.is_none() {
            return Err(ArgumentError::NotOpen.into());
        }
        let core = self.core();
        if no >= core.image_count {
            return Err(ArgumentError::PlaneOutOfRange {
                index: no,
                count: core.image_count,
            }
            .into());
        }
        region.check(core.size_x, core.size_y)?;
        check_buffer(
            buf,
            region.byte_len(core.rgb_channel_count(), core.pixel_type.bytes_per_pixel())?,
        )?;

        self.backend.read_region(&self.state, no, buf, region)
    }

    fn series_count(&self) -> usize {
        self.state.core.len()
    }

    fn set_series(&mut self, series: usize) -> Result<()> {
        let count = self.state.core.len();
        if series >= count {
            return Err(ArgumentError::SeriesOutOfRange { series, count }.into());
        }
        if series != self.state.series {
            debug!(series, "Switching series");
        }
        self.state.series = series;
        Ok(())
    }

    fn series(&self) -> usize {
        self.state.series
    }

    fn set_group_files(&mut self, group: bool) {
        self.state.group_files = group;
    }

    fn is_group_files(&self) -> bool {
        self.state.group_files
    }

    fn file_group_option(&mut self, id: &str) -> Result<FileGrouping> {
        Ok(self.backend.file_group_option(id))
    }

    fn used_files(&self) -> Vec<String> {
        self.state.used_files.clone()
    }

    fn current_file(&self) -> Option<&str> {
        self.state.current_id()
    }

    fn is_metadata_complete(&self) -> bool {
        self.core().metadata_complete
    }

    fn set_normalized(&mut self, normalize: bool) {
        self.state.normalized = normalize;
    }

    fn is_normalized(&self) -> bool {
        self.state.normalized
    }

    fn set_metadata_collected(&mut self, collect: bool) {
        self.state.metadata_collected = collect;
    }

    fn is_metadata_collected(&self) -> bool {
        self.state.metadata_collected
    }

    fn set_original_metadata_populated(&mut self, populate: bool) {
        self.state.original_metadata_populated = populate;
    }

    fn is_original_metadata_populated(&self) -> bool {
        self.state.original_metadata_populated
    }

    fn set_metadata_filtered(&mut self, filter: bool) {
        self.state.metadata_filtered = filter;
    }

    fn is_metadata_filtered(&self) -> bool {
        self.state.metadata_filtered
    }

    fn metadata(&self) -> &MetadataTable {
        &self.state.metadata
    }

    fn core_metadata(&self) -> &[CoreMetadata] {
        &self.state.core
    }

    fn set_metadata_store(&mut self, store: MetadataStoreRef) {
        self.state.store = store;
    }

    fn metadata_store(&self) -> MetadataStoreRef {
        Arc::clone(&self.state.store)
    }

    fn add_status_listener(&mut self, listener: Arc<dyn StatusListener>) {
        self.state.status.add(listener);
    }

    fn remove_status_listener(&mut self, listener: &Arc<dyn StatusListener>) {
        self.state.status.remove(listener);
    }

    fn status_listeners(&self) -> Vec<Arc<dyn StatusListener>> {
        self.state.status.listeners()
    }
}
