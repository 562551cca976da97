//! The default reader: picks a backend for each file it is given.

use std::sync::Arc;

use tracing::info;

use crate::error::{ArgumentError, FormatError, Result};
use crate::io::RandomAccess;
use crate::metadata::MetadataStoreRef;
use crate::reader::{FileGrouping, FormatReader};
use crate::status::StatusListener;
use crate::wrapper::ReaderDecorator;

use super::{FakeReader, RasterReader};

/// Dispatches to the first candidate reader that recognises a file.
///
/// Options, the metadata store and status listeners are applied to every
/// candidate, so whichever one is picked behaves as configured. All other
/// operations go to the reader picked by the last `set_id`.
pub struct ImageReader {
    readers: Vec<Box<dyn FormatReader>>,
    current: usize,
    suffixes: Vec<&'static str>,
}

impl ImageReader {
    /// All bundled formats.
    pub fn new() -> Self {
        Self::from_candidates(vec![
            Box::new(FakeReader::default()),
            Box::new(RasterReader::default()),
        ])
    }

    /// Dispatch over `readers`, tried in order.
    pub fn with_readers(readers: Vec<Box<dyn FormatReader>>) -> Result<Self> {
        if readers.is_empty() {
            return Err(ArgumentError::NullReader.into());
        }
        Ok(Self::from_candidates(readers))
    }

    fn from_candidates(readers: Vec<Box<dyn FormatReader>>) -> Self {
        let mut suffixes: Vec<&'static str> = Vec::new();
        for reader in &readers {
            for suffix in reader.suffixes() {
                if !suffixes.contains(suffix) {
                    suffixes.push(suffix);
                }
            }
        }
        Self {
            readers,
            current: 0,
            suffixes,
        }
    }

    /// Candidate readers, in the order they are tried.
    pub fn readers(&self) -> impl Iterator<Item = &dyn FormatReader> + '_ {
        self.readers.iter().map(|reader| reader.as_ref())
    }

    /// Index of the reader for `id`: a name match wins over a header match.
    fn pick(&self, id: &str) -> Result<usize> {
        let by_name = self.readers.iter().position(|r| r.is_this_type(id, false));
        by_name
            .or_else(|| self.readers.iter().position(|r| r.is_this_type(id, true)))
            .ok_or_else(|| {
                FormatError::UnsupportedFormat {
                    reason: format!("no reader recognises {id}"),
                }
                .into()
            })
    }
}

impl Default for ImageReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ReaderDecorator for ImageReader {
    fn reader(&self) -> &dyn FormatReader {
        self.readers[self.current].as_ref()
    }

    fn reader_mut(&mut self) -> &mut dyn FormatReader {
        self.readers[self.current].as_mut()
    }

    fn suffixes(&self) -> &[&'static str] {
        &self.suffixes
    }

    fn is_this_type(&self, name: &str, open: bool) -> bool {
        self.readers.iter().any(|r| r.is_this_type(name, open))
    }

    fn is_this_type_name(&self, name: &str) -> bool {
        self.readers.iter().any(|r| r.is_this_type_name(name))
    }

    fn is_this_type_bytes(&self, block: &[u8]) -> bool {
        self.readers.iter().any(|r| r.is_this_type_bytes(block))
    }

    fn is_this_type_stream(&self, stream: &mut dyn RandomAccess) -> Result<bool> {
        for reader in &self.readers {
            if reader.is_this_type_stream(stream)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn set_id(&mut self, id: &str) -> Result<()> {
        let index = match self.pick(id) {
            Ok(index) => index,
            Err(err) => {
                self.readers[self.current].close()?;
                return Err(err);
            }
        };
        if index != self.current {
            self.readers[self.current].close()?;
            self.current = index;
        }
        let reader = &mut self.readers[index];
        info!(id, format = reader.format_name(), "Selected reader");
        reader.set_id(id)
    }

    fn file_group_option(&mut self, id: &str) -> Result<FileGrouping> {
        let index = self.pick(id)?;
        self.readers[index].file_group_option(id)
    }

    fn set_group_files(&mut self, group: bool) {
        for reader in &mut self.readers {
            reader.set_group_files(group);
        }
    }

    fn set_normalized(&mut self, normalize: bool) {
        for reader in &mut self.readers {
            reader.set_normalized(normalize);
        }
    }

    fn set_metadata_collected(&mut self, collect: bool) {
        for reader in &mut self.readers {
            reader.set_metadata_collected(collect);
        }
    }

    fn set_original_metadata_populated(&mut self, populate: bool) {
        for reader in &mut self.readers {
            reader.set_original_metadata_populated(populate);
        }
    }

    fn set_metadata_filtered(&mut self, filter: bool) {
        for reader in &mut self.readers {
            reader.set_metadata_filtered(filter);
        }
    }

    fn set_metadata_store(&mut self, store: MetadataStoreRef) {
        for reader in &mut self.readers {
            reader.set_metadata_store(Arc::clone(&store));
        }
    }

    fn add_status_listener(&mut self, listener: Arc<dyn StatusListener>) {
        for reader in &mut self.readers {
            reader.add_status_listener(Arc::clone(&listener));
        }
    }

    fn remove_status_listener(&mut self, listener: &Arc<dyn StatusListener>) {
        for reader in &mut self.readers {
            reader.remove_status_listener(listener);
        }
    }

    fn underlying_readers(&self) -> Vec<&dyn FormatReader> {
        self.readers().collect()
    }
}
