use crate::error::{ArgumentError, Result};
use crate::format::ImageReader;
use crate::reader::FormatReader;

use super::decorator::ReaderDecorator;

/// Decorator that changes nothing.
///
/// Every operation answers exactly as the wrapped reader would. It is the
/// starting point for decorators that only need to change a few methods.
pub struct ReaderWrapper {
    reader: Box<dyn FormatReader>,
}

impl ReaderWrapper {
    pub fn new<R: FormatReader + 'static>(reader: R) -> Self {
        Self::from_boxed(Box::new(reader))
    }

    pub fn from_boxed(reader: Box<dyn FormatReader>) -> Self {
        Self { reader }
    }

    /// Wrap an optional reader, failing with
    /// [`ArgumentError::NullReader`] when there is none.
    pub fn try_wrap(reader: Option<Box<dyn FormatReader>>) -> Result<Self> {
        reader
            .map(Self::from_boxed)
            .ok_or_else(|| ArgumentError::NullReader.into())
    }

    /// Give the wrapped reader back.
    pub fn into_inner(self) -> Box<dyn FormatReader> {
        self.reader
    }
}

impl Default for ReaderWrapper {
    /// Wrap a fresh [`ImageReader`].
    fn default() -> Self {
        Self::new(ImageReader::new())
    }
}

impl ReaderDecorator for ReaderWrapper {
    fn reader(&self) -> &dyn FormatReader {
        self.reader.as_ref()
    }

    fn reader_mut(&mut self) -> &mut dyn FormatReader {
        self.reader.as_mut()
    }
}
