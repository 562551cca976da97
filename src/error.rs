use thiserror::Error;

/// Errors returned by every operation of the reader contract.
///
/// Three kinds exist: content that does not match the expected encoding
/// ([`FormatError`]), storage that could not be read ([`IoError`]), and
/// misuse by the caller ([`ArgumentError`]). Decorators pass all three
/// through unchanged.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// Content does not conform to the reader's encoding
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Underlying storage could not be read
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Invalid argument or call sequence
    #[error("Invalid argument: {0}")]
    Argument(#[from] ArgumentError),
}

impl ReaderError {
    /// True for content errors; another reader may still succeed.
    pub fn is_format_error(&self) -> bool {
        matches!(self, ReaderError::Format(_))
    }

    /// True for storage errors.
    pub fn is_io_error(&self) -> bool {
        matches!(self, ReaderError::Io(_))
    }

    /// True for caller misuse (bad indices, regions, buffers, unopened reader).
    pub fn is_argument_error(&self) -> bool {
        matches!(self, ReaderError::Argument(_))
    }
}

impl From<std::io::Error> for ReaderError {
    fn from(err: std::io::Error) -> Self {
        ReaderError::Io(IoError::Stream(err))
    }
}

/// Errors related to format detection and decoding
#[derive(Debug, Clone, Error)]
pub enum FormatError {
    /// No reader recognises the content
    #[error("Unsupported format: {reason}")]
    UnsupportedFormat { reason: String },

    /// The parsed dimensions break the plane-count invariants
    #[error("Malformed reader state: {0}")]
    Malformed(String),

    /// Dimension order is not one of the six XY-prefixed permutations
    #[error("Unknown dimension order: {0:?}")]
    UnknownDimensionOrder(String),

    /// Pixel type name not recognised
    #[error("Unknown pixel type: {0:?}")]
    UnknownPixelType(String),

    /// Pixel layout cannot be represented (e.g. as an `image` buffer)
    #[error("Unsupported pixel layout: {0}")]
    UnsupportedPixelLayout(String),

    /// The identifier could not be interpreted by the reader
    #[error("Invalid id {id:?}: {reason}")]
    InvalidId { id: String, reason: String },

    /// Pixel data could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

/// I/O errors that can occur when reading image files
#[derive(Debug, Error)]
pub enum IoError {
    /// File does not exist
    #[error("File not found: {0}")]
    NotFound(String),

    /// File exists but could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error from a caller-supplied stream
    #[error("Stream error: {0}")]
    Stream(#[from] std::io::Error),
}

impl IoError {
    /// Classify an I/O failure on `path`.
    pub fn from_path(path: &str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            IoError::NotFound(path.to_string())
        } else {
            IoError::Read {
                path: path.to_string(),
                source,
            }
        }
    }
}

/// Caller errors, raised synchronously at the offending call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// A decorator was given no reader to wrap
    #[error("Format reader cannot be null")]
    NullReader,

    /// The operation needs an open file
    #[error("No file is open; call set_id first")]
    NotOpen,

    /// Series index outside `[0, count)`
    #[error("Series {series} out of range (series count is {count})")]
    SeriesOutOfRange { series: usize, count: usize },

    /// Plane index outside `[0, image_count)`
    #[error("Plane {index} out of range (image count is {count})")]
    PlaneOutOfRange { index: usize, count: usize },

    /// Z, C or T coordinate outside its axis
    #[error("{axis} coordinate {value} out of range (size is {size})")]
    CoordinateOutOfRange { axis: char, value: usize, size: usize },

    /// Region not contained in the plane
    #[error("Region {x},{y} {width}x{height} exceeds plane {size_x}x{size_y}")]
    RegionOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        size_x: usize,
        size_y: usize,
    },

    /// Region byte size overflows `usize`
    #[error("Region {width}x{height} is too large to address")]
    RegionTooLarge { width: usize, height: usize },

    /// Caller-supplied buffer cannot hold the requested pixels
    #[error("Buffer too small: need {required} bytes, got {actual}")]
    BufferTooSmall { required: usize, actual: usize },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ReaderError>;
