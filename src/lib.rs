//! # bioreader
//!
//! A uniform reader contract for multi-dimensional microscopy images, plus a
//! decorator base for readers that wrap other readers.
//!
//! Every image is a set of series; every series is a stack of 2D planes
//! addressed by focal position (Z), channel (C) and time point (T). A
//! [`FormatReader`] opens a file with [`FormatReader::set_id`], answers
//! dimensional queries about the current series and decodes planes or
//! regions of planes on demand.
//!
//! ## Features
//!
//! - **One contract for every format**: backends implement [`FormatBackend`]
//!   and get the full [`FormatReader`] through [`BaseReader`]
//! - **Decorators**: [`ReaderDecorator`] forwards everything by default;
//!   [`ChannelSeparator`] and [`PlaneCache`] are built on it
//! - **Metadata**: original key/value metadata and a caller-owned
//!   [`MetadataStore`]
//! - **Progress**: [`StatusListener`]s receive [`StatusEvent`]s while files
//!   are opened
//!
//! ## Architecture
//!
//! - [`model`] - pixel types, dimension orders, core metadata, regions
//! - [`metadata`] - metadata tables, filtering and stores
//! - [`reader`] - the contract, the backend trait and shared reader state
//! - [`mod@format`] - bundled backends and [`ImageReader`]
//! - [`wrapper`] - decorators
//! - [`status`] - progress notification
//! - [`config`] - reader options
//!
//! ## Example
//!
//! ```rust
//! use bioreader::{FormatReader, ImageReader, ReaderWrapper};
//!
//! let mut reader = ReaderWrapper::new(ImageReader::new());
//! reader.set_id("demo&sizeX=64&sizeY=64&sizeZ=3&sizeC=2&sizeT=4.fake")?;
//!
//! assert_eq!(reader.image_count(), 24);
//! let no = reader.plane_index(1, 1, 2)?;
//! let plane = reader.open_bytes(no)?;
//! assert_eq!(plane.len(), 64 * 64);
//! # Ok::<(), bioreader::ReaderError>(())
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod io;
pub mod metadata;
pub mod model;
pub mod reader;
pub mod status;
pub mod wrapper;

// Re-export commonly used types
pub use config::ReaderOptions;
pub use error::{ArgumentError, FormatError, IoError, ReaderError, Result};
pub use format::{FakeReader, ImageReader, RasterReader};
pub use io::RandomAccess;
pub use metadata::{
    DummyMetadata, MemoryMetadataStore, MetadataStore, MetadataStoreRef, MetadataTable,
    MetadataValue,
};
pub use model::{CoreMetadata, DimensionOrder, PixelType, PlaneLayout, Region, ZctCoords};
pub use reader::{BaseReader, FileGrouping, FormatBackend, FormatReader, ParseContext, ReaderState};
pub use status::{StatusEvent, StatusListener, StatusReporter};
pub use wrapper::{ChannelSeparator, PlaneCache, ReaderDecorator, ReaderWrapper};
