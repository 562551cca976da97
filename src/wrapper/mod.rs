//! Decorators: readers that wrap another reader.
//!
//! - [`ReaderWrapper`]: forwards everything, the base to build on
//! - [`ChannelSeparator`]: one plane per RGB sub-channel
//! - [`PlaneCache`]: keeps recently decoded planes in memory
//!
//! Decorators own the reader they wrap and can be stacked:
//!
//! ```rust,no_run
//! use bioreader::{ChannelSeparator, FormatReader, ImageReader, PlaneCache};
//!
//! let mut reader = PlaneCache::new(ChannelSeparator::new(ImageReader::new()));
//! reader.set_id("cells.png")?;
//! let red = reader.open_bytes(0)?;
//! # Ok::<(), bioreader::ReaderError>(())
//! ```

mod channel_separator;
mod decorator;
mod plane_cache;
mod reader_wrapper;

pub use channel_separator::ChannelSeparator;
pub use decorator::ReaderDecorator;
pub use plane_cache::{PlaneCache, DEFAULT_PLANE_CACHE_CAPACITY};
pub use reader_wrapper::ReaderWrapper;
