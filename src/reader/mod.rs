//! The reader contract and the shared machinery behind concrete readers.

mod base;
mod contract;
pub mod pixels;

pub use base::{BaseReader, FormatBackend, ParseContext, ReaderState};
pub use contract::{plane_layout, FileGrouping, FormatReader, LookupTable};
