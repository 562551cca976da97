//! Stream access used by format sniffing.

mod stream;

pub use stream::{read_prefix, RandomAccess, DEFAULT_SNIFF_BYTES};
