use std::io::{Read, Seek, SeekFrom};

use crate::error::IoError;

/// Bytes read from a stream when sniffing its format.
pub const DEFAULT_SNIFF_BYTES: usize = 512;

/// Seekable byte source, the stream form accepted by
/// [`is_this_type_stream`](crate::FormatReader::is_this_type_stream).
pub trait RandomAccess: Read + Seek {}

impl<T: Read + Seek> RandomAccess for T {}

/// Read up to `len` bytes from the current position, then seek back.
///
/// Returns fewer bytes when the stream ends early. Any read or seek failure
/// is reported as an [`IoError`].
pub fn read_prefix(stream: &mut dyn RandomAccess, len: usize) -> Result<Vec<u8>, IoError> {
    let start = stream.stream_position()?;

    let mut buf = Vec::with_capacity(len);
    let read = (&mut *stream).take(len as u64).read_to_end(&mut buf);

    // Restore the position even if the read failed part way.
    stream.seek(SeekFrom::Start(start))?;
    read?;

    Ok(buf)
}
