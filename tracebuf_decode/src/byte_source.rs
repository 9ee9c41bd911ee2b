// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::io;

/// Random-access read capability over the bytes of one trace buffer.
///
/// Position 0 is the first byte of the trace header. The ring cursor and the
/// decoder depend only on this trait, never on the concrete source.
pub trait ByteSource {
    /// Total number of bytes available from this source.
    fn len(&self) -> u64;

    /// Returns true if the source has no bytes.
    fn is_empty(&self) -> bool {
        return self.len() == 0;
    }

    /// Returns the `scratch.len()` bytes starting at `pos`.
    ///
    /// Sources that can address their bytes directly return a borrowed
    /// sub-slice and leave `scratch` untouched. Sources that cannot (files)
    /// read into `scratch` and return it. Fails with
    /// `io::ErrorKind::UnexpectedEof` if the range extends past `len()`.
    fn bytes_at<'a>(&'a mut self, pos: u64, scratch: &'a mut [u8]) -> io::Result<&'a [u8]>;
}

/// Returns the `len` bytes starting at `pos` within `data`, or an
/// `UnexpectedEof` error if the range is out of bounds.
pub fn slice_at(data: &[u8], pos: u64, len: usize) -> io::Result<&[u8]> {
    let start = usize::try_from(pos).ok();
    let end = start.and_then(|start| start.checked_add(len));
    return match (start, end) {
        (Some(start), Some(end)) if end <= data.len() => Ok(&data[start..end]),
        _ => Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "read past end of trace buffer",
        )),
    };
}

/// [`ByteSource`] over an in-memory byte slice.
#[derive(Clone, Copy, Debug)]
pub struct SliceSource<'dat> {
    data: &'dat [u8],
}

impl<'dat> SliceSource<'dat> {
    /// Creates a source over `data`.
    pub fn new(data: &'dat [u8]) -> Self {
        return Self { data };
    }

    /// Returns the underlying bytes.
    pub fn data(&self) -> &'dat [u8] {
        return self.data;
    }
}

impl<'dat> ByteSource for SliceSource<'dat> {
    fn len(&self) -> u64 {
        return self.data.len() as u64;
    }

    fn bytes_at<'a>(&'a mut self, pos: u64, scratch: &'a mut [u8]) -> io::Result<&'a [u8]> {
        return slice_at(self.data, pos, scratch.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_source_borrows() {
        let data = [1u8, 2, 3, 4, 5];
        let mut source = SliceSource::new(&data);
        let mut scratch = [0u8; 2];
        let bytes = source.bytes_at(3, &mut scratch).unwrap();
        assert_eq!(&[4, 5], bytes);
        assert_eq!(data[3..].as_ptr(), bytes.as_ptr());
        assert_eq!(5, source.len());
        assert!(!source.is_empty());
    }

    #[test]
    fn slice_source_bounds() {
        let data = [0u8; 4];
        let mut source = SliceSource::new(&data);
        let mut scratch = [0u8; 2];
        assert_eq!(
            io::ErrorKind::UnexpectedEof,
            source.bytes_at(3, &mut scratch).unwrap_err().kind()
        );
        assert_eq!(
            io::ErrorKind::UnexpectedEof,
            source.bytes_at(u64::MAX, &mut scratch).unwrap_err().kind()
        );
        assert!(source.bytes_at(2, &mut scratch).is_ok());
    }
}
