// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::fs;
use std::io;
use std::io::Read;
use std::io::Seek;
use std::path;

use tracebuf_decode::ByteSource;

/// A dumped trace buffer on disk, read through explicit seeks.
///
/// Every read first seeks to the requested position, so the ring's logical
/// order (head is rarely at the start of the event region) is honored
/// without relying on the file's sequential position.
#[derive(Debug)]
pub struct InputFile {
    inner: fs::File,
    inner_pos: u64,
    inner_len: u64,
}

impl InputFile {
    /// Opens `path` for reading and records its length.
    pub fn open(path: impl AsRef<path::Path>) -> io::Result<Self> {
        let mut options = fs::OpenOptions::new();
        options.read(true);

        #[cfg(windows)]
        {
            use std::os::windows::fs::OpenOptionsExt;
            const FILE_SHARE_READ: u32 = 0x00000001;
            const FILE_SHARE_DELETE: u32 = 0x00000004;
            options.share_mode(FILE_SHARE_READ | FILE_SHARE_DELETE);
        }

        let mut file = Self {
            inner: options.open(path)?,
            inner_pos: 0,
            inner_len: 0,
        };
        file.update_len()?;
        return Ok(file);
    }

    /// Length of the file when it was opened.
    pub fn len(&self) -> u64 {
        self.inner_len
    }

    /// Returns true if the file is empty.
    pub fn is_empty(&self) -> bool {
        self.inner_len == 0
    }

    /// Current file position.
    pub fn pos(&self) -> u64 {
        self.inner_pos
    }

    fn update_len(&mut self) -> io::Result<()> {
        self.inner_len = self.inner.metadata()?.len();
        return Ok(());
    }

    /// Seeks to `new_pos`. Fails if `new_pos` is past the end of the file.
    pub fn seek_absolute(&mut self, new_pos: u64) -> io::Result<u64> {
        if new_pos > self.inner_len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "seek past end of file",
            ));
        }

        self.inner_pos = self.inner.seek(io::SeekFrom::Start(new_pos))?;
        return Ok(self.inner_pos);
    }

    /// Fills `buf` from the current position.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.inner.read_exact(buf)?;
        self.inner_pos += buf.len() as u64;
        return Ok(());
    }
}

impl ByteSource for InputFile {
    fn len(&self) -> u64 {
        return self.inner_len;
    }

    fn bytes_at<'a>(&'a mut self, pos: u64, scratch: &'a mut [u8]) -> io::Result<&'a [u8]> {
        self.seek_absolute(pos)?;
        self.read_exact(scratch)?;
        return Ok(scratch);
    }
}
