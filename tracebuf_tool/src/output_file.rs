// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::fs;
use std::io;
use std::io::Write;
use std::path;

use crate::ToolError;

#[derive(Debug)]
pub(crate) struct OutputFile {
    inner: fs::File,
    inner_pos: u64,
}

impl OutputFile {
    pub fn new(path: &path::Path) -> io::Result<Self> {
        let mut options = fs::OpenOptions::new();
        options.create(true);
        options.truncate(true);
        options.write(true);

        #[cfg(windows)]
        {
            use std::os::windows::fs::OpenOptionsExt;
            const FILE_SHARE_READ: u32 = 0x00000001;
            const FILE_SHARE_DELETE: u32 = 0x00000004;
            options.share_mode(FILE_SHARE_READ | FILE_SHARE_DELETE);
        }

        return Ok(Self {
            inner: options.open(path)?,
            inner_pos: 0,
        });
    }

    pub fn pos(&self) -> u64 {
        self.inner_pos
    }

    pub fn flush(&mut self) -> io::Result<()> {
        return self.inner.flush();
    }

    pub fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.inner.write_all(data)?;
        self.inner_pos += data.len() as u64;
        return Ok(());
    }
}

/// Writes a verbatim copy of a trace buffer to `path`, replacing any
/// existing file. Returns the number of bytes written.
pub fn dump_to_file(data: &[u8], path: &path::Path) -> Result<u64, ToolError> {
    let write = || -> io::Result<u64> {
        let mut file = OutputFile::new(path)?;
        file.write_all(data)?;
        file.flush()?;
        return Ok(file.pos());
    };

    let written = write().map_err(|source| ToolError::Output {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!("wrote {} bytes to {}", written, path.display());
    return Ok(written);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.bin");
        fs::write(&path, vec![0xffu8; 64]).unwrap();

        assert_eq!(3, dump_to_file(b"abc", &path).unwrap());
        assert_eq!(b"abc".to_vec(), fs::read(&path).unwrap());
    }

    #[test]
    fn dump_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("trace.bin");
        assert!(matches!(
            dump_to_file(b"abc", &path),
            Err(ToolError::Output { .. })
        ));
    }
}
