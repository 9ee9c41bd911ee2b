// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::fs;
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path;
use std::ptr;
use std::slice;

use tracebuf_decode::slice_at;
use tracebuf_decode::ByteSource;
use tracebuf_decode::TraceError;
use tracebuf_decode::TraceHeader;

/// A read-only, shared mapping of a physical memory range exposed through a
/// memory device such as `/dev/mem`.
///
/// The mapping is page-aligned internally; [`MappedRegion::as_slice`] exposes
/// exactly `len` bytes starting at the requested address. The mapping is
/// released when the region is dropped, on every exit path.
#[derive(Debug)]
pub struct MappedRegion {
    map_base: *mut libc::c_void,
    map_len: usize,
    page_offset: usize,
    len: usize,
}

impl MappedRegion {
    /// Maps `len` bytes of `device` starting at `phys_addr`.
    ///
    /// The device is opened read-only with `O_SYNC` so that reads are not
    /// served from a stale cache. `len` must cover at least the header prefix.
    pub fn map(device: &path::Path, phys_addr: u64, len: u64) -> Result<Self, TraceError> {
        if len < TraceHeader::PREFIX_SIZE as u64 {
            return Err(TraceError::TruncatedInput {
                needed: TraceHeader::PREFIX_SIZE as u64,
                available: len,
            });
        }

        let len = usize::try_from(len).map_err(|_| {
            TraceError::InvalidLayout(format!("length {} exceeds address space", len))
        })?;

        let file = fs::OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_SYNC)
            .open(device)
            .map_err(|e| TraceError::acquisition(format!("open {}", device.display()), e))?;

        let page_size = page_size();
        let page_offset = (phys_addr % page_size) as usize;
        let aligned_addr = phys_addr - page_offset as u64;
        let map_len = page_offset + len;
        let file_offset = libc::off_t::try_from(aligned_addr).map_err(|_| {
            TraceError::InvalidLayout(format!("address 0x{:x} out of range", phys_addr))
        })?;

        // SAFETY: the descriptor is valid for the duration of the call, the
        // offset is page-aligned, and the result is checked before use.
        let map_base = unsafe {
            libc::mmap(
                ptr::null_mut(),
                map_len,
                libc::PROT_READ,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                file_offset,
            )
        };
        if map_base == libc::MAP_FAILED {
            return Err(TraceError::acquisition(
                format!("mmap 0x{:x}+{} of {}", phys_addr, len, device.display()),
                io::Error::last_os_error(),
            ));
        }

        log::debug!(
            "mapped 0x{:x} ({} bytes, page offset {}) from {}",
            phys_addr,
            len,
            page_offset,
            device.display()
        );

        // The mapping stays valid after the descriptor is closed.
        drop(file);
        return Ok(Self {
            map_base,
            map_len,
            page_offset,
            len,
        });
    }

    /// Number of mapped bytes visible through [`MappedRegion::as_slice`].
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no bytes are visible.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The mapped bytes, starting at the requested physical address.
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: map_base..map_base+map_len is a live PROT_READ mapping owned
        // by self, and page_offset + len == map_len.
        return unsafe {
            slice::from_raw_parts(
                (self.map_base as *const u8).add(self.page_offset),
                self.len,
            )
        };
    }
}

impl Drop for MappedRegion {
    fn drop(&mut self) {
        // SAFETY: map_base/map_len came from a successful mmap and are
        // unmapped exactly once.
        let result = unsafe { libc::munmap(self.map_base, self.map_len) };
        if result != 0 {
            log::warn!("munmap failed: {}", io::Error::last_os_error());
        }
    }
}

impl ByteSource for MappedRegion {
    fn len(&self) -> u64 {
        return self.len as u64;
    }

    fn bytes_at<'a>(&'a mut self, pos: u64, scratch: &'a mut [u8]) -> io::Result<&'a [u8]> {
        return slice_at(self.as_slice(), pos, scratch.len());
    }
}

fn page_size() -> u64 {
    // SAFETY: sysconf has no preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    return if size > 0 { size as u64 } else { 4096 };
}
