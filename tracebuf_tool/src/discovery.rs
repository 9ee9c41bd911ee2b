// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::fs;
use std::path;

use tracebuf_decode::TraceError;

/// Paths of the firmware trace files exported under debugfs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DebugfsPaths {
    /// Clock-name table (`<id> <name> ...` per line).
    pub clk_summary: path::PathBuf,
    /// Decimal size of the trace buffer in bytes.
    pub buf_size: path::PathBuf,
    /// Hexadecimal physical address of the trace buffer.
    pub phys_addr: path::PathBuf,
}

impl DebugfsPaths {
    /// Default debugfs mount point.
    pub const DEFAULT_ROOT: &'static str = "/sys/kernel/debug";

    /// Paths under the given debugfs mount point.
    pub fn new(root: impl AsRef<path::Path>) -> Self {
        let root = root.as_ref();
        let trace_dir = root.join("brcm-trace");
        return Self {
            clk_summary: root.join("brcm-scmi").join("clk_summary"),
            buf_size: trace_dir.join("buf_size"),
            phys_addr: trace_dir.join("phys_addr64"),
        };
    }
}

impl Default for DebugfsPaths {
    fn default() -> Self {
        return Self::new(Self::DEFAULT_ROOT);
    }
}

/// Physical location of a live trace buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LiveBuffer {
    /// Physical start address.
    pub phys_addr: u64,
    /// Length in bytes.
    pub len: u64,
}

impl LiveBuffer {
    /// Reads the buffer location published under debugfs.
    pub fn discover(paths: &DebugfsPaths) -> Result<Self, TraceError> {
        let phys_addr = parse_hex(&read_trimmed(&paths.phys_addr)?).ok_or_else(|| {
            TraceError::InvalidLayout(format!(
                "bad physical address in {}",
                paths.phys_addr.display()
            ))
        })?;
        let len = read_trimmed(&paths.buf_size)?.parse::<u64>().map_err(|_| {
            TraceError::InvalidLayout(format!("bad buffer size in {}", paths.buf_size.display()))
        })?;

        if phys_addr == 0 || len == 0 {
            return Err(TraceError::InvalidLayout(format!(
                "no trace buffer published (addr 0x{:x} size {})",
                phys_addr, len
            )));
        }

        log::info!("discovered trace buffer at 0x{:x} size {}", phys_addr, len);
        return Ok(Self { phys_addr, len });
    }
}

/// Parses a hexadecimal number with an optional `0x`/`0X` prefix.
pub fn parse_hex(text: &str) -> Option<u64> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    if digits.is_empty() {
        return None;
    }

    return u64::from_str_radix(digits, 16).ok();
}

fn read_trimmed(path: &path::Path) -> Result<String, TraceError> {
    let text = fs::read_to_string(path)
        .map_err(|e| TraceError::acquisition(format!("read {}", path.display()), e))?;
    return Ok(text.trim().to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publish(addr: &str, size: &str) -> (tempfile::TempDir, DebugfsPaths) {
        let dir = tempfile::tempdir().unwrap();
        let paths = DebugfsPaths::new(dir.path());
        fs::create_dir_all(paths.phys_addr.parent().unwrap()).unwrap();
        assert_eq!(paths.phys_addr.parent(), paths.buf_size.parent());
        fs::write(&paths.phys_addr, addr).unwrap();
        fs::write(&paths.buf_size, size).unwrap();
        return (dir, paths);
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(Some(0x3ff0_0000), parse_hex("3ff00000"));
        assert_eq!(Some(0x3ff0_0000), parse_hex("0x3FF00000"));
        assert_eq!(Some(0x10), parse_hex("0X10"));
        assert_eq!(None, parse_hex("0x"));
        assert_eq!(None, parse_hex("xyz"));
    }

    #[test]
    fn default_paths() {
        let paths = DebugfsPaths::default();
        assert_eq!(
            path::Path::new("/sys/kernel/debug/brcm-scmi/clk_summary"),
            paths.clk_summary
        );
        assert_eq!(
            path::Path::new("/sys/kernel/debug/brcm-trace/phys_addr64"),
            paths.phys_addr
        );
    }

    #[test]
    fn discovers_published_buffer() {
        let (_dir, paths) = publish("0x3e000000\n", "65536\n");
        assert_eq!(
            LiveBuffer {
                phys_addr: 0x3e00_0000,
                len: 65536
            },
            LiveBuffer::discover(&paths).unwrap()
        );
    }

    #[test]
    fn rejects_unpublished_buffer() {
        let (_dir, paths) = publish("0", "65536");
        assert!(matches!(
            LiveBuffer::discover(&paths),
            Err(TraceError::InvalidLayout(_))
        ));

        let (_dir, paths) = publish("3e000000", "lots");
        assert!(matches!(
            LiveBuffer::discover(&paths),
            Err(TraceError::InvalidLayout(_))
        ));
    }

    #[test]
    fn missing_debugfs_is_acquisition_error() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DebugfsPaths::new(dir.path());
        assert!(matches!(
            LiveBuffer::discover(&paths),
            Err(TraceError::Acquisition { .. })
        ));
    }
}
