// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::path;

use crate::discovery::DebugfsPaths;

/// Host paths the tool reads from when working with a live buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolConfig {
    /// Debugfs files published by the firmware driver.
    pub debugfs: DebugfsPaths,
    /// Device exposing physical memory.
    pub mem_device: path::PathBuf,
}

impl ToolConfig {
    /// Default physical memory device.
    pub const DEFAULT_MEM_DEVICE: &'static str = "/dev/mem";

    /// Configuration rooted at the given debugfs mount point and memory device.
    pub fn new(debugfs_root: impl AsRef<path::Path>, mem_device: impl AsRef<path::Path>) -> Self {
        return Self {
            debugfs: DebugfsPaths::new(debugfs_root),
            mem_device: mem_device.as_ref().to_path_buf(),
        };
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        return Self::new(DebugfsPaths::DEFAULT_ROOT, Self::DEFAULT_MEM_DEVICE);
    }
}
