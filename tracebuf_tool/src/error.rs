// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::io;
use std::path;

use tracebuf_decode::TraceError;

/// Errors reported by the `tracebuf` tool.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The command-line options contradict each other or are incomplete.
    /// Detected before any I/O is attempted.
    #[error("{0}")]
    OptionConflict(String),

    /// Acquiring, parsing, or decoding the trace failed.
    #[error(transparent)]
    Trace(#[from] TraceError),

    /// Writing the dump file failed.
    #[error("cannot write {}: {source}", .path.display())]
    Output {
        /// Destination of the dump.
        path: path::PathBuf,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },
}

impl ToolError {
    /// Short name of the stage that failed, for one-line diagnostics.
    pub fn stage(&self) -> &'static str {
        return match self {
            ToolError::OptionConflict(_) => "options",
            ToolError::Trace(e) => e.stage(),
            ToolError::Output { .. } => "dump",
        };
    }

    pub(crate) fn conflict(message: impl Into<String>) -> Self {
        return ToolError::OptionConflict(message.into());
    }
}
