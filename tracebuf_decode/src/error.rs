// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::io;
use std::path;

/// Errors reported while acquiring, parsing, or walking a trace buffer.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// The first 4 bytes are not the trace magic word in either byte order.
    /// The buffer is uninitialized or corrupt.
    #[error("tracelog not initialized (magic 0x{found:08x})")]
    InvalidMagic {
        /// The first 4 bytes, read as little-endian.
        found: u32,
    },

    /// Fewer bytes are available than the header declares.
    #[error("truncated input: need {needed} bytes, have {available}")]
    TruncatedInput {
        /// Bytes required.
        needed: u64,
        /// Bytes actually available.
        available: u64,
    },

    /// The header's major version does not have a known event layout.
    #[error("unsupported trace format version {major}.{minor}")]
    UnsupportedVersion {
        /// Major version from the header.
        major: u8,
        /// Minor version from the header.
        minor: u8,
    },

    /// Header fields describe an event region that cannot be walked.
    #[error("invalid trace layout: {0}")]
    InvalidLayout(String),

    /// Opening, mapping, seeking or reading the trace source failed.
    #[error("{what}: {source}")]
    Acquisition {
        /// The operation that failed.
        what: String,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },

    /// Writing the decoded output failed.
    #[error("write output: {0}")]
    Output(#[source] io::Error),

    /// The clock-name table could not be loaded. Never fatal.
    #[error("cannot load clock names from {}: {source}", .path.display())]
    ResolverLoad {
        /// Path of the clock-name table.
        path: path::PathBuf,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },
}

impl TraceError {
    /// Short name of the stage that failed, for one-line diagnostics.
    pub fn stage(&self) -> &'static str {
        return match self {
            TraceError::InvalidMagic { .. }
            | TraceError::TruncatedInput { .. }
            | TraceError::UnsupportedVersion { .. }
            | TraceError::InvalidLayout(_) => "header",
            TraceError::Acquisition { .. } => "acquire",
            TraceError::Output(_) => "output",
            TraceError::ResolverLoad { .. } => "clock names",
        };
    }

    /// Wraps an I/O error from the trace source.
    pub fn acquisition(what: impl Into<String>, source: io::Error) -> Self {
        return TraceError::Acquisition {
            what: what.into(),
            source,
        };
    }
}
