// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

#![warn(missing_docs)]
#![allow(clippy::needless_return)]

//! Dump and decode firmware circular trace buffers
//!
//! The `tracebuf` binary maps a live buffer from physical memory (located
//! explicitly or through debugfs), then either copies it verbatim to a file
//! or decodes it with [`tracebuf_decode`]. Dumped files are decoded through
//! [`InputFile`], which feeds the same decoder through explicit seeks.

pub use config::ToolConfig;
pub use discovery::DebugfsPaths;
pub use discovery::LiveBuffer;
pub use error::ToolError;
pub use input_file::InputFile;
#[cfg(unix)]
pub use mapped_region::MappedRegion;
pub use options::command;
pub use options::LiveLocation;
pub use options::Mode;
pub use options::Options;
pub use output_file::dump_to_file;
pub use runner::run;
pub use runner::RunOutcome;

pub mod changelog;
pub mod discovery;

mod config;
mod error;
mod input_file;
#[cfg(unix)]
mod mapped_region;
mod options;
mod output_file;
mod runner;
