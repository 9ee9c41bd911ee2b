// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! Release history

#[allow(unused_imports)]
use crate::*; // For docs

/// # v0.1.0 (2026-10-19)
/// - Initial release: `tracebuf` binary with dump, file decode and live
///   decode; [`InputFile`], [`MappedRegion`] and [`LiveBuffer`] discovery.
pub mod v0_1_0 {}
