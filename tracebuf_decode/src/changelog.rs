// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! Release history

#[allow(unused_imports)]
use crate::*; // For docs

/// # v0.1.0 (2026-10-19)
/// - Initial release: [`TraceHeader`] v1/v2 parsing, [`RingCursor`],
///   [`TraceContext`] event walk, [`ClockNameTable`], [`TracePrinter`].
pub mod v0_1_0 {}
