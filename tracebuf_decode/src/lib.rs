// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

#![warn(missing_docs)]
#![allow(clippy::needless_return)]

//! Circular trace buffer decoding
//!
//! A trace buffer is a fixed binary [`TraceHeader`] followed by a ring of
//! fixed-size event slots. [`TraceContext::open`] validates the header of any
//! [`ByteSource`], [`RingCursor`] describes the ring, and
//! [`TraceContext::events`] walks it from head to tail.

pub use byte_reader::TraceByteReader;
pub use byte_source::slice_at;
pub use byte_source::ByteSource;
pub use byte_source::SliceSource;
pub use clock_names::ClockNameTable;
pub use error::TraceError;
pub use ring_cursor::RingCursor;
pub use trace_decoder::EventWalk;
pub use trace_decoder::TraceContext;
pub use trace_event::SequencedEvent;
pub use trace_event::TraceEvent;
pub use trace_event::TraceEventKind;
pub use trace_event::TIMESTAMP_MAX;
pub use trace_header::MagicDisplay;
pub use trace_header::TraceFlags;
pub use trace_header::TraceHeader;
pub use trace_printer::PrintOutcome;
pub use trace_printer::TracePrinter;
pub mod _internal;
pub mod changelog;
pub mod display;

mod byte_reader;
mod byte_source;
mod clock_names;
mod error;
mod ring_cursor;
mod trace_decoder;
mod trace_event;
mod trace_header;
mod trace_printer;
