// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::io;

use crate::display::CursorDisplay;
use crate::display::EventDisplay;
use crate::display::HeaderDisplay;
use crate::display::TraceOrigin;
use crate::ByteSource;
use crate::ClockNameTable;
use crate::TraceContext;
use crate::TraceError;

/// Result of printing a trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrintOutcome {
    /// The trace was empty; the empty indicator was printed.
    Empty,
    /// This many events were printed.
    Events(u32),
}

/// Writes the decoded form of a trace: header summary, ring boundaries, then
/// one line per event from head to tail.
#[derive(Debug)]
pub struct TracePrinter<'names, W: io::Write> {
    names: &'names ClockNameTable,
    out: W,
}

impl<'names, W: io::Write> TracePrinter<'names, W> {
    /// Creates a printer that resolves clock ids through `names`.
    pub fn new(names: &'names ClockNameTable, out: W) -> Self {
        return Self { names, out };
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        return self.out;
    }

    /// Prints the header summary.
    pub fn print_header(
        &mut self,
        context: &TraceContext,
        origin: TraceOrigin,
    ) -> Result<(), TraceError> {
        writeln!(self.out, "{}", HeaderDisplay::new(context.header(), origin))
            .map_err(Self::output_error)?;
        return Ok(());
    }

    /// Prints either the empty indicator or every event from head to tail.
    /// Nothing is printed for an event that failed to read.
    pub fn print_events<S: ByteSource + ?Sized>(
        &mut self,
        context: &TraceContext,
        source: &mut S,
    ) -> Result<PrintOutcome, TraceError> {
        let header = context.header();
        let head_timestamp = context.head_timestamp(source)?;
        if context.cursor().is_empty(head_timestamp) {
            writeln!(
                self.out,
                "trace empty flags 0x{:x} ts {} on {}",
                header.flags,
                head_timestamp,
                header.flags.has_flag(crate::TraceFlags::TRACE_ON) as u8
            )
            .map_err(Self::output_error)?;
            return Ok(PrintOutcome::Empty);
        }

        writeln!(self.out, "{}", CursorDisplay::new(context.cursor()))
            .map_err(Self::output_error)?;

        let mut count = 0u32;
        for item in context.events(source) {
            let item = item?;
            writeln!(self.out, "{}", EventDisplay::new(header, self.names, &item))
                .map_err(Self::output_error)?;
            count += 1;
        }

        log::debug!("printed {} events", count);
        return Ok(PrintOutcome::Events(count));
    }

    /// Prints the header summary followed by the events.
    pub fn print_trace<S: ByteSource + ?Sized>(
        &mut self,
        context: &TraceContext,
        source: &mut S,
        origin: TraceOrigin,
    ) -> Result<PrintOutcome, TraceError> {
        self.print_header(context, origin)?;
        return self.print_events(context, source);
    }

    fn output_error(e: io::Error) -> TraceError {
        return TraceError::Output(e);
    }
}
