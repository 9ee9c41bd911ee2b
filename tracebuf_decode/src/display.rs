// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! `fmt::Display` helpers for using tracebuf_decode types with format
//! macros like [`write!`] and [`format_args!`].

use core::fmt;

use crate::ClockNameTable;
use crate::RingCursor;
use crate::SequencedEvent;
use crate::TraceHeader;

/// Where the trace bytes came from. Shown in the header summary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TraceOrigin {
    /// A previously dumped file.
    File,
    /// A live buffer mapped from physical memory.
    Memory,
}

impl fmt::Display for TraceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.pad(match self {
            TraceOrigin::File => "[file]",
            TraceOrigin::Memory => "[memory]",
        });
    }
}

/// Display implementation for the header summary (three lines, no trailing
/// newline).
#[derive(Clone, Copy, Debug)]
pub struct HeaderDisplay<'a> {
    header: &'a TraceHeader,
    origin: TraceOrigin,
}

impl<'a> HeaderDisplay<'a> {
    /// Creates a new formatter for the specified header.
    pub fn new(header: &'a TraceHeader, origin: TraceOrigin) -> Self {
        return Self { header, origin };
    }
}

impl<'a> fmt::Display for HeaderDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = self.header;
        writeln!(
            f,
            "{}: ver{}.{} {}",
            h.magic_display(),
            h.major_version,
            h.minor_version,
            self.origin
        )?;
        writeln!(
            f,
            "trcbsz {} offset 0x{:x} flags 0x{:x} tsfreq {}Hz ts in {}",
            h.buffer_size,
            h.buffer_offset,
            h.flags,
            h.clock_freq,
            if h.flags.has_flag(crate::TraceFlags::TS_TICKS) {
                "ticks"
            } else {
                "usec"
            }
        )?;
        return write!(
            f,
            "headersz {} eventsz {}",
            h.header_size(),
            h.event_size()
        );
    }
}

/// Display implementation for the ring boundaries, as byte offsets from the
/// start of the buffer.
#[derive(Clone, Copy, Debug)]
pub struct CursorDisplay<'a> {
    cursor: &'a RingCursor,
}

impl<'a> CursorDisplay<'a> {
    /// Creates a new formatter for the specified cursor.
    pub fn new(cursor: &'a RingCursor) -> Self {
        return Self { cursor };
    }
}

impl<'a> fmt::Display for CursorDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.cursor;
        return write!(
            f,
            "trace: start 0x{:x} end 0x{:x} head 0x{:x} tail 0x{:x}",
            c.start(),
            c.end(),
            c.head(),
            c.tail()
        );
    }
}

/// Display implementation for a clock id: the name from the table, or the
/// decimal id when the table has no entry.
#[derive(Clone, Copy, Debug)]
pub struct ClockDisplay<'a> {
    names: &'a ClockNameTable,
    clock_id: u32,
}

impl<'a> ClockDisplay<'a> {
    /// Creates a new formatter for the specified clock id.
    pub fn new(names: &'a ClockNameTable, clock_id: u32) -> Self {
        return Self { names, clock_id };
    }
}

impl<'a> fmt::Display for ClockDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self.names.resolve(self.clock_id) {
            Some(name) => f.pad(name),
            None => write!(f, "{}", self.clock_id),
        };
    }
}

/// Display implementation for one decoded event line (no trailing newline):
///
/// `#<seq> [<sec>.<usec>] cpu<N> <kind> clk=<name> <value>[ <unit>][ st=<status>][ aux=<aux>]`
#[derive(Clone, Copy, Debug)]
pub struct EventDisplay<'a> {
    header: &'a TraceHeader,
    names: &'a ClockNameTable,
    item: &'a SequencedEvent,
}

impl<'a> EventDisplay<'a> {
    /// Creates a new formatter for the specified event.
    pub fn new(header: &'a TraceHeader, names: &'a ClockNameTable, item: &'a SequencedEvent) -> Self {
        return Self {
            header,
            names,
            item,
        };
    }
}

impl<'a> fmt::Display for EventDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let event = &self.item.event;
        let usec = event.timestamp_usec(self.header);
        write!(
            f,
            "#{:<6} [{:>6}.{:06}] cpu{} {} clk={} {}",
            self.item.seqnum,
            usec / 1_000_000,
            usec % 1_000_000,
            event.cpu,
            event.kind,
            ClockDisplay::new(self.names, event.clock_id as u32),
            event.value
        )?;

        let unit = event.kind.value_unit();
        if !unit.is_empty() {
            write!(f, " {}", unit)?;
        }

        if event.status != 0 {
            write!(f, " st={}", event.status)?;
        }

        if let Some(aux) = event.aux {
            write!(f, " aux={}", aux)?;
        }

        return Ok(());
    }
}
