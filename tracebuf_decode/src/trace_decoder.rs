// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::vec;

use crate::ByteSource;
use crate::RingCursor;
use crate::SequencedEvent;
use crate::TraceError;
use crate::TraceEvent;
use crate::TraceHeader;

/// Header and ring geometry of one trace buffer, computed once per run.
///
/// Every operation takes the [`ByteSource`] explicitly, so several buffers
/// can be decoded side by side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceContext {
    header: TraceHeader,
    cursor: RingCursor,
}

impl TraceContext {
    /// Reads and validates the header at position 0 of `source` and computes
    /// the ring geometry.
    ///
    /// All fatal format errors are reported here, before any event is read:
    /// [`TraceError::InvalidMagic`], [`TraceError::UnsupportedVersion`],
    /// [`TraceError::InvalidLayout`], and [`TraceError::TruncatedInput`] when
    /// the source is shorter than the header or than the declared buffer size.
    pub fn open<S: ByteSource + ?Sized>(source: &mut S) -> Result<TraceContext, TraceError> {
        let available = source.len();
        let prefix_len = (TraceHeader::PREFIX_SIZE as u64).min(available) as usize;
        let mut scratch = [0u8; TraceHeader::PREFIX_SIZE];
        let prefix = source
            .bytes_at(0, &mut scratch[..prefix_len])
            .map_err(|e| TraceError::acquisition("read trace header", e))?;

        let header = TraceHeader::parse(prefix)?;
        if header.buffer_size as u64 > available {
            return Err(TraceError::TruncatedInput {
                needed: header.buffer_size as u64,
                available,
            });
        }

        let cursor = RingCursor::build(&header, 0)?;
        return Ok(TraceContext { header, cursor });
    }

    /// Creates a context from an already-validated header and cursor.
    pub fn new(header: TraceHeader, cursor: RingCursor) -> Self {
        return Self { header, cursor };
    }

    /// The parsed header.
    pub fn header(&self) -> &TraceHeader {
        return &self.header;
    }

    /// The ring geometry.
    pub fn cursor(&self) -> &RingCursor {
        return &self.cursor;
    }

    /// Reads the 48-bit timestamp of the event at `slot`.
    pub fn slot_timestamp<S: ByteSource + ?Sized>(
        &self,
        source: &mut S,
        slot: u32,
    ) -> Result<u64, TraceError> {
        let mut scratch = [0u8; 6];
        let bytes = source
            .bytes_at(self.cursor.slot_position(slot), &mut scratch)
            .map_err(|e| TraceError::acquisition("read event timestamp", e))?;
        return Ok(TraceEvent::read_timestamp(self.header.byte_reader, bytes));
    }

    /// Reads and decodes the event at `slot`. `scratch` must hold at least
    /// one event.
    pub fn read_slot<S: ByteSource + ?Sized>(
        &self,
        source: &mut S,
        slot: u32,
        scratch: &mut [u8],
    ) -> Result<TraceEvent, TraceError> {
        let event_size = self.cursor.event_size() as usize;
        let bytes = source
            .bytes_at(self.cursor.slot_position(slot), &mut scratch[..event_size])
            .map_err(|e| TraceError::acquisition(format!("read event slot {}", slot), e))?;
        return Ok(TraceEvent::decode(&self.header, bytes));
    }

    /// Returns the timestamp stored at the head slot.
    pub fn head_timestamp<S: ByteSource + ?Sized>(&self, source: &mut S) -> Result<u64, TraceError> {
        return self.slot_timestamp(source, self.cursor.head_slot());
    }

    /// Returns true if the trace is empty: head and tail coincide and the
    /// head slot carries the zero timestamp sentinel.
    pub fn is_empty<S: ByteSource + ?Sized>(&self, source: &mut S) -> Result<bool, TraceError> {
        let head_timestamp = self.head_timestamp(source)?;
        return Ok(self.cursor.is_empty(head_timestamp));
    }

    /// Returns an iterator over the events from head to tail, inclusive.
    ///
    /// The iterator yields nothing for an empty trace. Sequence numbers start
    /// at the header's head sequence number.
    pub fn events<'src, S: ByteSource + ?Sized>(&self, source: &'src mut S) -> EventWalk<'src, S> {
        return EventWalk::new(*self, source);
    }
}

/// Iterator over the events of a trace, oldest first.
///
/// Starts at the head slot and follows [`RingCursor::next`] until the tail
/// slot has been produced. Never visits more than `slot_count` slots.
#[derive(Debug)]
pub struct EventWalk<'src, S: ByteSource + ?Sized> {
    context: TraceContext,
    source: &'src mut S,
    scratch: vec::Vec<u8>,
    slot: u32,
    seqnum: u32,
    visited: u32,
    started: bool,
    done: bool,
}

impl<'src, S: ByteSource + ?Sized> EventWalk<'src, S> {
    fn new(context: TraceContext, source: &'src mut S) -> Self {
        return Self {
            scratch: vec![0u8; context.cursor.event_size() as usize],
            slot: context.cursor.head_slot(),
            seqnum: context.header.head_seqnum,
            visited: 0,
            started: false,
            done: false,
            context,
            source,
        };
    }

    fn step(&mut self) -> Result<Option<SequencedEvent>, TraceError> {
        let cursor = self.context.cursor;

        if !self.started {
            self.started = true;
            if self.context.is_empty(self.source)? {
                return Ok(None);
            }
        }

        if self.visited >= cursor.slot_count() {
            return Ok(None);
        }

        let slot = self.slot;
        let event = self.context.read_slot(self.source, slot, &mut self.scratch)?;
        if event.timestamp == 0 {
            log::warn!(
                "slot {} was never written; stopping before tail slot {}",
                slot,
                cursor.tail_slot()
            );
            return Ok(None);
        }

        let item = SequencedEvent {
            seqnum: self.seqnum,
            slot,
            event,
        };

        self.visited += 1;
        self.seqnum = self.seqnum.wrapping_add(1);
        if slot == cursor.tail_slot() {
            self.visited = cursor.slot_count();
        } else {
            self.slot = cursor.next(slot);
        }

        return Ok(Some(item));
    }
}

impl<'src, S: ByteSource + ?Sized> Iterator for EventWalk<'src, S> {
    type Item = Result<SequencedEvent, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.step();
        if !matches!(result, Ok(Some(_))) {
            self.done = true;
        }

        return result.transpose();
    }
}
