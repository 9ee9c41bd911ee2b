// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

#![doc(hidden)]
//! Internal implementation details for tracebuf_tool and tests.
//! Contents subject to change without notice.

use std::vec;

use crate::TraceByteReader;
use crate::TraceEvent;
use crate::TraceFlags;
use crate::TraceHeader;

/// Builds the raw bytes of a trace buffer: header, event slots, and optional
/// dead space after the last whole slot.
#[derive(Clone, Debug)]
pub struct TraceImageBuilder {
    header: TraceHeader,
    slot_count: u32,
    dead_space: u32,
    slots: vec::Vec<Option<TraceEvent>>,
}

impl TraceImageBuilder {
    /// A little-endian v1 buffer with `slot_count` empty slots, head and tail
    /// at slot 0.
    pub fn new(slot_count: u32) -> Self {
        return Self::with_version(1, 0, slot_count);
    }

    /// A little-endian buffer of the given format version with `slot_count`
    /// empty slots.
    pub fn with_version(major_version: u8, minor_version: u8, slot_count: u32) -> Self {
        let event_size = TraceHeader::event_size_for_version(major_version)
            .unwrap_or(TraceHeader::EVENT_SIZE_V1);
        let buffer_offset = TraceHeader::PREFIX_SIZE as u32;
        return Self {
            header: TraceHeader {
                major_version,
                minor_version,
                buffer_size: buffer_offset + slot_count * event_size,
                buffer_offset,
                flags: TraceFlags::TRACE_ON,
                clock_freq: 27_000_000,
                head_offset: 0,
                tail_offset: 0,
                head_seqnum: 0,
                byte_reader: TraceByteReader::LITTLE_ENDIAN,
            },
            slot_count,
            dead_space: 0,
            slots: vec![None; slot_count as usize],
        };
    }

    /// Selects the producer byte order.
    pub fn byte_reader(mut self, byte_reader: TraceByteReader) -> Self {
        self.header.byte_reader = byte_reader;
        return self;
    }

    /// Sets head and tail as slot indexes.
    pub fn head_tail(mut self, head_slot: u32, tail_slot: u32) -> Self {
        let event_size = self.header.event_size();
        self.header.head_offset = head_slot * event_size;
        self.header.tail_offset = tail_slot * event_size;
        return self;
    }

    /// Sets the head sequence number.
    pub fn head_seqnum(mut self, head_seqnum: u32) -> Self {
        self.header.head_seqnum = head_seqnum;
        return self;
    }

    /// Sets the header flags.
    pub fn flags(mut self, flags: TraceFlags) -> Self {
        self.header.flags = flags;
        return self;
    }

    /// Moves the event region `padding` bytes past the header prefix.
    pub fn header_padding(mut self, padding: u32) -> Self {
        let event_size = self.header.event_size();
        self.header.buffer_offset = TraceHeader::PREFIX_SIZE as u32 + padding;
        self.header.buffer_size =
            self.header.buffer_offset + self.slot_count * event_size + self.dead_space;
        return self;
    }

    /// Adds `dead_space` bytes after the last whole slot.
    pub fn dead_space(mut self, dead_space: u32) -> Self {
        self.header.buffer_size = self.header.buffer_size - self.dead_space + dead_space;
        self.dead_space = dead_space;
        return self;
    }

    /// Stores an event in the given slot.
    pub fn event(mut self, slot: u32, event: TraceEvent) -> Self {
        self.slots[slot as usize] = Some(event);
        return self;
    }

    /// Stores a `clk_set_rate` event with the given timestamp and clock id in
    /// the given slot.
    pub fn simple_event(self, slot: u32, timestamp: u64, clock_id: u16) -> Self {
        return self.event(
            slot,
            TraceEvent {
                timestamp,
                kind: crate::TraceEventKind::ClockSetRate,
                cpu: 0,
                clock_id,
                status: 0,
                value: 1000 + slot,
                aux: None,
            },
        );
    }

    /// The header that [`Self::build`] will encode.
    pub fn header(&self) -> TraceHeader {
        return self.header;
    }

    /// Produces the buffer bytes.
    pub fn build(&self) -> vec::Vec<u8> {
        let event_size = self.header.event_size() as usize;
        let start = self.header.buffer_offset as usize;
        let mut bytes = vec![0u8; self.header.buffer_size as usize];
        bytes[..TraceHeader::PREFIX_SIZE].copy_from_slice(&self.header.encode());
        for (slot, event) in self.slots.iter().enumerate() {
            if let Some(event) = event {
                let pos = start + slot * event_size;
                event.encode(&self.header, &mut bytes[pos..pos + event_size]);
            }
        }

        return bytes;
    }
}
