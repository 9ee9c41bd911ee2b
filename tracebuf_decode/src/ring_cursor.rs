// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use crate::TraceError;
use crate::TraceHeader;

/// Geometry of the event ring described by a [`TraceHeader`].
///
/// Events live in a logical array of `slot_count` fixed-size slots starting at
/// [`Self::start`]. Head and tail are kept as slot indices; wraparound is
/// index arithmetic, shared by every [`crate::ByteSource`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RingCursor {
    start: u64,
    event_size: u32,
    slot_count: u32,
    head: u32,
    tail: u32,
}

impl RingCursor {
    /// Computes the ring geometry for `header`, with the buffer starting at
    /// byte position `base` of the source.
    ///
    /// Trailing bytes that do not fill a whole event slot are excluded.
    /// Returns [`TraceError::InvalidLayout`] if the header does not describe
    /// at least one slot, or if head or tail do not name a slot.
    pub fn build(header: &TraceHeader, base: u64) -> Result<RingCursor, TraceError> {
        let header_size = header.header_size();
        let event_size = header.event_size();

        if (header_size as usize) < TraceHeader::PREFIX_SIZE {
            return Err(TraceError::InvalidLayout(format!(
                "event region offset 0x{:x} overlaps the header",
                header_size
            )));
        }

        let region_bytes = header.buffer_size.saturating_sub(header_size);
        let slot_count = region_bytes / event_size;
        if slot_count == 0 {
            return Err(TraceError::InvalidLayout(format!(
                "buffer size {} leaves no room for a {}-byte event after offset 0x{:x}",
                header.buffer_size, event_size, header_size
            )));
        }

        let head = Self::offset_to_slot("head", header.head_offset, event_size, slot_count)?;
        let tail = Self::offset_to_slot("tail", header.tail_offset, event_size, slot_count)?;

        let cursor = RingCursor {
            start: base + header_size as u64,
            event_size,
            slot_count,
            head,
            tail,
        };

        log::debug!(
            "ring: {} slots of {} bytes, head slot {}, tail slot {}",
            slot_count,
            event_size,
            head,
            tail
        );

        return Ok(cursor);
    }

    fn offset_to_slot(
        name: &str,
        offset: u32,
        event_size: u32,
        slot_count: u32,
    ) -> Result<u32, TraceError> {
        if offset % event_size != 0 {
            return Err(TraceError::InvalidLayout(format!(
                "{} offset 0x{:x} is not a multiple of the event size {}",
                name, offset, event_size
            )));
        }

        let slot = offset / event_size;
        if slot >= slot_count {
            return Err(TraceError::InvalidLayout(format!(
                "{} offset 0x{:x} is past the last event slot",
                name, offset
            )));
        }

        return Ok(slot);
    }

    /// Size of one event slot in bytes.
    pub fn event_size(&self) -> u32 {
        return self.event_size;
    }

    /// Number of whole event slots in the ring.
    pub fn slot_count(&self) -> u32 {
        return self.slot_count;
    }

    /// Bytes covered by the event slots, excluding any trailing dead space.
    pub fn event_region_size(&self) -> u64 {
        return self.slot_count as u64 * self.event_size as u64;
    }

    /// Position of the first event slot.
    pub fn start(&self) -> u64 {
        return self.start;
    }

    /// Position of the last event slot (inclusive, not one-past-the-end).
    pub fn end(&self) -> u64 {
        return self.slot_position(self.slot_count - 1);
    }

    /// Slot index of the oldest event.
    pub fn head_slot(&self) -> u32 {
        return self.head;
    }

    /// Slot index of the newest event.
    pub fn tail_slot(&self) -> u32 {
        return self.tail;
    }

    /// Position of the oldest event.
    pub fn head(&self) -> u64 {
        return self.slot_position(self.head);
    }

    /// Position of the newest event.
    pub fn tail(&self) -> u64 {
        return self.slot_position(self.tail);
    }

    /// Position of the given slot.
    /// PRECONDITION: slot < slot_count()
    pub fn slot_position(&self, slot: u32) -> u64 {
        debug_assert!(slot < self.slot_count);
        return self.start + slot as u64 * self.event_size as u64;
    }

    /// The slot after `slot`, wrapping from the last slot to the first.
    pub fn next(&self, slot: u32) -> u32 {
        return if slot + 1 >= self.slot_count {
            0
        } else {
            slot + 1
        };
    }

    /// Returns true if the ring holds no events: head and tail name the same
    /// slot AND that slot's timestamp is the zero sentinel. Neither condition
    /// alone means empty.
    pub fn is_empty(&self, head_timestamp: u64) -> bool {
        return self.head == self.tail && head_timestamp == 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TraceByteReader;
    use crate::TraceFlags;

    fn header(buffer_size: u32, head_offset: u32, tail_offset: u32) -> TraceHeader {
        return TraceHeader {
            major_version: 1,
            minor_version: 0,
            buffer_size,
            buffer_offset: 36,
            flags: TraceFlags::default(),
            clock_freq: 0,
            head_offset,
            tail_offset,
            head_seqnum: 0,
            byte_reader: TraceByteReader::LITTLE_ENDIAN,
        };
    }

    #[test]
    fn geometry() {
        // 4 slots of 16 bytes plus 5 bytes of dead space.
        let cursor = RingCursor::build(&header(36 + 64 + 5, 48, 16), 0).unwrap();
        assert_eq!(4, cursor.slot_count());
        assert_eq!(64, cursor.event_region_size());
        assert_eq!(36, cursor.start());
        assert_eq!(36 + 48, cursor.end());
        assert_eq!(36 + 48, cursor.head());
        assert_eq!(36 + 16, cursor.tail());
        assert_eq!(3, cursor.head_slot());
        assert_eq!(1, cursor.tail_slot());
    }

    #[test]
    fn base_offsets_positions() {
        let cursor = RingCursor::build(&header(36 + 64, 0, 0), 4096).unwrap();
        assert_eq!(4096 + 36, cursor.start());
        assert_eq!(4096 + 36 + 48, cursor.end());
    }

    #[test]
    fn next_wraps_at_end() {
        let cursor = RingCursor::build(&header(36 + 64, 0, 0), 0).unwrap();
        assert_eq!(1, cursor.next(0));
        assert_eq!(3, cursor.next(2));
        assert_eq!(0, cursor.next(3));
        assert_eq!(cursor.start(), cursor.slot_position(cursor.next(3)));
    }

    #[test]
    fn single_slot_ring() {
        let cursor = RingCursor::build(&header(36 + 16, 0, 0), 0).unwrap();
        assert_eq!(1, cursor.slot_count());
        assert_eq!(cursor.start(), cursor.end());
        assert_eq!(0, cursor.next(0));
    }

    #[test]
    fn empty_requires_both_conditions() {
        let same = RingCursor::build(&header(36 + 64, 32, 32), 0).unwrap();
        assert!(same.is_empty(0));
        assert!(!same.is_empty(1));

        let different = RingCursor::build(&header(36 + 64, 32, 48), 0).unwrap();
        assert!(!different.is_empty(0));
    }

    #[test]
    fn invalid_layouts() {
        let mut h = header(36 + 64, 0, 0);
        h.buffer_offset = 20;
        assert!(matches!(
            RingCursor::build(&h, 0),
            Err(TraceError::InvalidLayout(_))
        ));

        // No whole slot.
        assert!(matches!(
            RingCursor::build(&header(36 + 15, 0, 0), 0),
            Err(TraceError::InvalidLayout(_))
        ));
        assert!(matches!(
            RingCursor::build(&header(10, 0, 0), 0),
            Err(TraceError::InvalidLayout(_))
        ));

        // Misaligned head.
        assert!(matches!(
            RingCursor::build(&header(36 + 64, 8, 0), 0),
            Err(TraceError::InvalidLayout(_))
        ));

        // Tail past the last slot.
        assert!(matches!(
            RingCursor::build(&header(36 + 64, 0, 64), 0),
            Err(TraceError::InvalidLayout(_))
        ));
    }
}
