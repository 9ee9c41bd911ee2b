// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

#![allow(non_upper_case_globals)]

use core::fmt;

use crate::TraceByteReader;
use crate::TraceHeader;

const TIMESTAMP_OFFSET: usize = 0;
const KIND_OFFSET: usize = 6;
const CPU_OFFSET: usize = 7;
const INFO_OFFSET: usize = 8;
const VALUE_OFFSET: usize = 12;
const AUX_OFFSET: usize = 16;

const CLOCK_ID_MASK: u32 = 0xfff;
const STATUS_SHIFT: u32 = 12;
const STATUS_MASK: u32 = 0xf;

/// Largest value a 48-bit timestamp can hold.
pub const TIMESTAMP_MAX: u64 = (1 << 48) - 1;

/// Event kind code, stored in byte 6 of each event record.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TraceEventKind(pub u8);

impl TraceEventKind {
    /// Clock was enabled.
    pub const ClockEnable: Self = Self(1);

    /// Clock was disabled.
    pub const ClockDisable: Self = Self(2);

    /// Clock rate was set. Value is the new rate in kHz.
    pub const ClockSetRate: Self = Self(3);

    /// Clock rate was queried. Value is the reported rate in kHz.
    pub const ClockGetRate: Self = Self(4);

    /// DVFS performance level changed. Value is the new level.
    pub const PerfLevel: Self = Self(5);

    /// Supply voltage changed. Value is in microvolts.
    pub const Voltage: Self = Self(6);

    /// SCMI message. Value is the message id.
    pub const ScmiMessage: Self = Self(7);

    /// Returns the display name of a known kind, or `None`.
    pub const fn as_str(self) -> Option<&'static str> {
        return match self {
            Self::ClockEnable => Some("clk_enable"),
            Self::ClockDisable => Some("clk_disable"),
            Self::ClockSetRate => Some("clk_set_rate"),
            Self::ClockGetRate => Some("clk_get_rate"),
            Self::PerfLevel => Some("perf_level"),
            Self::Voltage => Some("voltage"),
            Self::ScmiMessage => Some("scmi_msg"),
            _ => None,
        };
    }

    /// Unit suffix for the event value, if any.
    pub const fn value_unit(self) -> &'static str {
        return match self {
            Self::ClockSetRate | Self::ClockGetRate => "kHz",
            Self::Voltage => "uV",
            _ => "",
        };
    }
}

impl fmt::Display for TraceEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self.as_str() {
            Some(name) => f.pad(name),
            None => write!(f, "evt_0x{:02x}", self.0),
        };
    }
}

/// One decoded event record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TraceEvent {
    /// 48-bit timestamp, zero-extended. Zero marks a never-written slot.
    pub timestamp: u64,
    /// Event kind.
    pub kind: TraceEventKind,
    /// Originating cpu.
    pub cpu: u8,
    /// Clock id (12 bits).
    pub clock_id: u16,
    /// Status nibble.
    pub status: u8,
    /// Kind-specific value.
    pub value: u32,
    /// Kind-specific 64-bit value. Only present in format version 2.
    pub aux: Option<u64>,
}

impl TraceEvent {
    /// Reads only the 48-bit timestamp of an event record.
    /// PRECONDITION: bytes.len() >= 6
    pub fn read_timestamp(byte_reader: TraceByteReader, bytes: &[u8]) -> u64 {
        return byte_reader.read_u48(&bytes[TIMESTAMP_OFFSET..]);
    }

    /// Decodes an event record laid out as described by `header`.
    /// PRECONDITION: bytes.len() >= header.event_size()
    pub fn decode(header: &TraceHeader, bytes: &[u8]) -> TraceEvent {
        let r = header.byte_reader;
        let info = r.read_u32(&bytes[INFO_OFFSET..]);
        return TraceEvent {
            timestamp: Self::read_timestamp(r, bytes),
            kind: TraceEventKind(bytes[KIND_OFFSET]),
            cpu: bytes[CPU_OFFSET],
            clock_id: (info & CLOCK_ID_MASK) as u16,
            status: ((info >> STATUS_SHIFT) & STATUS_MASK) as u8,
            value: r.read_u32(&bytes[VALUE_OFFSET..]),
            aux: if header.event_size() as usize >= AUX_OFFSET + 8 {
                Some(r.read_u64(&bytes[AUX_OFFSET..]))
            } else {
                None
            },
        };
    }

    /// Encodes this event into `dest` using the layout described by
    /// `header`. Bytes past the known fields are zeroed.
    /// PRECONDITION: dest.len() >= header.event_size()
    pub fn encode(&self, header: &TraceHeader, dest: &mut [u8]) {
        let w = header.byte_reader;
        let event_size = header.event_size() as usize;
        dest[..event_size].fill(0);
        w.write_u48(&mut dest[TIMESTAMP_OFFSET..], self.timestamp);
        dest[KIND_OFFSET] = self.kind.0;
        dest[CPU_OFFSET] = self.cpu;
        let info = (self.clock_id as u32 & CLOCK_ID_MASK)
            | ((self.status as u32 & STATUS_MASK) << STATUS_SHIFT);
        w.write_u32(&mut dest[INFO_OFFSET..], info);
        w.write_u32(&mut dest[VALUE_OFFSET..], self.value);
        if event_size >= AUX_OFFSET + 8 {
            w.write_u64(&mut dest[AUX_OFFSET..], self.aux.unwrap_or(0));
        }
    }

    /// Returns the timestamp in microseconds. When the header says timestamps
    /// are clock ticks, they are scaled by the clock frequency.
    pub fn timestamp_usec(&self, header: &TraceHeader) -> u64 {
        if header.flags.has_flag(crate::TraceFlags::TS_TICKS) && header.clock_freq != 0 {
            return (self.timestamp as u128 * 1_000_000 / header.clock_freq as u128) as u64;
        }

        return self.timestamp;
    }
}

/// An event together with the sequence number assigned during the walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SequencedEvent {
    /// Sequence number, starting at the header's head sequence number.
    pub seqnum: u32,
    /// Ring slot the event was read from.
    pub slot: u32,
    /// The decoded event.
    pub event: TraceEvent,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TraceFlags;

    fn header(major_version: u8, byte_reader: TraceByteReader) -> TraceHeader {
        return TraceHeader {
            major_version,
            minor_version: 0,
            buffer_size: 4096,
            buffer_offset: 36,
            flags: TraceFlags::default(),
            clock_freq: 1_000_000,
            head_offset: 0,
            tail_offset: 0,
            head_seqnum: 0,
            byte_reader,
        };
    }

    #[test]
    fn decode_v1_little_endian() {
        let h = header(1, TraceByteReader::LITTLE_ENDIAN);
        let bytes = [
            0x40, 0x42, 0x0f, 0x00, 0x00, 0x00, // 1_000_000 us
            0x03, // clk_set_rate
            0x01, // cpu 1
            0x05, 0x20, 0x00, 0x00, // clock 5, status 2
            0xe8, 0x03, 0x00, 0x00, // 1000
        ];
        let event = TraceEvent::decode(&h, &bytes);
        assert_eq!(1_000_000, event.timestamp);
        assert_eq!(TraceEventKind::ClockSetRate, event.kind);
        assert_eq!(1, event.cpu);
        assert_eq!(5, event.clock_id);
        assert_eq!(2, event.status);
        assert_eq!(1000, event.value);
        assert_eq!(None, event.aux);
    }

    #[test]
    fn v2_carries_aux() {
        for reader in [TraceByteReader::LITTLE_ENDIAN, TraceByteReader::BIG_ENDIAN] {
            let h = header(2, reader);
            let event = TraceEvent {
                timestamp: TIMESTAMP_MAX,
                kind: TraceEventKind::Voltage,
                cpu: 3,
                clock_id: 0xfff,
                status: 0xf,
                value: 900_000,
                aux: Some(0x0102_0304_0506_0708),
            };
            let mut bytes = [0xaau8; 24];
            event.encode(&h, &mut bytes);
            assert_eq!(event, TraceEvent::decode(&h, &bytes));
        }
    }

    #[test]
    fn tick_timestamps_scale() {
        let mut h = header(1, TraceByteReader::LITTLE_ENDIAN);
        let event = TraceEvent {
            timestamp: 54_000_000,
            ..TraceEvent::default()
        };
        assert_eq!(54_000_000, event.timestamp_usec(&h));

        h.flags = TraceFlags::TS_TICKS;
        h.clock_freq = 27_000_000;
        assert_eq!(2_000_000, event.timestamp_usec(&h));

        h.clock_freq = 0;
        assert_eq!(54_000_000, event.timestamp_usec(&h));
    }

    #[test]
    fn kind_display() {
        assert_eq!("clk_enable", TraceEventKind::ClockEnable.to_string());
        assert_eq!("evt_0x7f", TraceEventKind(0x7f).to_string());
        assert_eq!("kHz", TraceEventKind::ClockGetRate.value_unit());
        assert_eq!("", TraceEventKind(0).value_unit());
    }
}
