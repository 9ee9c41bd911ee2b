// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use core::fmt;

use crate::TraceByteReader;
use crate::TraceError;

const MAGIC_OFFSET: usize = 0;
const MAJOR_VERSION_OFFSET: usize = 4;
const MINOR_VERSION_OFFSET: usize = 5;
const BUFFER_SIZE_OFFSET: usize = 8;
const BUFFER_OFFSET_OFFSET: usize = 12;
const FLAGS_OFFSET: usize = 16;
const CLOCK_FREQ_OFFSET: usize = 20;
const HEAD_OFFSET_OFFSET: usize = 24;
const TAIL_OFFSET_OFFSET: usize = 28;
const HEAD_SEQNUM_OFFSET: usize = 32;

/// Header flag bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TraceFlags(pub u32);

impl TraceFlags {
    /// The producer was recording when the buffer was captured.
    pub const TRACE_ON: Self = Self(0x1);

    /// Event timestamps are raw clock ticks at `clock_freq` Hz instead of
    /// microseconds.
    pub const TS_TICKS: Self = Self(0x2);

    /// Returns true if all bits of `flag` are set.
    pub const fn has_flag(self, flag: Self) -> bool {
        return (self.0 & flag.0) == flag.0;
    }
}

impl fmt::LowerHex for TraceFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return fmt::LowerHex::fmt(&self.0, f);
    }
}

/// The fixed binary header found at the start of every trace buffer and
/// every dumped trace file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TraceHeader {
    /// Major format version. Selects the event record size.
    pub major_version: u8,
    /// Minor format version. Informational.
    pub minor_version: u8,
    /// Total size of the buffer in bytes, including this header.
    pub buffer_size: u32,
    /// Offset from the buffer start to the first event slot.
    pub buffer_offset: u32,
    /// Flag bits, see [`TraceFlags`].
    pub flags: TraceFlags,
    /// Timestamp clock frequency in Hz.
    pub clock_freq: u32,
    /// Offset of the oldest event, relative to the first event slot.
    pub head_offset: u32,
    /// Offset of the newest event, relative to the first event slot.
    pub tail_offset: u32,
    /// Sequence number of the event at `head_offset`.
    pub head_seqnum: u32,
    /// Byte order the producer used for all multi-byte fields.
    pub byte_reader: TraceByteReader,
}

impl TraceHeader {
    /// The magic word, as a u32 in the producer's byte order. Printed as
    /// its big-endian bytes, "BTRC".
    pub const MAGIC: u32 = 0x4254_5243;

    /// Size of the fixed header prefix. The event region may start later
    /// (see [`Self::header_size`]) but never earlier.
    pub const PREFIX_SIZE: usize = 36;

    /// Event record size for format version 1.x.
    pub const EVENT_SIZE_V1: u32 = 16;

    /// Event record size for format version 2.x.
    pub const EVENT_SIZE_V2: u32 = 24;

    /// Parses and validates a header from the start of `bytes`.
    ///
    /// The magic word is checked before any other field is read. Returns
    /// [`TraceError::InvalidMagic`] if it matches in neither byte order,
    /// [`TraceError::TruncatedInput`] if `bytes` is shorter than the header,
    /// and [`TraceError::UnsupportedVersion`] if the major version has no
    /// known event layout.
    pub fn parse(bytes: &[u8]) -> Result<TraceHeader, TraceError> {
        if bytes.len() < MAGIC_OFFSET + 4 {
            return Err(TraceError::TruncatedInput {
                needed: Self::PREFIX_SIZE as u64,
                available: bytes.len() as u64,
            });
        }

        let byte_reader = if TraceByteReader::LITTLE_ENDIAN.read_u32(&bytes[MAGIC_OFFSET..])
            == Self::MAGIC
        {
            TraceByteReader::LITTLE_ENDIAN
        } else if TraceByteReader::BIG_ENDIAN.read_u32(&bytes[MAGIC_OFFSET..]) == Self::MAGIC {
            TraceByteReader::BIG_ENDIAN
        } else {
            return Err(TraceError::InvalidMagic {
                found: TraceByteReader::LITTLE_ENDIAN.read_u32(&bytes[MAGIC_OFFSET..]),
            });
        };

        if bytes.len() < Self::PREFIX_SIZE {
            return Err(TraceError::TruncatedInput {
                needed: Self::PREFIX_SIZE as u64,
                available: bytes.len() as u64,
            });
        }

        let header = TraceHeader {
            major_version: bytes[MAJOR_VERSION_OFFSET],
            minor_version: bytes[MINOR_VERSION_OFFSET],
            buffer_size: byte_reader.read_u32(&bytes[BUFFER_SIZE_OFFSET..]),
            buffer_offset: byte_reader.read_u32(&bytes[BUFFER_OFFSET_OFFSET..]),
            flags: TraceFlags(byte_reader.read_u32(&bytes[FLAGS_OFFSET..])),
            clock_freq: byte_reader.read_u32(&bytes[CLOCK_FREQ_OFFSET..]),
            head_offset: byte_reader.read_u32(&bytes[HEAD_OFFSET_OFFSET..]),
            tail_offset: byte_reader.read_u32(&bytes[TAIL_OFFSET_OFFSET..]),
            head_seqnum: byte_reader.read_u32(&bytes[HEAD_SEQNUM_OFFSET..]),
            byte_reader,
        };

        if Self::event_size_for_version(header.major_version).is_none() {
            return Err(TraceError::UnsupportedVersion {
                major: header.major_version,
                minor: header.minor_version,
            });
        }

        return Ok(header);
    }

    /// Encodes the header in the byte order of `self.byte_reader`.
    /// The reserved bytes are written as zero.
    pub fn encode(&self) -> [u8; Self::PREFIX_SIZE] {
        let mut bytes = [0u8; Self::PREFIX_SIZE];
        let w = self.byte_reader;
        w.write_u32(&mut bytes[MAGIC_OFFSET..], Self::MAGIC);
        bytes[MAJOR_VERSION_OFFSET] = self.major_version;
        bytes[MINOR_VERSION_OFFSET] = self.minor_version;
        w.write_u32(&mut bytes[BUFFER_SIZE_OFFSET..], self.buffer_size);
        w.write_u32(&mut bytes[BUFFER_OFFSET_OFFSET..], self.buffer_offset);
        w.write_u32(&mut bytes[FLAGS_OFFSET..], self.flags.0);
        w.write_u32(&mut bytes[CLOCK_FREQ_OFFSET..], self.clock_freq);
        w.write_u32(&mut bytes[HEAD_OFFSET_OFFSET..], self.head_offset);
        w.write_u32(&mut bytes[TAIL_OFFSET_OFFSET..], self.tail_offset);
        w.write_u32(&mut bytes[HEAD_SEQNUM_OFFSET..], self.head_seqnum);
        return bytes;
    }

    /// Returns the event record size for a given major version, or `None`
    /// if the version is not supported.
    pub const fn event_size_for_version(major_version: u8) -> Option<u32> {
        return match major_version {
            1 => Some(Self::EVENT_SIZE_V1),
            2 => Some(Self::EVENT_SIZE_V2),
            _ => None,
        };
    }

    /// Size of each event record, in bytes.
    pub fn event_size(&self) -> u32 {
        // parse() rejects unsupported versions.
        return Self::event_size_for_version(self.major_version).unwrap_or(Self::EVENT_SIZE_V1);
    }

    /// Size of the header area, i.e. the offset of the first event slot.
    pub fn header_size(&self) -> u32 {
        return self.buffer_offset;
    }

    /// Returns a display adapter that shows the magic word as ASCII.
    pub fn magic_display(&self) -> MagicDisplay {
        return MagicDisplay(Self::MAGIC);
    }
}

/// Shows a magic word as the ASCII characters of its big-endian bytes.
#[derive(Clone, Copy, Debug)]
pub struct MagicDisplay(u32);

impl fmt::Display for MagicDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in self.0.to_be_bytes().iter() {
            let ch = if b.is_ascii_graphic() { b as char } else { '.' };
            fmt::Write::write_char(f, ch)?;
        }
        return Ok(());
    }
}
