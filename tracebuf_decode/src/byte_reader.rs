// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

/// Helper for reading trace buffer fields that may have been written by a
/// big-endian or little-endian producer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TraceByteReader {
    source_big_endian: bool,
}

impl TraceByteReader {
    /// true if running on a big-endian system.
    pub const HOST_IS_BIG_ENDIAN: bool = cfg!(target_endian = "big");

    /// A reader for buffers produced on a little-endian system.
    pub const LITTLE_ENDIAN: Self = Self::new(false);

    /// A reader for buffers produced on a big-endian system.
    pub const BIG_ENDIAN: Self = Self::new(true);

    /// Create a new reader that will interpret input data bytes as indicated by the
    /// source_big_endian parameter.
    pub const fn new(source_big_endian: bool) -> Self {
        return Self { source_big_endian };
    }

    /// Returns true if the input data bytes are being interpreted as big-endian.
    pub const fn source_big_endian(self) -> bool {
        return self.source_big_endian;
    }

    /// Returns true if the input data bytes are being byte-swapped.
    pub const fn byte_swap_needed(self) -> bool {
        return self.source_big_endian != Self::HOST_IS_BIG_ENDIAN;
    }

    /// Reads a u16 from the start of the given slice.
    /// PRECONDITION: source.len() >= 2
    pub fn read_u16(self, source: &[u8]) -> u16 {
        let source_array = [source[0], source[1]];
        return if self.source_big_endian {
            u16::from_be_bytes(source_array)
        } else {
            u16::from_le_bytes(source_array)
        };
    }

    /// Reads a u32 from the start of the given slice.
    /// PRECONDITION: source.len() >= 4
    pub fn read_u32(self, source: &[u8]) -> u32 {
        let source_array = [source[0], source[1], source[2], source[3]];
        return if self.source_big_endian {
            u32::from_be_bytes(source_array)
        } else {
            u32::from_le_bytes(source_array)
        };
    }

    /// Reads a 48-bit unsigned value from the start of the given slice,
    /// zero-extended to u64.
    /// PRECONDITION: source.len() >= 6
    pub fn read_u48(self, source: &[u8]) -> u64 {
        let mut source_array = [0u8; 8];
        return if self.source_big_endian {
            source_array[2..].copy_from_slice(&source[..6]);
            u64::from_be_bytes(source_array)
        } else {
            source_array[..6].copy_from_slice(&source[..6]);
            u64::from_le_bytes(source_array)
        };
    }

    /// Reads a u64 from the start of the given slice.
    /// PRECONDITION: source.len() >= 8
    pub fn read_u64(self, source: &[u8]) -> u64 {
        let mut source_array = [0u8; 8];
        source_array.copy_from_slice(&source[..8]);
        return if self.source_big_endian {
            u64::from_be_bytes(source_array)
        } else {
            u64::from_le_bytes(source_array)
        };
    }

    /// Writes a u32 to the start of the given slice in the source byte order.
    /// PRECONDITION: dest.len() >= 4
    pub fn write_u32(self, dest: &mut [u8], value: u32) {
        let bytes = if self.source_big_endian {
            value.to_be_bytes()
        } else {
            value.to_le_bytes()
        };
        dest[..4].copy_from_slice(&bytes);
    }

    /// Writes the low 48 bits of value to the start of the given slice in the
    /// source byte order.
    /// PRECONDITION: dest.len() >= 6
    pub fn write_u48(self, dest: &mut [u8], value: u64) {
        if self.source_big_endian {
            dest[..6].copy_from_slice(&value.to_be_bytes()[2..]);
        } else {
            dest[..6].copy_from_slice(&value.to_le_bytes()[..6]);
        }
    }

    /// Writes a u64 to the start of the given slice in the source byte order.
    /// PRECONDITION: dest.len() >= 8
    pub fn write_u64(self, dest: &mut [u8], value: u64) {
        let bytes = if self.source_big_endian {
            value.to_be_bytes()
        } else {
            value.to_le_bytes()
        };
        dest[..8].copy_from_slice(&bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_U16: u16 = 0x1234;
    const TEST_U32: u32 = 0x12345678;
    const TEST_U48: u64 = 0x1234_5678_9abc;
    const TEST_U64: u64 = 0x1234567890abcdef;

    #[test]
    fn constants() {
        const TARGET_BIG_ENDIAN: bool = TEST_U32.to_be() == TEST_U32;
        assert_eq!(TARGET_BIG_ENDIAN, TraceByteReader::HOST_IS_BIG_ENDIAN);

        assert_eq!(false, TraceByteReader::LITTLE_ENDIAN.source_big_endian());
        assert_eq!(true, TraceByteReader::BIG_ENDIAN.source_big_endian());
        assert_eq!(
            TARGET_BIG_ENDIAN,
            TraceByteReader::LITTLE_ENDIAN.byte_swap_needed()
        );
        assert_eq!(
            !TARGET_BIG_ENDIAN,
            TraceByteReader::BIG_ENDIAN.byte_swap_needed()
        );
    }

    #[test]
    fn read() {
        assert_eq!(
            TEST_U16,
            TraceByteReader::LITTLE_ENDIAN.read_u16(&TEST_U16.to_le_bytes())
        );
        assert_eq!(
            TEST_U16,
            TraceByteReader::BIG_ENDIAN.read_u16(&TEST_U16.to_be_bytes())
        );

        assert_eq!(
            TEST_U32,
            TraceByteReader::LITTLE_ENDIAN.read_u32(&TEST_U32.to_le_bytes())
        );
        assert_eq!(
            TEST_U32,
            TraceByteReader::BIG_ENDIAN.read_u32(&TEST_U32.to_be_bytes())
        );

        assert_eq!(
            TEST_U48,
            TraceByteReader::LITTLE_ENDIAN.read_u48(&[0xbc, 0x9a, 0x78, 0x56, 0x34, 0x12])
        );
        assert_eq!(
            TEST_U48,
            TraceByteReader::BIG_ENDIAN.read_u48(&[0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc])
        );

        assert_eq!(
            TEST_U64,
            TraceByteReader::LITTLE_ENDIAN.read_u64(&TEST_U64.to_le_bytes())
        );
        assert_eq!(
            TEST_U64,
            TraceByteReader::BIG_ENDIAN.read_u64(&TEST_U64.to_be_bytes())
        );
    }

    #[test]
    fn read_u48_ignores_trailing_bytes() {
        let bytes = [1, 0, 0, 0, 0, 0, 0xff, 0xff];
        assert_eq!(1, TraceByteReader::LITTLE_ENDIAN.read_u48(&bytes));
    }

    #[test]
    fn write() {
        for reader in [TraceByteReader::LITTLE_ENDIAN, TraceByteReader::BIG_ENDIAN] {
            let mut buf = [0u8; 8];

            reader.write_u32(&mut buf, TEST_U32);
            assert_eq!(TEST_U32, reader.read_u32(&buf));

            reader.write_u48(&mut buf, TEST_U48 | 0xffff_0000_0000_0000);
            assert_eq!(TEST_U48, reader.read_u48(&buf));

            reader.write_u64(&mut buf, TEST_U64);
            assert_eq!(TEST_U64, reader.read_u64(&buf));
        }
    }
}
