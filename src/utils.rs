//! Utility functions for binary reading and color conversion.

use std::io::Cursor;
use byteorder::{BigEndian, ReadBytesExt};

/// Binary reader wrapper for big-endian data (SPU headers and control commands).
pub struct BigEndianReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> BigEndianReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    #[inline]
    pub fn data(&self) -> &'a [u8] {
        *self.cursor.get_ref()
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    /// Move to `pos`. Fails (leaving the cursor untouched) past the end of the data.
    #[inline]
    pub fn set_position(&mut self, pos: usize) -> bool {
        if pos <= self.data().len() {
            self.cursor.set_position(pos as u64);
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data().len().saturating_sub(self.position())
    }

    #[inline]
    pub fn read_u8(&mut self) -> Option<u8> {
        self.cursor.read_u8().ok()
    }

    #[inline]
    pub fn read_u16(&mut self) -> Option<u16> {
        self.cursor.read_u16::<BigEndian>().ok()
    }

    /// Read two bytes as four nibbles, high nibble of the first byte first.
    #[inline]
    pub fn read_nibbles(&mut self) -> Option<[u8; 4]> {
        let byte0 = self.read_u8()?;
        let byte1 = self.read_u8()?;
        Some([byte0 >> 4, byte0 & 0x0F, byte1 >> 4, byte1 & 0x0F])
    }

    /// Read three bytes as a pair of packed 12-bit values.
    #[inline]
    pub fn read_u12_pair(&mut self) -> Option<(u16, u16)> {
        let byte0 = self.read_u8()? as u16;
        let byte1 = self.read_u8()? as u16;
        let byte2 = self.read_u8()? as u16;
        Some(((byte0 << 4) | (byte1 >> 4), ((byte1 & 0x0F) << 8) | byte2))
    }
}

/// MSB-first bit reader over a byte slice.
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    /// Start reading at byte offset `byte_offset`. An offset past the end yields an empty reader.
    pub fn new(data: &'a [u8], byte_offset: usize) -> Self {
        Self {
            data,
            bit_pos: byte_offset.min(data.len()) * 8,
        }
    }

    #[inline]
    pub fn bits_left(&self) -> usize {
        (self.data.len() * 8).saturating_sub(self.bit_pos)
    }

    /// Read up to 8 bits. Callers check `bits_left` first.
    #[inline]
    pub fn read_bits(&mut self, count: usize) -> Option<u8> {
        debug_assert!(count <= 8);
        if count > self.bits_left() {
            return None;
        }

        let mut value = 0u8;
        for _ in 0..count {
            let byte = self.data[self.bit_pos / 8];
            let bit = (byte >> (7 - (self.bit_pos % 8))) & 1;
            value = (value << 1) | bit;
            self.bit_pos += 1;
        }
        Some(value)
    }

    /// Skip to the start of the next byte unless already aligned.
    #[inline]
    pub fn byte_align(&mut self) {
        self.bit_pos = (self.bit_pos + 7) & !7;
    }
}

/// Replace the alpha byte of an ARGB color with a 4-bit alpha expanded to 8 bits.
#[inline]
pub fn set_alpha(argb: u32, alpha: u8) -> u32 {
    (argb & 0x00FF_FFFF) | (((alpha as u32 & 0x0F) * 17) << 24)
}

/// Convert ARGB (`0xAARRGGBB`) to canvas byte order `[R, G, B, A]`.
#[inline]
pub fn argb_to_rgba_bytes(argb: u32) -> [u8; 4] {
    let [a, r, g, b] = argb.to_be_bytes();
    [r, g, b, a]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_u12_pair() {
        // left = 0x00A, right = 0x06D
        let data = [0x00, 0xA0, 0x6D];
        let mut reader = BigEndianReader::new(&data);
        assert_eq!(reader.read_u12_pair(), Some((10, 109)));
        assert_eq!(reader.remaining(), 0);
        assert_eq!(reader.read_u8(), None);
    }

    #[test]
    fn test_set_position_past_end() {
        let data = [1, 2, 3];
        let mut reader = BigEndianReader::new(&data);
        assert!(reader.set_position(3));
        assert!(!reader.set_position(4));
        assert_eq!(reader.position(), 3);
    }

    #[test]
    fn test_bit_reader_align() {
        let data = [0xAB, 0xCD];
        let mut bits = BitReader::new(&data, 0);
        assert_eq!(bits.read_bits(4), Some(0xA));
        bits.byte_align();
        assert_eq!(bits.bits_left(), 8);
        assert_eq!(bits.read_bits(4), Some(0xC));
        assert_eq!(bits.read_bits(4), Some(0xD));
        assert_eq!(bits.read_bits(4), None);
    }

    #[test]
    fn test_bit_reader_offset_past_end() {
        let data = [0xFF];
        let bits = BitReader::new(&data, 10);
        assert_eq!(bits.bits_left(), 0);
    }

    #[test]
    fn test_alpha_expansion() {
        assert_eq!(set_alpha(0x00FF_FFFF, 0xF), 0xFFFF_FFFF);
        assert_eq!(set_alpha(0xFF12_3456, 0x8), 0x8812_3456);
        assert_eq!(argb_to_rgba_bytes(0x80FF_0010), [0xFF, 0x00, 0x10, 0x80]);
    }
}
