//! VobSub RLE decoder.
//!
//! DVD subtitles use 2-bit RLE encoding with interlaced fields. Each run is coded in
//! 4, 8, 12 or 16 bits:
//!
//! ```text
//! 4 bits:   nnCC           n = 1..3
//! 8 bits:   00nnnnCC       n = 4..15
//! 12 bits:  0000nnnnnnCC   n = 16..63
//! 16 bits:  000000nnnnnnnnCC  n = 64..255, or 0 = fill to end of line
//! ```
//!
//! Every line starts on a byte boundary.

use crate::utils::BitReader;

/// One decoded run: an ARGB color and a pixel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub color: u32,
    pub length: usize,
}

/// Read one run code. Returns a zero-length run of color 0 when fewer than 4 bits remain.
pub fn read_run(bits: &mut BitReader, colors: &[u32; 4], width: usize) -> Run {
    let mut value: u32 = 0;
    let mut test: u32 = 1;

    while value < test && test <= 0x40 {
        let Some(nibble) = bits.read_bits(4) else {
            return Run {
                color: 0,
                length: 0,
            };
        };
        value = (value << 4) | nibble as u32;
        test <<= 2;
    }

    Run {
        color: colors[(value & 3) as usize],
        length: if value < 4 {
            width
        } else {
            (value >> 2) as usize
        },
    }
}

/// Decode one interlaced field into `bitmap`, starting at line `first_line` (0 or 1) and
/// filling every second line.
///
/// Decoding stops once the field's lines are filled or the run data is exhausted.
pub fn decode_field(
    bits: &mut BitReader,
    first_line: usize,
    colors: &[u32; 4],
    bitmap: &mut [u32],
    width: usize,
    height: usize,
) {
    if width == 0 || first_line >= height {
        return;
    }

    let mut y = first_line;
    let mut x = 0;
    let mut out_index = y * width;

    loop {
        let run = read_run(bits, colors, width);
        if run.length == 0 {
            // Only an exhausted stream yields an empty run.
            return;
        }

        let length = run.length.min(width - x);
        bitmap[out_index..out_index + length].fill(run.color);
        out_index += length;
        x += length;

        if x >= width {
            y += 2;
            if y >= height {
                return;
            }
            x = 0;
            out_index = y * width;
            bits.byte_align();
        }
    }
}

/// Decode both fields of a bitmap. `offsets` are byte offsets of the even and odd
/// fields within `data`.
pub fn decode_vobsub_rle(
    data: &[u8],
    offsets: (usize, usize),
    colors: &[u32; 4],
    width: usize,
    height: usize,
) -> Vec<u32> {
    let mut bitmap = vec![0u32; width * height];

    let mut even = BitReader::new(data, offsets.0);
    decode_field(&mut even, 0, colors, &mut bitmap, width, height);

    let mut odd = BitReader::new(data, offsets.1);
    decode_field(&mut odd, 1, colors, &mut bitmap, width, height);

    bitmap
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLORS: [u32; 4] = [0x0000_0000, 0xFFFF_FFFF, 0xFFFF_0000, 0xFF00_FF00];

    fn run_of(data: &[u8], width: usize) -> Run {
        let mut bits = BitReader::new(data, 0);
        read_run(&mut bits, &COLORS, width)
    }

    #[test]
    fn test_rle_code_4bit() {
        // 0x5 = run 1, color 1
        let data = [0x50];
        assert_eq!(run_of(&data, 10), Run { color: COLORS[1], length: 1 });
    }

    #[test]
    fn test_rle_code_8bit() {
        // 0x1E = run 7, color 2
        assert_eq!(run_of(&[0x1E], 10), Run { color: COLORS[2], length: 7 });
    }

    #[test]
    fn test_rle_code_12bit() {
        // 0x0FF = run 63, color 3
        assert_eq!(run_of(&[0x0F, 0xF0], 100), Run { color: COLORS[3], length: 63 });
    }

    #[test]
    fn test_rle_code_16bit() {
        // 0x03FD = run 255, color 1
        assert_eq!(run_of(&[0x03, 0xFD], 300), Run { color: COLORS[1], length: 255 });
    }

    #[test]
    fn test_fill_to_end_of_line() {
        // 16 bits with length 0: fill with color 2.
        assert_eq!(run_of(&[0x00, 0x02], 42), Run { color: COLORS[2], length: 42 });
    }

    #[test]
    fn test_exhausted_stream_yields_empty_run() {
        assert_eq!(run_of(&[], 10), Run { color: 0, length: 0 });
        // A 16-bit code cut after 8 bits.
        assert_eq!(run_of(&[0x00], 10), Run { color: 0, length: 0 });
    }

    #[test]
    fn test_run_clipped_to_line() {
        // 0xFF = run 63 of color 3 on a 4 pixel wide line.
        let data = [0x0F, 0xF0];
        let mut bitmap = vec![0u32; 4 * 2];
        let mut bits = BitReader::new(&data, 0);
        decode_field(&mut bits, 0, &COLORS, &mut bitmap, 4, 2);
        assert_eq!(&bitmap[..4], &[COLORS[3]; 4]);
        assert_eq!(&bitmap[4..], &[0; 4]);
    }

    #[test]
    fn test_lines_are_byte_aligned() {
        // Line 0: 0xD (3 px color 1) then a padding nibble, line 2: 0xE (3 px color 2).
        let data = [0xD0, 0xE0];
        let mut bitmap = vec![0u32; 3 * 4];
        let mut bits = BitReader::new(&data, 0);
        decode_field(&mut bits, 0, &COLORS, &mut bitmap, 3, 4);
        assert_eq!(&bitmap[0..3], &[COLORS[1]; 3]);
        assert_eq!(&bitmap[3..6], &[0; 3]);
        assert_eq!(&bitmap[6..9], &[COLORS[2]; 3]);
    }

    #[test]
    fn test_interlaced_fields() {
        // Even field at 0: one fill-line run of color 1 per line, two lines.
        // Odd field at 4: one fill-line run of color 2 per line, two lines.
        let data = [0x00, 0x01, 0x00, 0x01, 0x00, 0x02, 0x00, 0x02];
        let bitmap = decode_vobsub_rle(&data, (0, 4), &COLORS, 5, 4);
        for y in 0..4 {
            let expected = if y % 2 == 0 { COLORS[1] } else { COLORS[2] };
            assert_eq!(&bitmap[y * 5..(y + 1) * 5], &[expected; 5], "line {y}");
        }
    }

    #[test]
    fn test_offsets_past_end_leave_bitmap_blank() {
        let bitmap = decode_vobsub_rle(&[0x00, 0x01], (100, 200), &COLORS, 4, 4);
        assert_eq!(bitmap, vec![0u32; 16]);
    }
}
