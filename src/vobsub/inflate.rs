//! Optional zlib decompression of subpicture packets.
//!
//! Some containers store SPUs deflated. Whether a packet is compressed is not signalled,
//! so every packet is probed: a complete zlib stream is inflated, anything else passes
//! through untouched.

use flate2::{Decompress, FlushDecompress, Status};
use log::trace;

/// DEFLATE compression method in the low nibble of CMF.
const ZLIB_METHOD_DEFLATE: u8 = 8;

/// Largest window size exponent (CINFO) allowed in CMF, i.e. a 32K window.
const ZLIB_MAX_CINFO: u8 = 7;

/// Whether `input` starts with a well-formed zlib header (RFC 1950, 2.2).
pub fn is_zlib_header(input: &[u8]) -> bool {
    let (cmf, flg) = match input {
        [cmf, flg, ..] => (*cmf, *flg),
        _ => return false,
    };
    cmf & 0x0F == ZLIB_METHOD_DEFLATE
        && cmf >> 4 <= ZLIB_MAX_CINFO
        && (((cmf as u16) << 8) | flg as u16) % 31 == 0
}

/// Reusable zlib inflater with its own output buffer.
pub struct SpuInflater {
    decompress: Decompress,
    output: Vec<u8>,
}

impl SpuInflater {
    pub fn new() -> Self {
        Self {
            decompress: Decompress::new(true),
            output: Vec::new(),
        }
    }

    /// Try to inflate `input`. Returns the decompressed bytes when `input` is a complete
    /// zlib stream, `None` otherwise.
    pub fn maybe_inflate(&mut self, input: &[u8]) -> Option<&[u8]> {
        if !is_zlib_header(input) {
            return None;
        }

        self.decompress.reset(true);
        self.output.clear();
        self.output.reserve(input.len() * 2);

        let finished = self.run(input);
        if finished {
            trace!("inflated {} bytes into {}", input.len(), self.output.len());
            Some(&self.output)
        } else {
            None
        }
    }

    fn run(&mut self, input: &[u8]) -> bool {
        loop {
            let consumed = self.decompress.total_in() as usize;
            let produced = self.output.len();

            let status = match self.decompress.decompress_vec(
                &input[consumed..],
                &mut self.output,
                FlushDecompress::None,
            ) {
                Ok(status) => status,
                Err(_) => return false,
            };

            if status == Status::StreamEnd {
                return true;
            }

            if self.output.len() == self.output.capacity() {
                // Out of room; grow and keep going.
                let extra = self.output.capacity().max(64);
                self.output.reserve(extra);
                continue;
            }

            let progressed = self.decompress.total_in() as usize != consumed
                || self.output.len() != produced;
            if !progressed || self.decompress.total_in() as usize >= input.len() {
                // Truncated stream or needs a preset dictionary.
                return false;
            }
        }
    }
}

impl Default for SpuInflater {
    fn default() -> Self {
        Self::new()
    }
}
