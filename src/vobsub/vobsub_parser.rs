//! VobSub subpicture decoder, usable from Rust and exposed to JavaScript via WASM.

use js_sys::Uint8Array;
use log::debug;
use wasm_bindgen::prelude::*;

use super::{
    decode_vobsub_rle, parse_control, parse_idx, DecodeState, SpuInflater, VobSubIdx,
};
use crate::cue::{
    Anchor, Cue, CueReplacementBehavior, CuesWithTiming, LineType, DEFAULT_DURATION_US,
    TIME_UNSET,
};
use crate::error::SpuError;
use crate::utils::BigEndianReader;

/// Decoder tuning.
#[derive(Clone, Debug)]
pub struct DecoderOptions {
    /// Probe every packet for zlib compression.
    pub inflate: bool,
    /// Duration reported with each output, in microseconds.
    pub default_duration_us: i64,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            inflate: true,
            default_duration_us: DEFAULT_DURATION_US,
        }
    }
}

/// Decodes subpicture packets into positioned bitmap cues.
///
/// The palette and reference frame size come from the IDX metadata given at construction
/// and never change. A decoder without both never produces a cue. One packet is decoded at
/// a time; callers sharing a decoder across threads must serialize access.
#[wasm_bindgen]
pub struct VobSubDecoder {
    idx: VobSubIdx,
    options: DecoderOptions,
    inflater: SpuInflater,
    state: DecodeState,
}

impl VobSubDecoder {
    /// Each output replaces the previous one.
    pub const CUE_REPLACEMENT_BEHAVIOR: CueReplacementBehavior = CueReplacementBehavior::Replace;

    pub fn with_options(idx_content: &str, options: DecoderOptions) -> Self {
        Self::from_idx(parse_idx(idx_content), options)
    }

    pub fn from_idx(idx: VobSubIdx, options: DecoderOptions) -> Self {
        Self {
            idx,
            options,
            inflater: SpuInflater::new(),
            state: DecodeState::default(),
        }
    }

    pub fn idx(&self) -> &VobSubIdx {
        &self.idx
    }

    /// Decode one packet and hand the result to `output`. Always emits exactly once; a
    /// packet that cannot be decoded yields an empty cue list.
    pub fn parse<F>(&mut self, data: &[u8], mut output: F)
    where
        F: FnMut(CuesWithTiming),
    {
        let cues = match self.decode_packet(data) {
            Ok(cue) => vec![cue],
            Err(err) => {
                debug!("dropping subpicture packet: {}", err);
                Vec::new()
            }
        };

        output(CuesWithTiming {
            cues,
            start_time_us: TIME_UNSET,
            duration_us: self.options.default_duration_us,
        });
    }

    /// Like [`parse`](Self::parse) for the `length` bytes at `offset`. A window outside
    /// `data` is decoded as an empty packet.
    pub fn parse_range<F>(&mut self, data: &[u8], offset: usize, length: usize, output: F)
    where
        F: FnMut(CuesWithTiming),
    {
        let packet = offset
            .checked_add(length)
            .and_then(|end| data.get(offset..end))
            .unwrap_or(&[]);
        self.parse(packet, output);
    }

    /// Decode one packet, reporting why no cue was produced.
    pub fn decode_packet(&mut self, data: &[u8]) -> Result<Cue, SpuError> {
        let packet = if self.options.inflate {
            self.inflater.maybe_inflate(data).unwrap_or(data)
        } else {
            data
        };

        self.state.reset();
        decode_spu(&self.idx, &mut self.state, packet)
    }
}

/// Interpret the packet header and control sequence, then rasterize the bitmap.
fn decode_spu(idx: &VobSubIdx, state: &mut DecodeState, packet: &[u8]) -> Result<Cue, SpuError> {
    let mut reader = BigEndianReader::new(packet);

    let declared = reader.read_u16().ok_or(SpuError::TooShort(packet.len()))? as usize;
    if declared != packet.len() {
        return Err(SpuError::LengthMismatch {
            declared,
            actual: packet.len(),
        });
    }

    let palette = idx.palette.as_ref().ok_or(SpuError::MissingPalette)?;
    let frame = idx.frame_size.ok_or(SpuError::MissingFrameSize)?;

    let control_offset = reader.read_u16().ok_or(SpuError::TooShort(packet.len()))? as usize;

    // Skip the sequence's delay; its pointer to the next sequence bounds the commands.
    if !reader.set_position(control_offset + 2) {
        return Err(SpuError::ControlOutOfRange(control_offset));
    }
    let end = reader
        .read_u16()
        .ok_or(SpuError::ControlOutOfRange(control_offset))? as usize;

    parse_control(&mut reader, end, palette, state);

    if !state.has_colors {
        return Err(SpuError::MissingColors);
    }
    let area = state.area.ok_or(SpuError::MissingArea)?;
    if area.width() < 2 || area.height() < 2 {
        return Err(SpuError::AreaTooSmall {
            width: area.width(),
            height: area.height(),
        });
    }
    let offsets = state.data_offsets.ok_or(SpuError::MissingDataOffsets)?;

    let width = area.width() as usize;
    let height = area.height() as usize;
    let bitmap = decode_vobsub_rle(packet, offsets, &state.colors, width, height);

    let frame_width = frame.width as f32;
    let frame_height = frame.height as f32;

    Ok(Cue {
        bitmap,
        bitmap_width: area.width(),
        bitmap_height: area.height(),
        position: area.left as f32 / frame_width,
        position_anchor: Anchor::Start,
        line: area.top as f32 / frame_height,
        line_type: LineType::Fraction,
        line_anchor: Anchor::Start,
        size: area.width() as f32 / frame_width,
        bitmap_height_fraction: area.height() as f32 / frame_height,
    })
}

#[wasm_bindgen]
impl VobSubDecoder {
    /// Create a decoder from IDX metadata text.
    #[wasm_bindgen(constructor)]
    pub fn new(idx_content: &str) -> Self {
        Self::with_options(idx_content, DecoderOptions::default())
    }

    /// Whether both the palette and frame size were found in the metadata.
    #[wasm_bindgen(getter, js_name = isConfigured)]
    pub fn is_configured(&self) -> bool {
        self.idx.is_complete()
    }

    /// Decode one packet, returning the frame or `undefined`.
    #[wasm_bindgen]
    pub fn decode(&mut self, data: &[u8]) -> Option<VobSubFrame> {
        let mut frame = None;
        self.parse(data, |result| {
            frame = result.cues.first().map(VobSubFrame::from);
        });
        frame
    }
}

/// A decoded VobSub frame with geometry relative to the video frame.
#[wasm_bindgen]
pub struct VobSubFrame {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    bitmap_width: u32,
    bitmap_height: u32,
    rgba: Vec<u8>,
}

impl From<&Cue> for VobSubFrame {
    fn from(cue: &Cue) -> Self {
        Self {
            x: cue.position,
            y: cue.line,
            width: cue.size,
            height: cue.bitmap_height_fraction,
            bitmap_width: cue.bitmap_width,
            bitmap_height: cue.bitmap_height,
            rgba: cue.to_rgba_bytes(),
        }
    }
}

#[wasm_bindgen]
impl VobSubFrame {
    /// Left edge as a fraction of the frame width.
    #[wasm_bindgen(getter)]
    pub fn x(&self) -> f32 {
        self.x
    }

    /// Top edge as a fraction of the frame height.
    #[wasm_bindgen(getter)]
    pub fn y(&self) -> f32 {
        self.y
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> f32 {
        self.height
    }

    #[wasm_bindgen(getter, js_name = bitmapWidth)]
    pub fn bitmap_width(&self) -> u32 {
        self.bitmap_width
    }

    #[wasm_bindgen(getter, js_name = bitmapHeight)]
    pub fn bitmap_height(&self) -> u32 {
        self.bitmap_height
    }

    /// Get RGBA pixel data as Uint8Array.
    #[wasm_bindgen(js_name = getRgba)]
    pub fn get_rgba(&self) -> Uint8Array {
        Uint8Array::from(&self.rgba[..])
    }
}
