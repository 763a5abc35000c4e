//! VobSub IDX metadata parser.
//!
//! The metadata block carries the color palette and the size of the video frame the
//! subtitles were authored against. Everything else in it is ignored.

use log::warn;

/// VobSub palette: 24-bit RGB colors in IDX order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VobSubPalette {
    /// Colors as `0x00RRGGBB`. Never empty.
    pub rgb: Vec<u32>,
}

impl VobSubPalette {
    /// Look up a color, falling back to entry 0 for out-of-range indices.
    #[inline]
    pub fn color(&self, index: usize) -> u32 {
        self.rgb
            .get(index)
            .or_else(|| self.rgb.first())
            .copied()
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.rgb.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rgb.is_empty()
    }
}

/// Reference frame dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

/// Parsed IDX metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VobSubIdx {
    pub palette: Option<VobSubPalette>,
    pub frame_size: Option<FrameSize>,
}

impl VobSubIdx {
    /// Both the palette and the frame size are present.
    pub fn is_complete(&self) -> bool {
        self.palette.is_some() && self.frame_size.is_some()
    }
}

/// Parse VobSub IDX metadata.
pub fn parse_idx(idx_content: &str) -> VobSubIdx {
    let mut result = VobSubIdx::default();

    for line in idx_content.lines() {
        // Keep trailing whitespace so a bare `palette: ` still matches.
        let trimmed = line.trim_start();

        if let Some(rest) = trimmed.strip_prefix("palette: ") {
            let rgb = rest.split(',').map(|token| parse_color(token.trim())).collect();
            result.palette = Some(VobSubPalette { rgb });
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("size: ") {
            match parse_size(rest.trim()) {
                Some(size) => result.frame_size = Some(size),
                None => warn!("ignoring unparsable size line {:?}", trimmed),
            }
        }
    }

    if result.palette.is_none() {
        warn!("IDX metadata has no palette; no subtitles will be decoded");
    }
    if result.frame_size.is_none() {
        warn!("IDX metadata has no frame size; no subtitles will be decoded");
    }

    result
}

/// Largest color value accepted; anything wider is unparsable.
const MAX_COLOR: u32 = i32::MAX as u32;

/// Parse a hex color token. Unparsable tokens become black. Values up to 31 bits are
/// accepted and keep only their RGB bits.
fn parse_color(token: &str) -> u32 {
    let hex = token.strip_prefix('#').unwrap_or(token);
    match u32::from_str_radix(hex, 16) {
        Ok(value) if value <= MAX_COLOR => value & 0x00FF_FFFF,
        _ => 0,
    }
}

/// Parse `<width>x<height>`.
fn parse_size(value: &str) -> Option<FrameSize> {
    let mut parts = value.split('x');
    let (w_str, h_str) = (parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let width = w_str.parse::<u32>().ok()?;
    let height = h_str.parse::<u32>().ok()?;
    if width == 0 || height == 0 {
        return None;
    }
    Some(FrameSize { width, height })
}
