//! Positioned bitmap cues handed to the host.

use crate::utils::argb_to_rgba_bytes;

/// Start time placeholder: the host assigns the real presentation time.
pub const TIME_UNSET: i64 = i64::MIN + 1;

/// Duration used when the container carries none (microseconds).
pub const DEFAULT_DURATION_US: i64 = 5_000_000;

/// Which edge of the cue a position refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Left edge for horizontal positions, top edge for lines.
    Start,
}

/// How the `line` value of a cue is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    /// Fraction of the frame height.
    Fraction,
}

/// How consecutive outputs of a decoder relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueReplacementBehavior {
    /// Each output replaces everything emitted before it.
    Replace,
}

/// A bitmap subtitle with geometry relative to the reference frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    /// ARGB pixels (`0xAARRGGBB`), row-major.
    pub bitmap: Vec<u32>,
    pub bitmap_width: u32,
    pub bitmap_height: u32,
    /// Left edge as a fraction of the frame width.
    pub position: f32,
    pub position_anchor: Anchor,
    /// Top edge as a fraction of the frame height.
    pub line: f32,
    pub line_type: LineType,
    pub line_anchor: Anchor,
    /// Width as a fraction of the frame width.
    pub size: f32,
    /// Height as a fraction of the frame height.
    pub bitmap_height_fraction: f32,
}

impl Cue {
    /// Pixel data in canvas byte order (`[R, G, B, A]` per pixel).
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.bitmap.len() * 4);
        for &argb in &self.bitmap {
            rgba.extend_from_slice(&argb_to_rgba_bytes(argb));
        }
        rgba
    }
}

/// Cues produced by one call, with their timing.
#[derive(Debug, Clone, PartialEq)]
pub struct CuesWithTiming {
    pub cues: Vec<Cue>,
    /// [`TIME_UNSET`] unless the producer knows better.
    pub start_time_us: i64,
    pub duration_us: i64,
}

impl CuesWithTiming {
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}
