//! Reasons a subpicture packet produces no cue.

use thiserror::Error;

/// Why a packet was rejected. None of these are fatal to the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpuError {
    /// The metadata had no `palette:` line.
    #[error("no palette configured")]
    MissingPalette,

    /// The metadata had no usable `size:` line.
    #[error("no reference frame size configured")]
    MissingFrameSize,

    /// Fewer bytes than the packet header needs.
    #[error("packet too short: {0} bytes")]
    TooShort(usize),

    /// Declared packet size disagrees with the bytes actually present.
    #[error("packet size mismatch: declared {declared}, actual {actual}")]
    LengthMismatch {
        /// Size from the packet header.
        declared: usize,
        /// Bytes available.
        actual: usize,
    },

    /// The control section lies outside the packet.
    #[error("control section offset {0} out of range")]
    ControlOutOfRange(usize),

    #[error("no color command")]
    MissingColors,

    #[error("no display area command")]
    MissingArea,

    /// Display area narrower or shorter than 2 pixels.
    #[error("display area too small: {width}x{height}")]
    AreaTooSmall {
        /// Area width in pixels.
        width: u32,
        /// Area height in pixels.
        height: u32,
    },

    #[error("no field offsets command")]
    MissingDataOffsets,
}
