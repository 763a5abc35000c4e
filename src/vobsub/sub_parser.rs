//! VobSub SPU control sequence parser.
//!
//! A subpicture unit is laid out as:
//!
//! ```text
//! +------+-------------+------------------+----------------------+
//! | size | ctrl offset | RLE pixel fields | control sequence(s)  |
//! | u16  | u16         |                  | delay u16, next u16, |
//! |      |             |                  | commands ... 0xFF    |
//! +------+-------------+------------------+----------------------+
//! ```
//!
//! Only the first control sequence is interpreted; its `next` pointer bounds the command
//! loop.

use log::trace;

use super::VobSubPalette;
use crate::utils::{set_alpha, BigEndianReader};

const CMD_COLORS: u8 = 0x03;
const CMD_ALPHA: u8 = 0x04;
const CMD_AREA: u8 = 0x05;
const CMD_OFFSETS: u8 = 0x06;
const CMD_END: u8 = 0xFF;

/// Display area in reference frame pixels. `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayArea {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl DisplayArea {
    #[inline]
    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }
}

/// A single command of a control sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Palette indices for colors 3, 2, 1, 0.
    Colors([u8; 4]),
    /// Alpha nibbles for colors 3, 2, 1, 0.
    Alpha([u8; 4]),
    Area(DisplayArea),
    /// Byte offsets of the even and odd RLE fields.
    Offsets(u16, u16),
    End,
    /// Any other opcode. Consumed without operands.
    Unknown(u8),
}

impl ControlCommand {
    /// Read one command. `None` means the opcode was read but its operands are truncated.
    pub fn read(reader: &mut BigEndianReader) -> Option<Self> {
        let opcode = reader.read_u8()?;
        let command = match opcode {
            CMD_COLORS => Self::Colors(reader.read_nibbles()?),
            CMD_ALPHA => Self::Alpha(reader.read_nibbles()?),
            CMD_AREA => {
                if reader.remaining() < 6 {
                    return None;
                }
                let (left, right) = reader.read_u12_pair()?;
                let (top, bottom) = reader.read_u12_pair()?;
                // Wire coordinates are inclusive.
                Self::Area(DisplayArea {
                    left: left as u32,
                    top: top as u32,
                    right: right as u32 + 1,
                    bottom: bottom as u32 + 1,
                })
            }
            CMD_OFFSETS => {
                if reader.remaining() < 4 {
                    return None;
                }
                Self::Offsets(reader.read_u16()?, reader.read_u16()?)
            }
            CMD_END => Self::End,
            other => Self::Unknown(other),
        };
        Some(command)
    }
}

/// Per-packet state built up by the control commands.
///
/// Completeness is tracked with the option fields and `has_colors`, never by
/// inspecting color values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeState {
    /// ARGB colors for the four pixel codes.
    pub colors: [u32; 4],
    pub has_colors: bool,
    pub area: Option<DisplayArea>,
    /// Even and odd field offsets.
    pub data_offsets: Option<(usize, usize)>,
}

impl DecodeState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Colors, area, and offsets have all been set.
    pub fn is_complete(&self) -> bool {
        self.has_colors && self.area.is_some() && self.data_offsets.is_some()
    }

    pub fn apply(&mut self, command: ControlCommand, palette: &VobSubPalette) {
        match command {
            ControlCommand::Colors(indices) => {
                for (slot, &index) in indices.iter().enumerate() {
                    self.colors[3 - slot] = palette.color(index as usize);
                }
                self.has_colors = true;
            }
            ControlCommand::Alpha(alphas) => {
                for (slot, &alpha) in alphas.iter().enumerate() {
                    self.colors[3 - slot] = set_alpha(self.colors[3 - slot], alpha);
                }
            }
            ControlCommand::Area(area) => self.area = Some(area),
            ControlCommand::Offsets(even, odd) => {
                self.data_offsets = Some((even as usize, odd as usize));
            }
            ControlCommand::End | ControlCommand::Unknown(_) => {}
        }
    }
}

/// Run control commands from the reader's position until `end`, an end command, or
/// truncated operands. State applied before a truncation is kept.
pub fn parse_control(
    reader: &mut BigEndianReader,
    end: usize,
    palette: &VobSubPalette,
    state: &mut DecodeState,
) {
    while reader.position() < end && reader.remaining() > 0 {
        let Some(command) = ControlCommand::read(reader) else {
            trace!("control sequence truncated at {}", reader.position());
            return;
        };

        match command {
            ControlCommand::End => return,
            ControlCommand::Unknown(opcode) => {
                trace!("skipping control opcode {:#04x}", opcode);
            }
            command => state.apply(command, palette),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette() -> VobSubPalette {
        VobSubPalette {
            rgb: vec![0x000000, 0xFFFFFF, 0xFF0000, 0x00FF00],
        }
    }

    fn run(commands: &[u8]) -> DecodeState {
        let mut state = DecodeState::default();
        let mut reader = BigEndianReader::new(commands);
        parse_control(&mut reader, commands.len(), &palette(), &mut state);
        state
    }

    #[test]
    fn test_full_control_sequence() {
        let state = run(&[
            0x03, 0x32, 0x10, // colors: 3=3, 2=2, 1=1, 0=0
            0x04, 0xFF, 0xF0, // alpha: 3=F, 2=F, 1=F, 0=0
            0x05, 0x00, 0xA0, 0x6D, 0x01, 0x40, 0xDB, // x 10..109, y 20..219
            0x06, 0x00, 0x04, 0x00, 0x20, // offsets
            0xFF,
        ]);

        assert!(state.is_complete());
        assert_eq!(
            state.area,
            Some(DisplayArea {
                left: 10,
                top: 20,
                right: 110,
                bottom: 220
            })
        );
        assert_eq!(state.data_offsets, Some((4, 32)));
        assert_eq!(state.colors, [0x0000_0000, 0xFFFF_FFFF, 0xFFFF_0000, 0xFF00_FF00]);
    }

    #[test]
    fn test_out_of_range_color_uses_first_entry() {
        let state = run(&[0x03, 0xF0, 0x00, 0xFF]);
        assert!(state.has_colors);
        assert_eq!(state.colors[3], 0x000000);
    }

    #[test]
    fn test_truncated_area_keeps_colors() {
        let state = run(&[0x03, 0x00, 0x01, 0x05, 0x00, 0x00, 0x00]);
        assert!(state.has_colors);
        assert_eq!(state.colors[0], 0xFFFFFF);
        assert_eq!(state.area, None);
        assert!(!state.is_complete());
    }

    #[test]
    fn test_truncation_stops_the_loop() {
        // Alpha needs two operand bytes.
        let state = run(&[0x04, 0xFF]);
        assert_eq!(state, DecodeState::default());
    }

    #[test]
    fn test_end_stops_the_loop() {
        let state = run(&[0xFF, 0x03, 0x00, 0x01]);
        assert!(!state.has_colors);
    }

    #[test]
    fn test_unknown_opcode_is_skipped_alone() {
        let state = run(&[0x01, 0x00, 0x03, 0x11, 0x11, 0xFF]);
        assert!(state.has_colors);
        assert_eq!(state.colors, [0xFFFFFF; 4]);
    }

    #[test]
    fn test_end_offset_bounds_the_loop() {
        let commands = [0x03, 0x11, 0x11, 0x06, 0x00, 0x04, 0x00, 0x08];
        let mut state = DecodeState::default();
        let mut reader = BigEndianReader::new(&commands);
        parse_control(&mut reader, 3, &palette(), &mut state);
        assert!(state.has_colors);
        assert_eq!(state.data_offsets, None);
    }
}
