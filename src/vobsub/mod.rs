//! VobSub (DVD subtitle) subpicture decoding.
//!
//! This module turns single subpicture units plus IDX metadata into bitmap cues.

mod idx_parser;
mod inflate;
mod sub_parser;
mod vobsub_parser;
mod rle;

pub use idx_parser::*;
pub use inflate::*;
pub use sub_parser::*;
pub use vobsub_parser::*;
pub use rle::*;
