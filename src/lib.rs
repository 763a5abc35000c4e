//! # vobsub-spu
//!
//! Decoder for DVD bitmap subtitles (VobSub subpicture units).
//!
//! Each packet, optionally zlib-compressed, is interpreted against the palette and frame
//! size from the IDX metadata and rasterized into an ARGB bitmap with normalized
//! position and size. The decoder also compiles to WebAssembly for use in browsers.

mod cue;
mod error;
mod utils;
mod vobsub;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global allocator.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize the WASM module. Call this once before using other functions.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up better error messages for panics in debug builds
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// Re-export main types
pub use cue::*;
pub use error::*;
pub use vobsub::*;
