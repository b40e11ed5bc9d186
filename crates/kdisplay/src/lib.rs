//! Framebuffer text console.
//!
//! Layers, bottom up: [`canvas`] pixel primitives, [`font`] atlases,
//! [`utf8`] decoding, and the [`console`] state machine tying them together.

#![cfg_attr(not(test), no_std)]

pub mod canvas;
pub mod console;
pub mod fmt;
pub mod font;
pub mod utf8;

pub use canvas::{Canvas, Color, Rect};
pub use console::{Console, ConsoleConfig, Cursor, EscapeState, PALETTE};
pub use font::{BAKED_FAMILY, BITMAP_FAMILY, FontAtlas, FontFamily};
pub use utf8::{Decoded, Utf8Flags};
