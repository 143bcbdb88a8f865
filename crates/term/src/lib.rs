//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer: views draw into a plain
//! framebuffer, and the renderer flushes only what changed to the terminal.
//! No widget toolkit, no layout engine.

pub mod fb;
pub mod game_view;
pub mod palette;
pub mod renderer;

pub use netris_core as core;
pub use netris_types as types;

pub use fb::{FrameBuffer, Glyph, Rgb, Style};
pub use game_view::{GameView, Overlay, PlayerPanel, Viewport};
pub use palette::{block_color, block_glyph};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
