//! Terminal input (engine-facing).
//!
//! Maps `crossterm` key events into [`crate::types::GameAction`] and turns
//! held movement keys into a fixed-rate repeat, independent of the gravity
//! level. Works in terminals without key-release events by treating a key as
//! released once it stops auto-repeating.

pub mod handler;
pub mod map;

pub use netris_types as types;

pub use handler::InputHandler;
pub use map::{handle_key_event, is_held_key, should_quit};
