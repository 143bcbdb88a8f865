//! Network layer - two engines over one byte stream
//!
//! Each player runs a real [`GameEngine`](netris_core::GameEngine) locally and
//! pushes its observable state to the peer after every change. The peer only
//! displays what it receives. There is no lockstep and no input exchange.
//!
//! # Roles
//!
//! - [`Transmitter`]: drives the local engine and writes one snapshot frame
//!   per operation. The host also writes the 8-byte handshake that fixes the
//!   level and mode for both players.
//! - [`Mirror`]: background worker that reads the peer's frames into a
//!   mutex-guarded [`GameSnapshot`](netris_core::GameSnapshot).
//! - [`Session`]: owns one of each plus the event channel, and decides when
//!   the match is over.
//!
//! # Failure model
//!
//! I/O errors never leave this crate as `Err`. A failed read or write turns
//! into a single [`Notification::ConnectionError`](netris_types::Notification)
//! on the event channel, and the session treats it as terminal.
//!
//! # Environment Variables
//!
//! - `NETRIS_READ_TIMEOUT_MS`: mirror read timeout (default: 5000)
//! - `NETRIS_WIRE_LOG`: append every handshake and frame as JSON lines to this file

pub mod config;
pub mod events;
pub mod mirror;
pub mod protocol;
pub mod session;
pub mod stream;
pub mod transmit;
pub mod wire_log;

pub use netris_core as core;
pub use netris_types as types;

pub use config::NetConfig;
pub use events::{channel, EventReceiver, EventSink, NetEvent, Side};
pub use mirror::Mirror;
pub use protocol::{
    decode_snapshot, encode_snapshot, frame_len, FrameError, Handshake, HANDSHAKE_LEN,
};
pub use session::{Session, SessionState};
pub use stream::PeerStream;
pub use transmit::Transmitter;
pub use wire_log::{Direction, WireLog, WireRecord};
