//! netris (workspace facade crate).
//!
//! Re-exports the workspace crates under short names so the binary, the
//! integration tests and the benches share one import path:
//! `netris::{core, input, net, term, types}`.

pub use netris_core as core;
pub use netris_input as input;
pub use netris_net as net;
pub use netris_term as term;
pub use netris_types as types;
