//! Core game logic - pure, deterministic, and testable
//!
//! Everything needed to play one NES-style game on one field: geometry,
//! rotation tables, line clearing, scoring and leveling. No I/O, no
//! threads, no terminal. The network layer drives an engine and ships its
//! [`GameSnapshot`]s; the front end renders them.
//!
//! # Module Structure
//!
//! - [`field`]: the grid of 2-bit cells, overflow rows included
//! - [`pieces`]: per-rotation block offsets and per-kind appearance
//! - [`rng`]: per-engine random source with collision-free seeding
//! - [`scoring`]: line-clear table and level-up thresholds
//! - [`engine`]: the state machine tying the above together
//! - [`snapshot`]: the observable state of one engine
//!
//! # Game Rules
//!
//! - **Uniform randomizer**: every piece is drawn independently from the 7 kinds
//! - **NES rotation**: one candidate per rotation, no wall kicks
//! - **No hold, no ghost, no hard drop**: soft drop is the only acceleration
//! - **Instant lock**: a piece lands the moment it cannot move down
//! - **Mode B**: a pre-seeded field and 25 lines to clear
//!
//! # Example
//!
//! ```
//! use netris_core::{GameConfig, GameEngine};
//! use netris_core::types::{GameAction, PieceKind};
//!
//! let mut game = GameEngine::with_seed(GameConfig::default(), 12345);
//! game.set_current(PieceKind::O);
//! game.apply_action(GameAction::MoveLeft);
//!
//! game.set_soft_drop(true);
//! while game.move_down() {}
//!
//! assert_eq!(game.field().occupied_count(), 4);
//! assert!(game.score() > 0); // soft drop awards points
//! ```

pub mod engine;
pub mod field;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use netris_types as types;

// Re-export commonly used types for convenience
pub use engine::{GameConfig, GameEngine, Piece};
pub use field::Field;
pub use pieces::{appearance, get_shape};
pub use rng::GameRng;
pub use scoring::{line_clear_score, should_level_up};
pub use snapshot::GameSnapshot;
