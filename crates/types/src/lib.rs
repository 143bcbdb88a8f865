//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are plain data with no external dependencies, so they can be
//! shared by the engine, the network layer and the terminal front end.
//!
//! # Field Dimensions
//!
//! The classic NES playfield is the default:
//!
//! - **Width**: 10 columns (indexed 0-9, left to right)
//! - **Visible height**: 20 rows (indexed 0-19, bottom to top)
//! - **Overflow**: 2 hidden rows above the visible area, so a piece may
//!   rotate while its top sticks out of the field
//!
//! # Timing
//!
//! Gravity depends only on the level:
//!
//! | Level | Interval |
//! |-------|----------|
//! | 0 | 1000ms |
//! | 1 | 500ms |
//! | 4 | 200ms |
//! | 9 | 100ms |
//! | 20+ | 50ms |
//!
//! # Examples
//!
//! ```
//! use netris_types::{gravity_interval_ms, Cell, PieceKind, Rotation};
//!
//! let kind = PieceKind::ALL[6];
//! assert_eq!(kind, PieceKind::T);
//! assert_eq!(kind.index(), 6);
//!
//! let r = Rotation::SPAWN.rotate_left();
//! assert_eq!(r.index(), 1);
//! assert_eq!(r.rotate_right(), Rotation::SPAWN);
//!
//! assert!(!Cell::EMPTY.is_occupied());
//! assert!(Cell::from_bits(true, false).is_occupied());
//!
//! assert_eq!(gravity_interval_ms(0), 1000);
//! assert_eq!(gravity_interval_ms(25), 50);
//! ```

/// Default field width in cells (10 columns)
pub const FIELD_WIDTH: u8 = 10;

/// Default visible field height in cells (20 rows)
pub const FIELD_HEIGHT: u8 = 20;

/// Hidden rows above the visible area
pub const OVERFLOW_ROWS: usize = 2;

/// Number of piece kinds
pub const PIECE_KINDS: usize = 7;

/// Lines to clear in mode B
pub const MODE_B_LINES: i32 = 25;

/// Cleared lines needed per level step
pub const LINES_PER_LEVEL: u32 = 10;

/// Line clear scoring table (NES scoring)
///
/// Base points for clearing N lines at level 0, multiplied by (level + 1).
pub const LINE_SCORES: [u64; 5] = [0, 40, 100, 300, 1200];

/// Gravity interval at level 0 (1000ms = 1 second per row)
pub const BASE_GRAVITY_MS: u32 = 1000;

/// Fastest gravity interval, reached at `MAX_GRAVITY_LEVEL`
pub const MIN_GRAVITY_MS: u32 = 50;

/// First level running at `MIN_GRAVITY_MS`
pub const MAX_GRAVITY_LEVEL: u32 = 20;

/// Interval of the held-key repeat (left/right/soft drop), independent of level
pub const INPUT_REPEAT_MS: u32 = 50;

/// Default read timeout of the mirror worker (5 seconds)
pub const MIRROR_READ_TIMEOUT_MS: u64 = 5000;

/// Gravity interval for a level, in milliseconds.
pub fn gravity_interval_ms(level: u32) -> u32 {
    if level < MAX_GRAVITY_LEVEL {
        BASE_GRAVITY_MS / (level + 1)
    } else {
        MIN_GRAVITY_MS
    }
}

/// The seven tetromino piece kinds
///
/// The declaration order is the wire order of the per-kind statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    O,
    J,
    L,
    I,
    S,
    Z,
    T,
}

impl PieceKind {
    /// All kinds in wire order
    pub const ALL: [PieceKind; PIECE_KINDS] = [
        PieceKind::O,
        PieceKind::J,
        PieceKind::L,
        PieceKind::I,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::T,
    ];

    /// Index in `[0, 7)`, matching [`PieceKind::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// One-letter label for the statistics panel
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::O => "O",
            PieceKind::J => "J",
            PieceKind::L => "L",
            PieceKind::I => "I",
            PieceKind::S => "S",
            PieceKind::Z => "Z",
            PieceKind::T => "T",
        }
    }
}

/// Rotation state of a piece, an index in `[0, 4)`
///
/// Index 0 is the spawn orientation. Rotating left advances the index,
/// rotating right retreats it, so a left/right pair always cancels out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rotation(u8);

impl Rotation {
    /// Spawn orientation
    pub const SPAWN: Rotation = Rotation(0);

    /// Build from any index; wraps modulo 4
    pub fn new(index: u8) -> Self {
        Rotation(index % 4)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Counter-clockwise: `(index + 1) mod 4`
    pub fn rotate_left(self) -> Self {
        Rotation((self.0 + 1) % 4)
    }

    /// Clockwise: `(index + 3) mod 4`
    pub fn rotate_right(self) -> Self {
        Rotation((self.0 + 3) % 4)
    }
}

/// One field cell: two bits, `type` and `color`
///
/// `(false, false)` is the only empty pattern. The three other patterns are
/// the block appearances a piece can leave behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell(u8);

impl Cell {
    pub const EMPTY: Cell = Cell(0);

    /// Build from the 2-bit code (bit 0 = type, bit 1 = color); higher bits are dropped
    pub const fn from_code(code: u8) -> Self {
        Cell(code & 0b11)
    }

    pub const fn from_bits(type_bit: bool, color_bit: bool) -> Self {
        Cell((type_bit as u8) | ((color_bit as u8) << 1))
    }

    pub const fn code(self) -> u8 {
        self.0
    }

    pub const fn type_bit(self) -> bool {
        self.0 & 0b01 != 0
    }

    pub const fn color_bit(self) -> bool {
        self.0 & 0b10 != 0
    }

    pub const fn is_occupied(self) -> bool {
        self.0 != 0
    }
}

/// Playing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameMode {
    /// Endurance: no win condition, ends only in game over
    #[default]
    A,
    /// Target: clear 25 lines from a pre-seeded field
    B,
}

impl GameMode {
    pub fn is_b(self) -> bool {
        self == GameMode::B
    }

    /// Wire flag used by the handshake (0 = A, 1 = B)
    pub fn flag(self) -> u8 {
        match self {
            GameMode::A => 0,
            GameMode::B => 1,
        }
    }

    pub fn from_flag(flag: u8) -> Self {
        if flag == 1 {
            GameMode::B
        } else {
            GameMode::A
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "a" => Some(GameMode::A),
            "b" => Some(GameMode::B),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::A => "A",
            GameMode::B => "B",
        }
    }
}

/// Game actions that can be applied to a local engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameAction {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Move piece one cell down (lands it on collision)
    MoveDown,
    /// Rotate piece counter-clockwise
    RotateLeft,
    /// Rotate piece clockwise
    RotateRight,
    /// Toggle pause (single player only)
    Pause,
}

/// Notification raised by an engine or by the network layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notification {
    /// The freshly spawned piece collides (or the peer reported game over)
    GameOver,
    /// Mode B target reached
    Victory,
    /// Level increased; carries the new level
    LevelUp(u32),
    /// Stream read/write failed or timed out; terminal for the session
    ConnectionError,
}
