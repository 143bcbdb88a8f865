use crate::field::Field;
use crate::types::PIECE_KINDS;

/// Everything an observer can see of one engine.
///
/// The falling piece is already merged into `field`. This is the unit the
/// network layer ships as one frame, and what a mirror overwrites wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    pub game_over: bool,
    pub statistics: [u32; PIECE_KINDS],
    pub score: u64,
    pub level: u32,
    /// Mode A: rows cleared. Mode B: rows remaining (may go negative).
    pub lines: i32,
    pub field: Field,
}

impl GameSnapshot {
    /// Blank snapshot for a field of the given size
    pub fn empty(width: usize, visible_height: usize) -> Self {
        Self {
            game_over: false,
            statistics: [0; PIECE_KINDS],
            score: 0,
            level: 0,
            lines: 0,
            field: Field::new(width, visible_height),
        }
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self::empty(
            crate::types::FIELD_WIDTH as usize,
            crate::types::FIELD_HEIGHT as usize,
        )
    }
}
