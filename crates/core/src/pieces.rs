//! Pieces module - tetromino geometry (NES rotation, no wall kicks)
//!
//! Every piece is four blocks around a pivot. The pivot sits at `(0, 0)` in
//! all rotations; the other three offsets are looked up per rotation.
//! Offsets are `(dx, dy)` with `dy` growing downward, so a block at offset
//! `(dx, dy)` of a piece pivoted at `(x, y)` occupies column `x + dx`,
//! row `y - dy` (row 0 is the bottom of the field).

use crate::types::{Cell, PieceKind, Rotation};

/// Offset of a single block relative to the pivot
pub type BlockOffset = (i8, i8);

/// Shape of a piece - 4 block offsets, pivot first
pub type PieceShape = [BlockOffset; 4];

const P: BlockOffset = (0, 0);

/// `SHAPES[kind][rotation]`, kinds in `PieceKind::ALL` order
const SHAPES: [[PieceShape; 4]; 7] = [
    // O: all four rotations are the same square
    [
        [P, (1, 0), (0, 1), (1, 1)],
        [P, (1, 0), (0, 1), (1, 1)],
        [P, (1, 0), (0, 1), (1, 1)],
        [P, (1, 0), (0, 1), (1, 1)],
    ],
    // J
    [
        [P, (-1, 0), (1, 0), (1, 1)],
        [P, (0, 1), (0, -1), (1, -1)],
        [P, (-1, 0), (1, 0), (-1, -1)],
        [P, (0, -1), (0, 1), (-1, 1)],
    ],
    // L
    [
        [P, (-1, 0), (1, 0), (-1, 1)],
        [P, (0, -1), (0, 1), (1, 1)],
        [P, (-1, 0), (1, 0), (1, -1)],
        [P, (0, 1), (0, -1), (-1, -1)],
    ],
    // I: horizontal on even rotations, vertical on odd ones
    [
        [P, (1, 0), (-1, 0), (-2, 0)],
        [P, (0, 1), (0, -1), (0, -2)],
        [P, (1, 0), (-1, 0), (-2, 0)],
        [P, (0, 1), (0, -1), (0, -2)],
    ],
    // S
    [
        [P, (-1, 1), (1, 0), (0, 1)],
        [P, (1, 0), (1, 1), (0, -1)],
        [P, (-1, 1), (1, 0), (0, 1)],
        [P, (1, 0), (1, 1), (0, -1)],
    ],
    // Z
    [
        [P, (0, 1), (1, 1), (-1, 0)],
        [P, (-1, 0), (-1, 1), (0, -1)],
        [P, (0, 1), (1, 1), (-1, 0)],
        [P, (-1, 0), (-1, 1), (0, -1)],
    ],
    // T
    [
        [P, (-1, 0), (1, 0), (0, 1)],
        [P, (0, -1), (1, 0), (0, 1)],
        [P, (0, -1), (1, 0), (-1, 0)],
        [P, (0, -1), (0, 1), (-1, 0)],
    ],
];

/// Get the block offsets for a piece kind and rotation
pub fn get_shape(kind: PieceKind, rotation: Rotation) -> PieceShape {
    SHAPES[kind.index()][rotation.index()]
}

/// Block appearance left behind by a piece kind (constant across rotations)
pub fn appearance(kind: PieceKind) -> Cell {
    match kind {
        PieceKind::O | PieceKind::I | PieceKind::T => Cell::from_bits(false, true),
        PieceKind::J | PieceKind::S => Cell::from_bits(true, true),
        PieceKind::L | PieceKind::Z => Cell::from_bits(true, false),
    }
}
