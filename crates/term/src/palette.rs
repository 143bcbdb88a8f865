//! NES block palette
//!
//! Two colors per level, repeating every ten levels. A block's type bit picks
//! the first or second color; its color bit picks between a solid block and
//! a framed one.

use crate::fb::{Glyph, Rgb, Style};
use crate::types::Cell;

const PALETTE: [[u32; 2]; 10] = [
    [0x0058f8, 0x3cbcfc],
    [0x00a800, 0xb8f818],
    [0xd800cc, 0xf878f8],
    [0x0058f8, 0x58d854],
    [0xe40058, 0x58f898],
    [0x58f898, 0x6888fc],
    [0xf83800, 0x7c7c7c],
    [0x6844fc, 0xa80020],
    [0x0058f8, 0xf83800],
    [0xf83800, 0xfca044],
];

pub fn block_color(level: u32, type_bit: bool) -> Rgb {
    let pair = PALETTE[(level % 10) as usize];
    Rgb::hex(if type_bit { pair[0] } else { pair[1] })
}

/// Glyph for one column of a block; `None` for an empty cell
pub fn block_glyph(cell: Cell, level: u32, column: u16) -> Option<Glyph> {
    if !cell.is_occupied() {
        return None;
    }
    let color = block_color(level, cell.type_bit());
    let glyph = if cell.color_bit() {
        let ch = if column % 2 == 0 { '[' } else { ']' };
        Glyph::new(ch, Style::new(Rgb::WHITE, color).bold())
    } else {
        Glyph::new(' ', Style::new(color, color))
    };
    Some(glyph)
}
