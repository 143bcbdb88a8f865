//! Field module - manages the playing grid
//!
//! The field is `width` columns by `visible_height + OVERFLOW_ROWS` rows.
//! Each cell is a 2-bit [`Cell`]; empty means both bits clear.
//! Coordinates: (x, y) where x grows left to right and y grows bottom to top,
//! so row 0 is the floor and the last row is the top of the overflow area.
//! Storage is a flat row-major vector (`y * width + x`), allocated once.

use crate::types::{Cell, OVERFLOW_ROWS};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    width: usize,
    visible_height: usize,
    cells: Vec<Cell>,
}

impl Field {
    /// Create an empty field; the overflow rows are added on top of `visible_height`
    pub fn new(width: usize, visible_height: usize) -> Self {
        let rows = visible_height + OVERFLOW_ROWS;
        Self {
            width,
            visible_height,
            cells: vec![Cell::EMPTY; width * rows],
        }
    }

    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.is_out_of_bounds(x, y) {
            return None;
        }
        Some((y as usize) * self.width + (x as usize))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn visible_height(&self) -> usize {
        self.visible_height
    }

    /// Total rows, overflow included
    pub fn rows(&self) -> usize {
        self.visible_height + OVERFLOW_ROWS
    }

    /// Get cell at (x, y); None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at (x, y); returns false if out of bounds
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    pub fn is_out_of_bounds(&self, x: i32, y: i32) -> bool {
        x < 0 || x >= self.width as i32 || y < 0 || y >= self.rows() as i32
    }

    /// Within bounds and filled
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        matches!(self.get(x, y), Some(cell) if cell.is_occupied())
    }

    /// Within bounds and empty
    pub fn is_free(&self, x: i32, y: i32) -> bool {
        matches!(self.get(x, y), Some(cell) if !cell.is_occupied())
    }

    pub fn row(&self, y: usize) -> &[Cell] {
        let start = y * self.width;
        &self.cells[start..start + self.width]
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        y < self.rows() && self.row(y).iter().all(|cell| cell.is_occupied())
    }

    /// Delete row `y` and append an empty row at the top.
    ///
    /// Everything above `y` moves down by exactly one row as a block.
    pub fn remove_row(&mut self, y: usize) {
        if y >= self.rows() {
            return;
        }
        let start = y * self.width;
        self.cells.copy_within(start + self.width.., start);
        let top = self.cells.len() - self.width;
        self.cells[top..].fill(Cell::EMPTY);
    }

    /// Remove every full row, scanning bottom to top.
    ///
    /// After a removal the same index is checked again, since the row above
    /// slid into it. Returns the number of rows removed.
    pub fn clear_full_rows(&mut self) -> usize {
        let mut cleared = 0;
        let mut y = 0;
        while y < self.rows() {
            if self.is_row_full(y) {
                self.remove_row(y);
                cleared += 1;
            } else {
                y += 1;
            }
        }
        cleared
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_occupied()).count()
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }
}

impl Default for Field {
    fn default() -> Self {
        Self::new(
            crate::types::FIELD_WIDTH as usize,
            crate::types::FIELD_HEIGHT as usize,
        )
    }
}
