//! Field tests - bounds, overflow rows and line clearing

use netris::core::Field;
use netris::types::{Cell, OVERFLOW_ROWS};

const BLOCK: Cell = Cell::from_code(3);

#[test]
fn test_field_new_empty() {
    let field = Field::new(10, 20);
    assert_eq!(field.width(), 10);
    assert_eq!(field.visible_height(), 20);
    assert_eq!(field.rows(), 20 + OVERFLOW_ROWS);
    assert_eq!(field.occupied_count(), 0);
    for y in 0..field.rows() as i32 {
        for x in 0..10 {
            assert!(field.is_free(x, y), "({}, {}) should be free", x, y);
        }
    }
}

#[test]
fn test_out_of_bounds_is_neither_free_nor_occupied() {
    let field = Field::new(10, 20);
    for (x, y) in [(-1, 0), (0, -1), (10, 0), (0, 22)] {
        assert!(field.is_out_of_bounds(x, y));
        assert!(!field.is_free(x, y));
        assert!(!field.is_occupied(x, y));
        assert_eq!(field.get(x, y), None);
    }
}

#[test]
fn test_set_outside_is_ignored() {
    let mut field = Field::new(10, 20);
    assert!(!field.set(10, 5, BLOCK));
    assert!(field.set(9, 21, BLOCK));
    assert_eq!(field.occupied_count(), 1);
}

#[test]
fn test_clear_full_rows_keeps_row_count() {
    let mut field = Field::new(10, 20);
    for y in [0, 2] {
        for x in 0..10 {
            field.set(x, y, BLOCK);
        }
    }
    field.set(3, 1, BLOCK);
    field.set(7, 3, BLOCK);

    assert_eq!(field.clear_full_rows(), 2);
    assert_eq!(field.rows(), 22);
    assert_eq!(field.cells().len(), 220);
    // Row 1 slid to 0, row 3 slid to 1.
    assert!(field.is_occupied(3, 0));
    assert!(field.is_occupied(7, 1));
    assert_eq!(field.occupied_count(), 2);
}

#[test]
fn test_full_overflow_row_is_cleared_too() {
    let mut field = Field::new(4, 4);
    for x in 0..4 {
        field.set(x, 5, BLOCK);
    }
    assert!(field.is_row_full(5));
    assert_eq!(field.clear_full_rows(), 1);
    assert_eq!(field.occupied_count(), 0);
}

#[test]
fn test_non_default_dimensions() {
    let field = Field::new(6, 12);
    assert_eq!(field.rows(), 14);
    assert!(field.is_free(5, 13));
    assert!(field.is_out_of_bounds(6, 13));
}
