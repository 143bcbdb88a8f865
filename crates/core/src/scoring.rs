//! Scoring module - NES line-clear table and leveling policy
//!
//! The score for a landing depends only on how many rows it cleared and the
//! level in effect before any level-up from that landing. There are no
//! combos, no back-to-back bonus and no spins.

use crate::types::{GameMode, LINES_PER_LEVEL, LINE_SCORES, MODE_B_LINES};

/// Points for clearing `lines` rows in one landing at `level`.
///
/// Only 1 to 4 rows score; anything else (including a freak multi-row clear
/// on a pre-seeded field) is worth nothing.
pub fn line_clear_score(lines: usize, level: u32) -> u64 {
    match lines {
        1..=4 => LINE_SCORES[lines] * (level as u64 + 1),
        _ => 0,
    }
}

/// Rows cleared so far, whatever the mode counts.
///
/// Mode A stores the running total; mode B stores what is left of 25.
pub fn cleared_total(mode: GameMode, lines: i32) -> i64 {
    match mode {
        GameMode::A => lines as i64,
        GameMode::B => (MODE_B_LINES - lines) as i64,
    }
}

/// Whether a landing should raise the level by one.
///
/// Checked once per landing; a single landing never raises more than one level.
pub fn should_level_up(mode: GameMode, level: u32, lines: i32) -> bool {
    let threshold = (level as i64 + 1) * LINES_PER_LEVEL as i64;
    cleared_total(mode, lines) >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_clear_score_level_0() {
        assert_eq!(line_clear_score(0, 0), 0);
        assert_eq!(line_clear_score(1, 0), 40);
        assert_eq!(line_clear_score(2, 0), 100);
        assert_eq!(line_clear_score(3, 0), 300);
        assert_eq!(line_clear_score(4, 0), 1200);
    }

    #[test]
    fn test_line_clear_score_level_4() {
        assert_eq!(line_clear_score(1, 4), 200);
        assert_eq!(line_clear_score(2, 4), 500);
        assert_eq!(line_clear_score(3, 4), 1500);
        assert_eq!(line_clear_score(4, 4), 6000);
    }

    #[test]
    fn test_oversized_clear_scores_nothing() {
        assert_eq!(line_clear_score(5, 3), 0);
    }

    #[test]
    fn test_mode_a_threshold() {
        assert!(!should_level_up(GameMode::A, 0, 9));
        assert!(should_level_up(GameMode::A, 0, 10));
        assert!(!should_level_up(GameMode::A, 1, 19));
        assert!(should_level_up(GameMode::A, 1, 20));
    }

    #[test]
    fn test_mode_b_threshold_counts_down() {
        assert!(!should_level_up(GameMode::B, 0, 16));
        assert!(should_level_up(GameMode::B, 0, 15));
        assert!(should_level_up(GameMode::B, 1, 5));
        assert!(!should_level_up(GameMode::B, 2, 0));
    }
}
