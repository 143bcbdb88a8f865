//! Wire formats: the handshake preamble and the snapshot frame
//!
//! Everything is little-endian and fixed-size, so a reader always knows how
//! many bytes to wait for.
//!
//! # Handshake (8 bytes, host to non-host, once)
//!
//! | Offset | Size | Field |
//! |---|---|---|
//! | 0 | 4 | level, u32 |
//! | 4 | 3 | initial height, low 3 bytes |
//! | 7 | 1 | mode flag (0 = A, 1 = B) |
//!
//! # Snapshot frame (both directions, repeatedly)
//!
//! | Offset | Size | Field |
//! |---|---|---|
//! | 0 | 4 | flags, i32; bit 0 = game over |
//! | 4 | 28 | statistics, 7 x i32 in O,J,L,I,S,Z,T order |
//! | 32 | 8 | score, i64 |
//! | 40 | 4 | level, u32 |
//! | 44 | 4 | lines, i32 |
//! | 48 | var | field, 2 bits per cell, LSB-first |
//!
//! Cell `(col, row)` of the field, overflow rows included, owns bit
//! `2 * (row * width + col)` (type bit) and the bit after it (color bit).

use thiserror::Error;
use tracing::warn;

use crate::core::GameSnapshot;
use crate::types::{Cell, GameMode, PIECE_KINDS};

pub const HANDSHAKE_LEN: usize = 8;

/// Bytes before the field bits
pub const HEADER_LEN: usize = 48;

const FLAG_GAME_OVER: i32 = 1;
const HEIGHT_MASK: u32 = 0x00ff_ffff;

const OFFSET_STATS: usize = 4;
const OFFSET_SCORE: usize = 32;
const OFFSET_LEVEL: usize = 40;
const OFFSET_LINES: usize = 44;

/// Exact frame size for a field of `width` x `rows` (overflow included)
pub fn frame_len(width: usize, rows: usize) -> usize {
    HEADER_LEN + (2 * width * rows).div_ceil(8)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame length mismatch: expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("negative statistic for piece kind {kind}: {value}")]
    NegativeStatistic { kind: usize, value: i32 },

    #[error("negative score: {0}")]
    NegativeScore(i64),
}

/// Game parameters the host imposes on the non-host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handshake {
    pub level: u32,
    /// Only the low 24 bits survive the wire
    pub initial_height: u32,
    pub mode: GameMode,
}

impl Handshake {
    pub fn encode(&self) -> [u8; HANDSHAKE_LEN] {
        let mut out = [0u8; HANDSHAKE_LEN];
        out[0..4].copy_from_slice(&self.level.to_le_bytes());
        let height = (self.initial_height & HEIGHT_MASK).to_le_bytes();
        out[4..7].copy_from_slice(&height[..3]);
        out[7] = self.mode.flag();
        out
    }

    pub fn decode(bytes: &[u8; HANDSHAKE_LEN]) -> Self {
        let level = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let initial_height = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], 0]);
        Self {
            level,
            initial_height,
            mode: GameMode::from_flag(bytes[7]),
        }
    }
}

/// Serialize `snapshot` into `out`, replacing its contents.
///
/// Statistics and score travel as signed integers. Values past `i32::MAX`
/// (statistics) or `i64::MAX` (score) are sent as that maximum, with a
/// warning.
pub fn encode_snapshot(snapshot: &GameSnapshot, out: &mut Vec<u8>) {
    let field = &snapshot.field;
    let len = frame_len(field.width(), field.rows());
    out.clear();
    out.resize(len, 0);

    let flags = if snapshot.game_over { FLAG_GAME_OVER } else { 0 };
    out[0..4].copy_from_slice(&flags.to_le_bytes());
    for (i, &count) in snapshot.statistics.iter().enumerate() {
        let at = OFFSET_STATS + 4 * i;
        let count = i32::try_from(count).unwrap_or_else(|_| {
            warn!(kind = i, count, "statistic capped at i32::MAX on the wire");
            i32::MAX
        });
        out[at..at + 4].copy_from_slice(&count.to_le_bytes());
    }
    let score = i64::try_from(snapshot.score).unwrap_or_else(|_| {
        warn!(score = snapshot.score, "score capped at i64::MAX on the wire");
        i64::MAX
    });
    out[OFFSET_SCORE..OFFSET_SCORE + 8].copy_from_slice(&score.to_le_bytes());
    out[OFFSET_LEVEL..OFFSET_LEVEL + 4].copy_from_slice(&snapshot.level.to_le_bytes());
    out[OFFSET_LINES..OFFSET_LINES + 4].copy_from_slice(&snapshot.lines.to_le_bytes());

    let bits = &mut out[HEADER_LEN..];
    for (i, cell) in field.cells().iter().enumerate() {
        let bit = 2 * i;
        if cell.type_bit() {
            bits[bit / 8] |= 1 << (bit % 8);
        }
        if cell.color_bit() {
            bits[(bit + 1) / 8] |= 1 << ((bit + 1) % 8);
        }
    }
}

fn read_i32(buf: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

/// Overwrite `out` from one frame.
///
/// The field dimensions are taken from `out`; a frame of the wrong size is
/// rejected before anything is written.
pub fn decode_snapshot(buf: &[u8], out: &mut GameSnapshot) -> Result<(), FrameError> {
    let expected = frame_len(out.field.width(), out.field.rows());
    if buf.len() != expected {
        return Err(FrameError::Length {
            expected,
            actual: buf.len(),
        });
    }

    let mut statistics = [0u32; PIECE_KINDS];
    for (kind, slot) in statistics.iter_mut().enumerate() {
        let value = read_i32(buf, OFFSET_STATS + 4 * kind);
        *slot = u32::try_from(value).map_err(|_| FrameError::NegativeStatistic { kind, value })?;
    }

    let mut score_bytes = [0u8; 8];
    score_bytes.copy_from_slice(&buf[OFFSET_SCORE..OFFSET_SCORE + 8]);
    let score = i64::from_le_bytes(score_bytes);
    let score = u64::try_from(score).map_err(|_| FrameError::NegativeScore(score))?;

    out.game_over = read_i32(buf, 0) & FLAG_GAME_OVER != 0;
    out.statistics = statistics;
    out.score = score;
    out.level = read_i32(buf, OFFSET_LEVEL) as u32;
    out.lines = read_i32(buf, OFFSET_LINES);

    let bits = &buf[HEADER_LEN..];
    for (i, cell) in out.field.cells_mut().iter_mut().enumerate() {
        let bit = 2 * i;
        let type_bit = bits[bit / 8] & (1 << (bit % 8)) != 0;
        let color_bit = bits[(bit + 1) / 8] & (1 << ((bit + 1) % 8)) != 0;
        *cell = Cell::from_bits(type_bit, color_bit);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_len_includes_overflow_rows() {
        // 10 x 22 cells, 2 bits each = 440 bits = 55 bytes
        assert_eq!(frame_len(10, 22), 103);
        // odd sizes round up
        assert_eq!(frame_len(3, 3), 48 + 3);
    }

    #[test]
    fn test_handshake_layout() {
        let hs = Handshake {
            level: 0x0102_0304,
            initial_height: 5,
            mode: GameMode::B,
        };
        let bytes = hs.encode();
        assert_eq!(bytes, [4, 3, 2, 1, 5, 0, 0, 1]);
        assert_eq!(Handshake::decode(&bytes), hs);
    }

    #[test]
    fn test_handshake_truncates_height_to_24_bits() {
        let hs = Handshake {
            level: 0,
            initial_height: 0x0a00_0007,
            mode: GameMode::A,
        };
        assert_eq!(Handshake::decode(&hs.encode()).initial_height, 7);
    }

    #[test]
    fn test_cell_bit_positions() {
        let mut snap = GameSnapshot::empty(10, 20);
        snap.field.set(1, 0, Cell::from_bits(true, false)); // bit 2
        snap.field.set(2, 0, Cell::from_bits(false, true)); // bit 5
        snap.field.set(0, 1, Cell::from_bits(true, true)); // bits 20, 21

        let mut buf = Vec::new();
        encode_snapshot(&snap, &mut buf);
        assert_eq!(buf[HEADER_LEN], 0b0010_0100);
        assert_eq!(buf[HEADER_LEN + 1], 0);
        assert_eq!(buf[HEADER_LEN + 2], 0b0011_0000);
    }

    #[test]
    fn test_header_fields() {
        let mut snap = GameSnapshot::empty(10, 20);
        snap.game_over = true;
        snap.statistics = [1, 2, 3, 4, 5, 6, 7];
        snap.score = 1200;
        snap.level = 9;
        snap.lines = -2;

        let mut buf = Vec::new();
        encode_snapshot(&snap, &mut buf);
        assert_eq!(&buf[0..4], &1i32.to_le_bytes());
        assert_eq!(&buf[4..8], &1i32.to_le_bytes());
        assert_eq!(&buf[28..32], &7i32.to_le_bytes());
        assert_eq!(&buf[32..40], &1200i64.to_le_bytes());
        assert_eq!(&buf[40..44], &9u32.to_le_bytes());
        assert_eq!(&buf[44..48], &(-2i32).to_le_bytes());
    }

    #[test]
    fn test_reserved_flag_bits_ignored() {
        let snap = GameSnapshot::empty(4, 4);
        let mut buf = Vec::new();
        encode_snapshot(&snap, &mut buf);
        buf[0] = 0b1111_1110;

        let mut out = GameSnapshot::empty(4, 4);
        decode_snapshot(&buf, &mut out).unwrap();
        assert!(!out.game_over);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let mut out = GameSnapshot::empty(10, 20);
        let err = decode_snapshot(&[0u8; 50], &mut out).unwrap_err();
        assert_eq!(
            err,
            FrameError::Length {
                expected: 103,
                actual: 50
            }
        );
    }

    #[test]
    fn test_decode_rejects_negative_score() {
        let snap = GameSnapshot::empty(4, 4);
        let mut buf = Vec::new();
        encode_snapshot(&snap, &mut buf);
        buf[OFFSET_SCORE..OFFSET_SCORE + 8].copy_from_slice(&(-5i64).to_le_bytes());

        let mut out = GameSnapshot::empty(4, 4);
        assert_eq!(
            decode_snapshot(&buf, &mut out),
            Err(FrameError::NegativeScore(-5))
        );
    }

    #[test]
    fn test_oversized_counters_are_capped() {
        let mut snap = GameSnapshot::empty(4, 4);
        snap.statistics[2] = u32::MAX;
        snap.score = u64::MAX;

        let mut buf = Vec::new();
        encode_snapshot(&snap, &mut buf);
        assert_eq!(&buf[12..16], &i32::MAX.to_le_bytes());
        assert_eq!(&buf[32..40], &i64::MAX.to_le_bytes());

        let mut out = GameSnapshot::empty(4, 4);
        decode_snapshot(&buf, &mut out).unwrap();
        assert_eq!(out.statistics[2], i32::MAX as u32);
        assert_eq!(out.score, i64::MAX as u64);
    }

    #[test]
    fn test_decode_rejects_negative_statistic() {
        let snap = GameSnapshot::empty(4, 4);
        let mut buf = Vec::new();
        encode_snapshot(&snap, &mut buf);
        buf[8..12].copy_from_slice(&(-1i32).to_le_bytes());

        let mut out = GameSnapshot::empty(4, 4);
        assert_eq!(
            decode_snapshot(&buf, &mut out),
            Err(FrameError::NegativeStatistic { kind: 1, value: -1 })
        );
        assert_eq!(out, GameSnapshot::empty(4, 4));
    }
}
