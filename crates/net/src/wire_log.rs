//! Optional JSON-lines log of everything that crosses the wire
//!
//! One record per handshake or frame, in either direction. The log is shared
//! between the transmitter and the mirror thread, so writes go through a
//! mutex. A failing log never affects the game: errors are reported once
//! through `tracing` and the record is dropped.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tracing::warn;

use crate::core::GameSnapshot;
use crate::protocol::Handshake;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Sent,
    Received,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireRecord {
    Handshake {
        ts_ms: u64,
        direction: Direction,
        level: u32,
        initial_height: u32,
        mode: &'static str,
    },
    Frame {
        ts_ms: u64,
        direction: Direction,
        bytes: usize,
        game_over: bool,
        statistics: [u32; 7],
        score: u64,
        level: u32,
        lines: i32,
        occupied: usize,
    },
}

impl WireRecord {
    pub fn handshake(direction: Direction, hs: &Handshake) -> Self {
        WireRecord::Handshake {
            ts_ms: current_timestamp_ms(),
            direction,
            level: hs.level,
            initial_height: hs.initial_height,
            mode: hs.mode.as_str(),
        }
    }

    pub fn frame(direction: Direction, bytes: usize, snap: &GameSnapshot) -> Self {
        WireRecord::Frame {
            ts_ms: current_timestamp_ms(),
            direction,
            bytes,
            game_over: snap.game_over,
            statistics: snap.statistics,
            score: snap.score,
            level: snap.level,
            lines: snap.lines,
            occupied: snap.field.occupied_count(),
        }
    }
}

pub struct WireLog {
    file: Mutex<File>,
    broken: AtomicBool,
}

impl WireLog {
    /// Open `path` for appending, creating it if needed
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
            broken: AtomicBool::new(false),
        })
    }

    pub fn record(&self, rec: &WireRecord) {
        if self.broken.load(Ordering::Relaxed) {
            return;
        }
        let mut line = match serde_json::to_vec(rec) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "wire log: failed to serialize record");
                return;
            }
        };
        line.push(b'\n');

        let mut file = match self.file.lock() {
            Ok(file) => file,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = file.write_all(&line) {
            // Report once, then stay quiet.
            if !self.broken.swap(true, Ordering::Relaxed) {
                warn!(error = %e, "wire log: write failed, logging disabled");
            }
        }
    }
}

impl std::fmt::Debug for WireLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WireLog")
            .field("broken", &self.broken.load(Ordering::Relaxed))
            .finish()
    }
}

fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GameMode;

    #[test]
    fn test_handshake_record_json() {
        let rec = WireRecord::handshake(
            Direction::Sent,
            &Handshake {
                level: 3,
                initial_height: 2,
                mode: GameMode::B,
            },
        );
        let v: serde_json::Value = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["type"], "handshake");
        assert_eq!(v["direction"], "sent");
        assert_eq!(v["level"], 3);
        assert_eq!(v["mode"], "B");
    }

    #[test]
    fn test_records_append_as_lines() {
        let path = std::env::temp_dir().join(format!(
            "netris-wire-log-{}-{}.jsonl",
            std::process::id(),
            current_timestamp_ms()
        ));
        let log = WireLog::open(&path).unwrap();
        let snap = GameSnapshot::empty(10, 20);
        log.record(&WireRecord::frame(Direction::Received, 103, &snap));
        log.record(&WireRecord::frame(Direction::Sent, 103, &snap));
        drop(log);

        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["type"], "frame");
        assert_eq!(first["direction"], "received");
        assert_eq!(first["bytes"], 103);
    }
}
