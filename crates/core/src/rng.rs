//! RNG module - per-engine random source
//!
//! Every engine owns its own generator. Two engines are routinely built in the
//! same instant (the local player and the opponent mirror), so a clock-only
//! seed is not enough: [`fresh_seed`] mixes a process-wide counter into the
//! nanosecond clock before handing it to `StdRng`.
//!
//! Deterministic construction from an explicit seed is kept for tests and
//! benches.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::{Cell, PieceKind, PIECE_KINDS};

static SEED_COUNTER: AtomicU64 = AtomicU64::new(0);

/// splitmix64 finalizer
fn mix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// A seed that differs for every call within the process, even when two
/// calls land in the same clock tick.
pub fn fresh_seed() -> u64 {
    let count = SEED_COUNTER.fetch_add(1, Ordering::Relaxed);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    mix64(nanos ^ mix64(count))
}

/// Random source for one engine
#[derive(Debug, Clone)]
pub struct GameRng {
    inner: StdRng,
    seed: u64,
}

impl GameRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn from_fresh_seed() -> Self {
        Self::new(fresh_seed())
    }

    /// The seed this generator was built from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform over the 7 kinds
    pub fn next_piece(&mut self) -> PieceKind {
        let index = self.inner.random_range(0..PIECE_KINDS);
        PieceKind::ALL[index]
    }

    /// Uniform in `[0, 1)`
    pub fn next_unit(&mut self) -> f64 {
        self.inner.random::<f64>()
    }

    pub fn coin_flip(&mut self) -> bool {
        self.inner.random_bool(0.5)
    }

    /// One of the three non-empty appearances, uniformly
    pub fn next_block(&mut self) -> Cell {
        Cell::from_code(self.inner.random_range(1..=3u8))
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_fresh_seed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = GameRng::new(12345);
        let mut rng2 = GameRng::new(12345);

        for _ in 0..100 {
            assert_eq!(rng1.next_piece(), rng2.next_piece());
        }
    }

    #[test]
    fn test_fresh_seeds_differ_back_to_back() {
        let a = fresh_seed();
        let b = fresh_seed();
        assert_ne!(a, b);
    }

    #[test]
    fn test_all_kinds_show_up() {
        let mut rng = GameRng::new(7);
        let mut seen = [false; PIECE_KINDS];
        for _ in 0..500 {
            seen[rng.next_piece().index()] = true;
        }
        assert!(seen.iter().all(|s| *s), "missing kinds: {:?}", seen);
    }

    #[test]
    fn test_blocks_are_never_empty() {
        let mut rng = GameRng::new(99);
        for _ in 0..200 {
            assert!(rng.next_block().is_occupied());
        }
    }

    #[test]
    fn test_unit_interval() {
        let mut rng = GameRng::new(3);
        for _ in 0..200 {
            let v = rng.next_unit();
            assert!((0.0..1.0).contains(&v));
        }
    }
}
