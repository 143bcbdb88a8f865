//! Held-key repeat for the three movement keys.
//!
//! Left/right share one slot (the most recent direction wins), down has its
//! own. Each slot fires once on the initial press and then every
//! `repeat_ms` of elapsed time, whatever the gravity level. A held down key
//! is also what the engine treats as soft drop.
//!
//! Many terminals never report key releases. There a key counts as released
//! once its auto-repeat presses stop arriving for `key_release_timeout_ms`.

use std::time::{Duration, Instant};

use arrayvec::ArrayVec;
use crossterm::event::KeyCode;

use crate::types::{GameAction, INPUT_REPEAT_MS};

/// Upper bound on repeats produced by one `update`
pub const MAX_REPEATS: usize = 16;

/// Longer than a typical auto-repeat gap, shorter than a deliberate hold
const RELEASE_TIMEOUT_MS: u32 = 150;

/// One repeating action and the time banked towards its next repeat
#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    action: Option<GameAction>,
    banked_ms: u32,
}

impl Slot {
    /// Hold `action`; true if it was not already held
    fn hold(&mut self, action: GameAction) -> bool {
        if self.action == Some(action) {
            return false;
        }
        self.action = Some(action);
        self.banked_ms = 0;
        true
    }

    fn release(&mut self) {
        *self = Slot::default();
    }

    fn holds(&self, action: GameAction) -> bool {
        self.action == Some(action)
    }

    fn tick(&mut self, elapsed_ms: u32, period_ms: u32, out: &mut ArrayVec<GameAction, MAX_REPEATS>) {
        let Some(action) = self.action else {
            return;
        };
        self.banked_ms += elapsed_ms;
        while self.banked_ms >= period_ms {
            self.banked_ms -= period_ms;
            if out.try_push(action).is_err() {
                // Drop the excess rather than bank a burst for later.
                self.banked_ms %= period_ms;
                break;
            }
        }
    }
}

fn movement(code: KeyCode) -> Option<GameAction> {
    match code {
        KeyCode::Left | KeyCode::Char('a' | 'A') => Some(GameAction::MoveLeft),
        KeyCode::Right | KeyCode::Char('d' | 'D') => Some(GameAction::MoveRight),
        KeyCode::Down | KeyCode::Char('s' | 'S') => Some(GameAction::MoveDown),
        _ => None,
    }
}

/// Tracks held movement keys and turns them into repeats.
#[derive(Debug, Clone)]
pub struct InputHandler {
    sideways: Slot,
    drop: Slot,
    last_press: Instant,
    repeat_ms: u32,
    release_timeout_ms: u32,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::with_repeat_ms(INPUT_REPEAT_MS)
    }

    pub fn with_repeat_ms(repeat_ms: u32) -> Self {
        Self {
            sideways: Slot::default(),
            drop: Slot::default(),
            last_press: Instant::now(),
            repeat_ms: repeat_ms.max(1),
            release_timeout_ms: RELEASE_TIMEOUT_MS,
        }
    }

    pub fn with_key_release_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.release_timeout_ms = timeout_ms;
        self
    }

    pub fn repeat_interval(&self) -> Duration {
        Duration::from_millis(self.repeat_ms as u64)
    }

    /// The drop key is currently held
    pub fn soft_drop_held(&self) -> bool {
        self.drop.action.is_some()
    }

    /// Register a press of a movement key.
    ///
    /// Returns the action to apply right away on the first press; terminal
    /// auto-repeat of a key already held returns `None`.
    pub fn handle_key_press(&mut self, code: KeyCode) -> Option<GameAction> {
        let action = movement(code)?;
        self.last_press = Instant::now();
        let slot = if action == GameAction::MoveDown {
            &mut self.drop
        } else {
            &mut self.sideways
        };
        slot.hold(action).then_some(action)
    }

    pub fn handle_key_release(&mut self, code: KeyCode) {
        match movement(code) {
            Some(GameAction::MoveDown) => self.drop.release(),
            Some(action) if self.sideways.holds(action) => self.sideways.release(),
            _ => {}
        }
    }

    /// Advance the repeat clocks by `elapsed_ms` and collect due repeats
    pub fn update(&mut self, elapsed_ms: u32) -> ArrayVec<GameAction, MAX_REPEATS> {
        let mut actions = ArrayVec::new();

        let idle_ms = self.last_press.elapsed().as_millis() as u32;
        if idle_ms > self.release_timeout_ms {
            self.sideways.release();
            self.drop.release();
        }

        self.sideways.tick(elapsed_ms, self.repeat_ms, &mut actions);
        self.drop.tick(elapsed_ms, self.repeat_ms, &mut actions);
        actions
    }

    /// Forget every held key (pause, focus loss)
    pub fn reset(&mut self) {
        self.sideways.release();
        self.drop.release();
        self.last_press = Instant::now();
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
