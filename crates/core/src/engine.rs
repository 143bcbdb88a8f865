//! Engine module - the authoritative single-player state machine
//!
//! Ties together the field, the piece table, the random source and the
//! scoring rules. A piece is always falling; landing happens entirely inside
//! [`GameEngine::move_down`] and ends with the next piece already spawned.
//!
//! The engine never blocks and never talks to the outside world. Game over,
//! victory and level-up are queued as [`Notification`]s and drained by the
//! owner after each call.

use std::collections::VecDeque;

use tracing::debug;

use crate::field::Field;
use crate::pieces::{appearance, get_shape, PieceShape};
use crate::rng::GameRng;
use crate::scoring::{line_clear_score, should_level_up};
use crate::snapshot::GameSnapshot;
use crate::types::*;

/// Construction parameters handed over by the lobby / command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub width: usize,
    pub visible_height: usize,
    pub level: u32,
    pub mode: GameMode,
    /// Seeding height for mode B; ignored in mode A
    pub initial_height: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: FIELD_WIDTH as usize,
            visible_height: FIELD_HEIGHT as usize,
            level: 0,
            mode: GameMode::A,
            initial_height: 0,
        }
    }
}

impl GameConfig {
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_mode(mut self, mode: GameMode, initial_height: u32) -> Self {
        self.mode = mode;
        self.initial_height = if mode.is_b() { initial_height } else { 0 };
        self
    }
}

/// The falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    /// New piece at the spawn point of `field`: centered, pivot on the top visible row
    pub fn spawn(kind: PieceKind, field: &Field) -> Self {
        Self {
            kind,
            rotation: Rotation::SPAWN,
            x: field.width() as i32 / 2 - 1,
            y: field.rows() as i32 - 3,
        }
    }

    pub fn shape(&self) -> PieceShape {
        get_shape(self.kind, self.rotation)
    }

    /// Absolute (x, y) of the four blocks
    pub fn cells(&self) -> [(i32, i32); 4] {
        self.shape()
            .map(|(dx, dy)| (self.x + dx as i32, self.y - dy as i32))
    }

    /// Any block out of bounds or on an occupied cell
    pub fn collides(&self, field: &Field) -> bool {
        self.cells().iter().any(|&(x, y)| !field.is_free(x, y))
    }
}

#[derive(Debug, Clone)]
pub struct GameEngine {
    field: Field,
    current: Piece,
    next: PieceKind,
    rng: GameRng,
    mode: GameMode,
    initial_height: u32,
    score: u64,
    level: u32,
    lines: i32,
    statistics: [u32; PIECE_KINDS],
    /// Rows removed by the most recent landing
    consecutive_lines: usize,
    soft_drop: bool,
    soft_drop_distance: u32,
    paused: bool,
    game_over: bool,
    victory: bool,
    events: VecDeque<Notification>,
}

impl GameEngine {
    /// Create an engine with a unique random seed
    pub fn new(config: GameConfig) -> Self {
        Self::from_rng(config, GameRng::from_fresh_seed())
    }

    /// Create an engine with a fixed seed (reproducible games)
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::from_rng(config, GameRng::new(seed))
    }

    fn from_rng(config: GameConfig, mut rng: GameRng) -> Self {
        let field = Field::new(config.width, config.visible_height);
        let current = Piece::spawn(rng.next_piece(), &field);
        let next = rng.next_piece();

        let mut statistics = [0; PIECE_KINDS];
        statistics[current.kind.index()] += 1;

        let mut engine = Self {
            field,
            current,
            next,
            rng,
            mode: GameMode::A,
            initial_height: 0,
            score: 0,
            level: config.level,
            lines: 0,
            statistics,
            consecutive_lines: 0,
            soft_drop: false,
            soft_drop_distance: 0,
            paused: false,
            game_over: false,
            victory: false,
            events: VecDeque::new(),
        };
        engine.apply_mode(config.mode, config.initial_height);
        engine
    }

    /// Overwrite level and mode after construction.
    ///
    /// Used by a joining player once the host's parameters arrive. The field
    /// is wiped and, for mode B, seeded again exactly as at construction.
    pub fn reconfigure(&mut self, level: u32, mode: GameMode, initial_height: u32) {
        self.level = level;
        self.field.clear();
        self.apply_mode(mode, initial_height);
        debug!(level, mode = mode.as_str(), initial_height, "engine reconfigured");
    }

    fn apply_mode(&mut self, mode: GameMode, initial_height: u32) {
        self.mode = mode;
        match mode {
            GameMode::A => {
                self.initial_height = 0;
                self.lines = 0;
            }
            GameMode::B => {
                self.initial_height = initial_height;
                self.lines = MODE_B_LINES;
                self.seed_field();
            }
        }
    }

    /// Mode B garbage: between 6% and 7% of the visible area per unit of height
    fn seed_field(&mut self) {
        let area = (self.field.width() * self.field.visible_height()) as f64;
        let factor = self.rng.next_unit() + 6.0;
        let target = (area * self.initial_height as f64 * factor / 100.0) as usize;

        let mut placed = 0;
        for y in 0..self.field.rows() as i32 {
            for x in 0..self.field.width() as i32 {
                if placed < target && self.rng.coin_flip() {
                    let block = self.rng.next_block();
                    self.field.set(x, y, block);
                    placed += 1;
                }
            }
        }
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Direct field access for tools and tests
    pub fn field_mut(&mut self) -> &mut Field {
        &mut self.field
    }

    pub fn current(&self) -> Piece {
        self.current
    }

    /// Replace the falling piece with a fresh one of `kind` at the spawn point.
    ///
    /// Does not touch statistics.
    pub fn set_current(&mut self, kind: PieceKind) {
        self.current = Piece::spawn(kind, &self.field);
    }

    pub fn next(&self) -> PieceKind {
        self.next
    }

    pub fn set_next(&mut self, kind: PieceKind) {
        self.next = kind;
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn initial_height(&self) -> u32 {
        self.initial_height
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines(&self) -> i32 {
        self.lines
    }

    pub fn statistics(&self) -> &[u32; PIECE_KINDS] {
        &self.statistics
    }

    /// Rows removed by the last landing, in `[0, 4]` during normal play
    pub fn consecutive_lines(&self) -> usize {
        self.consecutive_lines
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn soft_drop(&self) -> bool {
        self.soft_drop
    }

    /// Held state of the drop-accelerate input
    pub fn set_soft_drop(&mut self, active: bool) {
        self.soft_drop = active;
    }

    pub fn soft_drop_distance(&self) -> u32 {
        self.soft_drop_distance
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn victory(&self) -> bool {
        self.victory
    }

    /// Game over or victory: gameplay calls are no-ops from here on
    pub fn is_finished(&self) -> bool {
        self.game_over || self.victory
    }

    fn accepts_input(&self) -> bool {
        !self.paused && !self.is_finished()
    }

    /// Take the oldest pending notification
    pub fn pop_event(&mut self) -> Option<Notification> {
        self.events.pop_front()
    }

    /// Take every pending notification, oldest first
    pub fn drain_events(&mut self) -> impl Iterator<Item = Notification> + '_ {
        self.events.drain(..)
    }

    pub fn move_left(&mut self) -> bool {
        self.try_shift(-1)
    }

    pub fn move_right(&mut self) -> bool {
        self.try_shift(1)
    }

    fn try_shift(&mut self, dx: i32) -> bool {
        if !self.accepts_input() {
            return false;
        }
        self.current.x += dx;
        if self.current.collides(&self.field) {
            self.current.x -= dx;
            return false;
        }
        true
    }

    pub fn rotate_left(&mut self) -> bool {
        self.try_rotate(Rotation::rotate_left, Rotation::rotate_right)
    }

    pub fn rotate_right(&mut self) -> bool {
        self.try_rotate(Rotation::rotate_right, Rotation::rotate_left)
    }

    /// Exactly one candidate is tried; no kicks
    fn try_rotate(
        &mut self,
        turn: fn(Rotation) -> Rotation,
        undo: fn(Rotation) -> Rotation,
    ) -> bool {
        if !self.accepts_input() {
            return false;
        }
        self.current.rotation = turn(self.current.rotation);
        if self.current.collides(&self.field) {
            self.current.rotation = undo(self.current.rotation);
            return false;
        }
        true
    }

    /// Move the piece down one row, landing it on collision.
    ///
    /// Returns true if the piece moved, false if it landed (or the engine is
    /// paused/finished).
    pub fn move_down(&mut self) -> bool {
        if !self.accepts_input() {
            return false;
        }

        self.current.y -= 1;
        if self.soft_drop {
            self.soft_drop_distance += 1;
        } else {
            self.soft_drop_distance = 0;
        }

        if self.current.collides(&self.field) {
            self.current.y += 1;
            self.land();
            return false;
        }
        true
    }

    /// Gravity tick: game over if the piece is already stuck, else move down
    pub fn update(&mut self) {
        if !self.accepts_input() {
            return;
        }
        if self.current.collides(&self.field) {
            self.game_over = true;
            self.events.push_back(Notification::GameOver);
            debug!(score = self.score, "game over");
            return;
        }
        self.move_down();
    }

    fn land(&mut self) {
        let block = appearance(self.current.kind);
        for (x, y) in self.current.cells() {
            self.field.set(x, y, block);
        }

        self.consecutive_lines = self.field.clear_full_rows();
        if self.consecutive_lines > 0 {
            let n = self.consecutive_lines as i32;
            self.lines += if self.mode.is_b() { -n } else { n };
            if self.mode.is_b() && self.lines <= 0 && !self.victory {
                self.victory = true;
                self.events.push_back(Notification::Victory);
            }
        }

        if self.soft_drop {
            self.score += self.soft_drop_distance as u64;
        }
        self.soft_drop_distance = 0;

        self.current = Piece::spawn(self.next, &self.field);
        self.next = self.rng.next_piece();
        self.statistics[self.current.kind.index()] += 1;

        self.score += line_clear_score(self.consecutive_lines, self.level);

        if should_level_up(self.mode, self.level, self.lines) {
            self.level += 1;
            self.events.push_back(Notification::LevelUp(self.level));
        }

        debug!(
            cleared = self.consecutive_lines,
            score = self.score,
            level = self.level,
            lines = self.lines,
            "piece landed"
        );
    }

    /// Apply a game action; returns whether it changed anything
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::MoveLeft => self.move_left(),
            GameAction::MoveRight => self.move_right(),
            GameAction::MoveDown => {
                let live = self.accepts_input();
                self.move_down();
                live
            }
            GameAction::RotateLeft => self.rotate_left(),
            GameAction::RotateRight => self.rotate_right(),
            GameAction::Pause => {
                if self.is_finished() {
                    return false;
                }
                self.paused = !self.paused;
                true
            }
        }
    }

    /// The field with the falling piece merged in (a copy)
    pub fn snapshot_grid(&self) -> Field {
        let mut grid = self.field.clone();
        self.merge_current(&mut grid);
        grid
    }

    fn merge_current(&self, grid: &mut Field) {
        let block = appearance(self.current.kind);
        for (x, y) in self.current.cells() {
            grid.set(x, y, block);
        }
    }

    /// Write the observable state into `out`, reusing its field allocation
    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.game_over = self.is_finished();
        out.statistics = self.statistics;
        out.score = self.score;
        out.level = self.level;
        out.lines = self.lines;
        out.field.clone_from(&self.field);
        self.merge_current(&mut out.field);
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut out = GameSnapshot::empty(self.field.width(), self.field.visible_height());
        self.snapshot_into(&mut out);
        out
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}
