//! Transmitter - the local engine, mirrored to the peer
//!
//! Wraps a [`GameEngine`] and a writable stream. Every operation is forwarded
//! to the engine and followed by one snapshot frame, written synchronously.
//! Once the local game is finished, [`Transmitter::update`] keeps sending the
//! final state so the peer's read timeout never fires while it is still
//! playing.

use std::io::{self, Read, Write};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::NetConfig;
use crate::core::{GameEngine, GameSnapshot};
use crate::events::EventSink;
use crate::protocol::{encode_snapshot, Handshake, HANDSHAKE_LEN};
use crate::stream::PeerStream;
use crate::types::{GameAction, Notification};
use crate::wire_log::{Direction, WireLog, WireRecord};

pub struct Transmitter<S: PeerStream> {
    engine: GameEngine,
    stream: S,
    host: bool,
    failed: bool,
    frame: Vec<u8>,
    snapshot: GameSnapshot,
    events: EventSink,
    wire_log: Option<Arc<WireLog>>,
}

impl<S: PeerStream> Transmitter<S> {
    /// Take ownership of `engine` and `stream` and run the handshake.
    ///
    /// The host writes its level and mode; the non-host reads them and
    /// reconfigures `engine` to match. A handshake failure leaves the
    /// transmitter failed with one `ConnectionError` already emitted.
    pub fn connect(
        engine: GameEngine,
        stream: S,
        host: bool,
        events: EventSink,
        config: &NetConfig,
        wire_log: Option<Arc<WireLog>>,
    ) -> Self {
        let snapshot = GameSnapshot::empty(engine.field().width(), engine.field().visible_height());
        let mut tx = Self {
            engine,
            stream,
            host,
            failed: false,
            frame: Vec::new(),
            snapshot,
            events,
            wire_log,
        };
        if let Err(e) = tx.handshake(config) {
            tx.fail(e);
        }
        tx
    }

    fn handshake(&mut self, config: &NetConfig) -> io::Result<()> {
        if self.host {
            let hs = Handshake {
                level: self.engine.level(),
                initial_height: self.engine.initial_height(),
                mode: self.engine.mode(),
            };
            self.stream.write_all(&hs.encode())?;
            self.stream.flush()?;
            self.log(WireRecord::handshake(Direction::Sent, &hs));
            info!(level = hs.level, mode = hs.mode.as_str(), "handshake sent");
        } else {
            self.stream.set_read_timeout(Some(config.read_timeout))?;
            let mut buf = [0u8; HANDSHAKE_LEN];
            self.stream.read_exact(&mut buf)?;
            let hs = Handshake::decode(&buf);
            self.engine.reconfigure(hs.level, hs.mode, hs.initial_height);
            self.log(WireRecord::handshake(Direction::Received, &hs));
            info!(level = hs.level, mode = hs.mode.as_str(), "handshake received");
        }
        Ok(())
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    pub fn is_host(&self) -> bool {
        self.host
    }

    /// A read or write failed; nothing more will be sent
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn is_finished(&self) -> bool {
        self.engine.is_finished()
    }

    /// The stream handle, for shutdown
    pub fn stream(&self) -> &S {
        &self.stream
    }

    pub fn move_left(&mut self) -> bool {
        self.step(GameEngine::move_left)
    }

    pub fn move_right(&mut self) -> bool {
        self.step(GameEngine::move_right)
    }

    pub fn move_down(&mut self) -> bool {
        self.step(GameEngine::move_down)
    }

    pub fn rotate_left(&mut self) -> bool {
        self.step(GameEngine::rotate_left)
    }

    pub fn rotate_right(&mut self) -> bool {
        self.step(GameEngine::rotate_right)
    }

    /// Held state only; nothing is sent until the piece actually moves
    pub fn set_soft_drop(&mut self, active: bool) {
        self.engine.set_soft_drop(active);
    }

    /// Dispatch a front-end action. Pause is not available in a match.
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::MoveLeft => self.move_left(),
            GameAction::MoveRight => self.move_right(),
            GameAction::MoveDown => {
                let live = !self.engine.is_finished();
                self.move_down();
                live
            }
            GameAction::RotateLeft => self.rotate_left(),
            GameAction::RotateRight => self.rotate_right(),
            GameAction::Pause => false,
        }
    }

    /// Gravity tick. After the game ends this only re-sends the final state.
    pub fn update(&mut self) {
        if self.failed {
            return;
        }
        if !self.engine.is_finished() {
            self.engine.update();
            self.forward_events();
        }
        self.send_frame();
    }

    fn step(&mut self, op: fn(&mut GameEngine) -> bool) -> bool {
        if self.failed {
            return false;
        }
        let applied = op(&mut self.engine);
        self.forward_events();
        self.send_frame();
        applied
    }

    fn forward_events(&mut self) {
        for n in self.engine.drain_events() {
            self.events.emit(n);
        }
    }

    fn send_frame(&mut self) {
        if self.failed {
            return;
        }
        self.engine.snapshot_into(&mut self.snapshot);
        encode_snapshot(&self.snapshot, &mut self.frame);
        if let Err(e) = self.stream.write_all(&self.frame) {
            self.fail(e);
            return;
        }
        debug!(bytes = self.frame.len(), game_over = self.snapshot.game_over, "frame sent");
        if let Some(log) = &self.wire_log {
            log.record(&WireRecord::frame(Direction::Sent, self.frame.len(), &self.snapshot));
        }
    }

    fn fail(&mut self, err: io::Error) {
        if self.failed {
            return;
        }
        self.failed = true;
        warn!(error = %err, host = self.host, "transmit failed");
        self.events.emit(Notification::ConnectionError);
    }

    fn log(&self, rec: WireRecord) {
        if let Some(log) = &self.wire_log {
            log.record(&rec);
        }
    }
}

impl<S: PeerStream> std::fmt::Debug for Transmitter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transmitter")
            .field("host", &self.host)
            .field("failed", &self.failed)
            .field("finished", &self.engine.is_finished())
            .finish()
    }
}
