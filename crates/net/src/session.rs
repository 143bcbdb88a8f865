//! Session - one match between two players
//!
//! Owns the local [`Transmitter`], the remote [`Mirror`] and the event
//! channel both of them feed. The front end calls [`Session::pump`] once per
//! frame; it drains the channel and decides the state of the match:
//!
//! - both games over: `Finished`
//! - any connection error before that: `ConnectionLost` (no retry)
//! - a connection error after both games are over is the peer hanging up
//!   after a completed match and keeps the session `Finished`

use std::io;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::NetConfig;
use crate::core::{GameConfig, GameEngine};
use crate::events::{channel, EventReceiver, EventSink, Side};
use crate::mirror::Mirror;
use crate::stream::PeerStream;
use crate::transmit::Transmitter;
use crate::types::{gravity_interval_ms, Notification};
use crate::wire_log::WireLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Playing,
    ConnectionLost,
    Finished { local_score: u64, remote_score: u64 },
}

impl SessionState {
    pub fn is_over(&self) -> bool {
        !matches!(self, SessionState::Playing)
    }
}

#[derive(Debug)]
pub struct Session<S: PeerStream> {
    transmitter: Transmitter<S>,
    mirror: Mirror,
    events: EventReceiver,
    state: SessionState,
    local_over: bool,
    remote_over: bool,
    gravity: Duration,
}

impl<S: PeerStream + 'static> Session<S> {
    /// Handshake over `stream` and start mirroring the peer.
    ///
    /// `game` is only authoritative for the host; a joining player adopts the
    /// host's level and mode during the handshake.
    pub fn start(stream: S, host: bool, game: GameConfig, config: NetConfig) -> io::Result<Self> {
        Self::with_engine(stream, host, GameEngine::new(game), config)
    }

    /// Like [`Session::start`] with a caller-built engine (fixed seeds, tests)
    pub fn with_engine(
        stream: S,
        host: bool,
        engine: GameEngine,
        config: NetConfig,
    ) -> io::Result<Self> {
        let (tx, events) = channel();
        let wire_log = open_wire_log(&config);
        let reader = stream.try_clone()?;

        let transmitter = Transmitter::connect(
            engine,
            stream,
            host,
            EventSink::new(Side::Local, tx.clone()),
            &config,
            wire_log.clone(),
        );

        let field = transmitter.engine().field();
        let mirror = Mirror::spawn(
            reader,
            field.width(),
            field.visible_height(),
            &config,
            EventSink::new(Side::Remote, tx),
            wire_log,
        )?;

        let gravity = gravity_for(transmitter.engine().level());
        info!(host, level = transmitter.engine().level(), "session started");

        Ok(Self {
            transmitter,
            mirror,
            events,
            state: SessionState::Playing,
            local_over: false,
            remote_over: false,
            gravity,
        })
    }
}

impl<S: PeerStream> Session<S> {
    pub fn transmitter(&self) -> &Transmitter<S> {
        &self.transmitter
    }

    /// Drive the local game through this
    pub fn transmitter_mut(&mut self) -> &mut Transmitter<S> {
        &mut self.transmitter
    }

    pub fn mirror(&self) -> &Mirror {
        &self.mirror
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn local_over(&self) -> bool {
        self.local_over
    }

    pub fn remote_over(&self) -> bool {
        self.remote_over
    }

    /// Current gravity tick for the local engine
    pub fn gravity_interval(&self) -> Duration {
        self.gravity
    }

    /// Drain pending notifications and update the match state
    pub fn pump(&mut self) -> SessionState {
        while let Ok(event) = self.events.try_recv() {
            self.handle(event.side, event.notification);
        }
        self.state
    }

    fn handle(&mut self, side: Side, notification: Notification) {
        match (side, notification) {
            (Side::Local, Notification::GameOver | Notification::Victory) => {
                self.local_over = true;
            }
            (Side::Remote, Notification::GameOver | Notification::Victory) => {
                self.remote_over = true;
            }
            (Side::Local, Notification::LevelUp(level)) => {
                self.gravity = gravity_for(level);
                info!(level, "level up");
            }
            (Side::Remote, Notification::LevelUp(_)) => {}
            (_, Notification::ConnectionError) => {
                if self.state == SessionState::Playing {
                    if self.local_over && self.remote_over {
                        self.finish();
                    } else {
                        warn!(?side, "connection lost");
                        self.state = SessionState::ConnectionLost;
                    }
                }
                self.shutdown();
                return;
            }
        }

        if self.state == SessionState::Playing && self.local_over && self.remote_over {
            self.finish();
        }
    }

    fn finish(&mut self) {
        let local_score = self.transmitter.engine().score();
        let remote_score = self.mirror.snapshot().score;
        info!(local_score, remote_score, "match finished");
        self.state = SessionState::Finished {
            local_score,
            remote_score,
        };
    }

    /// Close the stream and join the mirror worker. Idempotent.
    pub fn shutdown(&mut self) {
        let _ = self.transmitter.stream().shutdown();
        self.mirror.stop();
    }
}

impl<S: PeerStream> Drop for Session<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn gravity_for(level: u32) -> Duration {
    Duration::from_millis(gravity_interval_ms(level) as u64)
}

fn open_wire_log(config: &NetConfig) -> Option<Arc<WireLog>> {
    let path = config.wire_log_path.as_deref()?;
    match WireLog::open(path) {
        Ok(log) => Some(Arc::new(log)),
        Err(e) => {
            warn!(path, error = %e, "wire log disabled");
            None
        }
    }
}
