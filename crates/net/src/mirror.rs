//! Mirror - the peer's game, as last reported
//!
//! A named worker thread owns the reader half of the stream. It reads one
//! full frame at a time, decodes it and overwrites the shared snapshot. The
//! front end only ever clones that snapshot under the mutex.
//!
//! The worker ends on the first read or decode error (a read timeout counts)
//! and reports it as a single `ConnectionError`, unless the owner asked it
//! to stop. `GameOver` is reported the first time a frame carries the flag.

use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::config::NetConfig;
use crate::core::GameSnapshot;
use crate::events::EventSink;
use crate::protocol::{decode_snapshot, frame_len};
use crate::stream::PeerStream;
use crate::types::Notification;
use crate::wire_log::{Direction, WireLog, WireRecord};

#[derive(Debug)]
struct Shared {
    snapshot: Mutex<GameSnapshot>,
    stop: AtomicBool,
    game_over: AtomicBool,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, GameSnapshot> {
        match self.snapshot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[derive(Debug)]
pub struct Mirror {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl Mirror {
    /// Start the receive worker on `stream`.
    ///
    /// Fails only if the thread cannot be spawned; stream errors are
    /// reported through `events`.
    pub fn spawn<S: PeerStream + 'static>(
        stream: S,
        width: usize,
        visible_height: usize,
        config: &NetConfig,
        events: EventSink,
        wire_log: Option<Arc<WireLog>>,
    ) -> io::Result<Self> {
        let shared = Arc::new(Shared {
            snapshot: Mutex::new(GameSnapshot::empty(width, visible_height)),
            stop: AtomicBool::new(false),
            game_over: AtomicBool::new(false),
        });

        let worker = Worker {
            stream,
            shared: Arc::clone(&shared),
            events,
            wire_log,
            decoded: GameSnapshot::empty(width, visible_height),
        };
        let timeout = config.read_timeout;
        let handle = thread::Builder::new()
            .name("netris-mirror".to_string())
            .spawn(move || worker.run(timeout))?;

        Ok(Self {
            shared,
            worker: Some(handle),
        })
    }

    /// A copy of the latest received state
    pub fn snapshot(&self) -> GameSnapshot {
        self.shared.lock().clone()
    }

    /// Copy the latest received state into `out`, reusing its allocation
    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.clone_from(&self.shared.lock());
    }

    /// The peer has reported game over (or victory)
    pub fn is_game_over(&self) -> bool {
        self.shared.game_over.load(Ordering::Acquire)
    }

    /// The worker thread is still receiving
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Ask the worker to stop and wait for it.
    ///
    /// A worker blocked in a read wakes up at the read timeout or when the
    /// stream is shut down. Idempotent.
    pub fn stop(&mut self) {
        self.shared.stop.store(true, Ordering::Release);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("mirror worker panicked");
            }
        }
    }
}

impl Drop for Mirror {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Worker<S> {
    stream: S,
    shared: Arc<Shared>,
    events: EventSink,
    wire_log: Option<Arc<WireLog>>,
    decoded: GameSnapshot,
}

impl<S: PeerStream> Worker<S> {
    fn run(mut self, timeout: std::time::Duration) {
        info!(timeout_ms = timeout.as_millis() as u64, "mirror started");
        if let Err(e) = self.stream.set_read_timeout(Some(timeout)) {
            self.report(&e.to_string());
            return;
        }

        let len = frame_len(self.decoded.field.width(), self.decoded.field.rows());
        let mut buf = vec![0u8; len];

        while !self.stopping() {
            if let Err(e) = self.stream.read_exact(&mut buf) {
                self.report(&e.to_string());
                break;
            }
            if let Err(e) = decode_snapshot(&buf, &mut self.decoded) {
                self.report(&e.to_string());
                break;
            }

            self.shared.lock().clone_from(&self.decoded);
            debug!(score = self.decoded.score, game_over = self.decoded.game_over, "frame received");
            if let Some(log) = &self.wire_log {
                log.record(&WireRecord::frame(Direction::Received, len, &self.decoded));
            }

            if self.decoded.game_over && !self.shared.game_over.swap(true, Ordering::AcqRel) {
                info!(score = self.decoded.score, "peer game over");
                self.events.emit(Notification::GameOver);
            }
        }
        info!("mirror stopped");
    }

    fn stopping(&self) -> bool {
        self.shared.stop.load(Ordering::Acquire)
    }

    fn report(&self, reason: &str) {
        if self.stopping() {
            debug!(reason, "mirror read ended after stop");
            return;
        }
        warn!(reason, "mirror connection error");
        self.events.emit(Notification::ConnectionError);
    }
}
