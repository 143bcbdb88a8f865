//! Event channel shared by the transmitter and the mirror
//!
//! Both roles push tagged notifications into one unbounded channel; the
//! session drains it from the front-end loop with `try_recv`. No async
//! runtime is involved: tokio's mpsc works from plain threads.

use tokio::sync::mpsc;

use crate::types::Notification;

/// Which engine a notification is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Local,
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetEvent {
    pub side: Side,
    pub notification: Notification,
}

pub type EventReceiver = mpsc::UnboundedReceiver<NetEvent>;

/// Create the channel for one session
pub fn channel() -> (mpsc::UnboundedSender<NetEvent>, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Sending half, pre-tagged with a side
#[derive(Debug, Clone)]
pub struct EventSink {
    side: Side,
    tx: mpsc::UnboundedSender<NetEvent>,
}

impl EventSink {
    pub fn new(side: Side, tx: mpsc::UnboundedSender<NetEvent>) -> Self {
        Self { side, tx }
    }

    /// Fire and forget; a closed channel means nobody is listening any more
    pub fn emit(&self, notification: Notification) {
        let _ = self.tx.send(NetEvent {
            side: self.side,
            notification,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_are_tagged() {
        let (tx, mut rx) = channel();
        let local = EventSink::new(Side::Local, tx.clone());
        let remote = EventSink::new(Side::Remote, tx);

        local.emit(Notification::LevelUp(3));
        remote.emit(Notification::GameOver);

        let first = rx.try_recv().unwrap();
        assert_eq!(first.side, Side::Local);
        assert_eq!(first.notification, Notification::LevelUp(3));
        let second = rx.try_recv().unwrap();
        assert_eq!(second.side, Side::Remote);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_emit_after_receiver_dropped_is_silent() {
        let (tx, rx) = channel();
        drop(rx);
        EventSink::new(Side::Remote, tx).emit(Notification::ConnectionError);
    }
}
