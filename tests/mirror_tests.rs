//! Mirror tests - receive worker over a loopback socket

use std::io::Write;
use std::net::{Shutdown, TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use netris::core::GameSnapshot;
use netris::net::{channel, encode_snapshot, EventReceiver, EventSink, Mirror, NetConfig, Side};
use netris::types::{Cell, Notification};

fn loopback() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
    let (server, _) = listener.accept().unwrap();
    (client, server)
}

fn spawn_mirror(reader: TcpStream, timeout: Duration) -> (Mirror, EventReceiver) {
    let (tx, rx) = channel();
    let config = NetConfig::default().with_read_timeout(timeout);
    let mirror = Mirror::spawn(reader, 10, 20, &config, EventSink::new(Side::Remote, tx), None).unwrap();
    (mirror, rx)
}

fn wait_until(limit: Duration, mut done: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < limit {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    done()
}

fn collect(rx: &mut EventReceiver) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        assert_eq!(event.side, Side::Remote);
        out.push(event.notification);
    }
    out
}

#[test]
fn test_mirror_tracks_latest_frame() {
    let (mut writer, reader) = loopback();
    let (mirror, _rx) = spawn_mirror(reader, Duration::from_secs(5));

    let mut frame = Vec::new();
    let mut snapshot = GameSnapshot::default();
    for score in 1..=20u64 {
        snapshot.score = score;
        snapshot.field.set(score as i32 % 10, 0, Cell::from_code(1));
        encode_snapshot(&snapshot, &mut frame);
        writer.write_all(&frame).unwrap();
    }

    assert!(wait_until(Duration::from_secs(5), || mirror.snapshot().score == 20));
    assert_eq!(mirror.snapshot(), snapshot);
    assert!(!mirror.is_game_over());
    assert!(mirror.is_running());
}

#[test]
fn test_game_over_notified_once() {
    let (mut writer, reader) = loopback();
    let (mirror, mut rx) = spawn_mirror(reader, Duration::from_secs(5));

    let mut snapshot = GameSnapshot::default();
    snapshot.game_over = true;
    let mut frame = Vec::new();
    for score in 0..100u64 {
        snapshot.score = score;
        encode_snapshot(&snapshot, &mut frame);
        writer.write_all(&frame).unwrap();
    }

    assert!(wait_until(Duration::from_secs(5), || mirror.snapshot().score == 99));
    assert!(mirror.is_game_over());

    // Peer hangs up: one connection error, then the worker is gone.
    writer.shutdown(Shutdown::Both).unwrap();
    assert!(wait_until(Duration::from_secs(5), || !mirror.is_running()));

    let events = collect(&mut rx);
    assert_eq!(
        events,
        vec![Notification::GameOver, Notification::ConnectionError]
    );
}

#[test]
fn test_read_timeout_reports_one_error() {
    let (_writer, reader) = loopback();
    let started = Instant::now();
    let (mut mirror, mut rx) = spawn_mirror(reader, Duration::from_millis(200));

    assert!(wait_until(Duration::from_secs(5), || !mirror.is_running()));
    assert!(started.elapsed() >= Duration::from_millis(150));
    assert_eq!(collect(&mut rx), vec![Notification::ConnectionError]);

    mirror.stop();
    mirror.stop();
    assert!(collect(&mut rx).is_empty());
}

#[test]
fn test_truncated_frame_is_a_connection_error() {
    let (mut writer, reader) = loopback();
    let (mirror, mut rx) = spawn_mirror(reader, Duration::from_secs(5));

    writer.write_all(&[0u8; 60]).unwrap();
    writer.shutdown(Shutdown::Write).unwrap();

    assert!(wait_until(Duration::from_secs(5), || !mirror.is_running()));
    assert_eq!(collect(&mut rx), vec![Notification::ConnectionError]);
    assert_eq!(mirror.snapshot(), GameSnapshot::default());
}
