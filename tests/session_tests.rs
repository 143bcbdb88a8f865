//! Session tests - two players over loopback

use std::fs;
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use netris::core::{GameConfig, GameEngine};
use netris::net::{NetConfig, Session, SessionState};
use netris::types::GameMode;

fn loopback() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
    let (server, _) = listener.accept().unwrap();
    (server, client)
}

fn pair(game: GameConfig, config: NetConfig) -> (Session<TcpStream>, Session<TcpStream>) {
    let (host_stream, join_stream) = loopback();
    // The host's handshake fits in the socket buffer, so one thread is enough.
    let host = Session::with_engine(host_stream, true, GameEngine::with_seed(game, 1), config.clone()).unwrap();
    let join = Session::with_engine(
        join_stream,
        false,
        GameEngine::with_seed(GameConfig::default(), 2),
        config,
    )
    .unwrap();
    (host, join)
}

fn play_to_game_over(session: &mut Session<TcpStream>) {
    for _ in 0..10_000 {
        if session.transmitter().is_finished() {
            return;
        }
        session.transmitter_mut().update();
    }
    panic!("game never ended");
}

fn pump_until(
    session: &mut Session<TcpStream>,
    limit: Duration,
    done: impl Fn(SessionState) -> bool,
) -> SessionState {
    let start = Instant::now();
    loop {
        let state = session.pump();
        if done(state) || start.elapsed() > limit {
            return state;
        }
        thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn test_join_adopts_host_parameters() {
    let game = GameConfig::default().with_level(3).with_mode(GameMode::B, 2);
    let (host, join) = pair(game, NetConfig::default());

    let engine = join.transmitter().engine();
    assert_eq!(engine.level(), 3);
    assert_eq!(engine.mode(), GameMode::B);
    assert_eq!(engine.initial_height(), 2);
    assert_eq!(engine.lines(), 25);
    assert!(engine.field().occupied_count() > 0);

    assert!(host.transmitter().is_host());
    assert!(!join.transmitter().is_host());
    assert_eq!(host.gravity_interval(), join.gravity_interval());
}

#[test]
fn test_moves_show_up_on_the_other_side() {
    let (mut host, join) = pair(GameConfig::default(), NetConfig::default());

    host.transmitter_mut().move_left();
    host.transmitter_mut().update();
    let expected = host.transmitter().engine().snapshot();

    let start = Instant::now();
    while join.mirror().snapshot() != expected && start.elapsed() < Duration::from_secs(5) {
        thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(join.mirror().snapshot(), expected);
    assert_eq!(host.state(), SessionState::Playing);
}

#[test]
fn test_both_games_over_finishes_the_match() {
    let (mut host, mut join) = pair(GameConfig::default(), NetConfig::default());

    play_to_game_over(&mut host);
    play_to_game_over(&mut join);

    let host_score = host.transmitter().engine().score();
    let join_score = join.transmitter().engine().score();

    let state = pump_until(&mut host, Duration::from_secs(5), |s| s.is_over());
    assert_eq!(
        state,
        SessionState::Finished {
            local_score: host_score,
            remote_score: join_score,
        }
    );
    let state = pump_until(&mut join, Duration::from_secs(5), |s| s.is_over());
    assert_eq!(
        state,
        SessionState::Finished {
            local_score: join_score,
            remote_score: host_score,
        }
    );
    assert!(host.local_over() && host.remote_over());

    // Hanging up after the match does not turn it into a lost connection.
    drop(join);
    let state = pump_until(&mut host, Duration::from_millis(300), |_| false);
    assert!(matches!(state, SessionState::Finished { .. }));
}

#[test]
fn test_peer_leaving_mid_game_is_connection_lost() {
    let (mut host, join) = pair(GameConfig::default(), NetConfig::default());
    host.transmitter_mut().update();
    drop(join);

    let state = pump_until(&mut host, Duration::from_secs(5), |s| s.is_over());
    assert_eq!(state, SessionState::ConnectionLost);
    assert!(!host.mirror().is_running());
}

#[test]
fn test_silent_peer_times_out() {
    let config = NetConfig::default().with_read_timeout(Duration::from_millis(200));
    let (mut host, _join) = pair(GameConfig::default(), config);

    let state = pump_until(&mut host, Duration::from_secs(5), |s| s.is_over());
    assert_eq!(state, SessionState::ConnectionLost);
}

#[test]
fn test_wire_log_records_handshake_and_frames() {
    let path = std::env::temp_dir().join(format!("netris-wire-{}.jsonl", std::process::id()));
    let _ = fs::remove_file(&path);
    let mut config = NetConfig::default();
    config.wire_log_path = Some(path.to_string_lossy().into_owned());

    let (mut host, join) = pair(GameConfig::default().with_level(5), config);
    host.transmitter_mut().update();
    host.transmitter_mut().move_right();
    drop(join);
    drop(host);

    let text = fs::read_to_string(&path).unwrap();
    let records: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    let handshakes: Vec<_> = records.iter().filter(|r| r["type"] == "handshake").collect();
    assert_eq!(handshakes.len(), 2);
    assert!(handshakes.iter().any(|r| r["direction"] == "sent"));
    assert!(handshakes.iter().any(|r| r["direction"] == "received"));
    assert!(handshakes.iter().all(|r| r["level"] == 5));

    let sent = records
        .iter()
        .filter(|r| r["type"] == "frame" && r["direction"] == "sent")
        .count();
    assert!(sent >= 2, "expected at least two sent frames, got {}", sent);
    for r in records.iter().filter(|r| r["type"] == "frame") {
        assert_eq!(r["bytes"], 103);
    }

    let _ = fs::remove_file(&path);
}
