//! Protocol tests - frames and handshakes as the peer sees them

use netris::core::{GameConfig, GameEngine, GameRng, GameSnapshot};
use netris::net::{decode_snapshot, encode_snapshot, frame_len, FrameError, Handshake};
use netris::types::{GameMode, PieceKind};

#[test]
fn test_empty_field_round_trip() {
    let snapshot = GameSnapshot::default();
    let mut frame = Vec::new();
    encode_snapshot(&snapshot, &mut frame);
    assert_eq!(frame.len(), 103);
    assert!(frame.iter().all(|&b| b == 0));

    let mut decoded = GameSnapshot::default();
    decoded.score = 99;
    decode_snapshot(&frame, &mut decoded).unwrap();
    assert_eq!(decoded, snapshot);
}

#[test]
fn test_random_field_round_trip() {
    let mut rng = GameRng::new(2024);
    let mut snapshot = GameSnapshot::default();
    for cell in snapshot.field.cells_mut() {
        if rng.coin_flip() {
            *cell = rng.next_block();
        }
    }
    for (i, count) in snapshot.statistics.iter_mut().enumerate() {
        *count = (i as u32 + 1) * 11;
    }
    snapshot.score = 123_456;
    snapshot.level = 12;
    snapshot.lines = -3;
    snapshot.game_over = true;

    let mut frame = Vec::new();
    encode_snapshot(&snapshot, &mut frame);
    let mut decoded = GameSnapshot::default();
    decode_snapshot(&frame, &mut decoded).unwrap();
    assert_eq!(decoded, snapshot);
}

#[test]
fn test_engine_snapshot_round_trip() {
    let config = GameConfig::default().with_level(7).with_mode(GameMode::B, 3);
    let mut engine = GameEngine::with_seed(config, 31);
    engine.set_current(PieceKind::S);
    engine.move_left();
    engine.update();

    let snapshot = engine.snapshot();
    let mut frame = Vec::new();
    encode_snapshot(&snapshot, &mut frame);
    let mut decoded = GameSnapshot::default();
    decode_snapshot(&frame, &mut decoded).unwrap();

    assert_eq!(decoded, snapshot);
    assert_eq!(decoded.level, 7);
    assert_eq!(decoded.lines, 25);
}

#[test]
fn test_wrong_size_rejected_untouched() {
    let mut decoded = GameSnapshot::default();
    decoded.score = 5;
    let err = decode_snapshot(&[0u8; 102], &mut decoded).unwrap_err();
    assert_eq!(
        err,
        FrameError::Length {
            expected: 103,
            actual: 102
        }
    );
    assert_eq!(decoded.score, 5);
}

#[test]
fn test_frame_len_other_sizes() {
    assert_eq!(frame_len(10, 22), 103);
    // 6 x 14 = 84 cells = 168 bits = 21 bytes
    assert_eq!(frame_len(6, 14), 69);
    // 3 x 3 = 9 cells = 18 bits, rounded up to 3 bytes
    assert_eq!(frame_len(3, 3), 51);
}

#[test]
fn test_handshake_round_trip() {
    let hs = Handshake {
        level: 19,
        initial_height: 5,
        mode: GameMode::B,
    };
    let bytes = hs.encode();
    assert_eq!(bytes, [19, 0, 0, 0, 5, 0, 0, 1]);
    assert_eq!(Handshake::decode(&bytes), hs);
}
