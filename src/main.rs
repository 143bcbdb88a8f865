//! netris terminal runner.
//!
//! `netris single` plays alone; `netris host` / `netris join` play a match
//! over TCP, each side running its own engine and showing the opponent's
//! field next to its own. Input comes from crossterm, output goes through the
//! framebuffer renderer, logs go to a file.

mod lobby;

use std::fs::OpenOptions;
use std::net::TcpStream;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use netris::core::{GameConfig, GameEngine, GameSnapshot};
use netris::input::{handle_key_event, is_held_key, should_quit, InputHandler};
use netris::net::{NetConfig, Session, SessionState, Transmitter};
use netris::term::{FrameBuffer, GameView, Overlay, PlayerPanel, TerminalRenderer, Viewport};
use netris::types::{gravity_interval_ms, GameAction, GameMode, Notification};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play alone.
    Single(GameArgs),
    /// Wait for an opponent and impose level and mode on the match.
    Host {
        /// Port to listen on.
        #[arg(long, default_value_t = lobby::DEFAULT_PORT, value_parser = clap::value_parser!(u16).range(1024..))]
        port: u16,
        /// Address to bind.
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,
        #[command(flatten)]
        game: GameArgs,
    },
    /// Join a hosted match; level and mode come from the host.
    Join {
        /// Host address, `host[:port]`.
        addr: String,
    },
}

#[derive(Args, Debug, Clone, Copy)]
struct GameArgs {
    /// Starting level.
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=99))]
    level: u32,
    /// `a` (endurance) or `b` (clear 25 lines from a seeded field).
    #[arg(long, default_value = "a", value_parser = parse_mode)]
    mode: GameMode,
    /// Garbage height for mode B.
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=5))]
    height: u32,
}

impl GameArgs {
    fn config(self) -> GameConfig {
        GameConfig::default()
            .with_level(self.level)
            .with_mode(self.mode, self.height)
    }
}

fn parse_mode(s: &str) -> Result<GameMode, String> {
    GameMode::from_str(s).ok_or_else(|| format!("unknown mode '{}', expected a or b", s))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;
    info!(?cli, "netris starting");

    // Lobby first: it prints to the normal screen.
    let mode = match cli.command {
        Command::Single(game) => Mode::Single(game.config()),
        Command::Host { port, bind, game } => Mode::Match {
            stream: lobby::host(&bind, port)?,
            host: true,
            game: game.config(),
        },
        Command::Join { addr } => Mode::Match {
            stream: lobby::join(&addr)?,
            host: false,
            game: GameConfig::default(),
        },
    };

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = match mode {
        Mode::Single(game) => run_single(&mut term, game),
        Mode::Match { stream, host, game } => run_match(&mut term, stream, host, game),
    };

    // Always try to restore terminal state.
    let _ = term.exit();
    if let Err(e) = &result {
        error!(error = %e, "netris exited with an error");
    }
    result
}

enum Mode {
    Single(GameConfig),
    Match {
        stream: TcpStream,
        host: bool,
        game: GameConfig,
    },
}

/// File logger; the terminal belongs to the game
fn init_logging() -> Result<()> {
    let path = std::env::var("NETRIS_LOG_FILE").unwrap_or_else(|_| "netris.log".to_string());
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("cannot open log file {}", path))?;
    let filter = EnvFilter::try_from_env("NETRIS_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

/// What the input layer can drive: a bare engine or a transmitter
trait Player {
    fn act(&mut self, action: GameAction);
    fn set_soft_drop(&mut self, active: bool);
    fn tick(&mut self);
}

impl Player for GameEngine {
    fn act(&mut self, action: GameAction) {
        self.apply_action(action);
    }

    fn set_soft_drop(&mut self, active: bool) {
        GameEngine::set_soft_drop(self, active);
    }

    fn tick(&mut self) {
        self.update();
    }
}

impl Player for Transmitter<TcpStream> {
    fn act(&mut self, action: GameAction) {
        self.apply_action(action);
    }

    fn set_soft_drop(&mut self, active: bool) {
        Transmitter::set_soft_drop(self, active);
    }

    fn tick(&mut self) {
        self.update();
    }
}

/// Keyboard state plus the two timers every mode shares
struct Controls {
    input: InputHandler,
    last_repeat: Instant,
    last_gravity: Instant,
}

impl Controls {
    fn new() -> Self {
        let now = Instant::now();
        Self {
            input: InputHandler::new(),
            last_repeat: now,
            last_gravity: now,
        }
    }

    /// Wait for input until the next timer is due.
    ///
    /// Returns false when the player asked to quit.
    fn poll(
        &mut self,
        term: &mut TerminalRenderer,
        player: &mut impl Player,
        gravity: Duration,
        allow_pause: bool,
    ) -> Result<bool> {
        let repeat = self.input.repeat_interval();
        let timeout = repeat
            .saturating_sub(self.last_repeat.elapsed())
            .min(gravity.saturating_sub(self.last_gravity.elapsed()));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if !self.handle_key(key, player, allow_pause) {
                        return Ok(false);
                    }
                }
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }

        if self.last_repeat.elapsed() >= repeat {
            let elapsed = self.last_repeat.elapsed().as_millis() as u32;
            self.last_repeat = Instant::now();
            let actions = self.input.update(elapsed);
            player.set_soft_drop(self.input.soft_drop_held());
            for action in actions {
                player.act(action);
            }
        }

        if self.last_gravity.elapsed() >= gravity {
            self.last_gravity = Instant::now();
            player.tick();
        }
        Ok(true)
    }

    fn handle_key(&mut self, key: KeyEvent, player: &mut impl Player, allow_pause: bool) -> bool {
        match key.kind {
            KeyEventKind::Press => {
                if should_quit(key) {
                    return false;
                }
                if is_held_key(key.code) {
                    if let Some(action) = self.input.handle_key_press(key.code) {
                        player.set_soft_drop(self.input.soft_drop_held());
                        player.act(action);
                    }
                } else if let Some(action) = handle_key_event(key) {
                    if action == GameAction::Pause {
                        if !allow_pause {
                            return true;
                        }
                        self.input.reset();
                        player.set_soft_drop(false);
                    }
                    player.act(action);
                }
            }
            KeyEventKind::Repeat => {
                // Held keys repeat on our own timer.
            }
            KeyEventKind::Release => {
                self.input.handle_key_release(key.code);
                player.set_soft_drop(self.input.soft_drop_held());
            }
        }
        true
    }
}

fn gravity_for(level: u32) -> Duration {
    Duration::from_millis(gravity_interval_ms(level) as u64)
}

fn terminal_viewport() -> Viewport {
    let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
    Viewport::new(w, h)
}

const HELP: &str = "←/→ move  ↓ drop  Z/↑ X rotate  P pause  Q quit";
const MATCH_HELP: &str = "←/→ move  ↓ drop  Z/↑ X rotate  Q quit";

fn run_single(term: &mut TerminalRenderer, game: GameConfig) -> Result<()> {
    let mut engine = GameEngine::new(game);
    info!(seed = engine.seed(), level = engine.level(), mode = engine.mode().as_str(), "single player");

    let view = GameView::default();
    let mut controls = Controls::new();
    let mut fb = FrameBuffer::new(0, 0);
    let mut snap = GameSnapshot::default();
    let mut gravity = gravity_for(engine.level());

    loop {
        engine.snapshot_into(&mut snap);
        let overlay = if engine.victory() {
            Some(Overlay::Victory)
        } else if engine.game_over() {
            Some(Overlay::GameOver)
        } else if engine.paused() {
            Some(Overlay::Paused)
        } else {
            None
        };
        let panels = [PlayerPanel {
            title: "NETRIS",
            snapshot: &snap,
            next: Some(engine.next()),
            overlay,
        }];
        view.render_into(&panels, Some(HELP), terminal_viewport(), &mut fb);
        term.draw(&fb)?;

        if !controls.poll(term, &mut engine, gravity, true)? {
            info!(score = engine.score(), "quit");
            return Ok(());
        }

        while let Some(event) = engine.pop_event() {
            match event {
                Notification::LevelUp(level) => gravity = gravity_for(level),
                Notification::GameOver | Notification::Victory => {
                    info!(?event, score = engine.score(), "game ended");
                }
                Notification::ConnectionError => {}
            }
        }
    }
}

fn run_match(term: &mut TerminalRenderer, stream: TcpStream, host: bool, game: GameConfig) -> Result<()> {
    let mut session = Session::start(stream, host, game, NetConfig::from_env())
        .context("cannot start session")?;

    let view = GameView::default();
    let mut controls = Controls::new();
    let mut fb = FrameBuffer::new(0, 0);
    let mut local = GameSnapshot::default();
    let mut remote = GameSnapshot::default();

    loop {
        let state = session.pump();

        session.transmitter().engine().snapshot_into(&mut local);
        session.mirror().snapshot_into(&mut remote);

        let engine = session.transmitter().engine();
        let lost = state == SessionState::ConnectionLost;
        let local_overlay = if engine.victory() {
            Some(Overlay::Victory)
        } else if engine.game_over() {
            Some(Overlay::GameOver)
        } else if lost {
            Some(Overlay::ConnectionLost)
        } else {
            None
        };
        let remote_overlay = if session.mirror().is_game_over() {
            Some(Overlay::GameOver)
        } else if lost {
            Some(Overlay::ConnectionLost)
        } else {
            None
        };

        let status = match state {
            SessionState::Finished {
                local_score,
                remote_score,
            } => format!("Final score {} : {}  Q quit", local_score, remote_score),
            _ => MATCH_HELP.to_string(),
        };
        let panels = [
            PlayerPanel {
                title: "YOU",
                snapshot: &local,
                next: Some(engine.next()),
                overlay: local_overlay,
            },
            PlayerPanel {
                title: "OPPONENT",
                snapshot: &remote,
                next: None,
                overlay: remote_overlay,
            },
        ];
        view.render_into(&panels, Some(&status), terminal_viewport(), &mut fb);
        term.draw(&fb)?;

        let gravity = session.gravity_interval();
        if !controls.poll(term, session.transmitter_mut(), gravity, false)? {
            info!(?state, "quit");
            session.shutdown();
            return Ok(());
        }
    }
}
