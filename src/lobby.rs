//! Host/join: getting two players onto one TCP stream.
//!
//! Runs before the terminal switches to the alternate screen, so progress
//! goes to stdout as plain lines.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use tracing::info;

pub const DEFAULT_PORT: u16 = 7777;

const ACCEPT_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const ACCEPT_POLL: Duration = Duration::from_millis(50);

/// Listen on `bind:port` and wait for exactly one opponent
pub fn host(bind: &str, port: u16) -> Result<TcpStream> {
    let listener = TcpListener::bind((bind, port))
        .with_context(|| format!("cannot listen on {}:{}", bind, port))?;
    listener.set_nonblocking(true)?;
    println!(
        "Waiting for an opponent on {} ({}s)...",
        listener.local_addr()?,
        ACCEPT_TIMEOUT.as_secs()
    );

    let deadline = Instant::now() + ACCEPT_TIMEOUT;
    loop {
        match listener.accept() {
            Ok((stream, peer)) => {
                info!(%peer, "opponent connected");
                println!("Opponent connected from {}", peer);
                return prepare(stream);
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                if Instant::now() >= deadline {
                    return Err(anyhow!("no opponent within {}s", ACCEPT_TIMEOUT.as_secs()));
                }
                thread::sleep(ACCEPT_POLL);
            }
            Err(e) => return Err(e).context("accept failed"),
        }
    }
}

/// Connect to a host; `addr` may omit the port
pub fn join(addr: &str) -> Result<TcpStream> {
    let target = resolve(addr)?;
    println!("Connecting to {}...", target);
    let stream = TcpStream::connect_timeout(&target, CONNECT_TIMEOUT)
        .with_context(|| format!("cannot connect to {}", target))?;
    info!(%target, "connected to host");
    prepare(stream)
}

fn resolve(addr: &str) -> Result<SocketAddr> {
    if let Ok(sa) = addr.parse::<SocketAddr>() {
        return Ok(sa);
    }
    let with_port = if addr.contains(':') {
        addr.to_string()
    } else {
        format!("{}:{}", addr, DEFAULT_PORT)
    };
    with_port
        .to_socket_addrs()
        .with_context(|| format!("cannot resolve {}", addr))?
        .next()
        .ok_or_else(|| anyhow!("no address for {}", addr))
}

fn prepare(stream: TcpStream) -> Result<TcpStream> {
    stream.set_nonblocking(false)?;
    stream.set_nodelay(true)?;
    Ok(stream)
}
