//! Byte stream abstraction
//!
//! The network layer only needs a reliable ordered byte stream that can be
//! split into a reader half (moved into the mirror thread) and a writer half
//! (kept by the transmitter). TCP is the only transport shipped.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

pub trait PeerStream: Read + Write + Send + Sized {
    /// A second handle to the same connection
    fn try_clone(&self) -> io::Result<Self>;

    /// Applies to every handle of the connection
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;

    /// Close both directions, waking any blocked reader
    fn shutdown(&self) -> io::Result<()> {
        Ok(())
    }
}

impl PeerStream for TcpStream {
    fn try_clone(&self) -> io::Result<Self> {
        TcpStream::try_clone(self)
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }

    fn shutdown(&self) -> io::Result<()> {
        match TcpStream::shutdown(self, Shutdown::Both) {
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }
}
