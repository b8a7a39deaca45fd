//! Client Session
//!
//! Services one connected LX200 client.

use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::{Duration, Instant};

use crate::bridge::Bridge;
use crate::error::Result;
use crate::link::Companion;
use crate::protocol::{CommandAssembler, Feed, PROBE_REPLY};

/// Bytes read from the client per service call
const READ_CHUNK: usize = 64;

/// Upper bound on a blocked reply write
const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Client closed, reset or aborted the connection
    PeerClosed,

    /// No byte from the client within the idle bound
    IdleTimeout,
}

/// State after one service call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Closed(CloseReason),
}

/// A single client connection and its assembly state
pub struct Session {
    /// Client socket (blocking, with a short read timeout)
    stream: TcpStream,

    /// Partial command accumulated so far
    assembler: CommandAssembler,

    /// Time of the last byte received from the client
    last_activity: Instant,

    /// Close the session after this long without input
    idle_timeout: Duration,

    /// Peer address for logging
    peer_addr: String,
}

impl Session {
    /// Create a session for a freshly accepted stream
    ///
    /// `read_wait` bounds how long one service call waits for client bytes.
    pub fn new(stream: TcpStream, idle_timeout: Duration, read_wait: Duration) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Replies are tiny and latency-sensitive
        stream.set_nodelay(true)?;
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(Some(read_wait.max(Duration::from_millis(1))))?;
        stream.set_write_timeout(Some(WRITE_TIMEOUT))?;

        tracing::info!("Client connected from {}", peer_addr);

        Ok(Self {
            stream,
            assembler: CommandAssembler::new(),
            last_activity: Instant::now(),
            idle_timeout,
            peer_addr,
        })
    }

    /// Run one bounded unit of session work
    ///
    /// Reads whatever the client sent (waiting at most the read timeout),
    /// dispatches completed commands and enforces the idle bound.
    pub fn service<C: Companion>(&mut self, bridge: &mut Bridge<C>) -> Result<SessionState> {
        let mut buf = [0u8; READ_CHUNK];

        match self.stream.read(&mut buf) {
            Ok(0) => {
                tracing::debug!("Client {} disconnected", self.peer_addr);
                return Ok(SessionState::Closed(CloseReason::PeerClosed));
            }
            Ok(n) => {
                for &byte in &buf[..n] {
                    self.last_activity = Instant::now();
                    if let Some(state) = self.process_byte(byte, bridge)? {
                        return Ok(state);
                    }
                }
            }
            // Read timeout (Windows uses TimedOut instead of WouldBlock)
            Err(ref e)
                if matches!(
                    e.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) => {}
            Err(ref e)
                if matches!(
                    e.kind(),
                    ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
                ) =>
            {
                tracing::debug!("Connection reset by client {}", self.peer_addr);
                return Ok(SessionState::Closed(CloseReason::PeerClosed));
            }
            Err(e) => return Err(e.into()),
        }

        if self.last_activity.elapsed() > self.idle_timeout {
            tracing::info!("Client {} timed out after {:?} idle", self.peer_addr, self.idle_timeout);
            self.close();
            return Ok(SessionState::Closed(CloseReason::IdleTimeout));
        }

        Ok(SessionState::Open)
    }

    /// Handle one client byte; `Some` ends the session
    fn process_byte<C: Companion>(
        &mut self,
        byte: u8,
        bridge: &mut Bridge<C>,
    ) -> Result<Option<SessionState>> {
        match self.assembler.push(byte) {
            Feed::Pending => Ok(None),
            Feed::Probe => {
                tracing::debug!("Capability probe from {}, sent 'A'", self.peer_addr);
                self.send(&[PROBE_REPLY])
            }
            Feed::Complete(command) => {
                tracing::trace!("Received command from {}: {}", self.peer_addr, command);
                let reply = bridge.handle(&command);
                let bytes = reply.bytes();
                if bytes.is_empty() {
                    return Ok(None);
                }
                self.send(bytes)
            }
        }
    }

    /// Write a reply to the client
    fn send(&mut self, bytes: &[u8]) -> Result<Option<SessionState>> {
        let written = self.stream.write_all(bytes).and_then(|_| self.stream.flush());
        match written {
            Ok(()) => Ok(None),
            Err(ref e)
                if matches!(
                    e.kind(),
                    ErrorKind::ConnectionAborted | ErrorKind::ConnectionReset | ErrorKind::BrokenPipe
                ) =>
            {
                tracing::debug!(
                    "Client {} disconnected before response could be sent: {}",
                    self.peer_addr, e
                );
                Ok(Some(SessionState::Closed(CloseReason::PeerClosed)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Close the connection from our side
    pub fn close(&mut self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }

    /// True while a start marker is waiting for its terminator
    pub fn is_assembling(&self) -> bool {
        self.assembler.is_assembling()
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
