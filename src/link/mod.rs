//! Companion Link Module
//!
//! Request/response exchanges with the companion controller over a
//! point-to-point serial link.
//!
//! ## Exchange
//! ```text
//!   bridge                         companion
//!     │ ── 'L' ───────────────────────▶ │   handshake (≤ 500 ms for ack)
//!     │ ◀───────────────────────── 'K' ─ │
//!     │        settle 3 ms, drop strays  │
//!     │ ── :GR# ──────────────────────▶ │   send
//!     │ ◀──────────────────── 12:34:56# ─ │   receive (≤ 2300 ms first byte,
//!     │                                  │            ≤ 350 ms until '#')
//! ```
//!
//! Nothing survives between exchanges. Timeouts degrade the reply instead
//! of failing the exchange.

mod companion;
mod serial;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::Result;
use crate::protocol::{Command, Response};

pub use companion::CompanionLink;
pub use serial::SerialLinkPort;

// =============================================================================
// Wire Constants
// =============================================================================

/// Sent to wake the companion before each command
pub const SYNC_BYTE: u8 = b'L';

/// Companion's answer to the sync byte
pub const ACK_BYTE: u8 = b'K';

/// Wait for the ack after the sync byte
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_millis(500);

/// Pause after the ack before stray bytes are dropped
pub const SETTLE_DELAY: Duration = Duration::from_millis(3);

/// Wait for the first reply byte after a command is sent
pub const FIRST_BYTE_TIMEOUT: Duration = Duration::from_millis(2300);

/// Wait for the terminator, measured from the first reply byte
pub const TERMINATOR_TIMEOUT: Duration = Duration::from_millis(350);

/// Timing budgets for one exchange
///
/// Client applications were tuned against the defaults; override only for
/// tests or unusual hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTimings {
    pub handshake: Duration,
    pub settle: Duration,
    pub first_byte: Duration,
    pub terminator: Duration,
}

impl Default for LinkTimings {
    fn default() -> Self {
        Self {
            handshake: HANDSHAKE_TIMEOUT,
            settle: SETTLE_DELAY,
            first_byte: FIRST_BYTE_TIMEOUT,
            terminator: TERMINATOR_TIMEOUT,
        }
    }
}

// =============================================================================
// Port Abstraction
// =============================================================================

/// Byte-level access to the serial transport
pub trait LinkPort {
    /// Write all bytes and wait until they are transmitted
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Read one byte, waiting at most `timeout`
    ///
    /// `Ok(None)` means the whole timeout elapsed with nothing to read.
    fn read_byte(&mut self, timeout: Duration) -> io::Result<Option<u8>>;

    /// Drop whatever is already waiting in the input buffer
    fn discard_pending(&mut self) -> io::Result<usize> {
        let mut dropped = 0;
        while self.read_byte(Duration::ZERO)?.is_some() {
            dropped += 1;
        }
        Ok(dropped)
    }
}

impl<P: LinkPort + ?Sized> LinkPort for Box<P> {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write_all(bytes)
    }

    fn read_byte(&mut self, timeout: Duration) -> io::Result<Option<u8>> {
        (**self).read_byte(timeout)
    }

    fn discard_pending(&mut self) -> io::Result<usize> {
        (**self).discard_pending()
    }
}

// =============================================================================
// Exchange Results
// =============================================================================

/// Outcome of the handshake step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handshake {
    /// Ack received; the link is ready
    Acknowledged,

    /// No ack in time; the command was sent anyway
    TimedOut,
}

/// How the receive step ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStatus {
    /// Terminator received
    Complete,

    /// Bytes arrived but no terminator in time
    Partial,

    /// Nothing arrived at all
    NoData,
}

/// Result of one exchange with the companion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReply {
    pub response: Response,
    pub status: ReplyStatus,
    pub handshake: Handshake,
}

/// Anything that can run a full exchange for a command
///
/// Each call is one indivisible handshake + send + receive.
pub trait Companion {
    fn exchange(&mut self, command: &Command) -> Result<LinkReply>;
}

impl<C: Companion + ?Sized> Companion for &mut C {
    fn exchange(&mut self, command: &Command) -> Result<LinkReply> {
        (**self).exchange(command)
    }
}

impl<C: Companion + ?Sized> Companion for Box<C> {
    fn exchange(&mut self, command: &Command) -> Result<LinkReply> {
        (**self).exchange(command)
    }
}

/// Shared link handle; the lock is held for the entire exchange so partial
/// exchanges never interleave on the wire
impl<C: Companion> Companion for Arc<Mutex<C>> {
    fn exchange(&mut self, command: &Command) -> Result<LinkReply> {
        self.lock().exchange(command)
    }
}
