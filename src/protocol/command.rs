//! Command definitions
//!
//! Framed commands from the remote client and the byte-by-byte assembler
//! that produces them.

use std::fmt;

use bytes::{Bytes, BytesMut};

use crate::error::{BridgeError, Result};
use super::{PROBE_BYTE, START_MARKER, TERMINATOR};

/// A complete LX200 command, always `:` ... `#`
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Command(Bytes);

impl Command {
    /// Parse a framed command
    ///
    /// Fails unless the bytes start with `:` and end with `#`.
    pub fn parse(bytes: impl Into<Bytes>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.len() < 2 || bytes[0] != START_MARKER || bytes[bytes.len() - 1] != TERMINATOR {
            return Err(BridgeError::Protocol(format!(
                "Not a framed command: {:?}",
                String::from_utf8_lossy(&bytes)
            )));
        }
        Ok(Self(bytes))
    }

    /// Raw framed bytes, markers included
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Command text, if it is valid UTF-8 (LX200 commands are ASCII)
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// Exact textual match against a framed command literal
    pub fn is(&self, literal: &str) -> bool {
        self.0[..] == *literal.as_bytes()
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Pairs with `len`; a parsed command holds at least its two markers,
    /// so this is always false
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command({:?})", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&String::from_utf8_lossy(&self.0))
    }
}

// =============================================================================
// Assembly
// =============================================================================

/// Result of feeding one byte to the assembler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
    /// The capability probe byte; answer it out of band
    Probe,

    /// Byte consumed, nothing to dispatch yet
    Pending,

    /// A command was completed by this byte
    Complete(Command),
}

/// Accumulates client bytes into framed commands
///
/// Bytes seen outside a command are dropped. Once `:` opens a command,
/// every byte is payload (including further `:`, as in `:SL20:15:00#`)
/// until `#` closes it.
#[derive(Debug, Default)]
pub struct CommandAssembler {
    /// Bytes of the command being assembled
    buf: BytesMut,

    /// True between a start marker and its terminator
    assembling: bool,
}

impl CommandAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte from the client
    pub fn push(&mut self, byte: u8) -> Feed {
        if byte == PROBE_BYTE {
            return Feed::Probe;
        }

        if !self.assembling {
            // Stellarium often sends a stray '#' before ':'
            if byte == START_MARKER {
                self.assembling = true;
                self.buf.clear();
                self.buf.extend_from_slice(&[START_MARKER]);
            }
            return Feed::Pending;
        }

        self.buf.extend_from_slice(&[byte]);

        if byte == TERMINATOR {
            self.assembling = false;
            return Feed::Complete(Command(self.buf.split().freeze()));
        }

        Feed::Pending
    }

    /// True while a start marker is waiting for its terminator
    pub fn is_assembling(&self) -> bool {
        self.assembling
    }

    /// Bytes of the partial command so far
    pub fn pending(&self) -> &[u8] {
        if self.assembling {
            &self.buf
        } else {
            &[]
        }
    }
}
