//! Companion link protocol
//!
//! Runs the handshake / send / receive state machine over a [`LinkPort`].

use std::time::Instant;

use bytes::BytesMut;

use crate::error::Result;
use crate::protocol::{Command, Response, TERMINATOR};
use super::{
    Companion, Handshake, LinkPort, LinkReply, LinkTimings, ReplyStatus, ACK_BYTE, SYNC_BYTE,
};

/// Expected upper bound for a single reply; grows if exceeded
const REPLY_CAPACITY: usize = 64;

/// Link to the companion controller
pub struct CompanionLink<P> {
    /// Byte transport (serial port in production)
    port: P,

    /// Timing budgets for each step
    timings: LinkTimings,
}

impl<P: LinkPort> CompanionLink<P> {
    /// Create a link with the default timings
    pub fn new(port: P) -> Self {
        Self::with_timings(port, LinkTimings::default())
    }

    pub fn with_timings(port: P, timings: LinkTimings) -> Self {
        Self { port, timings }
    }

    pub fn timings(&self) -> &LinkTimings {
        &self.timings
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn into_port(self) -> P {
        self.port
    }

    /// Send the sync byte and wait for the ack
    ///
    /// Best effort: a missing ack is logged and the exchange carries on,
    /// the companion may still be primed from the previous cycle.
    pub fn handshake(&mut self) -> Result<Handshake> {
        self.port.write_all(&[SYNC_BYTE])?;

        let deadline = Instant::now() + self.timings.handshake;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.port.read_byte(remaining)? {
                Some(ACK_BYTE) => {
                    std::thread::sleep(self.timings.settle);
                    let dropped = self.port.discard_pending()?;
                    if dropped > 0 {
                        tracing::trace!("Dropped {} stray bytes after ack", dropped);
                    }
                    return Ok(Handshake::Acknowledged);
                }
                Some(other) => {
                    tracing::trace!("Ignoring 0x{:02x} while waiting for ack", other);
                    if remaining.is_zero() {
                        break;
                    }
                }
                None => break,
            }
        }

        tracing::debug!("No ack from companion within {:?}", self.timings.handshake);
        Ok(Handshake::TimedOut)
    }

    /// Write the command bytes
    pub fn send(&mut self, command: &Command) -> Result<()> {
        self.port.write_all(command.as_bytes())?;
        Ok(())
    }

    /// Read one `#`-terminated reply
    ///
    /// Returns an empty response if nothing arrives, or whatever was
    /// accumulated if the terminator never shows up.
    pub fn receive(&mut self) -> Result<(Response, ReplyStatus)> {
        let first = match self.port.read_byte(self.timings.first_byte)? {
            Some(byte) => byte,
            None => {
                tracing::warn!(
                    "Timeout waiting for companion response ({:?})",
                    self.timings.first_byte
                );
                return Ok((Response::empty(), ReplyStatus::NoData));
            }
        };

        let deadline = Instant::now() + self.timings.terminator;
        let mut reply = BytesMut::with_capacity(REPLY_CAPACITY);
        let mut next = Some(first);

        loop {
            if let Some(byte) = next {
                // Ack echoes and line endings are noise, not payload
                if !matches!(byte, ACK_BYTE | b'\r' | b'\n') {
                    reply.extend_from_slice(&[byte]);
                    if byte == TERMINATOR {
                        return Ok((Response::from(reply.freeze()), ReplyStatus::Complete));
                    }
                }
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            next = self.port.read_byte(remaining)?;
            if next.is_none() {
                break;
            }
        }

        tracing::warn!(
            "Timeout waiting for companion terminator, returning {} partial bytes",
            reply.len()
        );
        Ok((Response::from(reply.freeze()), ReplyStatus::Partial))
    }
}

impl<P: LinkPort> Companion for CompanionLink<P> {
    fn exchange(&mut self, command: &Command) -> Result<LinkReply> {
        let handshake = self.handshake()?;
        self.send(command)?;
        let (response, status) = self.receive()?;

        tracing::trace!(
            "Companion exchange {} -> {:?} ({:?}, {:?})",
            command, response, status, handshake
        );

        Ok(LinkReply {
            response,
            status,
            handshake,
        })
    }
}
