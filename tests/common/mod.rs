//! Test doubles shared by the integration test targets

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use lx200bridge::link::{Companion, Handshake, LinkPort, LinkReply, ReplyStatus, ACK_BYTE, SYNC_BYTE};
use lx200bridge::protocol::{Command, Response};
use parking_lot::Mutex;

// =============================================================================
// Scripted Serial Port
// =============================================================================

/// Serial port double
///
/// Bytes become readable when the bridge writes: the sync byte releases the
/// next scripted ack burst, a command releases the next scripted reply.
/// A read on an empty buffer reports that the whole timeout elapsed.
#[derive(Debug, Default)]
pub struct ScriptedPort {
    /// Everything the link wrote
    pub written: Vec<u8>,

    /// Timeout passed to each read, in order
    pub read_timeouts: Vec<Duration>,

    available: VecDeque<u8>,
    auto_ack: bool,
    on_sync: VecDeque<Vec<u8>>,
    on_command: VecDeque<Vec<u8>>,
}

impl ScriptedPort {
    /// A port whose companion never answers anything
    pub fn silent() -> Self {
        Self::default()
    }

    /// A companion that acks every sync and answers commands in order
    pub fn answering(replies: &[&str]) -> Self {
        let mut port = Self::default();
        port.auto_ack = true;
        for reply in replies {
            port.on_command.push_back(reply.as_bytes().to_vec());
        }
        port
    }

    /// Bytes released by the next sync byte (replaces the automatic ack)
    pub fn on_sync(mut self, bytes: &[u8]) -> Self {
        self.on_sync.push_back(bytes.to_vec());
        self
    }

    /// Bytes released by the next command
    pub fn on_command(mut self, bytes: &[u8]) -> Self {
        self.on_command.push_back(bytes.to_vec());
        self
    }

    /// Bytes written after the sync bytes, as text
    pub fn commands_written(&self) -> String {
        let text: Vec<u8> = self.written.iter().copied().filter(|&b| b != SYNC_BYTE).collect();
        String::from_utf8_lossy(&text).into_owned()
    }

    pub fn unread(&self) -> usize {
        self.available.len()
    }
}

impl LinkPort for ScriptedPort {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.written.extend_from_slice(bytes);

        if bytes == [SYNC_BYTE].as_slice() {
            match self.on_sync.pop_front() {
                Some(burst) => self.available.extend(burst),
                None if self.auto_ack => self.available.push_back(ACK_BYTE),
                None => {}
            }
        } else if let Some(reply) = self.on_command.pop_front() {
            self.available.extend(reply);
        }
        Ok(())
    }

    fn read_byte(&mut self, timeout: Duration) -> io::Result<Option<u8>> {
        self.read_timeouts.push(timeout);
        Ok(self.available.pop_front())
    }
}

/// Port that fails every operation
pub struct BrokenPort;

impl LinkPort for BrokenPort {
    fn write_all(&mut self, _bytes: &[u8]) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"))
    }

    fn read_byte(&mut self, _timeout: Duration) -> io::Result<Option<u8>> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"))
    }
}

// =============================================================================
// Companion Doubles
// =============================================================================

/// Companion that records every exchange and answers from a queue
///
/// An exhausted queue behaves like a silent link.
#[derive(Debug, Default)]
pub struct RecordingCompanion {
    /// Commands exchanged, as sent on the wire
    pub sent: Vec<String>,

    replies: VecDeque<Response>,
}

impl RecordingCompanion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replying(replies: &[&'static str]) -> Self {
        Self {
            sent: Vec::new(),
            replies: replies.iter().map(|r| Response::from_static(*r)).collect(),
        }
    }

    /// Shared handle, so a test can inspect it after handing it to a bridge
    pub fn shared(self) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(self))
    }
}

impl Companion for RecordingCompanion {
    fn exchange(&mut self, command: &Command) -> lx200bridge::Result<LinkReply> {
        self.sent.push(command.to_string());

        let reply = match self.replies.pop_front() {
            Some(response) => LinkReply {
                status: if response.as_bytes().ends_with(b"#") {
                    ReplyStatus::Complete
                } else {
                    ReplyStatus::Partial
                },
                response,
                handshake: Handshake::Acknowledged,
            },
            None => LinkReply {
                response: Response::empty(),
                status: ReplyStatus::NoData,
                handshake: Handshake::TimedOut,
            },
        };
        Ok(reply)
    }
}

/// Companion that must never be used
pub struct UntouchableCompanion;

impl Companion for UntouchableCompanion {
    fn exchange(&mut self, command: &Command) -> lx200bridge::Result<LinkReply> {
        panic!("companion link used for {}", command);
    }
}

/// Frame a literal command
pub fn cmd(text: &str) -> Command {
    Command::parse(text.as_bytes().to_vec()).unwrap()
}
