//! Bridge Module
//!
//! Dispatches completed commands: classify, rewrite, exchange with the
//! companion, rewrite the reply.
//!
//! ## Responsibilities
//! - Answer identification queries without touching the link
//! - Forward everything else through the quirk tables
//! - Never fail: link errors and timeouts become empty replies

use crate::link::{Companion, LinkReply, ReplyStatus};
use crate::protocol::{classify, post_receive, pre_send, Classification, Command, Response};

/// Goto reply is an error code, not a boolean; keep its terminator
const GOTO_COMMAND: &str = ":MS#";

/// What the session owes the client for one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Write these bytes (nothing if empty)
    Send(Response),

    /// Write nothing, whatever the companion said
    Silent,
}

impl Reply {
    /// Bytes to write to the client
    pub fn bytes(&self) -> &[u8] {
        match self {
            Reply::Send(response) => response.as_bytes(),
            Reply::Silent => &[],
        }
    }
}

/// Command dispatcher owning the companion link handle
pub struct Bridge<C> {
    /// Companion link (exclusive; one exchange at a time)
    companion: C,
}

impl<C: Companion> Bridge<C> {
    pub fn new(companion: C) -> Self {
        Self { companion }
    }

    /// Handle one complete client command
    pub fn handle(&mut self, command: &Command) -> Reply {
        let classification = classify(command);

        if let Classification::Local(reply) = classification {
            tracing::debug!("Answered locally: {} -> {}", command, reply);
            return Reply::Send(Response::from_static(reply));
        }

        let response = self.query(command);

        if classification == Classification::NoResponse {
            tracing::debug!("Skipping response for: {}", command);
            return Reply::Silent;
        }

        let response = if command.is(GOTO_COMMAND) {
            response
        } else {
            response.normalized()
        };

        let response = post_receive(command, response);
        tracing::debug!("CmdFromClient: {:<13} RespToClient: {}", command, response);
        Reply::Send(response)
    }

    /// Exchange a command with the companion and return its raw reply
    ///
    /// Applies the pre-send rewrite. Errors are logged and yield an empty
    /// response.
    pub fn query(&mut self, command: &Command) -> Response {
        let outgoing = pre_send(command);
        if outgoing != *command {
            tracing::debug!("Rewrote {} as {}", command, outgoing);
        }

        match self.companion.exchange(&outgoing) {
            Ok(LinkReply { response, status, .. }) => {
                if status == ReplyStatus::Partial {
                    tracing::debug!("Partial reply for {}: {:?}", command, response);
                }
                response
            }
            Err(e) => {
                tracing::warn!("Companion exchange failed for {}: {}", command, e);
                Response::empty()
            }
        }
    }

    pub fn companion(&self) -> &C {
        &self.companion
    }

    pub fn companion_mut(&mut self) -> &mut C {
        &mut self.companion
    }

    pub fn into_companion(self) -> C {
        self.companion
    }
}
