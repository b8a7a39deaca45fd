//! Client compatibility rewrites
//!
//! SkySafari and Stellarium Mobile each expect a few things the companion
//! does not provide. These tables patch the traffic in both directions.

use bytes::BytesMut;

use super::{Command, Response, TERMINATOR};

/// Reply Stellarium expects after a date set (`:SC`), in place of `1#`
pub const SYNC_PLACEHOLDER: &str = "1Updating Planetary Data#          #";

/// Reply to abort (`:Q#`); the companion sends only `#`, Stellarium needs `1`
pub const ABORT_ACK: &str = "1";

/// Which commands a rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// The whole framed command
    Exact(&'static str),

    /// Command name followed by arguments, e.g. `:SC` in `:SC10/19/26#`
    Prefix(&'static str),
}

impl Key {
    pub fn matches(&self, command: &Command) -> bool {
        match self {
            Key::Exact(literal) => command.is(literal),
            Key::Prefix(prefix) => command.starts_with(prefix),
        }
    }
}

type Rewrite = fn(&Command) -> Command;

/// Rewrites applied before a command goes to the companion
pub static PRE_SEND: &[(Key, Rewrite)] = &[
    // SkySafari sends `:SG+06.0#`; OnStep only parses whole hours here
    (Key::Exact(":SG+06.0#"), strip_fraction),
];

/// Replies substituted for whatever non-empty answer the companion returned
pub static POST_RECEIVE: &[(Key, &str)] = &[
    (Key::Prefix(":SC"), SYNC_PLACEHOLDER),
    (Key::Exact(":Q#"), ABORT_ACK),
];

/// Rewrite a command before it is sent to the companion
pub fn pre_send(command: &Command) -> Command {
    PRE_SEND
        .iter()
        .find(|(key, _)| key.matches(command))
        .map(|(_, rewrite)| rewrite(command))
        .unwrap_or_else(|| command.clone())
}

/// Substitute the reply for commands whose companion answer clients reject
///
/// An empty reply means the companion never answered; it stays empty.
pub fn post_receive(command: &Command, response: Response) -> Response {
    if response.is_empty() {
        return response;
    }

    POST_RECEIVE
        .iter()
        .find(|(key, _)| key.matches(command))
        .map(|(_, reply)| Response::from_static(*reply))
        .unwrap_or(response)
}

/// Splice out `.xxx` between the first decimal point and the terminator
fn strip_fraction(command: &Command) -> Command {
    let bytes = command.as_bytes();
    let dot = bytes.iter().position(|&b| b == b'.');
    let hash = bytes.iter().position(|&b| b == TERMINATOR);

    match (dot, hash) {
        (Some(dot), Some(hash)) if dot < hash => {
            let mut out = BytesMut::with_capacity(bytes.len() - (hash - dot));
            out.extend_from_slice(&bytes[..dot]);
            out.extend_from_slice(&bytes[hash..]);
            // Still framed: prefix keeps ':' and the suffix keeps '#'
            Command::parse(out.freeze()).unwrap_or_else(|_| command.clone())
        }
        _ => command.clone(),
    }
}
