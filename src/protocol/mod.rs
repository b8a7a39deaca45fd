//! Protocol Module
//!
//! The client-facing LX200 command protocol.
//!
//! ## Framing
//! ```text
//! ┌─────┬──────────────────────────┬─────┐
//! │  :  │   name + arguments       │  #  │      e.g.  :GVP#   :SG+06#
//! └─────┴──────────────────────────┴─────┘
//! ```
//!
//! Outside the framing, the single byte 0x06 (ACK) is a capability probe
//! answered with `A`.
//!
//! ### Handling
//! - Identification queries (`:GV?#`): canned reply from the bridge
//! - Motion / rate / sync: forwarded, no reply to client
//! - Everything else: forwarded, companion reply relayed

mod command;
mod response;
mod classify;
mod quirks;

pub use command::{Command, CommandAssembler, Feed};
pub use response::Response;
pub use classify::{classify, local_reply, Classification, LOCAL_REPLIES, NO_RESPONSE};
pub use quirks::{post_receive, pre_send, Key, ABORT_ACK, POST_RECEIVE, PRE_SEND, SYNC_PLACEHOLDER};

/// Opens a command
pub const START_MARKER: u8 = b':';

/// Closes a command or a companion reply
pub const TERMINATOR: u8 = b'#';

/// Capability probe sent unframed by Stellarium Mobile
pub const PROBE_BYTE: u8 = 0x06;

/// Answer to the probe: "alt-az mount"
pub const PROBE_REPLY: u8 = b'A';
