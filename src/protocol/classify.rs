//! Command classification
//!
//! Decides whether a command is answered locally, executed silently on the
//! companion, or passed through.

use super::Command;

/// How a completed command is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Answered here with a canned reply; the companion is never involved
    Local(&'static str),

    /// Executed on the companion, but nothing is returned to the client
    NoResponse,

    /// Sent to the companion and its reply relayed back
    PassThrough,
}

/// Identification queries answered by the bridge itself
pub static LOCAL_REPLIES: &[(&str, &str)] = &[
    (":GVP#", "OnStepX.DDScopeX#"), // product name
    (":GVN#", "2.0#"),              // firmware version
    (":GVD#", "May 2025#"),         // firmware date
    (":GVT#", "08:02:00#"),         // firmware time
];

/// Motion, rate and sync commands the clients expect no reply to
pub static NO_RESPONSE: &[&str] = &[
    ":Me#", ":Mn#", ":Ms#", ":Mw#", // start moving E/N/S/W
    ":Qe#", ":Qn#", ":Qs#", ":Qw#", // stop moving E/N/S/W
    ":RC#", ":RF#", ":RG#", ":RM#", // slew rate centering/fast/guiding/find
    ":RS#", // slew rate max (sync on LX200 classic)
    ":W1#", // select site 1
    ":CS#", // sync to current target
];

/// Classify a complete command
///
/// Total over all commands; anything not in a table is pass-through.
pub fn classify(command: &Command) -> Classification {
    if let Some(reply) = local_reply(command) {
        return Classification::Local(reply);
    }

    if NO_RESPONSE.iter().any(|literal| command.is(literal)) {
        return Classification::NoResponse;
    }

    Classification::PassThrough
}

/// Canned reply for an identification query, if the command is one
pub fn local_reply(command: &Command) -> Option<&'static str> {
    LOCAL_REPLIES
        .iter()
        .find(|(literal, _)| command.is(literal))
        .map(|(_, reply)| *reply)
}
