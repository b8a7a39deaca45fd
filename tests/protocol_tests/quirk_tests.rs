//! Quirk Transform Tests
//!
//! These tests verify:
//! - Time-zone fractions are stripped before sending
//! - Other commands go out unchanged
//! - Reply substitutions for `:SC` and `:Q#`
//! - A missing reply is never substituted

#[path = "../common/mod.rs"]
mod common;

use common::cmd;
use lx200bridge::protocol::{post_receive, pre_send, Key, Response, ABORT_ACK, SYNC_PLACEHOLDER};

// =============================================================================
// Pre-send Tests
// =============================================================================

#[test]
fn test_timezone_fraction_is_stripped() {
    assert_eq!(pre_send(&cmd(":SG+06.0#")), cmd(":SG+06#"));
}

#[test]
fn test_timezone_other_offsets_are_identity() {
    for command in [":SG-05.5#", ":SG-05.0#", ":SG+10.00#", ":SG+06.5#"] {
        assert_eq!(pre_send(&cmd(command)), cmd(command), "{}", command);
    }
}

#[test]
fn test_timezone_without_fraction_is_identity() {
    assert_eq!(pre_send(&cmd(":SG+06#")), cmd(":SG+06#"));
    assert_eq!(pre_send(&cmd(":SG-05:30#")), cmd(":SG-05:30#"));
}

#[test]
fn test_other_commands_are_identity() {
    for command in [":GR#", ":GVP#", ":Sr12:34:56#", ":Sd+45*30:00#", ":SC10/19/26#", ":Q#"] {
        assert_eq!(pre_send(&cmd(command)), cmd(command), "{}", command);
    }
}

#[test]
fn test_decimal_in_other_command_is_untouched() {
    assert_eq!(pre_send(&cmd(":St+45.5#")), cmd(":St+45.5#"));
}

// =============================================================================
// Post-receive Tests
// =============================================================================

#[test]
fn test_sync_placeholder_replaces_reply() {
    let reply = post_receive(&cmd(":SC#"), Response::from_static("1"));
    assert_eq!(reply.as_bytes(), SYNC_PLACEHOLDER.as_bytes());
}

#[test]
fn test_sync_placeholder_with_date_argument() {
    let reply = post_receive(&cmd(":SC10/19/26#"), Response::from_static("0"));
    assert_eq!(reply.as_bytes(), b"1Updating Planetary Data#          #");
}

#[test]
fn test_sync_placeholder_layout() {
    let (first, rest) = SYNC_PLACEHOLDER.split_once('#').unwrap();
    assert_eq!(first, "1Updating Planetary Data");
    assert_eq!(rest, "          #");
}

#[test]
fn test_abort_ack_replaces_reply() {
    assert_eq!(post_receive(&cmd(":Q#"), Response::from_static("#")).as_bytes(), ABORT_ACK.as_bytes());
}

#[test]
fn test_empty_reply_is_not_substituted() {
    for command in [":SC#", ":SC10/19/26#", ":Q#"] {
        assert!(post_receive(&cmd(command), Response::empty()).is_empty(), "{}", command);
    }
}

#[test]
fn test_other_replies_are_identity() {
    let reply = post_receive(&cmd(":GR#"), Response::from_static("12:34:56#"));
    assert_eq!(reply.as_bytes(), b"12:34:56#");

    // Abort in one direction is a different command
    let reply = post_receive(&cmd(":Qe#"), Response::from_static("#"));
    assert_eq!(reply.as_bytes(), b"#");
}

#[test]
fn test_key_matching() {
    assert!(Key::Exact(":Q#").matches(&cmd(":Q#")));
    assert!(!Key::Exact(":Q#").matches(&cmd(":Qe#")));
    assert!(Key::Prefix(":SC").matches(&cmd(":SC01/02/03#")));
    assert!(!Key::Prefix(":SC").matches(&cmd(":GC#")));
}
