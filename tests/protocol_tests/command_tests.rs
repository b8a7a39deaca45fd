//! Command Tests
//!
//! These tests verify:
//! - Framed command parsing
//! - Byte-by-byte assembly, including stray bytes and the probe byte

use lx200bridge::protocol::{Command, CommandAssembler, Feed, PROBE_BYTE};

// =============================================================================
// Helper Functions
// =============================================================================

/// Feed a byte string and collect every completed command
fn feed_all(assembler: &mut CommandAssembler, bytes: &[u8]) -> Vec<Feed> {
    bytes
        .iter()
        .map(|&b| assembler.push(b))
        .filter(|feed| *feed != Feed::Pending)
        .collect()
}

fn complete(text: &str) -> Feed {
    Feed::Complete(Command::parse(text.as_bytes().to_vec()).unwrap())
}

// =============================================================================
// Parsing Tests
// =============================================================================

#[test]
fn test_parse_framed_command() {
    let command = Command::parse(b":GVP#".to_vec()).unwrap();
    assert_eq!(command.as_bytes(), b":GVP#");
    assert_eq!(command.as_str(), Some(":GVP#"));
    assert_eq!(command.len(), 5);
    assert!(command.is(":GVP#"));
    assert!(command.starts_with(":GV"));
    assert_eq!(command.to_string(), ":GVP#");
}

#[test]
fn test_parse_rejects_unframed() {
    assert!(Command::parse(b"GVP#".to_vec()).is_err());
    assert!(Command::parse(b":GVP".to_vec()).is_err());
    assert!(Command::parse(b"".to_vec()).is_err());
    assert!(Command::parse(b":".to_vec()).is_err());
}

#[test]
fn test_parse_minimal_command() {
    let command = Command::parse(b":#".to_vec()).unwrap();
    assert_eq!(command.len(), 2);
    assert!(!command.is_empty());
}

// =============================================================================
// Assembly Tests
// =============================================================================

#[test]
fn test_assemble_single_command() {
    let mut assembler = CommandAssembler::new();
    assert_eq!(assembler.push(b':'), Feed::Pending);
    assert!(assembler.is_assembling());
    assert_eq!(assembler.push(b'G'), Feed::Pending);
    assert_eq!(assembler.push(b'R'), Feed::Pending);
    assert_eq!(assembler.pending(), b":GR");
    assert_eq!(assembler.push(b'#'), complete(":GR#"));
    assert!(!assembler.is_assembling());
    assert!(assembler.pending().is_empty());
}

#[test]
fn test_assemble_back_to_back_commands() {
    let mut assembler = CommandAssembler::new();
    let feeds = feed_all(&mut assembler, b":GR#:GD#:GVP#");
    assert_eq!(feeds, vec![complete(":GR#"), complete(":GD#"), complete(":GVP#")]);
}

#[test]
fn test_leading_terminator_is_ignored() {
    // Stellarium Mobile often prefixes commands with '#'
    let mut assembler = CommandAssembler::new();
    let feeds = feed_all(&mut assembler, b"#:GR#");
    assert_eq!(feeds, vec![complete(":GR#")]);
}

#[test]
fn test_bytes_outside_command_are_dropped() {
    let mut assembler = CommandAssembler::new();
    let feeds = feed_all(&mut assembler, b"junk\r\n:GD#more");
    assert_eq!(feeds, vec![complete(":GD#")]);
    assert!(!assembler.is_assembling());
}

#[test]
fn test_colon_inside_command_is_payload() {
    let mut assembler = CommandAssembler::new();
    let feeds = feed_all(&mut assembler, b":SL20:15:00#");
    assert_eq!(feeds, vec![complete(":SL20:15:00#")]);
}

#[test]
fn test_unterminated_command_keeps_waiting() {
    let mut assembler = CommandAssembler::new();
    let feeds = feed_all(&mut assembler, b":GVP");
    assert!(feeds.is_empty());
    assert!(assembler.is_assembling());
    assert_eq!(assembler.pending(), b":GVP");
}

#[test]
fn test_probe_outside_command() {
    let mut assembler = CommandAssembler::new();
    assert_eq!(assembler.push(PROBE_BYTE), Feed::Probe);
    assert!(!assembler.is_assembling());
}

#[test]
fn test_probe_inside_command_does_not_disturb_assembly() {
    let mut assembler = CommandAssembler::new();
    let feeds = feed_all(&mut assembler, &[b':', b'G', PROBE_BYTE, b'R', b'#']);
    assert_eq!(feeds, vec![Feed::Probe, complete(":GR#")]);
}
