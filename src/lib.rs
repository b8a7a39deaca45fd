//! # LX200 Bridge
//!
//! A TCP-to-serial bridge for the LX200 telescope command protocol with:
//! - Byte-by-byte `:` ... `#` command assembly from one remote client
//! - Handshaked, timeout-bounded exchanges with a serial companion controller
//! - Local answers and reply rewrites for SkySafari and Stellarium Mobile
//! - A single-threaded cooperative scheduler loop
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │              (one client, cooperative loop)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ bytes
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 Session / Assembler                          │
//! │            (probe byte, ':' ... '#' framing)                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Command
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Bridge                                 │
//! │                    (classifier)                              │
//! └──────────┬─────────────────────────────────┬────────────────┘
//!            │ local                           │ forward
//!            ▼                                 ▼
//!   ┌─────────────────┐   pre-send    ┌─────────────────┐
//!   │  Canned reply   │   post-recv   │ Companion Link  │
//!   │   (:GVP# ...)   │ ◀──quirks───▶ │  (serial, L/K)  │
//!   └─────────────────┘               └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod link;
pub mod bridge;
pub mod network;
pub mod status;
pub mod reset;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{BridgeError, Result};
pub use config::Config;
pub use bridge::{Bridge, Reply};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of the bridge
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
