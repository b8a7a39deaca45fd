//! Network Module
//!
//! TCP server and client session handling.
//!
//! ## Architecture
//! - One thread, one cooperative loop
//! - At most one client session; a new connection replaces the old one
//! - Commands routed through the Bridge

mod server;
mod session;

pub use server::{RunOutcome, Server, ShutdownHandle};
pub use session::{CloseReason, Session, SessionState};
