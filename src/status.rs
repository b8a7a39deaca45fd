//! Status Module
//!
//! Periodically asks the companion for its display peer's address and
//! pushes the set of addresses to a status display.

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::bridge::Bridge;
use crate::error::Result;
use crate::link::Companion;
use crate::protocol::{Command, Response, TERMINATOR};

/// Companion query returning its display peer's station address
pub const STATUS_QUERY: &str = ":GI#";

/// Shortest reply that can carry an address
const MIN_REPLY_LEN: usize = 5;

/// Everything the status display shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    /// This host on the station network
    pub station_addr: IpAddr,

    /// This host on its own access point
    pub ap_addr: IpAddr,

    /// Station address reported by the companion, as text
    pub companion_label: String,

    /// Companion display peer on the access point
    pub companion_ap_addr: IpAddr,
}

impl fmt::Display for StatusInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LX-STA {} | LX-AP {} | WD-STA {} | WD-AP {}",
            self.station_addr, self.ap_addr, self.companion_label, self.companion_ap_addr
        )
    }
}

/// A sink for status updates (an OLED panel on the bridge hardware)
pub trait StatusDisplay {
    fn update(&mut self, info: &StatusInfo);
}

/// Status display that logs each update and remembers the latest
#[derive(Debug, Clone, Default)]
pub struct LogDisplay {
    last: Arc<Mutex<Option<StatusInfo>>>,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent update, if any
    pub fn last(&self) -> Option<StatusInfo> {
        self.last.lock().clone()
    }
}

impl StatusDisplay for LogDisplay {
    fn update(&mut self, info: &StatusInfo) {
        tracing::info!("Status: {}", info);
        *self.last.lock() = Some(info.clone());
    }
}

/// Extract the companion's address label from a `:GI#` reply
///
/// The reply must be longer than four bytes and end with `#`; the
/// terminator and surrounding whitespace are removed.
pub fn parse_label(response: &Response) -> Option<String> {
    let bytes = response.as_bytes();
    if bytes.len() < MIN_REPLY_LEN || bytes.last() != Some(&TERMINATOR) {
        return None;
    }

    let text = String::from_utf8_lossy(&bytes[..bytes.len() - 1]);
    let label = text.trim();
    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}

/// Low-frequency companion query feeding the status display
///
/// Polls until one valid answer is received, then goes quiet.
pub struct StatusPoller {
    display: Box<dyn StatusDisplay + Send>,
    query: Command,
    interval: Duration,
    last_poll: Instant,
    done: bool,
    station_addr: IpAddr,
    ap_addr: IpAddr,
    companion_ap_addr: IpAddr,
}

impl StatusPoller {
    /// The first query is sent one interval after creation
    pub fn new(
        display: Box<dyn StatusDisplay + Send>,
        interval: Duration,
        station_addr: IpAddr,
        ap_addr: IpAddr,
        companion_ap_addr: IpAddr,
    ) -> Result<Self> {
        Ok(Self {
            display,
            query: Command::parse(STATUS_QUERY.as_bytes())?,
            interval,
            last_poll: Instant::now(),
            done: false,
            station_addr,
            ap_addr,
            companion_ap_addr,
        })
    }

    /// True once the display has received the companion's address
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Run one scheduler tick; returns true if the display was updated
    pub fn tick<C: Companion>(&mut self, bridge: &mut Bridge<C>, now: Instant) -> bool {
        if self.done || now.saturating_duration_since(self.last_poll) < self.interval {
            return false;
        }
        self.last_poll = now;

        let response = bridge.query(&self.query);
        tracing::debug!("Companion address reply: {:?}", response);

        let Some(companion_label) = parse_label(&response) else {
            return false;
        };

        let info = StatusInfo {
            station_addr: self.station_addr,
            ap_addr: self.ap_addr,
            companion_label,
            companion_ap_addr: self.companion_ap_addr,
        };
        self.display.update(&info);
        self.done = true;
        tracing::info!("Got the display peer address from the companion");
        true
    }
}
