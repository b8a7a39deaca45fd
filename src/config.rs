//! Configuration for the LX200 bridge
//!
//! Centralized configuration with sensible defaults.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{BridgeError, Result};
use crate::link::LinkTimings;

/// Idle bound for a client session (no bytes received)
pub const CLIENT_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Main configuration for a bridge instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address for SkySafari / Stellarium
    pub listen_addr: String,

    /// Close a session after this long without a byte from the client
    /// (milliseconds)
    pub client_idle_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Companion Link Configuration
    // -------------------------------------------------------------------------
    /// Serial device connected to the companion controller
    pub serial_port: String,

    /// Serial baud rate
    pub baud_rate: u32,

    /// Handshake / reply timing budgets
    pub link_timings: LinkTimings,

    // -------------------------------------------------------------------------
    // Scheduler Configuration
    // -------------------------------------------------------------------------
    /// Pause between scheduler iterations (milliseconds)
    pub poll_interval_ms: u64,

    /// Interval between companion address queries (milliseconds)
    pub status_poll_interval_ms: u64,

    // -------------------------------------------------------------------------
    // Status Display Configuration
    // -------------------------------------------------------------------------
    /// Address of this host on the station network; the listener's local
    /// address is used when unset
    pub station_addr: Option<IpAddr>,

    /// Address of this host on its own access point
    pub ap_addr: IpAddr,

    /// Access-point address of the companion's display peer
    pub companion_ap_addr: IpAddr,

    // -------------------------------------------------------------------------
    // Reset Configuration
    // -------------------------------------------------------------------------
    /// File whose appearance requests a restart
    pub reset_trigger: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:4030".to_string(),
            client_idle_timeout_ms: CLIENT_IDLE_TIMEOUT.as_millis() as u64,
            serial_port: "/dev/ttyUSB0".to_string(),
            baud_rate: 230_400,
            link_timings: LinkTimings::default(),
            poll_interval_ms: 1,
            status_poll_interval_ms: 15_000,
            station_addr: None,
            ap_addr: IpAddr::V4(Ipv4Addr::new(192, 168, 4, 1)),
            companion_ap_addr: IpAddr::V4(Ipv4Addr::new(192, 168, 4, 2)),
            reset_trigger: None,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn client_idle_timeout(&self) -> Duration {
        Duration::from_millis(self.client_idle_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn status_poll_interval(&self) -> Duration {
        Duration::from_millis(self.status_poll_interval_ms)
    }

    /// Reject settings the bridge cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.listen_addr.is_empty() {
            return Err(BridgeError::Config("listen address is empty".to_string()));
        }
        if self.serial_port.is_empty() {
            return Err(BridgeError::Config("serial port is empty".to_string()));
        }
        if self.baud_rate == 0 {
            return Err(BridgeError::Config("baud rate must be non-zero".to_string()));
        }
        if self.client_idle_timeout_ms == 0 {
            return Err(BridgeError::Config(
                "client idle timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the client idle timeout (in milliseconds)
    pub fn client_idle_timeout_ms(mut self, ms: u64) -> Self {
        self.config.client_idle_timeout_ms = ms;
        self
    }

    /// Set the serial device path
    pub fn serial_port(mut self, path: impl Into<String>) -> Self {
        self.config.serial_port = path.into();
        self
    }

    /// Set the serial baud rate
    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.config.baud_rate = baud;
        self
    }

    /// Set the link timing budgets
    pub fn link_timings(mut self, timings: LinkTimings) -> Self {
        self.config.link_timings = timings;
        self
    }

    /// Set the scheduler pause (in milliseconds)
    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    /// Set the companion address query interval (in milliseconds)
    pub fn status_poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.status_poll_interval_ms = ms;
        self
    }

    pub fn station_addr(mut self, addr: Option<IpAddr>) -> Self {
        self.config.station_addr = addr;
        self
    }

    pub fn ap_addr(mut self, addr: IpAddr) -> Self {
        self.config.ap_addr = addr;
        self
    }

    pub fn companion_ap_addr(mut self, addr: IpAddr) -> Self {
        self.config.companion_ap_addr = addr;
        self
    }

    /// Set the reset trigger file
    pub fn reset_trigger(mut self, path: Option<PathBuf>) -> Self {
        self.config.reset_trigger = path;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
