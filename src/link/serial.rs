//! Serial transport
//!
//! [`LinkPort`] over a `serialport` device.

use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{ClearBuffer, SerialPort};

use crate::error::Result;
use super::LinkPort;

/// Serial port to the companion controller (8N1)
pub struct SerialLinkPort {
    port: Box<dyn SerialPort>,
}

impl SerialLinkPort {
    /// Open the device and drop any junk already sitting in its buffer
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .timeout(Duration::from_millis(10))
            .open()?;

        port.clear(ClearBuffer::Input)?;
        tracing::info!("Opened companion link {} @ {} baud", path, baud_rate);

        Ok(Self { port })
    }

    /// Wrap an already-open port
    pub fn from_port(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }
}

impl LinkPort for SerialLinkPort {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        Write::write_all(&mut self.port, bytes)?;
        Write::flush(&mut self.port)
    }

    fn read_byte(&mut self, timeout: Duration) -> io::Result<Option<u8>> {
        self.port.set_timeout(timeout).map_err(io::Error::from)?;

        let mut byte = [0u8; 1];
        match self.port.read(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn discard_pending(&mut self) -> io::Result<usize> {
        let pending = self.port.bytes_to_read().map_err(io::Error::from)? as usize;
        self.port.clear(ClearBuffer::Input).map_err(io::Error::from)?;
        Ok(pending)
    }
}
