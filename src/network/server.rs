//! TCP Server
//!
//! Single-threaded cooperative loop: accept, service the session, poll the
//! companion for status, check the reset input.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::bridge::Bridge;
use crate::config::Config;
use crate::error::Result;
use crate::link::Companion;
use crate::reset::{FileResetInput, NeverReset, ResetInput};
use crate::status::{LogDisplay, StatusDisplay, StatusPoller};
use super::session::{Session, SessionState};

/// Why [`Server::run`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Shutdown was requested
    Shutdown,

    /// The reset input was asserted; the process should restart
    Restart,
}

/// Cloneable flag that stops a running server
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    pub fn trigger(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// LX200 bridge server
pub struct Server<C> {
    config: Config,
    listener: TcpListener,
    bridge: Bridge<C>,
    session: Option<Session>,
    status: StatusPoller,
    reset: Box<dyn ResetInput + Send>,
    shutdown: ShutdownHandle,
}

impl<C: Companion> Server<C> {
    /// Bind the listener; the server does nothing until [`run`](Self::run)
    pub fn bind(config: Config, bridge: Bridge<C>) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr)?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;
        tracing::info!("LX200 TCP server listening on {}", local_addr);

        let station_addr = config.station_addr.unwrap_or_else(|| local_addr.ip());
        let status = StatusPoller::new(
            Box::new(LogDisplay::new()),
            config.status_poll_interval(),
            station_addr,
            config.ap_addr,
            config.companion_ap_addr,
        )?;

        let reset: Box<dyn ResetInput + Send> = match &config.reset_trigger {
            Some(path) => Box::new(FileResetInput::new(path)),
            None => Box::new(NeverReset),
        };

        Ok(Self {
            config,
            listener,
            bridge,
            session: None,
            status,
            reset,
            shutdown: ShutdownHandle::default(),
        })
    }

    /// Replace the status display
    pub fn with_status_display(mut self, display: Box<dyn StatusDisplay + Send>) -> Result<Self> {
        let station_addr = match self.config.station_addr {
            Some(addr) => addr,
            None => self.listener.local_addr()?.ip(),
        };
        self.status = StatusPoller::new(
            display,
            self.config.status_poll_interval(),
            station_addr,
            self.config.ap_addr,
            self.config.companion_ap_addr,
        )?;
        Ok(self)
    }

    /// Replace the reset input
    pub fn with_reset_input(mut self, input: Box<dyn ResetInput + Send>) -> Self {
        self.reset = input;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle for stopping the server from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Signal the server to stop after the current iteration
    pub fn shutdown(&self) {
        self.shutdown.trigger();
    }

    /// Run the scheduler loop until shutdown or reset
    pub fn run(&mut self) -> Result<RunOutcome> {
        loop {
            if let Some(outcome) = self.tick()? {
                tracing::info!("Server loop finished: {:?}", outcome);
                return Ok(outcome);
            }
        }
    }

    /// One scheduler iteration
    ///
    /// Every step is bounded; the longest is a companion exchange.
    pub fn tick(&mut self) -> Result<Option<RunOutcome>> {
        if self.reset.is_asserted() {
            tracing::warn!("Reset requested");
            return Ok(Some(RunOutcome::Restart));
        }
        if self.shutdown.is_triggered() {
            return Ok(Some(RunOutcome::Shutdown));
        }

        self.accept();

        if let Some(session) = self.session.as_mut() {
            match session.service(&mut self.bridge) {
                Ok(SessionState::Open) => {}
                Ok(SessionState::Closed(reason)) => {
                    tracing::info!("Session with {} closed: {:?}", session.peer_addr(), reason);
                    self.session = None;
                }
                Err(e) => {
                    tracing::warn!("Session with {} failed: {}", session.peer_addr(), e);
                    session.close();
                    self.session = None;
                }
            }
        }

        self.status.tick(&mut self.bridge, Instant::now());

        // A live session already waited on its read timeout
        if self.session.is_none() {
            std::thread::sleep(self.config.poll_interval());
        }

        Ok(None)
    }

    /// Accept a pending connection, superseding any current session
    fn accept(&mut self) {
        match self.listener.accept() {
            Ok((stream, addr)) => {
                if let Some(previous) = self.session.as_mut() {
                    tracing::info!("Client {} supersedes {}", addr, previous.peer_addr());
                    previous.close();
                }
                match Session::new(stream, self.config.client_idle_timeout(), self.config.poll_interval()) {
                    Ok(session) => self.session = Some(session),
                    Err(e) => {
                        tracing::warn!("Failed to set up session for {}: {}", addr, e);
                        self.session = None;
                    }
                }
            }
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => {}
            Err(e) => tracing::warn!("Accept failed: {}", e),
        }
    }

    /// True while a client is connected
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn bridge(&self) -> &Bridge<C> {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut Bridge<C> {
        &mut self.bridge
    }
}
