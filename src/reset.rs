//! Reset Input
//!
//! Operator-triggered restart. When the input is asserted the server loop
//! stops and the binary replaces itself with a fresh copy.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::Result;

/// A level input that requests a process restart
pub trait ResetInput {
    fn is_asserted(&mut self) -> bool;
}

/// Input that is never asserted
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverReset;

impl ResetInput for NeverReset {
    fn is_asserted(&mut self) -> bool {
        false
    }
}

/// Asserted when a trigger file exists; the file is consumed
#[derive(Debug, Clone)]
pub struct FileResetInput {
    path: PathBuf,
}

impl FileResetInput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResetInput for FileResetInput {
    fn is_asserted(&mut self) -> bool {
        if !self.path.exists() {
            return false;
        }

        // Consume the trigger so the restarted process does not loop
        match fs::remove_file(&self.path) {
            Ok(()) => true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => {
                // Restarting with the trigger still present would loop forever
                tracing::warn!("Could not remove reset trigger {}: {}", self.path.display(), e);
                false
            }
        }
    }
}

/// Command that relaunches this executable with its original arguments
pub fn relaunch_command() -> Result<Command> {
    let exe = std::env::current_exe()?;
    let mut command = Command::new(exe);
    command.args(std::env::args_os().skip(1));
    Ok(command)
}

/// Replace the current process image with a fresh copy
///
/// Keeps the pid, so a supervisor or terminal stays attached. Only returns
/// on failure.
#[cfg(unix)]
pub fn relaunch() -> io::Error {
    use std::os::unix::process::CommandExt;

    match relaunch_command() {
        Ok(mut command) => command.exec(),
        Err(e) => io::Error::new(io::ErrorKind::Other, e.to_string()),
    }
}

/// Start a fresh copy and let the caller exit
#[cfg(not(unix))]
pub fn relaunch() -> io::Error {
    match relaunch_command().map(|mut command| command.spawn()) {
        Ok(Ok(child)) => {
            tracing::info!("Started replacement as pid {}", child.id());
            std::process::exit(0);
        }
        Ok(Err(e)) => e,
        Err(e) => io::Error::new(io::ErrorKind::Other, e.to_string()),
    }
}
