//! Process killer adapter using Unix signals.
//!
//! The graceful kill follows this pattern:
//! 1. Send SIGTERM to request graceful shutdown
//! 2. Wait 500ms for the process to clean up
//! 3. Check if process is still running
//! 4. If still running, send SIGKILL for immediate termination

use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::ports::ProcessKillerPort;

/// Grace period to wait between SIGTERM and SIGKILL (500ms)
const GRACEFUL_KILL_TIMEOUT_MS: u64 = 500;

/// Process killer for the current platform.
#[derive(Debug, Default)]
pub struct ProcessKiller;

impl ProcessKiller {
    pub fn new() -> Self {
        Self
    }

    #[cfg(unix)]
    fn send_signal(&self, pid: u32, signal: nix::sys::signal::Signal) -> Result<()> {
        use nix::errno::Errno;
        use nix::unistd::Pid;

        if pid <= 1 {
            return Err(Error::PermissionDenied(format!("refusing to signal pid {}", pid)));
        }
        let raw = i32::try_from(pid)
            .map_err(|_| Error::KillFailed { pid, reason: "pid out of range".to_string() })?;

        debug!(pid, ?signal, "Sending signal to process");
        match nix::sys::signal::kill(Pid::from_raw(raw), signal) {
            Ok(()) => Ok(()),
            Err(Errno::ESRCH) => Err(Error::ProcessNotFound(pid)),
            Err(Errno::EPERM) => {
                warn!(pid, "Permission denied to kill process");
                Err(Error::PermissionDenied(format!("cannot signal process {}", pid)))
            }
            Err(e) => Err(Error::KillFailed {
                pid,
                reason: e.to_string(),
            }),
        }
    }

    #[cfg(unix)]
    async fn kill_gracefully(&self, pid: u32) -> Result<bool> {
        use nix::sys::signal::Signal;

        match self.send_signal(pid, Signal::SIGTERM) {
            Ok(()) => debug!(pid, "SIGTERM sent, waiting for process to terminate"),
            Err(Error::ProcessNotFound(_)) => {
                debug!(pid, "Process not found, already terminated");
                return Ok(true);
            }
            Err(e) => return Err(e),
        }

        sleep(Duration::from_millis(GRACEFUL_KILL_TIMEOUT_MS)).await;

        if !self.is_running(pid) {
            debug!(pid, "Process terminated after SIGTERM");
            return Ok(true);
        }

        debug!(pid, "Process still running after grace period, sending SIGKILL");
        self.kill_force(pid).await
    }

    #[cfg(unix)]
    async fn kill_force(&self, pid: u32) -> Result<bool> {
        use nix::sys::signal::Signal;

        match self.send_signal(pid, Signal::SIGKILL) {
            Ok(()) | Err(Error::ProcessNotFound(_)) => {}
            Err(e) => return Err(e),
        }
        // Give the kernel a moment to reap before reporting.
        sleep(Duration::from_millis(50)).await;
        Ok(!self.is_running(pid))
    }
}

#[cfg(unix)]
impl ProcessKillerPort for ProcessKiller {
    async fn kill(&self, pid: u32, force: bool) -> Result<bool> {
        if force {
            self.kill_force(pid).await
        } else {
            self.kill_gracefully(pid).await
        }
    }

    fn is_running(&self, pid: u32) -> bool {
        let Ok(raw) = i32::try_from(pid) else {
            return false;
        };
        // Signal 0 only checks existence and permission.
        match nix::sys::signal::kill(nix::unistd::Pid::from_raw(raw), None) {
            Ok(()) => true,
            Err(nix::errno::Errno::EPERM) => true,
            Err(_) => false,
        }
    }
}

#[cfg(not(unix))]
impl ProcessKillerPort for ProcessKiller {
    async fn kill(&self, _pid: u32, _force: bool) -> Result<bool> {
        Err(Error::UnsupportedPlatform(std::env::consts::OS.to_string()))
    }

    fn is_running(&self, _pid: u32) -> bool {
        false
    }
}
