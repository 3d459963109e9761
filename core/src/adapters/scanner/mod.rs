//! Port scanner adapters.
//!
//! Platform-specific implementations of port scanning.

#[cfg(target_os = "macos")]
mod darwin;

#[cfg(target_os = "linux")]
mod linux;

mod utils;

use crate::domain::PortInfo;
use crate::error::Result;
use crate::ports::PortScannerPort;

/// The main port scanner that uses platform-specific implementations.
pub struct PortScanner {
    #[cfg(target_os = "macos")]
    inner: darwin::DarwinScanner,

    #[cfg(target_os = "linux")]
    inner: linux::LinuxScanner,
}

impl PortScanner {
    /// Create a new port scanner for the current platform.
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "macos")]
            inner: darwin::DarwinScanner::new(),

            #[cfg(target_os = "linux")]
            inner: linux::LinuxScanner::new(),
        }
    }

    /// Scan all listening TCP ports and bound UDP sockets.
    #[cfg(any(target_os = "macos", target_os = "linux"))]
    pub async fn scan(&self) -> Result<Vec<PortInfo>> {
        self.inner.scan().await
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    pub async fn scan(&self) -> Result<Vec<PortInfo>> {
        Err(crate::error::Error::UnsupportedPlatform(
            std::env::consts::OS.to_string(),
        ))
    }
}

impl Default for PortScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl PortScannerPort for PortScanner {
    async fn scan(&self) -> Result<Vec<PortInfo>> {
        PortScanner::scan(self).await
    }
}

/// Internal trait for platform-specific implementations.
#[allow(dead_code)]
trait Scanner: Send + Sync {
    fn scan(&self) -> impl std::future::Future<Output = Result<Vec<PortInfo>>> + Send;
}
