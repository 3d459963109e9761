//! macOS port scanner implementation using lsof and ps.

use std::collections::{HashMap, HashSet};
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::domain::{PortInfo, Protocol};
use crate::error::{Error, Result};

use super::utils::{ProcessDetails, Utils};
use super::Scanner;

/// macOS-specific port scanner using lsof.
pub struct DarwinScanner;

impl DarwinScanner {
    /// Create a new macOS scanner.
    pub fn new() -> Self {
        Self
    }

    /// Get owner, lifetime and full command for all processes using ps.
    async fn get_process_infos(&self) -> HashMap<u32, ProcessDetails> {
        let output = match Command::new("/bin/ps")
            .args(["-axo", "pid=,etime=,user=,command="])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                debug!(error = %e, "ps unavailable, continuing without process details");
                return HashMap::new();
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        Utils::parse_ps_output(&stdout, Utils::parse_etime)
    }

    /// Parse lsof output into PortInfo objects.
    ///
    /// Keeps TCP sockets in LISTEN state and every bound UDP socket.
    fn parse_lsof_output(
        &self,
        output: &str,
        process_infos: &HashMap<u32, ProcessDetails>,
    ) -> Vec<PortInfo> {
        let mut ports = Vec::new();
        let mut seen: HashSet<(u16, u32, Protocol)> = HashSet::new();

        for line in output.lines().skip(1) {
            let components: Vec<&str> = line.split_whitespace().collect();
            if components.len() < 9 {
                continue;
            }

            let protocol = match components[7] {
                "TCP" if line.contains("(LISTEN)") => Protocol::Tcp,
                "UDP" => Protocol::Udp,
                _ => continue,
            };

            let process_name = components[0].replace("\\x20", " ").replace("\\x2f", "/");

            let Ok(pid) = components[1].parse::<u32>() else {
                continue;
            };

            // UDP sockets with a peer print "local->remote"; only the local side matters.
            let local = components[8].split("->").next().unwrap_or(components[8]);
            let Some((address, port)) = Utils::parse_address(local) else {
                continue;
            };

            if !seen.insert((port, pid, protocol)) {
                continue;
            }

            let info = process_infos.get(&pid);
            let user = info
                .map(|i| i.user.clone())
                .unwrap_or_else(|| components[2].to_string());
            let command = info
                .map(|i| i.command.clone())
                .unwrap_or_else(|| process_name.clone());

            ports.push(
                PortInfo::new(port, pid, process_name, command, user, protocol)
                    .with_address(address)
                    .with_lifetime(info.and_then(|i| i.lifetime)),
            );
        }

        ports.sort_by_key(|p| (p.port, p.pid));
        ports
    }
}

impl Default for DarwinScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for DarwinScanner {
    async fn scan(&self) -> Result<Vec<PortInfo>> {
        let output = Command::new("/usr/sbin/lsof")
            .args(["-i", "-P", "-n", "+c", "0"])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::CommandFailed(format!("Failed to run lsof: {}", e)))?;

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| Error::ParseError(format!("Invalid UTF-8 in lsof output: {}", e)))?;

        let process_infos = self.get_process_infos().await;
        Ok(self.parse_lsof_output(&stdout, &process_infos))
    }
}
