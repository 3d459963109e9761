//! Linux port scanner implementation using ss.

use std::collections::{HashMap, HashSet};
use std::process::Stdio;
use std::sync::OnceLock;

use regex::Regex;
use tokio::process::Command;
use tracing::debug;

use crate::domain::{PortInfo, Protocol};
use crate::error::{Error, Result};

use super::utils::{ProcessDetails, Utils};
use super::Scanner;

/// Linux-specific port scanner.
pub struct LinuxScanner;

fn users_regex() -> &'static Regex {
    static USERS: OnceLock<Regex> = OnceLock::new();
    USERS.get_or_init(|| {
        Regex::new(r#"\("(.+?)",pid=(\d+),fd=(\d+)\)"#).expect("users pattern is valid")
    })
}

impl LinuxScanner {
    pub fn new() -> Self {
        Self
    }

    async fn get_process_infos(&self) -> HashMap<u32, ProcessDetails> {
        let output = match Command::new("ps")
            .args(["-axo", "pid=,etimes=,user=,command="])
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
        Utils::parse_ps_output(&stdout, |s| s.parse().ok())
    }

    /// Parse `ss -Htulnp` output.
    ///
    /// Columns: Netid State Recv-Q Send-Q Local Peer Process. A socket shared
    /// by several processes yields one entry per process.
    fn parse_ss_output(
        &self,
        output: &str,
        process_infos: &HashMap<u32, ProcessDetails>,
    ) -> Vec<PortInfo> {
        let mut ports = Vec::new();
        let mut seen: HashSet<(u16, u32, Protocol)> = HashSet::new();

        for line in output.lines() {
            let components: Vec<&str> = line.split_whitespace().collect();
            if components.len() < 7 {
                continue;
            }

            let protocol = match components[0] {
                "tcp" => Protocol::Tcp,
                "udp" => Protocol::Udp,
                _ => continue,
            };

            let Some((address, port)) = Utils::parse_address(components[4]) else {
                continue;
            };

            let process_column = components[6..].join(" ");
            for caps in users_regex().captures_iter(&process_column) {
                let process_name = caps[1].to_string();
                let Ok(pid) = caps[2].parse::<u32>() else {
                    continue;
                };

                if !seen.insert((port, pid, protocol)) {
                    continue;
                }

                let info = process_infos.get(&pid);
                let user = info.map(|i| i.user.clone()).unwrap_or_default();
                let command = info
                    .map(|i| i.command.clone())
                    .unwrap_or_else(|| process_name.clone());

                ports.push(
                    PortInfo::new(port, pid, process_name, command, user, protocol)
                        .with_address(address.clone())
                        .with_lifetime(info.and_then(|i| i.lifetime)),
                );
            }
        }

        ports.sort_by_key(|p| (p.port, p.pid));
        ports
    }
}

impl Default for LinuxScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for LinuxScanner {
    async fn scan(&self) -> Result<Vec<PortInfo>> {
        let output = Command::new("ss")
            .args(["-Htulnp"])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::CommandFailed(format!("Failed to run ss: {}", e)))?;

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| Error::ParseError(format!("Invalid UTF-8 in ss output: {}", e)))?;

        let process_infos = self.get_process_infos().await;
        Ok(self.parse_ss_output(&stdout, &process_infos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SS_OUTPUT: &str = "\
tcp   LISTEN 0      511          0.0.0.0:80        0.0.0.0:*    users:((\"nginx\",pid=1234,fd=6),(\"nginx\",pid=1235,fd=6))
tcp   LISTEN 0      511             [::]:3000         [::]:*    users:((\"node\",pid=4321,fd=19))
udp   UNCONN 0      0      127.0.0.53%lo:53        0.0.0.0:*    users:((\"systemd-resolve\",pid=600,fd=13))
tcp   LISTEN 0      128        127.0.0.1:631       0.0.0.0:*
";

    #[test]
    fn test_parse_ss_output() {
        let scanner = LinuxScanner::new();
        let mut infos = HashMap::new();
        infos.insert(
            4321,
            ProcessDetails {
                user: "dev".to_string(),
                command: "node server.js".to_string(),
                lifetime: Some(120),
            },
        );

        let ports = scanner.parse_ss_output(SS_OUTPUT, &infos);
        assert_eq!(ports.len(), 4);

        assert_eq!(ports[0].port, 53);
        assert_eq!(ports[0].protocol, Protocol::Udp);
        assert_eq!(ports[0].address, "127.0.0.53");

        assert_eq!(ports[1].port, 80);
        assert_eq!(ports[1].pid, 1234);
        assert_eq!(ports[2].pid, 1235);
        assert_eq!(ports[1].command, "nginx");

        let node = &ports[3];
        assert_eq!(node.port, 3000);
        assert_eq!(node.user, "dev");
        assert_eq!(node.command, "node server.js");
        assert_eq!(node.lifetime, Some(120));
    }
}
