//! Port and process domain models.

use serde::{Deserialize, Serialize};

// ============================================================================
// ProcessType
// ============================================================================

/// Category of process based on its function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ProcessType {
    /// Web servers (nginx, apache, caddy, etc.)
    WebServer,
    /// Database servers (postgres, mysql, redis, etc.)
    Database,
    /// Development tools (node, python, vite, etc.)
    Development,
    /// System processes (launchd, kernel services, etc.)
    System,
    /// Other/unknown processes
    #[default]
    Other,
}

impl ProcessType {
    /// All available process types, in display order.
    pub const ALL: [ProcessType; 5] = [
        ProcessType::Development,
        ProcessType::WebServer,
        ProcessType::Database,
        ProcessType::System,
        ProcessType::Other,
    ];

    /// Detect the process type from a process name and its command line.
    pub fn detect(process_name: &str, command: &str) -> Self {
        let name = process_name.to_lowercase();
        let cmd = command.to_lowercase();
        let check = |patterns: &[&str]| {
            patterns
                .iter()
                .any(|p| name.contains(p) || cmd.contains(p))
        };

        const WEB_SERVERS: &[&str] = &[
            "nginx", "apache", "httpd", "caddy", "traefik", "lighttpd", "envoy", "haproxy",
        ];
        if check(WEB_SERVERS) {
            return ProcessType::WebServer;
        }

        const DATABASES: &[&str] = &[
            "postgres", "mysql", "mariadb", "redis", "mongo", "sqlite",
            "cockroach", "clickhouse", "cassandra", "elasticsearch", "memcached",
        ];
        if check(DATABASES) {
            return ProcessType::Database;
        }

        const DEV_TOOLS: &[&str] = &[
            "node", "npm", "yarn", "pnpm", "bun", "deno", "python", "ruby", "php",
            "java", "cargo", "rustc", "swift", "vite", "webpack", "esbuild",
            "next", "nuxt", "remix", "astro", "turbo", "parcel",
        ];
        if check(DEV_TOOLS) {
            return ProcessType::Development;
        }

        // System daemons are matched on the name only, commands are too noisy.
        const SYSTEM_PROCS: &[&str] = &[
            "launchd", "rapportd", "sharingd", "airplay", "controlce", "kernel",
            "mds", "spotlight", "systemd", "init", "dbus", "udev", "sshd", "cupsd",
            "avahi", "chronyd", "dnsmasq",
        ];
        if SYSTEM_PROCS.iter().any(|s| name.contains(s)) {
            return ProcessType::System;
        }

        ProcessType::Other
    }

    /// Get the display name for this process type.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProcessType::WebServer => "Web Server",
            ProcessType::Database => "Database",
            ProcessType::Development => "Development",
            ProcessType::System => "System",
            ProcessType::Other => "Other",
        }
    }

    /// Stable slug used as the identity of this category's port group.
    pub fn slug(&self) -> &'static str {
        match self {
            ProcessType::WebServer => "web",
            ProcessType::Database => "database",
            ProcessType::Development => "development",
            ProcessType::System => "system",
            ProcessType::Other => "other",
        }
    }
}

impl std::fmt::Display for ProcessType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Protocol
// ============================================================================

/// Transport protocol of a bound socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// PortInfo
// ============================================================================

/// Information about a network port and its owning process.
///
/// One snapshot per refresh cycle; never mutated after the scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortInfo {
    /// The port number (e.g., 3000, 8080).
    pub port: u16,
    /// Process ID of the process using this port.
    pub pid: u32,
    /// Name of the process using this port.
    pub process_name: String,
    /// Full command line that started the process.
    pub command: String,
    /// Username of the process owner.
    pub user: String,
    /// Network address the port is bound to.
    pub address: String,
    /// Transport protocol.
    pub protocol: Protocol,
    /// Process category, when it could be classified.
    #[serde(default, rename = "type")]
    pub process_type: Option<ProcessType>,
    /// Seconds since the owning process started.
    #[serde(default)]
    pub lifetime: Option<u64>,
}

impl PortInfo {
    /// Create a port record from scan results, classifying the process.
    pub fn new(
        port: u16,
        pid: u32,
        process_name: impl Into<String>,
        command: impl Into<String>,
        user: impl Into<String>,
        protocol: Protocol,
    ) -> Self {
        let process_name = process_name.into();
        let command = command.into();
        let process_type = Some(ProcessType::detect(&process_name, &command));
        Self {
            port,
            pid,
            process_name,
            command,
            user: user.into(),
            address: "*".to_string(),
            protocol,
            process_type,
            lifetime: None,
        }
    }

    /// Set the bound address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Set the process lifetime in seconds.
    pub fn with_lifetime(mut self, seconds: Option<u64>) -> Self {
        self.lifetime = seconds;
        self
    }

    /// Category used for grouping; unclassified ports fall into `Other`.
    pub fn category(&self) -> ProcessType {
        self.process_type.unwrap_or_default()
    }

    /// Check if this port matches a filter string.
    ///
    /// A port matches when the filter is empty or when any of the port number
    /// (substring), process name or command (case-insensitive substring) contains it.
    pub fn matches_filter(&self, filter: &str) -> bool {
        if filter.is_empty() {
            return true;
        }
        let needle = filter.to_lowercase();
        self.port.to_string().contains(filter)
            || self.process_name.to_lowercase().contains(&needle)
            || self.command.to_lowercase().contains(&needle)
    }
}

impl std::fmt::Display for PortInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}/{} (PID: {}, Process: {})",
            self.address, self.port, self.protocol, self.pid, self.process_name
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_type_detect() {
        assert_eq!(ProcessType::detect("nginx", ""), ProcessType::WebServer);
        assert_eq!(ProcessType::detect("postgres", ""), ProcessType::Database);
        assert_eq!(ProcessType::detect("node", ""), ProcessType::Development);
        assert_eq!(ProcessType::detect("launchd", ""), ProcessType::System);
        assert_eq!(ProcessType::detect("unknown", ""), ProcessType::Other);
    }

    #[test]
    fn test_detect_uses_command() {
        assert_eq!(
            ProcessType::detect("MainThread", "/usr/bin/python3 -m http.server"),
            ProcessType::Development
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(ProcessType::detect("NGINX", ""), ProcessType::WebServer);
        assert_eq!(ProcessType::detect("PostgreSQL", ""), ProcessType::Database);
    }

    #[test]
    fn test_port_info_new() {
        let port = PortInfo::new(3000, 1234, "node", "node server.js", "user", Protocol::Tcp);
        assert_eq!(port.port, 3000);
        assert_eq!(port.category(), ProcessType::Development);
        assert_eq!(port.address, "*");
        assert!(port.lifetime.is_none());
    }

    #[test]
    fn test_matches_filter() {
        let port = PortInfo::new(3000, 1234, "Node", "node Server.js", "testuser", Protocol::Tcp);

        assert!(port.matches_filter(""));
        assert!(port.matches_filter("300"));
        assert!(port.matches_filter("node"));
        assert!(port.matches_filter("SERVER"));
        // user and pid are not part of the filter
        assert!(!port.matches_filter("testuser"));
        assert!(!port.matches_filter("1234"));
    }

    #[test]
    fn test_unclassified_category() {
        let mut port = PortInfo::new(53, 9, "dnsd", "dnsd", "root", Protocol::Udp);
        port.process_type = None;
        assert_eq!(port.category(), ProcessType::Other);
    }
}
