use std::collections::HashMap;

/// Owner details for one process, taken from `ps`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessDetails {
    pub user: String,
    pub command: String,
    pub lifetime: Option<u64>,
}

/// Longest command line kept per process.
const MAX_COMMAND_LEN: usize = 200;

pub struct Utils;

impl Utils {
    /// Parse an address:port string.
    ///
    /// Handles multiple address formats:
    /// - IPv4: "127.0.0.1:3000" or "*:8080"
    /// - IPv6: "\[::1]:3000" or "\[fe80::1]:8080"
    /// - Interface-scoped: "127.0.0.53%lo:53"
    pub fn parse_address(address: &str) -> Option<(String, u16)> {
        if address.starts_with('[') {
            // IPv6 format: [::1]:3000
            let bracket_end = address.find(']')?;
            if bracket_end + 1 >= address.len() || address.as_bytes()[bracket_end + 1] != b':' {
                return None;
            }
            let addr = &address[..=bracket_end];
            let port_str = &address[bracket_end + 2..];
            let port: u16 = port_str.parse().ok()?;
            Some((addr.to_string(), port))
        } else {
            // IPv4 format: 127.0.0.1:3000 or *:8080
            let last_colon = address.rfind(':')?;
            let addr = &address[..last_colon];
            let port_str = &address[last_colon + 1..];
            let port: u16 = port_str.parse().ok()?;
            let addr = addr.split('%').next().unwrap_or(addr);
            let addr = if addr.is_empty() { "*" } else { addr };
            Some((addr.to_string(), port))
        }
    }

    /// Parse a `ps` elapsed time in `[[dd-]hh:]mm:ss` form into seconds.
    pub fn parse_etime(etime: &str) -> Option<u64> {
        let (days, clock) = match etime.split_once('-') {
            Some((d, rest)) => (d.parse::<u64>().ok()?, rest),
            None => (0, etime),
        };

        let mut seconds = 0u64;
        for part in clock.split(':') {
            seconds = seconds * 60 + part.parse::<u64>().ok()?;
        }
        Some(days * 86_400 + seconds)
    }

    /// Split off the first `n` whitespace-separated fields, returning the
    /// untouched remainder of the line as the last element.
    pub fn split_fields(line: &str, n: usize) -> Option<(Vec<&str>, &str)> {
        let mut rest = line.trim_start();
        let mut fields = Vec::with_capacity(n);
        for _ in 0..n {
            let end = rest.find(char::is_whitespace)?;
            fields.push(&rest[..end]);
            rest = rest[end..].trim_start();
        }
        Some((fields, rest.trim_end()))
    }

    /// Shorten a command line to [`MAX_COMMAND_LEN`] bytes on a char boundary.
    pub fn clip_command(command: &str) -> String {
        if command.len() <= MAX_COMMAND_LEN {
            return command.to_string();
        }
        let mut end = MAX_COMMAND_LEN;
        while !command.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &command[..end])
    }

    /// Parse `ps -axo pid=,<elapsed>=,user=,command=` output.
    ///
    /// `elapsed` converts the second column into seconds (`etimes` on Linux
    /// is already seconds, `etime` on macOS needs [`Utils::parse_etime`]).
    pub fn parse_ps_output(
        output: &str,
        elapsed: impl Fn(&str) -> Option<u64>,
    ) -> HashMap<u32, ProcessDetails> {
        let mut infos = HashMap::new();
        for line in output.lines() {
            let Some((fields, command)) = Utils::split_fields(line, 3) else {
                continue;
            };
            let Ok(pid) = fields[0].parse::<u32>() else {
                continue;
            };
            infos.insert(
                pid,
                ProcessDetails {
                    user: fields[2].to_string(),
                    command: Utils::clip_command(command),
                    lifetime: elapsed(fields[1]),
                },
            );
        }
        infos
    }
}
