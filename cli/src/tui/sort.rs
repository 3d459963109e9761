//! Ordering within groups and selection cursor arithmetic.

use std::cmp::Ordering;

use portslay_core::{PortGroup, PortInfo};

use super::state::SortKey;

/// Case-insensitive comparison with a case-sensitive tiebreak, so that
/// "api" < "Billing" < "billing" regardless of ASCII case order.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn compare(a: &PortInfo, b: &PortInfo, key: SortKey) -> Ordering {
    match key {
        SortKey::Port => a.port.cmp(&b.port),
        SortKey::Pid => a.pid.cmp(&b.pid),
        SortKey::Process => compare_text(&a.process_name, &b.process_name),
        SortKey::User => compare_text(&a.user, &b.user),
    }
}

/// Sort a slice of ports by `key`. The sort is stable.
pub fn sort_ports(ports: &mut [PortInfo], key: SortKey) {
    ports.sort_by(|a, b| compare(a, b, key));
}

/// Interactive sort: reorder each group's ports in place.
///
/// Group membership and group order never change. Without a key the current
/// order is kept as is.
pub fn apply_sort(groups: &mut [PortGroup], key: Option<SortKey>) {
    let Some(key) = key else {
        return;
    };
    for group in groups {
        sort_ports(&mut group.ports, key);
    }
}

/// One-shot command-line sort. Unlike [`apply_sort`], an unrecognized key
/// still produces a defined order: by port.
pub fn sort_for_cli(ports: &mut [PortInfo], key: &str) {
    sort_ports(ports, SortKey::parse(key).unwrap_or(SortKey::Port));
}

/// Clamp `index` into a list of `len` entries; 0 for an empty list.
pub fn adjust_selected_index(len: usize, index: usize) -> usize {
    if index >= len {
        len.saturating_sub(1)
    } else {
        index
    }
}

/// Move `index` by `delta` inside `0..len`, wrapping around both ends.
pub fn wrap_index(index: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as isize;
    let index = index.min(len as usize - 1) as isize;
    (index + delta).rem_euclid(len) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use portslay_core::{process_ports, Protocol};

    fn port(port: u16, pid: u32, name: &str, user: &str) -> PortInfo {
        PortInfo::new(port, pid, name, name, user, Protocol::Tcp)
    }

    #[test]
    fn test_wrap_index() {
        assert_eq!(wrap_index(0, -1, 5), 4);
        assert_eq!(wrap_index(4, 1, 5), 0);
        assert_eq!(wrap_index(2, 1, 5), 3);
        assert_eq!(wrap_index(1, -12, 5), 4);
        assert_eq!(wrap_index(9, 1, 5), 0);
        assert_eq!(wrap_index(3, 1, 0), 0);
    }

    #[test]
    fn test_adjust_selected_index() {
        assert_eq!(adjust_selected_index(0, 0), 0);
        assert_eq!(adjust_selected_index(0, 7), 0);
        assert_eq!(adjust_selected_index(3, 7), 2);
        assert_eq!(adjust_selected_index(3, 1), 1);
    }

    #[test]
    fn test_adjust_selected_index_always_in_range() {
        for len in 0..6 {
            for index in 0..10 {
                let adjusted = adjust_selected_index(len, index);
                if len == 0 {
                    assert_eq!(adjusted, 0);
                } else {
                    assert!(adjusted < len);
                }
            }
        }
    }

    #[test]
    fn test_sort_by_process_ignores_case() {
        let mut ports = vec![
            port(1, 1, "zsh", "a"),
            port(2, 2, "Billing", "a"),
            port(3, 3, "api", "a"),
        ];
        sort_ports(&mut ports, SortKey::Process);
        let names: Vec<&str> = ports.iter().map(|p| p.process_name.as_str()).collect();
        assert_eq!(names, vec!["api", "Billing", "zsh"]);
    }

    #[test]
    fn test_apply_sort_is_per_group() {
        let ports = vec![
            port(9000, 5, "node", "me"),
            port(3000, 9, "node", "me"),
            port(80, 1, "nginx", "root"),
            port(8080, 2, "nginx", "root"),
        ];
        let mut groups = process_ports(ports, &[]).groups;

        apply_sort(&mut groups, Some(SortKey::Port));
        assert_eq!(groups[0].ports[0].port, 3000);
        assert_eq!(groups[1].ports[0].port, 80);

        apply_sort(&mut groups, Some(SortKey::Pid));
        assert_eq!(groups[0].ports[0].pid, 5);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].len(), 2);
    }

    #[test]
    fn test_interactive_unknown_key_keeps_order() {
        let ports = vec![port(9000, 5, "node", "me"), port(3000, 9, "node", "me")];
        let mut groups = process_ports(ports, &[]).groups;
        apply_sort(&mut groups, SortKey::parse("memory"));
        assert_eq!(groups[0].ports[0].port, 9000);
    }

    #[test]
    fn test_cli_unknown_key_sorts_by_port() {
        let mut ports = vec![port(9000, 1, "b", "x"), port(22, 2, "a", "y")];
        sort_for_cli(&mut ports, "memory");
        assert_eq!(ports[0].port, 22);

        sort_for_cli(&mut ports, "user");
        assert_eq!(ports[0].user, "x");
    }
}
