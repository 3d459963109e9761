//! Port grouping by process category.

use std::collections::HashMap;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::{PortInfo, ProcessType};

/// Stable identity of a port group, unchanged across refreshes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<ProcessType> for GroupId {
    fn from(kind: ProcessType) -> Self {
        Self::new(kind.slug())
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A category of ports shown together in the dashboard.
///
/// `collapsed` is user state: it survives refreshes for as long as a group
/// with the same `id` keeps appearing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortGroup {
    pub id: GroupId,
    pub process_type: ProcessType,
    pub collapsed: bool,
    pub ports: Vec<PortInfo>,
}

impl PortGroup {
    pub fn new(process_type: ProcessType, ports: Vec<PortInfo>) -> Self {
        Self {
            id: GroupId::from(process_type),
            process_type,
            collapsed: false,
            ports,
        }
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

/// Result of one refresh: the raw port list and its grouping.
#[derive(Debug, Clone)]
pub struct ProcessedPorts {
    pub ports: Vec<PortInfo>,
    pub groups: Vec<PortGroup>,
    pub timestamp: DateTime<Local>,
}

/// Group a freshly scanned port list by category.
///
/// Groups come out in [`ProcessType::ALL`] order and empty categories are
/// dropped. The `collapsed` flag of every group is copied from the group with
/// the same id in `previous`, so user toggles are never reset by a refresh.
pub fn process_ports(ports: Vec<PortInfo>, previous: &[PortGroup]) -> ProcessedPorts {
    let collapsed: HashMap<&GroupId, bool> =
        previous.iter().map(|g| (&g.id, g.collapsed)).collect();

    let mut buckets: HashMap<ProcessType, Vec<PortInfo>> = HashMap::new();
    for port in &ports {
        buckets.entry(port.category()).or_default().push(port.clone());
    }

    let groups = ProcessType::ALL
        .iter()
        .filter_map(|kind| {
            let members = buckets.remove(kind)?;
            let mut group = PortGroup::new(*kind, members);
            group.collapsed = collapsed.get(&group.id).copied().unwrap_or(false);
            Some(group)
        })
        .collect();

    ProcessedPorts {
        ports,
        groups,
        timestamp: Local::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Protocol;

    fn sample() -> Vec<PortInfo> {
        vec![
            PortInfo::new(5432, 10, "postgres", "postgres -D /data", "pg", Protocol::Tcp),
            PortInfo::new(3000, 11, "node", "node server.js", "me", Protocol::Tcp),
            PortInfo::new(80, 12, "nginx", "nginx: master", "root", Protocol::Tcp),
            PortInfo::new(5173, 13, "vite", "vite dev", "me", Protocol::Tcp),
        ]
    }

    #[test]
    fn test_groups_in_category_order() {
        let processed = process_ports(sample(), &[]);
        let ids: Vec<&str> = processed.groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["development", "web", "database"]);
        assert_eq!(processed.groups[0].len(), 2);
        assert_eq!(processed.ports.len(), 4);
    }

    #[test]
    fn test_collapsed_survives_refresh() {
        let mut first = process_ports(sample(), &[]);
        first.groups[1].collapsed = true;

        let second = process_ports(sample(), &first.groups);
        assert!(!second.groups[0].collapsed);
        assert!(second.groups[1].collapsed);
    }

    #[test]
    fn test_vanished_group_forgets_state() {
        let mut first = process_ports(sample(), &[]);
        first.groups[2].collapsed = true; // database

        let without_db: Vec<PortInfo> = sample().into_iter().filter(|p| p.port != 5432).collect();
        let second = process_ports(without_db, &first.groups);
        assert_eq!(second.groups.len(), 2);

        let third = process_ports(sample(), &second.groups);
        assert!(!third.groups[2].collapsed);
    }

    #[test]
    fn test_empty_scan() {
        let processed = process_ports(Vec::new(), &[]);
        assert!(processed.groups.is_empty());
    }
}
