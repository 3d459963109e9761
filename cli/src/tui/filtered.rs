//! Memoized flattened view of the visible ports.
//!
//! Rendering happens far more often than refreshing, so the flattened,
//! filtered list is kept until one of its inputs changes. Inputs are
//! summarized by a [`Fingerprint`]: per-group identity, collapsed flag and
//! port count, plus the filter text and the sort key.

use std::rc::Rc;

use portslay_core::{GroupId, PortGroup, PortInfo, ProcessType};

use super::state::{DashboardState, SortKey};

/// One row of the main view: a port and the group it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisiblePort {
    pub port: PortInfo,
    pub group: GroupId,
    pub kind: ProcessType,
}

/// Cheap summary of everything the flattened list depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    groups: Vec<(GroupId, bool, usize)>,
    filter: String,
    sort: Option<SortKey>,
}

impl Fingerprint {
    pub fn of(groups: &[PortGroup], filter: &str, sort: Option<SortKey>) -> Self {
        Self {
            groups: groups
                .iter()
                .map(|g| (g.id.clone(), g.collapsed, g.len()))
                .collect(),
            filter: filter.to_string(),
            sort,
        }
    }

    /// Compare against live inputs without building a new fingerprint.
    pub fn matches(&self, groups: &[PortGroup], filter: &str, sort: Option<SortKey>) -> bool {
        self.sort == sort
            && self.filter == filter
            && self.groups.len() == groups.len()
            && self
                .groups
                .iter()
                .zip(groups)
                .all(|((id, collapsed, len), g)| {
                    *id == g.id && *collapsed == g.collapsed && *len == g.len()
                })
    }
}

/// Flatten groups into visible rows: collapsed groups contribute nothing,
/// the rest keep their internal order and are filtered by `filter`.
pub fn flatten(groups: &[PortGroup], filter: &str) -> Vec<VisiblePort> {
    groups
        .iter()
        .filter(|g| !g.collapsed)
        .flat_map(|g| {
            g.ports
                .iter()
                .filter(|p| p.matches_filter(filter))
                .map(|p| VisiblePort {
                    port: p.clone(),
                    group: g.id.clone(),
                    kind: g.process_type,
                })
        })
        .collect()
}

/// Memo cell for [`flatten`].
///
/// Never a source of truth: dropping it only costs a recomputation.
#[derive(Debug, Default)]
pub struct FilteredPorts {
    cached: Option<(Fingerprint, Rc<[VisiblePort]>)>,
}

impl FilteredPorts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the visible rows for `state`, reusing the cached list when the
    /// fingerprint is unchanged.
    pub fn compute(&mut self, state: &DashboardState) -> Rc<[VisiblePort]> {
        let (groups, filter, sort) = (&state.groups, state.filter(), state.sort_by);

        if let Some((fingerprint, visible)) = &self.cached {
            if fingerprint.matches(groups, filter, sort) {
                return Rc::clone(visible);
            }
        }

        let visible: Rc<[VisiblePort]> = flatten(groups, filter).into();
        self.cached = Some((Fingerprint::of(groups, filter, sort), Rc::clone(&visible)));
        visible
    }

    /// Forget the cached list. Needed when port contents change without the
    /// fingerprint noticing (refresh, kill).
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    #[cfg(test)]
    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        self.cached.as_ref().map(|(fingerprint, _)| fingerprint)
    }
}
