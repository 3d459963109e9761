//! Dashboard state: the single owner of UI truth.
//!
//! Every mutation goes through a method here so the invariants hold after
//! each call: at most one modal is open, the selection is a valid index into
//! the visible list (or 0 when it is empty), and an expired toast is never
//! left behind for the next frame.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use portslay_core::{GroupId, KillStats, MessageColor, PortGroup, PortInfo, ProcessedPorts};

use super::filtered::VisiblePort;
use super::sort::{adjust_selected_index, wrap_index};

/// Ordering applied within each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Port,
    Process,
    Pid,
    /// Only reachable from the command line or config, never from a keypress.
    User,
}

impl SortKey {
    /// Parse a sort key name; unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "port" => Some(SortKey::Port),
            "process" | "name" => Some(SortKey::Process),
            "pid" => Some(SortKey::Pid),
            "user" => Some(SortKey::User),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Port => "port",
            SortKey::Process => "process",
            SortKey::Pid => "pid",
            SortKey::User => "user",
        }
    }
}

/// A kill waiting for confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingKill {
    pub port: PortInfo,
    pub force: bool,
}

/// Full-screen overlays. Content lives inside the variant, so closing a
/// modal always discards it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    Help,
    Confirm(PendingKill),
    Logs(Vec<String>),
    Command { title: String, command: String },
    Stats(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    Help,
    Confirm,
    Logs,
    Command,
    Stats,
}

impl Modal {
    pub fn kind(&self) -> ModalKind {
        match self {
            Modal::Help => ModalKind::Help,
            Modal::Confirm(_) => ModalKind::Confirm,
            Modal::Logs(_) => ModalKind::Logs,
            Modal::Command { .. } => ModalKind::Command,
            Modal::Stats(_) => ModalKind::Stats,
        }
    }
}

/// Transient status message drawn over the main view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub text: String,
    pub color: MessageColor,
    pub expires_at: Instant,
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    pub ports: Vec<PortInfo>,
    pub groups: Vec<PortGroup>,
    pub last_refresh: Option<DateTime<Local>>,
    selected_index: usize,
    filter: String,
    searching: bool,
    search_buffer: String,
    filter_before_search: String,
    /// `None` keeps the scan order (an unrecognized configured key).
    pub sort_by: Option<SortKey>,
    pub show_details: bool,
    modal: Option<Modal>,
    toast: Option<Toast>,
    pub kill_stats: KillStats,
}

impl DashboardState {
    pub fn new(sort_by: Option<SortKey>, filter: impl Into<String>, show_details: bool) -> Self {
        Self {
            ports: Vec::new(),
            groups: Vec::new(),
            last_refresh: None,
            selected_index: 0,
            filter: filter.into(),
            searching: false,
            search_buffer: String::new(),
            filter_before_search: String::new(),
            sort_by,
            show_details,
            modal: None,
            toast: None,
            kill_stats: KillStats::default(),
        }
    }

    // ------------------------------------------------------------------
    // Data
    // ------------------------------------------------------------------

    /// Replace ports and groups with a refresh result.
    ///
    /// Callers must re-sort, invalidate the visible-port cache and clamp the
    /// selection afterwards.
    pub fn replace_data(&mut self, processed: ProcessedPorts) {
        self.ports = processed.ports;
        self.groups = processed.groups;
        self.last_refresh = Some(processed.timestamp);
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    /// Move the selection by `delta`, wrapping at both ends.
    pub fn move_selection(&mut self, delta: isize, visible_len: usize) {
        if visible_len == 0 {
            return;
        }
        self.selected_index = wrap_index(self.selected_index, delta, visible_len);
    }

    /// Bring the selection back inside a list of `visible_len` entries.
    pub fn clamp_selection(&mut self, visible_len: usize) {
        self.selected_index = adjust_selected_index(visible_len, self.selected_index);
    }

    /// Flip the collapsed flag of the group owning the selected port.
    ///
    /// Returns the toggled group id, or `None` when nothing is selected.
    pub fn toggle_group_at_selection(&mut self, visible: &[VisiblePort]) -> Option<GroupId> {
        let entry = visible.get(self.selected_index)?;
        let group = self.groups.iter_mut().find(|g| g.id == entry.group)?;
        group.collapsed = !group.collapsed;
        Some(group.id.clone())
    }

    /// Expand every collapsed group; returns how many were expanded.
    pub fn expand_all_groups(&mut self) -> usize {
        let mut expanded = 0;
        for group in self.groups.iter_mut().filter(|g| g.collapsed) {
            group.collapsed = false;
            expanded += 1;
        }
        expanded
    }

    // ------------------------------------------------------------------
    // Filter and search
    // ------------------------------------------------------------------

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Replace the filter text. The caller must clamp the selection against
    /// the recomputed visible list.
    pub fn set_filter(&mut self, text: impl Into<String>) {
        self.filter = text.into();
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn search_buffer(&self) -> &str {
        &self.search_buffer
    }

    pub fn begin_search(&mut self) {
        self.searching = true;
        self.search_buffer.clear();
        self.filter_before_search = self.filter.clone();
    }

    /// Append a digit to the search buffer and apply it as the live filter.
    /// Anything but ASCII digits is ignored.
    pub fn push_search_char(&mut self, c: char) -> bool {
        if !self.searching || !c.is_ascii_digit() {
            return false;
        }
        self.search_buffer.push(c);
        self.filter = self.search_buffer.clone();
        true
    }

    pub fn pop_search_char(&mut self) -> bool {
        if !self.searching || self.search_buffer.pop().is_none() {
            return false;
        }
        self.filter = self.search_buffer.clone();
        true
    }

    /// Leave search mode keeping the typed filter.
    pub fn commit_search(&mut self) {
        self.searching = false;
        self.filter = std::mem::take(&mut self.search_buffer);
        self.filter_before_search.clear();
    }

    /// Leave search mode restoring the filter that was active before.
    pub fn cancel_search(&mut self) {
        self.searching = false;
        self.search_buffer.clear();
        self.filter = std::mem::take(&mut self.filter_before_search);
    }

    // ------------------------------------------------------------------
    // Modals
    // ------------------------------------------------------------------

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    /// Open a modal, replacing any other one.
    pub fn enter_modal(&mut self, modal: Modal) {
        self.modal = Some(modal);
    }

    /// Close the open modal, dropping its content.
    pub fn exit_modal(&mut self) -> Option<Modal> {
        self.modal.take()
    }

    // ------------------------------------------------------------------
    // Toast
    // ------------------------------------------------------------------

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    /// Show a toast until `now + expires_in`, replacing any current one.
    pub fn record_kill_message(
        &mut self,
        text: impl Into<String>,
        color: MessageColor,
        expires_in: Duration,
        now: Instant,
    ) {
        self.toast = Some(Toast {
            text: text.into(),
            color,
            expires_at: now + expires_in,
        });
    }

    /// Drop the toast once `now` is past its expiry. Returns whether a toast
    /// was removed.
    pub fn expire_toast(&mut self, now: Instant) -> bool {
        match &self.toast {
            Some(toast) if now > toast.expires_at => {
                self.toast = None;
                true
            }
            _ => false,
        }
    }

    /// Names and sizes of collapsed groups, for the header.
    pub fn collapsed_summary(&self) -> Vec<(String, usize)> {
        self.groups
            .iter()
            .filter(|g| g.collapsed)
            .map(|g| (g.id.to_string(), g.len()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portslay_core::{process_ports, Protocol};

    fn visible_of(state: &DashboardState) -> Vec<VisiblePort> {
        super::super::filtered::flatten(&state.groups, state.filter())
    }

    fn loaded_state() -> DashboardState {
        let mut state = DashboardState::new(Some(SortKey::Port), "", false);
        let ports = vec![
            PortInfo::new(3000, 1, "node", "node a.js", "me", Protocol::Tcp),
            PortInfo::new(3001, 2, "node", "node b.js", "me", Protocol::Tcp),
            PortInfo::new(5432, 3, "postgres", "postgres", "pg", Protocol::Tcp),
        ];
        state.replace_data(process_ports(ports, &[]));
        state
    }

    fn open_count(state: &DashboardState) -> usize {
        usize::from(state.modal().is_some())
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!(SortKey::parse("PID"), Some(SortKey::Pid));
        assert_eq!(SortKey::parse("user"), Some(SortKey::User));
        assert_eq!(SortKey::parse("memory"), None);
    }

    #[test]
    fn test_move_selection_wraps() {
        let mut state = DashboardState::new(None, "", false);
        state.move_selection(-1, 5);
        assert_eq!(state.selected_index(), 4);
        state.move_selection(1, 5);
        assert_eq!(state.selected_index(), 0);
    }

    #[test]
    fn test_move_selection_empty_is_noop() {
        let mut state = DashboardState::new(None, "", false);
        state.move_selection(1, 0);
        assert_eq!(state.selected_index(), 0);
    }

    #[test]
    fn test_modal_exclusive() {
        let mut state = DashboardState::new(None, "", false);
        assert_eq!(open_count(&state), 0);

        state.enter_modal(Modal::Help);
        state.enter_modal(Modal::Logs(vec!["x".to_string()]));
        assert_eq!(open_count(&state), 1);
        assert_eq!(state.modal().map(Modal::kind), Some(ModalKind::Logs));

        let closed = state.exit_modal();
        assert!(matches!(closed, Some(Modal::Logs(_))));
        assert!(state.modal().is_none());
        assert!(state.exit_modal().is_none());
    }

    #[test]
    fn test_toggle_group_at_selection() {
        let mut state = loaded_state();
        let visible = visible_of(&state);
        state.move_selection(2, visible.len()); // postgres

        let toggled = state.toggle_group_at_selection(&visible);
        assert_eq!(toggled.as_ref().map(GroupId::as_str), Some("database"));
        assert!(state.groups.iter().any(|g| g.collapsed));
        assert_eq!(state.collapsed_summary(), vec![("database".to_string(), 1)]);

        assert_eq!(state.expand_all_groups(), 1);
        assert!(state.collapsed_summary().is_empty());
    }

    #[test]
    fn test_toggle_group_nothing_selected() {
        let mut state = DashboardState::new(None, "", false);
        assert!(state.toggle_group_at_selection(&[]).is_none());
    }

    #[test]
    fn test_search_commit_and_cancel() {
        let mut state = DashboardState::new(None, "node", false);

        state.begin_search();
        assert!(state.is_searching());
        assert!(state.push_search_char('3'));
        assert!(!state.push_search_char('a'));
        assert!(state.push_search_char('0'));
        assert_eq!(state.filter(), "30");
        assert!(state.pop_search_char());
        assert_eq!(state.filter(), "3");
        state.cancel_search();
        assert!(!state.is_searching());
        assert_eq!(state.filter(), "node");

        state.begin_search();
        state.push_search_char('5');
        state.commit_search();
        assert_eq!(state.filter(), "5");
        assert!(state.search_buffer().is_empty());
    }

    #[test]
    fn test_toast_expiry() {
        let mut state = DashboardState::new(None, "", false);
        let start = Instant::now();
        state.record_kill_message("bye", MessageColor::Green, Duration::from_millis(100), start);

        assert!(!state.expire_toast(start + Duration::from_millis(50)));
        assert!(state.toast().is_some());
        assert!(state.expire_toast(start + Duration::from_millis(101)));
        assert!(state.toast().is_none());
    }

    #[test]
    fn test_toast_overwrite() {
        let mut state = DashboardState::new(None, "", false);
        let now = Instant::now();
        state.record_kill_message("one", MessageColor::Green, Duration::from_secs(1), now);
        state.record_kill_message("two", MessageColor::Red, Duration::from_secs(1), now);
        assert_eq!(state.toast().map(|t| t.text.as_str()), Some("two"));
    }
}
