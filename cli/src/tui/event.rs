//! Input events and the key bindings of each dashboard mode.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::state::SortKey;

/// Everything the interaction loop reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Refresh timer fired.
    Tick,
    Key(KeyEvent),
    Resize(u16, u16),
}

/// Main-view commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    Kill,
    ForceKill,
    CopyCommand,
    ViewCommand,
    ViewLogs,
    ViewStats,
    ToggleDetails,
    Sort(SortKey),
    ToggleGroup,
    ExpandAll,
    BeginSearch,
    ClearFilter,
    Refresh,
    Help,
    Quit,
    ForceQuit,
}

/// Keys accepted while typing a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchInput {
    Digit(char),
    Backspace,
    Apply,
    Cancel,
    ForceQuit,
    Ignored,
}

/// Keys accepted by the kill confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmInput {
    Accept,
    AcceptForce,
    Cancel,
    ForceQuit,
    Ignored,
}

/// Keys and what they do, as shown in the help modal.
pub const KEY_HELP: &[(&str, &str)] = &[
    ("↑ / k", "move up"),
    ("↓ / j", "move down"),
    ("PgUp / PgDn", "move one page"),
    ("x / Enter", "kill selected process"),
    ("X", "force kill (SIGKILL)"),
    ("c", "copy command to clipboard"),
    ("v", "view full command"),
    ("l", "view activity log"),
    ("s", "view kill stats"),
    ("d", "toggle details"),
    ("1 / 2 / 3", "sort by port / process / pid"),
    ("g / Space", "collapse or expand group"),
    ("G", "expand all groups"),
    ("/", "search by port number"),
    ("Esc", "close overlay or clear filter"),
    ("r", "refresh now"),
    ("? / h", "toggle this help"),
    ("q", "quit"),
    ("Ctrl+C", "force quit"),
];

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
}

/// Main-view binding for `key`, if any.
pub fn action_for_key(key: &KeyEvent) -> Option<Action> {
    if is_ctrl_c(key) {
        return Some(Action::ForceQuit);
    }
    let action = match key.code {
        KeyCode::Up | KeyCode::Char('k') => Action::MoveUp,
        KeyCode::Down | KeyCode::Char('j') => Action::MoveDown,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Enter | KeyCode::Char('x') => Action::Kill,
        KeyCode::Char('X') => Action::ForceKill,
        KeyCode::Char('c') => Action::CopyCommand,
        KeyCode::Char('v') => Action::ViewCommand,
        KeyCode::Char('l') => Action::ViewLogs,
        KeyCode::Char('s') => Action::ViewStats,
        KeyCode::Char('d') => Action::ToggleDetails,
        KeyCode::Char('1') => Action::Sort(SortKey::Port),
        KeyCode::Char('2') => Action::Sort(SortKey::Process),
        KeyCode::Char('3') => Action::Sort(SortKey::Pid),
        KeyCode::Char('g') | KeyCode::Char(' ') => Action::ToggleGroup,
        KeyCode::Char('G') => Action::ExpandAll,
        KeyCode::Char('/') => Action::BeginSearch,
        KeyCode::Esc => Action::ClearFilter,
        KeyCode::Char('r') => Action::Refresh,
        KeyCode::Char('?') | KeyCode::Char('h') => Action::Help,
        KeyCode::Char('q') => Action::Quit,
        _ => return None,
    };
    Some(action)
}

pub fn search_input(key: &KeyEvent) -> SearchInput {
    if is_ctrl_c(key) {
        return SearchInput::ForceQuit;
    }
    match key.code {
        KeyCode::Char(c) if c.is_ascii_digit() => SearchInput::Digit(c),
        KeyCode::Backspace => SearchInput::Backspace,
        KeyCode::Enter => SearchInput::Apply,
        KeyCode::Esc => SearchInput::Cancel,
        _ => SearchInput::Ignored,
    }
}

pub fn confirm_input(key: &KeyEvent) -> ConfirmInput {
    if is_ctrl_c(key) {
        return ConfirmInput::ForceQuit;
    }
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => ConfirmInput::Accept,
        KeyCode::Char('f') | KeyCode::Char('F') => ConfirmInput::AcceptForce,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => ConfirmInput::Cancel,
        _ => ConfirmInput::Ignored,
    }
}

/// Whether `key` closes a content modal (help, logs, command, stats).
pub fn closes_overlay(key: &KeyEvent) -> bool {
    matches!(
        key.code,
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::Char('h')
    )
}
