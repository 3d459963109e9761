//! Fixed-width column layout for the main view.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Rows above the port list: header and column titles.
pub const LIST_TOP: u16 = 2;

pub const SELECTOR_WIDTH: usize = 1;
pub const PORT_WIDTH: usize = 5;
pub const PROCESS_WIDTH: usize = 19;
pub const TYPE_WIDTH: usize = 12;
pub const PID_WIDTH: usize = 10;
pub const PROTOCOL_WIDTH: usize = 6;
pub const USER_WIDTH: usize = 10;
pub const LIFETIME_WIDTH: usize = 10;

const FIXED_COLUMNS: [usize; 8] = [
    SELECTOR_WIDTH,
    PORT_WIDTH,
    PROCESS_WIDTH,
    TYPE_WIDTH,
    PID_WIDTH,
    PROTOCOL_WIDTH,
    USER_WIDTH,
    LIFETIME_WIDTH,
];

/// Width left for the command column, after the fixed columns and the
/// eight single-space gaps between all nine columns.
pub fn command_width(screen_width: u16) -> usize {
    let fixed: usize = FIXED_COLUMNS.iter().sum::<usize>() + FIXED_COLUMNS.len();
    usize::from(screen_width).saturating_sub(fixed)
}

/// Number of port rows that fit on screen.
pub fn row_budget(height: u16, details: bool) -> usize {
    let reserved = if details { 6 } else { 4 };
    usize::from(height.saturating_sub(reserved))
}

/// First list index shown so that `selected` stays on screen.
pub fn viewport_offset(selected: usize, budget: usize) -> usize {
    if budget == 0 || selected < budget {
        0
    } else {
        selected + 1 - budget
    }
}

/// Truncate or pad `text` to exactly `width` display columns.
///
/// Truncated text ends with `…`. Wide characters that would straddle the
/// boundary are replaced by padding.
pub fn fit(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let text_width = text.width();
    if text_width <= width {
        let mut out = String::with_capacity(text.len() + width - text_width);
        out.push_str(text);
        out.extend(std::iter::repeat(' ').take(width - text_width));
        return out;
    }

    let limit = width - 1;
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > limit {
            break;
        }
        out.push(c);
        used += w;
    }
    out.extend(std::iter::repeat(' ').take(limit - used));
    out.push('…');
    out
}

/// Cut `text` to at most `width` display columns without padding.
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    fit(text, width).trim_end().to_string()
}

/// Compact human form of a process lifetime in seconds.
pub fn format_lifetime(seconds: Option<u64>) -> String {
    match seconds {
        None => "-".to_string(),
        Some(s) if s < 60 => format!("{}s", s),
        Some(s) if s < 3_600 => format!("{}m{}s", s / 60, s % 60),
        Some(s) if s < 86_400 => format!("{}h{}m", s / 3_600, (s % 3_600) / 60),
        Some(s) => format!("{}d{}h", s / 86_400, (s % 86_400) / 3_600),
    }
}

/// Join pre-fitted cells with single-space gaps.
pub fn join_cells(cells: &[String]) -> String {
    cells.join(" ")
}
