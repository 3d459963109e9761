//! Pieces of the port-list frame. Each function owns whole terminal rows
//! and clears whatever it does not overwrite.

use std::io;

use crossterm::style::Color;
use portslay_core::{current_rank, MessageColor, ProcessType};
use unicode_width::UnicodeWidthStr;

use super::layout::{
    command_width, fit, format_lifetime, join_cells, truncate, LIFETIME_WIDTH, LIST_TOP,
    PID_WIDTH, PORT_WIDTH, PROCESS_WIDTH, PROTOCOL_WIDTH, SELECTOR_WIDTH, TYPE_WIDTH, USER_WIDTH,
};
use crate::tui::filtered::VisiblePort;
use crate::tui::screen::{Screen, Style};
use crate::tui::state::{DashboardState, Toast};

const FOOTER_HINT: &str =
    " ↑↓ move  x kill  X force  c copy  v command  d details  / search  1-3 sort  g group  ? help  q quit";

fn type_color(kind: ProcessType) -> Color {
    match kind {
        ProcessType::Development => Color::Green,
        ProcessType::WebServer => Color::Cyan,
        ProcessType::Database => Color::Magenta,
        ProcessType::System => Color::DarkGrey,
        ProcessType::Other => Color::Grey,
    }
}

fn write_row<S: Screen>(screen: &mut S, y: u16, text: &str, style: Style) -> io::Result<()> {
    let width = usize::from(screen.size().0);
    screen.move_to(0, y)?;
    screen.print_styled(&truncate(text, width), style)?;
    screen.clear_to_end()
}

pub fn draw_header<S: Screen>(
    screen: &mut S,
    state: &DashboardState,
    visible_len: usize,
) -> io::Result<()> {
    let mut parts = vec![
        " portslay".to_string(),
        if visible_len == state.ports.len() {
            format!("{} ports", visible_len)
        } else {
            format!("{}/{} ports", visible_len, state.ports.len())
        },
        format!(
            "sort: {}",
            state.sort_by.map(|k| k.label()).unwrap_or("scan order")
        ),
    ];
    if !state.filter().is_empty() {
        parts.push(format!("filter: {}", state.filter()));
    }

    let total = state.kill_stats.total_kills;
    let rank = current_rank(total);
    parts.push(match rank.emoji {
        Some(emoji) => format!("{} {} ({} kills)", emoji, rank.name, total),
        None => format!("{} ({} kills)", rank.name, total),
    });

    let collapsed = state.collapsed_summary();
    if !collapsed.is_empty() {
        let list: Vec<String> = collapsed
            .iter()
            .map(|(name, count)| format!("{}({})", name, count))
            .collect();
        parts.push(format!("collapsed: {}", list.join(" ")));
    }
    if let Some(at) = state.last_refresh {
        parts.push(at.format("%H:%M:%S").to_string());
    }

    write_row(screen, 0, &parts.join(" │ "), Style::fg(Color::Cyan).bold())
}

pub fn draw_column_titles<S: Screen>(screen: &mut S) -> io::Result<()> {
    let width = screen.size().0;
    let cells = [
        fit("", SELECTOR_WIDTH),
        fit("PORT", PORT_WIDTH),
        fit("PROCESS", PROCESS_WIDTH),
        fit("TYPE", TYPE_WIDTH),
        fit("PID", PID_WIDTH),
        fit("PROTO", PROTOCOL_WIDTH),
        fit("USER", USER_WIDTH),
        fit("UPTIME", LIFETIME_WIDTH),
        fit("COMMAND", command_width(width)),
    ];
    write_row(
        screen,
        1,
        &join_cells(&cells),
        Style::fg(Color::Yellow).bold(),
    )
}

/// Text of one list row, every field fitted to its column.
pub fn row_text(entry: &VisiblePort, selected: bool, screen_width: u16) -> String {
    let port = &entry.port;
    let cells = [
        fit(if selected { "▶" } else { " " }, SELECTOR_WIDTH),
        fit(&port.port.to_string(), PORT_WIDTH),
        fit(&port.process_name, PROCESS_WIDTH),
        fit(entry.kind.display_name(), TYPE_WIDTH),
        fit(&port.pid.to_string(), PID_WIDTH),
        fit(port.protocol.as_str(), PROTOCOL_WIDTH),
        fit(&port.user, USER_WIDTH),
        fit(&format_lifetime(port.lifetime), LIFETIME_WIDTH),
        fit(&port.command, command_width(screen_width)),
    ];
    join_cells(&cells)
}

/// Draw list entry `entry` on terminal row `y`.
pub fn draw_row<S: Screen>(
    screen: &mut S,
    y: u16,
    entry: &VisiblePort,
    selected: bool,
) -> io::Result<()> {
    let text = row_text(entry, selected, screen.size().0);
    let style = if selected {
        Style::default().reversed()
    } else {
        Style::fg(type_color(entry.kind))
    };
    write_row(screen, y, &text, style)
}

/// Terminal row of list index `index` given the viewport offset.
pub fn row_y(index: usize, offset: usize) -> Option<u16> {
    let relative = index.checked_sub(offset)?;
    u16::try_from(relative).ok()?.checked_add(LIST_TOP)
}

pub fn draw_empty<S: Screen>(screen: &mut S, state: &DashboardState) -> io::Result<()> {
    let text = if state.filter().is_empty() {
        "  No listening ports found."
    } else {
        "  No ports match the current filter."
    };
    write_row(screen, LIST_TOP, text, Style::fg(Color::DarkGrey))
}

/// Two-row strip with everything known about the selected port.
pub fn draw_details<S: Screen>(screen: &mut S, entry: &VisiblePort) -> io::Result<()> {
    let height = screen.size().1;
    if height < 6 {
        return Ok(());
    }
    let port = &entry.port;
    let first = format!(
        " {} :{}  pid {}  {}  user {}  address {}  uptime {}",
        port.process_name,
        port.port,
        port.pid,
        port.protocol.as_str(),
        port.user,
        port.address,
        format_lifetime(port.lifetime),
    );
    let second = format!(" {}", port.command);
    write_row(screen, height - 4, &first, Style::fg(Color::White).bold())?;
    write_row(screen, height - 3, &second, Style::fg(Color::Grey))
}

/// Search prompt while searching, the active filter otherwise, or a rule.
pub fn draw_search_line<S: Screen>(screen: &mut S, state: &DashboardState) -> io::Result<()> {
    let (width, height) = screen.size();
    if height < 2 {
        return Ok(());
    }
    let y = height - 2;
    if state.is_searching() {
        let text = format!(" Search port: {}_  (Enter apply, Esc cancel)", state.search_buffer());
        write_row(screen, y, &text, Style::fg(Color::Yellow).bold())
    } else if !state.filter().is_empty() {
        let text = format!(" Filter: {}  (Esc to clear)", state.filter());
        write_row(screen, y, &text, Style::fg(Color::Yellow))
    } else {
        let rule = "─".repeat(usize::from(width));
        write_row(screen, y, &rule, Style::fg(Color::DarkGrey))
    }
}

pub fn draw_footer<S: Screen>(screen: &mut S) -> io::Result<()> {
    let height = screen.size().1;
    if height == 0 {
        return Ok(());
    }
    write_row(screen, height - 1, FOOTER_HINT, Style::fg(Color::DarkGrey))
}

fn toast_style(color: MessageColor) -> Style {
    match color {
        MessageColor::Red => Style::colors(Color::White, Color::Red),
        MessageColor::Yellow => Style::colors(Color::Black, Color::Yellow),
        MessageColor::Cyan => Style::colors(Color::White, Color::Cyan),
        MessageColor::Green => Style::colors(Color::White, Color::Green),
    }
    .bold()
}

/// Centered toast on the row above the search line. Does not clear the
/// rest of the row.
pub fn draw_toast<S: Screen>(screen: &mut S, toast: &Toast) -> io::Result<()> {
    let (width, height) = screen.size();
    if height < 3 {
        return Ok(());
    }
    let text = format!(
        " {} ",
        truncate(&toast.text, usize::from(width).saturating_sub(8))
    );
    let x = usize::from(width).saturating_sub(text.width()) / 2;
    screen.move_to(u16::try_from(x).unwrap_or(0), height - 3)?;
    screen.print_styled(&text, toast_style(toast.color))
}
