//! Full-screen overlays. Every modal draw clears the screen first.

use std::io;

use crossterm::style::Color;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::layout::truncate;
use crate::tui::event::KEY_HELP;
use crate::tui::screen::{Screen, Style};
use crate::tui::state::{Modal, PendingKill};

const CLOSE_HINT: &str = " Esc/q to close";

pub fn draw<S: Screen>(screen: &mut S, modal: &Modal) -> io::Result<()> {
    screen.clear_screen()?;
    screen.hide_cursor()?;
    match modal {
        Modal::Help => draw_help(screen),
        Modal::Confirm(pending) => draw_confirm(screen, pending),
        Modal::Logs(lines) => draw_lines(screen, lines),
        Modal::Stats(lines) => draw_lines(screen, lines),
        Modal::Command { title, command } => draw_command(screen, title, command),
    }
}

fn line<S: Screen>(screen: &mut S, y: u16, text: &str, style: Style) -> io::Result<()> {
    let width = usize::from(screen.size().0);
    screen.move_to(0, y)?;
    screen.print_styled(&truncate(text, width), style)
}

fn footer<S: Screen>(screen: &mut S) -> io::Result<()> {
    let height = screen.size().1;
    if height == 0 {
        return Ok(());
    }
    line(screen, height - 1, CLOSE_HINT, Style::fg(Color::DarkGrey))
}

fn draw_help<S: Screen>(screen: &mut S) -> io::Result<()> {
    let height = screen.size().1;
    line(screen, 0, " Keyboard shortcuts", Style::fg(Color::Cyan).bold())?;
    let key_width = KEY_HELP.iter().map(|(k, _)| k.width()).max().unwrap_or(0);
    for (i, (keys, description)) in KEY_HELP.iter().enumerate() {
        let y = u16::try_from(i + 2).unwrap_or(u16::MAX);
        if y >= height.saturating_sub(1) {
            break;
        }
        let pad = " ".repeat(key_width - keys.width());
        line(
            screen,
            y,
            &format!("   {}{}  {}", keys, pad, description),
            Style::default(),
        )?;
    }
    footer(screen)
}

fn confirm_lines(pending: &PendingKill) -> [String; 3] {
    let verb = if pending.force { "Force kill" } else { "Kill" };
    [
        format!(
            "{} {} (pid {}) on port {}?",
            verb, pending.port.process_name, pending.port.pid, pending.port.port
        ),
        String::new(),
        "[y] yes   [f] force   [n] cancel".to_string(),
    ]
}

/// Borders plus one column of padding on each side.
const MIN_BOX_WIDTH: usize = 4;

fn draw_confirm<S: Screen>(screen: &mut S, pending: &PendingKill) -> io::Result<()> {
    let (width, height) = screen.size();
    let lines = confirm_lines(pending);
    let border = if pending.force { Color::Red } else { Color::Yellow };
    if usize::from(width) < MIN_BOX_WIDTH {
        // No room for borders: just the question.
        screen.move_to(0, height / 2)?;
        let text = truncate(&lines[0], usize::from(width));
        return screen.print_styled(&text, Style::fg(border).bold());
    }

    let widest = lines.iter().map(|l| l.width()).max().unwrap_or(0);
    let box_width = (widest + MIN_BOX_WIDTH).min(usize::from(width));
    let inner = box_width - MIN_BOX_WIDTH;
    let box_height = lines.len() + 2;

    let x = u16::try_from((usize::from(width) - box_width) / 2).unwrap_or(0);
    let top = usize::from(height).saturating_sub(box_height) / 2;

    let rows = std::iter::once(format!("┌{}┐", "─".repeat(box_width - 2)))
        .chain(lines.iter().map(|l| {
            let text = truncate(l, inner);
            format!("│ {}{} │", text, " ".repeat(inner - text.width()))
        }))
        .chain(std::iter::once(format!("└{}┘", "─".repeat(box_width - 2))));

    for (i, row) in rows.enumerate() {
        let y = top + i;
        if y >= usize::from(height) {
            break;
        }
        screen.move_to(x, u16::try_from(y).unwrap_or(u16::MAX))?;
        screen.print_styled(&row, Style::fg(border).bold())?;
    }
    Ok(())
}

/// Top-anchored dump of `lines`, leaving the last row for the footer.
fn draw_lines<S: Screen>(screen: &mut S, lines: &[String]) -> io::Result<()> {
    let height = usize::from(screen.size().1);
    for (y, text) in lines.iter().take(height.saturating_sub(1)).enumerate() {
        let style = if y == 0 {
            Style::fg(Color::Cyan).bold()
        } else {
            Style::default()
        };
        line(screen, u16::try_from(y).unwrap_or(u16::MAX), text, style)?;
    }
    footer(screen)
}

fn draw_command<S: Screen>(screen: &mut S, title: &str, command: &str) -> io::Result<()> {
    let (width, height) = screen.size();
    line(screen, 0, title, Style::fg(Color::Cyan).bold())?;
    let wrapped = wrap_text(command, usize::from(width));
    let last = usize::from(height).saturating_sub(1);
    for (i, text) in wrapped.iter().enumerate() {
        let y = i + 2;
        if y >= last {
            break;
        }
        line(screen, u16::try_from(y).unwrap_or(u16::MAX), text, Style::default())?;
    }
    footer(screen)
}

/// Split `word` into pieces no wider than `width` columns.
fn hard_split(word: &str, width: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut used = 0;
    for c in word.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
            used = 0;
        }
        current.push(c);
        used += w;
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Greedy word wrap. Words wider than `width` are cut into `width`-sized
/// chunks, so no returned line is wider than `width`.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word_width = word.width();
        if word_width > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let mut pieces = hard_split(word, width);
            if let Some(tail) = pieces.pop() {
                lines.extend(pieces);
                current = tail;
            }
            continue;
        }

        if current.is_empty() {
            current.push_str(word);
        } else if current.width() + 1 + word_width <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::screen::testing::GridScreen;
    use portslay_core::{PortInfo, Protocol};

    #[test]
    fn test_wrap_long_word_is_hard_split() {
        let text: String = (0..200).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let lines = wrap_text(&text, 40);
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|l| l.width() <= 40));
        assert_eq!(lines.concat(), text);
    }

    #[test]
    fn test_wrap_greedy_words() {
        let lines = wrap_text("node server.js --port 3000 --watch", 16);
        assert_eq!(lines, vec!["node server.js", "--port 3000", "--watch"]);
    }

    #[test]
    fn test_wrap_mixed_long_word() {
        let lines = wrap_text("java -jar /opt/really/long/path/app.jar", 10);
        assert!(lines.iter().all(|l| l.width() <= 10));
        assert_eq!(lines[0], "java -jar");
        assert_eq!(lines[1], "/opt/reall");
    }

    #[test]
    fn test_wrap_empty() {
        assert!(wrap_text("", 20).is_empty());
        assert!(wrap_text("   ", 20).is_empty());
    }

    #[test]
    fn test_confirm_box_capped_to_screen() {
        let mut screen = GridScreen::new(20, 10);
        let pending = PendingKill {
            port: PortInfo::new(8080, 77, "extremely-long-process", "cmd", "me", Protocol::Tcp),
            force: false,
        };
        draw(&mut screen, &Modal::Confirm(pending)).unwrap();
        assert_eq!(screen.screen_clears, 1);
        let top = (0..10).find(|&y| screen.row(y).starts_with('┌')).unwrap();
        assert_eq!(screen.row(top).chars().count(), 20);
        assert!(screen.row(top).ends_with('┐'));
        assert!(screen.row(top + 1).starts_with("│ Kill"));
        assert!(screen.row(top + 1).ends_with(" │"));
    }

    #[test]
    fn test_confirm_on_tiny_terminal() {
        let pending = PendingKill {
            port: PortInfo::new(3000, 42, "node", "node", "me", Protocol::Tcp),
            force: true,
        };
        let mut screen = GridScreen::new(3, 10);
        draw(&mut screen, &Modal::Confirm(pending.clone())).unwrap();
        assert_eq!(screen.row(5), "Fo…");
        assert!(screen.styled.iter().all(|(_, text, _)| text.width() <= 3));

        let mut screen = GridScreen::new(4, 10);
        draw(&mut screen, &Modal::Confirm(pending)).unwrap();
        assert!(screen.styled.iter().all(|(_, text, _)| text.width() <= 4));
        assert!(screen.contains("┌──┐"));
    }

    #[test]
    fn test_lines_clipped_above_footer() {
        let mut screen = GridScreen::new(30, 5);
        let lines: Vec<String> = (0..10).map(|i| format!("line {}", i)).collect();
        draw(&mut screen, &Modal::Logs(lines)).unwrap();
        assert_eq!(screen.row_trimmed(0), "line 0");
        assert_eq!(screen.row_trimmed(3), "line 3");
        assert_eq!(screen.row_trimmed(4), CLOSE_HINT);
    }

    #[test]
    fn test_help_lists_keys() {
        let mut screen = GridScreen::new(80, 40);
        draw(&mut screen, &Modal::Help).unwrap();
        assert!(screen.contains("Keyboard shortcuts"));
        assert!(screen.contains("force quit"));
    }
}
