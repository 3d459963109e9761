//! Raw-mode terminal session.
//!
//! [`TerminalSession`] enables raw mode and the alternate screen on creation
//! and puts the terminal back when restored or dropped. A panic hook restores
//! the terminal before the panic message is printed.

use std::io::{self, Write};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::{
    cursor::Show,
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::debug;

/// Set while raw mode is on; cleared by whoever restores first.
static RAW_MODE_ACTIVE: AtomicBool = AtomicBool::new(false);

pub struct TerminalSession {
    hook_installed: bool,
}

impl TerminalSession {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        RAW_MODE_ACTIVE.store(true, Ordering::SeqCst);
        if let Err(err) = execute!(io::stdout(), EnterAlternateScreen) {
            restore_terminal();
            return Err(err);
        }

        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore_terminal();
            previous(info);
        }));
        debug!("terminal session started");

        Ok(Self {
            hook_installed: true,
        })
    }

    /// Put the terminal back. Safe to call more than once.
    pub fn restore(&mut self) {
        restore_terminal();
        if self.hook_installed {
            let _ = panic::take_hook();
            self.hook_installed = false;
        }
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Leave the alternate screen, show the cursor and disable raw mode, once.
fn restore_terminal() {
    if RAW_MODE_ACTIVE.swap(false, Ordering::SeqCst) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen, Show);
        let _ = terminal::disable_raw_mode();
        let _ = stdout.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_without_session_is_noop() {
        restore_terminal();
        restore_terminal();
        assert!(!RAW_MODE_ACTIVE.load(Ordering::SeqCst));
    }
}
