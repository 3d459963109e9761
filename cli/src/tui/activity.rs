//! Bounded in-memory log shown by the logs modal.

use std::collections::VecDeque;

use chrono::Local;

pub const ACTIVITY_CAPACITY: usize = 200;

#[derive(Debug, Default)]
pub struct ActivityLog {
    lines: VecDeque<String>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a timestamped line, dropping the oldest past capacity.
    pub fn push(&mut self, text: impl AsRef<str>) {
        let line = format!("{}  {}", Local::now().format("%H:%M:%S"), text.as_ref());
        if self.lines.len() == ACTIVITY_CAPACITY {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Title line followed by the entries, newest first.
    pub fn modal_lines(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.lines.len() + 2);
        out.push(format!(" Activity ({} entries, newest first)", self.lines.len()));
        out.push(String::new());
        if self.lines.is_empty() {
            out.push("  nothing yet".to_string());
        }
        out.extend(self.lines.iter().rev().map(|l| format!("  {}", l)));
        out
    }
}
