//! System clipboard.
//!
//! The connection is opened on first use and kept for the rest of the
//! session; on X11 the copied text is only served while it stays open.

use anyhow::Context;
use arboard::Clipboard;
use tracing::debug;

#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn copy(&mut self, text: &str) -> anyhow::Result<()> {
        let mut clipboard = match self.inner.take() {
            Some(clipboard) => clipboard,
            None => {
                let opened = Clipboard::new().context("clipboard unavailable")?;
                debug!("clipboard opened");
                opened
            }
        };
        // A failed connection is dropped and reopened on the next copy.
        clipboard
            .set_text(text)
            .context("failed to set clipboard text")?;
        self.inner = Some(clipboard);
        Ok(())
    }

    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opens_lazily() {
        assert!(!SystemClipboard::new().is_open());
    }

    #[test]
    fn test_failed_copy_leaves_no_connection() {
        let mut clipboard = SystemClipboard::new();
        if clipboard.copy("portslay").is_err() {
            assert!(!clipboard.is_open());
        } else {
            assert!(clipboard.is_open());
        }
    }
}
