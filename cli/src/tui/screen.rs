//! Terminal output primitives.
//!
//! The renderer only talks to a [`Screen`]; the crossterm implementation
//! queues escape sequences and writes them out on [`Screen::flush`].

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    queue,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal::{self, Clear, ClearType},
};

/// Text attributes for one styled write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
    pub reverse: bool,
}

impl Style {
    pub fn fg(color: Color) -> Self {
        Self {
            fg: Some(color),
            ..Self::default()
        }
    }

    pub fn colors(fg: Color, bg: Color) -> Self {
        Self {
            fg: Some(fg),
            bg: Some(bg),
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn reversed(mut self) -> Self {
        self.reverse = true;
        self
    }
}

/// A fixed-size character grid addressed by column and row.
pub trait Screen {
    /// Last known size as (width, height).
    fn size(&self) -> (u16, u16);
    /// Ask the terminal for its size again and remember it.
    fn query_size(&mut self) -> (u16, u16);
    fn move_to(&mut self, x: u16, y: u16) -> io::Result<()>;
    fn print_styled(&mut self, text: &str, style: Style) -> io::Result<()>;
    /// Clear from the cursor to the end of the line.
    fn clear_to_end(&mut self) -> io::Result<()>;
    fn clear_screen(&mut self) -> io::Result<()>;
    fn hide_cursor(&mut self) -> io::Result<()>;
    fn show_cursor(&mut self) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;
}

/// [`Screen`] backed by crossterm escape sequences.
pub struct CrosstermScreen<W: Write> {
    out: W,
    size: (u16, u16),
}

impl<W: Write> CrosstermScreen<W> {
    pub fn new(out: W) -> Self {
        let mut screen = Self { out, size: (80, 24) };
        screen.query_size();
        screen
    }
}

impl<W: Write> Screen for CrosstermScreen<W> {
    fn size(&self) -> (u16, u16) {
        self.size
    }

    fn query_size(&mut self) -> (u16, u16) {
        if let Ok(size) = terminal::size() {
            self.size = size;
        }
        self.size
    }

    fn move_to(&mut self, x: u16, y: u16) -> io::Result<()> {
        queue!(self.out, MoveTo(x, y))
    }

    fn print_styled(&mut self, text: &str, style: Style) -> io::Result<()> {
        if let Some(fg) = style.fg {
            queue!(self.out, SetForegroundColor(fg))?;
        }
        if let Some(bg) = style.bg {
            queue!(self.out, SetBackgroundColor(bg))?;
        }
        if style.bold {
            queue!(self.out, SetAttribute(Attribute::Bold))?;
        }
        if style.reverse {
            queue!(self.out, SetAttribute(Attribute::Reverse))?;
        }
        queue!(
            self.out,
            Print(text),
            SetAttribute(Attribute::Reset),
            ResetColor
        )
    }

    fn clear_to_end(&mut self) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::UntilNewLine))
    }

    fn clear_screen(&mut self) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))
    }

    fn hide_cursor(&mut self) -> io::Result<()> {
        queue!(self.out, Hide)
    }

    fn show_cursor(&mut self) -> io::Result<()> {
        queue!(self.out, Show)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
