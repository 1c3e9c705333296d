//! Categorized console output
//!
//! One line per message on stdout, prefixed by its category. Colour is only
//! used when the output is a terminal. Every line is also emitted as a
//! `debug` tracing event under this module's target.

use std::io::{self, IsTerminal, Write};

/// Message category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Plain,
    Success,
    Warning,
    Error,
    Notice,
}

impl Category {
    fn prefix(self) -> &'static str {
        match self {
            Category::Plain => "",
            Category::Success => "[ OK ] ",
            Category::Warning => "[WARN] ",
            Category::Error => "[FAIL] ",
            Category::Notice => "[NOTE] ",
        }
    }

    fn ansi_color(self) -> Option<&'static str> {
        match self {
            Category::Plain => None,
            Category::Success => Some("\x1b[32m"),
            Category::Warning => Some("\x1b[33m"),
            Category::Error => Some("\x1b[31m"),
            Category::Notice => Some("\x1b[36m"),
        }
    }
}

/// Line-oriented console writer
pub struct Console<W: Write = io::Stdout> {
    out: W,
    color: bool,
}

impl Console<io::Stdout> {
    /// Console on stdout, coloured when stdout is a terminal
    pub fn stdout() -> Self {
        let out = io::stdout();
        let color = out.is_terminal();
        Self { out, color }
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn print(&mut self, message: impl AsRef<str>) {
        self.emit(Category::Plain, message.as_ref());
    }

    pub fn success(&mut self, message: impl AsRef<str>) {
        self.emit(Category::Success, message.as_ref());
    }

    pub fn warning(&mut self, message: impl AsRef<str>) {
        self.emit(Category::Warning, message.as_ref());
    }

    pub fn error(&mut self, message: impl AsRef<str>) {
        self.emit(Category::Error, message.as_ref());
    }

    pub fn notice(&mut self, message: impl AsRef<str>) {
        self.emit(Category::Notice, message.as_ref());
    }

    pub fn emit(&mut self, category: Category, message: &str) {
        tracing::debug!(?category, "{}", message);

        let written = match category.ansi_color().filter(|_| self.color) {
            Some(color) => writeln!(self.out, "{}{}{}\x1b[0m", color, category.prefix(), message),
            None => writeln!(self.out, "{}{}", category.prefix(), message),
        };

        // Write failures are logged, never propagated
        if let Err(e) = written.and_then(|_| self.out.flush()) {
            tracing::warn!("Console write failed: {}", e);
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
