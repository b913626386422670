//! Output rendering for the chat application.
//!
//! This module provides a trait-based rendering abstraction so that the
//! session can be drawn to a terminal with or without ANSI styling.

use std::io::{self, Write};

use crate::types::{Message, Role};

/// ANSI escape code for bold text (used for speaker labels).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for dim text (used for the loading indicator).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for blue text (used for the user label).
const ANSI_BLUE: &str = "\x1b[34m";

/// ANSI escape code for magenta text (used for the assistant label).
const ANSI_MAGENTA: &str = "\x1b[35m";

/// ANSI escape code for green text (used for the copy acknowledgment).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Text shown while a review is in flight.
pub const LOADING_TEXT: &str = "Analyzing your code...";

/// Trait for rendering chat output.
pub trait Renderer: Send {
    /// Print one transcript message with its index.
    fn print_message(&mut self, index: usize, message: &Message);

    /// Print the in-flight indicator.
    fn print_loading(&mut self);

    /// Acknowledge that message `index` was copied.
    fn print_copied(&mut self, index: usize);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    out: Box<dyn Write + Send>,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer on stdout with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer on stdout with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(Box::new(io::stdout()), use_color)
    }

    /// Creates a renderer that writes to `out`.
    pub fn with_writer(out: Box<dyn Write + Send>, use_color: bool) -> Self {
        Self { out, use_color }
    }

    fn styled(&self, style: &str, text: &str) -> String {
        if self.use_color {
            format!("{style}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }

    fn emit(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_message(&mut self, index: usize, message: &Message) {
        let label = match message.role {
            Role::User => self.styled(&format!("{ANSI_BOLD}{ANSI_BLUE}"), &format!("You [{index}]:")),
            Role::Assistant => self.styled(
                &format!("{ANSI_BOLD}{ANSI_MAGENTA}"),
                &format!("Reviewer [{index}]:"),
            ),
        };
        let text = format!("{label}\n{}\n", message.content);
        self.emit(&text);
    }

    fn print_loading(&mut self) {
        let text = self.styled(ANSI_DIM, LOADING_TEXT);
        self.emit(&text);
    }

    fn print_copied(&mut self, index: usize) {
        let text = self.styled(ANSI_GREEN, &format!("Copied message [{index}] to clipboard."));
        self.emit(&text);
    }

    fn print_error(&mut self, error: &str) {
        let text = self.styled(ANSI_RED, &format!("Error: {error}"));
        self.emit(&text);
    }

    fn print_info(&mut self, info: &str) {
        self.emit(info);
    }
}
