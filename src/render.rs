//! Output rendering for the chat front end.
//!
//! This module provides the renderer trait and a plain-text implementation
//! that prints chat turns and status lines to a terminal.

use std::io::{self, Stdout, Write};

use crate::types::{ChatTurn, TurnRole};

/// ANSI escape code for dim text (used for informational lines).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for bold text (used for role labels).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for the user label).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for green text (used for the bot label).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Trait for rendering chat output.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
pub trait Renderer: Send {
    /// Print one chat turn.
    fn print_turn(&mut self, turn: &ChatTurn);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);
}

/// Plain text renderer with optional ANSI styling.
///
/// Output goes to stdout by default; any writer can be substituted.
pub struct PlainTextRenderer<W: Write + Send = Stdout> {
    out: W,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            out: io::stdout(),
            use_color,
        }
    }
}

impl<W: Write + Send> PlainTextRenderer<W> {
    /// Creates a renderer that writes to `out`.
    pub fn with_writer(out: W, use_color: bool) -> Self {
        Self { out, use_color }
    }

    /// Consumes the renderer and returns its writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        // A closed terminal is not worth failing the session over.
        let _ = writeln!(self.out, "{line}");
        let _ = self.out.flush();
    }

    fn styled(&self, style: &str, text: &str) -> String {
        if self.use_color {
            format!("{style}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> Renderer for PlainTextRenderer<W> {
    fn print_turn(&mut self, turn: &ChatTurn) {
        let (style, label) = match turn.role {
            TurnRole::User => (ANSI_CYAN, "You"),
            TurnRole::Bot => (ANSI_GREEN, "Bot"),
        };
        let label = if self.use_color {
            format!("{ANSI_BOLD}{style}{label}:{ANSI_RESET}")
        } else {
            format!("{label}:")
        };
        self.write_line(&format!("{label} {}", turn.text));
    }

    fn print_error(&mut self, error: &str) {
        let line = self.styled(ANSI_RED, &format!("Error: {error}"));
        self.write_line(&line);
    }

    fn print_info(&mut self, info: &str) {
        let line = self.styled(ANSI_DIM, info);
        self.write_line(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(use_color: bool, f: impl FnOnce(&mut PlainTextRenderer<Vec<u8>>)) -> String {
        let mut renderer = PlainTextRenderer::with_writer(Vec::new(), use_color);
        f(&mut renderer);
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
    }

    #[test]
    fn plain_turns() {
        let out = rendered(false, |r| {
            r.print_turn(&ChatTurn::user("What is 2+2?"));
            r.print_turn(&ChatTurn::bot("4"));
        });
        assert_eq!(out, "You: What is 2+2?\nBot: 4\n");
    }

    #[test]
    fn plain_errors_and_info() {
        let out = rendered(false, |r| {
            r.print_error("Network error. Please try again later.");
            r.print_info("Logged out.");
        });
        assert_eq!(
            out,
            "Error: Network error. Please try again later.\nLogged out.\n"
        );
    }

    #[test]
    fn colored_output_resets_style() {
        let out = rendered(true, |r| r.print_error("boom"));
        assert!(out.starts_with(ANSI_RED));
        assert!(out.trim_end().ends_with(ANSI_RESET));
    }
}
