//! Output rendering for chat sessions.
//!
//! This module provides the renderer trait a session writes to, a plain-text terminal
//! implementation, and a renderer that discards everything for surfaces that read the
//! transcript instead.

use std::io::{self, Stdout, Write};

use crate::transcript::{Role, Transcript, Turn};

/// ANSI escape code for dim text (used for info and the waiting indicator).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for bold text (used for role labels).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for the user label).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for green text (used for the assistant label).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Carriage return plus erase-line, used to remove the waiting indicator.
const ERASE_LINE: &str = "\r\x1b[2K";

/// Text of the waiting indicator.
const WAITING_TEXT: &str = "Thinking...";

/// Trait for rendering chat output.
///
/// A session calls `start_turn` before each turn it renders, streams text through
/// `print_text`, and calls `finish_response` when the turn is complete.
pub trait Renderer: Send {
    /// Called before the content of a turn is rendered.
    fn start_turn(&mut self, role: Role);

    /// Print a chunk of turn text.
    ///
    /// This is called incrementally as text is streamed from the API.
    fn print_text(&mut self, text: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Show that the session is waiting on the model.
    fn start_waiting(&mut self) {}

    /// Remove the waiting indicator, if shown.
    fn stop_waiting(&mut self) {}

    /// Called when a turn is complete.
    fn finish_response(&mut self);

    /// Render a turn that already exists.
    fn render_turn(&mut self, turn: &Turn) {
        self.start_turn(turn.role());
        if turn.is_error() {
            self.print_error(turn.content());
        } else {
            self.print_text(turn.content());
        }
        self.finish_response();
    }
}

/// Render every turn of a transcript, in order.
pub fn render_transcript(transcript: &Transcript, renderer: &mut dyn Renderer) {
    for turn in transcript {
        renderer.render_turn(turn);
    }
}

/// Renderer that discards all output.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn start_turn(&mut self, _: Role) {}
    fn print_text(&mut self, _: &str) {}
    fn print_error(&mut self, _: &str) {}
    fn print_info(&mut self, _: &str) {}
    fn finish_response(&mut self) {}
}

/// Plain text renderer with optional ANSI styling.
///
/// This renderer outputs text directly to stdout with optional
/// ANSI escape codes for role labels, errors, and the waiting indicator.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
    waiting: bool,
    line_start: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
            waiting: false,
            line_start: true,
        }
    }

    fn styled(&self, style: &str, text: &str) -> String {
        if self.use_color {
            format!("{style}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }

    fn clear_waiting(&mut self) {
        if self.waiting {
            self.waiting = false;
            if self.use_color {
                let _ = write!(self.stdout, "{ERASE_LINE}");
            } else {
                let _ = writeln!(self.stdout);
            }
            let _ = self.stdout.flush();
        }
    }

    fn ensure_line_start(&mut self) {
        if !self.line_start {
            let _ = writeln!(self.stdout);
            self.line_start = true;
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn start_turn(&mut self, role: Role) {
        self.clear_waiting();
        self.ensure_line_start();
        let label = match role {
            Role::User => self.styled(&format!("{ANSI_BOLD}{ANSI_CYAN}"), "You:"),
            Role::Assistant => self.styled(&format!("{ANSI_BOLD}{ANSI_GREEN}"), "Gemini:"),
        };
        let _ = writeln!(self.stdout, "{label}");
        let _ = self.stdout.flush();
    }

    fn print_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.clear_waiting();
        let _ = write!(self.stdout, "{text}");
        let _ = self.stdout.flush();
        self.line_start = text.ends_with('\n');
    }

    fn print_error(&mut self, error: &str) {
        self.clear_waiting();
        self.ensure_line_start();
        let error = self.styled(ANSI_RED, error);
        let _ = writeln!(self.stdout, "{error}");
        let _ = self.stdout.flush();
    }

    fn print_info(&mut self, info: &str) {
        self.clear_waiting();
        self.ensure_line_start();
        let info = self.styled(ANSI_DIM, info);
        let _ = writeln!(self.stdout, "{info}");
        let _ = self.stdout.flush();
    }

    fn start_waiting(&mut self) {
        if self.waiting {
            return;
        }
        self.ensure_line_start();
        let indicator = self.styled(ANSI_DIM, WAITING_TEXT);
        let _ = write!(self.stdout, "{indicator}");
        let _ = self.stdout.flush();
        self.waiting = true;
    }

    fn stop_waiting(&mut self) {
        self.clear_waiting();
    }

    fn finish_response(&mut self) {
        self.clear_waiting();
        self.ensure_line_start();
        let _ = writeln!(self.stdout);
        let _ = self.stdout.flush();
    }
}
