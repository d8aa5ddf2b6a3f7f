//! Line-oriented terminal front end
//!
//! Renders the transcript to any writer and parses slash commands typed at
//! the prompt. Standard output is the usual writer; tests use a buffer.

use crate::history::{Turn, TurnId, TurnKind};
use crate::surface::{ChatSurface, PendingIndicator};
use std::io::{Stdout, Write};
use std::sync::{Arc, Mutex, PoisonError};

const PENDING_TEXT: &str = "jane is typing...";
/// Carriage return plus ANSI erase-line
const ERASE_LINE: &str = "\r\x1b[2K";

/// Input line, after parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Clear,
    History,
    Related(String),
    Help,
    Unknown(String),
    Message(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return Command::Message(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        match (name, arg) {
            ("quit" | "exit", _) => Command::Quit,
            ("clear", _) => Command::Clear,
            ("history", _) => Command::History,
            ("related", id) if !id.is_empty() => Command::Related(id.to_string()),
            ("help", _) => Command::Help,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

pub const HELP_TEXT: &str = "\
Commands:
  /history        list stored turns with their ids
  /related <id>   show the turns around a turn
  /clear          clear the conversation
  /quit           leave";

fn label(kind: TurnKind) -> &'static str {
    match kind {
        TurnKind::User => "you",
        TurnKind::Assistant => "jane",
        TurnKind::Warning => "warning",
    }
}

/// Surface that writes the transcript as plain lines
pub struct TerminalSurface<W: Write + Send> {
    out: Arc<Mutex<W>>,
    input: Mutex<String>,
}

impl TerminalSurface<Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Arc::new(Mutex::new(out)),
            input: Mutex::new(String::new()),
        }
    }

    /// Print turns with their ids, one per line
    pub fn list_turns(&self, turns: &[Turn]) {
        if turns.is_empty() {
            self.write("(no turns)\n");
            return;
        }
        let listing: String = turns
            .iter()
            .map(|turn| format!("[{}] {}: {}\n", turn.id(), label(turn.kind()), turn.content()))
            .collect();
        self.write(&listing);
    }

    pub fn notice(&self, text: &str) {
        self.write(&format!("{text}\n"));
    }

    fn write(&self, text: &str) {
        write_to(&self.out, text);
    }
}

fn write_to<W: Write>(out: &Mutex<W>, text: &str) {
    let mut out = out.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(e) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
        tracing::debug!(error = %e, "Terminal write failed");
    }
}

/// Status line that is erased again on dispose
pub struct TerminalIndicator<W: Write + Send> {
    out: Arc<Mutex<W>>,
}

impl<W: Write + Send> PendingIndicator for TerminalIndicator<W> {
    fn dispose(self) {
        write_to(&self.out, ERASE_LINE);
    }
}

impl<W: Write + Send> ChatSurface for TerminalSurface<W> {
    type Indicator = TerminalIndicator<W>;

    fn append_turn(&self, content: &str, kind: TurnKind, _scroll_into_view: bool, _id: Option<&TurnId>) {
        // The user already sees what they typed
        if kind == TurnKind::User {
            return;
        }
        self.write(&format!("{}> {content}\n", label(kind)));
    }

    fn show_pending_indicator(&self) -> TerminalIndicator<W> {
        self.write(PENDING_TEXT);
        TerminalIndicator {
            out: Arc::clone(&self.out),
        }
    }

    fn show_confirmation_prompt(&self, warning: &str) {
        self.write(&format!("warning> {warning}\nSend anyway? [y/N] "));
    }

    fn show_transient_error(&self, message: &str) {
        self.write(&format!("error: {message}\n"));
    }

    fn input_text(&self) -> String {
        self.input
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_input_text(&self, text: &str) {
        *self.input.lock().unwrap_or_else(PoisonError::into_inner) = text.to_string();
    }

    fn clear_transcript(&self) {
        self.write("--- conversation cleared ---\n");
    }
}
