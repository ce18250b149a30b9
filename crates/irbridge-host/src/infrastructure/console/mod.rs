//! Line-oriented console adapters for [`Prompter`].
//!
//! - **`StdioPrompter`** – reads answers from any `BufRead` and writes prompts
//!   to any `Write`; [`StdioPrompter::stdin`] wires it to the terminal.
//! - **`scripted`** – [`ScriptedPrompter`], canned answers for tests.

pub mod scripted;

pub use scripted::ScriptedPrompter;

use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

use tracing::warn;

use crate::application::configure_binding::Prompter;

/// Prompts on a writer and reads one answer line per question.
pub struct StdioPrompter<R, W> {
    input: R,
    output: W,
}

impl StdioPrompter<BufReader<Stdin>, Stdout> {
    /// A prompter on the process's standard input and output.
    pub fn stdin() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> StdioPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Gives back the writer, e.g. to inspect what a test prompter printed.
    pub fn into_output(self) -> W {
        self.output
    }

    fn write_line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.output, "{text}").and_then(|()| self.output.flush()) {
            warn!(error = %e, "console write failed");
        }
    }
}

impl<R: BufRead, W: Write> Prompter for StdioPrompter<R, W> {
    fn ask(&mut self, question: &str) -> Option<String> {
        if let Err(e) = write!(self.output, "{question} ").and_then(|()| self.output.flush()) {
            warn!(error = %e, "console write failed");
        }

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(e) => {
                warn!(error = %e, "console read failed");
                None
            }
        }
    }

    fn say(&mut self, message: &str) {
        self.write_line(message);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
