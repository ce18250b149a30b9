//! The console command loop.
//!
//! | Command      | Effect                                    |
//! |--------------|-------------------------------------------|
//! | `attach key` | run the learn flow for one button          |
//! | `list`       | print every binding                        |
//! | `help`       | print this command list                    |
//! | `quit`       | leave the loop (`exit` is accepted too)    |
//!
//! Commands are case-insensitive and extra whitespace is ignored.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use irbridge_core::{BindingStore, KeyNameResolver};
use tracing::{info, warn};

use super::configure_binding::Prompter;
use super::learn::{learn_binding, CaptureSource, LearnError, LearnOptions};
use crate::infrastructure::serial::LinkError;
use crate::infrastructure::storage::BindingsFile;

const HELP: &str = "Commands:\n  \
    attach key  bind a remote button to an action\n  \
    list        show all bindings\n  \
    help        show this message\n  \
    quit        exit";

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AttachKey,
    List,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let normalized = line
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase();
        match normalized.as_str() {
            "" => Self::Empty,
            "attach key" => Self::AttachKey,
            "list" => Self::List,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => Self::Unknown(line.trim().to_string()),
        }
    }
}

/// Why [`Session::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user typed `quit`.
    Quit,
    /// The console input was closed.
    InputClosed,
    /// The shutdown flag was cleared.
    Shutdown,
    /// The receiver link closed under the learn flow.
    LinkClosed,
}

/// Everything the command loop works on.
pub struct Session<'a> {
    pub source: &'a dyn CaptureSource,
    pub keys: &'a dyn KeyNameResolver,
    pub bindings: &'a RwLock<BindingStore>,
    pub file: &'a mut BindingsFile,
    pub options: LearnOptions,
}

impl Session<'_> {
    /// Reads and executes commands until `quit`, end of input, or shutdown.
    pub fn run(&mut self, prompter: &mut dyn Prompter, running: &AtomicBool) -> SessionEnd {
        prompter.say(HELP);
        loop {
            if !running.load(Ordering::Acquire) {
                return SessionEnd::Shutdown;
            }
            let Some(line) = prompter.ask(">") else {
                info!("console input closed");
                return SessionEnd::InputClosed;
            };

            match Command::parse(&line) {
                Command::Empty => {}
                Command::Quit => return SessionEnd::Quit,
                Command::Help => prompter.say(HELP),
                Command::List => self.list(prompter),
                Command::AttachKey => {
                    if let Err(LearnError::Link(LinkError::Closed)) = self.attach_key(prompter) {
                        prompter.say("The receiver disconnected.");
                        return SessionEnd::LinkClosed;
                    }
                }
                Command::Unknown(text) => {
                    prompter.say(&format!("Unknown command {text:?}. Type \"help\" for a list."));
                }
            }
        }
    }

    fn attach_key(&mut self, prompter: &mut dyn Prompter) -> Result<(), LearnError> {
        match learn_binding(
            self.source,
            prompter,
            self.keys,
            self.bindings,
            self.file,
            &self.options,
        ) {
            Ok(_) => Ok(()),
            Err(LearnError::Cancelled) => {
                prompter.say("Cancelled.");
                Err(LearnError::Cancelled)
            }
            Err(e) => {
                warn!(error = %e, "learn flow failed");
                prompter.say(&format!("Could not add the binding: {e}"));
                Err(e)
            }
        }
    }

    fn list(&self, prompter: &mut dyn Prompter) {
        let store = self.bindings.read().unwrap_or_else(PoisonError::into_inner);
        if store.is_empty() {
            prompter.say("No bindings yet. Use \"attach key\" to add one.");
            return;
        }
        for binding in store.iter() {
            prompter.say(&format!(
                "{:<16} {} (repeat guard {} ms)",
                binding.button_code(),
                binding.action().describe(self.keys),
                binding.min_refire_interval().as_millis()
            ));
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
