//! A [`Prompter`] that answers from a fixed script.
//!
//! Used by unit and integration tests to drive the interactive flows without
//! a terminal.  When the script runs out, `ask` returns `None` as if the
//! console had reached end of input.

use std::collections::VecDeque;

use crate::application::configure_binding::Prompter;

#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    questions: Vec<String>,
    messages: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Every question asked, in order.
    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    /// Every message shown with `say`, in order.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Answers not consumed yet.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, question: &str) -> Option<String> {
        self.questions.push(question.to_string());
        self.answers.pop_front()
    }

    fn say(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
