//! Monophonic melodies for the receiver's tone player.
//!
//! # Notation
//!
//! ```text
//! (<repeat>,<max_duration>)@<note_count>#<freq>,<dur>%<freq>,<dur>%...!
//! ```
//!
//! - `repeat` – how many times the sequence plays; defaults to 1.
//! - `max_duration` – reserved by the firmware; always sent as 0.
//! - each note is `frequency_hz,duration_ms` followed by `%`.
//! - `!` terminates the sequence.
//!
//! Two short rising notes played once encode as `(1,0)@2#659,82%784,82%!`.

use std::fmt;

/// One tone: a frequency held for a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    pub frequency_hz: u32,
    pub duration_ms: u32,
}

impl Note {
    pub const fn new(frequency_hz: u32, duration_ms: u32) -> Self {
        Self {
            frequency_hz,
            duration_ms,
        }
    }
}

/// An ordered sequence of notes with a repeat count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Melody {
    notes: Vec<Note>,
    repeat_count: u32,
}

/// Reserved field, always zero on the wire.
const MAX_DURATION: u32 = 0;

impl Melody {
    /// Creates a melody that plays once.
    pub fn new(notes: Vec<Note>) -> Self {
        Self {
            notes,
            repeat_count: 1,
        }
    }

    /// A single tone.
    pub fn tone(frequency_hz: u32, duration_ms: u32) -> Self {
        Self::new(vec![Note::new(frequency_hz, duration_ms)])
    }

    pub fn with_repeat_count(mut self, repeat_count: u32) -> Self {
        self.repeat_count = repeat_count;
        self
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    /// Rising triad played when the receiver completes the handshake.
    pub fn device_ready() -> Self {
        Self::new(vec![
            Note::new(523, 82),
            Note::new(659, 82),
            Note::new(784, 120),
        ])
    }

    /// Two rising notes confirming a saved binding.
    pub fn success() -> Self {
        Self::new(vec![Note::new(659, 82), Note::new(784, 82)])
    }

    /// Two falling notes signalling a failed step.
    pub fn failure() -> Self {
        Self::new(vec![Note::new(392, 120), Note::new(262, 200)])
    }
}

impl fmt::Display for Melody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{MAX_DURATION})@{}#",
            self.repeat_count,
            self.notes.len()
        )?;
        for note in &self.notes {
            write!(f, "{},{}%", note.frequency_hz, note.duration_ms)?;
        }
        f.write_str("!")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
