//! Serial text protocol spoken with the IR receiver module.
//!
//! The link is a trusted point-to-point ASCII channel:
//!
//! ```text
//! receiver → host   DEVICE_ACTIVE          handshake token
//!                   <anything else>        captured / pressed button code
//! host → receiver   CONNECTED\n            handshake acknowledgment
//!                   BEEP\n                 legacy single tone
//!                   PLAY:<melody>\n        tone sequence (see [`melody`])
//! ```
//!
//! Inbound data is not line-framed: every chunk handed over by the serial
//! driver is treated as exactly one frame.  A code split across two chunks
//! therefore arrives as two frames; the receiver firmware writes each token in
//! a single burst, which is what makes this work in practice.

pub mod melody;

use melody::Melody;

/// Frame the receiver sends once it is powered and ready.
pub const HANDSHAKE_TOKEN: &str = "DEVICE_ACTIVE";

const HANDSHAKE_ACK: &str = "CONNECTED";
const BEEP: &str = "BEEP";
const PLAY_PREFIX: &str = "PLAY:";

/// Commands the host writes to the receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundCommand {
    /// Acknowledges a `DEVICE_ACTIVE` handshake.
    HandshakeAck,
    /// Plays the receiver's built-in confirmation tone.
    Beep,
    /// Plays a tone sequence.
    Play(Melody),
}

impl OutboundCommand {
    /// Encodes the command as newline-terminated ASCII.
    ///
    /// ```rust
    /// use irbridge_core::protocol::OutboundCommand;
    ///
    /// assert_eq!(OutboundCommand::Beep.encode(), b"BEEP\n");
    /// ```
    pub fn encode(&self) -> Vec<u8> {
        let text = match self {
            Self::HandshakeAck => format!("{HANDSHAKE_ACK}\n"),
            Self::Beep => format!("{BEEP}\n"),
            Self::Play(melody) => format!("{PLAY_PREFIX}{melody}\n"),
        };
        text.into_bytes()
    }
}

/// Decodes one inbound chunk into a frame, mapping every byte to the
/// character with the same code point (ISO-8859-1).
///
/// No charset decoding happens, so arbitrary bytes never fail to decode.
pub fn decode_frame(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
