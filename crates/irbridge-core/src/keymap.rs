//! Human-readable key names ↔ Windows virtual-key codes.
//!
//! Bindings store keys as Windows virtual-key (VK) codes.  While a binding is
//! set up interactively the user types a key *name* (`enter`, `shift`, `up`,
//! `k`, `1`, ...), which a [`KeyNameResolver`] turns into a code.  Matching is
//! case-insensitive.
//!
//! | Key          | VK code |
//! |--------------|---------|
//! | A … Z        | 0x41 … 0x5A (same as ASCII upper case) |
//! | 0 … 9        | 0x30 … 0x39 (same as ASCII digits)     |
//! | Enter        | 0x0D    |
//! | Shift        | 0x10    |
//! | F1           | 0x70    |

/// Looks up key codes by name.
pub trait KeyNameResolver: Send + Sync {
    /// Returns the code for `name`, or `None` if the name is unknown.
    fn code_for_name(&self, name: &str) -> Option<u16>;

    /// Returns the display name for `code`, if it has one.
    fn name_for_code(&self, code: u16) -> Option<String>;

    /// Every name this resolver accepts, in display order.
    fn all_names(&self) -> Vec<String>;
}

/// Named keys other than letters and digits.  The first entry for a code is
/// its display name; later entries are aliases.
const NAMED_KEYS: &[(&str, u16)] = &[
    ("Backspace", 0x08),
    ("Tab", 0x09),
    ("Enter", 0x0D),
    ("Return", 0x0D),
    ("Shift", 0x10),
    ("Ctrl", 0x11),
    ("Control", 0x11),
    ("Alt", 0x12),
    ("Pause", 0x13),
    ("Caps Lock", 0x14),
    ("Escape", 0x1B),
    ("Esc", 0x1B),
    ("Space", 0x20),
    ("Page Up", 0x21),
    ("Page Down", 0x22),
    ("End", 0x23),
    ("Home", 0x24),
    ("Left", 0x25),
    ("Up", 0x26),
    ("Right", 0x27),
    ("Down", 0x28),
    ("Print Screen", 0x2C),
    ("Insert", 0x2D),
    ("Delete", 0x2E),
    ("Windows", 0x5B),
    ("Context Menu", 0x5D),
    ("NumPad-0", 0x60),
    ("NumPad-1", 0x61),
    ("NumPad-2", 0x62),
    ("NumPad-3", 0x63),
    ("NumPad-4", 0x64),
    ("NumPad-5", 0x65),
    ("NumPad-6", 0x66),
    ("NumPad-7", 0x67),
    ("NumPad-8", 0x68),
    ("NumPad-9", 0x69),
    ("NumPad *", 0x6A),
    ("NumPad +", 0x6B),
    ("NumPad -", 0x6D),
    ("NumPad .", 0x6E),
    ("NumPad /", 0x6F),
    ("F1", 0x70),
    ("F2", 0x71),
    ("F3", 0x72),
    ("F4", 0x73),
    ("F5", 0x74),
    ("F6", 0x75),
    ("F7", 0x76),
    ("F8", 0x77),
    ("F9", 0x78),
    ("F10", 0x79),
    ("F11", 0x7A),
    ("F12", 0x7B),
    ("Num Lock", 0x90),
    ("Scroll Lock", 0x91),
    ("Volume Mute", 0xAD),
    ("Volume Down", 0xAE),
    ("Volume Up", 0xAF),
    ("Next Track", 0xB0),
    ("Previous Track", 0xB1),
    ("Stop", 0xB2),
    ("Play/Pause", 0xB3),
    ("Semicolon", 0xBA),
    ("Equals", 0xBB),
    ("Comma", 0xBC),
    ("Minus", 0xBD),
    ("Period", 0xBE),
    ("Slash", 0xBF),
    ("Back Quote", 0xC0),
    ("Open Bracket", 0xDB),
    ("Back Slash", 0xDC),
    ("Close Bracket", 0xDD),
    ("Quote", 0xDE),
];

/// The built-in Windows virtual-key name table.
#[derive(Debug, Clone, Copy, Default)]
pub struct VirtualKeyNames;

impl VirtualKeyNames {
    pub fn new() -> Self {
        Self
    }
}

impl KeyNameResolver for VirtualKeyNames {
    fn code_for_name(&self, name: &str) -> Option<u16> {
        let name = name.trim();

        // Single letters and digits share their VK code with upper-case ASCII.
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            let upper = c.to_ascii_uppercase();
            if upper.is_ascii_uppercase() || upper.is_ascii_digit() {
                return Some(upper as u16);
            }
        }

        NAMED_KEYS
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, code)| code)
    }

    fn name_for_code(&self, code: u16) -> Option<String> {
        match code {
            0x30..=0x39 | 0x41..=0x5A => char::from_u32(u32::from(code)).map(String::from),
            _ => NAMED_KEYS
                .iter()
                .find(|&&(_, c)| c == code)
                .map(|&(n, _)| n.to_string()),
        }
    }

    fn all_names(&self) -> Vec<String> {
        let letters = (b'A'..=b'Z').map(|b| char::from(b).to_string());
        let digits = (b'0'..=b'9').map(|b| char::from(b).to_string());
        letters
            .chain(digits)
            .chain(NAMED_KEYS.iter().map(|&(n, _)| n.to_string()))
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
