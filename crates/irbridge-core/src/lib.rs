//! # irbridge-core
//!
//! Shared library for the IR remote bridge containing the binding model, the
//! persisted bindings text format, and the serial text protocol spoken with the
//! IR receiver module.
//!
//! It has zero dependencies on OS APIs, serial ports, or consoles.  Everything
//! that touches the outside world (key injection, key-name lookup) is reached
//! through a trait so the host application can plug in a real adapter and tests
//! can plug in a mock.
//!
//! # Architecture overview
//!
//! The bridge listens to a small microcontroller that decodes infrared remote
//! signals and forwards each decoded button code over a virtual serial port.
//! The host binds button codes to desktop actions (press a key, click, move the
//! pointer, scroll, press a key combination) and replays them when the button
//! is pressed again.
//!
//! - **`config`** – The ordered `[section]` / `key=value` text format used to
//!   persist bindings across runs.
//!
//! - **`binding`** – `BoundAction` (one button code → one action) and
//!   `BindingStore` (the set of all bindings, unique by button code).
//!
//! - **`injector`** – The `InputInjector` capability an action executes against.
//!
//! - **`keymap`** – Human-readable key names ↔ virtual-key codes, used while a
//!   binding is set up interactively.
//!
//! - **`protocol`** – Inbound frame decoding, outbound command encoding, and the
//!   melody notation understood by the receiver's tone player.

pub mod binding;
pub mod config;
pub mod injector;
pub mod keymap;
pub mod protocol;

pub use binding::{Action, ActionKind, BindingError, BindingStore, BoundAction, ClickButtons};
pub use config::{ConfigError, ConfigRecord, ConfigSection, ConfigStore};
pub use injector::{InjectionError, InputInjector, MouseButton};
pub use keymap::{KeyNameResolver, VirtualKeyNames};
pub use protocol::melody::{Melody, Note};
pub use protocol::{decode_frame, OutboundCommand, HANDSHAKE_TOKEN};
