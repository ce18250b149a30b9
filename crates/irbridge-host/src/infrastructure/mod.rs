//! Infrastructure layer for the host.
//!
//! - **`serial`** – the receiver link and its transports.
//! - **`input_injection`** – OS key and mouse injection behind
//!   [`irbridge_core::InputInjector`].
//! - **`storage`** – TOML settings and the bindings file.
//! - **`console`** – terminal prompts for the interactive flows.

pub mod console;
pub mod input_injection;
pub mod serial;
pub mod storage;
