//! Application layer use cases for the host.
//!
//! Use cases orchestrate the core binding model and the infrastructure
//! adapters to fulfil one user goal each.  They reach the outside world only
//! through traits ([`irbridge_core::InputInjector`],
//! [`irbridge_core::KeyNameResolver`], [`configure_binding::Prompter`],
//! [`learn::CaptureSource`], [`crate::infrastructure::serial::SerialTransport`])
//! so every flow can be driven from a test without hardware or a terminal.
//!
//! # Sub-modules
//!
//! - **`connect`** – Scans serial ports until one answers the handshake.
//!
//! - **`dispatch`** – Turns button presses into injected input.  Runs on the
//!   serial reader thread for every press, so it never blocks on the link.
//!
//! - **`configure_binding`** – Asks the user which action a button should
//!   perform and builds the [`irbridge_core::BoundAction`].
//!
//! - **`learn`** – The "attach key" flow: capture a code twice, confirm it,
//!   configure the action, store it, persist it.
//!
//! - **`session`** – The console command loop.

pub mod configure_binding;
pub mod connect;
pub mod dispatch;
pub mod learn;
pub mod session;
