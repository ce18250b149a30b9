//! Input injectors: the adapters a bound action executes against.
//!
//! - **`windows`** – `SendInput`-based injector, compiled on Windows only.
//! - **`dry_run`** – logs every event instead of injecting it.  Used with
//!   `--dry-run` and on platforms without a native injector.
//! - **`mock`** – records events in memory for tests.

pub mod dry_run;
pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

use std::sync::Arc;

use irbridge_core::InputInjector;

pub use dry_run::DryRunInjector;
pub use mock::{InjectedEvent, RecordingInjector};

/// Picks the injector for this platform.
///
/// With `dry_run` set, or when the platform has no native injector, events are
/// only logged.
pub fn platform_injector(dry_run: bool) -> Arc<dyn InputInjector> {
    if dry_run {
        return Arc::new(DryRunInjector::new());
    }

    #[cfg(target_os = "windows")]
    {
        Arc::new(windows::WindowsInjector::new())
    }

    #[cfg(not(target_os = "windows"))]
    {
        tracing::warn!("no native input injector for this platform, falling back to dry run");
        Arc::new(DryRunInjector::new())
    }
}
