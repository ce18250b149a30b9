//! Finds the receiver by scanning serial ports.
//!
//! Each candidate port is opened and given `connect_timeout` to send its
//! `DEVICE_ACTIVE` greeting.  A port that stays silent is closed again and the
//! next one is tried.  When a whole scan finds nothing the scan waits
//! `rescan_interval` and starts over, so a receiver plugged in after start-up
//! is still picked up.
//!
//! With an explicit port name only that port is probed, with the same
//! timeout and retry policy.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::infrastructure::serial::{DeviceLink, LineSettings, SerialTransport, TransportError};

/// Granularity of the cancellable sleep between scan rounds.
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Error type for the connect use case.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Every scan round found an empty port list.
    #[error("no serial ports available")]
    NoPortsAvailable,

    /// Ports were found but none of them answered the handshake.
    #[error("no receiver answered after {rounds} scan round(s)")]
    NoDeviceFound { rounds: u32 },

    /// The shutdown flag was cleared while scanning.
    #[error("connection attempt cancelled")]
    Cancelled,

    /// The system port list could not be read.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Timeouts and retry limits for [`connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectPolicy {
    pub connect_timeout: Duration,
    pub rescan_interval: Duration,
    /// `0` scans until cancelled.
    pub max_scan_rounds: u32,
}

impl Default for ConnectPolicy {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(3000),
            rescan_interval: Duration::from_millis(1000),
            max_scan_rounds: 0,
        }
    }
}

/// Scans until a receiver completes the handshake and returns its link.
///
/// `running` is checked between ports and during the pause between rounds;
/// clearing it ends the scan with [`ConnectError::Cancelled`].
///
/// # Errors
///
/// [`ConnectError::NoPortsAvailable`] or [`ConnectError::NoDeviceFound`] once
/// `max_scan_rounds` is exhausted, [`ConnectError::Cancelled`] on shutdown, and
/// [`ConnectError::Transport`] if the port list cannot be read.
pub fn connect(
    transport: &dyn SerialTransport,
    settings: LineSettings,
    explicit_port: Option<&str>,
    policy: &ConnectPolicy,
    running: &AtomicBool,
) -> Result<Arc<DeviceLink>, ConnectError> {
    let mut round = 0u32;
    let mut saw_ports = false;

    loop {
        round += 1;
        let candidates = match explicit_port {
            Some(port) => vec![port.to_string()],
            None => transport.list_ports()?,
        };
        if candidates.is_empty() {
            warn!(round, "no serial ports found");
        }
        saw_ports |= !candidates.is_empty();

        for port in &candidates {
            if !running.load(Ordering::Acquire) {
                return Err(ConnectError::Cancelled);
            }
            if let Some(link) = probe(transport, port, settings, policy.connect_timeout) {
                return Ok(link);
            }
        }

        if policy.max_scan_rounds != 0 && round >= policy.max_scan_rounds {
            return Err(if saw_ports {
                ConnectError::NoDeviceFound { rounds: round }
            } else {
                ConnectError::NoPortsAvailable
            });
        }

        info!(
            round,
            "no receiver found, scanning again in {:?}", policy.rescan_interval
        );
        if !sleep_while_running(policy.rescan_interval, running) {
            return Err(ConnectError::Cancelled);
        }
    }
}

fn probe(
    transport: &dyn SerialTransport,
    port: &str,
    settings: LineSettings,
    timeout: Duration,
) -> Option<Arc<DeviceLink>> {
    debug!(port, "probing port");
    let link = match DeviceLink::open(transport, port, settings) {
        Ok(link) => link,
        Err(e) => {
            debug!(port, error = %e, "could not open port");
            return None;
        }
    };

    match link.wait_for_connection(timeout) {
        Ok(()) => {
            info!(port, "receiver found");
            Some(link)
        }
        Err(e) => {
            debug!(port, error = %e, "no handshake");
            link.close();
            None
        }
    }
}

/// Sleeps for `total`, returning `false` early if `running` is cleared.
fn sleep_while_running(total: Duration, running: &AtomicBool) -> bool {
    let deadline = Instant::now() + total;
    loop {
        if !running.load(Ordering::Acquire) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
