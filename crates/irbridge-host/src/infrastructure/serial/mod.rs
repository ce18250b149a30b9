//! Serial link to the IR receiver module.
//!
//! - **`link`** – [`DeviceLink`], the protocol state machine (handshake,
//!   capture mode, suppression window, button-press broadcast).
//! - **`port`** – [`SerialPortTransport`], the `serialport`-backed adapter that
//!   runs a reader thread per open port.
//! - **`mock`** – [`LoopbackTransport`], an in-memory transport for tests.
//!
//! The link only talks to the hardware through the [`SerialTransport`] and
//! [`PortHandle`] traits, so everything above this module can be exercised
//! without a device attached.

pub mod link;
pub mod mock;
pub mod port;

pub use link::{ButtonListener, DeviceLink, LinkError};
pub use mock::LoopbackTransport;
pub use port::SerialPortTransport;

use thiserror::Error;

/// Error type for the transport layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The named port does not exist.
    #[error("serial port not found: {0}")]
    PortNotFound(String),

    /// The port exists but could not be opened or configured.
    #[error("failed to open serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    /// A read or write on an open port failed.
    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The port handle has already been closed.
    #[error("serial port is closed")]
    Closed,

    /// The system port list could not be read.
    #[error("failed to enumerate serial ports: {0}")]
    Enumerate(#[source] serialport::Error),
}

/// Line settings for the receiver.
///
/// The firmware always speaks 8 data bits, 1 stop bit, no parity; only the
/// rate is configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSettings {
    pub baud_rate: u32,
}

impl Default for LineSettings {
    fn default() -> Self {
        Self { baud_rate: 115_200 }
    }
}

/// Callback invoked on the transport's reader thread with each received chunk.
pub type FrameHandler = Box<dyn FnMut(&[u8]) + Send>;

/// Opens ports and enumerates candidates.
pub trait SerialTransport: Send + Sync {
    /// Names of the serial ports currently present on the system.
    fn list_ports(&self) -> Result<Vec<String>, TransportError>;

    /// Opens `port` and starts delivering received chunks to `on_frame`.
    ///
    /// Returns as soon as the port is open; `on_frame` runs on a thread owned
    /// by the transport until the returned handle is closed.
    fn open(
        &self,
        port: &str,
        settings: LineSettings,
        on_frame: FrameHandler,
    ) -> Result<Box<dyn PortHandle>, TransportError>;
}

/// An open port.  Owned exclusively by one [`DeviceLink`].
pub trait PortHandle: Send {
    fn name(&self) -> &str;

    /// Writes `bytes` and flushes them to the device.
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Stops frame delivery and releases the port.  Idempotent.
    fn close(&mut self);
}
