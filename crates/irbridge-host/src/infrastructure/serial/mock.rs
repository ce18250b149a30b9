//! In-memory serial transport for tests.
//!
//! `LoopbackTransport` stands in for the `serialport` adapter.  Tests declare
//! which ports exist, push inbound chunks with [`LoopbackTransport::inject`]
//! (delivered synchronously on the calling thread, as the reader thread would),
//! and inspect what the host wrote with [`LoopbackTransport::written_text`].
//!
//! A port declared with [`LoopbackTransport::with_responsive_port`] behaves
//! like a live receiver: it sends `DEVICE_ACTIVE` right after being opened.
//!
//! ```ignore
//! let transport = LoopbackTransport::new().with_port("COM3");
//! let link = DeviceLink::open(&transport, "COM3", LineSettings::default())?;
//!
//! transport.inject("COM3", b"DEVICE_ACTIVE");
//!
//! assert!(link.is_connected());
//! assert_eq!(transport.written_text("COM3"), "CONNECTED\n");
//! ```

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex};
use std::thread;

use irbridge_core::HANDSHAKE_TOKEN;

use super::{FrameHandler, LineSettings, PortHandle, SerialTransport, TransportError};

type SharedHandler = Arc<Mutex<FrameHandler>>;

#[derive(Default)]
struct LoopbackState {
    ports: Vec<String>,
    responsive: HashSet<String>,
    handlers: HashMap<String, SharedHandler>,
    written: HashMap<String, Vec<u8>>,
    opened: Vec<(String, LineSettings)>,
    fail_writes: bool,
}

/// A transport whose ports exist only in memory.
///
/// Clones share the same ports, so a clone can be moved into a thread that
/// plays the receiver.
#[derive(Clone, Default)]
pub struct LoopbackTransport {
    state: Arc<Mutex<LoopbackState>>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a silent port.
    pub fn with_port(self, name: &str) -> Self {
        self.state.lock().unwrap().ports.push(name.to_string());
        self
    }

    /// Adds a port that sends the handshake token as soon as it is opened.
    pub fn with_responsive_port(self, name: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.ports.push(name.to_string());
            state.responsive.insert(name.to_string());
        }
        self
    }

    /// Delivers `bytes` to the open port's frame handler on this thread.
    ///
    /// Returns `false` if the port is not open.
    pub fn inject(&self, port: &str, bytes: &[u8]) -> bool {
        // Release the state lock first: the handler writes back through it.
        let handler = self.state.lock().unwrap().handlers.get(port).cloned();
        match handler {
            Some(handler) => {
                let mut on_frame = handler.lock().unwrap();
                (*on_frame)(bytes);
                true
            }
            None => false,
        }
    }

    /// Everything written to `port` so far, lossily decoded.
    pub fn written_text(&self, port: &str) -> String {
        let state = self.state.lock().unwrap();
        state
            .written
            .get(port)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default()
    }

    pub fn is_open(&self, port: &str) -> bool {
        self.state.lock().unwrap().handlers.contains_key(port)
    }

    /// Ports opened so far, in order, with the settings they were opened with.
    pub fn open_history(&self) -> Vec<(String, LineSettings)> {
        self.state.lock().unwrap().opened.clone()
    }

    /// Makes every subsequent write fail with a broken-pipe error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_writes = fail;
    }
}

impl SerialTransport for LoopbackTransport {
    fn list_ports(&self) -> Result<Vec<String>, TransportError> {
        Ok(self.state.lock().unwrap().ports.clone())
    }

    fn open(
        &self,
        port: &str,
        settings: LineSettings,
        on_frame: FrameHandler,
    ) -> Result<Box<dyn PortHandle>, TransportError> {
        let responsive = {
            let mut state = self.state.lock().unwrap();
            if !state.ports.iter().any(|p| p == port) {
                return Err(TransportError::PortNotFound(port.to_string()));
            }
            state
                .handlers
                .insert(port.to_string(), Arc::new(Mutex::new(on_frame)));
            state.opened.push((port.to_string(), settings));
            state.responsive.contains(port)
        };

        if responsive {
            // Like real hardware, the greeting arrives on another thread.
            let transport = self.clone();
            let name = port.to_string();
            thread::spawn(move || {
                transport.inject(&name, HANDSHAKE_TOKEN.as_bytes());
            });
        }

        Ok(Box::new(LoopbackHandle {
            name: port.to_string(),
            state: Arc::clone(&self.state),
        }))
    }
}

struct LoopbackHandle {
    name: String,
    state: Arc<Mutex<LoopbackState>>,
}

impl PortHandle for LoopbackHandle {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        if !state.handlers.contains_key(&self.name) {
            return Err(TransportError::Closed);
        }
        if state.fail_writes {
            return Err(TransportError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "loopback write failure",
            )));
        }
        state
            .written
            .entry(self.name.clone())
            .or_default()
            .extend_from_slice(bytes);
        Ok(())
    }

    fn close(&mut self) {
        self.state.lock().unwrap().handlers.remove(&self.name);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
