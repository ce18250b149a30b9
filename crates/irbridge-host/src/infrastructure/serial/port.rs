//! `serialport`-backed transport.
//!
//! Each open port gets a reader thread that polls with a short timeout so it
//! notices a close request quickly.  Whatever one `read` returns is handed to
//! the frame handler as one chunk; chunks shorter than [`MIN_CHUNK_LEN`] are
//! stray line terminators from the firmware and are dropped here.

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serialport::{DataBits, Parity, SerialPort, StopBits};
use tracing::{debug, warn};

use super::{FrameHandler, LineSettings, PortHandle, SerialTransport, TransportError};

/// How long one blocking read waits before re-checking the stop flag.
const READ_POLL: Duration = Duration::from_millis(100);

/// Smallest chunk forwarded to the frame handler.
pub const MIN_CHUNK_LEN: usize = 2;

const READ_BUFFER_LEN: usize = 256;

/// Opens real serial ports through the `serialport` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialPortTransport;

impl SerialPortTransport {
    pub fn new() -> Self {
        Self
    }
}

impl SerialTransport for SerialPortTransport {
    fn list_ports(&self) -> Result<Vec<String>, TransportError> {
        let ports = serialport::available_ports().map_err(TransportError::Enumerate)?;
        Ok(ports.into_iter().map(|p| p.port_name).collect())
    }

    fn open(
        &self,
        port: &str,
        settings: LineSettings,
        on_frame: FrameHandler,
    ) -> Result<Box<dyn PortHandle>, TransportError> {
        let open_error = |source| TransportError::Open {
            port: port.to_string(),
            source,
        };

        let writer = serialport::new(port, settings.baud_rate)
            .data_bits(DataBits::Eight)
            .stop_bits(StopBits::One)
            .parity(Parity::None)
            .timeout(READ_POLL)
            .open()
            .map_err(open_error)?;
        let reader = writer.try_clone().map_err(open_error)?;

        let stop = Arc::new(AtomicBool::new(false));
        let reader_stop = Arc::clone(&stop);
        thread::Builder::new()
            .name(format!("serial-reader-{port}"))
            .spawn(move || read_loop(reader, reader_stop, on_frame))?;

        Ok(Box::new(SerialPortHandle {
            name: port.to_string(),
            port: writer,
            stop,
        }))
    }
}

fn read_loop(mut reader: Box<dyn SerialPort>, stop: Arc<AtomicBool>, mut on_frame: FrameHandler) {
    let mut buf = [0u8; READ_BUFFER_LEN];
    while !stop.load(Ordering::Acquire) {
        match reader.read(&mut buf) {
            Ok(n) if n >= MIN_CHUNK_LEN => on_frame(&buf[..n]),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {}
            Err(e) => {
                warn!(error = %e, "serial read failed, stopping reader");
                break;
            }
        }
    }
    debug!("serial reader stopped");
}

struct SerialPortHandle {
    name: String,
    port: Box<dyn SerialPort>,
    stop: Arc<AtomicBool>,
}

impl PortHandle for SerialPortHandle {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if self.stop.load(Ordering::Acquire) {
            return Err(TransportError::Closed);
        }
        self.port.write_all(bytes)?;
        self.port.flush()?;
        Ok(())
    }

    fn close(&mut self) {
        // The reader thread exits within one poll interval and drops its clone.
        self.stop.store(true, Ordering::Release);
    }
}

impl Drop for SerialPortHandle {
    fn drop(&mut self) {
        self.close();
    }
}
