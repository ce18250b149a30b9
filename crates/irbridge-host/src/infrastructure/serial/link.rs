//! `DeviceLink`: the protocol state machine for one open receiver port.
//!
//! # Threads
//!
//! Frames arrive on the transport's reader thread through
//! [`DeviceLink::on_frame`]; everything else is called from the control
//! thread.  Each piece of state has a single writer:
//!
//! | Field          | Written by                                   |
//! |----------------|----------------------------------------------|
//! | `connected`    | reader thread (handshake), never cleared     |
//! | `capture_mode` | control thread sets it, reader thread clears it |
//! | `suppress_until_ms` | control thread                          |
//! | `closed`       | whoever calls `close` first                  |
//!
//! The captured code lives behind its own mutex, which doubles as the lock
//! for the condition variable that every bounded wait sleeps on.  Whoever
//! changes a waited-on flag takes that lock before notifying, so a wake-up can
//! never slip in between a waiter's check and its sleep.
//!
//! # Frame handling
//!
//! ```text
//! closed?                     → ignore
//! inside suppression window?  → discard
//! == DEVICE_ACTIVE            → reply CONNECTED, mark connected
//! capture mode on?            → store as captured code, reply BEEP
//! otherwise                   → broadcast to listeners in attach order
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use irbridge_core::{decode_frame, Melody, OutboundCommand, HANDSHAKE_TOKEN};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use super::{FrameHandler, LineSettings, PortHandle, SerialTransport, TransportError};

/// Error type for link operations.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The receiver never sent its handshake token.
    #[error("no handshake from the receiver on {port} within {timeout:?}")]
    ConnectionTimeout { port: String, timeout: Duration },

    /// Capture mode was entered but no button was pressed in time.
    #[error("no button press captured within {0:?}")]
    CaptureTimeout(Duration),

    /// The link was closed, possibly while an operation was waiting.
    #[error("the receiver link is closed")]
    Closed,
}

/// Receives button codes that are neither handshakes nor captures.
///
/// Called on the transport's reader thread; implementations must not block
/// for long and must not call back into the link's wait operations.
pub trait ButtonListener: Send + Sync {
    fn on_button_pressed(&self, code: &str);
}

type ListenerList = Arc<Vec<Arc<dyn ButtonListener>>>;

/// One open connection to the IR receiver.
pub struct DeviceLink {
    port_name: String,
    port: Mutex<Option<Box<dyn PortHandle>>>,
    epoch: Instant,
    connected: AtomicBool,
    capture_mode: AtomicBool,
    closed: AtomicBool,
    /// Milliseconds since `epoch`; frames before this instant are discarded.
    suppress_until_ms: AtomicU64,
    captured: Mutex<Option<String>>,
    state_changed: Condvar,
    listeners: Mutex<ListenerList>,
}

impl DeviceLink {
    /// Opens `port` through `transport` and starts processing frames.
    ///
    /// Returns immediately; use [`DeviceLink::wait_for_connection`] to wait for
    /// the receiver's handshake.
    ///
    /// # Errors
    ///
    /// [`LinkError::Transport`] if the port cannot be opened.
    pub fn open(
        transport: &dyn SerialTransport,
        port: &str,
        settings: LineSettings,
    ) -> Result<Arc<Self>, LinkError> {
        let link = Arc::new(Self::unopened(port));
        let weak = Arc::downgrade(&link);
        let handler: FrameHandler = Box::new(move |bytes: &[u8]| {
            if let Some(link) = weak.upgrade() {
                link.on_frame(bytes);
            }
        });

        // A frame that arrives before the handle is stored blocks on this
        // lock instead of finding an empty slot.
        let mut slot = link.port_slot();
        *slot = Some(transport.open(port, settings, handler)?);
        drop(slot);

        debug!(port, baud = settings.baud_rate, "serial port opened");
        Ok(link)
    }

    fn unopened(port: &str) -> Self {
        Self {
            port_name: port.to_string(),
            port: Mutex::new(None),
            epoch: Instant::now(),
            connected: AtomicBool::new(false),
            capture_mode: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            suppress_until_ms: AtomicU64::new(0),
            captured: Mutex::new(None),
            state_changed: Condvar::new(),
            listeners: Mutex::new(Arc::new(Vec::new())),
        }
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// `true` once a handshake has been processed.  Never reverts.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn is_capture_mode(&self) -> bool {
        self.capture_mode.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    // ── Frame processing ──────────────────────────────────────────────────────

    /// Processes one received chunk.  Called by the transport's reader thread.
    pub fn on_frame(&self, bytes: &[u8]) {
        self.on_frame_at(bytes, Instant::now());
    }

    /// Processes one received chunk as if it arrived at `now`.
    pub fn on_frame_at(&self, bytes: &[u8], now: Instant) {
        if self.is_closed() {
            return;
        }
        let frame = decode_frame(bytes);

        if self.millis_at(now) < self.suppress_until_ms.load(Ordering::Acquire) {
            trace!(frame = %frame, "frame suppressed");
            return;
        }

        if frame == HANDSHAKE_TOKEN {
            if let Err(e) = self.send_handshake_ack() {
                warn!(port = %self.port_name, error = %e, "failed to acknowledge handshake");
            }
            if !self.connected.swap(true, Ordering::AcqRel) {
                info!(port = %self.port_name, "receiver connected");
                self.wake_waiters();
            }
            return;
        }

        if self.try_capture(&frame) {
            debug!(code = %frame, "button code captured");
            if let Err(e) = self.send_tone_beep() {
                warn!(port = %self.port_name, error = %e, "failed to send capture tone");
            }
            return;
        }

        let listeners = Arc::clone(&self.listener_list());
        trace!(code = %frame, listeners = listeners.len(), "button pressed");
        for listener in listeners.iter() {
            listener.on_button_pressed(&frame);
        }
    }

    fn try_capture(&self, frame: &str) -> bool {
        if !self.is_capture_mode() {
            return false;
        }
        let mut slot = self.captured_slot();
        if !self.capture_mode.swap(false, Ordering::AcqRel) {
            return false;
        }
        *slot = Some(frame.to_string());
        drop(slot);
        self.state_changed.notify_all();
        true
    }

    // ── Capture ───────────────────────────────────────────────────────────────

    /// Routes the next non-handshake frame into the capture slot instead of
    /// the listeners.  Any previously captured code is discarded.
    pub fn enter_capture_mode(&self) {
        let mut slot = self.captured_slot();
        *slot = None;
        self.capture_mode.store(true, Ordering::Release);
    }

    /// Returns the captured code once capture mode has cleared.
    ///
    /// Returns `None` while still waiting for a press, or if the code was
    /// already taken.
    pub fn take_captured_code(&self) -> Option<String> {
        if self.is_capture_mode() {
            return None;
        }
        self.captured_slot().take()
    }

    /// Waits up to `timeout` for a capture started with
    /// [`DeviceLink::enter_capture_mode`] to complete.
    ///
    /// Capture mode is left off whatever the outcome.
    ///
    /// # Errors
    ///
    /// [`LinkError::Closed`] if the link is closed before or during the wait,
    /// [`LinkError::CaptureTimeout`] if no code arrives in time.
    pub fn wait_for_capture(&self, timeout: Duration) -> Result<String, LinkError> {
        let slot = self.captured_slot();
        let (mut slot, _) = self
            .state_changed
            .wait_timeout_while(slot, timeout, |code| code.is_none() && !self.is_closed())
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(code) = slot.take() {
            return Ok(code);
        }
        self.capture_mode.store(false, Ordering::Release);
        drop(slot);

        if self.is_closed() {
            Err(LinkError::Closed)
        } else {
            Err(LinkError::CaptureTimeout(timeout))
        }
    }

    /// Leaves capture mode without a result.
    pub fn cancel_capture(&self) {
        let mut slot = self.captured_slot();
        self.capture_mode.store(false, Ordering::Release);
        *slot = None;
    }

    /// Waits up to `timeout` for the receiver's handshake.
    ///
    /// # Errors
    ///
    /// [`LinkError::Closed`] if the link closes first,
    /// [`LinkError::ConnectionTimeout`] if no handshake arrives in time.
    pub fn wait_for_connection(&self, timeout: Duration) -> Result<(), LinkError> {
        let guard = self.captured_slot();
        let (guard, _) = self
            .state_changed
            .wait_timeout_while(guard, timeout, |_| {
                !self.is_connected() && !self.is_closed()
            })
            .unwrap_or_else(PoisonError::into_inner);
        drop(guard);

        if self.is_connected() {
            Ok(())
        } else if self.is_closed() {
            Err(LinkError::Closed)
        } else {
            Err(LinkError::ConnectionTimeout {
                port: self.port_name.clone(),
                timeout,
            })
        }
    }

    // ── Suppression ───────────────────────────────────────────────────────────

    /// Discards every frame that arrives within `window` from now.
    pub fn suppress_for(&self, window: Duration) {
        self.suppress_until(Instant::now() + window);
    }

    /// Discards every frame that arrives before `deadline`.
    pub fn suppress_until(&self, deadline: Instant) {
        self.suppress_until_ms
            .store(self.millis_at(deadline), Ordering::Release);
    }

    pub fn clear_suppression(&self) {
        self.suppress_until_ms.store(0, Ordering::Release);
    }

    fn millis_at(&self, at: Instant) -> u64 {
        let elapsed = at.saturating_duration_since(self.epoch);
        u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
    }

    // ── Outbound commands ─────────────────────────────────────────────────────

    /// Replies to a handshake with `CONNECTED`.
    ///
    /// # Errors
    ///
    /// [`LinkError::Closed`] after close, [`LinkError::Transport`] if the write
    /// fails.  A failed write never changes link state.
    pub fn send_handshake_ack(&self) -> Result<(), LinkError> {
        self.send(OutboundCommand::HandshakeAck)
    }

    /// Plays the receiver's built-in tone.  Errors as for
    /// [`DeviceLink::send_handshake_ack`].
    pub fn send_tone_beep(&self) -> Result<(), LinkError> {
        self.send(OutboundCommand::Beep)
    }

    /// Plays `melody` on the receiver.  Errors as for
    /// [`DeviceLink::send_handshake_ack`].
    pub fn send_melody(&self, melody: &Melody) -> Result<(), LinkError> {
        self.send(OutboundCommand::Play(melody.clone()))
    }

    fn send(&self, command: OutboundCommand) -> Result<(), LinkError> {
        let mut slot = self.port_slot();
        let handle = slot.as_mut().ok_or(LinkError::Closed)?;
        handle.write(&command.encode())?;
        trace!(?command, "command sent");
        Ok(())
    }

    // ── Listeners ─────────────────────────────────────────────────────────────

    /// Registers `listener` for button presses.
    ///
    /// Attaching a listener that is already registered moves it to the end of
    /// the notification order instead of registering it twice.
    pub fn attach(&self, listener: Arc<dyn ButtonListener>) {
        let mut list = self.listener_list();
        let mut next: Vec<_> = list
            .iter()
            .filter(|l| !same_listener(l, &listener))
            .cloned()
            .collect();
        next.push(listener);
        *list = Arc::new(next);
    }

    /// Unregisters `listener`.  Does nothing if it is not registered.
    pub fn detach(&self, listener: &Arc<dyn ButtonListener>) {
        let mut list = self.listener_list();
        if list.iter().any(|l| same_listener(l, listener)) {
            let next = list
                .iter()
                .filter(|l| !same_listener(l, listener))
                .cloned()
                .collect();
            *list = Arc::new(next);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listener_list().len()
    }

    // ── Shutdown ──────────────────────────────────────────────────────────────

    /// Releases the port and wakes every pending wait.  Idempotent.
    ///
    /// Frames that arrive afterwards are ignored.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(mut handle) = self.port_slot().take() {
            handle.close();
        }
        self.capture_mode.store(false, Ordering::Release);
        self.wake_waiters();
        info!(port = %self.port_name, "receiver link closed");
    }

    fn wake_waiters(&self) {
        drop(self.captured_slot());
        self.state_changed.notify_all();
    }

    // ── Lock helpers ──────────────────────────────────────────────────────────

    fn port_slot(&self) -> MutexGuard<'_, Option<Box<dyn PortHandle>>> {
        self.port.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn captured_slot(&self) -> MutexGuard<'_, Option<String>> {
        self.captured.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn listener_list(&self) -> MutexGuard<'_, ListenerList> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for DeviceLink {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for DeviceLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceLink")
            .field("port", &self.port_name)
            .field("connected", &self.is_connected())
            .field("capture_mode", &self.is_capture_mode())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

fn same_listener(a: &Arc<dyn ButtonListener>, b: &Arc<dyn ButtonListener>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::serial::LoopbackTransport;
    use std::thread;

    const PORT: &str = "COM7";

    #[derive(Default)]
    struct Recorder {
        codes: Mutex<Vec<String>>,
    }

    impl ButtonListener for Recorder {
        fn on_button_pressed(&self, code: &str) {
            self.codes.lock().unwrap().push(code.to_string());
        }
    }

    impl Recorder {
        fn codes(&self) -> Vec<String> {
            self.codes.lock().unwrap().clone()
        }
    }

    /// Appends `tag:code` to a shared log so ordering across listeners is visible.
    struct Tagged {
        tag: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl ButtonListener for Tagged {
        fn on_button_pressed(&self, code: &str) {
            self.log.lock().unwrap().push(format!("{}:{code}", self.tag));
        }
    }

    fn open_link() -> (LoopbackTransport, Arc<DeviceLink>) {
        let transport = LoopbackTransport::new().with_port(PORT);
        let link = DeviceLink::open(&transport, PORT, LineSettings::default()).unwrap();
        (transport, link)
    }

    // ── Handshake ─────────────────────────────────────────────────────────────

    #[test]
    fn test_handshake_marks_connected_and_acknowledges() {
        // Arrange
        let (transport, link) = open_link();
        assert!(!link.is_connected());

        // Act
        transport.inject(PORT, b"DEVICE_ACTIVE");

        // Assert
        assert!(link.is_connected());
        assert_eq!(transport.written_text(PORT), "CONNECTED\n");
    }

    #[test]
    fn test_repeated_handshake_is_acknowledged_each_time() {
        let (transport, link) = open_link();

        transport.inject(PORT, b"DEVICE_ACTIVE");
        transport.inject(PORT, b"DEVICE_ACTIVE");

        assert!(link.is_connected());
        assert_eq!(transport.written_text(PORT), "CONNECTED\nCONNECTED\n");
    }

    #[test]
    fn test_handshake_token_with_terminator_is_a_button_code() {
        // Arrange
        let (transport, link) = open_link();
        let recorder = Arc::new(Recorder::default());
        link.attach(recorder.clone());

        // Act
        transport.inject(PORT, b"DEVICE_ACTIVE\r\n");

        // Assert
        assert!(!link.is_connected());
        assert_eq!(recorder.codes(), ["DEVICE_ACTIVE\r\n"]);
    }

    #[test]
    fn test_failed_ack_write_still_connects() {
        let (transport, link) = open_link();
        transport.set_fail_writes(true);

        transport.inject(PORT, b"DEVICE_ACTIVE");

        assert!(link.is_connected());
        assert!(transport.written_text(PORT).is_empty());
    }

    #[test]
    fn test_wait_for_connection_times_out_without_handshake() {
        let (_transport, link) = open_link();

        let result = link.wait_for_connection(Duration::from_millis(30));

        assert!(matches!(result, Err(LinkError::ConnectionTimeout { .. })));
    }

    #[test]
    fn test_wait_for_connection_wakes_on_handshake_from_reader_thread() {
        // Arrange
        let (transport, link) = open_link();
        let reader = transport.clone();

        // Act
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            reader.inject(PORT, b"DEVICE_ACTIVE");
        });
        let result = link.wait_for_connection(Duration::from_secs(5));
        handle.join().unwrap();

        // Assert
        assert!(result.is_ok());
    }

    // ── Capture ───────────────────────────────────────────────────────────────

    #[test]
    fn test_capture_records_code_beeps_and_skips_listeners() {
        // Arrange
        let (transport, link) = open_link();
        let recorder = Arc::new(Recorder::default());
        link.attach(recorder.clone());
        link.enter_capture_mode();

        // Act
        transport.inject(PORT, b"FF30CF");

        // Assert
        assert!(!link.is_capture_mode());
        assert_eq!(link.take_captured_code().as_deref(), Some("FF30CF"));
        assert_eq!(transport.written_text(PORT), "BEEP\n");
        assert!(recorder.codes().is_empty());
    }

    #[test]
    fn test_take_captured_code_is_none_while_waiting() {
        let (_transport, link) = open_link();
        link.enter_capture_mode();

        assert_eq!(link.take_captured_code(), None);
    }

    #[test]
    fn test_handshake_during_capture_does_not_complete_capture() {
        let (transport, link) = open_link();
        link.enter_capture_mode();

        transport.inject(PORT, b"DEVICE_ACTIVE");

        assert!(link.is_capture_mode());
        assert!(link.is_connected());
    }

    #[test]
    fn test_wait_for_capture_returns_code_from_reader_thread() {
        let (transport, link) = open_link();
        let reader = transport.clone();
        link.enter_capture_mode();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            reader.inject(PORT, b"A1B2");
        });
        let code = link.wait_for_capture(Duration::from_secs(5)).unwrap();
        handle.join().unwrap();

        assert_eq!(code, "A1B2");
    }

    #[test]
    fn test_wait_for_capture_timeout_leaves_capture_mode() {
        let (_transport, link) = open_link();
        link.enter_capture_mode();

        let result = link.wait_for_capture(Duration::from_millis(30));

        assert!(matches!(result, Err(LinkError::CaptureTimeout(_))));
        assert!(!link.is_capture_mode());
    }

    #[test]
    fn test_close_wakes_pending_capture_wait() {
        // Arrange
        let (_transport, link) = open_link();
        link.enter_capture_mode();
        let closer = Arc::clone(&link);

        // Act
        let started = Instant::now();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            closer.close();
        });
        let result = link.wait_for_capture(Duration::from_secs(30));
        handle.join().unwrap();

        // Assert
        assert!(matches!(result, Err(LinkError::Closed)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_cancel_capture_routes_frames_to_listeners_again() {
        let (transport, link) = open_link();
        let recorder = Arc::new(Recorder::default());
        link.attach(recorder.clone());
        link.enter_capture_mode();

        link.cancel_capture();
        transport.inject(PORT, b"C0DE");

        assert_eq!(link.take_captured_code(), None);
        assert_eq!(recorder.codes(), ["C0DE"]);
    }

    // ── Suppression ───────────────────────────────────────────────────────────

    #[test]
    fn test_suppressed_frame_is_discarded_and_deadline_frame_processed() {
        // Arrange
        let (_transport, link) = open_link();
        let recorder = Arc::new(Recorder::default());
        link.attach(recorder.clone());
        link.enter_capture_mode();
        let deadline = Instant::now() + Duration::from_millis(500);
        link.suppress_until(deadline);

        // Act – one frame just inside the window, one exactly at its end
        link.on_frame_at(b"EARLY", deadline - Duration::from_millis(1));
        let captured_early = link.take_captured_code();
        link.on_frame_at(b"ON_TIME", deadline);

        // Assert
        assert_eq!(captured_early, None);
        assert_eq!(link.take_captured_code().as_deref(), Some("ON_TIME"));
        assert!(recorder.codes().is_empty());
    }

    #[test]
    fn test_suppression_also_discards_handshake() {
        let (_transport, link) = open_link();
        link.suppress_for(Duration::from_secs(60));

        link.on_frame(b"DEVICE_ACTIVE");

        assert!(!link.is_connected());
    }

    #[test]
    fn test_clear_suppression_restores_processing() {
        let (transport, link) = open_link();
        let recorder = Arc::new(Recorder::default());
        link.attach(recorder.clone());
        link.suppress_for(Duration::from_secs(60));

        transport.inject(PORT, b"DROPPED");
        link.clear_suppression();
        transport.inject(PORT, b"KEPT");

        assert_eq!(recorder.codes(), ["KEPT"]);
    }

    // ── Listeners ─────────────────────────────────────────────────────────────

    #[test]
    fn test_listeners_notified_in_attach_order() {
        // Arrange
        let (transport, link) = open_link();
        let log = Arc::new(Mutex::new(Vec::new()));
        link.attach(Arc::new(Tagged {
            tag: "first",
            log: Arc::clone(&log),
        }));
        link.attach(Arc::new(Tagged {
            tag: "second",
            log: Arc::clone(&log),
        }));

        // Act
        transport.inject(PORT, b"FF30CF");

        // Assert
        assert_eq!(*log.lock().unwrap(), ["first:FF30CF", "second:FF30CF"]);
    }

    #[test]
    fn test_attach_same_listener_twice_registers_once() {
        let (transport, link) = open_link();
        let recorder = Arc::new(Recorder::default());

        link.attach(recorder.clone());
        link.attach(recorder.clone());
        transport.inject(PORT, b"FF30CF");

        assert_eq!(link.listener_count(), 1);
        assert_eq!(recorder.codes().len(), 1);
    }

    #[test]
    fn test_detach_stops_notifications_and_absent_detach_is_noop() {
        let (transport, link) = open_link();
        let recorder = Arc::new(Recorder::default());
        let listener: Arc<dyn ButtonListener> = recorder.clone();
        let stranger: Arc<dyn ButtonListener> = Arc::new(Recorder::default());
        link.attach(Arc::clone(&listener));

        link.detach(&stranger);
        assert_eq!(link.listener_count(), 1);
        link.detach(&listener);
        transport.inject(PORT, b"FF30CF");

        assert_eq!(link.listener_count(), 0);
        assert!(recorder.codes().is_empty());
    }

    // ── Close ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_close_releases_port_and_ignores_later_frames() {
        // Arrange
        let (transport, link) = open_link();
        let recorder = Arc::new(Recorder::default());
        link.attach(recorder.clone());

        // Act
        link.close();
        link.on_frame(b"DEVICE_ACTIVE");
        link.on_frame(b"FF30CF");

        // Assert
        assert!(!transport.is_open(PORT));
        assert!(!link.is_connected());
        assert!(recorder.codes().is_empty());
        assert!(matches!(link.send_tone_beep(), Err(LinkError::Closed)));
    }

    #[test]
    fn test_dropping_link_closes_port() {
        let (transport, link) = open_link();
        assert!(transport.is_open(PORT));

        drop(link);

        assert!(!transport.is_open(PORT));
    }

    #[test]
    fn test_send_melody_writes_play_command() {
        let (transport, link) = open_link();

        link.send_melody(&Melody::success()).unwrap();

        assert_eq!(
            transport.written_text(PORT),
            "PLAY:(1,0)@2#659,82%784,82%!\n"
        );
    }

    #[test]
    fn test_open_unknown_port_fails() {
        let transport = LoopbackTransport::new().with_port(PORT);

        let result = DeviceLink::open(&transport, "COM99", LineSettings::default());

        assert!(matches!(
            result,
            Err(LinkError::Transport(TransportError::PortNotFound(_)))
        ));
    }
}
