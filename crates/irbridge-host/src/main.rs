//! IR remote bridge entry point.
//!
//! Loads settings and bindings, finds the receiver, wires button presses to
//! the input injector, then runs the console command loop.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_settings() + CLI overrides, defaults written on first run
//!  └─ BindingsFile::open()            -- bindings.ini → BindingStore
//!  └─ connect()                       -- port scan, blocking task
//!  └─ DeviceLink::attach(dispatcher)  -- presses → ButtonDispatcher → injector
//!  └─ Session::run()                  -- console loop, blocking task
//! ```
//!
//! Both blocking phases race against Ctrl-C.  The console thread may be
//! parked in a stdin read that cannot be interrupted, so after cleanup an
//! interrupted run leaves through `std::process::exit`.

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, RwLock,
};

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use irbridge_core::{Melody, VirtualKeyNames};
use irbridge_host::application::{
    connect::connect,
    dispatch::ButtonDispatcher,
    session::Session,
};
use irbridge_host::infrastructure::{
    console::StdioPrompter,
    input_injection::platform_injector,
    serial::{ButtonListener, SerialPortTransport, SerialTransport},
    storage::{
        settings::{load_settings, settings_file_path, write_default_settings_if_missing},
        BindingsFile, HostSettings, StorageError,
    },
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Bridges an IR remote receiver on a serial port to keyboard and mouse input.
#[derive(Debug, Parser)]
#[command(
    name = "irbridge",
    about = "Bind IR remote buttons to keyboard and mouse actions",
    version
)]
struct Cli {
    /// Serial port of the receiver (e.g. COM3 or /dev/ttyUSB0).
    ///
    /// Skips the port scan and probes only this port.
    #[arg(long, env = "IRBRIDGE_PORT")]
    port: Option<String>,

    /// Bindings file; overrides the settings file.
    #[arg(long, env = "IRBRIDGE_BINDINGS")]
    bindings: Option<PathBuf>,

    /// Settings file; defaults to settings.toml in the platform config directory.
    #[arg(long, env = "IRBRIDGE_SETTINGS")]
    settings: Option<PathBuf>,

    /// How long each port gets to send its handshake, in milliseconds.
    #[arg(long, env = "IRBRIDGE_CONNECT_TIMEOUT_MS")]
    connect_timeout_ms: Option<u64>,

    /// Full port scans before giving up; 0 scans until interrupted.
    #[arg(long, env = "IRBRIDGE_MAX_SCAN_ROUNDS")]
    max_scan_rounds: Option<u32>,

    /// Log actions instead of injecting input.
    #[arg(long, env = "IRBRIDGE_DRY_RUN")]
    dry_run: bool,

    /// Print the available serial ports and exit.
    #[arg(long)]
    list_ports: bool,
}

impl Cli {
    fn settings_path(&self) -> Result<PathBuf, StorageError> {
        match &self.settings {
            Some(path) => Ok(path.clone()),
            None => settings_file_path(),
        }
    }

    /// Applies command-line overrides on top of the loaded settings.
    fn apply_to(&self, settings: &mut HostSettings) {
        if let Some(path) = &self.bindings {
            settings.general.bindings_file = Some(path.clone());
        }
        if let Some(ms) = self.connect_timeout_ms {
            settings.serial.connect_timeout_ms = ms;
        }
        if let Some(rounds) = self.max_scan_rounds {
            settings.serial.max_scan_rounds = rounds;
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings_path = cli.settings_path()?;
    let mut settings = load_settings(&settings_path)
        .with_context(|| format!("failed to load settings from {}", settings_path.display()))?;
    cli.apply_to(&mut settings);

    // `RUST_LOG` wins over the settings file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.general.log_level)),
        )
        .init();

    if let Err(e) = write_default_settings_if_missing(&settings_path) {
        warn!(error = %e, "could not write default settings");
    }

    let transport = SerialPortTransport::new();
    if cli.list_ports {
        for port in transport.list_ports().context("failed to list serial ports")? {
            println!("{port}");
        }
        return Ok(());
    }

    info!("IR remote bridge starting");

    // ── Bindings ──────────────────────────────────────────────────────────────
    let bindings_path = settings.bindings_path()?;
    let (file, store) = BindingsFile::open(&bindings_path)
        .with_context(|| format!("failed to open bindings file {}", bindings_path.display()))?;
    let bindings = Arc::new(RwLock::new(store));

    let injector = platform_injector(cli.dry_run);
    let running = Arc::new(AtomicBool::new(true));

    // ── Connect ───────────────────────────────────────────────────────────────
    let mut connect_task = {
        let running = Arc::clone(&running);
        let port = cli.port.clone();
        let line = settings.serial.line_settings();
        let policy = settings.serial.connect_policy();
        tokio::task::spawn_blocking(move || {
            connect(&transport, line, port.as_deref(), &policy, &running)
        })
    };

    let link = tokio::select! {
        joined = &mut connect_task => joined
            .context("connect task failed")?
            .context("could not find the IR receiver")?,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received while scanning");
            running.store(false, Ordering::Release);
            // The scan sees the flag within one handshake timeout.
            if let Ok(Ok(link)) = connect_task.await {
                link.close();
            }
            return Ok(());
        }
    };

    let dispatcher: Arc<dyn ButtonListener> =
        Arc::new(ButtonDispatcher::new(Arc::clone(&bindings), injector));
    link.attach(Arc::clone(&dispatcher));
    if let Err(e) = link.send_melody(&Melody::device_ready()) {
        warn!(error = %e, "failed to play ready tone");
    }
    info!(port = link.port_name(), "receiver ready");

    // ── Console loop ──────────────────────────────────────────────────────────
    let session_task = {
        let link = Arc::clone(&link);
        let bindings = Arc::clone(&bindings);
        let running = Arc::clone(&running);
        let options = settings.learn.learn_options();
        let mut file = file;
        tokio::task::spawn_blocking(move || {
            let keys = VirtualKeyNames::new();
            let mut session = Session {
                source: link.as_ref(),
                keys: &keys,
                bindings: bindings.as_ref(),
                file: &mut file,
                options,
            };
            session.run(&mut StdioPrompter::stdin(), &running)
        })
    };

    let interrupted = tokio::select! {
        ended = session_task => {
            match ended {
                Ok(end) => info!(?end, "console session ended"),
                Err(e) => error!("console task failed: {e}"),
            }
            false
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            running.store(false, Ordering::Release);
            true
        }
    };

    // Closing the link wakes a pending capture wait in the console thread.
    link.detach(&dispatcher);
    link.close();
    info!("IR remote bridge stopped");

    if interrupted {
        std::process::exit(0);
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
