//! The `termkeys` input monitor

use crate::keymap_file::load_keymap;
use crate::terminal_guard::TerminalGuard;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use termkeys_input::{
    Clock, DispatchOutcome, Handlers, InputSource, Keyboard, KeyboardConfig, MouseProtocol,
};
use termkeys_keymap::{key_name, Key, KeyTable};
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Keys that end the monitor: `q` and Ctrl+C (raw mode delivers it as a key)
pub const QUIT_KEYS: [Key; 2] = [Key::from_char('q'), Key::from_code(0x03)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "termkeys - print decoded terminal keys and mouse reports")]
pub struct Args {
    /// Enable mouse reporting and decode mouse reports
    #[arg(short, long)]
    pub mouse: bool,

    /// Report bytes of multi-byte characters one at a time
    #[arg(long)]
    pub no_utf8: bool,

    /// Time in milliseconds after which an escape prefix counts as complete
    #[arg(long, default_value = "100")]
    pub key_timeout: u64,

    /// Time in milliseconds to wait for input per loop iteration
    #[arg(long, default_value = "100")]
    pub poll_interval: u64,

    /// Terminal type used for key correction (defaults to $TERM)
    #[arg(long)]
    pub term: Option<String>,

    /// Extra key sequences, one `Name = capability` line each
    #[arg(long)]
    pub keymap: Option<PathBuf>,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Write logs to this file (logging is disabled otherwise)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    pub fn keyboard_config(&self) -> KeyboardConfig {
        let defaults = KeyboardConfig::from_env();
        KeyboardConfig {
            key_timeout: Duration::from_millis(self.key_timeout),
            read_blocking_time: Duration::from_millis(self.poll_interval),
            utf8_input: !self.no_utf8,
            mouse_support: self.mouse,
            term_type: self.term.clone().or(defaults.term_type.clone()),
            ..defaults
        }
    }
}

/// What the decoder thread hands to the printer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    Key(Key),
    Escape,
    Mouse { protocol: MouseProtocol, bytes: Vec<u8> },
}

impl MonitorEvent {
    pub fn describe(&self) -> String {
        match self {
            MonitorEvent::Key(key) => {
                format!("key    {:<24} {:#010x}", display_name(*key), key.code())
            }
            MonitorEvent::Escape => format!("key    {:<24} {:#010x}", "Esc", Key::ESCAPE.code()),
            MonitorEvent::Mouse { protocol, bytes } => {
                format!("mouse  {:<24} {}", key_name(protocol.key()), bytes.escape_ascii())
            }
        }
    }
}

fn display_name(key: Key) -> String {
    let name = key_name(key);
    if !name.is_empty() {
        return name;
    }
    match key.as_char() {
        Some(c) if !c.is_control() => c.to_string(),
        _ => "(unnamed)".to_string(),
    }
}

/// Handlers that forward decoded input over `events` and raise `stop` when
/// a quit key is pressed
pub fn forwarding_handlers(
    events: mpsc::UnboundedSender<MonitorEvent>,
    stop: Arc<AtomicBool>,
) -> Handlers {
    let pressed = events.clone();
    let escape = events.clone();
    let mouse = events;
    let quit = Arc::clone(&stop);

    Handlers::new()
        .on_key_pressed(move |key| {
            if QUIT_KEYS.contains(&key) {
                quit.store(true, Ordering::Relaxed);
            }
            let _ = pressed.send(MonitorEvent::Key(key));
        })
        .on_escape(move || {
            let _ = escape.send(MonitorEvent::Escape);
        })
        .on_mouse_report(move |report| {
            let _ = mouse.send(MonitorEvent::Mouse {
                protocol: report.protocol(),
                bytes: report.bytes().to_vec(),
            });
        })
        .stop_when(move || stop.load(Ordering::Relaxed))
}

/// Drive the decoder until `stop` is raised or the input ends
pub fn run_decoder<S: InputSource, C: Clock>(
    keyboard: &mut Keyboard<S, C>,
    stop: &AtomicBool,
    wait: Duration,
) {
    while !stop.load(Ordering::Relaxed) {
        match keyboard.poll_events(wait) {
            DispatchOutcome::Drained => {}
            DispatchOutcome::Stopped => {
                debug!("Dispatch stopped by quit key");
                break;
            }
            DispatchOutcome::Closed => {
                info!("Terminal input closed");
                break;
            }
        }
    }
}

fn init_logging(args: &Args) -> Result<()> {
    let Some(path) = &args.log_file else {
        return Ok(());
    };

    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    let level = tracing::Level::from(args.log_level);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string())),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn decode_stdin(
    config: KeyboardConfig,
    platform: Option<KeyTable>,
    events: mpsc::UnboundedSender<MonitorEvent>,
    stop: Arc<AtomicBool>,
) -> Result<()> {
    let wait = config.read_blocking_time;
    let mut keyboard = Keyboard::stdin(config).context("Failed to open terminal input")?;
    keyboard.set_platform_table(platform);
    keyboard.set_handlers(forwarding_handlers(events, Arc::clone(&stop)));

    run_decoder(&mut keyboard, &stop, wait);
    Ok(())
}

pub async fn run() -> Result<()> {
    run_with(Args::parse()).await
}

pub async fn run_with(args: Args) -> Result<()> {
    init_logging(&args)?;

    let config = args.keyboard_config();
    let platform = args.keymap.as_deref().map(load_keymap).transpose()?;
    info!(
        "Starting monitor (term {:?}, mouse {}, utf8 {})",
        config.term_type, config.mouse_support, config.utf8_input
    );

    let mut guard = TerminalGuard::acquire()?;
    guard.enable_raw_mode()?;
    if args.mouse {
        guard.enable_mouse_capture()?;
    }

    let mut stdout = io::stdout();
    write!(stdout, "Press keys to see their names, q or Ctrl+C to quit\r\n")?;
    stdout.flush()?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<MonitorEvent>();
    let stop = Arc::new(AtomicBool::new(false));

    let decoder = tokio::task::spawn_blocking({
        let stop = Arc::clone(&stop);
        move || decode_stdin(config, platform, event_tx, stop)
    });

    while let Some(event) = event_rx.recv().await {
        write!(stdout, "{}\r\n", event.describe())?;
        stdout.flush()?;
    }

    let result = decoder.await.context("Decoder task failed")?;
    guard.disable_mouse_capture()?;
    guard.disable_raw_mode()?;
    info!("Monitor stopped");

    result
}
