//! RAII guard for terminal ownership while the monitor runs

use anyhow::{Context, Result};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::{execute, terminal};
use std::io;
use tracing::subscriber::NoSubscriber;
use tracing_subscriber::util::SubscriberInitExt;

/// Owns the terminal modes the monitor changes and restores them on drop.
///
/// If no log subscriber was installed yet, a no-op one is installed so that
/// nothing writes log lines into the raw-mode screen.
pub struct TerminalGuard {
    raw_mode_enabled: bool,
    mouse_capture_enabled: bool,
    // Terminal state is per process, keep the guard on one thread
    _marker: std::marker::PhantomData<*const ()>,
}

impl TerminalGuard {
    pub fn acquire() -> Result<Self> {
        let _ = NoSubscriber::default().try_init();

        Ok(Self {
            raw_mode_enabled: false,
            mouse_capture_enabled: false,
            _marker: std::marker::PhantomData,
        })
    }

    pub fn enable_raw_mode(&mut self) -> Result<()> {
        if !self.raw_mode_enabled {
            terminal::enable_raw_mode().context("Failed to enable raw mode")?;
            self.raw_mode_enabled = true;
        }
        Ok(())
    }

    pub fn disable_raw_mode(&mut self) -> Result<()> {
        if self.raw_mode_enabled {
            terminal::disable_raw_mode().context("Failed to disable raw mode")?;
            self.raw_mode_enabled = false;
        }
        Ok(())
    }

    /// Ask the terminal to send mouse reports
    pub fn enable_mouse_capture(&mut self) -> Result<()> {
        if !self.mouse_capture_enabled {
            execute!(io::stdout(), EnableMouseCapture).context("Failed to enable mouse capture")?;
            self.mouse_capture_enabled = true;
        }
        Ok(())
    }

    pub fn disable_mouse_capture(&mut self) -> Result<()> {
        if self.mouse_capture_enabled {
            execute!(io::stdout(), DisableMouseCapture).context("Failed to disable mouse capture")?;
            self.mouse_capture_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.mouse_capture_enabled {
            let _ = execute!(io::stdout(), DisableMouseCapture);
        }
        if self.raw_mode_enabled {
            let _ = terminal::disable_raw_mode();
        }
    }
}
