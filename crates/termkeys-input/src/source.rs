//! Byte sources the decoder reads from
//!
//! [`TtySource`] reads a terminal descriptor one byte at a time. Each read
//! switches the descriptor to non-blocking mode and restores the saved
//! status flags afterwards, so other users of the descriptor keep seeing it
//! in its previous mode.

use crate::InputError;
use nix::errno::Errno;
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use std::io;
use std::os::fd::{AsFd, AsRawFd, RawFd};
use std::time::Duration;

/// A byte-readable input the decoder does not own the lifecycle of
pub trait InputSource {
    /// Wait up to `timeout` for input to become readable, without
    /// consuming it.
    fn poll(&mut self, timeout: Duration) -> Result<bool, InputError>;

    /// Read a single byte without blocking. `None` means nothing is
    /// available right now, [`InputError::Closed`] that nothing ever will be.
    fn read_byte(&mut self) -> Result<Option<u8>, InputError>;
}

/// Terminal input backed by a file descriptor
#[derive(Debug)]
pub struct TtySource<F: AsFd> {
    fd: F,
    status_flags: OFlag,
}

impl TtySource<io::Stdin> {
    /// Read from the process's standard input
    pub fn stdin() -> Result<Self, InputError> {
        Self::new(io::stdin())
    }
}

impl<F: AsFd> TtySource<F> {
    /// Wrap a descriptor. Fails if its status flags cannot be queried, in
    /// which case the descriptor is unusable for decoding.
    pub fn new(fd: F) -> Result<Self, InputError> {
        let raw = fd.as_fd().as_raw_fd();
        let bits = fcntl(raw, FcntlArg::F_GETFL).map_err(InputError::StatusFlags)?;

        Ok(Self {
            fd,
            status_flags: OFlag::from_bits_truncate(bits),
        })
    }

    pub fn as_raw_fd(&self) -> RawFd {
        self.fd.as_fd().as_raw_fd()
    }

    pub fn get_ref(&self) -> &F {
        &self.fd
    }
}

impl<F: AsFd> InputSource for TtySource<F> {
    fn poll(&mut self, timeout: Duration) -> Result<bool, InputError> {
        let mut fds = [PollFd::new(self.fd.as_fd(), PollFlags::POLLIN)];
        let timeout = PollTimeout::try_from(poll_timeout_millis(timeout)).unwrap_or(PollTimeout::MAX);

        match poll(&mut fds, timeout) {
            Ok(0) => Ok(false),
            Ok(_) => Ok(fds[0]
                .revents()
                .is_some_and(|revents| revents.intersects(PollFlags::POLLIN | PollFlags::POLLHUP))),
            Err(Errno::EINTR) => Ok(false),
            Err(errno) => Err(InputError::Poll(errno)),
        }
    }

    fn read_byte(&mut self) -> Result<Option<u8>, InputError> {
        let raw = self.as_raw_fd();
        let _non_blocking = NonBlockingGuard::acquire(raw, self.status_flags)?;

        let mut byte = [0u8; 1];
        match nix::unistd::read(raw, &mut byte) {
            Ok(0) => Err(InputError::Closed),
            Ok(_) => Ok(Some(byte[0])),
            Err(Errno::EAGAIN | Errno::EINTR) => Ok(None),
            Err(errno) => Err(InputError::Io(io::Error::from(errno))),
        }
    }
}

/// Keeps a descriptor in non-blocking mode while alive
struct NonBlockingGuard {
    fd: RawFd,
    restore: OFlag,
}

impl NonBlockingGuard {
    fn acquire(fd: RawFd, restore: OFlag) -> Result<Self, InputError> {
        fcntl(fd, FcntlArg::F_SETFL(restore | OFlag::O_NONBLOCK)).map_err(InputError::NonBlocking)?;
        Ok(Self { fd, restore })
    }
}

impl Drop for NonBlockingGuard {
    fn drop(&mut self) {
        if let Err(e) = fcntl(self.fd, FcntlArg::F_SETFL(self.restore)) {
            tracing::warn!("Failed to restore input status flags: {}", e);
        }
    }
}

/// Milliseconds for `poll(2)`, rounded up so a short wait never becomes a
/// busy loop
fn poll_timeout_millis(timeout: Duration) -> i32 {
    let millis = (timeout.as_micros() + 999) / 1000;
    i32::try_from(millis).unwrap_or(i32::MAX)
}
