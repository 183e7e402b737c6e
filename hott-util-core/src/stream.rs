//! Stream decorators that report progress and honor cancellation.
//!
//! [`CallbackReader`] and [`CallbackWriter`] wrap any [`Read`] or [`Write`]
//! and pass every byte through the same sequence:
//!
//! 1. If the callback has been cancelled, fail with a cancellation error. The
//!    byte is not transferred.
//! 2. If a total was given and the byte counter is a multiple of
//!    [`REPORT_INTERVAL`], report `(counter, total)` to the callback.
//! 3. Advance the counter and delegate the byte to the inner stream.
//!
//! Without a callback the decorators are plain pass-throughs. They do no
//! buffering of their own, so wrap an already buffered stream.
//!
//! When a buffered `read` or `write` fails after some bytes of the buffer were
//! already transferred, the call returns the partial count and the inner
//! error is held back for the next call, which returns it without touching
//! the inner stream again.
//!
//! ## Example
//!
//! ```rust
//! use hott_util_core::callback::NoopCallback;
//! use hott_util_core::stream::CallbackReader;
//! use std::io::{Cursor, Read};
//!
//! let data = vec![0u8; 4096];
//! let callback = NoopCallback::new();
//! let mut reader = CallbackReader::new(Some(&callback), Cursor::new(&data), Some(4096));
//!
//! let mut out = Vec::new();
//! reader.read_to_end(&mut out).unwrap();
//! assert_eq!(out.len(), 4096);
//! ```

use std::error::Error as StdError;
use std::fmt;
use std::io::{self, Read, Write};

use crate::callback::Callback;

/// Number of bytes between two progress reports.
pub const REPORT_INTERVAL: u64 = 1024;

/// Marker carried inside the [`io::Error`] produced on cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Operation cancelled by user")
    }
}

impl StdError for Cancelled {}

/// Builds the error returned when a transfer is cancelled.
///
/// The kind is [`io::ErrorKind::Other`]: `Interrupted` would make helpers like
/// `read_exact` retry forever.
pub fn cancelled_error() -> io::Error {
    io::Error::other(Cancelled)
}

/// Returns `true` if `err` was produced by a cancelled transfer.
pub fn is_cancellation(err: &io::Error) -> bool {
    err.get_ref()
        .is_some_and(|inner| inner.downcast_ref::<Cancelled>().is_some())
}

/// Per-byte bookkeeping shared by the reader and the writer.
struct Progress<'a> {
    callback: Option<&'a dyn Callback>,
    total: Option<u64>,
    counter: u64,
}

impl<'a> Progress<'a> {
    fn new(callback: Option<&'a dyn Callback>, total: Option<u64>) -> Self {
        Self {
            callback,
            total,
            counter: 0,
        }
    }

    /// Runs the cancellation check and the throttled report for the next byte.
    fn tick(&mut self) -> io::Result<()> {
        if let Some(callback) = self.callback {
            if callback.is_cancelled() {
                return Err(cancelled_error());
            }

            if let Some(total) = self.total {
                if self.counter % REPORT_INTERVAL == 0 {
                    callback.update_progress(self.counter, total);
                }
            }
        }

        self.counter += 1;
        Ok(())
    }
}

/// A [`Read`] adapter that checks a [`Callback`] before every byte.
pub struct CallbackReader<'a, R> {
    inner: R,
    progress: Progress<'a>,
    pending: Option<io::Error>,
}

impl<'a, R: Read> CallbackReader<'a, R> {
    /// Wraps `inner`. Progress is only reported when `total` is known.
    pub fn new(callback: Option<&'a dyn Callback>, inner: R, total: Option<u64>) -> Self {
        Self {
            inner,
            progress: Progress::new(callback, total),
            pending: None,
        }
    }

    /// Reads a single byte. Returns `Ok(None)` at end of stream.
    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if let Some(err) = self.pending.take() {
            return Err(err);
        }
        self.progress.tick()?;

        let mut byte = [0u8; 1];
        match self.inner.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    /// Keeps an inner failure for the next call. Cancellation is re-derived
    /// from the callback instead.
    fn hold_back(&mut self, err: io::Error) {
        if !is_cancellation(&err) {
            self.pending = Some(err);
        }
    }

    /// Number of single-byte transfers attempted so far.
    pub fn count(&self) -> u64 {
        self.progress.counter
    }

    /// The total given at construction.
    pub fn total(&self) -> Option<u64> {
        self.progress.total
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for CallbackReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        for (i, slot) in buf.iter_mut().enumerate() {
            match self.read_byte() {
                Ok(Some(byte)) => *slot = byte,
                Ok(None) => return Ok(i),
                Err(e) if i > 0 => {
                    self.hold_back(e);
                    return Ok(i);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(buf.len())
    }
}

/// A [`Write`] adapter that checks a [`Callback`] before every byte.
pub struct CallbackWriter<'a, W> {
    inner: W,
    progress: Progress<'a>,
    pending: Option<io::Error>,
}

impl<'a, W: Write> CallbackWriter<'a, W> {
    /// Wraps `inner`. Progress is only reported when `total` is known.
    pub fn new(callback: Option<&'a dyn Callback>, inner: W, total: Option<u64>) -> Self {
        Self {
            inner,
            progress: Progress::new(callback, total),
            pending: None,
        }
    }

    /// Writes a single byte.
    pub fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        if let Some(err) = self.pending.take() {
            return Err(err);
        }
        self.progress.tick()?;
        self.inner.write_all(&[byte])
    }

    /// Keeps an inner failure for the next call. Cancellation is re-derived
    /// from the callback instead.
    fn hold_back(&mut self, err: io::Error) {
        if !is_cancellation(&err) {
            self.pending = Some(err);
        }
    }

    /// Number of single-byte transfers attempted so far.
    pub fn count(&self) -> u64 {
        self.progress.counter
    }

    /// The total given at construction.
    pub fn total(&self) -> Option<u64> {
        self.progress.total
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CallbackWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for (i, &byte) in buf.iter().enumerate() {
            match self.write_byte(byte) {
                Ok(()) => {}
                Err(e) if i > 0 => {
                    self.hold_back(e);
                    return Ok(i);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
