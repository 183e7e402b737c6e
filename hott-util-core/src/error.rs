//! Error types for `hott-util-core`.

use thiserror::Error;

use crate::stream;

/// Result type used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the library.
///
/// Transfer-layer failures surface as [`Error::Cancelled`] or [`Error::Io`]
/// so a front-end can tell a user abort apart from a broken stream.
#[derive(Error, Debug)]
pub enum Error {
    /// The operation was cancelled through its [`Callback`](crate::callback::Callback).
    #[error("Operation cancelled by user")]
    Cancelled,

    /// I/O errors from the wrapped stream or the filesystem.
    #[error("I/O error: {0}")]
    Io(std::io::Error),

    /// Fetching a remote document failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A single-assignment value was read before it was set.
    #[error("Value has not been assigned yet")]
    Unassigned,

    /// A single-assignment value was set twice.
    #[error("Value {name} was already assigned")]
    AlreadyAssigned { name: String },

    /// The directory of the running program could not be determined.
    #[error("Cannot determine program directory: {0}")]
    ProgramDir(String),
}

impl Error {
    /// Returns `true` if this error is a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        if stream::is_cancellation(&err) {
            Self::Cancelled
        } else {
            Self::Io(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_cancellation_io_error_maps_to_cancelled() {
        let err: Error = stream::cancelled_error().into();
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_plain_io_error_stays_io() {
        let err: Error = io::Error::new(io::ErrorKind::UnexpectedEof, "eof").into();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));
        assert!(!err.is_cancelled());
    }
}
