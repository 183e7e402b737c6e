//! The core, UI-agnostic library shared by the HoTT transmitter tools.
//!
//! `hott-util-core` is designed to be used by any front-end, whether it is a
//! command-line interface (like `hott-util`) or a graphical one. Long-running
//! operations report to a [`callback::Callback`], which the front-end
//! implements however it likes and which doubles as the cancellation switch.
//!
//! The library is structured into several modules:
//! - [`callback`]: The `Callback` trait and the console and no-op implementations.
//! - [`stream`]: Reader and writer decorators that report progress every KiB and
//!   abort on cancellation.
//! - [`dump`]: Hex dumps of byte and word buffers.
//! - [`version`]: Lookup of the latest published tool versions.
//! - [`program_dir`]: The directory the running program lives in.
//! - [`logging`]: Logger bootstrap.
//! - [`observable`]: Listener lists, observable properties and single assignment.
//! - [`config`]: Settings from the environment.
//!
//! ## Example: Copying a Stream with Progress Reporting
//!
//! ```rust,no_run
//! use hott_util_core::callback::{Callback, SimpleCallback};
//! use hott_util_core::stream::CallbackReader;
//! use hott_util_core::Error;
//! use std::fs::File;
//! use std::io::{self, BufReader};
//!
//! fn main() -> Result<(), Error> {
//!     let file = File::open("model.mdl")?;
//!     let len = file.metadata()?.len();
//!
//!     let callback = SimpleCallback::new();
//!     let mut reader = CallbackReader::new(Some(&callback), BufReader::new(file), Some(len));
//!
//!     // Another thread may call `callback.cancel()`; the copy then stops with
//!     // `Error::Cancelled` before the next byte.
//!     io::copy(&mut reader, &mut io::sink())?;
//!     callback.update_message("Done.");
//!
//!     Ok(())
//! }
//! ```

pub mod callback;
pub mod config;
pub mod dump;
pub mod error;
pub mod logging;
pub mod observable;
pub mod program_dir;
pub mod stream;
pub mod version;

pub use callback::{Callback, CallbackState, NoopCallback, SimpleCallback};
pub use config::Settings;
pub use error::{Error, Result};
pub use stream::{CallbackReader, CallbackWriter};
