//! The callback capability used to report progress from long-running
//! operations and to cancel them.
//!
//! A [`Callback`] decouples an operation from whatever displays its progress.
//! The library ships two implementations: [`SimpleCallback`], which renders
//! everything to stdout, and [`NoopCallback`], which renders nothing. Both
//! keep their state in a [`CallbackState`], which other front-ends can embed
//! as well (the `hott-util` CLI does so for its terminal callback).
//!
//! Cancellation is cooperative: [`Callback::cancel`] only raises a flag, and
//! the running operation polls [`Callback::is_cancelled`] at its own pace.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Progress, message and prompt sink for a long-running operation.
///
/// All methods take `&self`. Implementations that record state do so through
/// interior mutability, which lets a signal handler cancel a callback that a
/// transfer is currently borrowing.
pub trait Callback {
    /// Shows a status message.
    fn update_message(&self, message: &str);

    /// Records overall progress. `done <= total` is not enforced.
    fn update_progress(&self, done: u64, total: u64);

    /// Records progress of the current sub-task.
    fn update_sub_progress(&self, done: u64, total: u64);

    /// Returns `true` once [`cancel`](Callback::cancel) has been called.
    fn is_cancelled(&self) -> bool;

    /// Requests cancellation. The flag never reverts; returns `true` to
    /// confirm the request was accepted.
    fn cancel(&self) -> bool;

    /// Shows a blocking warning. Returns `true` if the user accepted it.
    ///
    /// `buttons` optionally overrides the button labels; `default_button` is
    /// the index preselected (and used when nobody can answer).
    fn warning(
        &self,
        title: &str,
        message: &str,
        buttons: Option<&[&str]>,
        default_button: usize,
    ) -> bool;

    /// Asks a blocking yes/no question. Returns the user's choice.
    fn confirm(
        &self,
        title: &str,
        message: &str,
        buttons: Option<&[&str]>,
        default_button: usize,
    ) -> bool;
}

/// Integer percentage of `done` in `total`, or `None` when `total` is zero.
pub fn percent(done: u64, total: u64) -> Option<u64> {
    if total == 0 {
        return None;
    }
    Some((u128::from(done) * 100 / u128::from(total)) as u64)
}

/// Recorded state shared by the bundled callbacks.
///
/// Totals start at 1 so that a percentage computed before the first update is
/// well defined.
#[derive(Debug)]
pub struct CallbackState {
    cancelled: AtomicBool,
    work_done: AtomicU64,
    total_work: AtomicU64,
    sub_work_done: AtomicU64,
    sub_total_work: AtomicU64,
}

impl Default for CallbackState {
    fn default() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            work_done: AtomicU64::new(0),
            total_work: AtomicU64::new(1),
            sub_work_done: AtomicU64::new(0),
            sub_total_work: AtomicU64::new(1),
        }
    }
}

impl CallbackState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_progress(&self, done: u64, total: u64) {
        self.work_done.store(done, Ordering::SeqCst);
        self.total_work.store(total, Ordering::SeqCst);
    }

    pub fn set_sub_progress(&self, done: u64, total: u64) {
        self.sub_work_done.store(done, Ordering::SeqCst);
        self.sub_total_work.store(total, Ordering::SeqCst);
    }

    /// Overall progress as `(done, total)`.
    pub fn progress(&self) -> (u64, u64) {
        (
            self.work_done.load(Ordering::SeqCst),
            self.total_work.load(Ordering::SeqCst),
        )
    }

    /// Sub-task progress as `(done, total)`.
    pub fn sub_progress(&self) -> (u64, u64) {
        (
            self.sub_work_done.load(Ordering::SeqCst),
            self.sub_total_work.load(Ordering::SeqCst),
        )
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn cancel(&self) -> bool {
        self.cancelled.store(true, Ordering::SeqCst);
        true
    }
}

/// Renders everything to stdout. Prompts are printed and always accepted,
/// which makes this the callback for non-interactive runs.
#[derive(Debug, Default)]
pub struct SimpleCallback {
    state: CallbackState,
}

impl SimpleCallback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CallbackState {
        &self.state
    }
}

fn progress_line(label: &str, done: u64, total: u64) -> String {
    match percent(done, total) {
        Some(p) => format!("{label}: {done} of {total} ({p} %)"),
        None => format!("{label}: {done} of {total}"),
    }
}

impl Callback for SimpleCallback {
    fn update_message(&self, message: &str) {
        println!("{message}");
    }

    fn update_progress(&self, done: u64, total: u64) {
        self.state.set_progress(done, total);
        println!("{}", progress_line("progress", done, total));
    }

    fn update_sub_progress(&self, done: u64, total: u64) {
        self.state.set_sub_progress(done, total);
        println!("{}", progress_line("sub progress", done, total));
    }

    fn is_cancelled(&self) -> bool {
        self.state.is_cancelled()
    }

    fn cancel(&self) -> bool {
        self.state.cancel()
    }

    fn warning(&self, title: &str, message: &str, _: Option<&[&str]>, _: usize) -> bool {
        println!("Warning: {title}\n{message}");
        true
    }

    fn confirm(&self, title: &str, message: &str, _: Option<&[&str]>, _: usize) -> bool {
        println!("Confirm: {title}\n{message}");
        true
    }
}

/// Records state but shows nothing. Prompts answer with the default button,
/// where button 0 means "accept".
#[derive(Debug, Default)]
pub struct NoopCallback {
    state: CallbackState,
}

impl NoopCallback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CallbackState {
        &self.state
    }
}

impl Callback for NoopCallback {
    fn update_message(&self, _message: &str) {}

    fn update_progress(&self, done: u64, total: u64) {
        self.state.set_progress(done, total);
    }

    fn update_sub_progress(&self, done: u64, total: u64) {
        self.state.set_sub_progress(done, total);
    }

    fn is_cancelled(&self) -> bool {
        self.state.is_cancelled()
    }

    fn cancel(&self) -> bool {
        self.state.cancel()
    }

    fn warning(&self, _: &str, _: &str, _: Option<&[&str]>, default_button: usize) -> bool {
        default_button == 0
    }

    fn confirm(&self, _: &str, _: &str, _: Option<&[&str]>, default_button: usize) -> bool {
        default_button == 0
    }
}
