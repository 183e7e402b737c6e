//! A [`Callback`] that renders to the terminal.
//!
//! Progress goes to indicatif bars (one for the overall work, one for the
//! current sub-task, each created on its first update). Prompts use dialoguer
//! when stdin is a terminal and fall back to the default button otherwise.

use console::style;
use dialoguer::{Confirm, Select, theme::ColorfulTheme};
use hott_util_core::callback::{Callback, CallbackState};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::io::{IsTerminal, stdin};
use std::sync::OnceLock;

fn bar_style(color: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(&format!(
            "{{prefix:12}} [{{elapsed_precise}}] [{{bar:40.{color}/black}}] {{bytes}}/{{total_bytes}} ({{bytes_per_sec}}, {{eta}})"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("■ ")
}

pub struct TerminalCallback {
    state: CallbackState,
    multi: MultiProgress,
    overall: OnceLock<ProgressBar>,
    sub: OnceLock<ProgressBar>,
    interactive: bool,
}

impl Default for TerminalCallback {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalCallback {
    pub fn new() -> Self {
        Self::with_interactive(stdin().is_terminal())
    }

    /// With `interactive` unset, prompts print their text and answer with
    /// the default button.
    pub fn with_interactive(interactive: bool) -> Self {
        Self {
            state: CallbackState::new(),
            multi: MultiProgress::new(),
            overall: OnceLock::new(),
            sub: OnceLock::new(),
            interactive,
        }
    }

    fn bar(&self, slot: &OnceLock<ProgressBar>, prefix: &'static str, color: &str) -> ProgressBar {
        slot.get_or_init(|| {
            let bar = self.multi.add(ProgressBar::new(0));
            bar.set_prefix(prefix);
            bar.set_style(bar_style(color));
            bar
        })
        .clone()
    }

    fn bars(&self) -> impl Iterator<Item = &ProgressBar> {
        self.overall.get().into_iter().chain(self.sub.get())
    }

    /// Finishes all bars, leaving them on screen with `message`.
    pub fn finish(&self, message: &'static str) {
        for bar in self.bars() {
            bar.finish_with_message(message);
        }
    }

    /// Removes all bars from the screen.
    pub fn abandon(&self) {
        for bar in self.bars() {
            bar.finish_and_clear();
        }
    }

    fn prompt(
        &self,
        heading: String,
        buttons: Option<&[&str]>,
        default_button: usize,
    ) -> bool {
        let fallback = default_button == 0;

        if !self.interactive {
            self.update_message(&heading);
            return fallback;
        }

        self.multi.suspend(|| match buttons {
            Some(labels) if !labels.is_empty() => Select::with_theme(&ColorfulTheme::default())
                .with_prompt(heading)
                .items(labels)
                .default(default_button.min(labels.len() - 1))
                .interact()
                .map(|choice| choice == 0)
                .unwrap_or(fallback),
            _ => Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(heading)
                .default(fallback)
                .interact()
                .unwrap_or(fallback),
        })
    }
}

impl Callback for TerminalCallback {
    fn update_message(&self, message: &str) {
        if self.bars().next().is_some() {
            self.multi.println(message).ok();
        } else {
            println!("{message}");
        }
    }

    fn update_progress(&self, done: u64, total: u64) {
        self.state.set_progress(done, total);
        let bar = self.bar(&self.overall, "Progress", "green");
        bar.set_length(total);
        bar.set_position(done);
    }

    fn update_sub_progress(&self, done: u64, total: u64) {
        self.state.set_sub_progress(done, total);
        let bar = self.bar(&self.sub, "Verifying", "magenta");
        bar.set_length(total);
        bar.set_position(done);
    }

    fn is_cancelled(&self) -> bool {
        self.state.is_cancelled()
    }

    fn cancel(&self) -> bool {
        self.state.cancel()
    }

    fn warning(
        &self,
        title: &str,
        message: &str,
        buttons: Option<&[&str]>,
        default_button: usize,
    ) -> bool {
        let heading = format!("{} {title}: {message}", style("WARNING:").red().bold());
        self.prompt(heading, buttons, default_button)
    }

    fn confirm(
        &self,
        title: &str,
        message: &str,
        buttons: Option<&[&str]>,
        default_button: usize,
    ) -> bool {
        let heading = format!("{}: {message}", style(title).cyan());
        self.prompt(heading, buttons, default_button)
    }
}
