//! Progress display as an injected capability.
//!
//! The batch loop talks to a `Progress` trait object; whether that is an
//! indicatif bar or a no-op is decided once at the CLI layer, so nothing in
//! the collector or scoring engine ever inspects the TTY.

use indicatif::{ProgressBar, ProgressStyle};

pub trait Progress {
    fn begin(&self, total: u64);
    fn advance(&self, message: &str);
    fn finish(&self);
}

/// No-op progress for `--no-progress` and non-terminal output.
pub struct Silent;

impl Progress for Silent {
    fn begin(&self, _total: u64) {}
    fn advance(&self, _message: &str) {}
    fn finish(&self) {}
}

pub struct TerminalBar {
    bar: ProgressBar,
}

impl TerminalBar {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(bar_style());
        Self { bar }
    }
}

impl Default for TerminalBar {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for TerminalBar {
    fn begin(&self, total: u64) {
        self.bar.set_length(total);
    }

    fn advance(&self, message: &str) {
        self.bar.set_message(message.to_string());
        self.bar.inc(1);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .expect("static progress template should parse")
        .progress_chars("█▓▒░  ")
}

/// Pick the progress implementation for this run.
pub fn create(no_progress: bool) -> Box<dyn Progress> {
    if no_progress || !console::Term::stdout().is_term() {
        Box::new(Silent)
    } else {
        Box::new(TerminalBar::new())
    }
}
