use crate::ports::HashProgress;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

/// Per-file progress bar. One bar is reused across the scan; each file
/// resets it to that file's byte length.
pub struct ProgressBarAdapter {
    bar: Arc<ProgressBar>,
    quiet: bool,
}

impl ProgressBarAdapter {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {bytes:>10}/{total_bytes:10} {percent:>3}% {msg}")
                .unwrap()
                .progress_chars("█▉▊▋▌▍▎▏ "),
        );
        Self {
            bar: Arc::new(bar),
            quiet: false,
        }
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        if quiet {
            self.bar = Arc::new(ProgressBar::hidden());
        }
        self
    }
}

impl Default for ProgressBarAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl HashProgress for ProgressBarAdapter {
    fn on_file_start(&self, name: &str, total_bytes: u64) {
        if self.quiet {
            return;
        }
        self.bar.reset();
        self.bar.set_length(total_bytes);
        self.bar.set_message(name.to_string());
    }

    fn on_progress(&self, _percent: u8, bytes_read: u64, _total_bytes: u64) {
        if self.quiet {
            return;
        }
        self.bar.set_position(bytes_read);
    }

    fn on_file_done(&self) {
        if self.quiet {
            return;
        }
        let total = self.bar.length().unwrap_or(0);
        self.bar.set_position(total);
    }
}

impl Drop for ProgressBarAdapter {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}
