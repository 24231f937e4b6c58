//! Progress reporting using indicatif.
//!
//! The scan pipeline reports through the [`ProgressCallback`] trait so
//! the library stays display-agnostic; [`Progress`] is the terminal
//! implementation used by the CLI.

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Progress callback for the scan phases.
///
/// Implement this trait to receive updates while a scan runs. The
/// pipeline reports two phases: `"walk"` (unknown total) and `"hash"`
/// (total known up front).
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts. `total` is 0 when unknown.
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called per item processed, with the 1-based item number.
    fn on_progress(&self, current: usize, path: &str);

    /// Called when an item completes, with its size in bytes.
    fn on_item_completed(&self, _bytes: u64) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);

    /// Called to update the displayed message.
    fn on_message(&self, _message: &str) {}
}

/// Terminal progress reporter backed by indicatif.
pub struct Progress {
    multi: MultiProgress,
    walk: Mutex<Option<ProgressBar>>,
    hash: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// With `quiet` set, no bars are drawn and every callback is a
    /// no-op.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            walk: Mutex::new(None),
            hash: Mutex::new(None),
            quiet,
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .expect("static template is valid")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}",
        )
        .expect("static template is valid")
        .progress_chars("#>-")
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        match phase {
            "walk" => {
                let bar = self.multi.add(ProgressBar::new_spinner());
                bar.set_style(Self::spinner_style());
                bar.enable_steady_tick(Duration::from_millis(100));
                bar.set_message("Walking directory tree...");
                *self.walk.lock().unwrap() = Some(bar);
            }
            "hash" => {
                let bar = self.multi.add(ProgressBar::new(total as u64));
                bar.set_style(Self::bar_style());
                *self.hash.lock().unwrap() = Some(bar);
            }
            _ => {}
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }

        if let Some(bar) = self.hash.lock().unwrap().as_ref() {
            bar.set_position(current as u64);
            bar.set_message(path.to_string());
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        let slot = match phase {
            "walk" => &self.walk,
            "hash" => &self.hash,
            _ => return,
        };

        if let Some(bar) = slot.lock().unwrap().take() {
            bar.finish_and_clear();
        }
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }

        if let Some(bar) = self.walk.lock().unwrap().as_ref() {
            bar.set_message(message.to_string());
        }
    }
}
