//! Progress reporting on stderr with indicatif.
//!
//! The finder reports three phases through [`ProgressCallback`]:
//! `walking` (spinner, total unknown), `hashing` and `verifying` (bars).
//! [`Progress`] draws them; quiet mode draws nothing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bytesize::ByteSize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Receiver of progress updates from the duplicate finder.
pub trait ProgressCallback: Send + Sync {
    /// A phase starts; `total` is 0 when unknown.
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Item `current` (1-based) of the running phase is being processed.
    fn on_progress(&self, current: usize, path: &str);

    /// An item of `bytes` bytes finished.
    fn on_item_completed(&self, _bytes: u64) {}

    /// A phase ended.
    fn on_phase_end(&self, phase: &str);

    /// Replace the status message.
    fn on_message(&self, _message: &str) {}
}

/// Terminal progress reporter.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    bytes: AtomicU64,
    quiet: bool,
}

impl Progress {
    /// Create a reporter; a quiet reporter never draws.
    ///
    /// ```
    /// use rmdupes::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// assert!(progress.is_quiet());
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            bytes: AtomicU64::new(0),
            quiet,
        }
    }

    /// Whether drawing is disabled.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    fn slot(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.bar.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        let bar = match phase {
            "walking" => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(Self::spinner_style());
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            }
            _ => {
                let pb = ProgressBar::new(total as u64);
                pb.set_style(Self::bar_style());
                pb
            }
        };
        bar.set_draw_target(ProgressDrawTarget::stderr());
        bar.set_message(phase_label(phase));
        self.bytes.store(0, Ordering::Relaxed);

        if let Some(previous) = self.slot().replace(bar) {
            previous.finish_and_clear();
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }
        if let Some(pb) = self.slot().as_ref() {
            pb.set_position(current as u64);
            pb.set_message(truncate_path(path, 40));
        }
    }

    fn on_item_completed(&self, bytes: u64) {
        self.bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }
        if let Some(pb) = self.slot().take() {
            let message = match phase {
                "hashing" => format!(
                    "Hashed {} files ({})",
                    pb.position(),
                    ByteSize::b(self.bytes.load(Ordering::Relaxed))
                ),
                "walking" => format!("Found {} files", pb.position()),
                _ => format!("{} complete", phase_label(phase)),
            };
            pb.finish_with_message(message);
        }
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }
        if let Some(pb) = self.slot().as_ref() {
            pb.set_message(message.to_string());
        }
    }
}

fn phase_label(phase: &str) -> String {
    match phase {
        "walking" => "Searching for duplicate files".to_string(),
        "hashing" => "Hashing".to_string(),
        "verifying" => "Verifying".to_string(),
        other => other.to_string(),
    }
}

/// Shorten a path for the progress line, keeping the file name.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let count = file_name.chars().count();
    if count + 4 > max_len {
        let tail: String = file_name
            .chars()
            .skip(count.saturating_sub(max_len.saturating_sub(3)))
            .collect();
        return format!("...{tail}");
    }

    format!(".../{file_name}")
}
