use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::info;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Progress tracker for one analysis pass. Safe to update from worker threads.
pub struct ProgressTracker {
    /// Main progress bar showing overall progress
    main_progress: ProgressBar,
    /// Files decoded successfully
    successful: AtomicUsize,
    /// Files that failed to decode
    errors: AtomicUsize,
    /// Start time of the operation
    start_time: Instant,
}

impl ProgressTracker {
    /// Create a tracker for `total_images` files; hidden unless `visible`
    pub fn new(total_images: usize, visible: bool) -> Self {
        let main_progress = ProgressBar::new(total_images as u64);
        if visible {
            if let Ok(style) =
                ProgressStyle::default_bar().template("{wide_bar} {pos}/{len} ({percent}%) | {msg}")
            {
                main_progress.set_style(style.progress_chars("█▓▒░ "));
            }
            main_progress.set_message("Analysing...");
        } else {
            main_progress.set_draw_target(ProgressDrawTarget::hidden());
        }

        Self {
            main_progress,
            successful: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record one processed file
    pub fn increment(&self, decoded: bool) {
        if decoded {
            self.successful.fetch_add(1, Ordering::Relaxed);
        } else {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }

        self.main_progress.inc(1);
        self.main_progress.set_message(format!(
            "{} ok | {} errors",
            self.successful.load(Ordering::Relaxed),
            self.errors.load(Ordering::Relaxed)
        ));
    }

    /// Complete the progress tracking and log throughput
    pub fn finish(&self) {
        let successful = self.successful.load(Ordering::Relaxed);
        let errors = self.errors.load(Ordering::Relaxed);
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let throughput = if elapsed > 0.0 {
            (successful + errors) as f64 / elapsed
        } else {
            0.0
        };

        self.main_progress.finish_with_message(format!(
            "Completed {} images | {} ok | {} errors | {:.1}s elapsed",
            successful + errors,
            successful,
            errors,
            elapsed
        ));

        info!(
            "Analysed {} images ({} undecodable) at {:.1} img/s",
            successful + errors,
            errors,
            throughput
        );
    }

    pub fn counts(&self) -> (usize, usize) {
        (
            self.successful.load(Ordering::Relaxed),
            self.errors.load(Ordering::Relaxed),
        )
    }
}
