//! Progress tracking for batch sample runs with automatic batching

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::LazyLock;

use crate::io::configuration::MAX_INDIVIDUAL_PROGRESS_BARS;

static SAMPLE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{prefix} [{bar:30.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] Samples: [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

/// Coordinates progress display for batch sampling
///
/// Small batches get one placement-level bar per sample; larger batches
/// collapse to a single bar counting finished samples to avoid terminal spam.
/// Bars are cheap handles, so worker threads tick their own clones.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    batch_bar: Option<ProgressBar>,
    sample_bars: Vec<ProgressBar>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            batch_bar: None,
            sample_bars: Vec::new(),
        }
    }

    /// Initialize progress bars for a batch of samples
    pub fn initialize(&mut self, sample_count: usize, placements_per_sample: u64) {
        if sample_count > MAX_INDIVIDUAL_PROGRESS_BARS {
            let batch_bar = ProgressBar::new(sample_count as u64);
            batch_bar.set_style(BATCH_STYLE.clone());
            self.batch_bar = Some(self.multi_progress.add(batch_bar));
            return;
        }

        for index in 0..sample_count {
            let bar = ProgressBar::new(placements_per_sample);
            bar.set_style(SAMPLE_STYLE.clone());
            bar.set_prefix(format!("sample {index}"));
            self.sample_bars.push(self.multi_progress.add(bar));
        }
    }

    /// Placement-level bar for one sample, when individual bars are active
    pub fn sample_bar(&self, index: usize) -> Option<ProgressBar> {
        self.sample_bars.get(index).cloned()
    }

    /// Record one finished sample
    pub fn complete_sample(&self, index: usize) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.inc(1);
        }

        if let Some(bar) = self.sample_bars.get(index) {
            bar.finish();
        }
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.finish_with_message("All samples processed");
        }
        let _ = self.multi_progress.clear();
    }
}
