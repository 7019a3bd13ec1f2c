//! Command-line interface for batch generation of facet coloring patterns

use clap::Parser;
use rayon::prelude::*;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::algorithm::sampler::{FillPolicy, RunReport, TieBreak};
use crate::io::error::{Result, invalid_parameter};
use crate::io::image::export_grid_as_png;
use crate::io::progress::ProgressManager;
use crate::io::replay::write_placement_log;
use crate::io::settings::RunSettings;
use crate::math::distance::DistanceMetric;

#[derive(Parser)]
#[command(name = "graftgrid")]
#[command(
    author,
    version,
    about = "Generate constrained facet coloring patterns"
)]
/// Command-line arguments for the pattern sampling tool
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// TOML settings file describing the run
    #[arg(value_name = "SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Grid side length
    #[arg(short = 'n', long)]
    pub side: Option<usize>,

    /// Base seed for reproducible tie-breaking
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Absolute ceiling on blue cells
    #[arg(long)]
    pub blue_max: Option<usize>,

    /// Blue fraction of the total site quota
    #[arg(long)]
    pub blue_ratio: Option<f64>,

    /// Ceiling on green cells
    #[arg(long)]
    pub green_max: Option<usize>,

    /// Distance metric for the symmetry ranking (euclidean or chebyshev)
    #[arg(long)]
    pub metric: Option<String>,

    /// Break ranking ties with the seeded generator instead of coordinate order
    #[arg(long)]
    pub random_ties: bool,

    /// Number of independent samples to run
    #[arg(short = 'k', long, default_value_t = 1)]
    pub samples: usize,

    /// Output PNG path; sample seeds are appended for batches
    #[arg(short, long, default_value = "pattern.png")]
    pub output: PathBuf,

    /// Write the placement log next to each output image
    #[arg(short, long)]
    pub record: bool,

    /// Leave uncolorable cells unset instead of filling them green
    #[arg(long)]
    pub leave_unset: bool,

    /// Classify coverage shortfalls as infeasible
    #[arg(long)]
    pub strict: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }
}

/// Orchestrates batch sampling with progress tracking
///
/// Samples are fully independent: each gets its own grid, tracker, and seed
/// derived from the base seed, so the batch runs in parallel with no shared
/// mutable state.
pub struct BatchRunner {
    cli: Cli,
    progress: Option<ProgressManager>,
}

impl BatchRunner {
    /// Create a new batch runner with the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress = cli.should_show_progress().then(ProgressManager::new);

        Self { cli, progress }
    }

    /// Run all requested samples and print a summary
    ///
    /// # Errors
    ///
    /// Returns an error if settings fail validation, a sampler hits an
    /// invariant violation, or an output cannot be written.
    pub fn run(&mut self) -> Result<()> {
        if self.cli.samples == 0 {
            return Err(invalid_parameter(
                "samples",
                &self.cli.samples,
                &"at least one sample is required",
            ));
        }

        let mut settings = match &self.cli.settings {
            Some(path) => RunSettings::from_toml_path(path)?,
            None => RunSettings::default(),
        };
        self.apply_overrides(&mut settings)?;

        // Validate once up front so every sample shares one failure mode
        let probe = settings.build()?.into_sampler()?;
        let placements_per_sample = probe.total_quota() as u64;

        if let Some(ref mut pm) = self.progress {
            pm.initialize(self.cli.samples, placements_per_sample);
        }

        let runner: &Self = self;
        let outcomes: Vec<Result<String>> = (0..runner.cli.samples)
            .into_par_iter()
            .map(|index| runner.run_sample(&settings, index))
            .collect();

        if let Some(ref pm) = self.progress {
            pm.finish();
        }

        let mut lines = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            lines.push(outcome?);
        }
        Self::print_summary(&lines);

        Ok(())
    }

    fn run_sample(&self, settings: &RunSettings, index: usize) -> Result<String> {
        let mut sample_settings = settings.clone();
        sample_settings.seed = settings.seed.wrapping_add(index as u64);

        let mut sampler = sample_settings.build()?.into_sampler()?;
        let bar = self
            .progress
            .as_ref()
            .and_then(|pm| pm.sample_bar(index));

        while sampler.step()? {
            if let Some(ref bar) = bar {
                bar.set_position(sampler.log().len() as u64);
            }
        }

        let report = sampler.finish()?;

        let output_path = Self::sample_output_path(&self.cli.output, report.seed, self.cli.samples);
        export_grid_as_png(&report.grid, &output_path)?;

        if self.cli.record {
            write_placement_log(&report.log, &Self::record_path(&output_path))?;
        }

        if let Some(ref pm) = self.progress {
            pm.complete_sample(index);
        }

        Ok(Self::summary_line(&report))
    }

    fn apply_overrides(&self, settings: &mut RunSettings) -> Result<()> {
        if self.cli.blue_max.is_some() && self.cli.blue_ratio.is_some() {
            return Err(invalid_parameter(
                "blue-ratio",
                &"set",
                &"blue-max and blue-ratio are mutually exclusive",
            ));
        }

        if let Some(side) = self.cli.side {
            settings.side = side;
        }
        if let Some(seed) = self.cli.seed {
            settings.seed = seed;
        }
        if let Some(blue_max) = self.cli.blue_max {
            settings.blue_max = Some(blue_max);
            settings.blue_ratio = None;
        }
        if let Some(blue_ratio) = self.cli.blue_ratio {
            settings.blue_ratio = Some(blue_ratio);
            settings.blue_max = None;
        }
        if let Some(green_max) = self.cli.green_max {
            settings.green_max = Some(green_max);
        }
        if let Some(ref metric) = self.cli.metric {
            settings.metric = Self::parse_metric(metric)?;
        }
        if self.cli.random_ties {
            settings.tie_break = TieBreak::Seeded;
        }
        if self.cli.leave_unset {
            settings.fallback_fill = FillPolicy::LeaveUnset;
        }
        if self.cli.strict {
            settings.strict_coverage = true;
        }

        Ok(())
    }

    fn parse_metric(text: &str) -> Result<DistanceMetric> {
        match text {
            "euclidean" => Ok(DistanceMetric::Euclidean),
            "chebyshev" => Ok(DistanceMetric::Chebyshev),
            _ => Err(invalid_parameter(
                "metric",
                &text,
                &"expected 'euclidean' or 'chebyshev'",
            )),
        }
    }

    fn sample_output_path(base: &Path, seed: u64, samples: usize) -> PathBuf {
        if samples == 1 {
            return base.to_path_buf();
        }

        let stem = base.file_stem().unwrap_or_default();
        let extension = base.extension().unwrap_or_default();
        let output_name = format!(
            "{}_s{seed}.{}",
            stem.to_string_lossy(),
            extension.to_string_lossy()
        );

        if let Some(parent) = base.parent() {
            parent.join(output_name)
        } else {
            PathBuf::from(output_name)
        }
    }

    fn record_path(output: &Path) -> PathBuf {
        output.with_extension("log")
    }

    fn summary_line(report: &RunReport) -> String {
        let mut line = format!(
            "seed {}: {} with {} blue, {} green, {} unset (ratio {:.2}, coverage {:.2}) in {} iterations",
            report.seed,
            report.validation.outcome,
            report.stats.blue,
            report.stats.green,
            report.stats.unset,
            report.stats.realized_blue_ratio,
            report.stats.coverage,
            report.iterations
        );

        for warning in &report.warnings {
            let _ = write!(line, "\n  warning: {warning}");
        }
        for violation in &report.validation.violations {
            let _ = write!(line, "\n  violation: {violation}");
        }

        line
    }

    // Allow print for user-facing run summaries
    #[allow(clippy::print_stdout)]
    fn print_summary(lines: &[String]) {
        for line in lines {
            println!("{line}");
        }
    }
}
