//! TOML run settings describing a complete sampler configuration
//!
//! A settings file declares the grid, the global budgets, the named regions
//! with their capacities, and every sampler knob. All validation failures
//! surface before a run starts.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::algorithm::sampler::{FillPolicy, PlacementSampler, SamplerConfig, TieBreak};
use crate::constraint::budget::ColorBudget;
use crate::constraint::regions::RegionRegistry;
use crate::io::configuration::{
    DEFAULT_BACKTRACK_DEPTH, DEFAULT_BLUE_RATIO, DEFAULT_SEED, DEFAULT_SIDE, MAX_GRID_SIDE,
};
use crate::io::error::{Result, SamplerError, invalid_parameter};
use crate::math::distance::DistanceMetric;
use crate::spatial::grid::FacetGrid;
use crate::spatial::topology::CurvatureClass;

const fn default_side() -> usize {
    DEFAULT_SIDE
}

const fn default_seed() -> u64 {
    DEFAULT_SEED
}

const fn default_backtrack_depth() -> usize {
    DEFAULT_BACKTRACK_DEPTH
}

fn default_priority() -> Vec<CurvatureClass> {
    crate::spatial::topology::DEFAULT_PRIORITY.to_vec()
}

const fn default_coverage() -> f64 {
    1.0
}

/// One named region as declared in the settings file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct RegionSettings {
    /// Region name, unique within the file
    pub name: String,
    /// Member cells as (row, column) pairs
    pub cells: Vec<[usize; 2]>,
    /// Cap on colored cells of either species
    pub max_total: usize,
    /// Optional cap on blue cells
    #[serde(default)]
    pub max_blue: Option<usize>,
}

/// Complete run configuration as declared in a settings file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct RunSettings {
    /// Grid side length
    #[serde(default = "default_side")]
    pub side: usize,
    /// Absolute ceiling on blue cells; exclusive with `blue-ratio`
    #[serde(default)]
    pub blue_max: Option<usize>,
    /// Blue fraction of the total site quota; exclusive with `blue-max`
    #[serde(default)]
    pub blue_ratio: Option<f64>,
    /// Optional ceiling on green cells
    #[serde(default)]
    pub green_max: Option<usize>,
    /// Seed for the tie-break generator
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Distance metric for the symmetry ranking
    #[serde(default)]
    pub metric: DistanceMetric,
    /// Tie-break rule among equally ranked candidates
    #[serde(default)]
    pub tie_break: TieBreak,
    /// Curvature classes in placement priority order
    #[serde(default = "default_priority")]
    pub priority: Vec<CurvatureClass>,
    /// Placements rolled back per backtracking step
    #[serde(default = "default_backtrack_depth")]
    pub backtrack_depth: usize,
    /// Retry bound per starved class
    #[serde(default)]
    pub retry_limit: Option<usize>,
    /// Policy for cells left uncolored at termination
    #[serde(default)]
    pub fallback_fill: FillPolicy,
    /// Hard cap on iterations
    #[serde(default)]
    pub iteration_limit: Option<usize>,
    /// Fraction of vertex cells that must receive a color
    #[serde(default = "default_coverage")]
    pub vertex_coverage: f64,
    /// Fraction of edge cells that must receive a color
    #[serde(default = "default_coverage")]
    pub edge_coverage: f64,
    /// Fraction of face cells that must receive a color
    #[serde(default = "default_coverage")]
    pub face_coverage: f64,
    /// Classify coverage shortfalls as infeasible instead of partial
    #[serde(default)]
    pub strict_coverage: bool,
    /// Named regions with per-region capacities
    #[serde(default)]
    pub regions: Vec<RegionSettings>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            side: DEFAULT_SIDE,
            blue_max: None,
            blue_ratio: None,
            green_max: None,
            seed: DEFAULT_SEED,
            metric: DistanceMetric::default(),
            tie_break: TieBreak::default(),
            priority: default_priority(),
            backtrack_depth: DEFAULT_BACKTRACK_DEPTH,
            retry_limit: None,
            fallback_fill: FillPolicy::default(),
            iteration_limit: None,
            vertex_coverage: 1.0,
            edge_coverage: 1.0,
            face_coverage: 1.0,
            strict_coverage: false,
            regions: Vec::new(),
        }
    }
}

/// Everything needed to start a run, built from validated settings
pub struct SamplerSetup {
    /// Uncolored grid
    pub grid: FacetGrid,
    /// Registered regions
    pub registry: RegionRegistry,
    /// Resolved global budgets
    pub budget: ColorBudget,
    /// Sampler parameters
    pub config: SamplerConfig,
}

impl SamplerSetup {
    /// Construct the sampler, consuming the setup
    ///
    /// # Errors
    ///
    /// Returns an error if the sampler rejects the configuration.
    pub fn into_sampler(self) -> Result<PlacementSampler> {
        PlacementSampler::new(self.grid, self.registry, self.budget, self.config)
    }
}

impl RunSettings {
    /// Parse settings from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub fn from_toml_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| SamplerError::FileSystem {
            path: path.to_path_buf(),
            operation: "read settings",
            source: e,
        })?;

        toml::from_str(&text).map_err(|e| SamplerError::SettingsLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Parse settings from a TOML string
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not parse.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| SamplerError::SettingsLoad {
            path: PathBuf::from("<inline>"),
            reason: e.to_string(),
        })
    }

    /// Validate the settings and assemble grid, regions, budget, and config
    ///
    /// The blue ceiling resolves from `blue-max` when given, otherwise from
    /// `blue-ratio` (or its default) applied to the total site quota, the way
    /// the physical system derives its hydrophobic chain count.
    ///
    /// # Errors
    ///
    /// Returns an error for an out-of-range side, a priority list that is not
    /// three classes, both or malformed blue settings, or any invalid region.
    pub fn build(&self) -> Result<SamplerSetup> {
        if self.side == 0 || self.side > MAX_GRID_SIDE {
            return Err(invalid_parameter(
                "side",
                &self.side,
                &format!("grid side must lie in 1..={MAX_GRID_SIDE}"),
            ));
        }

        let grid = FacetGrid::new(self.side)?;

        let mut registry = RegionRegistry::new(self.side);
        for region in &self.regions {
            registry.register(
                &region.name,
                region.cells.clone(),
                region.max_total,
                region.max_blue,
            )?;
        }

        let priority: [CurvatureClass; CurvatureClass::COUNT] =
            match self.priority.clone().try_into() {
                Ok(classes) => classes,
                Err(_) => {
                    return Err(invalid_parameter(
                        "priority",
                        &format!("{} classes", self.priority.len()),
                        &"exactly three curvature classes are required",
                    ));
                }
            };

        let class_coverage = [
            self.vertex_coverage,
            self.edge_coverage,
            self.face_coverage,
        ];

        let blue_max = self.resolve_blue_max(&grid, &class_coverage)?;

        let config = SamplerConfig {
            priority,
            metric: self.metric,
            backtrack_depth: self.backtrack_depth,
            retry_limit: self.retry_limit,
            fallback_fill: self.fallback_fill,
            tie_break: self.tie_break,
            seed: self.seed,
            iteration_limit: self.iteration_limit,
            class_coverage,
            strict_coverage: self.strict_coverage,
        };

        Ok(SamplerSetup {
            grid,
            registry,
            budget: ColorBudget {
                blue_max,
                green_max: self.green_max,
            },
            config,
        })
    }

    fn resolve_blue_max(
        &self,
        grid: &FacetGrid,
        class_coverage: &[f64; CurvatureClass::COUNT],
    ) -> Result<usize> {
        if let Some(blue_max) = self.blue_max {
            if self.blue_ratio.is_some() {
                return Err(invalid_parameter(
                    "blue-ratio",
                    &"set",
                    &"blue-max and blue-ratio are mutually exclusive",
                ));
            }
            return Ok(blue_max);
        }

        let ratio = self.blue_ratio.unwrap_or(DEFAULT_BLUE_RATIO);
        if !(0.0..=1.0).contains(&ratio) {
            return Err(invalid_parameter(
                "blue-ratio",
                &ratio,
                &"ratio must lie in [0, 1]",
            ));
        }

        let mut total_quota = 0.0;
        for class in CurvatureClass::ALL {
            let fraction = class_coverage
                .get(class.index())
                .copied()
                .unwrap_or(1.0)
                .clamp(0.0, 1.0);
            total_quota += (fraction * grid.class_size(class) as f64).floor();
        }

        Ok((ratio * total_quota).floor() as usize)
    }
}
