use crate::{
    algorithm::backtrack::rewind_recent_placements,
    algorithm::bitset::CellSet,
    algorithm::record::{Placement, PlacementLog},
    algorithm::selection::{leading_tie_count, rank_candidates},
    constraint::budget::{BudgetTracker, ColorBudget},
    constraint::regions::RegionRegistry,
    constraint::validate::{CoverageRule, ValidationPolicy, ValidationReport, validate},
    io::configuration::{DEFAULT_BACKTRACK_DEPTH, DEFAULT_SEED, ITERATION_LIMIT_FACTOR},
    io::error::{Result, invalid_parameter},
    math::distance::DistanceMetric,
    spatial::grid::{CellCoord, Color, FacetGrid},
    spatial::topology::{CurvatureClass, DEFAULT_PRIORITY},
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Deserialize;
use std::fmt;

/// What to do with cells left uncolored when no legal placement remains
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FillPolicy {
    /// Color leftover cells green, flagging the run as degraded
    #[default]
    GreenFill,
    /// Leave leftover cells unset
    LeaveUnset,
}

/// How to choose among candidates the symmetry ranking cannot separate
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    /// Take the lexicographically smallest coordinate
    #[default]
    Lexicographic,
    /// Choose uniformly among the tied candidates with the seeded generator
    Seeded,
}

/// Sampler parameters controlling priority, ranking, and recovery behavior
#[derive(Clone, Copy, Debug)]
pub struct SamplerConfig {
    /// Curvature classes in the order they claim placements
    pub priority: [CurvatureClass; CurvatureClass::COUNT],
    /// Distance metric for the symmetry ranking
    pub metric: DistanceMetric,
    /// Placements rolled back per backtracking step
    pub backtrack_depth: usize,
    /// Retry bound per starved class; defaults to the class's uncolored count
    pub retry_limit: Option<usize>,
    /// Policy for cells left uncolored at termination
    pub fallback_fill: FillPolicy,
    /// Tie-break rule among equally ranked candidates
    pub tie_break: TieBreak,
    /// Seed for the tie-break generator, recorded in the run report
    pub seed: u64,
    /// Hard cap on iterations; defaults to a multiple of the cell count
    pub iteration_limit: Option<usize>,
    /// Fraction of each class's cells that must receive a color,
    /// indexed by [`CurvatureClass::index`]
    pub class_coverage: [f64; CurvatureClass::COUNT],
    /// Classify coverage shortfalls as infeasible instead of partial
    pub strict_coverage: bool,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            priority: DEFAULT_PRIORITY,
            metric: DistanceMetric::default(),
            backtrack_depth: DEFAULT_BACKTRACK_DEPTH,
            retry_limit: None,
            fallback_fill: FillPolicy::default(),
            tie_break: TieBreak::default(),
            seed: DEFAULT_SEED,
            iteration_limit: None,
            class_coverage: [1.0; CurvatureClass::COUNT],
            strict_coverage: false,
        }
    }
}

/// Non-fatal degradation recorded during a run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SamplerWarning {
    /// A class exhausted its retry bound and was given up on
    ClassAbandoned {
        /// The starved class
        class: CurvatureClass,
        /// Cells of the class still uncolored when abandoned
        uncolored: usize,
        /// Backtracking retries spent before giving up
        retries: usize,
    },
    /// The hard iteration cap stopped the run
    IterationLimitReached {
        /// The configured cap
        limit: usize,
    },
    /// Leftover cells were filled green outside the budget checks
    FallbackFilled {
        /// Number of cells filled
        count: usize,
    },
}

impl fmt::Display for SamplerWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClassAbandoned {
                class,
                uncolored,
                retries,
            } => write!(
                f,
                "{class} class abandoned after {retries} retries with {uncolored} cells uncolored"
            ),
            Self::IterationLimitReached { limit } => {
                write!(f, "iteration limit of {limit} reached")
            }
            Self::FallbackFilled { count } => {
                write!(f, "{count} leftover cells filled green past the budget checks")
            }
        }
    }
}

/// Aggregate counts over the final grid
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunStatistics {
    /// Blue cells placed
    pub blue: usize,
    /// Green cells placed
    pub green: usize,
    /// Cells left unset
    pub unset: usize,
    /// Blue fraction of all colored cells
    pub realized_blue_ratio: f64,
    /// Colored fraction of all cells
    pub coverage: f64,
}

impl RunStatistics {
    fn from_grid(grid: &FacetGrid) -> Self {
        let blue = grid.count_of(Color::Blue);
        let green = grid.count_of(Color::Green);
        let unset = grid.count_of(Color::Unset);
        let colored = blue + green;

        Self {
            blue,
            green,
            unset,
            realized_blue_ratio: if colored > 0 {
                blue as f64 / colored as f64
            } else {
                0.0
            },
            coverage: if grid.len() > 0 {
                colored as f64 / grid.len() as f64
            } else {
                0.0
            },
        }
    }
}

/// Everything a finished run exposes to callers
#[derive(Clone, Debug)]
pub struct RunReport {
    /// Final grid state
    pub grid: FacetGrid,
    /// Audit trail of committed placements in order
    pub log: PlacementLog,
    /// Standalone validation of the final grid
    pub validation: ValidationReport,
    /// Degradations recorded during the run
    pub warnings: Vec<SamplerWarning>,
    /// Aggregate counts over the final grid
    pub stats: RunStatistics,
    /// Seed used for tie-breaking
    pub seed: u64,
    /// Iterations executed
    pub iterations: usize,
}

/// Seeded random selector for reproducible tie-breaking
pub struct RandomSelector {
    rng: StdRng,
}

impl RandomSelector {
    /// Create a deterministic random selector
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform choice of an index below `len`; returns 0 for trivial ranges
    pub fn pick(&mut self, len: usize) -> usize {
        if len <= 1 {
            0
        } else {
            self.rng.random_range(0..len)
        }
    }
}

/// Constrained heuristic placement sampler
///
/// Runs the placement loop: pick the next color by curvature priority and
/// remaining budget, pick the next cell through the symmetry ranking filtered
/// by region and budget eligibility, then commit, backtracking locally when a
/// commit starves a class that still has mandatory coverage. Identical
/// configuration and seed always reproduce the identical placement sequence.
pub struct PlacementSampler {
    grid: FacetGrid,
    registry: RegionRegistry,
    tracker: BudgetTracker,
    config: SamplerConfig,
    quotas: [usize; CurvatureClass::COUNT],
    colored_by_class: [usize; CurvatureClass::COUNT],
    log: PlacementLog,
    random: RandomSelector,
    excluded: CellSet,
    retry_counts: [usize; CurvatureClass::COUNT],
    abandoned: [bool; CurvatureClass::COUNT],
    warnings: Vec<SamplerWarning>,
    iteration: usize,
    iteration_limit: usize,
    limit_reported: bool,
}

impl PlacementSampler {
    /// Create a sampler over a grid, its regions, and global budgets
    ///
    /// # Errors
    ///
    /// Returns an error if the grid already holds colors, the registry was
    /// built for a different grid side, the priority order is not a
    /// permutation of the curvature classes, the backtrack depth is zero, or
    /// a coverage fraction lies outside `[0, 1]`.
    pub fn new(
        grid: FacetGrid,
        registry: RegionRegistry,
        budget: ColorBudget,
        config: SamplerConfig,
    ) -> Result<Self> {
        if grid.count_of(Color::Unset) != grid.len() {
            return Err(invalid_parameter(
                "grid",
                &"prefilled",
                &"the sampler requires an uncolored grid",
            ));
        }

        if registry.side() != grid.side() {
            return Err(invalid_parameter(
                "regions",
                &registry.side(),
                &format!("registry side does not match grid side {}", grid.side()),
            ));
        }

        if config.backtrack_depth == 0 {
            return Err(invalid_parameter(
                "backtrack-depth",
                &config.backtrack_depth,
                &"at least one placement must be rolled back per retry",
            ));
        }

        let mut seen = [false; CurvatureClass::COUNT];
        for class in config.priority {
            let slot = seen.get_mut(class.index());
            match slot {
                Some(mark) if !*mark => *mark = true,
                _ => {
                    return Err(invalid_parameter(
                        "priority",
                        &class,
                        &"each curvature class must appear exactly once",
                    ));
                }
            }
        }

        let mut quotas = [0; CurvatureClass::COUNT];
        for class in CurvatureClass::ALL {
            let fraction = config
                .class_coverage
                .get(class.index())
                .copied()
                .unwrap_or(1.0);
            if !(0.0..=1.0).contains(&fraction) {
                return Err(invalid_parameter(
                    "class-coverage",
                    &fraction,
                    &"coverage fractions must lie in [0, 1]",
                ));
            }

            let size = grid.class_size(class);
            let quota = ((fraction * size as f64).floor() as usize).min(size);
            if let Some(slot) = quotas.get_mut(class.index()) {
                *slot = quota;
            }
        }

        let iteration_limit = config
            .iteration_limit
            .unwrap_or(ITERATION_LIMIT_FACTOR * grid.len());

        let tracker = BudgetTracker::new(budget, registry.len());
        let random = RandomSelector::new(config.seed);
        let excluded = CellSet::new(grid.side());

        Ok(Self {
            grid,
            registry,
            tracker,
            config,
            quotas,
            colored_by_class: [0; CurvatureClass::COUNT],
            log: PlacementLog::new(),
            random,
            excluded,
            retry_counts: [0; CurvatureClass::COUNT],
            abandoned: [false; CurvatureClass::COUNT],
            warnings: Vec::new(),
            iteration: 0,
            iteration_limit,
            limit_reported: false,
        })
    }

    /// Current grid state
    pub const fn grid(&self) -> &FacetGrid {
        &self.grid
    }

    /// Audit trail recorded so far
    pub const fn log(&self) -> &PlacementLog {
        &self.log
    }

    /// Warnings recorded so far
    pub fn warnings(&self) -> &[SamplerWarning] {
        &self.warnings
    }

    /// Iterations executed so far
    pub const fn iterations(&self) -> usize {
        self.iteration
    }

    /// Required colored-cell count for a class
    pub fn quota(&self, class: CurvatureClass) -> usize {
        self.quotas.get(class.index()).copied().unwrap_or(0)
    }

    /// Sum of all class quotas: the number of placements a full run commits
    pub fn total_quota(&self) -> usize {
        self.quotas.iter().sum()
    }

    /// Execute one iteration of the placement loop
    ///
    /// Returns `false` once no further placement will be attempted, because
    /// coverage is met, the iteration cap was hit, or no legal move remains.
    ///
    /// # Errors
    ///
    /// Returns an error only on invariant violations, which indicate a bug
    /// rather than an infeasible configuration.
    pub fn step(&mut self) -> Result<bool> {
        if self.coverage_met() {
            return Ok(false);
        }

        if self.iteration >= self.iteration_limit {
            if !self.limit_reported {
                self.limit_reported = true;
                self.warnings.push(SamplerWarning::IterationLimitReached {
                    limit: self.iteration_limit,
                });
            }
            return Ok(false);
        }

        self.iteration += 1;

        let Some(placement) = self.next_move() else {
            return Ok(false);
        };

        self.commit_move(placement)?;
        self.check_for_starvation()?;

        Ok(true)
    }

    /// Run the loop to termination and produce the report
    ///
    /// # Errors
    ///
    /// Returns an error only on invariant violations.
    pub fn run(mut self) -> Result<RunReport> {
        while self.step()? {}
        self.finish()
    }

    /// Apply the fallback-fill policy, validate, and produce the report
    ///
    /// # Errors
    ///
    /// Returns an error only on invariant violations.
    pub fn finish(mut self) -> Result<RunReport> {
        if self.config.fallback_fill == FillPolicy::GreenFill {
            let filled = self.fallback_fill()?;
            if filled > 0 {
                self.warnings
                    .push(SamplerWarning::FallbackFilled { count: filled });
            }
        }

        let policy = ValidationPolicy {
            coverage: CoverageRule::PerClass(self.quotas),
            strict_coverage: self.config.strict_coverage,
        };
        let validation = validate(&self.grid, &self.registry, self.tracker.budget(), &policy);
        let stats = RunStatistics::from_grid(&self.grid);

        Ok(RunReport {
            grid: self.grid,
            log: self.log,
            validation,
            warnings: self.warnings,
            stats,
            seed: self.config.seed,
            iterations: self.iteration,
        })
    }

    fn coverage_met(&self) -> bool {
        CurvatureClass::ALL
            .into_iter()
            .all(|class| self.quota_remaining(class) == 0)
    }

    fn quota_remaining(&self, class: CurvatureClass) -> usize {
        let colored = self
            .colored_by_class
            .get(class.index())
            .copied()
            .unwrap_or(0);
        self.quota(class).saturating_sub(colored)
    }

    fn is_abandoned(&self, class: CurvatureClass) -> bool {
        self.abandoned.get(class.index()).copied().unwrap_or(false)
    }

    /// Choose the next (class, color, cell) triple per the priority policy
    ///
    /// Classes are scanned in priority order; blue is attempted while the
    /// global blue budget lasts, then green. Eligibility is recomputed fresh
    /// on every call. Retry exclusions are transient: when they alone block
    /// every move, they are dropped and the scan repeats once.
    fn next_move(&mut self) -> Option<Placement> {
        if let Some(placement) = self.find_move() {
            return Some(placement);
        }

        if !self.excluded.is_empty() {
            self.excluded.clear();
            return self.find_move();
        }

        None
    }

    fn find_move(&mut self) -> Option<Placement> {
        for class in self.config.priority {
            if self.is_abandoned(class) || self.quota_remaining(class) == 0 {
                continue;
            }

            for color in [Color::Blue, Color::Green] {
                if color == Color::Blue && self.tracker.blue_remaining() == 0 {
                    continue;
                }

                let eligible = self.eligible_cells(class, color);
                if eligible.is_empty() {
                    continue;
                }

                let cell = self.choose_cell(&eligible);
                return Some(Placement { cell, color, class });
            }
        }

        None
    }

    fn eligible_cells(&self, class: CurvatureClass, color: Color) -> Vec<CellCoord> {
        self.grid
            .uncolored_in_class(class)
            .into_iter()
            .filter(|&cell| {
                !self.excluded.contains(cell)
                    && self.tracker.can_place(&self.registry, cell, color)
            })
            .collect()
    }

    fn choose_cell(&mut self, eligible: &[CellCoord]) -> CellCoord {
        let last_cell = self.log.last().map(|placement| placement.cell);
        let ranked = rank_candidates(eligible, last_cell, self.grid.side(), self.config.metric);

        let index = match self.config.tie_break {
            TieBreak::Lexicographic => 0,
            TieBreak::Seeded => {
                let ties =
                    leading_tie_count(&ranked, last_cell, self.grid.side(), self.config.metric);
                self.random.pick(ties)
            }
        };

        ranked
            .get(index)
            .or_else(|| ranked.first())
            .copied()
            .unwrap_or([0, 0])
    }

    fn commit_move(&mut self, placement: Placement) -> Result<()> {
        self.tracker
            .commit(&self.registry, placement.cell, placement.color)?;
        self.grid.paint(placement.cell, placement.color)?;

        if let Some(count) = self.colored_by_class.get_mut(placement.class.index()) {
            *count += 1;
        }

        self.log.push(placement);
        Ok(())
    }

    /// Detect a starved class and either backtrack or abandon it
    ///
    /// A class is starved when it still owes mandatory coverage yet none of
    /// its uncolored cells can legally take either color. Backtracking rolls
    /// back the most recent placements and excludes their cells from the
    /// retried selection; once the retry bound is spent the class is
    /// abandoned with a warning and the run degrades to the next class.
    fn check_for_starvation(&mut self) -> Result<()> {
        let Some(class) = self.starved_class() else {
            self.excluded.clear();
            self.retry_counts = [0; CurvatureClass::COUNT];
            return Ok(());
        };

        let uncolored = self.grid.uncolored_in_class(class).len();
        let limit = self.config.retry_limit.unwrap_or(uncolored);
        let retries = self
            .retry_counts
            .get(class.index())
            .copied()
            .unwrap_or(0);

        if retries >= limit {
            self.warnings.push(SamplerWarning::ClassAbandoned {
                class,
                uncolored,
                retries,
            });
            if let Some(flag) = self.abandoned.get_mut(class.index()) {
                *flag = true;
            }
            self.excluded.clear();
            if let Some(count) = self.retry_counts.get_mut(class.index()) {
                *count = 0;
            }
            return Ok(());
        }

        if let Some(count) = self.retry_counts.get_mut(class.index()) {
            *count += 1;
        }

        let result = rewind_recent_placements(
            &mut self.grid,
            &mut self.tracker,
            &self.registry,
            &mut self.log,
            self.config.backtrack_depth,
        )?;

        for placement in &result.undone {
            if let Some(count) = self.colored_by_class.get_mut(placement.class.index()) {
                *count = count.saturating_sub(1);
            }
            self.excluded.insert(placement.cell);
        }

        Ok(())
    }

    fn starved_class(&self) -> Option<CurvatureClass> {
        for class in self.config.priority {
            if self.is_abandoned(class) || self.quota_remaining(class) == 0 {
                continue;
            }

            let any_eligible = self.grid.uncolored_in_class(class).iter().any(|&cell| {
                self.tracker.can_place(&self.registry, cell, Color::Blue)
                    || self.tracker.can_place(&self.registry, cell, Color::Green)
            });

            if !any_eligible {
                return Some(class);
            }
        }

        None
    }

    /// Color leftover mandatory cells green, bypassing the budget checks
    ///
    /// Runs outside the tracker on purpose: the grid could not absorb these
    /// cells legally, and the validator recounts everything from the grid, so
    /// any overrun the fill causes is reported rather than hidden.
    fn fallback_fill(&mut self) -> Result<usize> {
        let mut filled = 0;

        for class in CurvatureClass::ALL {
            let mut remaining = self.quota_remaining(class);
            if remaining == 0 {
                continue;
            }

            for cell in self.grid.uncolored_in_class(class) {
                if remaining == 0 {
                    break;
                }

                self.grid.paint(cell, Color::Green)?;
                if let Some(count) = self.colored_by_class.get_mut(class.index()) {
                    *count += 1;
                }
                remaining -= 1;
                filled += 1;
            }
        }

        Ok(filled)
    }
}
