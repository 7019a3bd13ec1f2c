//! Standalone constraint checking and outcome classification
//!
//! Recomputes every count from the grid itself so it can judge a grid from
//! any source: the sampler's own output, a hand-edited pattern, or an
//! externally produced one. Infeasibility is an outcome here, never an error.

use std::fmt;

use crate::constraint::budget::ColorBudget;
use crate::constraint::regions::RegionRegistry;
use crate::spatial::grid::{Color, FacetGrid};
use crate::spatial::topology::CurvatureClass;

/// Overall classification of a colored grid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Every required cell is colored and every limit holds
    Satisfied,
    /// Coverage fell short but no limit was exceeded
    Partial,
    /// At least one capacity or budget limit is exceeded
    Infeasible,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Satisfied => "satisfied",
            Self::Partial => "partial",
            Self::Infeasible => "infeasible",
        };
        write!(f, "{label}")
    }
}

/// How much of the grid a run is required to color
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoverageRule {
    /// Every cell must be colored
    FullGrid,
    /// Each curvature class must reach its quota of colored cells,
    /// indexed by [`CurvatureClass::index`]
    PerClass([usize; CurvatureClass::COUNT]),
}

/// Validation knobs independent of how the grid was produced
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Required coverage of the grid
    pub coverage: CoverageRule,
    /// Classify coverage shortfalls as infeasible instead of partial
    pub strict_coverage: bool,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            coverage: CoverageRule::FullGrid,
            strict_coverage: false,
        }
    }
}

/// One violated constraint, described for human consumption
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConstraintViolation {
    /// A region holds more colored cells than its total capacity
    RegionTotalExceeded {
        /// Region name
        region: String,
        /// Colored cells counted in the region
        count: usize,
        /// Configured capacity
        max_total: usize,
    },
    /// A region holds more blue cells than its blue capacity
    RegionBlueExceeded {
        /// Region name
        region: String,
        /// Blue cells counted in the region
        count: usize,
        /// Configured blue capacity
        max_blue: usize,
    },
    /// The grid holds more blue cells than the global ceiling
    BlueBudgetExceeded {
        /// Blue cells counted
        used: usize,
        /// Configured ceiling
        max: usize,
    },
    /// The grid holds more green cells than the global ceiling
    GreenBudgetExceeded {
        /// Green cells counted
        used: usize,
        /// Configured ceiling
        max: usize,
    },
    /// A curvature class is short of its required colored-cell count
    CoverageShortfall {
        /// Affected class
        class: CurvatureClass,
        /// Colored cells counted in the class
        colored: usize,
        /// Required colored cells
        required: usize,
    },
    /// Cells remain unset under a full-grid coverage rule
    UncoloredCells {
        /// Number of unset cells
        count: usize,
    },
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegionTotalExceeded {
                region,
                count,
                max_total,
            } => write!(
                f,
                "region '{region}' holds {count} colored cells, capacity {max_total}"
            ),
            Self::RegionBlueExceeded {
                region,
                count,
                max_blue,
            } => write!(
                f,
                "region '{region}' holds {count} blue cells, blue capacity {max_blue}"
            ),
            Self::BlueBudgetExceeded { used, max } => {
                write!(f, "{used} blue cells exceed the global ceiling of {max}")
            }
            Self::GreenBudgetExceeded { used, max } => {
                write!(f, "{used} green cells exceed the global ceiling of {max}")
            }
            Self::CoverageShortfall {
                class,
                colored,
                required,
            } => write!(
                f,
                "{class} class colored {colored} of {required} required cells"
            ),
            Self::UncoloredCells { count } => {
                write!(f, "{count} cells remain uncolored")
            }
        }
    }
}

/// Outcome classification plus every violated constraint
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    /// Overall classification
    pub outcome: Outcome,
    /// Violated constraints, empty exactly when satisfied
    pub violations: Vec<ConstraintViolation>,
}

impl ValidationReport {
    /// Whether the grid satisfied every constraint
    pub fn is_satisfied(&self) -> bool {
        self.outcome == Outcome::Satisfied
    }
}

/// Check a colored grid against regions, budgets, and the coverage rule
///
/// Counts are recomputed from the grid, so the result is independent of how
/// the grid was produced. Capacity and budget overruns always classify as
/// infeasible; coverage gaps classify per the policy.
pub fn validate(
    grid: &FacetGrid,
    registry: &RegionRegistry,
    budget: &ColorBudget,
    policy: &ValidationPolicy,
) -> ValidationReport {
    let mut violations = Vec::new();
    let mut capacity_breached = false;

    let blue_total = grid.count_of(Color::Blue);
    if blue_total > budget.blue_max {
        capacity_breached = true;
        violations.push(ConstraintViolation::BlueBudgetExceeded {
            used: blue_total,
            max: budget.blue_max,
        });
    }

    if let Some(green_max) = budget.green_max {
        let green_total = grid.count_of(Color::Green);
        if green_total > green_max {
            capacity_breached = true;
            violations.push(ConstraintViolation::GreenBudgetExceeded {
                used: green_total,
                max: green_max,
            });
        }
    }

    for region in registry.iter() {
        let mut total = 0;
        let mut blue = 0;
        for &cell in region.cells() {
            match grid.color(cell) {
                Some(Color::Blue) => {
                    total += 1;
                    blue += 1;
                }
                Some(Color::Green) => total += 1,
                Some(Color::Unset) | None => {}
            }
        }

        if total > region.max_total() {
            capacity_breached = true;
            violations.push(ConstraintViolation::RegionTotalExceeded {
                region: region.name().to_string(),
                count: total,
                max_total: region.max_total(),
            });
        }

        if let Some(max_blue) = region.max_blue() {
            if blue > max_blue {
                capacity_breached = true;
                violations.push(ConstraintViolation::RegionBlueExceeded {
                    region: region.name().to_string(),
                    count: blue,
                    max_blue,
                });
            }
        }
    }

    let mut coverage_short = false;
    match policy.coverage {
        CoverageRule::FullGrid => {
            let unset = grid.count_of(Color::Unset);
            if unset > 0 {
                coverage_short = true;
                violations.push(ConstraintViolation::UncoloredCells { count: unset });
            }
        }
        CoverageRule::PerClass(quotas) => {
            for class in CurvatureClass::ALL {
                let required = quotas.get(class.index()).copied().unwrap_or(0);
                let colored = grid.colored_in_class(class);
                if colored < required {
                    coverage_short = true;
                    violations.push(ConstraintViolation::CoverageShortfall {
                        class,
                        colored,
                        required,
                    });
                }
            }
        }
    }

    let outcome = if capacity_breached || (coverage_short && policy.strict_coverage) {
        Outcome::Infeasible
    } else if coverage_short {
        Outcome::Partial
    } else {
        Outcome::Satisfied
    };

    ValidationReport {
        outcome,
        violations,
    }
}
