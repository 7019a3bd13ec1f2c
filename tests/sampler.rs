//! Validates the placement loop end to end: curvature priority, symmetry
//! ranking, budget invariants, backtracking recovery, and reproducibility

use graftgrid::algorithm::bitset::CellSet;
use graftgrid::algorithm::sampler::{
    FillPolicy, PlacementSampler, RunReport, SamplerConfig, SamplerWarning, TieBreak,
};
use graftgrid::algorithm::selection::{leading_tie_count, rank_candidates};
use graftgrid::constraint::budget::ColorBudget;
use graftgrid::constraint::regions::RegionRegistry;
use graftgrid::constraint::validate::{ConstraintViolation, Outcome};
use graftgrid::io::replay::render_placement_log;
use graftgrid::math::distance::{DistanceMetric, distance_key, point_reflection};
use graftgrid::spatial::grid::{CellCoord, Color, FacetGrid};
use graftgrid::spatial::topology::CurvatureClass;

fn run_sampler(
    side: usize,
    regions: &[(&str, Vec<CellCoord>, usize, Option<usize>)],
    budget: ColorBudget,
    config: SamplerConfig,
) -> RunReport {
    let grid = FacetGrid::new(side).expect("grid construction");
    let mut registry = RegionRegistry::new(side);
    for (name, cells, max_total, max_blue) in regions {
        registry
            .register(name, cells.clone(), *max_total, *max_blue)
            .expect("region registration");
    }

    PlacementSampler::new(grid, registry, budget, config)
        .expect("sampler construction")
        .run()
        .expect("sampler run")
}

#[test]
fn test_corner_scenario() {
    let corners: Vec<CellCoord> = vec![[0, 0], [0, 6], [6, 0], [6, 6]];
    let report = run_sampler(
        7,
        &[("corners", corners, 4, Some(4))],
        ColorBudget {
            blue_max: 4,
            green_max: None,
        },
        SamplerConfig::default(),
    );

    // All four corners take blue first, paired through the point reflection
    let entries = report.log.entries();
    let opening: Vec<(CellCoord, Color)> = entries
        .iter()
        .take(4)
        .map(|placement| (placement.cell, placement.color))
        .collect();
    assert_eq!(
        opening,
        vec![
            ([0, 0], Color::Blue),
            ([6, 6], Color::Blue),
            ([0, 6], Color::Blue),
            ([6, 0], Color::Blue),
        ]
    );

    // Blue stays at the vertices and the rest of the grid fills green
    for placement in entries {
        if placement.color == Color::Blue {
            assert_eq!(placement.class, CurvatureClass::Vertex);
        }
    }
    assert_eq!(entries.len(), 49);
    assert_eq!(report.stats.blue, 4);
    assert_eq!(report.stats.green, 45);
    assert_eq!(report.stats.unset, 0);
    assert_eq!(report.validation.outcome, Outcome::Satisfied);
    assert!(report.validation.violations.is_empty());
    assert!(report.warnings.is_empty());
}

#[test]
fn test_identical_runs_are_byte_identical() {
    let regions: Vec<(&str, Vec<CellCoord>, usize, Option<usize>)> = vec![
        ("top-band", vec![[0, 0], [0, 1], [0, 2], [0, 3], [0, 4]], 4, Some(2)),
        ("heart", vec![[4, 4], [4, 5], [5, 4], [5, 5]], 3, Some(1)),
    ];
    let budget = ColorBudget {
        blue_max: 12,
        green_max: None,
    };
    let config = SamplerConfig {
        tie_break: TieBreak::Seeded,
        seed: 7,
        ..SamplerConfig::default()
    };

    let first = run_sampler(9, &regions, budget, config);
    let second = run_sampler(9, &regions, budget, config);

    assert_eq!(first.log, second.log);
    assert_eq!(
        render_placement_log(&first.log),
        render_placement_log(&second.log)
    );
}

#[test]
fn test_budget_invariant_holds_at_every_prefix() {
    let band_top: Vec<CellCoord> = (0..2)
        .flat_map(|row| (0..8).map(move |col| [row, col]))
        .collect();
    let band_left: Vec<CellCoord> = (0..8)
        .flat_map(|row| (0..2).map(move |col| [row, col]))
        .collect();
    let regions: Vec<(&str, Vec<CellCoord>, usize, Option<usize>)> = vec![
        ("band-top", band_top.clone(), 10, Some(2)),
        ("band-left", band_left.clone(), 10, Some(2)),
    ];

    let blue_max = 6;
    let report = run_sampler(
        8,
        &regions,
        ColorBudget {
            blue_max,
            green_max: None,
        },
        SamplerConfig {
            fallback_fill: FillPolicy::LeaveUnset,
            ..SamplerConfig::default()
        },
    );

    let caps = [(band_top, 10usize, 2usize), (band_left, 10, 2)];
    let mut blue_used = 0;
    let mut region_counts = [(0usize, 0usize); 2];

    for placement in report.log.entries() {
        if placement.color == Color::Blue {
            blue_used += 1;
        }
        assert!(blue_used <= blue_max);

        for (index, (cells, max_total, max_blue)) in caps.iter().enumerate() {
            if cells.contains(&placement.cell) {
                let counts = &mut region_counts[index];
                counts.0 += 1;
                if placement.color == Color::Blue {
                    counts.1 += 1;
                }
                assert!(counts.0 <= *max_total);
                assert!(counts.1 <= *max_blue);
            }
        }
    }
}

#[test]
fn test_blue_respects_curvature_priority() {
    // Fewer blues than vertices: blue must never leave the vertex class
    let report = run_sampler(
        5,
        &[],
        ColorBudget {
            blue_max: 3,
            green_max: None,
        },
        SamplerConfig::default(),
    );

    let entries = report.log.entries();
    for placement in entries {
        if placement.color == Color::Blue {
            assert_eq!(placement.class, CurvatureClass::Vertex);
        }
    }

    // The blues are also the opening placements, before any green
    let blues: Vec<bool> = entries
        .iter()
        .map(|placement| placement.color == Color::Blue)
        .collect();
    assert_eq!(&blues[..3], &[true, true, true]);
    assert!(blues[3..].iter().all(|&is_blue| !is_blue));
    assert_eq!(report.validation.outcome, Outcome::Satisfied);
}

#[test]
fn test_chosen_cell_minimizes_reflection_distance() {
    let side = 7;
    let report = run_sampler(
        side,
        &[],
        ColorBudget {
            blue_max: 10,
            green_max: None,
        },
        SamplerConfig::default(),
    );

    let reference = FacetGrid::new(side).expect("grid");
    let mut colored = CellSet::new(side);
    let entries = report.log.entries();

    for pair in entries.windows(2) {
        let (previous, placed) = (&pair[0], &pair[1]);
        colored.insert(previous.cell);

        // With no regions and a spare budget, the eligible set is exactly the
        // uncolored cells of the placed class
        let target = point_reflection(previous.cell, side);
        let placed_distance = distance_key(placed.cell, target, DistanceMetric::Euclidean);

        let minimum = reference
            .cells()
            .map(|(cell, _)| cell)
            .filter(|&cell| {
                !colored.contains(cell) && reference.class_of(cell) == Some(placed.class)
            })
            .map(|cell| distance_key(cell, target, DistanceMetric::Euclidean))
            .min()
            .expect("candidates remain");

        assert_eq!(placed_distance, minimum);
    }
}

#[test]
fn test_starved_class_is_abandoned_with_warning() {
    let rim: Vec<CellCoord> = vec![[0, 0], [0, 2], [2, 0], [2, 2]];
    let report = run_sampler(
        3,
        &[("rim", rim, 2, None)],
        ColorBudget {
            blue_max: 0,
            green_max: None,
        },
        SamplerConfig::default(),
    );

    assert!(report.warnings.iter().any(|warning| matches!(
        warning,
        SamplerWarning::ClassAbandoned {
            class: CurvatureClass::Vertex,
            ..
        }
    )));

    // The fallback fill pushes the region past its cap, which the validator
    // reports instead of hiding
    assert!(report.warnings.iter().any(|warning| matches!(
        warning,
        SamplerWarning::FallbackFilled { count: 2 }
    )));
    assert_eq!(report.validation.outcome, Outcome::Infeasible);
    assert!(
        report
            .validation
            .violations
            .contains(&ConstraintViolation::RegionTotalExceeded {
                region: "rim".to_string(),
                count: 4,
                max_total: 2,
            })
    );
    assert_eq!(report.stats.green, 9);
    assert_eq!(report.stats.unset, 0);
}

#[test]
fn test_leave_unset_reports_partial() {
    let rim: Vec<CellCoord> = vec![[0, 0], [0, 2], [2, 0], [2, 2]];
    let report = run_sampler(
        3,
        &[("rim", rim, 2, None)],
        ColorBudget {
            blue_max: 0,
            green_max: None,
        },
        SamplerConfig {
            fallback_fill: FillPolicy::LeaveUnset,
            ..SamplerConfig::default()
        },
    );

    assert_eq!(report.stats.unset, 2);
    assert_eq!(report.validation.outcome, Outcome::Partial);
    assert!(report.validation.violations.contains(
        &ConstraintViolation::CoverageShortfall {
            class: CurvatureClass::Vertex,
            colored: 2,
            required: 4,
        }
    ));
}

#[test]
fn test_strict_coverage_escalates_to_infeasible() {
    let rim: Vec<CellCoord> = vec![[0, 0], [0, 2], [2, 0], [2, 2]];
    let report = run_sampler(
        3,
        &[("rim", rim, 2, None)],
        ColorBudget {
            blue_max: 0,
            green_max: None,
        },
        SamplerConfig {
            fallback_fill: FillPolicy::LeaveUnset,
            strict_coverage: true,
            ..SamplerConfig::default()
        },
    );

    assert_eq!(report.validation.outcome, Outcome::Infeasible);
}

#[test]
fn test_class_quotas_leave_spare_cells_unset() {
    let report = run_sampler(
        5,
        &[],
        ColorBudget {
            blue_max: 3,
            green_max: None,
        },
        SamplerConfig {
            class_coverage: [1.0, 0.5, 0.5],
            ..SamplerConfig::default()
        },
    );

    // 4 vertices, 6 of 12 edge cells, 4 of 9 face cells
    assert_eq!(report.grid.colored_in_class(CurvatureClass::Vertex), 4);
    assert_eq!(report.grid.colored_in_class(CurvatureClass::Edge), 6);
    assert_eq!(report.grid.colored_in_class(CurvatureClass::Face), 4);
    assert_eq!(report.stats.unset, 11);

    // Quota-excluded cells are not a coverage failure
    assert_eq!(report.validation.outcome, Outcome::Satisfied);
    assert!(report.warnings.is_empty());
}

#[test]
fn test_green_ceiling_limits_coverage() {
    let report = run_sampler(
        3,
        &[],
        ColorBudget {
            blue_max: 2,
            green_max: Some(3),
        },
        SamplerConfig {
            fallback_fill: FillPolicy::LeaveUnset,
            ..SamplerConfig::default()
        },
    );

    assert_eq!(report.stats.blue, 2);
    assert_eq!(report.stats.green, 3);
    assert_eq!(report.stats.unset, 4);
    assert_eq!(report.validation.outcome, Outcome::Partial);
}

#[test]
fn test_iteration_limit_is_a_hard_cap() {
    let report = run_sampler(
        5,
        &[],
        ColorBudget {
            blue_max: 4,
            green_max: None,
        },
        SamplerConfig {
            iteration_limit: Some(3),
            fallback_fill: FillPolicy::LeaveUnset,
            ..SamplerConfig::default()
        },
    );

    assert_eq!(report.iterations, 3);
    assert_eq!(report.log.entries().len(), 3);
    assert!(report.warnings.iter().any(|warning| matches!(
        warning,
        SamplerWarning::IterationLimitReached { limit: 3 }
    )));
    assert_eq!(report.validation.outcome, Outcome::Partial);
}

#[test]
fn test_rank_candidates_fallback_starts_at_extremities() {
    let candidates: Vec<CellCoord> = vec![[3, 3], [0, 0], [0, 3]];
    let ranked = rank_candidates(&candidates, None, 7, DistanceMetric::Euclidean);
    assert_eq!(ranked, vec![[0, 0], [0, 3], [3, 3]]);
}

#[test]
fn test_rank_candidates_prefers_point_reflection() {
    let candidates: Vec<CellCoord> = vec![[0, 0], [5, 5], [6, 6]];
    let ranked = rank_candidates(&candidates, Some([0, 0]), 7, DistanceMetric::Euclidean);
    assert_eq!(ranked, vec![[6, 6], [5, 5], [0, 0]]);
}

#[test]
fn test_rank_candidates_breaks_ties_lexicographically() {
    let candidates: Vec<CellCoord> = vec![[6, 0], [0, 6], [3, 3]];
    let ranked = rank_candidates(&candidates, Some([0, 0]), 7, DistanceMetric::Euclidean);

    // (3,3) is closest to the reflection (6,6); the two corners tie
    assert_eq!(ranked, vec![[3, 3], [0, 6], [6, 0]]);
    assert_eq!(
        leading_tie_count(&ranked, Some([0, 0]), 7, DistanceMetric::Euclidean),
        1
    );

    let tied: Vec<CellCoord> = vec![[6, 0], [0, 6]];
    let tied_ranked = rank_candidates(&tied, Some([0, 0]), 7, DistanceMetric::Euclidean);
    assert_eq!(
        leading_tie_count(&tied_ranked, Some([0, 0]), 7, DistanceMetric::Euclidean),
        2
    );
}

#[test]
fn test_metric_changes_ranking() {
    // From the reflection (0,0): euclidean ties 25 = 25, chebyshev prefers (3,4)
    let candidates: Vec<CellCoord> = vec![[0, 5], [3, 4]];

    let euclidean = rank_candidates(&candidates, Some([6, 6]), 7, DistanceMetric::Euclidean);
    assert_eq!(euclidean, vec![[0, 5], [3, 4]]);

    let chebyshev = rank_candidates(&candidates, Some([6, 6]), 7, DistanceMetric::Chebyshev);
    assert_eq!(chebyshev, vec![[3, 4], [0, 5]]);
}

#[test]
fn test_cell_set_operations() {
    let mut set = CellSet::new(4);
    assert!(set.is_empty());

    set.insert([0, 0]);
    set.insert([3, 2]);
    set.insert([9, 9]);

    assert!(set.contains([0, 0]));
    assert!(set.contains([3, 2]));
    assert!(!set.contains([9, 9]));
    assert_eq!(set.count(), 2);
    assert_eq!(set.to_vec(), vec![[0, 0], [3, 2]]);

    set.remove([0, 0]);
    assert!(!set.contains([0, 0]));

    set.clear();
    assert!(set.is_empty());
}

#[test]
fn test_step_by_step_inspection() {
    let grid = FacetGrid::new(3).expect("grid");
    let registry = RegionRegistry::new(3);
    let budget = ColorBudget {
        blue_max: 1,
        green_max: None,
    };
    let mut sampler = PlacementSampler::new(grid, registry, budget, SamplerConfig::default())
        .expect("sampler");

    assert_eq!(sampler.total_quota(), 9);
    assert_eq!(sampler.quota(CurvatureClass::Vertex), 4);
    assert_eq!(sampler.quota(CurvatureClass::Face), 1);

    assert!(sampler.step().expect("step"));
    assert_eq!(sampler.iterations(), 1);
    assert_eq!(sampler.log().len(), 1);
    assert_eq!(sampler.grid().count_of(Color::Blue), 1);
    assert!(sampler.warnings().is_empty());

    let report = sampler.finish().expect("finish");
    assert_eq!(report.stats.blue, 1);
    assert_eq!(report.stats.green, 8);
}

#[test]
fn test_sampler_rejects_bad_configuration() {
    let budget = ColorBudget {
        blue_max: 1,
        green_max: None,
    };

    let duplicate_priority = SamplerConfig {
        priority: [
            CurvatureClass::Vertex,
            CurvatureClass::Vertex,
            CurvatureClass::Face,
        ],
        ..SamplerConfig::default()
    };
    let grid = FacetGrid::new(3).expect("grid");
    let registry = RegionRegistry::new(3);
    assert!(PlacementSampler::new(grid, registry, budget, duplicate_priority).is_err());

    let zero_depth = SamplerConfig {
        backtrack_depth: 0,
        ..SamplerConfig::default()
    };
    let grid = FacetGrid::new(3).expect("grid");
    let registry = RegionRegistry::new(3);
    assert!(PlacementSampler::new(grid, registry, budget, zero_depth).is_err());

    let bad_coverage = SamplerConfig {
        class_coverage: [1.5, 1.0, 1.0],
        ..SamplerConfig::default()
    };
    let grid = FacetGrid::new(3).expect("grid");
    let registry = RegionRegistry::new(3);
    assert!(PlacementSampler::new(grid, registry, budget, bad_coverage).is_err());

    let mismatched_registry = RegionRegistry::new(5);
    let grid = FacetGrid::new(3).expect("grid");
    assert!(
        PlacementSampler::new(grid, mismatched_registry, budget, SamplerConfig::default())
            .is_err()
    );
}
