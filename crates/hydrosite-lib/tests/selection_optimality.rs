//! The selector must match an exhaustive search on small candidate sets.

use hydrosite_lib::{CandidateSegment, PlantSelection, PlantSelector};
use proptest::prelude::*;

fn candidate(intake: usize, length: usize, power: f64) -> CandidateSegment {
    CandidateSegment {
        intake,
        restitution: intake + length,
        head_drop: power,
        discharge: 1.0,
        power,
        ranking_power: power,
    }
}

fn compatible(a: &CandidateSegment, b: &CandidateSegment, spacing: usize) -> bool {
    a.restitution + spacing <= b.intake || b.restitution + spacing <= a.intake
}

fn is_feasible(plants: &[CandidateSegment], spacing: usize) -> bool {
    plants.iter().enumerate().all(|(i, a)| {
        plants[i + 1..]
            .iter()
            .all(|b| compatible(a, b, spacing))
    })
}

/// Best total over every subset.
fn exhaustive_best(candidates: &[CandidateSegment], spacing: usize) -> f64 {
    let mut best = 0.0_f64;
    for mask in 0u32..(1 << candidates.len()) {
        let subset: Vec<CandidateSegment> = candidates
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, c)| *c)
            .collect();
        if is_feasible(&subset, spacing) {
            best = best.max(subset.iter().map(|c| c.ranking_power).sum());
        }
    }
    best
}

fn candidates_strategy() -> impl Strategy<Value = Vec<CandidateSegment>> {
    prop::collection::vec((0usize..15, 1usize..6, 0.0f64..100.0), 0..=12)
        .prop_map(|raw| {
            raw.into_iter()
                .map(|(intake, length, power)| candidate(intake, length, power))
                .collect()
        })
}

fn assert_well_formed(selection: &PlantSelection, candidates: &[CandidateSegment], spacing: usize) {
    assert!(is_feasible(&selection.plants, spacing));
    for pair in selection.plants.windows(2) {
        assert!(pair[0].restitution + spacing <= pair[1].intake);
    }
    for plant in &selection.plants {
        assert!(candidates.contains(plant));
    }
}

proptest! {
    #[test]
    fn matches_exhaustive_search(candidates in candidates_strategy(), spacing in 0usize..4) {
        let selection = PlantSelector::new(spacing).select(1, &candidates);
        assert_well_formed(&selection, &candidates, spacing);

        let expected = exhaustive_best(&candidates, spacing);
        let tolerance = 1e-6 * expected.max(1.0);
        prop_assert!(
            (selection.total_power() - expected).abs() <= tolerance,
            "selector found {}, exhaustive search {}",
            selection.total_power(),
            expected
        );
    }

    #[test]
    fn selection_is_deterministic(candidates in candidates_strategy(), spacing in 0usize..4) {
        let selector = PlantSelector::new(spacing);
        prop_assert_eq!(selector.select(1, &candidates), selector.select(1, &candidates));
    }
}

#[test]
fn zero_power_candidates_are_never_selected() {
    let candidates = [candidate(0, 3, 0.0), candidate(5, 2, 0.0)];
    let selection = PlantSelector::new(1).select(9, &candidates);
    assert!(selection.is_empty());
    assert_eq!(selection.category, 9);
}

#[test]
fn zero_spacing_lets_plants_share_a_station() {
    let candidates = [candidate(0, 4, 10.0), candidate(4, 4, 10.0)];
    let selection = PlantSelector::new(0).select(1, &candidates);
    assert_eq!(selection.len(), 2);

    let spaced = PlantSelector::new(1).select(1, &candidates);
    assert_eq!(spaced.len(), 1);
}
