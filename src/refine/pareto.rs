//! Pareto driver: multi-seed diversification and non-dominance filtering.

use rand::seq::SliceRandom;

use crate::greedy::scoring::{biased_pipeline, BIAS_PALETTE};
use crate::model::{Assignment, RefinerBudgets, SchedulingRules, WeekDay, WeeklySchedule};
use crate::normalize::NormalizedRequest;
use crate::prioritize::PrioritizedSlot;
use crate::propagate::PropagationResult;
use crate::result::ScheduleResult;

use super::objective::{non_dominated_front, normalized_distance, ObjectiveVector};

/// Shuffles runs of slots that share `(tier, demand)` using a seed-specific
/// RNG, giving each Pareto seed slightly different tie orderings.
fn permute_ties(mut slots: Vec<PrioritizedSlot>, rng: &mut impl rand::Rng) -> Vec<PrioritizedSlot> {
    let mut start = 0;
    while start < slots.len() {
        let mut end = start + 1;
        while end < slots.len() && slots[end].tier == slots[start].tier && slots[end].demand == slots[start].demand {
            end += 1;
        }
        slots[start..end].shuffle(rng);
        start = end;
    }
    slots
}

/// Runs the greedy engine across `budgets.pareto_seed_count` seeds, then
/// filters to the non-dominated front and selects up to
/// `budgets.pareto_front_cap` diverse representatives.
pub fn refine(
    normalized: &NormalizedRequest,
    propagation: &PropagationResult,
    prioritized: &[PrioritizedSlot],
    current_assignments: &std::collections::BTreeMap<WeekDay, std::collections::BTreeMap<crate::id::Id, Assignment>>,
    rules: &SchedulingRules,
    budgets: &RefinerBudgets,
) -> Vec<ScheduleResult> {
    let n_ops = normalized.operators.len();
    let days = WeekDay::ALL.len();

    let mut candidates: Vec<(WeeklySchedule, Vec<crate::warning::Warning>, ObjectiveVector)> = Vec::new();
    for seed_index in 0..budgets.pareto_seed_count {
        let seed_fingerprint = normalized.fingerprint.for_seed(seed_index);
        let mut tie_rng = seed_fingerprint.rng();
        let permuted = permute_ties(prioritized.to_vec(), &mut tie_rng);
        let bias = BIAS_PALETTE[seed_index as usize % BIAS_PALETTE.len()];
        let pipeline = biased_pipeline(rules, bias);

        let outcome = crate::greedy::run_with_pipeline(
            normalized,
            propagation,
            &permuted,
            current_assignments,
            rules,
            seed_fingerprint,
            pipeline,
        );
        let objectives = ObjectiveVector::compute(&outcome.schedule, &normalized.operators, &normalized.tasks);
        candidates.push((outcome.schedule, outcome.warnings, objectives));
    }

    let vectors: Vec<ObjectiveVector> = candidates.iter().map(|(_, _, v)| *v).collect();
    let front_vectors = non_dominated_front(vectors);

    let mut front: Vec<(WeeklySchedule, Vec<crate::warning::Warning>, ObjectiveVector)> = candidates
        .into_iter()
        .filter(|(_, _, v)| front_vectors.contains(v))
        .collect();

    // Deduplicate identical objective vectors (distinct seeds can converge).
    front.sort_by(|a, b| a.2.skill_match.partial_cmp(&b.2.skill_match).unwrap().reverse());
    front.dedup_by(|a, b| a.2 == b.2);

    let selected = farthest_first(front, budgets.pareto_front_cap, n_ops, days);

    selected
        .into_iter()
        .map(|(schedule, warnings, objectives)| ScheduleResult::new(schedule, warnings).with_objectives(objectives))
        .collect()
}

/// Greedily selects up to `cap` entries maximizing minimum distance to the
/// already-selected set: farthest-first traversal in the normalized
/// objective space.
fn farthest_first(
    mut pool: Vec<(WeeklySchedule, Vec<crate::warning::Warning>, ObjectiveVector)>,
    cap: usize,
    n_ops: usize,
    days: usize,
) -> Vec<(WeeklySchedule, Vec<crate::warning::Warning>, ObjectiveVector)> {
    if pool.len() <= cap {
        return pool;
    }
    let mut selected = vec![pool.remove(0)];
    while selected.len() < cap && !pool.is_empty() {
        let (best_index, _) = pool
            .iter()
            .enumerate()
            .map(|(i, (_, _, v))| {
                let min_distance = selected
                    .iter()
                    .map(|(_, _, s)| normalized_distance(v, s, n_ops, days))
                    .fold(f64::INFINITY, f64::min);
                (i, min_distance)
            })
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();
        selected.push(pool.remove(best_index));
    }
    selected
}
