//! The objective vector and its aggregation into a single scalar.

use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::id::Id;
use crate::model::{Operator, Task, WeekDay, WeeklySchedule};

/// The five-dimensional objective vector.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectiveVector {
    /// Mean absolute deviation of shift counts. Lower is better.
    pub fairness: f64,
    /// Max − min of shift counts. Lower is better.
    pub balance: f64,
    /// Percentage (0..=100) of assignments where skill strictly matches. Higher is better.
    pub skill_match: f64,
    /// Mean absolute deviation of heavy-task counts. Lower is better.
    pub heavy_fairness: f64,
    /// Mean number of distinct tasks per operator across the week. Higher is better.
    pub variety: f64,
}

fn shift_counts(schedule: &WeeklySchedule, operators: &[Operator]) -> Vec<u32> {
    operators
        .iter()
        .map(|op| {
            WeekDay::ALL
                .iter()
                .filter(|&&day| {
                    schedule
                        .assignment(day, op.id())
                        .is_some_and(|a| a.task.is_some())
                })
                .count() as u32
        })
        .collect()
}

fn heavy_counts(schedule: &WeeklySchedule, operators: &[Operator], tasks: &[Task]) -> Vec<u32> {
    operators
        .iter()
        .map(|op| {
            WeekDay::ALL
                .iter()
                .filter(|&&day| {
                    schedule
                        .assignment(day, op.id())
                        .and_then(|a| a.task.as_ref())
                        .and_then(|task_id| tasks.iter().find(|t| t.id() == task_id))
                        .is_some_and(Task::is_heavy)
                })
                .count() as u32
        })
        .collect()
}

fn mean_absolute_deviation(counts: &[u32]) -> f64 {
    if counts.is_empty() {
        return 0.0;
    }
    let mean = counts.iter().sum::<u32>() as f64 / counts.len() as f64;
    counts.iter().map(|&c| (c as f64 - mean).abs()).sum::<f64>() / counts.len() as f64
}

fn skill_match_percentage(schedule: &WeeklySchedule, operators: &[Operator], tasks: &[Task]) -> f64 {
    let mut total = 0u32;
    let mut matched = 0u32;
    for day in WeekDay::ALL {
        for op in operators {
            let Some(assignment) = schedule.assignment(day, op.id()) else {
                continue;
            };
            let Some(task_id) = assignment.task.as_ref() else {
                continue;
            };
            total += 1;
            if let Some(task) = tasks.iter().find(|t| t.id() == task_id) {
                if op.has_skill(task.required_skill()) {
                    matched += 1;
                }
            }
        }
    }
    if total == 0 {
        100.0
    } else {
        matched as f64 / total as f64 * 100.0
    }
}

fn variety(schedule: &WeeklySchedule, operators: &[Operator]) -> f64 {
    if operators.is_empty() {
        return 0.0;
    }
    let total_distinct: usize = operators
        .iter()
        .map(|op| {
            let distinct: BTreeSet<&Id> = WeekDay::ALL
                .iter()
                .filter_map(|&day| schedule.assignment(day, op.id()).and_then(|a| a.task.as_ref()))
                .collect();
            distinct.len()
        })
        .sum();
    total_distinct as f64 / operators.len() as f64
}

impl ObjectiveVector {
    pub fn compute(schedule: &WeeklySchedule, operators: &[Operator], tasks: &[Task]) -> Self {
        let shifts = shift_counts(schedule, operators);
        let heavy = heavy_counts(schedule, operators, tasks);
        let balance = shifts.iter().max().copied().unwrap_or(0) as f64
            - shifts.iter().min().copied().unwrap_or(0) as f64;
        Self {
            fairness: mean_absolute_deviation(&shifts),
            balance,
            skill_match: skill_match_percentage(schedule, operators, tasks),
            heavy_fairness: mean_absolute_deviation(&heavy),
            variety: variety(schedule, operators),
        }
    }

    /// A dominates B iff A is at least as good on every dimension and
    /// strictly better on one.
    pub fn dominates(&self, other: &Self) -> bool {
        let at_least_as_good = self.fairness <= other.fairness
            && self.balance <= other.balance
            && self.skill_match >= other.skill_match
            && self.heavy_fairness <= other.heavy_fairness
            && self.variety >= other.variety;
        let strictly_better = self.fairness < other.fairness
            || self.balance < other.balance
            || self.skill_match > other.skill_match
            || self.heavy_fairness < other.heavy_fairness
            || self.variety > other.variety;
        at_least_as_good && strictly_better
    }

    /// Normalizes each dimension to `[0, 1]` where `1.0` is best, using fixed
    /// reference ranges: fairness in `[0, n_ops * d / 2]`, balance in
    /// `[0, d]`, skill match already in `[0, 100]`, heavy fairness shares
    /// fairness's range, variety in `[0, d]` (at most `d` distinct tasks
    /// across `d` workdays).
    pub fn normalized_goodness(&self, n_ops: usize, days: usize) -> [f64; 5] {
        let fairness_range = (n_ops as f64 * days as f64 / 2.0).max(1.0);
        let balance_range = (days as f64).max(1.0);
        let variety_range = (days as f64).max(1.0);
        [
            1.0 - (self.fairness / fairness_range).min(1.0),
            1.0 - (self.balance / balance_range).min(1.0),
            (self.skill_match / 100.0).clamp(0.0, 1.0),
            1.0 - (self.heavy_fairness / fairness_range).min(1.0),
            (self.variety / variety_range).min(1.0),
        ]
    }

    /// The weighted aggregate on `[0, 100]`. Panics if the rules carry
    /// un-normalized weights; callers validate weights up front.
    pub fn aggregate(&self, weights: &crate::model::ObjectiveWeights, n_ops: usize, days: usize) -> f64 {
        debug_assert!(weights.is_normalized(), "objective weights must sum to 1.0");
        let g = self.normalized_goodness(n_ops, days);
        let score = weights.fairness * g[0]
            + weights.balance * g[1]
            + weights.skill_match * g[2]
            + weights.heavy_fairness * g[3]
            + weights.variety * g[4];
        score * 100.0
    }
}

/// Euclidean distance between two candidates' normalized objective vectors,
/// used by the Pareto driver's farthest-first diversity selection.
pub fn normalized_distance(
    a: &ObjectiveVector,
    b: &ObjectiveVector,
    n_ops: usize,
    days: usize,
) -> f64 {
    let ga = a.normalized_goodness(n_ops, days);
    let gb = b.normalized_goodness(n_ops, days);
    ga.iter()
        .zip(gb.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Filters `candidates` down to the non-dominated front: an antichain where
/// no entry dominates another.
pub fn non_dominated_front(candidates: Vec<ObjectiveVector>) -> Vec<ObjectiveVector> {
    candidates
        .iter()
        .enumerate()
        .filter(|(i, candidate)| {
            !candidates
                .iter()
                .enumerate()
                .any(|(j, other)| i != &j && other.dominates(candidate))
        })
        .map(|(_, candidate)| *candidate)
        .collect()
}
