//! Greedy Engine: the primary solver.

pub mod scoring;

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::id::Id;
use crate::model::{Assignment, QuotaType, SchedulingRules, Skill, WeekDay, WeeklySchedule};
use crate::normalize::NormalizedRequest;
use crate::propagate::PropagationResult;
use crate::prioritize::PrioritizedSlot;
use crate::warning::Warning;

use scoring::{score, Candidate, ScoringContext};

fn is_consecutive(prev: WeekDay, day: WeekDay) -> bool {
    day.index() == prev.index() + 1
}

/// Mutable bookkeeping the greedy engine threads through every assignment
/// decision.
#[derive(Debug, Clone, Default)]
pub struct EngineState {
    assigned: BTreeMap<(Id, WeekDay), Id>,
    workload: BTreeMap<Id, u32>,
    heavy_count: BTreeMap<Id, u32>,
    last_heavy_day: BTreeMap<Id, WeekDay>,
    /// Per operator: `(task, last day worked on it, consecutive run length)`.
    task_streak: BTreeMap<Id, (Id, WeekDay, u32)>,
}

impl EngineState {
    pub fn workload(&self, op: &Id) -> u32 {
        self.workload.get(op).copied().unwrap_or(0)
    }

    pub fn heavy_count(&self, op: &Id) -> u32 {
        self.heavy_count.get(op).copied().unwrap_or(0)
    }

    fn is_assigned(&self, op: &Id, day: WeekDay) -> bool {
        self.assigned.contains_key(&(op.clone(), day))
    }

    fn streak_after(&self, op: &Id, task: &Id, day: WeekDay) -> u32 {
        match self.task_streak.get(op) {
            Some((last_task, last_day, len)) if last_task == task && is_consecutive(*last_day, day) => len + 1,
            _ => 1,
        }
    }

    fn record(&mut self, op: Id, day: WeekDay, task: &Id, heavy: bool) {
        self.assigned.insert((op.clone(), day), task.clone());
        *self.workload.entry(op.clone()).or_insert(0) += 1;
        let streak = self.streak_after(&op, task, day);
        self.task_streak.insert(op.clone(), (task.clone(), day, streak));
        if heavy {
            *self.heavy_count.entry(op.clone()).or_insert(0) += 1;
            self.last_heavy_day.insert(op, day);
        }
    }

    fn unrecord(&mut self, op: &Id, day: WeekDay, heavy: bool) {
        self.assigned.remove(&(op.clone(), day));
        if let Some(w) = self.workload.get_mut(op) {
            *w = w.saturating_sub(1);
        }
        if heavy {
            if let Some(c) = self.heavy_count.get_mut(op) {
                *c = c.saturating_sub(1);
            }
            if self.last_heavy_day.get(op) == Some(&day) {
                self.last_heavy_day.remove(op);
            }
        }
        self.task_streak.remove(op);
    }
}

struct RemainingLine {
    quota_type: QuotaType,
    remaining: u32,
}

/// Result of one greedy solve: the schedule plus every warning raised.
pub struct GreedyOutcome {
    pub schedule: WeeklySchedule,
    pub warnings: Vec<Warning>,
}

fn tasks_per_skill(normalized: &NormalizedRequest) -> BTreeMap<Skill, u32> {
    let mut counts = BTreeMap::new();
    for task in &normalized.tasks {
        *counts.entry(task.required_skill()).or_insert(0) += 1;
    }
    counts
}

/// Seeds engine state and the schedule from frozen (`pinned`/`locked`) cells
/// and the propagator's forced assignments, which are authoritative and
/// never subject to scoring.
fn seed_schedule(
    normalized: &NormalizedRequest,
    propagation: &PropagationResult,
    current_assignments: &BTreeMap<WeekDay, BTreeMap<Id, Assignment>>,
) -> (WeeklySchedule, EngineState) {
    let mut schedule = WeeklySchedule::new(normalized.week);
    let mut state = EngineState::default();

    for (day, day_assignments) in current_assignments {
        for (op_id, assignment) in day_assignments {
            if assignment.is_frozen() {
                schedule.set_assignment(*day, op_id.clone(), assignment.clone());
                if let Some(task_id) = &assignment.task {
                    let heavy = normalized
                        .tasks
                        .iter()
                        .find(|t| t.id() == task_id)
                        .is_some_and(|t| t.is_heavy());
                    state.record(op_id.clone(), *day, task_id, heavy);
                }
            }
        }
    }

    for forced in &propagation.forced {
        if schedule.assignment(forced.day, &forced.operator).is_some() {
            continue;
        }
        schedule.set_assignment(forced.day, forced.operator.clone(), Assignment::task(forced.task.clone()));
        let heavy = normalized
            .tasks
            .iter()
            .find(|t| t.id() == forced.task)
            .is_some_and(|t| t.is_heavy());
        state.record(forced.operator.clone(), forced.day, &forced.task, heavy);
        debug!(operator = %forced.operator, day = %forced.day, task = %forced.task, "committed forced assignment");
    }

    (schedule, state)
}

fn hard_eligible(
    normalized: &NormalizedRequest,
    propagation: &PropagationResult,
    rules: &SchedulingRules,
    state: &EngineState,
    op_id: &Id,
    day: WeekDay,
    task_id: &Id,
    quota_type: QuotaType,
) -> bool {
    let Some(operator) = normalized.operators.iter().find(|o| o.id() == op_id) else {
        return false;
    };
    if !quota_type.matches(operator.operator_type()) {
        return false;
    }
    if state.is_assigned(op_id, day) {
        return false;
    }
    if !propagation
        .domains
        .get(&(op_id.clone(), day))
        .is_some_and(|d| d.contains(task_id))
    {
        return false;
    }
    let task = normalized.tasks.iter().find(|t| t.id() == task_id);
    let Some(task) = task else { return false };

    if state.streak_after(op_id, task_id, day) > rules.max_consecutive_days_on_same_task {
        return false;
    }
    if !rules.allow_consecutive_heavy_shifts && task.is_heavy() {
        if let Some(last_heavy) = state.last_heavy_day.get(op_id) {
            if is_consecutive(*last_heavy, day) {
                return false;
            }
        }
    }
    true
}

/// Finds the best eligible candidate for one `(day, task, quota_type)` slot,
/// or `None` if no eligible operator remains.
fn best_candidate(
    normalized: &NormalizedRequest,
    propagation: &PropagationResult,
    rules: &SchedulingRules,
    state: &EngineState,
    pipeline: &[scoring::ScoreTerm],
    fingerprint: crate::fingerprint::Fingerprint,
    tasks_per_skill: &BTreeMap<Skill, u32>,
    day: WeekDay,
    task_id: &Id,
    quota_type: QuotaType,
) -> Option<Id> {
    let task = normalized.tasks.iter().find(|t| t.id() == task_id)?;
    let mut best: Option<(Id, f64, u64)> = None;
    for operator in &normalized.operators {
        if !hard_eligible(normalized, propagation, rules, state, operator.id(), day, task_id, quota_type) {
            continue;
        }
        let candidate = Candidate { operator, day, task };
        let ctx = ScoringContext {
            state,
            rules,
            fingerprint,
            tasks_per_skill,
        };
        let candidate_score = score(&candidate, &ctx, pipeline);
        let tie_break = fingerprint.candidate_seed(operator.id(), day, task_id);
        let better = match &best {
            None => true,
            Some((best_id, best_score, best_tie)) => {
                candidate_score > *best_score
                    || (candidate_score == *best_score && tie_break > *best_tie)
                    || (candidate_score == *best_score && tie_break == *best_tie && operator.id() < best_id)
            }
        };
        if better {
            best = Some((operator.id().clone(), candidate_score, tie_break));
        }
    }
    best.map(|(id, _, _)| id)
}

const MAX_REPAIR_ITERATIONS: u32 = 50;

/// Runs the greedy engine: prioritized-slot assignment followed by a bounded
/// repair pass.
pub fn run(
    normalized: &NormalizedRequest,
    propagation: &PropagationResult,
    prioritized: &[PrioritizedSlot],
    current_assignments: &BTreeMap<WeekDay, BTreeMap<Id, Assignment>>,
    rules: &SchedulingRules,
    fingerprint: crate::fingerprint::Fingerprint,
) -> GreedyOutcome {
    run_with_pipeline(
        normalized,
        propagation,
        prioritized,
        current_assignments,
        rules,
        fingerprint,
        scoring::default_pipeline(rules),
    )
}

/// Like [`run`], but with an explicit scoring pipeline — used by the Pareto
/// driver to bias each seed toward a different objective.
pub fn run_with_pipeline(
    normalized: &NormalizedRequest,
    propagation: &PropagationResult,
    prioritized: &[PrioritizedSlot],
    current_assignments: &BTreeMap<WeekDay, BTreeMap<Id, Assignment>>,
    rules: &SchedulingRules,
    fingerprint: crate::fingerprint::Fingerprint,
    pipeline: Vec<scoring::ScoreTerm>,
) -> GreedyOutcome {
    let (mut schedule, mut state) = seed_schedule(normalized, propagation, current_assignments);
    let skill_counts = tasks_per_skill(normalized);
    let mut warnings = Vec::new();

    // Mutable remaining counts per (day, task, quota_type); seeded from the
    // prioritizer's snapshot and drawn down as we assign.
    let mut remaining: BTreeMap<(WeekDay, Id, QuotaType), u32> = BTreeMap::new();
    for slot in prioritized {
        remaining.insert((slot.day, slot.task.clone(), slot.quota_type), slot.demand);
    }

    for slot in prioritized {
        loop {
            let left = remaining[&(slot.day, slot.task.clone(), slot.quota_type)];
            if left == 0 {
                break;
            }
            let candidate = best_candidate(
                normalized,
                propagation,
                rules,
                &state,
                &pipeline,
                fingerprint,
                &skill_counts,
                slot.day,
                &slot.task,
                slot.quota_type,
            );
            let Some(op_id) = candidate else {
                warn!(day = %slot.day, task = %slot.task, "no eligible candidate remains for slot");
                break;
            };
            let heavy = normalized
                .tasks
                .iter()
                .find(|t| t.id() == slot.task)
                .is_some_and(|t| t.is_heavy());
            state.record(op_id.clone(), slot.day, &slot.task, heavy);
            schedule.set_assignment(slot.day, op_id, Assignment::task(slot.task.clone()));
            *remaining.get_mut(&(slot.day, slot.task.clone(), slot.quota_type)).unwrap() -= 1;
        }

        let left = remaining[&(slot.day, slot.task.clone(), slot.quota_type)];
        if left > 0 {
            let available = normalized
                .operators
                .iter()
                .filter(|o| slot.quota_type.matches(o.operator_type()))
                .filter(|o| {
                    propagation
                        .domains
                        .get(&(o.id().clone(), slot.day))
                        .is_some_and(|d| d.contains(&slot.task))
                })
                .count() as u32;
            warnings.push(Warning::Understaffed {
                task: slot.task.clone(),
                day: slot.day,
                required: slot.demand,
                available,
            });
        }
    }

    repair(normalized, propagation, rules, &mut schedule, &mut state, &remaining);

    GreedyOutcome { schedule, warnings }
}

/// Bounded best-effort repair: tries to resolve remaining under-fills by
/// swapping an operator off a task whose line still has slack elsewhere.
fn repair(
    normalized: &NormalizedRequest,
    propagation: &PropagationResult,
    rules: &SchedulingRules,
    schedule: &mut WeeklySchedule,
    state: &mut EngineState,
    remaining: &BTreeMap<(WeekDay, Id, QuotaType), u32>,
) {
    let mut under_filled: Vec<(WeekDay, Id, QuotaType)> = remaining
        .iter()
        .filter(|(_, &count)| count > 0)
        .map(|(key, _)| key.clone())
        .collect();
    under_filled.sort();

    for _ in 0..MAX_REPAIR_ITERATIONS {
        let before = under_filled.len();
        under_filled.retain(|(day, task_id, quota_type)| {
            for operator in &normalized.operators {
                let Some(current_task) = schedule
                    .assignment(*day, operator.id())
                    .and_then(|a| a.task.clone())
                else {
                    continue;
                };
                if schedule.assignment(*day, operator.id()).unwrap().is_frozen() {
                    continue;
                }
                if current_task == *task_id {
                    continue;
                }
                if !hard_eligible(normalized, propagation, rules, state, operator.id(), *day, task_id, *quota_type) {
                    continue;
                }
                let current_heavy = normalized
                    .tasks
                    .iter()
                    .find(|t| t.id() == &current_task)
                    .is_some_and(|t| t.is_heavy());
                state.unrecord(operator.id(), *day, current_heavy);
                if !hard_eligible(normalized, propagation, rules, state, operator.id(), *day, task_id, *quota_type) {
                    // Re-assigning would now violate a constraint; undo.
                    let heavy = current_heavy;
                    state.record(operator.id().clone(), *day, &current_task, heavy);
                    continue;
                }
                let new_heavy = normalized
                    .tasks
                    .iter()
                    .find(|t| t.id() == task_id)
                    .is_some_and(|t| t.is_heavy());
                state.record(operator.id().clone(), *day, task_id, new_heavy);
                schedule.set_assignment(*day, operator.id().clone(), Assignment::task(task_id.clone()));
                return false;
            }
            true
        });
        if under_filled.is_empty() || under_filled.len() == before {
            break;
        }
    }
}
