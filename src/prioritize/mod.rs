//! Slot Prioritizer: most-constrained-first ordering.
//!
//! A pure sort over the propagator's residual slots; owns no mutable state.

use crate::id::Id;
use crate::model::{QuotaType, Task, WeekDay};
use crate::normalize::NormalizedRequest;
use crate::propagate::PropagationResult;

/// Static name-to-tier mapping. Heavy tasks are tier 1, coordinator-only
/// tasks fall back to tier 3, everything else is tier 2.
pub fn tier_of(task: &Task) -> u8 {
    if task.is_heavy() {
        1
    } else if task.required_skill().is_coordinator_only() {
        3
    } else {
        2
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrioritizedSlot {
    pub day: WeekDay,
    pub task: Id,
    pub quota_type: QuotaType,
    pub tier: u8,
    pub constrainedness: f64,
    pub demand: u32,
}

fn eligible_count(normalized: &NormalizedRequest, propagation: &PropagationResult, day: WeekDay, task: &Id, quota_type: QuotaType) -> usize {
    normalized
        .operators
        .iter()
        .filter(|op| quota_type.matches(op.operator_type()))
        .filter(|op| {
            propagation
                .domains
                .get(&(op.id().clone(), day))
                .is_some_and(|d| d.contains(task))
        })
        .count()
}

/// Ranks every residual `(day, task, line)` slot by tier, constrainedness,
/// and demand, with a stable `(day, task id)` tie-break.
pub fn prioritize(normalized: &NormalizedRequest, propagation: &PropagationResult) -> Vec<PrioritizedSlot> {
    let mut slots = Vec::new();
    for ((day, task_id), lines) in &propagation.residual_slots {
        let Some(task) = normalized.tasks.iter().find(|t| t.id() == task_id) else {
            continue;
        };
        let tier = tier_of(task);
        for line in lines {
            let eligible = eligible_count(normalized, propagation, *day, task_id, line.quota_type);
            let constrainedness = eligible as f64 / (line.remaining.max(1)) as f64;
            slots.push(PrioritizedSlot {
                day: *day,
                task: task_id.clone(),
                quota_type: line.quota_type,
                tier,
                constrainedness,
                demand: line.remaining,
            });
        }
    }

    slots.sort_by(|a, b| {
        a.tier
            .cmp(&b.tier)
            .then(a.constrainedness.total_cmp(&b.constrainedness))
            .then(b.demand.cmp(&a.demand))
            .then(a.day.cmp(&b.day))
            .then(a.task.cmp(&b.task))
    });
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Operator, OperatorStatus, OperatorType, QuotaType, RequirementLine, Skill, SystemClock, TaskRequirement};
    use crate::request::ScheduleRequest;
    use std::collections::{BTreeMap, BTreeSet};

    fn op(id: &str, skill: Skill) -> Operator {
        Operator::new(
            Id::from(id),
            id,
            OperatorType::Regular,
            OperatorStatus::Active,
            BTreeSet::from([skill]),
            [true; 5],
            vec![],
            false,
        )
        .unwrap()
    }

    fn task(id: &str, skill: Skill, heavy: Option<bool>) -> crate::model::Task {
        crate::model::Task::new(Id::from(id), id, "#fff", skill, heavy)
    }

    #[test]
    fn heavy_tasks_sort_before_standard_tasks() {
        let request = ScheduleRequest {
            // Two operators can cover "heavy" but demand is only 1, so the
            // propagator can't force either of them — the slot survives into
            // the residual set the prioritizer ranks.
            operators: vec![
                op("a", Skill::Troubleshooter),
                op("c", Skill::Troubleshooter),
                op("b", Skill::QualityChecker),
            ],
            tasks: vec![
                task("heavy", Skill::Troubleshooter, None),
                task("std", Skill::QualityChecker, None),
            ],
            days: WeekDay::ALL,
            current_assignments: BTreeMap::new(),
            rules: crate::model::SchedulingRules::default(),
            task_requirements: vec![
                TaskRequirement::new(
                    Id::from("heavy"),
                    true,
                    vec![RequirementLine::new(QuotaType::Any, 1)],
                    BTreeMap::new(),
                ),
                TaskRequirement::new(
                    Id::from("std"),
                    true,
                    vec![RequirementLine::new(QuotaType::Any, 1)],
                    BTreeMap::new(),
                ),
            ],
            excluded_tasks: vec![],
            week: None,
            locked: false,
        };
        let normalized = crate::normalize::normalize(&request, &SystemClock).unwrap();
        let propagation = crate::propagate::propagate(&normalized, &request.current_assignments);
        let slots = prioritize(&normalized, &propagation);
        assert!(!slots.is_empty());
        assert_eq!(slots[0].task, Id::from("heavy"));
        assert_eq!(slots[0].tier, 1);
    }

    #[test]
    fn tie_break_orders_by_day_then_task_id() {
        let request = ScheduleRequest {
            operators: vec![op("a", Skill::QualityChecker), op("b", Skill::QualityChecker)],
            tasks: vec![task("t1", Skill::QualityChecker, None), task("t2", Skill::QualityChecker, None)],
            days: WeekDay::ALL,
            current_assignments: BTreeMap::new(),
            rules: crate::model::SchedulingRules::default(),
            task_requirements: vec![],
            excluded_tasks: vec![],
            week: None,
            locked: false,
        };
        let normalized = crate::normalize::normalize(&request, &SystemClock).unwrap();
        let propagation = crate::propagate::propagate(&normalized, &request.current_assignments);
        let slots = prioritize(&normalized, &propagation);
        let mon_slots: Vec<&Id> = slots.iter().filter(|s| s.day == WeekDay::Mon).map(|s| &s.task).collect();
        let mut sorted = mon_slots.clone();
        sorted.sort();
        assert_eq!(mon_slots, sorted);
    }
}
