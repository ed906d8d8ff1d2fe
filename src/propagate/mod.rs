//! Propagator: arc consistency and forced moves.
//!
//! Turns the combinatorial problem into a smaller one by deduction before
//! the greedy engine ever runs. Monotone: only ever removes possibilities,
//! never adds one back.

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::id::Id;
use crate::model::{Assignment, WeekDay};
use crate::normalize::NormalizedRequest;
use crate::warning::Warning;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForcedAssignment {
    pub operator: Id,
    pub day: WeekDay,
    pub task: Id,
    pub reason: String,
}

/// A requirement line with its still-unforced count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidualLine {
    pub quota_type: crate::model::QuotaType,
    pub remaining: u32,
}

#[derive(Debug, Clone, Default)]
pub struct PropagationResult {
    /// False iff at least one slot line was proven impossible to fill.
    /// Forced assignments from other, satisfiable lines are still returned —
    /// see DESIGN.md for why a single infeasible slot does not discard the
    /// whole result.
    pub feasible: bool,
    pub forced: Vec<ForcedAssignment>,
    pub infeasibility_warnings: Vec<Warning>,
    /// Remaining candidate task ids per `(operator, day)`, after every forced
    /// move has collapsed its operator's domain to a singleton.
    pub domains: BTreeMap<(Id, WeekDay), BTreeSet<Id>>,
    /// Remaining (still-unforced) lines per `(day, task)`.
    pub residual_slots: BTreeMap<(WeekDay, Id), Vec<ResidualLine>>,
}

fn seed_domain(
    normalized: &NormalizedRequest,
    current: &BTreeMap<WeekDay, BTreeMap<Id, Assignment>>,
    op_id: &Id,
    day: WeekDay,
) -> BTreeSet<Id> {
    if let Some(assignment) = current.get(&day).and_then(|d| d.get(op_id)) {
        if assignment.is_frozen() {
            return assignment.task.iter().cloned().collect();
        }
    }

    let Some(operator) = normalized.operators.iter().find(|o| o.id() == op_id) else {
        return BTreeSet::new();
    };
    if !operator.is_available(day) {
        return BTreeSet::new();
    }
    let operator_is_coordinator = operator.operator_type() == crate::model::OperatorType::Coordinator;
    normalized
        .tasks
        .iter()
        .filter(|t| operator.has_skill(t.required_skill()))
        .filter(|t| t.required_skill().is_coordinator_only() == operator_is_coordinator)
        .map(|t| t.id().clone())
        .collect()
}

/// Runs the propagator to a fixed point.
pub fn propagate(
    normalized: &NormalizedRequest,
    current_assignments: &BTreeMap<WeekDay, BTreeMap<Id, Assignment>>,
) -> PropagationResult {
    let mut domains: BTreeMap<(Id, WeekDay), BTreeSet<Id>> = BTreeMap::new();
    for op in &normalized.operators {
        for day in WeekDay::ALL {
            let domain = seed_domain(normalized, current_assignments, op.id(), day);
            domains.insert((op.id().clone(), day), domain);
        }
    }

    // Per (day, task) line: (quota_type, original_count, forced_so_far).
    let mut lines: BTreeMap<(WeekDay, Id), Vec<(crate::model::QuotaType, u32, u32)>> = BTreeMap::new();
    for task in &normalized.tasks {
        let profile = &normalized.profiles[task.id()];
        for day in WeekDay::ALL {
            let day_lines = profile[day.index()]
                .iter()
                .map(|line| (line.quota_type, line.count, 0u32))
                .collect();
            lines.insert((day, task.id().clone()), day_lines);
        }
    }

    let mut forced_this_day: BTreeMap<(Id, WeekDay), Id> = BTreeMap::new();
    let mut forced = Vec::new();

    loop {
        let mut changed = false;
        for ((day, task_id), task_lines) in lines.iter_mut() {
            for (quota_type, original_count, forced_so_far) in task_lines.iter_mut() {
                let remaining = original_count.saturating_sub(*forced_so_far);
                if remaining == 0 {
                    continue;
                }
                let capable: Vec<&Id> = normalized
                    .operators
                    .iter()
                    .map(|o| o.id())
                    .filter(|op_id| !forced_this_day.contains_key(&((*op_id).clone(), *day)))
                    .filter(|op_id| {
                        domains
                            .get(&((*op_id).clone(), *day))
                            .is_some_and(|d| d.contains(task_id))
                    })
                    .filter(|op_id| {
                        let op = normalized.operators.iter().find(|o| o.id() == *op_id).unwrap();
                        quota_type.matches(op.operator_type())
                    })
                    .collect();

                if (capable.len() as u32) < remaining {
                    continue; // handled in the reporting pass below
                }
                if capable.len() as u32 == remaining {
                    for op_id in capable {
                        forced_this_day.insert((op_id.clone(), *day), task_id.clone());
                        domains.insert((op_id.clone(), *day), BTreeSet::from([task_id.clone()]));
                        forced.push(ForcedAssignment {
                            operator: op_id.clone(),
                            day: *day,
                            task: task_id.clone(),
                            reason: format!(
                                "operator {op_id} is the only remaining candidate for {task_id} on {day}"
                            ),
                        });
                        trace!(%op_id, %task_id, %day, "forced assignment");
                    }
                    *forced_so_far = *original_count;
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    let mut feasible = true;
    let mut infeasibility_warnings = Vec::new();
    let mut residual_slots: BTreeMap<(WeekDay, Id), Vec<ResidualLine>> = BTreeMap::new();

    for ((day, task_id), task_lines) in &lines {
        let mut residual = Vec::new();
        for (quota_type, original_count, forced_so_far) in task_lines {
            let remaining = original_count.saturating_sub(*forced_so_far);
            if remaining == 0 {
                continue;
            }
            let capable_count = normalized
                .operators
                .iter()
                .map(|o| o.id())
                .filter(|op_id| !forced_this_day.contains_key(&((*op_id).clone(), *day)))
                .filter(|op_id| {
                    domains
                        .get(&((*op_id).clone(), *day))
                        .is_some_and(|d| d.contains(task_id))
                })
                .filter(|op_id| {
                    let op = normalized.operators.iter().find(|o| o.id() == *op_id).unwrap();
                    quota_type.matches(op.operator_type())
                })
                .count() as u32;

            if capable_count < remaining {
                feasible = false;
                infeasibility_warnings.push(Warning::Understaffed {
                    task: task_id.clone(),
                    day: *day,
                    required: *original_count,
                    available: capable_count + *forced_so_far,
                });
            } else {
                residual.push(ResidualLine {
                    quota_type: *quota_type,
                    remaining,
                });
            }
        }
        if !residual.is_empty() {
            residual_slots.insert((*day, task_id.clone()), residual);
        }
    }

    PropagationResult {
        feasible,
        forced,
        infeasibility_warnings,
        domains,
        residual_slots,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OperatorStatus, OperatorType, QuotaType, RequirementLine, Skill, SystemClock, TaskRequirement};
    use crate::request::ScheduleRequest;
    use std::collections::BTreeSet as Set;

    fn op(id: &str, skills: &[Skill], availability: [bool; 5]) -> crate::model::Operator {
        crate::model::Operator::new(
            Id::from(id),
            id,
            OperatorType::Regular,
            OperatorStatus::Active,
            skills.iter().copied().collect::<Set<_>>(),
            availability,
            vec![],
            false,
        )
        .unwrap()
    }

    fn task(id: &str, skill: Skill) -> crate::model::Task {
        crate::model::Task::new(Id::from(id), id, "#fff", skill, None)
    }

    fn normalized_from(request: &ScheduleRequest) -> NormalizedRequest {
        crate::normalize::normalize(request, &SystemClock).unwrap()
    }

    #[test]
    fn forces_both_operators_when_exactly_matching_demand() {
        let mut availability = [false; 5];
        availability[WeekDay::Mon.index()] = true;
        let request = ScheduleRequest {
            operators: vec![
                op("a", &[Skill::Troubleshooter], availability),
                op("b", &[Skill::Troubleshooter], availability),
            ],
            tasks: vec![task("t1", Skill::Troubleshooter)],
            days: WeekDay::ALL,
            current_assignments: BTreeMap::new(),
            rules: crate::model::SchedulingRules::default(),
            task_requirements: vec![TaskRequirement::new(
                Id::from("t1"),
                true,
                vec![RequirementLine::new(QuotaType::Any, 2)],
                BTreeMap::new(),
            )],
            excluded_tasks: vec![],
            week: None,
            locked: false,
        };
        let normalized = normalized_from(&request);
        let result = propagate(&normalized, &request.current_assignments);
        assert!(result.feasible);
        assert_eq!(result.forced.len(), 2);
        assert!(result.forced.iter().all(|f| f.day == WeekDay::Mon && f.task == Id::from("t1")));
    }

    #[test]
    fn reports_infeasible_when_too_few_capable_operators() {
        let mut availability = [false; 5];
        availability[WeekDay::Mon.index()] = true;
        let request = ScheduleRequest {
            operators: vec![op("a", &[Skill::Troubleshooter], availability)],
            tasks: vec![task("t1", Skill::Troubleshooter)],
            days: WeekDay::ALL,
            current_assignments: BTreeMap::new(),
            rules: crate::model::SchedulingRules::default(),
            task_requirements: vec![TaskRequirement::new(
                Id::from("t1"),
                true,
                vec![RequirementLine::new(QuotaType::Any, 2)],
                BTreeMap::new(),
            )],
            excluded_tasks: vec![],
            week: None,
            locked: false,
        };
        let normalized = normalized_from(&request);
        let result = propagate(&normalized, &request.current_assignments);
        assert!(!result.feasible);
        assert!(result.forced.is_empty());
        // The requirement has no day override, so it applies to every
        // workday: one understaffed warning per day, five in total.
        assert_eq!(result.infeasibility_warnings.len(), 5);
        for warning in &result.infeasibility_warnings {
            match warning {
                Warning::Understaffed { day, required, available, .. } => {
                    assert_eq!(*required, 2);
                    let expected_available = if *day == WeekDay::Mon { 1 } else { 0 };
                    assert_eq!(*available, expected_available);
                }
                other => panic!("unexpected warning: {other:?}"),
            }
        }
    }

    #[test]
    fn locked_cell_freezes_domain_to_its_assigned_task() {
        let request = ScheduleRequest {
            operators: vec![op("a", &[Skill::Troubleshooter, Skill::QualityChecker], [true; 5])],
            tasks: vec![task("t1", Skill::Troubleshooter), task("t2", Skill::QualityChecker)],
            days: WeekDay::ALL,
            current_assignments: {
                let mut m = BTreeMap::new();
                let mut day = BTreeMap::new();
                day.insert(
                    Id::from("a"),
                    Assignment {
                        task: Some(Id::from("t2")),
                        pinned: false,
                        locked: true,
                    },
                );
                m.insert(WeekDay::Mon, day);
                m
            },
            rules: crate::model::SchedulingRules::default(),
            task_requirements: vec![],
            excluded_tasks: vec![],
            week: None,
            locked: false,
        };
        let normalized = normalized_from(&request);
        let result = propagate(&normalized, &request.current_assignments);
        let domain = &result.domains[&(Id::from("a"), WeekDay::Mon)];
        assert_eq!(domain, &BTreeSet::from([Id::from("t2")]));
    }
}
