//! Validator: an independent pass that classifies violations of any
//! [`WeeklySchedule`], deterministic for a given input.

use crate::model::requirement::resolve_profile;
use crate::model::{Operator, SchedulingRules, Task, TaskRequirement, WeekDay, WeeklySchedule};
use crate::warning::Warning;

fn consecutive_run_length(schedule: &WeeklySchedule, operator: &Operator, day: WeekDay, task_id: &crate::id::Id) -> u32 {
    let mut run = 1u32;
    let mut probe = day;
    while probe.index() > 0 {
        let prev = WeekDay::from_index(probe.index() - 1).unwrap();
        let same = schedule
            .assignment(prev, operator.id())
            .and_then(|a| a.task.as_ref())
            == Some(task_id);
        if !same {
            break;
        }
        run += 1;
        probe = prev;
    }
    run
}

fn is_heavy(tasks: &[Task], task_id: &crate::id::Id) -> bool {
    tasks.iter().find(|t| t.id() == task_id).is_some_and(Task::is_heavy)
}

/// Classifies every violation in `schedule`. Returns warnings in
/// `(day, operator id)` order, so the result is deterministic and stable
/// across calls on the same input.
pub fn validate(
    schedule: &WeeklySchedule,
    operators: &[Operator],
    tasks: &[Task],
    requirements: &[TaskRequirement],
    rules: &SchedulingRules,
) -> Vec<Warning> {
    let mut warnings = Vec::new();
    let mut sorted_operators: Vec<&Operator> = operators.iter().collect();
    sorted_operators.sort_by_key(|o| o.id().clone());

    for day in WeekDay::ALL {
        for operator in &sorted_operators {
            let Some(assignment) = schedule.assignment(day, operator.id()) else {
                continue;
            };
            let Some(task_id) = &assignment.task else {
                continue;
            };
            if !operator.is_available(day) {
                warnings.push(Warning::AvailabilityConflict {
                    operator: operator.id().clone(),
                    day,
                });
            }
            let Some(task) = tasks.iter().find(|t| t.id() == task_id) else {
                continue;
            };
            if rules.strict_skill_matching && !operator.has_skill(task.required_skill()) {
                warnings.push(Warning::SkillMismatch {
                    operator: operator.id().clone(),
                    task: task_id.clone(),
                    day,
                });
            }
            if !rules.allow_consecutive_heavy_shifts && task.is_heavy() && day.index() > 0 {
                let prev = WeekDay::from_index(day.index() - 1).unwrap();
                let prev_heavy = schedule
                    .assignment(prev, operator.id())
                    .and_then(|a| a.task.as_ref())
                    .is_some_and(|t| is_heavy(tasks, t));
                if prev_heavy {
                    warnings.push(Warning::ConsecutiveHeavy {
                        operator: operator.id().clone(),
                        day,
                    });
                }
            }
            let run = consecutive_run_length(schedule, operator, day, task_id);
            if run > rules.max_consecutive_days_on_same_task {
                warnings.push(Warning::ConsecutiveSameTask {
                    operator: operator.id().clone(),
                    task: task_id.clone(),
                    day,
                });
            }
        }
    }

    for task in tasks {
        for day in WeekDay::ALL {
            let profile = resolve_profile(task.id(), day, requirements);
            for line in profile {
                let assigned = sorted_operators
                    .iter()
                    .filter(|op| line.quota_type.matches(op.operator_type()))
                    .filter(|op| {
                        schedule
                            .assignment(day, op.id())
                            .and_then(|a| a.task.as_ref())
                            == Some(task.id())
                    })
                    .count() as u32;
                if assigned < line.count {
                    warnings.push(Warning::Understaffed {
                        task: task.id().clone(),
                        day,
                        required: line.count,
                        available: assigned,
                    });
                }
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::Id;
    use crate::model::{Assignment, IsoWeek, OperatorStatus, OperatorType, QuotaType, RequirementLine, Skill};
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn week() -> IsoWeek {
        IsoWeek::containing(NaiveDate::from_ymd_opt(2026, 7, 20).unwrap())
    }

    fn op(id: &str, skill: Skill, available_mon: bool) -> Operator {
        let mut availability = [true; 5];
        availability[WeekDay::Mon.index()] = available_mon;
        Operator::new(
            Id::from(id),
            id,
            OperatorType::Regular,
            OperatorStatus::Active,
            BTreeSet::from([skill]),
            availability,
            vec![],
            false,
        )
        .unwrap()
    }

    fn task(id: &str, skill: Skill) -> Task {
        Task::new(Id::from(id), id, "#fff", skill, None)
    }

    #[test]
    fn flags_skill_mismatch_when_strict() {
        let operators = vec![op("a", Skill::QualityChecker, true)];
        let tasks = vec![task("t1", Skill::Troubleshooter)];
        let mut schedule = WeeklySchedule::new(week());
        schedule.set_assignment(WeekDay::Mon, Id::from("a"), Assignment::task(Id::from("t1")));
        let rules = SchedulingRules::default();
        let warnings = validate(&schedule, &operators, &tasks, &[], &rules);
        assert!(warnings.iter().any(|w| matches!(w, Warning::SkillMismatch { .. })));
    }

    #[test]
    fn flags_availability_conflict() {
        let operators = vec![op("a", Skill::Troubleshooter, false)];
        let tasks = vec![task("t1", Skill::Troubleshooter)];
        let mut schedule = WeeklySchedule::new(week());
        schedule.set_assignment(WeekDay::Mon, Id::from("a"), Assignment::task(Id::from("t1")));
        let rules = SchedulingRules::default();
        let warnings = validate(&schedule, &operators, &tasks, &[], &rules);
        assert!(warnings.iter().any(|w| matches!(w, Warning::AvailabilityConflict { .. })));
    }

    #[test]
    fn flags_understaffed_when_profile_unmet() {
        let operators: Vec<Operator> = vec![];
        let tasks = vec![task("t1", Skill::Troubleshooter)];
        let schedule = WeeklySchedule::new(week());
        let requirements = vec![crate::model::TaskRequirement::new(
            Id::from("t1"),
            true,
            vec![RequirementLine::new(QuotaType::Any, 1)],
            Default::default(),
        )];
        let rules = SchedulingRules::default();
        let warnings = validate(&schedule, &operators, &tasks, &requirements, &rules);
        assert!(warnings.iter().any(|w| matches!(w, Warning::Understaffed { .. })));
    }

    #[test]
    fn no_warnings_for_clean_schedule() {
        let operators = vec![op("a", Skill::Troubleshooter, true)];
        let tasks = vec![task("t1", Skill::Troubleshooter)];
        let mut schedule = WeeklySchedule::new(week());
        schedule.set_assignment(WeekDay::Mon, Id::from("a"), Assignment::task(Id::from("t1")));
        let requirements = vec![crate::model::TaskRequirement::new(
            Id::from("t1"),
            true,
            vec![RequirementLine::new(QuotaType::Any, 1)],
            Default::default(),
        )];
        let rules = SchedulingRules::default();
        let warnings = validate(&schedule, &operators, &tasks, &requirements, &rules);
        // Mon is satisfied; Tue..Fri remain understaffed since nobody is assigned.
        assert!(!warnings.iter().any(|w| matches!(w, Warning::Understaffed { day, .. } if *day == WeekDay::Mon)));
    }
}
