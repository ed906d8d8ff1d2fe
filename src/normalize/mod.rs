//! Request Normalizer: the first of the pipeline's leaf components.
//!
//! Filters excluded tasks, resolves per-day requirements, sorts inputs
//! canonically, and derives the fingerprint used for deterministic
//! tie-breaking downstream. Normalization never fails on the data itself;
//! the bad-reference checks below are a distinct class of caller error.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::ScheduleError;
use crate::fingerprint::Fingerprint;
use crate::id::Id;
use crate::model::{IsoWeek, Operator, OperatorType, RequirementLine, Task, TaskRequirement, WeekDay};
use crate::request::ScheduleRequest;

/// An operator pool split by type: tasks whose required skill is
/// coordinator-only are routed to coordinators, all other tasks are routed
/// to Regular+Flex.
#[derive(Debug, Clone, Default)]
pub struct OperatorPools {
    pub regular_and_flex: Vec<Id>,
    pub coordinators: Vec<Id>,
}

/// Output of normalization: everything downstream components need, already
/// canonically ordered and deduplicated.
#[derive(Debug, Clone)]
pub struct NormalizedRequest {
    pub week: IsoWeek,
    /// Schedulable operators only (`Active`, not archived), sorted by id.
    /// Archived/non-Active operators are dropped here but remain available
    /// to the validator via the original request.
    pub operators: Vec<Operator>,
    /// Tasks with `excludedTasks` removed, sorted by id.
    pub tasks: Vec<Task>,
    /// Resolved per-day staffing profile for each remaining task.
    pub profiles: BTreeMap<Id, [Vec<RequirementLine>; 5]>,
    pub pools: OperatorPools,
    pub fingerprint: Fingerprint,
}

fn resolve_profile(task_id: &Id, requirements: &[TaskRequirement]) -> [Vec<RequirementLine>; 5] {
    WeekDay::ALL.map(|day| crate::model::requirement::resolve_profile(task_id, day, requirements))
}

/// Runs normalization, returning an error only for caller bugs: a locked
/// schedule, an excluded task id that names no known task, or a
/// `current_assignments` operator id that names no known operator.
pub fn normalize(
    request: &ScheduleRequest,
    clock: &dyn crate::model::Clock,
) -> Result<NormalizedRequest, ScheduleError> {
    if request.locked {
        return Err(ScheduleError::ScheduleLocked);
    }

    let known_task_ids: BTreeSet<&Id> = request.tasks.iter().map(Task::id).collect();
    for excluded in &request.excluded_tasks {
        if !known_task_ids.contains(excluded) {
            return Err(ScheduleError::UnknownExcludedTask(excluded.clone()));
        }
    }

    let known_operator_ids: BTreeSet<&Id> = request.operators.iter().map(Operator::id).collect();
    for day_assignments in request.current_assignments.values() {
        for op_id in day_assignments.keys() {
            if !known_operator_ids.contains(op_id) {
                return Err(ScheduleError::UnknownOperatorInAssignments(op_id.clone()));
            }
        }
    }

    let excluded: BTreeSet<&Id> = request.excluded_tasks.iter().collect();
    let mut tasks: Vec<Task> = request
        .tasks
        .iter()
        .filter(|t| !excluded.contains(t.id()))
        .cloned()
        .collect();
    tasks.sort_by(|a, b| a.id().cmp(b.id()));

    let mut operators: Vec<Operator> = request
        .operators
        .iter()
        .filter(|op| op.is_schedulable())
        .cloned()
        .collect();
    operators.sort_by(|a, b| a.id().cmp(b.id()));

    let profiles: BTreeMap<Id, [Vec<RequirementLine>; 5]> = tasks
        .iter()
        .map(|t| (t.id().clone(), resolve_profile(t.id(), &request.task_requirements)))
        .collect();

    let mut pools = OperatorPools::default();
    for op in &operators {
        match op.operator_type() {
            OperatorType::Coordinator => pools.coordinators.push(op.id().clone()),
            OperatorType::Regular | OperatorType::Flex => pools.regular_and_flex.push(op.id().clone()),
        }
    }

    let week = request.resolve_week(clock);

    let mut canonical_ids: Vec<&str> = operators.iter().map(|o| o.id().as_str()).collect();
    canonical_ids.extend(tasks.iter().map(|t| t.id().as_str()));
    let fingerprint = Fingerprint::from_canonical(&canonical_ids, request.rules.randomization_factor);

    debug!(
        operators = operators.len(),
        tasks = tasks.len(),
        coordinators = pools.coordinators.len(),
        "normalized schedule request"
    );

    Ok(NormalizedRequest {
        week,
        operators,
        tasks,
        profiles,
        pools,
        fingerprint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OperatorStatus, OperatorType, Skill, SystemClock};
    use std::collections::BTreeSet as Set;

    fn op(id: &str, status: OperatorStatus, archived: bool) -> Operator {
        Operator::new(
            Id::from(id),
            id,
            OperatorType::Regular,
            status,
            Set::from([Skill::Troubleshooter]),
            [true; 5],
            vec![],
            archived,
        )
        .unwrap()
    }

    fn task(id: &str) -> Task {
        Task::new(Id::from(id), id, "#fff", Skill::Troubleshooter, None)
    }

    fn base_request() -> ScheduleRequest {
        ScheduleRequest {
            operators: vec![
                op("a", OperatorStatus::Active, false),
                op("b", OperatorStatus::Sick, false),
                op("c", OperatorStatus::Active, true),
            ],
            tasks: vec![task("t1"), task("t2")],
            days: WeekDay::ALL,
            current_assignments: BTreeMap::new(),
            rules: crate::model::SchedulingRules::default(),
            task_requirements: vec![],
            excluded_tasks: vec![],
            week: None,
            locked: false,
        }
    }

    #[test]
    fn drops_non_active_and_archived_operators() {
        let request = base_request();
        let normalized = normalize(&request, &SystemClock).unwrap();
        assert_eq!(normalized.operators.len(), 1);
        assert_eq!(normalized.operators[0].id(), &Id::from("a"));
    }

    #[test]
    fn rejects_locked_requests() {
        let mut request = base_request();
        request.locked = true;
        assert_eq!(normalize(&request, &SystemClock), Err(ScheduleError::ScheduleLocked));
    }

    #[test]
    fn rejects_unknown_excluded_task() {
        let mut request = base_request();
        request.excluded_tasks.push(Id::from("ghost"));
        assert_eq!(
            normalize(&request, &SystemClock),
            Err(ScheduleError::UnknownExcludedTask(Id::from("ghost")))
        );
    }

    #[test]
    fn rejects_unknown_operator_in_current_assignments() {
        let mut request = base_request();
        let mut day = BTreeMap::new();
        day.insert(Id::from("ghost"), crate::model::Assignment::off());
        request.current_assignments.insert(WeekDay::Mon, day);
        assert_eq!(
            normalize(&request, &SystemClock),
            Err(ScheduleError::UnknownOperatorInAssignments(Id::from("ghost")))
        );
    }

    #[test]
    fn excluded_tasks_are_removed_and_remaining_sorted() {
        let mut request = base_request();
        request.tasks = vec![task("t2"), task("t1"), task("t3")];
        request.excluded_tasks = vec![Id::from("t2")];
        let normalized = normalize(&request, &SystemClock).unwrap();
        let ids: Vec<&str> = normalized.tasks.iter().map(|t| t.id().as_str()).collect();
        assert_eq!(ids, vec!["t1", "t3"]);
    }

    #[test]
    fn missing_requirement_record_defaults_to_any_one() {
        let request = base_request();
        let normalized = normalize(&request, &SystemClock).unwrap();
        let profile = &normalized.profiles[&Id::from("t1")][WeekDay::Mon.index()];
        assert_eq!(profile.len(), 1);
        assert_eq!(profile[0].count, 1);
    }

    #[test]
    fn fingerprint_is_stable_for_identical_requests() {
        let request = base_request();
        let a = normalize(&request, &SystemClock).unwrap().fingerprint;
        let b = normalize(&request, &SystemClock).unwrap().fingerprint;
        assert_eq!(a, b);
    }
}
