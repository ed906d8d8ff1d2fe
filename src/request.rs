//! The request record: the input a caller hands to [`crate::schedule`].

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::id::Id;
use crate::model::{Assignment, IsoWeek, Operator, SchedulingRules, Task, TaskRequirement, WeekDay};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScheduleRequest {
    pub operators: Vec<Operator>,
    pub tasks: Vec<Task>,
    /// Ordered Mon..Fri. Always `WeekDay::ALL` in practice; kept as an
    /// explicit field so the request record's shape stays self-describing.
    pub days: [WeekDay; 5],
    /// Existing cells to preserve when `locked` or `pinned`.
    pub current_assignments: BTreeMap<WeekDay, BTreeMap<Id, Assignment>>,
    pub rules: SchedulingRules,
    /// May be empty: each task then defaults to `{Any, 1}`.
    pub task_requirements: Vec<TaskRequirement>,
    pub excluded_tasks: Vec<Id>,
    /// Supplied explicitly, or derived from a [`crate::model::Clock`] when
    /// `None`.
    pub week: Option<IsoWeek>,
    /// Mirrors `WeeklySchedule.locked`: when true, solving is rejected
    /// outright.
    pub locked: bool,
}

impl ScheduleRequest {
    /// Resolves the week identity, falling back to the clock's current ISO
    /// week when the request doesn't supply one.
    pub fn resolve_week(&self, clock: &dyn crate::model::Clock) -> IsoWeek {
        self.week.unwrap_or_else(|| IsoWeek::containing(clock.today()))
    }
}
