//! The schedule artifact: per-cell assignments and the weekly container.

use std::collections::BTreeMap;

use chrono::NaiveDate;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::week::{IsoWeek, WeekDay};
use crate::id::Id;

/// One operator's cell on one day.
///
/// `locked` and `pinned` both act as immutable input to solving; the solver
/// must reproduce them unchanged in its output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Assignment {
    pub task: Option<Id>,
    pub pinned: bool,
    pub locked: bool,
}

impl Assignment {
    pub fn off() -> Self {
        Self::default()
    }

    pub fn task(task: Id) -> Self {
        Self {
            task: Some(task),
            pinned: false,
            locked: false,
        }
    }

    /// True when the solver must leave this cell untouched.
    pub fn is_frozen(&self) -> bool {
        self.pinned || self.locked
    }
}

/// One day's worth of cells, keyed by operator id.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DaySchedule {
    pub day: WeekDay,
    pub date: NaiveDate,
    pub assignments: BTreeMap<Id, Assignment>,
}

impl DaySchedule {
    pub fn new(day: WeekDay, date: NaiveDate) -> Self {
        Self {
            day,
            date,
            assignments: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScheduleStatus {
    Draft,
    Published,
}

/// The output and editable artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WeeklySchedule {
    pub week: IsoWeek,
    pub days: [DaySchedule; 5],
    pub status: ScheduleStatus,
    /// When true, solving is rejected outright as an input error. Distinct
    /// from a cell's own `locked` flag — see DESIGN.md for why the two stay
    /// separate.
    pub locked: bool,
}

impl WeeklySchedule {
    pub fn new(week: IsoWeek) -> Self {
        let days = WeekDay::ALL.map(|day| DaySchedule::new(day, week.date_of(day)));
        Self {
            week,
            days,
            status: ScheduleStatus::Draft,
            locked: false,
        }
    }

    pub fn day(&self, day: WeekDay) -> &DaySchedule {
        &self.days[day.index()]
    }

    pub fn day_mut(&mut self, day: WeekDay) -> &mut DaySchedule {
        &mut self.days[day.index()]
    }

    pub fn assignment(&self, day: WeekDay, operator: &Id) -> Option<&Assignment> {
        self.day(day).assignments.get(operator)
    }

    pub fn set_assignment(&mut self, day: WeekDay, operator: Id, assignment: Assignment) {
        self.day_mut(day).assignments.insert(operator, assignment);
    }
}
