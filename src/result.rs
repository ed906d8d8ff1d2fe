//! Return types of the primary entry point.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::model::WeeklySchedule;
use crate::refine::objective::ObjectiveVector;
use crate::warning::Warning;

/// One solved candidate. `objectives` is populated for `multi-objective`
/// results and `None` for the single-schedule strategies.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScheduleResult {
    pub schedule: WeeklySchedule,
    pub warnings: Vec<Warning>,
    pub objectives: Option<ObjectiveVector>,
}

impl ScheduleResult {
    pub fn new(schedule: WeeklySchedule, warnings: Vec<Warning>) -> Self {
        Self {
            schedule,
            warnings,
            objectives: None,
        }
    }

    pub fn with_objectives(mut self, objectives: ObjectiveVector) -> Self {
        self.objectives = Some(objectives);
        self
    }
}

/// `schedule()`'s return value: a single result for `greedy`, `enhanced`,
/// and `greedy+tabu`; a small ranked set for `multi-objective`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScheduleOutcome {
    Single(ScheduleResult),
    MultiObjective(Vec<ScheduleResult>),
}

impl ScheduleOutcome {
    /// The first (or only) result's warnings, useful for callers that don't
    /// care which strategy ran.
    pub fn primary_warnings(&self) -> &[Warning] {
        match self {
            ScheduleOutcome::Single(result) => &result.warnings,
            ScheduleOutcome::MultiObjective(results) => {
                results.first().map(|r| r.warnings.as_slice()).unwrap_or(&[])
            }
        }
    }
}
