//! Diagnostic warnings: the sole channel for data-driven failure.
//!
//! Every component that can detect a violation produces its own stream of
//! warnings; the top level concatenates them.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::id::Id;
use crate::model::WeekDay;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Warning {
    SkillMismatch {
        operator: Id,
        task: Id,
        day: WeekDay,
    },
    AvailabilityConflict {
        operator: Id,
        day: WeekDay,
    },
    DoubleAssignment {
        operator: Id,
        day: WeekDay,
    },
    Understaffed {
        task: Id,
        day: WeekDay,
        required: u32,
        available: u32,
    },
    ConsecutiveHeavy {
        operator: Id,
        day: WeekDay,
    },
    ConsecutiveSameTask {
        operator: Id,
        task: Id,
        day: WeekDay,
    },
    /// A refiner hit its iteration or wall-time budget; the caller still
    /// gets the best-known schedule plus this one informational warning.
    BudgetExhausted {
        detail: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::SkillMismatch { operator, task, day } => {
                write!(f, "operator {operator} lacks the skill required by task {task} on {day}")
            }
            Warning::AvailabilityConflict { operator, day } => {
                write!(f, "operator {operator} is not available on {day}")
            }
            Warning::DoubleAssignment { operator, day } => {
                write!(f, "operator {operator} is assigned more than once on {day}")
            }
            Warning::Understaffed {
                task,
                day,
                required,
                available,
            } => write!(
                f,
                "task {task} on {day}: understaffed (required={required}, available={available})"
            ),
            Warning::ConsecutiveHeavy { operator, day } => {
                write!(f, "operator {operator} would work a second consecutive heavy task on {day}")
            }
            Warning::ConsecutiveSameTask { operator, task, day } => write!(
                f,
                "operator {operator} would exceed the consecutive-days limit on task {task} by {day}"
            ),
            Warning::BudgetExhausted { detail } => write!(f, "refiner budget exhausted: {detail}"),
        }
    }
}

/// Accumulates warnings from a single component call. Each producing
/// component owns one; the top level concatenates them in component order.
#[derive(Debug, Clone, Default)]
pub struct Collector {
    warnings: Vec<Warning>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    pub fn extend(&mut self, other: Collector) {
        self.warnings.extend(other.warnings);
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn understaffed_display_matches_required_and_available() {
        let w = Warning::Understaffed {
            task: Id::from("T1"),
            day: WeekDay::Mon,
            required: 2,
            available: 1,
        };
        let text = w.to_string();
        assert!(text.contains("required=2"));
        assert!(text.contains("available=1"));
        assert!(text.contains("T1"));
    }

    #[test]
    fn collector_preserves_push_order() {
        let mut collector = Collector::new();
        collector.push(Warning::AvailabilityConflict {
            operator: Id::from("a"),
            day: WeekDay::Mon,
        });
        collector.push(Warning::DoubleAssignment {
            operator: Id::from("a"),
            day: WeekDay::Tue,
        });
        let out = collector.into_vec();
        assert_eq!(out.len(), 2);
    }
}
