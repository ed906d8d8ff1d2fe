//! Operator entity: identity, capabilities, and availability.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::skill::Skill;
use super::week::WeekDay;
use crate::id::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OperatorType {
    Regular,
    Flex,
    Coordinator,
}

impl fmt::Display for OperatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperatorType::Regular => "Regular",
            OperatorType::Flex => "Flex",
            OperatorType::Coordinator => "Coordinator",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OperatorStatus {
    Active,
    Sick,
    Leave,
}

/// Errors raised constructing an [`Operator`] that would violate its
/// invariants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OperatorError {
    #[error("coordinator {0} cannot hold non-coordinator skill {1}")]
    NonCoordinatorSkillOnCoordinator(Id, Skill),
}

/// An operator: identity plus capabilities.
///
/// # Invariant
///
/// If `operator_type` is [`OperatorType::Coordinator`], every skill in
/// `skills` must be one of [`Skill::COORDINATOR_ONLY`]. Enforced by
/// [`Operator::new`], which is the only public constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Operator {
    id: Id,
    name: String,
    operator_type: OperatorType,
    status: OperatorStatus,
    skills: BTreeSet<Skill>,
    /// Indexed by [`WeekDay::index`].
    availability: [bool; 5],
    /// Order is priority: earlier entries are more preferred.
    preferred_tasks: Vec<Id>,
    archived: bool,
}

impl Operator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: Id,
        name: impl Into<String>,
        operator_type: OperatorType,
        status: OperatorStatus,
        skills: BTreeSet<Skill>,
        availability: [bool; 5],
        preferred_tasks: Vec<Id>,
        archived: bool,
    ) -> Result<Self, OperatorError> {
        if operator_type == OperatorType::Coordinator {
            if let Some(&bad) = skills.iter().find(|s| !s.is_coordinator_only()) {
                return Err(OperatorError::NonCoordinatorSkillOnCoordinator(id, bad));
            }
        }
        Ok(Self {
            id,
            name: name.into(),
            operator_type,
            status,
            skills,
            availability,
            preferred_tasks,
            archived,
        })
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operator_type(&self) -> OperatorType {
        self.operator_type
    }

    pub fn status(&self) -> OperatorStatus {
        self.status
    }

    pub fn skills(&self) -> &BTreeSet<Skill> {
        &self.skills
    }

    pub fn has_skill(&self, skill: Skill) -> bool {
        self.skills.contains(&skill)
    }

    pub fn is_available(&self, day: WeekDay) -> bool {
        self.availability[day.index()]
    }

    pub fn preferred_tasks(&self) -> &[Id] {
        &self.preferred_tasks
    }

    /// Priority rank of `task_id` in this operator's preference list, where
    /// `0` is most preferred. `None` if the task is not listed, including
    /// stale ids that reference since-deleted tasks — those are treated as
    /// simply absent from the preference list.
    pub fn preference_rank(&self, task_id: &Id) -> Option<usize> {
        self.preferred_tasks.iter().position(|t| t == task_id)
    }

    pub fn archived(&self) -> bool {
        self.archived
    }

    /// Eligible for the scheduler iff active and not archived.
    pub fn is_schedulable(&self) -> bool {
        !self.archived && self.status == OperatorStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(list: &[Skill]) -> BTreeSet<Skill> {
        list.iter().copied().collect()
    }

    #[test]
    fn coordinator_with_coordinator_skills_is_ok() {
        let op = Operator::new(
            Id::from("c1"),
            "Coord",
            OperatorType::Coordinator,
            OperatorStatus::Active,
            skills(&[Skill::Process, Skill::People]),
            [true; 5],
            vec![],
            false,
        );
        assert!(op.is_ok());
    }

    #[test]
    fn coordinator_with_regular_skill_is_rejected() {
        let op = Operator::new(
            Id::from("c1"),
            "Coord",
            OperatorType::Coordinator,
            OperatorStatus::Active,
            skills(&[Skill::Troubleshooter]),
            [true; 5],
            vec![],
            false,
        );
        assert_eq!(
            op.unwrap_err(),
            OperatorError::NonCoordinatorSkillOnCoordinator(Id::from("c1"), Skill::Troubleshooter)
        );
    }

    #[test]
    fn regular_operator_may_hold_any_skill() {
        let op = Operator::new(
            Id::from("r1"),
            "Reg",
            OperatorType::Regular,
            OperatorStatus::Active,
            skills(&[Skill::Process]),
            [true; 5],
            vec![],
            false,
        );
        assert!(op.is_ok());
    }

    #[test]
    fn is_schedulable_requires_active_and_unarchived() {
        let active = Operator::new(
            Id::from("a"),
            "A",
            OperatorType::Regular,
            OperatorStatus::Active,
            skills(&[]),
            [true; 5],
            vec![],
            false,
        )
        .unwrap();
        assert!(active.is_schedulable());

        let sick = Operator::new(
            Id::from("b"),
            "B",
            OperatorType::Regular,
            OperatorStatus::Sick,
            skills(&[]),
            [true; 5],
            vec![],
            false,
        )
        .unwrap();
        assert!(!sick.is_schedulable());

        let archived = Operator::new(
            Id::from("c"),
            "C",
            OperatorType::Regular,
            OperatorStatus::Active,
            skills(&[]),
            [true; 5],
            vec![],
            true,
        )
        .unwrap();
        assert!(!archived.is_schedulable());
    }

    #[test]
    fn preference_rank_returns_position_or_none() {
        let op = Operator::new(
            Id::from("a"),
            "A",
            OperatorType::Regular,
            OperatorStatus::Active,
            skills(&[]),
            [true; 5],
            vec![Id::from("t2"), Id::from("t1")],
            false,
        )
        .unwrap();
        assert_eq!(op.preference_rank(&Id::from("t2")), Some(0));
        assert_eq!(op.preference_rank(&Id::from("t1")), Some(1));
        assert_eq!(op.preference_rank(&Id::from("deleted")), None);
    }

    #[test]
    fn availability_is_indexed_by_weekday() {
        let mut avail = [true; 5];
        avail[WeekDay::Wed.index()] = false;
        let op = Operator::new(
            Id::from("a"),
            "A",
            OperatorType::Regular,
            OperatorStatus::Active,
            skills(&[]),
            avail,
            vec![],
            false,
        )
        .unwrap();
        assert!(op.is_available(WeekDay::Mon));
        assert!(!op.is_available(WeekDay::Wed));
    }
}
