//! Per-task staffing profiles.

use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::operator::OperatorType;
use super::week::WeekDay;
use crate::id::Id;

/// An operator-type quota line, or `Any` to match every type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum QuotaType {
    Any,
    Regular,
    Flex,
    Coordinator,
}

impl QuotaType {
    pub fn matches(self, operator_type: OperatorType) -> bool {
        match self {
            QuotaType::Any => true,
            QuotaType::Regular => operator_type == OperatorType::Regular,
            QuotaType::Flex => operator_type == OperatorType::Flex,
            QuotaType::Coordinator => operator_type == OperatorType::Coordinator,
        }
    }
}

impl fmt::Display for QuotaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuotaType::Any => "Any",
            QuotaType::Regular => "Regular",
            QuotaType::Flex => "Flex",
            QuotaType::Coordinator => "Coordinator",
        };
        write!(f, "{name}")
    }
}

/// One line of a staffing profile: `count` operators of `quota_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RequirementLine {
    pub quota_type: QuotaType,
    pub count: u32,
}

impl RequirementLine {
    pub fn new(quota_type: QuotaType, count: u32) -> Self {
        Self { quota_type, count }
    }
}

/// The staffing profile for one task, with optional per-day overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaskRequirement {
    task_id: Id,
    enabled: bool,
    default_requirements: Vec<RequirementLine>,
    day_overrides: BTreeMap<WeekDay, Vec<RequirementLine>>,
}

impl TaskRequirement {
    pub fn new(
        task_id: Id,
        enabled: bool,
        default_requirements: Vec<RequirementLine>,
        day_overrides: BTreeMap<WeekDay, Vec<RequirementLine>>,
    ) -> Self {
        Self {
            task_id,
            enabled,
            default_requirements,
            day_overrides,
        }
    }

    pub fn task_id(&self) -> &Id {
        &self.task_id
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// The effective profile for `day`: the day's override if one exists,
    /// otherwise the default requirements.
    pub fn profile_for(&self, day: WeekDay) -> &[RequirementLine] {
        self.day_overrides
            .get(&day)
            .map(Vec::as_slice)
            .unwrap_or(&self.default_requirements)
    }
}

/// The fallback profile used when no [`TaskRequirement`] record exists for a
/// task: a single line requiring one operator of any type.
pub fn default_profile() -> Vec<RequirementLine> {
    vec![RequirementLine::new(QuotaType::Any, 1)]
}

/// Resolves the effective profile for `task_id` on `day` against a list of
/// requirement records, applying the same lookup the normalizer and the
/// validator both need.
pub fn resolve_profile(task_id: &Id, day: WeekDay, requirements: &[TaskRequirement]) -> Vec<RequirementLine> {
    requirements
        .iter()
        .find(|r| r.task_id() == task_id && r.enabled())
        .map(|r| r.profile_for(day).to_vec())
        .unwrap_or_else(default_profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_falls_back_to_default_when_no_override() {
        let req = TaskRequirement::new(
            Id::from("t1"),
            true,
            vec![RequirementLine::new(QuotaType::Flex, 2)],
            BTreeMap::new(),
        );
        assert_eq!(
            req.profile_for(WeekDay::Mon),
            &[RequirementLine::new(QuotaType::Flex, 2)]
        );
    }

    #[test]
    fn profile_uses_day_override_when_present() {
        let mut overrides = BTreeMap::new();
        overrides.insert(WeekDay::Fri, vec![RequirementLine::new(QuotaType::Any, 3)]);
        let req = TaskRequirement::new(
            Id::from("t1"),
            true,
            vec![RequirementLine::new(QuotaType::Flex, 2)],
            overrides,
        );
        assert_eq!(
            req.profile_for(WeekDay::Fri),
            &[RequirementLine::new(QuotaType::Any, 3)]
        );
        assert_eq!(
            req.profile_for(WeekDay::Mon),
            &[RequirementLine::new(QuotaType::Flex, 2)]
        );
    }

    #[test]
    fn quota_type_any_matches_every_operator_type() {
        assert!(QuotaType::Any.matches(OperatorType::Regular));
        assert!(QuotaType::Any.matches(OperatorType::Flex));
        assert!(QuotaType::Any.matches(OperatorType::Coordinator));
        assert!(QuotaType::Flex.matches(OperatorType::Flex));
        assert!(!QuotaType::Flex.matches(OperatorType::Regular));
    }
}
