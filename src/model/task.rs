//! Task entity: the unit of work a slot requires.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::skill::Skill;
use crate::id::Id;

/// Task names that are heavy by default; also the prioritizer's tier-1
/// names.
pub const HEAVY_TASKS: [&str; 2] = ["Troubleshooter", "Exceptions"];

/// A unit of work requiring a particular [`Skill`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Task {
    id: Id,
    name: String,
    /// Cosmetic; not used by the solver.
    color: String,
    required_skill: Skill,
    heavy: bool,
}

impl Task {
    /// Builds a task, deriving `heavy` from [`HEAVY_TASKS`] unless
    /// `heavy_override` says otherwise. The override is authoritative; name
    /// matching is only the fallback for tasks that don't set it.
    pub fn new(
        id: Id,
        name: impl Into<String>,
        color: impl Into<String>,
        required_skill: Skill,
        heavy_override: Option<bool>,
    ) -> Self {
        let name = name.into();
        let heavy = heavy_override.unwrap_or_else(|| HEAVY_TASKS.contains(&name.as_str()));
        Self {
            id,
            name,
            color: color.into(),
            required_skill,
            heavy,
        }
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn required_skill(&self) -> Skill {
        self.required_skill
    }

    pub fn is_heavy(&self) -> bool {
        self.heavy
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.required_skill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heavy_flag_derived_from_name_when_not_overridden() {
        let t = Task::new(Id::from("t1"), "Troubleshooter", "#f00", Skill::Troubleshooter, None);
        assert!(t.is_heavy());

        let t = Task::new(Id::from("t2"), "Quality Check", "#0f0", Skill::QualityChecker, None);
        assert!(!t.is_heavy());
    }

    #[test]
    fn heavy_override_wins_over_derived_value() {
        let t = Task::new(Id::from("t1"), "Troubleshooter", "#f00", Skill::Troubleshooter, Some(false));
        assert!(!t.is_heavy());

        let t = Task::new(Id::from("t2"), "Quality Check", "#0f0", Skill::QualityChecker, Some(true));
        assert!(t.is_heavy());
    }
}
