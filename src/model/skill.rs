//! Fixed skill vocabulary.
//!
//! Skills are a closed enumeration rather than free-form strings, so a
//! mis-typed skill name fails at compile time instead of surfacing as a
//! runtime surprise. Adding a skill is a code change.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Skill {
    Troubleshooter,
    Exceptions,
    QualityChecker,
    Sorter,
    Packer,
    Inducter,
    Picker,
    /// Coordinator-only skills.
    Process,
    People,
    OffProcess,
    ProcessAd,
}

impl Skill {
    /// The coordinator-only skill set, fixed at compile time.
    pub const COORDINATOR_ONLY: [Skill; 4] = [
        Skill::Process,
        Skill::People,
        Skill::OffProcess,
        Skill::ProcessAd,
    ];

    pub fn is_coordinator_only(self) -> bool {
        Self::COORDINATOR_ONLY.contains(&self)
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Skill::Troubleshooter => "Troubleshooter",
            Skill::Exceptions => "Exceptions",
            Skill::QualityChecker => "Quality Checker",
            Skill::Sorter => "Sorter",
            Skill::Packer => "Packer",
            Skill::Inducter => "Inducter",
            Skill::Picker => "Picker",
            Skill::Process => "Process",
            Skill::People => "People",
            Skill::OffProcess => "Off Process",
            Skill::ProcessAd => "Process/AD",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinator_only_set_has_exactly_four_skills() {
        assert!(Skill::Process.is_coordinator_only());
        assert!(Skill::People.is_coordinator_only());
        assert!(Skill::OffProcess.is_coordinator_only());
        assert!(Skill::ProcessAd.is_coordinator_only());
        assert!(!Skill::Troubleshooter.is_coordinator_only());
    }
}
