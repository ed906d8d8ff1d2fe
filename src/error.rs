//! Input errors: caller bugs that abort the call outright.
//!
//! Infeasibility and budget exhaustion are never represented here — they are
//! [`crate::warning::Warning`] values inside an otherwise successful result.
//! Internal invariant violations are program bugs and panic rather than flow
//! through this type.

use thiserror::Error;

use crate::id::Id;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("schedule is locked and cannot accept a solve request")]
    ScheduleLocked,

    #[error("excluded task id {0} does not match any known task")]
    UnknownExcludedTask(Id),

    #[error("current assignments reference unknown operator id {0}")]
    UnknownOperatorInAssignments(Id),
}
