//! v_rolai - Versatile Resource Optimization Leveraging AI
//!
//! A constraint-based weekly staff scheduling core: normalization,
//! constraint propagation, prioritized greedy assignment, and optional
//! local-search/multi-objective refinement.

pub mod error;
pub mod fingerprint;
pub mod greedy;
pub mod id;
pub mod model;
pub mod normalize;
pub mod prioritize;
pub mod propagate;
pub mod refine;
pub mod request;
pub mod result;
pub mod validate;
pub mod warning;

pub use error::ScheduleError;
pub use id::Id;
pub use request::ScheduleRequest;
pub use result::{ScheduleOutcome, ScheduleResult};
pub use warning::Warning;

use model::{Clock, ObjectiveWeights, RefinerBudgets, Strategy, SystemClock};

/// Solves one weekly schedule request.
///
/// Runs normalization, propagation, and the prioritized greedy engine
/// unconditionally, then dispatches on `request.rules.algorithm`:
/// - `Greedy`: the greedy engine's output, as-is.
/// - `Enhanced`: greedy with its default scoring pipeline (same engine,
///   distinguished only by rules the caller has already set).
/// - `GreedyTabu`: greedy output refined by bounded tabu search.
/// - `MultiObjective`: a small Pareto front of diverse greedy candidates.
///
/// Fails only on caller errors in the request; infeasibility and budget
/// exhaustion surface as [`Warning`] values inside a successful result.
pub fn schedule(request: &ScheduleRequest) -> Result<ScheduleOutcome, ScheduleError> {
    schedule_with_clock(request, &SystemClock)
}

/// Like [`schedule`], but with an explicit [`Clock`] — used by callers that
/// need deterministic week resolution in tests.
pub fn schedule_with_clock(request: &ScheduleRequest, clock: &dyn Clock) -> Result<ScheduleOutcome, ScheduleError> {
    let normalized = normalize::normalize(request, clock)?;
    let propagation = propagate::propagate(&normalized, &request.current_assignments);
    let prioritized = prioritize::prioritize(&normalized, &propagation);
    let rules = request.rules.normalized();

    let warnings = propagation.infeasibility_warnings.clone();

    match rules.algorithm {
        Strategy::Greedy | Strategy::Enhanced => {
            let outcome = greedy::run(
                &normalized,
                &propagation,
                &prioritized,
                &request.current_assignments,
                &rules,
                normalized.fingerprint,
            );
            let mut all_warnings = warnings;
            all_warnings.extend(outcome.warnings);
            Ok(ScheduleOutcome::Single(ScheduleResult::new(outcome.schedule, all_warnings)))
        }
        Strategy::GreedyTabu => {
            let outcome = greedy::run(
                &normalized,
                &propagation,
                &prioritized,
                &request.current_assignments,
                &rules,
                normalized.fingerprint,
            );
            let mut all_warnings = warnings;
            all_warnings.extend(outcome.warnings);
            let (refined, tabu_warnings) = refine::tabu_refine(
                outcome.schedule,
                &normalized,
                &propagation.domains,
                &rules,
                &ObjectiveWeights::default(),
                &RefinerBudgets::default(),
            );
            all_warnings.extend(tabu_warnings);
            Ok(ScheduleOutcome::Single(ScheduleResult::new(refined, all_warnings)))
        }
        Strategy::MultiObjective => {
            let mut results = refine::pareto_refine(
                &normalized,
                &propagation,
                &prioritized,
                &request.current_assignments,
                &rules,
                &RefinerBudgets::default(),
            );
            for result in &mut results {
                result.warnings.splice(0..0, warnings.iter().cloned());
            }
            Ok(ScheduleOutcome::MultiObjective(results))
        }
    }
}

/// Independently re-validates any [`model::WeeklySchedule`], whether or not
/// it was produced by [`schedule`].
pub fn validate(
    schedule: &model::WeeklySchedule,
    operators: &[model::Operator],
    tasks: &[model::Task],
    requirements: &[model::TaskRequirement],
    rules: &model::SchedulingRules,
) -> Vec<Warning> {
    validate::validate(schedule, operators, tasks, requirements, rules)
}
