//! The scoring pipeline: an ordered list of score terms, each a value of a
//! tagged variant `{ kind, weight, enabled }`. Adding a rule means adding a
//! variant, not editing the scorer.

use std::collections::BTreeMap;

use rand::Rng;

use crate::fingerprint::Fingerprint;
use crate::model::{Operator, OperatorType, SchedulingRules, Skill, Task, WeekDay};

use super::EngineState;

/// One candidate under consideration for a slot.
pub struct Candidate<'a> {
    pub operator: &'a Operator,
    pub day: WeekDay,
    pub task: &'a Task,
}

/// Read-only context a [`ScoreTerm`] needs to evaluate a candidate.
pub struct ScoringContext<'a> {
    pub state: &'a EngineState,
    pub rules: &'a SchedulingRules,
    pub fingerprint: Fingerprint,
    /// Number of tasks requiring each skill, for the specificity term.
    pub tasks_per_skill: &'a BTreeMap<Skill, u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreKind {
    PreferredStation,
    FlexForExceptions,
    FairDistribution,
    WorkloadBalance,
    SkillSpecificity,
    RandomJitter,
}

impl ScoreKind {
    fn raw_value(self, candidate: &Candidate, ctx: &ScoringContext) -> f64 {
        match self {
            ScoreKind::PreferredStation => candidate
                .operator
                .preference_rank(candidate.task.id())
                .map(|rank| 1.0 / (rank as f64 + 1.0))
                .unwrap_or(0.0),
            ScoreKind::FlexForExceptions => {
                if candidate.operator.operator_type() == OperatorType::Flex
                    && candidate.task.name() == "Exceptions"
                {
                    1.0
                } else {
                    0.0
                }
            }
            ScoreKind::FairDistribution => {
                if candidate.task.is_heavy() {
                    -(ctx.state.heavy_count(candidate.operator.id()) as f64)
                } else {
                    0.0
                }
            }
            ScoreKind::WorkloadBalance => -(ctx.state.workload(candidate.operator.id()) as f64),
            ScoreKind::SkillSpecificity => {
                let count = ctx
                    .tasks_per_skill
                    .get(&candidate.task.required_skill())
                    .copied()
                    .unwrap_or(1)
                    .max(1);
                1.0 / count as f64
            }
            ScoreKind::RandomJitter => {
                let mut rng = ctx
                    .fingerprint
                    .candidate_rng(candidate.operator.id(), candidate.day, candidate.task.id());
                rng.gen_range(-1.0..=1.0)
            }
        }
    }
}

/// A weighted, independently toggleable scoring rule.
#[derive(Debug, Clone, Copy)]
pub struct ScoreTerm {
    pub kind: ScoreKind,
    pub weight: f64,
    pub enabled: bool,
}

impl ScoreTerm {
    pub fn evaluate(&self, candidate: &Candidate, ctx: &ScoringContext) -> f64 {
        if !self.enabled {
            return 0.0;
        }
        self.weight * self.kind.raw_value(candidate, ctx)
    }
}

/// Builds the default pipeline from `rules`. Each rule toggle maps to one
/// term's `enabled` flag; adding a new rule means adding a new [`ScoreKind`]
/// variant and a line here, never editing existing terms.
pub fn default_pipeline(rules: &SchedulingRules) -> Vec<ScoreTerm> {
    vec![
        ScoreTerm {
            kind: ScoreKind::PreferredStation,
            weight: 10.0,
            enabled: rules.respect_preferred_stations,
        },
        ScoreTerm {
            kind: ScoreKind::FlexForExceptions,
            weight: 8.0,
            enabled: rules.prioritize_flex_for_exceptions,
        },
        ScoreTerm {
            kind: ScoreKind::FairDistribution,
            weight: 2.0,
            enabled: rules.fair_distribution,
        },
        ScoreTerm {
            kind: ScoreKind::WorkloadBalance,
            weight: 1.0,
            enabled: rules.balance_workload,
        },
        ScoreTerm {
            kind: ScoreKind::SkillSpecificity,
            weight: 5.0,
            enabled: true,
        },
        ScoreTerm {
            kind: ScoreKind::RandomJitter,
            weight: rules.randomization_factor as f64,
            enabled: rules.randomization_factor > 0,
        },
    ]
}

pub fn score(candidate: &Candidate, ctx: &ScoringContext, pipeline: &[ScoreTerm]) -> f64 {
    pipeline.iter().map(|term| term.evaluate(candidate, ctx)).sum()
}

/// Per-seed weight multipliers the Pareto driver applies on top of
/// [`default_pipeline`] to bias each greedy run toward a different corner of
/// the objective space.
#[derive(Debug, Clone, Copy)]
pub struct PipelineBias {
    pub fair_distribution: f64,
    pub workload_balance: f64,
    pub skill_specificity: f64,
    pub preferred_station: f64,
}

impl PipelineBias {
    pub const NEUTRAL: PipelineBias = PipelineBias {
        fair_distribution: 1.0,
        workload_balance: 1.0,
        skill_specificity: 1.0,
        preferred_station: 1.0,
    };
}

/// A small fixed palette of biases cycled across Pareto seeds, each leaning
/// toward fairness, balance, specialization, or preference-following in turn.
pub const BIAS_PALETTE: [PipelineBias; 4] = [
    PipelineBias::NEUTRAL,
    PipelineBias {
        fair_distribution: 2.0,
        workload_balance: 1.0,
        skill_specificity: 1.0,
        preferred_station: 1.0,
    },
    PipelineBias {
        fair_distribution: 1.0,
        workload_balance: 2.0,
        skill_specificity: 1.0,
        preferred_station: 0.5,
    },
    PipelineBias {
        fair_distribution: 1.0,
        workload_balance: 1.0,
        skill_specificity: 2.0,
        preferred_station: 0.5,
    },
];

pub fn biased_pipeline(rules: &SchedulingRules, bias: PipelineBias) -> Vec<ScoreTerm> {
    default_pipeline(rules)
        .into_iter()
        .map(|mut term| {
            let multiplier = match term.kind {
                ScoreKind::FairDistribution => bias.fair_distribution,
                ScoreKind::WorkloadBalance => bias.workload_balance,
                ScoreKind::SkillSpecificity => bias.skill_specificity,
                ScoreKind::PreferredStation => bias.preferred_station,
                ScoreKind::FlexForExceptions | ScoreKind::RandomJitter => 1.0,
            };
            term.weight *= multiplier;
            term
        })
        .collect()
}
