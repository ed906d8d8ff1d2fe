//! Scalar configuration for a solving run. `SchedulingRules` is the entire
//! configuration surface the core reads.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The strategy selector: one of four solving modes a caller may pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Strategy {
    Greedy,
    Enhanced,
    GreedyTabu,
    MultiObjective,
}

/// Scheduling rules: the entire configuration surface of the core. No
/// environment variables, CLI flags, or files are read anywhere else.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SchedulingRules {
    pub strict_skill_matching: bool,
    pub allow_consecutive_heavy_shifts: bool,
    pub prioritize_flex_for_exceptions: bool,
    pub respect_preferred_stations: bool,
    pub max_consecutive_days_on_same_task: u32,
    pub fair_distribution: bool,
    pub balance_workload: bool,
    pub auto_assign_coordinators: bool,
    /// 0..=20; controls score jitter magnitude.
    pub randomization_factor: u8,
    pub algorithm: Strategy,
}

impl SchedulingRules {
    /// Clamps `randomization_factor` to the documented `0..=20` range.
    pub fn normalized(mut self) -> Self {
        self.randomization_factor = self.randomization_factor.min(20);
        self
    }
}

impl Default for SchedulingRules {
    fn default() -> Self {
        Self {
            strict_skill_matching: true,
            allow_consecutive_heavy_shifts: false,
            prioritize_flex_for_exceptions: true,
            respect_preferred_stations: true,
            max_consecutive_days_on_same_task: 3,
            fair_distribution: true,
            balance_workload: true,
            auto_assign_coordinators: true,
            randomization_factor: 0,
            algorithm: Strategy::Enhanced,
        }
    }
}

/// Default objective weights for the aggregator: fairness 0.30, balance
/// 0.20, skill match 0.25, heavy-task fairness 0.15, variety 0.10. Must sum
/// to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectiveWeights {
    pub fairness: f64,
    pub balance: f64,
    pub skill_match: f64,
    pub heavy_fairness: f64,
    pub variety: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            fairness: 0.30,
            balance: 0.20,
            skill_match: 0.25,
            heavy_fairness: 0.15,
            variety: 0.10,
        }
    }
}

impl ObjectiveWeights {
    pub fn sum(&self) -> f64 {
        self.fairness + self.balance + self.skill_match + self.heavy_fairness + self.variety
    }

    pub fn is_normalized(&self) -> bool {
        (self.sum() - 1.0).abs() < 1e-6
    }
}

/// Tunable budgets for the refiners. Kept separate from `SchedulingRules`
/// since callers rarely need to override them; exposed with sensible
/// defaults instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefinerBudgets {
    pub tabu_iteration_budget: u32,
    pub tabu_memory_capacity: usize,
    pub tabu_wall_time: std::time::Duration,
    pub tabu_no_improvement_limit: u32,
    pub pareto_seed_count: u32,
    pub pareto_front_cap: usize,
}

impl Default for RefinerBudgets {
    fn default() -> Self {
        Self {
            tabu_iteration_budget: 100,
            tabu_memory_capacity: 20,
            tabu_wall_time: std::time::Duration::from_secs(5),
            tabu_no_improvement_limit: 20,
            pareto_seed_count: 10,
            pareto_front_cap: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        assert!(ObjectiveWeights::default().is_normalized());
    }

    #[test]
    fn normalized_clamps_randomization_factor() {
        let rules = SchedulingRules {
            randomization_factor: 200,
            ..SchedulingRules::default()
        }
        .normalized();
        assert_eq!(rules.randomization_factor, 20);
    }

    #[test]
    fn default_refiner_budgets_match_documented_values() {
        let budgets = RefinerBudgets::default();
        assert_eq!(budgets.tabu_iteration_budget, 100);
        assert_eq!(budgets.tabu_memory_capacity, 20);
        assert_eq!(budgets.pareto_seed_count, 10);
        assert_eq!(budgets.pareto_front_cap, 5);
    }
}
