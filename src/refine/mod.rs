//! Refinement stage: local-search polish and multi-objective diversification
//! layered on top of the greedy engine's output.

pub mod objective;
pub mod pareto;
pub mod tabu;

pub use objective::ObjectiveVector;
pub use pareto::refine as pareto_refine;
pub use tabu::refine as tabu_refine;
