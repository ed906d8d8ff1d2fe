//! Tabu search refiner: local swap search over a single schedule, with a
//! short-term memory of recently applied moves.

use std::collections::{BTreeSet, VecDeque};
use std::time::Instant;

use tracing::{debug, info};

use crate::id::Id;
use crate::model::{Assignment, Operator, RefinerBudgets, SchedulingRules, Task, WeekDay, WeeklySchedule};
use crate::normalize::NormalizedRequest;
use crate::warning::Warning;

use super::objective::ObjectiveVector;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Cell {
    op: Id,
    day: WeekDay,
    task: Option<Id>,
}

/// The unordered pair of cells a swap exchanges — the tabu key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct MoveKey(Cell, Cell);

impl MoveKey {
    fn new(a: Cell, b: Cell) -> Self {
        if a <= b {
            MoveKey(a, b)
        } else {
            MoveKey(b, a)
        }
    }
}

fn is_heavy(normalized: &NormalizedRequest, task_id: &Id) -> bool {
    normalized.tasks.iter().find(|t| t.id() == task_id).is_some_and(Task::is_heavy)
}

fn task_lookup<'a>(normalized: &'a NormalizedRequest, task_id: &Id) -> Option<&'a Task> {
    normalized.tasks.iter().find(|t| t.id() == task_id)
}

/// Checks the same hard constraints as the greedy engine's filter,
/// recomputed directly from the schedule since the tabu refiner does not
/// maintain a running `EngineState`.
fn is_legal(
    schedule: &WeeklySchedule,
    normalized: &NormalizedRequest,
    domains: &std::collections::BTreeMap<(Id, WeekDay), BTreeSet<Id>>,
    rules: &SchedulingRules,
    operator: &Operator,
    day: WeekDay,
    new_task: &Option<Id>,
) -> bool {
    let Some(task_id) = new_task else {
        return true;
    };
    if !domains
        .get(&(operator.id().clone(), day))
        .is_some_and(|d| d.contains(task_id))
    {
        return false;
    }
    let Some(task) = task_lookup(normalized, task_id) else {
        return false;
    };

    let mut run_length = 1u32;
    let mut probe = day;
    while probe.index() > 0 {
        let prev = WeekDay::from_index(probe.index() - 1).unwrap();
        let same = schedule
            .assignment(prev, operator.id())
            .and_then(|a| a.task.as_ref())
            == Some(task_id);
        if !same {
            break;
        }
        run_length += 1;
        probe = prev;
    }
    if run_length > rules.max_consecutive_days_on_same_task {
        return false;
    }

    if !rules.allow_consecutive_heavy_shifts && task.is_heavy() && day.index() > 0 {
        let prev = WeekDay::from_index(day.index() - 1).unwrap();
        let prev_heavy = schedule
            .assignment(prev, operator.id())
            .and_then(|a| a.task.as_ref())
            .is_some_and(|t| is_heavy(normalized, t));
        if prev_heavy {
            return false;
        }
    }
    true
}

fn apply_swap(schedule: &mut WeeklySchedule, day: WeekDay, a: &Id, b: &Id, a_new: Option<Id>, b_new: Option<Id>) {
    schedule.set_assignment(day, a.clone(), match a_new {
        Some(t) => Assignment::task(t),
        None => Assignment::off(),
    });
    schedule.set_assignment(day, b.clone(), match b_new {
        Some(t) => Assignment::task(t),
        None => Assignment::off(),
    });
}

struct Neighbor {
    day: WeekDay,
    a: Id,
    b: Id,
    a_new: Option<Id>,
    b_new: Option<Id>,
    key: MoveKey,
}

fn neighborhood(
    schedule: &WeeklySchedule,
    normalized: &NormalizedRequest,
    domains: &std::collections::BTreeMap<(Id, WeekDay), BTreeSet<Id>>,
    rules: &SchedulingRules,
) -> Vec<Neighbor> {
    let mut moves = Vec::new();
    for day in WeekDay::ALL {
        for (i, op_a) in normalized.operators.iter().enumerate() {
            let cell_a = schedule.assignment(day, op_a.id()).cloned().unwrap_or_default();
            if cell_a.is_frozen() {
                continue;
            }
            for op_b in normalized.operators.iter().skip(i + 1) {
                let cell_b = schedule.assignment(day, op_b.id()).cloned().unwrap_or_default();
                if cell_b.is_frozen() {
                    continue;
                }
                if cell_a.task == cell_b.task {
                    continue;
                }
                if !is_legal(schedule, normalized, domains, rules, op_a, day, &cell_b.task) {
                    continue;
                }
                if !is_legal(schedule, normalized, domains, rules, op_b, day, &cell_a.task) {
                    continue;
                }
                let key = MoveKey::new(
                    Cell { op: op_a.id().clone(), day, task: cell_a.task.clone() },
                    Cell { op: op_b.id().clone(), day, task: cell_b.task.clone() },
                );
                moves.push(Neighbor {
                    day,
                    a: op_a.id().clone(),
                    b: op_b.id().clone(),
                    a_new: cell_b.task.clone(),
                    b_new: cell_a.task.clone(),
                    key,
                });
            }
        }
    }
    moves
}

/// Runs the tabu search to improve `schedule` in place, returning the
/// global-best schedule found and any budget-exhaustion warning.
pub fn refine(
    schedule: WeeklySchedule,
    normalized: &NormalizedRequest,
    domains: &std::collections::BTreeMap<(Id, WeekDay), BTreeSet<Id>>,
    rules: &SchedulingRules,
    weights: &crate::model::ObjectiveWeights,
    budgets: &RefinerBudgets,
) -> (WeeklySchedule, Vec<Warning>) {
    let start = Instant::now();
    let n_ops = normalized.operators.len();
    let days = WeekDay::ALL.len();

    let mut current = schedule;
    let mut current_score = ObjectiveVector::compute(&current, &normalized.operators, &normalized.tasks)
        .aggregate(weights, n_ops, days);
    let mut best = current.clone();
    let mut best_score = current_score;

    let mut tabu: VecDeque<MoveKey> = VecDeque::with_capacity(budgets.tabu_memory_capacity);
    let mut tabu_set: BTreeSet<MoveKey> = BTreeSet::new();
    let mut no_improvement = 0u32;
    let mut warnings = Vec::new();
    let mut hit_budget = None;

    for iteration in 0..budgets.tabu_iteration_budget {
        if start.elapsed() >= budgets.tabu_wall_time {
            hit_budget = Some("wall-time budget reached");
            break;
        }
        let neighbors = neighborhood(&current, normalized, domains, rules);
        if neighbors.is_empty() {
            break;
        }

        let mut chosen: Option<(Neighbor, f64)> = None;
        for neighbor in neighbors {
            let mut candidate_schedule = current.clone();
            apply_swap(
                &mut candidate_schedule,
                neighbor.day,
                &neighbor.a,
                &neighbor.b,
                neighbor.a_new.clone(),
                neighbor.b_new.clone(),
            );
            let candidate_score = ObjectiveVector::compute(&candidate_schedule, &normalized.operators, &normalized.tasks)
                .aggregate(weights, n_ops, days);

            let is_tabu = tabu_set.contains(&neighbor.key);
            let aspirated = candidate_score > best_score;
            if is_tabu && !aspirated {
                continue;
            }
            let improves = match &chosen {
                Some((_, score)) => candidate_score > *score,
                None => true,
            };
            if improves {
                chosen = Some((neighbor, candidate_score));
            }
        }

        let Some((neighbor, candidate_score)) = chosen else {
            break;
        };

        apply_swap(&mut current, neighbor.day, &neighbor.a, &neighbor.b, neighbor.a_new.clone(), neighbor.b_new.clone());
        current_score = candidate_score;

        tabu_set.insert(neighbor.key.clone());
        tabu.push_back(neighbor.key);
        if tabu.len() > budgets.tabu_memory_capacity {
            if let Some(evicted) = tabu.pop_front() {
                tabu_set.remove(&evicted);
            }
        }

        if current_score > best_score {
            best_score = current_score;
            best = current.clone();
            no_improvement = 0;
            debug!(iteration, score = best_score, "tabu search improved global best");
        } else {
            no_improvement += 1;
        }

        if no_improvement >= budgets.tabu_no_improvement_limit {
            hit_budget = Some("no-improvement limit reached");
            break;
        }
        if iteration + 1 >= budgets.tabu_iteration_budget {
            hit_budget = Some("iteration budget reached");
        }
    }

    if let Some(reason) = hit_budget {
        info!(reason, score = best_score, "tabu refiner stopped");
        warnings.push(Warning::BudgetExhausted {
            detail: format!("tabu search stopped: {reason}"),
        });
    }

    (best, warnings)
}
