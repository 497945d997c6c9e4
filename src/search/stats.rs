//! Statistics of a solve.

use std::time::Duration;

use serde::Serialize;

use super::{FirstSolutionStrategy, LocalSearchMetaheuristic, StopReason};

/// What happened during the last solve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// Strategy actually used, after resolving `Automatic`.
    pub first_solution_strategy: FirstSolutionStrategy,
    /// Metaheuristic actually used, after resolving `Automatic`.
    pub metaheuristic: LocalSearchMetaheuristic,
    /// `None` when no feasible first plan exists.
    pub first_solution_objective: Option<i64>,
    pub best_objective: Option<i64>,
    /// Local-search steps, rejected ones included.
    pub steps: u64,
    /// New best plans, the first one included.
    pub improvements: u64,
    pub accepted_moves: u64,
    pub stop_reason: StopReason,
    pub elapsed: Duration,
}
