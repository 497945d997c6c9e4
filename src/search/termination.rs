//! Stopping criteria of the search.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use super::SearchParameters;

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// No accepted move remained (greedy descent, or an empty neighborhood).
    LocalOptimum,
    TimeLimit,
    SolutionLimit,
    IterationLimit,
    UnimprovedStepLimit,
    /// The cancellation flag was raised.
    Cancelled,
    /// The first-solution phase found no feasible plan.
    NoFirstSolution,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::LocalOptimum => "local optimum",
            Self::TimeLimit => "time limit",
            Self::SolutionLimit => "solution limit",
            Self::IterationLimit => "iteration limit",
            Self::UnimprovedStepLimit => "unimproved-step limit",
            Self::Cancelled => "cancelled",
            Self::NoFirstSolution => "no first solution",
        };
        f.write_str(s)
    }
}

/// Limits of one solve, checked between steps.
#[derive(Debug, Clone)]
pub(crate) struct SearchBudget {
    started: Instant,
    time_limit: Option<Duration>,
    solution_limit: Option<u64>,
    iteration_limit: Option<u64>,
    unimproved_step_limit: Option<u64>,
    cancel: Option<Arc<AtomicBool>>,
}

/// Counters the budget is checked against.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Progress {
    pub steps: u64,
    pub improvements: u64,
    pub unimproved_steps: u64,
}

impl SearchBudget {
    pub fn new(params: &SearchParameters, cancel: Option<Arc<AtomicBool>>) -> Self {
        Self {
            started: Instant::now(),
            time_limit: params.time_limit(),
            solution_limit: params.solution_limit,
            iteration_limit: params.iteration_limit,
            unimproved_step_limit: params.unimproved_step_limit,
            cancel,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// First limit reached, if any.
    pub fn exhausted(&self, progress: &Progress) -> Option<StopReason> {
        let reached = |limit: Option<u64>, value: u64| limit.is_some_and(|l| value >= l);
        if self.is_cancelled() {
            Some(StopReason::Cancelled)
        } else if self.time_limit.is_some_and(|t| self.elapsed() >= t) {
            Some(StopReason::TimeLimit)
        } else if reached(self.solution_limit, progress.improvements) {
            Some(StopReason::SolutionLimit)
        } else if reached(self.iteration_limit, progress.steps) {
            Some(StopReason::IterationLimit)
        } else if reached(self.unimproved_step_limit, progress.unimproved_steps) {
            Some(StopReason::UnimprovedStepLimit)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_limits() {
        let budget = SearchBudget::new(&SearchParameters::default(), None);
        let progress = Progress {
            steps: u64::MAX,
            improvements: u64::MAX,
            unimproved_steps: u64::MAX,
        };
        assert_eq!(budget.exhausted(&progress), None);
    }

    #[test]
    fn test_limits_in_order() {
        let params = SearchParameters::default()
            .with_solution_limit(2)
            .with_iteration_limit(5)
            .with_unimproved_step_limit(3);
        let budget = SearchBudget::new(&params, None);
        let mut progress = Progress {
            steps: 1,
            improvements: 1,
            unimproved_steps: 0,
        };
        assert_eq!(budget.exhausted(&progress), None);
        progress.unimproved_steps = 3;
        assert_eq!(budget.exhausted(&progress), Some(StopReason::UnimprovedStepLimit));
        progress.steps = 5;
        assert_eq!(budget.exhausted(&progress), Some(StopReason::IterationLimit));
        progress.improvements = 2;
        assert_eq!(budget.exhausted(&progress), Some(StopReason::SolutionLimit));
    }

    #[test]
    fn test_cancel_and_time() {
        let flag = Arc::new(AtomicBool::new(false));
        let params = SearchParameters::default().with_time_limit(Duration::ZERO);
        let budget = SearchBudget::new(&params, Some(Arc::clone(&flag)));
        assert_eq!(budget.exhausted(&Progress::default()), Some(StopReason::TimeLimit));
        flag.store(true, Ordering::Relaxed);
        assert_eq!(budget.exhausted(&Progress::default()), Some(StopReason::Cancelled));
    }
}
