//! Search: parameters, the improvement loop and its statistics.
//!
//! - [`SearchParameters`] — Strategy, metaheuristic, operators and limits
//! - [`SearchStats`] — Counters and stop reason of the last solve
//! - [`StopReason`] — Why a solve ended

mod engine;
mod metaheuristic;
mod parameters;
mod plan;
mod state;
mod stats;
mod termination;

pub use parameters::{
    FirstSolutionStrategy, LocalSearchMetaheuristic, LocalSearchOperators, SearchParameters,
};
pub use stats::SearchStats;
pub use termination::StopReason;

pub(crate) use engine::{SearchEngine, SearchOutcome};
pub(crate) use plan::RoutePlan;
pub(crate) use state::PlanState;
