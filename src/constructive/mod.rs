//! First-solution heuristics.
//!
//! - `path_cheapest_arc` — Per-vehicle cheapest-arc extension, O(n² log n)
//! - `savings` — Clarke-Wright savings (1964), O(n² log n)
//! - `insertion` — Parallel and local cheapest insertion
//!
//! Every heuristic only produces plans that satisfy all hard constraints.
//! The route-building heuristics place mandatory visits only; whatever is
//! left unrouted is completed by parallel cheapest insertion, which adds
//! optional visits only where they cost less than their penalty. If that
//! completion fails the plan is rebuilt by insertion from scratch, and if a
//! mandatory visit still fits nowhere there is no first solution.

mod insertion;
mod path_cheapest_arc;
mod savings;

use tracing::debug;

use crate::model::RoutingModel;
use crate::search::{FirstSolutionStrategy, PlanState, RoutePlan};

/// Builds a complete feasible plan with `strategy`.
pub(crate) fn build_first_solution(
    model: &RoutingModel,
    strategy: FirstSolutionStrategy,
    parallel: bool,
) -> Option<PlanState<'_>> {
    let manager = model.manager();
    let empty = || RoutePlan::empty(manager.num_vehicles(), manager.num_indices());

    let mut state = match strategy.resolve() {
        FirstSolutionStrategy::Savings => {
            let routes = savings::savings_routes(model);
            PlanState::new(model, RoutePlan::from_routes(routes, manager.num_indices()))?
        }
        FirstSolutionStrategy::PathCheapestArc => {
            let mut state = PlanState::new(model, empty())?;
            path_cheapest_arc::path_cheapest_arc(&mut state);
            state
        }
        FirstSolutionStrategy::LocalCheapestInsertion => {
            let mut state = PlanState::new(model, empty())?;
            // Visits it could not place are retried by the completion below.
            insertion::insert_local(&mut state, parallel);
            state
        }
        FirstSolutionStrategy::ParallelCheapestInsertion | FirstSolutionStrategy::Automatic => {
            PlanState::new(model, empty())?
        }
    };
    debug!(
        event = "construction_done",
        strategy = ?strategy.resolve(),
        objective = state.objective()
    );

    if insertion::insert_parallel(&mut state, parallel) {
        debug_assert!(state.is_complete());
        return Some(state);
    }
    if strategy.resolve() == FirstSolutionStrategy::ParallelCheapestInsertion {
        return None;
    }
    debug!(event = "construction_fallback", strategy = ?strategy.resolve());
    let mut state = PlanState::new(model, empty())?;
    insertion::insert_parallel(&mut state, parallel).then_some(state)
}

/// Prices caller-supplied routes and completes them with cheapest insertion.
///
/// Returns `None` if the routes break a hard constraint or a mandatory
/// visit cannot be added.
pub(crate) fn complete_routes(
    model: &RoutingModel,
    routes: Vec<Vec<usize>>,
    parallel: bool,
) -> Option<PlanState<'_>> {
    let plan = RoutePlan::from_routes(routes, model.manager().num_indices());
    let mut state = PlanState::new(model, plan)?;
    if !insertion::insert_parallel(&mut state, parallel) {
        return None;
    }
    debug_assert!(state.is_complete());
    Some(state)
}
