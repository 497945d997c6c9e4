//! Cheapest-insertion heuristics.
//!
//! # Algorithm
//!
//! *Parallel* cheapest insertion evaluates every (visit, vehicle, position)
//! triple and performs the globally cheapest feasible one, until every
//! mandatory visit is routed. *Local* cheapest insertion takes the visits
//! one by one in index order and puts each at its own cheapest position.
//!
//! In both, mandatory visits go first. Optional visits are then inserted
//! only while an insertion lowers the objective, i.e. costs less than the
//! penalty it saves.
//!
//! # Complexity
//!
//! Parallel: O(n² × (n + V)) route evaluations. Local: O(n × (n + V)).
//!
//! # Reference
//!
//! Rosenkrantz, D.J., Stearns, R.E. & Lewis, P.M. (1977). "An Analysis of
//! Several Heuristics for the Traveling Salesman Problem", *SIAM Journal on
//! Computing* 6(3), 563-581.

use tracing::debug;

use crate::local_search::Move;
use crate::search::{PlanState, RoutePlan};

/// Unperformed visits, split into (mandatory, optional).
fn pending(state: &PlanState<'_>) -> (Vec<usize>, Vec<usize>) {
    let model = state.model();
    model
        .manager()
        .visit_indices()
        .filter(|&i| !state.plan().is_performed(i))
        .partition(|&i| !model.is_optional(i))
}

fn insertion_moves(plan: &RoutePlan, indices: &[usize], out: &mut Vec<Move>) {
    out.clear();
    for &index in indices {
        for vehicle in 0..plan.num_vehicles() {
            for pos in 0..=plan.route(vehicle).len() {
                out.push(Move::MakeActive {
                    index,
                    vehicle,
                    pos,
                });
            }
        }
    }
}

/// Routes every unperformed mandatory visit, then every optional visit
/// worth its insertion, always picking the globally cheapest insertion.
///
/// Returns `false` when some mandatory visit fits nowhere.
pub(crate) fn insert_parallel(state: &mut PlanState<'_>, parallel: bool) -> bool {
    let mut moves = Vec::new();
    loop {
        let (mandatory, _) = pending(state);
        if mandatory.is_empty() {
            break;
        }
        insertion_moves(state.plan(), &mandatory, &mut moves);
        match state.best_candidate(&moves, parallel, |c| Some(c.delta)) {
            Some((_, candidate)) => state.apply(candidate),
            None => {
                debug!(event = "insertion_failed", remaining = mandatory.len());
                return false;
            }
        }
    }
    loop {
        let (_, optional) = pending(state);
        insertion_moves(state.plan(), &optional, &mut moves);
        match state.best_candidate(&moves, parallel, |c| (c.delta < 0).then_some(c.delta)) {
            Some((_, candidate)) => state.apply(candidate),
            None => break,
        }
    }
    true
}

/// Inserts visits in index order, mandatory first, each at its cheapest
/// feasible position.
///
/// Returns `false` when some mandatory visit fits nowhere.
pub(crate) fn insert_local(state: &mut PlanState<'_>, parallel: bool) -> bool {
    let (mandatory, optional) = pending(state);
    let mut moves = Vec::new();
    for index in mandatory {
        insertion_moves(state.plan(), &[index], &mut moves);
        match state.best_candidate(&moves, parallel, |c| Some(c.delta)) {
            Some((_, candidate)) => state.apply(candidate),
            None => {
                debug!(event = "insertion_failed", index);
                return false;
            }
        }
    }
    for index in optional {
        insertion_moves(state.plan(), &[index], &mut moves);
        if let Some((_, candidate)) =
            state.best_candidate(&moves, parallel, |c| (c.delta < 0).then_some(c.delta))
        {
            state.apply(candidate);
        }
    }
    true
}
