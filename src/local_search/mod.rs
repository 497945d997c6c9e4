//! Local-search neighborhoods over a routing plan.
//!
//! - [`Move`] — The closed set of moves and their effect on a plan
//! - `two_opt` — Intra-route segment reversal
//! - `relocate` — Single-visit relocation within and across routes
//! - `or_opt` — Intra-route relocation of 2-3 visit segments
//! - `exchange` — Pairwise visit swaps
//! - `cross_exchange` — Inter-route tail swaps (2-opt*)
//! - `activity` — Activating, deactivating and swapping optional visits

mod activity;
mod cross_exchange;
mod exchange;
mod moves;
mod or_opt;
mod relocate;
mod two_opt;

pub use moves::Move;
pub use or_opt::MAX_SEGMENT_LEN;

pub(crate) use moves::MoveEffect;

use crate::model::RoutingModel;
use crate::search::{LocalSearchOperators, RoutePlan};

/// Clears `out` and fills it with every move of the enabled operators, in a
/// fixed operator order.
pub(crate) fn neighborhood(
    plan: &RoutePlan,
    model: &RoutingModel,
    operators: &LocalSearchOperators,
    out: &mut Vec<Move>,
) {
    out.clear();
    if operators.two_opt {
        two_opt::two_opt_moves(plan, out);
    }
    if operators.relocate {
        relocate::relocate_moves(plan, out);
    }
    if operators.or_opt {
        or_opt::or_opt_moves(plan, out);
    }
    if operators.exchange {
        exchange::exchange_moves(plan, out);
    }
    if operators.cross_exchange {
        cross_exchange::cross_exchange_moves(plan, out);
    }
    if operators.make_active {
        activity::make_active_moves(plan, model, out);
    }
    if operators.make_inactive {
        activity::make_inactive_moves(plan, model, out);
    }
    if operators.swap_active {
        activity::swap_active_moves(plan, model, out);
    }
}
