//! Neighborhoods that change which visits are performed.
//!
//! Only indices covered by a disjunction may be deactivated or activated
//! here; mandatory visits stay performed once the first solution exists.

use super::Move;
use crate::model::RoutingModel;
use crate::search::RoutePlan;

fn inactive_optional<'a>(
    plan: &'a RoutePlan,
    model: &'a RoutingModel,
) -> impl Iterator<Item = usize> + 'a {
    model
        .manager()
        .visit_indices()
        .filter(move |&i| !plan.is_performed(i) && model.is_optional(i))
}

/// Appends every insertion of an unperformed optional visit.
pub(crate) fn make_active_moves(plan: &RoutePlan, model: &RoutingModel, out: &mut Vec<Move>) {
    for index in inactive_optional(plan, model) {
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

/// Appends the removal of every performed optional visit.
pub(crate) fn make_inactive_moves(plan: &RoutePlan, model: &RoutingModel, out: &mut Vec<Move>) {
    for vehicle in 0..plan.num_vehicles() {
        for (pos, &index) in plan.route(vehicle).iter().enumerate() {
            if model.is_optional(index) {
                out.push(Move::MakeInactive { vehicle, pos });
            }
        }
    }
}

/// Appends every replacement of a performed optional visit by an
/// unperformed one.
pub(crate) fn swap_active_moves(plan: &RoutePlan, model: &RoutingModel, out: &mut Vec<Move>) {
    let inactive: Vec<usize> = inactive_optional(plan, model).collect();
    if inactive.is_empty() {
        return;
    }
    for vehicle in 0..plan.num_vehicles() {
        for (pos, &performed) in plan.route(vehicle).iter().enumerate() {
            if !model.is_optional(performed) {
                continue;
            }
            for &index in &inactive {
                out.push(Move::SwapActive {
                    vehicle,
                    pos,
                    index,
                });
            }
        }
    }
}
