//! Path-cheapest-arc construction.
//!
//! # Algorithm
//!
//! Vehicles are filled one after the other. From the last visit of the
//! current route (initially the vehicle's start), the route is extended
//! with the unperformed mandatory visit reached by the cheapest arc among
//! those whose addition keeps the route feasible. When no visit fits, the
//! next vehicle starts. Optional visits are left to the insertion pass,
//! which adds them only where they pay for themselves.
//!
//! This is the nearest-neighbor rule generalized to per-vehicle arc costs
//! and arbitrary dimensions.
//!
//! # Complexity
//!
//! O(n² log n) arc comparisons plus one route evaluation per tried visit.

use crate::local_search::Move;
use crate::search::PlanState;

/// Extends every vehicle's route with cheapest feasible arcs.
pub(crate) fn path_cheapest_arc(state: &mut PlanState<'_>) {
    let model = state.model();
    let manager = model.manager();
    for vehicle in 0..manager.num_vehicles() {
        loop {
            let route = state.plan().route(vehicle);
            let last = route.last().copied().unwrap_or_else(|| manager.start(vehicle));
            let pos = route.len();

            let mut next: Vec<(i64, usize)> = manager
                .visit_indices()
                .filter(|&i| !model.is_optional(i) && !state.plan().is_performed(i))
                .map(|i| (model.arc_cost(last, i, vehicle), i))
                .collect();
            next.sort_unstable();

            let extension = next.into_iter().find_map(|(_, index)| {
                state.evaluate(&Move::MakeActive {
                    index,
                    vehicle,
                    pos,
                })
            });
            match extension {
                Some(candidate) => state.apply(candidate),
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::CapacityLimit;
    use crate::index::{IndexManager, NodeIndex};
    use crate::model::RoutingModel;
    use crate::search::RoutePlan;

    #[test]
    fn test_follows_cheapest_arcs_until_full() {
        // Depot 0; nodes 1..=4 on a line; capacity 3 visits.
        let mut m = RoutingModel::new(IndexManager::new(5, 2, NodeIndex(0)).expect("valid"));
        let d = m.register_node_transit_callback(|a, b| (a.0 as i64 - b.0 as i64).abs());
        m.set_arc_cost_evaluator_of_all_vehicles(d).expect("ok");
        let manager = m.shared_manager();
        let demand = m.register_unary_transit_callback(move |i| manager.is_visit(i) as i64);
        m.add_dimension(demand, 0, CapacityLimit::AtMost(3), true, "load")
            .expect("ok");

        let plan = RoutePlan::empty(2, m.manager().num_indices());
        let mut state = PlanState::new(&m, plan).expect("ok");
        path_cheapest_arc(&mut state);
        assert_eq!(state.plan().route(0), &[1, 2, 3]);
        assert_eq!(state.plan().route(1), &[4]);
    }

    #[test]
    fn test_skips_optional_visits() {
        // Optional node 1 is closest but would take the only load slot.
        let mut m = RoutingModel::new(IndexManager::new(3, 1, NodeIndex(0)).expect("valid"));
        let x = [0i64, 1, 10];
        let d = m.register_node_transit_callback(move |a, b| (x[a.0] - x[b.0]).abs());
        m.set_arc_cost_evaluator_of_all_vehicles(d).expect("ok");
        let manager = m.shared_manager();
        let demand = m.register_unary_transit_callback(move |i| manager.is_visit(i) as i64);
        m.add_dimension(demand, 0, CapacityLimit::AtMost(1), true, "load")
            .expect("ok");
        m.add_disjunction(&[1], 1_000).expect("ok");

        let plan = RoutePlan::empty(1, m.manager().num_indices());
        let mut state = PlanState::new(&m, plan).expect("ok");
        path_cheapest_arc(&mut state);
        assert_eq!(state.plan().route(0), &[2]);
    }
}
