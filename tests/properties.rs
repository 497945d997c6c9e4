//! Property tests for index mapping and plan pricing.

use proptest::prelude::*;
use u_routing_engine::dimension::CapacityLimit;
use u_routing_engine::evaluation::RouteEvaluator;
use u_routing_engine::index::{IndexManager, NodeIndex};
use u_routing_engine::model::RoutingModel;

proptest! {
    #[test]
    fn prop_index_round_trip(num_nodes in 1usize..40, num_vehicles in 1usize..8, depot_seed in 0usize..1000) {
        let depot = NodeIndex(depot_seed % num_nodes);
        let manager = IndexManager::new(num_nodes, num_vehicles, depot).unwrap();

        prop_assert_eq!(manager.num_indices(), num_nodes - 1 + 2 * num_vehicles);
        for node in (0..num_nodes).filter(|&n| n != depot.value()) {
            let index = manager.node_to_index(NodeIndex(node)).unwrap();
            prop_assert!(manager.is_visit(index));
            prop_assert_eq!(manager.index_to_node(index).unwrap(), NodeIndex(node));
        }
        for v in 0..num_vehicles {
            prop_assert_eq!(manager.index_to_node(manager.start(v)).unwrap(), depot);
            prop_assert_eq!(manager.index_to_node(manager.end(v)).unwrap(), depot);
            prop_assert_eq!(manager.vehicle_of_anchor(manager.start(v)), Some(v));
            prop_assert_eq!(manager.vehicle_of_anchor(manager.end(v)), Some(v));
        }
        prop_assert_eq!(manager.visit_indices().count(), num_nodes - 1);
    }

    #[test]
    fn prop_solution_is_feasible_and_priced_exactly(
        xs in prop::collection::vec(0i64..100, 2..9),
        demands in prop::collection::vec(1i64..4, 9),
        penalty in 1i64..300,
        capacity in 3i64..12,
    ) {
        let num_nodes = xs.len();
        let manager = IndexManager::new(num_nodes, 2, NodeIndex(0)).unwrap();
        let mut model = RoutingModel::new(manager);
        let positions = xs.clone();
        let distance = model.register_node_transit_callback(move |a, b| {
            (positions[a.value()] - positions[b.value()]).abs()
        });
        model.set_arc_cost_evaluator_of_all_vehicles(distance).unwrap();
        let load: Vec<i64> = (0..num_nodes).map(|n| if n == 0 { 0 } else { demands[n] }).collect();
        let demand = model.register_node_transit_callback(move |from, _| load[from.value()]);
        model.add_dimension(demand, 0, CapacityLimit::AtMost(capacity), true, "load").unwrap();
        let visits: Vec<usize> = model.manager().visit_indices().collect();
        for i in visits {
            model.add_disjunction(&[i], penalty).unwrap();
        }

        let assignment = model.solve().unwrap().expect("every visit is optional");
        let routes: Vec<Vec<usize>> = assignment
            .routes()
            .iter()
            .map(|r| r.visits()[1..r.visits().len() - 1].iter().map(|v| v.index).collect())
            .collect();
        let cost = RouteEvaluator::new(&model).evaluate_plan(&routes).unwrap();
        prop_assert_eq!(cost.total(), assignment.objective_value());
        for v in 0..2 {
            let end = model.manager().end(v);
            prop_assert!(assignment.cumul_value("load", end).unwrap() <= capacity);
        }
    }
}
