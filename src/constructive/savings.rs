//! Clarke-Wright savings construction.
//!
//! # Algorithm
//!
//! Every mandatory visit starts on its own chain (start → visit → end).
//! Optional visits are left to the insertion pass. Merging the
//! chain ending in `i` with the chain starting at `j` saves
//!
//! ```text
//! s(i, j) = c(i, end) + c(start, j) - c(i, j)
//! ```
//!
//! measured with vehicle 0's anchors and arc costs. Savings are taken in
//! decreasing order; a merge is kept when the merged chain is feasible on
//! at least one vehicle. Arc costs may be asymmetric, so chains are never
//! reversed and both orientations of a pair are separate savings.
//!
//! Chains are then handed to vehicles, longest first, each to the free
//! vehicle that serves it cheapest. Visits left over are completed by
//! cheapest insertion.
//!
//! # Complexity
//!
//! O(n² log n) for the savings list plus O(n² × V) route evaluations.
//!
//! # Reference
//!
//! Clarke, G. & Wright, J.W. (1964). "Scheduling of Vehicles from a Central
//! Depot to a Number of Delivery Points", *Operations Research* 12(4), 568-581.

use crate::evaluation::RouteEvaluator;
use crate::model::RoutingModel;

/// A savings value for appending chain head `j` after chain tail `i`.
#[derive(Debug)]
struct Saving {
    i: usize,
    j: usize,
    value: i64,
}

/// Builds per-vehicle routes with the savings heuristic.
pub(crate) fn savings_routes(model: &RoutingModel) -> Vec<Vec<usize>> {
    let manager = model.manager();
    let evaluator = RouteEvaluator::new(model);
    let num_vehicles = manager.num_vehicles();
    let feasible_somewhere =
        |chain: &[usize]| (0..num_vehicles).any(|v| evaluator.route_cost(v, chain).is_some());

    let visits: Vec<usize> = manager
        .visit_indices()
        .filter(|&i| !model.is_optional(i) && feasible_somewhere(&[i]))
        .collect();

    let (start, end) = (manager.start(0), manager.end(0));
    let mut savings = Vec::new();
    for &i in &visits {
        for &j in &visits {
            if i == j {
                continue;
            }
            let value = model.arc_cost(i, end, 0) + model.arc_cost(start, j, 0) - model.arc_cost(i, j, 0);
            if value > 0 {
                savings.push(Saving { i, j, value });
            }
        }
    }
    savings.sort_by(|a, b| b.value.cmp(&a.value).then((a.i, a.j).cmp(&(b.i, b.j))));

    // chain_of[index] = chain id; chains[id] = members in order
    let mut chain_of = vec![usize::MAX; manager.num_indices()];
    let mut chains: Vec<Vec<usize>> = Vec::with_capacity(visits.len());
    for &i in &visits {
        chain_of[i] = chains.len();
        chains.push(vec![i]);
    }

    for saving in &savings {
        let (ci, cj) = (chain_of[saving.i], chain_of[saving.j]);
        if ci == cj
            || chains[ci].last() != Some(&saving.i)
            || chains[cj].first() != Some(&saving.j)
        {
            continue;
        }
        let mut merged = chains[ci].clone();
        merged.extend_from_slice(&chains[cj]);
        if !feasible_somewhere(&merged) {
            continue;
        }
        for &index in &chains[cj] {
            chain_of[index] = ci;
        }
        chains[cj].clear();
        chains[ci] = merged;
    }

    let mut order: Vec<usize> = (0..chains.len()).filter(|&c| !chains[c].is_empty()).collect();
    order.sort_by(|&a, &b| chains[b].len().cmp(&chains[a].len()).then(chains[a][0].cmp(&chains[b][0])));

    let mut routes = vec![Vec::new(); num_vehicles];
    for c in order {
        let best = (0..num_vehicles)
            .filter(|&v| routes[v].is_empty())
            .filter_map(|v| evaluator.route_cost(v, &chains[c]).map(|cost| (cost, v)))
            .min();
        if let Some((_, v)) = best {
            routes[v] = std::mem::take(&mut chains[c]);
        }
    }
    routes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::CapacityLimit;
    use crate::index::{IndexManager, NodeIndex};

    fn line(nodes: usize, vehicles: usize, capacity: i64) -> RoutingModel {
        let mut m = RoutingModel::new(IndexManager::new(nodes, vehicles, NodeIndex(0)).expect("valid"));
        let d = m.register_node_transit_callback(|a, b| (a.0 as i64 - b.0 as i64).abs());
        m.set_arc_cost_evaluator_of_all_vehicles(d).expect("ok");
        let manager = m.shared_manager();
        let demand = m.register_unary_transit_callback(move |i| manager.is_visit(i) as i64);
        m.add_dimension(demand, 0, CapacityLimit::AtMost(capacity), true, "load")
            .expect("ok");
        m
    }

    #[test]
    fn test_cw_line() {
        let m = line(4, 2, 10);
        let routes = savings_routes(&m);
        let served: usize = routes.iter().map(Vec::len).sum();
        assert_eq!(served, 3);
        assert_eq!(routes.iter().filter(|r| !r.is_empty()).count(), 1);
        let cost = RouteEvaluator::new(&m).evaluate_plan(&routes).expect("feasible");
        assert_eq!(cost.total(), 6);
    }

    #[test]
    fn test_cw_capacity_splits() {
        let m = line(5, 2, 2);
        let routes = savings_routes(&m);
        assert!(routes.iter().all(|r| r.len() <= 2));
        assert_eq!(routes.iter().map(Vec::len).sum::<usize>(), 4);
    }

    #[test]
    fn test_cw_leaves_optional_visits() {
        let mut m = line(4, 1, 10);
        m.add_disjunction(&[2, 3], 50).expect("ok");
        let routes = savings_routes(&m);
        assert_eq!(routes[0], vec![1]);
    }

    #[test]
    fn test_cw_optional_chain_does_not_take_vehicle() {
        // Optional visits 1 and 2 chain well, but the single vehicle only
        // has room for one visit and 3 is mandatory.
        let mut m = line(4, 1, 1);
        m.add_disjunction(&[1], 1_000).expect("ok");
        m.add_disjunction(&[2], 1_000).expect("ok");
        let routes = savings_routes(&m);
        assert_eq!(routes[0], vec![3]);
    }
}
