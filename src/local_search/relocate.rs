//! Relocate neighborhood, within and across routes.
//!
//! # Algorithm
//!
//! Removes one visit from its route and reinserts it at every other
//! position of every route, including empty ones.
//!
//! # Complexity
//!
//! O(n × (n + V)) candidates, where n = performed visits and V = vehicles.
//!
//! # Reference
//!
//! Or, I. (1976). "Traveling Salesman-Type Combinatorial Problems and Their
//! Relation to the Logistics of Blood Banking". PhD thesis.

use super::Move;
use crate::search::RoutePlan;

/// Appends every single-visit relocation.
pub(crate) fn relocate_moves(plan: &RoutePlan, out: &mut Vec<Move>) {
    let num_vehicles = plan.num_vehicles();
    for from_vehicle in 0..num_vehicles {
        let n = plan.route(from_vehicle).len();
        for from_pos in 0..n {
            for to_vehicle in 0..num_vehicles {
                let slots = if to_vehicle == from_vehicle {
                    n - 1
                } else {
                    plan.route(to_vehicle).len()
                };
                for to_pos in 0..=slots {
                    if to_vehicle == from_vehicle && to_pos == from_pos {
                        continue;
                    }
                    out.push(Move::Relocate {
                        from_vehicle,
                        from_pos,
                        to_vehicle,
                        to_pos,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_candidate_is_valid() {
        let plan = RoutePlan::from_routes(vec![vec![1, 2, 3], vec![], vec![4]], 10);
        let mut out = Vec::new();
        relocate_moves(&plan, &mut out);
        // Visit on a 3-route: 2 intra + 1 (empty) + 2 slots; visit 4: 4 + 1.
        assert_eq!(out.len(), 3 * (2 + 1 + 2) + (4 + 1));
        assert!(out.iter().all(|m| m.effect(&plan).is_some()));
    }
}
