//! Exchange neighborhood: swap two visits.
//!
//! # Algorithm
//!
//! For every unordered pair of performed visits, on the same route or on
//! two different routes, swap their positions.
//!
//! # Complexity
//!
//! O(n²) candidates, where n = performed visits.
//!
//! # Reference
//!
//! Savelsbergh, M.W.P. (1992). "The Vehicle Routing Problem with Time
//! Windows: Minimizing Route Duration", *ORSA Journal on Computing* 4(2),
//! 146-154.

use super::Move;
use crate::search::RoutePlan;

/// Appends every pairwise swap.
pub(crate) fn exchange_moves(plan: &RoutePlan, out: &mut Vec<Move>) {
    let num_vehicles = plan.num_vehicles();
    for vehicle_a in 0..num_vehicles {
        let na = plan.route(vehicle_a).len();
        for pos_a in 0..na {
            for pos_b in (pos_a + 1)..na {
                out.push(Move::Exchange {
                    vehicle_a,
                    pos_a,
                    vehicle_b: vehicle_a,
                    pos_b,
                });
            }
            for vehicle_b in (vehicle_a + 1)..num_vehicles {
                for pos_b in 0..plan.route(vehicle_b).len() {
                    out.push(Move::Exchange {
                        vehicle_a,
                        pos_a,
                        vehicle_b,
                        pos_b,
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
    fn test_pairs() {
        let plan = RoutePlan::from_routes(vec![vec![1, 2], vec![3]], 10);
        let mut out = Vec::new();
        exchange_moves(&plan, &mut out);
        assert_eq!(out.len(), 3);
    }
}
