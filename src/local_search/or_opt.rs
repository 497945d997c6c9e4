//! Intra-route Or-opt neighborhood.
//!
//! # Algorithm
//!
//! Moves segments of 2 or 3 consecutive visits to a different position
//! within the same route. Single visits are covered by relocate.
//!
//! # Complexity
//!
//! O(n²) candidates per route.
//!
//! # Reference
//!
//! Or, I. (1976). "Traveling Salesman-Type Combinatorial Problems and Their
//! Relation to the Logistics of Blood Banking". PhD thesis.

use super::Move;
use crate::search::RoutePlan;

/// Longest segment moved as a block.
pub const MAX_SEGMENT_LEN: usize = 3;

/// Appends every segment move of length 2..=[`MAX_SEGMENT_LEN`].
pub(crate) fn or_opt_moves(plan: &RoutePlan, out: &mut Vec<Move>) {
    for vehicle in 0..plan.num_vehicles() {
        let n = plan.route(vehicle).len();
        for len in 2..=MAX_SEGMENT_LEN.min(n) {
            for from_pos in 0..=(n - len) {
                for to_pos in 0..=(n - len) {
                    if to_pos != from_pos {
                        out.push(Move::OrOpt {
                            vehicle,
                            from_pos,
                            len,
                            to_pos,
                        });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_routes_have_no_segments() {
        let plan = RoutePlan::from_routes(vec![vec![1, 2], vec![3]], 10);
        let mut out = Vec::new();
        or_opt_moves(&plan, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_every_candidate_is_valid() {
        let plan = RoutePlan::from_routes(vec![vec![1, 2, 3, 4, 5]], 10);
        let mut out = Vec::new();
        or_opt_moves(&plan, &mut out);
        // len 2: 4 starts × 3 targets; len 3: 3 × 2.
        assert_eq!(out.len(), 12 + 6);
        assert!(out.iter().all(|m| m.effect(&plan).is_some()));
    }
}
