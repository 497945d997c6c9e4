//! Intra-route 2-opt neighborhood.
//!
//! # Algorithm
//!
//! For each pair of positions `i < j` in a route, reverse the segment
//! `[i..=j]`. This replaces the arcs `(r[i-1], r[i])` and `(r[j], r[j+1])`
//! by `(r[i-1], r[j])` and `(r[i], r[j+1])`.
//!
//! Unlike the symmetric TSP case, reversing a segment can change the cost
//! of the inner arcs and the dimension cumuls, so every candidate goes
//! through the full route evaluation.
//!
//! # Complexity
//!
//! O(n²) candidates per route.
//!
//! # Reference
//!
//! Croes, G.A. (1958). "A method for solving traveling salesman problems",
//! *Operations Research* 6(6), 791-812.

use super::Move;
use crate::search::RoutePlan;

/// Appends every segment reversal of every route.
pub(crate) fn two_opt_moves(plan: &RoutePlan, out: &mut Vec<Move>) {
    for vehicle in 0..plan.num_vehicles() {
        let n = plan.route(vehicle).len();
        for from in 0..n {
            for to in (from + 1)..n {
                out.push(Move::TwoOpt { vehicle, from, to });
            }
        }
    }
}
