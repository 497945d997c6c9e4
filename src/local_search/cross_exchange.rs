//! Inter-route cross-exchange neighborhood (2-opt*).
//!
//! # Algorithm
//!
//! Given routes R1 = [a₁, ..., aᵢ, aᵢ₊₁, ..., aₙ] and
//! R2 = [b₁, ..., bⱼ, bⱼ₊₁, ..., bₘ], produce:
//!
//! R1' = [a₁, ..., aᵢ, bⱼ₊₁, ..., bₘ]
//! R2' = [b₁, ..., bⱼ, aᵢ₊₁, ..., aₙ]
//!
//! Cutting at the end of one route and inside the other moves a tail onto
//! the first route, which also lets the search empty a vehicle.
//!
//! # Complexity
//!
//! O(n² × R²) candidates, where n = visits per route, R = number of routes.
//!
//! # Reference
//!
//! Potvin, J.-Y. & Rousseau, J.-M. (1995). "An Exchange Heuristic for
//! Routeing Problems with Time Windows", *Journal of the Operational Research
//! Society* 46(12), 1433-1446.

use super::Move;
use crate::search::RoutePlan;

/// Appends every tail swap between two distinct routes.
pub(crate) fn cross_exchange_moves(plan: &RoutePlan, out: &mut Vec<Move>) {
    let num_vehicles = plan.num_vehicles();
    for vehicle_a in 0..num_vehicles {
        let na = plan.route(vehicle_a).len();
        for vehicle_b in (vehicle_a + 1)..num_vehicles {
            let nb = plan.route(vehicle_b).len();
            if na == 0 && nb == 0 {
                continue;
            }
            for cut_a in 0..=na {
                for cut_b in 0..=nb {
                    if cut_a == na && cut_b == nb {
                        continue;
                    }
                    out.push(Move::CrossExchange {
                        vehicle_a,
                        cut_a,
                        vehicle_b,
                        cut_b,
                    });
                }
            }
        }
    }
}
