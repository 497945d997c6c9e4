//! The closed set of neighborhood moves.
//!
//! Positions count visits only; vehicle starts and ends are implicit.

use serde::Serialize;
use smallvec::{smallvec, SmallVec};

use crate::search::RoutePlan;

/// A local-search move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Move {
    /// Reverses `route[from..=to]`.
    TwoOpt { vehicle: usize, from: usize, to: usize },
    /// Moves one visit; `to_pos` is its position in the target route after
    /// removal.
    Relocate {
        from_vehicle: usize,
        from_pos: usize,
        to_vehicle: usize,
        to_pos: usize,
    },
    /// Moves the segment `route[from_pos..from_pos + len]` within its route;
    /// `to_pos` is measured after the segment's removal.
    OrOpt {
        vehicle: usize,
        from_pos: usize,
        len: usize,
        to_pos: usize,
    },
    /// Swaps two visits, on the same route or on two routes.
    Exchange {
        vehicle_a: usize,
        pos_a: usize,
        vehicle_b: usize,
        pos_b: usize,
    },
    /// Swaps the tails `route_a[cut_a..]` and `route_b[cut_b..]` (2-opt*).
    CrossExchange {
        vehicle_a: usize,
        cut_a: usize,
        vehicle_b: usize,
        cut_b: usize,
    },
    /// Inserts an unperformed visit.
    MakeActive { index: usize, vehicle: usize, pos: usize },
    /// Removes a visit from its route.
    MakeInactive { vehicle: usize, pos: usize },
    /// Replaces a performed visit by an unperformed one.
    SwapActive { vehicle: usize, pos: usize, index: usize },
}

/// Routes rewritten by a move plus the performed-status changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MoveEffect {
    pub routes: SmallVec<[(usize, Vec<usize>); 2]>,
    pub activated: Option<usize>,
    pub deactivated: Option<usize>,
}

impl MoveEffect {
    fn reshaped(vehicle: usize, route: Vec<usize>) -> Self {
        Self {
            routes: smallvec![(vehicle, route)],
            activated: None,
            deactivated: None,
        }
    }

    fn pair(a: (usize, Vec<usize>), b: (usize, Vec<usize>)) -> Self {
        Self {
            routes: smallvec![a, b],
            activated: None,
            deactivated: None,
        }
    }
}

impl Move {
    /// Routes resulting from applying the move to `plan`, or `None` when a
    /// position is out of range or the move is degenerate.
    pub(crate) fn effect(&self, plan: &RoutePlan) -> Option<MoveEffect> {
        let num_vehicles = plan.num_vehicles();
        match *self {
            Move::TwoOpt { vehicle, from, to } => {
                let route = plan.routes().get(vehicle)?;
                if from >= to || to >= route.len() {
                    return None;
                }
                let mut r = route.to_vec();
                r[from..=to].reverse();
                Some(MoveEffect::reshaped(vehicle, r))
            }
            Move::Relocate {
                from_vehicle,
                from_pos,
                to_vehicle,
                to_pos,
            } => {
                if to_vehicle >= num_vehicles {
                    return None;
                }
                let source = plan.routes().get(from_vehicle)?;
                let index = *source.get(from_pos)?;
                let mut src = source.to_vec();
                src.remove(from_pos);
                if from_vehicle == to_vehicle {
                    if to_pos > src.len() || to_pos == from_pos {
                        return None;
                    }
                    src.insert(to_pos, index);
                    return Some(MoveEffect::reshaped(from_vehicle, src));
                }
                let mut dst = plan.route(to_vehicle).to_vec();
                if to_pos > dst.len() {
                    return None;
                }
                dst.insert(to_pos, index);
                Some(MoveEffect::pair((from_vehicle, src), (to_vehicle, dst)))
            }
            Move::OrOpt {
                vehicle,
                from_pos,
                len,
                to_pos,
            } => {
                let route = plan.routes().get(vehicle)?;
                if len == 0 || from_pos + len > route.len() || to_pos == from_pos {
                    return None;
                }
                let mut r = route.to_vec();
                let segment: SmallVec<[usize; 4]> = r.drain(from_pos..from_pos + len).collect();
                if to_pos > r.len() {
                    return None;
                }
                for (k, index) in segment.into_iter().enumerate() {
                    r.insert(to_pos + k, index);
                }
                Some(MoveEffect::reshaped(vehicle, r))
            }
            Move::Exchange {
                vehicle_a,
                pos_a,
                vehicle_b,
                pos_b,
            } => {
                let a = *plan.routes().get(vehicle_a)?.get(pos_a)?;
                let b = *plan.routes().get(vehicle_b)?.get(pos_b)?;
                if vehicle_a == vehicle_b {
                    if pos_a == pos_b {
                        return None;
                    }
                    let mut r = plan.route(vehicle_a).to_vec();
                    r.swap(pos_a, pos_b);
                    return Some(MoveEffect::reshaped(vehicle_a, r));
                }
                let mut ra = plan.route(vehicle_a).to_vec();
                let mut rb = plan.route(vehicle_b).to_vec();
                ra[pos_a] = b;
                rb[pos_b] = a;
                Some(MoveEffect::pair((vehicle_a, ra), (vehicle_b, rb)))
            }
            Move::CrossExchange {
                vehicle_a,
                cut_a,
                vehicle_b,
                cut_b,
            } => {
                if vehicle_a == vehicle_b {
                    return None;
                }
                let ra = plan.routes().get(vehicle_a)?;
                let rb = plan.routes().get(vehicle_b)?;
                if cut_a > ra.len() || cut_b > rb.len() {
                    return None;
                }
                if cut_a == ra.len() && cut_b == rb.len() {
                    return None;
                }
                let mut na = ra[..cut_a].to_vec();
                na.extend_from_slice(&rb[cut_b..]);
                let mut nb = rb[..cut_b].to_vec();
                nb.extend_from_slice(&ra[cut_a..]);
                Some(MoveEffect::pair((vehicle_a, na), (vehicle_b, nb)))
            }
            Move::MakeActive {
                index,
                vehicle,
                pos,
            } => {
                if plan.is_performed(index) {
                    return None;
                }
                let route = plan.routes().get(vehicle)?;
                if pos > route.len() {
                    return None;
                }
                let mut r = route.to_vec();
                r.insert(pos, index);
                let mut effect = MoveEffect::reshaped(vehicle, r);
                effect.activated = Some(index);
                Some(effect)
            }
            Move::MakeInactive { vehicle, pos } => {
                let route = plan.routes().get(vehicle)?;
                let index = *route.get(pos)?;
                let mut r = route.to_vec();
                r.remove(pos);
                let mut effect = MoveEffect::reshaped(vehicle, r);
                effect.deactivated = Some(index);
                Some(effect)
            }
            Move::SwapActive {
                vehicle,
                pos,
                index,
            } => {
                if plan.is_performed(index) {
                    return None;
                }
                let route = plan.routes().get(vehicle)?;
                let removed = *route.get(pos)?;
                let mut r = route.to_vec();
                r[pos] = index;
                let mut effect = MoveEffect::reshaped(vehicle, r);
                effect.activated = Some(index);
                effect.deactivated = Some(removed);
                Some(effect)
            }
        }
    }

    /// Visits whose placement the move changes, used as tabu attributes.
    pub(crate) fn touched(&self, plan: &RoutePlan) -> SmallVec<[usize; 2]> {
        let at = |vehicle: usize, pos: usize| plan.routes().get(vehicle)?.get(pos).copied();
        let found: [Option<usize>; 2] = match *self {
            Move::TwoOpt { vehicle, from, to } => [at(vehicle, from), at(vehicle, to)],
            Move::Relocate {
                from_vehicle,
                from_pos,
                ..
            } => [at(from_vehicle, from_pos), None],
            Move::OrOpt {
                vehicle, from_pos, ..
            } => [at(vehicle, from_pos), None],
            Move::Exchange {
                vehicle_a,
                pos_a,
                vehicle_b,
                pos_b,
            } => [at(vehicle_a, pos_a), at(vehicle_b, pos_b)],
            Move::CrossExchange {
                vehicle_a,
                cut_a,
                vehicle_b,
                cut_b,
            } => [at(vehicle_a, cut_a), at(vehicle_b, cut_b)],
            Move::MakeActive { index, .. } => [Some(index), None],
            Move::MakeInactive { vehicle, pos } => [at(vehicle, pos), None],
            Move::SwapActive {
                vehicle,
                pos,
                index,
            } => [at(vehicle, pos), Some(index)],
        };
        found.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> RoutePlan {
        // Vehicle 0: 1 2 3 4, vehicle 1: 5 6, index 7 unperformed.
        RoutePlan::from_routes(vec![vec![1, 2, 3, 4], vec![5, 6]], 12)
    }

    fn single(effect: MoveEffect) -> Vec<usize> {
        assert_eq!(effect.routes.len(), 1);
        effect.routes[0].1.clone()
    }

    #[test]
    fn test_two_opt() {
        let e = Move::TwoOpt { vehicle: 0, from: 1, to: 3 }
            .effect(&plan())
            .expect("valid");
        assert_eq!(single(e), vec![1, 4, 3, 2]);
        assert!(Move::TwoOpt { vehicle: 0, from: 2, to: 2 }.effect(&plan()).is_none());
    }

    #[test]
    fn test_relocate_intra() {
        let e = Move::Relocate {
            from_vehicle: 0,
            from_pos: 0,
            to_vehicle: 0,
            to_pos: 3,
        }
        .effect(&plan())
        .expect("valid");
        assert_eq!(single(e), vec![2, 3, 4, 1]);
    }

    #[test]
    fn test_relocate_inter() {
        let e = Move::Relocate {
            from_vehicle: 0,
            from_pos: 1,
            to_vehicle: 1,
            to_pos: 1,
        }
        .effect(&plan())
        .expect("valid");
        assert_eq!(e.routes[0], (0, vec![1, 3, 4]));
        assert_eq!(e.routes[1], (1, vec![5, 2, 6]));
        assert!(e.activated.is_none() && e.deactivated.is_none());
    }

    #[test]
    fn test_or_opt() {
        let e = Move::OrOpt {
            vehicle: 0,
            from_pos: 0,
            len: 2,
            to_pos: 2,
        }
        .effect(&plan())
        .expect("valid");
        assert_eq!(single(e), vec![3, 4, 1, 2]);
    }

    #[test]
    fn test_exchange() {
        let e = Move::Exchange {
            vehicle_a: 0,
            pos_a: 0,
            vehicle_b: 1,
            pos_b: 1,
        }
        .effect(&plan())
        .expect("valid");
        assert_eq!(e.routes[0], (0, vec![6, 2, 3, 4]));
        assert_eq!(e.routes[1], (1, vec![5, 1]));
    }

    #[test]
    fn test_cross_exchange() {
        let e = Move::CrossExchange {
            vehicle_a: 0,
            cut_a: 2,
            vehicle_b: 1,
            cut_b: 1,
        }
        .effect(&plan())
        .expect("valid");
        assert_eq!(e.routes[0], (0, vec![1, 2, 6]));
        assert_eq!(e.routes[1], (1, vec![5, 3, 4]));
        assert!(Move::CrossExchange {
            vehicle_a: 0,
            cut_a: 4,
            vehicle_b: 1,
            cut_b: 2,
        }
        .effect(&plan())
        .is_none());
    }

    #[test]
    fn test_activity_moves() {
        let p = plan();
        let e = Move::MakeActive { index: 7, vehicle: 1, pos: 2 }
            .effect(&p)
            .expect("valid");
        assert_eq!(e.activated, Some(7));
        assert_eq!(e.routes[0].1, vec![5, 6, 7]);
        assert!(Move::MakeActive { index: 5, vehicle: 0, pos: 0 }.effect(&p).is_none());

        let e = Move::MakeInactive { vehicle: 0, pos: 2 }.effect(&p).expect("valid");
        assert_eq!(e.deactivated, Some(3));
        assert_eq!(e.routes[0].1, vec![1, 2, 4]);

        let e = Move::SwapActive { vehicle: 1, pos: 0, index: 7 }
            .effect(&p)
            .expect("valid");
        assert_eq!(e.routes[0].1, vec![7, 6]);
        assert_eq!((e.activated, e.deactivated), (Some(7), Some(5)));
    }

    #[test]
    fn test_touched() {
        let p = plan();
        let m = Move::Exchange {
            vehicle_a: 0,
            pos_a: 3,
            vehicle_b: 1,
            pos_b: 0,
        };
        assert_eq!(m.touched(&p).as_slice(), &[4, 5]);
        let m = Move::CrossExchange {
            vehicle_a: 0,
            cut_a: 4,
            vehicle_b: 1,
            cut_b: 0,
        };
        assert_eq!(m.touched(&p).as_slice(), &[5]);
    }
}
