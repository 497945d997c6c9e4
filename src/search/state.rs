//! Incrementally priced plan.
//!
//! A [`PlanState`] keeps the cost of every route, the number of performed
//! members of every disjunction and the cost of every same-vehicle group,
//! so a move is priced by re-evaluating only the routes it rewrites.

use rayon::prelude::*;
use smallvec::SmallVec;

use super::RoutePlan;
use crate::evaluation::RouteEvaluator;
use crate::local_search::{Move, MoveEffect};
use crate::model::RoutingModel;

/// A validated move and everything needed to apply it.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub mv: Move,
    /// Objective change if applied.
    pub delta: i64,
    pub effect: MoveEffect,
    route_costs: SmallVec<[i64; 2]>,
    disjunction_active: SmallVec<[(usize, usize); 2]>,
    group_costs: SmallVec<[(usize, i64); 2]>,
}

/// A feasible plan with its cached cost components.
#[derive(Debug, Clone)]
pub(crate) struct PlanState<'m> {
    model: &'m RoutingModel,
    evaluator: RouteEvaluator<'m>,
    plan: RoutePlan,
    route_costs: Vec<i64>,
    disjunction_active: Vec<usize>,
    group_costs: Vec<i64>,
    objective: i64,
}

impl<'m> PlanState<'m> {
    /// Prices `plan`, or returns `None` if a route or a disjunction is
    /// infeasible. Unperformed mandatory visits are allowed here; the
    /// constructive phase completes them.
    pub fn new(model: &'m RoutingModel, plan: RoutePlan) -> Option<Self> {
        let evaluator = RouteEvaluator::new(model);
        let route_costs = (0..plan.num_vehicles())
            .map(|v| evaluator.route_cost(v, plan.route(v)))
            .collect::<Option<Vec<_>>>()?;

        let mut disjunction_active = Vec::with_capacity(model.disjunctions.len());
        let mut penalties = 0;
        for d in &model.disjunctions {
            let active = d.indices().iter().filter(|&&i| plan.is_performed(i)).count();
            if !d.allows(active) {
                return None;
            }
            penalties += d.penalty_for(active);
            disjunction_active.push(active);
        }

        let group_costs: Vec<i64> = model
            .groups
            .iter()
            .map(|g| g.cost_for(g.indices().iter().map(|&i| plan.vehicle_of(i))))
            .collect();

        let objective =
            route_costs.iter().sum::<i64>() + penalties + group_costs.iter().sum::<i64>();
        Some(Self {
            model,
            evaluator,
            plan,
            route_costs,
            disjunction_active,
            group_costs,
            objective,
        })
    }

    pub fn model(&self) -> &'m RoutingModel {
        self.model
    }

    pub fn plan(&self) -> &RoutePlan {
        &self.plan
    }

    pub fn objective(&self) -> i64 {
        self.objective
    }

    /// Returns `true` if every mandatory visit is performed.
    pub fn is_complete(&self) -> bool {
        self.model
            .manager()
            .visit_indices()
            .all(|i| self.plan.is_performed(i) || self.model.is_optional(i))
    }

    /// Validates and prices `mv`; `None` when the move is degenerate or
    /// breaks a hard constraint.
    pub fn evaluate(&self, mv: &Move) -> Option<Candidate> {
        let effect = mv.effect(&self.plan)?;

        let mut delta = 0;
        let mut route_costs = SmallVec::new();
        for (vehicle, route) in &effect.routes {
            let cost = self.evaluator.route_cost(*vehicle, route)?;
            delta += cost - self.route_costs[*vehicle];
            route_costs.push(cost);
        }

        let mut disjunction_active: SmallVec<[(usize, usize); 2]> = SmallVec::new();
        let mut shift = |index: usize, up: bool| {
            for &d in self.model.disjunctions_of(index) {
                match disjunction_active.iter_mut().find(|(p, _)| *p == d) {
                    Some((_, active)) if up => *active += 1,
                    Some((_, active)) => *active -= 1,
                    None => {
                        let active = self.disjunction_active[d];
                        disjunction_active.push((d, if up { active + 1 } else { active - 1 }));
                    }
                }
            }
        };
        if let Some(index) = effect.activated {
            shift(index, true);
        }
        if let Some(index) = effect.deactivated {
            shift(index, false);
        }
        for &(d, active) in &disjunction_active {
            let disjunction = &self.model.disjunctions[d];
            if !disjunction.allows(active) {
                return None;
            }
            delta += disjunction.penalty_for(active)
                - disjunction.penalty_for(self.disjunction_active[d]);
        }

        let group_costs = self.group_changes(&effect);
        for &(g, cost) in &group_costs {
            delta += cost - self.group_costs[g];
        }

        Some(Candidate {
            mv: *mv,
            delta,
            effect,
            route_costs,
            disjunction_active,
            group_costs,
        })
    }

    /// New costs of the same-vehicle groups whose members change vehicle.
    fn group_changes(&self, effect: &MoveEffect) -> SmallVec<[(usize, i64); 2]> {
        let mut changes = SmallVec::new();
        if self.model.groups.is_empty() {
            return changes;
        }
        let mut moved: SmallVec<[(usize, Option<usize>); 4]> = SmallVec::new();
        for (vehicle, route) in &effect.routes {
            for &i in route {
                if self.plan.vehicle_of(i) != Some(*vehicle) && !self.model.groups_of(i).is_empty() {
                    moved.push((i, Some(*vehicle)));
                }
            }
        }
        if let Some(i) = effect.deactivated {
            if !self.model.groups_of(i).is_empty() {
                moved.push((i, None));
            }
        }

        let vehicle_after = |i: usize| {
            moved
                .iter()
                .find(|(m, _)| *m == i)
                .map_or_else(|| self.plan.vehicle_of(i), |&(_, v)| v)
        };
        for &(i, _) in &moved {
            for &g in self.model.groups_of(i) {
                if changes.iter().any(|&(seen, _)| seen == g) {
                    continue;
                }
                let group = &self.model.groups[g];
                changes.push((g, group.cost_for(group.indices().iter().map(|&m| vehicle_after(m)))));
            }
        }
        changes
    }

    /// Applies a candidate produced by [`evaluate`](Self::evaluate) on this
    /// very state.
    pub fn apply(&mut self, candidate: Candidate) {
        self.plan.replace_routes(
            candidate
                .effect
                .routes
                .iter()
                .map(|(v, r)| (*v, r.as_slice())),
        );
        for ((vehicle, _), cost) in candidate.effect.routes.iter().zip(&candidate.route_costs) {
            self.route_costs[*vehicle] = *cost;
        }
        for (d, active) in candidate.disjunction_active {
            self.disjunction_active[d] = active;
        }
        for (g, cost) in candidate.group_costs {
            self.group_costs[g] = cost;
        }
        self.objective += candidate.delta;
    }

    /// Evaluates `moves` and returns the feasible candidate with the lowest
    /// score, ties broken by position in `moves`.
    ///
    /// `score` returns `None` to discard a candidate. The result does not
    /// depend on whether evaluation runs on the rayon pool.
    pub fn best_candidate<F>(&self, moves: &[Move], parallel: bool, score: F) -> Option<(i64, Candidate)>
    where
        F: Fn(&Candidate) -> Option<i64> + Sync,
    {
        let scored = |(ordinal, mv): (usize, &Move)| {
            let candidate = self.evaluate(mv)?;
            let s = score(&candidate)?;
            Some((s, ordinal, candidate))
        };
        let lower = |a: (i64, usize, Candidate), b: (i64, usize, Candidate)| {
            if (b.0, b.1) < (a.0, a.1) {
                b
            } else {
                a
            }
        };
        let best = if parallel {
            moves
                .par_iter()
                .enumerate()
                .filter_map(scored)
                .reduce_with(lower)
        } else {
            moves.iter().enumerate().filter_map(scored).reduce(lower)
        };
        best.map(|(s, _, candidate)| (s, candidate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::CapacityLimit;
    use crate::index::{IndexManager, NodeIndex};

    /// Depot 0 and nodes 1..=4 on a line, 2 vehicles, load 1 per visit.
    fn model() -> RoutingModel {
        let mut m = RoutingModel::new(IndexManager::new(5, 2, NodeIndex(0)).expect("valid"));
        let distance =
            m.register_node_transit_callback(|a, b| (a.0 as i64 - b.0 as i64).abs());
        m.set_arc_cost_evaluator_of_all_vehicles(distance).expect("ok");
        let manager = m.shared_manager();
        let demand = m.register_unary_transit_callback(move |i| manager.is_visit(i) as i64);
        m.add_dimension(demand, 0, CapacityLimit::AtMost(3), true, "load")
            .expect("ok");
        m
    }

    fn recomputed(state: &PlanState<'_>) -> i64 {
        RouteEvaluator::new(state.model())
            .evaluate_plan(state.plan().routes())
            .expect("feasible")
            .total()
    }

    #[test]
    fn test_delta_matches_recomputation() {
        let mut m = model();
        m.add_disjunction(&[4], 100).expect("ok");
        m.add_soft_same_vehicle_constraint(&[1, 2], 30).expect("ok");
        let n = m.manager().num_indices();
        let mut state =
            PlanState::new(&m, RoutePlan::from_routes(vec![vec![1, 3], vec![2]], n)).expect("feasible");
        assert_eq!(state.objective(), recomputed(&state));

        let moves = [
            Move::Relocate { from_vehicle: 1, from_pos: 0, to_vehicle: 0, to_pos: 1 },
            Move::MakeActive { index: 4, vehicle: 1, pos: 0 },
            Move::TwoOpt { vehicle: 0, from: 0, to: 2 },
            Move::MakeInactive { vehicle: 1, pos: 0 },
        ];
        for mv in moves {
            let before = state.objective();
            let candidate = state.evaluate(&mv).expect("feasible move");
            state.apply(candidate.clone());
            assert_eq!(state.objective(), before + candidate.delta, "{mv:?}");
            assert_eq!(state.objective(), recomputed(&state), "{mv:?}");
        }
    }

    #[test]
    fn test_rejects_capacity_and_cardinality() {
        let mut m = model();
        m.add_disjunction(&[3, 4], 10).expect("ok");
        let n = m.manager().num_indices();
        let state =
            PlanState::new(&m, RoutePlan::from_routes(vec![vec![1, 2, 3], vec![]], n)).expect("feasible");
        // Capacity 3 is full on vehicle 0.
        assert!(state
            .evaluate(&Move::MakeActive { index: 4, vehicle: 0, pos: 0 })
            .is_none());
        // 3 and 4 share an at-most-one disjunction.
        assert!(state
            .evaluate(&Move::MakeActive { index: 4, vehicle: 1, pos: 0 })
            .is_none());
        assert!(state
            .evaluate(&Move::SwapActive { vehicle: 0, pos: 2, index: 4 })
            .is_some());
    }

    #[test]
    fn test_best_candidate_is_deterministic() {
        let m = model();
        let n = m.manager().num_indices();
        let state =
            PlanState::new(&m, RoutePlan::from_routes(vec![vec![4, 1], vec![2, 3]], n)).expect("feasible");
        let mut moves = Vec::new();
        crate::local_search::neighborhood(
            state.plan(),
            &m,
            &crate::search::LocalSearchOperators::default(),
            &mut moves,
        );
        let seq = state.best_candidate(&moves, false, |c| Some(c.delta));
        let par = state.best_candidate(&moves, true, |c| Some(c.delta));
        let (seq, par) = (seq.expect("some move"), par.expect("some move"));
        assert_eq!(seq.0, par.0);
        assert_eq!(seq.1.mv, par.1.mv);
        assert!(seq.0 < 0);
    }
}
