//! Route evaluator that propagates dimensions and prices routes and plans.

use smallvec::SmallVec;

use super::CostBreakdown;
use crate::model::RoutingModel;

/// Full evaluation of one vehicle's route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEvaluation {
    /// Sum of arc costs along the route.
    pub arc_cost: i64,
    /// Fixed vehicle cost, zero for an empty route.
    pub fixed_cost: i64,
    /// Soft-bound penalties over all dimensions.
    pub soft_cost: i64,
    /// `cumuls[d][k]` is dimension `d`'s value at path position `k`
    /// (position 0 is the start, the last position the end).
    pub cumuls: Vec<Vec<i64>>,
}

impl RouteEvaluation {
    /// Total route cost.
    pub fn cost(&self) -> i64 {
        self.arc_cost + self.fixed_cost + self.soft_cost
    }
}

/// Central hard-constraint check and pricing of routes.
///
/// Every candidate route, whether built by a first-solution heuristic or
/// proposed by a local-search move, goes through [`route_cost`](Self::route_cost)
/// or [`evaluate_route`](Self::evaluate_route): a route is feasible exactly
/// when every dimension admits cumul values along it.
///
/// # Examples
///
/// ```
/// use u_routing_engine::index::{IndexManager, NodeIndex};
/// use u_routing_engine::model::RoutingModel;
/// use u_routing_engine::dimension::CapacityLimit;
/// use u_routing_engine::evaluation::RouteEvaluator;
///
/// let manager = IndexManager::new(4, 1, NodeIndex(0)).unwrap();
/// let mut model = RoutingModel::new(manager);
/// let unit = model.register_transit_callback(|_, _| 1);
/// model.set_arc_cost_evaluator_of_all_vehicles(unit).unwrap();
/// let demand = model.register_unary_transit_callback(|i| if i == 0 { 0 } else { 5 });
/// model.add_dimension(demand, 0, CapacityLimit::AtMost(10), true, "load").unwrap();
///
/// let evaluator = RouteEvaluator::new(&model);
/// assert_eq!(evaluator.route_cost(0, &[1, 2]), Some(3));
/// assert_eq!(evaluator.route_cost(0, &[1, 2, 3]), None);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RouteEvaluator<'a> {
    model: &'a RoutingModel,
}

impl<'a> RouteEvaluator<'a> {
    /// Creates an evaluator over `model`.
    pub fn new(model: &'a RoutingModel) -> Self {
        Self { model }
    }

    fn path(&self, vehicle: usize, visits: &[usize]) -> SmallVec<[usize; 32]> {
        let manager = self.model.manager();
        let mut path = SmallVec::with_capacity(visits.len() + 2);
        path.push(manager.start(vehicle));
        path.extend_from_slice(visits);
        path.push(manager.end(vehicle));
        path
    }

    fn arc_cost(&self, vehicle: usize, path: &[usize]) -> i64 {
        if path.len() <= 2 {
            return 0;
        }
        path.windows(2)
            .map(|w| self.model.arc_cost(w[0], w[1], vehicle))
            .sum()
    }

    fn fixed_cost(&self, vehicle: usize, visits: &[usize]) -> i64 {
        if visits.is_empty() {
            0
        } else {
            self.model.fixed_costs[vehicle]
        }
    }

    /// Cost of serving `visits` in order with `vehicle`, or `None` when some
    /// dimension cannot be satisfied.
    pub fn route_cost(&self, vehicle: usize, visits: &[usize]) -> Option<i64> {
        let path = self.path(vehicle, visits);
        let mut soft_cost = 0;
        for dimension in &self.model.dimensions {
            let cumuls = dimension.propagate(vehicle, &path, &self.model.transits)?;
            soft_cost += dimension.soft_cost(&path, &cumuls);
        }
        Some(self.arc_cost(vehicle, &path) + self.fixed_cost(vehicle, visits) + soft_cost)
    }

    /// Like [`route_cost`](Self::route_cost) but keeps the realized cumuls.
    pub fn evaluate_route(&self, vehicle: usize, visits: &[usize]) -> Option<RouteEvaluation> {
        let path = self.path(vehicle, visits);
        let mut soft_cost = 0;
        let mut cumuls = Vec::with_capacity(self.model.dimensions.len());
        for dimension in &self.model.dimensions {
            let values = dimension.propagate(vehicle, &path, &self.model.transits)?;
            soft_cost += dimension.soft_cost(&path, &values);
            cumuls.push(values);
        }
        Some(RouteEvaluation {
            arc_cost: self.arc_cost(vehicle, &path),
            fixed_cost: self.fixed_cost(vehicle, visits),
            soft_cost,
            cumuls,
        })
    }

    /// Prices a complete plan from scratch.
    ///
    /// `routes[v]` lists the visits of vehicle `v`; missing vehicles are
    /// empty. Returns `None` if a route is infeasible, a visit appears twice,
    /// a mandatory visit is missing or a disjunction holds too many performed
    /// members.
    pub fn evaluate_plan(&self, routes: &[Vec<usize>]) -> Option<CostBreakdown> {
        let manager = self.model.manager();
        let mut vehicle_of: Vec<Option<usize>> = vec![None; manager.num_indices()];
        let mut breakdown = CostBreakdown::default();

        for vehicle in 0..manager.num_vehicles() {
            let visits = routes.get(vehicle).map(Vec::as_slice).unwrap_or(&[]);
            for &index in visits {
                if !manager.is_visit(index) || vehicle_of[index].is_some() {
                    return None;
                }
                vehicle_of[index] = Some(vehicle);
            }
            let route = self.evaluate_route(vehicle, visits)?;
            breakdown.arc += route.arc_cost;
            breakdown.fixed += route.fixed_cost;
            breakdown.soft_bounds += route.soft_cost;
        }
        if manager
            .visit_indices()
            .any(|i| vehicle_of[i].is_none() && !self.model.is_optional(i))
        {
            return None;
        }

        for disjunction in &self.model.disjunctions {
            let active = disjunction
                .indices()
                .iter()
                .filter(|&&i| vehicle_of[i].is_some())
                .count();
            if !disjunction.allows(active) {
                return None;
            }
            breakdown.disjunction_penalties += disjunction.penalty_for(active);
        }

        breakdown.same_vehicle = self
            .model
            .groups
            .iter()
            .map(|g| g.cost_for(g.indices().iter().map(|&i| vehicle_of[i])))
            .sum();

        Some(breakdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::CapacityLimit;
    use crate::index::{IndexManager, NodeIndex};

    /// Depot 0 and nodes 1..=4 on a line; 2 vehicles; load 3 per visit.
    fn setup() -> RoutingModel {
        let manager = IndexManager::new(5, 2, NodeIndex(0)).expect("valid");
        let mut model = RoutingModel::new(manager);
        let distance = model
            .register_node_transit_callback(|a, b| (a.0 as i64 - b.0 as i64).abs() * 10);
        model
            .set_arc_cost_evaluator_of_all_vehicles(distance)
            .expect("ok");
        let manager = model.shared_manager();
        let demand = model.register_unary_transit_callback(move |i| {
            if manager.is_visit(i) {
                3
            } else {
                0
            }
        });
        model
            .add_dimension(demand, 0, CapacityLimit::AtMost(10), true, "load")
            .expect("ok");
        model
    }

    #[test]
    fn test_empty_route_is_free() {
        let mut model = setup();
        model.set_fixed_cost_of_all_vehicles(500).expect("ok");
        let eval = RouteEvaluator::new(&model);
        assert_eq!(eval.route_cost(0, &[]), Some(0));
        assert_eq!(eval.route_cost(0, &[2]), Some(40 + 500));
    }

    #[test]
    fn test_route_cumuls() {
        let model = setup();
        let eval = RouteEvaluator::new(&model);
        let route = eval.evaluate_route(1, &[1, 3]).expect("feasible");
        assert_eq!(route.arc_cost, 10 + 20 + 30);
        // Demand is charged on the arc leaving each visit.
        assert_eq!(route.cumuls[0], vec![0, 0, 3, 6]);
    }

    #[test]
    fn test_capacity_rejects_route() {
        let model = setup();
        let eval = RouteEvaluator::new(&model);
        assert!(eval.route_cost(0, &[1, 2, 3]).is_some());
        assert!(eval.route_cost(0, &[1, 2, 3, 4]).is_none());
    }

    #[test]
    fn test_soft_bound_on_end() {
        let mut model = setup();
        let end = model.manager().end(0);
        model
            .mutable_dimension("load")
            .expect("exists")
            .set_cumul_var_soft_upper_bound(end, 6, 100)
            .expect("ok");
        let eval = RouteEvaluator::new(&model);
        let route = eval.evaluate_route(0, &[1, 2, 3]).expect("feasible");
        assert_eq!(route.soft_cost, 300);
        assert_eq!(route.cost(), 60 + 300);
    }

    #[test]
    fn test_evaluate_plan_penalties() {
        let mut model = setup();
        model.add_disjunction(&[4], 1_000).expect("ok");
        model
            .add_soft_same_vehicle_constraint(&[1, 2], 77)
            .expect("ok");
        let eval = RouteEvaluator::new(&model);
        let cost = eval
            .evaluate_plan(&[vec![1, 3], vec![2]])
            .expect("feasible");
        assert_eq!(cost.arc, 60 + 40);
        assert_eq!(cost.disjunction_penalties, 1_000);
        assert_eq!(cost.same_vehicle, 77);
        assert_eq!(cost.total(), 100 + 1_000 + 77);
    }

    #[test]
    fn test_evaluate_plan_rejects_duplicates_and_cardinality() {
        let mut model = setup();
        model.add_disjunction(&[1, 2], 5).expect("ok");
        let eval = RouteEvaluator::new(&model);
        assert!(eval.evaluate_plan(&[vec![1], vec![1]]).is_none());
        assert!(eval.evaluate_plan(&[vec![1, 2], vec![]]).is_none());
        assert!(eval.evaluate_plan(&[vec![0], vec![]]).is_none());
        assert!(eval.evaluate_plan(&[vec![1, 3, 4], vec![]]).is_some());
        // 3 is mandatory.
        assert!(eval.evaluate_plan(&[vec![1, 4], vec![]]).is_none());
    }
}
