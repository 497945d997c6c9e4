//! Solved plans.

use serde::Serialize;

use crate::evaluation::{CostBreakdown, RouteEvaluator};
use crate::index::NodeIndex;
use crate::model::RoutingModel;
use crate::search::RoutePlan;

/// A stop on a route, anchors included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Visit {
    pub index: usize,
    pub node: NodeIndex,
    /// Cumul value of every dimension, in dimension creation order.
    pub cumuls: Vec<i64>,
}

/// One vehicle's path from its start to its end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    vehicle: usize,
    visits: Vec<Visit>,
    arc_cost: i64,
    fixed_cost: i64,
    soft_cost: i64,
}

impl Route {
    pub fn vehicle(&self) -> usize {
        self.vehicle
    }

    /// Start, visits, end.
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    /// Returns `true` if the vehicle serves nothing.
    pub fn is_empty(&self) -> bool {
        self.visits.len() <= 2
    }

    /// Number of visits between start and end.
    pub fn len(&self) -> usize {
        self.visits.len().saturating_sub(2)
    }

    pub fn arc_cost(&self) -> i64 {
        self.arc_cost
    }

    pub fn fixed_cost(&self) -> i64 {
        self.fixed_cost
    }

    pub fn soft_cost(&self) -> i64 {
        self.soft_cost
    }

    /// Arc, fixed and soft-bound cost of the route.
    pub fn cost(&self) -> i64 {
        self.arc_cost + self.fixed_cost + self.soft_cost
    }
}

/// The result of a successful solve.
///
/// Every route satisfies all hard constraints; [`objective_value`](Self::objective_value)
/// equals the objective recomputed from scratch for these routes.
#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    routes: Vec<Route>,
    unperformed: Vec<usize>,
    dimension_names: Vec<String>,
    cost: CostBreakdown,
    /// (vehicle, position in `routes[vehicle].visits`) per index.
    #[serde(skip)]
    positions: Vec<Option<(usize, usize)>>,
}

impl Assignment {
    /// Re-evaluates `plan` from scratch; `None` if it is not feasible.
    pub(crate) fn build(model: &RoutingModel, plan: &RoutePlan) -> Option<Self> {
        let manager = model.manager();
        let evaluator = RouteEvaluator::new(model);
        let cost = evaluator.evaluate_plan(plan.routes())?;

        let mut positions = vec![None; manager.num_indices()];
        let mut routes = Vec::with_capacity(manager.num_vehicles());
        for vehicle in 0..manager.num_vehicles() {
            let visits = plan.route(vehicle);
            let evaluation = evaluator.evaluate_route(vehicle, visits)?;
            let path = std::iter::once(manager.start(vehicle))
                .chain(visits.iter().copied())
                .chain(std::iter::once(manager.end(vehicle)));
            let visits = path
                .enumerate()
                .map(|(k, index)| {
                    positions[index] = Some((vehicle, k));
                    Some(Visit {
                        index,
                        node: manager.index_to_node(index).ok()?,
                        cumuls: evaluation.cumuls.iter().map(|c| c[k]).collect(),
                    })
                })
                .collect::<Option<Vec<_>>>()?;
            routes.push(Route {
                vehicle,
                visits,
                arc_cost: evaluation.arc_cost,
                fixed_cost: evaluation.fixed_cost,
                soft_cost: evaluation.soft_cost,
            });
        }

        let unperformed = manager
            .visit_indices()
            .filter(|&i| positions[i].is_none())
            .collect();
        Some(Self {
            routes,
            unperformed,
            dimension_names: model.dimensions().iter().map(|d| d.name().to_string()).collect(),
            cost,
            positions,
        })
    }

    /// Total cost: arcs, fixed costs, soft bounds, disjunction penalties and
    /// same-vehicle costs.
    pub fn objective_value(&self) -> i64 {
        self.cost.total()
    }

    pub fn cost(&self) -> CostBreakdown {
        self.cost
    }

    /// One route per vehicle, empty ones included.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn route(&self, vehicle: usize) -> Option<&Route> {
        self.routes.get(vehicle)
    }

    /// Successor of `index` on its route; `None` for ends and unperformed
    /// visits.
    pub fn next(&self, index: usize) -> Option<usize> {
        let (vehicle, k) = self.positions.get(index).copied().flatten()?;
        self.routes[vehicle].visits.get(k + 1).map(|v| v.index)
    }

    /// Vehicle serving `index`, anchors included.
    pub fn vehicle_of(&self, index: usize) -> Option<usize> {
        self.positions.get(index).copied().flatten().map(|(v, _)| v)
    }

    pub fn is_performed(&self, index: usize) -> bool {
        self.vehicle_of(index).is_some()
    }

    /// Visit indices left unperformed, ascending.
    pub fn unperformed(&self) -> &[usize] {
        &self.unperformed
    }

    pub fn dimension_names(&self) -> &[String] {
        &self.dimension_names
    }

    /// Value of dimension `dimension` at `index`.
    pub fn cumul_value(&self, dimension: &str, index: usize) -> Option<i64> {
        let d = self.dimension_names.iter().position(|n| n == dimension)?;
        let (vehicle, k) = self.positions.get(index).copied().flatten()?;
        Some(self.routes[vehicle].visits[k].cumuls[d])
    }

    /// Number of performed visits, anchors excluded.
    pub fn num_performed_visits(&self) -> usize {
        self.routes.iter().map(Route::len).sum()
    }
}
