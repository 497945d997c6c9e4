//! Solve entry points.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tracing::warn;

use super::{RoutingModel, RoutingStatus};
use crate::error::RoutingError;
use crate::search::{SearchEngine, SearchOutcome, SearchParameters};
use crate::solution::Assignment;

impl RoutingModel {
    /// Solves with default parameters.
    pub fn solve(&mut self) -> Result<Option<Assignment>, RoutingError> {
        self.solve_with_parameters(&SearchParameters::default())
    }

    /// Solves with `params`.
    ///
    /// Returns `Ok(None)` and sets [`RoutingStatus::Infeasible`] when no
    /// plan satisfies the hard constraints.
    pub fn solve_with_parameters(
        &mut self,
        params: &SearchParameters,
    ) -> Result<Option<Assignment>, RoutingError> {
        self.run_search(params, None, None)
    }

    /// Solves with `params`, stopping after the current step once `cancel`
    /// is raised. The best plan found so far is returned.
    pub fn solve_with_cancel(
        &mut self,
        params: &SearchParameters,
        cancel: Arc<AtomicBool>,
    ) -> Result<Option<Assignment>, RoutingError> {
        self.run_search(params, Some(cancel), None)
    }

    /// Starts the search from `routes` (visit indices per vehicle, anchors
    /// excluded; missing vehicles are empty). Unrouted visits are inserted
    /// before the improvement phase.
    ///
    /// Malformed routes are an error; well-formed routes that break a hard
    /// constraint make the solve infeasible.
    pub fn solve_from_routes(
        &mut self,
        routes: &[Vec<usize>],
        params: &SearchParameters,
    ) -> Result<Option<Assignment>, RoutingError> {
        params.validate()?;
        let routes = self.check_initial_routes(routes)?;
        self.run_search(params, None, Some(routes))
    }

    fn check_initial_routes(&self, routes: &[Vec<usize>]) -> Result<Vec<Vec<usize>>, RoutingError> {
        let manager = &self.manager;
        if routes.len() > manager.num_vehicles() {
            return Err(RoutingError::InvalidInitialRoutes(format!(
                "{} routes for {} vehicles",
                routes.len(),
                manager.num_vehicles()
            )));
        }
        let mut seen = vec![false; manager.num_indices()];
        for (vehicle, route) in routes.iter().enumerate() {
            for &index in route {
                if index >= manager.num_indices() || !manager.is_visit(index) {
                    return Err(RoutingError::InvalidInitialRoutes(format!(
                        "route {vehicle} contains {index}, which is not a visit index"
                    )));
                }
                if std::mem::replace(&mut seen[index], true) {
                    return Err(RoutingError::InvalidInitialRoutes(format!(
                        "index {index} appears more than once"
                    )));
                }
            }
        }
        let mut padded = routes.to_vec();
        padded.resize(manager.num_vehicles(), Vec::new());
        Ok(padded)
    }

    fn run_search(
        &mut self,
        params: &SearchParameters,
        cancel: Option<Arc<AtomicBool>>,
        initial: Option<Vec<Vec<usize>>>,
    ) -> Result<Option<Assignment>, RoutingError> {
        params.validate()?;
        if !self.closed {
            self.transits.memoize(self.manager.num_indices());
            self.closed = true;
        }
        self.status = RoutingStatus::Searching;

        let SearchOutcome { plan, stats } = SearchEngine::new(self, params, cancel).run(initial);
        let assignment = plan.and_then(|plan| {
            let assignment = Assignment::build(self, &plan);
            if assignment.is_none() {
                warn!(event = "assignment_rejected", "best plan failed re-evaluation");
            }
            assignment
        });

        self.status = if assignment.is_some() {
            RoutingStatus::Solved
        } else {
            RoutingStatus::Infeasible
        };
        self.last_stats = Some(stats);
        Ok(assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexManager, NodeIndex};

    fn line() -> RoutingModel {
        let mut m = RoutingModel::new(IndexManager::new(4, 2, NodeIndex(0)).expect("valid"));
        let d = m.register_node_transit_callback(|a, b| (a.0 as i64 - b.0 as i64).abs());
        m.set_arc_cost_evaluator_of_all_vehicles(d).expect("ok");
        m
    }

    #[test]
    fn test_solve_closes_model() {
        let mut m = line();
        let a = m.solve().expect("valid").expect("feasible");
        assert_eq!(a.objective_value(), 6);
        assert_eq!(m.status(), RoutingStatus::Solved);
        assert!(matches!(m.add_disjunction(&[1], 1), Err(RoutingError::ModelClosed)));
        let again = m.solve().expect("valid").expect("feasible");
        assert_eq!(again.objective_value(), 6);
    }

    #[test]
    fn test_initial_routes_are_checked() {
        let mut m = line();
        let p = SearchParameters::default();
        assert!(matches!(
            m.solve_from_routes(&[vec![1], vec![2], vec![3]], &p),
            Err(RoutingError::InvalidInitialRoutes(_))
        ));
        assert!(matches!(
            m.solve_from_routes(&[vec![1, 1]], &p),
            Err(RoutingError::InvalidInitialRoutes(_))
        ));
        let start = m.manager().start(1);
        assert!(matches!(
            m.solve_from_routes(&[vec![start]], &p),
            Err(RoutingError::InvalidInitialRoutes(_))
        ));
        let a = m
            .solve_from_routes(&[vec![3, 1]], &p)
            .expect("valid")
            .expect("feasible");
        assert_eq!(a.objective_value(), 6);
        assert_eq!(a.num_performed_visits(), 3);
    }

    #[test]
    fn test_invalid_parameters_leave_model_open() {
        let mut m = line();
        let p = SearchParameters::default()
            .with_metaheuristic(crate::search::LocalSearchMetaheuristic::TabuSearch);
        assert!(matches!(
            m.solve_with_parameters(&p),
            Err(RoutingError::InvalidParameters(_))
        ));
        assert!(m.add_disjunction(&[1], 1).is_ok());
    }
}
