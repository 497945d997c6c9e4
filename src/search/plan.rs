//! Working representation of a routing plan during search.

/// Visits per vehicle (anchors excluded) plus the reverse lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RoutePlan {
    routes: Vec<Vec<usize>>,
    vehicle_of: Vec<Option<usize>>,
}

impl RoutePlan {
    /// All vehicles empty, every visit unperformed.
    pub fn empty(num_vehicles: usize, num_indices: usize) -> Self {
        Self {
            routes: vec![Vec::new(); num_vehicles],
            vehicle_of: vec![None; num_indices],
        }
    }

    /// Builds a plan from per-vehicle visit lists. Structure is assumed
    /// valid: each visit appears at most once.
    pub fn from_routes(routes: Vec<Vec<usize>>, num_indices: usize) -> Self {
        let mut vehicle_of = vec![None; num_indices];
        for (v, route) in routes.iter().enumerate() {
            for &i in route {
                vehicle_of[i] = Some(v);
            }
        }
        Self { routes, vehicle_of }
    }

    pub fn routes(&self) -> &[Vec<usize>] {
        &self.routes
    }

    pub fn route(&self, vehicle: usize) -> &[usize] {
        &self.routes[vehicle]
    }

    pub fn num_vehicles(&self) -> usize {
        self.routes.len()
    }

    pub fn vehicle_of(&self, index: usize) -> Option<usize> {
        self.vehicle_of[index]
    }

    pub fn is_performed(&self, index: usize) -> bool {
        self.vehicle_of[index].is_some()
    }

    /// Replaces several routes at once.
    ///
    /// Members of the old routes are cleared first so a visit moving
    /// between two replaced routes ends up on its new vehicle.
    pub fn replace_routes<'r, I>(&mut self, changes: I)
    where
        I: IntoIterator<Item = (usize, &'r [usize])> + Clone,
    {
        for (v, _) in changes.clone() {
            for &i in &self.routes[v] {
                self.vehicle_of[i] = None;
            }
        }
        for (v, route) in changes {
            for &i in route {
                self.vehicle_of[i] = Some(v);
            }
            self.routes[v].clear();
            self.routes[v].extend_from_slice(route);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_routes_moves_visit() {
        let mut plan = RoutePlan::from_routes(vec![vec![1, 2], vec![3]], 8);
        let a = vec![1];
        let b = vec![2, 3];
        plan.replace_routes([(1, b.as_slice()), (0, a.as_slice())]);
        assert_eq!(plan.vehicle_of(2), Some(1));
        assert_eq!(plan.vehicle_of(1), Some(0));
        assert_eq!(plan.route(1), &[2, 3]);
    }

    #[test]
    fn test_replace_routes_drops_visit() {
        let mut plan = RoutePlan::from_routes(vec![vec![1, 2]], 5);
        let a = vec![2];
        plan.replace_routes([(0, a.as_slice())]);
        assert!(!plan.is_performed(1));
        assert!(plan.is_performed(2));
    }
}
