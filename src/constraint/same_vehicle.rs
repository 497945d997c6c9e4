//! Soft same-vehicle groups.

use serde::Serialize;
use smallvec::SmallVec;

/// Group sizes above this trigger a warning when the group is added.
pub const RECOMMENDED_MAX_GROUP_SIZE: usize = 10;

/// Indices that should share a vehicle.
///
/// The group costs `cost` once when its performed members are spread over
/// more than one vehicle. Unperformed members are ignored.
///
/// # Examples
///
/// ```
/// use u_routing_engine::constraint::SameVehicleGroup;
///
/// let g = SameVehicleGroup::new(vec![1, 2, 3], 1000);
/// assert_eq!(g.cost_for([Some(0), Some(0), None]), 0);
/// assert_eq!(g.cost_for([Some(0), Some(1), Some(0)]), 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SameVehicleGroup {
    indices: Vec<usize>,
    cost: i64,
}

impl SameVehicleGroup {
    /// Creates a group. Validation happens in the model.
    pub fn new(indices: Vec<usize>, cost: i64) -> Self {
        Self { indices, cost }
    }

    /// Member indices.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Cost when the group is split.
    pub fn cost(&self) -> i64 {
        self.cost
    }

    /// Cost given the vehicle of every member, in member order.
    pub fn cost_for<I>(&self, vehicles: I) -> i64
    where
        I: IntoIterator<Item = Option<usize>>,
    {
        let mut seen: SmallVec<[usize; 4]> = SmallVec::new();
        for v in vehicles.into_iter().flatten() {
            if !seen.contains(&v) {
                seen.push(v);
                if seen.len() > 1 {
                    return self.cost;
                }
            }
        }
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_unperformed_is_free() {
        let g = SameVehicleGroup::new(vec![1, 2], 7);
        assert_eq!(g.cost_for([None, None]), 0);
    }

    #[test]
    fn test_cost_is_flat() {
        let g = SameVehicleGroup::new(vec![1, 2, 3, 4], 7);
        assert_eq!(g.cost_for([Some(0), Some(1), Some(2), Some(3)]), 7);
    }
}
