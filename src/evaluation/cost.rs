//! Objective decomposition.

use serde::Serialize;

/// Objective split by source. [`total`](Self::total) is the objective value.
///
/// # Examples
///
/// ```
/// use u_routing_engine::evaluation::CostBreakdown;
///
/// let cost = CostBreakdown {
///     arc: 120,
///     soft_bounds: 300,
///     disjunction_penalties: 50,
///     ..CostBreakdown::default()
/// };
/// assert_eq!(cost.total(), 470);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CostBreakdown {
    /// Arc costs of all routes.
    pub arc: i64,
    /// Fixed costs of used vehicles.
    pub fixed: i64,
    /// Soft-bound penalties of all dimensions.
    pub soft_bounds: i64,
    /// Penalties of disjunctions with missing members.
    pub disjunction_penalties: i64,
    /// Costs of split same-vehicle groups.
    pub same_vehicle: i64,
}

impl CostBreakdown {
    /// Sum of all parts.
    pub fn total(&self) -> i64 {
        self.arc + self.fixed + self.soft_bounds + self.disjunction_penalties + self.same_vehicle
    }
}
