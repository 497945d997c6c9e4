//! A named cumulative resource tracked along every route.

use std::sync::Arc;

use smallvec::SmallVec;

use super::cumul::{CapacityLimit, CumulRange, CumulVar, SoftBound};
use crate::error::RoutingError;
use crate::index::{Anchor, IndexManager};
use crate::transit::{TransitHandle, TransitRegistry};

/// Cumulative dimension such as load, time or distance.
///
/// Along a route `start, i₁, …, end` of vehicle `v`:
///
/// ```text
/// cumul(next) = cumul(curr) + transit(curr, next) + slack,  0 ≤ slack ≤ slack_max
/// 0 ≤ cumul(x) ≤ capacity(v),  cumul(x) ∈ range(x)
/// ```
///
/// Soft bounds add `coefficient × violation` to the objective and never
/// relax the hard capacity or the ranges.
#[derive(Debug, Clone)]
pub struct Dimension {
    name: String,
    transit: TransitHandle,
    slack_max: i64,
    capacities: Vec<CapacityLimit>,
    fix_start_cumul_to_zero: bool,
    ranges: Vec<CumulRange>,
    soft_upper: Vec<Vec<SoftBound>>,
    soft_lower: Vec<Vec<SoftBound>>,
    soft_bound_count: usize,
    manager: Arc<IndexManager>,
}

impl Dimension {
    pub(crate) fn new(
        name: String,
        transit: TransitHandle,
        slack_max: i64,
        capacities: Vec<CapacityLimit>,
        fix_start_cumul_to_zero: bool,
        manager: Arc<IndexManager>,
    ) -> Self {
        let n = manager.num_indices();
        Self {
            name,
            transit,
            slack_max,
            capacities,
            fix_start_cumul_to_zero,
            ranges: vec![CumulRange::default(); n],
            soft_upper: vec![Vec::new(); n],
            soft_lower: vec![Vec::new(); n],
            soft_bound_count: 0,
            manager,
        }
    }

    /// Dimension name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle of the transit callback driving this dimension.
    pub fn transit(&self) -> TransitHandle {
        self.transit
    }

    /// Largest slack allowed on a single arc.
    pub fn slack_max(&self) -> i64 {
        self.slack_max
    }

    /// Hard capacity of `vehicle`, or `None` when out of range.
    pub fn capacity(&self, vehicle: usize) -> Option<CapacityLimit> {
        self.capacities.get(vehicle).copied()
    }

    /// Whether every vehicle's start cumul is pinned to zero.
    pub fn fix_start_cumul_to_zero(&self) -> bool {
        self.fix_start_cumul_to_zero
    }

    /// Mutable handle on the cumul domain of `index`.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_routing_engine::index::{IndexManager, NodeIndex};
    /// use u_routing_engine::model::RoutingModel;
    /// use u_routing_engine::dimension::CapacityLimit;
    ///
    /// let manager = IndexManager::new(3, 1, NodeIndex(0)).unwrap();
    /// let mut model = RoutingModel::new(manager);
    /// let time = model.register_transit_callback(|_, _| 10);
    /// let dim = model
    ///     .add_dimension(time, 100, CapacityLimit::AtMost(1000), true, "time")
    ///     .unwrap();
    /// dim.cumul_var(1).unwrap().set_range(20, 40).unwrap();
    /// assert!(dim.cumul_var(1).unwrap().set_range(50, 60).is_err());
    /// ```
    pub fn cumul_var(&mut self, index: usize) -> Result<CumulVar<'_>, RoutingError> {
        self.manager.check_index(index)?;
        Ok(CumulVar {
            dimension: &self.name,
            index,
            range: &mut self.ranges[index],
        })
    }

    /// Current cumul domain of `index`.
    pub fn cumul_range(&self, index: usize) -> Option<CumulRange> {
        self.ranges.get(index).copied()
    }

    /// Adds `coefficient × max(0, cumul(index) − bound)` to the objective.
    ///
    /// Several soft bounds on the same index add up. The bound must stay
    /// below the hard capacity of the vehicles that can reach `index` when
    /// all of them are bounded.
    pub fn set_cumul_var_soft_upper_bound(
        &mut self,
        index: usize,
        bound: i64,
        coefficient: i64,
    ) -> Result<(), RoutingError> {
        self.manager.check_index(index)?;
        if coefficient < 0 {
            return Err(RoutingError::Negative {
                what: "soft bound coefficient",
                value: coefficient,
            });
        }
        if let Some(capacity) = self.loosest_capacity_at(index) {
            if bound >= capacity {
                return Err(RoutingError::SoftBoundAboveCapacity {
                    dimension: self.name.clone(),
                    index,
                    bound,
                    capacity,
                });
            }
        }
        self.soft_upper[index].push(SoftBound { bound, coefficient });
        self.soft_bound_count += 1;
        Ok(())
    }

    /// Adds `coefficient × max(0, bound − cumul(index))` to the objective.
    pub fn set_cumul_var_soft_lower_bound(
        &mut self,
        index: usize,
        bound: i64,
        coefficient: i64,
    ) -> Result<(), RoutingError> {
        self.manager.check_index(index)?;
        if coefficient < 0 {
            return Err(RoutingError::Negative {
                what: "soft bound coefficient",
                value: coefficient,
            });
        }
        self.soft_lower[index].push(SoftBound { bound, coefficient });
        self.soft_bound_count += 1;
        Ok(())
    }

    /// Soft upper bounds attached to `index`.
    pub fn soft_upper_bounds(&self, index: usize) -> &[SoftBound] {
        self.soft_upper.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Soft lower bounds attached to `index`.
    pub fn soft_lower_bounds(&self, index: usize) -> &[SoftBound] {
        self.soft_lower.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns `true` if any soft bound is attached.
    pub fn has_soft_bounds(&self) -> bool {
        self.soft_bound_count > 0
    }

    /// Largest hard capacity among the vehicles that can reach `index`, or
    /// `None` if one of them is unbounded.
    fn loosest_capacity_at(&self, index: usize) -> Option<i64> {
        match self.manager.anchor(index)? {
            Anchor::Start(v) | Anchor::End(v) => self.capacities[v].bound(),
            Anchor::Visit => self
                .capacities
                .iter()
                .map(|c| c.bound())
                .try_fold(i64::MIN, |acc, b| b.map(|b| acc.max(b))),
        }
    }

    /// Computes the earliest cumul values along `path` for `vehicle`.
    ///
    /// A forward pass narrows each position to the interval reachable from
    /// the start; a backward pass then raises values only as far as the
    /// slack bound requires. Returns `None` when some interval is empty.
    pub(crate) fn propagate(
        &self,
        vehicle: usize,
        path: &[usize],
        transits: &TransitRegistry,
    ) -> Option<Vec<i64>> {
        let capacity = self.capacities[vehicle].upper();
        let mut cumuls = Vec::with_capacity(path.len());
        let mut arc_transits: SmallVec<[i64; 32]> = SmallVec::with_capacity(path.len());
        let mut prev_hi = 0i64;

        for (k, &index) in path.iter().enumerate() {
            let range = self.ranges[index];
            let mut lo = range.min.max(0);
            let mut hi = range.max.min(capacity);
            if k == 0 {
                if self.fix_start_cumul_to_zero {
                    hi = hi.min(0);
                }
            } else {
                let t = transits.evaluate(self.transit, path[k - 1], index);
                arc_transits.push(t);
                lo = lo.max(cumuls[k - 1] + t);
                hi = hi.min(prev_hi.saturating_add(t).saturating_add(self.slack_max));
            }
            if lo > hi {
                return None;
            }
            cumuls.push(lo);
            prev_hi = hi;
        }

        for k in (0..arc_transits.len()).rev() {
            let needed = cumuls[k + 1] - arc_transits[k] - self.slack_max;
            if needed > cumuls[k] {
                cumuls[k] = needed;
            }
        }
        Some(cumuls)
    }

    /// Soft-bound cost of realized `cumuls` along `path`.
    pub(crate) fn soft_cost(&self, path: &[usize], cumuls: &[i64]) -> i64 {
        if self.soft_bound_count == 0 {
            return 0;
        }
        path.iter()
            .zip(cumuls)
            .map(|(&index, &cumul)| {
                let upper: i64 = self.soft_upper[index]
                    .iter()
                    .map(|s| s.upper_penalty(cumul))
                    .sum();
                let lower: i64 = self.soft_lower[index]
                    .iter()
                    .map(|s| s.lower_penalty(cumul))
                    .sum();
                upper + lower
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::NodeIndex;

    fn setup(
        slack_max: i64,
        capacity: CapacityLimit,
        fix_start: bool,
        step: i64,
    ) -> (Dimension, TransitRegistry) {
        // depot 0 + nodes 1..=3, one vehicle: start 0, end 4
        let manager = Arc::new(IndexManager::new(4, 1, NodeIndex(0)).expect("valid"));
        let mut registry = TransitRegistry::new();
        let handle = registry.register(move |_, _| step);
        let dim = Dimension::new(
            "d".into(),
            handle,
            slack_max,
            vec![capacity],
            fix_start,
            manager,
        );
        (dim, registry)
    }

    #[test]
    fn test_propagate_running_total() {
        let (dim, reg) = setup(0, CapacityLimit::AtMost(100), true, 3);
        let cumuls = dim.propagate(0, &[0, 1, 2, 4], &reg).expect("feasible");
        assert_eq!(cumuls, vec![0, 3, 6, 9]);
    }

    #[test]
    fn test_propagate_capacity_violation() {
        let (dim, reg) = setup(0, CapacityLimit::AtMost(8), true, 3);
        assert!(dim.propagate(0, &[0, 1, 2, 4], &reg).is_none());
        assert!(dim.propagate(0, &[0, 1, 4], &reg).is_some());
    }

    #[test]
    fn test_zero_capacity_is_not_unbounded() {
        let (dim, reg) = setup(0, CapacityLimit::AtMost(0), true, 1);
        assert!(dim.propagate(0, &[0, 1, 4], &reg).is_none());
        let (dim, reg) = setup(0, CapacityLimit::Unbounded, true, 1);
        assert!(dim.propagate(0, &[0, 1, 4], &reg).is_some());
    }

    #[test]
    fn test_propagate_waits_for_window() {
        let (mut dim, reg) = setup(1000, CapacityLimit::AtMost(10_000), true, 10);
        dim.cumul_var(2).expect("in range").set_range(100, 120).expect("ok");
        let cumuls = dim.propagate(0, &[0, 1, 2, 4], &reg).expect("feasible");
        // Arrive at 1 by 10, wait there or at 2 until 100.
        assert_eq!(cumuls[2], 100);
        assert_eq!(cumuls[3], 110);
        assert!(cumuls[1] >= 10);
        assert!(cumuls[2] - cumuls[1] - 10 <= 1000);
    }

    #[test]
    fn test_propagate_raises_earlier_values_when_slack_is_short() {
        let (mut dim, reg) = setup(5, CapacityLimit::Unbounded, false, 10);
        dim.cumul_var(2).expect("in range").set_range(100, 120).expect("ok");
        let cumuls = dim.propagate(0, &[0, 1, 2, 4], &reg).expect("feasible");
        // Slack of at most 5 per arc forces an unpinned start to shift.
        assert_eq!(cumuls, vec![70, 85, 100, 110]);
    }

    #[test]
    fn test_propagate_pinned_start_cannot_reach_window() {
        let (mut dim, reg) = setup(5, CapacityLimit::Unbounded, true, 10);
        dim.cumul_var(2).expect("in range").set_range(100, 120).expect("ok");
        assert!(dim.propagate(0, &[0, 1, 2, 4], &reg).is_none());
    }

    #[test]
    fn test_propagate_late_for_window() {
        let (mut dim, reg) = setup(1000, CapacityLimit::Unbounded, true, 50);
        dim.cumul_var(1).expect("in range").set_range(0, 40).expect("ok");
        assert!(dim.propagate(0, &[0, 1, 4], &reg).is_none());
    }

    #[test]
    fn test_soft_upper_bounds_compose() {
        let (mut dim, reg) = setup(0, CapacityLimit::AtMost(100), true, 4);
        dim.set_cumul_var_soft_upper_bound(4, 6, 100).expect("ok");
        dim.set_cumul_var_soft_upper_bound(4, 10, 1).expect("ok");
        let path = [0, 1, 2, 3, 4];
        let cumuls = dim.propagate(0, &path, &reg).expect("feasible");
        assert_eq!(cumuls[4], 16);
        assert_eq!(dim.soft_cost(&path, &cumuls), 100 * 10 + 6);
    }

    #[test]
    fn test_soft_lower_bound() {
        let (mut dim, reg) = setup(0, CapacityLimit::AtMost(100), true, 4);
        dim.set_cumul_var_soft_lower_bound(4, 10, 3).expect("ok");
        let path = [0, 1, 4];
        let cumuls = dim.propagate(0, &path, &reg).expect("feasible");
        assert_eq!(dim.soft_cost(&path, &cumuls), 3 * 2);
    }

    #[test]
    fn test_soft_bound_must_stay_below_capacity() {
        let (mut dim, _) = setup(0, CapacityLimit::AtMost(10), true, 1);
        assert!(matches!(
            dim.set_cumul_var_soft_upper_bound(4, 10, 5),
            Err(RoutingError::SoftBoundAboveCapacity { capacity: 10, .. })
        ));
        assert!(dim.set_cumul_var_soft_upper_bound(4, 9, 5).is_ok());

        let (mut dim, _) = setup(0, CapacityLimit::Unbounded, true, 1);
        assert!(dim.set_cumul_var_soft_upper_bound(4, 1_000, 5).is_ok());
    }

    #[test]
    fn test_negative_coefficient_rejected() {
        let (mut dim, _) = setup(0, CapacityLimit::Unbounded, true, 1);
        assert!(dim.set_cumul_var_soft_upper_bound(1, 5, -1).is_err());
        assert!(dim.set_cumul_var_soft_lower_bound(1, 5, -1).is_err());
    }

    #[test]
    fn test_cumul_var_out_of_range() {
        let (mut dim, _) = setup(0, CapacityLimit::Unbounded, true, 1);
        assert!(dim.cumul_var(5).is_err());
    }
}
