//! Model-building API: callbacks, arc costs, dimensions and constraints.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use smallvec::SmallVec;
use tracing::warn;

use crate::constraint::{Disjunction, SameVehicleGroup, RECOMMENDED_MAX_GROUP_SIZE};
use crate::dimension::{CapacityLimit, Dimension};
use crate::error::RoutingError;
use crate::index::{IndexManager, NodeIndex};
use crate::search::SearchStats;
use crate::transit::{TransitHandle, TransitMatrix, TransitRegistry};

/// Lifecycle of a routing model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoutingStatus {
    /// Nothing has been attached yet.
    Unsolved,
    /// Callbacks, dimensions or constraints are being attached.
    Building,
    /// A solve is running.
    Searching,
    /// The last solve returned an assignment.
    Solved,
    /// The last solve found no feasible assignment.
    Infeasible,
}

/// A vehicle routing model.
///
/// Build it single-threaded, then call one of the `solve*` methods. The
/// first solve closes the model: further structural changes return
/// [`RoutingError::ModelClosed`], while solving again restarts the search
/// from scratch.
///
/// # Examples
///
/// ```
/// use u_routing_engine::index::{IndexManager, NodeIndex};
/// use u_routing_engine::model::RoutingModel;
///
/// // Depot 0 and three stops on a line.
/// let manager = IndexManager::new(4, 1, NodeIndex(0)).unwrap();
/// let mut model = RoutingModel::new(manager);
/// let distance = model.register_node_transit_callback(|a, b| {
///     (a.value() as i64 - b.value() as i64).abs()
/// });
/// model.set_arc_cost_evaluator_of_all_vehicles(distance).unwrap();
///
/// let assignment = model.solve().unwrap().expect("feasible");
/// assert_eq!(assignment.objective_value(), 6);
/// ```
pub struct RoutingModel {
    pub(crate) manager: Arc<IndexManager>,
    pub(crate) transits: TransitRegistry,
    pub(crate) arc_costs: Vec<Option<TransitHandle>>,
    pub(crate) fixed_costs: Vec<i64>,
    pub(crate) dimensions: Vec<Dimension>,
    dimension_by_name: HashMap<String, usize>,
    pub(crate) disjunctions: Vec<Disjunction>,
    disjunctions_of: Vec<SmallVec<[usize; 1]>>,
    pub(crate) groups: Vec<SameVehicleGroup>,
    groups_of: Vec<SmallVec<[usize; 1]>>,
    pub(crate) status: RoutingStatus,
    pub(crate) closed: bool,
    pub(crate) last_stats: Option<SearchStats>,
}

impl RoutingModel {
    /// Creates an empty model over `manager`'s indices.
    pub fn new(manager: IndexManager) -> Self {
        let num_indices = manager.num_indices();
        let num_vehicles = manager.num_vehicles();
        Self {
            manager: Arc::new(manager),
            transits: TransitRegistry::new(),
            arc_costs: vec![None; num_vehicles],
            fixed_costs: vec![0; num_vehicles],
            dimensions: Vec::new(),
            dimension_by_name: HashMap::new(),
            disjunctions: Vec::new(),
            disjunctions_of: vec![SmallVec::new(); num_indices],
            groups: Vec::new(),
            groups_of: vec![SmallVec::new(); num_indices],
            status: RoutingStatus::Unsolved,
            closed: false,
            last_stats: None,
        }
    }

    /// Index manager the model was built on.
    pub fn manager(&self) -> &IndexManager {
        &self.manager
    }

    /// Shared handle on the index manager, for use inside callbacks.
    pub fn shared_manager(&self) -> Arc<IndexManager> {
        Arc::clone(&self.manager)
    }

    /// Current lifecycle state.
    pub fn status(&self) -> RoutingStatus {
        self.status
    }

    /// Statistics of the last solve, if any.
    pub fn search_stats(&self) -> Option<&SearchStats> {
        self.last_stats.as_ref()
    }

    /// Registered transit callbacks.
    pub fn transits(&self) -> &TransitRegistry {
        &self.transits
    }

    fn ensure_open(&mut self) -> Result<(), RoutingError> {
        if self.closed {
            return Err(RoutingError::ModelClosed);
        }
        self.status = RoutingStatus::Building;
        Ok(())
    }

    fn check_transit(&self, handle: TransitHandle) -> Result<(), RoutingError> {
        if self.transits.contains(handle) {
            Ok(())
        } else {
            Err(RoutingError::UnknownTransit(handle.value()))
        }
    }

    // ---- transit callbacks ----

    /// Registers a callback of `(from_index, to_index)`.
    pub fn register_transit_callback<F>(&mut self, callback: F) -> TransitHandle
    where
        F: Fn(usize, usize) -> i64 + Send + Sync + 'static,
    {
        self.transits.register(callback)
    }

    /// Registers a callback of the origin index only.
    pub fn register_unary_transit_callback<F>(&mut self, callback: F) -> TransitHandle
    where
        F: Fn(usize) -> i64 + Send + Sync + 'static,
    {
        self.transits.register_unary(callback)
    }

    /// Registers a callback of `(from_node, to_node)`; indices are translated
    /// through the manager.
    pub fn register_node_transit_callback<F>(&mut self, callback: F) -> TransitHandle
    where
        F: Fn(NodeIndex, NodeIndex) -> i64 + Send + Sync + 'static,
    {
        let nodes: Vec<NodeIndex> = (0..self.manager.num_indices())
            .filter_map(|i| self.manager.index_to_node(i).ok())
            .collect();
        self.transits
            .register(move |from, to| callback(nodes[from], nodes[to]))
    }

    /// Registers a node-level matrix of size `num_nodes`.
    pub fn register_transit_matrix(
        &mut self,
        matrix: TransitMatrix,
    ) -> Result<TransitHandle, RoutingError> {
        if matrix.size() != self.manager.num_nodes() {
            return Err(RoutingError::MatrixSizeMismatch {
                size: matrix.size(),
                expected: self.manager.num_nodes(),
            });
        }
        Ok(self.register_node_transit_callback(move |a, b| matrix.get(a.0, b.0)))
    }

    // ---- costs ----

    /// Uses `handle` as the arc cost of every vehicle.
    pub fn set_arc_cost_evaluator_of_all_vehicles(
        &mut self,
        handle: TransitHandle,
    ) -> Result<(), RoutingError> {
        self.check_transit(handle)?;
        self.ensure_open()?;
        self.arc_costs.iter_mut().for_each(|c| *c = Some(handle));
        Ok(())
    }

    /// Uses `handle` as the arc cost of `vehicle`.
    pub fn set_arc_cost_evaluator_of_vehicle(
        &mut self,
        handle: TransitHandle,
        vehicle: usize,
    ) -> Result<(), RoutingError> {
        self.check_transit(handle)?;
        self.manager.check_vehicle(vehicle)?;
        self.ensure_open()?;
        self.arc_costs[vehicle] = Some(handle);
        Ok(())
    }

    /// Cost charged once for every vehicle that serves at least one visit.
    pub fn set_fixed_cost_of_all_vehicles(&mut self, cost: i64) -> Result<(), RoutingError> {
        non_negative("fixed cost", cost)?;
        self.ensure_open()?;
        self.fixed_costs.iter_mut().for_each(|c| *c = cost);
        Ok(())
    }

    /// Fixed cost of `vehicle` when used.
    pub fn set_fixed_cost_of_vehicle(&mut self, cost: i64, vehicle: usize) -> Result<(), RoutingError> {
        non_negative("fixed cost", cost)?;
        self.manager.check_vehicle(vehicle)?;
        self.ensure_open()?;
        self.fixed_costs[vehicle] = cost;
        Ok(())
    }

    /// Fixed cost of `vehicle`.
    pub fn fixed_cost_of_vehicle(&self, vehicle: usize) -> Option<i64> {
        self.fixed_costs.get(vehicle).copied()
    }

    /// Arc cost of `from → to` for `vehicle`; zero without an evaluator.
    pub fn arc_cost(&self, from: usize, to: usize, vehicle: usize) -> i64 {
        match self.arc_costs.get(vehicle).copied().flatten() {
            Some(handle) => self.transits.evaluate(handle, from, to),
            None => 0,
        }
    }

    // ---- dimensions ----

    /// Adds a dimension with the same capacity on every vehicle.
    pub fn add_dimension(
        &mut self,
        transit: TransitHandle,
        slack_max: i64,
        capacity: CapacityLimit,
        fix_start_cumul_to_zero: bool,
        name: &str,
    ) -> Result<&mut Dimension, RoutingError> {
        let capacities = vec![capacity; self.manager.num_vehicles()];
        self.add_dimension_with_vehicle_capacity(
            transit,
            slack_max,
            &capacities,
            fix_start_cumul_to_zero,
            name,
        )
    }

    /// Adds a dimension with one capacity per vehicle.
    pub fn add_dimension_with_vehicle_capacity(
        &mut self,
        transit: TransitHandle,
        slack_max: i64,
        capacities: &[CapacityLimit],
        fix_start_cumul_to_zero: bool,
        name: &str,
    ) -> Result<&mut Dimension, RoutingError> {
        self.check_transit(transit)?;
        non_negative("slack max", slack_max)?;
        if capacities.len() != self.manager.num_vehicles() {
            return Err(RoutingError::CapacityCountMismatch {
                got: capacities.len(),
                expected: self.manager.num_vehicles(),
            });
        }
        for c in capacities {
            if let Some(bound) = c.bound() {
                non_negative("capacity", bound)?;
            }
        }
        if self.dimension_by_name.contains_key(name) {
            return Err(RoutingError::DuplicateDimension(name.to_string()));
        }
        self.ensure_open()?;

        let position = self.dimensions.len();
        self.dimensions.push(Dimension::new(
            name.to_string(),
            transit,
            slack_max,
            capacities.to_vec(),
            fix_start_cumul_to_zero,
            Arc::clone(&self.manager),
        ));
        self.dimension_by_name.insert(name.to_string(), position);
        Ok(&mut self.dimensions[position])
    }

    /// Dimension called `name`.
    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimension_by_name
            .get(name)
            .map(|&position| &self.dimensions[position])
    }

    /// Mutable dimension called `name`; fails once the model is closed.
    pub fn mutable_dimension(&mut self, name: &str) -> Result<&mut Dimension, RoutingError> {
        let position = *self
            .dimension_by_name
            .get(name)
            .ok_or_else(|| RoutingError::UnknownDimension(name.to_string()))?;
        self.ensure_open()?;
        Ok(&mut self.dimensions[position])
    }

    /// All dimensions in creation order.
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    // ---- disjunctions and groups ----

    /// Allows at most one of `indices` to be performed; `penalty` is paid
    /// when none is. Returns the disjunction's position.
    pub fn add_disjunction(&mut self, indices: &[usize], penalty: i64) -> Result<usize, RoutingError> {
        self.add_disjunction_with_max_cardinality(indices, penalty, 1)
    }

    /// Allows at most `max_cardinality` of `indices`; each missing one
    /// costs `penalty`.
    pub fn add_disjunction_with_max_cardinality(
        &mut self,
        indices: &[usize],
        penalty: i64,
        max_cardinality: usize,
    ) -> Result<usize, RoutingError> {
        non_negative("disjunction penalty", penalty)?;
        if max_cardinality == 0 {
            return Err(RoutingError::ZeroCardinality);
        }
        let members = self.visit_members(indices)?;
        self.ensure_open()?;

        let position = self.disjunctions.len();
        for &i in &members {
            self.disjunctions_of[i].push(position);
        }
        self.disjunctions
            .push(Disjunction::new(members, penalty, max_cardinality));
        Ok(position)
    }

    /// Charges `cost` once if the performed members of `indices` use more
    /// than one vehicle. Returns the group's position.
    pub fn add_soft_same_vehicle_constraint(
        &mut self,
        indices: &[usize],
        cost: i64,
    ) -> Result<usize, RoutingError> {
        non_negative("same-vehicle cost", cost)?;
        let members = self.visit_members(indices)?;
        self.ensure_open()?;
        if members.len() > RECOMMENDED_MAX_GROUP_SIZE {
            warn!(
                event = "large_same_vehicle_group",
                size = members.len(),
                recommended = RECOMMENDED_MAX_GROUP_SIZE
            );
        }

        let position = self.groups.len();
        for &i in &members {
            self.groups_of[i].push(position);
        }
        self.groups.push(SameVehicleGroup::new(members, cost));
        Ok(position)
    }

    /// All disjunctions in creation order.
    pub fn disjunctions(&self) -> &[Disjunction] {
        &self.disjunctions
    }

    /// Positions of the disjunctions containing `index`.
    pub fn disjunctions_of(&self, index: usize) -> &[usize] {
        self.disjunctions_of.get(index).map(|d| d.as_slice()).unwrap_or(&[])
    }

    /// All soft same-vehicle groups in creation order.
    pub fn same_vehicle_groups(&self) -> &[SameVehicleGroup] {
        &self.groups
    }

    /// Positions of the same-vehicle groups containing `index`.
    pub fn groups_of(&self, index: usize) -> &[usize] {
        self.groups_of.get(index).map(|g| g.as_slice()).unwrap_or(&[])
    }

    /// Returns `true` if `index` may be left unperformed.
    pub fn is_optional(&self, index: usize) -> bool {
        !self.disjunctions_of(index).is_empty()
    }

    /// Validates and deduplicates a list of visit indices, keeping order.
    fn visit_members(&self, indices: &[usize]) -> Result<Vec<usize>, RoutingError> {
        if indices.is_empty() {
            return Err(RoutingError::EmptyGroup);
        }
        let mut members = Vec::with_capacity(indices.len());
        for &i in indices {
            self.manager.check_index(i)?;
            if !self.manager.is_visit(i) {
                return Err(RoutingError::AnchorIndex(i));
            }
            if !members.contains(&i) {
                members.push(i);
            }
        }
        Ok(members)
    }
}

impl std::fmt::Debug for RoutingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingModel")
            .field("num_indices", &self.manager.num_indices())
            .field("num_vehicles", &self.manager.num_vehicles())
            .field("transits", &self.transits)
            .field(
                "dimensions",
                &self.dimensions.iter().map(Dimension::name).collect::<Vec<_>>(),
            )
            .field("disjunctions", &self.disjunctions.len())
            .field("same_vehicle_groups", &self.groups.len())
            .field("status", &self.status)
            .finish()
    }
}

fn non_negative(what: &'static str, value: i64) -> Result<(), RoutingError> {
    if value < 0 {
        Err(RoutingError::Negative { what, value })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(nodes: usize, vehicles: usize) -> RoutingModel {
        RoutingModel::new(IndexManager::new(nodes, vehicles, NodeIndex(0)).expect("valid"))
    }

    #[test]
    fn test_status_moves_to_building() {
        let mut m = model(3, 1);
        assert_eq!(m.status(), RoutingStatus::Unsolved);
        let h = m.register_transit_callback(|_, _| 1);
        m.set_arc_cost_evaluator_of_all_vehicles(h).expect("ok");
        assert_eq!(m.status(), RoutingStatus::Building);
    }

    #[test]
    fn test_unknown_transit() {
        let mut m = model(3, 1);
        let mut other = model(3, 1);
        other.register_transit_callback(|_, _| 1);
        let foreign = other.register_transit_callback(|_, _| 2);
        assert!(matches!(
            m.set_arc_cost_evaluator_of_all_vehicles(foreign),
            Err(RoutingError::UnknownTransit(1))
        ));
    }

    #[test]
    fn test_arc_cost_per_vehicle() {
        let mut m = model(3, 2);
        let cheap = m.register_transit_callback(|_, _| 1);
        let dear = m.register_transit_callback(|_, _| 10);
        m.set_arc_cost_evaluator_of_all_vehicles(cheap).expect("ok");
        m.set_arc_cost_evaluator_of_vehicle(dear, 1).expect("ok");
        assert_eq!(m.arc_cost(1, 2, 0), 1);
        assert_eq!(m.arc_cost(1, 2, 1), 10);
        assert!(m.set_arc_cost_evaluator_of_vehicle(dear, 2).is_err());
    }

    #[test]
    fn test_node_callback_sees_depot_for_anchors() {
        let mut m = model(3, 2);
        let h = m.register_node_transit_callback(|a, b| (a.0 * 10 + b.0) as i64);
        let end1 = m.manager().end(1);
        assert_eq!(m.transits().evaluate(h, 2, end1), 20);
        assert_eq!(m.transits().evaluate(h, m.manager().start(1), 1), 1);
    }

    #[test]
    fn test_transit_matrix_size_checked() {
        let mut m = model(3, 1);
        assert!(m.register_transit_matrix(TransitMatrix::new(2)).is_err());
        let h = m
            .register_transit_matrix(TransitMatrix::from_fn(3, |i, j| (i + j) as i64))
            .expect("ok");
        assert_eq!(m.transits().evaluate(h, 1, m.manager().end(0)), 1);
    }

    #[test]
    fn test_duplicate_and_unknown_dimension() {
        let mut m = model(3, 1);
        let h = m.register_transit_callback(|_, _| 1);
        m.add_dimension(h, 0, CapacityLimit::AtMost(10), true, "load")
            .expect("ok");
        assert!(matches!(
            m.add_dimension(h, 0, CapacityLimit::AtMost(10), true, "load"),
            Err(RoutingError::DuplicateDimension(_))
        ));
        assert!(m.dimension("load").is_some());
        assert!(matches!(
            m.mutable_dimension("time"),
            Err(RoutingError::UnknownDimension(_))
        ));
    }

    #[test]
    fn test_vehicle_capacity_count_checked() {
        let mut m = model(3, 2);
        let h = m.register_transit_callback(|_, _| 1);
        assert!(matches!(
            m.add_dimension_with_vehicle_capacity(h, 0, &[CapacityLimit::Unbounded], true, "d"),
            Err(RoutingError::CapacityCountMismatch { got: 1, expected: 2 })
        ));
    }

    #[test]
    fn test_disjunction_validation() {
        let mut m = model(4, 1);
        assert!(matches!(m.add_disjunction(&[], 5), Err(RoutingError::EmptyGroup)));
        assert!(matches!(m.add_disjunction(&[0], 5), Err(RoutingError::AnchorIndex(0))));
        assert!(m.add_disjunction(&[9], 5).is_err());
        assert!(m.add_disjunction(&[1], -5).is_err());
        assert!(matches!(
            m.add_disjunction_with_max_cardinality(&[1, 2], 5, 0),
            Err(RoutingError::ZeroCardinality)
        ));
        let d = m.add_disjunction(&[1, 2, 1], 5).expect("ok");
        assert_eq!(m.disjunctions()[d].indices(), &[1, 2]);
        assert!(m.is_optional(2));
        assert!(!m.is_optional(3));
    }

    #[test]
    fn test_index_in_several_disjunctions() {
        let mut m = model(4, 1);
        let a = m.add_disjunction(&[1, 2], 5).expect("ok");
        let b = m.add_disjunction(&[2, 3], 7).expect("ok");
        assert_eq!(m.disjunctions_of(2), &[a, b]);
    }

    #[test]
    fn test_same_vehicle_group() {
        let mut m = model(13, 2);
        let members: Vec<usize> = (1..13).collect();
        let g = m.add_soft_same_vehicle_constraint(&members, 1000).expect("ok");
        assert_eq!(m.same_vehicle_groups()[g].indices().len(), 12);
        assert_eq!(m.groups_of(5), &[g]);
    }
}
