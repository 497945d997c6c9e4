//! Node ↔ index bijection with per-vehicle depot aliases.
//!
//! # Layout
//!
//! Nodes are scanned in increasing order. A regular node receives the next
//! free index. A node that is the start depot of one or more vehicles
//! receives the next free index as the start of the lowest such vehicle.
//! The remaining vehicle starts, then all vehicle ends, are appended in
//! vehicle order. With a single shared depot at node 0 this gives
//! `node_to_index(n) == n` for every node, starts of vehicles `1..V` at
//! `N..N+V-1` and ends after them.
//!
//! # Complexity
//!
//! Construction is O(N + V); every lookup is O(1).

use serde::{Deserialize, Serialize};

use crate::error::RoutingError;

/// Opaque problem-space node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeIndex(pub usize);

impl NodeIndex {
    /// Returns the raw node number.
    pub fn value(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of a solver index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// A regular visit that may be routed on any vehicle or left unperformed.
    Visit,
    /// Start of the given vehicle's route.
    Start(usize),
    /// End of the given vehicle's route.
    End(usize),
}

/// Bidirectional mapping between nodes and solver indices.
///
/// # Examples
///
/// ```
/// use u_routing_engine::index::{IndexManager, NodeIndex};
///
/// // Depot 0 plus 3 orders, 2 vehicles.
/// let manager = IndexManager::new(4, 2, NodeIndex(0)).unwrap();
/// assert_eq!(manager.num_indices(), 3 + 2 * 2);
/// assert_eq!(manager.node_to_index(NodeIndex(2)).unwrap(), 2);
/// assert_eq!(manager.start(0), 0);
/// assert_eq!(manager.index_to_node(manager.end(1)).unwrap(), NodeIndex(0));
/// ```
#[derive(Debug, Clone)]
pub struct IndexManager {
    num_nodes: usize,
    num_vehicles: usize,
    index_to_node: Vec<NodeIndex>,
    node_to_index: Vec<Option<usize>>,
    anchors: Vec<Anchor>,
    starts: Vec<usize>,
    ends: Vec<usize>,
    is_depot: Vec<bool>,
}

impl IndexManager {
    /// Creates a manager where every vehicle starts and ends at `depot`.
    pub fn new(num_nodes: usize, num_vehicles: usize, depot: NodeIndex) -> Result<Self, RoutingError> {
        let starts = vec![depot; num_vehicles];
        Self::build(num_nodes, num_vehicles, &starts, &starts)
    }

    /// Creates a manager with an explicit start and end depot per vehicle.
    ///
    /// The vehicle count is the length of `starts`.
    pub fn with_starts_ends(
        num_nodes: usize,
        starts: &[NodeIndex],
        ends: &[NodeIndex],
    ) -> Result<Self, RoutingError> {
        if starts.len() != ends.len() {
            return Err(RoutingError::StartEndMismatch {
                starts: starts.len(),
                ends: ends.len(),
            });
        }
        Self::build(num_nodes, starts.len(), starts, ends)
    }

    fn build(
        num_nodes: usize,
        num_vehicles: usize,
        starts: &[NodeIndex],
        ends: &[NodeIndex],
    ) -> Result<Self, RoutingError> {
        if num_nodes == 0 {
            return Err(RoutingError::NoNodes);
        }
        if num_vehicles == 0 {
            return Err(RoutingError::NoVehicles);
        }
        for depot in starts.iter().chain(ends) {
            if depot.0 >= num_nodes {
                return Err(RoutingError::DepotOutOfRange {
                    depot: depot.0,
                    num_nodes,
                });
            }
        }

        let mut is_depot = vec![false; num_nodes];
        let mut first_start_vehicle: Vec<Option<usize>> = vec![None; num_nodes];
        for (v, s) in starts.iter().enumerate() {
            is_depot[s.0] = true;
            first_start_vehicle[s.0].get_or_insert(v);
        }
        for e in ends {
            is_depot[e.0] = true;
        }

        let mut index_to_node = Vec::new();
        let mut anchors = Vec::new();
        let mut node_to_index = vec![None; num_nodes];
        let mut start_index = vec![usize::MAX; num_vehicles];

        for node in 0..num_nodes {
            if let Some(v) = first_start_vehicle[node] {
                start_index[v] = index_to_node.len();
                node_to_index[node] = Some(index_to_node.len());
                index_to_node.push(NodeIndex(node));
                anchors.push(Anchor::Start(v));
            } else if !is_depot[node] {
                node_to_index[node] = Some(index_to_node.len());
                index_to_node.push(NodeIndex(node));
                anchors.push(Anchor::Visit);
            }
        }
        for v in 0..num_vehicles {
            if start_index[v] == usize::MAX {
                start_index[v] = index_to_node.len();
                index_to_node.push(starts[v]);
                anchors.push(Anchor::Start(v));
            }
        }
        let mut end_index = Vec::with_capacity(num_vehicles);
        for (v, e) in ends.iter().enumerate() {
            end_index.push(index_to_node.len());
            index_to_node.push(*e);
            anchors.push(Anchor::End(v));
        }

        Ok(Self {
            num_nodes,
            num_vehicles,
            index_to_node,
            node_to_index,
            anchors,
            starts: start_index,
            ends: end_index,
            is_depot,
        })
    }

    /// Number of problem-space nodes.
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of vehicles.
    pub fn num_vehicles(&self) -> usize {
        self.num_vehicles
    }

    /// Number of solver indices, starts and ends included.
    pub fn num_indices(&self) -> usize {
        self.index_to_node.len()
    }

    /// Returns the node behind a solver index.
    pub fn index_to_node(&self, index: usize) -> Result<NodeIndex, RoutingError> {
        self.index_to_node
            .get(index)
            .copied()
            .ok_or(RoutingError::IndexOutOfRange {
                index,
                num_indices: self.num_indices(),
            })
    }

    /// Returns the solver index of a node.
    ///
    /// For a start depot this is the start of the lowest vehicle leaving
    /// from it; use [`start`](Self::start) and [`end`](Self::end) for the
    /// other aliases.
    pub fn node_to_index(&self, node: NodeIndex) -> Result<usize, RoutingError> {
        match self.node_to_index.get(node.0) {
            None => Err(RoutingError::NodeOutOfRange {
                node: node.0,
                num_nodes: self.num_nodes,
            }),
            Some(None) => Err(RoutingError::NodeWithoutIndex { node: node.0 }),
            Some(Some(index)) => Ok(*index),
        }
    }

    /// Start index of `vehicle`.
    ///
    /// # Panics
    ///
    /// Panics if `vehicle` is out of range.
    pub fn start(&self, vehicle: usize) -> usize {
        self.starts[vehicle]
    }

    /// End index of `vehicle`.
    ///
    /// # Panics
    ///
    /// Panics if `vehicle` is out of range.
    pub fn end(&self, vehicle: usize) -> usize {
        self.ends[vehicle]
    }

    /// Role of `index`, or `None` when it is out of range.
    pub fn anchor(&self, index: usize) -> Option<Anchor> {
        self.anchors.get(index).copied()
    }

    /// Returns `true` if `index` is some vehicle's start.
    pub fn is_start(&self, index: usize) -> bool {
        matches!(self.anchor(index), Some(Anchor::Start(_)))
    }

    /// Returns `true` if `index` is some vehicle's end.
    pub fn is_end(&self, index: usize) -> bool {
        matches!(self.anchor(index), Some(Anchor::End(_)))
    }

    /// Returns `true` if `index` is a regular visit.
    pub fn is_visit(&self, index: usize) -> bool {
        matches!(self.anchor(index), Some(Anchor::Visit))
    }

    /// Vehicle owning a start or end index.
    pub fn vehicle_of_anchor(&self, index: usize) -> Option<usize> {
        match self.anchor(index)? {
            Anchor::Start(v) | Anchor::End(v) => Some(v),
            Anchor::Visit => None,
        }
    }

    /// Returns `true` if `node` is a start or end depot of any vehicle.
    pub fn is_depot(&self, node: NodeIndex) -> bool {
        self.is_depot.get(node.0).copied().unwrap_or(false)
    }

    /// Iterates over the regular visit indices in increasing order.
    pub fn visit_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.anchors
            .iter()
            .enumerate()
            .filter(|(_, a)| matches!(a, Anchor::Visit))
            .map(|(i, _)| i)
    }

    pub(crate) fn check_index(&self, index: usize) -> Result<(), RoutingError> {
        if index < self.num_indices() {
            Ok(())
        } else {
            Err(RoutingError::IndexOutOfRange {
                index,
                num_indices: self.num_indices(),
            })
        }
    }

    pub(crate) fn check_vehicle(&self, vehicle: usize) -> Result<(), RoutingError> {
        if vehicle < self.num_vehicles {
            Ok(())
        } else {
            Err(RoutingError::VehicleOutOfRange {
                vehicle,
                num_vehicles: self.num_vehicles,
            })
        }
    }
}
