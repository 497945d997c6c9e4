//! Random demands and service-time callbacks.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::index::NodeIndex;

/// Demand in `[1, 5]` at every node except the depot, which has none.
#[derive(Debug, Clone)]
pub struct RandomDemand {
    demand: Vec<i64>,
}

impl RandomDemand {
    pub const MIN_DEMAND: i64 = 1;
    pub const MAX_DEMAND: i64 = 5;

    pub fn new(num_nodes: usize, depot: NodeIndex, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let demand = (0..num_nodes)
            .map(|node| {
                if node == depot.value() {
                    0
                } else {
                    rng.random_range(Self::MIN_DEMAND..=Self::MAX_DEMAND)
                }
            })
            .collect();
        Self { demand }
    }

    /// Demand picked up when leaving `from`.
    pub fn demand(&self, from: NodeIndex, _to: NodeIndex) -> i64 {
        self.demand[from.value()]
    }

    /// Sum over all nodes.
    pub fn total(&self) -> i64 {
        self.demand.iter().sum()
    }
}

type NodeCallback = Box<dyn Fn(NodeIndex, NodeIndex) -> i64 + Send + Sync>;

/// `time(from, to) = time_per_demand_unit × demand(from, to) + transition(from, to)`.
pub struct ServiceTimePlusTransition {
    time_per_demand_unit: i64,
    demand: NodeCallback,
    transition: NodeCallback,
}

impl ServiceTimePlusTransition {
    pub fn new<D, T>(time_per_demand_unit: i64, demand: D, transition: T) -> Self
    where
        D: Fn(NodeIndex, NodeIndex) -> i64 + Send + Sync + 'static,
        T: Fn(NodeIndex, NodeIndex) -> i64 + Send + Sync + 'static,
    {
        Self {
            time_per_demand_unit,
            demand: Box::new(demand),
            transition: Box::new(transition),
        }
    }

    pub fn compute(&self, from: NodeIndex, to: NodeIndex) -> i64 {
        self.time_per_demand_unit * (self.demand)(from, to) + (self.transition)(from, to)
    }
}

impl std::fmt::Debug for ServiceTimePlusTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceTimePlusTransition")
            .field("time_per_demand_unit", &self.time_per_demand_unit)
            .finish_non_exhaustive()
    }
}

/// Seed for the sample generators: fixed when `deterministic`, drawn from
/// the OS otherwise.
pub fn deterministic_seed(deterministic: bool) -> u64 {
    if deterministic {
        0
    } else {
        rand::random()
    }
}
