//! Error type shared by every model-building and solve entry point.
//!
//! Configuration mistakes are reported eagerly by the call that introduces
//! them. Infeasibility is not an error: `solve*` returns `Ok(None)` instead.

use thiserror::Error;

/// Configuration error raised while building or solving a routing model.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("a routing model needs at least one node")]
    NoNodes,

    #[error("a routing model needs at least one vehicle")]
    NoVehicles,

    #[error("depot node {depot} is out of range for {num_nodes} nodes")]
    DepotOutOfRange { depot: usize, num_nodes: usize },

    #[error("got {starts} start depots and {ends} end depots, expected one of each per vehicle")]
    StartEndMismatch { starts: usize, ends: usize },

    #[error("index {index} is out of range for {num_indices} solver indices")]
    IndexOutOfRange { index: usize, num_indices: usize },

    #[error("node {node} is out of range for {num_nodes} nodes")]
    NodeOutOfRange { node: usize, num_nodes: usize },

    #[error("node {node} is only an end depot and has no solver index of its own")]
    NodeWithoutIndex { node: usize },

    #[error("vehicle {vehicle} is out of range for {num_vehicles} vehicles")]
    VehicleOutOfRange { vehicle: usize, num_vehicles: usize },

    #[error("transit handle {0} was not registered with this model")]
    UnknownTransit(usize),

    #[error("transit matrix has size {size}, expected {expected}")]
    MatrixSizeMismatch { size: usize, expected: usize },

    #[error("a dimension named `{0}` already exists")]
    DuplicateDimension(String),

    #[error("no dimension named `{0}`")]
    UnknownDimension(String),

    #[error("got {got} vehicle capacities, expected {expected}")]
    CapacityCountMismatch { got: usize, expected: usize },

    #[error("{what} must not be negative, got {value}")]
    Negative { what: &'static str, value: i64 },

    #[error("cumul range of index {index} in dimension `{dimension}` becomes empty after intersecting [{low}, {high}]")]
    EmptyCumulRange {
        dimension: String,
        index: usize,
        low: i64,
        high: i64,
    },

    #[error("soft upper bound {bound} on index {index} in dimension `{dimension}` is not below the hard capacity {capacity}")]
    SoftBoundAboveCapacity {
        dimension: String,
        index: usize,
        bound: i64,
        capacity: i64,
    },

    #[error("a disjunction or same-vehicle group needs at least one index")]
    EmptyGroup,

    #[error("index {0} is a vehicle start or end and cannot be constrained as a visit")]
    AnchorIndex(usize),

    #[error("disjunction max cardinality must be at least 1")]
    ZeroCardinality,

    #[error("the model is closed for modification once a solve has started")]
    ModelClosed,

    #[error("invalid search parameters: {0}")]
    InvalidParameters(String),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid initial routes: {0}")]
    InvalidInitialRoutes(String),
}
