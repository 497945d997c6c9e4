//! # u-routing-engine
//!
//! Routing constraint-solver engine: vehicles serve visits under
//! cumulative dimensions (load, time), optional visits are grouped in
//! penalized disjunctions, and a local search driven by a configurable
//! metaheuristic minimizes arc, fixed, soft-bound and penalty costs.
//!
//! ## Modules
//!
//! - [`index`] — Node ↔ solver-index mapping with per-vehicle start/end anchors
//! - [`transit`] — Transit callback registry and memoized matrices
//! - [`dimension`] — Cumulative dimensions, cumul ranges and soft bounds
//! - [`constraint`] — Disjunctions and soft same-vehicle groups
//! - [`model`] — The routing model and its `solve*` entry points
//! - [`evaluation`] — Route feasibility and cost evaluation
//! - [`local_search`] — Neighborhood moves (2-opt, relocate, Or-opt, exchange, cross-exchange, activity)
//! - [`search`] — Search parameters, metaheuristics, termination and statistics
//! - [`solution`] — Assignments and text reports
//! - [`models`] — Seeded sample instance generators (locations, demands, service times)
//! - [`error`] — The crate's error type
//!
//! ## Example
//!
//! ```
//! use u_routing_engine::dimension::CapacityLimit;
//! use u_routing_engine::index::{IndexManager, NodeIndex};
//! use u_routing_engine::model::RoutingModel;
//! use u_routing_engine::search::SearchParameters;
//!
//! // Depot 0 and four stops on a line; two vehicles carrying 2 units each.
//! let manager = IndexManager::new(5, 2, NodeIndex(0)).unwrap();
//! let mut model = RoutingModel::new(manager);
//! let distance = model.register_node_transit_callback(|a, b| {
//!     (a.value() as i64 - b.value() as i64).abs()
//! });
//! model.set_arc_cost_evaluator_of_all_vehicles(distance).unwrap();
//! let demand = model.register_node_transit_callback(|from, _| (from.value() > 0) as i64);
//! model.add_dimension(demand, 0, CapacityLimit::AtMost(2), true, "load").unwrap();
//!
//! let assignment = model
//!     .solve_with_parameters(&SearchParameters::default())
//!     .unwrap()
//!     .expect("feasible");
//! assert_eq!(assignment.objective_value(), 12);
//! assert_eq!(assignment.num_performed_visits(), 4);
//! ```

mod constructive;

pub mod constraint;
pub mod dimension;
pub mod error;
pub mod evaluation;
pub mod index;
pub mod local_search;
pub mod model;
pub mod models;
pub mod search;
pub mod solution;
pub mod transit;

pub use error::RoutingError;
