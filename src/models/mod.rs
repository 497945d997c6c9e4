//! Sample instance generators for capacitated routing with time windows.
//!
//! - [`LocationContainer`] — Seeded random locations, Manhattan distance and time
//! - [`RandomDemand`] — Seeded per-node demand
//! - [`ServiceTimePlusTransition`] — Service time proportional to demand plus travel

mod demand;
mod location;

pub use demand::{deterministic_seed, RandomDemand, ServiceTimePlusTransition};
pub use location::LocationContainer;
