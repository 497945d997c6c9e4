//! Side constraints priced into the objective.
//!
//! - [`Disjunction`] — optional visits with a skip penalty
//! - [`SameVehicleGroup`] — flat cost when a group is split across vehicles

mod disjunction;
mod same_vehicle;

pub use disjunction::Disjunction;
pub use same_vehicle::{SameVehicleGroup, RECOMMENDED_MAX_GROUP_SIZE};
