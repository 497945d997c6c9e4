//! Cumulative dimensions: capacities, slack, cumul ranges and soft bounds.
//!
//! - [`Dimension`] — named resource with route propagation
//! - [`CumulVar`] — narrowing handle on one index's domain (time windows)
//! - [`CapacityLimit`] — per-vehicle hard capacity

mod cumul;
mod definition;

pub use cumul::{CapacityLimit, CumulRange, CumulVar, SoftBound};
pub use definition::Dimension;
