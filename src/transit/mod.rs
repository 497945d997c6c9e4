//! Transit callbacks: integer functions of `(from_index, to_index)` used for
//! arc costs and dimension transits.
//!
//! - [`TransitRegistry`] — append-only table of callbacks keyed by handle
//! - [`TransitMatrix`] — dense row-major table, also used for memoization

mod matrix;
mod registry;

pub use matrix::TransitMatrix;
pub use registry::{TransitFn, TransitHandle, TransitRegistry, MAX_CACHED_ENTRIES};
