//! Translation between problem-space nodes and solver-space indices.
//!
//! Every non-depot node owns exactly one solver index. Each vehicle owns a
//! distinct start index and a distinct end index, even when all vehicles
//! share one depot node.

mod manager;

pub use manager::{Anchor, IndexManager, NodeIndex};
