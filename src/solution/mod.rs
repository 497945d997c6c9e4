//! Solve results.
//!
//! - [`Assignment`] — Routes, cumul values and cost of a solved plan
//! - [`PlanReport`] — Text rendering of an assignment

mod assignment;
mod report;

pub use assignment::{Assignment, Route, Visit};
pub use report::PlanReport;
