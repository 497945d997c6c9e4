//! Route feasibility checking and cost evaluation.

mod cost;
mod evaluator;

pub use cost::CostBreakdown;
pub use evaluator::{RouteEvaluation, RouteEvaluator};
