//! The routing model and its solve entry points.

mod routing;
mod solve;

pub use routing::{RoutingModel, RoutingStatus};
