//! Capacitated VRP with time windows and a soft vehicle capacity.
//!
//! Random orders with a demand and a five-hour time window are served by a
//! homogeneous fleet from a single depot. Loading beyond the soft capacity
//! is allowed up to the hard capacity but costs extra per unit. Every order
//! may be dropped at a large penalty.
//!
//! ```text
//! cargo run --example cvrptw_soft_capacity -- [orders] [vehicles] [params.toml]
//! ```
//!
//! `RUST_LOG=u_routing_engine=debug` shows search progress.

use std::error::Error;
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;
use u_routing_engine::dimension::CapacityLimit;
use u_routing_engine::index::{IndexManager, NodeIndex};
use u_routing_engine::model::RoutingModel;
use u_routing_engine::models::{
    deterministic_seed, LocationContainer, RandomDemand, ServiceTimePlusTransition,
};
use u_routing_engine::search::SearchParameters;
use u_routing_engine::solution::PlanReport;

const HARD_CAPACITY: i64 = 80;
const SOFT_CAPACITY: i64 = 40;
const SOFT_CAPACITY_COST: i64 = 5_000;
const USE_DETERMINISTIC_SEED: bool = true;
const USE_SAME_VEHICLE_COSTS: bool = false;
const MAX_NODES_PER_GROUP: usize = 10;
const SAME_VEHICLE_COST: i64 = 1_000;

const X_MAX: i64 = 100_000;
const Y_MAX: i64 = 100_000;
const SPEED: i64 = 10;
const TIME_PER_DEMAND_UNIT: i64 = 300;
const HORIZON: i64 = 24 * 3600;
const TIME_WINDOW: i64 = 5 * 3600;
const DROP_PENALTY: i64 = 10_000_000;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let orders: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(100);
    let vehicles: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(20);
    let params = match args.next() {
        Some(path) => SearchParameters::from_toml_str(&std::fs::read_to_string(path)?)?,
        None => SearchParameters::default(),
    };
    if orders == 0 || vehicles == 0 {
        return Err("orders and vehicles must be positive".into());
    }

    let depot = NodeIndex(0);
    let manager = IndexManager::new(orders + 1, vehicles, depot)?;
    let mut routing = RoutingModel::new(manager);
    let seed = deterministic_seed(USE_DETERMINISTIC_SEED);

    let mut locations = LocationContainer::new(SPEED, seed);
    for _ in 0..=orders {
        locations.add_random_location(X_MAX, Y_MAX);
    }
    let locations = Arc::new(locations);

    let l = Arc::clone(&locations);
    let vehicle_cost = routing.register_node_transit_callback(move |i, j| l.manhattan_distance(i, j));
    routing.set_arc_cost_evaluator_of_all_vehicles(vehicle_cost)?;

    let demand = Arc::new(RandomDemand::new(orders + 1, depot, seed));
    let d = Arc::clone(&demand);
    let load = routing.register_node_transit_callback(move |i, j| d.demand(i, j));
    routing.add_dimension(
        load,
        0,
        CapacityLimit::disabled_when_zero(HARD_CAPACITY),
        true,
        "Capacity",
    )?;
    if SOFT_CAPACITY > 0 {
        for vehicle in 0..vehicles {
            let end = routing.manager().end(vehicle);
            routing
                .mutable_dimension("Capacity")?
                .set_cumul_var_soft_upper_bound(end, SOFT_CAPACITY, SOFT_CAPACITY_COST)?;
        }
    }

    let d = Arc::clone(&demand);
    let l = Arc::clone(&locations);
    let time = ServiceTimePlusTransition::new(
        TIME_PER_DEMAND_UNIT,
        move |i, j| d.demand(i, j),
        move |i, j| l.manhattan_time(i, j),
    );
    let time = routing.register_node_transit_callback(move |i, j| time.compute(i, j));
    routing.add_dimension(time, HORIZON, CapacityLimit::AtMost(HORIZON), true, "Time")?;

    let mut randomizer = ChaCha8Rng::seed_from_u64(seed);
    for order in 1..=orders {
        let start = randomizer.random_range(0..HORIZON - TIME_WINDOW);
        let index = routing.manager().node_to_index(NodeIndex(order))?;
        routing
            .mutable_dimension("Time")?
            .cumul_var(index)?
            .set_range(start, start + TIME_WINDOW)?;
    }

    let order_indices: Vec<usize> = (1..=orders)
        .map(|order| routing.manager().node_to_index(NodeIndex(order)))
        .collect::<Result<_, _>>()?;
    for &index in &order_indices {
        routing.add_disjunction(&[index], DROP_PENALTY)?;
    }

    if USE_SAME_VEHICLE_COSTS {
        for group in order_indices.chunks(MAX_NODES_PER_GROUP) {
            routing.add_soft_same_vehicle_constraint(group, SAME_VEHICLE_COST)?;
        }
    }

    match routing.solve_with_parameters(&params)? {
        Some(assignment) => print!("{}", PlanReport::new(&assignment)),
        None => println!("No solution found."),
    }
    if let Some(stats) = routing.search_stats() {
        println!("{}", serde_json::to_string_pretty(stats)?);
    }
    Ok(())
}
