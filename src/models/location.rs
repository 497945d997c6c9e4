//! Random planar locations with Manhattan metrics.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::index::NodeIndex;

/// Integer locations indexed by node.
///
/// # Examples
///
/// ```
/// use u_routing_engine::index::NodeIndex;
/// use u_routing_engine::models::LocationContainer;
///
/// let mut locations = LocationContainer::new(10, 0);
/// locations.add_location(0, 0);
/// locations.add_location(30, 40);
/// assert_eq!(locations.manhattan_distance(NodeIndex(0), NodeIndex(1)), 70);
/// assert_eq!(locations.manhattan_time(NodeIndex(1), NodeIndex(0)), 7);
/// ```
#[derive(Debug, Clone)]
pub struct LocationContainer {
    speed: i64,
    locations: Vec<(i64, i64)>,
    rng: ChaCha8Rng,
}

impl LocationContainer {
    /// `speed` converts distance to time.
    ///
    /// # Panics
    ///
    /// Panics if `speed` is not positive.
    pub fn new(speed: i64, seed: u64) -> Self {
        assert!(speed > 0, "speed must be positive");
        Self {
            speed,
            locations: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn add_location(&mut self, x: i64, y: i64) {
        self.locations.push((x, y));
    }

    /// Adds a location drawn uniformly from `[0, x_max] × [0, y_max]`.
    pub fn add_random_location(&mut self, x_max: i64, y_max: i64) {
        let x = self.rng.random_range(0..=x_max);
        let y = self.rng.random_range(0..=y_max);
        self.add_location(x, y);
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn manhattan_distance(&self, from: NodeIndex, to: NodeIndex) -> i64 {
        let (x1, y1) = self.locations[from.value()];
        let (x2, y2) = self.locations[to.value()];
        (x1 - x2).abs() + (y1 - y2).abs()
    }

    /// Distance divided by speed, rounded down.
    pub fn manhattan_time(&self, from: NodeIndex, to: NodeIndex) -> i64 {
        self.manhattan_distance(from, to) / self.speed
    }
}
