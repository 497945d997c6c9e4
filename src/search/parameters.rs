//! Search parameters.
//!
//! Every field has a default, so a partial TOML or JSON document only needs
//! to name what it overrides:
//!
//! ```
//! use u_routing_engine::search::{
//!     FirstSolutionStrategy, LocalSearchMetaheuristic, SearchParameters,
//! };
//! use std::time::Duration;
//!
//! let params = SearchParameters::from_toml_str(r#"
//!     first_solution_strategy = "savings"
//!     local_search_metaheuristic = "guided_local_search"
//!     time_limit_ms = 2000
//!
//!     [local_search_operators]
//!     cross_exchange = false
//! "#).unwrap();
//!
//! assert_eq!(params.first_solution_strategy, FirstSolutionStrategy::Savings);
//! assert_eq!(params.time_limit(), Some(Duration::from_secs(2)));
//! assert!(!params.local_search_operators.cross_exchange);
//! assert!(params.local_search_operators.relocate);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::RoutingError;

/// Heuristic that builds the first feasible plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstSolutionStrategy {
    /// Resolves to [`ParallelCheapestInsertion`](Self::ParallelCheapestInsertion).
    #[default]
    Automatic,
    /// Extends each route with the cheapest feasible arc.
    PathCheapestArc,
    /// Clarke-Wright savings.
    Savings,
    /// Repeatedly performs the globally cheapest insertion.
    ParallelCheapestInsertion,
    /// Inserts visits one by one at their cheapest position.
    LocalCheapestInsertion,
}

impl FirstSolutionStrategy {
    /// Replaces [`Automatic`](Self::Automatic) by a concrete strategy.
    pub fn resolve(self) -> Self {
        match self {
            Self::Automatic => Self::ParallelCheapestInsertion,
            other => other,
        }
    }
}

/// Acceptance policy of the improvement phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalSearchMetaheuristic {
    /// Resolves to [`GreedyDescent`](Self::GreedyDescent).
    #[default]
    Automatic,
    /// Best improving move until a local optimum.
    GreedyDescent,
    /// Greedy descent on an objective augmented with arc penalties.
    GuidedLocalSearch,
    /// Random moves accepted by the Metropolis criterion.
    SimulatedAnnealing,
    /// Best non-tabu move, improving or not.
    TabuSearch,
}

impl LocalSearchMetaheuristic {
    /// Replaces [`Automatic`](Self::Automatic) by a concrete metaheuristic.
    pub fn resolve(self) -> Self {
        match self {
            Self::Automatic => Self::GreedyDescent,
            other => other,
        }
    }
}

/// Enabled neighborhood operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSearchOperators {
    pub two_opt: bool,
    pub relocate: bool,
    pub or_opt: bool,
    pub exchange: bool,
    pub cross_exchange: bool,
    pub make_active: bool,
    pub make_inactive: bool,
    pub swap_active: bool,
}

impl Default for LocalSearchOperators {
    fn default() -> Self {
        Self {
            two_opt: true,
            relocate: true,
            or_opt: true,
            exchange: true,
            cross_exchange: true,
            make_active: true,
            make_inactive: true,
            swap_active: true,
        }
    }
}

impl LocalSearchOperators {
    /// All operators disabled.
    pub fn none() -> Self {
        Self {
            two_opt: false,
            relocate: false,
            or_opt: false,
            exchange: false,
            cross_exchange: false,
            make_active: false,
            make_inactive: false,
            swap_active: false,
        }
    }
}

/// Configuration of one solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SearchParameters {
    pub first_solution_strategy: FirstSolutionStrategy,
    pub local_search_metaheuristic: LocalSearchMetaheuristic,
    pub local_search_operators: LocalSearchOperators,

    /// Wall-clock limit of the whole solve, in milliseconds.
    pub time_limit_ms: Option<u64>,
    /// Number of improving solutions (the first one included) after which
    /// the search stops.
    pub solution_limit: Option<u64>,
    /// Number of local-search steps.
    pub iteration_limit: Option<u64>,
    /// Number of consecutive steps without a new best solution.
    pub unimproved_step_limit: Option<u64>,

    pub random_seed: u64,
    /// Evaluate the candidates of a step on the rayon pool.
    pub parallel_move_evaluation: bool,

    /// Scales arc penalties relative to the average arc cost.
    pub guided_local_search_lambda_coefficient: f64,
    /// Starting temperature; derived from the first objective when unset.
    pub annealing_initial_temperature: Option<f64>,
    /// Geometric cooling factor per step, in `(0, 1)`.
    pub annealing_cooling_rate: f64,
    /// Number of steps a moved index stays tabu.
    pub tabu_tenure: u64,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            first_solution_strategy: FirstSolutionStrategy::Automatic,
            local_search_metaheuristic: LocalSearchMetaheuristic::Automatic,
            local_search_operators: LocalSearchOperators::default(),
            time_limit_ms: None,
            solution_limit: None,
            iteration_limit: None,
            unimproved_step_limit: None,
            random_seed: 0,
            parallel_move_evaluation: true,
            guided_local_search_lambda_coefficient: 0.1,
            annealing_initial_temperature: None,
            annealing_cooling_rate: 0.995,
            tabu_tenure: 10,
        }
    }
}

impl SearchParameters {
    /// Parses a TOML document on top of the defaults and validates it.
    pub fn from_toml_str(s: &str) -> Result<Self, RoutingError> {
        let params: Self = toml::from_str(s)?;
        params.validate()?;
        Ok(params)
    }

    /// Parses a JSON document on top of the defaults and validates it.
    pub fn from_json_str(s: &str) -> Result<Self, RoutingError> {
        let params: Self = serde_json::from_str(s)?;
        params.validate()?;
        Ok(params)
    }

    /// Sets the first-solution strategy.
    pub fn with_first_solution_strategy(mut self, strategy: FirstSolutionStrategy) -> Self {
        self.first_solution_strategy = strategy;
        self
    }

    /// Sets the metaheuristic.
    pub fn with_metaheuristic(mut self, metaheuristic: LocalSearchMetaheuristic) -> Self {
        self.local_search_metaheuristic = metaheuristic;
        self
    }

    /// Sets the enabled operators.
    pub fn with_operators(mut self, operators: LocalSearchOperators) -> Self {
        self.local_search_operators = operators;
        self
    }

    /// Sets the wall-clock limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit_ms = Some(limit.as_millis() as u64);
        self
    }

    /// Sets the improving-solution limit.
    pub fn with_solution_limit(mut self, limit: u64) -> Self {
        self.solution_limit = Some(limit);
        self
    }

    /// Sets the step limit.
    pub fn with_iteration_limit(mut self, limit: u64) -> Self {
        self.iteration_limit = Some(limit);
        self
    }

    /// Sets the limit on consecutive non-improving steps.
    pub fn with_unimproved_step_limit(mut self, limit: u64) -> Self {
        self.unimproved_step_limit = Some(limit);
        self
    }

    /// Sets the random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Enables or disables parallel candidate evaluation.
    pub fn with_parallel_move_evaluation(mut self, parallel: bool) -> Self {
        self.parallel_move_evaluation = parallel;
        self
    }

    /// Sets the tabu tenure.
    pub fn with_tabu_tenure(mut self, tenure: u64) -> Self {
        self.tabu_tenure = tenure;
        self
    }

    /// Wall-clock limit as a duration.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }

    /// Returns `true` if any stopping limit is set.
    pub fn has_limit(&self) -> bool {
        self.time_limit_ms.is_some()
            || self.solution_limit.is_some()
            || self.iteration_limit.is_some()
            || self.unimproved_step_limit.is_some()
    }

    /// Checks value ranges and that non-greedy searches can stop.
    pub fn validate(&self) -> Result<(), RoutingError> {
        let lambda = self.guided_local_search_lambda_coefficient;
        if !(lambda.is_finite() && lambda > 0.0) {
            return Err(RoutingError::InvalidParameters(format!(
                "guided_local_search_lambda_coefficient must be positive, got {lambda}"
            )));
        }
        let cooling = self.annealing_cooling_rate;
        if !(cooling > 0.0 && cooling < 1.0) {
            return Err(RoutingError::InvalidParameters(format!(
                "annealing_cooling_rate must be in (0, 1), got {cooling}"
            )));
        }
        if let Some(t) = self.annealing_initial_temperature {
            if !(t.is_finite() && t > 0.0) {
                return Err(RoutingError::InvalidParameters(format!(
                    "annealing_initial_temperature must be positive, got {t}"
                )));
            }
        }
        if self.tabu_tenure == 0 {
            return Err(RoutingError::InvalidParameters(
                "tabu_tenure must be at least 1".into(),
            ));
        }
        if self.solution_limit == Some(0) {
            return Err(RoutingError::InvalidParameters(
                "solution_limit must be at least 1".into(),
            ));
        }
        let metaheuristic = self.local_search_metaheuristic.resolve();
        if metaheuristic != LocalSearchMetaheuristic::GreedyDescent && !self.has_limit() {
            return Err(RoutingError::InvalidParameters(format!(
                "{metaheuristic:?} does not stop on its own; set a time, solution, iteration or unimproved-step limit"
            )));
        }
        Ok(())
    }
}
