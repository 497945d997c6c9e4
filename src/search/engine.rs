//! The solve loop: first solution, then metaheuristic-driven local search.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

use super::metaheuristic::{
    Choice, GreedyDescent, GuidedLocalSearch, Metaheuristic, SimulatedAnnealing, StepContext,
    TabuSearch,
};
use super::termination::{Progress, SearchBudget};
use super::{
    LocalSearchMetaheuristic, RoutePlan, SearchParameters, SearchStats, StopReason,
};
use crate::constructive;
use crate::local_search::neighborhood;
use crate::model::RoutingModel;

/// Best plan found plus statistics.
#[derive(Debug)]
pub(crate) struct SearchOutcome {
    pub plan: Option<RoutePlan>,
    pub stats: SearchStats,
}

/// One solve over a closed model.
pub(crate) struct SearchEngine<'m> {
    model: &'m RoutingModel,
    params: &'m SearchParameters,
    budget: SearchBudget,
    rng: ChaCha8Rng,
}

impl<'m> SearchEngine<'m> {
    pub fn new(
        model: &'m RoutingModel,
        params: &'m SearchParameters,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            model,
            params,
            budget: SearchBudget::new(params, cancel),
            rng: ChaCha8Rng::seed_from_u64(params.random_seed),
        }
    }

    /// Runs the search, starting from `initial` routes when given.
    pub fn run(mut self, initial: Option<Vec<Vec<usize>>>) -> SearchOutcome {
        let strategy = self.params.first_solution_strategy.resolve();
        let metaheuristic = self.params.local_search_metaheuristic.resolve();
        let parallel = self.params.parallel_move_evaluation;
        let mut stats = SearchStats {
            first_solution_strategy: strategy,
            metaheuristic,
            first_solution_objective: None,
            best_objective: None,
            steps: 0,
            improvements: 0,
            accepted_moves: 0,
            stop_reason: StopReason::NoFirstSolution,
            elapsed: Default::default(),
        };
        info!(
            event = "solve_start",
            indices = self.model.manager().num_indices(),
            vehicles = self.model.manager().num_vehicles(),
            strategy = ?strategy,
            metaheuristic = ?metaheuristic,
            seed = self.params.random_seed
        );

        let first = match initial {
            Some(routes) => constructive::complete_routes(self.model, routes, parallel),
            None => constructive::build_first_solution(self.model, strategy, parallel),
        };
        let Some(mut state) = first else {
            stats.elapsed = self.budget.elapsed();
            info!(event = "solve_end", stop_reason = %stats.stop_reason, duration_ms = stats.elapsed.as_millis() as u64);
            return SearchOutcome { plan: None, stats };
        };

        let first_objective = state.objective();
        stats.first_solution_objective = Some(first_objective);
        info!(
            event = "first_solution",
            objective = first_objective,
            duration_ms = self.budget.elapsed().as_millis() as u64
        );

        let mut best_plan = state.plan().clone();
        let mut best_objective = first_objective;
        let mut progress = Progress {
            improvements: 1,
            ..Progress::default()
        };
        let mut policy: Box<dyn Metaheuristic> = match metaheuristic {
            LocalSearchMetaheuristic::GuidedLocalSearch => Box::new(GuidedLocalSearch::new(
                self.params.guided_local_search_lambda_coefficient,
                &state,
            )),
            LocalSearchMetaheuristic::SimulatedAnnealing => Box::new(SimulatedAnnealing::new(
                self.params.annealing_initial_temperature,
                self.params.annealing_cooling_rate,
                first_objective,
            )),
            LocalSearchMetaheuristic::TabuSearch => {
                Box::new(TabuSearch::new(self.params.tabu_tenure))
            }
            LocalSearchMetaheuristic::GreedyDescent | LocalSearchMetaheuristic::Automatic => {
                Box::new(GreedyDescent)
            }
        };

        let mut moves = Vec::new();
        let stop_reason = loop {
            if let Some(reason) = self.budget.exhausted(&progress) {
                break reason;
            }
            neighborhood(
                state.plan(),
                self.model,
                &self.params.local_search_operators,
                &mut moves,
            );
            let choice = policy.choose(StepContext {
                state: &state,
                moves: &moves,
                parallel,
                best_objective,
                step: progress.steps,
                rng: &mut self.rng,
            });
            match choice {
                Choice::LocalOptimum => break StopReason::LocalOptimum,
                Choice::Reject => {}
                Choice::Apply(candidate) => {
                    stats.accepted_moves += 1;
                    state.apply(candidate);
                }
            }
            progress.steps += 1;

            if state.objective() < best_objective {
                best_objective = state.objective();
                best_plan = state.plan().clone();
                progress.improvements += 1;
                progress.unimproved_steps = 0;
                debug!(event = "new_best", step = progress.steps, objective = best_objective);
            } else {
                progress.unimproved_steps += 1;
            }
            trace!(
                event = "step",
                step = progress.steps,
                objective = state.objective(),
                best = best_objective,
                candidates = moves.len()
            );
        };

        stats.best_objective = Some(best_objective);
        stats.steps = progress.steps;
        stats.improvements = progress.improvements;
        stats.stop_reason = stop_reason;
        stats.elapsed = self.budget.elapsed();
        info!(
            event = "solve_end",
            objective = best_objective,
            steps = stats.steps,
            improvements = stats.improvements,
            stop_reason = %stop_reason,
            duration_ms = stats.elapsed.as_millis() as u64
        );
        SearchOutcome {
            plan: Some(best_plan),
            stats,
        }
    }
}
