//! Acceptance policies of the improvement phase.
//!
//! Each step the engine enumerates the neighborhood of the current plan and
//! asks the active [`Metaheuristic`] which candidate, if any, to apply.

use std::collections::HashMap;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use super::state::{Candidate, PlanState};
use super::RoutePlan;
use crate::local_search::Move;

/// Outcome of one step.
pub(crate) enum Choice {
    Apply(Candidate),
    /// Nothing applied, but the search may continue.
    Reject,
    /// Nothing can be applied any more.
    LocalOptimum,
}

/// Inputs of one step.
pub(crate) struct StepContext<'a, 'm> {
    pub state: &'a PlanState<'m>,
    pub moves: &'a [Move],
    pub parallel: bool,
    pub best_objective: i64,
    pub step: u64,
    pub rng: &'a mut ChaCha8Rng,
}

pub(crate) trait Metaheuristic {
    fn choose(&mut self, ctx: StepContext<'_, '_>) -> Choice;
}

/// Best improving move; stops at the first local optimum.
pub(crate) struct GreedyDescent;

impl Metaheuristic for GreedyDescent {
    fn choose(&mut self, ctx: StepContext<'_, '_>) -> Choice {
        match ctx
            .state
            .best_candidate(ctx.moves, ctx.parallel, |c| Some(c.delta))
        {
            Some((delta, candidate)) if delta < 0 => Choice::Apply(candidate),
            _ => Choice::LocalOptimum,
        }
    }
}

/// Guided local search.
///
/// Descends on `objective + λ × Σ penalty(arc)`. At a local optimum of the
/// augmented objective, the arcs of the current plan with the highest
/// utility `cost / (1 + penalty)` get one more penalty unit.
///
/// # Reference
///
/// Voudouris, C. & Tsang, E. (1999). "Guided local search and its
/// application to the traveling salesman problem", *European Journal of
/// Operational Research* 113(2), 469-499.
pub(crate) struct GuidedLocalSearch {
    lambda: i64,
    penalties: HashMap<(usize, usize), i64>,
}

impl GuidedLocalSearch {
    /// `λ = coefficient × average arc cost` of the first plan, at least 1.
    pub fn new(coefficient: f64, state: &PlanState<'_>) -> Self {
        let (total, count) = plan_arcs(state).fold((0i64, 0usize), |(t, c), (from, to, v)| {
            (t + state.model().arc_cost(from, to, v), c + 1)
        });
        let average = if count == 0 { 0.0 } else { total as f64 / count as f64 };
        let lambda = ((coefficient * average).round() as i64).max(1);
        debug!(event = "gls_lambda", lambda, arcs = count);
        Self {
            lambda,
            penalties: HashMap::new(),
        }
    }

    fn path_penalty(&self, start: usize, visits: &[usize], end: usize) -> i64 {
        let mut total = 0;
        let mut prev = start;
        for &i in visits.iter().chain(std::iter::once(&end)) {
            total += self.penalties.get(&(prev, i)).copied().unwrap_or(0);
            prev = i;
        }
        total
    }

    fn penalty_delta(&self, state: &PlanState<'_>, candidate: &Candidate) -> i64 {
        if self.penalties.is_empty() {
            return 0;
        }
        let manager = state.model().manager();
        candidate
            .effect
            .routes
            .iter()
            .map(|(v, route)| {
                let (start, end) = (manager.start(*v), manager.end(*v));
                let old = state.plan().route(*v);
                let old = if old.is_empty() { 0 } else { self.path_penalty(start, old, end) };
                let new = if route.is_empty() { 0 } else { self.path_penalty(start, route, end) };
                new - old
            })
            .sum()
    }

    fn penalize(&mut self, state: &PlanState<'_>) {
        let model = state.model();
        let utility = |from: usize, to: usize, v: usize, penalties: &HashMap<(usize, usize), i64>| {
            let p = penalties.get(&(from, to)).copied().unwrap_or(0);
            model.arc_cost(from, to, v) as f64 / (1 + p) as f64
        };
        let max = plan_arcs(state)
            .map(|(from, to, v)| utility(from, to, v, &self.penalties))
            .fold(f64::NEG_INFINITY, f64::max);
        let worst: Vec<(usize, usize)> = plan_arcs(state)
            .filter(|&(from, to, v)| utility(from, to, v, &self.penalties) >= max)
            .map(|(from, to, _)| (from, to))
            .collect();
        debug!(event = "penalize", arcs = worst.len(), utility = max);
        for arc in worst {
            *self.penalties.entry(arc).or_insert(0) += 1;
        }
    }
}

impl Metaheuristic for GuidedLocalSearch {
    fn choose(&mut self, ctx: StepContext<'_, '_>) -> Choice {
        if ctx.moves.is_empty() {
            return Choice::LocalOptimum;
        }
        let state = ctx.state;
        let best = state.best_candidate(ctx.moves, ctx.parallel, |c| {
            Some(c.delta + self.lambda * self.penalty_delta(state, c))
        });
        match best {
            Some((score, candidate)) if score < 0 => Choice::Apply(candidate),
            _ => {
                self.penalize(ctx.state);
                Choice::Reject
            }
        }
    }
}

/// Arcs `(from, to, vehicle)` of every non-empty route, anchors included.
fn plan_arcs<'a>(state: &'a PlanState<'_>) -> impl Iterator<Item = (usize, usize, usize)> + 'a {
    let manager = state.model().manager();
    state
        .plan()
        .routes()
        .iter()
        .enumerate()
        .filter(|(_, route)| !route.is_empty())
        .flat_map(move |(v, route)| {
            let start = manager.start(v);
            let end = manager.end(v);
            std::iter::once(start)
                .chain(route.iter().copied())
                .zip(route.iter().copied().chain(std::iter::once(end)))
                .map(move |(from, to)| (from, to, v))
        })
}

/// Simulated annealing with geometric cooling.
///
/// Each step draws one random move; improving moves are always accepted,
/// worsening ones with probability `exp(-delta / T)`.
///
/// # Reference
///
/// Kirkpatrick, S., Gelatt, C.D. & Vecchi, M.P. (1983). "Optimization by
/// Simulated Annealing", *Science* 220(4598), 671-680.
pub(crate) struct SimulatedAnnealing {
    temperature: f64,
    cooling_rate: f64,
}

impl SimulatedAnnealing {
    /// Starts at `initial`, or at 1% of the first objective (at least 1).
    pub fn new(initial: Option<f64>, cooling_rate: f64, first_objective: i64) -> Self {
        let temperature = initial.unwrap_or_else(|| (0.01 * first_objective as f64).max(1.0));
        debug!(event = "annealing_start", temperature, cooling_rate);
        Self {
            temperature,
            cooling_rate,
        }
    }
}

impl Metaheuristic for SimulatedAnnealing {
    fn choose(&mut self, ctx: StepContext<'_, '_>) -> Choice {
        if ctx.moves.is_empty() {
            return Choice::LocalOptimum;
        }
        let mv = &ctx.moves[ctx.rng.random_range(0..ctx.moves.len())];
        let temperature = self.temperature;
        self.temperature *= self.cooling_rate;

        let Some(candidate) = ctx.state.evaluate(mv) else {
            return Choice::Reject;
        };
        let accept = if candidate.delta <= 0 {
            true
        } else if temperature > 0.0 {
            let probability = (-(candidate.delta as f64) / temperature).exp();
            ctx.rng.random_range(0.0..1.0) < probability
        } else {
            false
        };
        if accept {
            Choice::Apply(candidate)
        } else {
            Choice::Reject
        }
    }
}

/// Tabu search on moved visits.
///
/// Applies the best admissible move, improving or not. A move is tabu when
/// it touches a visit moved during the last `tenure` steps, unless it leads
/// to a new best plan. When every feasible move is tabu, the least bad one
/// is applied.
///
/// # Reference
///
/// Glover, F. (1989). "Tabu Search—Part I", *ORSA Journal on Computing* 1(3), 190-206.
pub(crate) struct TabuSearch {
    tenure: u64,
    tabu_until: HashMap<usize, u64>,
}

impl TabuSearch {
    pub fn new(tenure: u64) -> Self {
        Self {
            tenure,
            tabu_until: HashMap::new(),
        }
    }

    fn is_tabu(&self, mv: &Move, plan: &RoutePlan, step: u64) -> bool {
        mv.touched(plan)
            .iter()
            .any(|i| self.tabu_until.get(i).is_some_and(|&until| until > step))
    }
}

impl Metaheuristic for TabuSearch {
    fn choose(&mut self, ctx: StepContext<'_, '_>) -> Choice {
        let objective = ctx.state.objective();
        let (plan, step, best) = (ctx.state.plan(), ctx.step, ctx.best_objective);
        let admissible = ctx.state.best_candidate(ctx.moves, ctx.parallel, |c| {
            let aspiration = objective + c.delta < best;
            (aspiration || !self.is_tabu(&c.mv, plan, step)).then_some(c.delta)
        });
        let chosen = admissible
            .or_else(|| ctx.state.best_candidate(ctx.moves, ctx.parallel, |c| Some(c.delta)));
        match chosen {
            Some((_, candidate)) => {
                for i in candidate.mv.touched(ctx.state.plan()) {
                    self.tabu_until.insert(i, ctx.step + self.tenure);
                }
                Choice::Apply(candidate)
            }
            None => Choice::LocalOptimum,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexManager, NodeIndex};
    use crate::model::RoutingModel;
    use rand::SeedableRng;

    fn model() -> RoutingModel {
        let mut m = RoutingModel::new(IndexManager::new(4, 1, NodeIndex(0)).expect("valid"));
        let d = m.register_node_transit_callback(|a, b| (a.0 as i64 - b.0 as i64).abs() * 10);
        m.set_arc_cost_evaluator_of_all_vehicles(d).expect("ok");
        m
    }

    #[test]
    fn test_gls_lambda_and_penalties() {
        let m = model();
        let n = m.manager().num_indices();
        let state = PlanState::new(&m, RoutePlan::from_routes(vec![vec![1, 2, 3]], n)).expect("ok");
        // Arcs 10, 10, 10, 30: average 15.
        let mut gls = GuidedLocalSearch::new(0.2, &state);
        assert_eq!(gls.lambda, 3);
        gls.penalize(&state);
        let end = m.manager().end(0);
        assert_eq!(gls.penalties.get(&(3, end)), Some(&1));
        assert_eq!(gls.penalties.len(), 1);
    }

    #[test]
    fn test_tabu_blocks_recent_visits() {
        let m = model();
        let n = m.manager().num_indices();
        let state = PlanState::new(&m, RoutePlan::from_routes(vec![vec![2, 1, 3]], n)).expect("ok");
        let mut tabu = TabuSearch::new(5);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let moves = [Move::Exchange { vehicle_a: 0, pos_a: 0, vehicle_b: 0, pos_b: 1 }];
        let ctx = StepContext {
            state: &state,
            moves: &moves,
            parallel: false,
            best_objective: state.objective(),
            step: 0,
            rng: &mut rng,
        };
        assert!(matches!(tabu.choose(ctx), Choice::Apply(_)));
        assert_eq!(tabu.tabu_until.get(&2), Some(&5));
        assert_eq!(tabu.tabu_until.get(&1), Some(&5));
    }

    #[test]
    fn test_annealing_always_accepts_improvement() {
        let m = model();
        let n = m.manager().num_indices();
        let state = PlanState::new(&m, RoutePlan::from_routes(vec![vec![2, 1, 3]], n)).expect("ok");
        let mut sa = SimulatedAnnealing::new(Some(1e-9), 0.5, state.objective());
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let moves = [Move::Exchange { vehicle_a: 0, pos_a: 0, vehicle_b: 0, pos_b: 1 }];
        let ctx = StepContext {
            state: &state,
            moves: &moves,
            parallel: false,
            best_objective: state.objective(),
            step: 0,
            rng: &mut rng,
        };
        match sa.choose(ctx) {
            Choice::Apply(c) => assert!(c.delta < 0),
            _ => panic!("improving move rejected"),
        }
        assert!(sa.temperature < 1e-9);
    }
}
