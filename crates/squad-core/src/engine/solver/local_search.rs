use super::evaluator::{Evaluation, Evaluator};
use super::{IncumbentSink, SolveOutcome, Solver, SolverParams};
use crate::core::models::result::SolveStatus;
use crate::engine::error::EngineError;
use crate::engine::model::Model;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// How many steps a worker takes between deadline checks.
const DEADLINE_CHECK_INTERVAL: u64 = 64;

/// Energy cost of one unit of constraint violation, relative to the energy scale.
const VIOLATION_PENALTY: f64 = 100_000.0;

/// Choice-based local search over the model's exactly-one groups.
///
/// Every non-decision variable is derived by propagation, so a state is just "which member
/// of each group is true". Small search spaces are enumerated exhaustively and reported as
/// `OPTIMAL` or `INFEASIBLE`; larger ones are handed to independent simulated-annealing
/// workers that share one [`IncumbentSink`] and run until the deadline.
#[derive(Debug, Clone)]
pub struct LocalSearchSolver {
    initial_temperature: f64,
    final_temperature: f64,
    cooling_rate: f64,
    steps_per_temperature: usize,
    swap_probability: f64,
}

impl Default for LocalSearchSolver {
    fn default() -> Self {
        Self {
            initial_temperature: 500.0,
            final_temperature: 0.5,
            cooling_rate: 0.95,
            steps_per_temperature: 200,
            swap_probability: 0.3,
        }
    }
}

impl LocalSearchSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Annealing schedule. Temperatures are multiples of the model's mean absolute objective
    /// coefficient; once the temperature drops below `final_temperature` the worker reheats.
    pub fn with_schedule(
        mut self,
        initial_temperature: f64,
        final_temperature: f64,
        cooling_rate: f64,
    ) -> Self {
        self.initial_temperature = initial_temperature.max(f64::MIN_POSITIVE);
        self.final_temperature = final_temperature.clamp(f64::MIN_POSITIVE, self.initial_temperature);
        self.cooling_rate = cooling_rate.clamp(0.0, 0.999_999);
        self
    }

    pub fn with_steps_per_temperature(mut self, steps: usize) -> Self {
        self.steps_per_temperature = steps.max(1);
        self
    }

    /// Probability that a proposed move swaps two same-sized groups instead of
    /// re-choosing within one.
    pub fn with_swap_probability(mut self, p: f64) -> Self {
        self.swap_probability = p.clamp(0.0, 1.0);
        self
    }
}

impl Solver for LocalSearchSolver {
    fn name(&self) -> &'static str {
        "local-search"
    }

    fn solve(
        &self,
        model: &Model,
        params: &SolverParams,
        sink: &IncumbentSink<'_>,
    ) -> Result<SolveOutcome, EngineError> {
        model.validate()?;
        let deadline = sink.started_at() + params.time_limit;
        let space = SearchSpace::new(model);

        let status = if space.size() <= params.exhaustive_limit {
            info!(
                combinations = space.size(),
                "Search space is small; enumerating exhaustively."
            );
            self.enumerate(&space, sink, deadline)
        } else {
            info!(
                combinations = space.size(),
                workers = params.num_workers,
                "Starting parallel annealing search."
            );
            self.anneal(&space, params, sink, deadline)?;
            if sink.reported() > 0 {
                SolveStatus::Feasible
            } else {
                SolveStatus::Unknown
            }
        };

        debug!(status = %status, incumbents = sink.reported(), "Search finished.");
        Ok(SolveOutcome {
            status,
            best: sink.best(),
            incumbents_reported: sink.reported(),
            wall_time: sink.started_at().elapsed(),
        })
    }
}

impl LocalSearchSolver {
    fn enumerate(&self, space: &SearchSpace, sink: &IncumbentSink<'_>, deadline: Instant) -> SolveStatus {
        let evaluator = Evaluator::new(space.model);
        let mut choice = vec![0usize; space.groups.len()];
        let mut values = vec![0i64; space.model.num_variables()];
        let mut visited: u64 = 0;

        loop {
            space.write_choice(&choice, &mut values);
            let eval = evaluator.evaluate(&mut values);
            if eval.is_feasible() && sink.would_improve(eval.objective) {
                sink.offer(eval.objective, &values);
            }
            visited += 1;

            if visited % DEADLINE_CHECK_INTERVAL == 0 && Instant::now() >= deadline {
                debug!(visited, "Enumeration interrupted by the time limit.");
                return if sink.reported() > 0 {
                    SolveStatus::Feasible
                } else {
                    SolveStatus::Unknown
                };
            }
            if !space.advance(&mut choice) {
                break;
            }
        }

        if sink.reported() > 0 {
            SolveStatus::Optimal
        } else {
            SolveStatus::Infeasible
        }
    }

    #[cfg(feature = "parallel")]
    fn anneal(
        &self,
        space: &SearchSpace,
        params: &SolverParams,
        sink: &IncumbentSink<'_>,
        deadline: Instant,
    ) -> Result<(), EngineError> {
        let workers = params.num_workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| EngineError::Solver {
                solver: self.name(),
                reason: format!("could not start worker pool: {e}"),
            })?;
        pool.install(|| {
            (0..workers)
                .into_par_iter()
                .for_each(|id| self.run_worker(space, id, params.seed, sink, deadline));
        });
        Ok(())
    }

    #[cfg(not(feature = "parallel"))]
    fn anneal(
        &self,
        space: &SearchSpace,
        params: &SolverParams,
        sink: &IncumbentSink<'_>,
        deadline: Instant,
    ) -> Result<(), EngineError> {
        self.run_worker(space, 0, params.seed, sink, deadline);
        Ok(())
    }

    fn run_worker(
        &self,
        space: &SearchSpace,
        worker_id: usize,
        seed: u64,
        sink: &IncumbentSink<'_>,
        deadline: Instant,
    ) {
        let evaluator = Evaluator::new(space.model);
        let mut rng = SmallRng::seed_from_u64(seed ^ (worker_id as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));

        let mut choice = space.hinted_choice();
        let mut values = vec![0i64; space.model.num_variables()];
        space.write_choice(&choice, &mut values);
        let mut current = evaluator.evaluate(&mut values);
        if current.is_feasible() {
            sink.offer(current.objective, &values);
        }

        let mut scratch = values.clone();
        let initial_temperature = self.initial_temperature * space.energy_scale;
        let final_temperature = self.final_temperature * space.energy_scale;
        let mut temperature = initial_temperature;
        let mut steps: u64 = 0;
        let mut reheats = 0usize;

        while space.has_moves() {
            if steps % DEADLINE_CHECK_INTERVAL == 0 && Instant::now() >= deadline {
                break;
            }
            steps += 1;

            let Some(mv) = space.propose(&choice, &mut rng, self.swap_probability) else {
                break;
            };
            scratch.copy_from_slice(&values);
            space.apply(mv, &mut choice, &mut scratch);
            let candidate = evaluator.evaluate(&mut scratch);

            if accept(&current, &candidate, temperature, space.energy_scale, &mut rng) {
                std::mem::swap(&mut values, &mut scratch);
                current = candidate;
                if current.is_feasible() && sink.would_improve(current.objective) {
                    sink.offer(current.objective, &values);
                }
            } else {
                space.undo(mv, &mut choice);
            }

            if steps % self.steps_per_temperature as u64 == 0 {
                temperature *= self.cooling_rate;
                if temperature < final_temperature {
                    temperature = initial_temperature;
                    reheats += 1;
                }
            }
        }

        trace!(worker = worker_id, steps, reheats, "Annealing worker stopped.");
    }
}

/// Metropolis acceptance on `penalty * violation - objective`.
fn accept(
    current: &Evaluation,
    candidate: &Evaluation,
    temperature: f64,
    energy_scale: f64,
    rng: &mut SmallRng,
) -> bool {
    if candidate.better_than(current) || candidate == current {
        return true;
    }
    let delta = (candidate.violation as f64 - current.violation as f64) * VIOLATION_PENALTY * energy_scale
        + (current.objective as f64 - candidate.objective as f64);
    rng.r#gen::<f64>() < (-delta / temperature).exp()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Move {
    Change { group: usize, from: usize, to: usize },
    Swap { a: usize, b: usize },
}

/// The exactly-one groups of a model, viewed as a vector of member offsets.
struct SearchSpace<'m> {
    model: &'m Model,
    groups: Vec<Vec<usize>>,
    /// Groups with more than one member.
    changeable: Vec<usize>,
    /// Sets of at least two changeable groups sharing the same size.
    swap_classes: Vec<Vec<usize>>,
    /// Mean absolute objective coefficient, at least `1`.
    energy_scale: f64,
}

impl<'m> SearchSpace<'m> {
    fn new(model: &'m Model) -> Self {
        let groups: Vec<Vec<usize>> = model
            .exactly_one_groups()
            .iter()
            .map(|g| g.iter().map(|v| v.index()).collect())
            .collect();
        let changeable: Vec<usize> = (0..groups.len()).filter(|&g| groups[g].len() > 1).collect();

        let mut by_size: HashMap<usize, Vec<usize>> = HashMap::new();
        for &g in &changeable {
            by_size.entry(groups[g].len()).or_default().push(g);
        }
        let mut swap_classes: Vec<Vec<usize>> = by_size.into_values().filter(|c| c.len() > 1).collect();
        swap_classes.sort();

        let terms = model.objective().terms();
        let energy_scale = if terms.is_empty() {
            1.0
        } else {
            let total: f64 = terms.iter().map(|(_, c)| c.unsigned_abs() as f64).sum();
            (total / terms.len() as f64).max(1.0)
        };

        Self {
            model,
            groups,
            changeable,
            swap_classes,
            energy_scale,
        }
    }

    /// Number of distinct decision assignments, saturating at `u64::MAX`.
    fn size(&self) -> u64 {
        self.groups
            .iter()
            .fold(1u64, |acc, g| acc.saturating_mul(g.len() as u64))
    }

    fn has_moves(&self) -> bool {
        !self.changeable.is_empty()
    }

    /// Start state: the hinted member of each group, or its first member.
    fn hinted_choice(&self) -> Vec<usize> {
        let hinted: HashMap<usize, i64> = self
            .model
            .hints()
            .iter()
            .map(|&(v, value)| (v.index(), value))
            .collect();
        self.groups
            .iter()
            .map(|members| {
                members
                    .iter()
                    .position(|m| hinted.get(m) == Some(&1))
                    .unwrap_or(0)
            })
            .collect()
    }

    fn write_choice(&self, choice: &[usize], values: &mut [i64]) {
        for (members, &picked) in self.groups.iter().zip(choice) {
            for (offset, &m) in members.iter().enumerate() {
                values[m] = i64::from(offset == picked);
            }
        }
    }

    /// Odometer step over all choices. Returns `false` after the last combination.
    fn advance(&self, choice: &mut [usize]) -> bool {
        for (g, members) in self.groups.iter().enumerate() {
            choice[g] += 1;
            if choice[g] < members.len() {
                return true;
            }
            choice[g] = 0;
        }
        false
    }

    fn propose(&self, choice: &[usize], rng: &mut SmallRng, swap_probability: f64) -> Option<Move> {
        if !self.swap_classes.is_empty() && rng.r#gen::<f64>() < swap_probability {
            let class = &self.swap_classes[rng.gen_range(0..self.swap_classes.len())];
            let a = class[rng.gen_range(0..class.len())];
            let b = class[rng.gen_range(0..class.len())];
            if a != b && choice[a] != choice[b] {
                return Some(Move::Swap { a, b });
            }
        }

        let group = *self.changeable.get(rng.gen_range(0..self.changeable.len()))?;
        let len = self.groups[group].len();
        let from = choice[group];
        let to = (from + rng.gen_range(1..len)) % len;
        Some(Move::Change { group, from, to })
    }

    fn apply(&self, mv: Move, choice: &mut [usize], values: &mut [i64]) {
        match mv {
            Move::Change { group, from, to } => {
                values[self.groups[group][from]] = 0;
                values[self.groups[group][to]] = 1;
                choice[group] = to;
            }
            Move::Swap { a, b } => {
                let (ca, cb) = (choice[a], choice[b]);
                values[self.groups[a][ca]] = 0;
                values[self.groups[b][cb]] = 0;
                values[self.groups[a][cb]] = 1;
                values[self.groups[b][ca]] = 1;
                choice.swap(a, b);
            }
        }
    }

    fn undo(&self, mv: Move, choice: &mut [usize]) {
        match mv {
            Move::Change { group, from, .. } => choice[group] = from,
            Move::Swap { a, b } => choice.swap(a, b),
        }
    }
}
