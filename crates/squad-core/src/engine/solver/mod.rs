//! The solver port.
//!
//! A [`Solver`] receives a [`Model`], a wall-clock budget and an [`IncumbentSink`]. It
//! streams every improving feasible solution into the sink and returns the final status.
//! [`LocalSearchSolver`] is the bundled adapter; other engines can be plugged in behind
//! the same trait.

mod evaluator;
pub mod local_search;

pub use local_search::LocalSearchSolver;

use super::error::EngineError;
use super::model::Model;
use crate::core::models::result::SolveStatus;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverParams {
    pub time_limit: Duration,
    pub num_workers: usize,
    pub seed: u64,
    pub exhaustive_limit: u64,
}

/// A feasible assignment of every model variable, indexed by `VarId::index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incumbent {
    pub objective: i64,
    pub values: Vec<i64>,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub best: Option<Incumbent>,
    pub incumbents_reported: usize,
    pub wall_time: Duration,
}

pub trait Solver: Sync {
    fn name(&self) -> &'static str;

    fn solve(
        &self,
        model: &Model,
        params: &SolverParams,
        sink: &IncumbentSink<'_>,
    ) -> Result<SolveOutcome, EngineError>;
}

pub type IncumbentCallback<'a> = Box<dyn Fn(&Incumbent) + Send + Sync + 'a>;

/// Collects improving solutions from any number of search threads.
///
/// Only strictly improving incumbents are kept and forwarded to the callback, so the
/// objective values a callback observes are monotonically increasing. The callback runs
/// on the reporting search thread while the sink's lock is held.
pub struct IncumbentSink<'a> {
    start: Instant,
    best_objective: AtomicI64,
    best: Mutex<Option<Incumbent>>,
    reported: AtomicUsize,
    callback: Option<IncumbentCallback<'a>>,
}

impl<'a> IncumbentSink<'a> {
    pub fn new(start: Instant) -> Self {
        Self {
            start,
            best_objective: AtomicI64::new(i64::MIN),
            best: Mutex::new(None),
            reported: AtomicUsize::new(0),
            callback: None,
        }
    }

    pub fn with_callback(start: Instant, callback: IncumbentCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
            ..Self::new(start)
        }
    }

    pub fn started_at(&self) -> Instant {
        self.start
    }

    /// Quick check that lets workers skip the lock for solutions that cannot improve.
    pub fn would_improve(&self, objective: i64) -> bool {
        self.reported() == 0 || objective > self.best_objective.load(Ordering::Relaxed)
    }

    /// Records `values` if it beats the current best. Returns whether it was accepted.
    pub fn offer(&self, objective: i64, values: &[i64]) -> bool {
        if objective < self.best_objective.load(Ordering::Relaxed) {
            return false;
        }
        let mut guard = self.best.lock().unwrap_or_else(|e| e.into_inner());
        if guard.as_ref().is_some_and(|b| objective <= b.objective) {
            return false;
        }
        let incumbent = Incumbent {
            objective,
            values: values.to_vec(),
            elapsed: self.start.elapsed(),
        };
        self.best_objective.store(objective, Ordering::Relaxed);
        self.reported.fetch_add(1, Ordering::Relaxed);
        if let Some(cb) = &self.callback {
            cb(&incumbent);
        }
        *guard = Some(incumbent);
        true
    }

    pub fn best_objective(&self) -> Option<i64> {
        self.best
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|b| b.objective)
    }

    pub fn best(&self) -> Option<Incumbent> {
        self.best.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn reported(&self) -> usize {
        self.reported.load(Ordering::Relaxed)
    }
}
