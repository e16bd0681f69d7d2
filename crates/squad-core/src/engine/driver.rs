use super::builder::SquadModel;
use super::config::SolverConfig;
use super::coverage;
use super::error::EngineError;
use super::extract;
use super::progress::{IncumbentSnapshot, Progress, ProgressReporter, SlotSnapshot};
use super::roster::ResolvedRoster;
use super::solver::{Incumbent, IncumbentSink, Solver, SolverParams};
use crate::core::models::result::SolveStatus;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Shortest budget handed to a solver engine.
const MIN_TIME_LIMIT: Duration = Duration::from_millis(100);

/// What the driver hands back to the workflow. Engine failures are already folded in.
#[derive(Debug, Clone)]
pub struct SolveReport {
    pub status: SolveStatus,
    pub best: Option<Incumbent>,
    pub incumbents_reported: usize,
    pub wall_time: Duration,
    pub num_workers: usize,
    pub error: Option<String>,
}

impl SolveReport {
    /// The incumbent the extractor should read, if the status allows it.
    pub fn usable_solution(&self) -> Option<&Incumbent> {
        if self.status.has_solution() {
            self.best.as_ref()
        } else {
            None
        }
    }
}

pub fn time_limit(time_limit_ms: u64) -> Duration {
    Duration::from_millis(time_limit_ms).max(MIN_TIME_LIMIT)
}

/// Runs `solver` on the squad model, streaming decoded incumbents to `reporter`.
///
/// Never fails: an engine error or panic becomes an `UNKNOWN` report carrying the
/// error text.
#[instrument(skip_all, name = "solver_driver", fields(solver = solver.name(), time_limit_ms = time_limit_ms))]
pub fn solve<S>(
    solver: &S,
    squad: &SquadModel,
    roster: &ResolvedRoster,
    config: &SolverConfig,
    time_limit_ms: u64,
    reporter: &ProgressReporter,
) -> SolveReport
where
    S: Solver + ?Sized,
{
    let params = SolverParams {
        time_limit: time_limit(time_limit_ms),
        num_workers: config.num_workers,
        seed: config.seed,
        exhaustive_limit: config.exhaustive_limit,
    };
    let start = Instant::now();

    let sink = if reporter.is_active() {
        IncumbentSink::with_callback(
            start,
            Box::new(|incumbent: &Incumbent| {
                reporter.report(Progress::Incumbent(snapshot(squad, roster, incumbent)));
            }),
        )
    } else {
        IncumbentSink::new(start)
    };

    let result = panic::catch_unwind(AssertUnwindSafe(|| solver.solve(&squad.model, &params, &sink)))
        .unwrap_or_else(|payload| Err(EngineError::Panic(panic_message(payload.as_ref()))));

    match result {
        Ok(outcome) => {
            info!(
                status = %outcome.status,
                incumbents = outcome.incumbents_reported,
                objective = outcome.best.as_ref().map(|b| b.objective),
                "Solver finished."
            );
            SolveReport {
                status: outcome.status,
                best: outcome.best,
                incumbents_reported: outcome.incumbents_reported,
                wall_time: outcome.wall_time,
                num_workers: params.num_workers,
                error: None,
            }
        }
        Err(e) => {
            warn!(error = %e, "Solver engine failed; treating the solve as UNKNOWN.");
            SolveReport {
                status: SolveStatus::Unknown,
                best: None,
                incumbents_reported: sink.reported(),
                wall_time: start.elapsed(),
                num_workers: params.num_workers,
                error: Some(e.to_string()),
            }
        }
    }
}

fn snapshot(squad: &SquadModel, roster: &ResolvedRoster, incumbent: &Incumbent) -> IncumbentSnapshot {
    let slots = extract::solved_placements(squad, roster, &incumbent.values)
        .into_iter()
        .zip(&roster.players)
        .map(|(placement, player)| SlotSnapshot {
            player: player.id.clone(),
            build: roster.builds[placement.build].id.clone(),
            group: placement.group,
        })
        .collect();
    IncumbentSnapshot {
        elapsed: incumbent.elapsed,
        objective: incumbent.objective,
        score: coverage::normalized_score(incumbent.objective, squad.group_count),
        slots,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
