use crate::core::capability::CapabilityProvider;
use crate::core::models::objective::{MAX_WEIGHT, ObjectiveWeights};
use crate::core::models::request::OptimizationRequest;
use crate::core::models::result::{Diagnostics, OptimizationResult, ResultStatus};
use crate::engine::builder;
use crate::engine::config::SolverConfig;
use crate::engine::coverage;
use crate::engine::driver;
use crate::engine::extract;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::roster::ResolvedRoster;
use crate::engine::solver::{LocalSearchSolver, Solver};
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Optimizes `request` with the bundled [`LocalSearchSolver`].
pub fn run<P>(
    request: &OptimizationRequest,
    provider: &P,
    config: &SolverConfig,
    reporter: &ProgressReporter,
) -> OptimizationResult
where
    P: CapabilityProvider + ?Sized,
{
    run_with_solver(request, provider, &LocalSearchSolver::default(), config, reporter)
}

/// Optimizes `request` with an arbitrary solver engine.
///
/// Infallible: the result status is always `complete`, and whether the solver produced
/// the assignment or the round-robin fallback did is recorded in the diagnostics.
#[instrument(skip_all, name = "optimize_workflow", fields(players = request.players.len(), mode = %request.mode, solver = solver.name()))]
pub fn run_with_solver<P, S>(
    request: &OptimizationRequest,
    provider: &P,
    solver: &S,
    config: &SolverConfig,
    reporter: &ProgressReporter,
) -> OptimizationResult
where
    P: CapabilityProvider + ?Sized,
    S: Solver + ?Sized,
{
    if request.players.is_empty() {
        info!("Empty roster; returning the trivial result without building a model.");
        return OptimizationResult::empty();
    }
    let start = Instant::now();
    check_weights(&request.weights);

    // === Phase 1: Resolve roster and build the model ===
    reporter.report(Progress::PhaseStart {
        name: "Model Building",
    });
    let roster = ResolvedRoster::resolve(request, provider);
    let squad = builder::build(request, &roster);
    reporter.report(Progress::StatusUpdate {
        text: format!(
            "{} players, {} groups, {} variables",
            roster.player_count(),
            roster.group_count,
            squad.model.num_variables()
        ),
    });
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Solve under the time budget ===
    let time_limit_ms = request.effective_time_limit_ms();
    reporter.report(Progress::PhaseStart { name: "Solving" });
    let report = driver::solve(solver, &squad, &roster, config, time_limit_ms, reporter);
    reporter.report(Progress::PhaseFinish);

    // === Phase 3: Extract assignment and coverage ===
    reporter.report(Progress::PhaseStart {
        name: "Extracting Solution",
    });
    let (placements, coverage_by_group, best_score, objective_value) = match report.usable_solution() {
        Some(incumbent) => (
            extract::solved_placements(&squad, &roster, &incumbent.values),
            coverage::solved_coverage(&squad, &incumbent.values),
            coverage::normalized_score(incumbent.objective, squad.group_count),
            Some(incumbent.objective),
        ),
        None => {
            warn!(status = %report.status, "No usable solver solution; using the deterministic fallback.");
            reporter.report(Progress::Message(format!(
                "Solver returned {}; using round-robin fallback.",
                report.status
            )));
            let placements = extract::fallback_placements(&roster);
            let coverage = coverage::fallback_coverage(&roster, &placements, &request.targets);
            (placements, coverage, 0.0, None)
        }
    };
    let groups = extract::into_groups(&roster, &placements);
    reporter.report(Progress::PhaseFinish);

    let diagnostics = Diagnostics {
        solver_status: report.status,
        fallback_used: objective_value.is_none(),
        incumbents_reported: report.incumbents_reported,
        objective_value,
        group_count: roster.group_count,
        num_variables: squad.model.num_variables(),
        num_constraints: squad.model.num_constraints(),
        num_workers: report.num_workers,
        time_limit_ms,
        substituted_players: roster.substituted_players(),
        solver_error: report.error,
    };

    let elapsed_ms = start.elapsed().as_millis() as u64;
    info!(
        status = %diagnostics.solver_status,
        fallback = diagnostics.fallback_used,
        best_score,
        elapsed_ms,
        "Optimization complete."
    );

    OptimizationResult {
        status: ResultStatus::Complete,
        best_score,
        elapsed_ms,
        groups,
        coverage_by_group,
        diagnostics,
    }
}

fn check_weights(weights: &ObjectiveWeights) {
    for key in weights.unknown_keys() {
        warn!(key = %key, "Ignoring unknown objective weight.");
    }
    for term in weights.negative_terms() {
        warn!(
            term = term.name(),
            weight = weights.get(term),
            "Negative objective weight; saturating and penalty terms will not behave as caps."
        );
    }
    for term in weights.clamped_terms() {
        warn!(
            term = term.name(),
            weight = weights.get(term),
            limit = MAX_WEIGHT,
            "Objective weight exceeds the supported magnitude; clamping."
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::capability::{Boon, CapabilityVector};
    use crate::core::models::build::BuildTemplate;
    use crate::core::models::ids::{BuildId, PlayerId};
    use crate::core::models::mode::GameMode;
    use crate::core::models::objective::ObjectiveTerm;
    use crate::core::models::player::Player;
    use crate::core::models::result::SolveStatus;
    use crate::engine::config::SolverConfigBuilder;
    use crate::engine::error::EngineError;
    use crate::engine::model::Model;
    use crate::engine::solver::{IncumbentSink, SolveOutcome, SolverParams};
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Gives up immediately, as a solver that ran out of time would.
    struct TimedOutSolver;

    impl Solver for TimedOutSolver {
        fn name(&self) -> &'static str {
            "timed-out"
        }

        fn solve(&self, _: &Model, _: &SolverParams, _: &IncumbentSink<'_>) -> Result<SolveOutcome, EngineError> {
            Ok(SolveOutcome {
                status: SolveStatus::Unknown,
                best: None,
                incumbents_reported: 0,
                wall_time: Duration::ZERO,
            })
        }
    }

    struct BrokenSolver;

    impl Solver for BrokenSolver {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn solve(&self, _: &Model, _: &SolverParams, _: &IncumbentSink<'_>) -> Result<SolveOutcome, EngineError> {
            Err(EngineError::Internal("contradictory model".to_string()))
        }
    }

    fn provider(build: &BuildTemplate, _mode: GameMode) -> CapabilityVector {
        let base = CapabilityVector {
            damage: 0.5,
            might: 5.0,
            ..CapabilityVector::default()
        };
        match build.id.as_str() {
            "quickbrand" => base.with_boon(Boon::Quickness, 1.0).with_boon(Boon::Stability, 0.6),
            "alacren" => base.with_boon(Boon::Alacrity, 1.0).with_boon(Boon::Fury, 0.5),
            "heal-druid" => base.with_boon(Boon::Protection, 0.7),
            _ => CapabilityVector {
                damage: 1.0,
                might: 10.0,
                ..CapabilityVector::default()
            },
        }
    }

    fn catalogue() -> Vec<BuildTemplate> {
        vec![
            BuildTemplate::new("quickbrand", "Firebrand"),
            BuildTemplate::new("alacren", "Renegade"),
            BuildTemplate::new("heal-druid", "Druid"),
            BuildTemplate::new("power-dps", "Virtuoso"),
        ]
    }

    fn weights() -> ObjectiveWeights {
        ObjectiveWeights::new()
            .with(ObjectiveTerm::Boon(Boon::Quickness), 1.0)
            .with(ObjectiveTerm::Boon(Boon::Alacrity), 1.0)
            .with(ObjectiveTerm::Boon(Boon::Stability), 0.5)
            .with(ObjectiveTerm::Might, 0.1)
            .with(ObjectiveTerm::Dps, 0.3)
            .with(ObjectiveTerm::DiversityReward, 0.2)
            .with(ObjectiveTerm::DupPenaltyGroup, 0.4)
            .with(ObjectiveTerm::DupPenaltyGlobal, 0.1)
            .with(ObjectiveTerm::Synergy, 0.5)
    }

    /// Every fourth player has no eligibility; the rest rotate through the catalogue.
    fn request(players: usize, time_limit_ms: u64) -> OptimizationRequest {
        let ids = ["quickbrand", "alacren", "heal-druid", "power-dps"];
        let roster = (0..players)
            .map(|i| {
                let player = Player::new(format!("p{i:02}"));
                if i % 4 == 3 {
                    player
                } else {
                    player.with_eligible([ids[i % 4], ids[(i + 1) % 4], "power-dps"])
                }
            })
            .collect();
        OptimizationRequest::new(roster, catalogue())
            .with_weights(weights())
            .with_time_limit_ms(time_limit_ms)
    }

    fn config() -> SolverConfig {
        SolverConfigBuilder::new().num_workers(2).seed(11).build().unwrap()
    }

    fn assert_well_formed(request: &OptimizationRequest, result: &OptimizationResult) {
        assert_eq!(result.status, ResultStatus::Complete);

        let triples = result.assignments();
        assert_eq!(triples.len(), request.players.len());
        let seen: HashSet<&PlayerId> = triples.iter().map(|(p, _, _)| *p).collect();
        assert_eq!(seen.len(), request.players.len());

        for player in &request.players {
            let build = result.build_of(&player.id).unwrap();
            if player.eligible_build_ids.is_empty() {
                assert_eq!(build, &request.builds[0].id);
            } else {
                assert!(player.eligible_build_ids.contains(build));
            }
        }

        assert!((0.0..=1.0).contains(&result.best_score));
        for group in &result.coverage_by_group {
            assert!(group.values().all(|v| (0.0..=1.0).contains(v)));
        }
        assert_eq!(result.coverage_by_group.len(), result.groups.len());
    }

    #[test]
    fn empty_roster_short_circuits() {
        let request = OptimizationRequest::new(vec![], catalogue());
        let result = run(&request, &provider, &config(), &ProgressReporter::new());

        assert_eq!(result.status, ResultStatus::Complete);
        assert!(result.groups.is_empty());
        assert!(result.coverage_by_group.is_empty());
        assert_eq!(result.best_score, 0.0);
        assert_eq!(result.elapsed_ms, 0);
    }

    #[test]
    fn solved_results_are_well_formed_across_roster_sizes() {
        for n in [1, 4, 7, 12] {
            let req = request(n, 150);
            let result = run(&req, &provider, &config(), &ProgressReporter::new());
            assert_well_formed(&req, &result);
            assert!(result.diagnostics.solver_status.has_solution(), "n = {n}");
            assert!(!result.diagnostics.fallback_used);
        }
    }

    #[test]
    fn fallback_results_are_well_formed_across_roster_sizes() {
        for n in [1, 5, 6, 12, 23] {
            let req = request(n, 100);
            let result = run_with_solver(&req, &provider, &TimedOutSolver, &config(), &ProgressReporter::new());
            assert_well_formed(&req, &result);
            assert!(result.diagnostics.fallback_used);
            assert_eq!(result.best_score, 0.0);
            assert!(result.groups.iter().all(|g| g.len() <= 5));
        }
    }

    #[test]
    fn fallback_is_deterministic() {
        let req = request(13, 100);
        let first = run_with_solver(&req, &provider, &TimedOutSolver, &config(), &ProgressReporter::new());
        let second = run_with_solver(&req, &provider, &TimedOutSolver, &config(), &ProgressReporter::new());

        assert_eq!(first.groups, second.groups);
        assert_eq!(
            serde_json::to_string(&first.groups).unwrap(),
            serde_json::to_string(&second.groups).unwrap()
        );
        assert_eq!(first.groups[0].players[0], PlayerId::new("p00"));
        assert_eq!(first.groups[0].builds[0], BuildId::new("quickbrand"));
    }

    #[test]
    fn players_without_eligibility_get_the_first_catalogue_build() {
        let req = OptimizationRequest::new(
            vec![Player::new("a"), Player::new("b"), Player::new("c")],
            vec![
                BuildTemplate::new("quickbrand", "Firebrand"),
                BuildTemplate::new("alacren", "Renegade"),
            ],
        )
        .with_weights(weights());

        let solved = run(&req, &provider, &config(), &ProgressReporter::new());
        let fallback = run_with_solver(&req, &provider, &TimedOutSolver, &config(), &ProgressReporter::new());

        for result in [&solved, &fallback] {
            assert_eq!(result.diagnostics.group_count, 1);
            assert_eq!(result.groups.len(), 1);
            assert_eq!(result.groups[0].players.len(), 3);
            assert!(result.groups[0].builds.iter().all(|b| b.as_str() == "quickbrand"));
            assert_eq!(result.diagnostics.substituted_players.len(), 3);
        }
        assert_eq!(solved.diagnostics.solver_status, SolveStatus::Optimal);
    }

    #[test]
    fn twelve_players_fill_three_groups_of_at_most_five() {
        let req = request(12, 200);
        let result = run(&req, &provider, &config(), &ProgressReporter::new());

        assert_eq!(result.diagnostics.group_count, 3);
        assert_eq!(result.groups.len(), 3);
        assert!(result.diagnostics.solver_status.has_solution());
        assert!(result.groups.iter().all(|g| g.len() <= 5));
    }

    #[test]
    fn small_problems_reach_full_boon_coverage() {
        let players = (0..5)
            .map(|i| Player::new(format!("p{i}")).with_eligible(["power-dps", "quickbrand", "alacren"]))
            .collect();
        let req = OptimizationRequest::new(players, catalogue()).with_weights(weights());
        let result = run(&req, &provider, &config(), &ProgressReporter::new());

        assert_eq!(result.diagnostics.solver_status, SolveStatus::Optimal);
        assert_eq!(result.coverage_by_group[0][&Boon::Quickness], 1.0);
        assert_eq!(result.coverage_by_group[0][&Boon::Alacrity], 1.0);
        assert!(result.best_score > 0.0);
    }

    #[test]
    fn streamed_incumbents_improve_monotonically() {
        let objectives = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event: Progress| {
            if let Progress::Incumbent(snapshot) = event {
                objectives.lock().unwrap().push(snapshot.objective);
            }
        }));
        let req = request(9, 200);
        let result = run(&req, &provider, &config(), &reporter);

        drop(reporter);
        let objectives = objectives.into_inner().unwrap();
        assert!(!objectives.is_empty());
        assert!(objectives.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(objectives.len(), result.diagnostics.incumbents_reported);
        assert_eq!(objectives.last().copied(), result.diagnostics.objective_value);
    }

    #[test]
    fn solver_errors_route_into_the_fallback() {
        let req = request(6, 100);
        let result = run_with_solver(&req, &provider, &BrokenSolver, &config(), &ProgressReporter::new());

        assert_well_formed(&req, &result);
        assert_eq!(result.diagnostics.solver_status, SolveStatus::Unknown);
        assert!(result.diagnostics.fallback_used);
        assert!(result.diagnostics.solver_error.as_deref().unwrap().contains("contradictory model"));
    }

    #[test]
    fn huge_weights_are_clamped_and_still_solved() {
        let req = request(4, 200).with_weights(
            weights()
                .with(ObjectiveTerm::Boon(Boon::Quickness), 1e16)
                .with(ObjectiveTerm::Dps, 1e16),
        );
        let result = run(&req, &provider, &config(), &ProgressReporter::new());

        assert_well_formed(&req, &result);
        assert!(!result.diagnostics.fallback_used);
        assert!(result.diagnostics.solver_error.is_none());
        assert_eq!(result.diagnostics.solver_status, SolveStatus::Optimal);
        assert!(result.diagnostics.objective_value.unwrap() > 0);
        assert_eq!(result.coverage_by_group[0][&Boon::Quickness], 1.0);
    }

    #[test]
    fn time_limit_is_floored_in_diagnostics() {
        let req = request(2, 1);
        let result = run(&req, &provider, &config(), &ProgressReporter::new());
        assert_eq!(result.diagnostics.time_limit_ms, 100);
        assert_eq!(result.diagnostics.num_workers, 2);
    }
}
