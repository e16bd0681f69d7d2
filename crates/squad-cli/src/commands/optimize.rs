use crate::cli::OptimizeArgs;
use crate::config::builder::build_config;
use crate::error::Result;
use crate::input;
use crate::ui::{CliProgressHandler, UiEvent};
use squadopt::core::capability::Boon;
use squadopt::core::models::result::OptimizationResult;
use squadopt::engine::progress::ProgressReporter;
use squadopt::workflows;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub async fn run(args: OptimizeArgs, threads: Option<usize>, ui_sender: mpsc::Sender<UiEvent>) -> Result<()> {
    info!("Loading request from {:?}", &args.request);
    let request_file = input::load_request(&args.request)?;
    let capabilities = input::load_capabilities(&args.capabilities)?;

    info!("Merging configuration from file and CLI arguments...");
    let app = build_config(&args, threads, request_file)?;

    let progress_handler = CliProgressHandler::new(ui_sender);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Invoking the core optimization workflow...");
    let result = tokio::task::block_in_place(|| {
        workflows::optimize::run(&app.request, &capabilities, &app.solver, &reporter)
    });

    if result.diagnostics.fallback_used {
        warn!(
            status = %result.diagnostics.solver_status,
            "Result comes from the round-robin fallback, not from the solver."
        );
    }

    let json = serde_json::to_string_pretty(&result)?;
    match &app.output {
        Some(path) => {
            std::fs::write(path, json)?;
            for line in summary_lines(&result) {
                println!("{}", line);
            }
            println!("✓ Result written to: {}", path.display());
        }
        None => {
            // stdout carries the JSON document; keep the summary on stderr.
            for line in summary_lines(&result) {
                eprintln!("{}", line);
            }
            println!("{}", json);
        }
    }

    Ok(())
}

/// Human-readable overview of a result: status line plus one line per group.
pub fn summary_lines(result: &OptimizationResult) -> Vec<String> {
    let diagnostics = &result.diagnostics;
    let source = if diagnostics.fallback_used {
        "fallback"
    } else {
        "solver"
    };
    let mut lines = vec![format!(
        "Squad of {} player(s) in {} group(s): score {:.3}, status {} ({}), {} ms",
        result.assignments().len(),
        result.groups.len(),
        result.best_score,
        diagnostics.solver_status,
        source,
        result.elapsed_ms
    )];

    for (group, coverage) in result.groups.iter().zip(&result.coverage_by_group) {
        let members = group
            .members()
            .map(|(player, build)| format!("{}:{}", player, build))
            .collect::<Vec<_>>()
            .join(", ");
        let covered = Boon::ALL
            .iter()
            .filter_map(|boon| {
                coverage
                    .get(boon)
                    .filter(|&&value| value > 0.0)
                    .map(|value| format!("{} {:.0}%", boon, value * 100.0))
            })
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!(
            "  Group {} [{}] {}",
            group.group_id + 1,
            if covered.is_empty() { "-" } else { covered.as_str() },
            members
        ));
    }

    if !diagnostics.substituted_players.is_empty() {
        let names = diagnostics
            .substituted_players
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("  Substituted (no eligible builds): {}", names));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use squadopt::core::models::result::{GroupAssignment, SolveStatus};
    use std::collections::BTreeMap;

    fn result() -> OptimizationResult {
        let mut group = GroupAssignment::new(0);
        group.push("ana".into(), "quickbrand".into());
        group.push("ben".into(), "alacren".into());

        let mut coverage = BTreeMap::new();
        for boon in Boon::ALL {
            coverage.insert(boon, 0.0);
        }
        coverage.insert(Boon::Quickness, 1.0);
        coverage.insert(Boon::Alacrity, 0.5);

        let mut result = OptimizationResult {
            best_score: 0.75,
            elapsed_ms: 120,
            groups: vec![group],
            coverage_by_group: vec![coverage],
            ..OptimizationResult::empty()
        };
        result.diagnostics.solver_status = SolveStatus::Optimal;
        result.diagnostics.substituted_players = vec!["ben".into()];
        result
    }

    #[test]
    fn summary_lists_groups_and_coverage() {
        let lines = summary_lines(&result());

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Squad of 2 player(s) in 1 group(s): score 0.750, status OPTIMAL (solver), 120 ms"
        );
        assert_eq!(
            lines[1],
            "  Group 1 [quickness 100%, alacrity 50%] ana:quickbrand, ben:alacren"
        );
        assert!(lines[2].ends_with("ben"));
    }

    #[test]
    fn summary_marks_fallback_results() {
        let mut result = result();
        result.diagnostics.fallback_used = true;
        result.diagnostics.solver_status = SolveStatus::Unknown;
        result.coverage_by_group[0].clear();

        let lines = summary_lines(&result);
        assert!(lines[0].contains("status UNKNOWN (fallback)"));
        assert!(lines[1].starts_with("  Group 1 [-]"));
    }

    #[test]
    fn empty_result_has_only_the_headline() {
        let lines = summary_lines(&OptimizationResult::empty());
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Squad of 0 player(s) in 0 group(s)"));
    }
}
