use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileSolverConfig};
use super::models::AppConfig;
use crate::cli::OptimizeArgs;
use crate::error::{CliError, Result};
use crate::input::RequestFile;
use crate::utils::parser;
use squadopt::core::capability::Boon;
use squadopt::core::models::mode::GameMode;
use squadopt::core::models::objective::{BoonTargets, ObjectiveTerm, ObjectiveWeights};
use squadopt::engine::config::SolverConfigBuilder;
use std::collections::BTreeMap;
use tracing::debug;

/// Merges every configuration layer for the `optimize` command.
///
/// Precedence, lowest first: built-in defaults, `-j`, the `--config` file, values spelled
/// out in the request file, explicit CLI flags, and finally `-S key=value` overrides.
pub fn build_config(args: &OptimizeArgs, threads: Option<usize>, input: RequestFile) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };
    let set_config = apply_set_values(FileConfig::default(), &args.set_values)?;

    let file_solver = file_config.solver.clone().unwrap_or_default();
    let set_solver = set_config.solver.clone().unwrap_or_default();

    let num_workers = set_solver
        .num_workers
        .or(args.workers)
        .or(file_solver.num_workers)
        .or(threads)
        .unwrap_or(defaults.num_workers);
    let seed = set_solver
        .seed
        .or(args.seed)
        .or(file_solver.seed)
        .unwrap_or(defaults.seed);
    let exhaustive_limit = set_solver
        .exhaustive_limit
        .or(file_solver.exhaustive_limit)
        .unwrap_or(defaults.exhaustive_limit);
    let time_limit_ms = set_solver
        .time_limit_ms
        .or(args.time_limit_ms)
        .or(input.explicit_time_limit_ms)
        .or(file_solver.time_limit_ms)
        .unwrap_or(defaults.time_limit_ms);

    let solver = SolverConfigBuilder::new()
        .num_workers(num_workers)
        .seed(seed)
        .exhaustive_limit(exhaustive_limit)
        .build()?;

    let mut request = input.request;
    request.mode = set_config
        .mode
        .or(input.explicit_mode)
        .or(file_config.mode)
        .unwrap_or_default();
    request.time_limit_ms = time_limit_ms;
    request.weights = weights_of(&file_config)
        .merged_with(&request.weights)
        .merged_with(&weights_of(&set_config));
    request.targets = targets_of(&file_config)?
        .merged_with(&request.targets)
        .merged_with(&targets_of(&set_config)?);

    debug!(
        num_workers = solver.num_workers,
        seed = solver.seed,
        time_limit_ms = request.time_limit_ms,
        mode = %request.mode,
        "Configuration merged."
    );

    Ok(AppConfig {
        request,
        solver,
        output: args.output.clone(),
    })
}

fn weights_of(layer: &FileConfig) -> ObjectiveWeights {
    layer
        .weights
        .clone()
        .map(ObjectiveWeights::from)
        .unwrap_or_default()
}

fn targets_of(layer: &FileConfig) -> Result<BoonTargets> {
    let mut targets = BoonTargets::new();
    for (name, &target) in layer.targets.iter().flatten() {
        let boon: Boon = name
            .parse()
            .map_err(|e| CliError::Config(format!("Invalid key in [targets]: {}", e)))?;
        targets.set(boon, target);
    }
    Ok(targets)
}

fn solver_mut(config: &mut FileConfig) -> &mut FileSolverConfig {
    config.solver.get_or_insert_with(Default::default)
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    if set_values.is_empty() {
        return Ok(config);
    }
    for kv_pair in set_values {
        let (key, value) =
            parser::parse_key_value(kv_pair).map_err(|e| CliError::Argument(e.to_string()))?;
        let invalid = |e: parser::ParseError| CliError::Config(e.to_string());

        match key {
            "mode" => {
                let mode: GameMode = value
                    .parse()
                    .map_err(|e| CliError::Config(format!("{}", e)))?;
                config.mode = Some(mode);
            }
            "solver.num-workers" => {
                solver_mut(&mut config).num_workers =
                    Some(parser::parse_value(key, value, "integer").map_err(invalid)?);
            }
            "solver.seed" => {
                solver_mut(&mut config).seed =
                    Some(parser::parse_value(key, value, "integer").map_err(invalid)?);
            }
            "solver.exhaustive-limit" => {
                solver_mut(&mut config).exhaustive_limit =
                    Some(parser::parse_value(key, value, "integer").map_err(invalid)?);
            }
            "solver.time-limit-ms" | "time-limit-ms" => {
                solver_mut(&mut config).time_limit_ms =
                    Some(parser::parse_value(key, value, "integer").map_err(invalid)?);
            }
            _ => {
                if let Some(term) = key.strip_prefix("weights.") {
                    let term: ObjectiveTerm = term
                        .parse()
                        .map_err(|e| CliError::Config(format!("{}", e)))?;
                    let weight: f64 = parser::parse_value(key, value, "float").map_err(invalid)?;
                    config
                        .weights
                        .get_or_insert_with(BTreeMap::new)
                        .insert(term.name().to_string(), weight);
                } else if let Some(boon) = key.strip_prefix("targets.") {
                    let boon: Boon = boon
                        .parse()
                        .map_err(|e| CliError::Config(format!("{}", e)))?;
                    let target: f64 = parser::parse_value(key, value, "float").map_err(invalid)?;
                    config
                        .targets
                        .get_or_insert_with(BTreeMap::new)
                        .insert(boon.name().to_string(), target);
                } else {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
    }
    Ok(config)
}
