use crate::error::{CliError, Result};
use std::fs::File;
use std::path::Path;
use tracing::Subscriber;
use tracing_subscriber::{
    filter::{LevelFilter, Targets},
    fmt::{self, MakeWriter, format::FmtSpan},
    prelude::*,
    registry::LookupSpan,
    Layer,
};

/// Both the library and the binary log under this target prefix.
const APP_TARGET: &str = "squadopt";

pub fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::OFF;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// `-v` raises squadopt's own verbosity; rayon, tokio and other dependencies
/// never log below WARN.
pub fn log_targets(verbosity: u8, quiet: bool) -> Targets {
    let level = level_filter(verbosity, quiet);
    Targets::new()
        .with_target(APP_TARGET, level)
        .with_default(level.min(LevelFilter::WARN))
}

/// Plain-text layer for `--log-file`. Closing spans are recorded with their busy
/// and idle times, so each model build and solve leaves a timing line.
fn file_layer<S, W>(writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + 'static,
{
    fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
}

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact();

    let file_layer = match log_file {
        Some(path) => Some(file_layer(File::create(path).map_err(CliError::Io)?)),
        None => None,
    };

    tracing_subscriber::registry()
        .with(log_targets(verbosity, quiet))
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to install logger: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::Once;
    use tracing::{Level, debug, error, info, info_span, trace, warn};

    static INIT: Once = Once::new();

    fn ensure_global_logger_is_set() {
        INIT.call_once(|| {
            setup_logging(3, false, None).expect("Failed to set up global logger for tests");
        });
    }

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_filter(0, false), LevelFilter::WARN);
        assert_eq!(level_filter(1, false), LevelFilter::INFO);
        assert_eq!(level_filter(2, false), LevelFilter::DEBUG);
        assert_eq!(level_filter(7, false), LevelFilter::TRACE);
        assert_eq!(level_filter(3, true), LevelFilter::OFF);
    }

    #[test]
    fn dependencies_stay_at_warn_while_squadopt_follows_verbosity() {
        let targets = log_targets(3, false);
        assert!(targets.would_enable("squadopt::engine::solver::local_search", &Level::TRACE));
        assert!(!targets.would_enable("rayon_core::registry", &Level::DEBUG));
        assert!(!targets.would_enable("tokio::runtime", &Level::INFO));
        assert!(targets.would_enable("tokio::runtime", &Level::WARN));

        let quiet = log_targets(3, true);
        assert!(!quiet.would_enable("squadopt", &Level::ERROR));
        assert!(!quiet.would_enable("rayon_core", &Level::ERROR));

        let default = log_targets(0, false);
        assert!(default.would_enable("squadopt::workflows::optimize", &Level::WARN));
        assert!(!default.would_enable("squadopt::workflows::optimize", &Level::INFO));
    }

    #[test]
    #[serial]
    fn initialization_and_macros_work() {
        ensure_global_logger_is_set();

        error!("This is an error");
        warn!(players = 12, "This is a warning");
        info!("This is info");
        debug!("This is debug");
        trace!("This is trace");
    }

    #[test]
    #[serial]
    fn log_file_records_solve_spans_and_filters_dependencies() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("solve.log");

        let subscriber = tracing_subscriber::registry()
            .with(log_targets(1, false))
            .with(file_layer(File::create(&log_path).unwrap()));

        tracing::subscriber::with_default(subscriber, || {
            let span = info_span!(target: "squadopt::engine::driver", "solver_driver", time_limit_ms = 200);
            let _entered = span.enter();
            info!(target: "squadopt::engine::driver", "Solver finished with status OPTIMAL");
            info!(target: "rayon_core::registry", "worker thread started");
        });

        let content = std::fs::read_to_string(log_path).unwrap();
        assert!(content.contains("Solver finished with status OPTIMAL"));
        assert!(content.contains("solver_driver{time_limit_ms=200}"));
        assert!(content.contains("close"));
        assert!(content.contains("ThreadId"));
        assert!(!content.contains("worker thread started"));
    }

    #[test]
    #[serial]
    fn invalid_log_file_path_propagates_error() {
        let invalid_path = Path::new("/");

        if cfg!(unix) && invalid_path.is_dir() {
            let result = setup_logging(0, false, Some(invalid_path));
            assert!(matches!(result, Err(CliError::Io(_))));
        }
    }
}
