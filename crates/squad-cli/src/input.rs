use crate::error::{CliError, Result};
use serde::Deserialize;
use squadopt::core::capability::CapabilityTable;
use squadopt::core::models::mode::GameMode;
use squadopt::core::models::request::OptimizationRequest;
use std::path::Path;
use tracing::{debug, info};

/// A parsed request plus the settings the file spelled out explicitly, which take
/// precedence over the `--config` file.
#[derive(Debug, Clone)]
pub struct RequestFile {
    pub request: OptimizationRequest,
    pub explicit_mode: Option<GameMode>,
    pub explicit_time_limit_ms: Option<u64>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
struct ExplicitKeys {
    mode: Option<GameMode>,
    time_limit_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestFormat {
    Toml,
    Json,
}

impl RequestFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => RequestFormat::Json,
            _ => RequestFormat::Toml,
        }
    }
}

fn parse<T: serde::de::DeserializeOwned>(content: &str, format: RequestFormat, path: &Path) -> Result<T> {
    let parsed = match format {
        RequestFormat::Json => serde_json::from_str(content).map_err(anyhow::Error::from),
        RequestFormat::Toml => toml::from_str(content).map_err(anyhow::Error::from),
    };
    parsed.map_err(|source| CliError::FileParsing {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads a request from `path`; `.json` files are read as JSON, everything else as TOML.
pub fn load_request(path: &Path) -> Result<RequestFile> {
    let format = RequestFormat::from_path(path);
    debug!("Loading {:?} request from {:?}", format, path);
    let content = std::fs::read_to_string(path)?;

    let request: OptimizationRequest = parse(&content, format, path)?;
    let explicit: ExplicitKeys = parse(&content, format, path)?;
    info!(
        players = request.players.len(),
        builds = request.builds.len(),
        mode = %request.mode,
        "Loaded request."
    );

    Ok(RequestFile {
        request,
        explicit_mode: explicit.mode,
        explicit_time_limit_ms: explicit.time_limit_ms,
    })
}

pub fn load_capabilities(path: &Path) -> Result<CapabilityTable> {
    let table = CapabilityTable::load(path)?;
    info!(entries = table.len(), "Loaded capability table from {:?}", path);
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn toml_request_records_explicit_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("request.toml");
        fs::write(
            &path,
            r#"
time-limit-ms = 900

[[players]]
id = "ana"
eligible-build-ids = ["quickbrand"]

[[builds]]
id = "quickbrand"
specialization = "Firebrand"
"#,
        )
        .unwrap();

        let loaded = load_request(&path).unwrap();
        assert_eq!(loaded.request.players.len(), 1);
        assert_eq!(loaded.request.time_limit_ms, 900);
        assert_eq!(loaded.explicit_time_limit_ms, Some(900));
        assert_eq!(loaded.explicit_mode, None);
    }

    #[test]
    fn json_request_is_detected_by_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("request.JSON");
        fs::write(
            &path,
            r#"{
  "mode": "wvw",
  "players": [{ "id": "ana" }, { "id": "ben", "eligible-build-ids": ["alacren"] }],
  "builds": [{ "id": "alacren", "specialization": "Renegade" }]
}"#,
        )
        .unwrap();

        let loaded = load_request(&path).unwrap();
        assert_eq!(loaded.request.players.len(), 2);
        assert_eq!(loaded.explicit_mode, Some(GameMode::Wvw));
        assert_eq!(loaded.explicit_time_limit_ms, None);
    }

    #[test]
    fn malformed_request_names_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[[players]]\nid = 3\n").unwrap();

        match load_request(&path) {
            Err(CliError::FileParsing { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn capability_errors_convert() {
        let dir = tempdir().unwrap();
        let result = load_capabilities(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(CliError::Capability(_))));
    }
}
