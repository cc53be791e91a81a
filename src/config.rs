use crate::types::config::ScoringConfig;
use std::path::Path;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "scoring.toml";

/// Load the scoring configuration.
///
/// An explicit `--config` path that does not exist, fails to read, fails to
/// parse, or fails validation falls back to the built-in defaults with a
/// warning; the run itself never fails on configuration. When no path is
/// given, `scoring.toml` in the current directory is used if present.
pub fn load_scoring_config(explicit: Option<&Path>) -> ScoringConfig {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                warn!("no {DEFAULT_CONFIG_FILE} found; using built-in scoring defaults");
                return ScoringConfig::default();
            }
            default.to_path_buf()
        }
    };

    match read_config(&path) {
        Ok(cfg) => cfg,
        Err(message) => {
            warn!("{message}; using built-in scoring defaults");
            ScoringConfig::default()
        }
    }
}

fn read_config(path: &Path) -> Result<ScoringConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let cfg: ScoringConfig = toml::from_str(&content)
        .map_err(|e| format!("cannot parse {}: {e}", path.display()))?;
    cfg.validate()
        .map_err(|e| format!("invalid {}: {e}", path.display()))?;
    Ok(cfg)
}
